use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use email_address::EmailAddress;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::errors::BoxError;

/// A named transformation: takes the input value plus the descriptor's extra
/// arguments and produces the canonical string, or `None` when the input has
/// no canonical form.
pub type Transform = Arc<dyn Fn(&str, &[Value]) -> Result<Option<String>, BoxError> + Send + Sync>;

/// Shared registry of named transformations.
///
/// Passed explicitly to the [`CanonicalEngine`](crate::CanonicalEngine);
/// there is no process-global instance. [`Canonicalizer::new`] starts with
/// the built-in transformations (`email`, `slug`, `url`); more can be
/// registered at startup with [`register`](Self::register).
#[derive(Clone)]
pub struct Canonicalizer {
    transforms: HashMap<String, Transform>,
}

impl Canonicalizer {
    /// Registry with the built-in named transformations.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("email", |value, _args| Ok(canonicalize_email(value)));
        registry.register("slug", |value, args| {
            let separator = args.first().and_then(Value::as_str).unwrap_or("-");
            Ok(canonicalize_slug(value, separator))
        });
        registry.register("url", |value, _args| Ok(canonicalize_url(value)));
        registry
    }

    /// Registry with no named transformations. The default transformation
    /// via [`canonicalize`](Self::canonicalize) is always available.
    pub fn empty() -> Self {
        Self {
            transforms: HashMap::new(),
        }
    }

    /// Register a named transformation, replacing any prior one of the same
    /// name.
    pub fn register<F>(&mut self, name: impl Into<String>, transform: F)
    where
        F: Fn(&str, &[Value]) -> Result<Option<String>, BoxError> + Send + Sync + 'static,
    {
        self.transforms.insert(name.into(), Arc::new(transform));
    }

    /// Whether a transformation with the given name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.transforms.contains_key(name)
    }

    /// Look up a registered transformation by name.
    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }

    /// Apply the default transformation: trim surrounding whitespace and
    /// lowercase. An input that trims to nothing has no canonical form.
    pub fn canonicalize(&self, value: &str) -> Option<String> {
        canonicalize_default(value)
    }
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Canonicalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canonicalizer")
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Trim and lowercase; empty input yields `None`.
pub fn canonicalize_default(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Trim and lowercase, keeping only syntactically valid email addresses.
pub fn canonicalize_email(value: &str) -> Option<String> {
    let lowered = value.trim().to_lowercase();
    if EmailAddress::is_valid(&lowered) {
        Some(lowered)
    } else {
        None
    }
}

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-z0-9]+").expect("slug pattern compiles")
});

/// Lowercase and collapse every non-alphanumeric run into a single
/// separator; empty results yield `None`.
pub fn canonicalize_slug(value: &str, separator: &str) -> Option<String> {
    let lowered = value.trim().to_lowercase();
    let replaced = NON_ALNUM.replace_all(&lowered, separator);
    let slug = replaced.trim_matches(|c: char| separator.contains(c));
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// Parse and re-serialize a URL, normalizing scheme and host case; inputs
/// that do not parse as absolute URLs yield `None`.
pub fn canonicalize_url(value: &str) -> Option<String> {
    Url::parse(value.trim()).ok().map(|url| url.to_string())
}
