use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::errors::BoxError;
use crate::transforms::Transform;

/// Name of the built-in transformation used when no other kind is selected.
pub const DEFAULT_TRANSFORM: &str = "default";

/// Per-field canonicalization descriptor.
///
/// Describes where the raw value is read from, where the canonical value is
/// written, which transformation applies, and the generation/uniqueness
/// policy. Built with a chainable by-value builder:
///
/// ```
/// use canonical_fields::CanonicalField;
///
/// let field = CanonicalField::create()
///     .from("email")
///     .transform("email")
///     .disallow_duplicate();
/// assert_eq!(field.target(), Some("email_canonical"));
/// ```
#[derive(Clone)]
pub struct CanonicalField {
    source: Option<String>,
    target: Option<String>,
    kind: String,
    args: Vec<Value>,
    callback: Option<Transform>,
    generate_on_create: bool,
    generate_on_update: bool,
    unique_separator: Option<String>,
    force: bool,
}

impl Default for CanonicalField {
    fn default() -> Self {
        Self {
            source: None,
            target: None,
            kind: DEFAULT_TRANSFORM.to_string(),
            args: Vec::new(),
            callback: None,
            generate_on_create: true,
            generate_on_update: true,
            unique_separator: None,
            force: false,
        }
    }
}

impl CanonicalField {
    /// Create an empty descriptor.
    pub fn create() -> Self {
        Self::default()
    }

    /// Set the attribute the canonical value is derived from.
    ///
    /// The first call fixes the source; later calls are ignored. If no
    /// target has been set yet, it defaults to `"{name}_canonical"`.
    pub fn from(mut self, name: impl Into<String>) -> Self {
        if self.source.is_none() {
            let name = name.into();
            if self.target.is_none() {
                self.target = Some(format!("{name}_canonical"));
            }
            self.source = Some(name);
        }
        self
    }

    /// Set the attribute the canonical value is written to, overriding the
    /// default derived from the source name.
    pub fn to(mut self, name: impl Into<String>) -> Self {
        self.target = Some(name.into());
        self
    }

    /// Select a named transformation, resetting any extra arguments.
    pub fn transform(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self.args = Vec::new();
        self
    }

    /// Select a named transformation along with extra positional arguments
    /// forwarded after the source value.
    pub fn transform_with_args(mut self, kind: impl Into<String>, args: Vec<Value>) -> Self {
        self.kind = kind.into();
        self.args = args;
        self
    }

    /// Set a custom transformation. Takes precedence over any named kind.
    pub fn callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Result<Option<String>, BoxError> + Send + Sync + 'static,
    {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Disable automatic canonicalization when the record is created.
    pub fn do_not_generate_on_create(mut self) -> Self {
        self.generate_on_create = false;
        self
    }

    /// Disable automatic canonicalization when the record is updated.
    pub fn do_not_generate_on_update(mut self) -> Self {
        self.generate_on_update = false;
        self
    }

    /// Require canonical values for this field to be unique among records,
    /// suffixing collisions with `-1`, `-2`, ...
    pub fn disallow_duplicate(self) -> Self {
        self.disallow_duplicate_with("-")
    }

    /// Same as [`disallow_duplicate`](Self::disallow_duplicate) with a
    /// custom suffix separator.
    pub fn disallow_duplicate_with(mut self, separator: impl Into<String>) -> Self {
        self.unique_separator = Some(separator.into());
        self
    }

    /// Re-derive the canonical value even when the target attribute holds a
    /// manually-set value, using that value as the transformation input.
    pub fn force_canonicalization(mut self) -> Self {
        self.force = true;
        self
    }

    /// The attribute the canonical value is derived from.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// The attribute the canonical value is written to.
    pub fn target(&self) -> Option<&str> {
        self.target.as_deref()
    }

    /// Whether canonical values for this field must be unique.
    pub fn should_be_unique(&self) -> bool {
        self.unique_separator.is_some()
    }

    pub(crate) fn kind(&self) -> &str {
        &self.kind
    }

    pub(crate) fn args(&self) -> &[Value] {
        &self.args
    }

    pub(crate) fn custom_transform(&self) -> Option<&Transform> {
        self.callback.as_ref()
    }

    pub(crate) fn generate_on_create(&self) -> bool {
        self.generate_on_create
    }

    pub(crate) fn generate_on_update(&self) -> bool {
        self.generate_on_update
    }

    pub(crate) fn unique_separator(&self) -> Option<&str> {
        self.unique_separator.as_deref()
    }

    pub(crate) fn forced(&self) -> bool {
        self.force
    }
}

impl fmt::Debug for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalField")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("args", &self.args)
            .field("callback", &self.callback.is_some())
            .field("generate_on_create", &self.generate_on_create)
            .field("generate_on_update", &self.generate_on_update)
            .field("unique_separator", &self.unique_separator)
            .field("force", &self.force)
            .finish()
    }
}

/// Ordered collection of canonical field descriptors for one record type,
/// keyed by source attribute name.
///
/// Insertion order is preserved for iteration. Re-adding a descriptor with
/// an already-present source replaces the prior entry in place. Also carries
/// the record-type-local transformations consulted before the shared
/// [`Canonicalizer`](crate::Canonicalizer).
#[derive(Clone, Default)]
pub struct CanonicalFieldSet {
    fields: Vec<CanonicalField>,
    transforms: HashMap<String, Transform>,
}

impl CanonicalFieldSet {
    /// Create an empty field set.
    pub fn create() -> Self {
        Self::default()
    }

    /// Insert a descriptor, replacing any prior entry with the same source
    /// while keeping its position.
    pub fn add_field(mut self, field: CanonicalField) -> Self {
        match self
            .fields
            .iter_mut()
            .find(|existing| existing.source() == field.source())
        {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    /// Register a transformation local to this record type. Local
    /// transformations win over the shared registry when a descriptor
    /// selects their name.
    pub fn register_transform<F>(mut self, name: impl Into<String>, transform: F) -> Self
    where
        F: Fn(&str, &[Value]) -> Result<Option<String>, BoxError> + Send + Sync + 'static,
    {
        self.transforms.insert(name.into(), Arc::new(transform));
        self
    }

    /// Look up a descriptor by source attribute name.
    pub fn get(&self, source: &str) -> Option<&CanonicalField> {
        self.fields.iter().find(|field| field.source() == Some(source))
    }

    /// Iterate descriptors in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &CanonicalField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn local_transform(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }
}

impl fmt::Debug for CanonicalFieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanonicalFieldSet")
            .field("fields", &self.fields)
            .field("transforms", &self.transforms.keys().collect::<Vec<_>>())
            .finish()
    }
}
