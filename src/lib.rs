//! Canonical value derivation for record attributes.
//!
//! Given one or more source attributes on a record, this crate computes a
//! normalized ("canonical") representation and writes it into a target
//! attribute, either automatically at record create/update time or on
//! demand. Per-field behavior is described by [`CanonicalField`]
//! descriptors collected into a [`CanonicalFieldSet`]; named
//! transformations live in a [`Canonicalizer`] registry; the
//! [`CanonicalEngine`] ties them together against any record type that
//! implements the narrow [`CanonicalRecord`] adapter.
//!
//! Uniqueness-enabled fields probe the store through the adapter and
//! suffix collisions (`value`, `value-1`, `value-2`, ...) until a free
//! canonical value is found.
//!
//! # Example
//! ```
//! use std::collections::HashMap;
//! use canonical_fields::{
//!     CanonicalEngine, CanonicalField, CanonicalFieldSet, CanonicalRecord,
//!     Canonicalizer, StoreError,
//! };
//!
//! struct Contact {
//!     attributes: HashMap<String, String>,
//! }
//!
//! impl CanonicalRecord for Contact {
//!     fn attribute(&self, name: &str) -> Option<String> {
//!         self.attributes.get(name).cloned()
//!     }
//!     fn set_attribute(&mut self, name: &str, value: Option<String>) {
//!         match value {
//!             Some(value) => {
//!                 self.attributes.insert(name.to_string(), value);
//!             }
//!             None => {
//!                 self.attributes.remove(name);
//!             }
//!         }
//!     }
//!     fn original_attribute(&self, _name: &str) -> Option<String> {
//!         None
//!     }
//!     fn primary_key(&self) -> Option<String> {
//!         None
//!     }
//!     fn exists_other_record_with_attribute(
//!         &self,
//!         _attribute: &str,
//!         _value: &str,
//!         _excluding: Option<&str>,
//!         _include_soft_deleted: bool,
//!     ) -> Result<bool, StoreError> {
//!         Ok(false)
//!     }
//! }
//!
//! let fields = CanonicalFieldSet::create()
//!     .add_field(CanonicalField::create().from("email"));
//! let transforms = Canonicalizer::new();
//! let engine = CanonicalEngine::new(&fields, &transforms);
//!
//! let mut contact = Contact {
//!     attributes: HashMap::from([
//!         ("email".to_string(), "HelLo.World@HellO.cOM.Nl".to_string()),
//!     ]),
//! };
//! engine.apply_on_create(&mut contact).unwrap();
//! assert_eq!(
//!     contact.attribute("email_canonical").as_deref(),
//!     Some("hello.world@hello.com.nl")
//! );
//! ```

pub mod engine;
pub mod errors;
pub mod fields;
pub mod record;
pub mod transforms;

pub use engine::CanonicalEngine;
pub use errors::{BoxError, CanonicalError, StoreError};
pub use fields::{CanonicalField, CanonicalFieldSet, DEFAULT_TRANSFORM};
pub use record::CanonicalRecord;
pub use transforms::{
    Canonicalizer, Transform, canonicalize_default, canonicalize_email, canonicalize_slug,
    canonicalize_url,
};
