use crate::errors::StoreError;

/// Adapter between the canonicalization engine and a record backed by some
/// store.
///
/// The engine only needs attribute access by name, the pre-mutation
/// snapshot of an attribute, the record's identity, and an existence probe
/// over other records of the same type. Attribute values are string-or-null
/// at this layer; the adapter owns any coercion from richer storage types.
pub trait CanonicalRecord {
    /// Current in-memory value of the named attribute.
    fn attribute(&self, name: &str) -> Option<String>;

    /// Write a value to the named attribute.
    fn set_attribute(&mut self, name: &str, value: Option<String>);

    /// Value of the named attribute as loaded or last persisted. `None` for
    /// records that have never been saved.
    fn original_attribute(&self, name: &str) -> Option<String>;

    /// Primary key of this record, or `None` when it has not been persisted
    /// yet.
    fn primary_key(&self) -> Option<String>;

    /// Whether deleted records of this type are retained and must be
    /// counted by the existence probe.
    fn uses_soft_deletes(&self) -> bool {
        false
    }

    /// Whether any other record of the same type holds `value` in the named
    /// attribute.
    ///
    /// `excluding` carries the probing record's primary key so it does not
    /// collide with itself; `None` means the record is not yet persisted
    /// and no stored record may be excluded. When `include_soft_deleted`
    /// is set, soft-deleted records count as existing.
    fn exists_other_record_with_attribute(
        &self,
        attribute: &str,
        value: &str,
        excluding: Option<&str>,
        include_soft_deleted: bool,
    ) -> Result<bool, StoreError>;
}
