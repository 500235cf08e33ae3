use crate::errors::CanonicalError;
use crate::fields::{CanonicalField, CanonicalFieldSet, DEFAULT_TRANSFORM};
use crate::record::CanonicalRecord;
use crate::transforms::{Canonicalizer, Transform};

/// Derives canonical attribute values for one record type.
///
/// Borrows the record type's [`CanonicalFieldSet`] and a shared
/// [`Canonicalizer`]; holds no per-record state. The owning lifecycle calls
/// [`apply_on_create`](Self::apply_on_create) /
/// [`apply_on_update`](Self::apply_on_update) before the record is
/// persisted, and [`canonicalize`](Self::canonicalize) re-derives a single
/// field on demand.
#[derive(Debug, Clone, Copy)]
pub struct CanonicalEngine<'a> {
    fields: &'a CanonicalFieldSet,
    transforms: &'a Canonicalizer,
}

impl<'a> CanonicalEngine<'a> {
    pub fn new(fields: &'a CanonicalFieldSet, transforms: &'a Canonicalizer) -> Self {
        Self { fields, transforms }
    }

    /// Run every descriptor whose creation trigger fires, writing results
    /// onto the record. Any failure aborts the whole pass.
    pub fn apply_on_create<R: CanonicalRecord>(&self, record: &mut R) -> Result<(), CanonicalError> {
        for field in self.fields.fields() {
            if field.generate_on_create() || Self::custom_value_needs_pass(record, field) {
                self.apply_field(record, field)?;
            }
        }
        Ok(())
    }

    /// Run every descriptor whose update trigger fires, writing results
    /// onto the record. Any failure aborts the whole pass.
    pub fn apply_on_update<R: CanonicalRecord>(&self, record: &mut R) -> Result<(), CanonicalError> {
        for field in self.fields.fields() {
            if field.generate_on_update() || Self::custom_value_needs_pass(record, field) {
                self.apply_field(record, field)?;
            }
        }
        Ok(())
    }

    /// Re-derive the canonical value for the field sourced from
    /// `source_name`, regardless of generation toggles.
    ///
    /// Returns `Ok(false)` when no descriptor with that source exists; every
    /// other failure is an error.
    pub fn canonicalize<R: CanonicalRecord>(
        &self,
        record: &mut R,
        source_name: &str,
    ) -> Result<bool, CanonicalError> {
        match self.fields.get(source_name) {
            Some(field) => {
                self.apply_field(record, field)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// A suppressed field still runs when its target holds a manually-set
    /// value and the field is forced or uniqueness-enabled: a manual
    /// canonical on a unique field must always pass through uniqueness
    /// resolution.
    fn custom_value_needs_pass<R: CanonicalRecord>(record: &R, field: &CanonicalField) -> bool {
        if !(field.should_be_unique() || field.forced()) {
            return false;
        }
        match field.target() {
            Some(target) => Self::custom_value_used(record, target),
            None => false,
        }
    }

    /// The target holds a manual override when its current value is non-null
    /// and differs from the value as loaded or last persisted.
    fn custom_value_used<R: CanonicalRecord>(record: &R, target: &str) -> bool {
        let current = record.attribute(target);
        current.is_some() && current != record.original_attribute(target)
    }

    fn apply_field<R: CanonicalRecord>(
        &self,
        record: &mut R,
        field: &CanonicalField,
    ) -> Result<(), CanonicalError> {
        let (Some(source), Some(target)) = (field.source(), field.target()) else {
            return Err(CanonicalError::MissingSource {
                target: field.target().map(str::to_string),
            });
        };

        let mut canonical = if Self::custom_value_used(record, target) {
            let manual = record.attribute(target).unwrap_or_default();
            if field.forced() {
                // Force mode canonicalizes the manually-set value itself,
                // not the source attribute.
                self.generate(field, &manual)?
            } else {
                Some(manual)
            }
        } else {
            let input = record.attribute(source).unwrap_or_default();
            self.generate(field, &input)?
        };

        if let Some(separator) = field.unique_separator() {
            canonical = Some(self.make_unique(record, canonical, target, separator)?);
        }

        record.set_attribute(target, canonical);
        Ok(())
    }

    /// Resolution order is fixed: descriptor callback, then the record
    /// type's local transform, then the shared registry, then the shared
    /// default (which takes no extra arguments).
    fn generate(
        &self,
        field: &CanonicalField,
        input: &str,
    ) -> Result<Option<String>, CanonicalError> {
        if let Some(callback) = field.custom_transform() {
            return Self::run(callback, "callback", input, field);
        }
        let kind = field.kind();
        if kind != DEFAULT_TRANSFORM {
            if let Some(transform) = self.fields.local_transform(kind) {
                return Self::run(transform, kind, input, field);
            }
            if let Some(transform) = self.transforms.get(kind) {
                return Self::run(transform, kind, input, field);
            }
        }
        Ok(self.transforms.canonicalize(input))
    }

    fn run(
        transform: &Transform,
        name: &str,
        input: &str,
        field: &CanonicalField,
    ) -> Result<Option<String>, CanonicalError> {
        transform(input, field.args()).map_err(|source| CanonicalError::Transform {
            name: name.to_string(),
            source,
        })
    }

    /// Probe the store until a candidate is free: the bare base value first
    /// (never accepted when empty), then `base + separator + 1`, `2`, ...
    /// The probe excludes the record itself by primary key and counts
    /// soft-deleted records when the record type retains them.
    fn make_unique<R: CanonicalRecord>(
        &self,
        record: &R,
        canonical: Option<String>,
        target: &str,
        separator: &str,
    ) -> Result<String, CanonicalError> {
        let base = canonical.unwrap_or_default();
        let key = record.primary_key();
        let include_soft_deleted = record.uses_soft_deletes();

        let mut candidate = base.clone();
        let mut attempt: u64 = 1;
        while candidate.is_empty()
            || record.exists_other_record_with_attribute(
                target,
                &candidate,
                key.as_deref(),
                include_soft_deleted,
            )?
        {
            candidate = format!("{base}{separator}{attempt}");
            attempt += 1;
        }
        Ok(candidate)
    }
}
