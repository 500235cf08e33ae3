//! Shared in-memory record store and record fixture for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use canonical_fields::{
    CanonicalEngine, CanonicalError, CanonicalField, CanonicalFieldSet, CanonicalRecord,
    Canonicalizer, StoreError,
};
use chrono::{DateTime, Utc};

pub type SharedStore = Rc<RefCell<MemoryStore>>;

#[derive(Clone)]
pub struct StoredRow {
    pub id: u64,
    pub attributes: HashMap<String, String>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Minimal record store: rows with string attributes, incrementing keys,
/// and optional soft-delete retention.
pub struct MemoryStore {
    rows: Vec<StoredRow>,
    next_id: u64,
    soft_deletes: bool,
}

impl MemoryStore {
    pub fn new() -> SharedStore {
        Rc::new(RefCell::new(Self {
            rows: Vec::new(),
            next_id: 1,
            soft_deletes: false,
        }))
    }

    pub fn with_soft_deletes() -> SharedStore {
        let store = Self::new();
        store.borrow_mut().soft_deletes = true;
        store
    }

    pub fn row(&self, id: u64) -> Option<&StoredRow> {
        self.rows.iter().find(|row| row.id == id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// A record bound to a [`MemoryStore`], tracking current attributes and the
/// snapshot as of the last save.
pub struct TestRecord {
    store: SharedStore,
    id: Option<u64>,
    attributes: HashMap<String, String>,
    original: HashMap<String, String>,
    deleted_at: Option<DateTime<Utc>>,
}

impl TestRecord {
    pub fn new(store: &SharedStore) -> Self {
        Self {
            store: Rc::clone(store),
            id: None,
            attributes: HashMap::new(),
            original: HashMap::new(),
            deleted_at: None,
        }
    }

    pub fn set(&mut self, name: &str, value: &str) -> &mut Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn unset(&mut self, name: &str) -> &mut Self {
        self.attributes.remove(name);
        self
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Fresh unsaved copy of this record's attributes, like re-entering the
    /// same form data for a new record.
    pub fn replicate(&self) -> Self {
        Self {
            store: Rc::clone(&self.store),
            id: None,
            attributes: self.attributes.clone(),
            original: HashMap::new(),
            deleted_at: self.deleted_at,
        }
    }

    pub fn mark_deleted(&mut self) -> &mut Self {
        self.deleted_at = Some(Utc::now());
        self
    }

    /// Run the engine pass for the applicable lifecycle point, then persist
    /// the record and refresh the original-attribute snapshot.
    pub fn save(&mut self, engine: &CanonicalEngine<'_>) -> Result<(), CanonicalError> {
        match self.id {
            None => {
                engine.apply_on_create(self)?;
                let id = {
                    let mut store = self.store.borrow_mut();
                    let id = store.next_id;
                    store.next_id += 1;
                    store.rows.push(StoredRow {
                        id,
                        attributes: self.attributes.clone(),
                        deleted_at: self.deleted_at,
                    });
                    id
                };
                self.id = Some(id);
            }
            Some(id) => {
                engine.apply_on_update(self)?;
                let mut store = self.store.borrow_mut();
                if let Some(row) = store.rows.iter_mut().find(|row| row.id == id) {
                    row.attributes = self.attributes.clone();
                    row.deleted_at = self.deleted_at;
                }
            }
        }
        self.original = self.attributes.clone();
        Ok(())
    }
}

impl CanonicalRecord for TestRecord {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.get(name).cloned()
    }

    fn set_attribute(&mut self, name: &str, value: Option<String>) {
        match value {
            Some(value) => {
                self.attributes.insert(name.to_string(), value);
            }
            None => {
                self.attributes.remove(name);
            }
        }
    }

    fn original_attribute(&self, name: &str) -> Option<String> {
        self.original.get(name).cloned()
    }

    fn primary_key(&self) -> Option<String> {
        self.id.map(|id| id.to_string())
    }

    fn uses_soft_deletes(&self) -> bool {
        self.store.borrow().soft_deletes
    }

    fn exists_other_record_with_attribute(
        &self,
        attribute: &str,
        value: &str,
        excluding: Option<&str>,
        include_soft_deleted: bool,
    ) -> Result<bool, StoreError> {
        let store = self.store.borrow();
        Ok(store.rows.iter().any(|row| {
            if !include_soft_deleted && row.deleted_at.is_some() {
                return false;
            }
            if excluding == Some(row.id.to_string().as_str()) {
                return false;
            }
            row.attributes.get(attribute).map(String::as_str) == Some(value)
        }))
    }
}

/// Field set used by most tests: derive `email_canonical` from `email`.
pub fn email_fields() -> CanonicalFieldSet {
    CanonicalFieldSet::create().add_field(CanonicalField::create().from("email"))
}

pub fn transforms() -> Canonicalizer {
    Canonicalizer::new()
}

pub const EMAIL: &str = "HelLo.World@HellO.cOM.Nl";
pub const EMAIL_CANONICAL: &str = "hello.world@hello.com.nl";
pub const OTHER_EMAIL: &str = "BlAblABla@GmaIl.cOm";
pub const OTHER_EMAIL_CANONICAL: &str = "blablabla@gmail.com";
