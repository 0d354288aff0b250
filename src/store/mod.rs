//! Product store module
//!
//! In-memory, insertion-ordered collection of product records.
//! Every read hands out owned copies, so callers never alias live records.

mod product;

pub use product::{Product, ProductPatch};

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory product store
///
/// Each operation holds the internal lock for its whole read-modify-write
/// step, so the store can be shared between runtime worker threads.
#[derive(Debug, Default)]
pub struct ProductStore {
    records: RwLock<Vec<Product>>,
}

impl ProductStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the three demo records served at startup
    pub fn seeded() -> Self {
        Self::from_records(vec![
            Product::new(1001, "Canvas Tote Bag", "BAG-001", 1500),
            Product::new(1002, "Enamel Camp Mug", "MUG-002", 1200),
            Product::new(1003, "Wool Beanie", "HAT-003", 2500),
        ])
    }

    pub fn from_records(records: Vec<Product>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Every record, in insertion order
    pub fn all(&self) -> Vec<Product> {
        self.read().clone()
    }

    /// First record whose id equals `id`
    pub fn get_by_id(&self, id: i64) -> Option<Product> {
        self.read().iter().find(|p| p.id == id).cloned()
    }

    /// Append a record verbatim
    pub fn add(&self, product: Product) {
        self.write().push(product);
    }

    /// Remove the first record whose id equals `id`
    pub fn remove(&self, id: i64) -> bool {
        let mut records = self.write();
        match records.iter().position(|p| p.id == id) {
            Some(index) => {
                records.remove(index);
                true
            }
            None => false,
        }
    }

    /// Apply `patch` to the first record whose id equals `id`
    pub fn update(&self, id: i64, patch: &ProductPatch) -> bool {
        let mut records = self.write();
        match records.iter_mut().find(|p| p.id == id) {
            Some(product) => {
                patch.apply_to(product);
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // Records are plain data, a panic while holding the lock cannot leave
    // them half-written, so a poisoned lock is still usable.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Product>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Product>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }
}
