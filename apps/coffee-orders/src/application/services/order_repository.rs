//! Order Repository
//!
//! Maps coffee orders onto the record store.
//!
//! # Key Scheme
//!
//! Every order lives under `coffeeorder:<24-hex id>`. Ids are time-ordered,
//! so ascending key order is creation order and the last matching key for
//! an email is that email's newest order.
//!
//! All queries are full scans of the prefix. Records that fail to decode
//! are logged and left out of results.

use std::sync::Arc;

use crate::application::ports::{RecordStore, StoreError};
use crate::domain::order::{CoffeeOrder, OrderDraft, OrderId, OrderIdGenerator};

/// Prefix shared by every order key.
pub const ORDER_KEY_PREFIX: &str = "coffeeorder:";

/// Key used to check the store is readable.
const HEALTH_PROBE_KEY: &[u8] = b"health:probe";

/// Store key for the order with `id`.
#[must_use]
pub fn order_key(id: &OrderId) -> Vec<u8> {
    format!("{ORDER_KEY_PREFIX}{id}").into_bytes()
}

/// Result of a bulk delete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepOutcome {
    /// Records removed.
    pub deleted: usize,
    /// Records whose delete failed and were left in place.
    pub failed: usize,
}

/// Result of replacing an email's newest order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    /// Key of the order that was removed, if the email had one.
    pub removed: Option<Vec<u8>>,
    /// The newly stored order.
    pub order: CoffeeOrder,
}

/// Repository errors.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// The record store failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An order could not be encoded.
    #[error("failed to encode order: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Order persistence over a [`RecordStore`].
pub struct OrderRepository<S> {
    store: Arc<S>,
    ids: OrderIdGenerator,
}

impl<S: RecordStore> OrderRepository<S> {
    /// Create a repository over `store` with a fresh id generator.
    #[must_use]
    pub fn new(store: Arc<S>) -> Self {
        Self::with_id_generator(store, OrderIdGenerator::new())
    }

    /// Create a repository over `store` using `ids` for new orders.
    #[must_use]
    pub const fn with_id_generator(store: Arc<S>, ids: OrderIdGenerator) -> Self {
        Self { store, ids }
    }

    /// Every order, in key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the scan fails.
    pub fn list_all(&self) -> Result<Vec<CoffeeOrder>, RepositoryError> {
        Ok(self.scan()?.into_iter().map(|(_, order)| order).collect())
    }

    /// Orders whose email matches `email` exactly, in key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the scan fails.
    pub fn list_by_email(&self, email: &str) -> Result<Vec<CoffeeOrder>, RepositoryError> {
        Ok(self
            .scan()?
            .into_iter()
            .filter_map(|(_, order)| order.belongs_to(email).then_some(order))
            .collect())
    }

    /// Key of the last order for `email` in key order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the scan fails.
    pub fn find_newest_key_for_email(
        &self,
        email: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        Ok(self
            .scan()?
            .into_iter()
            .filter(|(_, order)| order.belongs_to(email))
            .map(|(key, _)| key)
            .next_back())
    }

    /// Store `draft` under a freshly generated id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if encoding or the write fails.
    pub fn insert(&self, draft: OrderDraft) -> Result<CoffeeOrder, RepositoryError> {
        let order = draft.into_order(self.ids.generate());
        let value = serde_json::to_vec(&order)?;
        self.store.put(&order_key(&order.id), &value)?;

        tracing::debug!(order_id = %order.id, "Order stored");
        Ok(order)
    }

    /// Remove the record under `key`. Absent keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete fails.
    pub fn delete_by_key(&self, key: &[u8]) -> Result<(), RepositoryError> {
        self.store.delete(key)?;
        Ok(())
    }

    /// Remove the newest order for `email`, returning its key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the scan or delete fails.
    pub fn delete_newest_for_email(
        &self,
        email: &str,
    ) -> Result<Option<Vec<u8>>, RepositoryError> {
        let Some(key) = self.find_newest_key_for_email(email)? else {
            return Ok(None);
        };
        self.delete_by_key(&key)?;
        Ok(Some(key))
    }

    /// Remove the newest order for `email` (if any), then store `draft`
    /// under a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if any store operation fails. A failed
    /// insert leaves the delete in place.
    pub fn replace_newest_for_email(
        &self,
        email: &str,
        draft: OrderDraft,
    ) -> Result<Replacement, RepositoryError> {
        let removed = self.delete_newest_for_email(email)?;
        let order = self.insert(draft)?;
        Ok(Replacement { removed, order })
    }

    /// Remove every order record.
    ///
    /// Not atomic: orders written during the scan may or may not survive.
    /// Individual delete failures are logged and counted, not returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` only if the initial scan fails.
    pub fn delete_all(&self) -> Result<SweepOutcome, RepositoryError> {
        let entries = self.store.scan_prefix(ORDER_KEY_PREFIX.as_bytes())?;
        let mut outcome = SweepOutcome::default();

        for (key, _) in entries {
            match self.store.delete(&key) {
                Ok(()) => outcome.deleted += 1,
                Err(e) => {
                    outcome.failed += 1;
                    tracing::warn!(
                        key = %String::from_utf8_lossy(&key),
                        error = %e,
                        "Failed to delete order record"
                    );
                }
            }
        }

        Ok(outcome)
    }

    /// Check that the store answers reads.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    pub fn probe(&self) -> Result<(), RepositoryError> {
        self.store.get(HEALTH_PROBE_KEY)?;
        Ok(())
    }

    fn scan(&self) -> Result<Vec<(Vec<u8>, CoffeeOrder)>, StoreError> {
        let entries = self.store.scan_prefix(ORDER_KEY_PREFIX.as_bytes())?;

        Ok(entries
            .into_iter()
            .filter_map(|(key, value)| match serde_json::from_slice(&value) {
                Ok(order) => Some((key, order)),
                Err(e) => {
                    tracing::warn!(
                        key = %String::from_utf8_lossy(&key),
                        error = %e,
                        "Skipping undecodable order record"
                    );
                    None
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MockRecordStore;
    use crate::infrastructure::store::InMemoryStore;

    fn repository() -> (OrderRepository<InMemoryStore>, Arc<InMemoryStore>) {
        let store = Arc::new(InMemoryStore::new());
        (OrderRepository::new(Arc::clone(&store)), store)
    }

    fn draft(email: &str, coffee: &str) -> OrderDraft {
        OrderDraft {
            coffee: coffee.to_string(),
            email_address: email.to_string(),
            ..OrderDraft::default()
        }
    }

    #[test]
    fn key_is_prefix_plus_hex_id() {
        let id: OrderId = "654fa100abcdef010200000a".parse().unwrap();
        assert_eq!(
            order_key(&id),
            b"coffeeorder:654fa100abcdef010200000a".to_vec()
        );
    }

    #[test]
    fn insert_assigns_fresh_ids() {
        let (repo, _) = repository();
        let first = repo.insert(draft("a@x.com", "latte")).unwrap();
        let second = repo.insert(draft("a@x.com", "latte")).unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(repo.list_all().unwrap(), vec![first, second]);
    }

    #[test]
    fn list_by_email_is_exact() {
        let (repo, _) = repository();
        let kept = repo.insert(draft("a@x.com", "latte")).unwrap();
        repo.insert(draft("A@x.com", "mocha")).unwrap();
        repo.insert(draft("a@x.co", "drip")).unwrap();

        assert_eq!(repo.list_by_email("a@x.com").unwrap(), vec![kept]);
        assert!(repo.list_by_email("nobody@x.com").unwrap().is_empty());
    }

    #[test]
    fn newest_key_is_last_match() {
        let (repo, _) = repository();
        repo.insert(draft("a@x.com", "first")).unwrap();
        let second = repo.insert(draft("a@x.com", "second")).unwrap();
        repo.insert(draft("b@x.com", "other")).unwrap();

        assert_eq!(
            repo.find_newest_key_for_email("a@x.com").unwrap(),
            Some(order_key(&second.id))
        );
        assert_eq!(repo.find_newest_key_for_email("c@x.com").unwrap(), None);
    }

    #[test]
    fn delete_newest_leaves_older_order() {
        let (repo, _) = repository();
        let first = repo.insert(draft("a@x.com", "first")).unwrap();
        repo.insert(draft("a@x.com", "second")).unwrap();

        assert!(repo.delete_newest_for_email("a@x.com").unwrap().is_some());
        assert_eq!(repo.list_all().unwrap(), vec![first]);
    }

    #[test]
    fn delete_newest_without_match_is_noop() {
        let (repo, _) = repository();
        let order = repo.insert(draft("a@x.com", "latte")).unwrap();

        assert_eq!(repo.delete_newest_for_email("b@x.com").unwrap(), None);
        assert_eq!(repo.list_all().unwrap(), vec![order]);
    }

    #[test]
    fn replace_swaps_newest_for_new_id() {
        let (repo, _) = repository();
        let first = repo.insert(draft("a@x.com", "first")).unwrap();
        let second = repo.insert(draft("a@x.com", "second")).unwrap();

        let replacement = repo
            .replace_newest_for_email("a@x.com", draft("a@x.com", "third"))
            .unwrap();

        assert_eq!(replacement.removed, Some(order_key(&second.id)));
        assert_ne!(replacement.order.id, second.id);
        assert_eq!(repo.list_all().unwrap(), vec![first, replacement.order]);
    }

    #[test]
    fn replace_without_match_just_inserts() {
        let (repo, _) = repository();
        let replacement = repo
            .replace_newest_for_email("a@x.com", draft("b@x.com", "latte"))
            .unwrap();
        assert_eq!(replacement.removed, None);
        assert_eq!(repo.list_all().unwrap(), vec![replacement.order]);
    }

    #[test]
    fn delete_all_only_touches_order_prefix() {
        let (repo, store) = repository();
        repo.insert(draft("a@x.com", "latte")).unwrap();
        repo.insert(draft("b@x.com", "mocha")).unwrap();
        store.put(b"other:key", b"keep me").unwrap();

        let outcome = repo.delete_all().unwrap();

        assert_eq!(outcome, SweepOutcome { deleted: 2, failed: 0 });
        assert!(repo.list_all().unwrap().is_empty());
        assert_eq!(store.get(b"other:key").unwrap(), Some(b"keep me".to_vec()));
    }

    #[test]
    fn undecodable_records_are_skipped() {
        let (repo, store) = repository();
        let good = repo.insert(draft("a@x.com", "latte")).unwrap();
        store
            .put(b"coffeeorder:ffffffffffffffffffffffff", b"{not json")
            .unwrap();

        assert_eq!(repo.list_all().unwrap(), vec![good.clone()]);
        assert_eq!(
            repo.find_newest_key_for_email("a@x.com").unwrap(),
            Some(order_key(&good.id))
        );
    }

    #[test]
    fn delete_all_counts_failures_and_continues() {
        let mut store = MockRecordStore::new();
        store.expect_scan_prefix().returning(|_| {
            Ok(vec![
                (b"coffeeorder:a".to_vec(), Vec::new()),
                (b"coffeeorder:b".to_vec(), Vec::new()),
                (b"coffeeorder:c".to_vec(), Vec::new()),
            ])
        });
        store.expect_delete().returning(|key| {
            if key == b"coffeeorder:b".as_slice() {
                Err(StoreError::Delete("disk full".to_string()))
            } else {
                Ok(())
            }
        });

        let repo = OrderRepository::new(Arc::new(store));
        let outcome = repo.delete_all().unwrap();

        assert_eq!(outcome, SweepOutcome { deleted: 2, failed: 1 });
    }

    #[test]
    fn store_errors_surface_from_queries() {
        let mut store = MockRecordStore::new();
        store
            .expect_scan_prefix()
            .returning(|_| Err(StoreError::Read("io".to_string())));

        let repo = OrderRepository::new(Arc::new(store));

        assert!(matches!(
            repo.list_all(),
            Err(RepositoryError::Store(StoreError::Read(_)))
        ));
        assert!(repo.delete_all().is_err());
    }

    #[test]
    fn failed_write_is_reported() {
        let mut store = MockRecordStore::new();
        store
            .expect_put()
            .returning(|_, _| Err(StoreError::Write("read-only".to_string())));

        let repo = OrderRepository::new(Arc::new(store));
        assert!(repo.insert(draft("a@x.com", "latte")).is_err());
    }
}
