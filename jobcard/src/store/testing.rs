//! Test suite for ensuring a correct implementation of a key-value store.
use serde_json::json;

use super::*;

/// Create test suite for a jobcard key-value store.
///
/// For store implementors, it is useful to include this are part of your test suites.
///
/// # Example
///
/// ```
/// use jobcard::test_suite;
/// use jobcard::store::memory::InMemoryStore;
/// test_suite!(for: InMemoryStore::new());
/// ```
///
/// The expression is evaluated once per test and the store is dropped when the test ends. A store
/// backed by a temporary directory should own the directory's guard so it is cleaned up then:
///
/// ```ignore
/// use jobcard::test_suite;
/// test_suite!(attr: tokio::test, store: ScratchStore::new());
/// ```
#[macro_export]
macro_rules! test_suite {
    (for: $store:expr) => {
        $crate::test_suite!(attr: tokio::test, store: $store);
    };
    (attr: $attr:meta, store: $store:expr) => {
        #[$attr]
        async fn get_missing_key() {
          let store = $store;
          $crate::store::testing::get_missing_key(store).await;
        }
        #[$attr]
        async fn set_then_get() {
          let store = $store;
          $crate::store::testing::set_then_get(store).await;
        }
        #[$attr]
        async fn set_replaces_value() {
          let store = $store;
          $crate::store::testing::set_replaces_value(store).await;
        }
        #[$attr]
        async fn remove_key() {
          let store = $store;
          $crate::store::testing::remove_key(store).await;
        }
        #[$attr]
        async fn remove_missing_key() {
          let store = $store;
          $crate::store::testing::remove_missing_key(store).await;
        }
        #[$attr]
        async fn keys_are_independent() {
          let store = $store;
          $crate::store::testing::keys_are_independent(store).await;
        }
        #[$attr]
        async fn preserves_documents() {
          let store = $store;
          $crate::store::testing::preserves_documents(store).await;
        }
        #[$attr]
        async fn clones_see_writes() {
          let store = $store;
          $crate::store::testing::clones_see_writes(store).await;
        }
    };
}

pub use test_suite;

#[doc(hidden)]
pub async fn get_missing_key(store: impl KeyValueStore) {
    assert_eq!(store.get("sjc.jobs").await.unwrap(), None);
}

#[doc(hidden)]
pub async fn set_then_get(store: impl KeyValueStore) {
    store.set("sjc.jobs", json!([])).await.unwrap();

    assert_eq!(store.get("sjc.jobs").await.unwrap(), Some(json!([])));
}

#[doc(hidden)]
pub async fn set_replaces_value(store: impl KeyValueStore) {
    store.set("sjc.settings", json!({"name": "First"})).await.unwrap();
    store.set("sjc.settings", json!({"name": "Second"})).await.unwrap();

    assert_eq!(
        store.get("sjc.settings").await.unwrap(),
        Some(json!({"name": "Second"}))
    );
}

#[doc(hidden)]
pub async fn remove_key(store: impl KeyValueStore) {
    store.set("sjc.draft", json!({"issue": "cracked"})).await.unwrap();
    store.remove("sjc.draft").await.unwrap();

    assert_eq!(store.get("sjc.draft").await.unwrap(), None);
}

#[doc(hidden)]
pub async fn remove_missing_key(store: impl KeyValueStore) {
    store.remove("sjc.draft").await.unwrap();

    assert_eq!(store.get("sjc.draft").await.unwrap(), None);
}

#[doc(hidden)]
pub async fn keys_are_independent(store: impl KeyValueStore) {
    store.set("sjc.jobs", json!([1])).await.unwrap();
    store.set("sjc.settings", json!({"name": "Shop"})).await.unwrap();
    store.remove("sjc.jobs").await.unwrap();

    assert_eq!(store.get("sjc.jobs").await.unwrap(), None);
    assert_eq!(
        store.get("sjc.settings").await.unwrap(),
        Some(json!({"name": "Shop"}))
    );
}

#[doc(hidden)]
pub async fn preserves_documents(store: impl KeyValueStore) {
    let document = json!([
        {
            "id": "20240115-001",
            "customer": {"name": "Anaïs", "phone": "+91 98765 43210"},
            "estimate": {"amount": 400.5, "taxPercent": 18, "advance": 0},
            "status": "in_progress",
            "notes": "Line one\nLine two ₹"
        }
    ]);
    store.set("sjc.jobs", document.clone()).await.unwrap();

    assert_eq!(store.get("sjc.jobs").await.unwrap(), Some(document));
}

#[doc(hidden)]
pub async fn clones_see_writes(store: impl KeyValueStore) {
    let clone = store.clone();
    store.set("sjc.jobs", json!(["a"])).await.unwrap();

    assert_eq!(clone.get("sjc.jobs").await.unwrap(), Some(json!(["a"])));
}
