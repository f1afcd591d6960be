//! End-to-end behavior of `CartStore` against fake collaborators.

mod common;

use std::sync::Arc;

use common::{blob, FakeStock, Harness, KEY};
use rocket_cart::{
    CartStore, Collaborators, CorruptStatePolicy, MemoryKv, NoOpNotifier, PersistentKv,
    StorageSettings, StoreError,
};
use rocket_core::{Cart, Money, ProductId, UpdateProductAmount};

const OUT_OF_STOCK: &str = "Quantidade solicitada fora de estoque";
const ADD_FAILED: &str = "Erro na adição do produto";
const REMOVE_FAILED: &str = "Erro na remoção do produto";
const UPDATE_FAILED: &str = "Erro na alteração de quantidade do produto";

fn update(id: u64, amount: i64) -> UpdateProductAmount {
    UpdateProductAmount {
        product_id: ProductId(id),
        amount,
    }
}

fn assert_invariants(cart: &Cart) {
    let mut ids: Vec<_> = cart.iter().map(|p| p.id).collect();
    assert!(cart.iter().all(|p| p.amount >= 1), "amount below 1 in {cart:?}");
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), cart.item_count(), "duplicate id in {cart:?}");
}

// =============================================================================
// Initialization
// =============================================================================

#[tokio::test]
async fn test_init_without_persisted_cart_is_empty() {
    let h = Harness::new(FakeStock::default(), None).await;
    assert!(h.store.cart().is_empty());
    assert_eq!(h.store.storage_key(), KEY);
    assert_eq!(h.persisted().await, None);
}

#[tokio::test]
async fn test_init_with_empty_string_is_empty() {
    let h = Harness::new(FakeStock::default(), Some("")).await;
    assert!(h.store.cart().is_empty());
}

#[tokio::test]
async fn test_init_restores_persisted_order() {
    let h = Harness::new(FakeStock::default(), Some(&blob(&[(3, 1), (1, 4), (2, 2)]))).await;
    assert_eq!(h.amounts(), vec![(3, 1), (1, 4), (2, 2)]);
    assert_eq!(h.store.cart().products()[0].title(), Some("Tênis 3"));
}

async fn init_with(blob: &str, policy: CorruptStatePolicy) -> Result<CartStore, StoreError> {
    let kv = Arc::new(MemoryKv::with_entry(KEY, blob));
    let collaborators = Collaborators {
        stock: Arc::new(FakeStock::default()),
        catalog: Arc::new(common::FakeCatalog::new(&[])),
        kv,
        notifier: Arc::new(NoOpNotifier),
    };
    let storage = StorageSettings {
        on_corrupt_state: policy,
        ..StorageSettings::default()
    };
    CartStore::init(collaborators, &storage).await
}

#[tokio::test]
async fn test_corrupt_blob_resets_by_default() {
    let store = init_with("{not json", CorruptStatePolicy::Reset).await.unwrap();
    assert!(store.cart().is_empty());

    let store = init_with(r#"[{"id":1,"amount":0}]"#, CorruptStatePolicy::Reset)
        .await
        .unwrap();
    assert!(store.cart().is_empty());

    let store = init_with(
        r#"[{"id":1,"amount":1},{"id":1,"amount":2}]"#,
        CorruptStatePolicy::Reset,
    )
    .await
    .unwrap();
    assert!(store.cart().is_empty());
}

#[tokio::test]
async fn test_corrupt_blob_fails_when_configured() {
    let err = init_with("{not json", CorruptStatePolicy::Fail).await.unwrap_err();
    assert!(matches!(err, StoreError::CorruptState(_)));

    let err = init_with(r#"[{"id":1,"amount":-3}]"#, CorruptStatePolicy::Fail)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::CorruptState(_)));
}

#[tokio::test]
async fn test_init_fails_when_storage_unreadable() {
    let kv = Arc::new(common::FlakyKv::default());
    kv.fail_reads(true);

    let collaborators = Collaborators {
        stock: Arc::new(FakeStock::default()),
        catalog: Arc::new(common::FakeCatalog::new(&[])),
        kv,
        notifier: Arc::new(NoOpNotifier),
    };

    let err = CartStore::init(collaborators, &StorageSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Persistence(_)));
}

// =============================================================================
// add_product
// =============================================================================

#[tokio::test]
async fn test_add_new_product_to_empty_cart() {
    let h = Harness::new(FakeStock::new(&[(1, 5)]), None).await;

    h.store.add_product(ProductId(1)).await;

    assert_eq!(h.amounts(), vec![(1, 1)]);
    let cart = h.store.cart();
    let product = &cart.products()[0];
    assert_eq!(product.title(), Some("Tênis 1"));
    assert_eq!(product.fields["image"], "https://cdn.example.com/1.jpg");

    let expected = serde_json::to_string(h.store.cart().as_ref()).unwrap();
    assert_eq!(h.persisted().await.as_deref(), Some(expected.as_str()));
    assert_eq!(
        h.persisted().await.unwrap(),
        r#"[{"id":1,"title":"Tênis 1","price":139.9,"image":"https://cdn.example.com/1.jpg","amount":1}]"#
    );
    assert!(h.notifier.take().is_empty());
}

#[tokio::test]
async fn test_rewrite_keeps_amount_after_catalog_fields() {
    let stored = r#"[{"id":2,"title":"Tênis 2","price":139.9,"image":"https://cdn.example.com/2.jpg","amount":1}]"#;
    let h = Harness::new(FakeStock::new(&[(2, 5)]), Some(stored)).await;

    h.store.update_product_amount(update(2, 3)).await;

    assert_eq!(
        h.persisted().await.unwrap(),
        r#"[{"id":2,"title":"Tênis 2","price":139.9,"image":"https://cdn.example.com/2.jpg","amount":3}]"#
    );
}

#[tokio::test]
async fn test_add_increments_existing_product() {
    let h = Harness::new(FakeStock::new(&[(1, 3)]), Some(&blob(&[(1, 2)]))).await;

    h.store.add_product(ProductId(1)).await;

    assert_eq!(h.amounts(), vec![(1, 3)]);
    assert!(h.notifier.take().is_empty());
}

#[tokio::test]
async fn test_add_at_stock_ceiling_is_out_of_stock() {
    let h = Harness::new(FakeStock::new(&[(1, 2)]), Some(&blob(&[(1, 2)]))).await;
    let before = h.persisted().await;

    h.store.add_product(ProductId(1)).await;

    assert_eq!(h.amounts(), vec![(1, 2)]);
    assert_eq!(h.persisted().await, before);
    assert_eq!(h.notifier.take(), vec![OUT_OF_STOCK]);
}

#[tokio::test]
async fn test_add_succeeds_iff_stock_exceeds_amount() {
    for (amount, stock) in [(1, 0), (1, 1), (1, 2), (3, 2), (3, 3), (3, 4), (5, 100)] {
        let h = Harness::new(FakeStock::new(&[(4, stock)]), Some(&blob(&[(4, amount)]))).await;

        h.store.add_product(ProductId(4)).await;

        if stock > amount {
            assert_eq!(h.amounts(), vec![(4, amount + 1)], "stock {stock}, amount {amount}");
            assert!(h.notifier.take().is_empty());
        } else {
            assert_eq!(h.amounts(), vec![(4, amount)], "stock {stock}, amount {amount}");
            assert_eq!(h.notifier.take(), vec![OUT_OF_STOCK]);
        }
    }
}

#[tokio::test]
async fn test_add_at_i64_max_amount_is_out_of_stock() {
    let h = Harness::new(FakeStock::new(&[(1, 5)]), Some(&blob(&[(1, i64::MAX)]))).await;
    let before = h.persisted().await;

    h.store.add_product(ProductId(1)).await;

    assert_eq!(h.amounts(), vec![(1, i64::MAX)]);
    assert_eq!(h.persisted().await, before);
    assert_eq!(h.notifier.take(), vec![OUT_OF_STOCK]);
    assert_eq!(h.store.totals().total_quantity, i64::MAX);
    assert_eq!(h.store.totals().subtotal, Money::from_cents(i64::MAX));
}

#[tokio::test]
async fn test_add_new_product_with_zero_stock_still_inserts() {
    let h = Harness::new(FakeStock::new(&[(2, 0)]), None).await;

    h.store.add_product(ProductId(2)).await;

    assert_eq!(h.amounts(), vec![(2, 1)]);
    assert!(h.notifier.take().is_empty());
}

#[tokio::test]
async fn test_add_appends_new_products_at_the_end() {
    let h = Harness::new(FakeStock::new(&[(1, 5), (2, 5), (3, 5)]), Some(&blob(&[(2, 1)]))).await;

    h.store.add_product(ProductId(3)).await;
    h.store.add_product(ProductId(1)).await;
    h.store.add_product(ProductId(2)).await;

    assert_eq!(h.amounts(), vec![(2, 2), (3, 1), (1, 1)]);
}

#[tokio::test]
async fn test_add_with_failing_stock_query() {
    let h = Harness::new(FakeStock::new(&[]), Some(&blob(&[(1, 1)]))).await;

    h.store.add_product(ProductId(1)).await;
    h.store.add_product(ProductId(8)).await;

    assert_eq!(h.amounts(), vec![(1, 1)]);
    assert_eq!(h.notifier.take(), vec![ADD_FAILED, ADD_FAILED]);
}

#[tokio::test]
async fn test_add_with_failing_product_lookup() {
    let h = Harness::new(FakeStock::new(&[(42, 10)]), None).await;

    h.store.add_product(ProductId(42)).await;

    assert!(h.store.cart().is_empty());
    assert_eq!(h.persisted().await, None);
    assert_eq!(h.notifier.take(), vec![ADD_FAILED]);
}

// =============================================================================
// remove_product
// =============================================================================

#[tokio::test]
async fn test_remove_last_product() {
    let h = Harness::new(FakeStock::default(), Some(&blob(&[(1, 1)]))).await;

    h.store.remove_product(ProductId(1)).await;

    assert!(h.store.cart().is_empty());
    assert_eq!(h.persisted().await.as_deref(), Some("[]"));
    assert!(h.notifier.take().is_empty());
}

#[tokio::test]
async fn test_remove_ignores_amount_and_keeps_order() {
    let h = Harness::new(FakeStock::default(), Some(&blob(&[(1, 1), (2, 7), (3, 2)]))).await;

    h.store.remove_product(ProductId(2)).await;

    assert_eq!(h.amounts(), vec![(1, 1), (3, 2)]);
}

#[tokio::test]
async fn test_remove_absent_product_never_changes_cart() {
    for items in [vec![], vec![(1, 1)], vec![(1, 2), (3, 1)]] {
        let h = Harness::new(FakeStock::default(), Some(&blob(&items))).await;
        let before = h.persisted().await;

        h.store.remove_product(ProductId(9)).await;

        assert_eq!(h.amounts(), items);
        assert_eq!(h.persisted().await, before);
        assert_eq!(h.notifier.take(), vec![REMOVE_FAILED]);
    }
}

// =============================================================================
// update_product_amount
// =============================================================================

#[tokio::test]
async fn test_update_keeps_position() {
    let h = Harness::new(FakeStock::new(&[(2, 10)]), Some(&blob(&[(1, 1), (2, 1)]))).await;

    h.store.update_product_amount(update(2, 5)).await;

    assert_eq!(h.amounts(), vec![(1, 1), (2, 5)]);
    assert!(h.notifier.take().is_empty());
    let restored = Cart::from_json(&h.persisted().await.unwrap()).unwrap();
    assert_eq!(&restored, h.store.cart().as_ref());
}

#[tokio::test]
async fn test_update_to_exact_stock_is_accepted() {
    let h = Harness::new(FakeStock::new(&[(1, 4)]), Some(&blob(&[(1, 1)]))).await;

    h.store.update_product_amount(update(1, 4)).await;

    assert_eq!(h.amounts(), vec![(1, 4)]);
}

#[tokio::test]
async fn test_update_rejections_report_out_of_stock() {
    for amount in [0, -1, -50, 6, 1000] {
        let h = Harness::new(FakeStock::new(&[(1, 5)]), Some(&blob(&[(1, 2)]))).await;

        h.store.update_product_amount(update(1, amount)).await;

        assert_eq!(h.amounts(), vec![(1, 2)], "amount {amount}");
        assert_eq!(h.notifier.take(), vec![OUT_OF_STOCK], "amount {amount}");
    }
}

#[tokio::test]
async fn test_update_absent_product_is_silent() {
    let h = Harness::new(FakeStock::new(&[(1, 5), (3, 5)]), Some(&blob(&[(1, 2)]))).await;
    let before = h.persisted().await;

    h.store.update_product_amount(update(3, 3)).await;
    h.store.update_product_amount(update(3, 0)).await;

    assert_eq!(h.amounts(), vec![(1, 2)]);
    assert_eq!(h.persisted().await, before);
    assert!(h.notifier.take().is_empty());
}

#[tokio::test]
async fn test_update_with_failing_stock_query() {
    let h = Harness::new(FakeStock::new(&[]), Some(&blob(&[(1, 2)]))).await;

    h.store.update_product_amount(update(1, 1)).await;
    // The stock query runs before the presence check.
    h.store.update_product_amount(update(7, 1)).await;

    assert_eq!(h.amounts(), vec![(1, 2)]);
    assert_eq!(h.notifier.take(), vec![UPDATE_FAILED, UPDATE_FAILED]);
}

#[tokio::test]
async fn test_stock_is_read_per_operation() {
    let h = Harness::new(FakeStock::new(&[(1, 1)]), None).await;

    h.store.add_product(ProductId(1)).await;
    h.store.add_product(ProductId(1)).await;
    assert_eq!(h.notifier.take(), vec![OUT_OF_STOCK]);

    h.stock.set(1, 3);
    h.store.add_product(ProductId(1)).await;
    assert_eq!(h.amounts(), vec![(1, 2)]);
}

// =============================================================================
// Persistence failures
// =============================================================================

#[tokio::test]
async fn test_failed_write_leaves_cart_unchanged() {
    let h = Harness::new(FakeStock::new(&[(1, 9), (2, 9)]), Some(&blob(&[(1, 1)]))).await;
    let mut updates = h.store.subscribe();
    let before = h.store.cart();
    h.kv.fail_writes(true);

    h.store.add_product(ProductId(1)).await;
    h.store.add_product(ProductId(2)).await;
    h.store.remove_product(ProductId(1)).await;
    h.store.update_product_amount(update(1, 3)).await;

    assert!(Arc::ptr_eq(&before, &h.store.cart()));
    assert!(!updates.has_changed().unwrap());
    assert_eq!(
        h.notifier.take(),
        vec![ADD_FAILED, ADD_FAILED, REMOVE_FAILED, UPDATE_FAILED]
    );

    h.kv.fail_writes(false);
    h.store.add_product(ProductId(1)).await;
    assert_eq!(h.amounts(), vec![(1, 2)]);
}

// =============================================================================
// Read surface
// =============================================================================

#[tokio::test]
async fn test_subscribers_see_committed_snapshots() {
    let h = Harness::new(FakeStock::new(&[(1, 5)]), None).await;
    let mut updates = h.store.subscribe();

    h.store.add_product(ProductId(1)).await;
    assert!(updates.has_changed().unwrap());
    assert_eq!(updates.borrow_and_update().item_count(), 1);

    h.store.remove_product(ProductId(3)).await;
    assert!(!updates.has_changed().unwrap());
}

#[tokio::test]
async fn test_snapshots_are_immutable() {
    let h = Harness::new(FakeStock::new(&[(1, 5)]), None).await;
    let old = h.store.cart();

    h.store.add_product(ProductId(1)).await;

    assert!(old.is_empty());
    assert_eq!(h.store.cart().item_count(), 1);
}

#[tokio::test]
async fn test_totals() {
    let h = Harness::new(FakeStock::default(), Some(&blob(&[(1, 2), (2, 1)]))).await;
    let totals = h.store.totals();

    assert_eq!(totals.item_count, 2);
    assert_eq!(totals.total_quantity, 3);
    assert_eq!(totals.subtotal, Money::from_cents(41_970));
    assert_eq!(totals.subtotal.to_string(), "R$ 419,70");
}

// =============================================================================
// Invariants and concurrency
// =============================================================================

#[tokio::test]
async fn test_mixed_operations_keep_invariants() {
    let h = Harness::new(FakeStock::new(&[(1, 2), (2, 3), (3, 1), (4, 0)]), None).await;

    for step in 0..40u64 {
        let id = ProductId(step % 5 + 1);
        match step % 4 {
            0 | 1 => h.store.add_product(id).await,
            2 => h.store.update_product_amount(update(id.0, (step as i64 % 6) - 2)).await,
            _ => h.store.remove_product(id).await,
        }
        assert_invariants(&h.store.cart());

        let persisted = h.persisted().await.unwrap_or_else(|| "[]".to_string());
        assert_eq!(&Cart::from_json(&persisted).unwrap(), h.store.cart().as_ref());
    }
}

#[tokio::test]
async fn test_concurrent_adds_race_and_last_publish_wins() {
    let h = Harness::new(FakeStock::gated(&[(1, 10)], 2), None).await;

    tokio::join!(h.store.add_product(ProductId(1)), h.store.add_product(ProductId(1)));

    // Both operations read the empty snapshot before either committed.
    assert_eq!(h.amounts(), vec![(1, 1)]);
    assert!(h.notifier.take().is_empty());
    assert_invariants(&h.store.cart());
}

#[tokio::test]
async fn test_overlapping_commits_leave_storage_matching_snapshot() {
    let h = Harness::new(FakeStock::new(&[(1, 10), (2, 10)]), None).await;
    h.kv.slow_next_write();

    tokio::join!(h.store.add_product(ProductId(1)), h.store.add_product(ProductId(2)));

    let persisted = h.persisted().await.unwrap();
    assert_eq!(&Cart::from_json(&persisted).unwrap(), h.store.cart().as_ref());
    assert!(h.notifier.take().is_empty());
}

#[tokio::test]
async fn test_store_is_shareable_across_tasks() {
    let kv: Arc<dyn PersistentKv> = Arc::new(MemoryKv::new());
    let collaborators = Collaborators {
        stock: Arc::new(FakeStock::new(&[(1, 100), (2, 100)])),
        catalog: Arc::new(common::FakeCatalog::new(&[1, 2])),
        kv,
        notifier: Arc::new(NoOpNotifier),
    };
    let store = Arc::new(
        CartStore::init(collaborators, &StorageSettings::default())
            .await
            .unwrap(),
    );

    let a = tokio::spawn({
        let store = store.clone();
        async move { store.add_product(ProductId(1)).await }
    });
    a.await.unwrap();

    let b = tokio::spawn({
        let store = store.clone();
        async move { store.add_product(ProductId(2)).await }
    });
    b.await.unwrap();

    assert_eq!(store.cart().item_count(), 2);
}
