//! The cart survives a restart when persisted through SQLite.

mod common;

use std::sync::Arc;

use common::{FakeCatalog, FakeStock};
use rocket_cart::{
    CartStore, ChannelNotifier, Collaborators, CorruptStatePolicy, StorageSettings, StoreError,
};
use rocket_core::{ProductId, UpdateProductAmount};
use rocket_db::{Database, DbConfig};

async fn open_store(db: &Database, storage: &StorageSettings) -> Result<CartStore, StoreError> {
    let (notifier, _rx) = ChannelNotifier::new();
    let collaborators = Collaborators {
        stock: Arc::new(FakeStock::new(&[(1, 5), (2, 5), (3, 5)])),
        catalog: Arc::new(FakeCatalog::new(&[1, 2, 3])),
        kv: Arc::new(db.kv()),
        notifier: Arc::new(notifier),
    };
    CartStore::init(collaborators, storage).await
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rocket-cart.db");
    let storage = StorageSettings::default();

    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    let store = open_store(&db, &storage).await.unwrap();
    store.add_product(ProductId(2)).await;
    store.add_product(ProductId(1)).await;
    store.add_product(ProductId(3)).await;
    store
        .update_product_amount(UpdateProductAmount {
            product_id: ProductId(1),
            amount: 4,
        })
        .await;
    store.remove_product(ProductId(3)).await;
    let before = store.cart();
    drop(store);
    db.close().await;

    let db = Database::new(DbConfig::new(&path)).await.unwrap();
    let store = open_store(&db, &storage).await.unwrap();

    assert_eq!(store.cart(), before);
    let amounts: Vec<_> = store.cart().iter().map(|p| (p.id.0, p.amount)).collect();
    assert_eq!(amounts, vec![(2, 1), (1, 4)]);
}

#[tokio::test]
async fn test_custom_storage_key_is_isolated() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let storage = StorageSettings {
        key: "cart:second-tab".to_string(),
        ..StorageSettings::default()
    };

    let store = open_store(&db, &storage).await.unwrap();
    store.add_product(ProductId(1)).await;

    assert!(db.kv().get(rocket_core::DEFAULT_CART_KEY).await.unwrap().is_none());
    assert!(db.kv().get("cart:second-tab").await.unwrap().is_some());
}

#[tokio::test]
async fn test_corrupt_row_with_fail_policy() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    db.kv()
        .set(rocket_core::DEFAULT_CART_KEY, "definitely not a cart")
        .await
        .unwrap();

    let strict = StorageSettings {
        on_corrupt_state: CorruptStatePolicy::Fail,
        ..StorageSettings::default()
    };
    assert!(matches!(
        open_store(&db, &strict).await,
        Err(StoreError::CorruptState(_))
    ));

    let store = open_store(&db, &StorageSettings::default()).await.unwrap();
    assert!(store.cart().is_empty());

    store.add_product(ProductId(1)).await;
    let blob = db.kv().get(rocket_core::DEFAULT_CART_KEY).await.unwrap().unwrap();
    assert!(blob.starts_with(r#"[{"id":1,"title":"Tênis 1""#));
    assert!(blob.ends_with(r#""amount":1}]"#));
}

#[tokio::test]
async fn test_notices_arrive_on_channel() {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    let (notifier, mut rx) = ChannelNotifier::new();
    let store = CartStore::init(
        Collaborators {
            stock: Arc::new(FakeStock::new(&[(1, 1)])),
            catalog: Arc::new(FakeCatalog::new(&[1])),
            kv: Arc::new(db.kv()),
            notifier: Arc::new(notifier),
        },
        &StorageSettings::default(),
    )
    .await
    .unwrap();

    store.add_product(ProductId(1)).await;
    store.add_product(ProductId(1)).await;
    store.remove_product(ProductId(2)).await;

    assert_eq!(rx.recv().await.unwrap(), "Quantidade solicitada fora de estoque");
    assert_eq!(rx.recv().await.unwrap(), "Erro na remoção do produto");
    assert!(rx.try_recv().is_err());
}
