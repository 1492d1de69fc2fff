#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Postgres storage adapters.
//!
//! These tests need a live database. Run them with
//! `DATABASE_URL=postgres://... cargo test -p tessera-kernel -- --ignored`.

use serde_json::json;
use sqlx::PgPool;
use tessera_kernel::db;
use tessera_kernel::enablement::{EnablementRecord, EnablementStore, PgEnablementStore};
use tessera_kernel::records::PgRecordStore;
use tessera_sdk::{Record, RecordSource};
use uuid::Uuid;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = db::create_pool(&url, 2).await.expect("Failed to connect");
    db::run_migrations(&pool).await.expect("Failed to migrate");
    pool
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn enablement_upsert_replaces_existing_row() {
    let store = PgEnablementStore::new(pool().await);
    let site = Uuid::now_v7();

    store
        .upsert(site, &EnablementRecord::enabled("products"))
        .await
        .unwrap();
    store
        .upsert(
            site,
            &EnablementRecord::disabled("products").with_configuration(r#"{"currency":"EUR"}"#),
        )
        .await
        .unwrap();

    let rows = store.get_enablement(site).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].enabled);
    assert_eq!(rows[0].configuration.as_deref(), Some(r#"{"currency":"EUR"}"#));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn enablement_rows_are_scoped_to_the_site() {
    let store = PgEnablementStore::new(pool().await);
    let site = Uuid::now_v7();
    let other = Uuid::now_v7();

    for name in ["tours", "pages"] {
        store.upsert(site, &EnablementRecord::enabled(name)).await.unwrap();
    }
    store
        .upsert(other, &EnablementRecord::enabled("products"))
        .await
        .unwrap();

    let mut names: Vec<String> = store
        .get_enablement(site)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.system_name)
        .collect();
    names.sort();
    assert_eq!(names, vec!["pages", "tours"]);

    assert!(store.get_enablement(Uuid::now_v7()).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn records_are_listed_by_weight_within_a_collection() {
    let store = PgRecordStore::new(pool().await);
    let site = Uuid::now_v7();

    let heavy = Record::new(json!({"title": "Second"})).weight(10);
    let light = Record::new(json!({"title": "First"})).weight(-1);
    store.upsert(site, "page", &heavy).await.unwrap();
    store.upsert(site, "page", &light).await.unwrap();
    store
        .upsert(site, "tour", &Record::new(json!({"venue": "Elsewhere"})))
        .await
        .unwrap();

    let pages = store.list(site, "page").await.unwrap();
    let titles: Vec<&str> = pages.iter().map(|r| r.data["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["First", "Second"]);
    assert_eq!(pages[0].id, light.id);

    let updated = heavy.clone().unpublished();
    store.upsert(site, "page", &updated).await.unwrap();
    let pages = store.list(site, "page").await.unwrap();
    assert_eq!(pages.len(), 2);
    assert!(!pages[1].published);
}
