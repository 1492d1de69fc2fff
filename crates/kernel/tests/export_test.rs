#![allow(clippy::unwrap_used, clippy::expect_used)]
//! End-to-end export with the bundled plugins over seeded in-memory storage.

use std::collections::HashMap;
use std::path::PathBuf;

use tessera_kernel::config::Config;
use tessera_kernel::state::AppState;
use tessera_test_utils::assert;
use uuid::Uuid;

mod common;
use common::document_json;

const SITE: &str = "0190c6d2-8f1e-7cc3-9d0a-5b2e4f6a7b8c";
const BARE_SITE: &str = "0190c6d2-8f1e-7cc3-9d0a-000000000002";

const SEED: &str = r#"{
    "sites": [
        {
            "id": "0190c6d2-8f1e-7cc3-9d0a-5b2e4f6a7b8c",
            "plugins": [
                {"system_name": "tours", "configuration": {"limit": 1}},
                {"system_name": "products", "configuration": {"currency": "EUR"}},
                {"system_name": "pages"},
                {"system_name": "newsletter"}
            ],
            "records": {
                "page": [
                    {"data": {"title": "About", "slug": "about", "body": "Hi"}, "weight": 1},
                    {"data": {"title": "Home", "slug": "home"}, "weight": 0},
                    {"data": {"title": "Draft", "slug": "draft"}, "published": false}
                ],
                "product": [
                    {"data": {"name": "Mug", "sku": "M-1", "price": 1250, "stock": 3}},
                    {"data": {"name": "Poster", "sku": "P-1", "price": 900}}
                ],
                "tour": [
                    {"data": {"title": "Autumn", "starts_on": "2026-10-01", "duration_days": 3}},
                    {"data": {"title": "Spring", "starts_on": "2026-04-01"}}
                ]
            }
        },
        {
            "id": "0190c6d2-8f1e-7cc3-9d0a-000000000002",
            "plugins": [
                {"system_name": "products"},
                {"system_name": "pages"}
            ]
        }
    ]
}"#;

fn write_seed(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("tessera-{name}-{}.json", Uuid::now_v7()));
    std::fs::write(&path, SEED).unwrap();
    path
}

fn config(seed: &std::path::Path, disabled: &str) -> Config {
    let vars = HashMap::from([
        ("SEED_FILE", seed.display().to_string()),
        ("DISABLED_PLUGINS", disabled.to_string()),
    ]);
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

#[tokio::test]
async fn bundled_plugins_export_seeded_site() {
    let seed = write_seed("full");
    let state = AppState::new(&config(&seed, "")).await.unwrap();
    std::fs::remove_file(&seed).ok();

    let doc = state
        .aggregator()
        .generate_site_document(SITE.parse().unwrap())
        .await
        .unwrap();
    let json = document_json(&doc.to_json().unwrap());

    assert::content_keys(&json, &["pages", "products", "tours"]);
    assert::omitted_with(&json, "newsletter", "plugin_missing");

    let pages: Vec<&str> = json["content"]["pages"]["pages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(pages, vec!["Home", "About"]);

    let products = &json["content"]["products"];
    assert_eq!(products["currency"], "EUR");
    assert_eq!(products["products"].as_array().unwrap().len(), 1);
    assert_eq!(products["products"][0]["price"], "12.50");
    assert_eq!(products["products"][0]["inStock"], true);

    let tours = json["content"]["tours"]["tours"].as_array().unwrap();
    assert_eq!(tours.len(), 1);
    assert_eq!(tours[0]["title"], "Spring");
    assert_eq!(tours[0]["startsOn"], "2026-04-01");
    assert_eq!(tours[0]["durationDays"], 1);
}

#[tokio::test]
async fn missing_configuration_and_content_are_omitted() {
    let seed = write_seed("bare");
    let state = AppState::new(&config(&seed, "")).await.unwrap();
    std::fs::remove_file(&seed).ok();

    let doc = state
        .aggregator()
        .generate_site_document(BARE_SITE.parse().unwrap())
        .await
        .unwrap();
    let json = document_json(&doc.to_json().unwrap());

    assert::content_keys(&json, &[]);
    assert::omitted_with(&json, "pages", "content_unavailable");
    assert::omitted_with(&json, "products", "configuration_invalid");

    let omitted: Vec<&str> = doc.omitted.iter().map(|o| o.system_name.as_str()).collect();
    assert_eq!(omitted, vec!["pages", "products"]);
}

#[tokio::test]
async fn disabled_bundled_plugin_is_reported_missing() {
    let seed = write_seed("disabled");
    let state = AppState::new(&config(&seed, "products")).await.unwrap();
    std::fs::remove_file(&seed).ok();

    assert!(!state.registry().contains("products"));

    let doc = state
        .aggregator()
        .generate_site_document(SITE.parse().unwrap())
        .await
        .unwrap();
    let json = document_json(&doc.to_json().unwrap());

    assert::content_keys(&json, &["pages", "tours"]);
    assert::omitted_with(&json, "products", "plugin_missing");
}
