use crate::database::test_helpers::{listing, sample_listings, setup_test_db};
use crate::database::Database;
use crate::inventory::{
    build_predicates, Column, FilterCriteria, Predicate, PredicateSet, QueryExecutor, Window,
};

async fn seeded_db() -> Database {
    let db = setup_test_db().await;
    for listing in sample_listings() {
        db.upsert_listing(&listing).await.unwrap();
    }
    db
}

fn criteria(pairs: &[(&str, &str)]) -> FilterCriteria {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn ids(listings: &[crate::database::ServerListing]) -> Vec<&str> {
    listings.iter().map(|l| l.id.as_str()).collect()
}

#[tokio::test]
async fn test_list_all_without_window_returns_everything_ordered() {
    let db = seeded_db().await;

    let listings = db.list_all(None).await.unwrap();
    assert_eq!(
        ids(&listings),
        vec!["srv-001", "srv-002", "srv-003", "srv-004", "srv-005", "srv-006", "srv-007"]
    );
}

#[tokio::test]
async fn test_list_all_with_window() {
    let db = seeded_db().await;

    let page = db
        .list_all(Window::from_page(Some(2), Some(3)))
        .await
        .unwrap();
    assert_eq!(ids(&page), vec!["srv-004", "srv-005", "srv-006"]);

    let past_end = db
        .list_all(Window::from_page(Some(5), Some(3)))
        .await
        .unwrap();
    assert!(past_end.is_empty());
}

#[tokio::test]
async fn test_filtered_substring_is_case_insensitive() {
    let db = seeded_db().await;

    let predicates = build_predicates(&criteria(&[("location", "amsterdam")])).unwrap();
    let listings = db.filtered(&predicates).await.unwrap();
    assert_eq!(ids(&listings), vec!["srv-001", "srv-002", "srv-004"]);
}

#[tokio::test]
async fn test_filtered_ram_substring() {
    let db = seeded_db().await;

    let predicates = build_predicates(&criteria(&[("ram", "16GB")])).unwrap();
    let listings = db.filtered(&predicates).await.unwrap();
    assert_eq!(ids(&listings), vec!["srv-001", "srv-005"]);
}

#[tokio::test]
async fn test_filtered_storage_uses_total_capacity() {
    let db = seeded_db().await;

    // 2x250GB SATA2 = 500GB is in, 4x480GBSSD = 1920GB and 1x1TB = 1024GB are out.
    // The unparseable "unknown" descriptor counts as 0GB.
    let predicates = build_predicates(&criteria(&[("storage", "500GB")])).unwrap();
    let listings = db.filtered(&predicates).await.unwrap();
    assert_eq!(ids(&listings), vec!["srv-005", "srv-007"]);

    let predicates = build_predicates(&criteria(&[("storage", "2TB")])).unwrap();
    let listings = db.filtered(&predicates).await.unwrap();
    assert_eq!(
        ids(&listings),
        vec!["srv-004", "srv-005", "srv-006", "srv-007"]
    );
}

#[tokio::test]
async fn test_filtered_combines_sql_and_capacity_predicates() {
    let db = seeded_db().await;

    let predicates = build_predicates(&criteria(&[
        ("location", "AMS"),
        ("storage", "4TB"),
    ]))
    .unwrap();
    let listings = db.filtered(&predicates).await.unwrap();
    // srv-001 has 2x2TB = 4096GB, srv-004 has 1920GB; srv-002 has 16TB
    assert_eq!(ids(&listings), vec!["srv-001", "srv-004"]);
}

#[tokio::test]
async fn test_filtered_operands_are_not_sql_or_like_patterns() {
    let db = seeded_db().await;

    for hostile in ["%", "_", "' OR '1'='1", "AMS'; DROP TABLE servers; --"] {
        let mut predicates = PredicateSet::new();
        predicates.push(Predicate::contains(Column::Location, hostile));
        let listings = db.filtered(&predicates).await.unwrap();
        assert!(listings.is_empty(), "{hostile:?} should match nothing");
    }

    // Table is intact
    assert_eq!(db.list_all(None).await.unwrap().len(), 7);
}

#[tokio::test]
async fn test_filtered_without_predicates_matches_list_all() {
    let db = seeded_db().await;

    let filtered = db.filtered(&PredicateSet::new()).await.unwrap();
    let all = db.list_all(None).await.unwrap();
    assert_eq!(filtered, all);
}

#[tokio::test]
async fn test_upsert_replaces_fields_and_keeps_created_at() {
    let db = setup_test_db().await;
    let original = listing("srv-100", "Old model", "8GB", "1x500GB", "AMS-01");
    db.upsert_listing(&original).await.unwrap();

    let mut updated = listing("srv-100", "New model", "16GB", "2x500GB", "AMS-01");
    updated.created_at_ns = original.created_at_ns + 42;
    updated.updated_at_ns = original.updated_at_ns + 42;
    db.upsert_listing(&updated).await.unwrap();

    let listings = db.list_all(None).await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].model, "New model");
    assert_eq!(listings[0].hdd, "2x500GB");
    assert_eq!(listings[0].created_at_ns, original.created_at_ns);
    assert_eq!(listings[0].updated_at_ns, original.updated_at_ns + 42);
}

#[tokio::test]
async fn test_count_listings_counts_rows() {
    let db = seeded_db().await;
    assert_eq!(db.count_listings().await.unwrap(), 7);
    assert_eq!(db.count().await.unwrap(), 7);
    assert_eq!(db.backend(), "sqlite");
}

#[tokio::test]
async fn test_closed_pool_surfaces_error() {
    let db = seeded_db().await;
    db.pool().close().await;

    assert!(db.list_all(None).await.is_err());
    assert!(db.filtered(&PredicateSet::new()).await.is_err());
}
