/// Shared test helpers for database tests
use super::{Database, ServerListing};
use sqlx::sqlite::SqlitePoolOptions;

/// Set up an in-memory test database with all migrations applied.
///
/// The pool is capped at one connection: every `:memory:` connection is its own
/// database, so a second connection would see an empty schema.
pub async fn setup_test_db() -> Database {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory SQLite database");

    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Migration failed");

    Database { pool }
}

/// Build a listing with fixed timestamps
pub fn listing(id: &str, model: &str, ram: &str, hdd: &str, location: &str) -> ServerListing {
    ServerListing {
        id: id.to_string(),
        model: model.to_string(),
        ram: ram.to_string(),
        hdd: hdd.to_string(),
        location: location.to_string(),
        price: "€49.99".to_string(),
        created_at_ns: 1_700_000_000_000_000_000,
        updated_at_ns: 1_700_000_000_000_000_000,
    }
}

/// Listings resembling a real inventory export
pub fn sample_listings() -> Vec<ServerListing> {
    vec![
        listing("srv-001", "Dell R210Intel Xeon X3440", "16GBDDR3", "2x2TBSATA2", "AmsterdamAMS-01"),
        listing("srv-002", "HP DL180G62x Intel Xeon E5620", "32GBDDR3", "8x2TBSATA2", "AmsterdamAMS-01"),
        listing("srv-003", "HP DL380eG82x Intel Xeon E5-2420", "32GBDDR3", "8x2TBSATA2", "Washington D.C.WDC-01"),
        listing("srv-004", "RH2288v32x Intel Xeon E5-2650V4", "128GBDDR4", "4x480GBSSD", "AmsterdamAMS-01"),
        listing("srv-005", "Dell R210-IIIntel Xeon E3-1230v2", "16GBDDR3", "2x250GB SATA2", "San FranciscoSFO-12"),
        listing("srv-006", "IBM X36301x Intel Xeon E5620", "8GBDDR3", "1x1TB", "FrankfurtFRA-10"),
        listing("srv-007", "Legacy box", "4GB", "unknown", "SingaporeSIN-11"),
    ]
}
