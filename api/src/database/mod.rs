/// Default database URL for local development
pub const DEFAULT_DATABASE_URL: &str = "sqlite:./servers.db?mode=rwc";

pub mod core;
pub mod servers;
pub mod types;

pub use servers::ServerListing;
pub use types::Database;

#[cfg(test)]
pub mod test_helpers;
