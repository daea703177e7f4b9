mod database;
mod import;
mod inventory;
mod openapi;
mod request_logging;

use clap::{Parser, Subcommand};
use database::{Database, DEFAULT_DATABASE_URL};
use inventory::{ListingService, MemoryExecutor, QueryExecutor};
use poem::{listener::TcpListener, middleware::Cors, Endpoint, EndpointExt, Route, Server};
use poem_openapi::OpenApiService;
use request_logging::RequestLogging;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "api-server")]
#[command(about = "Dedicated server inventory API")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Serve a read-only CSV snapshot instead of the database
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Import listings from a CSV file into the database
    Import {
        /// CSV file with model, ram, hdd, location and price columns
        path: PathBuf,
    },
    /// Check database connectivity and schema
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let cli = Cli::parse();

    // Load .env file if it exists
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Serve { snapshot } => serve_command(snapshot.as_deref()).await,
        Commands::Import { path } => import_command(&path).await,
        Commands::Doctor => doctor_command().await,
    }
}

async fn open_database() -> Result<Database, std::io::Error> {
    let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    match Database::new(&database_url).await {
        Ok(db) => {
            tracing::info!("Database initialized at {}", database_url);
            Ok(db)
        }
        Err(e) => {
            tracing::error!("Failed to initialize database at {}: {:#}", database_url, e);
            Err(std::io::Error::other(format!(
                "Database initialization failed: {:#}",
                e
            )))
        }
    }
}

async fn setup_executor(snapshot: Option<&Path>) -> Result<Arc<dyn QueryExecutor>, std::io::Error> {
    match snapshot {
        Some(path) => {
            let listings = import::load_snapshot(path)
                .map_err(|e| std::io::Error::other(format!("{:#}", e)))?;
            tracing::info!(
                "Serving {} listings from snapshot {}",
                listings.len(),
                path.display()
            );
            Ok(Arc::new(MemoryExecutor::new(listings)))
        }
        None => Ok(Arc::new(open_database().await?)),
    }
}

fn app(service: Arc<ListingService>) -> impl Endpoint {
    let api_service = OpenApiService::new(
        openapi::create_combined_api(),
        "Server Inventory API",
        env!("CARGO_PKG_VERSION"),
    )
    .server("/api/v1");
    let swagger_ui = api_service.swagger_ui();
    let spec = api_service.spec_endpoint();

    Route::new()
        .nest("/api/v1", api_service)
        .at("/openapi.json", spec)
        .nest("/swagger-ui", swagger_ui)
        .data(service)
        .with(Cors::new())
        .with(RequestLogging)
}

async fn serve_command(snapshot: Option<&Path>) -> Result<(), std::io::Error> {
    let port = env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);

    let executor = setup_executor(snapshot).await?;
    let service = Arc::new(ListingService::new(executor));

    tracing::info!("Starting server inventory API on {}", addr);
    Server::new(TcpListener::bind(&addr)).run(app(service)).await
}

async fn import_command(path: &Path) -> Result<(), std::io::Error> {
    let db = open_database().await?;
    let report = db
        .import_listings_csv(path)
        .await
        .map_err(|e| std::io::Error::other(format!("{:#}", e)))?;

    for (row, message) in &report.errors {
        tracing::warn!("Row {} not imported: {}", row, message);
    }
    tracing::info!(
        "Imported {} listings from {} ({} rows failed)",
        report.imported,
        path.display(),
        report.errors.len()
    );
    Ok(())
}

async fn doctor_command() -> Result<(), std::io::Error> {
    let db = open_database().await?;
    match db.count_listings().await {
        Ok(count) => {
            tracing::info!("Schema OK: {} listings in servers table", count);
            Ok(())
        }
        Err(e) => {
            tracing::error!("Schema check failed: {:#}", e);
            Err(std::io::Error::other(format!("{:#}", e)))
        }
    }
}

#[cfg(test)]
mod main_tests;
