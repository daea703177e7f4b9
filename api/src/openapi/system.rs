use super::common::ApiTags;
use crate::inventory::ListingService;
use poem::web::Data;
use poem_openapi::{payload::Json, ApiResponse, Object, OpenApi};
use std::sync::Arc;

/// Serving backend and how many listings it holds
#[derive(Debug, Object)]
#[oai(skip_serializing_if_is_none)]
pub struct HealthResponse {
    /// `ok`, or `unavailable` when the backend cannot be read
    pub status: String,
    /// `sqlite` for the database, `snapshot` for a `serve --snapshot` CSV
    pub backend: String,
    pub listings: Option<u64>,
    pub environment: String,
    pub error: Option<String>,
}

#[derive(ApiResponse)]
pub enum HealthCheckResponse {
    #[oai(status = 200)]
    Ok(Json<HealthResponse>),
    #[oai(status = 503)]
    Unavailable(Json<HealthResponse>),
}

pub struct SystemApi;

#[OpenApi]
impl SystemApi {
    /// Health check
    ///
    /// Reports the serving backend and its listing count. Returns 503 when the
    /// backend cannot be read.
    #[oai(path = "/health", method = "get", tag = "ApiTags::System")]
    async fn health(&self, service: Data<&Arc<ListingService>>) -> HealthCheckResponse {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let backend = service.backend().to_string();

        match service.count().await {
            Ok(listings) => HealthCheckResponse::Ok(Json(HealthResponse {
                status: "ok".to_string(),
                backend,
                listings: Some(listings as u64),
                environment,
                error: None,
            })),
            Err(e) => HealthCheckResponse::Unavailable(Json(HealthResponse {
                status: "unavailable".to_string(),
                backend,
                listings: None,
                environment,
                error: Some(e.to_string()),
            })),
        }
    }
}
