use super::common::{ApiTags, ErrorResponse};
use crate::database::ServerListing;
use crate::inventory::{FilterCriteria, FilterError, ListingService, ServiceError};
use poem::web::Data;
use poem_openapi::{param::Query, payload::Json, ApiResponse, Object, OpenApi};
use std::sync::Arc;

#[derive(Debug, Object)]
pub struct ServerListResponse {
    pub data: Vec<ServerListing>,
}

#[derive(Debug, Object)]
pub struct FilteredServersResponse {
    pub count: u64,
    pub data: Vec<ServerListing>,
}

/// Filter body. Every field is optional; unknown fields are ignored.
#[derive(Debug, Default, Object)]
pub struct FilterRequest {
    /// Substring of the RAM description, e.g. `16GB`
    pub ram: Option<String>,
    /// Substring of the disk description, e.g. `SATA`
    pub hdd: Option<String>,
    /// Substring of the location, e.g. `AMS`
    pub location: Option<String>,
    /// Maximum total disk capacity, e.g. `500GB` or `2TB`
    pub storage: Option<String>,
}

impl FilterRequest {
    pub fn into_criteria(self) -> FilterCriteria {
        [
            ("ram", self.ram),
            ("hdd", self.hdd),
            ("location", self.location),
            ("storage", self.storage),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|v| (field.to_string(), v)))
        .collect()
    }
}

#[derive(ApiResponse)]
#[oai(bad_request_handler = "list_bad_request")]
pub enum ListServersResponse {
    #[oai(status = 200)]
    Ok(Json<ServerListResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

fn list_bad_request(err: poem::Error) -> ListServersResponse {
    ListServersResponse::BadRequest(Json(ErrorResponse::with_details(
        "Invalid pagination parameters",
        err,
    )))
}

#[derive(ApiResponse)]
#[oai(bad_request_handler = "filter_bad_request")]
pub enum FilterServersResponse {
    #[oai(status = 200)]
    Ok(Json<FilteredServersResponse>),
    #[oai(status = 400)]
    BadRequest(Json<ErrorResponse>),
    #[oai(status = 500)]
    InternalError(Json<ErrorResponse>),
}

fn filter_bad_request(err: poem::Error) -> FilterServersResponse {
    FilterServersResponse::BadRequest(Json(ErrorResponse::with_details(
        "Invalid request body",
        err,
    )))
}

pub struct ServersApi;

#[OpenApi]
impl ServersApi {
    /// List servers
    ///
    /// Returns all listings ordered by id. Pass both `page` (1-indexed) and `limit`
    /// to get a single page; otherwise the full set is returned.
    #[oai(path = "/servers", method = "get", tag = "ApiTags::Servers")]
    async fn list_servers(
        &self,
        service: Data<&Arc<ListingService>>,
        page: Query<Option<i64>>,
        limit: Query<Option<i64>>,
    ) -> ListServersResponse {
        match service.list(page.0, limit.0).await {
            Ok(data) => ListServersResponse::Ok(Json(ServerListResponse { data })),
            Err(ServiceError::StorageUnavailable(e)) => {
                ListServersResponse::InternalError(Json(ErrorResponse::new(e.to_string())))
            }
            Err(e @ ServiceError::InvalidFilterValue(_)) => {
                ListServersResponse::BadRequest(Json(ErrorResponse::new(e.to_string())))
            }
        }
    }

    /// Filter servers
    ///
    /// Matches `ram`, `hdd` and `location` as case-insensitive substrings, and
    /// `storage` as an upper bound on total disk capacity. All given fields must match.
    #[oai(path = "/servers/filter", method = "post", tag = "ApiTags::Servers")]
    async fn filter_servers(
        &self,
        service: Data<&Arc<ListingService>>,
        body: Json<FilterRequest>,
    ) -> FilterServersResponse {
        match service.filter(&body.0.into_criteria()).await {
            Ok(result) => FilterServersResponse::Ok(Json(FilteredServersResponse {
                count: result.count as u64,
                data: result.data,
            })),
            Err(ServiceError::InvalidFilterValue(FilterError::InvalidFilterValue {
                field,
                source,
            })) => FilterServersResponse::BadRequest(Json(ErrorResponse::with_details(
                format!("Invalid {} format", field),
                source,
            ))),
            Err(ServiceError::StorageUnavailable(e)) => FilterServersResponse::InternalError(
                Json(ErrorResponse::with_details("Failed to retrieve servers", e)),
            ),
        }
    }
}
