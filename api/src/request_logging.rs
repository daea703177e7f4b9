use poem::http::HeaderValue;
use poem::{Endpoint, IntoResponse, Middleware, Request, Response};
use std::time::Instant;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Logs each request with method, path, status, duration and client IP, tagged with
/// a request id. The caller's `X-Request-Id` is reused when present, otherwise a
/// UUID is generated; either way it is echoed on the response.
pub struct RequestLogging;

impl<E: Endpoint> Middleware<E> for RequestLogging {
    type Output = RequestLoggingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RequestLoggingEndpoint { inner: ep }
    }
}

pub struct RequestLoggingEndpoint<E> {
    inner: E,
}

fn request_id(req: &Request) -> String {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= 128)
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

impl<E: Endpoint> Endpoint for RequestLoggingEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> poem::Result<Self::Output> {
        let start = Instant::now();
        let request_id = request_id(&req);
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let client_ip = req
            .remote_addr()
            .as_socket_addr()
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let response = self.inner.call(req).await;
        let duration_ms = start.elapsed().as_millis();

        match response {
            Ok(resp) => {
                let mut resp = resp.into_response();
                let status = resp.status();

                if status.is_client_error() || status.is_server_error() {
                    tracing::warn!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        status = %status.as_u16(),
                        duration_ms = %duration_ms,
                        client_ip = %client_ip,
                        "request failed"
                    );
                } else {
                    tracing::info!(
                        request_id = %request_id,
                        method = %method,
                        path = %path,
                        status = %status.as_u16(),
                        duration_ms = %duration_ms,
                        client_ip = %client_ip,
                        "request completed"
                    );
                }

                if let Ok(value) = HeaderValue::from_str(&request_id) {
                    resp.headers_mut().insert(REQUEST_ID_HEADER, value);
                }
                Ok(resp)
            }
            Err(err) => {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    status = %err.status().as_u16(),
                    duration_ms = %duration_ms,
                    client_ip = %client_ip,
                    error = %err,
                    "request error"
                );
                Err(err)
            }
        }
    }
}
