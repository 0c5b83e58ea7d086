use reqwest::{Client, Method, StatusCode};
use serde_json::Value;

use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::supabase::models::{
    DeviceInsert, DevicePatch, DeviceRow, DeviceStatsRow, ReadingInsert, ReadingRow,
};
use crate::supabase::query::{TableQuery, rpc_path};

/// `Prefer` header values understood by PostgREST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefer {
    /// Return the affected rows in the response body.
    Representation,
    /// Return an exact total in the `Content-Range` response header.
    CountExact,
}

impl Prefer {
    fn header_value(self) -> &'static str {
        match self {
            Self::Representation => "return=representation",
            Self::CountExact => "count=exact",
        }
    }
}

/// Decoded success outcome of one request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    /// Parsed JSON body. `Value::Null` for empty bodies (204 deletes).
    pub body: Value,
    /// Raw `Content-Range` header, present on exact-count responses.
    pub content_range: Option<String>,
}

pub struct SupabaseClient {
    http_client: Client,
    base_url: String,
    service_key: String,
}

impl SupabaseClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let http_client = Client::builder()
            .timeout(config.http_timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            service_key: config.supabase_key.clone(),
        }
    }

    /// Issue one request against the service.
    ///
    /// `path` is relative to the base URL (`/rest/v1/...`). Both
    /// authentication headers are attached to every request; bodies are
    /// serialized as JSON with the matching `Content-Type`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` for any non-2xx status (carrying the exact
    /// status code and raw body text), `ApiError::Transport` when no HTTP
    /// response was obtained, and `ApiError::Decode` when a success body is
    /// not valid JSON.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        prefer: Option<Prefer>,
    ) -> ApiResult<ApiResponse> {
        let url = format!("{}{}", self.base_url, path);

        let mut builder = self
            .http_client
            .request(method, &url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key);

        if let Some(prefer) = prefer {
            builder = builder.header("Prefer", prefer.header_value());
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(format!("Request failed: {e}")))?;

        let status = response.status();
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);

        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(ApiError::Http { status, body: text });
        }

        if text.trim().is_empty() {
            return Ok(ApiResponse {
                status,
                body: Value::Null,
                content_range,
            });
        }

        let body = serde_json::from_str(&text).map_err(|e| {
            tracing::error!(
                error = %e,
                body_preview = %text.chars().take(500).collect::<String>(),
                "Success response body is not valid JSON"
            );
            ApiError::Decode(e.to_string())
        })?;

        Ok(ApiResponse {
            status,
            body,
            content_range,
        })
    }

    /// List devices matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the rows do not decode.
    pub async fn list_devices(&self, query: &TableQuery) -> ApiResult<Vec<DeviceRow>> {
        let response = self
            .request(Method::GET, &query.to_path("devices"), None, None)
            .await?;
        decode_rows(response.body)
    }

    /// Look up a single device by id. `Ok(None)` when no row is visible,
    /// which under row-level security is not the same as "does not exist".
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn find_device(&self, id: &str) -> ApiResult<Option<DeviceRow>> {
        let query = TableQuery::new().filter_eq("id", id);
        Ok(self.list_devices(&query).await?.into_iter().next())
    }

    /// Insert a device row. A uniqueness conflict surfaces as
    /// `ApiError::Http` with status 409; creation paths check `is_conflict`
    /// to treat it as "already exists".
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn insert_device(
        &self,
        device: &DeviceInsert,
        prefer: Option<Prefer>,
    ) -> ApiResult<Vec<DeviceRow>> {
        let body = to_json(device)?;
        let response = self
            .request(Method::POST, "/rest/v1/devices", Some(&body), prefer)
            .await?;
        if response.body.is_null() {
            return Ok(Vec::new());
        }
        decode_rows(response.body)
    }

    /// Patch a device by id and return the updated representation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn update_device(&self, id: &str, patch: &DevicePatch) -> ApiResult<Vec<DeviceRow>> {
        let path = TableQuery::new().filter_eq("id", id).to_path("devices");
        let body = to_json(patch)?;
        let response = self
            .request(Method::PATCH, &path, Some(&body), Some(Prefer::Representation))
            .await?;
        if response.body.is_null() {
            return Ok(Vec::new());
        }
        decode_rows(response.body)
    }

    /// Delete a device by id. The service answers 204 with an empty body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn delete_device(&self, id: &str) -> ApiResult<()> {
        let path = TableQuery::new().filter_eq("id", id).to_path("devices");
        self.request(Method::DELETE, &path, None, None).await?;
        Ok(())
    }

    /// Insert a sensor reading.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn insert_reading(&self, reading: &ReadingInsert) -> ApiResult<()> {
        let body = to_json(reading)?;
        self.request(Method::POST, "/rest/v1/sensor_data", Some(&body), None)
            .await?;
        Ok(())
    }

    /// List sensor readings matching `query`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the rows do not decode.
    pub async fn list_readings(&self, query: &TableQuery) -> ApiResult<Vec<ReadingRow>> {
        let response = self
            .request(Method::GET, &query.to_path("sensor_data"), None, None)
            .await?;
        decode_rows(response.body)
    }

    /// List rows of the `device_stats` view.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the rows do not decode.
    pub async fn list_device_stats(&self, query: &TableQuery) -> ApiResult<Vec<DeviceStatsRow>> {
        let response = self
            .request(Method::GET, &query.to_path("device_stats"), None, None)
            .await?;
        decode_rows(response.body)
    }

    /// Fetch untyped rows from any table or view, for exploring schemas
    /// whose columns are not known up front.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the body is not an array
    /// of objects.
    pub async fn fetch_rows(
        &self,
        table: &str,
        query: &TableQuery,
    ) -> ApiResult<Vec<serde_json::Map<String, Value>>> {
        let response = self
            .request(Method::GET, &query.to_path(table), None, None)
            .await?;
        decode_rows(response.body)
    }

    /// Exact row count for a table, read from the `Content-Range` response
    /// header. `Ok(None)` when the service omits the header or it does not
    /// carry a total.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn count_rows(&self, table: &str) -> ApiResult<Option<u64>> {
        let path = TableQuery::new().select("count").to_path(table);
        let response = self
            .request(Method::GET, &path, None, Some(Prefer::CountExact))
            .await?;
        Ok(response.content_range.as_deref().and_then(content_range_total))
    }

    /// Call a remote procedure under `/rest/v1/rpc/`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` with status 404 for a procedure that does
    /// not exist; callers probing for procedures check `is_not_found`.
    pub async fn rpc(&self, name: &str, args: &Value) -> ApiResult<Value> {
        let response = self
            .request(Method::POST, &rpc_path(name), Some(args), None)
            .await?;
        Ok(response.body)
    }

    /// Fetch the PostgREST introspection document at the service root.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    pub async fn service_root(&self) -> ApiResult<Value> {
        let response = self.request(Method::GET, "/rest/v1/", None, None).await?;
        Ok(response.body)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> ApiResult<Value> {
    serde_json::to_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn decode_rows<T: serde::de::DeserializeOwned>(body: Value) -> ApiResult<Vec<T>> {
    serde_json::from_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Total row count from a `Content-Range` header.
///
/// PostgREST answers exact-count requests with `0-24/3573` (or `*/0` for an
/// empty table); the total follows the slash.
#[must_use]
pub fn content_range_total(range: &str) -> Option<u64> {
    range.rsplit('/').next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::content_range_total;

    #[test]
    fn content_range_totals_parse() {
        assert_eq!(content_range_total("0-24/3573"), Some(3573));
        assert_eq!(content_range_total("*/0"), Some(0));
        assert_eq!(content_range_total("0-24/*"), None);
        assert_eq!(content_range_total("garbage"), None);
    }
}
