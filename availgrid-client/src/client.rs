use std::future::Future;

use availgrid_core::{AvailabilityService, BusyBlock, GridRequest, RawGrid};
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::convert::{build_grid_body, error_message, parse_grid};
use crate::error::ClientError;
use crate::types::{CreateStudent, GridResponse, StudentsResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

const REQUEST_FAILED: &str = "Request failed";
const DELETE_FAILED: &str = "Delete failed";

/// Client for the student availability service.
///
/// Every call is a single round trip with no retry; the caller decides
/// whether to try again.
#[derive(Debug, Clone)]
pub struct AvailabilityClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for AvailabilityClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl AvailabilityClient {
    /// Creates a client for the service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins path segments onto the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|e| ClientError::Url(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::Url(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &str,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = error_message(&body, fallback);
            debug!(status = status.as_u16(), %message, "request rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// Fetches the roster in service order.
    #[instrument(skip(self))]
    pub async fn list_students(&self) -> Result<Vec<String>, ClientError> {
        let url = self.endpoint(&["students"])?;
        let response: StudentsResponse = self.send(self.http.get(url), REQUEST_FAILED).await?;
        debug!(count = response.students.len(), "received roster");
        Ok(response.students)
    }

    #[instrument(skip(self))]
    pub async fn add_student(&self, name: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["students"])?;
        let request = self.http.post(url).json(&CreateStudent { name });
        self.send::<serde_json::Value>(request, REQUEST_FAILED).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_student(&self, name: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["students", name])?;
        self.send::<serde_json::Value>(self.http.delete(url), DELETE_FAILED)
            .await?;
        Ok(())
    }

    #[instrument(skip(self, block), fields(name = %block.name, day = %block.day))]
    pub async fn add_busy(&self, block: &BusyBlock) -> Result<(), ClientError> {
        let url = self.endpoint(&["busy"])?;
        self.send::<serde_json::Value>(self.http.post(url).json(block), REQUEST_FAILED)
            .await?;
        Ok(())
    }

    /// Queries the free/busy grid and checks its shape.
    #[instrument(skip(self, request), fields(days = request.days.len(), slot = request.slot_minutes))]
    pub async fn fetch_grid(&self, request: &GridRequest) -> Result<RawGrid, ClientError> {
        let url = self.endpoint(&["availability-grid"])?;
        let body = build_grid_body(request);
        debug!("Sending grid query");
        let response: GridResponse = self
            .send(self.http.post(url).json(&body), REQUEST_FAILED)
            .await?;
        Ok(parse_grid(response)?)
    }
}

impl AvailabilityService for AvailabilityClient {
    type Error = ClientError;

    fn list_students(&self) -> impl Future<Output = Result<Vec<String>, ClientError>> + Send {
        AvailabilityClient::list_students(self)
    }

    fn add_student(&self, name: &str) -> impl Future<Output = Result<(), ClientError>> + Send {
        AvailabilityClient::add_student(self, name)
    }

    fn delete_student(&self, name: &str) -> impl Future<Output = Result<(), ClientError>> + Send {
        AvailabilityClient::delete_student(self, name)
    }

    fn add_busy(&self, block: &BusyBlock) -> impl Future<Output = Result<(), ClientError>> + Send {
        AvailabilityClient::add_busy(self, block)
    }

    fn fetch_grid(
        &self,
        request: &GridRequest,
    ) -> impl Future<Output = Result<RawGrid, ClientError>> + Send {
        AvailabilityClient::fetch_grid(self, request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use availgrid_core::{GridRequest, Session};

    #[test]
    fn test_client_creation() {
        let client = AvailabilityClient::default();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_client_custom_base_url() {
        let client = AvailabilityClient::new("https://shifts.example.com/api");
        assert_eq!(client.base_url, "https://shifts.example.com/api");
    }

    #[test]
    fn endpoint_encodes_names() {
        let client = AvailabilityClient::new("http://localhost:8000");
        let url = client.endpoint(&["students", "Mary Jane/2"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/students/Mary%20Jane%2F2");
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let client = AvailabilityClient::new("https://shifts.example.com/api/");
        let url = client.endpoint(&["availability-grid"]).unwrap();
        assert_eq!(url.as_str(), "https://shifts.example.com/api/availability-grid");
    }

    #[test]
    fn invalid_base_url_is_reported() {
        let client = AvailabilityClient::new("not a url");
        assert!(matches!(
            client.endpoint(&["students"]),
            Err(ClientError::Url(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let client = AvailabilityClient::new("http://127.0.0.1:9");
        let err = client.list_students().await.unwrap_err();
        assert!(matches!(err, ClientError::Http(_)));
    }

    #[tokio::test]
    #[ignore = "requires the availability service on AVAILGRID_URL"]
    async fn test_live_service() {
        let url = std::env::var("AVAILGRID_URL").expect("AVAILGRID_URL not set");
        let client = AvailabilityClient::new(url);

        let mut session = Session::new(GridRequest::default());
        session.load(&client).await.unwrap();
        if !session.selection().is_empty() {
            session.load_grid(&client).await.unwrap();
            assert!(session.grid().is_some());
        }
    }
}
