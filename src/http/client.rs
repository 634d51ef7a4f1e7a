//! Thin JSON-over-HTTP client that maps failures onto [`ResolveError`].

use anyhow::Result;
use log::debug;
use reqwest::header::{ACCEPT, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::error::ResolveError;

/// HTTP client shared by the catalog providers.
///
/// Each call sends exactly one request. There is no retry: a transport
/// failure or a non-success status is returned to the caller as is.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    accept: Option<HeaderValue>,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            accept: None,
        }
    }

    /// Sends `accept` as the `Accept` header on every request.
    pub fn with_accept(mut self, accept: &'static str) -> Self {
        self.accept = Some(HeaderValue::from_static(accept));
        self
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Performs a GET request and deserializes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);
        self.fetch_json(url, self.client.get(url)).await
    }

    /// Performs a GET request with query parameters and deserializes the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);
        self.fetch_json(url, self.client.get(url).query(query)).await
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        request: RequestBuilder,
    ) -> Result<T> {
        let request = match &self.accept {
            Some(accept) => request.header(ACCEPT, accept.clone()),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| ResolveError::transport(url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ResolveError::transport(url, e))?;

        if !status.is_success() {
            debug!("{} answered with status {}", url, status);
            return Err(ResolveError::upstream(url, status, &body).into());
        }

        let parsed = serde_json::from_str(&body).map_err(|e| ResolveError::malformed(url, e))?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[derive(serde::Deserialize, Debug, PartialEq)]
    struct TestResponse {
        name: String,
        value: i32,
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name": "test", "value": 42}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: TestResponse = client.get_json(&format!("{}/test", url)).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.name, "test");
        assert_eq!(result.value, 42);
    }

    #[tokio::test]
    async fn test_get_json_not_found_is_upstream_error() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(404)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let err = client
            .get_json::<serde_json::Value>(&format!("{}/test", url))
            .await
            .unwrap_err();

        mock.assert_async().await;
        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::Upstream {
                status: StatusCode::NOT_FOUND,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_get_json_server_error_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result = client
            .get_json::<serde_json::Value>(&format!("{}/test", url))
            .await;

        mock.assert_async().await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_json_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let _mock = server
            .mock("GET", "/test")
            .with_status(200)
            .with_body(r#"{"name": "test"}"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let err = client
            .get_json::<TestResponse>(&format!("{}/test", url))
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::Malformed { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_json_transport_error() {
        let client = HttpClient::new(Client::new());
        // Port 9 (discard) on localhost is not expected to accept HTTP.
        let err = client
            .get_json::<serde_json::Value>("http://127.0.0.1:9/test")
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ResolveError>(),
            Some(ResolveError::Transport { .. })
        ));
    }

    #[tokio::test]
    async fn test_get_json_with_query_success() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test?page=1&per_page=10")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["item1", "item2"]"#)
            .create_async()
            .await;

        let client = HttpClient::new(Client::new());
        let result: Vec<String> = client
            .get_json_with_query(
                &format!("{}/test", url),
                &[("page", "1"), ("per_page", "10")],
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result, vec!["item1", "item2"]);
    }

    #[tokio::test]
    async fn test_accept_header_is_sent() {
        let mut server = mockito::Server::new_async().await;
        let url = server.url();

        let mock = server
            .mock("GET", "/test")
            .match_header("accept", "application/vnd.github+json")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = HttpClient::new(Client::new()).with_accept("application/vnd.github+json");
        let result: Vec<String> = client.get_json(&format!("{}/test", url)).await.unwrap();

        mock.assert_async().await;
        assert!(result.is_empty());
    }
}
