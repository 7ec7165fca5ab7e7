// src/steam/client.rs
// =============================================================================
// The shared HTTP client for every Steam endpoint.
//
// One reqwest::Client is built up front and reused for every request
// (connection pooling). The API key is attached to Web API calls only and
// is never written to the logs.
// =============================================================================

use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::errors::FetchError;

const DEFAULT_API_BASE: &str = "https://api.steampowered.com";
const DEFAULT_STORE_BASE: &str = "https://store.steampowered.com";

pub struct SteamClient {
    http: Client,
    api_key: String,
    api_base: String,
    store_base: String,
}

impl SteamClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            api_base: DEFAULT_API_BASE.to_string(),
            store_base: DEFAULT_STORE_BASE.to_string(),
        })
    }

    /// Points Web API calls at a different host (a local mock, a proxy).
    pub fn with_api_base(mut self, base: &str) -> Self {
        self.api_base = base.trim_end_matches('/').to_string();
        self
    }

    pub fn with_store_base(mut self, base: &str) -> Self {
        self.store_base = base.trim_end_matches('/').to_string();
        self
    }

    /// Builds a Web API URL; `key` is always the first query parameter.
    pub(super) fn api_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        let mut url = Url::parse_with_params(
            &format!("{}/{}", self.api_base, path),
            &[("key", self.api_key.as_str())],
        )?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    pub(super) fn store_url(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, FetchError> {
        Ok(Url::parse_with_params(
            &format!("{}/{}", self.store_base, path),
            params,
        )?)
    }

    /// GETs a URL and returns the body, or the reason we couldn't.
    pub(super) async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url_puts_key_first() {
        let client = SteamClient::new("SECRET").unwrap();
        let url = client
            .api_url("ISteamUser/GetFriendList/v1/", &[("steamid", "42")])
            .unwrap();

        assert_eq!(
            url.as_str(),
            "https://api.steampowered.com/ISteamUser/GetFriendList/v1/?key=SECRET&steamid=42"
        );
    }

    #[test]
    fn test_custom_bases() {
        let client = SteamClient::new("k")
            .unwrap()
            .with_api_base("http://127.0.0.1:8080/")
            .with_store_base("http://127.0.0.1:9090");
        let url = client.store_url("api/appdetails", &[("appids", "10")]).unwrap();

        assert_eq!(url.as_str(), "http://127.0.0.1:9090/api/appdetails?appids=10");

        let url = client.api_url("x/", &[]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/x/?key=k");
    }

    // Answers exactly one request with the given status and body, returns the base URL
    async fn serve_once(status: &str, body: &str) -> String {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        format!("http://{}", addr)
    }

    fn client_for(base: &str) -> SteamClient {
        SteamClient::new("k").unwrap().with_api_base(base)
    }

    #[tokio::test]
    async fn test_success_body_is_parsed() {
        let base = serve_once("200 OK", r#"{"friendslist":{"friends":[{"steamid":"7"}]}}"#).await;

        let friends = client_for(&base).friend_list("1").await.unwrap();
        assert_eq!(friends, vec!["7"]);
    }

    #[tokio::test]
    async fn test_private_profile_status() {
        let base = serve_once("401 Unauthorized", "").await;

        let err = client_for(&base).friend_list("1").await.unwrap_err();
        assert!(matches!(err, FetchError::Status(401)));
        assert!(!err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_forbidden_means_bad_key() {
        let base = serve_once("403 Forbidden", "").await;

        let err = client_for(&base).friend_list("1").await.unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_server_error_status() {
        let base = serve_once("500 Internal Server Error", "").await;

        let client = client_for(&base);
        let url = client.api_url("anything/", &[]).unwrap();
        let err = client.get_text(url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(500)));
    }

    #[tokio::test]
    async fn test_refused_connection_is_transport() {
        // Grab a free port, then close it so nothing is listening
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client_for(&format!("http://{}", addr))
            .friend_list("1")
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
