//! HTTP client for the Collins `/api/assets` find endpoint.
//!
//! Each page is fetched over its own HTTP/1.1 connection with Basic auth and
//! a per-request timeout.

use std::future::Future;
use std::time::Duration;

use base64::Engine;
use bytes::Bytes;
use http::Uri;
use http_body_util::{BodyExt, Empty};
use tracing::debug;

use crate::config::CollinsConfig;
use crate::error::{ClientError, ClientResult};
use crate::types::{decode_error_message, decode_find_response, AssetPage};

/// Backend query interface: one page of assets matching a CQL query.
pub trait AssetFinder: Send + Sync {
    fn find(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> impl Future<Output = ClientResult<AssetPage>> + Send;
}

/// Collins API client.
#[derive(Debug, Clone)]
pub struct CollinsClient {
    /// `host:port` to connect to.
    address: String,
    /// Value of the `Host` header.
    authority: String,
    /// Path prefix Collins is mounted under (no trailing slash).
    base_path: String,
    authorization: String,
    timeout: Duration,
}

impl CollinsClient {
    /// Create a client from a credentials config.
    pub fn new(config: &CollinsConfig) -> ClientResult<Self> {
        let uri: Uri = config
            .host
            .parse()
            .map_err(|_| ClientError::InvalidUri(config.host.clone()))?;

        match uri.scheme_str() {
            Some("http") => {}
            Some(other) => return Err(ClientError::UnsupportedScheme(other.to_string())),
            None => return Err(ClientError::InvalidUri(config.host.clone())),
        }

        let authority = uri
            .authority()
            .ok_or_else(|| ClientError::InvalidUri(config.host.clone()))?;
        let address = format!("{}:{}", authority.host(), authority.port_u16().unwrap_or(80));

        let credentials = format!("{}:{}", config.username, config.password);
        let authorization = format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(credentials)
        );

        Ok(Self {
            address,
            authority: authority.as_str().to_string(),
            base_path: uri.path().trim_end_matches('/').to_string(),
            authorization,
            timeout: config.request_timeout(),
        })
    }

    /// Request path and query string for one page of a find.
    fn find_path(&self, query: &str, page: u32, page_size: u32) -> String {
        format!(
            "{}/api/assets?query={}&page={page}&size={page_size}&details=true",
            self.base_path,
            percent_encode(query)
        )
    }

    async fn get(&self, path_and_query: &str) -> ClientResult<AssetPage> {
        let stream = tokio::net::TcpStream::connect(&self.address)
            .await
            .map_err(|source| ClientError::Connect {
                address: self.address.clone(),
                source,
            })?;

        let io = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, conn) = hyper::client::conn::http1::handshake(io).await?;

        // Drive the connection in the background.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                debug!(error = %e, "collins connection closed with error");
            }
        });

        let req = http::Request::builder()
            .method("GET")
            .uri(path_and_query)
            .header("host", &self.authority)
            .header("authorization", &self.authorization)
            .header("accept", "application/json")
            .header("user-agent", "collins-exporter/0.1")
            .body(Empty::<Bytes>::new())?;

        let resp = sender.send_request(req).await?;
        let status = resp.status();
        let body = resp.into_body().collect().await?.to_bytes();

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: decode_error_message(&body),
            });
        }

        decode_find_response(&body)
    }
}

impl AssetFinder for CollinsClient {
    async fn find(&self, query: &str, page: u32, page_size: u32) -> ClientResult<AssetPage> {
        let path = self.find_path(query, page, page_size);
        debug!(%page, %page_size, "querying collins assets");

        tokio::time::timeout(self.timeout, self.get(&path))
            .await
            .map_err(|_| ClientError::Timeout(self.timeout))?
    }
}

/// Percent-encode a query parameter value (RFC 3986 unreserved set kept).
fn percent_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len() * 3);
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
