//! HTTP client implementing the codec's transport interface.
//!
//! Every operation is one POST: queries travel in the request body, and
//! insert payloads travel as the body with the `INSERT ... FORMAT <fmt>`
//! statement in the `query` URL parameter. Credentials go in a basic-auth
//! header and the database in a URL parameter.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use chwire_core::{Transport, TransportError, TransportResult};
use tokio::net::TcpStream;

use crate::http::{percent_encode, roundtrip, Response};

/// Connection options for [`HttpClient`].
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Server host name or address.
    pub host: String,
    /// HTTP interface port.
    pub port: u16,
    /// Database applied to every statement.
    pub database: String,
    /// User for basic auth.
    pub user: String,
    /// Password for basic auth.
    pub password: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
            port: 8123,
            database: "default".into(),
            user: "default".into(),
            password: String::new(),
        }
    }
}

impl ClientOptions {
    /// Options for `host:port` with the remaining fields at their
    /// defaults.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Set the database.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the credentials.
    pub fn credentials(
        mut self,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }
}

/// Transport over the server's HTTP interface.
#[derive(Debug, Clone)]
pub struct HttpClient {
    options: ClientOptions,
}

impl HttpClient {
    /// Client for the given options. No connection is made until the first
    /// operation; each operation uses one short-lived connection.
    pub fn new(options: ClientOptions) -> Self {
        Self { options }
    }

    async fn post(&self, query_param: Option<&str>, body: &[u8]) -> TransportResult<Bytes> {
        let options = &self.options;
        let mut target = format!("/?database={}", percent_encode(&options.database));
        if let Some(query) = query_param {
            target.push_str("&query=");
            target.push_str(&percent_encode(query));
        }

        let credentials = BASE64.encode(format!("{}:{}", options.user, options.password));
        let head = format!(
            "POST {target} HTTP/1.1\r\n\
             Host: {}:{}\r\n\
             Authorization: Basic {credentials}\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n",
            options.host,
            options.port,
            body.len()
        );

        tracing::debug!(
            host = %options.host,
            port = options.port,
            body_bytes = body.len(),
            "posting to server"
        );
        let stream = TcpStream::connect((options.host.as_str(), options.port))
            .await
            .map_err(|err| {
                TransportError::Connection(format!(
                    "connect to {}:{}: {err}",
                    options.host, options.port
                ))
            })?;
        let Response { status, body } = roundtrip(stream, &head, body).await?;
        if !(200..300).contains(&status) {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            tracing::warn!(status, error = %text, "server rejected request");
            return Err(TransportError::Server(format!("HTTP {status}: {text}")));
        }
        tracing::debug!(status, response_bytes = body.len(), "server response");
        Ok(body)
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn execute_non_query(&self, sql: &str) -> TransportResult<()> {
        self.post(None, sql.as_bytes()).await?;
        Ok(())
    }

    async fn send_data(&self, sql_prefix: &str, data: Bytes) -> TransportResult<()> {
        self.post(Some(sql_prefix), &data).await?;
        Ok(())
    }

    async fn query_data(&self, sql: &str) -> TransportResult<Bytes> {
        self.post(None, sql.as_bytes()).await
    }

    async fn execute_query(&self, sql: &str) -> TransportResult<String> {
        let body = self.post(None, sql.as_bytes()).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
