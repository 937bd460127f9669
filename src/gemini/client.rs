//! TLS client for the Gemini protocol
//!
//! A request is a single TLS connection: write the absolute URL followed by
//! CRLF, read one header line (`<status> <meta>`), then the body when the
//! status says success. Certificate verification is disabled because
//! Geminispace runs almost entirely on self-signed certificates; trust is
//! not part of this client's contract.

use crate::gemini::{
    full_gemini_link, Fetcher, GeminiError, Response, MAX_REDIRECTS,
    STATUS_CLIENT_CERT_REQUIRED, STATUS_INPUT, STATUS_PERMANENT_FAILURE, STATUS_REDIRECT,
    STATUS_SUCCESS, STATUS_TEMPORARY_FAILURE,
};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;
use url::Url;

const DIAL_TIMEOUT: Duration = Duration::from_secs(4);
const RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini protocol client over TLS
pub struct GeminiClient {
    connector: tokio_native_tls::TlsConnector,
}

impl GeminiClient {
    pub fn new() -> Result<Self, GeminiError> {
        let connector = native_tls::TlsConnector::builder()
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()
            .map_err(|e| GeminiError::Tls {
                host: String::new(),
                message: e.to_string(),
            })?;

        Ok(Self {
            connector: tokio_native_tls::TlsConnector::from(connector),
        })
    }

    /// One dial-write-read exchange, no redirect handling
    async fn request_once(&self, url: &Url) -> Result<Response, GeminiError> {
        let host = url
            .host_str()
            .ok_or_else(|| GeminiError::Parse(format!("missing host in {}", url)))?;
        let port = url.port().unwrap_or(crate::url::DEFAULT_PORT);

        // IPv6 literals carry brackets in the URL form but not when dialing
        let dial_host = host.trim_start_matches('[').trim_end_matches(']').to_string();

        let tcp = timeout(DIAL_TIMEOUT, TcpStream::connect((dial_host.as_str(), port)))
            .await
            .map_err(|_| GeminiError::Timeout(url.to_string()))?
            .map_err(|e| GeminiError::Connect {
                host: host.to_string(),
                message: e.to_string(),
            })?;

        let mut tls = self
            .connector
            .connect(host, tcp)
            .await
            .map_err(|e| GeminiError::Tls {
                host: host.to_string(),
                message: e.to_string(),
            })?;

        tls.write_all(format!("{}\r\n", url).as_bytes()).await?;

        let mut reader = BufReader::new(tls);
        timeout(RESPONSE_TIMEOUT, read_response(&mut reader))
            .await
            .map_err(|_| GeminiError::Timeout(url.to_string()))?
    }
}

#[async_trait]
impl Fetcher for GeminiClient {
    async fn fetch(&self, url: &Url) -> Result<Response, GeminiError> {
        let mut link = url.clone();
        let mut redirects_left = MAX_REDIRECTS;

        loop {
            let response = self.request_once(&link).await?;

            if response.status == STATUS_REDIRECT {
                if redirects_left == 0 {
                    return Err(GeminiError::TooManyRedirects(response.meta));
                }
                link = full_gemini_link(&response.meta)?;
                redirects_left -= 1;
                continue;
            }

            return Ok(response);
        }
    }
}

/// Reads and parses a Gemini response from a buffered stream
///
/// The status is the first digit of the header; the meta is everything after
/// the first space. The body is read to EOF only for success responses.
pub(crate) async fn read_response<R>(reader: &mut R) -> Result<Response, GeminiError>
where
    R: AsyncBufRead + Unpin,
{
    let mut header = String::new();
    let n = reader.read_line(&mut header).await?;
    if n == 0 {
        return Err(GeminiError::MalformedHeader("empty response".to_string()));
    }

    let header = header.trim();
    let status = header
        .chars()
        .next()
        .and_then(|c| c.to_digit(10))
        .ok_or_else(|| GeminiError::MalformedHeader(header.to_string()))? as i32;

    let meta = match header.split_once(' ') {
        Some((_, rest)) => rest.trim().to_string(),
        None => String::new(),
    };

    match status {
        STATUS_INPUT
        | STATUS_REDIRECT
        | STATUS_TEMPORARY_FAILURE
        | STATUS_PERMANENT_FAILURE
        | STATUS_CLIENT_CERT_REQUIRED => Ok(Response::new(status, meta, Vec::new())),

        STATUS_SUCCESS => {
            let mut body = Vec::new();
            reader.read_to_end(&mut body).await?;
            Ok(Response::new(status, meta, body))
        }

        _ => Err(GeminiError::UnknownStatus(header.to_string())),
    }
}
