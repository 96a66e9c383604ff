//! Malware scanning over the clamd INSTREAM protocol.
//!
//! Streams a buffer to a clamd daemon as 4-byte big-endian length-prefixed
//! chunks and parses the single response line. One wall-clock timeout covers
//! the whole exchange (connect, stream, verdict), never per chunk. Every
//! connection error, malformed response, or timeout maps to
//! [`Verdict::Unavailable`] so callers fail closed; retry policy belongs to
//! the caller.

use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Maximum payload bytes per INSTREAM chunk.
const CHUNK_MAX: usize = 64 * 1024;

/// Scan result. `Unavailable` means "do not trust", not "clean".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Verdict {
    Clean,
    /// Signature name reported by the daemon.
    Found(String),
    Unavailable,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Clean => write!(f, "CLEAN"),
            Verdict::Found(name) => write!(f, "{}", name),
            Verdict::Unavailable => write!(f, "UNAVAILABLE"),
        }
    }
}

/// Where the scanning daemon listens and how long the whole exchange may take.
#[derive(Debug, Clone)]
pub struct ClamdEndpoint {
    pub host: String,
    pub port: u16,
    pub timeout: Duration,
}

impl Default for ClamdEndpoint {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3310,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Scan a buffer against the daemon at `endpoint`.
///
/// Never returns an error: any failure degrades to `Verdict::Unavailable`
/// (and is logged), so a dead daemon cannot hang or abort an extraction.
pub async fn scan_bytes(buf: &[u8], endpoint: &ClamdEndpoint) -> Verdict {
    match tokio::time::timeout(endpoint.timeout, exchange(buf, endpoint)).await {
        Ok(Ok(verdict)) => verdict,
        Ok(Err(err)) => {
            tracing::warn!("clamd scan failed: {err:#}");
            Verdict::Unavailable
        }
        Err(_) => {
            tracing::warn!(
                "clamd scan timed out after {:?} ({}:{})",
                endpoint.timeout,
                endpoint.host,
                endpoint.port
            );
            Verdict::Unavailable
        }
    }
}

/// Health check: clamd `PING` / `PONG`. Used by the CLI, not the pipeline.
pub async fn ping(endpoint: &ClamdEndpoint) -> bool {
    let attempt = async {
        let mut stream =
            TcpStream::connect((endpoint.host.as_str(), endpoint.port)).await?;
        stream.write_all(b"zPING\0").await?;
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await?;
        anyhow::Ok(String::from_utf8_lossy(&response).contains("PONG"))
    };
    matches!(
        tokio::time::timeout(endpoint.timeout, attempt).await,
        Ok(Ok(true))
    )
}

async fn exchange(buf: &[u8], endpoint: &ClamdEndpoint) -> anyhow::Result<Verdict> {
    let mut stream = TcpStream::connect((endpoint.host.as_str(), endpoint.port))
        .await
        .map_err(|e| anyhow::anyhow!("connect {}:{}: {}", endpoint.host, endpoint.port, e))?;

    stream.write_all(b"zINSTREAM\0").await?;
    for chunk in buf.chunks(CHUNK_MAX) {
        stream.write_all(&(chunk.len() as u32).to_be_bytes()).await?;
        stream.write_all(chunk).await?;
    }
    stream.write_all(&0u32.to_be_bytes()).await?;
    stream.flush().await?;

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await?;
    Ok(parse_response(&response))
}

/// Parse the daemon's response line.
///
/// A line ending in `OK` is clean and `<name> FOUND` is a match; anything
/// else (including an empty or garbled reply) is treated as unavailable.
fn parse_response(raw: &[u8]) -> Verdict {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    if line.ends_with("OK") {
        return Verdict::Clean;
    }
    if let Some(rest) = line.strip_suffix(" FOUND") {
        let name = rest.strip_prefix("stream:").unwrap_or(rest).trim();
        if !name.is_empty() {
            return Verdict::Found(name.to_string());
        }
    }
    Verdict::Unavailable
}
