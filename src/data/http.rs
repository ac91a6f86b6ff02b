//! Shared blocking HTTP plumbing for provider clients.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub const USER_AGENT: &str = concat!("finagg/", env!("CARGO_PKG_VERSION"));

/// How a 404 is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFound {
    /// Single-record lookups: the thing asked for does not exist.
    NoData,
    /// Page fetches: any non-success status is a failed fetch.
    Upstream,
}

/// One client per process; providers clone it (cheap, shares the pool).
pub fn build_client(timeout: Duration) -> Result<Client, AppError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))
}

/// Send and require a success status.
pub fn send(req: RequestBuilder, source: &str, not_found: NotFound) -> Result<Response, AppError> {
    let resp = req
        .send()
        .map_err(|e| AppError::upstream(format!("{source} request failed: {e}")))?;

    let status = resp.status();
    if status == StatusCode::NOT_FOUND && not_found == NotFound::NoData {
        return Err(AppError::no_data(format!("{source} has no data for this request (404).")));
    }
    if !status.is_success() {
        return Err(AppError::upstream(format!("{source} request failed with status {status}.")));
    }
    Ok(resp)
}

/// JSON body of a single-record lookup. A 404 is "no data".
pub fn get_json<T: DeserializeOwned>(req: RequestBuilder, source: &str) -> Result<T, AppError> {
    decode_json(send(req, source, NotFound::NoData)?, source)
}

/// JSON body of one page of a paged walk. Every non-success status is `Upstream`.
pub fn get_page_json<T: DeserializeOwned>(req: RequestBuilder, source: &str) -> Result<T, AppError> {
    decode_json(send(req, source, NotFound::Upstream)?, source)
}

pub fn get_text(req: RequestBuilder, source: &str) -> Result<String, AppError> {
    send(req, source, NotFound::NoData)?
        .text()
        .map_err(|e| AppError::upstream(format!("Failed to read {source} response: {e}")))
}

fn decode_json<T: DeserializeOwned>(resp: Response, source: &str) -> Result<T, AppError> {
    resp.json()
        .map_err(|e| AppError::upstream(format!("Failed to parse {source} response: {e}")))
}

/// Minimal HTTP/1.1 server for tests: answers each incoming connection with
/// the next canned `(status, body)` and closes it.
#[cfg(test)]
pub(crate) fn serve(responses: Vec<(u16, &'static str)>) -> String {
    use std::io::{Read, Write};
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        for (status, body) in responses {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                match stream.read(&mut buf) {
                    Ok(0) | Err(_) => break,
                    Ok(n) => request.extend_from_slice(&buf[..n]),
                }
            }
            let response = format!(
                "HTTP/1.1 {status} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    format!("http://{addr}")
}
