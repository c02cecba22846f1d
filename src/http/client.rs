use std::time::Duration;

use futures_util::StreamExt;
use reqwest::{
    Client, Url,
    header::{HeaderMap, HeaderName, HeaderValue},
};
use tracing::debug;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::HttpError;

/// Builds the shared client for a run.
///
/// # Errors
///
/// Returns an error when a header is invalid or the client cannot be built.
pub fn build_client(
    request_timeout: Duration,
    headers: &[(String, String)],
) -> Result<Client, HttpError> {
    let mut header_map = HeaderMap::new();
    for (key, value) in headers {
        let name =
            HeaderName::from_bytes(key.as_bytes()).map_err(|err| HttpError::InvalidHeader {
                name: key.clone(),
                message: err.to_string(),
            })?;
        let value = HeaderValue::from_str(value).map_err(|err| HttpError::InvalidHeader {
            name: key.clone(),
            message: err.to_string(),
        })?;
        header_map.append(name, value);
    }

    Client::builder()
        .timeout(request_timeout)
        .user_agent(DEFAULT_USER_AGENT)
        .default_headers(header_map)
        .build()
        .map_err(|err| HttpError::BuildClient { source: err })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOutcome {
    /// 0 when no response was received.
    pub status: u16,
    pub transport_error: bool,
    pub bytes: u64,
}

/// Sends one GET and drains the body.
pub async fn execute_get(client: &Client, url: &Url) -> RequestOutcome {
    match client.get(url.clone()).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            match drain_response_body(response).await {
                Ok(bytes) => RequestOutcome {
                    status,
                    transport_error: false,
                    bytes,
                },
                Err(err) => {
                    debug!("Failed to read response body: {}", err);
                    RequestOutcome {
                        status,
                        transport_error: true,
                        bytes: 0,
                    }
                }
            }
        }
        Err(err) => {
            debug!("Request failed: {}", err);
            RequestOutcome {
                status: 0,
                transport_error: true,
                bytes: 0,
            }
        }
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
