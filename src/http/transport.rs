use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, Url, header::CONTENT_TYPE};

use crate::domain::RequestKind;
use crate::error::RequestError;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Performs one network attempt and reports the drained response size.
///
/// Non-2xx responses are returned as `RequestError::UnexpectedStatus` after
/// their body has been drained.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        kind: RequestKind,
        url: &Url,
        body: Option<&[u8]>,
    ) -> Result<u64, RequestError>;
}

/// `Transport` backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        kind: RequestKind,
        url: &Url,
        body: Option<&[u8]>,
    ) -> Result<u64, RequestError> {
        let request = match kind {
            RequestKind::Get => self.client.get(url.clone()),
            RequestKind::Post => self
                .client
                .post(url.clone())
                .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
                .body(body.map(<[u8]>::to_vec).unwrap_or_default()),
        };

        let response = request.send().await.map_err(RequestError::network)?;
        let status = response.status();
        let bytes_received = drain_response_body(response)
            .await
            .map_err(RequestError::network)?;

        if !status.is_success() {
            return Err(RequestError::UnexpectedStatus {
                status: status.as_u16(),
            });
        }
        Ok(bytes_received)
    }
}

/// Read the body to the end, counting raw bytes without decoding them.
async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
