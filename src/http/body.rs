//! Byte-capped response body reader.

use bytes::{Bytes, BytesMut};
use reqwest::Response;
use tracing::warn;

/// A response body read through the size cap.
#[derive(Debug, Clone, Default)]
pub struct CappedBody {
    pub bytes: Bytes,
    /// The stream had more data than the cap allowed
    pub truncated: bool,
}

impl CappedBody {
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }
}

/// Read `response` to EOF, keeping at most `cap` bytes.
///
/// Reading stops as soon as the cap is hit; the response (and with it the
/// connection's remaining body) is released when this returns.
pub async fn read_capped(mut response: Response, cap: usize) -> Result<CappedBody, reqwest::Error> {
    let mut buf = BytesMut::with_capacity(initial_capacity(&response, cap));
    let mut truncated = false;

    while let Some(chunk) = response.chunk().await? {
        let room = cap - buf.len();
        if chunk.len() > room {
            buf.extend_from_slice(&chunk[..room]);
            truncated = true;
            // Not drained: dropping the response discards the connection
            break;
        }
        buf.extend_from_slice(&chunk);
    }

    if truncated {
        warn!(cap, status = response.status().as_u16(), "response body truncated at size cap");
    }

    Ok(CappedBody { bytes: buf.freeze(), truncated })
}

fn initial_capacity(response: &Response, cap: usize) -> usize {
    response.content_length().map(|len| len as usize).unwrap_or(0).min(cap).min(64 * 1024)
}
