//! HTTP request framing for the collector.
//!
//! The request line and fixed headers never change at runtime, so they are
//! rendered once per endpoint.  Only `Content-Length` and the body vary.

use core::fmt::Write;

use crate::app::events::PAYLOAD_CAPACITY;
use crate::config::ApiEndpoint;
use crate::error::TransportError;

/// Capacity of the fully composed request.
pub const REQUEST_CAPACITY: usize = 512;

const REQUEST_LINE: &str = "POST / HTTP/1.1\r\n";

pub struct RequestTemplate {
    /// `Host` through the blank line.
    headers: heapless::String<160>,
}

impl RequestTemplate {
    pub fn new(endpoint: &ApiEndpoint) -> Self {
        let mut headers = heapless::String::new();
        // Longest host ("255.255.255.255:65535") keeps this well under capacity.
        let _ = write!(
            headers,
            "Host: {endpoint}\r\n\
             Accept: application/json\r\n\
             Content-Type: application/json\r\n\
             Connection: close\r\n\r\n"
        );
        Self { headers }
    }

    /// Request line, `Content-Length`, fixed headers, then `body`.
    pub fn compose(
        &self,
        body: &[u8],
    ) -> Result<heapless::Vec<u8, REQUEST_CAPACITY>, TransportError> {
        let mut length: heapless::String<32> = heapless::String::new();
        write!(length, "Content-Length: {}\r\n", body.len())
            .map_err(|_| TransportError::RequestTooLarge)?;

        let mut out = heapless::Vec::new();
        for part in [
            REQUEST_LINE.as_bytes(),
            length.as_bytes(),
            self.headers.as_bytes(),
            body,
        ] {
            out.extend_from_slice(part)
                .map_err(|()| TransportError::RequestTooLarge)?;
        }
        Ok(out)
    }
}

const _: () = assert!(REQUEST_CAPACITY > 160 + 32 + PAYLOAD_CAPACITY + REQUEST_LINE.len());
