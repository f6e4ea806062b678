//! JSON codec using `serde_json`.
//!
//! VCP puts exactly one JSON document in each WebSocket text message, so the
//! codec works on `&str`/`String` rather than bytes.
//!
//! # Example
//!
//! ```
//! use vcp_client::codec::JsonCodec;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Ping {
//!     seq: u32,
//! }
//!
//! let text = JsonCodec::encode(&Ping { seq: 7 }).unwrap();
//! assert_eq!(text, r#"{"seq":7}"#);
//! let decoded: Ping = JsonCodec::decode(&text).unwrap();
//! assert_eq!(decoded, Ping { seq: 7 });
//! ```

use crate::error::Result;

/// JSON codec for wire messages.
pub struct JsonCodec;

impl JsonCodec {
    /// Encode a value as a single-line JSON document.
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be serialized.
    #[inline]
    pub fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
        Ok(serde_json::to_string(value)?)
    }

    /// Decode one JSON document.
    ///
    /// # Errors
    ///
    /// Returns error if the text is not valid JSON for type T.
    #[inline]
    pub fn decode<T: serde::de::DeserializeOwned>(text: &str) -> Result<T> {
        Ok(serde_json::from_str(text)?)
    }
}
