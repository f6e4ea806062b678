//! Codec module - serialization/deserialization for wire messages.
//!
//! - [`JsonCodec`] - JSON using `serde_json`, one document per message
//!
//! # Design
//!
//! Codecs are marker structs with static methods rather than trait objects.

mod json;

pub use json::JsonCodec;
