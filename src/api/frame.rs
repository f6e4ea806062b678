//! Decoded inbound frame.
//!
//! A [`RawFrame`] is the minimal unit the router works with: the `type` tag
//! plus every other field of the JSON object, untouched.
//!
//! # Example
//!
//! ```
//! use vcp_client::api::{MessageType, RawFrame};
//!
//! let frame = RawFrame::parse(r#"{"type":"headPoseAPI","sender":"tracker"}"#).unwrap();
//!
//! assert_eq!(frame.message_type(), &MessageType::HEAD_POSE);
//! assert_eq!(frame.get("sender").and_then(|v| v.as_str()), Some("tracker"));
//! ```

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::MessageType;
use crate::codec::JsonCodec;
use crate::error::{Result, VcpError};

/// A decoded VCP frame.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawFrame {
    /// Type discriminator.
    #[serde(rename = "type")]
    message_type: MessageType,
    /// All remaining fields.
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl RawFrame {
    /// Create a frame from a type and its fields.
    pub fn new(message_type: MessageType, fields: Map<String, Value>) -> Self {
        Self {
            message_type,
            fields,
        }
    }

    /// Parse one wire message.
    ///
    /// Fails with [`VcpError::MalformedFrame`] if the text is not a JSON
    /// object with a string `type` field.
    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = JsonCodec::decode(text)?;
        Self::from_value(value)
    }

    /// Build a frame from an already decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(mut fields) = value else {
            return Err(VcpError::MalformedFrame("frame is not a JSON object".into()));
        };

        let message_type = match fields.remove("type") {
            Some(Value::String(name)) => MessageType::from(name),
            Some(_) => {
                return Err(VcpError::MalformedFrame("'type' is not a string".into()));
            }
            None => return Err(VcpError::MalformedFrame("missing 'type' field".into())),
        };

        Ok(Self {
            message_type,
            fields,
        })
    }

    /// Get the type tag.
    #[inline]
    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    /// Get a field by name.
    #[inline]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Get all fields except `type`.
    #[inline]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Convert into a typed message.
    ///
    /// Fields missing from the frame take the target's `#[serde(default)]`
    /// values; unknown fields are ignored.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    /// Re-encode the frame, `type` included.
    pub fn to_value(&self) -> Value {
        let mut object = Map::with_capacity(self.fields.len() + 1);
        object.insert(
            "type".to_string(),
            Value::String(self.message_type.as_str().to_string()),
        );
        object.extend(self.fields.clone());
        Value::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_keeps_extra_fields() {
        let frame =
            RawFrame::parse(r#"{"type":"fullBodyAPI","hipPosition":{"x":1},"n":3}"#).unwrap();

        assert_eq!(frame.message_type(), &MessageType::FULL_BODY);
        assert_eq!(frame.fields().len(), 2);
        assert_eq!(frame.get("n"), Some(&json!(3)));
        assert!(frame.get("type").is_none());
    }

    #[test]
    fn test_parse_rejects_invalid_json() {
        let err = RawFrame::parse("not json at all").unwrap_err();
        assert!(matches!(err, VcpError::Json(_)));
    }

    #[test]
    fn test_parse_rejects_missing_type() {
        let err = RawFrame::parse(r#"{"rotation":{}}"#).unwrap_err();
        assert!(matches!(err, VcpError::MalformedFrame(_)));
    }

    #[test]
    fn test_parse_rejects_non_string_type() {
        let err = RawFrame::parse(r#"{"type":42}"#).unwrap_err();
        assert!(matches!(err, VcpError::MalformedFrame(_)));
    }

    #[test]
    fn test_parse_rejects_non_object() {
        let err = RawFrame::parse(r#"["headPoseAPI"]"#).unwrap_err();
        assert!(matches!(err, VcpError::MalformedFrame(_)));
    }

    #[test]
    fn test_decode_uses_defaults_for_missing_fields() {
        #[derive(Deserialize, Default, Debug, PartialEq)]
        #[serde(default)]
        struct Partial {
            a: i32,
            b: String,
        }

        let frame = RawFrame::parse(r#"{"type":"x","a":7}"#).unwrap();
        let decoded: Partial = frame.decode().unwrap();

        assert_eq!(
            decoded,
            Partial {
                a: 7,
                b: String::new()
            }
        );
    }

    #[test]
    fn test_to_value_includes_type() {
        let frame = RawFrame::parse(r#"{"type":"bustAPI","v":true}"#).unwrap();
        assert_eq!(frame.to_value(), json!({"type": "bustAPI", "v": true}));
    }
}
