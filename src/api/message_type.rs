//! Message type discriminator.
//!
//! Every VCP frame carries a `type` string. The vocabulary is open: known
//! APIs are exposed as constants, but any string is a valid type.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The `type` tag of a VCP frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageType(Cow<'static, str>);

impl MessageType {
    /// Head rotation and position.
    pub const HEAD_POSE: MessageType = MessageType(Cow::Borrowed("headPoseAPI"));
    /// Full body joint rotations.
    pub const FULL_BODY: MessageType = MessageType(Cow::Borrowed("fullBodyAPI"));
    pub const CONTROL: MessageType = MessageType(Cow::Borrowed("controlAPI"));
    pub const INTERACTION: MessageType = MessageType(Cow::Borrowed("interactionAPI"));
    pub const BUST: MessageType = MessageType(Cow::Borrowed("bustAPI"));
    /// Connection handshake.
    pub const HANDSHAKE: MessageType = MessageType(Cow::Borrowed("handshake"));

    /// Wildcard: processors registered under this type see every routed frame.
    pub const ANY: MessageType = MessageType(Cow::Borrowed("*"));

    /// Create a message type from an arbitrary string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// The wire name of this type.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the [`MessageType::ANY`] wildcard.
    #[inline]
    pub fn is_any(&self) -> bool {
        self.as_str() == Self::ANY.as_str()
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for MessageType {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}
