//! API module - message types, frames and typed payloads.
//!
//! - [`MessageType`] - the `type` tag every frame carries
//! - [`RawFrame`] - a parsed frame with its untouched fields
//! - Typed shapes ([`HeadPose`], [`FullBody`], [`Handshake`]) bound to their
//!   type through [`ApiMessage`]

mod frame;
mod message_type;
mod messages;

pub use frame::RawFrame;
pub use message_type::MessageType;
pub use messages::{
    ApiMessage, ClientRole, EulerRotation, FullBody, Handshake, HeadPose, Joint, SpatialPosition,
    VcpQuaternion,
};

/// Legacy pull request text. Servers implementing current VCP ignore it.
pub const LEGACY_REQUEST: &str = "request";
