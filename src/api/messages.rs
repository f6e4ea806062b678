//! Typed VCP message shapes.
//!
//! These are the payloads the known APIs carry. All of them default every
//! field, so a frame that omits a field still decodes (the missing value keeps
//! its default).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::MessageType;

/// A typed message bound to one [`MessageType`].
pub trait ApiMessage: Sized {
    /// The type tag frames of this shape carry.
    const MESSAGE_TYPE: MessageType;
}

/// Role a client declares in its handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientRole {
    /// Receives data only.
    #[default]
    Sink,
    /// Produces data.
    Source,
    Control,
    All,
    Undefined,
}

/// Euler angle rotation.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EulerRotation {
    pub pitch: f64,
    pub roll: f64,
    pub yaw: f64,
}

/// XYZ position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialPosition {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Quaternion rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VcpQuaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for VcpQuaternion {
    /// Identity rotation.
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// One joint of a [`FullBody`] message.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Joint {
    pub rotation: VcpQuaternion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<SpatialPosition>,
}

/// `headPoseAPI` payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadPose {
    pub rotation: EulerRotation,
    pub position: SpatialPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl ApiMessage for HeadPose {
    const MESSAGE_TYPE: MessageType = MessageType::HEAD_POSE;
}

/// `fullBodyAPI` payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FullBody {
    /// Joints keyed by joint name.
    pub joints: HashMap<String, Joint>,
    pub hip_position: SpatialPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl ApiMessage for FullBody {
    const MESSAGE_TYPE: MessageType = MessageType::FULL_BODY;
}

/// Handshake sent by a client right after the connection opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Handshake {
    #[serde(rename = "type")]
    message_type: MessageType,
    pub role: ClientRole,
}

impl Handshake {
    pub fn new(role: ClientRole) -> Self {
        Self {
            message_type: MessageType::HANDSHAKE,
            role,
        }
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new(ClientRole::Sink)
    }
}

impl ApiMessage for Handshake {
    const MESSAGE_TYPE: MessageType = MessageType::HANDSHAKE;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::RawFrame;
    use serde_json::json;

    #[test]
    fn test_handshake_wire_format() {
        let value = serde_json::to_value(Handshake::new(ClientRole::Sink)).unwrap();
        assert_eq!(value, json!({"type": "handshake", "role": "sink"}));
    }

    #[test]
    fn test_client_role_names() {
        let roles = [
            (ClientRole::Sink, "sink"),
            (ClientRole::Source, "source"),
            (ClientRole::Control, "control"),
            (ClientRole::All, "all"),
            (ClientRole::Undefined, "undefined"),
        ];
        for (role, name) in roles {
            assert_eq!(serde_json::to_value(role).unwrap(), json!(name));
        }
    }

    #[test]
    fn test_head_pose_from_frame() {
        let frame = RawFrame::parse(
            r#"{"type":"headPoseAPI","rotation":{"pitch":0.5,"yaw":-1.0},"sender":"cam"}"#,
        )
        .unwrap();
        let pose: HeadPose = frame.decode().unwrap();

        assert_eq!(pose.rotation.pitch, 0.5);
        assert_eq!(pose.rotation.roll, 0.0);
        assert_eq!(pose.rotation.yaw, -1.0);
        assert_eq!(pose.position, SpatialPosition::default());
        assert_eq!(pose.sender.as_deref(), Some("cam"));
    }

    #[test]
    fn test_full_body_from_frame() {
        let frame = RawFrame::parse(
            r#"{
                "type": "fullBodyAPI",
                "hipPosition": {"x": 0.1, "y": 0.9, "z": 0.0},
                "joints": {
                    "leftHand": {"rotation": {"x": 0, "y": 0, "z": 0.7071, "w": 0.7071}},
                    "head": {"rotation": {}, "position": {"y": 1.6}}
                }
            }"#,
        )
        .unwrap();
        let body: FullBody = frame.decode().unwrap();

        assert_eq!(body.hip_position.y, 0.9);
        assert_eq!(body.joints.len(), 2);
        assert_eq!(body.joints["leftHand"].rotation.z, 0.7071);
        assert!(body.joints["leftHand"].position.is_none());
        assert_eq!(body.joints["head"].rotation, VcpQuaternion::default());
        assert_eq!(body.joints["head"].position.unwrap().y, 1.6);
    }

    #[test]
    fn test_message_types_bound() {
        assert_eq!(HeadPose::MESSAGE_TYPE, MessageType::HEAD_POSE);
        assert_eq!(FullBody::MESSAGE_TYPE, MessageType::FULL_BODY);
        assert_eq!(Handshake::MESSAGE_TYPE, MessageType::HANDSHAKE);
    }
}
