//! # vcp-client
//!
//! Sink-side client for the Virtual Communication Protocol (VCP).
//!
//! A VCP server streams motion-capture data (head pose, full-body joints)
//! over a WebSocket as JSON frames tagged with a `type` field. This crate
//! keeps one connection to the server alive and routes every frame to the
//! processors registered for its type.
//!
//! ## Architecture
//!
//! - **Connection** ([`connection`]): one tokio task owns the socket,
//!   sends the `sink` handshake, reconnects on failure
//! - **Dispatch** ([`dispatch`]): parses frames and fans them out, either
//!   immediately or queued until the host drains the queue on its own tick
//! - **Processors** ([`processor`]): typed or raw consumers of frames
//!
//! ## Example
//!
//! ```no_run
//! use vcp_client::api::{FullBody, HeadPose};
//! use vcp_client::SinkClient;
//!
//! #[tokio::main]
//! async fn main() -> vcp_client::Result<()> {
//!     let client = SinkClient::builder("ws://localhost:8080")
//!         .on(|pose: HeadPose| {
//!             println!("head yaw {}", pose.rotation.yaw);
//!             Ok(())
//!         })
//!         .on(|body: FullBody| {
//!             println!("{} joints", body.joints.len());
//!             Ok(())
//!         })
//!         .start()
//!         .await?;
//!
//!     client.wait_until_open().await?;
//!     tokio::time::sleep(std::time::Duration::from_secs(60)).await;
//!     client.shutdown().await
//! }
//! ```

pub mod api;
pub mod codec;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod processor;

mod client;

pub use client::{SinkClient, SinkClientBuilder};
pub use config::SinkConfig;
pub use error::{Result, VcpError};
