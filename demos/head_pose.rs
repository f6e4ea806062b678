//! Head pose sink - prints head rotation from a VCP server.
//!
//! This demo shows:
//! - Registering a typed processor with `.on()`
//! - Deferred dispatch drained on a fixed tick, the way a render loop would
//! - Reconnecting with exponential backoff
//!
//! # Running
//!
//! ```text
//! RUST_LOG=vcp_client=debug cargo run --example head_pose -- ws://localhost:8080
//! ```

use std::time::Duration;

use tracing_subscriber::EnvFilter;
use vcp_client::api::HeadPose;
use vcp_client::connection::RetryPolicy;
use vcp_client::dispatch::{DispatchMode, ErrorSink};
use vcp_client::SinkClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "ws://localhost:8080".to_string());

    let client = SinkClient::builder(url)
        .on(|pose: HeadPose| {
            let r = pose.rotation;
            println!(
                "yaw {:>7.2}  pitch {:>7.2}  roll {:>7.2}",
                r.yaw, r.pitch, r.roll
            );
            Ok(())
        })
        .dispatch_mode(DispatchMode::Deferred)
        .retry_policy(RetryPolicy::exponential(
            Duration::from_millis(500),
            Duration::from_secs(30),
            2.0,
        ))
        .error_sink(ErrorSink::Log)
        .start()
        .await?;

    // ~60 Hz host tick.
    let mut tick = tokio::time::interval(Duration::from_millis(16));
    loop {
        tick.tick().await;
        client.process_queue();
    }
}
