//! Round-trip demo: register an in-process entity, answer pings, and drive
//! a request/reply exchange through a `LinkSession`.
//!
//! Run with `RUST_LOG=debug cargo run -p corelay-infra --example ping_pong`
//! to watch the relay's structured logs.

use std::sync::Arc;
use std::time::Duration;

use corelay_core::link::LinkSession;
use corelay_infra::config::load_link_config;
use corelay_infra::registry::LinkRegistry;
use corelay_types::filter::Filter;
use corelay_types::id::{EntityId, SessionId};
use serde_json::json;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    corelay_observe::tracing_setup::init_tracing()?;
    let config = load_link_config(std::path::Path::new(".")).await;

    let registry = Arc::new(LinkRegistry::new());

    // A connected entity that answers every ping with a pong.
    let core_id = EntityId::from("core-1");
    let (entity, mut inbox) = registry.register(core_id.clone());
    tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            if message.payload["cmd"] == "ping" {
                entity.emit(json!({"cmd": "pong", "seq": message.payload["seq"]}));
            }
        }
    });

    let session = LinkSession::new(registry, None, &config, SessionId::new());
    let reply = session
        .request_reply(
            &core_id,
            json!({"cmd": "ping", "seq": 1}),
            Filter::try_from(json!({"cmd": "pong"}))?,
            Some(Duration::from_millis(500)),
        )
        .await?;

    println!("{} replied: {}", reply.sender, reply.payload);
    Ok(())
}
