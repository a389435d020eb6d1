//! Keep-alive HTTP endpoint. Serves a JSON snapshot of bot status so an
//! uptime pinger doubles as a status page.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use thronechat_core::{BotStatusSnapshot, SharedStatus};

pub fn router(status: SharedStatus) -> Router {
    Router::new().route("/", get(status_page)).with_state(status)
}

async fn status_page(State(status): State<SharedStatus>) -> Json<BotStatusSnapshot> {
    Json(status.snapshot())
}

pub async fn serve(status: SharedStatus, port: u16) -> Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding health endpoint on {addr}"))?;
    info!(%addr, "Health endpoint listening");
    axum::serve(listener, router(status))
        .await
        .context("health endpoint server")
}

#[cfg(test)]
mod tests {
    use super::*;
    use thronechat_core::BotPhase;

    #[tokio::test]
    async fn status_page_reflects_shared_state() {
        let status = SharedStatus::new();
        status.set_phase(BotPhase::Running);
        status.set_ship_id("ABC123");
        let Json(snapshot) = status_page(State(status)).await;
        assert_eq!(snapshot.phase, BotPhase::Running);
        assert_eq!(snapshot.current_ship_id.as_deref(), Some("ABC123"));
    }
}
