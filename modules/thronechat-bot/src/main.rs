use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use drednot_client::{DrednotClient, DrednotError};
use thronechat_bot::outbound::{spawn_sender, OutboundQueue};
use thronechat_bot::session::Session;
use thronechat_bot::spam::{SpamConfig, SpamFilter};
use thronechat_core::{AppConfig, BotPhase, SharedStatus};
use thronechat_engine::catalog::STANDARD_CARDS;
use thronechat_engine::GameEngine;

/// More restarts than this inside [`RESTART_WINDOW`] means something is
/// systematically wrong; back off instead of hammering the game server.
const MAX_RESTARTS_PER_WINDOW: usize = 10;
const RESTART_WINDOW: Duration = Duration::from_secs(60 * 60);
const THRASH_PAUSE: Duration = Duration::from_secs(5 * 60);
const RESTART_DELAY: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("thronechat=info,drednot_client=info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let status = SharedStatus::new();
    status.set_phase(BotPhase::Initializing);

    let health_status = status.clone();
    let health_port = config.health_port;
    tokio::spawn(async move {
        if let Err(e) = thronechat_bot::health::serve(health_status, health_port).await {
            error!(error = %e, "Health endpoint failed");
        }
    });

    let transport: Arc<dyn drednot_client::ChatTransport> =
        Arc::new(DrednotClient::new(&config.bridge_url));

    let (outbound, outbound_rx) = OutboundQueue::new(config.outbound_queue_size);
    spawn_sender(
        outbound_rx,
        transport.clone(),
        config.message_delay,
        status.clone(),
    );

    let engine = Arc::new(GameEngine::new(STANDARD_CARDS));
    let spam = Arc::new(SpamFilter::new(SpamConfig::from(&config)));

    supervise(transport, engine, spam, outbound, status, config).await
}

/// Restart-forever supervisor. Each pass runs one full session; session loss
/// tears the browser session down and starts over, with thrash detection and
/// a one-time fallback to guest login when the configured key is rejected.
async fn supervise(
    transport: Arc<dyn drednot_client::ChatTransport>,
    engine: Arc<GameEngine>,
    spam: Arc<SpamFilter>,
    outbound: OutboundQueue,
    status: SharedStatus,
    config: AppConfig,
) -> Result<()> {
    let mut restarts: Vec<Instant> = Vec::new();
    let mut use_key_login = config.anonymous_login_key.is_some();

    loop {
        let now = Instant::now();
        restarts.retain(|t| now.duration_since(*t) < RESTART_WINDOW);
        if restarts.len() >= MAX_RESTARTS_PER_WINDOW {
            error!(
                restarts = restarts.len(),
                "Restart thrashing detected, pausing"
            );
            status.set_phase(BotPhase::ThrashPause);
            status.log_event("Too many restarts in the last hour, pausing for 5 minutes");
            tokio::time::sleep(THRASH_PAUSE).await;
            restarts.clear();
        }
        restarts.push(now);

        let session = Session::new(
            transport.clone(),
            engine.clone(),
            spam.clone(),
            outbound.clone(),
            status.clone(),
            config.clone(),
            use_key_login,
        );
        let err = match session.run().await {
            Ok(()) => unreachable!("session loop only exits with an error"),
            Err(e) => e,
        };

        match err.downcast_ref::<DrednotError>() {
            Some(DrednotError::InvalidLoginKey) if use_key_login => {
                // Bad key is permanent; retrying with it would loop forever.
                error!("Login key rejected, falling back to guest login");
                status.set_phase(BotPhase::InvalidKey);
                status.log_event("Login key rejected by server, switching to guest login");
                use_key_login = false;
            }
            _ => {
                warn!(error = %err, "Session ended, restarting");
                status.set_phase(BotPhase::Restarting);
                status.log_event(&format!("Session lost: {err}. Restarting."));
            }
        }

        if let Err(e) = transport.close().await {
            warn!(error = %e, "Failed to close old session cleanly");
        }
        info!("Restarting in {}s", RESTART_DELAY.as_secs());
        tokio::time::sleep(RESTART_DELAY).await;
    }
}
