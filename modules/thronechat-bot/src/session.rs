//! One session's lifetime: join the ship, pump chat events, dispatch
//! commands, keep the inactivity clock. Returns an error on session loss;
//! the supervisor in `main` owns restart policy.

use std::sync::{Arc, Mutex};

use tokio::time::Instant;

use anyhow::{anyhow, Result};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use drednot_client::{ChatTransport, JoinRequest};
use thronechat_core::{AppConfig, BotPhase, ChatEvent, SharedStatus};
use thronechat_engine::GameEngine;

use crate::normalize::Normalizer;
use crate::outbound::OutboundQueue;
use crate::router;
use crate::spam::{SpamFilter, Verdict};

/// Consecutive poll failures treated as session loss.
const MAX_POLL_FAILURES: u32 = 5;

/// How often the spam filter's idle-entry sweep runs.
const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// Delayed turn advances, tied to the owning session: a new schedule
/// replaces any pending one, and dropping the scheduler aborts it, so no
/// timer survives a supervised restart.
struct TurnScheduler {
    engine: Arc<GameEngine>,
    outbound: OutboundQueue,
    delay: std::time::Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl TurnScheduler {
    fn new(engine: Arc<GameEngine>, outbound: OutboundQueue, delay: std::time::Duration) -> Self {
        Self {
            engine,
            outbound,
            delay,
            pending: Mutex::new(None),
        }
    }

    fn schedule(&self) {
        let engine = self.engine.clone();
        let outbound = self.outbound.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let reply = engine.advance_turn(&mut rand::rng());
            outbound.enqueue(reply.lines);
        });

        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(old) = pending.replace(handle) {
            // Stale advances belong to a finished or restarted game.
            old.abort();
        }
    }

    fn cancel(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}

impl Drop for TurnScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

pub struct Session {
    transport: Arc<dyn ChatTransport>,
    engine: Arc<GameEngine>,
    spam: Arc<SpamFilter>,
    outbound: OutboundQueue,
    status: SharedStatus,
    config: AppConfig,
    use_key_login: bool,
}

impl Session {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        engine: Arc<GameEngine>,
        spam: Arc<SpamFilter>,
        outbound: OutboundQueue,
        status: SharedStatus,
        config: AppConfig,
        use_key_login: bool,
    ) -> Self {
        Self {
            transport,
            engine,
            spam,
            outbound,
            status,
            config,
            use_key_login,
        }
    }

    /// Run one session to its end. Only ever returns with an error: either
    /// a typed `DrednotError::InvalidLoginKey` from joining, or session loss
    /// after repeated poll failures.
    pub async fn run(&self) -> Result<()> {
        // Any game from a previous session is gone by definition.
        self.engine.reset();
        self.status.set_phase(BotPhase::Joining);
        self.status.log_event("Performing full start");

        let login_key = self
            .config
            .anonymous_login_key
            .as_deref()
            .filter(|_| self.use_key_login);
        if login_key.is_none() {
            self.status.log_event("Playing as new guest");
        }

        let join_info = self
            .transport
            .join(&JoinRequest {
                invite_link: &self.config.ship_invite_link,
                login_key,
            })
            .await?;
        if let Some(ship_id) = &join_info.ship_id {
            self.status.set_ship_id(ship_id);
            self.status
                .log_event(&format!("Confirmed ship ID via scan: {ship_id}"));
        } else {
            self.status
                .log_event("No existing ship ID found, waiting for live join notice");
        }

        self.status.set_phase(BotPhase::Running);
        self.outbound
            .enqueue(["Sort the Chat Bot is online! Type !startgame to begin."]);
        info!("Event-driven chat monitor active");

        let scheduler = Arc::new(TurnScheduler::new(
            self.engine.clone(),
            self.outbound.clone(),
            // Give the reply lines room to drain before the next turn fires.
            self.config.message_delay * 2,
        ));
        let workers = Arc::new(Semaphore::new(self.config.max_command_workers));
        let normalizer = Normalizer::new();

        let mut poll_failures = 0u32;
        let mut inactivity_deadline = Instant::now() + self.config.inactivity_timeout;
        let mut next_sweep = Instant::now() + SWEEP_INTERVAL;

        loop {
            tokio::time::sleep(self.config.poll_interval).await;

            let lines = match self.transport.poll().await {
                Ok(lines) => {
                    poll_failures = 0;
                    lines
                }
                Err(e) => {
                    poll_failures += 1;
                    warn!(error = %e, poll_failures, "Chat poll failed");
                    if poll_failures >= MAX_POLL_FAILURES {
                        error!("Repeated poll failures, treating session as lost");
                        return Err(anyhow!(e).context("session lost"));
                    }
                    continue;
                }
            };

            let now = Instant::now();
            if !lines.is_empty() {
                inactivity_deadline = now + self.config.inactivity_timeout;
            }

            for line in &lines {
                let Some(event) = normalizer.normalize(line) else {
                    continue;
                };
                // Rate limiting rewrites a Command into a SpamPenalty or
                // swallows it; everything else passes through untouched.
                let event = match event {
                    ChatEvent::Command {
                        username,
                        name,
                        args,
                    } => match self.spam.check(&username, name, now.into_std()) {
                        Verdict::Accept => ChatEvent::Command {
                            username,
                            name,
                            args,
                        },
                        Verdict::Penalize => ChatEvent::SpamPenalty {
                            username,
                            command: name,
                        },
                        Verdict::Drop => continue,
                    },
                    other => other,
                };
                self.handle_event(event, &scheduler, &workers).await;
            }

            if now >= inactivity_deadline {
                // Expiry is observational only; the session keeps running.
                self.status
                    .log_event("INACTIVITY: Timer expired. No action taken.");
                inactivity_deadline = now + self.config.inactivity_timeout;
            }

            if now >= next_sweep {
                self.spam.sweep(now.into_std());
                next_sweep = now + SWEEP_INTERVAL;
            }
        }
    }

    /// Consume one event. Accepted commands run on the bounded worker pool;
    /// waiting for a permit backpressures the poll loop when all workers are
    /// busy.
    async fn handle_event(
        &self,
        event: ChatEvent,
        scheduler: &Arc<TurnScheduler>,
        workers: &Arc<Semaphore>,
    ) {
        match event {
            ChatEvent::SystemJoin { ship_id } => {
                // Re-joining the same ship is routine; only a change is news.
                if self.status.current_ship_id().as_deref() != Some(ship_id.as_str()) {
                    self.status.set_ship_id(&ship_id);
                    self.status
                        .log_event(&format!("Switched to new ship: {ship_id}"));
                }
            }
            ChatEvent::SpamPenalty { username, command } => {
                self.status.log_event(&format!(
                    "SPAM: Timed out '{}' for {}s for spamming '{}'",
                    username,
                    self.config.spam_timeout.as_secs(),
                    command,
                ));
            }
            ChatEvent::Command {
                username,
                name,
                args,
            } => {
                let summary = if args.is_empty() {
                    format!("{name} (from {username})")
                } else {
                    format!("{name} {} (from {username})", args.join(" "))
                };
                info!("RECV: {summary}");
                self.status.record_command(&summary);

                let Ok(permit) = workers.clone().acquire_owned().await else {
                    return; // pool closed, session is tearing down
                };
                let engine = self.engine.clone();
                let outbound = self.outbound.clone();
                let scheduler = scheduler.clone();
                tokio::spawn(async move {
                    let _permit = permit;
                    let reply = router::dispatch(&engine, name, &username);
                    let wants_turn = reply.schedule_next_turn;
                    outbound.enqueue(reply.lines);
                    if wants_turn {
                        scheduler.schedule();
                    }
                });
            }
        }
    }
}
