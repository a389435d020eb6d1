//! Per-user cooldown and spam-strike enforcement.
//!
//! The clock is passed in explicitly so tests drive a synthetic timeline.
//! All state is per-username; users never share counters.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use thronechat_core::{AppConfig, Command};

/// How long an idle per-user entry survives before the sweep reclaims it.
const IDLE_TTL: Duration = Duration::from_secs(600);

#[derive(Debug, Clone)]
pub struct SpamConfig {
    pub cooldown: Duration,
    pub strike_limit: u32,
    pub timeout: Duration,
    pub reset_window: Duration,
}

impl From<&AppConfig> for SpamConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            cooldown: config.user_cooldown,
            strike_limit: config.spam_strike_limit,
            timeout: config.spam_timeout,
            reset_window: config.spam_reset_window,
        }
    }
}

#[derive(Debug)]
struct UserSpamState {
    last_command_at: Instant,
    strike_count: u32,
    last_command: Command,
    last_strike_at: Instant,
    penalty_until: Option<Instant>,
}

/// What to do with a candidate command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Forward as a Command event.
    Accept,
    /// The strike limit was hit: emit a SpamPenalty instead, drop the command.
    Penalize,
    /// Serving a timeout or inside the cooldown window: drop silently.
    Drop,
}

pub struct SpamFilter {
    config: SpamConfig,
    users: Mutex<HashMap<String, UserSpamState>>,
}

impl SpamFilter {
    pub fn new(config: SpamConfig) -> Self {
        Self {
            config,
            users: Mutex::new(HashMap::new()),
        }
    }

    /// Run one candidate command through the gate.
    pub fn check(&self, username: &str, command: Command, now: Instant) -> Verdict {
        use std::collections::hash_map::Entry;

        let mut users = self.lock();

        let state = match users.entry(username.to_string()) {
            // First command ever from this user: skips the timeout and
            // cooldown gates but still faces the strike limit below.
            Entry::Vacant(entry) => entry.insert(UserSpamState {
                last_command_at: now,
                strike_count: 1,
                last_command: command,
                last_strike_at: now,
                penalty_until: None,
            }),
            Entry::Occupied(entry) => {
                let state = entry.into_mut();

                // 1. Serving a timeout.
                if let Some(until) = state.penalty_until {
                    if now < until {
                        return Verdict::Drop;
                    }
                    state.penalty_until = None;
                }

                // 2. Cooldown window. The acceptance timestamp only moves
                //    when the command gets past this gate.
                if now.duration_since(state.last_command_at) < self.config.cooldown {
                    return Verdict::Drop;
                }
                state.last_command_at = now;

                // 3. Strike accounting: rapid repeats of the same command
                //    stack, anything else starts over.
                let stale = now.duration_since(state.last_strike_at) > self.config.reset_window;
                if stale || command != state.last_command {
                    state.strike_count = 1;
                } else {
                    state.strike_count += 1;
                }
                state.last_command = command;
                state.last_strike_at = now;
                state
            }
        };

        // 4. Over the limit: timeout starts now.
        if state.strike_count >= self.config.strike_limit {
            state.penalty_until = Some(now + self.config.timeout);
            state.strike_count = 0;
            return Verdict::Penalize;
        }

        Verdict::Accept
    }

    /// Evict users idle past the TTL so the map cannot grow without bound.
    /// Entries still serving a penalty are kept regardless.
    pub fn sweep(&self, now: Instant) -> usize {
        let mut users = self.lock();
        let before = users.len();
        users.retain(|_, state| {
            let penalized = state.penalty_until.is_some_and(|until| now < until);
            penalized || now.duration_since(state.last_command_at) < IDLE_TTL
        });
        let evicted = before - users.len();
        if evicted > 0 {
            debug!(evicted, remaining = users.len(), "Swept idle spam-state entries");
        }
        evicted
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, UserSpamState>> {
        self.users.lock().unwrap_or_else(|e| e.into_inner())
    }
}
