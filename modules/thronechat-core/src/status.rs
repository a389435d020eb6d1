//! Process-wide bot status for the health endpoint.
//!
//! One `SharedStatus` handle is cloned into every subsystem; each records
//! the facts it owns (phase, last command, last message sent) plus a rolling
//! event log capped at [`EVENT_LOG_CAPACITY`] entries.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Rolling event log length; oldest entries fall off the back.
pub const EVENT_LOG_CAPACITY: usize = 20;

/// Coarse lifecycle phase, mirrors what the supervisor is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BotPhase {
    Initializing,
    Joining,
    Running,
    InvalidKey,
    Restarting,
    ThrashPause,
}

#[derive(Debug)]
struct BotStatusInner {
    phase: BotPhase,
    started_at: DateTime<Utc>,
    session_id: uuid::Uuid,
    current_ship_id: Option<String>,
    last_command: Option<String>,
    last_message_sent: Option<String>,
    event_log: VecDeque<String>,
}

/// Point-in-time copy of the status, serialized by the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BotStatusSnapshot {
    pub phase: BotPhase,
    pub started_at: DateTime<Utc>,
    pub session_id: uuid::Uuid,
    pub current_ship_id: Option<String>,
    pub last_command: Option<String>,
    pub last_message_sent: Option<String>,
    pub event_log: Vec<String>,
}

/// Cheaply-cloneable handle to the shared status. Lock scope is a handful of
/// field writes; never held across I/O.
#[derive(Debug, Clone)]
pub struct SharedStatus(Arc<Mutex<BotStatusInner>>);

impl SharedStatus {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(BotStatusInner {
            phase: BotPhase::Initializing,
            started_at: Utc::now(),
            session_id: uuid::Uuid::new_v4(),
            current_ship_id: None,
            last_command: None,
            last_message_sent: None,
            event_log: VecDeque::with_capacity(EVENT_LOG_CAPACITY),
        })))
    }

    pub fn set_phase(&self, phase: BotPhase) {
        self.lock().phase = phase;
    }

    pub fn set_ship_id(&self, ship_id: &str) {
        self.lock().current_ship_id = Some(ship_id.to_string());
    }

    pub fn current_ship_id(&self) -> Option<String> {
        self.lock().current_ship_id.clone()
    }

    pub fn record_command(&self, summary: &str) {
        self.lock().last_command = Some(summary.to_string());
    }

    pub fn record_sent(&self, text: &str) {
        self.lock().last_message_sent = Some(text.to_string());
    }

    /// Push a timestamped entry onto the rolling log (newest first) and emit
    /// it through tracing as well.
    pub fn log_event(&self, message: &str) {
        tracing::info!("EVENT: {message}");
        let entry = format!("[{}] {}", Utc::now().format("%H:%M:%S"), message);
        let mut inner = self.lock();
        if inner.event_log.len() == EVENT_LOG_CAPACITY {
            inner.event_log.pop_back();
        }
        inner.event_log.push_front(entry);
    }

    pub fn snapshot(&self) -> BotStatusSnapshot {
        let inner = self.lock();
        BotStatusSnapshot {
            phase: inner.phase,
            started_at: inner.started_at,
            session_id: inner.session_id,
            current_ship_id: inner.current_ship_id.clone(),
            last_command: inner.last_command.clone(),
            last_message_sent: inner.last_message_sent.clone(),
            event_log: inner.event_log.iter().cloned().collect(),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BotStatusInner> {
        // Status is advisory; a poisoned lock just means a panicking writer,
        // and a stale read is still better than taking the process down.
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SharedStatus {
    fn default() -> Self {
        Self::new()
    }
}
