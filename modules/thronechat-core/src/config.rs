use std::time::Duration;

use anyhow::Result;

/// Application configuration loaded from environment variables.
///
/// Every tunable has a default matching the deployed bot; only the invite
/// link is required. The login key is optional; without it the bot joins
/// as an anonymous guest.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Session
    pub ship_invite_link: String,
    pub anonymous_login_key: Option<String>,
    pub bridge_url: String,

    // Spam control
    pub user_cooldown: Duration,
    pub spam_strike_limit: u32,
    pub spam_timeout: Duration,
    pub spam_reset_window: Duration,

    // Pacing
    pub message_delay: Duration,
    pub poll_interval: Duration,
    pub inactivity_timeout: Duration,

    // Concurrency
    pub max_command_workers: usize,
    pub outbound_queue_size: usize,

    // Health endpoint
    pub health_port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            ship_invite_link: std::env::var("SHIP_INVITE_LINK")?,
            anonymous_login_key: std::env::var("ANONYMOUS_LOGIN_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            bridge_url: std::env::var("BRIDGE_URL")
                .unwrap_or_else(|_| "http://localhost:3100".to_string()),
            user_cooldown: secs_f64("USER_COOLDOWN_SECONDS", 2.0),
            spam_strike_limit: parsed("SPAM_STRIKE_LIMIT", 3),
            spam_timeout: secs_f64("SPAM_TIMEOUT_SECONDS", 30.0),
            spam_reset_window: secs_f64("SPAM_RESET_SECONDS", 5.0),
            message_delay: secs_f64("MESSAGE_DELAY_SECONDS", 1.2),
            poll_interval: millis("POLL_INTERVAL_MS", 50),
            inactivity_timeout: secs_f64("INACTIVITY_TIMEOUT_SECONDS", 300.0),
            max_command_workers: parsed("MAX_COMMAND_WORKERS", 10),
            outbound_queue_size: parsed("OUTBOUND_QUEUE_SIZE", 100),
            health_port: parsed("PORT", 8080),
        };

        config.log_redacted();
        Ok(config)
    }

    fn log_redacted(&self) {
        fn preview(val: &str) -> String {
            let head: String = val.chars().take(8).collect();
            format!("{}...({} chars)", head, val.chars().count())
        }

        tracing::info!("Config loaded:");
        tracing::info!("  SHIP_INVITE_LINK: {}", preview(&self.ship_invite_link));
        tracing::info!(
            "  ANONYMOUS_LOGIN_KEY: {}",
            match &self.anonymous_login_key {
                Some(k) => preview(k),
                None => "<not set, guest mode>".to_string(),
            }
        );
        tracing::info!("  BRIDGE_URL: {}", self.bridge_url);
        tracing::info!(
            "  cooldown={:?} strikes={} timeout={:?} reset={:?}",
            self.user_cooldown,
            self.spam_strike_limit,
            self.spam_timeout,
            self.spam_reset_window,
        );
        tracing::info!(
            "  message_delay={:?} poll={:?} workers={}",
            self.message_delay,
            self.poll_interval,
            self.max_command_workers,
        );
    }
}

fn parsed<T: std::str::FromStr>(var: &str, default: T) -> T {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn secs_f64(var: &str, default: f64) -> Duration {
    Duration::from_secs_f64(parsed(var, default))
}

fn millis(var: &str, default: u64) -> Duration {
    Duration::from_millis(parsed(var, default))
}
