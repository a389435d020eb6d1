//! Outbound reply pipeline: chunk, mark, queue, pace.
//!
//! Producers never block: a full queue drops the chunk with a warning.
//! One consumer drains at the pacing interval so bursts cannot flood the
//! game's chat rate limit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use drednot_client::ChatTransport;
use thronechat_core::{SharedStatus, ECHO_MARKER};

/// The game truncates chat lines just above this length.
pub const MAX_CHUNK_CHARS: usize = 199;

/// Producer half of the bounded outbound queue. Cheap to clone.
#[derive(Clone)]
pub struct OutboundQueue {
    tx: mpsc::Sender<String>,
}

impl OutboundQueue {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Chunk each line, tag each chunk with the echo marker, and enqueue.
    /// Never blocks; overflow is dropped and logged.
    pub fn enqueue<I, S>(&self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            for chunk in chunk_line(line.as_ref(), MAX_CHUNK_CHARS) {
                let tagged = format!("{ECHO_MARKER}{chunk}");
                if let Err(e) = self.tx.try_send(tagged) {
                    warn!(error = %e, "Outbound queue full, dropping chunk");
                }
            }
        }
    }
}

/// Split one line into chunks of at most `max_chars` characters, cutting at
/// the last whitespace before the limit when there is one.
pub fn chunk_line(line: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = line.trim();

    while !rest.is_empty() {
        if rest.chars().count() <= max_chars {
            chunks.push(rest.to_string());
            break;
        }

        let hard_cut = rest
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .expect("more chars than max_chars");
        let cut = rest[..hard_cut]
            .rfind(char::is_whitespace)
            .filter(|&i| i > 0)
            .unwrap_or(hard_cut);

        chunks.push(rest[..cut].trim_end().to_string());
        rest = rest[cut..].trim_start();
    }

    chunks
}

/// Spawn the single consumer: one send per pacing tick, forever. Send
/// failures are logged and the loop keeps going; a dead session just means
/// dropped replies until the supervisor restarts it.
pub fn spawn_sender(
    mut rx: mpsc::Receiver<String>,
    transport: Arc<dyn ChatTransport>,
    delay: Duration,
    status: SharedStatus,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut pace = tokio::time::interval(delay);
        pace.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while let Some(text) = rx.recv().await {
            pace.tick().await;
            match transport.send(&text).await {
                Ok(()) => {
                    status.record_sent(text.trim_start_matches(ECHO_MARKER));
                }
                Err(e) => {
                    warn!(error = %e, "Failed to send chat line");
                }
            }
        }
        info!("Outbound queue closed, sender exiting");
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_line_is_one_chunk() {
        assert_eq!(chunk_line("hello there", 199), vec!["hello there"]);
    }

    #[test]
    fn long_line_splits_at_whitespace() {
        let line = "word ".repeat(50); // 250 chars
        let chunks = chunk_line(&line, 199);
        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 199);
            assert!(!chunk.starts_with(' '));
            assert!(!chunk.ends_with(' '));
        }
        assert_eq!(chunks.join(" "), line.trim());
    }

    #[test]
    fn unbroken_run_is_hard_cut() {
        let line = "x".repeat(420);
        let chunks = chunk_line(&line, 199);
        assert_eq!(
            chunks.iter().map(|c| c.chars().count()).collect::<Vec<_>>(),
            vec![199, 199, 22]
        );
    }

    #[test]
    fn multibyte_text_never_splits_a_character() {
        let line = "\u{1F4B0}".repeat(300);
        let chunks = chunk_line(&line, 199);
        assert!(chunks.iter().all(|c| c.chars().count() <= 199));
        assert_eq!(chunks.concat(), line);
    }

    #[test]
    fn empty_line_yields_no_chunks() {
        assert!(chunk_line("", 199).is_empty());
        assert!(chunk_line("   ", 199).is_empty());
    }

    #[tokio::test]
    async fn overflow_drops_instead_of_blocking() {
        let (queue, mut rx) = OutboundQueue::new(2);
        queue.enqueue(["one", "two", "three", "four"]);
        // Only the first two made it; enqueue returned without blocking.
        assert_eq!(rx.recv().await.unwrap(), format!("{ECHO_MARKER}one"));
        assert_eq!(rx.recv().await.unwrap(), format!("{ECHO_MARKER}two"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn every_chunk_carries_the_echo_marker() {
        let (queue, mut rx) = OutboundQueue::new(8);
        queue.enqueue(["a reply line"]);
        let sent = rx.try_recv().unwrap();
        assert!(sent.starts_with(ECHO_MARKER));
    }
}
