//! Polling for items created outside this process.
//!
//! Things creates items asynchronously (URL scheme, Shortcuts, share sheet),
//! so a caller that needs the identifier of a freshly created item polls the
//! database for it by title until exactly one match shows up.

use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use things_model::TaskKind;
use tracing::debug;

use crate::error::StoreError;
use crate::repository::TaskRepository;

/// Default delay between polls (200 milliseconds).
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 200;

/// Default time to wait before giving up (10 seconds).
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;

/// Errors returned by [`wait_for_created`].
#[derive(Debug, Error)]
pub enum WaitError {
    /// Nothing matched before the deadline.
    #[error("timed out waiting for the created item")]
    Timeout,

    /// More than one item matched.
    #[error("multiple items created with title {title:?}; use --id")]
    Ambiguous { title: String },

    #[error("title required")]
    TitleRequired,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Source of time for the polling loop.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

/// The real clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

/// How often and how long to poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            timeout: Duration::from_secs(DEFAULT_WAIT_TIMEOUT_SECS),
        }
    }
}

/// Polls until exactly one `kind` item titled `title` created at or after
/// `since` (epoch seconds) exists, and returns its identifier.
///
/// The repository is queried at least once, even with a zero timeout.
pub fn wait_for_created<R, C>(
    repo: &R,
    clock: &C,
    policy: &WaitPolicy,
    title: &str,
    kind: TaskKind,
    since: f64,
) -> Result<String, WaitError>
where
    R: TaskRepository + ?Sized,
    C: Clock + ?Sized,
{
    let title = title.trim();
    if title.is_empty() {
        return Err(WaitError::TitleRequired);
    }

    let deadline = clock.now() + policy.timeout;
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        let mut matches = repo.tasks_by_title_since(title, kind, since)?;
        debug!(attempt, title, count = matches.len(), "polled for created item");

        match matches.len() {
            0 => {}
            1 => return Ok(matches.remove(0).uuid),
            _ => {
                return Err(WaitError::Ambiguous {
                    title: title.to_string(),
                })
            }
        }

        if clock.now() >= deadline {
            return Err(WaitError::Timeout);
        }
        clock.sleep(policy.interval);
    }
}
