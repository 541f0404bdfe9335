use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info};

use crate::shared::AppError;

/// Admits at most one expensive command per caller per cooldown window.
///
/// Privileged callers are never limited.
pub struct CommandGate {
    cooldown: Duration,
    last_accepted: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl CommandGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: Mutex::new(HashMap::new()),
        }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    pub fn is_admitted(&self, caller_id: &str, privileged: bool) -> bool {
        self.is_admitted_at(caller_id, privileged, Utc::now())
    }

    /// Decides admission at `now` and records it when accepted.
    pub fn is_admitted_at(&self, caller_id: &str, privileged: bool, now: DateTime<Utc>) -> bool {
        if privileged {
            debug!(caller_id = %caller_id, "Privileged caller bypasses command gate");
            return true;
        }

        let mut last_accepted = self
            .last_accepted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(last) = last_accepted.get(caller_id) {
            if now - *last < self.cooldown {
                info!(caller_id = %caller_id, last_accepted = %last, "Caller is rate limited");
                return false;
            }
        }

        // Expired windows admit anyway, so they need not be kept
        last_accepted.retain(|_, accepted| now - *accepted < self.cooldown);
        last_accepted.insert(caller_id.to_string(), now);
        true
    }

    pub fn admit(&self, caller_id: &str, privileged: bool) -> Result<(), AppError> {
        if self.is_admitted(caller_id, privileged) {
            Ok(())
        } else {
            Err(AppError::RateLimited {
                cooldown_minutes: self.cooldown.num_minutes(),
            })
        }
    }
}
