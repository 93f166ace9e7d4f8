//! Rolling-window authoring limit: one MCQ per educator per window, measured
//! from the last successful submission. Pure evaluation over the stored
//! timestamp; the matching atomic claim lives in
//! [`UserRepository::claim_submission_slot`](crate::repositories::UserRepository::claim_submission_slot).

use chrono::{DateTime, Duration, Utc};

use crate::errors::{whole_hours_ceil, AppError, AppResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SubmissionWindow {
    length: Duration,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eligibility {
    pub can_submit: bool,
    /// Exact time left. Zero when eligible.
    pub remaining: Duration,
    pub next_eligible_at: Option<DateTime<Utc>>,
}

impl SubmissionWindow {
    pub fn hours(hours: i64) -> Self {
        Self {
            length: Duration::hours(hours),
        }
    }

    pub fn length(&self) -> Duration {
        self.length
    }

    /// Latest stored timestamp that still counts as eligible at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.length
    }

    /// A timestamp in the future (clock skew, bad write) is never eligible;
    /// the reported wait then exceeds the window length.
    pub fn evaluate(
        &self,
        last_submission_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Eligibility {
        let Some(last) = last_submission_at else {
            return Eligibility::eligible();
        };

        let elapsed = now - last;
        if elapsed >= self.length {
            return Eligibility::eligible();
        }

        Eligibility {
            can_submit: false,
            remaining: self.length - elapsed,
            next_eligible_at: Some(last + self.length),
        }
    }
}

impl Default for SubmissionWindow {
    fn default() -> Self {
        Self::hours(24)
    }
}

impl Eligibility {
    fn eligible() -> Self {
        Self {
            can_submit: true,
            remaining: Duration::zero(),
            next_eligible_at: None,
        }
    }

    pub fn remaining_hours(&self) -> i64 {
        whole_hours_ceil(self.remaining)
    }

    pub fn ensure(&self) -> AppResult<()> {
        if self.can_submit {
            Ok(())
        } else {
            Err(AppError::RateLimited {
                remaining: self.remaining,
            })
        }
    }
}
