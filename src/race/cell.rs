//! The write-once slot that decides an operation's outcome.

use std::sync::OnceLock;

use crate::response::ApplicationStatus;

/// A single shared slot holding at most one committed outcome.
///
/// Created fresh for each operation and shared by its two workers and the
/// coordinator. [`ResultCell::claim`] is an atomic claim-if-empty: the first
/// caller's value sticks and every later claim is a no-op.
///
/// # Examples
///
/// ```rust
/// use status_race::{ApplicationStatus, ResultCell};
///
/// let cell = ResultCell::new();
/// assert!(cell.claim(ApplicationStatus::success("app1", "APPROVED")).is_won());
///
/// let late = cell.claim(ApplicationStatus::timed_out());
/// assert!(!late.is_won());
/// assert_eq!(late.value(), &ApplicationStatus::success("app1", "APPROVED"));
/// ```
#[derive(Debug, Default)]
pub struct ResultCell {
    slot: OnceLock<ApplicationStatus>,
}

/// The result of a claim attempt. Either way it carries the committed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim<'a> {
    /// This claim wrote the value.
    Won(&'a ApplicationStatus),
    /// Someone else claimed first; this is their value.
    Lost(&'a ApplicationStatus),
}

impl<'a> Claim<'a> {
    /// Returns true if this claim wrote the value.
    pub fn is_won(&self) -> bool {
        matches!(self, Self::Won(_))
    }

    /// The committed value.
    pub fn value(&self) -> &'a ApplicationStatus {
        match self {
            Self::Won(v) | Self::Lost(v) => v,
        }
    }
}

impl ResultCell {
    /// Create an empty cell.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `outcome` if the cell is empty.
    pub fn claim(&self, outcome: ApplicationStatus) -> Claim<'_> {
        let mut won = false;
        let value = self.slot.get_or_init(|| {
            won = true;
            outcome
        });
        if won {
            Claim::Won(value)
        } else {
            Claim::Lost(value)
        }
    }

    /// The committed value, if any.
    pub fn get(&self) -> Option<&ApplicationStatus> {
        self.slot.get()
    }

    /// Returns true once any value has been committed.
    pub fn is_claimed(&self) -> bool {
        self.slot.get().is_some()
    }
}
