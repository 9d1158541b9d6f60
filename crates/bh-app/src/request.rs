//! Request lifecycle shared by every flow.
//!
//! A [`RequestSlot`] replaces the per-view "loading flag + result + error"
//! triple. Each request gets a [`Ticket`] from a monotonically increasing
//! sequence; a response is applied only if its ticket is the latest one the
//! slot issued, so a slow, superseded request can never overwrite newer state.

use core::fmt;

use bh_api::ApiResult;
use tracing::debug;

/// Sequence number identifying one issued request.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn seq(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ticket({})", self.0)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A finished API call, tagged with the ticket it was issued under.
#[derive(Debug)]
pub struct Completion<T> {
    pub ticket: Ticket,
    pub outcome: ApiResult<T>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Pending(Ticket),
    Succeeded(T),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RequestSlot<T> {
    last_seq: u64,
    latest: Option<Ticket>,
    state: RequestState<T>,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            last_seq: 0,
            latest: None,
            state: RequestState::Idle,
        }
    }
}

impl<T> RequestSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket. Any previous value or error is cleared first.
    pub fn begin(&mut self) -> Ticket {
        self.last_seq += 1;
        let ticket = Ticket(self.last_seq);
        self.latest = Some(ticket);
        self.state = RequestState::Pending(ticket);
        ticket
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest == Some(ticket)
    }

    /// Apply a response. Returns the new state, or `None` if the ticket was
    /// superseded (or already completed) and the response was dropped.
    pub fn complete(
        &mut self,
        ticket: Ticket,
        outcome: Result<T, String>,
    ) -> Option<&RequestState<T>> {
        if !self.is_current(ticket) {
            debug!("Dropping stale response for request {}", ticket);
            return None;
        }
        self.latest = None;
        self.state = match outcome {
            Ok(value) => RequestState::Succeeded(value),
            Err(message) => RequestState::Failed(message),
        };
        Some(&self.state)
    }

    /// Forget any in-flight request and its result, as when a view unmounts.
    pub fn reset(&mut self) {
        self.latest = None;
        self.state = RequestState::Idle;
    }

    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, RequestState::Pending(_))
    }

    pub fn value(&self) -> Option<&T> {
        match &self.state {
            RequestState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn value_mut(&mut self) -> Option<&mut T> {
        match &mut self.state {
            RequestState::Succeeded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            RequestState::Failed(message) => Some(message),
            _ => None,
        }
    }
}
