pub mod history;

use crate::errors::SubmissionError;
use crate::models::{OrderRecord, OrderRequest};
use serde::Serialize;
pub use history::TradeHistory;

/// Identifies one submission attempt, so late events for an older attempt are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Ticket(u64);

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting {
        ticket: Ticket,
        order: OrderRequest,
    },
    Succeeded {
        ticket: Ticket,
        record: OrderRecord,
    },
    Failed {
        ticket: Ticket,
        reason: String,
    },
}

/// Idle -> Submitting -> Succeeded | Failed -> Idle, one order at a time.
#[derive(Debug, Default)]
pub struct Lifecycle {
    state: SubmissionState,
    issued: u64,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting { .. })
    }

    /// Starts a submission. A previous outcome still on display is replaced;
    /// an attempt already in flight rejects this one and stays untouched.
    pub fn begin(&mut self, order: OrderRequest) -> Result<Ticket, SubmissionError> {
        if self.is_submitting() {
            return Err(SubmissionError::InFlight);
        }

        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.state = SubmissionState::Submitting { ticket, order };
        Ok(ticket)
    }

    pub fn resolve(&mut self, ticket: Ticket, record: OrderRecord) -> bool {
        if !self.in_flight(ticket) {
            return false;
        }
        self.state = SubmissionState::Succeeded { ticket, record };
        true
    }

    pub fn reject(&mut self, ticket: Ticket, reason: String) -> bool {
        if !self.in_flight(ticket) {
            return false;
        }
        self.state = SubmissionState::Failed { ticket, reason };
        true
    }

    /// Clears a displayed outcome. Does nothing while idle or submitting.
    pub fn dismiss(&mut self) -> bool {
        match self.state {
            SubmissionState::Succeeded { .. } | SubmissionState::Failed { .. } => {
                self.state = SubmissionState::Idle;
                true
            }
            _ => false,
        }
    }

    /// Timeout variant of `dismiss`: only clears the outcome of `ticket`.
    pub fn dismiss_ticket(&mut self, ticket: Ticket) -> bool {
        let shown = match &self.state {
            SubmissionState::Succeeded { ticket, .. } | SubmissionState::Failed { ticket, .. } => {
                Some(*ticket)
            }
            _ => None,
        };
        if shown != Some(ticket) {
            return false;
        }

        self.state = SubmissionState::Idle;
        true
    }

    fn in_flight(&self, ticket: Ticket) -> bool {
        matches!(&self.state, SubmissionState::Submitting { ticket: t, .. } if *t == ticket)
    }
}
