use std::collections::{HashMap, VecDeque};
use std::fmt::Write;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

use super::domain::RawReferral;
use super::evaluation::{FitnessFinding, ReferralResult};
use super::reference::ReferenceId;

/// Message handed to the mail collaborator for procedure-ready referrals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub reference_id: ReferenceId,
    pub category: String,
    pub rationale: Vec<String>,
    pub fitness: Vec<FitnessFinding>,
    pub inputs: RawReferral,
}

impl NotificationPayload {
    pub fn from_result(result: &ReferralResult, inputs: &RawReferral) -> Self {
        Self {
            reference_id: result.reference_id().clone(),
            category: result.category_label().to_string(),
            rationale: result.rationale().as_slice().to_vec(),
            fitness: result.fitness().to_vec(),
            inputs: inputs.clone(),
        }
    }

    pub fn subject(&self) -> String {
        format!("New Scope Referral: {}", self.category)
    }

    pub fn text_body(&self) -> String {
        let mut body = String::from(
            "A new referral has been processed with the following details:\n\n--- REFERRAL OUTCOME ---\n",
        );
        let _ = writeln!(body, "Reference: {}", self.reference_id);
        let _ = writeln!(body, "Category: {}", self.category);

        body.push_str("Clinical Rationale:\n");
        for reason in &self.rationale {
            let _ = writeln!(body, "- {reason}");
        }

        body.push_str("\nFitness Summary:\n");
        for finding in &self.fitness {
            let _ = writeln!(body, "- {}", finding.text);
        }

        body.push_str("\n--- PATIENT INPUTS ---\n");
        for (field, value) in self.inputs.iter() {
            let _ = writeln!(body, "{field}: {value}");
        }

        body
    }
}

/// Outbound hook to the mail transport. Returns a human-readable confirmation.
pub trait ReferralNotifier: Send + Sync {
    fn notify(&self, payload: &NotificationPayload) -> Result<String, NotificationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotificationError {
    #[error("email service not configured")]
    NotConfigured,
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Boolean-plus-message result reported back by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOutcome {
    pub delivered: bool,
    pub message: String,
}

impl From<Result<String, NotificationError>> for NotificationOutcome {
    fn from(value: Result<String, NotificationError>) -> Self {
        match value {
            Ok(message) => Self {
                delivered: true,
                message,
            },
            Err(err) => Self {
                delivered: false,
                message: err.to_string(),
            },
        }
    }
}

/// Status indicator shown next to a result; never feeds back into the classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum NotificationStatus {
    NotRequired,
    Pending,
    Sent { message: String },
    Failed { message: String },
}

impl NotificationStatus {
    pub fn label(&self) -> &'static str {
        match self {
            NotificationStatus::NotRequired => "not_required",
            NotificationStatus::Pending => "pending",
            NotificationStatus::Sent { .. } => "sent",
            NotificationStatus::Failed { .. } => "failed",
        }
    }
}

impl From<NotificationOutcome> for NotificationStatus {
    fn from(outcome: NotificationOutcome) -> Self {
        if outcome.delivered {
            NotificationStatus::Sent {
                message: outcome.message,
            }
        } else {
            NotificationStatus::Failed {
                message: outcome.message,
            }
        }
    }
}

/// Entries kept before the oldest tracked notification is forgotten.
pub const DEFAULT_LEDGER_CAPACITY: usize = 10_000;

/// Per-reference notification status, shared between the dispatcher and status queries.
///
/// Only referrals that actually dispatch a notification are tracked. The ledger is
/// bounded; once full, the oldest reference is evicted first.
#[derive(Debug, Clone)]
pub struct NotificationLedger {
    inner: Arc<Mutex<LedgerState>>,
}

#[derive(Debug)]
struct LedgerState {
    capacity: usize,
    entries: HashMap<ReferenceId, NotificationStatus>,
    order: VecDeque<ReferenceId>,
}

impl Default for NotificationLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LEDGER_CAPACITY)
    }
}

impl NotificationLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LedgerState {
                capacity: capacity.max(1),
                entries: HashMap::new(),
                order: VecDeque::new(),
            })),
        }
    }

    /// Starts tracking `reference_id` as pending. Returns `false` and leaves the
    /// existing entry alone when the reference is already tracked.
    pub fn open(&self, reference_id: &ReferenceId) -> bool {
        let mut guard = self.inner.lock().expect("ledger mutex poisoned");
        if guard.entries.contains_key(reference_id) {
            return false;
        }

        while guard.order.len() >= guard.capacity {
            let Some(oldest) = guard.order.pop_front() else {
                break;
            };
            guard.entries.remove(&oldest);
        }

        guard
            .entries
            .insert(reference_id.clone(), NotificationStatus::Pending);
        guard.order.push_back(reference_id.clone());
        true
    }

    /// Records the final status for a tracked reference. Evicted references stay forgotten.
    pub fn settle(&self, reference_id: &ReferenceId, status: NotificationStatus) {
        let mut guard = self.inner.lock().expect("ledger mutex poisoned");
        if let Some(entry) = guard.entries.get_mut(reference_id) {
            *entry = status;
        }
    }

    pub fn contains(&self, reference_id: &ReferenceId) -> bool {
        let guard = self.inner.lock().expect("ledger mutex poisoned");
        guard.entries.contains_key(reference_id)
    }

    pub fn status(&self, reference_id: &ReferenceId) -> Option<NotificationStatus> {
        let guard = self.inner.lock().expect("ledger mutex poisoned");
        guard.entries.get(reference_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().expect("ledger mutex poisoned").entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
