use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::domain::{InputError, PatientInput, RawReferral};
use super::evaluation::{ReferralEngine, ReferralResult, TriageConfig};
use super::notification::{
    NotificationLedger, NotificationOutcome, NotificationPayload, NotificationStatus,
    ReferralNotifier,
};
use super::reference::ReferenceId;

/// Service composing input validation, the triage engine, and notification dispatch.
pub struct ReferralService<N> {
    engine: Arc<ReferralEngine>,
    notifier: Arc<N>,
    ledger: NotificationLedger,
}

/// Evaluated referral plus the state of its notification at hand-back time.
#[derive(Debug)]
pub struct ReferralSubmission {
    pub result: ReferralResult,
    pub notification: NotificationStatus,
    /// Resolves once the transport reports back. Dropping it does not cancel delivery.
    pub dispatch: Option<JoinHandle<NotificationOutcome>>,
}

impl<N> ReferralService<N>
where
    N: ReferralNotifier + 'static,
{
    pub fn new(notifier: Arc<N>, config: TriageConfig) -> Self {
        Self {
            engine: Arc::new(ReferralEngine::new(config)),
            notifier,
            ledger: NotificationLedger::default(),
        }
    }

    /// Bounds how many dispatched notifications stay queryable.
    pub fn with_ledger_capacity(mut self, capacity: usize) -> Self {
        self.ledger = NotificationLedger::with_capacity(capacity);
        self
    }

    pub fn engine(&self) -> &ReferralEngine {
        &self.engine
    }

    /// Validate and classify without notifying anyone.
    pub fn evaluate(&self, record: &RawReferral) -> Result<ReferralResult, ReferralServiceError> {
        let input = PatientInput::from_record(record)?;
        Ok(self.engine.evaluate(&input))
    }

    /// Validate, classify, and fire off the notification when the patient is procedure-ready.
    ///
    /// The result is final before the notification starts; transport failures
    /// only change the ledger entry for this reference.
    pub fn submit(&self, record: RawReferral) -> Result<ReferralSubmission, ReferralServiceError> {
        self.submit_as(ReferenceId::generate(), record)
    }

    /// Same as [`submit`](Self::submit), starting from `reference_id`. A reference
    /// that the ledger already tracks is swapped for a freshly generated one.
    pub fn submit_as(
        &self,
        reference_id: ReferenceId,
        record: RawReferral,
    ) -> Result<ReferralSubmission, ReferralServiceError> {
        let input = PatientInput::from_record(&record)?;
        let mut result = self.engine.evaluate_as(reference_id, &input);

        if !result.procedure_ready() {
            while self.ledger.contains(result.reference_id()) {
                result = self.reissue(&input, &result);
            }
            log_evaluated(&result);
            return Ok(ReferralSubmission {
                result,
                notification: NotificationStatus::NotRequired,
                dispatch: None,
            });
        }

        while !self.ledger.open(result.reference_id()) {
            result = self.reissue(&input, &result);
        }
        log_evaluated(&result);

        let payload = NotificationPayload::from_result(&result, &record);
        let notifier = self.notifier.clone();
        let ledger = self.ledger.clone();
        let job = move || deliver(notifier.as_ref(), &ledger, &payload);

        let (notification, dispatch) = match Handle::try_current() {
            Ok(handle) => (NotificationStatus::Pending, Some(handle.spawn_blocking(job))),
            Err(_) => (NotificationStatus::from(job()), None),
        };

        Ok(ReferralSubmission {
            result,
            notification,
            dispatch,
        })
    }

    pub fn notification_status(&self, reference_id: &ReferenceId) -> Option<NotificationStatus> {
        self.ledger.status(reference_id)
    }

    pub fn tracked_notifications(&self) -> usize {
        self.ledger.len()
    }

    fn reissue(&self, input: &PatientInput, taken: &ReferralResult) -> ReferralResult {
        debug!(reference = %taken.reference_id(), "reference already tracked; reissuing");
        self.engine.evaluate_as(ReferenceId::generate(), input)
    }
}

fn log_evaluated(result: &ReferralResult) {
    info!(
        reference = %result.reference_id(),
        category = ?result.category(),
        escalated = result.fitness_escalated(),
        procedure_ready = result.procedure_ready(),
        "referral evaluated"
    );
}

fn deliver<N: ReferralNotifier + ?Sized>(
    notifier: &N,
    ledger: &NotificationLedger,
    payload: &NotificationPayload,
) -> NotificationOutcome {
    let outcome = NotificationOutcome::from(notifier.notify(payload));

    if outcome.delivered {
        info!(reference = %payload.reference_id, "referral notification sent");
    } else {
        warn!(
            reference = %payload.reference_id,
            error = %outcome.message,
            "referral notification failed"
        );
    }

    ledger.settle(&payload.reference_id, NotificationStatus::from(outcome.clone()));
    outcome
}

/// Error raised by the referral service.
#[derive(Debug, thiserror::Error)]
pub enum ReferralServiceError {
    #[error(transparent)]
    Input(#[from] InputError),
}
