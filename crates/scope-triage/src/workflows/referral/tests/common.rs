use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::workflows::referral::domain::{PatientInput, RawReferral, Sex};
use crate::workflows::referral::evaluation::{FitnessPolicy, ReferralEngine, TriageConfig};
use crate::workflows::referral::notification::{
    NotificationError, NotificationPayload, ReferralNotifier,
};
use crate::workflows::referral::{referral_router, ReferralService};

pub(super) fn escalation_engine() -> ReferralEngine {
    ReferralEngine::new(TriageConfig::default())
}

pub(super) fn baseline_engine() -> ReferralEngine {
    ReferralEngine::new(TriageConfig {
        fitness_policy: FitnessPolicy::Baseline,
        ..TriageConfig::default()
    })
}

/// No positive flags, ECOG 0.
pub(super) fn patient(age: u8) -> PatientInput {
    let mut input = PatientInput::new(age, Sex::Female);
    input.fitness.ecog = Some(0);
    input
}

pub(super) fn urgent_record() -> RawReferral {
    RawReferral::from([
        ("age", "60"),
        ("sex", "M"),
        ("rectal_bleeding", "Yes"),
        ("ida", "Yes"),
        ("ecog", "0"),
        ("cognition", "yes"),
        ("comorbidity", "no"),
        ("prep", "no"),
        ("sedation", "no"),
    ])
}

pub(super) fn not_indicated_record() -> RawReferral {
    RawReferral::from([("age", "30"), ("sex", "F")])
}

pub(super) fn unfit_routine_record() -> RawReferral {
    RawReferral::from([("age", "70"), ("sex", "F"), ("polyp", "Yes"), ("ecog", "3")])
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    sent: Arc<Mutex<Vec<NotificationPayload>>>,
}

impl MemoryNotifier {
    pub(super) fn sent(&self) -> Vec<NotificationPayload> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl ReferralNotifier for MemoryNotifier {
    fn notify(&self, payload: &NotificationPayload) -> Result<String, NotificationError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push(payload.clone());
        Ok(format!("Email sent for referral #{}.", payload.reference_id))
    }
}

pub(super) struct OfflineNotifier;

impl ReferralNotifier for OfflineNotifier {
    fn notify(&self, _payload: &NotificationPayload) -> Result<String, NotificationError> {
        Err(NotificationError::Transport("smtp connection refused".to_string()))
    }
}

pub(super) fn build_service() -> (ReferralService<MemoryNotifier>, Arc<MemoryNotifier>) {
    let notifier = Arc::new(MemoryNotifier::default());
    let service = ReferralService::new(notifier.clone(), TriageConfig::default());
    (service, notifier)
}

pub(super) fn router_with_service(service: ReferralService<MemoryNotifier>) -> axum::Router {
    referral_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
