//! Colonoscopy referral triage.
//!
//! A raw form record is validated into a [`PatientInput`], then the fitness
//! assessor and the clinical classifier run independently and their outputs
//! are reconciled into one [`ReferralResult`]. Procedure-ready referrals are
//! handed to a [`ReferralNotifier`] without waiting for delivery.

pub mod domain;
pub mod evaluation;
pub mod notification;
pub mod rationale;
pub mod reference;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{FamilyHistory, FitnessIndicators, InputError, PatientInput, RawReferral, Sex};
pub use evaluation::{
    assess_fitness, classify, Category, Classification, Criterion, FitnessFinding, FitnessPolicy,
    FitnessSeverity, ReferralEngine, ReferralResult, TriageConfig,
};
pub use notification::{
    NotificationError, NotificationLedger, NotificationOutcome, NotificationPayload,
    NotificationStatus, ReferralNotifier, DEFAULT_LEDGER_CAPACITY,
};
pub use rationale::Rationale;
pub use reference::ReferenceId;
pub use router::{referral_router, ReferralResponse};
pub use service::{ReferralService, ReferralServiceError, ReferralSubmission};
