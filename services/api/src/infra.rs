use metrics_exporter_prometheus::PrometheusHandle;
use scope_triage::config::NotificationConfig;
use scope_triage::workflows::referral::{
    NotificationError, NotificationPayload, ReferralNotifier,
};
use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Message as it would be handed to the SMTP relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OutboundEmail {
    pub(crate) from: String,
    pub(crate) to: String,
    pub(crate) subject: String,
    pub(crate) text: String,
}

/// Emails an outbox keeps for inspection unless told otherwise.
pub(crate) const DEFAULT_OUTBOX_RETENTION: usize = 32;

/// In-process outbox standing in for the mail transport.
///
/// Only the most recent `retention` emails are kept; zero keeps none.
#[derive(Default, Clone)]
pub(crate) struct OutboxNotifier {
    envelope: NotificationConfig,
    retention: usize,
    outbox: Arc<Mutex<VecDeque<OutboundEmail>>>,
}

impl OutboxNotifier {
    pub(crate) fn new(envelope: NotificationConfig) -> Self {
        Self {
            envelope,
            retention: DEFAULT_OUTBOX_RETENTION,
            outbox: Arc::default(),
        }
    }

    pub(crate) fn with_retention(mut self, retention: usize) -> Self {
        self.retention = retention;
        self
    }

    pub(crate) fn outbox(&self) -> Vec<OutboundEmail> {
        self.outbox
            .lock()
            .expect("outbox mutex poisoned")
            .iter()
            .cloned()
            .collect()
    }
}

impl ReferralNotifier for OutboxNotifier {
    fn notify(&self, payload: &NotificationPayload) -> Result<String, NotificationError> {
        let (Some(sender), Some(recipient)) = (&self.envelope.sender, &self.envelope.recipient)
        else {
            return Err(NotificationError::NotConfigured);
        };

        let email = OutboundEmail {
            from: format!("\"Scope Referral Tool\" <{sender}>"),
            to: recipient.clone(),
            subject: payload.subject(),
            text: payload.text_body(),
        };
        debug!(
            reference = %payload.reference_id,
            from = %email.from,
            to = %email.to,
            subject = %email.subject,
            "queued referral email"
        );

        if self.retention > 0 {
            let mut outbox = self.outbox.lock().expect("outbox mutex poisoned");
            outbox.push_back(email);
            while outbox.len() > self.retention {
                outbox.pop_front();
            }
        }
        Ok(format!("Email queued for referral #{}.", payload.reference_id))
    }
}

pub(crate) fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("expected key=value, got '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
