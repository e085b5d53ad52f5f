use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::workflows::referral::{FitnessPolicy, TriageConfig, DEFAULT_LEDGER_CAPACITY};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub triage: TriageConfig,
    pub notifications: NotificationConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            triage: load_triage_config()?,
            notifications: load_notification_config()?,
        })
    }
}

fn load_triage_config() -> Result<TriageConfig, ConfigError> {
    let defaults = TriageConfig::default();

    let fitness_policy = match env::var("TRIAGE_FITNESS_POLICY") {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "baseline" => FitnessPolicy::Baseline,
            "escalation" => FitnessPolicy::Escalation,
            _ => return Err(ConfigError::InvalidFitnessPolicy(raw)),
        },
        Err(_) => defaults.fitness_policy,
    };

    let escalation_min_warnings = match env::var("TRIAGE_ESCALATION_MIN_WARNINGS") {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|count| *count >= 1)
            .ok_or(ConfigError::InvalidThreshold {
                key: "TRIAGE_ESCALATION_MIN_WARNINGS",
                value: raw,
            })?,
        Err(_) => defaults.escalation_min_warnings,
    };

    let escalation_min_ecog = match env::var("TRIAGE_ESCALATION_MIN_ECOG") {
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|grade| *grade <= 4)
            .ok_or(ConfigError::InvalidThreshold {
                key: "TRIAGE_ESCALATION_MIN_ECOG",
                value: raw,
            })?,
        Err(_) => defaults.escalation_min_ecog,
    };

    Ok(TriageConfig {
        fitness_policy,
        escalation_min_warnings,
        escalation_min_ecog,
    })
}

fn load_notification_config() -> Result<NotificationConfig, ConfigError> {
    let ledger_capacity = match env::var("NOTIFY_LEDGER_CAPACITY") {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|capacity| *capacity >= 1)
            .ok_or(ConfigError::InvalidThreshold {
                key: "NOTIFY_LEDGER_CAPACITY",
                value: raw,
            })?,
        Err(_) => DEFAULT_LEDGER_CAPACITY,
    };

    Ok(NotificationConfig {
        sender: non_empty_var("NOTIFY_SENDER"),
        recipient: non_empty_var("NOTIFY_RECIPIENT"),
        ledger_capacity,
    })
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Mail envelope used by the referral notifier. Both ends must be set for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    /// Dispatched notifications kept queryable by reference.
    pub ledger_capacity: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            sender: None,
            recipient: None,
            ledger_capacity: DEFAULT_LEDGER_CAPACITY,
        }
    }
}

impl NotificationConfig {
    pub fn is_configured(&self) -> bool {
        self.sender.is_some() && self.recipient.is_some()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFitnessPolicy(String),
    InvalidThreshold { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFitnessPolicy(value) => write!(
                f,
                "TRIAGE_FITNESS_POLICY must be 'baseline' or 'escalation' (found '{value}')"
            ),
            ConfigError::InvalidThreshold { key, value } => {
                write!(f, "{key} is out of range (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFitnessPolicy(_)
            | ConfigError::InvalidThreshold { .. } => None,
        }
    }
}
