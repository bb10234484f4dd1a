//! Rotation Policy
//!
//! The four durations every decision is measured against. A policy is built
//! once by the process entry point and passed into each evaluation.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{LifecycleError, LifecycleResult};

const DAY_SECS: u64 = 24 * 3600;

/// Serializable form of a policy
///
/// Durations use humantime notation (`"90days"`, `"7d"`, `"12h"`).
///
/// # Example
///
/// ```
/// use keycycle_lifecycle::{PolicyConfig, PolicySettings};
///
/// let settings: PolicySettings = serde_json::from_str(
///     r#"{ "rotation_period": "30days", "warn_lead_time": "3days" }"#,
/// ).unwrap();
/// let policy = PolicyConfig::try_from(settings).unwrap();
/// assert_eq!(policy.rotation_period().num_days(), 30);
/// assert_eq!(policy.installation_grace().num_days(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Age at which an active key must be rotated
    #[serde(with = "humantime_serde")]
    pub rotation_period: Duration,

    /// Window after a new key is issued during which the old one stays active
    #[serde(with = "humantime_serde")]
    pub installation_grace_period: Duration,

    /// Window after deactivation before the key is permanently removed
    #[serde(with = "humantime_serde")]
    pub recovery_grace_period: Duration,

    /// How far ahead of a transition a warning is raised
    #[serde(with = "humantime_serde")]
    pub warn_lead_time: Duration,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            rotation_period: Duration::from_secs(90 * DAY_SECS),
            installation_grace_period: Duration::from_secs(7 * DAY_SECS),
            recovery_grace_period: Duration::from_secs(7 * DAY_SECS),
            warn_lead_time: Duration::from_secs(7 * DAY_SECS),
        }
    }
}

/// Validated rotation policy
///
/// Immutable for the duration of an evaluation run. Holds the calendar
/// offsets used for timestamp arithmetic next to the settings they came from.
///
/// # Example
///
/// ```
/// use keycycle_lifecycle::PolicyConfig;
/// use std::time::Duration;
///
/// let policy = PolicyConfig::new(
///     Duration::from_secs(90 * 24 * 3600), // rotation
///     Duration::from_secs(7 * 24 * 3600),  // installation grace
///     Duration::from_secs(7 * 24 * 3600),  // recovery grace
///     Duration::from_secs(7 * 24 * 3600),  // warn lead time
/// ).unwrap();
/// assert_eq!(policy, PolicyConfig::default());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PolicySettings", into = "PolicySettings")]
pub struct PolicyConfig {
    settings: PolicySettings,
    rotation_period: TimeDelta,
    installation_grace: TimeDelta,
    recovery_grace: TimeDelta,
    warn_lead_time: TimeDelta,
}

impl PolicyConfig {
    /// Create a policy from four non-negative durations
    pub fn new(
        rotation_period: Duration,
        installation_grace_period: Duration,
        recovery_grace_period: Duration,
        warn_lead_time: Duration,
    ) -> LifecycleResult<Self> {
        Self::try_from(PolicySettings {
            rotation_period,
            installation_grace_period,
            recovery_grace_period,
            warn_lead_time,
        })
    }

    /// Create a policy from whole days
    pub fn from_days(
        rotation_period: u32,
        installation_grace_period: u32,
        recovery_grace_period: u32,
        warn_lead_time: u32,
    ) -> Self {
        let days = |n: u32| Duration::from_secs(u64::from(n) * DAY_SECS);
        // u32 days always fit in a TimeDelta
        let delta = |n: u32| TimeDelta::days(i64::from(n));
        Self {
            settings: PolicySettings {
                rotation_period: days(rotation_period),
                installation_grace_period: days(installation_grace_period),
                recovery_grace_period: days(recovery_grace_period),
                warn_lead_time: days(warn_lead_time),
            },
            rotation_period: delta(rotation_period),
            installation_grace: delta(installation_grace_period),
            recovery_grace: delta(recovery_grace_period),
            warn_lead_time: delta(warn_lead_time),
        }
    }

    /// Get the rotation period
    pub fn rotation_period(&self) -> TimeDelta {
        self.rotation_period
    }

    /// Get the installation grace period
    pub fn installation_grace(&self) -> TimeDelta {
        self.installation_grace
    }

    /// Get the recovery grace period
    pub fn recovery_grace(&self) -> TimeDelta {
        self.recovery_grace
    }

    /// Get the warning lead time
    pub fn warn_lead_time(&self) -> TimeDelta {
        self.warn_lead_time
    }

    /// Get the settings this policy was built from
    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self::from_days(90, 7, 7, 7)
    }
}

impl TryFrom<PolicySettings> for PolicyConfig {
    type Error = LifecycleError;

    fn try_from(settings: PolicySettings) -> LifecycleResult<Self> {
        let convert = |field: &str, value: Duration| {
            TimeDelta::from_std(value).map_err(|_| LifecycleError::InvalidPolicy {
                reason: format!("{field} of {value:?} is out of range"),
            })
        };

        Ok(Self {
            rotation_period: convert("rotation_period", settings.rotation_period)?,
            installation_grace: convert(
                "installation_grace_period",
                settings.installation_grace_period,
            )?,
            recovery_grace: convert("recovery_grace_period", settings.recovery_grace_period)?,
            warn_lead_time: convert("warn_lead_time", settings.warn_lead_time)?,
            settings,
        })
    }
}

impl From<PolicyConfig> for PolicySettings {
    fn from(policy: PolicyConfig) -> Self {
        policy.settings
    }
}
