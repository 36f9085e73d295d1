use serde::{Deserialize, Serialize};

use crate::schedule::ResetSchedule;

/// Durable service configuration (`config.json`). Rewritten in full on every
/// mutation; a missing or unparseable file recovers to defaults and is
/// immediately rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// While true, new claims and swaps are rejected; releases and
    /// administrative operations still work.
    pub locked: bool,
    /// True: a swap suspends for an interactive yes/no from the requester.
    /// False (silent mode): swaps apply immediately, reported only through
    /// the event feed.
    pub confirm_swaps: bool,
    /// How long a pending swap confirmation stays answerable.
    pub confirm_ttl_secs: u64,
    /// Wipe all claims once when the watch loop starts.
    pub startup_reset: bool,
    /// Opaque handle to the most recent rendered view, owned by the
    /// rendering collaborator but persisted here so it survives restarts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render_ref: Option<String>,
    pub schedule: ResetSchedule,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            locked: false,
            confirm_swaps: false,
            confirm_ttl_secs: 60,
            startup_reset: true,
            render_ref: None,
            schedule: ResetSchedule::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_unlocked_silent_idle() {
        let config = RosterConfig::default();
        assert!(!config.locked);
        assert!(!config.confirm_swaps);
        assert!(config.startup_reset);
        assert_eq!(config.schedule, ResetSchedule::Idle);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: RosterConfig = serde_json::from_str(r#"{"locked": true}"#).unwrap();
        assert!(config.locked);
        assert_eq!(config.confirm_ttl_secs, 60);
        assert_eq!(config.schedule, ResetSchedule::Idle);
    }

    #[test]
    fn round_trips_with_schedule() {
        let mut config = RosterConfig::default();
        config.schedule = ResetSchedule::recurring("08:00", "UTC").unwrap();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: RosterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
