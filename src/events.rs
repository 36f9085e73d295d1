use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schedule::{FireReason, ResetSchedule};

/// Structured notification payloads pushed to the event feed after each
/// durable mutation. Consumers format user-facing text from these; the core
/// never renders final messages itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Claimed {
        tag: String,
        holder: String,
    },
    Released {
        tag: String,
        holder: String,
    },
    Swapped {
        from: String,
        to: String,
        holder: String,
    },
    Locked,
    Unlocked,
    ForcedAssign {
        tag: String,
        holder: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        displaced: Option<String>,
    },
    ForcedUnassign {
        tag: String,
        holder: String,
    },
    ResetFired {
        reason: FireReason,
        cleared: usize,
    },
    ResetConfigured {
        schedule: ResetSchedule,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn now(kind: EventKind) -> Self {
        Self {
            ts: Utc::now(),
            kind,
        }
    }
}
