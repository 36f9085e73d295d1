use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

/// Supported zone codes mapped to canonical IANA identifiers. Commands accept
/// only codes from this table; an unsupported code is rejected before any
/// state change.
pub const ZONE_CODES: &[(&str, &str)] = &[
    ("UTC", "UTC"),
    ("GMT", "Etc/UTC"),
    ("BST", "Europe/London"),
    ("EST", "America/New_York"),
    ("EDT", "America/New_York"),
    ("CST", "America/Chicago"),
    ("CDT", "America/Chicago"),
    ("MST", "America/Denver"),
    ("MDT", "America/Denver"),
    ("PST", "America/Los_Angeles"),
    ("PDT", "America/Los_Angeles"),
    ("CET", "Europe/Berlin"),
    ("CEST", "Europe/Berlin"),
    ("EET", "Europe/Helsinki"),
    ("EEST", "Europe/Helsinki"),
    ("MSK", "Europe/Moscow"),
    ("IST", "Asia/Kolkata"),
    ("JST", "Asia/Tokyo"),
    ("AEST", "Australia/Sydney"),
    ("AEDT", "Australia/Sydney"),
];

/// Look up the IANA zone for a supported code (case-insensitive).
pub fn zone_for_code(code: &str) -> Result<Tz> {
    let upper = code.trim().to_uppercase();
    ZONE_CODES
        .iter()
        .find(|(c, _)| *c == upper)
        .and_then(|(_, name)| name.parse().ok())
        .ok_or_else(|| RosterError::UnknownZoneCode(code.trim().to_string()))
}

pub fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| RosterError::InvalidTime(input.trim().to_string()))
}

pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| RosterError::InvalidDate(input.trim().to_string()))
}

/// Why a reset fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FireReason {
    Recurring,
    OneShot,
    Startup,
}

impl std::fmt::Display for FireReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Recurring => write!(f, "recurring"),
            Self::OneShot => write!(f, "one_shot"),
            Self::Startup => write!(f, "startup"),
        }
    }
}

/// The reset schedule as a single tagged variant. The two modes are mutually
/// exclusive by construction: setting one replaces the whole value, and a
/// one-shot firing transitions to Idle, so partial/mixed state cannot exist.
///
/// Time, date, and zone are stored as the validated strings the admin
/// supplied. A stored value that no longer parses (hand-edited file) is
/// treated as not-configured at evaluation time rather than crashing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ResetSchedule {
    #[default]
    Idle,
    Recurring {
        time: String,
        zone_code: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        last_fired: Option<String>,
    },
    OneShot {
        date: String,
        time: String,
        zone_code: String,
    },
}

impl ResetSchedule {
    /// Build a recurring daily schedule. Validation precedes the swap: a bad
    /// request never replaces a previously valid schedule. `last_fired`
    /// starts empty so the new time takes effect the next time it is
    /// reached, even later today.
    pub fn recurring(time: &str, zone_code: &str) -> Result<Self> {
        parse_time(time)?;
        zone_for_code(zone_code)?;
        Ok(Self::Recurring {
            time: time.trim().to_string(),
            zone_code: zone_code.trim().to_uppercase(),
            last_fired: None,
        })
    }

    /// Build a one-shot schedule for an exact local instant.
    pub fn one_shot(date: &str, time: &str, zone_code: &str) -> Result<Self> {
        parse_date(date)?;
        parse_time(time)?;
        zone_for_code(zone_code)?;
        Ok(Self::OneShot {
            date: date.trim().to_string(),
            time: time.trim().to_string(),
            zone_code: zone_code.trim().to_uppercase(),
        })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Evaluate one tick at `now`. Returns the schedule to persist and the
    /// fire reason, if due. Pure: the caller performs the bulk clear,
    /// persistence, and notification.
    ///
    /// Recurring fires at most once per local calendar day: only when the
    /// watermark differs from today's local date and local time has reached
    /// the configured time. A one-shot fires exactly once — firing is what
    /// replaces its configuration with Idle, so it cannot re-fire.
    pub fn tick(&self, now: DateTime<Utc>) -> (ResetSchedule, Option<FireReason>) {
        match self {
            Self::Idle => (Self::Idle, None),
            Self::Recurring {
                time,
                zone_code,
                last_fired,
            } => {
                let (Ok(target), Ok(tz)) = (parse_time(time), zone_for_code(zone_code)) else {
                    return (self.clone(), None);
                };
                let local = now.with_timezone(&tz);
                let today = local.date_naive().to_string();
                if last_fired.as_deref() != Some(today.as_str()) && local.time() >= target {
                    (
                        Self::Recurring {
                            time: time.clone(),
                            zone_code: zone_code.clone(),
                            last_fired: Some(today),
                        },
                        Some(FireReason::Recurring),
                    )
                } else {
                    (self.clone(), None)
                }
            }
            Self::OneShot {
                date,
                time,
                zone_code,
            } => {
                let (Ok(d), Ok(t), Ok(tz)) =
                    (parse_date(date), parse_time(time), zone_for_code(zone_code))
                else {
                    return (self.clone(), None);
                };
                let Some(target) = local_instant(tz, d, t) else {
                    return (self.clone(), None);
                };
                if now >= target {
                    (Self::Idle, Some(FireReason::OneShot))
                } else {
                    (self.clone(), None)
                }
            }
        }
    }
}

impl std::fmt::Display for ResetSchedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "no reset configured"),
            Self::Recurring {
                time, zone_code, ..
            } => write!(f, "daily reset at {time} {zone_code}"),
            Self::OneShot {
                date,
                time,
                zone_code,
            } => write!(f, "one-time reset on {date} at {time} {zone_code}"),
        }
    }
}

/// Resolve a wall-clock date+time in a zone to a UTC instant. An ambiguous
/// local time (DST fall-back) takes the earlier instant; a nonexistent local
/// time (spring-forward gap) is pushed one hour forward.
fn local_instant(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    let naive = date.and_time(time);
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + chrono::Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}
