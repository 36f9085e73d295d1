use thiserror::Error;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("not a roster directory (run `roster init` first)")]
    NotInitialized,

    #[error("roster already initialized in this directory")]
    AlreadyInitialized,

    #[error("unknown tag '{0}'")]
    UnknownTag(String),

    #[error("holder id must be non-empty")]
    InvalidHolder,

    #[error("invalid time '{0}': expected HH:MM (24-hour)")]
    InvalidTime(String),

    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("unsupported zone code '{0}' (see `roster timezones`)")]
    UnknownZoneCode(String),

    #[error("claims file is corrupt: holder '{0}' holds multiple tags ({1})")]
    DuplicateHolder(String, String),

    #[error("catalog file '{0}' is invalid: {1}")]
    InvalidCatalog(String, String),

    #[error("locked by another process: {0}")]
    Locked(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RosterError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::AlreadyInitialized => "already_initialized",
            Self::UnknownTag(_) => "unknown_tag",
            Self::InvalidHolder => "invalid_holder",
            Self::InvalidTime(_) => "invalid_time",
            Self::InvalidDate(_) => "invalid_date",
            Self::UnknownZoneCode(_) => "unknown_zone_code",
            Self::DuplicateHolder(_, _) => "duplicate_holder",
            Self::InvalidCatalog(_, _) => "invalid_catalog",
            Self::Locked(_) => "locked",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, RosterError>;
