//! Core domain vocabulary for the quote wizard.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of characters in a decodable VIN.
pub const VIN_LENGTH: usize = 17;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! session_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new time-sortable identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

session_id!(
    /// Identifier of a vehicle entry, stable for the lifetime of a wizard.
    VehicleId
);

session_id!(
    /// Identifier of a delivery location entry.
    LocationId
);

// ---------------------------------------------------------------------------
// StepKey
// ---------------------------------------------------------------------------

/// One of the named stages of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKey {
    Vehicles,
    Running,
    Pickup,
    Drops,
    Transport,
    Timeframe,
    Contact,
}

/// Step order used when the form configuration supplies none.
pub const CANONICAL_STEP_ORDER: [StepKey; 7] = [
    StepKey::Vehicles,
    StepKey::Running,
    StepKey::Pickup,
    StepKey::Drops,
    StepKey::Transport,
    StepKey::Timeframe,
    StepKey::Contact,
];

impl StepKey {
    /// Wire name used by the form configuration payload.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vehicles => "vehicles",
            Self::Running => "running",
            Self::Pickup => "pickup",
            Self::Drops => "drops",
            Self::Transport => "transport",
            Self::Timeframe => "timeframe",
            Self::Contact => "contact",
        }
    }

    /// Parse a wire name, ignoring surrounding whitespace and case.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        CANONICAL_STEP_ORDER
            .into_iter()
            .find(|step| step.as_str() == key)
    }
}

impl std::fmt::Display for StepKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Answers
// ---------------------------------------------------------------------------

/// Whether a vehicle runs. `Unknown` means the question is still unanswered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunningStatus {
    #[default]
    Unknown,
    Running,
    NotRunning,
}

impl RunningStatus {
    pub fn is_answered(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Running => "running",
            Self::NotRunning => "not_running",
        }
    }

    /// Parse an option value from the form configuration. `Unknown` is not selectable.
    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "running" | "yes" | "true" => Some(Self::Running),
            "not_running" | "no" | "false" => Some(Self::NotRunning),
            _ => None,
        }
    }
}

impl From<bool> for RunningStatus {
    fn from(runs: bool) -> Self {
        if runs { Self::Running } else { Self::NotRunning }
    }
}

/// Carrier type requested for the shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportType {
    Open,
    Enclosed,
}

impl TransportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Enclosed => "enclosed",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "open" => Some(Self::Open),
            "enclosed" => Some(Self::Enclosed),
            _ => None,
        }
    }
}

/// The contact details the wizard collects. Closed set: the form
/// configuration can relabel or reorder these, never add new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Phone,
}

impl ContactField {
    pub const ALL: [ContactField; 3] = [Self::Name, Self::Email, Self::Phone];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }

    /// Map a schema field key onto a contact field. Accepts the common aliases
    /// CMS editors use (`full_name`, `phone_number`, ...).
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "name" | "full_name" | "fullname" => Some(Self::Name),
            "email" | "email_address" => Some(Self::Email),
            "phone" | "phone_number" | "telephone" => Some(Self::Phone),
            _ => None,
        }
    }

    /// Whether the contact step requires this field before submitting.
    pub fn is_required(&self) -> bool {
        matches!(self, Self::Name | Self::Email)
    }
}
