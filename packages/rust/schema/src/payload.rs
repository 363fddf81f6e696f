//! Wire format of the form-configuration payload published by the CMS.
//!
//! Every field is optional. CMS exports are sloppy about `null` versus
//! missing, so collections accept both.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use shipquote_shared::{Result, ShipQuoteError};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Raw, possibly partial form configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormConfig {
    /// Ordered step definitions. Empty means "use the canonical order".
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<StepDefinition>,
    /// Choices for the "does it run?" question.
    #[serde(default, deserialize_with = "null_as_default")]
    pub running_options: Vec<OptionDefinition>,
    /// Choices for open/enclosed carrier.
    #[serde(default, deserialize_with = "null_as_default")]
    pub transport_options: Vec<OptionDefinition>,
    /// Choices for the shipping timeframe.
    #[serde(default, deserialize_with = "null_as_default")]
    pub timeframe_options: Vec<OptionDefinition>,
    /// Copy strings (badge, buttons, notifications).
    #[serde(default, deserialize_with = "null_as_default")]
    pub copy: CopyDefinition,
    /// Make → models table for manual vehicle selection.
    #[serde(default, deserialize_with = "null_as_default")]
    pub vehicle_makes: BTreeMap<String, Vec<String>>,
}

/// A single step as published by the CMS.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StepDefinition {
    /// One of the seven step keys; anything else is ignored by the resolver.
    pub step_key: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Optional extra prompt shown under the description.
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<FieldDefinition>,
}

/// Field copy for a step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub placeholder: Option<String>,
}

/// One selectable choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionDefinition {
    pub value: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Copy strings. Absent or blank values fall back to built-in text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CopyDefinition {
    #[serde(default)]
    pub progress_badge: Option<String>,
    #[serde(default)]
    pub footer_disclaimer: Option<String>,
    #[serde(default)]
    pub next_label: Option<String>,
    #[serde(default)]
    pub back_label: Option<String>,
    #[serde(default)]
    pub submit_label: Option<String>,
    #[serde(default)]
    pub submitting_label: Option<String>,
    #[serde(default)]
    pub lookup_label: Option<String>,
    #[serde(default)]
    pub success_title: Option<String>,
    #[serde(default)]
    pub success_description: Option<String>,
    #[serde(default)]
    pub failure_title: Option<String>,
    #[serde(default)]
    pub failure_description: Option<String>,
    #[serde(default)]
    pub vin_success_title: Option<String>,
    #[serde(default)]
    pub vin_success_description: Option<String>,
    #[serde(default)]
    pub vin_failure_title: Option<String>,
    #[serde(default)]
    pub vin_failure_description: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a form-configuration JSON document.
pub fn parse_form_config(content: &str) -> Result<FormConfig> {
    serde_json::from_str(content)
        .map_err(|e| ShipQuoteError::parse(format!("invalid form configuration: {e}")))
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
