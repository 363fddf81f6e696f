//! Merges a partial [`FormConfig`] with built-in defaults.
//!
//! The output is total: every step, field, option and copy string has a
//! non-empty value, so nothing downstream needs its own fallback logic.

use std::collections::{BTreeMap, HashSet};

use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use shipquote_shared::{CANONICAL_STEP_ORDER, ContactField, RunningStatus, StepKey, TransportType};

use crate::defaults;
use crate::payload::{CopyDefinition, FieldDefinition, FormConfig, OptionDefinition, StepDefinition};

// ---------------------------------------------------------------------------
// FieldKey
// ---------------------------------------------------------------------------

/// Inputs the wizard knows how to render. Schema field keys are mapped onto
/// this closed set; anything else is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKey {
    Vin,
    Year,
    Make,
    Model,
    PickupLocation,
    DropLocation,
    Contact(ContactField),
}

impl FieldKey {
    /// Map a schema field key to a known input for `step`.
    pub fn parse(step: StepKey, key: &str) -> Option<Self> {
        let normalized = key.trim().to_ascii_lowercase();
        match step {
            StepKey::Vehicles => match normalized.as_str() {
                "vin" => Some(Self::Vin),
                "year" | "model_year" => Some(Self::Year),
                "make" => Some(Self::Make),
                "model" => Some(Self::Model),
                _ => None,
            },
            StepKey::Pickup => match normalized.as_str() {
                "pickup_location" | "pickup" | "location" | "address" => {
                    Some(Self::PickupLocation)
                }
                _ => None,
            },
            StepKey::Drops => match normalized.as_str() {
                "drop_location" | "delivery_location" | "location" | "address" => {
                    Some(Self::DropLocation)
                }
                _ => None,
            },
            StepKey::Contact => ContactField::from_key(&normalized).map(Self::Contact),
            StepKey::Running | StepKey::Transport | StepKey::Timeframe => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vin => "vin",
            Self::Year => "year",
            Self::Make => "make",
            Self::Model => "model",
            Self::PickupLocation => "pickup_location",
            Self::DropLocation => "drop_location",
            Self::Contact(field) => field.as_str(),
        }
    }
}

impl Serialize for FieldKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Resolved types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
    pub key: FieldKey,
    pub label: String,
    pub placeholder: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedStep {
    pub key: StepKey,
    pub title: String,
    pub description: String,
    /// Extra prompt text. Optional by nature, so `None` is not an empty render.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    pub fields: Vec<ResolvedField>,
}

/// One selectable answer with its display copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice<T> {
    pub value: T,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedCopy {
    pub progress_badge: String,
    pub footer_disclaimer: String,
    pub next_label: String,
    pub back_label: String,
    pub submit_label: String,
    pub submitting_label: String,
    pub lookup_label: String,
    pub success_title: String,
    pub success_description: String,
    pub failure_title: String,
    pub failure_description: String,
    pub vin_success_title: String,
    pub vin_success_description: String,
    pub vin_failure_title: String,
    pub vin_failure_description: String,
}

/// Fully populated, render-ready form schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSchema {
    pub steps: Vec<ResolvedStep>,
    pub running_options: Vec<Choice<RunningStatus>>,
    pub transport_options: Vec<Choice<TransportType>>,
    pub timeframe_options: Vec<Choice<String>>,
    pub copy: ResolvedCopy,
    pub vehicle_makes: BTreeMap<String, Vec<String>>,
}

impl Default for ResolvedSchema {
    fn default() -> Self {
        resolve(&FormConfig::default())
    }
}

impl ResolvedSchema {
    /// Step keys in render order.
    pub fn step_keys(&self) -> Vec<StepKey> {
        self.steps.iter().map(|s| s.key).collect()
    }

    pub fn step(&self, key: StepKey) -> Option<&ResolvedStep> {
        self.steps.iter().find(|s| s.key == key)
    }

    pub fn field(&self, step: StepKey, key: FieldKey) -> Option<&ResolvedField> {
        self.step(step)?.fields.iter().find(|f| f.key == key)
    }

    /// Render the progress badge, e.g. "Step 2 of 7". `current` is 1-based.
    pub fn progress_badge(&self, current: usize, total: usize) -> String {
        self.copy
            .progress_badge
            .replace("{current}", &current.to_string())
            .replace("{total}", &total.to_string())
    }

    pub fn running_label(&self, status: RunningStatus) -> &str {
        self.running_options
            .iter()
            .find(|c| c.value == status)
            .map(|c| c.label.as_str())
            .unwrap_or_else(|| defaults::running_label(status))
    }

    pub fn transport_label(&self, transport: TransportType) -> &str {
        self.transport_options
            .iter()
            .find(|c| c.value == transport)
            .map(|c| c.label.as_str())
            .unwrap_or_else(|| defaults::transport_label(transport))
    }

    /// Label of a timeframe value; unknown values render as themselves.
    pub fn timeframe_label<'a>(&'a self, value: &'a str) -> &'a str {
        self.timeframe_options
            .iter()
            .find(|c| c.value == value)
            .map(|c| c.label.as_str())
            .unwrap_or(value)
    }

    pub fn makes(&self) -> impl Iterator<Item = &str> {
        self.vehicle_makes.keys().map(String::as_str)
    }

    /// Models for a make, matched case-insensitively. Empty when unknown.
    pub fn models_for(&self, make: &str) -> &[String] {
        let make = make.trim();
        self.vehicle_makes
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(make))
            .map(|(_, models)| models.as_slice())
            .unwrap_or(&[])
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Resolve a possibly partial configuration into a total schema.
pub fn resolve(config: &FormConfig) -> ResolvedSchema {
    let schema = ResolvedSchema {
        steps: resolve_steps(&config.steps),
        running_options: resolve_choices(
            &config.running_options,
            &defaults::RUNNING_CHOICES,
            RunningStatus::from_value,
            defaults::running_label,
            |_| None,
        ),
        transport_options: resolve_choices(
            &config.transport_options,
            &defaults::TRANSPORT_CHOICES,
            TransportType::from_value,
            defaults::transport_label,
            |t| Some(defaults::transport_description(t)),
        ),
        timeframe_options: resolve_timeframes(&config.timeframe_options),
        copy: resolve_copy(&config.copy),
        vehicle_makes: resolve_makes(&config.vehicle_makes),
    };

    debug!(
        steps = ?schema.step_keys(),
        makes = schema.vehicle_makes.len(),
        "form schema resolved"
    );

    schema
}

fn resolve_steps(definitions: &[StepDefinition]) -> Vec<ResolvedStep> {
    let mut seen = HashSet::new();
    let mut steps = Vec::with_capacity(CANONICAL_STEP_ORDER.len());

    for def in definitions {
        let Some(key) = StepKey::from_key(&def.step_key) else {
            warn!(step_key = %def.step_key, "ignoring unknown step key");
            continue;
        };
        if !seen.insert(key) {
            warn!(%key, "ignoring duplicate step definition");
            continue;
        }
        steps.push(resolve_step(key, Some(def)));
    }

    if !steps.is_empty() && steps.len() < CANONICAL_STEP_ORDER.len() {
        debug!(
            supplied = steps.len(),
            "form configuration omits steps, appending the rest in canonical order"
        );
    }

    for key in CANONICAL_STEP_ORDER {
        if !seen.contains(&key) {
            steps.push(resolve_step(key, None));
        }
    }

    steps
}

fn resolve_step(key: StepKey, def: Option<&StepDefinition>) -> ResolvedStep {
    ResolvedStep {
        key,
        title: pick(def.and_then(|d| d.title.as_deref()), defaults::step_title(key)),
        description: pick(
            def.and_then(|d| d.description.as_deref()),
            defaults::step_description(key),
        ),
        prompt: def
            .and_then(|d| d.prompt.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from),
        fields: resolve_fields(key, def.map(|d| d.fields.as_slice()).unwrap_or_default()),
    }
}

fn resolve_fields(step: StepKey, definitions: &[FieldDefinition]) -> Vec<ResolvedField> {
    let known = defaults::step_fields(step);
    let mut seen = HashSet::new();
    let mut fields = Vec::with_capacity(known.len());

    for def in definitions {
        match FieldKey::parse(step, &def.key) {
            Some(key) if seen.insert(key) => fields.push(ResolvedField {
                key,
                label: pick(def.label.as_deref(), defaults::field_label(key)),
                placeholder: pick(def.placeholder.as_deref(), defaults::field_placeholder(key)),
            }),
            Some(_) => {}
            None => debug!(%step, field = %def.key, "ignoring unknown field key"),
        }
    }

    for &key in known {
        if seen.insert(key) {
            fields.push(ResolvedField {
                key,
                label: defaults::field_label(key).to_string(),
                placeholder: defaults::field_placeholder(key).to_string(),
            });
        }
    }

    fields
}

fn resolve_choices<T>(
    definitions: &[OptionDefinition],
    known: &[T],
    parse: impl Fn(&str) -> Option<T>,
    label: impl Fn(T) -> &'static str,
    description: impl Fn(T) -> Option<&'static str>,
) -> Vec<Choice<T>>
where
    T: Copy + PartialEq,
{
    let mut choices: Vec<Choice<T>> = Vec::with_capacity(known.len());

    for def in definitions {
        let Some(value) = parse(&def.value) else {
            debug!(value = %def.value, "ignoring unknown option value");
            continue;
        };
        if choices.iter().any(|c| c.value == value) {
            continue;
        }
        choices.push(Choice {
            value,
            label: pick(def.label.as_deref(), label(value)),
            description: non_blank(def.description.as_deref())
                .or_else(|| description(value).map(String::from)),
        });
    }

    for &value in known {
        if !choices.iter().any(|c| c.value == value) {
            choices.push(Choice {
                value,
                label: label(value).to_string(),
                description: description(value).map(String::from),
            });
        }
    }

    choices
}

fn resolve_timeframes(definitions: &[OptionDefinition]) -> Vec<Choice<String>> {
    let mut choices: Vec<Choice<String>> = Vec::new();

    for def in definitions {
        let value = def.value.trim();
        if value.is_empty() || choices.iter().any(|c| c.value == value) {
            continue;
        }
        let fallback = defaults::TIMEFRAME_CHOICES
            .iter()
            .find(|(v, _)| *v == value)
            .map(|(_, l)| *l)
            .unwrap_or(value);
        choices.push(Choice {
            value: value.to_string(),
            label: pick(def.label.as_deref(), fallback),
            description: non_blank(def.description.as_deref()),
        });
    }

    if choices.is_empty() {
        choices = defaults::TIMEFRAME_CHOICES
            .iter()
            .map(|(value, label)| Choice {
                value: (*value).to_string(),
                label: (*label).to_string(),
                description: None,
            })
            .collect();
    }

    choices
}

fn resolve_copy(copy: &CopyDefinition) -> ResolvedCopy {
    ResolvedCopy {
        progress_badge: pick(copy.progress_badge.as_deref(), defaults::PROGRESS_BADGE),
        footer_disclaimer: pick(copy.footer_disclaimer.as_deref(), defaults::FOOTER_DISCLAIMER),
        next_label: pick(copy.next_label.as_deref(), defaults::NEXT_LABEL),
        back_label: pick(copy.back_label.as_deref(), defaults::BACK_LABEL),
        submit_label: pick(copy.submit_label.as_deref(), defaults::SUBMIT_LABEL),
        submitting_label: pick(copy.submitting_label.as_deref(), defaults::SUBMITTING_LABEL),
        lookup_label: pick(copy.lookup_label.as_deref(), defaults::LOOKUP_LABEL),
        success_title: pick(copy.success_title.as_deref(), defaults::SUCCESS_TITLE),
        success_description: pick(
            copy.success_description.as_deref(),
            defaults::SUCCESS_DESCRIPTION,
        ),
        failure_title: pick(copy.failure_title.as_deref(), defaults::FAILURE_TITLE),
        failure_description: pick(
            copy.failure_description.as_deref(),
            defaults::FAILURE_DESCRIPTION,
        ),
        vin_success_title: pick(copy.vin_success_title.as_deref(), defaults::VIN_SUCCESS_TITLE),
        vin_success_description: pick(
            copy.vin_success_description.as_deref(),
            defaults::VIN_SUCCESS_DESCRIPTION,
        ),
        vin_failure_title: pick(copy.vin_failure_title.as_deref(), defaults::VIN_FAILURE_TITLE),
        vin_failure_description: pick(
            copy.vin_failure_description.as_deref(),
            defaults::VIN_FAILURE_DESCRIPTION,
        ),
    }
}

fn resolve_makes(makes: &BTreeMap<String, Vec<String>>) -> BTreeMap<String, Vec<String>> {
    let resolved: BTreeMap<String, Vec<String>> = makes
        .iter()
        .filter_map(|(make, models)| {
            let make = make.trim();
            if make.is_empty() {
                return None;
            }
            let mut models: Vec<String> = models
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect();
            models.dedup();
            Some((make.to_string(), models))
        })
        .collect();

    if !resolved.is_empty() {
        return resolved;
    }

    defaults::VEHICLE_MAKES
        .iter()
        .map(|(make, models)| {
            (
                (*make).to_string(),
                models.iter().map(|m| (*m).to_string()).collect(),
            )
        })
        .collect()
}

/// Remote value if it has visible content, otherwise the fallback.
fn pick(remote: Option<&str>, fallback: &str) -> String {
    non_blank(remote).unwrap_or_else(|| fallback.to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::parse_form_config;

    fn assert_total(schema: &ResolvedSchema) {
        assert_eq!(schema.steps.len(), CANONICAL_STEP_ORDER.len());
        for step in &schema.steps {
            assert!(!step.title.is_empty(), "{} title empty", step.key);
            assert!(!step.description.is_empty(), "{} description empty", step.key);
            for field in &step.fields {
                assert!(!field.label.is_empty());
                assert!(!field.placeholder.is_empty());
            }
        }
        assert!(schema.running_options.iter().all(|c| !c.label.is_empty()));
        assert!(schema.transport_options.iter().all(|c| !c.label.is_empty()));
        assert!(!schema.timeframe_options.is_empty());
        assert!(schema.timeframe_options.iter().all(|c| !c.label.is_empty()));
        let copy = serde_json::to_value(&schema.copy).expect("serialize copy");
        for (name, value) in copy.as_object().expect("copy object") {
            assert!(!value.as_str().unwrap_or_default().is_empty(), "{name} empty");
        }
    }

    #[test]
    fn empty_config_uses_canonical_order() {
        let schema = ResolvedSchema::default();
        assert_eq!(schema.step_keys(), CANONICAL_STEP_ORDER.to_vec());
        assert_total(&schema);
    }

    #[test]
    fn remote_order_is_authoritative() {
        let config = parse_form_config(
            r#"{"steps": [
                {"step_key": "timeframe"},
                {"step_key": "transport"},
                {"step_key": "vehicles"},
                {"step_key": "running"},
                {"step_key": "pickup"},
                {"step_key": "drops"},
                {"step_key": "contact"}
            ]}"#,
        )
        .expect("parse");
        let schema = resolve(&config);
        assert_eq!(
            schema.step_keys(),
            vec![
                StepKey::Timeframe,
                StepKey::Transport,
                StepKey::Vehicles,
                StepKey::Running,
                StepKey::Pickup,
                StepKey::Drops,
                StepKey::Contact,
            ]
        );
    }

    #[test]
    fn omitted_steps_are_appended_in_canonical_order() {
        let config = parse_form_config(
            r#"{"steps": [{"step_key": "contact"}, {"step_key": "pickup"}]}"#,
        )
        .expect("parse");
        let schema = resolve(&config);
        assert_eq!(
            schema.step_keys(),
            vec![
                StepKey::Contact,
                StepKey::Pickup,
                StepKey::Vehicles,
                StepKey::Running,
                StepKey::Drops,
                StepKey::Transport,
                StepKey::Timeframe,
            ]
        );
    }

    #[test]
    fn unknown_and_duplicate_steps_are_skipped() {
        let config = parse_form_config(
            r#"{"steps": [
                {"step_key": "payment", "title": "Pay now"},
                {"step_key": "pickup", "title": "First"},
                {"step_key": "pickup", "title": "Second"}
            ]}"#,
        )
        .expect("parse");
        let schema = resolve(&config);
        assert_eq!(schema.steps[0].key, StepKey::Pickup);
        assert_eq!(schema.steps[0].title, "First");
        assert_eq!(schema.steps.len(), CANONICAL_STEP_ORDER.len());
    }

    #[test]
    fn blank_remote_copy_falls_back() {
        let config = parse_form_config(
            r#"{
                "steps": [{"step_key": "vehicles", "title": "   ", "description": "Custom"}],
                "copy": {"submit_label": "", "next_label": "Continue"}
            }"#,
        )
        .expect("parse");
        let schema = resolve(&config);
        let vehicles = schema.step(StepKey::Vehicles).expect("vehicles step");
        assert_eq!(vehicles.title, defaults::step_title(StepKey::Vehicles));
        assert_eq!(vehicles.description, "Custom");
        assert_eq!(schema.copy.submit_label, defaults::SUBMIT_LABEL);
        assert_eq!(schema.copy.next_label, "Continue");
        assert_total(&schema);
    }

    #[test]
    fn contact_fields_are_a_closed_set() {
        let config = parse_form_config(
            r#"{"steps": [{"step_key": "contact", "fields": [
                {"key": "email", "label": "Work email"},
                {"key": "company", "label": "Company"},
                {"key": "full_name"}
            ]}]}"#,
        )
        .expect("parse");
        let schema = resolve(&config);
        let keys: Vec<FieldKey> = schema
            .step(StepKey::Contact)
            .expect("contact step")
            .fields
            .iter()
            .map(|f| f.key)
            .collect();
        assert_eq!(
            keys,
            vec![
                FieldKey::Contact(ContactField::Email),
                FieldKey::Contact(ContactField::Name),
                FieldKey::Contact(ContactField::Phone),
            ]
        );
        let email = schema
            .field(StepKey::Contact, FieldKey::Contact(ContactField::Email))
            .expect("email field");
        assert_eq!(email.label, "Work email");
        assert_eq!(email.placeholder, "jane@example.com");
    }

    #[test]
    fn option_lists_fill_missing_choices() {
        let config = parse_form_config(
            r#"{
                "transport_options": [{"value": "enclosed", "label": "White glove"}, {"value": "flatbed"}],
                "running_options": [{"value": "running", "label": ""}]
            }"#,
        )
        .expect("parse");
        let schema = resolve(&config);
        assert_eq!(schema.transport_options.len(), 2);
        assert_eq!(schema.transport_options[0].value, TransportType::Enclosed);
        assert_eq!(schema.transport_label(TransportType::Enclosed), "White glove");
        assert_eq!(
            schema.transport_label(TransportType::Open),
            defaults::transport_label(TransportType::Open)
        );
        assert_eq!(schema.running_options.len(), 2);
        assert_eq!(
            schema.running_label(RunningStatus::Running),
            defaults::running_label(RunningStatus::Running)
        );
    }

    #[test]
    fn remote_timeframes_replace_defaults() {
        let config = parse_form_config(
            r#"{"timeframe_options": [{"value": "asap"}, {"value": "next_month", "label": "Next month"}, {"value": " "}]}"#,
        )
        .expect("parse");
        let schema = resolve(&config);
        assert_eq!(schema.timeframe_options.len(), 2);
        assert_eq!(schema.timeframe_label("asap"), "As soon as possible");
        assert_eq!(schema.timeframe_label("next_month"), "Next month");
        assert_eq!(schema.timeframe_label("someday"), "someday");
    }

    #[test]
    fn vehicle_catalog_lookup() {
        let schema = ResolvedSchema::default();
        assert!(schema.makes().any(|m| m == "Honda"));
        assert!(schema.models_for("honda").iter().any(|m| m == "Accord"));
        assert!(schema.models_for("Yugo").is_empty());

        let config =
            parse_form_config(r#"{"vehicle_makes": {"Lada": ["Niva", " "], " ": ["x"]}}"#)
                .expect("parse");
        let schema = resolve(&config);
        assert_eq!(schema.makes().collect::<Vec<_>>(), vec!["Lada"]);
        assert_eq!(schema.models_for("Lada"), ["Niva".to_string()]);
    }

    #[test]
    fn progress_badge_substitutes_placeholders() {
        let schema = ResolvedSchema::default();
        assert_eq!(schema.progress_badge(2, 7), "Step 2 of 7");
    }

    #[test]
    fn fixture_resolves_completely() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/form-config.fixture.json")
            .expect("read fixture");
        let schema = resolve(&parse_form_config(&fixture).expect("parse fixture"));
        assert_total(&schema);
        assert_eq!(schema.copy.submit_label, "Get My Free Quote");
    }
}
