//! JSON answers file for headless submissions.
//!
//! ```json
//! {
//!   "vehicles": [{"vin": "1HGCM82633A123456", "running": "running"}],
//!   "pickup_location": "Denver, CO",
//!   "drop_locations": [{"location": "Miami, FL", "vehicles": [0]}],
//!   "transport_type": "open",
//!   "timeframe": "asap",
//!   "contact": {"name": "Jane Doe", "email": "jane@example.com"}
//! }
//! ```

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr, eyre};
use serde::Deserialize;
use tracing::debug;

use shipquote_core::{LocationPatch, QuoteWizard, VehiclePatch};
use shipquote_shared::{ContactField, RunningStatus, StepKey, TransportType};
use shipquote_vin::VinDecoder;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Answers {
    pub vehicles: Vec<VehicleAnswer>,
    pub pickup_location: String,
    pub drop_locations: Vec<DropAnswer>,
    pub transport_type: Option<String>,
    pub timeframe: String,
    pub contact: ContactAnswer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct VehicleAnswer {
    pub year: String,
    pub make: String,
    pub model: String,
    pub vin: Option<String>,
    pub running: Option<String>,
}

impl VehicleAnswer {
    /// Only a VIN was given, so year/make/model have to come from a lookup.
    fn needs_lookup(&self) -> bool {
        let has_vin = self.vin.as_deref().is_some_and(|v| !v.trim().is_empty());
        has_vin && (self.make.trim().is_empty() || self.model.trim().is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DropAnswer {
    pub location: String,
    /// 0-based vehicle indexes. Only used when several vehicles go to
    /// several locations.
    pub vehicles: Vec<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ContactAnswer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

pub(crate) fn read_answers(path: &Path) -> Result<Answers> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read answers file {}", path.display()))?;
    serde_json::from_str(&content)
        .wrap_err_with(|| format!("failed to parse answers file {}", path.display()))
}

impl Answers {
    /// Copy the answers into the wizard and start VIN lookups for vehicles
    /// that only gave a VIN. Returns how many lookups were started.
    pub(crate) fn apply<D: VinDecoder + 'static>(&self, wizard: &mut QuoteWizard<D>) -> Result<usize> {
        let mut vehicle_ids: Vec<_> = wizard.state().vehicles().ids().collect();
        while vehicle_ids.len() < self.vehicles.len() {
            vehicle_ids.push(wizard.add_vehicle());
        }

        let mut lookups = 0;
        for (index, (id, answer)) in vehicle_ids.iter().zip(&self.vehicles).enumerate() {
            let running = match answer.running.as_deref() {
                Some(value) => Some(
                    RunningStatus::from_value(value)
                        .ok_or_else(|| eyre!("vehicle {}: unknown running status '{value}'", index + 1))?,
                ),
                None => None,
            };
            let patch = VehiclePatch {
                year: Some(answer.year.clone()),
                make: Some(answer.make.clone()),
                model: Some(answer.model.clone()),
                running,
                vin: answer.vin.clone(),
            };
            wizard.update_vehicle(*id, patch)?;

            if answer.needs_lookup() {
                wizard
                    .start_vin_lookup(*id)
                    .wrap_err_with(|| format!("vehicle {}", index + 1))?;
                lookups += 1;
            }
        }

        wizard.set_pickup_location(self.pickup_location.as_str());

        let mut location_ids: Vec<_> = wizard.state().drops().ids().collect();
        while location_ids.len() < self.drop_locations.len() {
            location_ids.push(wizard.add_location());
        }
        for (location, answer) in location_ids.iter().zip(&self.drop_locations) {
            wizard.update_location(*location, LocationPatch::location(answer.location.as_str()));
        }
        if wizard.assignment_enabled() {
            for (index, (location, answer)) in location_ids.iter().zip(&self.drop_locations).enumerate() {
                for vehicle in &answer.vehicles {
                    let id = vehicle_ids.get(*vehicle).ok_or_else(|| {
                        eyre!("delivery {}: no vehicle at index {vehicle}", index + 1)
                    })?;
                    wizard.toggle_assignment(*location, *id);
                }
            }
        }

        let transport = match self.transport_type.as_deref() {
            Some(value) => Some(
                TransportType::from_value(value)
                    .ok_or_else(|| eyre!("unknown transport type '{value}'"))?,
            ),
            None => None,
        };
        wizard.set_transport_type(transport);

        let timeframe = self.timeframe.trim();
        if !timeframe.is_empty()
            && !wizard
                .schema()
                .timeframe_options
                .iter()
                .any(|c| c.value == timeframe)
        {
            let known: Vec<_> = wizard
                .schema()
                .timeframe_options
                .iter()
                .map(|c| c.value.as_str())
                .collect();
            return Err(eyre!(
                "unknown timeframe '{timeframe}' (expected one of: {})",
                known.join(", ")
            ));
        }
        wizard.set_timeframe(timeframe);

        wizard.set_contact_field(ContactField::Name, self.contact.name.as_str());
        wizard.set_contact_field(ContactField::Email, self.contact.email.as_str());
        wizard.set_contact_field(ContactField::Phone, self.contact.phone.as_str());

        debug!(vehicles = vehicle_ids.len(), lookups, "answers applied");
        Ok(lookups)
    }
}

/// Step through the wizard to the terminal step. Returns the first step
/// that cannot advance.
pub(crate) fn walk<D: VinDecoder + 'static>(wizard: &mut QuoteWizard<D>) -> std::result::Result<(), StepKey> {
    loop {
        if !wizard.can_advance_current() {
            return Err(wizard.current_step());
        }
        if !wizard.next() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipquote_schema::ResolvedSchema;
    use shipquote_vin::DecodedVin;

    struct Decoder;

    impl VinDecoder for Decoder {
        async fn decode(&self, _vin: &str) -> shipquote_shared::Result<DecodedVin> {
            Ok(DecodedVin {
                year: Some("2003".into()),
                make: Some("HONDA".into()),
                model: Some("Accord".into()),
            })
        }
    }

    fn wizard() -> QuoteWizard<Decoder> {
        QuoteWizard::new(ResolvedSchema::default(), Decoder)
    }

    fn parse(json: &str) -> Answers {
        serde_json::from_str(json).expect("answers")
    }

    #[tokio::test]
    async fn vin_only_vehicle_is_looked_up() {
        let answers = parse(
            r#"{
                "vehicles": [{"vin": "1HGCM82633A123456", "running": "running"}],
                "pickup_location": "Denver, CO",
                "drop_locations": [{"location": "Miami, FL"}],
                "transport_type": "open",
                "timeframe": "asap",
                "contact": {"name": "Jane Doe", "email": "jane@example.com"}
            }"#,
        );
        let mut wizard = wizard();
        assert_eq!(answers.apply(&mut wizard).expect("apply"), 1);

        let notice = wizard.next_lookup().await.expect("notice");
        assert!(notice.is_success());
        assert_eq!(walk(&mut wizard), Ok(()));
        assert!(wizard.is_terminal());

        let lead = wizard.lead();
        assert_eq!(lead.vehicles[0].make, "Honda");
        assert_eq!(lead.contact.phone, None);
    }

    #[test]
    fn walk_reports_first_blocked_step() {
        let answers = parse(
            r#"{
                "vehicles": [{"year": "2019", "make": "Toyota", "model": "Camry", "running": "not_running"}],
                "pickup_location": "Denver, CO"
            }"#,
        );
        let mut wizard = wizard();
        assert_eq!(answers.apply(&mut wizard).expect("apply"), 0);
        assert_eq!(walk(&mut wizard), Err(StepKey::Drops));
    }

    #[test]
    fn assignments_use_vehicle_indexes() {
        let answers = parse(
            r#"{
                "vehicles": [
                    {"make": "Toyota", "model": "Camry"},
                    {"make": "Ford", "model": "F-150"}
                ],
                "drop_locations": [
                    {"location": "Miami, FL", "vehicles": [1]},
                    {"location": "Austin, TX", "vehicles": [0, 1]}
                ]
            }"#,
        );
        let mut wizard = wizard();
        answers.apply(&mut wizard).expect("apply");

        let lead = wizard.lead();
        let ids: Vec<_> = lead.vehicles.iter().map(|v| v.id).collect();
        assert_eq!(lead.drop_locations[0].vehicle_ids, vec![ids[1]]);
        assert_eq!(lead.drop_locations[1].vehicle_ids, ids);
    }

    #[test]
    fn bad_values_are_reported() {
        let mut wizard = wizard();
        assert!(parse(r#"{"transport_type": "boat"}"#).apply(&mut wizard).is_err());
        assert!(parse(r#"{"timeframe": "someday"}"#).apply(&mut wizard).is_err());
        assert!(
            parse(r#"{"vehicles": [{"running": "maybe"}]}"#)
                .apply(&mut wizard)
                .is_err()
        );
    }

    #[tokio::test]
    async fn short_vin_is_rejected_before_any_lookup() {
        let mut wizard = wizard();
        let err = parse(r#"{"vehicles": [{"vin": "1HGCM82633A12345"}]}"#)
            .apply(&mut wizard)
            .unwrap_err();
        assert!(format!("{err:#}").contains("17 characters"));
        assert_eq!(wizard.pending_lookups(), 0);
    }
}
