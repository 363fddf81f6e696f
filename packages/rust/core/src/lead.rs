//! The structured lead forwarded to the broker's backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shipquote_shared::{LocationId, RunningStatus, TransportType, VehicleId};

use crate::state::WizardState;

/// Submission body. Built from a snapshot of the wizard's answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadPayload {
    pub lead_id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub vehicles: Vec<LeadVehicle>,
    pub pickup_location: String,
    pub drop_locations: Vec<LeadDropLocation>,
    pub transport_type: Option<TransportType>,
    pub timeframe: String,
    pub contact: LeadContact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadVehicle {
    pub id: VehicleId,
    /// Display name, e.g. "2019 Toyota Camry".
    pub name: String,
    pub year: String,
    pub make: String,
    pub model: String,
    pub running: RunningStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vin: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDropLocation {
    pub id: LocationId,
    pub label: String,
    pub location: String,
    /// Vehicles bound for this location, in vehicle order.
    pub vehicle_ids: Vec<VehicleId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadContact {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl LeadPayload {
    /// Snapshot the answers. Text is trimmed and optional blanks are omitted.
    ///
    /// Without per-location assignment (a single vehicle or a single
    /// location) every location lists every vehicle.
    pub fn from_state(state: &WizardState) -> Self {
        let vehicles: Vec<LeadVehicle> = state
            .vehicles()
            .iter()
            .enumerate()
            .map(|(index, v)| LeadVehicle {
                id: v.id,
                name: v.display_name(index),
                year: v.year.trim().to_string(),
                make: v.make.trim().to_string(),
                model: v.model.trim().to_string(),
                running: v.running,
                vin: non_blank(&v.vin),
            })
            .collect();

        let explicit = state.assignment_enabled();
        let drops = state.drops();
        let drop_locations = drops
            .iter()
            .enumerate()
            .map(|(index, d)| {
                let vehicle_ids = if explicit {
                    let assigned = drops.assigned_vehicles(d.id);
                    vehicles
                        .iter()
                        .map(|v| v.id)
                        .filter(|id| assigned.contains(id))
                        .collect()
                } else {
                    vehicles.iter().map(|v| v.id).collect()
                };
                LeadDropLocation {
                    id: d.id,
                    label: drops.label(index),
                    location: d.location.trim().to_string(),
                    vehicle_ids,
                }
            })
            .collect();

        let contact = state.contact();
        Self {
            lead_id: Uuid::now_v7(),
            submitted_at: Utc::now(),
            vehicles,
            pickup_location: state.pickup_location().trim().to_string(),
            drop_locations,
            transport_type: state.transport_type(),
            timeframe: state.timeframe().to_string(),
            contact: LeadContact {
                name: contact.name.trim().to_string(),
                email: contact.email.trim().to_string(),
                phone: non_blank(&contact.phone),
            },
        }
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
