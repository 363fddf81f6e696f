//! The wizard's answers and the per-step advance rules.

use std::collections::HashSet;

use serde::Serialize;

use shipquote_shared::{
    ContactField, LocationId, Result, ShipQuoteError, StepKey, TransportType, VehicleId,
};

use crate::drops::{DropLocationStore, LocationPatch};
use crate::vehicles::{VehiclePatch, VehicleStore};

/// Contact details.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Contact {
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Phone => &self.phone,
        }
    }

    pub fn set(&mut self, field: ContactField, value: impl Into<String>) {
        let slot = match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Phone => &mut self.phone,
        };
        *slot = value.into();
    }

    fn required_filled(&self) -> bool {
        ContactField::ALL
            .iter()
            .filter(|f| f.is_required())
            .all(|f| !is_blank(self.get(*f)))
    }
}

/// Everything the customer has entered so far.
///
/// All mutation goes through methods so the store invariants (one vehicle,
/// one location, no dangling assignments) hold after every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WizardState {
    current_step: StepKey,
    vehicles: VehicleStore,
    pickup_location: String,
    drops: DropLocationStore,
    transport_type: Option<TransportType>,
    timeframe: String,
    contact: Contact,
}

impl WizardState {
    /// Fresh state: one empty vehicle, one empty location, positioned at `first_step`.
    pub fn new(first_step: StepKey) -> Self {
        Self {
            current_step: first_step,
            vehicles: VehicleStore::new(),
            pickup_location: String::new(),
            drops: DropLocationStore::new(),
            transport_type: None,
            timeframe: String::new(),
            contact: Contact::default(),
        }
    }

    pub fn current_step(&self) -> StepKey {
        self.current_step
    }

    pub(crate) fn set_current_step(&mut self, step: StepKey) {
        self.current_step = step;
    }

    pub fn vehicles(&self) -> &VehicleStore {
        &self.vehicles
    }

    pub fn drops(&self) -> &DropLocationStore {
        &self.drops
    }

    pub fn pickup_location(&self) -> &str {
        &self.pickup_location
    }

    pub fn transport_type(&self) -> Option<TransportType> {
        self.transport_type
    }

    pub fn timeframe(&self) -> &str {
        &self.timeframe
    }

    pub fn contact(&self) -> &Contact {
        &self.contact
    }

    // -- advance rules -----------------------------------------------------

    /// Whether `step` has everything it needs. Depends on nothing but `self`.
    pub fn can_advance(&self, step: StepKey) -> bool {
        match step {
            StepKey::Vehicles => self.vehicles.all_complete(),
            StepKey::Running => self.vehicles.all_running_answered(),
            StepKey::Pickup => !is_blank(&self.pickup_location),
            StepKey::Drops => self.drops.all_filled(),
            StepKey::Transport => self.transport_type.is_some(),
            StepKey::Timeframe => !is_blank(&self.timeframe),
            StepKey::Contact => self.contact.required_filled(),
        }
    }

    /// Per-location assignment only matters with several vehicles and
    /// several locations; otherwise every vehicle goes everywhere implicitly.
    pub fn assignment_enabled(&self) -> bool {
        self.vehicles.len() > 1 && self.drops.len() > 1
    }

    // -- vehicles ----------------------------------------------------------

    pub fn add_vehicle(&mut self) -> VehicleId {
        self.vehicles.add()
    }

    /// Remove a vehicle and cascade the removal into every location's assignments.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> bool {
        if !self.vehicles.remove(id) {
            return false;
        }
        let live = self.live_vehicle_ids();
        let pruned = self.drops.retain_vehicles(&live);
        tracing::debug!(vehicle = %id, pruned, "vehicle removed");
        debug_assert!(self.check_invariants().is_ok());
        true
    }

    pub fn update_vehicle(&mut self, id: VehicleId, patch: VehiclePatch) -> bool {
        self.vehicles.update(id, patch)
    }

    /// Mark a lookup as started. Returns the VIN to decode, or `None` for an unknown id.
    pub(crate) fn begin_lookup(&mut self, id: VehicleId) -> Option<String> {
        let vehicle = self.vehicles.get_mut(id)?;
        vehicle.vin_lookup_pending = true;
        Some(vehicle.vin.clone())
    }

    /// Clear the pending flag and, when a decode succeeded, overwrite year/make/model.
    pub(crate) fn finish_lookup(&mut self, id: VehicleId, decoded: Option<VehiclePatch>) -> bool {
        let Some(vehicle) = self.vehicles.get_mut(id) else {
            return false;
        };
        vehicle.vin_lookup_pending = false;
        if let Some(patch) = decoded {
            self.vehicles.update(id, patch);
        }
        true
    }

    // -- locations ---------------------------------------------------------

    pub fn add_location(&mut self) -> LocationId {
        self.drops.add()
    }

    pub fn remove_location(&mut self, id: LocationId) -> bool {
        self.drops.remove(id)
    }

    pub fn update_location(&mut self, id: LocationId, patch: LocationPatch) -> bool {
        self.drops.update(id, patch)
    }

    /// Toggle a vehicle on a location. Unknown vehicles or locations are ignored.
    pub fn toggle_assignment(&mut self, location: LocationId, vehicle: VehicleId) -> bool {
        if self.vehicles.get(vehicle).is_none() {
            return false;
        }
        self.drops.toggle_assignment(location, vehicle).is_some()
    }

    // -- remaining answers -------------------------------------------------

    pub fn set_pickup_location(&mut self, text: impl Into<String>) {
        self.pickup_location = text.into();
    }

    pub fn set_transport_type(&mut self, transport: Option<TransportType>) {
        self.transport_type = transport;
    }

    pub fn set_timeframe(&mut self, value: impl Into<String>) {
        self.timeframe = value.into();
    }

    pub fn set_contact(&mut self, field: ContactField, value: impl Into<String>) {
        self.contact.set(field, value);
    }

    // -- invariants --------------------------------------------------------

    pub fn live_vehicle_ids(&self) -> HashSet<VehicleId> {
        self.vehicles.ids().collect()
    }

    /// Store-level invariants: at least one of each entity, no dangling assignments.
    pub fn check_invariants(&self) -> Result<()> {
        if self.vehicles.is_empty() || self.drops.is_empty() {
            return Err(ShipQuoteError::validation(
                "wizard must keep at least one vehicle and one location",
            ));
        }
        self.drops.check_assignments(&self.live_vehicle_ids())
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
