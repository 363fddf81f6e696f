//! Vehicle records the customer is shipping.

use serde::Serialize;

use shipquote_shared::{RunningStatus, VIN_LENGTH, VehicleId};

// ---------------------------------------------------------------------------
// Vehicle
// ---------------------------------------------------------------------------

/// One vehicle entry. Empty strings mean "not filled in yet".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub year: String,
    pub make: String,
    pub model: String,
    pub running: RunningStatus,
    pub vin: String,
    pub vin_lookup_pending: bool,
}

impl Vehicle {
    fn empty() -> Self {
        Self {
            id: VehicleId::new(),
            year: String::new(),
            make: String::new(),
            model: String::new(),
            running: RunningStatus::Unknown,
            vin: String::new(),
            vin_lookup_pending: false,
        }
    }

    /// Make and model are known and no decode is about to overwrite them.
    pub fn is_complete(&self) -> bool {
        !self.make.trim().is_empty() && !self.model.trim().is_empty() && !self.vin_lookup_pending
    }

    /// How later steps refer to this vehicle. `index` is its 0-based position.
    pub fn display_name(&self, index: usize) -> String {
        let year = self.year.trim();
        let make = self.make.trim();
        let model = self.model.trim();

        match (year.is_empty(), make.is_empty(), model.is_empty()) {
            (false, false, false) => format!("{year} {make} {model}"),
            (_, false, false) => format!("{make} {model}"),
            _ => format!("Vehicle {}", index + 1),
        }
    }

    fn apply(&mut self, patch: VehiclePatch) {
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(make) = patch.make {
            self.make = make;
        }
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(running) = patch.running {
            self.running = running;
        }
        if let Some(vin) = patch.vin {
            self.vin = normalize_vin(&vin);
        }
    }
}

/// VINs are stored trimmed, upper-cased, and capped at 17 characters.
fn normalize_vin(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .take(VIN_LENGTH)
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Partial update for a vehicle. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehiclePatch {
    pub year: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub running: Option<RunningStatus>,
    pub vin: Option<String>,
}

impl VehiclePatch {
    pub fn running(status: RunningStatus) -> Self {
        Self {
            running: Some(status),
            ..Self::default()
        }
    }

    pub fn vin(vin: impl Into<String>) -> Self {
        Self {
            vin: Some(vin.into()),
            ..Self::default()
        }
    }

    /// Year/make/model, e.g. when the customer picks them by hand.
    pub fn identity(
        year: impl Into<String>,
        make: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            year: Some(year.into()),
            make: Some(make.into()),
            model: Some(model.into()),
            ..Self::default()
        }
    }

    /// Whether the patch edits fields a pending VIN decode would overwrite.
    pub fn touches_decoded_fields(&self) -> bool {
        self.year.is_some() || self.make.is_some() || self.model.is_some() || self.vin.is_some()
    }
}

// ---------------------------------------------------------------------------
// VehicleStore
// ---------------------------------------------------------------------------

/// Ordered vehicle list that never drops below one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VehicleStore {
    vehicles: Vec<Vehicle>,
}

impl Default for VehicleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleStore {
    /// A store holding one empty vehicle.
    pub fn new() -> Self {
        Self {
            vehicles: vec![Vehicle::empty()],
        }
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = VehicleId> + '_ {
        self.vehicles.iter().map(|v| v.id)
    }

    pub fn get(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    pub fn position(&self, id: VehicleId) -> Option<usize> {
        self.vehicles.iter().position(|v| v.id == id)
    }

    /// Append an empty vehicle and return its id.
    pub fn add(&mut self) -> VehicleId {
        let vehicle = Vehicle::empty();
        let id = vehicle.id;
        self.vehicles.push(vehicle);
        id
    }

    /// Remove a vehicle. Refuses to remove the last one. Returns whether
    /// anything was removed; callers own the drop-location cascade.
    pub(crate) fn remove(&mut self, id: VehicleId) -> bool {
        if self.vehicles.len() <= 1 {
            return false;
        }
        let before = self.vehicles.len();
        self.vehicles.retain(|v| v.id != id);
        self.vehicles.len() != before
    }

    /// Merge `patch` into the vehicle. Unknown ids are ignored.
    pub fn update(&mut self, id: VehicleId, patch: VehiclePatch) -> bool {
        match self.get_mut(id) {
            Some(vehicle) => {
                vehicle.apply(patch);
                true
            }
            None => false,
        }
    }

    pub fn all_complete(&self) -> bool {
        self.vehicles.iter().all(Vehicle::is_complete)
    }

    pub fn all_running_answered(&self) -> bool {
        self.vehicles.iter().all(|v| v.running.is_answered())
    }

    pub fn any_pending(&self) -> bool {
        self.vehicles.iter().any(|v| v.vin_lookup_pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(store: &mut VehicleStore, id: VehicleId, year: &str, make: &str, model: &str) {
        assert!(store.update(id, VehiclePatch::identity(year, make, model)));
    }

    #[test]
    fn new_store_has_one_empty_vehicle() {
        let store = VehicleStore::new();
        assert_eq!(store.len(), 1);
        let vehicle = store.iter().next().expect("vehicle");
        assert!(vehicle.make.is_empty());
        assert_eq!(vehicle.running, RunningStatus::Unknown);
        assert!(!vehicle.is_complete());
    }

    #[test]
    fn add_appends_with_fresh_ids() {
        let mut store = VehicleStore::new();
        let a = store.add();
        let b = store.add();
        assert_eq!(store.len(), 3);
        assert_ne!(a, b);
        assert_eq!(store.position(b), Some(2));
    }

    #[test]
    fn last_vehicle_cannot_be_removed() {
        let mut store = VehicleStore::new();
        let only = store.ids().next().expect("id");
        assert!(!store.remove(only));
        assert_eq!(store.len(), 1);

        let second = store.add();
        assert!(store.remove(only));
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![second]);
        assert!(!store.remove(second));
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let mut store = VehicleStore::new();
        let before = store.clone();
        assert!(!store.update(VehicleId::new(), VehiclePatch::running(RunningStatus::Running)));
        assert_eq!(store, before);
    }

    #[test]
    fn update_merges_only_given_fields() {
        let mut store = VehicleStore::new();
        let id = store.ids().next().expect("id");
        filled(&mut store, id, "2019", "Toyota", "Camry");
        store.update(id, VehiclePatch::running(RunningStatus::NotRunning));

        let vehicle = store.get(id).expect("vehicle");
        assert_eq!(vehicle.make, "Toyota");
        assert_eq!(vehicle.running, RunningStatus::NotRunning);
        assert!(vehicle.is_complete());
    }

    #[test]
    fn vin_is_normalized() {
        let mut store = VehicleStore::new();
        let id = store.ids().next().expect("id");
        store.update(id, VehiclePatch::vin(" 1hgcm82633a123456789 "));
        assert_eq!(store.get(id).expect("vehicle").vin, "1HGCM82633A123456");
    }

    #[test]
    fn pending_lookup_makes_vehicle_incomplete() {
        let mut store = VehicleStore::new();
        let id = store.ids().next().expect("id");
        filled(&mut store, id, "", "Honda", "Civic");
        store.get_mut(id).expect("vehicle").vin_lookup_pending = true;
        assert!(!store.all_complete());
        assert!(store.any_pending());
    }

    #[test]
    fn display_name_fallbacks() {
        let mut store = VehicleStore::new();
        let id = store.ids().next().expect("id");
        assert_eq!(store.get(id).expect("v").display_name(0), "Vehicle 1");

        filled(&mut store, id, "", "Honda", "Civic");
        assert_eq!(store.get(id).expect("v").display_name(0), "Honda Civic");

        filled(&mut store, id, "2021", "Honda", "Civic");
        assert_eq!(store.get(id).expect("v").display_name(0), "2021 Honda Civic");

        filled(&mut store, id, "2021", "Honda", "");
        assert_eq!(store.get(id).expect("v").display_name(4), "Vehicle 5");
    }
}
