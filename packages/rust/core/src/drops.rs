//! Delivery destinations and which vehicles go to each.
//!
//! Assignments are kept as an explicit join set of `(location, vehicle)`
//! pairs. A vehicle may appear under zero, one, or many locations; the
//! mapping is bookkeeping for the broker, not a partition.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use shipquote_shared::{LocationId, Result, ShipQuoteError, VehicleId};

/// One delivery destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropLocation {
    pub id: LocationId,
    pub location: String,
}

impl DropLocation {
    fn empty() -> Self {
        Self {
            id: LocationId::new(),
            location: String::new(),
        }
    }
}

/// Partial update for a location.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationPatch {
    pub location: Option<String>,
}

impl LocationPatch {
    pub fn location(text: impl Into<String>) -> Self {
        Self {
            location: Some(text.into()),
        }
    }
}

/// Ordered location list (never empty) plus the assignment join set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropLocationStore {
    locations: Vec<DropLocation>,
    assignments: BTreeSet<(LocationId, VehicleId)>,
}

impl Default for DropLocationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DropLocationStore {
    /// A store holding one empty location and no assignments.
    pub fn new() -> Self {
        Self {
            locations: vec![DropLocation::empty()],
            assignments: BTreeSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DropLocation> {
        self.locations.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = LocationId> + '_ {
        self.locations.iter().map(|l| l.id)
    }

    pub fn get(&self, id: LocationId) -> Option<&DropLocation> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn position(&self, id: LocationId) -> Option<usize> {
        self.locations.iter().position(|l| l.id == id)
    }

    pub fn add(&mut self) -> LocationId {
        let location = DropLocation::empty();
        let id = location.id;
        self.locations.push(location);
        id
    }

    /// Remove a location and its assignments. Refuses to remove the last one.
    pub fn remove(&mut self, id: LocationId) -> bool {
        if self.locations.len() <= 1 {
            return false;
        }
        let before = self.locations.len();
        self.locations.retain(|l| l.id != id);
        if self.locations.len() == before {
            return false;
        }
        self.assignments.retain(|(location, _)| *location != id);
        true
    }

    /// Merge `patch` into the location. Unknown ids are ignored.
    pub fn update(&mut self, id: LocationId, patch: LocationPatch) -> bool {
        let Some(location) = self.locations.iter_mut().find(|l| l.id == id) else {
            return false;
        };
        if let Some(text) = patch.location {
            location.location = text;
        }
        true
    }

    /// Add the vehicle to the location if absent, remove it if present.
    /// Returns the new assignment state, or `None` for an unknown location.
    pub(crate) fn toggle_assignment(
        &mut self,
        location: LocationId,
        vehicle: VehicleId,
    ) -> Option<bool> {
        self.get(location)?;
        let pair = (location, vehicle);
        if self.assignments.remove(&pair) {
            Some(false)
        } else {
            self.assignments.insert(pair);
            Some(true)
        }
    }

    pub fn is_assigned(&self, location: LocationId, vehicle: VehicleId) -> bool {
        self.assignments.contains(&(location, vehicle))
    }

    /// Vehicles explicitly assigned to `location`.
    pub fn assigned_vehicles(&self, location: LocationId) -> HashSet<VehicleId> {
        self.assignments
            .iter()
            .filter(|(l, _)| *l == location)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Drop every assignment whose vehicle is not in `live`. Returns how many
    /// rows were removed.
    pub(crate) fn retain_vehicles(&mut self, live: &HashSet<VehicleId>) -> usize {
        let before = self.assignments.len();
        self.assignments.retain(|(_, vehicle)| live.contains(vehicle));
        before - self.assignments.len()
    }

    /// Verify every assignment references an existing location and a live vehicle.
    pub fn check_assignments(&self, live: &HashSet<VehicleId>) -> Result<()> {
        for (location, vehicle) in &self.assignments {
            if self.get(*location).is_none() {
                return Err(ShipQuoteError::validation(format!(
                    "assignment references removed location {location}"
                )));
            }
            if !live.contains(vehicle) {
                return Err(ShipQuoteError::validation(format!(
                    "assignment references removed vehicle {vehicle}"
                )));
            }
        }
        Ok(())
    }

    pub fn all_filled(&self) -> bool {
        self.locations.iter().all(|l| !l.location.trim().is_empty())
    }

    /// Display label for the location at `index`.
    pub fn label(&self, index: usize) -> String {
        if self.locations.len() == 1 {
            "Delivery Location".to_string()
        } else {
            format!("Delivery #{}", index + 1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first(store: &DropLocationStore) -> LocationId {
        store.ids().next().expect("location")
    }

    #[test]
    fn last_location_cannot_be_removed() {
        let mut store = DropLocationStore::new();
        let only = first(&store);
        assert!(!store.remove(only));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn removing_a_location_drops_its_assignments() {
        let mut store = DropLocationStore::new();
        let a = first(&store);
        let b = store.add();
        let vehicle = VehicleId::new();
        store.toggle_assignment(a, vehicle);
        store.toggle_assignment(b, vehicle);

        assert!(store.remove(a));
        assert_eq!(store.assignment_count(), 1);
        assert!(store.is_assigned(b, vehicle));
        assert!(store.check_assignments(&HashSet::from([vehicle])).is_ok());
    }

    #[test]
    fn toggle_is_a_symmetric_difference() {
        let mut store = DropLocationStore::new();
        let location = first(&store);
        let vehicle = VehicleId::new();
        let before = store.clone();

        assert_eq!(store.toggle_assignment(location, vehicle), Some(true));
        assert!(store.is_assigned(location, vehicle));
        assert_eq!(store.toggle_assignment(location, vehicle), Some(false));
        assert_eq!(store, before);
    }

    #[test]
    fn toggle_unknown_location_is_noop() {
        let mut store = DropLocationStore::new();
        assert_eq!(store.toggle_assignment(LocationId::new(), VehicleId::new()), None);
        assert_eq!(store.assignment_count(), 0);
    }

    #[test]
    fn vehicle_may_go_to_several_locations() {
        let mut store = DropLocationStore::new();
        let a = first(&store);
        let b = store.add();
        let vehicle = VehicleId::new();
        store.toggle_assignment(a, vehicle);
        store.toggle_assignment(b, vehicle);
        assert!(store.assigned_vehicles(a).contains(&vehicle));
        assert!(store.assigned_vehicles(b).contains(&vehicle));
    }

    #[test]
    fn retain_vehicles_prunes_dead_references() {
        let mut store = DropLocationStore::new();
        let location = first(&store);
        let keep = VehicleId::new();
        let gone = VehicleId::new();
        store.toggle_assignment(location, keep);
        store.toggle_assignment(location, gone);

        let live = HashSet::from([keep]);
        assert!(store.check_assignments(&live).is_err());
        assert_eq!(store.retain_vehicles(&live), 1);
        assert!(store.check_assignments(&live).is_ok());
    }

    #[test]
    fn labels_depend_on_count() {
        let mut store = DropLocationStore::new();
        assert_eq!(store.label(0), "Delivery Location");
        store.add();
        assert_eq!(store.label(0), "Delivery #1");
        assert_eq!(store.label(1), "Delivery #2");
    }

    #[test]
    fn update_sets_text() {
        let mut store = DropLocationStore::new();
        let id = first(&store);
        assert!(!store.all_filled());
        assert!(store.update(id, LocationPatch::location("Austin, TX")));
        assert!(store.all_filled());
        assert!(!store.update(LocationId::new(), LocationPatch::location("x")));
    }
}
