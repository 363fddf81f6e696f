//! The step sequencer the front ends drive.
//!
//! [`QuoteWizard`] owns the resolved schema, the customer's answers and the
//! in-flight VIN lookups. Every mutation is a synchronous method call on the
//! owner; lookups run as spawned tasks whose outcomes are folded back in by
//! [`QuoteWizard::poll_lookups`] or [`QuoteWizard::next_lookup`].

use std::sync::Arc;

use tracing::{debug, info, warn};

use shipquote_schema::{ResolvedSchema, ResolvedStep};
use shipquote_shared::{
    CANONICAL_STEP_ORDER, ContactField, LocationId, Result, ShipQuoteError, StepKey,
    TransportType, VehicleId,
};
use shipquote_vin::{DecodedVin, VinDecoder, validate_vin};

use crate::drops::LocationPatch;
use crate::lead::LeadPayload;
use crate::lookup::{LookupOutcome, LookupTracker};
use crate::notice::Notice;
use crate::state::WizardState;
use crate::vehicles::VehiclePatch;

pub struct QuoteWizard<D> {
    schema: ResolvedSchema,
    order: Vec<StepKey>,
    state: WizardState,
    decoder: Arc<D>,
    lookups: LookupTracker,
}

impl<D: VinDecoder + 'static> QuoteWizard<D> {
    pub fn new(schema: ResolvedSchema, decoder: D) -> Self {
        Self::with_shared_decoder(schema, Arc::new(decoder))
    }

    /// Build a wizard around a decoder that is also used elsewhere.
    pub fn with_shared_decoder(schema: ResolvedSchema, decoder: Arc<D>) -> Self {
        let mut order = schema.step_keys();
        if order.is_empty() {
            order = CANONICAL_STEP_ORDER.to_vec();
        }
        let state = WizardState::new(order[0]);
        debug!(steps = order.len(), first = %order[0], "wizard created");

        Self {
            schema,
            order,
            state,
            decoder,
            lookups: LookupTracker::new(),
        }
    }

    pub fn schema(&self) -> &ResolvedSchema {
        &self.schema
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    // -- sequencing --------------------------------------------------------

    /// Step keys in the order they are shown.
    pub fn steps(&self) -> &[StepKey] {
        &self.order
    }

    pub fn current_step(&self) -> StepKey {
        self.state.current_step()
    }

    /// Render data for the current step.
    pub fn current(&self) -> Option<&ResolvedStep> {
        self.schema.step(self.current_step())
    }

    /// 0-based position of the current step.
    pub fn current_index(&self) -> usize {
        self.order
            .iter()
            .position(|s| *s == self.current_step())
            .unwrap_or(0)
    }

    pub fn total_steps(&self) -> usize {
        self.order.len()
    }

    /// Percentage of the wizard reached, counting the current step as reached.
    pub fn progress_percent(&self) -> f64 {
        (self.current_index() + 1) as f64 / self.total_steps() as f64 * 100.0
    }

    pub fn progress_badge(&self) -> String {
        self.schema
            .progress_badge(self.current_index() + 1, self.total_steps())
    }

    pub fn is_first(&self) -> bool {
        self.current_index() == 0
    }

    /// The last step shows "submit" instead of "next".
    pub fn is_terminal(&self) -> bool {
        self.current_index() + 1 == self.total_steps()
    }

    pub fn can_advance(&self, step: StepKey) -> bool {
        self.state.can_advance(step)
    }

    pub fn can_advance_current(&self) -> bool {
        self.state.can_advance(self.current_step())
    }

    /// First step, in display order, whose answers are incomplete.
    pub fn first_incomplete_step(&self) -> Option<StepKey> {
        self.order
            .iter()
            .copied()
            .find(|step| !self.state.can_advance(*step))
    }

    /// Move forward one step. Does nothing at the terminal step or while the
    /// current step is incomplete.
    pub fn next(&mut self) -> bool {
        if self.is_terminal() || !self.can_advance_current() {
            return false;
        }
        let next = self.order[self.current_index() + 1];
        debug!(from = %self.current_step(), to = %next, "step forward");
        self.state.set_current_step(next);
        true
    }

    /// Move back one step. Answers are kept.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        let previous = self.order[self.current_index() - 1];
        debug!(from = %self.current_step(), to = %previous, "step back");
        self.state.set_current_step(previous);
        true
    }

    pub fn assignment_enabled(&self) -> bool {
        self.state.assignment_enabled()
    }

    // -- vehicles ----------------------------------------------------------

    pub fn add_vehicle(&mut self) -> VehicleId {
        self.state.add_vehicle()
    }

    /// Remove a vehicle, its assignments and any lookup running for it.
    pub fn remove_vehicle(&mut self, id: VehicleId) -> bool {
        if !self.state.remove_vehicle(id) {
            return false;
        }
        self.lookups.cancel(id);
        true
    }

    /// Apply a patch to a vehicle.
    ///
    /// While a lookup is pending for the vehicle, only the running status may
    /// change; anything the decode would overwrite is rejected.
    pub fn update_vehicle(&mut self, id: VehicleId, patch: VehiclePatch) -> Result<bool> {
        let pending = self
            .state
            .vehicles()
            .get(id)
            .is_some_and(|v| v.vin_lookup_pending);
        if pending && patch.touches_decoded_fields() {
            return Err(ShipQuoteError::LookupPending);
        }
        Ok(self.state.update_vehicle(id, patch))
    }

    /// Display name of a vehicle, e.g. "2019 Toyota Camry" or "Vehicle 2".
    pub fn vehicle_name(&self, id: VehicleId) -> Option<String> {
        let vehicles = self.state.vehicles();
        let index = vehicles.position(id)?;
        vehicles.get(id).map(|v| v.display_name(index))
    }

    // -- VIN lookups -------------------------------------------------------

    /// Whether the lookup action is available for this vehicle right now.
    pub fn can_start_vin_lookup(&self, id: VehicleId) -> bool {
        self.state
            .vehicles()
            .get(id)
            .is_some_and(|v| !v.vin_lookup_pending && validate_vin(&v.vin).is_ok())
    }

    /// Start decoding the vehicle's VIN in the background.
    ///
    /// Rejected without any external call when the VIN is not 17 characters
    /// or a lookup for this vehicle is already running. Requires a tokio
    /// runtime.
    pub fn start_vin_lookup(&mut self, id: VehicleId) -> Result<()> {
        let Some(vehicle) = self.state.vehicles().get(id) else {
            return Err(ShipQuoteError::validation(format!("unknown vehicle {id}")));
        };
        if vehicle.vin_lookup_pending {
            return Err(ShipQuoteError::LookupPending);
        }
        validate_vin(&vehicle.vin)?;

        let Some(vin) = self.state.begin_lookup(id) else {
            return Err(ShipQuoteError::validation(format!("unknown vehicle {id}")));
        };
        info!(vehicle = %id, vin = %vin, "starting VIN lookup");
        self.lookups.spawn(id, vin, Arc::clone(&self.decoder));
        Ok(())
    }

    pub fn pending_lookups(&self) -> usize {
        self.lookups.len()
    }

    /// Fold in every lookup outcome that has already arrived.
    pub fn poll_lookups(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(outcome) = self.lookups.try_next() {
            if let Some(notice) = self.apply_lookup(outcome) {
                notices.push(notice);
            }
        }
        notices
    }

    /// Wait for the next lookup to finish and fold it in. Returns `None`
    /// once nothing is left in flight.
    pub async fn next_lookup(&mut self) -> Option<Notice> {
        loop {
            let outcome = self.lookups.next().await?;
            if let Some(notice) = self.apply_lookup(outcome) {
                return Some(notice);
            }
        }
    }

    fn apply_lookup(&mut self, outcome: LookupOutcome) -> Option<Notice> {
        if !self.lookups.settle(&outcome) {
            debug!(vehicle = %outcome.vehicle_id, "discarding stale VIN lookup outcome");
            return None;
        }
        let vehicle = outcome.vehicle_id;
        let copy = &self.schema.copy;

        match outcome.result {
            Ok(decoded) if decoded.is_decodable() => {
                let patch = self.decoded_patch(decoded);
                info!(vehicle = %vehicle, make = ?patch.make, model = ?patch.model, "VIN lookup applied");
                let notice = Notice::success(&copy.vin_success_title, &copy.vin_success_description);
                self.state
                    .finish_lookup(vehicle, Some(patch))
                    .then_some(notice)
            }
            Ok(_) => {
                info!(vehicle = %vehicle, "VIN lookup returned no make/model");
                let notice = Notice::failure(&copy.vin_failure_title, &copy.vin_failure_description);
                self.state.finish_lookup(vehicle, None).then_some(notice)
            }
            Err(e) => {
                warn!(vehicle = %vehicle, error = %e, "VIN lookup failed");
                let notice = Notice::failure(&copy.vin_failure_title, &copy.vin_failure_description);
                self.state.finish_lookup(vehicle, None).then_some(notice)
            }
        }
    }

    /// Map a decode onto the catalog spelling where the catalog knows the make/model.
    ///
    /// All three identity fields are written; a decode without a model year
    /// clears whatever year was there before.
    fn decoded_patch(&self, decoded: DecodedVin) -> VehiclePatch {
        let make = decoded.make.map(|make| {
            self.schema
                .makes()
                .find(|known| known.eq_ignore_ascii_case(&make))
                .map(str::to_string)
                .unwrap_or(make)
        });
        let model = match (&make, decoded.model) {
            (Some(make), Some(model)) => Some(
                self.schema
                    .models_for(make)
                    .iter()
                    .find(|known| known.eq_ignore_ascii_case(&model))
                    .cloned()
                    .unwrap_or(model),
            ),
            (_, model) => model,
        };

        VehiclePatch {
            year: Some(decoded.year.unwrap_or_default()),
            make,
            model,
            ..VehiclePatch::default()
        }
    }

    // -- drop locations ----------------------------------------------------

    pub fn add_location(&mut self) -> LocationId {
        self.state.add_location()
    }

    pub fn remove_location(&mut self, id: LocationId) -> bool {
        self.state.remove_location(id)
    }

    pub fn update_location(&mut self, id: LocationId, patch: LocationPatch) -> bool {
        self.state.update_location(id, patch)
    }

    pub fn toggle_assignment(&mut self, location: LocationId, vehicle: VehicleId) -> bool {
        self.state.toggle_assignment(location, vehicle)
    }

    pub fn location_label(&self, index: usize) -> String {
        self.state.drops().label(index)
    }

    // -- remaining answers -------------------------------------------------

    pub fn set_pickup_location(&mut self, text: impl Into<String>) {
        self.state.set_pickup_location(text);
    }

    pub fn set_transport_type(&mut self, transport: Option<TransportType>) {
        self.state.set_transport_type(transport);
    }

    pub fn set_timeframe(&mut self, value: impl Into<String>) {
        self.state.set_timeframe(value);
    }

    pub fn set_contact_field(&mut self, field: ContactField, value: impl Into<String>) {
        self.state.set_contact(field, value);
    }

    // -- lifecycle ---------------------------------------------------------

    /// Abort all lookups and start over with fresh answers at the first step.
    pub fn reset(&mut self) {
        self.lookups.cancel_all();
        self.state = WizardState::new(self.order[0]);
        info!("wizard reset");
    }

    /// The lead payload for the current answers.
    pub fn lead(&self) -> LeadPayload {
        LeadPayload::from_state(&self.state)
    }
}
