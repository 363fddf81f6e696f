//! In-flight VIN lookups, one abortable task per vehicle.
//!
//! Each lookup runs as a spawned task that reports back through a channel
//! owned by the wizard, so all state mutation stays on the owner's side.
//! Outcomes carry a generation number; anything that does not match the
//! currently tracked lookup for that vehicle is stale and gets discarded.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use shipquote_shared::{Result, ShipQuoteError, VehicleId};
use shipquote_vin::{DecodedVin, VinDecoder};

/// Result of one decode call, tagged with the lookup that issued it.
#[derive(Debug)]
pub(crate) struct LookupOutcome {
    pub vehicle_id: VehicleId,
    pub generation: u64,
    pub result: Result<DecodedVin>,
}

struct InFlight {
    generation: u64,
    handle: JoinHandle<()>,
}

pub(crate) struct LookupTracker {
    in_flight: HashMap<VehicleId, InFlight>,
    next_generation: u64,
    tx: mpsc::UnboundedSender<LookupOutcome>,
    rx: mpsc::UnboundedReceiver<LookupOutcome>,
}

impl LookupTracker {
    pub(crate) fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            in_flight: HashMap::new(),
            next_generation: 0,
            tx,
            rx,
        }
    }

    /// Spawn a decode for `vehicle_id`. Must be called inside a tokio runtime.
    pub(crate) fn spawn<D>(&mut self, vehicle_id: VehicleId, vin: String, decoder: Arc<D>)
    where
        D: VinDecoder + 'static,
    {
        self.next_generation += 1;
        let generation = self.next_generation;
        let reporter = Reporter {
            tx: Some(self.tx.clone()),
            vehicle_id,
            generation,
        };

        let handle = tokio::spawn(async move {
            let result = decoder.decode(&vin).await;
            reporter.report(result);
        });

        if let Some(previous) = self
            .in_flight
            .insert(vehicle_id, InFlight { generation, handle })
        {
            previous.handle.abort();
        }
    }

    pub(crate) fn is_in_flight(&self, vehicle_id: VehicleId) -> bool {
        self.in_flight.contains_key(&vehicle_id)
    }

    pub(crate) fn len(&self) -> usize {
        self.in_flight.len()
    }

    /// Abort the lookup for a vehicle, if any.
    pub(crate) fn cancel(&mut self, vehicle_id: VehicleId) -> bool {
        match self.in_flight.remove(&vehicle_id) {
            Some(lookup) => {
                lookup.handle.abort();
                debug!(vehicle = %vehicle_id, "VIN lookup aborted");
                true
            }
            None => false,
        }
    }

    pub(crate) fn cancel_all(&mut self) {
        for (_, lookup) in self.in_flight.drain() {
            lookup.handle.abort();
        }
    }

    /// Take an outcome that has already arrived, without waiting.
    pub(crate) fn try_next(&mut self) -> Option<LookupOutcome> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next outcome. Returns `None` right away when nothing is
    /// in flight and nothing is queued.
    pub(crate) async fn next(&mut self) -> Option<LookupOutcome> {
        if self.in_flight.is_empty() {
            return self.try_next();
        }
        self.rx.recv().await
    }

    /// Claim an outcome. Returns false when it belongs to a lookup that was
    /// cancelled or superseded.
    pub(crate) fn settle(&mut self, outcome: &LookupOutcome) -> bool {
        match self.in_flight.get(&outcome.vehicle_id) {
            Some(current) if current.generation == outcome.generation => {
                self.in_flight.remove(&outcome.vehicle_id);
                true
            }
            _ => false,
        }
    }
}

/// Sends the outcome of one lookup task. A task that panics before
/// reporting still sends a failure from `drop`, so waiters are never left
/// hanging on a lookup that will not finish.
struct Reporter {
    tx: Option<mpsc::UnboundedSender<LookupOutcome>>,
    vehicle_id: VehicleId,
    generation: u64,
}

impl Reporter {
    fn report(mut self, result: Result<DecodedVin>) {
        self.send(result);
    }

    fn send(&mut self, result: Result<DecodedVin>) {
        if let Some(tx) = self.tx.take() {
            // The receiver only goes away with the wizard itself.
            let _ = tx.send(LookupOutcome {
                vehicle_id: self.vehicle_id,
                generation: self.generation,
                result,
            });
        }
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        // Aborted tasks are dropped without panicking and stay silent.
        if std::thread::panicking() {
            self.send(Err(ShipQuoteError::Network(
                "VIN lookup task panicked".into(),
            )));
        }
    }
}

impl Drop for LookupTracker {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
