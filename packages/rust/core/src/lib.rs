//! Quote wizard domain logic for ShipQuote.
//!
//! This crate holds the wizard's answers (vehicles, delivery locations and
//! their assignments, contact details), the step sequencer that front ends
//! drive, background VIN lookups, and the submission pipeline that turns a
//! finished wizard into a lead.

pub mod drops;
pub mod lead;
mod lookup;
pub mod notice;
pub mod state;
pub mod submission;
pub mod vehicles;
pub mod wizard;

pub use drops::{DropLocation, DropLocationStore, LocationPatch};
pub use lead::{LeadContact, LeadDropLocation, LeadPayload, LeadVehicle};
pub use notice::{Notice, NoticeKind};
pub use state::{Contact, WizardState};
pub use submission::{HttpLeadSink, LeadSink, Submission, SubmissionPipeline};
pub use vehicles::{Vehicle, VehiclePatch, VehicleStore};
pub use wizard::QuoteWizard;
