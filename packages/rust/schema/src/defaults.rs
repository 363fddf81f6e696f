//! Built-in copy and option sets used wherever the form configuration is silent.

use shipquote_shared::{ContactField, RunningStatus, StepKey, TransportType};

use crate::resolver::FieldKey;

pub(crate) const PROGRESS_BADGE: &str = "Step {current} of {total}";
pub(crate) const FOOTER_DISCLAIMER: &str =
    "No obligation, no spam. Your details are only used to prepare your quote.";
pub(crate) const NEXT_LABEL: &str = "Next";
pub(crate) const BACK_LABEL: &str = "Back";
pub(crate) const SUBMIT_LABEL: &str = "Get My Quote";
pub(crate) const SUBMITTING_LABEL: &str = "Submitting...";
pub(crate) const LOOKUP_LABEL: &str = "Decode VIN";
pub(crate) const SUCCESS_TITLE: &str = "Quote request received!";
pub(crate) const SUCCESS_DESCRIPTION: &str =
    "A shipping specialist will reach out shortly with your quote.";
pub(crate) const FAILURE_TITLE: &str = "We couldn't send your request";
pub(crate) const FAILURE_DESCRIPTION: &str =
    "Something went wrong on our end. Your answers are saved, please try again.";
pub(crate) const VIN_SUCCESS_TITLE: &str = "VIN decoded";
pub(crate) const VIN_SUCCESS_DESCRIPTION: &str = "We filled in the year, make, and model for you.";
pub(crate) const VIN_FAILURE_TITLE: &str = "Couldn't decode that VIN";
pub(crate) const VIN_FAILURE_DESCRIPTION: &str =
    "Please select the year, make, and model manually.";

pub(crate) fn step_title(step: StepKey) -> &'static str {
    match step {
        StepKey::Vehicles => "What are you shipping?",
        StepKey::Running => "Do your vehicles run?",
        StepKey::Pickup => "Where should we pick up?",
        StepKey::Drops => "Where is it going?",
        StepKey::Transport => "Choose your transport type",
        StepKey::Timeframe => "When do you need it shipped?",
        StepKey::Contact => "Where should we send your quote?",
    }
}

pub(crate) fn step_description(step: StepKey) -> &'static str {
    match step {
        StepKey::Vehicles => "Enter a VIN to fill in details automatically, or pick them by hand.",
        StepKey::Running => "Inoperable vehicles need a winch, so carriers price them differently.",
        StepKey::Pickup => "A city, ZIP code, or full address all work.",
        StepKey::Drops => "Add a delivery location for each destination.",
        StepKey::Transport => "Open carriers are the most affordable; enclosed adds protection.",
        StepKey::Timeframe => "Tell us your first available pickup window.",
        StepKey::Contact => "We'll send your personalized quote here.",
    }
}

pub(crate) fn step_fields(step: StepKey) -> &'static [FieldKey] {
    match step {
        StepKey::Vehicles => &[FieldKey::Vin, FieldKey::Year, FieldKey::Make, FieldKey::Model],
        StepKey::Pickup => &[FieldKey::PickupLocation],
        StepKey::Drops => &[FieldKey::DropLocation],
        StepKey::Contact => &[
            FieldKey::Contact(ContactField::Name),
            FieldKey::Contact(ContactField::Email),
            FieldKey::Contact(ContactField::Phone),
        ],
        StepKey::Running | StepKey::Transport | StepKey::Timeframe => &[],
    }
}

pub(crate) fn field_label(field: FieldKey) -> &'static str {
    match field {
        FieldKey::Vin => "VIN (optional)",
        FieldKey::Year => "Year",
        FieldKey::Make => "Make",
        FieldKey::Model => "Model",
        FieldKey::PickupLocation => "Pickup location",
        FieldKey::DropLocation => "Delivery location",
        FieldKey::Contact(ContactField::Name) => "Full name",
        FieldKey::Contact(ContactField::Email) => "Email",
        FieldKey::Contact(ContactField::Phone) => "Phone (optional)",
    }
}

pub(crate) fn field_placeholder(field: FieldKey) -> &'static str {
    match field {
        FieldKey::Vin => "17-character VIN",
        FieldKey::Year => "e.g. 2019",
        FieldKey::Make => "e.g. Toyota",
        FieldKey::Model => "e.g. Camry",
        FieldKey::PickupLocation => "City, state or ZIP",
        FieldKey::DropLocation => "City, state or ZIP",
        FieldKey::Contact(ContactField::Name) => "Jane Doe",
        FieldKey::Contact(ContactField::Email) => "jane@example.com",
        FieldKey::Contact(ContactField::Phone) => "(555) 555-0100",
    }
}

pub(crate) fn running_label(status: RunningStatus) -> &'static str {
    match status {
        RunningStatus::Running => "Yes, it runs and drives",
        RunningStatus::NotRunning => "No, it's inoperable",
        RunningStatus::Unknown => "Not answered",
    }
}

pub(crate) const RUNNING_CHOICES: [RunningStatus; 2] =
    [RunningStatus::Running, RunningStatus::NotRunning];

pub(crate) fn transport_label(transport: TransportType) -> &'static str {
    match transport {
        TransportType::Open => "Open transport",
        TransportType::Enclosed => "Enclosed transport",
    }
}

pub(crate) fn transport_description(transport: TransportType) -> &'static str {
    match transport {
        TransportType::Open => "The standard, most affordable option.",
        TransportType::Enclosed => "Fully covered. Recommended for classic and luxury vehicles.",
    }
}

pub(crate) const TRANSPORT_CHOICES: [TransportType; 2] =
    [TransportType::Open, TransportType::Enclosed];

pub(crate) const TIMEFRAME_CHOICES: [(&str, &str); 4] = [
    ("asap", "As soon as possible"),
    ("within_2_weeks", "Within 2 weeks"),
    ("within_30_days", "Within 30 days"),
    ("flexible", "I'm flexible"),
];

pub(crate) const VEHICLE_MAKES: [(&str, &[&str]); 8] = [
    ("Chevrolet", &["Camaro", "Equinox", "Malibu", "Silverado", "Tahoe"]),
    ("Ford", &["Escape", "Explorer", "F-150", "Mustang"]),
    ("Honda", &["Accord", "Civic", "CR-V", "Odyssey", "Pilot"]),
    ("Hyundai", &["Elantra", "Santa Fe", "Sonata", "Tucson"]),
    ("Jeep", &["Cherokee", "Grand Cherokee", "Wrangler"]),
    ("Nissan", &["Altima", "Rogue", "Sentra"]),
    ("Tesla", &["Model 3", "Model S", "Model X", "Model Y"]),
    ("Toyota", &["4Runner", "Camry", "Corolla", "RAV4", "Tacoma"]),
];
