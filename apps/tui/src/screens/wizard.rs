//! The quote wizard screen: one step at a time, with focusable inputs.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use shipquote_core::QuoteWizard;
use shipquote_core::{LocationPatch, VehiclePatch};
use shipquote_schema::{FieldKey, ResolvedSchema};
use shipquote_shared::{ContactField, LocationId, RunningStatus, ShipQuoteError, StepKey, VehicleId};
use shipquote_vin::VinDecoder;

use crate::widgets::progress_gauge;

/// Vehicle inputs on the vehicles step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum VehicleInput {
    Vin,
    Year,
    Make,
    Model,
}

impl VehicleInput {
    fn from_field(key: FieldKey) -> Option<Self> {
        match key {
            FieldKey::Vin => Some(Self::Vin),
            FieldKey::Year => Some(Self::Year),
            FieldKey::Make => Some(Self::Make),
            FieldKey::Model => Some(Self::Model),
            _ => None,
        }
    }

    fn field_key(self) -> FieldKey {
        match self {
            Self::Vin => FieldKey::Vin,
            Self::Year => FieldKey::Year,
            Self::Make => FieldKey::Make,
            Self::Model => FieldKey::Model,
        }
    }
}

/// One focusable row on the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Focus {
    Vehicle(VehicleId, VehicleInput),
    Running(VehicleId),
    Pickup,
    Location(LocationId),
    Assignment(LocationId, VehicleId),
    Transport,
    Timeframe,
    Contact(ContactField),
}

impl Focus {
    fn is_text(self) -> bool {
        matches!(
            self,
            Self::Vehicle(..) | Self::Pickup | Self::Location(_) | Self::Contact(_)
        )
    }
}

/// What the app should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ScreenAction {
    None,
    Submit,
    Message(String),
}

pub(crate) struct WizardScreen {
    focus: usize,
    editing: bool,
}

impl WizardScreen {
    pub(crate) fn new() -> Self {
        Self {
            focus: 0,
            editing: false,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn reset(&mut self) {
        self.focus = 0;
        self.editing = false;
    }

    // -- drawing -----------------------------------------------------------

    pub(crate) fn draw<D: VinDecoder + 'static>(
        &self,
        f: &mut Frame,
        area: Rect,
        wizard: &QuoteWizard<D>,
        submitting: bool,
    ) {
        let schema = wizard.schema();
        let Some(step) = wizard.current() else {
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Title + progress
                Constraint::Length(3), // Description / prompt
                Constraint::Min(1),    // Inputs
                Constraint::Length(1), // Key hints
                Constraint::Length(1), // Disclaimer
            ])
            .split(area);

        let badge = wizard.progress_badge();
        let gauge = progress_gauge(&step.title, wizard.progress_percent(), &badge);
        f.render_widget(gauge, chunks[0]);

        let mut intro = vec![Line::from(step.description.as_str())];
        if let Some(prompt) = &step.prompt {
            intro.push(Line::from(prompt.as_str()).style(Style::default().fg(Color::Gray)));
        }
        f.render_widget(Paragraph::new(intro).wrap(Wrap { trim: true }), chunks[1]);

        let items = focus_items(wizard);
        let lines: Vec<Line> = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let (label, value) = describe(wizard, *item);
                let style = if index == self.focus && self.editing {
                    Style::default().fg(Color::Yellow)
                } else if index == self.focus {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let marker = if index == self.focus { "▸ " } else { "  " };
                Line::from(vec![
                    Span::styled(format!("{marker}{label:<28} "), style),
                    Span::styled(value, style),
                ])
            })
            .collect();

        let visible = chunks[2].height.saturating_sub(2) as usize;
        let scroll = self.focus.saturating_sub(visible.saturating_sub(1)) as u16;
        let inputs = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .scroll((scroll, 0));
        f.render_widget(inputs, chunks[2]);

        let hint = if submitting {
            format!("{} · Esc to cancel", schema.copy.submitting_label)
        } else if self.editing {
            "Type to edit · Enter/Esc to stop editing".to_string()
        } else {
            key_hints(wizard)
        };
        f.render_widget(
            Paragraph::new(hint)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            chunks[3],
        );
        f.render_widget(
            Paragraph::new(schema.copy.footer_disclaimer.as_str())
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center),
            chunks[4],
        );
    }

    // -- input -------------------------------------------------------------

    pub(crate) fn handle_key<D: VinDecoder + 'static>(
        &mut self,
        wizard: &mut QuoteWizard<D>,
        code: KeyCode,
        _modifiers: KeyModifiers,
    ) -> ScreenAction {
        let items = focus_items(wizard);
        self.focus = self.focus.min(items.len().saturating_sub(1));
        let focused = items.get(self.focus).copied();

        if self.editing {
            let Some(item) = focused else {
                self.editing = false;
                return ScreenAction::None;
            };
            return match code {
                KeyCode::Esc | KeyCode::Enter => {
                    self.editing = false;
                    ScreenAction::None
                }
                KeyCode::Tab => {
                    self.editing = false;
                    self.move_focus(items.len(), true);
                    ScreenAction::None
                }
                KeyCode::Backspace => edit_text(wizard, item, |text| {
                    text.pop();
                }),
                KeyCode::Char(c) => edit_text(wizard, item, |text| text.push(c)),
                _ => ScreenAction::None,
            };
        }

        match code {
            KeyCode::Down | KeyCode::Tab => {
                self.move_focus(items.len(), true);
                ScreenAction::None
            }
            KeyCode::Up | KeyCode::BackTab => {
                self.move_focus(items.len(), false);
                ScreenAction::None
            }
            KeyCode::Char('n') | KeyCode::PageDown => {
                if wizard.is_terminal() {
                    ScreenAction::Submit
                } else if wizard.next() {
                    self.reset();
                    ScreenAction::None
                } else {
                    ScreenAction::Message("Complete this step to continue".to_string())
                }
            }
            KeyCode::Char('b') | KeyCode::PageUp => {
                if wizard.previous() {
                    self.reset();
                }
                ScreenAction::None
            }
            KeyCode::Char('a') => self.add(wizard),
            KeyCode::Char('x') => match focused {
                Some(item) => self.remove(wizard, item),
                None => ScreenAction::None,
            },
            KeyCode::Char('l') => match focused {
                Some(Focus::Vehicle(id, _)) => match wizard.start_vin_lookup(id) {
                    Ok(()) => ScreenAction::Message(format!(
                        "{}...",
                        wizard.schema().copy.lookup_label
                    )),
                    Err(e) => ScreenAction::Message(lookup_error(&e)),
                },
                _ => ScreenAction::None,
            },
            KeyCode::Enter => match focused {
                Some(item) if item.is_text() => {
                    self.editing = true;
                    ScreenAction::None
                }
                Some(item) => cycle(wizard, item, true),
                None => ScreenAction::None,
            },
            KeyCode::Right => focused.map_or(ScreenAction::None, |item| cycle(wizard, item, true)),
            KeyCode::Left => focused.map_or(ScreenAction::None, |item| cycle(wizard, item, false)),
            _ => ScreenAction::None,
        }
    }

    fn move_focus(&mut self, len: usize, forward: bool) {
        if len == 0 {
            return;
        }
        self.focus = if forward {
            (self.focus + 1) % len
        } else {
            (self.focus + len - 1) % len
        };
    }

    fn add<D: VinDecoder + 'static>(&mut self, wizard: &mut QuoteWizard<D>) -> ScreenAction {
        match wizard.current_step() {
            StepKey::Vehicles => {
                wizard.add_vehicle();
            }
            StepKey::Drops => {
                wizard.add_location();
            }
            _ => {}
        }
        ScreenAction::None
    }

    fn remove<D: VinDecoder + 'static>(
        &mut self,
        wizard: &mut QuoteWizard<D>,
        item: Focus,
    ) -> ScreenAction {
        let removed = match item {
            Focus::Vehicle(id, _) => wizard.remove_vehicle(id),
            Focus::Location(id) => wizard.remove_location(id),
            _ => return ScreenAction::None,
        };
        if !removed {
            return ScreenAction::Message("At least one entry is required".to_string());
        }
        let len = focus_items(wizard).len();
        self.focus = self.focus.min(len.saturating_sub(1));
        ScreenAction::None
    }
}

// ---------------------------------------------------------------------------
// Step contents
// ---------------------------------------------------------------------------

/// Focusable rows for the current step, in render order.
pub(crate) fn focus_items<D: VinDecoder + 'static>(wizard: &QuoteWizard<D>) -> Vec<Focus> {
    let state = wizard.state();
    let schema = wizard.schema();

    match wizard.current_step() {
        StepKey::Vehicles => {
            let inputs = step_inputs(schema, StepKey::Vehicles, VehicleInput::from_field);
            state
                .vehicles()
                .ids()
                .flat_map(|id| inputs.iter().map(move |input| Focus::Vehicle(id, *input)))
                .collect()
        }
        StepKey::Running => state.vehicles().ids().map(Focus::Running).collect(),
        StepKey::Pickup => vec![Focus::Pickup],
        StepKey::Drops => {
            let assign = wizard.assignment_enabled();
            let vehicles: Vec<_> = state.vehicles().ids().collect();
            let mut items = Vec::new();
            for location in state.drops().ids() {
                items.push(Focus::Location(location));
                if assign {
                    items.extend(vehicles.iter().map(|v| Focus::Assignment(location, *v)));
                }
            }
            items
        }
        StepKey::Transport => vec![Focus::Transport],
        StepKey::Timeframe => vec![Focus::Timeframe],
        StepKey::Contact => step_inputs(schema, StepKey::Contact, |key| match key {
            FieldKey::Contact(field) => Some(Focus::Contact(field)),
            _ => None,
        }),
    }
}

fn step_inputs<T>(schema: &ResolvedSchema, step: StepKey, map: impl Fn(FieldKey) -> Option<T>) -> Vec<T> {
    schema
        .step(step)
        .map(|s| s.fields.iter().filter_map(|f| map(f.key)).collect())
        .unwrap_or_default()
}

fn field_label(schema: &ResolvedSchema, step: StepKey, key: FieldKey) -> String {
    schema
        .field(step, key)
        .map(|f| f.label.clone())
        .unwrap_or_else(|| key.as_str().to_string())
}

/// Label and current value of a row.
fn describe<D: VinDecoder + 'static>(wizard: &QuoteWizard<D>, item: Focus) -> (String, String) {
    let state = wizard.state();
    let schema = wizard.schema();

    match item {
        Focus::Vehicle(id, input) => {
            let name = wizard.vehicle_name(id).unwrap_or_default();
            let label = format!("{name} · {}", field_label(schema, StepKey::Vehicles, input.field_key()));
            let Some(vehicle) = state.vehicles().get(id) else {
                return (label, String::new());
            };
            let value = match input {
                VehicleInput::Vin => vehicle.vin.clone(),
                _ if vehicle.vin_lookup_pending => "decoding...".to_string(),
                VehicleInput::Year => vehicle.year.clone(),
                VehicleInput::Make => vehicle.make.clone(),
                VehicleInput::Model => vehicle.model.clone(),
            };
            (label, value)
        }
        Focus::Running(id) => {
            let name = wizard.vehicle_name(id).unwrap_or_default();
            let value = match state.vehicles().get(id).map(|v| v.running) {
                Some(status) if status.is_answered() => format!("< {} >", schema.running_label(status)),
                _ => "< choose >".to_string(),
            };
            (name, value)
        }
        Focus::Pickup => (
            field_label(schema, StepKey::Pickup, FieldKey::PickupLocation),
            state.pickup_location().to_string(),
        ),
        Focus::Location(id) => {
            let index = state.drops().position(id).unwrap_or(0);
            let text = state.drops().get(id).map(|d| d.location.clone()).unwrap_or_default();
            (wizard.location_label(index), text)
        }
        Focus::Assignment(location, vehicle) => {
            let mark = if state.drops().is_assigned(location, vehicle) { "[x]" } else { "[ ]" };
            (
                format!("  {mark} {}", wizard.vehicle_name(vehicle).unwrap_or_default()),
                String::new(),
            )
        }
        Focus::Transport => {
            let value = match state.transport_type() {
                Some(transport) => {
                    let description = schema
                        .transport_options
                        .iter()
                        .find(|c| c.value == transport)
                        .and_then(|c| c.description.clone())
                        .unwrap_or_default();
                    format!("< {} >  {description}", schema.transport_label(transport))
                }
                None => "< choose >".to_string(),
            };
            ("Transport".to_string(), value)
        }
        Focus::Timeframe => {
            let value = match state.timeframe() {
                "" => "< choose >".to_string(),
                value => format!("< {} >", schema.timeframe_label(value)),
            };
            ("Timeframe".to_string(), value)
        }
        Focus::Contact(field) => {
            let mut label = field_label(schema, StepKey::Contact, FieldKey::Contact(field));
            if field.is_required() {
                label.push_str(" *");
            }
            (label, state.contact().get(field).to_string())
        }
    }
}

fn key_hints<D: VinDecoder + 'static>(wizard: &QuoteWizard<D>) -> String {
    let copy = &wizard.schema().copy;
    let forward = if wizard.is_terminal() {
        &copy.submit_label
    } else {
        &copy.next_label
    };
    let mut hints = vec![format!("n {forward}")];
    if !wizard.is_first() {
        hints.push(format!("b {}", copy.back_label));
    }
    match wizard.current_step() {
        StepKey::Vehicles => {
            hints.push("a add · x remove".to_string());
            hints.push(format!("l {}", copy.lookup_label));
        }
        StepKey::Drops => hints.push("a add · x remove".to_string()),
        _ => {}
    }
    hints.push("Enter edit/choose · ←→ cycle".to_string());
    hints.join(" · ")
}

fn lookup_error(err: &ShipQuoteError) -> String {
    match err {
        ShipQuoteError::Validation { message } => message.clone(),
        ShipQuoteError::LookupPending => "A VIN lookup is already running for this vehicle".to_string(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

fn edit_text<D: VinDecoder + 'static>(
    wizard: &mut QuoteWizard<D>,
    item: Focus,
    edit: impl FnOnce(&mut String),
) -> ScreenAction {
    let state = wizard.state();
    match item {
        Focus::Vehicle(id, input) => {
            let Some(vehicle) = state.vehicles().get(id) else {
                return ScreenAction::None;
            };
            let mut text = match input {
                VehicleInput::Vin => vehicle.vin.clone(),
                VehicleInput::Year => vehicle.year.clone(),
                VehicleInput::Make => vehicle.make.clone(),
                VehicleInput::Model => vehicle.model.clone(),
            };
            edit(&mut text);
            let patch = match input {
                VehicleInput::Vin => VehiclePatch::vin(text),
                VehicleInput::Year => VehiclePatch {
                    year: Some(text),
                    ..VehiclePatch::default()
                },
                VehicleInput::Make => VehiclePatch {
                    make: Some(text),
                    ..VehiclePatch::default()
                },
                VehicleInput::Model => VehiclePatch {
                    model: Some(text),
                    ..VehiclePatch::default()
                },
            };
            match wizard.update_vehicle(id, patch) {
                Ok(_) => ScreenAction::None,
                Err(e) => ScreenAction::Message(lookup_error(&e)),
            }
        }
        Focus::Pickup => {
            let mut text = state.pickup_location().to_string();
            edit(&mut text);
            wizard.set_pickup_location(text);
            ScreenAction::None
        }
        Focus::Location(id) => {
            let mut text = state.drops().get(id).map(|d| d.location.clone()).unwrap_or_default();
            edit(&mut text);
            wizard.update_location(id, LocationPatch::location(text));
            ScreenAction::None
        }
        Focus::Contact(field) => {
            let mut text = state.contact().get(field).to_string();
            edit(&mut text);
            wizard.set_contact_field(field, text);
            ScreenAction::None
        }
        _ => ScreenAction::None,
    }
}

/// Step an option row to its next (or previous) value.
fn cycle<D: VinDecoder + 'static>(wizard: &mut QuoteWizard<D>, item: Focus, forward: bool) -> ScreenAction {
    let schema = wizard.schema();
    let state = wizard.state();

    let result = match item {
        Focus::Running(id) => {
            let options: Vec<RunningStatus> = schema.running_options.iter().map(|c| c.value).collect();
            let current = state.vehicles().get(id).map(|v| v.running);
            match step_option(&options, current.as_ref(), forward) {
                Some(next) => wizard.update_vehicle(id, VehiclePatch::running(next)),
                None => Ok(false),
            }
        }
        Focus::Transport => {
            let options: Vec<_> = schema.transport_options.iter().map(|c| c.value).collect();
            let next = step_option(&options, state.transport_type().as_ref(), forward);
            wizard.set_transport_type(next);
            Ok(true)
        }
        Focus::Timeframe => {
            let options: Vec<_> = schema.timeframe_options.iter().map(|c| c.value.clone()).collect();
            let current = state.timeframe().to_string();
            if let Some(next) = step_option(&options, Some(&current), forward) {
                wizard.set_timeframe(next);
            }
            Ok(true)
        }
        Focus::Assignment(location, vehicle) => Ok(wizard.toggle_assignment(location, vehicle)),
        Focus::Vehicle(id, VehicleInput::Make) => {
            let options: Vec<String> = schema.makes().map(str::to_string).collect();
            let current = state.vehicles().get(id).map(|v| v.make.clone());
            match step_option(&options, current.as_ref(), forward) {
                Some(make) => wizard.update_vehicle(
                    id,
                    VehiclePatch {
                        make: Some(make),
                        model: Some(String::new()),
                        ..VehiclePatch::default()
                    },
                ),
                None => Ok(false),
            }
        }
        Focus::Vehicle(id, VehicleInput::Model) => {
            let Some(vehicle) = state.vehicles().get(id) else {
                return ScreenAction::None;
            };
            let options = schema.models_for(&vehicle.make).to_vec();
            let current = vehicle.model.clone();
            match step_option(&options, Some(&current), forward) {
                Some(model) => wizard.update_vehicle(
                    id,
                    VehiclePatch {
                        model: Some(model),
                        ..VehiclePatch::default()
                    },
                ),
                None => Ok(false),
            }
        }
        _ => Ok(false),
    };

    match result {
        Ok(_) => ScreenAction::None,
        Err(e) => ScreenAction::Message(lookup_error(&e)),
    }
}

/// Next value after `current` in `options`, wrapping around. An unset or
/// unknown current value starts at the first (or last) option.
fn step_option<T: PartialEq + Clone>(options: &[T], current: Option<&T>, forward: bool) -> Option<T> {
    if options.is_empty() {
        return None;
    }
    let len = options.len();
    let index = match current.and_then(|c| options.iter().position(|o| o == c)) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    Some(options[index].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipquote_shared::TransportType;
    use shipquote_vin::DecodedVin;

    struct NoDecoder;

    impl VinDecoder for NoDecoder {
        async fn decode(&self, _vin: &str) -> shipquote_shared::Result<DecodedVin> {
            Ok(DecodedVin::default())
        }
    }

    fn wizard() -> QuoteWizard<NoDecoder> {
        QuoteWizard::new(ResolvedSchema::default(), NoDecoder)
    }

    fn press(screen: &mut WizardScreen, wizard: &mut QuoteWizard<NoDecoder>, code: KeyCode) -> ScreenAction {
        screen.handle_key(wizard, code, KeyModifiers::NONE)
    }

    fn type_text(screen: &mut WizardScreen, wizard: &mut QuoteWizard<NoDecoder>, text: &str) {
        press(screen, wizard, KeyCode::Enter);
        for c in text.chars() {
            press(screen, wizard, KeyCode::Char(c));
        }
        press(screen, wizard, KeyCode::Enter);
    }

    #[test]
    fn options_wrap_in_both_directions() {
        let options = ["a", "b", "c"];
        assert_eq!(step_option(&options, None, true), Some("a"));
        assert_eq!(step_option(&options, None, false), Some("c"));
        assert_eq!(step_option(&options, Some(&"c"), true), Some("a"));
        assert_eq!(step_option(&options, Some(&"a"), false), Some("c"));
        assert_eq!(step_option::<&str>(&[], None, true), None);
    }

    #[test]
    fn typing_fills_the_vehicle_and_advances() {
        let mut wizard = wizard();
        let mut screen = WizardScreen::new();
        let items = focus_items(&wizard);
        let make = items
            .iter()
            .position(|i| matches!(i, Focus::Vehicle(_, VehicleInput::Make)))
            .expect("make row");

        for _ in 0..make {
            press(&mut screen, &mut wizard, KeyCode::Down);
        }
        type_text(&mut screen, &mut wizard, "Honda");
        press(&mut screen, &mut wizard, KeyCode::Down);
        press(&mut screen, &mut wizard, KeyCode::Right);

        let vehicle = wizard.state().vehicles().iter().next().expect("vehicle");
        assert_eq!(vehicle.make, "Honda");
        assert!(!vehicle.model.is_empty());

        assert_eq!(press(&mut screen, &mut wizard, KeyCode::Char('n')), ScreenAction::None);
        assert_eq!(wizard.current_step(), StepKey::Running);
    }

    #[test]
    fn blocked_step_reports_a_message() {
        let mut wizard = wizard();
        let mut screen = WizardScreen::new();
        assert!(matches!(
            press(&mut screen, &mut wizard, KeyCode::Char('n')),
            ScreenAction::Message(_)
        ));
        assert_eq!(wizard.current_step(), StepKey::Vehicles);
    }

    #[test]
    fn add_and_remove_vehicles() {
        let mut wizard = wizard();
        let mut screen = WizardScreen::new();
        press(&mut screen, &mut wizard, KeyCode::Char('a'));
        assert_eq!(wizard.state().vehicles().len(), 2);

        press(&mut screen, &mut wizard, KeyCode::Char('x'));
        assert_eq!(wizard.state().vehicles().len(), 1);
        assert!(matches!(
            press(&mut screen, &mut wizard, KeyCode::Char('x')),
            ScreenAction::Message(_)
        ));
    }

    #[test]
    fn assignment_rows_only_with_several_of_each() {
        let mut wizard = wizard();
        wizard.add_vehicle();
        let vehicle = wizard.state().vehicles().ids().next().expect("vehicle");
        wizard
            .update_vehicle(vehicle, VehiclePatch::identity("", "Honda", "Civic"))
            .expect("update");
        let second = wizard.state().vehicles().ids().nth(1).expect("vehicle");
        wizard
            .update_vehicle(second, VehiclePatch::identity("", "Ford", "Focus"))
            .expect("update");
        for id in [vehicle, second] {
            wizard
                .update_vehicle(id, VehiclePatch::running(RunningStatus::Running))
                .expect("update");
        }
        wizard.set_pickup_location("Denver, CO");
        while wizard.next() {}
        assert_eq!(wizard.current_step(), StepKey::Drops);

        assert_eq!(focus_items(&wizard).len(), 1);
        let location = wizard.add_location();
        let items = focus_items(&wizard);
        assert_eq!(items.len(), 6);
        assert!(items.contains(&Focus::Assignment(location, second)));
    }

    #[test]
    fn transport_cycles_through_options() {
        let mut wizard = wizard();
        assert_eq!(cycle(&mut wizard, Focus::Transport, true), ScreenAction::None);
        assert_eq!(wizard.state().transport_type(), Some(TransportType::Open));
        cycle(&mut wizard, Focus::Transport, true);
        assert_eq!(wizard.state().transport_type(), Some(TransportType::Enclosed));
        cycle(&mut wizard, Focus::Transport, false);
        assert_eq!(wizard.state().transport_type(), Some(TransportType::Open));
    }

    #[test]
    fn terminal_step_asks_for_submit() {
        let mut wizard = wizard();
        let vehicle = wizard.state().vehicles().ids().next().expect("vehicle");
        let location = wizard.state().drops().ids().next().expect("location");
        wizard
            .update_vehicle(vehicle, VehiclePatch::identity("", "Honda", "Civic"))
            .expect("update");
        wizard
            .update_vehicle(vehicle, VehiclePatch::running(RunningStatus::Running))
            .expect("update");
        wizard.set_pickup_location("Denver, CO");
        wizard.update_location(location, LocationPatch::location("Miami, FL"));
        wizard.set_transport_type(Some(TransportType::Open));
        wizard.set_timeframe("asap");
        while wizard.next() {}

        let mut screen = WizardScreen::new();
        type_text(&mut screen, &mut wizard, "Jane Doe");
        assert_eq!(wizard.state().contact().name, "Jane Doe");
        assert_eq!(press(&mut screen, &mut wizard, KeyCode::Char('n')), ScreenAction::Submit);
    }
}
