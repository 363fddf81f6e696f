//! Core TUI application state and event loop.

use std::io;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use shipquote_core::{HttpLeadSink, Notice, NoticeKind, QuoteWizard, SubmissionPipeline};
use shipquote_schema::{FetchOptions, load_schema};
use shipquote_shared::AppConfig;
use shipquote_vin::NhtsaDecoder;

use crate::screens::{ScreenAction, WizardScreen};
use crate::widgets::status_bar;

const READY: &str = "Ready · press ? for help";

/// Application state.
pub(crate) struct App {
    wizard: QuoteWizard<NhtsaDecoder>,
    /// `None` when no submission endpoint is configured.
    pipeline: Option<SubmissionPipeline<HttpLeadSink>>,
    /// Submission running in the background.
    submission: Option<JoinHandle<shipquote_shared::Result<Notice>>>,
    screen: WizardScreen,
    should_quit: bool,
    status: String,
    status_kind: Option<NoticeKind>,
    show_help: bool,
}

impl App {
    fn new(
        wizard: QuoteWizard<NhtsaDecoder>,
        pipeline: Option<SubmissionPipeline<HttpLeadSink>>,
    ) -> Self {
        Self {
            wizard,
            pipeline,
            submission: None,
            screen: WizardScreen::new(),
            should_quit: false,
            status: READY.to_string(),
            status_kind: None,
            show_help: false,
        }
    }

    fn message(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        self.status_kind = None;
    }

    fn notice(&mut self, notice: Notice) {
        self.status = notice.to_string();
        self.status_kind = Some(notice.kind);
    }

    fn failure(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        self.status_kind = Some(NoticeKind::Failure);
    }

    /// Fold in finished background work: VIN lookups and the submission.
    async fn tick(&mut self) {
        for notice in self.wizard.poll_lookups() {
            self.notice(notice);
        }

        if !self.submission.as_ref().is_some_and(JoinHandle::is_finished) {
            return;
        }
        let Some(handle) = self.submission.take() else {
            return;
        };
        match handle.await {
            Ok(Ok(notice)) => {
                let success = notice.is_success();
                self.notice(notice);
                if success {
                    self.wizard.reset();
                    self.screen.reset();
                }
            }
            Ok(Err(e)) => self.failure(e.to_string()),
            Err(e) if e.is_cancelled() => self.message("Submission cancelled"),
            Err(e) => self.failure(format!("submission task failed: {e}")),
        }
    }

    fn submit(&mut self) {
        if self.submission.is_some() {
            return;
        }
        let Some(pipeline) = &self.pipeline else {
            self.failure("No submission endpoint configured. Set [submission] endpoint and restart.");
            return;
        };

        match pipeline.prepare(&self.wizard) {
            Ok(submission) => {
                let pipeline = pipeline.clone();
                self.submission = Some(tokio::spawn(async move {
                    pipeline.dispatch(submission).await
                }));
                let label = self.wizard.schema().copy.submitting_label.clone();
                self.message(label);
            }
            Err(e) => self.failure(e.to_string()),
        }
    }

    fn cancel_submission(&mut self) -> bool {
        match self.submission.as_ref() {
            Some(handle) => {
                handle.abort();
                info!("submission aborted by user");
                true
            }
            None => false,
        }
    }
}

/// Entry point: loads the schema, sets up the terminal, runs the event
/// loop, restores the terminal.
pub(crate) async fn run(config: AppConfig) -> Result<()> {
    let opts = FetchOptions {
        timeout_secs: config.form.timeout_secs,
    };
    let schema = load_schema(config.form.source.as_deref(), &opts).await;
    let decoder = NhtsaDecoder::new(&config.vin)?;
    let pipeline = match HttpLeadSink::from_config(&config) {
        Ok(sink) => Some(SubmissionPipeline::new(sink)),
        Err(e) => {
            warn!(error = %e, "lead submission disabled");
            None
        }
    };
    let mut app = App::new(QuoteWizard::new(schema, decoder), pipeline);

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        app.tick().await;
        terminal.draw(|f| draw(f, app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            app.cancel_submission();
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') if !app.screen.is_editing() => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if !app.screen.is_editing() => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        KeyCode::Esc if !app.screen.is_editing() && app.cancel_submission() => {
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Answers are frozen while a submission is in flight.
    if app.submission.is_some() {
        return;
    }

    match app.screen.handle_key(&mut app.wizard, code, modifiers) {
        ScreenAction::None => {}
        ScreenAction::Submit => app.submit(),
        ScreenAction::Message(msg) => app.message(msg),
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Title
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    let title = Paragraph::new(" ShipQuote · Vehicle shipping quote ")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    f.render_widget(title, chunks[0]);

    // Content area: delegate to screen
    app.screen
        .draw(f, chunks[1], &app.wizard, app.submission.is_some());

    // Status bar
    let bar = status_bar(&app.status, app.status_kind);
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  n / PgDn     Next step (submit on the last step)"),
        Line::from("  b / PgUp     Previous step"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Inputs:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓ Tab      Move between inputs"),
        Line::from("  Enter        Edit text / choose option"),
        Line::from("  ←/→          Cycle options, makes and models"),
        Line::from("  a / x        Add / remove vehicle or location"),
        Line::from("  l            Decode the focused vehicle's VIN"),
        Line::from("  Esc          Stop editing / cancel submission"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help · press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
