//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use shipquote_core::{HttpLeadSink, Notice, QuoteWizard, SubmissionPipeline};
use shipquote_schema::{FetchOptions, ResolvedSchema, load_schema};
use shipquote_shared::{AppConfig, init_config, load_config};
use shipquote_vin::{NhtsaDecoder, VinDecoder, validate_vin};

use crate::answers::{read_answers, walk};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// ShipQuote: vehicle-shipping quote wizard, headless.
#[derive(Parser)]
#[command(
    name = "shipquote",
    version,
    about = "Inspect the quote form, decode VINs, and submit quote requests.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the resolved wizard steps.
    Schema {
        /// Form configuration source (file path or http(s) URL).
        /// Defaults to `[form] source` from the config file.
        #[arg(long, env = "SHIPQUOTE_FORM")]
        form: Option<String>,

        /// Print the full resolved schema as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Decode a VIN into year, make and model.
    DecodeVin {
        /// 17-character VIN.
        vin: String,
    },

    /// Fill the wizard from an answers file and submit the lead.
    Submit {
        /// JSON answers file.
        #[arg(long)]
        answers: PathBuf,

        /// Form configuration source (file path or http(s) URL).
        #[arg(long, env = "SHIPQUOTE_FORM")]
        form: Option<String>,

        /// Print the lead payload instead of sending it.
        #[arg(long)]
        dry_run: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "shipquote=info",
        1 => "shipquote=debug",
        _ => "shipquote=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Schema { form, json } => cmd_schema(form.as_deref(), json).await,
        Command::DecodeVin { vin } => cmd_decode_vin(&vin).await,
        Command::Submit {
            answers,
            form,
            dry_run,
        } => cmd_submit(&answers, form.as_deref(), dry_run).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

/// Resolve the schema from `--form`, falling back to the config file.
async fn resolve_schema(config: &AppConfig, form: Option<&str>) -> ResolvedSchema {
    let source = form.or(config.form.source.as_deref());
    let opts = FetchOptions {
        timeout_secs: config.form.timeout_secs,
    };
    load_schema(source, &opts).await
}

async fn cmd_schema(form: Option<&str>, json: bool) -> Result<()> {
    let config = load_config()?;
    let schema = resolve_schema(&config, form).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&schema)?);
        return Ok(());
    }

    let total = schema.steps.len();
    for (index, step) in schema.steps.iter().enumerate() {
        println!();
        println!(
            "  {}  [{}] {}",
            schema.progress_badge(index + 1, total),
            step.key,
            step.title
        );
        println!("      {}", step.description);
        for field in &step.fields {
            println!("      - {:<16} {}", field.key.as_str(), field.label);
        }
    }
    println!();
    println!("  Submit: {}", schema.copy.submit_label);
    println!();
    Ok(())
}

async fn cmd_decode_vin(vin: &str) -> Result<()> {
    let vin = validate_vin(vin)?.to_ascii_uppercase();
    let config = load_config()?;
    let decoder = NhtsaDecoder::new(&config.vin)?;

    let progress = CliProgress::new();
    progress.message(format!("Decoding {vin}"));
    let decoded = decoder.decode(&vin).await;
    progress.finish();
    let decoded = decoded?;

    if !decoded.is_decodable() {
        return Err(eyre!(
            "VIN {vin} could not be decoded; select year, make and model manually"
        ));
    }

    println!();
    println!("  VIN:   {vin}");
    println!("  Year:  {}", decoded.year.as_deref().unwrap_or("-"));
    println!("  Make:  {}", decoded.make.as_deref().unwrap_or("-"));
    println!("  Model: {}", decoded.model.as_deref().unwrap_or("-"));
    println!();
    Ok(())
}

async fn cmd_submit(answers_path: &Path, form: Option<&str>, dry_run: bool) -> Result<()> {
    let config = load_config()?;
    let answers = read_answers(answers_path)?;
    let schema = resolve_schema(&config, form).await;
    let decoder = NhtsaDecoder::new(&config.vin)?;
    let mut wizard = QuoteWizard::new(schema, decoder);

    let progress = CliProgress::new();
    progress.message("Applying answers".to_string());
    let started = match answers.apply(&mut wizard) {
        Ok(started) => started,
        Err(e) => {
            progress.finish();
            return Err(e);
        }
    };

    let mut done = 0;
    while let Some(notice) = wizard.next_lookup().await {
        done += 1;
        progress.message(format!("Decoding VINs [{done}/{started}]"));
        progress.println(&notice);
    }
    progress.finish();

    if let Err(step) = walk(&mut wizard) {
        let title = wizard
            .schema()
            .step(step)
            .map(|s| s.title.as_str())
            .unwrap_or_else(|| step.as_str());
        return Err(eyre!(
            "answers are incomplete: step '{step}' ({title}) cannot be completed"
        ));
    }

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&wizard.lead())?);
        return Ok(());
    }

    let sink = HttpLeadSink::from_config(&config)?;
    info!(endpoint = %sink.endpoint(), "sending lead");
    let pipeline = SubmissionPipeline::new(sink);

    let progress = CliProgress::new();
    progress.message(wizard.schema().copy.submitting_label.clone());
    let notice = pipeline.submit(&wizard).await;
    progress.finish();
    let notice = notice?;

    println!();
    println!("  {}", notice.title);
    println!("  {}", notice.description);
    println!();

    if notice.is_success() {
        Ok(())
    } else {
        Err(eyre!("lead submission failed"))
    }
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Spinner shown while network calls run.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn message(&self, msg: String) {
        self.spinner.set_message(msg);
    }

    fn println(&self, notice: &Notice) {
        let marker = if notice.is_success() { "ok" } else { "!!" };
        self.spinner.println(format!("  [{marker}] {notice}"));
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}
