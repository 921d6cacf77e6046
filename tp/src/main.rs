//! tp - conversational task planner
//!
//! CLI entry point for planning conversations and laying out task records.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info, warn};

use taskplanner::cli::{Cli, Command, OutputFormat, get_log_path};
use taskplanner::config::Config;
use taskplanner::domain::{DateWindow, TaskRecord, parse_iso_datetime};
use taskplanner::extract::{ConversationExtractor, Extraction, ExtractorConfig, SYSTEM_PROMPT};
use taskplanner::gantt::{GanttLayout, render_text};
use taskplanner::llm::create_client;
use taskplanner::planning::{PlanOutcome, PlanSource, Planner, schedule};

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Logging isn't initialized yet, so problems go to stderr
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(provider = %config.llm.provider, model = %config.llm.model, "tp loaded config");

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Plan {
            input,
            start,
            end,
            now,
            offline,
            format,
        } => {
            let window = DateWindow::parse(&start, &end).context("Invalid project window")?;
            let now = resolve_now(now.as_deref())?;
            cmd_plan(&config, &input, &window, now, offline, format).await
        }
        Command::Layout {
            input,
            start,
            end,
            now,
            format,
        } => {
            let window = match (start, end) {
                (Some(s), Some(e)) => Some(DateWindow::parse(&s, &e).context("Invalid chart window")?),
                _ => None,
            };
            let now = resolve_now(now.as_deref())?;
            cmd_layout(&config, &input, window.as_ref(), now, format)
        }
        Command::Templates => cmd_templates(&config),
    }
}

fn resolve_now(value: Option<&str>) -> Result<NaiveDateTime> {
    match value {
        Some(s) => parse_iso_datetime(s).context("Invalid --now"),
        None => Ok(Local::now().naive_local()),
    }
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        debug!("read_input: reading stdin");
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    let path = PathBuf::from(input);
    fs::read_to_string(&path).context(format!("Failed to read {}", path.display()))
}

async fn cmd_plan(
    config: &Config,
    input: &str,
    window: &DateWindow,
    now: NaiveDateTime,
    offline: bool,
    format: OutputFormat,
) -> Result<()> {
    let conversation = read_input(input)?;
    let templates = config.template_library();

    let outcome = if offline {
        info!("cmd_plan: offline, using template");
        let extraction = Extraction::fallback(&templates, &conversation, "offline mode");
        schedule(extraction, window, config.planning.use_suggested_dates)
    } else if let Err(e) = config.llm.get_api_key() {
        warn!(error = %e, "cmd_plan: no API key, using template");
        let extraction = Extraction::fallback(&templates, &conversation, "no API key configured");
        schedule(extraction, window, config.planning.use_suggested_dates)
    } else {
        let llm = create_client(&config.llm).context("Failed to create LLM client")?;
        let extractor = ConversationExtractor::with_config(
            llm,
            templates,
            ExtractorConfig {
                system_prompt: SYSTEM_PROMPT.to_string(),
                max_tokens: config.llm.max_tokens,
            },
        );
        Planner::new(extractor)
            .use_suggested_dates(config.planning.use_suggested_dates)
            .plan(&conversation, window)
            .await
    };

    let layout = config.layout_engine().layout(&outcome.tasks, Some(window), now);

    match format {
        OutputFormat::Json => {
            let doc = serde_json::json!({ "plan": outcome, "layout": layout });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => print_plan(&outcome, &layout, config.gantt.chart_width),
    }
    Ok(())
}

fn print_plan(outcome: &PlanOutcome, layout: &GanttLayout, width: usize) {
    let source = match outcome.source {
        PlanSource::Model => "extracted".green().to_string(),
        PlanSource::Fallback => format!(
            "template '{}'",
            outcome.template.as_deref().unwrap_or("general")
        )
        .yellow()
        .to_string(),
    };
    println!(
        "{} {} tasks, {} ({})",
        "Plan:".bold(),
        outcome.tasks.len(),
        outcome.window,
        source
    );
    println!();
    print!("{}", render_text(layout, width));
    if !outcome.warnings.is_empty() {
        println!();
        for warning in &outcome.warnings {
            println!("{} {}", "warning:".yellow().bold(), warning);
        }
    }
}

fn cmd_layout(
    config: &Config,
    input: &str,
    window: Option<&DateWindow>,
    now: NaiveDateTime,
    format: OutputFormat,
) -> Result<()> {
    let content = read_input(input)?;
    let records: Vec<TaskRecord> = serde_json::from_str(&content).context("Failed to parse task records")?;
    info!(record_count = records.len(), "cmd_layout: parsed records");

    let layout = config.layout_engine().layout_records(&records, window, now);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&layout)?),
        OutputFormat::Text => print!("{}", render_text(&layout, config.gantt.chart_width)),
    }
    Ok(())
}

fn cmd_templates(config: &Config) -> Result<()> {
    let library = config.template_library();
    for template in library.templates() {
        let keywords = if template.keywords.is_empty() {
            "(default)".dimmed().to_string()
        } else {
            template.keywords.join(", ")
        };
        println!("{} {}", template.name.bold(), keywords);
        for (idx, task) in template.tasks.iter().enumerate() {
            println!("  {}. {} [{}]", idx + 1, task.title, task.priority);
        }
        println!();
    }
    Ok(())
}
