//! pantryd CLI entry point

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use pantryd::agent::{Orchestrator, TurnRequest};
use pantryd::cli::{Cli, Command, OutputFormat};
use pantryd::config::Config;
use pantryd::cycle::CycleRunner;
use pantryd::domain::{ApprovalToken, ErrorKind, TurnStatus};
use pantryd::events::create_event_bus;
use pantryd::llm::create_client;
use pantryd::policy::SafetyPolicy;
use pantryd::state::StateManager;
use pantryd::tools::standard_registry;
use pantryd::vendor::HttpVendorClient;

fn setup_logging(cli_log_level: Option<&str>) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pantryd")
        .join("logs");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = match cli_log_level.map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            other => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", other);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(log_dir.join("pantryd.log")).context("Failed to create log file")?;

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
    setup_logging(cli.log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    debug!(command = ?cli.command, "main: dispatching command");

    match cli.command {
        Command::Chat {
            message,
            max_iterations,
            approve,
        } => cmd_chat(&config, &message, max_iterations, approve.as_deref()).await,
        Command::Cycle { watch } => cmd_cycle(&config, watch).await,
        Command::Items { low, format } => cmd_items(&config, low, format).await,
        Command::Orders { format } => cmd_orders(&config, format).await,
    }
}

fn open_state(config: &Config) -> Result<StateManager> {
    let store_path = PathBuf::from(&config.storage.store_dir);
    if !store_path.exists() {
        debug!(?store_path, "open_state: creating store directory");
        fs::create_dir_all(&store_path).context("Failed to create store directory")?;
    }
    StateManager::spawn(&store_path).context("Failed to spawn StateManager")
}

fn build_orchestrator(config: &Config, state: StateManager) -> Result<Orchestrator> {
    let llm = create_client(&config.llm).context("Failed to create LLM client")?;
    let registry = Arc::new(standard_registry());
    let policy = SafetyPolicy::new(config.policy.clone());

    let mut orchestrator = Orchestrator::new(
        llm,
        registry,
        policy,
        state,
        config.agent.clone(),
        config.llm.max_tokens,
    );
    match HttpVendorClient::from_config(&config.vendor) {
        Ok(vendor) => orchestrator = orchestrator.with_vendor(Arc::new(vendor)),
        Err(e) => info!("Vendor client unavailable ({}); financial tools will report it", e),
    }
    Ok(orchestrator)
}

/// Run one chat turn and print the answer plus its tool trace
async fn cmd_chat(config: &Config, message: &str, max_iterations: Option<u32>, approve: Option<&str>) -> Result<()> {
    debug!(%message, ?max_iterations, ?approve, "cmd_chat: called");
    config.validate()?;

    let state = open_state(config)?;
    let orchestrator = build_orchestrator(config, state)?;

    let mut request = TurnRequest::message(message);
    if let Some(max) = max_iterations {
        request = request.with_max_iterations(max);
    }
    if let Some(tool) = approve {
        let user = std::env::var("USER").unwrap_or_else(|_| "cli".to_string());
        request = request.with_approval(ApprovalToken::new(tool, user));
    }

    let response = orchestrator.chat_with_tools(request).await?;

    for record in &response.tool_calls {
        let marker = match (&record.result, &record.error) {
            (Some(_), _) => "✓".green(),
            (_, Some(e)) if matches!(e.kind, ErrorKind::ApprovalRequired) => "?".yellow(),
            _ => "✗".red(),
        };
        println!("{} {}", marker, record.tool_name.dimmed());
    }
    if !response.tool_calls.is_empty() {
        println!();
    }

    println!("{}", response.response);

    match response.status {
        TurnStatus::Completed => {}
        TurnStatus::Denied => {
            println!();
            println!(
                "{}",
                "Re-run with --approve <tool> to authorize a pending action.".yellow()
            );
        }
        TurnStatus::MaxIterationsReached => {
            println!();
            println!("{}", "The reasoning limit was reached for this request.".yellow());
        }
        TurnStatus::Cancelled => {}
    }

    Ok(())
}

/// Run the autonomous cycle once or on the configured schedule
async fn cmd_cycle(config: &Config, watch: bool) -> Result<()> {
    debug!(watch, "cmd_cycle: called");
    config.validate()?;

    let state = open_state(config)?;
    let orchestrator = Arc::new(build_orchestrator(config, state.clone())?);
    let bus = create_event_bus();
    let (stop_tx, stop_rx) = tokio::sync::watch::channel(false);

    let runner = CycleRunner::new(orchestrator, state, bus.clone(), config.cycle.clone(), stop_rx);

    // Print lifecycle notifications as they arrive
    let mut events = bus.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                pantryd::events::AgentEvent::CycleStarted { cycle_id } => {
                    println!("{} cycle {}", "▶".cyan(), cycle_id.dimmed());
                }
                pantryd::events::AgentEvent::ActionTaken {
                    action_name,
                    description,
                    ..
                } => {
                    println!("  {} {}: {}", "•".green(), action_name, description);
                }
                pantryd::events::AgentEvent::CycleCompleted { summary, .. } => {
                    println!(
                        "{} cycle {} ({} actions)",
                        "■".cyan(),
                        summary.status.to_string().yellow(),
                        summary.actions.len()
                    );
                }
                _ => {}
            }
        }
    });

    if watch {
        println!(
            "Running cycles every {}s. Press Ctrl+C to stop.",
            config.cycle.interval_secs
        );
        tokio::select! {
            _ = runner.run_scheduled() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, stopping cycle scheduler");
                let _ = stop_tx.send(true);
            }
        }
    } else {
        runner.run_cycle().await;
    }

    printer.abort();
    Ok(())
}

/// Show tracked items
async fn cmd_items(config: &Config, low: bool, format: OutputFormat) -> Result<()> {
    debug!(low, ?format, "cmd_items: called");
    let state = open_state(config)?;
    let items = if low {
        state.low_stock_items().await?
    } else {
        state.list_items().await?
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&items)?),
        OutputFormat::Text => {
            if items.is_empty() {
                println!("No items. Seed the store with the pantrystore CLI.");
                return Ok(());
            }
            for item in items {
                let marker = if item.is_low() { "!".red().bold() } else { " ".normal() };
                println!(
                    "{} {:<24} {:>8.1} {:<8} (min {:.1})",
                    marker,
                    item.name.cyan(),
                    item.quantity,
                    item.unit,
                    item.min_quantity
                );
            }
        }
    }
    Ok(())
}

/// Show recorded orders
async fn cmd_orders(config: &Config, format: OutputFormat) -> Result<()> {
    debug!(?format, "cmd_orders: called");
    let state = open_state(config)?;
    let orders = state.list_orders(None).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&orders)?),
        OutputFormat::Text => {
            if orders.is_empty() {
                println!("No orders recorded.");
                return Ok(());
            }
            for order in orders {
                println!(
                    "{} {:<20} {:>6.1} x ${:<8.2} {} {}",
                    order.created_at.format("%Y-%m-%d %H:%M"),
                    order.item_name.cyan(),
                    order.quantity,
                    order.total_usd,
                    order.status.to_string().yellow(),
                    order.vendor_ref.as_deref().unwrap_or("-").dimmed()
                );
            }
        }
    }
    Ok(())
}
