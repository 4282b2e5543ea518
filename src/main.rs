//! Warden - run an ordinary program as a managed service.
//!
//! The service identity, start pattern, account and crash recovery policy
//! come from a TOML config file; the program to supervise follows `--` on
//! the command line.

mod command;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use command::CommandService;
use host::loader::{self, HostConfig, CONFIG_ENV};
use host::{registration, ConsoleHost, ControlHandle, ControlRequest, ServiceRunner};
use std::path::{Path, PathBuf};
use tokio::signal::unix::{signal, Signal, SignalKind};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "warden",
    about = "Run a program as a managed service",
    version,
    author
)]
struct Cli {
    /// Host config file
    #[arg(short, long, env = CONFIG_ENV, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program as a service in the foreground
    Run {
        /// Wait for a debugger and break before the service starts
        #[arg(long)]
        debug: bool,

        /// Program and arguments to supervise
        #[arg(trailing_var_arg = true, required = true)]
        program: Vec<String>,
    },

    /// Check the config file
    Validate,

    /// Print the registrations the config file produces
    Plan,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config_path = cli
        .config
        .as_deref()
        .with_context(|| format!("no config file given (use --config or set {})", CONFIG_ENV))?;

    match cli.command {
        Commands::Run { debug, program } => {
            let code = run_service(config_path, debug, program)?;
            std::process::exit(code);
        }

        Commands::Validate => {
            let config = load(config_path)?;
            let option = config.service_option()?;
            println!(
                "{}: service '{}' is valid",
                config_path.display(),
                option.service_name
            );
        }

        Commands::Plan => {
            let config = load(config_path)?;
            print_plan(&config)?;
        }
    }

    Ok(())
}

fn load(config_path: &Path) -> Result<HostConfig> {
    loader::load_config(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))
}

/// Run the program under the console host and return the exit code.
fn run_service(config_path: &Path, debug: bool, program: Vec<String>) -> Result<i32> {
    let config = load(config_path)?;
    let option = config.service_option()?.clone();

    let (host, control) = ConsoleHost::new();
    spawn_signal_forwarder(control)?;

    info!(service = %option.service_name, program = ?program, "Running service");
    ServiceRunner::<CommandService>::new(option)
        .recovery_callback(config.recovery_callback())
        .debug(debug)
        .run(host, program)?;

    Ok(host::exit::exit_code())
}

fn print_plan(config: &HostConfig) -> Result<()> {
    let option = config.service_option()?;

    println!("Service: {}", option.service_name);
    for step in registration::plan(option) {
        println!("  {}", step);
    }

    match &config.recovery {
        Some(policy) => {
            println!("Recovery:");
            for action in &policy.actions {
                println!("  {:?}", action);
            }
            if let Some(days) = policy.reset_period_days {
                println!("  reset failure count after {} day(s)", days);
            }
            if policy.on_crash_only {
                println!("  on crash only");
            }
        }
        None => println!("Recovery: not configured"),
    }

    Ok(())
}

/// Process signals that control the service.
struct ControlSignals {
    terminate: Signal,
    interrupt: Signal,
    pause: Signal,
    resume: Signal,
}

impl ControlSignals {
    fn register() -> std::io::Result<Self> {
        Ok(Self {
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
            pause: signal(SignalKind::user_defined1())?,
            resume: signal(SignalKind::user_defined2())?,
        })
    }

    async fn next(&mut self) -> ControlRequest {
        tokio::select! {
            _ = self.terminate.recv() => ControlRequest::Stop,
            _ = self.interrupt.recv() => ControlRequest::Stop,
            _ = self.pause.recv() => ControlRequest::Pause,
            _ = self.resume.recv() => ControlRequest::Continue,
        }
    }

    /// Forward signals until a stop is delivered or the host exits.
    async fn forward(mut self, control: ControlHandle) {
        loop {
            let request = self.next().await;
            info!(?request, "Received control signal");
            if !control.send(request) || request == ControlRequest::Stop {
                debug!("Signal forwarding finished");
                return;
            }
        }
    }
}

/// Deliver SIGTERM/SIGINT (stop) and SIGUSR1/SIGUSR2 (pause/continue) to
/// the console host from a dedicated thread.
fn spawn_signal_forwarder(control: ControlHandle) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build signal runtime")?;

    let signals = runtime
        .block_on(async { ControlSignals::register() })
        .context("failed to install signal handlers")?;

    std::thread::Builder::new()
        .name("warden-signals".to_string())
        .spawn(move || runtime.block_on(signals.forward(control)))
        .context("failed to spawn signal thread")?;

    Ok(())
}
