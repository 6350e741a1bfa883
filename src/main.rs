//! Alcoholimetro CLI
//!
//! Command-line access to the measurement station:
//! - Log in and check the session state
//! - Start and stop measurement sessions
//! - Render reading samples as chart configuration
//! - Upload sensor readings

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use alcoholimetro::chart::{build_chart_config, SampleSummary};
use alcoholimetro::config::{generate_default_config, Config, LoggingConfig};
use alcoholimetro::reading::SensorReading;
use alcoholimetro::samples::load_samples;
use alcoholimetro::session::{Notification, SessionController, SessionObserver, SessionView};
use alcoholimetro::{Credentials, LoginOutcome, StationClient};

#[derive(Parser)]
#[command(name = "alcoholimetro")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Control a breathalyzer measurement station")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Station server URL (overrides config)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Username for commands that need a session
    #[arg(short, long, env = "ALCOHOLIMETRO_USERNAME", global = true)]
    pub username: Option<String>,

    /// Password for commands that need a session
    #[arg(short, long, env = "ALCOHOLIMETRO_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check credentials against the server
    Login,

    /// Show whether a measurement session is running
    Status,

    /// Start a measurement session
    Start,

    /// Stop the running measurement session
    Stop,

    /// Print the chart configuration for a sample file
    Chart {
        /// JSON array or CSV file with fecha/alcohol_ppm
        input: PathBuf,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Upload a sensor reading
    SendReading {
        /// Employee identification (e.g. EMP001)
        #[arg(short, long)]
        employee: String,
        /// Raw 10-bit converter value
        #[arg(short, long)]
        analog: u16,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Prints session changes to the terminal
struct TerminalObserver;

impl SessionObserver for TerminalObserver {
    fn render(&self, view: &SessionView) {
        if view.start.busy || view.stop.busy {
            return;
        }
        println!("{}", view.state.alert_text());
    }

    fn notify(&self, notification: &Notification) {
        println!("[{}] {}", notification.kind.as_str(), notification.message);
    }
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("alcoholimetro={}", logging.level)),
    );
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::try_load_default()?,
    };
    if let Some(url) = &cli.base_url {
        config.station.base_url = url.clone();
    }

    init_logging(&config.logging);
    tracing::debug!(base_url = %config.station.base_url, "Alcoholimetro v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Login => {
            let client = StationClient::new(config.station.clone())?;
            login(&cli, &config, &client).await?;
            println!("Sesión iniciada");
        }

        Commands::Status => {
            let controller = connect(&cli, &config).await?;
            controller.refresh().await?;
        }

        Commands::Start => {
            let controller = connect(&cli, &config).await?;
            controller.refresh().await?;
            controller.start().await?;
        }

        Commands::Stop => {
            let controller = connect(&cli, &config).await?;
            controller.refresh().await?;
            controller.stop().await?;
        }

        Commands::Chart { input, output } => {
            let loaded = load_samples(input)
                .with_context(|| format!("reading samples from {}", input.display()))?;
            for (line, reason) in loaded.skipped.iter().take(10) {
                eprintln!("Fila {}: {}", line, reason);
            }

            let Some(chart) = build_chart_config(&loaded.samples) else {
                eprintln!("Sin muestras para graficar");
                return Ok(());
            };
            let json = serde_json::to_string_pretty(&chart)?;

            match output {
                Some(path) => {
                    std::fs::write(path, &json)?;
                    eprintln!("Chart written to {}", path.display());
                }
                None => println!("{}", json),
            }

            if let Some(summary) =
                SampleSummary::from_samples(&loaded.samples, config.chart.alert_threshold_ppm)
            {
                eprintln!("{}", summary);
            }
        }

        Commands::SendReading { employee, analog } => {
            let client = StationClient::new(config.station.clone())?;
            let reading = SensorReading::from_analog(employee.as_str(), *analog);
            println!(
                "{}: {} ({:.2} V, {:.2} ppm, {})",
                reading.employee_id,
                reading.analog_value,
                reading.voltage,
                reading.alcohol_ppm,
                reading.level().label()
            );

            let receipt = client.submit_reading(&reading).await?;
            if !receipt.is_success() {
                bail!(
                    "server rejected reading: {}",
                    receipt.message.unwrap_or(receipt.status)
                );
            }
            println!("Lectura registrada");
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(path, &content)?;
                    println!("Config written to {}", path.display());
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

/// Log in when credentials were given
async fn login(cli: &Cli, config: &Config, client: &StationClient) -> anyhow::Result<()> {
    let (Some(username), Some(password)) = (&cli.username, &cli.password) else {
        bail!("--username and --password are required");
    };

    let credentials = Credentials::validate(username, password, &config.login.rules())?;
    match client.login(&credentials, &config.login.landing_route).await {
        LoginOutcome::LoggedIn { .. } => Ok(()),
        other => bail!("{}", other.error_message().unwrap_or("login failed")),
    }
}

async fn connect(
    cli: &Cli,
    config: &Config,
) -> anyhow::Result<SessionController<StationClient, TerminalObserver>> {
    let client = StationClient::new(config.station.clone())?;
    if cli.username.is_some() {
        login(cli, config, &client).await?;
    }
    Ok(SessionController::new(
        client,
        TerminalObserver,
        config.station.warning_policy,
    ))
}
