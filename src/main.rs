use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use untis_timetable::{
    client::parse_date,
    config::ConfigOverrides,
    setup_uri::SetupUri,
    Clock, DateRange, SystemClock, Totp, UntisClient, UntisConfig,
};

#[derive(Parser, Debug)]
#[command(name = "untis-timetable")]
#[command(about = "Fetches a compact timetable from a WebUntis server")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    username: Option<String>,

    /// Base32 secret of the account
    #[arg(long, global = true)]
    secret: Option<String>,

    #[arg(long, global = true)]
    school: Option<String>,

    /// Server host, e.g. arche.webuntis.com
    #[arg(long, global = true)]
    server: Option<String>,

    /// `untis://setschool?...` link from the account's QR code
    #[arg(long, global = true, env = "UNTIS_SETUP_URI", hide_env_values = true)]
    setup_uri: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Raw user and master data
    MasterData(DateArgs),
    /// Merged timetable with resolved names
    Timetable(DateArgs),
    /// Homeworks due on the day of their lesson
    Homeworks(DateArgs),
    /// Lesson texts
    Text(DateArgs),
    /// Current one-time code
    Code,
}

#[derive(Args, Debug)]
struct DateArgs {
    /// First day, YYYYMMDD or YYYY-MM-DD (default: today)
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Last day, YYYYMMDD or YYYY-MM-DD (default: today)
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,
}

impl DateArgs {
    fn range(&self, clock: &impl Clock) -> DateRange {
        DateRange::resolve(self.start, self.end, clock)
    }
}

fn load_config(cli: &Cli) -> Result<UntisConfig> {
    let mut overrides = ConfigOverrides {
        username: cli.username.clone(),
        secret: cli.secret.clone(),
        school: cli.school.clone(),
        server: cli.server.clone(),
    };
    if let Some(uri) = &cli.setup_uri {
        let setup = SetupUri::parse(uri).context("Failed to parse setup URI")?;
        overrides = overrides.with_setup_uri(setup);
    }

    UntisConfig::load(cli.config.as_deref(), overrides).context("Failed to load configuration")
}

fn connect(config: UntisConfig) -> Result<UntisClient> {
    UntisClient::new(config).context("Failed to create HTTP client")
}

fn run(cli: &Cli) -> Result<Value> {
    let config = load_config(cli)?;

    let result = match &cli.command {
        Command::Code => {
            let totp = Totp::new(config.secret);
            let now = SystemClock.unix_seconds();
            let code = totp.generate(now)?;

            json!({
                "code": code.to_string(),
                "remainingSeconds": totp.remaining_seconds(now),
            })
        }
        Command::MasterData(dates) => {
            let client = connect(config)?;
            client.fetch_master_data(&dates.range(client.clock()))?
        }
        Command::Timetable(dates) => {
            let client = connect(config)?;
            serde_json::to_value(client.fetch_timetable(&dates.range(client.clock()))?)?
        }
        Command::Homeworks(dates) => {
            let client = connect(config)?;
            serde_json::to_value(client.fetch_homeworks(&dates.range(client.clock()))?)?
        }
        Command::Text(dates) => {
            let client = connect(config)?;
            serde_json::to_value(client.fetch_text(&dates.range(client.clock()))?)?
        }
    };

    Ok(result)
}

fn main() -> ExitCode {
    // Missing .env is fine, the environment may carry everything
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::WARN.into())
        .parse_lossy(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "untis_timetable=info".to_string()),
        );
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match run(&cli) {
        Ok(result) => {
            println!("{}", json!({ "result": result }));
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!("{err:#}");
            println!("{}", json!({ "error": format!("{err:#}") }));
            ExitCode::FAILURE
        }
    }
}
