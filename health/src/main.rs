use clap::{Arg, ArgMatches, Command};
use common::config::{LogConfig, Settings};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config/health.toml";

fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .help("Sets a custom config file")
}

fn load_settings(matches: &ArgMatches) -> anyhow::Result<Settings> {
    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or(DEFAULT_CONFIG);
    Ok(Settings::new(config_path)?)
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = Command::new("Looker Health")
        .version("1.0")
        .about("Grades how a Looker instance's catalog is being used")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("serve")
                .about("Serve the health API over HTTP")
                .arg(config_arg()),
        )
        .subcommand(
            Command::new("report")
                .about("Compute one report and print it as JSON")
                .arg(
                    Arg::new("test_id")
                        .required(true)
                        .help("Report to compute, e.g. slow_explores"),
                )
                .arg(config_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("serve", serve_matches)) => {
            let settings = load_settings(serve_matches)?;
            init_tracing(&settings.log);
            info!(port = settings.api_port, "Starting health API");
            health::run_server(&settings).await?;
        }
        Some(("report", report_matches)) => {
            let settings = load_settings(report_matches)?;
            init_tracing(&settings.log);
            let test_id = report_matches
                .get_one::<String>("test_id")
                .map(|s| s.as_str())
                .unwrap_or_default();
            let report = health::run_report(&settings, test_id).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => unreachable!("clap requires a subcommand"),
    }

    Ok(())
}
