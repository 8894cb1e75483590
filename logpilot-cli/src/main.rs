use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};
use logpilot_core::{
    decode_log_bytes, provider_from_config, read_log_file, render_matches, render_report, search_log, Config,
    IncidentStore, LogPilot, OutputFormat, DEFAULT_CONTEXT_LINES, SUPPORTED_PROVIDERS,
};
use std::io;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;
use tracing::{debug, error, info};

fn build_cli() -> Command {
    Command::new("logpilot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("AI co-pilot for logs: classifies, finds root causes, recommends fixes, remembers incidents")
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Log file to analyze (reads stdin when omitted)"),
        )
        .arg(
            Arg::new("provider")
                .short('p')
                .long("provider")
                .value_name("PROVIDER")
                .help(format!("AI provider to use: {}", SUPPORTED_PROVIDERS.join(", "))),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Model identifier overriding the configured one"),
        )
        .arg(
            Arg::new("api-key")
                .long("api-key")
                .value_name("KEY")
                .help("API key for the AI provider"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FORMAT")
                .help("Output format: console or json")
                .default_value("console"),
        )
        .arg(
            Arg::new("memory-path")
                .long("memory-path")
                .value_name("PATH")
                .help("Incident memory file (defaults to ~/.logpilot/data/incident_memory.json)"),
        )
        .arg(
            Arg::new("no-memory")
                .long("no-memory")
                .help("Do not consult or update the incident memory")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("search")
                .short('s')
                .long("search")
                .value_name("QUERY")
                .help("Only print lines containing QUERY (case-insensitive); no AI provider is used"),
        )
        .arg(
            Arg::new("context")
                .short('C')
                .long("context")
                .value_name("LINES")
                .help(format!(
                    "Context lines shown around each search match (default {})",
                    DEFAULT_CONTEXT_LINES
                ))
                .value_parser(clap::value_parser!(usize)),
        )
}

async fn read_input(matches: &ArgMatches) -> Result<String> {
    if let Some(file_path) = matches.get_one::<String>("file") {
        return read_log_file(file_path).await;
    }

    info!("Reading log data from stdin");
    let mut data = Vec::new();
    tokio::io::stdin().read_to_end(&mut data).await?;
    debug!("Read {} bytes from stdin", data.len());
    Ok(decode_log_bytes(&data))
}

fn open_store(matches: &ArgMatches, config: &Config) -> Option<IncidentStore> {
    if matches.get_flag("no-memory") || !config.memory.enabled {
        return None;
    }
    let store = match matches.get_one::<String>("memory-path") {
        Some(path) => IncidentStore::new(PathBuf::from(path)),
        None => IncidentStore::open_default(config),
    };
    debug!("Incident memory: {}", store.path().display());
    Some(store)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so JSON output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let matches = build_cli().get_matches();

    let output_name = matches
        .get_one::<String>("output")
        .map(String::as_str)
        .unwrap_or("console");
    let Some(format) = OutputFormat::from_str(output_name) else {
        error!("Unknown output format: {}", output_name);
        anyhow::bail!("Unknown output format '{}', expected console or json", output_name);
    };

    let log_text = read_input(&matches).await?;
    if log_text.trim().is_empty() {
        error!("No log data provided. Use --file or pipe data to stdin.");
        anyhow::bail!("No log data provided");
    }

    if let Some(query) = matches.get_one::<String>("search") {
        let context = matches
            .get_one::<usize>("context")
            .copied()
            .unwrap_or(DEFAULT_CONTEXT_LINES);
        let found = search_log(&log_text, query, context);
        info!("Search for {:?} matched {} lines", query, found.len());
        print!("{}", render_matches(&found, format)?);
        return Ok(());
    }

    let config = Config::load()?;
    let provider = provider_from_config(
        &config,
        matches.get_one::<String>("provider").map(String::as_str),
        matches.get_one::<String>("api-key").map(String::as_str),
        matches.get_one::<String>("model").map(String::as_str),
    )?;

    let mut pilot = LogPilot::new(provider);
    if let Some(store) = open_store(&matches, &config) {
        pilot = pilot.with_store(store);
    }

    let outcome = pilot.triage(&log_text).await?;
    println!("{}", render_report(&outcome, format)?);
    Ok(())
}
