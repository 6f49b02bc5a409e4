use clap::Parser;
use querylens::{load_config, process_path, DetectorConfig, OutputFormat, ProcessOptions, QueryLensError};
use std::path::Path;
use std::process;

#[derive(Parser)]
#[command(name = "querylens")]
#[command(about = "Find database-client queries in TypeScript/JavaScript scripts", long_about = None, version)]
struct Cli {
    /// File or directory to analyze
    #[arg(value_name = "PATH")]
    path: String,

    /// JSON output instead of plain text
    #[arg(long)]
    json: bool,

    /// JSON config file (clientClass, runKey, payload)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Constructor name of the tracked client (overrides the config file)
    #[arg(long, value_name = "NAME")]
    client_class: Option<String>,

    /// Only show the query containing this byte offset
    #[arg(long, value_name = "OFFSET")]
    at: Option<usize>,

    /// Only show queries whose label (e.g. user.findMany) matches this regex
    #[arg(long, value_name = "REGEX")]
    filter: Option<String>,

    /// Directory recursion depth (default: unlimited)
    #[arg(long)]
    depth: Option<usize>,

    /// Only scan files with these extensions
    #[arg(long, value_delimiter = ',')]
    ext: Vec<String>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<String, QueryLensError> {
    let mut config = match &cli.config {
        Some(path) => load_config(Path::new(path))?,
        None => DetectorConfig::default(),
    };
    if let Some(client_class) = cli.client_class {
        config = config.with_client_class(client_class);
    }

    let options = ProcessOptions {
        config,
        format: if cli.json { OutputFormat::Json } else { OutputFormat::Plain },
        depth: cli.depth,
        ext: cli.ext,
        at: cli.at,
        filter: cli.filter,
    };
    process_path(&cli.path, &options)
}

/// Logs go to stderr, filtered by RUST_LOG (off by default).
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
        )
        .with_writer(std::io::stderr)
        .init();
}
