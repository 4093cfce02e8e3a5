use std::path::{Path, PathBuf};

use clap::Parser;
use graphmaid::{Error, GraphLevel};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "graphmaid", about = "Convert a JSON graph description to a Mermaid flowchart")]
struct Cli {
    /// Input JSON file
    input: PathBuf,

    /// Output file path (default: stdout)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Graph detail level
    #[arg(long, short = 'l', value_enum, default_value_t = GraphLevel::High)]
    level: GraphLevel,

    /// Only validate input, don't convert
    #[arg(long, short = 'v')]
    validate: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_input(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn write_output(path: &Path, text: &str) -> Result<(), Error> {
    std::fs::write(path, text).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {err}");
    std::process::exit(1);
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if !cli.input.exists() {
        fail(format_args!("Input file not found: {}", cli.input.display()));
    }
    let input = read_input(&cli.input).unwrap_or_else(|e| fail(e));
    let graph = graphmaid::parse_graph(&input).unwrap_or_else(|e| fail(e));

    let issues = graphmaid::validate(&graph);
    if !issues.is_empty() {
        eprintln!("Validation issues:");
        for issue in &issues {
            eprintln!("  - {issue}");
        }
        if cli.validate {
            std::process::exit(1);
        }
    }

    if cli.validate {
        eprintln!("Validation passed!");
        return;
    }

    tracing::info!(level = %cli.level, "converting graph");
    let mermaid = graphmaid::render(&graph, cli.level).unwrap_or_else(|e| fail(e));

    match cli.output {
        Some(path) => {
            write_output(&path, &mermaid).unwrap_or_else(|e| fail(e));
            eprintln!("Mermaid diagram written to: {}", path.display());
        }
        None => println!("{mermaid}"),
    }
}
