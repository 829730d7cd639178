use anyhow::Context;
use clap::Parser;
use pmcorrect_lib::{
    read_records, write_clusters, CorrectionConfig, CorrectionSummary, Corrector, KeyCounts,
    LogProgress,
};
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use tracing::info;

#[derive(Parser)]
#[command(name = "pmcorrect")]
#[command(version = pmcorrect_lib::version())]
#[command(
    about = "Point mutation correcting by k-mer clustering",
    long_about = "Merges strings (barcodes, UMIs) differing by a few substitutions into the \
                  cluster of their most frequent variant.\n\n\
                  Input: one record per line, case ignored, optionally followed by a \
                  tab-separated count.\n\
                  Output: REPRESENTATIVE<TAB>TOTAL_COUNT<TAB>{member: count, ...}"
)]
struct Cli {
    /// Input file (default: stdin)
    infile: Option<String>,

    /// Maximum mutation sites
    #[arg(short, long, default_value = "1", allow_negative_numbers = true)]
    max_mutation_sites: i64,

    /// K-mer length for clustering (recommended 3 <= k <= length / (1 + m))
    #[arg(short, long, default_value = "9")]
    kmer: usize,

    /// Sort output by representative
    #[arg(short, long)]
    sort: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Number of threads for candidate search (0 = all available cores)
    #[arg(short = 't', long, default_value = "0")]
    threads: usize,

    /// Report progress every N keys (0 = never)
    #[arg(long, default_value = "10000")]
    progress_interval: usize,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: use RUST_LOG if set, otherwise the level implied by -v
    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    correct_command(cli)
}

/// Correct point mutations in the input records and write the clusters
fn correct_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = CorrectionConfig::new(cli.max_mutation_sites, cli.kmer)?;
    config.sort_output = cli.sort;
    config.num_threads = cli.threads;
    config.progress_interval = cli.progress_interval;
    config.verbose = cli.verbose > 0;
    let corrector = Corrector::new(config)?;

    info!("Reading records from {}...", cli.infile.as_deref().unwrap_or("stdin"));
    let counts = read_input(cli.infile.as_deref())?;
    info!("  Loaded {} distinct keys", counts.len());

    let clusters = corrector.correct_with_progress(&counts, &mut LogProgress)?;
    let summary = CorrectionSummary::from_clusters(&clusters);
    anyhow::ensure!(
        summary.total_count == counts.total(),
        "count conservation violated: {} in, {} out",
        counts.total(),
        summary.total_count
    );

    match cli.output {
        Some(path) => {
            info!("Writing {} clusters to {}...", clusters.len(), path);
            let file = File::create(&path)
                .with_context(|| format!("Failed to create output file: {}", path))?;
            write_clusters(BufWriter::new(file), &clusters, corrector.config().sort_output)
                .with_context(|| format!("Failed to write clusters to {}", path))?;
        }
        None => {
            let stdout = io::stdout();
            write_clusters(stdout.lock(), &clusters, corrector.config().sort_output)
                .context("Failed to write clusters to stdout")?;
        }
    }

    Ok(())
}

/// Read and aggregate records from a file, or from stdin when no path is given
fn read_input(path: Option<&str>) -> anyhow::Result<KeyCounts> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path))?;
            read_records(BufReader::new(file))
                .with_context(|| format!("Failed to read records from {}", path))
        }
        None => read_records(io::stdin().lock()).context("Failed to read records from stdin"),
    }
}
