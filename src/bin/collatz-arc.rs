use anyhow::{Context, Result};
use clap::Parser;
use collatz_arc::driver::{
    run, LineKeys, Policy, RecordWriter, Resolver, RunSummary, SampledKeys, Uncached,
};
use collatz_arc::{AdaptiveCache, Collatz};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "collatz-arc")]
#[command(about = "Print Collatz step counts, optionally through an adaptive cache", long_about = None)]
struct Args {
    /// Number of keys to sample (not parsed when FILE is given)
    count: String,

    /// Smallest key to sample, inclusive (not parsed when FILE is given)
    min: String,

    /// Largest key to sample, inclusive (not parsed when FILE is given)
    max: String,

    /// Cache policy: "none" or "arc"
    #[arg(default_value_t = Policy::None)]
    policy: Policy,

    /// Total cache size, split evenly across the four lists
    #[arg(default_value_t = 0)]
    cache_size: usize,

    /// Read keys from this file, one per line, instead of sampling
    file: Option<PathBuf>,

    /// Seed for sampling, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    info!(policy = %args.policy, cache_size = args.cache_size, "starting run");

    let stdout = io::stdout();
    let mut out = RecordWriter::new(BufWriter::new(stdout.lock()));

    match args.policy {
        Policy::Arc => {
            let mut cache = AdaptiveCache::new(args.cache_size);
            let summary = drive(&args, &mut cache, &mut out)?;
            let stats = cache.stats();
            info!(
                records = summary.records,
                hits = stats.hits(),
                misses = stats.misses(),
                ghost_hits = stats.recent_ghost_hits() + stats.frequent_ghost_hits(),
                hit_ratio = stats.hit_ratio(),
                partition = cache.partition(),
                "run finished"
            );
        }
        Policy::None => {
            let summary = drive(&args, &mut Uncached::new(Collatz), &mut out)?;
            info!(records = summary.records, "run finished");
        }
    }

    out.finish().context("failed to flush records")?;
    Ok(())
}

fn drive<R, W>(args: &Args, resolver: &mut R, out: &mut RecordWriter<W>) -> Result<RunSummary>
where
    R: Resolver + ?Sized,
    W: Write,
{
    let summary = match &args.file {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            run(LineKeys::new(BufReader::new(file)), resolver, out)
                .with_context(|| format!("failed to process {}", path.display()))?
        }
        None => {
            let mut keys = SampledKeys::parse(&args.count, &args.min, &args.max)?;
            if let Some(seed) = args.seed {
                keys = keys.with_seed(seed);
            }
            run(keys, resolver, out)?
        }
    };
    Ok(summary)
}
