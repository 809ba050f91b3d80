use std::fs::{self, File};
use std::io::BufWriter;
use std::process::Command;

use clap::Parser;

use chess_corpus_filter::{
    discover_inputs, open_input, FilterConfig, InputFile, PipelineConfig, PipelineDriver,
};

/// Filter chess engine search logs into .plain training corpora.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input .csv / .csv.zst files (glob pattern), processed most-recent-first
    input: String,

    /// Label inserted into derived output names: <input>.<SUFFIX>.plain
    #[arg(long, default_value = "filtered")]
    suffix: String,

    /// JSON file holding a filter policy (replaces the built-in default)
    #[arg(long)]
    policy: Option<std::path::PathBuf>,

    /// Plies at or below this are rejected as opening phase
    #[arg(long)]
    early_ply_skip: Option<u32>,

    /// Disable run-wide position deduplication
    #[arg(long)]
    no_dedup: bool,

    /// Hard-drop rejected positions instead of retaining them sentinel-scored
    /// for chain continuity
    #[arg(long)]
    no_retain: bool,

    /// Flush the game buffer every N records (0 disables periodic flushing)
    #[arg(long, default_value = "100000")]
    flush_interval: u64,

    /// Reprocess inputs even when a completed output exists
    #[arg(long)]
    force: bool,

    /// External encoder invoked as `<ENCODER> convert <plain> <binpack>` per
    /// file; the intermediate .plain is removed on success
    #[arg(long)]
    encoder: Option<String>,

    /// Suppress the progress spinner
    #[arg(long)]
    quiet: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut filter: FilterConfig = match &args.policy {
        Some(path) => serde_json::from_reader(File::open(path)?)?,
        None => FilterConfig::default(),
    };
    if let Some(plies) = args.early_ply_skip {
        filter = filter.with_early_ply_skip(plies);
    }

    let config = PipelineConfig::default()
        .with_filter(filter)
        .with_dedup(!args.no_dedup)
        .with_retention(!args.no_retain)
        .with_flush_interval(args.flush_interval)
        .with_progress(!args.quiet);

    let inputs = discover_inputs(&args.input, &args.suffix)?;
    if inputs.is_empty() {
        println!("No inputs match {}", args.input);
        return Ok(());
    }

    let mut driver = PipelineDriver::new(config);
    let mut processed = 0usize;

    for input in &inputs {
        if input.is_complete() && !args.force {
            println!(
                "Found completed output for {}, doing nothing",
                input.path.display()
            );
            continue;
        }

        println!("Processing {} ...", input.path.display());
        let reader = open_input(input)?;
        let writer = BufWriter::new(File::create(&input.plain_path)?);
        if let Err(error) = driver.process(reader, writer) {
            eprintln!("failed on {}: {}", input.path.display(), error);
            continue;
        }
        processed += 1;
        println!("{}", driver.stats().report());
        println!("Saved to {}", input.plain_path.display());

        if let Some(encoder) = &args.encoder {
            encode(encoder, input)?;
        }
    }

    println!(
        "Run complete: {} files processed, {} positions kept, {} unique placements",
        processed,
        driver.stats().kept,
        driver.dedup_index().len()
    );
    Ok(())
}

/// Converts a freshly written .plain into a .binpack and drops the
/// intermediate on success.
fn encode(encoder: &str, input: &InputFile) -> Result<(), Box<dyn std::error::Error>> {
    let status = Command::new(encoder)
        .arg("convert")
        .arg(&input.plain_path)
        .arg(&input.binpack_path)
        .status()?;

    if status.success() {
        fs::remove_file(&input.plain_path)?;
        println!("Encoded to {}", input.binpack_path.display());
    } else {
        eprintln!(
            "encoder exited with {}; keeping {}",
            status,
            input.plain_path.display()
        );
    }
    Ok(())
}
