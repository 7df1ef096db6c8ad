use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use folder_combiner_core::{combine_with_callback, split_blocks, CombineOptions, ProgressEvent};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "folder-combiner",
    version,
    about = "Combine every text file under a folder into one annotated output.txt."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Walk a folder and write <FOLDER>/output.txt.
    Combine(CombineArgs),
    /// List the blocks of an existing output document.
    Blocks(BlocksArgs),
}

#[derive(Debug, Args)]
struct CombineArgs {
    /// Folder to combine.
    #[arg(value_name = "FOLDER")]
    root: PathBuf,

    /// Log every added file at info level.
    #[arg(long)]
    progress: bool,

    /// Optional JSON summary output file.
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct BlocksArgs {
    /// Output document to inspect.
    #[arg(value_name = "FILE")]
    document: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Combine(args) => run_combine_command(args),
        Commands::Blocks(args) => run_blocks_command(args),
    }
}

fn run_combine_command(args: CombineArgs) -> Result<()> {
    let CombineArgs {
        root,
        progress,
        summary,
    } = args;

    println!("Scanning folder: {}", root.display());
    let options = CombineOptions { root, progress };
    let result = combine_with_callback(&options, |event| {
        if !matches!(event, ProgressEvent::Completed { .. }) {
            println!("{}", event.log_line());
        }
    })
    .with_context(|| format!("failed to combine {}", options.root.display()))?;

    println!();
    println!("All files combined into: {}", result.output_path.display());
    println!(
        "Added {} file(s), skipped {}, {} in {} ms.",
        result.added_files,
        result.skipped_files,
        human_bytes(result.bytes_written),
        result.elapsed_ms
    );

    if let Some(path) = summary {
        let payload =
            serde_json::to_string_pretty(&result).context("failed to serialize summary")?;
        fs::write(&path, payload)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("Summary JSON written to {}", path.display());
    }

    Ok(())
}

fn run_blocks_command(args: BlocksArgs) -> Result<()> {
    let document = fs::read_to_string(&args.document)
        .with_context(|| format!("failed to read {}", args.document.display()))?;
    let blocks = split_blocks(&document);

    if blocks.is_empty() {
        println!("No blocks found in {}", args.document.display());
        return Ok(());
    }

    println!(
        "{} block(s) in {}:",
        blocks.len(),
        args.document.display()
    );
    for block in &blocks {
        println!(
            "- {} ({})",
            block.path,
            human_bytes(block.content.len() as u64)
        );
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn human_bytes(value: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if value == 0 {
        return "0 B".to_string();
    }
    let mut size = value as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.1} {}", UNITS[unit])
}
