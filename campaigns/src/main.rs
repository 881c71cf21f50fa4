// campaigns/src/main.rs
//
// Campaigns — summarize appliance attack events into per-destination
// attack windows.
//
// Usage:
//   campaigns                                    # newest .csv in ./input
//   campaigns export.csv --gap-min 10 --split-by-port
//   campaigns --format jsonl events.jsonl --out-jsonl campaigns.jsonl --top 10
//   campaigns export.csv --out-xlsx Attack_Campaigns.xlsx
//
// Exit codes: 1 read/write failure, 2 missing required columns,
//             4 no input files found.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use campaigns::config::{EngineConfig, NormalizeConfig, DEFAULT_GAP_MINUTES, DEFAULT_TIME_FORMAT};
use campaigns::engine::CampaignEngine;
use campaigns::normalize::Normalizer;
use campaigns::report::{self, writer::{ReportWriter, DEFAULT_CSV_NAME}};
use campaigns::source::{self, Encoding, InputFormat, ReadOptions};

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name    = "campaigns",
    about   = "Summarize appliance attacks grouped by destination IP and time windows (optional port split)",
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    #[arg(help = "Export file. Omit to use the newest file in --input-dir")]
    input: Option<PathBuf>,

    #[arg(long, default_value = "input",
          help = "Directory searched for the export (created if missing)")]
    input_dir: PathBuf,

    #[arg(long, help = "Report directory (default: next to the input file)")]
    output_dir: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_CSV_NAME, help = "Output CSV filename")]
    out_csv: String,

    #[arg(long, help = "Also write a JSONL report with this filename")]
    out_jsonl: Option<String>,

    #[arg(long, help = "Also write an Excel report with this filename")]
    out_xlsx: Option<String>,

    #[arg(long, default_value_t = DEFAULT_GAP_MINUTES,
          help = "Max gap in minutes to merge events into the same attack window")]
    gap_min: u32,

    #[arg(long, default_value = DEFAULT_TIME_FORMAT,
          help = "strftime format for Start/End Time; empty string infers")]
    time_format: String,

    #[arg(long, help = "Add destination port to the grouping key")]
    split_by_port: bool,

    #[arg(long, value_enum, help = "Force input encoding (default: UTF-8, then Latin-1)")]
    encoding: Option<Encoding>,

    #[arg(long, help = "Skip malformed input lines instead of failing")]
    skip_bad_lines: bool,

    #[arg(long, value_enum, default_value = "csv")]
    format: InputFormat,

    #[arg(long, default_value_t = 0, help = "Print the N largest campaigns as markdown")]
    top: usize,
}

// ── Run ───────────────────────────────────────────────────────────────────────

fn output_dir_for(cli: &Cli, input: &Path) -> PathBuf {
    if let Some(dir) = &cli.output_dir {
        return dir.clone();
    }
    match input.parent() {
        Some(p) if !p.as_os_str().is_empty() && p != Path::new(".") => p.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let start = Instant::now();

    let input = source::resolve_input(cli.input.as_deref(), &cli.input_dir, cli.format).await?;
    let table = source::read_table(&input, ReadOptions {
        format:         cli.format,
        encoding:       cli.encoding,
        skip_bad_lines: cli.skip_bad_lines,
    })
    .await?;

    let (events, _) = Normalizer::new(NormalizeConfig::with_time_format(&cli.time_format))
        .normalize(&table)?;

    let engine = CampaignEngine::new(EngineConfig::new(cli.gap_min, cli.split_by_port));
    let run = tokio::task::spawn_blocking(move || engine.run(&events))
        .await
        .context("campaign engine task failed")?;

    let writer = ReportWriter::new(output_dir_for(&cli, &input), cli.split_by_port).await?;
    let csv_path = writer.write_csv(&cli.out_csv, &run.summaries).await?;
    println!("[OK] Wrote CSV: {} (rows={})", csv_path.display(), run.summaries.len());

    if let Some(name) = &cli.out_jsonl {
        let path = writer.write_jsonl(name, &run.summaries).await?;
        println!("[OK] Wrote JSONL: {}", path.display());
    }

    if let Some(name) = &cli.out_xlsx {
        let path = writer.write_xlsx(name, &run.summaries).await?;
        println!("[OK] Wrote Excel: {}", path.display());
    }

    if cli.top > 0 {
        println!("\n{}", report::render_markdown(&run, cli.top));
    }

    info!("Done in {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<campaigns::error::Error>()
        .map(|e| e.exit_code())
        .unwrap_or(1)
}

// ── Main ──────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("campaigns=info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            ExitCode::from(exit_code_for(&e))
        }
    }
}
