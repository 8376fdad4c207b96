use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use price_matrix::cleanup::remove_expired;
use price_matrix::config::{generate_job_id, Settings, DEFAULT_MAX_AGE_SECS, DEFAULT_OUTPUT_DIR};
use price_matrix::Extractor;

#[derive(Parser)]
#[command(about = "Extract price and color matrices from styled xlsx catalog workbooks.")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract Price and Type tables from one workbook and print a JSON summary.
    Extract {
        /// Workbook to process (.xlsx).
        #[arg(long, value_name = "PATH")]
        input: PathBuf,

        /// Job id used in output file names. Generated when omitted.
        #[arg(long)]
        job_id: Option<String>,

        /// Directory receiving `Price_<job>.xlsx` and `Type_<job>.xlsx`.
        #[arg(long, value_name = "DIR", env = "PRICE_MATRIX_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,

        /// Client-side file name; its stem becomes the series name.
        #[arg(long)]
        original_filename: Option<String>,
    },

    /// Delete files older than the retention window.
    Cleanup {
        /// Directory to sweep (repeatable). Defaults to the output directory.
        #[arg(long = "dir", value_name = "DIR")]
        dirs: Vec<PathBuf>,

        /// Files older than this many seconds are removed.
        #[arg(long, env = "PRICE_MATRIX_MAX_AGE_SECS", default_value_t = DEFAULT_MAX_AGE_SECS)]
        max_age_secs: u64,

        /// Output directory swept when no `--dir` is given.
        #[arg(long, value_name = "DIR", env = "PRICE_MATRIX_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
        output_dir: PathBuf,
    },
}

impl Command {
    fn settings(&self) -> Settings {
        match self {
            Command::Extract { output_dir, .. } => Settings {
                output_dir: output_dir.clone(),
                cleanup_dirs: vec![output_dir.clone()],
                ..Settings::default()
            },
            Command::Cleanup { dirs, max_age_secs, output_dir } => Settings {
                output_dir: output_dir.clone(),
                cleanup_dirs: if dirs.is_empty() { vec![output_dir.clone()] } else { dirs.clone() },
                max_age: Duration::from_secs(*max_age_secs),
            },
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args = Args::parse();
    let settings = args.command.settings();
    match args.command {
        Command::Extract { input, job_id, original_filename, .. } => {
            settings.ensure_directories()?;
            let job_id = job_id.unwrap_or_else(generate_job_id);
            let summary = Extractor::new(&job_id)
                .process_file(&input, &settings.output_dir, original_filename.as_deref())
                .with_context(|| format!("Processing failed for '{}'", input.display()))?;

            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer(&mut stdout, &summary).context("Failed to write summary")?;
            writeln!(stdout)?;
        }
        Command::Cleanup { .. } => {
            let removed = remove_expired(&settings.cleanup_dirs, settings.max_age);
            info!("Removed {} expired files", removed);
            let mut stdout = std::io::stdout().lock();
            serde_json::to_writer(&mut stdout, &serde_json::json!({ "removed": removed }))
                .context("Failed to write summary")?;
            writeln!(stdout)?;
        }
    }
    Ok(())
}
