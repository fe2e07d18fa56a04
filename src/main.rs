use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use burn_record::io::write_lines;
use burn_record::{
    merge_sections, normalize, process_batch, read_merged_input, read_section_dir,
    write_merged_document, write_record_json, AnthropicConfig, DomainModels, ExtractorSet,
    Instructions, MergedPatientDocument, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "burn-record")]
#[command(author, version, about = "Burn unit clinical note extraction pipeline", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a single converted section file
    Normalize {
        /// Raw section file (markdown)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge per-section files into one document per patient
    Merge {
        /// Directory of converter output files (e.g. 2301E.md)
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for merged <patient-id>.md files
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Extract canonical records from merged documents
    Extract {
        /// Merged document, or a directory of them
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for <patient-id>.json records
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        extraction: ExtractionArgs,
    },

    /// Merge then extract in one run
    Run {
        /// Directory of converter output files
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for <patient-id>.json records
        #[arg(short, long)]
        output: PathBuf,

        /// Also write merged documents here
        #[arg(long)]
        merged_dir: Option<PathBuf>,

        #[command(flatten)]
        extraction: ExtractionArgs,
    },
}

#[derive(Args)]
struct ExtractionArgs {
    /// Directory with the extraction instructions and glossary
    #[arg(long, default_value = "instructions")]
    instructions: PathBuf,

    /// Maximum patients processed at once
    #[arg(long, default_value = "4")]
    concurrency: usize,

    /// Timeout for one oracle call, in seconds
    #[arg(long, default_value = "120")]
    timeout_secs: u64,

    /// Model for all domains (overrides ANTHROPIC_MODEL)
    #[arg(long)]
    model: Option<String>,

    /// Model for the demographic extractor
    #[arg(long)]
    patient_model: Option<String>,

    /// Model for the burn injury extractor
    #[arg(long)]
    burn_model: Option<String>,

    /// Model for the medical history extractor
    #[arg(long)]
    history_model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match cli.command {
        Commands::Normalize { input, output } => normalize_file(&input, output.as_deref()),
        Commands::Merge { input, output } => {
            let documents = merge_dir(&input)?;
            write_merged(&output, &documents)
        }
        Commands::Extract {
            input,
            output,
            extraction,
        } => {
            let documents = read_merged_input(&input)?;
            extract_documents(documents, &output, &extraction).await
        }
        Commands::Run {
            input,
            output,
            merged_dir,
            extraction,
        } => {
            let documents = merge_dir(&input)?;
            if let Some(dir) = merged_dir {
                write_merged(&dir, &documents)?;
            }
            extract_documents(documents, &output, &extraction).await
        }
    }
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn normalize_file(input: &Path, output: Option<&Path>) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read file: {:?}", input))?;
    let result = normalize(&text);

    info!(
        "Kept {} lines ({} boilerplate, {} duplicates removed)",
        result.lines.len(),
        result.boilerplate_removed,
        result.duplicates_removed
    );

    match output {
        Some(path) => write_lines(path, &result.lines),
        None => {
            println!("{}", result.text());
            Ok(())
        }
    }
}

fn merge_dir(input: &Path) -> Result<Vec<MergedPatientDocument>> {
    info!("Stage 0/1: normalizing and merging {:?}", input);
    let files = read_section_dir(input)?;
    Ok(merge_sections(files).documents)
}

fn write_merged(dir: &Path, documents: &[MergedPatientDocument]) -> Result<()> {
    for document in documents {
        let path = write_merged_document(dir, document)?;
        info!("Patient {}: merged document written to {:?}", document.patient_id, path);
    }
    Ok(())
}

async fn extract_documents(
    documents: Vec<MergedPatientDocument>,
    output: &Path,
    args: &ExtractionArgs,
) -> Result<()> {
    let instructions = Instructions::load(&args.instructions)
        .context("Failed to load extraction instructions")?;

    let mut api = AnthropicConfig::from_env()?;
    if let Some(model) = &args.model {
        api.model = model.clone();
    }
    let models = DomainModels {
        demographic: args.patient_model.clone().unwrap_or_else(|| api.model.clone()),
        injury: args.burn_model.clone().unwrap_or_else(|| api.model.clone()),
        history: args.history_model.clone().unwrap_or_else(|| api.model.clone()),
    };

    let config = PipelineConfig {
        concurrency: args.concurrency,
        oracle_timeout: Duration::from_secs(args.timeout_secs),
        ..Default::default()
    };

    let extractors = ExtractorSet::anthropic(&api, &models, &instructions, &config)?;

    info!("Stage 2/3: extracting and assembling {} patients", documents.len());
    let batch = process_batch(&extractors, documents, &config).await;

    for record in &batch.records {
        let path = write_record_json(output, record)?;
        info!("Patient {}: record written to {:?}", record.id, path);
    }

    if !batch.failures.is_empty() {
        warn!(
            "No record produced for patients {:?}",
            batch.failed_patient_ids()
        );
    }

    info!(
        "Complete: {} records written, {} patients failed",
        batch.records.len(),
        batch.failures.len()
    );

    Ok(())
}
