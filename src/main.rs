//! PII Redaction Tool - Command-line interface
//!
//! Redacts personally identifiable information from PDF documents and
//! optionally scores the result against a ground-truth entity list.

use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use clap::{Arg, ArgAction, Command};
use tracing::{error, info};

use pii_redactor::config::{RedactionConfig, VerifierConfig};
use pii_redactor::detector::verifier::OpenAiVerifier;
use pii_redactor::evaluation;
use pii_redactor::pdf::PdfFile;
use pii_redactor::redactor::Redactor;

const OUTPUT_DIR: &str = "output";

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    init_logging(matches.get_flag("verbose"));

    let input_path = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => match RedactionConfig::from_file(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                error!("❌ Failed to load config file: {}", e);
                process::exit(1);
            }
        },
        None => RedactionConfig::default(),
    };

    if let Some(model) = matches.get_one::<String>("model") {
        config.verifier.model = model.clone();
    }

    // The API key comes from the environment, never from config files
    let verifier_config = match VerifierConfig::from_env() {
        Ok(env_config) => VerifierConfig {
            api_key: env_config.api_key,
            ..config.verifier.clone()
        },
        Err(e) => {
            error!("❌ {}", e);
            error!("   Set OPENAI_API_KEY before running");
            process::exit(1);
        }
    };

    let verifier = match OpenAiVerifier::new(verifier_config) {
        Ok(verifier) => verifier,
        Err(e) => {
            error!("❌ Failed to initialize verifier: {}", e);
            process::exit(1);
        }
    };

    let output_path = match matches.get_one::<String>("output") {
        Some(path) => PathBuf::from(path),
        None => generate_output_path(&input_path),
    };
    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("❌ Failed to create output directory: {}", e);
                process::exit(1);
            }
        }
    }

    info!("🚀 Starting PII redaction on {}", input_path.display());
    let start = Instant::now();

    let redactor = Redactor::new(config, Box::new(verifier));
    let summary = match redactor.redact_file(&input_path, &output_path).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("❌ Redaction failed: {}", e);
            process::exit(1);
        }
    };

    info!(
        "✅ Redaction completed in {:.2?} ({} entities, {} failed pages)",
        start.elapsed(),
        summary.entities.len(),
        summary.failed_pages()
    );
    match &summary.output {
        Some(path) => info!("📄 Redacted file: {}", path.display()),
        None => info!("📄 No PII found; no output file produced"),
    }

    // Evaluation runs post-hoc and never retracts a successful
    // redaction; its failures only affect the evaluation step.
    if matches.get_flag("evaluate") {
        let Some(ground_truth_path) = matches.get_one::<String>("ground-truth") else {
            error!("❌ --ground-truth is required when using --evaluate");
            process::exit(1);
        };
        let redacted_path = summary.output.as_deref().unwrap_or(&input_path);
        if let Err(e) = run_evaluation(&input_path, redacted_path, Path::new(ground_truth_path)) {
            error!("❌ Evaluation failed: {}", e);
            process::exit(1);
        }
    }
}

fn build_cli() -> Command {
    Command::new("pii-redactor")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Redacts personally identifiable information from PDF documents")
        .arg(
            Arg::new("input")
                .value_name("FILE")
                .help("Input PDF file path")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path for the redacted PDF (default: output/<name>_redacted.pdf)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (JSON/YAML)"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("MODEL")
                .help("Verification model identifier"),
        )
        .arg(
            Arg::new("evaluate")
                .short('e')
                .long("evaluate")
                .action(ArgAction::SetTrue)
                .help("Evaluate redaction against ground truth"),
        )
        .arg(
            Arg::new("ground-truth")
                .short('g')
                .long("ground-truth")
                .value_name("FILE")
                .help("Ground truth JSON file")
                .requires("evaluate"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let level = if verbose { "debug" } else { "info" };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(format!("pii_redactor={level}")))
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("failed to set tracing subscriber");
}

/// Default output path; numeric suffixes keep existing files intact
fn generate_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "document".to_string());

    let base = PathBuf::from(OUTPUT_DIR);
    let mut candidate = base.join(format!("{stem}_redacted.pdf"));
    let mut counter = 1;
    while candidate.exists() {
        candidate = base.join(format!("{stem}_redacted_{counter}.pdf"));
        counter += 1;
    }
    candidate
}

fn run_evaluation(
    original: &Path,
    redacted: &Path,
    ground_truth_path: &Path,
) -> pii_redactor::Result<()> {
    info!("📊 Running evaluation against ground truth...");

    let ground_truth = evaluation::load_ground_truth(ground_truth_path)?;
    let original_text = PdfFile::open(original)?.full_text();
    let redacted_text = PdfFile::open(redacted)?.full_text();

    let result = evaluation::evaluate(&original_text, &ground_truth, &redacted_text);
    println!("{}", evaluation::render_report(&result));

    info!("📈 Evaluation complete");
    Ok(())
}
