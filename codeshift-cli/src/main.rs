//! codeshift command-line entry point
//!
//! Offline commands (`analyze`, `suggest`, `document`, `report`) only run the
//! structural analyzer. The others drive the transformation reasoner against
//! the configured text-generation backend.

mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codeshift_core::analyzer::refactoring_suggestions;
use codeshift_core::{AnalysisRecord, StructuralAnalyzer};
use codeshift_llm::BackendKind;
use codeshift_transform::{
    Agent, CodeshiftConfig, TaskPriority, TaskStatus, TransformationKind, TransformationResult,
};
use codeshift_utils::logging::{basic_config, init_logging, LogLevel};
use render::OutputFormat;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "codeshift")]
#[command(about = "codeshift - natural-language driven Python code transformation")]
#[command(version)]
struct Cli {
    /// Configuration file (.toml, .json, .yaml)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Text-generation backend (ollama, gemini)
    #[arg(short = 'b', long, global = true)]
    backend: Option<BackendKind>,

    /// Model to use for generation
    #[arg(short = 'm', long, global = true)]
    model: Option<String>,

    /// Ollama server URL
    #[arg(long, global = true)]
    server_url: Option<String>,

    /// Enable debug logging
    #[arg(short = 'd', long, global = true)]
    debug: bool,

    /// Skip the external type checker
    #[arg(long, global = true)]
    no_type_check: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the structure and quality of a Python file
    Analyze {
        file: PathBuf,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Also write the rendered analysis to this file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// List refactoring suggestions for a Python file
    Suggest { file: PathBuf },

    /// Transform a file according to a natural-language intent
    Transform {
        file: PathBuf,

        /// What should change, in plain words
        intent: String,

        #[arg(short = 'k', long, value_enum, default_value_t = TransformationKind::Refactor)]
        kind: TransformationKind,

        /// Write the transformed code here when the transformation succeeds
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Refactor a file with a predefined intent
    Refactor {
        file: PathBuf,

        #[arg(short = 'a', long, value_enum, default_value_t = Aspect::General)]
        aspect: Aspect,

        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Write markdown documentation for a file (<stem>_docs.md)
    Document {
        file: PathBuf,

        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Generate test cases for a file (<stem>_test.py)
    Test {
        file: PathBuf,

        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Write a markdown analysis report (<stem>_report.md)
    Report {
        file: PathBuf,

        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Transform several files through the task agent's worker pool
    Batch {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        #[arg(short = 'i', long)]
        intent: String,

        #[arg(short = 'k', long, value_enum, default_value_t = TransformationKind::Refactor)]
        kind: TransformationKind,

        /// Concurrent tasks (defaults to the configured worker count)
        #[arg(short = 'w', long)]
        workers: Option<usize>,

        /// Directory receiving transformed files of successful tasks
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Aspect {
    General,
    Performance,
    Async,
    Pythonic,
    Testing,
}

impl Aspect {
    fn intent(self) -> &'static str {
        match self {
            Aspect::General => "Refactor this code for better readability and maintainability",
            Aspect::Performance => "Optimize this code for performance",
            Aspect::Async => "Refactor this code to use async/await",
            Aspect::Pythonic => "Make this code more Pythonic",
            Aspect::Testing => "Refactor this code to be more testable",
        }
    }
}

const TEST_INTENT: &str = "Create comprehensive test cases for this code";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_settings(&cli)?;

    if cli.config.is_some() {
        init_logging(&config.logging)?;
    } else {
        let level = if cli.debug { LogLevel::Debug } else { LogLevel::Info };
        basic_config(Some(level))?;
    }

    match cli.command {
        Commands::Analyze { file, format, output } => {
            let record = analyze_file(&config, &file).await?;
            let rendered = render::analysis(&record, format)?;
            println!("{rendered}");
            if !record.success {
                bail!("Analysis failed for {}", file.display());
            }
            if let Some(path) = output {
                write_file(&path, &rendered)?;
                println!("\n✓ Analysis saved to {}", path.display());
            }
        }

        Commands::Suggest { file } => {
            let record = analyze_successfully(&config, &file).await?;
            let suggestions = refactoring_suggestions(&record);
            if suggestions.is_empty() {
                println!("✓ No refactoring suggestions for {}", file.display());
            } else {
                println!("🎯 Refactoring suggestions for {}:", file.display());
                for (i, suggestion) in suggestions.iter().enumerate() {
                    println!("  {}. {}", i + 1, suggestion);
                }
            }
        }

        Commands::Transform {
            file,
            intent,
            kind,
            output,
            format,
        } => {
            let result = transform_file(&config, &file, &intent, kind).await?;
            println!("{}", render::transformation(&result, format)?);
            finish_transformation(&result, output.as_deref())?;
        }

        Commands::Refactor { file, aspect, output } => {
            let result = transform_file(&config, &file, aspect.intent(), TransformationKind::Refactor).await?;
            println!("{}", render::transformation_text(&result));
            finish_transformation(&result, output.as_deref())?;
        }

        Commands::Document { file, output } => {
            let record = analyze_successfully(&config, &file).await?;
            let title = format!("Documentation for {}", file_name(&file));
            let doc = render::documentation_markdown(&record, &title, &render::timestamp());
            let path = output.unwrap_or_else(|| derived_path(&file, "_docs.md"));
            write_file(&path, &doc)?;
            println!("✓ Documentation saved to {}", path.display());
        }

        Commands::Test { file, output } => {
            println!("🧪 Generating tests for {}...", file.display());
            let result = transform_file(&config, &file, TEST_INTENT, TransformationKind::Test).await?;
            match result.transformed_code.as_deref() {
                Some(code) if result.success => {
                    let path = output.unwrap_or_else(|| derived_path(&file, "_test.py"));
                    write_file(&path, code)?;
                    println!("✓ Tests generated and saved to {}", path.display());
                }
                _ => {
                    println!("{}", render::transformation_text(&result));
                    bail!("Test generation failed");
                }
            }
        }

        Commands::Report { file, output } => {
            let record = analyze_successfully(&config, &file).await?;
            let report = render::report_markdown(&record, &render::timestamp());
            let path = output.unwrap_or_else(|| derived_path(&file, "_report.md"));
            write_file(&path, &report)?;
            println!("✓ Report saved to {}", path.display());
            println!("\n{}", render::report_summary(&record));
        }

        Commands::Batch {
            files,
            intent,
            kind,
            workers,
            output_dir,
        } => run_batch(&config, &files, &intent, kind, workers, output_dir.as_deref()).await?,
    }

    Ok(())
}

/// Configuration file (or defaults) with the command-line overrides applied
fn load_settings(cli: &Cli) -> Result<CodeshiftConfig> {
    let mut config = match &cli.config {
        Some(path) => CodeshiftConfig::load(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => CodeshiftConfig::default(),
    };

    if let Some(kind) = cli.backend {
        config.backend.kind = kind;
    }
    if let Some(model) = &cli.model {
        config.backend.model = Some(model.clone());
    }
    if let Some(url) = &cli.server_url {
        config.backend.server_url = url.clone();
    }
    if cli.no_type_check {
        config.analyzer.type_check = false;
    }
    if cli.debug {
        config.logging.level = LogLevel::Debug;
    }
    Ok(config)
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

/// `<stem><suffix>` in the current directory
fn derived_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map_or_else(|| "output".to_string(), |stem| stem.to_string_lossy().into_owned());
    PathBuf::from(format!("{stem}{suffix}"))
}

async fn analyze_file(config: &CodeshiftConfig, path: &Path) -> Result<AnalysisRecord> {
    let source = read_source(path)?;
    let analyzer = StructuralAnalyzer::new(config.analyzer.clone());
    info!("Analyzing {}", path.display());
    Ok(analyzer.analyze(&source, &path.display().to_string()).await?)
}

async fn analyze_successfully(config: &CodeshiftConfig, path: &Path) -> Result<AnalysisRecord> {
    let record = analyze_file(config, path).await?;
    if let Some(error) = &record.syntax_error {
        bail!("Analysis failed: {}: {}", record.name, error);
    }
    Ok(record)
}

async fn transform_file(
    config: &CodeshiftConfig,
    path: &Path,
    intent: &str,
    kind: TransformationKind,
) -> Result<TransformationResult> {
    let source = read_source(path)?;
    let reasoner = config.build_reasoner()?;
    info!(
        "Transforming {} ({}) with the {} backend: {}",
        path.display(),
        kind.display_name(),
        reasoner.backend_name(),
        intent
    );
    Ok(reasoner.transform(&source, intent, kind, None).await?)
}

fn finish_transformation(result: &TransformationResult, output: Option<&Path>) -> Result<()> {
    if !result.success {
        bail!(
            "Transformation did not pass validation (confidence {:.0}%)",
            result.confidence * 100.0
        );
    }
    if let (Some(path), Some(code)) = (output, result.transformed_code.as_deref()) {
        write_file(path, code)?;
        println!("\n✓ Saved to {}", path.display());
    }
    Ok(())
}

async fn run_batch(
    config: &CodeshiftConfig,
    files: &[PathBuf],
    intent: &str,
    kind: TransformationKind,
    workers: Option<usize>,
    output_dir: Option<&Path>,
) -> Result<()> {
    let mut agent_config = config.agent.clone();
    if let Some(workers) = workers {
        agent_config.workers = workers;
    }
    let agent = Agent::new(config.build_reasoner()?, agent_config);
    agent.start().await;

    let mut submitted = Vec::with_capacity(files.len());
    for path in files {
        let source = read_source(path)?;
        let id = agent
            .create_task(intent, source, kind, TaskPriority::Normal)
            .await;
        agent.submit(id).await?;
        submitted.push((path, id));
    }
    agent.shutdown().await;

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    for (path, id) in submitted {
        let Some(task) = agent.task(id).await else {
            warn!("Task {} disappeared from the table", id);
            continue;
        };
        match (task.status, task.result) {
            (TaskStatus::Completed, Some(result)) => {
                let mark = if result.success { "✓" } else { "⚠️" };
                println!(
                    "{} {}: confidence {:.0}%, {} validation error(s)",
                    mark,
                    path.display(),
                    result.confidence * 100.0,
                    result.validation_errors.len()
                );
                if let (Some(dir), Some(code), true) =
                    (output_dir, result.transformed_code.as_deref(), result.success)
                {
                    let target = dir.join(file_name(path));
                    write_file(&target, code)?;
                }
            }
            (status, _) => println!(
                "❌ {}: {} - {}",
                path.display(),
                status.as_str(),
                task.error.as_deref().unwrap_or("no result")
            ),
        }
    }

    let status = agent.status().await;
    println!(
        "\n📋 {} task(s): {} completed, {} failed",
        status.total, status.completed, status.failed
    );
    if status.failed > 0 {
        bail!("{} task(s) failed", status.failed);
    }
    Ok(())
}
