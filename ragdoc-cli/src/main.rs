//! Command-line launcher: one-shot ingestion/status/ask commands plus an
//! interactive question-and-answer session.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;

use ragdoc::{RagConfig, RagService};

#[derive(Parser)]
#[command(name = "ragdoc", version, about = "Question answering over a local PDF/DOCX corpus")]
struct Cli {
    /// Directory scanned for PDF/DOCX documents.
    #[arg(long, global = true)]
    docs_dir: Option<PathBuf>,

    /// Directory holding the persistent vector index.
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Minimum similarity a chunk must meet to be used as context.
    #[arg(long, global = true)]
    threshold: Option<f32>,

    /// Base URL of the Ollama endpoint.
    #[arg(long, global = true)]
    ollama_url: Option<String>,

    /// Language model used for answers.
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest new documents into the index.
    Setup,
    /// Show index status.
    Status,
    /// Ask a single question.
    Ask {
        /// The question to answer.
        question: String,
    },
    /// Interactive question-and-answer session.
    Chat,
}

fn build_config(cli: &Cli) -> ragdoc::Result<RagConfig> {
    let mut builder = RagConfig::builder();
    if let Some(dir) = &cli.docs_dir {
        builder = builder.docs_dir(dir.clone());
    }
    if let Some(dir) = &cli.index_dir {
        builder = builder.index_dir(dir.clone());
    }
    if let Some(threshold) = cli.threshold {
        builder = builder.similarity_threshold(threshold);
    }
    if let Some(url) = &cli.ollama_url {
        builder = builder.ollama_url(url.clone());
    }
    if let Some(model) = &cli.model {
        builder = builder.llm_model(model.clone());
    }
    builder.build()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let service = RagService::from_config(config)?;

    match cli.command {
        Command::Setup => {
            let report = service.ingest().await?;
            println!("{}", report.message());
            if !report.success() {
                std::process::exit(1);
            }
        }
        Command::Status => {
            let status = service.check_database().await;
            println!("Status: {}", status.detail);
        }
        Command::Ask { question } => {
            service.initialize().await?;
            ask_question(&service, &question).await;
        }
        Command::Chat => {
            service.initialize().await?;
            run_interactive(&service).await?;
        }
    }

    Ok(())
}

/// Ask one question, printing the answer, timing, and sources. A failed
/// query prints a diagnostic; it never terminates the caller.
async fn ask_question(service: &RagService, question: &str) {
    let start = Instant::now();
    match service.ask(question).await {
        Ok(answer) => {
            println!("\nAnswer: {}", answer.text);
            println!("\n({:.1}s)", start.elapsed().as_secs_f32());
            if !answer.sources.is_empty() {
                println!("\nSources:");
                for (i, source) in answer.sources.iter().enumerate() {
                    println!("  {}. {source}", i + 1);
                }
            }
        }
        Err(e) => println!("Error: {e}"),
    }
}

async fn run_interactive(service: &RagService) -> anyhow::Result<()> {
    println!("---------------------");
    println!("Document QA ready!");
    println!("Type 'quit' to exit");
    println!("---------------------");

    let mut editor = rustyline::DefaultEditor::new()?;
    loop {
        match editor.readline("\nQuestion: ") {
            Ok(line) => {
                let question = line.trim();
                if question.eq_ignore_ascii_case("quit") {
                    break;
                }
                if question.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(question);
                ask_question(service, question).await;
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
