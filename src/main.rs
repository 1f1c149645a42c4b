//! bookqa CLI
//!
//! Run with: cargo run -- ask "What is the difference between the Apollonian and Dionysian?"

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bookqa::{BookPipeline, Config};

#[derive(Parser)]
#[command(name = "bookqa", version, about = "Ask questions about your books")]
struct Cli {
    /// Book sources directory (overrides config)
    #[arg(long, global = true)]
    books: Option<PathBuf>,

    /// Index storage directory (overrides config)
    #[arg(long, global = true)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build or refresh the index for every book
    Index {
        /// Delete persisted indexes and rebuild from scratch
        #[arg(long)]
        rebuild: bool,
    },
    /// Ask the multi-book agent; with no question, read questions from stdin
    Ask {
        /// The question to ask
        question: Option<String>,
    },
    /// Query one book directly, without the agent
    Query {
        /// Corpus name (directory or file stem under the books directory)
        #[arg(long)]
        book: String,
        /// The question to ask
        question: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookqa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Credential check happens here, before any file or network I/O.
    let mut config = Config::load()?;
    if let Some(books) = cli.books {
        config.books_dir = books;
    }
    if let Some(storage) = cli.storage {
        config.storage_dir = storage;
    }

    let pipeline = BookPipeline::from_config(config)?;

    match cli.command {
        Command::Index { rebuild } => run_index(&pipeline, rebuild).await?,
        Command::Ask { question } => run_ask(&pipeline, question).await?,
        Command::Query { book, question } => run_query(&pipeline, &book, &question).await?,
    }

    Ok(())
}

async fn run_index(pipeline: &BookPipeline, rebuild: bool) -> anyhow::Result<()> {
    if rebuild {
        for corpus in pipeline.list_corpora()? {
            pipeline.store().invalidate(&corpus)?;
        }
    }
    let built = pipeline.index_library().await?;
    for (corpus, chunks) in &built {
        println!("{corpus}: {chunks} chunks");
    }
    println!("{} corpora ready", built.len());
    Ok(())
}

async fn run_ask(pipeline: &BookPipeline, question: Option<String>) -> anyhow::Result<()> {
    let agent = pipeline.open_library().await?;

    if let Some(question) = question {
        let answer = agent.chat(&question).await?;
        println!("{}", answer.text);
        return Ok(());
    }

    // Interactive loop: one question per line, empty line or EOF to quit.
    let stdin = std::io::stdin();
    loop {
        print!("question> ");
        std::io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let question = line.trim();
        if question.is_empty() {
            break;
        }
        let answer = agent.chat(question).await?;
        println!("{}\n", answer.text);
    }
    Ok(())
}

async fn run_query(pipeline: &BookPipeline, book: &str, question: &str) -> anyhow::Result<()> {
    let engine = pipeline.open_corpus(book).await?;
    let answer = engine.answer(question).await?;
    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!("\nSources:");
        for source in &answer.sources {
            println!(
                "  {} (chunk {}, similarity {:.2})",
                source.source, source.chunk_index, source.similarity
            );
        }
    }
    Ok(())
}
