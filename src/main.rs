use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;

use quizforge::config::AppConfig;
use quizforge::core::embedding::OpenAIEmbeddings;
use quizforge::core::index::VectorIndex;
use quizforge::core::llm::{LlmProvider, OpenAIChat};
use quizforge::core::logging;
use quizforge::core::quiz::{
    Difficulty, Quiz, QuizGenerator, QuizSession, SessionConfig,
};
use quizforge::ingestion::{extract_text, ChunkConfig, PdfDocument, TextChunker};

#[derive(Parser)]
#[command(name = "quizforge", about = "Generate quizzes from PDF documents", version)]
struct Cli {
    /// Path to the PDF document
    #[arg(long)]
    pdf: PathBuf,

    /// Chunks of context retrieved per model call (defaults from config)
    #[arg(long)]
    context_chunks: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a batch of question/answer pairs and write them to a file
    Batch {
        /// Number of questions to create (5-20)
        #[arg(long, default_value_t = 5)]
        questions: usize,

        /// Output file (default: outputs/<name>_quiz.txt)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Run an interactive multiple-choice quiz in the terminal
    Interactive {
        /// Question difficulty: easy, medium, or hard
        #[arg(long, default_value = "medium")]
        difficulty: String,

        /// Seed for deterministic retrieval-query selection
        #[arg(long)]
        seed: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    logging::init();
    tracing::info!("{} v{} starting", quizforge::NAME, quizforge::VERSION);

    let cli = Cli::parse();
    let config = AppConfig::load();
    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY is not set")?;

    // Extract, chunk, and index the document once per run
    let document = PdfDocument::open(&cli.pdf)
        .with_context(|| format!("failed to open {}", cli.pdf.display()))?;
    let text = extract_text(&document, None)?;

    let chunk_config = ChunkConfig::new(config.chunking.chunk_size, config.chunking.overlap)?;
    let chunks = TextChunker::with_config(chunk_config).split(&text);
    tracing::info!("document split into {} chunks", chunks.len());

    let embeddings = Arc::new(OpenAIEmbeddings::new(
        &api_key,
        config.openai.embedding_model.clone(),
        config.openai.endpoint.clone(),
    ));
    let index = Arc::new(VectorIndex::build(chunks, embeddings).await?);
    let llm: Arc<dyn LlmProvider> = Arc::new(OpenAIChat::new(
        &api_key,
        config.openai.chat_model.clone(),
        config.openai.endpoint.clone(),
    ));

    match cli.command {
        Command::Batch { questions, out } => {
            let top_k = cli.context_chunks.unwrap_or(config.retrieval.batch_top_k);
            run_batch(index, llm, &cli.pdf, top_k, questions, out).await
        }
        Command::Interactive { difficulty, seed } => {
            let top_k = cli.context_chunks.unwrap_or(config.retrieval.session_top_k);
            let difficulty: Difficulty = difficulty.parse()?;
            run_interactive(index, llm, SessionConfig {
                difficulty,
                top_k,
                seed,
            })
            .await
        }
    }
}

fn format_quiz(quiz: &Quiz) -> String {
    quiz.questions
        .iter()
        .map(|q| {
            format!(
                "Difficulty: {}\nQuestion: {}\nAnswer: {}",
                q.difficulty, q.question, q.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

async fn run_batch(
    index: Arc<VectorIndex>,
    llm: Arc<dyn LlmProvider>,
    pdf: &std::path::Path,
    top_k: usize,
    questions: usize,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let doc_name = pdf
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("document")
        .to_string();

    // The document name doubles as the retrieval query
    let context = index.retrieve_context(&doc_name, top_k).await?;
    let generator = QuizGenerator::new(llm);

    match generator.generate(&context, questions).await {
        Ok(quiz) => {
            let formatted = format_quiz(&quiz);
            println!("{formatted}");

            let out_path =
                out.unwrap_or_else(|| PathBuf::from("outputs").join(format!("{doc_name}_quiz.txt")));
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(&out_path, &formatted)
                .with_context(|| format!("failed to write {}", out_path.display()))?;

            println!();
            println!("{} {}", style("Quiz saved to").green(), out_path.display());
            Ok(())
        }
        Err(e) if e.is_refusal() => {
            eprintln!("{} {e}", style("Generation declined:").red());
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn run_interactive(
    index: Arc<VectorIndex>,
    llm: Arc<dyn LlmProvider>,
    config: SessionConfig,
) -> anyhow::Result<()> {
    let mut session = QuizSession::new(index, llm, config);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    println!(
        "{}",
        style("Interactive quiz: answer with 1-4, Enter to skip, q to quit.").bold()
    );

    loop {
        let question = match session.next_question().await {
            Ok(q) => q.clone(),
            Err(e) if e.is_refusal() => {
                eprintln!("{} {e}", style("Generation declined:").red());
                print!("Press Enter to try again, or q to quit: ");
                io::stdout().flush()?;
                match lines.next() {
                    None => break,
                    Some(line) => {
                        if line?.trim().eq_ignore_ascii_case("q") {
                            break;
                        }
                        continue;
                    }
                }
            }
            Err(e) => return Err(e.into()),
        };

        println!();
        println!("{} {}", style("Question:").bold(), question.question);
        for (i, option) in question.options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        print!("Your answer [1-4, Enter to skip, q to quit]: ");
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let answer = line.trim();
        if answer.eq_ignore_ascii_case("q") {
            break;
        }
        // Anything that is not a valid option number counts as no selection
        let selection = answer.parse::<usize>().ok().and_then(|n| n.checked_sub(1));

        let feedback = session.submit_answer(selection)?;
        println!();
        println!("{}", feedback.render());
        println!("{} {}", style("Current score:").cyan(), session.summary());

        print!("Press Enter for the next question, or q to quit: ");
        io::stdout().flush()?;
        match lines.next() {
            None => break,
            Some(line) => {
                if line?.trim().eq_ignore_ascii_case("q") {
                    break;
                }
            }
        }
    }

    println!();
    println!("{} {}", style("Final score:").bold(), session.summary());
    Ok(())
}
