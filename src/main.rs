use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;

use hiwar_cli::{
    display_banner, print_help, read_question, render_error, render_turn, validate_query,
    ChatSession,
};
use hiwar_core::LanguageModel;
use hiwar_openai::OpenAiClient;
use hiwar_rag::{index_dialogue_csv, LocalVectorStore, VectorStore};
use hiwar_watsonx::WatsonxClient;

#[derive(Parser)]
#[command(name = "hiwar")]
#[command(about = "HiwarBot, a retrieval-augmented chatbot for questions about Islam", long_about = None)]
struct Cli {
    /// Directory holding the persisted vector index
    #[arg(long, env = "HIWAR_INDEX_DIR", default_value = "vectorstore", global = true)]
    index_dir: PathBuf,

    /// Language model backend
    #[arg(long, value_enum, env = "HIWAR_BACKEND", default_value = "openai", global = true)]
    backend: Backend,

    /// Ask a single question and exit
    #[arg(short, long)]
    question: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Backend {
    Openai,
    Watsonx,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the vector index from a dialogue CSV
    Index {
        /// Path to the dialogue CSV file
        #[arg(long)]
        data: PathBuf,

        /// Column holding the combined dialogue text
        #[arg(long, default_value = "Combined")]
        column: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Commands::Index { data, column }) = cli.command {
        return build_index(&cli.index_dir, &data, &column);
    }

    let mut llm = build_backend(cli.backend)?;
    llm.connect().await?;

    let store = Arc::new(LocalVectorStore::open(&cli.index_dir)?);
    let passage_count = store.count().await?;

    let mut session = ChatSession::new(llm, store);

    // One-shot mode
    if let Some(question) = cli.question {
        validate_query(&question)?;
        let (_, assistant) = session.ask(&question).await?;
        println!("{}", assistant.content);
        return Ok(());
    }

    // Interactive mode
    display_banner();
    println!(
        "{} {} passages indexed • backend: {} • session {}",
        "📖".green(),
        passage_count,
        session_backend_name(cli.backend),
        session.id().to_string().dimmed()
    );
    println!();

    let mut input_history = Vec::new();

    loop {
        let input = read_question(&mut input_history).await?;

        if input.is_empty() {
            continue;
        }

        let input_lower = input.to_lowercase();

        if input_lower == "exit" || input_lower == "quit" {
            println!("{}", "👋 Goodbye!".green());
            break;
        }

        if input_lower == "help" {
            print_help();
            continue;
        }

        if let Err(e) = validate_query(&input) {
            println!("{} {}", "⚠️".yellow(), e.to_string().yellow());
            continue;
        }

        println!("{} Thinking...", "🤖".blue());

        match session.ask(&input).await {
            Ok((user_turn, assistant_turn)) => {
                render_turn(&user_turn);
                render_turn(&assistant_turn);
            }
            Err(e) => render_error(&e),
        }
    }

    Ok(())
}

fn build_backend(backend: Backend) -> Result<Box<dyn LanguageModel>> {
    match backend {
        Backend::Openai => Ok(Box::new(OpenAiClient::from_env()?)),
        Backend::Watsonx => Ok(Box::new(WatsonxClient::from_env()?)),
    }
}

fn session_backend_name(backend: Backend) -> &'static str {
    match backend {
        Backend::Openai => "openai",
        Backend::Watsonx => "watsonx",
    }
}

fn build_index(index_dir: &PathBuf, data: &PathBuf, column: &str) -> Result<()> {
    println!("{} Indexing {}...", "📄".blue(), data.display());

    let mut store = LocalVectorStore::create(index_dir);
    let report = index_dialogue_csv(&mut store, data, column)?;
    store.save()?;

    println!(
        "{} Indexed {} passages ({} blank rows skipped) into {}",
        "✅".green(),
        report.indexed,
        report.skipped,
        index_dir.display()
    );
    Ok(())
}
