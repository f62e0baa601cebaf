//! chatbot：终端聊天前端
//!
//! Usage:
//!   chatbot [--config <path>] [--model <name>]
//!
//! Type a message and press enter. `/clear` starts a new conversation,
//! `/quit` exits.

use anyhow::{Context, Result};
use gemini_chat::conversation::TracingListener;
use gemini_chat::{ChatSessionBuilder, Config, ConversationListener, Role, StoreEvent};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    model: Option<String>,
    help: bool,
}

fn parse_args(args: &[String]) -> std::result::Result<Options, String> {
    let mut opts = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().ok_or("--config requires a path")?;
                opts.config = Some(PathBuf::from(path));
            }
            "--model" | "-m" => {
                let model = iter.next().ok_or("--model requires a name")?;
                opts.model = Some(model.clone());
            }
            "--help" | "-h" => opts.help = true,
            other => return Err(format!("Unknown argument: {other}")),
        }
    }
    Ok(opts)
}

fn print_usage() {
    println!(
        r#"chatbot: chat with Gemini from the terminal

USAGE:
    chatbot [--config <path>] [--model <name>]

COMMANDS (inside the chat):
    /clear      Start a new conversation
    /quit       Exit

ENVIRONMENT:
    GEMINI_API_KEY              API key (required to chat)
    GEMINI_MODEL                Model name (default gemini-1.5-flash)
    CHAT_REQUEST_TIMEOUT_SECS   Bound on each request (default 30)
    RUST_LOG                    Log filter (default warn)"#
    );
}

/// Prints model-side messages as they land in the store.
struct TerminalRenderer;

impl ConversationListener for TerminalRenderer {
    fn on_event(&self, event: &StoreEvent) {
        match event {
            // The user's own line is already on screen.
            StoreEvent::Appended { message, .. } if message.role == Role::User => {}
            StoreEvent::Appended { message, .. } if message.is_placeholder() => {
                println!("model> {}", message.text);
            }
            StoreEvent::Appended { message, .. } => {
                println!("model> {}\n", message.text);
            }
            StoreEvent::RemovedLast { .. } => {}
            StoreEvent::Cleared => println!("(new conversation)\n"),
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn prompt() -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "you> ")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let opts = match parse_args(&args) {
        Ok(opts) => opts,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!();
            print_usage();
            std::process::exit(2);
        }
    };
    if opts.help {
        print_usage();
        return Ok(());
    }

    let mut config =
        Config::load(opts.config.as_deref()).context("failed to load configuration")?;
    if let Some(model) = opts.model {
        config.model = model;
    }
    if config.usable_api_key().is_none() {
        eprintln!("warning: GEMINI_API_KEY is not set; messages will not be sent");
    }

    let session = ChatSessionBuilder::from_config(&config)
        .context("failed to create chat client")?
        .listener(Arc::new(TerminalRenderer))
        .listener(Arc::new(TracingListener))
        .build()?;

    println!("Chatting with {} (/clear, /quit)\n", config.model);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let text = line.trim();
        match text {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                session.clear_history().await;
                continue;
            }
            _ => {}
        }
        session.submit(text).wait().await;
    }

    session.close();
    Ok(())
}
