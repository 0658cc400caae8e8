mod logging;
mod transcript;

use std::io::{self, Write};
use std::path::PathBuf;

use chat_core::{Config, ConfigStatus, Role};
use clap::{Parser, Subcommand};
use colored::Colorize;
use chat_state::ExchangeState;
use openai_client::{CompletionGateway, HttpTransport};

use transcript::{Entry, EntryKind, Speaker, Transcript};

#[derive(Parser)]
#[command(name = "chat-cli")]
#[command(about = "Chat with an OpenAI-compatible completion endpoint")]
#[command(version)]
struct Cli {
    /// Config file read before environment overrides
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable debug logging
    #[arg(long, short, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive chat (default)
    Chat,
    /// Send a single message and print the reply
    Send {
        /// Message content
        message: String,
    },
    /// Show whether the endpoint is configured
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.debug);

    let config = Config::from_sources(&cli.config, |key| std::env::var(key).ok());
    log::debug!("Loaded config: {:?}", config);

    let status = config.status();
    let command = cli.command.unwrap_or(Commands::Chat);
    if let Commands::Status = command {
        print_status(&config, &status);
        return Ok(());
    }
    if !status.is_ready() {
        println!("{}", transcript::config_required_message(&status).yellow());
        return Ok(());
    }

    let gateway = CompletionGateway::from_config(&config)?;

    match command {
        Commands::Send { message } => send_once(&gateway, &message).await,
        Commands::Chat | Commands::Status => run_interactive_chat(&gateway).await,
    }
}

fn print_status(config: &Config, status: &ConfigStatus) {
    match status {
        ConfigStatus::Ready(credentials) => {
            println!("{}", "✅ Configured".green());
            println!("{}", format!("Endpoint: {}", credentials.endpoint()).dimmed());
            println!("{}", format!("Model: {}", config.model()).dimmed());
            println!(
                "{}",
                format!("Timeout: {:?}", config.request_timeout()).dimmed()
            );
        }
        other => println!("{}", transcript::config_required_message(other).yellow()),
    }
}

async fn send_once(gateway: &CompletionGateway<HttpTransport>, message: &str) -> anyhow::Result<()> {
    let reply = gateway.send(message).await?;
    println!("{}", reply);
    Ok(())
}

async fn run_interactive_chat(gateway: &CompletionGateway<HttpTransport>) -> anyhow::Result<()> {
    let mut transcript = Transcript::new();

    println!("{}", "🤖 Chat".cyan().bold());
    println!("{}", format!("Model: {}", gateway.model()).dimmed());
    println!(
        "{}",
        "Commands: /clear to reset the chat, /history to show what is sent, exit to leave".dimmed()
    );
    println!();
    println!("{}", "Welcome! Type a message to start chatting.".cyan());
    println!();

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            println!();
            break;
        }
        let input = input.trim_end_matches(['\r', '\n']);
        let command = input.trim();

        if command.eq_ignore_ascii_case("exit") || command.eq_ignore_ascii_case("quit") {
            println!("{}", "👋 Goodbye!".cyan());
            break;
        }
        if command.is_empty() {
            continue;
        }
        if command == "/clear" {
            match gateway.clear_history().await {
                Ok(()) => {
                    let cleared = transcript.entries().len();
                    transcript.clear();
                    println!("{}", format!("🧹 Chat cleared ({} messages)", cleared).dimmed());
                }
                Err(err) => println!("{}", err.user_message().yellow()),
            }
            continue;
        }
        if command == "/history" {
            print_history(gateway).await;
            continue;
        }

        transcript.push_user(input);
        println!("{}", "…".dimmed());

        match gateway.send(input).await {
            Ok(reply) => print_entry(transcript.push_reply(&reply)),
            Err(err) if err.is_rejected_locally() => {
                println!("{}", err.user_message().yellow());
            }
            Err(err) => {
                log::debug!("Exchange failed: {:?}", err);
                print_entry(transcript.push_error(&err.user_message()));
            }
        }
        println!();
    }

    Ok(())
}

fn print_entry(entry: &Entry) {
    let line = entry.render();
    match (entry.speaker, &entry.kind) {
        (Speaker::User, _) => println!("{}", line.cyan()),
        (Speaker::Assistant, EntryKind::Message) => println!("{}", line.green()),
        (Speaker::Assistant, EntryKind::Error) => println!("{}", format!("❌ {}", line).red()),
    }
}

async fn print_history(gateway: &CompletionGateway<HttpTransport>) {
    if let ExchangeState::Failed { error_message, failed_at } = gateway.exchange_state() {
        println!(
            "{}",
            format!("Last exchange failed at {}: {}", failed_at, error_message).dimmed()
        );
    }

    let history = gateway.history().await;
    if history.is_empty() {
        println!("{}", "(history is empty)".dimmed());
        return;
    }

    println!(
        "{}",
        format!("{} turns (system instruction is added to every request)", history.len()).dimmed()
    );
    for turn in history {
        let line = format!("  {:>9}: {}", turn.role().as_str(), turn.content());
        match turn.role() {
            Role::User => println!("{}", line.cyan()),
            Role::Assistant => println!("{}", line.green()),
            Role::System => println!("{}", line.dimmed()),
        }
    }
}
