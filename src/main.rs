// WizCare - well-being chat assistant
// Main entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use wizcare::cli::{render_alert, render_indicator, ChatRepl};
use wizcare::client::ReplyClient;
use wizcare::config::{load_config, load_config_from, Config};
use wizcare::crisis::{message_length, RiskClassifier};
use wizcare::emotion::EmotionAnalyzer;
use wizcare::engine::ChatEngine;
use wizcare::errors::{config_parse_error, connection_refused_error, TurnError};
use wizcare::metrics::Metrics;
use wizcare::server::WellbeingServer;
use wizcare::session::TurnCommit;

#[derive(Parser, Debug)]
#[command(name = "wizcare")]
#[command(about = "Well-being chat assistant with crisis escalation", version)]
struct Args {
    /// Run mode (defaults to chat)
    #[command(subcommand)]
    command: Option<Command>,

    /// Read configuration from this file instead of ~/.wizcare/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the reply backend URL
    #[arg(long = "api-url", global = true)]
    api_url: Option<String>,
}

#[derive(Parser, Debug)]
enum Command {
    /// Interactive chat session
    Chat {
        /// Message to send right after startup
        #[arg(long = "initial-prompt")]
        initial_prompt: Option<String>,
    },
    /// Run the HTTP server
    Serve {
        /// Bind address (default from config: 127.0.0.1:8000)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Classify one message offline and print its local tier
    Classify {
        /// Message text
        text: String,
    },
    /// Score a message against the emotion word lists
    Analyze {
        /// Message text
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match read_config(args.config.as_deref(), args.api_url) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", config_parse_error(&format!("{:#}", e)));
            std::process::exit(1);
        }
    };

    let serving = matches!(args.command, Some(Command::Serve { .. }));
    init_tracing(&config, serving);

    match args.command {
        Some(Command::Serve { bind }) => run_server(config, bind).await,
        Some(Command::Classify { text }) => run_classify(&config, &text),
        Some(Command::Analyze { text }) => run_analyze(&text),
        Some(Command::Chat { initial_prompt }) => run_chat(config, initial_prompt).await,
        None => {
            if !io::stdin().is_terminal() {
                let mut input = String::new();
                io::stdin().read_to_string(&mut input)?;
                if input.trim().is_empty() {
                    return Ok(());
                }
                return run_single_turn(config, input.trim()).await;
            }
            run_chat(config, None).await
        }
    }
}

fn read_config(path: Option<&std::path::Path>, api_url: Option<String>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let mut config = load_config_from(path)?;
            config.apply_overrides(
                std::env::var("WIZCARE_API_URL").ok(),
                std::env::var("WIZCARE_DEBUG").ok(),
            );
            config.validate()?;
            config
        }
        None => load_config()?,
    };

    if let Some(url) = api_url {
        config
            .set_backend_url(url)
            .context("Invalid --api-url")?;
    }
    Ok(config)
}

/// Initialize tracing with an env filter
///
/// RUST_LOG wins when set. Otherwise chat stays quiet (warn) so logs do not
/// interleave with the conversation, and serve logs at info.
fn init_tracing(config: &Config, serving: bool) {
    let default_level = if config.debug_logging {
        "debug"
    } else if serving {
        "info"
    } else {
        "warn"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    // Bridge log crate -> tracing (reqwest, hyper)
    tracing_log::LogTracer::init().ok();
}

fn build_engine(config: &Config) -> Result<ChatEngine> {
    let client = ReplyClient::new(&config.backend)?;
    ChatEngine::from_config(config, Arc::new(client))
}

async fn run_chat(config: Config, initial_prompt: Option<String>) -> Result<()> {
    let engine = build_engine(&config)?;
    ChatRepl::new(engine).run(initial_prompt).await
}

/// Piped input: one turn, reply on stdout, tier on stderr
async fn run_single_turn(config: Config, text: &str) -> Result<()> {
    let engine = build_engine(&config)?;
    let mut session = engine.new_session();

    match engine.run_turn(&mut session, text).await? {
        TurnCommit::Committed(turn) => {
            if let Some(TurnError::TransportFailure { .. }) = turn.error {
                eprintln!("{}", connection_refused_error(&config.backend.url));
            }
            println!("{}", turn.assistant_message.text);
        }
        TurnCommit::Discarded => {}
    }

    let view = engine.alert_view(&session);
    eprintln!("{}", render_indicator(&view));
    if view.alert_active {
        eprintln!("{}", render_alert(&view.helpline));
    }
    Ok(())
}

fn run_classify(config: &Config, text: &str) -> Result<()> {
    let lexicon = Arc::new(config.load_lexicon()?);
    let classifier = RiskClassifier::new(lexicon, config.escalation.length_thresholds());
    let classification = classifier.classify(text);

    let report = serde_json::json!({
        "local_tier": classification.local_tier,
        "level": classification.local_tier.level(),
        "critical_match": classification.critical_match,
        "matched_phrase": classifier.lexicon().first_match(text),
        "length": message_length(text),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_analyze(text: &str) -> Result<()> {
    let report = EmotionAnalyzer::new().analyze(text);
    let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
    println!("{}", json);
    Ok(())
}

async fn run_server(config: Config, bind: Option<String>) -> Result<()> {
    let mut server_config = config.server.clone();
    if let Some(bind) = bind {
        server_config.bind_address = bind;
    }

    let engine = build_engine(&config)?;
    let metrics = Metrics::new()?;

    tracing::info!(
        backend = %config.backend.url,
        max_sessions = server_config.max_sessions,
        "Reply backend configured"
    );

    WellbeingServer::new(engine, metrics, server_config)
        .serve()
        .await
}
