//! Haggle console driver
//!
//! Runs one negotiation in the terminal: counterpart lines and deadlines go
//! to stdout, bids are read from stdin, logs go to stderr.

use haggle::{Action, IdentityProvider, NegotiationConfig, Negotiator, StaticIdentity};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "haggle=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Configuration
    let config = NegotiationConfig::from_env();
    tracing::info!(
        starting_price = config.starting_price,
        winning_threshold = config.winning_threshold,
        bid_timeout_ms = u64::try_from(config.bid_timeout.as_millis()).unwrap_or(u64::MAX),
        "Starting negotiation"
    );

    let identity = StaticIdentity::default();
    let participant = identity.current_participant().await;

    let negotiator = Negotiator::new(config);
    let mut actions = negotiator.subscribe();
    let session = negotiator.create_session();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            action = actions.recv() => match action {
                Ok(action) => {
                    render(&action);
                    if action.is_end() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Dropped negotiation updates");
                }
                Err(RecvError::Closed) => break,
            },
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!(session_id = %session.id, "Input closed, leaving negotiation");
                    break;
                };
                let bid = line.trim();
                if bid.is_empty() {
                    continue;
                }
                if let Err(e) = negotiator.submit_bid(session.id, participant.clone(), bid) {
                    eprintln!("{e}");
                }
            }
        }
    }

    if let Some(closed) = negotiator
        .active_session()
        .filter(haggle::Session::is_concluded)
    {
        println!("Deal closed at €{}", closed.price);
    }

    Ok(())
}

fn render(action: &Action) {
    match action {
        Action::Message(message) => println!("[{}] {}", message.sender.name, message.text),
        Action::AwaitInput { timeout } => {
            println!("(your bid, before {} UTC)", timeout.format("%H:%M:%S"));
        }
        Action::End { .. } => println!("(negotiation over)"),
    }
}
