//! Frontdesk application binary - composition root.
//!
//! Ties together all Frontdesk crates into a single executable:
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Build the flow manager over the default action registry
//! 3. Run one simulated call: stdin utterances in, responses out
//!
//! Each line read from stdin is one caller turn. The call ends on EOF or a
//! hang-up word, after which the executed-action summary is printed and the
//! manager is torn down.

mod cli;

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::Parser;

use frontdesk_core::{CallMetadata, FrontdeskConfig};
use frontdesk_flow::{FlowManager, FlowServices};

use cli::CliArgs;

const FALLBACK_RESPONSE: &str =
    "I'm sorry, I'm having trouble right now. Please try again in a moment.";

/// Words that end the simulated call.
fn is_hangup(utterance: &str) -> bool {
    matches!(
        utterance.to_lowercase().as_str(),
        "quit" | "exit" | "bye" | "goodbye" | "hang up"
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = FrontdeskConfig::load_or_default(&config_file);

    // Tracing goes to stderr so stdout stays a clean response sink.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Frontdesk v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Flow manager over the default action registry.
    let services = FlowServices::new(Arc::new(config));
    let metadata = CallMetadata::new(args.caller_name.clone(), args.caller_number.clone());
    let mut manager = FlowManager::new(services, metadata);

    tracing::info!(call_id = %manager.context().metadata.call_id, "Call started");

    // One simulated call: stdin utterance source, stdout response sink.
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut lines = stdin.lock().lines();

    loop {
        print!("caller> ");
        stdout.flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if is_hangup(utterance) {
            break;
        }

        let response = match manager.process_message(utterance, None).await {
            Some(result) => {
                if let Some(error) = result.error {
                    tracing::warn!(flow = %result.flow, error = %error, "Turn finished with an error");
                }
                result
                    .response
                    .unwrap_or_else(|| FALLBACK_RESPONSE.to_string())
            }
            None => FALLBACK_RESPONSE.to_string(),
        };
        println!("frontdesk> {}", response);
    }

    // End-of-call summary.
    let executed = manager.services().executor.executed();
    println!();
    println!("Call ended after {} turn(s).", manager.turns());
    if executed.is_empty() {
        println!("No actions were executed.");
    } else {
        println!("Executed actions:");
        for entry in &executed {
            let status = if entry.outcome.success { "ok" } else { "failed" };
            println!(
                "  [{}] {} - {}",
                status, entry.directive.action_type, entry.outcome.message
            );
        }
    }

    manager.clear_flows();
    tracing::info!("Call torn down");

    Ok(())
}
