//! # formstep - Application Wizard Server
//!
//! The main binary for the formstep multi-step application wizard.
//!
//! This application provides:
//! - HTTP JSON API server (axum-based)
//! - CLI interface, including a terminal rendition of the wizard
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                apps/formstep (THE BINARY)               │
//! │                                                         │
//! │   ┌─────────────┐   ┌─────────────┐   ┌─────────────┐   │
//! │   │    CLI      │   │  HTTP API   │   │   Config    │   │
//! │   │   (clap)    │   │   (axum)    │   │   (toml)    │   │
//! │   └──────┬──────┘   └──────┬──────┘   └──────┬──────┘   │
//! │          └─────────────────┼─────────────────┘          │
//! │                            ▼                            │
//! │                    ┌───────────────┐                    │
//! │                    │ formstep-core │                    │
//! │                    │  (THE LOGIC)  │                    │
//! │                    └───────────────┘                    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! formstep server --host 0.0.0.0 --port 8080
//!
//! # Fill in an application from the terminal
//! formstep apply --user-id 7 --user-name jdoe
//!
//! # List saved applications
//! formstep list --json-mode
//! ```

use clap::Parser;
use formstep::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // FORMSTEP_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("FORMSTEP_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "formstep=info,formstep_core=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌─┐┬─┐┌┬┐┌─┐┌┬┐┌─┐┌─┐
  ├┤ │ │├┬┘│││└─┐ │ ├┤ ├─┘
  └  └─┘┴└─┴ ┴└─┘ ┴ └─┘┴

  Application Wizard v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
