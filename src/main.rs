// Copyright 2025 The Overlay Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// Allow println! in main.rs for CLI user-facing output (validate command)
#![allow(clippy::print_stdout)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

use overlay_server::{load_config_file, save_config_file, OverlayServer, ServerConfig};

#[derive(Parser)]
#[command(name = "overlay-server")]
#[command(about = "Standalone configuration override server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the configuration file
    #[arg(short, long, default_value = "config/server.yaml", global = true)]
    config: PathBuf,

    /// Override the server port
    #[arg(short, long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the server (default if no subcommand specified)
    Run {
        /// Path to the configuration file
        #[arg(short, long, default_value = "config/server.yaml")]
        config: PathBuf,

        /// Override the server port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Validate a configuration file without starting the server
    Validate {
        /// Path to the configuration file to validate
        #[arg(short, long, default_value = "config/server.yaml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run { config, port }) => run_server(config, port).await,
        Some(Commands::Validate { config }) => validate_config(config),
        None => run_server(cli.config, cli.port).await,
    }
}

/// Run the overlay server
async fn run_server(config_path: PathBuf, port_override: Option<u16>) -> Result<()> {
    // Load a .env file next to the config file, if one exists.
    if let Some(config_dir) = config_path.parent() {
        let env_file = config_dir.join(".env");
        if env_file.exists() {
            if let Err(e) = dotenvy::from_path(&env_file) {
                eprintln!("Warning: Failed to load .env file: {e}");
            }
        }
    }

    let created_default = !config_path.exists();
    let config = if created_default {
        // First run: write a default configuration the operator can edit.
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut default_config = ServerConfig::default();
        if let Some(port) = port_override {
            default_config.http.port = port;
        }
        save_config_file(&default_config, &config_path)?;
        default_config
    } else {
        load_config_file(&config_path)?
    };

    init_logging(&config.logging.level);

    if created_default {
        warn!(
            "Config file '{}' not found; created default configuration",
            config_path.display()
        );
    }
    info!("Starting Overlay Server");
    info!("Config file: {}", config_path.display());

    let mut config = config;
    if let Some(port) = port_override {
        info!("Using command line port {port}");
        config.http.port = port;
    }

    OverlayServer::new(config)?.run().await
}

/// Initialize the tracing subscriber, which also captures `log` records.
fn init_logging(configured_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(configured_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Validate a configuration file
fn validate_config(config_path: PathBuf) -> Result<()> {
    println!("Validating configuration: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[ERROR] Configuration file not found: {}",
            config_path.display()
        );
        std::process::exit(1);
    }

    match load_config_file(&config_path) {
        Ok(config) => {
            println!("[OK] Configuration file is valid");
            println!();
            println!("Summary:");
            println!("  Bind address: {}", config.http.bind_address);
            println!("  Port: {}", config.http.port);
            println!("  Log level: {}", config.logging.level);
            println!(
                "  Override persistence: {}",
                if config.storage.persist {
                    config.storage.path.as_str()
                } else {
                    "disabled"
                }
            );
            match &config.alerts {
                Some(alerts) if alerts.enabled => {
                    println!("  Alerts: topic '{}' via {}", alerts.topic, alerts.broker_url);
                }
                _ => println!("  Alerts: disabled"),
            }
            Ok(())
        }
        Err(e) => {
            println!("[ERROR] Configuration is invalid:");
            println!("  {e}");
            std::process::exit(1);
        }
    }
}
