//! stackcraft - command-line front end for the item stack core

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use stackcraft::commands::{self, GridFile, Workspace};
use stackcraft::config::{StackcraftConfig, DEFAULT_CONFIG_PATH};
use stackcraft_core::Stack;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect, damage, split and craft item stacks", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Write the JSON result here instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a stack document and describe it
    Inspect {
        /// Stack document (JSON)
        stack: PathBuf,
    },
    /// Damage a stack, honouring Unbreaking
    Damage {
        /// Stack document (JSON)
        stack: PathBuf,
        /// Damage points to apply
        #[arg(long, default_value_t = 1)]
        amount: i32,
        /// Seed for the Unbreaking roll (defaults to the configured seed)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Split items off a stack
    Split {
        /// Stack document (JSON)
        stack: PathBuf,
        /// Number of items to take
        #[arg(long)]
        count: i32,
    },
    /// Craft once from a grid file
    Craft {
        /// Grid file: `{"width": N, "cells": [document | null, ...]}`
        grid: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = StackcraftConfig::load_from_path(&args.config);

    // RUST_LOG wins over the configured filter
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&config.log_filter))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Starting stackcraft v{}", env!("CARGO_PKG_VERSION"));

    let workspace = Workspace::load(&config)?;
    match args.command {
        Command::Inspect { stack } => {
            let stack = decode(&stack, &workspace)?;
            emit(&commands::inspect(&stack, &workspace.blocks), args.output.as_deref())
        }
        Command::Damage {
            stack,
            amount,
            seed,
        } => {
            let mut stack = decode(&stack, &workspace)?;
            let report = commands::damage(&mut stack, amount, seed.unwrap_or(workspace.seed));
            emit(&report, args.output.as_deref())
        }
        Command::Split { stack, count } => {
            let mut stack = decode(&stack, &workspace)?;
            emit(&commands::split(&mut stack, count), args.output.as_deref())
        }
        Command::Craft { grid } => {
            let mut grid = GridFile::read(&grid)?.decode(&workspace.items)?;
            let report = commands::craft(&workspace.recipes, &mut grid)?;
            emit(&report, args.output.as_deref())
        }
    }
}

fn decode(path: &Path, workspace: &Workspace) -> Result<Stack> {
    let document = commands::read_document(path)?;
    Ok(Stack::decode(&document, &workspace.items))
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")?;
            info!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
