// ABOUTME: Server binary for the recipe planner HTTP API
// ABOUTME: Loads configuration, opens the stores, and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

#![recursion_limit = "256"]

//! # Recipe Planner Server Binary
//!
//! Starts the recipe planner API with the snapshot storage selected by
//! `DATABASE_URL` and inference enabled when `GEMINI_API_KEY` is set.

use anyhow::Result;
use clap::Parser;
use recipe_planner::{
    config::{DatabaseUrl, ServerConfig},
    context::ServerContext,
    logging, server,
};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "recipe-planner-server")]
#[command(about = "Recipe Planner - recipe collection, meal planning and AI-assisted recipes")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override the storage location (`sqlite:<path>` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url.as_deref() {
        config.database = DatabaseUrl::parse_url(database_url)?;
    }
    config.validate()?;

    info!("Starting Recipe Planner server");
    info!("{}", config.summary());

    let context = ServerContext::bootstrap(config).await?;
    info!(
        ready = context.data().is_ready(),
        inference = context.inference().is_enabled(),
        "Stores loaded"
    );

    if let Err(e) = server::run(context).await {
        error!("Server error: {e:#}");
        return Err(e);
    }

    Ok(())
}
