mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use cms_core::GalleryOptions;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn print_json(value: &Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,cms_core=debug"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Get { path, params } => {
            let config = commands::load_config(config_path)?;
            print_json(&commands::get(config, &path, params.as_deref())?)?;
        }
        Commands::Media { field, all } => {
            let assets_base = commands::load_assets_base(config_path)?;
            print_json(&commands::media(&assets_base, &field, all)?)?;
        }
        Commands::Gallery {
            entry,
            cover_key,
            gallery_key,
            limit,
        } => {
            let assets_base = commands::load_assets_base(config_path)?;
            let options = GalleryOptions::new(&cover_key, &gallery_key).with_limit(limit);
            print_json(&commands::gallery(&assets_base, &entry, &options)?)?;
        }
        Commands::Subscribe {
            email,
            source,
            no_consent,
        } => {
            let config = commands::load_config(config_path)?;
            let outcome = commands::subscribe(config, &email, source, !no_consent);
            print_json(&outcome.to_json())?;
            if !outcome.is_ok() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
