use std::error::Error;
use std::fs;
use std::path::Path;

use clap::{Parser, Subcommand};
use commands::{
    check::{self, CheckArgs},
    derive::{self, DeriveArgs},
    models::{self, ModelsArgs},
};
use mea_moments::{serde_io, DeriveOpts, ModelConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "mea", about = "Moment expansion equation generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Derive the mean and central-moment equations of a model.
    Derive(DeriveArgs),
    /// Write the built-in models as YAML templates.
    Models(ModelsArgs),
    /// Validate a model and report counter sizes without deriving.
    Check(CheckArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Derive(args) => derive::run(&args),
        Command::Models(args) => models::run(&args),
        Command::Check(args) => check::run(&args),
    }
}

/// Loads a model description; `.json` files are read as JSON, anything else as YAML.
fn load_model(path: &Path) -> Result<ModelConfig, Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        serde_io::model_from_json(&text).map_err(|err| Box::new(err) as Box<dyn Error>)
    } else {
        Ok(serde_yaml::from_str(&text)?)
    }
}

fn load_opts(path: Option<&Path>) -> Result<DeriveOpts, Box<dyn Error>> {
    match path {
        Some(path) => {
            let opts: DeriveOpts = serde_yaml::from_str(&fs::read_to_string(path)?)?;
            Ok(opts.sanitised())
        }
        None => Ok(DeriveOpts::default()),
    }
}

fn write_json<P: AsRef<Path>, T: serde::Serialize>(
    path: P,
    value: &T,
) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.as_ref().parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}
