use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use mea_moments::{models, serde_io, MomentSystem};
use tracing::info;

use crate::{load_model, load_opts, write_json};

#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// Model description in YAML or JSON.
    #[arg(long, required_unless_present = "builtin", conflicts_with = "builtin")]
    pub model: Option<PathBuf>,
    /// Name of a built-in model to derive instead of a file.
    #[arg(long)]
    pub builtin: Option<String>,
    /// Highest moment order to derive.
    #[arg(long, default_value_t = 2)]
    pub max_order: u32,
    /// Optional YAML file with derivation options.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output directory for the derived system.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &DeriveArgs) -> Result<(), Box<dyn Error>> {
    let network = match (&args.model, &args.builtin) {
        (_, Some(name)) => models::builtin(name).map_err(|err| Box::new(err) as Box<dyn Error>)?,
        (Some(path), None) => load_model(path)?
            .to_network()
            .map_err(|err| Box::new(err) as Box<dyn Error>)?,
        (None, None) => return Err("either --model or --builtin is required".into()),
    };
    let opts = load_opts(args.config.as_deref())?;

    let system = MomentSystem::build(&network, args.max_order, &opts)
        .map_err(|err| Box::new(err) as Box<dyn Error>)?;

    fs::create_dir_all(&args.out)?;
    let system_json =
        serde_io::system_to_json(&system).map_err(|err| Box::new(err) as Box<dyn Error>)?;
    fs::write(args.out.join("moment_system.json"), system_json)?;

    let equations: Vec<String> = system
        .descriptors
        .iter()
        .zip(system.right_hand_sides())
        .map(|(descriptor, rhs)| format!("d{}/dt = {}", descriptor.symbol(), rhs))
        .collect();
    let summary = serde_json::json!({
        "model": args
            .model
            .as_ref()
            .map(|path| path.display().to_string())
            .or_else(|| args.builtin.clone()),
        "max_order": args.max_order,
        "species": system.report.species_count,
        "reactions": system.report.reaction_count,
        "raw_moments": system.report.raw_moments,
        "central_moments": system.report.central_moments,
        "total_terms": system.report.total_terms,
        "system_hash": system.report.system_hash,
        "equations": equations,
    });
    write_json(args.out.join("summary.json"), &summary)?;
    info!(out = %args.out.display(), "wrote moment system");

    Ok(())
}
