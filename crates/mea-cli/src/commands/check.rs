use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use mea_moments::{Counter, DeriveOpts};

use crate::load_model;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Model description in YAML or JSON.
    #[arg(long)]
    pub model: PathBuf,
    /// Moment order the model would be derived at.
    #[arg(long, default_value_t = 2)]
    pub max_order: u32,
}

pub fn run(args: &CheckArgs) -> Result<(), Box<dyn Error>> {
    let config = load_model(&args.model)?;
    let network = config
        .to_network()
        .map_err(|err| Box::new(err) as Box<dyn Error>)?;
    let guard = DeriveOpts::default().max_order_guard;
    if args.max_order == 0 || args.max_order > guard {
        return Err(format!("max order must lie in 1..={guard}").into());
    }

    let raw = Counter::raw(network.species(), args.max_order);
    let central = Counter::central(network.species_count(), args.max_order);
    let parameters: Vec<String> = network
        .parameters()
        .iter()
        .map(|symbol| symbol.name().to_string())
        .collect();
    let report = serde_json::json!({
        "model": config.name,
        "species": network.species_count(),
        "reactions": network.reaction_count(),
        "parameters": parameters,
        "raw_moments": raw.len(),
        "central_moments": central.len(),
        "equations": network.species_count()
            + central.iter().filter(|moment| moment.order() >= 2).count(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
