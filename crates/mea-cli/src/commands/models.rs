use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Args;
use mea_moments::models::{builtin_config, BUILTIN_MODELS};

#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Directory receiving one YAML template per built-in model.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ModelsArgs) -> Result<(), Box<dyn Error>> {
    fs::create_dir_all(&args.out)?;
    for name in BUILTIN_MODELS {
        let config = builtin_config(name).ok_or_else(|| format!("missing built-in model {name}"))?;
        let yaml = serde_yaml::to_string(&config)?;
        let path = args.out.join(format!("{name}.yaml"));
        fs::write(&path, yaml)?;
        println!("{}", path.display());
    }
    Ok(())
}
