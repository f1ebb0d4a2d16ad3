use std::path::PathBuf;

use anyhow::Context;
use burrow::world::WorldGenConfig;
use burrow::{GameConfig, HeadlessRunner, InputScript};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// World seed (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate (default: host.max_ticks)
    #[arg(long)]
    ticks: Option<u64>,

    /// RON config file (default: burrow.ron if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input script with "<tick>:<command>" entries (default: start and dig)
    #[arg(long)]
    script: Option<PathBuf>,

    /// World generation preset in RON, replaces the worldgen section
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Print the effective world generation preset and exit
    #[arg(long)]
    dump_preset: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = GameConfig::load_from(args.config.as_deref())?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(path) = &args.preset {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read preset {:?}", path))?;
        config.worldgen = WorldGenConfig::from_ron(&source)?;
        config.validate()?;
        log::info!("Loaded world preset '{}'", config.worldgen.name);
    }

    if args.dump_preset {
        println!("{}", config.worldgen.to_ron()?);
        return Ok(());
    }

    let script = match &args.script {
        Some(path) => InputScript::from_file(path)?,
        None => InputScript::start_only(),
    };
    let ticks = args.ticks.unwrap_or(config.host.max_ticks);

    log::info!("Starting Burrow (seed {}, {} ticks)", config.seed, ticks);
    let mut runner = HeadlessRunner::new(&config, script)?;
    let summary = runner.run(ticks);
    println!("{}", summary);
    Ok(())
}
