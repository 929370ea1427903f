use anyhow::Result;
use clap::Parser;
use f1tenth::{run, Args};
use log::info;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    info!("Arguments: {:?}", args);
    run(&args)
}
