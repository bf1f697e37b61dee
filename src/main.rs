use std::time::Instant;

use clap::Parser;
use rirmap::{
    app,
    cli::{Args, SettingsLoader},
    error::RirmapError,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), RirmapError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let started = Instant::now();

    let args = Args::parse();
    let settings = SettingsLoader::load(&args)?;

    app::run(&settings).await?;

    log::info!("Finished in {:.2}s", started.elapsed().as_secs_f64());
    Ok(())
}
