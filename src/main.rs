use clap::Parser;
use log::info;
use profhmm::cli::{run, Opts};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opts = Opts::parse();
    info!("started_at={}", chrono::Local::now());
    info!("n_threads={}", rayon::current_num_threads());
    info!("opts={:?}", opts);
    run(&opts)?;
    info!("finished_at={}", chrono::Local::now());
    Ok(())
}
