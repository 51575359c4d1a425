use crate::fixture::PageFixture;
use crate::replay::Replay;
use anyhow::{Error, anyhow};
use log::{error, info};
use std::env;
use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process;
use tokio::runtime::Runtime;
use tracker::TrackerConfig;

mod fixture;
mod replay;

pub fn main() {
    env_logger::init();

    if let Err(err) = run() {
        error!("ERROR: {err:?}");
        process::exit(1);
    }
}

fn run() -> Result<(), Error> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: gaze <fixture.json>"))?;
    let fixture = PageFixture::load(&path)?;
    let runtime = Runtime::new()?;
    let mut replay = Replay::new(fixture, TrackerConfig::from_env())?;
    info!("replaying {} with {:?}", path.display(), replay.page().config());
    runtime.block_on(replay.run())?;
    info!("host received {} protocol lines", replay.received().len());

    let snapshot = replay.snapshot();
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &snapshot)?;
    writeln!(out)?;
    Ok(())
}
