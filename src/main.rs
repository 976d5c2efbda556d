use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cfg = ferroviz::config::Config::parse();
    if cfg.list_devices {
        ferroviz::audio::list_input_devices()?;
        return Ok(());
    }

    ferroviz::app::run(cfg)
}
