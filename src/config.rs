use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "ferroviz",
    version,
    about = "Audio-reactive ferrofluid blob, software-rendered in the terminal"
)]
pub struct Config {
    /// Icosphere subdivision level (faces = 20·4^s).
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u32).range(0..=5))]
    pub subdivision: u32,

    /// Noise seed; the same seed reproduces the same motion.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Starting visual mode: 0 = Tube, 1 = Tape, 2 = Solid.
    #[arg(long, default_value_t = 0)]
    pub mode: usize,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Substring match against input device names.
    #[arg(long)]
    pub device: Option<String>,

    #[arg(long, default_value_t = false)]
    pub list_devices: bool,

    /// Run without audio input (blob idles on pure noise).
    #[arg(long, default_value_t = false)]
    pub no_audio: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,
}
