use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use glam::Vec2;
use kaleidoscope::config::Quality;
use kaleidoscope::export::{write_snapshot, MAX_SNAPSHOT_DIM};
use kaleidoscope::palette::Palette;
use kaleidoscope::simulation::{SimulationState, MAX_SYMMETRY, MIN_SYMMETRY};
use log::info;

const DEFAULT_OUTPUT: &str = "kaleidoscope.png";
const DEFAULT_SEED: u64 = 0x4B41_4C45_2026;
const WARMUP_FPS: u32 = 60;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "snapshot",
    version,
    about = "Render a single kaleidoscope frame to PNG without a terminal"
)]
pub(crate) struct Cli {
    #[arg(long, value_name = "PNG", default_value = DEFAULT_OUTPUT)]
    pub(crate) out: PathBuf,

    #[arg(long, default_value_t = 1080)]
    pub(crate) width: usize,

    #[arg(long, default_value_t = 1080)]
    pub(crate) height: usize,

    #[arg(long, value_enum, default_value_t = Palette::Dawn)]
    pub(crate) palette: Palette,

    #[arg(long, default_value_t = 6)]
    pub(crate) symmetry: u32,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub(crate) seed: u64,

    /// Simulated seconds to run before capturing.
    #[arg(long, value_name = "SECONDS", default_value_t = 2.0)]
    pub(crate) warmup: f32,

    /// Taps spread evenly over the warm-up.
    #[arg(long, default_value_t = 0)]
    pub(crate) taps: u32,

    #[arg(long, value_enum, default_value_t = Quality::High)]
    pub(crate) quality: Quality,

    /// Clock for cosmetic effects (twinkle, dust).
    #[arg(long, value_name = "SECONDS", default_value_t = 0.0)]
    pub(crate) wall_time: f32,
}

pub(crate) fn compute_warmup_frames(warmup_s: f32) -> usize {
    (warmup_s.max(0.0) * WARMUP_FPS as f32).round() as usize
}

pub(crate) fn validate_args(args: &Cli) -> Result<()> {
    if !(1..=MAX_SNAPSHOT_DIM).contains(&args.width) {
        bail!("--width must be within 1..={MAX_SNAPSHOT_DIM}");
    }
    if !(1..=MAX_SNAPSHOT_DIM).contains(&args.height) {
        bail!("--height must be within 1..={MAX_SNAPSHOT_DIM}");
    }
    if !(MIN_SYMMETRY..=MAX_SYMMETRY).contains(&args.symmetry) {
        bail!("--symmetry must be within {MIN_SYMMETRY}..={MAX_SYMMETRY}");
    }
    if !args.warmup.is_finite() || args.warmup < 0.0 {
        bail!("--warmup must be >= 0 seconds");
    }
    if !args.wall_time.is_finite() {
        bail!("--wall-time must be finite");
    }
    Ok(())
}

/// Run the simulation for the requested warm-up, tapping at evenly spaced
/// frames along a deterministic spiral.
pub(crate) fn warm_up(args: &Cli) -> SimulationState {
    let mut state = SimulationState::with_seed(args.palette, args.symmetry, args.seed);
    let frames = compute_warmup_frames(args.warmup);
    let dt = 1.0 / WARMUP_FPS as f32;
    let taps = args.taps as usize;
    let size = Vec2::new(args.width as f32, args.height as f32);
    let mut tapped = 0usize;

    for frame in 0..frames {
        while tapped < taps && frame * taps >= tapped * frames {
            let a = tapped as f32 * 2.4;
            let r = 0.15 + 0.3 * (tapped as f32 / taps as f32);
            let normalized = Vec2::splat(0.5) + Vec2::from_angle(a) * r;
            state.add_tap_ripple(normalized * size, normalized);
            tapped += 1;
        }
        state.evolve(dt);
    }
    state
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Cli::parse();
    run(args)
}

fn run(args: Cli) -> Result<()> {
    validate_args(&args)?;
    let state = warm_up(&args);
    write_snapshot(
        &state,
        args.quality,
        args.width,
        args.height,
        args.wall_time,
        &args.out,
    )?;
    info!(
        "wrote {} ({}x{}, palette {})",
        args.out.display(),
        args.width,
        args.height,
        args.palette.label()
    );
    println!("{}", args.out.display());
    Ok(())
}
