use crate::palette::Palette;
use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "kaleidoscope", version, about = "Living kaleidoscope in your terminal")]
pub struct Config {
    /// Starting palette. Defaults to the last one used.
    #[arg(long, value_enum)]
    pub palette: Option<Palette>,

    /// Starting fold count (3..=12). Defaults to the last one used.
    #[arg(long)]
    pub symmetry: Option<u32>,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    #[arg(long, value_enum, default_value_t = Quality::Balanced)]
    pub quality: Quality,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub adaptive_quality: bool,

    /// Fix the random seed for a reproducible session.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub hud: bool,

    /// Prefs file location (defaults to the XDG config dir).
    #[arg(long)]
    pub prefs: Option<String>,

    /// Directory for PNG snapshots taken with `e`.
    #[arg(long, default_value = ".")]
    pub snapshot_dir: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Quality {
    Ultra,
    High,
    Balanced,
    Fast,
}

impl Quality {
    pub fn lower(self) -> Self {
        match self {
            Self::Ultra => Self::High,
            Self::High => Self::Balanced,
            Self::Balanced => Self::Fast,
            Self::Fast => Self::Fast,
        }
    }

    pub fn higher(self) -> Self {
        match self {
            Self::Fast => Self::Balanced,
            Self::Balanced => Self::High,
            Self::High => Self::Ultra,
            Self::Ultra => Self::Ultra,
        }
    }

    pub fn rank(self) -> u8 {
        match self {
            Self::Fast => 0,
            Self::Balanced => 1,
            Self::High => 2,
            Self::Ultra => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ultra => "ultra",
            Self::High => "high",
            Self::Balanced => "balanced",
            Self::Fast => "fast",
        }
    }
}
