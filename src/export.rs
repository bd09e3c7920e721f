//! Still-frame export to PNG.

use crate::canvas::{Canvas, Surface};
use crate::compositor::Compositor;
use crate::config::Quality;
use crate::palette::Palette;
use crate::simulation::SimulationState;
use anyhow::{anyhow, Context};
use image::RgbaImage;
use std::path::{Path, PathBuf};

pub const SNAPSHOT_SIZE: usize = 1080;
/// Largest edge accepted for an offline still.
pub const MAX_SNAPSHOT_DIM: usize = 8192;

/// Composite `state` at `width` x `height` and write it to `path` as PNG.
pub fn write_snapshot(
    state: &SimulationState,
    quality: Quality,
    width: usize,
    height: usize,
    wall_time: f32,
    path: &Path,
) -> anyhow::Result<()> {
    let canvas = Compositor::new(quality).render(state, width, height, wall_time);
    save_png(&canvas, path)
}

pub fn save_png(canvas: &Canvas, path: &Path) -> anyhow::Result<()> {
    let w = u32::try_from(canvas.width()).context("canvas width exceeds u32")?;
    let h = u32::try_from(canvas.height()).context("canvas height exceeds u32")?;
    let img = RgbaImage::from_raw(w, h, canvas.to_rgba8())
        .ok_or_else(|| anyhow!("pixel buffer does not match {w}x{h}"))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create {}", parent.display()))?;
    }
    img.save(path)
        .with_context(|| format!("write {}", path.display()))
}

/// `<dir>/kaleidoscope-<palette>-<stamp>.png`.
pub fn snapshot_path(dir: &Path, palette: Palette, stamp: u64) -> PathBuf {
    dir.join(format!(
        "kaleidoscope-{}-{stamp}.png",
        palette.label().to_ascii_lowercase()
    ))
}
