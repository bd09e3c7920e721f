use crate::canvas::{Canvas, Surface};
use crate::render::{draw_overlay_popup, Frame};
use std::io::Write;

const UPPER_HALF: char = '\u{2580}';

/// Truecolor `▀` cells: foreground is the upper pixel, background the lower.
#[derive(Debug, Default)]
pub struct HalfBlockRenderer {
    last_fg: Option<[u8; 3]>,
    last_bg: Option<[u8; 3]>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let rows = frame.visual_rows as usize;
        let canvas = frame.canvas;
        if cols == 0 || rows == 0 || canvas.width() != cols || canvas.height() != rows * 2 {
            return Ok(());
        }

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }
        // Home, reset, no autowrap while full-width rows are painted.
        out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        for row in 0..rows {
            for x in 0..cols {
                let top = rgb_at(canvas, x, row * 2);
                let bottom = rgb_at(canvas, x, row * 2 + 1);
                if self.last_fg != Some(top) {
                    write!(out, "\x1b[38;2;{};{};{}m", top[0], top[1], top[2])?;
                    self.last_fg = Some(top);
                }
                if self.last_bg != Some(bottom) {
                    write!(out, "\x1b[48;2;{};{};{}m", bottom[0], bottom[1], bottom[2])?;
                    self.last_bg = Some(bottom);
                }
                write!(out, "{UPPER_HALF}")?;
            }
            out.write_all(b"\r\n")?;
        }

        let mut hud = frame.hud.lines();
        for i in 0..frame.hud_rows as usize {
            write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", rows + i + 1)?;
            if let Some(line) = hud.next() {
                let clipped: String = line.chars().take(cols).collect();
                write!(out, "{clipped}")?;
            }
        }

        if let Some(text) = frame.overlay {
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
        }

        out.write_all(b"\x1b[?7h")?;
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        Ok(())
    }
}

fn rgb_at(canvas: &Canvas, x: usize, y: usize) -> [u8; 3] {
    canvas
        .pixel(x, y)
        .map(|c| {
            let [r, g, b, _] = c.to_u8();
            [r, g, b]
        })
        .unwrap_or([0, 0, 0])
}
