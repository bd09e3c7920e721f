mod halfblock;

pub use halfblock::HalfBlockRenderer;

use crate::canvas::Canvas;
use std::io::Write;

/// One terminal frame: the composited canvas plus text chrome beneath and above it.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    /// Terminal rows given to the picture; the canvas is `term_cols` x `2 * visual_rows`.
    pub visual_rows: u16,
    pub canvas: &'a Canvas,
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

/// Rows of picture for a terminal, leaving `hud_rows` for status text.
pub fn visual_rows(term_rows: u16, hud_rows: u16) -> u16 {
    term_rows.saturating_sub(hud_rows).max(1)
}

/// Canvas pixel size backing a `cols` x `visual_rows` half-block picture.
pub fn canvas_size(cols: u16, visual_rows: u16) -> (usize, usize) {
    (cols as usize, visual_rows as usize * 2)
}

/// Wrap `text` to `width` columns, hard-breaking long words.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for raw in text.lines() {
        let chars: Vec<char> = raw.chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        for chunk in chars.chunks(width) {
            lines.push(chunk.iter().collect());
        }
    }
    lines
}

/// Centered box over a dimmed screen. The first line is drawn as a title.
pub fn draw_overlay_popup(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if text.trim().is_empty() || cols < 8 || rows < 4 {
        return Ok(());
    }

    let lines = wrap_lines(text, cols.saturating_sub(6));
    let inner_w = lines
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(1)
        .max(1);
    let box_w = inner_w + 4;
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = body_h + 2;

    let left = (cols.saturating_sub(box_w)) / 2 + 1;
    let top = (rows.saturating_sub(box_h)) / 2 + 1;
    let bar = "\u{2500}".repeat(box_w - 2);

    out.write_all(b"\x1b[0m\x1b[38;2;230;226;255m\x1b[48;2;8;4;18m")?;
    write!(out, "\x1b[{};{}H\u{256d}{}\u{256e}", top, left, bar)?;
    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = top + 1 + i;
        let pad = inner_w - line.chars().count();
        if i == 0 {
            write!(
                out,
                "\x1b[{};{}H\u{2502} \x1b[1m\x1b[38;2;255;214;170m{}\x1b[22m\x1b[38;2;230;226;255m{} \u{2502}",
                row,
                left,
                line,
                " ".repeat(pad)
            )?;
        } else {
            write!(
                out,
                "\x1b[{};{}H\u{2502} {}{} \u{2502}",
                row,
                left,
                line,
                " ".repeat(pad)
            )?;
        }
    }
    write!(out, "\x1b[{};{}H\u{2570}{}\u{256f}", top + box_h - 1, left, bar)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}
