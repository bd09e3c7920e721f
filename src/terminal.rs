//! Puts the terminal into viewer mode and puts it back afterwards.

use anyhow::Context;
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, ClearType},
};
use std::io::{stdout, Stdout, Write};

/// Closes a pending synchronized update, turns autowrap back on and resets
/// colors, in case a frame was cut off mid-write.
const OUTPUT_RESET: &[u8] = b"\x1b[?2026l\x1b[?7h\x1b[0m";

/// Raw input, alternate screen, hidden cursor and mouse reporting, held for
/// the lifetime of the value.
pub struct TerminalGuard {
    mouse: bool,
}

impl TerminalGuard {
    pub fn new() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // From here on Drop owns the teardown.
        let mut guard = Self { mouse: false };

        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )
        .context("enter viewer screen")?;
        execute!(out, EnableMouseCapture).context("enable mouse capture")?;
        guard.mouse = true;

        Ok(guard)
    }

    pub fn stdout() -> Stdout {
        stdout()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let mut out = stdout();
        if self.mouse {
            let _ = execute!(out, DisableMouseCapture);
        }
        let _ = out.write_all(OUTPUT_RESET);
        let _ = out.flush();
        let _ = execute!(out, cursor::Show, terminal::LeaveAlternateScreen);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_undoes_frame_writer_modes() {
        let s = std::str::from_utf8(OUTPUT_RESET).unwrap();
        assert!(s.contains("\x1b[?2026l"), "sync update left open");
        assert!(s.contains("\x1b[?7h"), "autowrap left off");
        assert!(s.ends_with("\x1b[0m"));
    }
}
