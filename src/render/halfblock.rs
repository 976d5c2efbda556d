use crate::render::{Frame, Renderer};
use std::io::Write;

/// Two pixels per cell via U+2580: foreground paints the top half,
/// background the bottom.
pub struct HalfBlockRenderer {
    last_fg: Option<(u8, u8, u8)>,
    last_bg: Option<(u8, u8, u8)>,
}

impl HalfBlockRenderer {
    pub fn new() -> Self {
        Self {
            last_fg: None,
            last_bg: None,
        }
    }
}

impl Default for HalfBlockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for HalfBlockRenderer {
    fn name(&self) -> &'static str {
        "halfblock"
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 || w == 0 || h == 0 {
            return Ok(());
        }
        if w != cols || h != visual_rows.saturating_mul(2) {
            // Internal mismatch; avoid panics.
            return Ok(());
        }
        if frame.pixels_rgba.len() < w.saturating_mul(h).saturating_mul(4) {
            return Ok(());
        }

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }

        // Home, reset, and disable autowrap while painting full-width rows;
        // otherwise some terminals wrap on the last column and leave gaps.
        out.write_all(b"\x1b[H\x1b[0m\x1b[?7l")?;
        self.last_fg = None;
        self.last_bg = None;

        const HALF_BLOCK: char = '\u{2580}';

        for row in 0..visual_rows {
            let top_y = row * 2;
            let bot_y = top_y + 1;
            for x in 0..cols {
                let top_i = (top_y * w + x) * 4;
                let bot_i = (bot_y * w + x) * 4;
                let (tr, tg, tb) = (
                    frame.pixels_rgba[top_i],
                    frame.pixels_rgba[top_i + 1],
                    frame.pixels_rgba[top_i + 2],
                );
                let (br, bg, bb) = (
                    frame.pixels_rgba[bot_i],
                    frame.pixels_rgba[bot_i + 1],
                    frame.pixels_rgba[bot_i + 2],
                );

                if self.last_fg != Some((tr, tg, tb)) {
                    write!(out, "\x1b[38;2;{};{};{}m", tr, tg, tb)?;
                    self.last_fg = Some((tr, tg, tb));
                }
                if self.last_bg != Some((br, bg, bb)) {
                    write!(out, "\x1b[48;2;{};{};{}m", br, bg, bb)?;
                    self.last_bg = Some((br, bg, bb));
                }
                write!(out, "{HALF_BLOCK}")?;
            }
            out.write_all(b"\r\n")?;
        }

        // HUD line below the canvas.
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", visual_rows + 1)?;
        let mut hud = frame.hud;
        // Truncate by character, not byte; the HUD may pick up non-ASCII
        // device names.
        if let Some((cut, _)) = hud.char_indices().nth(cols) {
            hud = &hud[..cut];
        }
        write!(out, "{hud}")?;

        out.write_all(b"\x1b[?7h")?;
        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        Ok(())
    }
}
