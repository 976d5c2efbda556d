//! Terminal lifecycle for the visualizer binary.

use anyhow::Context;
use crossterm::{cursor, execute, style, terminal};
use std::io::stdout;

/// Raw-mode session. `begin` flips the terminal into the alternate screen
/// with the cursor hidden; dropping the value unwinds every mode this
/// binary touches, including the paint-time ones the half-block renderer
/// toggles mid-frame (line wrap, synchronized updates, colors).
pub struct RawSession {
    _private: (),
}

impl RawSession {
    pub fn begin() -> anyhow::Result<RawSession> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // From here on Drop owns cleanup, so a failure below still
        // restores cooked mode on unwind.
        let session = RawSession { _private: () };
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            terminal::Clear(terminal::ClearType::All),
            cursor::Hide
        )
        .context("prepare alternate screen")?;
        Ok(session)
    }
}

impl Drop for RawSession {
    fn drop(&mut self) {
        // A quit key can land mid-frame; best-effort, errors have nowhere
        // to go during teardown.
        let _ = execute!(
            stdout(),
            terminal::EndSynchronizedUpdate,
            terminal::EnableLineWrap,
            style::ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
