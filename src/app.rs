use crate::audio::{AudioLevels, AudioSystem};
use crate::config::Config;
use crate::render::{Frame, HalfBlockRenderer, Renderer};
use crate::terminal::RawSession;
use crate::visual::{EngineConfig, EngineState, FluidEngine, MODE_COUNT};
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::{BufWriter, stdout};
use std::time::{Duration, Instant};

// Matches the engine's surface clear so the letterbox is invisible.
const PANEL_RGB: [u8; 3] = [6, 8, 12];

pub fn run(cfg: Config) -> anyhow::Result<()> {
    let _session = RawSession::begin()?;
    let mut out = BufWriter::new(stdout());
    let mut renderer = HalfBlockRenderer::new();

    let audio = if cfg.no_audio {
        None
    } else {
        Some(AudioSystem::new(cfg.device.as_deref()).context("start audio capture")?)
    };
    let levels = audio.as_ref().map(|a| a.levels());

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.0 < 4 || last_size.1 < 2 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut engine = FluidEngine::new(EngineConfig {
        subdivision: cfg.subdivision,
        seed: cfg.seed,
        size_px: 0,
        mode: cfg.mode,
    });
    engine.start();

    let mut show_hud = true;
    let mut canvas: Vec<u8> = Vec::new();
    let (mut w, mut h) = layout(last_size, show_hud, &mut engine, &mut canvas);

    let mut fps = FpsCounter::new();
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    let old_hud = show_hud;
                    if handle_key(k.code, k.modifiers, &mut engine, &mut show_hud) {
                        engine.dispose();
                        return Ok(());
                    }
                    if show_hud != old_hud {
                        (w, h) = layout(last_size, show_hud, &mut engine, &mut canvas);
                    }
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    (w, h) = layout(last_size, show_hud, &mut engine, &mut canvas);
                }
                _ => {}
            }
        }

        // Resize events can be missed in some terminals.
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
            (w, h) = layout(last_size, show_hud, &mut engine, &mut canvas);
        }

        let dt = now.duration_since(last_frame).as_secs_f32().clamp(1e-3, 0.1);
        last_frame = now;

        let raw = levels
            .as_ref()
            .map(|l| l.load())
            .unwrap_or(AudioLevels::default());
        engine.set_audio_levels(raw.rms, raw.peak);

        engine.tick(dt);
        blit_centered(engine.pixels(), engine.size(), &mut canvas, w, h);

        fps.tick();
        let (srms, speak) = engine.smoothed_levels();
        let hud = if show_hud {
            format!(
                " mode {} ({})  blend {:>3.0}%  rms {:.2}  peak {:.2}  {}x{}  {:.0} fps  [1-3] mode  [r] reset  [q] quit",
                engine.mode_index(),
                engine.mode_label(),
                engine.blend_progress() * 100.0,
                srms,
                speak,
                w,
                h,
                fps.fps(),
            )
        } else {
            String::new()
        };

        let (term_cols, term_rows) = last_size;
        let visual_rows = term_rows.saturating_sub(hud_rows(show_hud)).max(1);
        let frame = Frame {
            term_cols,
            term_rows,
            visual_rows,
            pixel_width: w,
            pixel_height: h,
            pixels_rgba: &canvas,
            hud: &hud,
            sync_updates: cfg.sync_updates,
        };
        renderer.render(&frame, &mut out)?;

        // Frame pacing.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn hud_rows(show_hud: bool) -> u16 {
    if show_hud { 1 } else { 0 }
}

/// Recompute the pixel canvas for the terminal size and resize the engine's
/// square surface to fit inside it.
fn layout(
    size: (u16, u16),
    show_hud: bool,
    engine: &mut FluidEngine,
    canvas: &mut Vec<u8>,
) -> (usize, usize) {
    let (cols, rows) = size;
    let visual_rows = rows.saturating_sub(hud_rows(show_hud)).max(1);
    let w = cols as usize;
    let h = (visual_rows as usize) * 2;
    canvas.resize(w * h * 4, 0);
    engine.resize(w.min(h));
    (w, h)
}

/// Copy the engine's square surface into the center of the canvas,
/// letterboxing with the panel tone.
fn blit_centered(src: &[u8], src_size: usize, canvas: &mut [u8], w: usize, h: usize) {
    for px in canvas.chunks_exact_mut(4) {
        px[0] = PANEL_RGB[0];
        px[1] = PANEL_RGB[1];
        px[2] = PANEL_RGB[2];
        px[3] = 255;
    }
    if src_size == 0 || src.len() < src_size * src_size * 4 {
        return;
    }
    let ox = (w.saturating_sub(src_size)) / 2;
    let oy = (h.saturating_sub(src_size)) / 2;
    let copy_w = src_size.min(w);
    let copy_h = src_size.min(h);
    for y in 0..copy_h {
        let src_off = y * src_size * 4;
        let dst_off = ((oy + y) * w + ox) * 4;
        canvas[dst_off..dst_off + copy_w * 4]
            .copy_from_slice(&src[src_off..src_off + copy_w * 4]);
    }
}

fn handle_key(
    code: KeyCode,
    mods: KeyModifiers,
    engine: &mut FluidEngine,
    show_hud: &mut bool,
) -> bool {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return true;
    }

    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('1') => {
            engine.set_mode(0);
            false
        }
        KeyCode::Char('2') => {
            engine.set_mode(1);
            false
        }
        KeyCode::Char('3') => {
            engine.set_mode(2);
            false
        }
        KeyCode::Tab => {
            engine.set_mode((engine.mode_index() + 1) % MODE_COUNT);
            false
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            engine.reset();
            false
        }
        KeyCode::Char(' ') => {
            if engine.state() == EngineState::Running {
                engine.stop();
            } else {
                engine.start();
            }
            false
        }
        KeyCode::Char('i') | KeyCode::Char('I') => {
            *show_hud = !*show_hud;
            false
        }
        _ => false,
    }
}

struct FpsCounter {
    frames: u32,
    window_start: Instant,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            frames: 0,
            window_start: Instant::now(),
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let dt = self.window_start.elapsed().as_secs_f32();
        if dt >= 0.5 {
            self.fps = self.frames as f32 / dt;
            self.frames = 0;
            self.window_start = Instant::now();
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
