//! Level delivery path: microphone capture → mono downmix → ring buffer →
//! analyzer thread producing raw RMS/peak scalars.
//!
//! This is the stand-in for the plugin host's parameter-binding layer: the
//! engine only ever sees the two scalars. Smoothing is the engine's job
//! (its envelope follower), so the values published here are raw
//! per-window measurements.

use anyhow::{Context, anyhow};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer as _, Producer as _, Split as _};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default)]
pub struct AudioLevels {
    pub rms: f32,
    pub peak: f32,
}

/// Lock-free scalar hand-off between the analyzer thread and the render
/// loop. Seqlock-style: an odd sequence marks a write in progress.
pub struct AtomicAudioLevels {
    seq: AtomicU64,
    rms: AtomicU32,
    peak: AtomicU32,
}

impl AtomicAudioLevels {
    pub fn new() -> Self {
        Self {
            seq: AtomicU64::new(0),
            rms: AtomicU32::new(0),
            peak: AtomicU32::new(0),
        }
    }

    pub fn store(&self, levels: AudioLevels) {
        self.seq.fetch_add(1, Ordering::Release);
        self.rms.store(levels.rms.to_bits(), Ordering::Relaxed);
        self.peak.store(levels.peak.to_bits(), Ordering::Relaxed);
        self.seq.fetch_add(1, Ordering::Release);
    }

    pub fn load(&self) -> AudioLevels {
        loop {
            let v1 = self.seq.load(Ordering::Acquire);
            if v1 & 1 == 1 {
                continue;
            }
            let rms = f32::from_bits(self.rms.load(Ordering::Relaxed));
            let peak = f32::from_bits(self.peak.load(Ordering::Relaxed));
            let v2 = self.seq.load(Ordering::Acquire);
            if v1 == v2 {
                return AudioLevels { rms, peak };
            }
        }
    }
}

impl Default for AtomicAudioLevels {
    fn default() -> Self {
        Self::new()
    }
}

pub fn list_input_devices() -> anyhow::Result<()> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("enumerate input devices")?;

    let mut out = io::stdout();
    writeln!(out, "Input devices:")?;
    for dev in devices {
        let name = dev.name().unwrap_or_else(|_| "<unknown>".to_string());
        writeln!(out, "  - {}", name)?;
    }
    Ok(())
}

pub struct AudioSystem {
    // Keep the stream alive for the full AudioSystem lifetime.
    _stream: cpal::Stream,
    stop: Arc<AtomicBool>,
    analyzer_handle: Option<thread::JoinHandle<()>>,
    levels: Arc<AtomicAudioLevels>,
    pub sample_rate_hz: u32,
}

impl AudioSystem {
    pub fn new(device_query: Option<&str>) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = select_input_device(&host, device_query)?;
        let supported = device
            .default_input_config()
            .context("get default input config")?;
        let sample_rate_hz = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let config: cpal::StreamConfig = supported.clone().into();

        let rb_capacity = (sample_rate_hz as usize).saturating_mul(2);
        let rb = HeapRb::<f32>::new(rb_capacity);
        let (mut prod, mut cons) = rb.split();

        let stop = Arc::new(AtomicBool::new(false));
        let levels = Arc::new(AtomicAudioLevels::new());
        let levels_for_thread = Arc::clone(&levels);
        let stop_for_thread = Arc::clone(&stop);

        let err_fn = |err| eprintln!("audio stream error: {err}");

        let stream = match supported.sample_format() {
            SampleFormat::F32 => device.build_input_stream(
                &config,
                move |data: &[f32], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::I16 => device.build_input_stream(
                &config,
                move |data: &[i16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            SampleFormat::U16 => device.build_input_stream(
                &config,
                move |data: &[u16], _| push_interleaved(data, channels, &mut prod),
                err_fn,
                None,
            )?,
            fmt => return Err(anyhow!("unsupported sample format: {fmt:?}")),
        };

        stream.play().context("start input stream")?;

        let analyzer_handle =
            thread::spawn(move || level_loop(&mut cons, &stop_for_thread, &levels_for_thread));

        Ok(Self {
            _stream: stream,
            stop,
            analyzer_handle: Some(analyzer_handle),
            levels,
            sample_rate_hz,
        })
    }

    pub fn levels(&self) -> Arc<AtomicAudioLevels> {
        Arc::clone(&self.levels)
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(h) = self.analyzer_handle.take() {
            let _ = h.join();
        }
    }
}

fn select_input_device(
    host: &cpal::Host,
    device_query: Option<&str>,
) -> anyhow::Result<cpal::Device> {
    let devices = host
        .input_devices()
        .context("enumerate input devices")?
        .collect::<Vec<_>>();

    let want = device_query.map(|s| s.to_lowercase());
    if let Some(want) = want.as_deref() {
        if let Some(dev) = devices.iter().find(|d| {
            d.name()
                .map(|n| n.to_lowercase().contains(want))
                .unwrap_or(false)
        }) {
            return Ok(dev.clone());
        }
        return Err(anyhow!("no input device matching: {want}"));
    }

    host.default_input_device()
        .ok_or_else(|| anyhow!("no default input device found"))
}

fn push_interleaved<T: Sample<Float = f32> + Copy>(
    data: &[T],
    channels: usize,
    prod: &mut ringbuf::HeapProd<f32>,
) {
    for frame in data.chunks(channels) {
        let mut acc = 0.0f32;
        for s in frame {
            acc += (*s).to_float_sample();
        }
        let mono = acc / channels as f32;
        let _ = prod.try_push(mono);
    }
}

fn level_loop(cons: &mut ringbuf::HeapCons<f32>, stop: &AtomicBool, levels: &AtomicAudioLevels) {
    // Short hop keeps level latency below one frame at 60 Hz.
    let n = 1024usize;
    let hop = 256usize;

    let mut window = vec![0.0f32; n];
    let mut write_pos = 0usize;
    let mut filled = 0usize;
    let mut since_last = 0usize;

    while !stop.load(Ordering::Relaxed) {
        let mut got_any = false;
        while let Some(s) = cons.try_pop() {
            got_any = true;
            window[write_pos] = s;
            write_pos = (write_pos + 1) % n;
            if filled < n {
                filled += 1;
            }
            since_last += 1;
            if filled == n && since_last >= hop {
                since_last = 0;
                levels.store(measure_window(&window));
            }
        }

        if !got_any {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

fn measure_window(window: &[f32]) -> AudioLevels {
    let mut sq = 0.0f32;
    let mut peak = 0.0f32;
    for &s in window {
        sq += s * s;
        let a = s.abs();
        if a > peak {
            peak = a;
        }
    }
    AudioLevels {
        rms: (sq / window.len().max(1) as f32).sqrt(),
        peak,
    }
}
