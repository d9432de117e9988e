// ---------------- Native audio input (cpal) ----------------

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context};
use cosmos_core::{SpectrumAnalyser, SpectrumSource, ANALYSER_WINDOW};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

/// Most recent mono samples written by the capture callback.
struct SampleRing {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleRing {
    fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, sample: f32) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }
}

/// Live microphone / line-in spectrum.
///
/// The cpal callback only appends to the ring; analysis happens on the
/// render thread in [`SpectrumSource::refresh`], so the callback never
/// waits on the DFT.
pub struct CaptureSource {
    _stream: cpal::Stream,
    shared: Arc<Mutex<SampleRing>>,
    scratch: Vec<f32>,
    analyser: SpectrumAnalyser,
}

impl CaptureSource {
    pub fn start() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("no audio input device"))?;
        let config = device
            .default_input_config()
            .context("querying input config")?;
        let channels = config.channels() as usize;
        log::info!(
            "[audio] capturing from {:?} at {} Hz, {} ch, {:?}",
            device.name().unwrap_or_default(),
            config.sample_rate().0,
            channels,
            config.sample_format()
        );

        let analyser = SpectrumAnalyser::new(ANALYSER_WINDOW);
        let capacity = analyser.window_size() * 4;
        let shared = Arc::new(Mutex::new(SampleRing::new(capacity)));
        let err_fn = |err| log::error!("[audio] input stream error: {err}");

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream_f32(&device, &config.into(), channels, Arc::clone(&shared), err_fn)?
            }
            cpal::SampleFormat::I16 => {
                build_stream_i16(&device, &config.into(), channels, Arc::clone(&shared), err_fn)?
            }
            cpal::SampleFormat::U16 => {
                build_stream_u16(&device, &config.into(), channels, Arc::clone(&shared), err_fn)?
            }
            other => return Err(anyhow!("unsupported sample format {other:?}")),
        };
        stream.play().context("starting input stream")?;

        Ok(Self {
            _stream: stream,
            shared,
            scratch: Vec::with_capacity(capacity),
            analyser,
        })
    }
}

impl SpectrumSource for CaptureSource {
    fn refresh(&mut self) {
        self.scratch.clear();
        if let Ok(ring) = self.shared.lock() {
            self.scratch.extend(ring.samples.iter().copied());
        }
        // too few samples clears the analyser, which reads as "no audio"
        let _ = self.analyser.analyse(&self.scratch);
    }

    fn sample_spectrum(&self) -> Option<&[u8]> {
        self.analyser.sample_spectrum()
    }

    fn sample_level(&self) -> f32 {
        self.analyser.sample_level()
    }
}

/// Average interleaved frames down to mono and append them.
fn push_frames(ring: &Arc<Mutex<SampleRing>>, channels: usize, data: &[f32]) {
    let Ok(mut ring) = ring.lock() else {
        return;
    };
    let channels = channels.max(1);
    for frame in data.chunks(channels) {
        let sum: f32 = frame.iter().sum();
        ring.push(sum / frame.len() as f32);
    }
}

fn build_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    shared: Arc<Mutex<SampleRing>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    device.build_input_stream(
        config,
        move |data: &[f32], _| push_frames(&shared, channels, data),
        err_fn,
        None,
    )
}

fn build_stream_i16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    shared: Arc<Mutex<SampleRing>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut converted = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[i16], _| {
            converted.clear();
            converted.extend(data.iter().map(|&s| s as f32 / i16::MAX as f32));
            push_frames(&shared, channels, &converted);
        },
        err_fn,
        None,
    )
}

fn build_stream_u16(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    shared: Arc<Mutex<SampleRing>>,
    err_fn: impl Fn(cpal::StreamError) + Send + 'static,
) -> Result<cpal::Stream, cpal::BuildStreamError> {
    let mut converted = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[u16], _| {
            converted.clear();
            converted.extend(
                data.iter()
                    .map(|&s| (s as f32 / u16::MAX as f32) * 2.0 - 1.0),
            );
            push_frames(&shared, channels, &converted);
        },
        err_fn,
        None,
    )
}
