//! Spectral features consumed by the simulations.
//!
//! The simulations only ever see an [`AudioFrame`]: a byte spectrum plus a
//! scalar loudness. Where those numbers come from is the business of a
//! [`SpectrumSource`]; the native frontend feeds captured PCM through a
//! [`SpectrumAnalyser`], tests hand in literal arrays.

use crate::constants::{
    ANALYSER_WINDOW, BASS_BINS, DB_FLOOR, DB_RANGE, HIGH_BINS, MID_BINS, SPECTRUM_BINS,
};
use std::ops::Range;

/// One tick's worth of audio input.
///
/// `spectrum` holds magnitudes in \[0, 255\] ordered from low to high
/// frequency; `level` is the overall loudness in \[0, 1\].
#[derive(Clone, Copy, Debug)]
pub struct AudioFrame<'a> {
    spectrum: &'a [u8],
    level: f32,
}

impl<'a> AudioFrame<'a> {
    pub fn new(spectrum: &'a [u8], level: f32) -> Self {
        let level = if level.is_finite() {
            level.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { spectrum, level }
    }

    pub fn spectrum(&self) -> &'a [u8] {
        self.spectrum
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    pub fn bands(&self) -> BandLevels {
        BandLevels::from_spectrum(self.spectrum)
    }
}

/// Non-blocking reader of the latest spectrum snapshot.
///
/// `sample_spectrum` returns `None` (or an empty slice) while no audio is
/// available; simulators treat that as "no forcing this tick".
pub trait SpectrumSource {
    /// Pull new data from the producer, if any. Called once per tick before sampling.
    fn refresh(&mut self) {}
    fn sample_spectrum(&self) -> Option<&[u8]>;
    fn sample_level(&self) -> f32;

    fn frame(&self) -> Option<AudioFrame<'_>> {
        self.sample_spectrum()
            .filter(|s| !s.is_empty())
            .map(|s| AudioFrame::new(s, self.sample_level()))
    }
}

/// Per-band means of a byte spectrum, normalized to \[0, 1\].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandLevels {
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
}

impl BandLevels {
    pub fn from_spectrum(spectrum: &[u8]) -> Self {
        Self {
            bass: band_mean(spectrum, BASS_BINS),
            mid: band_mean(spectrum, MID_BINS),
            high: band_mean(spectrum, HIGH_BINS),
        }
    }
}

/// Mean of `spectrum[range]` divided by 255. Bins past the end of a short
/// spectrum are ignored; an empty band reads as silence.
pub fn band_mean(spectrum: &[u8], range: Range<usize>) -> f32 {
    let end = range.end.min(spectrum.len());
    let start = range.start.min(end);
    let band = &spectrum[start..end];
    if band.is_empty() {
        return 0.0;
    }
    let sum: u32 = band.iter().map(|&b| b as u32).sum();
    sum as f32 / band.len() as f32 / 255.0
}

/// Map an analyser decibel reading onto a byte: -100 dB → 0, 0 dB → 255.
#[inline]
pub fn decibels_to_byte(db: f32) -> u8 {
    let normalized = ((db - DB_FLOOR) / DB_RANGE).clamp(0.0, 1.0);
    // NaN falls through clamp and casts to 0
    (normalized * 255.0).floor() as u8
}

/// Loudness as the mean of floor-clipped normalized decibels.
pub fn level_from_decibels(decibels: &[f32]) -> f32 {
    if decibels.is_empty() {
        return 0.0;
    }
    let sum: f32 = decibels
        .iter()
        .map(|&db| ((db - DB_FLOOR) / DB_RANGE).max(0.0))
        .sum();
    let level = sum / decibels.len() as f32;
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Hann-windowed DFT over a fixed window of mono PCM samples.
///
/// All tables and output buffers are sized at construction; [`analyse`]
/// never allocates. The window holds `2 * bins` samples.
///
/// [`analyse`]: SpectrumAnalyser::analyse
pub struct SpectrumAnalyser {
    window: Vec<f32>,
    cos_table: Vec<f32>,
    sin_table: Vec<f32>,
    decibels: Vec<f32>,
    bytes: Vec<u8>,
    level: f32,
    ready: bool,
}

impl Default for SpectrumAnalyser {
    fn default() -> Self {
        Self::new(ANALYSER_WINDOW)
    }
}

impl SpectrumAnalyser {
    pub fn new(window_size: usize) -> Self {
        let size = window_size.max(2);
        let bins = size / 2;
        let window = (0..size)
            .map(|n| 0.5 - 0.5 * (std::f32::consts::TAU * n as f32 / size as f32).cos())
            .collect::<Vec<_>>();
        let mut cos_table = Vec::with_capacity(bins * size);
        let mut sin_table = Vec::with_capacity(bins * size);
        for k in 0..bins {
            for n in 0..size {
                // reduce k*n modulo size first to keep the angle small
                let phase = ((k * n) % size) as f32 / size as f32;
                let angle = std::f32::consts::TAU * phase;
                cos_table.push(angle.cos());
                sin_table.push(angle.sin());
            }
        }
        Self {
            window,
            cos_table,
            sin_table,
            decibels: vec![-f32::INFINITY; bins],
            bytes: vec![0; bins],
            level: 0.0,
            ready: false,
        }
    }

    pub fn window_size(&self) -> usize {
        self.window.len()
    }

    pub fn bins(&self) -> usize {
        self.bytes.len()
    }

    /// Analyse the most recent `window_size` samples of `samples`.
    ///
    /// Returns `None` until enough samples are supplied; the previous
    /// spectrum is discarded in that case.
    pub fn analyse(&mut self, samples: &[f32]) -> Option<AudioFrame<'_>> {
        let size = self.window.len();
        if samples.len() < size {
            self.ready = false;
            return None;
        }
        let recent = &samples[samples.len() - size..];
        for k in 0..self.bytes.len() {
            let cos_row = &self.cos_table[k * size..(k + 1) * size];
            let sin_row = &self.sin_table[k * size..(k + 1) * size];
            let mut re = 0.0f32;
            let mut im = 0.0f32;
            for n in 0..size {
                let x = recent[n] * self.window[n];
                re += x * cos_row[n];
                im -= x * sin_row[n];
            }
            let magnitude = (re * re + im * im).sqrt() / size as f32;
            let db = 20.0 * magnitude.max(1e-10).log10();
            self.decibels[k] = db;
            self.bytes[k] = decibels_to_byte(db);
        }
        self.level = level_from_decibels(&self.decibels);
        self.ready = true;
        Some(AudioFrame::new(&self.bytes, self.level))
    }

    pub fn decibels(&self) -> &[f32] {
        &self.decibels
    }
}

impl SpectrumSource for SpectrumAnalyser {
    fn sample_spectrum(&self) -> Option<&[u8]> {
        self.ready.then_some(self.bytes.as_slice())
    }

    fn sample_level(&self) -> f32 {
        self.level
    }
}

/// Fixed spectrum, mostly useful for tests and demos.
#[derive(Clone, Debug)]
pub struct StaticSpectrum {
    pub spectrum: Vec<u8>,
    pub level: f32,
}

impl StaticSpectrum {
    pub fn uniform(value: u8, level: f32) -> Self {
        Self {
            spectrum: vec![value; SPECTRUM_BINS],
            level,
        }
    }

    pub fn silent() -> Self {
        Self::uniform(0, 0.0)
    }
}

impl SpectrumSource for StaticSpectrum {
    fn sample_spectrum(&self) -> Option<&[u8]> {
        Some(&self.spectrum)
    }

    fn sample_level(&self) -> f32 {
        self.level
    }
}
