use cosmos_core::*;

#[test]
fn band_mean_normalizes_to_unit() {
    let spectrum = [255u8; SPECTRUM_BINS];
    assert!((band_mean(&spectrum, BASS_BINS) - 1.0).abs() < 1e-6);
    let silent = [0u8; SPECTRUM_BINS];
    assert_eq!(band_mean(&silent, HIGH_BINS), 0.0);
}

#[test]
fn band_levels_split_low_mid_high() {
    let mut spectrum = [0u8; SPECTRUM_BINS];
    for b in &mut spectrum[BASS_BINS] {
        *b = 255;
    }
    for b in &mut spectrum[MID_BINS] {
        *b = 51;
    }
    let bands = BandLevels::from_spectrum(&spectrum);
    assert!((bands.bass - 1.0).abs() < 1e-6);
    assert!((bands.mid - 0.2).abs() < 1e-6);
    assert_eq!(bands.high, 0.0);
}

#[test]
fn short_spectrum_reads_missing_bins_as_silence() {
    let spectrum = [255u8; 4];
    assert!((band_mean(&spectrum, BASS_BINS) - 1.0).abs() < 1e-6);
    assert_eq!(band_mean(&spectrum, MID_BINS), 0.0);
    assert_eq!(band_mean(&[], BASS_BINS), 0.0);
}

#[test]
fn decibels_map_onto_bytes() {
    assert_eq!(decibels_to_byte(-100.0), 0);
    assert_eq!(decibels_to_byte(-140.0), 0);
    assert_eq!(decibels_to_byte(0.0), 255);
    assert_eq!(decibels_to_byte(12.0), 255);
    assert_eq!(decibels_to_byte(-50.0), 127);
    assert_eq!(decibels_to_byte(f32::NAN), 0);
}

#[test]
fn level_is_mean_of_clipped_normalized_decibels() {
    assert_eq!(level_from_decibels(&[]), 0.0);
    assert!((level_from_decibels(&[-50.0, -150.0]) - 0.25).abs() < 1e-6);
    assert!((level_from_decibels(&[0.0, 0.0]) - 1.0).abs() < 1e-6);
    assert!(level_from_decibels(&[20.0]) <= 1.0);
}

#[test]
fn audio_frame_clamps_level() {
    let spectrum = [0u8; 8];
    assert_eq!(AudioFrame::new(&spectrum, 2.0).level(), 1.0);
    assert_eq!(AudioFrame::new(&spectrum, -1.0).level(), 0.0);
    assert_eq!(AudioFrame::new(&spectrum, f32::NAN).level(), 0.0);
}

#[test]
fn analyser_needs_a_full_window() {
    let mut analyser = SpectrumAnalyser::default();
    assert_eq!(analyser.window_size(), ANALYSER_WINDOW);
    assert_eq!(analyser.bins(), SPECTRUM_BINS);
    assert!(analyser.frame().is_none());
    let short = vec![0.5f32; ANALYSER_WINDOW - 1];
    assert!(analyser.analyse(&short).is_none());
    assert!(analyser.sample_spectrum().is_none());
}

#[test]
fn analyser_silence_is_zero() {
    let mut analyser = SpectrumAnalyser::default();
    let silence = vec![0.0f32; ANALYSER_WINDOW];
    let frame = analyser.analyse(&silence).expect("full window");
    assert!(frame.spectrum().iter().all(|&b| b == 0));
    assert_eq!(frame.level(), 0.0);
}

#[test]
fn analyser_peaks_at_the_tone_bin() {
    let mut analyser = SpectrumAnalyser::default();
    let bin = 16;
    let samples: Vec<f32> = (0..ANALYSER_WINDOW)
        .map(|n| {
            (std::f32::consts::TAU * bin as f32 * n as f32 / ANALYSER_WINDOW as f32).sin()
        })
        .collect();
    let frame = analyser.analyse(&samples).expect("full window");
    let (peak, _) = frame
        .spectrum()
        .iter()
        .enumerate()
        .max_by_key(|&(_, &b)| b)
        .expect("non-empty spectrum");
    assert_eq!(peak, bin);
    assert!(frame.spectrum()[bin] > 200);
    assert!(frame.spectrum()[bin + 8] < frame.spectrum()[bin]);
    assert!(frame.level() > 0.0 && frame.level() <= 1.0);
    assert!(analyser.sample_spectrum().is_some());
}

#[test]
fn analyser_uses_the_most_recent_window() {
    let mut analyser = SpectrumAnalyser::default();
    let mut samples = vec![0.9f32; ANALYSER_WINDOW];
    samples.extend(std::iter::repeat(0.0).take(ANALYSER_WINDOW));
    let frame = analyser.analyse(&samples).expect("full window");
    assert!(frame.spectrum().iter().all(|&b| b == 0));
}

#[test]
fn static_spectrum_frame_and_empty_spectrum() {
    let source = StaticSpectrum::uniform(128, 0.5);
    let frame = source.frame().expect("static source always has audio");
    assert_eq!(frame.spectrum().len(), SPECTRUM_BINS);
    assert!((frame.level() - 0.5).abs() < 1e-6);

    let empty = StaticSpectrum {
        spectrum: Vec::new(),
        level: 1.0,
    };
    assert!(empty.frame().is_none());
}
