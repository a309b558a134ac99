//! Byte frequency data computed the way a Web Audio `AnalyserNode` does:
//! Blackman window, forward FFT, magnitude scaled by `1/N`, exponential
//! smoothing against the previous frame, then a linear map from
//! `[min_db, max_db]` onto `0..=255`.

use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};

use crate::config::AudioSettings;

pub struct Spectrum {
    fft: Arc<dyn Fft<f32>>,
    fft_size: usize,
    window: Vec<f32>,
    buffer: Vec<Complex<f32>>,
    smoothed: Vec<f32>,
    smoothing: f32,
    min_db: f32,
    max_db: f32,
}

impl Spectrum {
    pub fn new(fft_size: usize, smoothing: f32, min_db: f32, max_db: f32) -> Self {
        let fft_size = fft_size.max(2);
        let mut planner = FftPlanner::new();
        Self {
            fft: planner.plan_fft_forward(fft_size),
            fft_size,
            window: blackman_window(fft_size),
            buffer: vec![Complex::new(0.0, 0.0); fft_size],
            smoothed: vec![0.0; fft_size / 2],
            smoothing: smoothing.clamp(0.0, 1.0),
            min_db,
            max_db,
        }
    }

    pub fn from_settings(settings: &AudioSettings) -> Self {
        Self::new(
            settings.fft_size,
            settings.smoothing,
            settings.min_decibels,
            settings.max_decibels,
        )
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Bins per frame (`fft_size / 2`).
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Forget the smoothing history.
    pub fn reset(&mut self) {
        self.smoothed.fill(0.0);
    }

    /// Analyse the newest `fft_size` samples of `samples` (zero-padded at the
    /// front when shorter).
    pub fn process(&mut self, samples: &[f32]) -> Vec<u8> {
        let n = self.fft_size;
        let take = samples.len().min(n);
        let pad = n - take;
        let tail = &samples[samples.len() - take..];

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            let s = if i < pad { 0.0 } else { tail[i - pad] };
            let s = if s.is_finite() { s } else { 0.0 };
            *slot = Complex::new(s * self.window[i], 0.0);
        }
        self.fft.process(&mut self.buffer);

        let scale = 1.0 / n as f32;
        let range = self.max_db - self.min_db;
        let tau = self.smoothing;
        self.smoothed
            .iter_mut()
            .zip(&self.buffer)
            .map(|(prev, x)| {
                let magnitude = x.norm() * scale;
                *prev = tau * *prev + (1.0 - tau) * magnitude;
                let db = 20.0 * prev.log10();
                let scaled = 255.0 * (db - self.min_db) / range;
                if scaled.is_nan() {
                    0
                } else {
                    scaled.clamp(0.0, 255.0) as u8
                }
            })
            .collect()
    }
}

fn blackman_window(n: usize) -> Vec<f32> {
    const A0: f32 = 0.42;
    const A1: f32 = 0.5;
    const A2: f32 = 0.08;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            A0 - A1 * (2.0 * PI * x).cos() + A2 * (4.0 * PI * x).cos()
        })
        .collect()
}
