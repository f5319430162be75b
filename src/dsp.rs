// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Numeric helpers for the local audio heuristic and frame statistics

use rustfft::{num_complex::Complex, FftPlanner};

pub const FRAME_LENGTH: usize = 2048;
pub const HOP_LENGTH: usize = 512;

/// Floor applied to power bins before taking logs
const AMIN: f32 = 1e-10;

pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance
pub fn variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / data.len() as f64
}

pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Percentile with linear interpolation between closest ranks
pub fn percentile(data: &[f32], pct: f64) -> f32 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = (rank - lo as f64) as f32;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Pad both ends by half a frame, repeating the edge samples
fn center_pad(samples: &[f32], frame_length: usize) -> Vec<f32> {
    let pad = frame_length / 2;
    let first = samples.first().copied().unwrap_or(0.0);
    let last = samples.last().copied().unwrap_or(0.0);

    let mut padded = Vec::with_capacity(samples.len() + 2 * pad);
    padded.extend(std::iter::repeat(first).take(pad));
    padded.extend_from_slice(samples);
    padded.extend(std::iter::repeat(last).take(pad));
    padded
}

fn frame_starts(len: usize, frame_length: usize, hop: usize) -> impl Iterator<Item = usize> {
    let count = if len >= frame_length {
        1 + (len - frame_length) / hop
    } else {
        0
    };
    (0..count).map(move |i| i * hop)
}

/// Zero-crossing rate per frame (fraction of sign changes)
pub fn zero_crossing_rate(samples: &[f32], frame_length: usize, hop: usize) -> Vec<f64> {
    if samples.is_empty() || frame_length == 0 || hop == 0 {
        return Vec::new();
    }
    let padded = center_pad(samples, frame_length);

    frame_starts(padded.len(), frame_length, hop)
        .map(|start| {
            let frame = &padded[start..start + frame_length];
            let crossings = frame
                .windows(2)
                .filter(|w| w[0].is_sign_negative() != w[1].is_sign_negative())
                .count();
            crossings as f64 / frame_length as f64
        })
        .collect()
}

fn hann(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos())
        .collect()
}

/// Spectral flatness per frame of the power spectrum
///
/// Ratio of geometric to arithmetic mean; 1.0 is white noise, near 0.0 is tonal.
pub fn spectral_flatness(samples: &[f32], n_fft: usize, hop: usize) -> Vec<f64> {
    if samples.is_empty() || n_fft == 0 || hop == 0 {
        return Vec::new();
    }

    let pad = n_fft / 2;
    let mut padded = vec![0.0f32; pad];
    padded.extend_from_slice(samples);
    padded.extend(std::iter::repeat(0.0).take(pad));

    let window = hann(n_fft);
    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(n_fft);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); n_fft];

    frame_starts(padded.len(), n_fft, hop)
        .map(|start| {
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = Complex::new(padded[start + i] * window[i], 0.0);
            }
            fft.process(&mut buffer);

            let bins = &buffer[..=n_fft / 2];
            let power: Vec<f32> = bins.iter().map(|c| (c.norm_sqr()).max(AMIN)).collect();
            let log_mean = power.iter().map(|p| (*p as f64).ln()).sum::<f64>() / power.len() as f64;
            let arith_mean = power.iter().map(|p| *p as f64).sum::<f64>() / power.len() as f64;
            log_mean.exp() / arith_mean
        })
        .collect()
}
