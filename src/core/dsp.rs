//! Short-time transform plumbing for the separator.
//!
//! Analysis and synthesis both use a Hann window at the configured hop; at the
//! default 75% overlap the overlap-add weights sum to a constant, so
//! `istft_mono(stft_mono_centered(x))` reconstructs `x` within float
//! tolerance. Frames are centered: the signal is padded by half a window on
//! the left and out to a whole frame on the right, and the inverse trims the
//! padding back off.

use ndarray::Array2;
use num_complex::Complex32;
use rustfft::FftPlanner;

/// Positive-frequency bin count for a real input of `window` samples.
pub fn num_bins(window: usize) -> usize {
    window / 2 + 1
}

/// Centered frame count for `len` samples at `hop` spacing.
pub fn num_frames(len: usize, hop: usize) -> usize {
    len.div_ceil(hop) + 1
}

pub fn hann(size: usize) -> Vec<f32> {
    use std::f32::consts::PI;
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / size as f32).cos()))
        .collect()
}

/// Forward transform of a mono signal into a (bins, frames) complex matrix.
///
/// Signals shorter than one window are zero-padded, never rejected.
pub fn stft_mono_centered(samples: &[f32], window: usize, hop: usize) -> Array2<Complex32> {
    let bins = num_bins(window);
    let frames = num_frames(samples.len(), hop);
    let pad_left = window / 2;

    let padded_len = (frames - 1) * hop + window;
    let mut padded = vec![0.0f32; padded_len];
    padded[pad_left..pad_left + samples.len()].copy_from_slice(samples);

    let mut planner = FftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(window);
    let win = hann(window);

    let mut spec = Array2::<Complex32>::zeros((bins, frames));
    let mut buffer = vec![Complex32::new(0.0, 0.0); window];
    for t in 0..frames {
        let start = t * hop;
        for (i, &w) in win.iter().enumerate() {
            buffer[i] = Complex32::new(padded[start + i] * w, 0.0);
        }
        fft.process(&mut buffer);

        // Real input: keep DC through Nyquist, drop the mirrored half.
        for f in 0..bins {
            spec[(f, t)] = buffer[f];
        }
    }

    spec
}

/// Inverse transform via windowed overlap-add, normalized by the accumulated
/// window energy. Returns exactly `len` samples with the centering pad
/// trimmed off.
pub fn istft_mono(spec: &Array2<Complex32>, window: usize, hop: usize, len: usize) -> Vec<f32> {
    let bins = spec.nrows();
    let frames = spec.ncols();
    if frames == 0 {
        return vec![0.0; len];
    }

    let padded_len = (frames - 1) * hop + window;
    let mut out = vec![0.0f32; padded_len];
    let mut wsum = vec![0.0f32; padded_len];

    let mut planner = FftPlanner::<f32>::new();
    let ifft = planner.plan_fft_inverse(window);
    let win = hann(window);
    let scale = 1.0 / window as f32;

    let mut buffer = vec![Complex32::new(0.0, 0.0); window];
    for t in 0..frames {
        let start = t * hop;

        for f in 0..bins {
            buffer[f] = spec[(f, t)];
        }
        // Rebuild the conjugate-symmetric half before inverting.
        for f in 1..bins {
            let m = window - f;
            if m >= bins {
                buffer[m] = spec[(f, t)].conj();
            }
        }
        ifft.process(&mut buffer);

        for (i, &w) in win.iter().enumerate() {
            out[start + i] += buffer[i].re * scale * w;
            wsum[start + i] += w * w;
        }
    }

    for (s, &w) in out.iter_mut().zip(wsum.iter()) {
        if w > 1e-8 {
            *s /= w;
        }
    }

    let pad_left = window / 2;
    out.into_iter().skip(pad_left).take(len).collect()
}

/// Split a complex spectrogram into magnitude and unit-modulus phase.
///
/// Cells with zero magnitude get phase 1 so the phase matrix stays
/// unit-modulus everywhere.
pub fn magphase(spec: &Array2<Complex32>) -> (Array2<f32>, Array2<Complex32>) {
    let mag = spec.mapv(|c| c.norm());
    let phase = spec.mapv(|c| {
        let m = c.norm();
        if m > 0.0 {
            c / m
        } else {
            Complex32::new(1.0, 0.0)
        }
    });
    (mag, phase)
}

/// Reattach phase to a (possibly masked) magnitude matrix.
pub fn combine(mag: &Array2<f32>, phase: &Array2<Complex32>) -> Array2<Complex32> {
    let mut out = phase.clone();
    out.zip_mut_with(mag, |p, &m| *p = *p * m);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn sine(freq: f32, sample_rate: u32, len: usize) -> Vec<f32> {
        use std::f32::consts::TAU;
        (0..len)
            .map(|i| (TAU * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    #[test]
    fn hann_shape() {
        let w = hann(8);
        assert_eq!(w.len(), 8);
        assert!(w[0] < 1e-6);
        assert_abs_diff_eq!(w[4], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn spectrogram_shape() {
        let spec = stft_mono_centered(&vec![0.0; 1000], 256, 64);
        assert_eq!(spec.nrows(), 129);
        // ceil(1000 / 64) + 1
        assert_eq!(spec.ncols(), 17);
    }

    #[test]
    fn round_trip_sine() {
        let x = sine(440.0, 22050, 4096);
        let spec = stft_mono_centered(&x, 512, 128);
        let y = istft_mono(&spec, 512, 128, x.len());
        assert_eq!(y.len(), x.len());
        for (a, b) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-4);
        }
    }

    #[test]
    fn round_trip_shorter_than_window() {
        let x = sine(300.0, 22050, 100);
        let spec = stft_mono_centered(&x, 512, 128);
        let y = istft_mono(&spec, 512, 128, x.len());
        assert_eq!(y.len(), 100);
        for (a, b) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-3);
        }
    }

    #[test]
    fn magphase_is_unit_modulus_and_recombines() {
        let x = sine(220.0, 22050, 2048);
        let spec = stft_mono_centered(&x, 512, 128);
        let (mag, phase) = magphase(&spec);

        for p in phase.iter() {
            assert_abs_diff_eq!(p.norm(), 1.0, epsilon = 1e-5);
        }
        for m in mag.iter() {
            assert!(*m >= 0.0);
        }

        let back = combine(&mag, &phase);
        for (a, b) in spec.iter().zip(back.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-4);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-4);
        }
    }

    #[test]
    fn zero_magnitude_gets_unit_phase() {
        let spec = Array2::<Complex32>::zeros((3, 2));
        let (mag, phase) = magphase(&spec);
        assert!(mag.iter().all(|&m| m == 0.0));
        assert!(phase.iter().all(|p| (p - Complex32::new(1.0, 0.0)).norm() < 1e-9));
    }
}
