//! Example: separate a synthetic mixture built in memory
//!
//! A repeating chord progression stands in for the accompaniment and a sparse
//! melody for the vocal. No files are involved; the example reports how the
//! mixture energy lands in each separated component.
//!
//! Usage: cargo run --example synthetic_mix

use std::f32::consts::TAU;
use vocal_splitter_core::{separate, SeparateOptions};

const SR: u32 = 22050;

fn main() -> anyhow::Result<()> {
    let duration = 4.0;

    // Background: three chords, each repeating every second
    let c_major = chord(&[261.63, 329.63, 392.00], duration);
    let f_major = chord(&[349.23, 440.00, 523.25], duration);
    let g_major = chord(&[392.00, 493.88, 587.33], duration);
    let background: Vec<f32> = c_major
        .iter()
        .zip(f_major.iter())
        .zip(g_major.iter())
        .map(|((c, f), g)| (c + f + g) / 3.0 * 0.5)
        .collect();

    // Foreground: a sparse melody, one note per half second
    let melody = [
        (523.25, 0.0),
        (587.33, 0.5),
        (523.25, 1.0),
        (659.25, 1.5),
        (587.33, 2.0),
        (523.25, 2.5),
        (493.88, 3.0),
        (523.25, 3.5),
    ];
    let mut foreground = vec![0.0f32; (duration * SR as f32) as usize];
    for &(freq, start) in &melody {
        let start_sample = (start * SR as f32) as usize;
        for (i, s) in tone(freq, 0.4).iter().enumerate() {
            if start_sample + i < foreground.len() {
                foreground[start_sample + i] += s * 0.8;
            }
        }
    }

    let mixture: Vec<f32> = background
        .iter()
        .zip(foreground.iter())
        .map(|(b, f)| b + f)
        .collect();

    let result = separate(&mixture, SR, SeparateOptions::default())?;

    let mix_energy = energy(&mixture);
    let fg_energy = energy(result.foreground());
    let bg_energy = energy(result.background());

    eprintln!("Energy split:");
    eprintln!("  Mixture:    {:.4}", mix_energy);
    eprintln!(
        "  Foreground: {:.4} ({:.1}%)",
        fg_energy,
        fg_energy / mix_energy * 100.0
    );
    eprintln!(
        "  Background: {:.4} ({:.1}%)",
        bg_energy,
        bg_energy / mix_energy * 100.0
    );

    Ok(())
}

fn tone(freq: f32, duration: f32) -> Vec<f32> {
    (0..(duration * SR as f32) as usize)
        .map(|i| (TAU * freq * i as f32 / SR as f32).sin())
        .collect()
}

fn chord(frequencies: &[f32], duration: f32) -> Vec<f32> {
    let mut out = vec![0.0f32; (duration * SR as f32) as usize];
    for &freq in frequencies {
        for (o, s) in out.iter_mut().zip(tone(freq, duration).iter()) {
            *o += s / frequencies.len() as f32;
        }
    }
    out
}

fn energy(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s * s).sum()
}
