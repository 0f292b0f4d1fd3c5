//! Repeating-pattern background estimation via nearest-neighbor filtering.
//!
//! Accompaniment tends to repeat somewhere in the track while a lead vocal
//! does not. Each magnitude frame is scored against every other frame with
//! cosine similarity, its k most similar frames are gathered from anywhere in
//! the recording, and the per-bin median of those frames stands in as the
//! background estimate. The median keeps repeating structure and rejects
//! one-off content that a mean would smear across the estimate.

use crate::io::progress::{emit_separate_progress, SeparateProgress};
use ndarray::{Array2, Axis};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Estimate the repeating (background) component of a magnitude spectrogram.
///
/// `neighbors` is the requested neighbor count per frame; it is clamped to the
/// number of other frames available. The estimate is clamped per-cell to the
/// input magnitude: the filter models a component of the mixture and can never
/// contain more energy than the mixture itself.
///
/// Queries run row-by-row, so the full frame-by-frame similarity matrix is
/// never held in memory.
pub fn nn_filter(mag: &Array2<f32>, neighbors: usize) -> Array2<f32> {
    let bins = mag.nrows();
    let frames = mag.ncols();

    if frames < 2 {
        // A lone frame has nothing to repeat against: all energy is treated
        // as foreground.
        return Array2::zeros((bins, frames));
    }

    let k = neighbors.clamp(1, frames - 1);

    // Contiguous copies of the magnitude columns. The similarity scan is the
    // dominant cost of the whole pipeline and strided column views would slow
    // it down badly.
    let cols: Vec<Vec<f32>> = mag.axis_iter(Axis(1)).map(|c| c.to_vec()).collect();
    let norms: Vec<f32> = cols
        .iter()
        .map(|c| c.iter().map(|v| v * v).sum::<f32>().sqrt())
        .collect();

    let done = AtomicUsize::new(0);

    let filtered: Vec<Vec<f32>> = (0..frames)
        .into_par_iter()
        .map(|t| {
            // Cosine similarity of frame t against every other frame. Silent
            // frames (zero norm) score 0 against everything.
            let mut sims = vec![0.0f32; frames];
            if norms[t] > 0.0 {
                for j in 0..frames {
                    if j != t && norms[j] > 0.0 {
                        let dot: f32 = cols[t]
                            .iter()
                            .zip(cols[j].iter())
                            .map(|(a, b)| a * b)
                            .sum();
                        sims[j] = dot / (norms[t] * norms[j]);
                    }
                }
            }

            // Top-k neighbor selection over all frames, self excluded.
            let mut order: Vec<usize> = (0..frames).filter(|&j| j != t).collect();
            order.select_nth_unstable_by(k - 1, |&a, &b| {
                sims[b]
                    .partial_cmp(&sims[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });
            let picked = &order[..k];

            let mut estimate = vec![0.0f32; bins];
            let mut scratch = vec![0.0f32; k];
            for (f, e) in estimate.iter_mut().enumerate() {
                for (s, &j) in scratch.iter_mut().zip(picked.iter()) {
                    *s = cols[j][f];
                }
                *e = median_in_place(&mut scratch).min(cols[t][f]);
            }

            let count = done.fetch_add(1, Ordering::Relaxed) + 1;
            if count % 64 == 0 || count == frames {
                emit_separate_progress(SeparateProgress::Frames {
                    done: count,
                    total: frames,
                    percent: count as f32 / frames as f32 * 100.0,
                });
            }

            estimate
        })
        .collect();

    let mut out = Array2::<f32>::zeros((bins, frames));
    for (t, col) in filtered.iter().enumerate() {
        for (f, &v) in col.iter().enumerate() {
            out[(f, t)] = v;
        }
    }
    out
}

fn median_in_place(values: &mut [f32]) -> f32 {
    let mid = values.len() / 2;
    let (_, &mut upper, _) = values.select_nth_unstable_by(mid, |a, b| {
        a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
    });
    if values.len() % 2 == 1 {
        upper
    } else {
        let lower = values[..mid]
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        0.5 * (lower + upper)
    }
}
