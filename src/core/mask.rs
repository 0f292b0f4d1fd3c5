//! Margin-weighted soft masks over magnitude spectrograms.
//!
//! Follows the soft-masking variant of Fitzgerald, 2012: each component mask
//! is a power-ratio of its own magnitude against a margin-scaled competitor,
//! which lands in [0, 1] per cell by construction.

use ndarray::{Array2, Zip};

/// Elementwise `target^p / (target^p + competitor^p)`.
///
/// Cells where both terms vanish get 0 rather than dividing by zero. Inputs
/// are magnitudes and treated as non-negative.
pub fn softmask(target: &Array2<f32>, competitor: &Array2<f32>, power: f32) -> Array2<f32> {
    let mut mask = Array2::<f32>::zeros(target.raw_dim());
    Zip::from(&mut mask)
        .and(target)
        .and(competitor)
        .for_each(|m, &t, &c| {
            let tp = t.abs().powf(power);
            let cp = c.abs().powf(power);
            let denom = tp + cp;
            *m = if denom > 0.0 { tp / denom } else { 0.0 };
        });
    mask
}

/// Build the (foreground, background) mask pair from the mixture magnitude
/// and its repeating-background estimate.
///
/// The margins are asymmetric on purpose: the foreground mask competes
/// against a heavily weighted background estimate so accompaniment bleed into
/// the vocal is penalized harder than the reverse.
pub fn build_masks(
    full: &Array2<f32>,
    filter: &Array2<f32>,
    margin_background: f32,
    margin_foreground: f32,
    power: f32,
) -> (Array2<f32>, Array2<f32>) {
    // filter is clamped below full cell-by-cell, so the residual is >= 0.
    let residual = full - filter;

    let background = softmask(filter, &residual.mapv(|v| v * margin_background), power);
    let foreground = softmask(&residual, &filter.mapv(|v| v * margin_foreground), power);

    (foreground, background)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    #[test]
    fn masks_stay_in_unit_interval() {
        let mut full = Array2::<f32>::zeros((8, 10));
        let mut filter = Array2::<f32>::zeros((8, 10));
        for f in 0..8 {
            for t in 0..10 {
                full[(f, t)] = ((f * 3 + t) % 7) as f32 * 0.4;
                filter[(f, t)] = full[(f, t)] * (((f + t) % 4) as f32 / 4.0);
            }
        }
        let (fg, bg) = build_masks(&full, &filter, 2.0, 10.0, 2.0);
        for m in fg.iter().chain(bg.iter()) {
            assert!((0.0..=1.0).contains(m), "mask value {m} out of range");
        }
    }

    #[test]
    fn all_zero_cells_produce_zero_masks() {
        let full = Array2::<f32>::zeros((4, 4));
        let filter = Array2::<f32>::zeros((4, 4));
        let (fg, bg) = build_masks(&full, &filter, 2.0, 10.0, 2.0);
        assert!(fg.iter().all(|&m| m == 0.0));
        assert!(bg.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn pure_background_cell_is_kept_out_of_the_foreground() {
        // filter == full: nothing left over for the vocal.
        let full = Array2::<f32>::from_elem((2, 2), 0.8);
        let filter = full.clone();
        let (fg, bg) = build_masks(&full, &filter, 2.0, 10.0, 2.0);
        for m in fg.iter() {
            assert_abs_diff_eq!(*m, 0.0, epsilon = 1e-7);
        }
        for m in bg.iter() {
            assert_abs_diff_eq!(*m, 1.0, epsilon = 1e-7);
        }
    }

    #[test]
    fn foreground_margin_suppresses_border_cells() {
        // Equal split between estimate and residual: without margins both
        // masks would sit at 0.5. The tenfold foreground margin pushes the
        // foreground mask close to zero while the background mask only drops
        // moderately.
        let full = Array2::<f32>::from_elem((1, 1), 1.0);
        let filter = Array2::<f32>::from_elem((1, 1), 0.5);
        let (fg, bg) = build_masks(&full, &filter, 2.0, 10.0, 2.0);

        // residual^2 / (residual^2 + (10 * filter)^2) = 0.25 / 25.25
        assert_abs_diff_eq!(fg[(0, 0)], 0.25 / 25.25, epsilon = 1e-6);
        // filter^2 / (filter^2 + (2 * residual)^2) = 0.25 / 1.25
        assert_abs_diff_eq!(bg[(0, 0)], 0.2, epsilon = 1e-6);
        assert!(bg[(0, 0)] > fg[(0, 0)]);
    }

    #[test]
    fn softmask_with_no_competitor_passes_through() {
        let target = Array2::<f32>::from_elem((3, 3), 0.7);
        let competitor = Array2::<f32>::zeros((3, 3));
        let mask = softmask(&target, &competitor, 2.0);
        for m in mask.iter() {
            assert_abs_diff_eq!(*m, 1.0, epsilon = 1e-7);
        }
    }
}
