use serde::{Deserialize, Serialize};

/// Mono PCM buffer, samples normalized to [-1, 1].
#[derive(Clone, Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Tuning knobs for the separation pipeline.
///
/// Every field has a usable default. `window_size` and `hop_size` left unset
/// are derived from the input sample rate: a window covering about 46 ms of
/// audio rounded to the nearest power of two, and a hop of `window / 4`
/// (75% overlap).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeparateOptions {
    /// Analysis window length in samples.
    #[serde(default)]
    pub window_size: Option<usize>,
    /// Hop between consecutive frames in samples.
    #[serde(default)]
    pub hop_size: Option<usize>,
    /// Span of audio, in seconds, whose frame count sets how many neighbor
    /// frames are aggregated per query frame during background estimation.
    pub similarity_window_secs: f32,
    /// Margin weighting the leftover foreground when masking the background.
    pub margin_background: f32,
    /// Margin weighting the background estimate when masking the foreground.
    /// Larger values bleed less accompaniment into the vocal track.
    pub margin_foreground: f32,
    /// Exponent of the soft mask ratio.
    pub power: f32,
}

impl Default for SeparateOptions {
    fn default() -> Self {
        Self {
            window_size: None,
            hop_size: None,
            similarity_window_secs: 2.0,
            margin_background: 2.0,
            margin_foreground: 10.0,
            power: 2.0,
        }
    }
}

/// Options resolved and validated against a concrete sample rate.
#[derive(Clone, Copy, Debug)]
pub struct SeparateConfig {
    pub window: usize,
    pub hop: usize,
    /// Neighbor frames aggregated per query frame.
    pub neighbors: usize,
    pub margin_background: f32,
    pub margin_foreground: f32,
    pub power: f32,
}

impl SeparateOptions {
    pub fn resolve(&self, sample_rate: u32) -> Result<SeparateConfig, String> {
        if sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }

        let window = self
            .window_size
            .unwrap_or_else(|| default_window(sample_rate));
        let hop = self.hop_size.unwrap_or(window / 4);

        if window == 0 {
            return Err("window size must be positive".into());
        }
        if hop == 0 {
            return Err("hop size must be positive".into());
        }
        if hop > window {
            return Err(format!("hop size {hop} exceeds window size {window}"));
        }
        if !self.similarity_window_secs.is_finite() || self.similarity_window_secs <= 0.0 {
            return Err("similarity window must be positive and finite".into());
        }
        if !self.margin_background.is_finite() || self.margin_background < 0.0 {
            return Err("background margin must be non-negative and finite".into());
        }
        if !self.margin_foreground.is_finite() || self.margin_foreground < 0.0 {
            return Err("foreground margin must be non-negative and finite".into());
        }
        if !self.power.is_finite() || self.power <= 0.0 {
            return Err("power must be positive and finite".into());
        }

        let neighbors = (self.similarity_window_secs * sample_rate as f32 / hop as f32)
            .round()
            .max(1.0) as usize;

        Ok(SeparateConfig {
            window,
            hop,
            neighbors,
            margin_background: self.margin_background,
            margin_foreground: self.margin_foreground,
            power: self.power,
        })
    }
}

/// Nearest power of two to ~46 ms of audio at the given rate.
fn default_window(sample_rate: u32) -> usize {
    let target = (0.046 * sample_rate as f64) as usize;
    let above = target.next_power_of_two().max(2);
    let below = above / 2;
    if target.saturating_sub(below) <= above - target {
        below
    } else {
        above
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_tracks_sample_rate() {
        assert_eq!(default_window(22050), 1024);
        assert_eq!(default_window(44100), 2048);
        assert_eq!(default_window(48000), 2048);
    }

    #[test]
    fn defaults_resolve() {
        let cfg = SeparateOptions::default().resolve(22050).unwrap();
        assert_eq!(cfg.window, 1024);
        assert_eq!(cfg.hop, 256);
        // ~2 seconds of context at hop 256
        assert_eq!(cfg.neighbors, 172);
    }

    #[test]
    fn hop_may_not_exceed_window() {
        let opts = SeparateOptions {
            window_size: Some(512),
            hop_size: Some(1024),
            ..Default::default()
        };
        assert!(opts.resolve(44100).is_err());
    }

    #[test]
    fn zero_sized_transform_is_rejected() {
        let opts = SeparateOptions {
            window_size: Some(0),
            ..Default::default()
        };
        assert!(opts.resolve(44100).is_err());

        let opts = SeparateOptions {
            window_size: Some(512),
            hop_size: Some(0),
            ..Default::default()
        };
        assert!(opts.resolve(44100).is_err());
    }

    #[test]
    fn bad_mask_parameters_are_rejected() {
        let opts = SeparateOptions {
            power: 0.0,
            ..Default::default()
        };
        assert!(opts.resolve(44100).is_err());

        let opts = SeparateOptions {
            margin_foreground: f32::NAN,
            ..Default::default()
        };
        assert!(opts.resolve(44100).is_err());
    }
}
