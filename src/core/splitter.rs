use crate::{
    core::{
        dsp::{combine, istft_mono, magphase, stft_mono_centered},
        filter::nn_filter,
        mask::build_masks,
    },
    error::{Result, SplitError},
    io::progress::{emit_separate_progress, SeparateProgress},
    types::{AudioData, SeparateOptions},
};

/// Separated foreground/background pair - the result of a separation.
///
/// Both components have the input's exact sample count and sample rate, so
/// the caller can persist them as uncompressed audio directly.
///
/// # Example
/// ```no_run
/// use vocal_splitter_core::{separate, SeparateOptions};
///
/// let samples = vec![0.0f32; 22050];
/// let result = separate(&samples, 22050, SeparateOptions::default())?;
///
/// let vocals = result.foreground();
/// let music = result.background();
/// assert_eq!(vocals.len(), music.len());
/// # Ok::<(), vocal_splitter_core::SplitError>(())
/// ```
#[derive(Clone, Debug)]
pub struct SeparatedAudio {
    foreground: Vec<f32>,
    background: Vec<f32>,
    /// Sample rate shared by both components
    pub sample_rate: u32,
    /// Number of samples per component
    pub num_samples: usize,
}

impl SeparatedAudio {
    /// Isolated foreground (vocal) samples
    pub fn foreground(&self) -> &[f32] {
        &self.foreground
    }

    /// Estimated background (instrumental) samples
    pub fn background(&self) -> &[f32] {
        &self.background
    }

    /// Foreground as an owned audio buffer
    pub fn foreground_audio(&self) -> AudioData {
        AudioData {
            samples: self.foreground.clone(),
            sample_rate: self.sample_rate,
        }
    }

    /// Background as an owned audio buffer
    pub fn background_audio(&self) -> AudioData {
        AudioData {
            samples: self.background.clone(),
            sample_rate: self.sample_rate,
        }
    }

    /// Consume the result, yielding (foreground, background)
    pub fn into_parts(self) -> (Vec<f32>, Vec<f32>) {
        (self.foreground, self.background)
    }
}

/// High-level separator over in-memory audio buffers.
///
/// # Example
/// ```no_run
/// use vocal_splitter_core::{AudioData, SeparateOptions, Separator};
///
/// let audio = AudioData { samples: vec![0.0f32; 44100], sample_rate: 44100 };
/// let result = Separator::separate(&audio, SeparateOptions::default())?;
/// let vocals = result.foreground_audio();
/// # Ok::<(), vocal_splitter_core::SplitError>(())
/// ```
pub struct Separator;

impl Separator {
    pub fn separate(audio: &AudioData, opts: SeparateOptions) -> Result<SeparatedAudio> {
        separate_internal(&audio.samples, audio.sample_rate, &opts)
    }
}

/// Separate a mono PCM buffer into foreground (vocal) and background
/// (instrumental) tracks of the same length and sample rate.
pub fn separate(
    samples: &[f32],
    sample_rate: u32,
    opts: SeparateOptions,
) -> Result<SeparatedAudio> {
    separate_internal(samples, sample_rate, &opts)
}

fn separate_internal(
    samples: &[f32],
    sample_rate: u32,
    opts: &SeparateOptions,
) -> Result<SeparatedAudio> {
    if samples.is_empty() {
        return Err(SplitError::EmptySignal);
    }

    let cfg = opts
        .resolve(sample_rate)
        .map_err(SplitError::InvalidConfig)?;
    let n = samples.len();

    if std::env::var("DEBUG_SEPARATION").is_ok() {
        eprintln!(
            "Window settings: win={}, hop={}, neighbors={}",
            cfg.window, cfg.hop, cfg.neighbors
        );
    }

    emit_separate_progress(SeparateProgress::Stage("stft"));
    let spec = stft_mono_centered(samples, cfg.window, cfg.hop);
    let (full, phase) = magphase(&spec);

    emit_separate_progress(SeparateProgress::Stage("nn_filter"));
    let filtered = nn_filter(&full, cfg.neighbors);

    emit_separate_progress(SeparateProgress::Stage("mask"));
    let (mask_fg, mask_bg) = build_masks(
        &full,
        &filtered,
        cfg.margin_background,
        cfg.margin_foreground,
        cfg.power,
    );

    // Both components reuse the mixture phase; only the magnitudes differ.
    emit_separate_progress(SeparateProgress::Stage("istft"));
    let fg_spec = combine(&(&mask_fg * &full), &phase);
    let bg_spec = combine(&(&mask_bg * &full), &phase);

    let (foreground, background) = rayon::join(
        || istft_mono(&fg_spec, cfg.window, cfg.hop, n),
        || istft_mono(&bg_spec, cfg.window, cfg.hop, n),
    );

    check_finite("foreground", &foreground)?;
    check_finite("background", &background)?;

    if std::env::var("DEBUG_SEPARATION").is_ok() {
        let peak = |s: &[f32]| s.iter().map(|x| x.abs()).fold(0.0f32, f32::max);
        eprintln!(
            "Separated peaks: foreground={:.6}, background={:.6}",
            peak(&foreground),
            peak(&background)
        );
    }

    emit_separate_progress(SeparateProgress::Finished);

    Ok(SeparatedAudio {
        foreground,
        background,
        sample_rate,
        num_samples: n,
    })
}

fn check_finite(component: &'static str, samples: &[f32]) -> Result<()> {
    if samples.iter().any(|s| !s.is_finite()) {
        return Err(SplitError::NumericInstability { component });
    }
    Ok(())
}
