//! Example: split a WAV recording into vocals and accompaniment
//!
//! Usage: cargo run --example separate_wav -- input.wav [output_dir]

use vocal_splitter_core::{separate, SeparateOptions, SeparateProgress};

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args.next().unwrap_or_else(|| "input.wav".into());
    let out = args.next().unwrap_or_else(|| ".".into());

    vocal_splitter_core::set_separate_progress_callback(|p| match p {
        SeparateProgress::Stage(s) => {
            eprintln!("> {}", s);
        }
        SeparateProgress::Frames {
            done,
            total,
            percent,
        } => {
            eprint!("\rFilter: {}/{} ({:.0}%)", done, total, percent);
            if done >= total {
                eprintln!();
            }
        }
        SeparateProgress::Finished => {
            eprintln!("Finished.");
        }
    });

    let (samples, sample_rate) = read_mono_wav(&input)?;
    eprintln!("Loaded {} samples at {} Hz", samples.len(), sample_rate);

    let result = separate(&samples, sample_rate, SeparateOptions::default())?;

    std::fs::create_dir_all(&out)?;
    let vocals_path = format!("{}/foreground_vocals.wav", out);
    let music_path = format!("{}/background_music.wav", out);
    write_mono_wav(&vocals_path, result.foreground(), sample_rate)?;
    write_mono_wav(&music_path, result.background(), sample_rate)?;

    eprintln!("\nDone:");
    eprintln!("  Vocals only: {}", vocals_path);
    eprintln!("  Instrumental: {}", music_path);

    Ok(())
}

/// Read a WAV file, down-mixing to mono and normalizing to [-1, 1].
fn read_mono_wav(path: &str) -> anyhow::Result<(Vec<f32>, u32)> {
    let mut reader = hound::WavReader::open(path)?;
    let spec = reader.spec();
    let channels = spec.channels as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    let mono = if channels <= 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok((mono, spec.sample_rate))
}

fn write_mono_wav(path: &str, samples: &[f32], sample_rate: u32) -> anyhow::Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &s in samples {
        writer.write_sample(s)?;
    }
    writer.finalize()?;
    Ok(())
}
