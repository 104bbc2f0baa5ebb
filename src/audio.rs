use crate::cues::CueTable;
use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Basic facts about the narration track cues were authored against
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioInfo {
    pub duration: f64,
    pub sample_rate: u32,
    pub channels: u32,
}

/// Probes audio files for their length
pub struct AudioDecoder;

impl AudioDecoder {
    /// Read the duration of an audio file. Uses the container's frame count
    /// when present, otherwise decodes every packet and counts frames.
    pub fn probe(path: &Path) -> Result<AudioInfo> {
        let src = File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
        let mss = MediaSourceStream::new(Box::new(src), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let meta_opts: MetadataOptions = Default::default();
        let fmt_opts: FormatOptions = Default::default();

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &fmt_opts, &meta_opts)
            .context("Unsupported audio format")?;

        let mut format = probed.format;
        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .context("No supported audio track found")?;

        let track_id = track.id;
        let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u32)
            .unwrap_or(1);

        let frames = match track.codec_params.n_frames {
            Some(n) => n,
            None => {
                let dec_opts: DecoderOptions = Default::default();
                let mut decoder = symphonia::default::get_codecs()
                    .make(&track.codec_params, &dec_opts)
                    .context("Unsupported codec")?;

                let mut counted = 0u64;
                while let Ok(packet) = format.next_packet() {
                    if packet.track_id() != track_id {
                        continue;
                    }
                    match decoder.decode(&packet) {
                        Ok(decoded) => counted += decoded.frames() as u64,
                        Err(e) => {
                            tracing::warn!(error = %e, "error decoding packet");
                            break;
                        }
                    }
                }
                counted
            }
        };

        Ok(AudioInfo {
            duration: frames as f64 / sample_rate as f64,
            sample_rate,
            channels,
        })
    }

    /// Cues that fall after the end of the track, with their timestamps
    pub fn cues_past_end(cues: &CueTable, info: &AudioInfo) -> Vec<(String, f64)> {
        cues.iter()
            .filter(|(_, t)| *t > info.duration)
            .map(|(name, t)| (name.to_string(), t))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_wav(path: &Path, seconds: f32, sample_rate: u32) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        let total = (seconds * sample_rate as f32) as u32;
        for i in 0..total {
            let t = i as f32 / sample_rate as f32;
            let sample = (t * 440.0 * std::f32::consts::TAU).sin() * 0.2;
            writer.write_sample((sample * i16::MAX as f32) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_probe_wav_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voiceover.wav");
        write_wav(&path, 1.5, 8000);

        let info = AudioDecoder::probe(&path).unwrap();
        assert_eq!(info.sample_rate, 8000);
        assert_eq!(info.channels, 1);
        assert!((info.duration - 1.5).abs() < 0.01);
    }

    #[test]
    fn test_cues_past_end() {
        let info = AudioInfo {
            duration: 5.0,
            sample_rate: 44100,
            channels: 2,
        };
        let cues = CueTable::new()
            .with("componentsStart", 2.0)
            .and_then(|c| c.with("outro", 7.5))
            .unwrap();
        assert_eq!(
            AudioDecoder::cues_past_end(&cues, &info),
            vec![("outro".to_string(), 7.5)]
        );
    }

    #[test]
    fn test_probe_missing_file() {
        let err = AudioDecoder::probe(Path::new("/nonexistent/voiceover.mp3")).unwrap_err();
        assert!(err.to_string().contains("Failed to open audio file"));
    }
}
