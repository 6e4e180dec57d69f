/// Sound engine: procedural beep-style sound effects via rodio.
///
/// All cues are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};
    use tracing::warn;

    use crate::sim::event::SoundCue;

    const SAMPLE_RATE: u32 = 22050;

    /// Pre-generated WAV buffers, one per cue.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_jump: Arc<Vec<u8>>,
        sfx_coin: Arc<Vec<u8>>,
        sfx_hit: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_game_over: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    warn!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_jump: Arc::new(make_wav(&samples_for(SoundCue::Jump))),
                sfx_coin: Arc::new(make_wav(&samples_for(SoundCue::Coin))),
                sfx_hit: Arc::new(make_wav(&samples_for(SoundCue::EnemyHit))),
                sfx_clear: Arc::new(make_wav(&samples_for(SoundCue::StageClear))),
                sfx_game_over: Arc::new(make_wav(&samples_for(SoundCue::GameOver))),
            })
        }

        pub fn play(&self, cue: SoundCue) {
            let buf = match cue {
                SoundCue::Jump => &self.sfx_jump,
                SoundCue::Coin => &self.sfx_coin,
                SoundCue::EnemyHit => &self.sfx_hit,
                SoundCue::StageClear => &self.sfx_clear,
                SoundCue::GameOver => &self.sfx_game_over,
            };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators: all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Tone sequence for each cue: (frequency Hz, duration s).
    pub(super) fn notes_for(cue: SoundCue) -> &'static [(f32, f32)] {
        match cue {
            SoundCue::Jump => &[(800.0, 0.05)],
            SoundCue::Coin => &[(1800.0, 0.05)],
            SoundCue::EnemyHit => &[(400.0, 0.08), (200.0, 0.1)],
            SoundCue::StageClear => &[(1000.0, 0.08), (1200.0, 0.08), (1500.0, 0.12)],
            SoundCue::GameOver => &[(400.0, 0.15), (300.0, 0.15), (200.0, 0.25)],
        }
    }

    pub(super) fn samples_for(cue: SoundCue) -> Vec<f32> {
        notes_for(cue)
            .iter()
            .flat_map(|&(freq, dur)| gen_blip(freq, dur, 0.25))
            .collect()
    }

    /// Square-ish blip (sine + 3rd harmonic) with a linear fade out.
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32);
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 3.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                wave * env * volume
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API: compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _cue: crate::sim::event::SoundCue) {}
}

#[cfg(all(test, feature = "sound"))]
mod tests {
    use super::inner::*;
    use crate::sim::event::SoundCue;

    #[test]
    fn wav_header_matches_payload() {
        let wav = make_wav(&[0.0, 0.5, -0.5]);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + 3 * 2);
        assert_eq!(u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]), 6);
    }

    #[test]
    fn sequences_follow_their_pitch_contour() {
        let freqs = |cue| notes_for(cue).iter().map(|n| n.0).collect::<Vec<_>>();
        assert_eq!(freqs(SoundCue::StageClear), vec![1000.0, 1200.0, 1500.0]);
        assert_eq!(freqs(SoundCue::GameOver), vec![400.0, 300.0, 200.0]);
        assert_eq!(freqs(SoundCue::EnemyHit), vec![400.0, 200.0]);
    }

    #[test]
    fn every_cue_has_audio() {
        for cue in [SoundCue::Jump, SoundCue::Coin, SoundCue::EnemyHit, SoundCue::StageClear, SoundCue::GameOver] {
            let s = samples_for(cue);
            assert!(!s.is_empty());
            assert!(s.iter().all(|v| v.abs() <= 1.0));
        }
    }
}
