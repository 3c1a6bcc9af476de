//! Preview playback state machine and clip length measurement.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::sound::SoundRegistry;

/// How far into a file we look for the WAV `fmt ` and `data` chunks.
const HEADER_PROBE_BYTES: u64 = 4096;

/// Observable playback state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
}

/// Stopped, or playing a clip of known length since `started`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Playback {
    #[default]
    Stopped,
    Playing { started: Instant, length: Duration },
}

impl Playback {
    pub fn state(&self) -> PlaybackState {
        match self {
            Playback::Stopped => PlaybackState::Stopped,
            Playback::Playing { .. } => PlaybackState::Playing,
        }
    }

    /// User toggle. Stopping resets the position; starting measures the clip
    /// lazily so a stop never touches the sound source.
    pub fn toggle(&mut self, now: Instant, length: impl FnOnce() -> Duration) -> PlaybackState {
        *self = match *self {
            Playback::Stopped => Playback::Playing {
                started: now,
                length: length(),
            },
            Playback::Playing { .. } => Playback::Stopped,
        };
        self.state()
    }

    /// Stop and rewind.
    pub fn finish(&mut self) {
        *self = Playback::Stopped;
    }

    /// Move to Stopped once the clip has run out. Returns whether it did.
    pub fn poll_end(&mut self, now: Instant) -> bool {
        match *self {
            Playback::Playing { started, length } if now.duration_since(started) >= length => {
                self.finish();
                true
            }
            _ => false,
        }
    }

    /// Elapsed position and total length while playing.
    pub fn progress(&self, now: Instant) -> Option<(Duration, Duration)> {
        match *self {
            Playback::Playing { started, length } => {
                Some((now.duration_since(started).min(length), length))
            }
            Playback::Stopped => None,
        }
    }
}

/// Length of the clip behind `url`, if it is a WAV we can measure.
pub fn clip_length(url: &str, sounds: &SoundRegistry) -> Option<Duration> {
    if let Some(rest) = url.strip_prefix("data:") {
        let (header, payload) = rest.split_once(',')?;
        if !header.ends_with(";base64") {
            return None;
        }
        let bytes = STANDARD.decode(payload).ok()?;
        return wav_length(&bytes);
    }
    let path = sounds.resolve(url)?;
    wav_file_length(&path)
}

fn wav_file_length(path: &Path) -> Option<Duration> {
    let mut header = Vec::new();
    File::open(path)
        .ok()?
        .take(HEADER_PROBE_BYTES)
        .read_to_end(&mut header)
        .ok()?;
    wav_length(&header)
}

/// Duration declared by a RIFF/WAVE header: `data` size over `fmt ` byte rate.
pub fn wav_length(bytes: &[u8]) -> Option<Duration> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return None;
    }

    let mut byte_rate = None;
    let mut cursor = 12;
    while cursor + 8 <= bytes.len() {
        let id = &bytes[cursor..cursor + 4];
        let size = read_u32(bytes, cursor + 4)? as usize;
        let body = cursor + 8;
        match id {
            b"fmt " => byte_rate = Some(read_u32(bytes, body + 8)?),
            b"data" => {
                let rate = u64::from(byte_rate.filter(|rate| *rate > 0)?);
                let nanos = size as u64 * 1_000_000_000 / rate;
                return Some(Duration::from_nanos(nanos));
            }
            _ => {}
        }
        // Chunks are word aligned.
        cursor = body + size + (size & 1);
    }
    None
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designer::BUILTIN_SOUNDS;
    use std::fs;
    use tempfile::tempdir;

    fn wav(sample_rate: u32, data_len: u32) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.extend(std::iter::repeat(0x80).take(data_len as usize));
        out
    }

    #[test]
    fn toggle_alternates_between_states() {
        let now = Instant::now();
        let mut playback = Playback::default();
        assert_eq!(playback.state(), PlaybackState::Stopped);

        let state = playback.toggle(now, || Duration::from_secs(2));
        assert_eq!(state, PlaybackState::Playing);
        assert_eq!(playback.toggle(now, || unreachable!()), PlaybackState::Stopped);
        assert_eq!(playback.progress(now), None);
    }

    #[test]
    fn natural_end_stops_playback() {
        let start = Instant::now();
        let mut playback = Playback::default();
        playback.toggle(start, || Duration::from_millis(500));

        assert!(!playback.poll_end(start + Duration::from_millis(499)));
        assert_eq!(playback.state(), PlaybackState::Playing);
        assert!(playback.poll_end(start + Duration::from_millis(500)));
        assert_eq!(playback.state(), PlaybackState::Stopped);
        assert!(!playback.poll_end(start + Duration::from_secs(5)));
    }

    #[test]
    fn progress_is_clamped_to_length() {
        let start = Instant::now();
        let mut playback = Playback::default();
        playback.toggle(start, || Duration::from_secs(1));
        assert_eq!(
            playback.progress(start + Duration::from_secs(3)),
            Some((Duration::from_secs(1), Duration::from_secs(1)))
        );
    }

    #[test]
    fn builtin_sounds_last_one_millisecond() {
        let sounds = SoundRegistry::new();
        for sound in BUILTIN_SOUNDS {
            assert_eq!(
                clip_length(sound.url, &sounds),
                Some(Duration::from_millis(1)),
                "{}",
                sound.name
            );
        }
    }

    #[test]
    fn measures_uploaded_wav_through_registry() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("applause.wav");
        fs::write(&file, wav(8000, 4000)).unwrap();

        let sounds = SoundRegistry::new();
        let handle = sounds.acquire(&file).unwrap();
        assert_eq!(
            clip_length(handle.url(), &sounds),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn skips_unknown_chunks_before_data() {
        let mut bytes = wav(1000, 10);
        let data_at = bytes.windows(4).position(|w| w == b"data").unwrap();
        let tail = bytes.split_off(data_at);
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(b"abc\0");
        bytes.extend(tail);
        assert_eq!(wav_length(&bytes), Some(Duration::from_millis(10)));
    }

    #[test]
    fn unmeasurable_sources_yield_none() {
        let sounds = SoundRegistry::new();
        assert_eq!(clip_length("https://example.com/song.mp3", &sounds), None);
        assert_eq!(clip_length("blob:invitation-dashboard/99", &sounds), None);
        assert_eq!(clip_length("data:audio/wav;base64,!!!", &sounds), None);
        assert_eq!(wav_length(b"RIFF\0\0\0\0WAVE"), None);
        assert_eq!(wav_length(b"ID3 not a wave file"), None);
    }
}
