use std::f32::consts::TAU;
use std::time::Duration;

pub const SAMPLE_RATE: u32 = 44_100;

/// Fade applied at both ends of every note so notes start and stop without a pop.
const FADE_SAMPLES: u32 = 220;
const AMPLITUDE: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Note {
    pub frequency_hz: f32,
    pub duration_ms: u32,
}

impl Note {
    pub const fn new(frequency_hz: f32, duration_ms: u32) -> Self {
        Self {
            frequency_hz,
            duration_ms,
        }
    }

    fn samples(&self) -> u32 {
        SAMPLE_RATE * self.duration_ms / 1000
    }
}

/// Mono sine-wave sequence rendered on the fly.
pub struct Chime {
    notes: &'static [Note],
    note_index: usize,
    sample_in_note: u32,
}

impl Chime {
    pub fn new(notes: &'static [Note]) -> Self {
        Self {
            notes,
            note_index: 0,
            sample_in_note: 0,
        }
    }

    pub fn duration(&self) -> Duration {
        let total_ms: u32 = self.notes.iter().map(|note| note.duration_ms).sum();
        Duration::from_millis(u64::from(total_ms))
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let note = self.notes.get(self.note_index)?;
            let len = note.samples();
            if self.sample_in_note >= len {
                self.note_index += 1;
                self.sample_in_note = 0;
                continue;
            }

            let n = self.sample_in_note;
            self.sample_in_note += 1;

            let t = n as f32 / SAMPLE_RATE as f32;
            let edge = n.min(len - 1 - n);
            let envelope = (edge as f32 / FADE_SAMPLES as f32).min(1.0);
            return Some((TAU * note.frequency_hz * t).sin() * AMPLITUDE * envelope);
        }
    }
}

#[cfg(feature = "audio")]
impl rodio::Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(self.duration())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TWO_NOTES: [Note; 2] = [Note::new(440.0, 10), Note::new(880.0, 20)];

    #[test]
    fn test_sample_count_matches_duration() {
        let chime = Chime::new(&TWO_NOTES);
        assert_eq!(chime.duration(), Duration::from_millis(30));
        assert_eq!(chime.count(), 441 + 882);
    }

    #[test]
    fn test_samples_stay_in_range_and_fade() {
        let samples: Vec<f32> = Chime::new(&TWO_NOTES).collect();
        assert!(samples.iter().all(|s| s.abs() <= AMPLITUDE));
        assert_eq!(samples[0], 0.0);
        assert!(samples.last().unwrap().abs() < 1e-3);
    }
}
