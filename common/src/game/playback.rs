//! Deadline-driven sequence playback.
//!
//! Instead of sleeping between steps the game polls a cursor every tick.
//! Timeline for a sequence of N steps, starting when the cursor is armed:
//!
//! ```text
//! [pause][lead-in 500][tone][gap][tone][gap] ... [tone] -> finished
//! ```
//!
//! `tone` and `gap` come from the difficulty; there is no gap after the last step.

use crate::colors::Color;
use crate::config::SEQUENCE_LEAD_IN_MS;
use crate::difficulty::DifficultySettings;

use super::sequence::Sequence;

/// Whether `now` is at or past `deadline`, tolerating timer wrap-around.
#[inline]
pub(crate) const fn reached(
    now_ms: u32,
    deadline_ms: u32,
) -> bool {
    now_ms.wrapping_sub(deadline_ms) < u32::MAX / 2
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    /// Armed, sequence not announced yet.
    Announce,
    LeadIn,
    Tone,
    Gap,
    Done,
}

/// What the caller has to do after a poll.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PlaybackStep {
    /// Playback is starting: publish the sequence.
    Announce,
    /// Light the pad and start its tone.
    Show(Color),
    /// Switch the pad and its tone off.
    Hide(Color),
    /// Every step was shown.
    Finished,
}

#[derive(Clone, Copy, Debug)]
pub struct Playback {
    phase: Phase,
    step: usize,
    deadline_ms: u32,
}

impl Playback {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Done,
            step: 0,
            deadline_ms: 0,
        }
    }

    /// Arm playback: the first step lights after `pause_ms` plus the lead-in.
    pub fn start(
        &mut self,
        now_ms: u32,
        pause_ms: u32,
    ) {
        self.phase = Phase::Announce;
        self.step = 0;
        self.deadline_ms = now_ms.wrapping_add(pause_ms).wrapping_add(SEQUENCE_LEAD_IN_MS);
    }

    /// Advance the cursor. Returns `None` while waiting on a deadline.
    pub fn poll(
        &mut self,
        now_ms: u32,
        sequence: &Sequence,
        timing: &DifficultySettings,
    ) -> Option<PlaybackStep> {
        match self.phase {
            Phase::Announce => {
                self.phase = Phase::LeadIn;
                Some(PlaybackStep::Announce)
            }
            Phase::LeadIn | Phase::Gap if reached(now_ms, self.deadline_ms) => {
                if self.phase == Phase::Gap {
                    self.step += 1;
                }
                match sequence.get(self.step) {
                    Some(color) => {
                        self.phase = Phase::Tone;
                        self.deadline_ms = now_ms.wrapping_add(u32::from(timing.tone_duration_ms));
                        Some(PlaybackStep::Show(color))
                    }
                    None => {
                        self.phase = Phase::Done;
                        Some(PlaybackStep::Finished)
                    }
                }
            }
            Phase::Tone if reached(now_ms, self.deadline_ms) => {
                let color = sequence.get(self.step)?;
                if self.step + 1 < sequence.len() {
                    self.phase = Phase::Gap;
                    self.deadline_ms = now_ms.wrapping_add(u32::from(timing.sequence_speed_ms));
                } else {
                    // Last tone: finish on the next poll, without a gap
                    self.phase = Phase::Gap;
                    self.deadline_ms = now_ms;
                }
                Some(PlaybackStep::Hide(color))
            }
            _ => None,
        }
    }

    /// Index of the step being shown.
    #[inline]
    pub const fn step(&self) -> usize { self.step }

    #[inline]
    pub fn is_done(&self) -> bool { self.phase == Phase::Done }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;
    use crate::rng::Rng;

    fn sequence(len: usize) -> Sequence {
        let mut rng = Rng::new(21);
        let mut seq = Sequence::new();
        for _ in 0..len {
            seq.extend(&mut rng, 31, false);
        }
        seq
    }

    /// Poll every millisecond, collecting `(time, step)` pairs.
    fn run(
        seq: &Sequence,
        timing: &DifficultySettings,
        pause_ms: u32,
    ) -> std::vec::Vec<(u32, PlaybackStep)> {
        let mut playback = Playback::new();
        playback.start(0, pause_ms);
        let mut out = std::vec::Vec::new();
        for now in 0..60_000 {
            if let Some(step) = playback.poll(now, seq, timing) {
                out.push((now, step));
                if step == PlaybackStep::Finished {
                    break;
                }
            }
        }
        out
    }

    #[test]
    fn test_timeline() {
        let timing = Difficulty::Medium.settings();
        let seq = sequence(2);
        let steps = run(&seq, timing, 0);

        let a = seq.get(0).unwrap();
        let b = seq.get(1).unwrap();
        assert_eq!(
            steps,
            [
                (0, PlaybackStep::Announce),
                (500, PlaybackStep::Show(a)),
                (900, PlaybackStep::Hide(a)),
                (1500, PlaybackStep::Show(b)),
                (1900, PlaybackStep::Hide(b)),
                (1901, PlaybackStep::Finished),
            ]
        );
    }

    #[test]
    fn test_pause_delays_first_step() {
        let timing = Difficulty::Easy.settings();
        let seq = sequence(1);
        let steps = run(&seq, timing, 2000);
        assert_eq!(steps[1].0, 2500);
        assert_eq!(steps.last().map(|s| s.1), Some(PlaybackStep::Finished));
    }

    #[test]
    fn test_every_step_shown_in_order() {
        let timing = Difficulty::Expert.settings();
        let seq = sequence(12);
        let shown: std::vec::Vec<Color> = run(&seq, timing, 0)
            .into_iter()
            .filter_map(|(_, s)| match s {
                PlaybackStep::Show(c) => Some(c),
                _ => None,
            })
            .collect();
        assert_eq!(shown, seq.as_slice());
    }

    #[test]
    fn test_empty_sequence_finishes() {
        let timing = Difficulty::Easy.settings();
        let steps = run(&Sequence::new(), timing, 0);
        assert_eq!(steps.last().map(|s| s.1), Some(PlaybackStep::Finished));
    }

    #[test]
    fn test_reached_handles_wrap() {
        assert!(reached(10, 10));
        assert!(reached(11, 10));
        assert!(!reached(9, 10));
        assert!(reached(5, u32::MAX - 5));
        assert!(!reached(u32::MAX - 5, 5));
    }
}
