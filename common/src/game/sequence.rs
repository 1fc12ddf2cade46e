//! The color sequence shown to the player.
//!
//! In pass-and-play every player faces the same challenge: the buffer keeps
//! the longest sequence generated so far (the "master" sequence) and a new
//! turn replays it from the first step, only drawing fresh colors once a
//! player gets past the master length.

use heapless::Vec;

use crate::colors::Color;
use crate::config::MAX_SEQUENCE_LENGTH;
use crate::rng::Rng;

#[derive(Clone, Debug, Default)]
pub struct Sequence {
    /// Master sequence; the first `len` colors are in play.
    colors: Vec<Color, MAX_SEQUENCE_LENGTH>,
    len: usize,
}

impl Sequence {
    pub const fn new() -> Self {
        Self {
            colors: Vec::new(),
            len: 0,
        }
    }

    /// Forget everything, master sequence included.
    pub fn clear(&mut self) {
        self.colors.clear();
        self.len = 0;
    }

    /// Grow the sequence by one step, up to `max_len` (and never past the buffer).
    ///
    /// With `reuse` set the master color at the new position is kept if there
    /// is one; otherwise a new random color is drawn. Returns `false` if the
    /// sequence is already at its limit.
    pub fn extend(
        &mut self,
        rng: &mut Rng,
        max_len: usize,
        reuse: bool,
    ) -> bool {
        if self.len >= max_len.min(MAX_SEQUENCE_LENGTH) {
            return false;
        }

        if reuse && self.len < self.colors.len() {
            self.len += 1;
            log::debug!("[GAME] Reusing sequence at length {} (master: {})", self.len, self.colors.len());
            return true;
        }

        self.colors.truncate(self.len);
        if self.colors.push(rng.color()).is_err() {
            return false;
        }
        self.len += 1;
        log::debug!("[GAME] Sequence extended to length {}", self.len);
        true
    }

    /// Start the next player's turn: replay the master sequence from step one.
    pub fn restart_turn(&mut self) { self.len = self.colors.len().min(1); }

    /// Whether `color` is the expected press at `step`. Steps past the end never match.
    pub fn matches(
        &self,
        step: usize,
        color: Color,
    ) -> bool {
        self.get(step) == Some(color)
    }

    pub fn get(
        &self,
        step: usize,
    ) -> Option<Color> {
        self.as_slice().get(step).copied()
    }

    /// Colors currently in play.
    pub fn as_slice(&self) -> &[Color] { &self.colors[..self.len] }

    #[inline]
    pub const fn len(&self) -> usize { self.len }

    #[inline]
    pub const fn is_empty(&self) -> bool { self.len == 0 }

    /// Longest length reached so far.
    #[inline]
    pub fn master_len(&self) -> usize { self.colors.len() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::difficulty::Difficulty;

    #[test]
    fn test_never_exceeds_difficulty_max() {
        for difficulty in Difficulty::ALL {
            let max = difficulty.settings().max_length as usize;
            let mut rng = Rng::new(99);
            let mut seq = Sequence::new();
            for _ in 0..100 {
                seq.extend(&mut rng, max, false);
                assert!(seq.len() <= max);
            }
            assert_eq!(seq.len(), max);
            assert!(!seq.extend(&mut rng, max, false));
        }
    }

    #[test]
    fn test_never_exceeds_buffer() {
        let mut rng = Rng::new(5);
        let mut seq = Sequence::new();
        for _ in 0..100 {
            seq.extend(&mut rng, usize::MAX, false);
        }
        assert_eq!(seq.len(), MAX_SEQUENCE_LENGTH);
    }

    #[test]
    fn test_extend_keeps_prefix() {
        let mut rng = Rng::new(11);
        let mut seq = Sequence::new();
        seq.extend(&mut rng, 10, false);
        seq.extend(&mut rng, 10, false);
        let before = [seq.get(0), seq.get(1)];

        seq.extend(&mut rng, 10, false);
        assert_eq!([seq.get(0), seq.get(1)], before);
        assert_eq!(seq.len(), 3);
    }

    #[test]
    fn test_reuse_below_master_length() {
        let mut rng = Rng::new(3);
        let mut seq = Sequence::new();
        for _ in 0..6 {
            seq.extend(&mut rng, 14, true);
        }
        let master: std::vec::Vec<Color> = seq.as_slice().to_vec();

        seq.restart_turn();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.master_len(), 6);

        for n in 2..=6 {
            seq.extend(&mut rng, 14, true);
            assert_eq!(seq.len(), n);
            assert_eq!(seq.as_slice(), &master[..n]);
        }

        // Past the master length a new color is drawn and the master grows
        seq.extend(&mut rng, 14, true);
        assert_eq!(seq.master_len(), 7);
        assert_eq!(&seq.as_slice()[..6], &master[..]);
    }

    #[test]
    fn test_matches() {
        let mut rng = Rng::new(8);
        let mut seq = Sequence::new();
        seq.extend(&mut rng, 5, false);
        let first = seq.get(0).unwrap();

        assert!(seq.matches(0, first));
        for other in Color::ALL.into_iter().filter(|&c| c != first) {
            assert!(!seq.matches(0, other));
        }
        for c in Color::ALL {
            assert!(!seq.matches(1, c));
        }
    }

    #[test]
    fn test_clear() {
        let mut rng = Rng::new(8);
        let mut seq = Sequence::new();
        seq.extend(&mut rng, 5, true);
        seq.clear();
        assert!(seq.is_empty());
        assert_eq!(seq.master_len(), 0);
        seq.restart_turn();
        assert!(seq.is_empty());
    }
}
