//! Piezo speaker on PWM slice 7, channel A.

use embassy_rp::pwm::{Config, Pwm};
use embassy_time::{Duration, block_for};
use simon_common::hal::{Melody, ToneOutput};
use simon_common::settings::MAX_VOLUME;
use simon_pico2::board::{SPEAKER_PWM_DIVIDER, SYS_CLOCK_HZ};
use simon_pico2::sound::{melody_notes, tone_compare, tone_top};

pub struct PwmSpeaker {
    pwm: Pwm<'static>,
    config: Config,
    volume: u8,
    muted: bool,
}

impl PwmSpeaker {
    pub fn new(
        pwm: Pwm<'static>,
        volume: u8,
    ) -> Self {
        let mut config = Config::default();
        config.divider = SPEAKER_PWM_DIVIDER.into();
        config.compare_a = 0;
        let mut speaker = Self {
            pwm,
            config,
            volume: volume.min(MAX_VOLUME),
            muted: false,
        };
        speaker.stop_tone();
        speaker
    }

    #[inline]
    const fn silent(&self) -> bool { self.muted || self.volume == 0 }
}

impl ToneOutput for PwmSpeaker {
    fn start_tone(
        &mut self,
        frequency_hz: u16,
    ) {
        if self.silent() {
            return;
        }
        let Some(top) = tone_top(SYS_CLOCK_HZ, SPEAKER_PWM_DIVIDER, frequency_hz) else {
            self.stop_tone();
            return;
        };
        self.config.top = top;
        self.config.compare_a = tone_compare(top, self.volume);
        self.pwm.set_config(&self.config);
    }

    fn stop_tone(&mut self) {
        self.config.compare_a = 0;
        self.pwm.set_config(&self.config);
    }

    fn play_melody(
        &mut self,
        melody: Melody,
    ) {
        if self.silent() {
            return;
        }
        for note in melody_notes(melody) {
            if note.freq_hz == 0 {
                self.stop_tone();
            } else {
                self.start_tone(note.freq_hz);
            }
            block_for(Duration::from_millis(u64::from(note.duration_ms)));
        }
        self.stop_tone();
    }

    fn set_volume(
        &mut self,
        volume: u8,
    ) {
        self.volume = volume.min(MAX_VOLUME);
    }

    fn set_muted(
        &mut self,
        muted: bool,
    ) {
        self.muted = muted;
        if muted {
            self.stop_tone();
        }
    }
}
