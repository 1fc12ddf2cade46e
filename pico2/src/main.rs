//! Simon Says firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Four colored pads light up in a growing sequence and the player repeats it.
//!
//! # Architecture
//!
//! - Main task: Samples the buttons and advances the game every 10 ms
//! - Event task: Logs every game event as JSON over RTT
//! - Battery task: Samples the battery once a minute
//!
//! # Power Button
//!
//! While no game is running:
//! - **Short press**: Replay the recent log lines over RTT
//! - **Long press (2 s)**: Sleep until the next press, then restart

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

// Modules only used in the binary (not testable on host)
mod drivers;
mod log_buffer;
mod tasks;

use defmt::error;
use embassy_executor::Spawner;
use embassy_rp::adc::{self, Adc};
use embassy_rp::flash::{Blocking, Flash};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::TRNG;
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::trng::{self, Trng};
use embassy_rp::{bind_interrupts, peripherals};
use embassy_time::{Duration, Instant, Ticker};
use log::{LevelFilter, info, warn};
use simon_common::config::BUTTON_LONG_PRESS_MS;
use simon_common::hal::{LedAnimation, LedOutput, Melody, ToneOutput};
use simon_common::power::{ActivityTimer, BatteryStatus, battery_status};
use simon_common::storage::Store;
use simon_common::{GameState, SimonGame};
use simon_pico2::board::{FLASH_SIZE, TICK_MS};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use crate::drivers::{BatteryMonitor, BoardButtons, FlashBlobs, PwmLeds, PwmSpeaker};
use crate::tasks::{BATTERY_MV, ChannelSink, battery_task, event_log_task};

type Game = SimonGame<BoardButtons, PwmLeds, PwmSpeaker, Store<FlashBlobs>, ChannelSink>;

/// Status LED blink period while idle.
const HEARTBEAT_MS: u32 = 500;

bind_interrupts!(struct Irqs {
    TRNG_IRQ => trng::InterruptHandler<peripherals::TRNG>;
});

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"simon"),
    embassy_rp::binary_info::rp_program_description!(c"Simon Says memory game"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

static GAME: StaticCell<Game> = StaticCell::new();

#[inline]
fn now_ms() -> u32 { Instant::now().as_millis() as u32 }

/// Two independent seeds from the hardware TRNG: sequences and player ids.
async fn random_seeds(trng: &mut Trng<'static, TRNG>) -> (u32, u32) {
    let mut bytes = [0u8; 8];
    trng.fill_bytes(&mut bytes).await;
    let game = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let ids = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    (game, ids)
}

/// Switch everything off, wait for a power button press, then reboot.
async fn deep_sleep(
    game: &mut Game,
    status_led: &mut Output<'static>,
) -> ! {
    info!("[POWER] Entering deep sleep");
    game.leds_mut().all_off();
    game.speaker_mut().stop_tone();
    status_led.set_low();

    game.input_mut().wait_for_power().await;

    info!("[POWER] Wake-up, restarting");
    cortex_m::peripheral::SCB::sys_reset()
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    log_buffer::init(LevelFilter::Debug);
    info!("[GAME] Simon Says starting...");

    let mut trng = Trng::new(p.TRNG, Irqs, trng::Config::default());
    let (game_seed, id_seed) = random_seeds(&mut trng).await;

    // Storage first: the settings decide how the outputs start
    let flash = Flash::<_, Blocking, FLASH_SIZE>::new_blocking(p.FLASH);
    let mut store = Store::new(FlashBlobs::new(flash), id_seed);
    if let Err(e) = store.begin() {
        warn!("[STORAGE] {e}, scores will not be kept");
    }
    let settings = store.load_settings();
    info!(
        "[GAME] Settings: {}, volume {}, brightness {}, sound {}, sleep {}",
        settings.difficulty.name(),
        settings.volume,
        settings.led_brightness,
        settings.sound_enabled,
        settings.deep_sleep_enabled
    );

    if spawner.spawn(event_log_task()).is_err() {
        error!("[EVENTS] Failed to spawn event log task");
    }

    let adc = Adc::new_blocking(p.ADC, adc::Config::default());
    let battery_pin = adc::Channel::new_pin(p.PIN_26, Pull::None);
    let battery = BatteryMonitor::new(adc, battery_pin);
    if spawner.spawn(battery_task(battery, BATTERY_MV.dyn_sender())).is_err() {
        error!("[POWER] Failed to spawn battery task");
    }
    let mut battery_rx = BATTERY_MV.dyn_receiver();

    // Buttons: active-low with internal pull-ups
    let pads = [
        Input::new(p.PIN_10, Pull::Up),
        Input::new(p.PIN_11, Pull::Up),
        Input::new(p.PIN_12, Pull::Up),
        Input::new(p.PIN_13, Pull::Up),
    ];
    let power = Input::new(p.PIN_15, Pull::Up);
    let buttons = BoardButtons::new(pads, power);

    let red_green = Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, pwm::Config::default());
    let blue_yellow = Pwm::new_output_ab(p.PWM_SLICE2, p.PIN_4, p.PIN_5, pwm::Config::default());
    let leds = PwmLeds::new(red_green, blue_yellow, settings.led_brightness);

    let speaker_pwm = Pwm::new_output_a(p.PWM_SLICE7, p.PIN_14, pwm::Config::default());
    let speaker = PwmSpeaker::new(speaker_pwm, settings.volume);

    let mut status_led = Output::new(p.PIN_25, Level::Low);

    let game: &'static mut Game = GAME.init(SimonGame::new(buttons, leds, speaker, store, ChannelSink::new(), game_seed));
    game.apply_settings(&settings);

    if !cfg!(feature = "quiet-boot") {
        game.leds_mut().animate(LedAnimation::Startup);
        game.speaker_mut().play_melody(Melody::Startup);
    }

    let mut activity = ActivityTimer::new(now_ms(), settings.deep_sleep_enabled);
    game.begin(now_ms());
    info!("[GAME] Ready, press any pad to start");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_MS));
    loop {
        ticker.next().await;
        let now = now_ms();

        game.tick(now);

        let buttons = game.buttons();
        let long_press = buttons.is_power_long_pressed(now);
        let short_press = buttons.was_power_released() && buttons.power_hold_ms(now) < BUTTON_LONG_PRESS_MS;
        if game.is_active() || buttons.pressed().is_some() || buttons.is_power_pressed() {
            activity.reset(now);
        }

        if game.state() == GameState::Idle {
            if long_press {
                info!("[POWER] Power button held");
                deep_sleep(game, &mut status_led).await;
            }
            if short_press {
                log_buffer::dump().await;
            }
            if activity.should_sleep(now) {
                info!("[POWER] Idle for {} s", activity.idle_ms(now) / 1000);
                deep_sleep(game, &mut status_led).await;
            }
        }

        if let Some(rx) = battery_rx.as_mut()
            && let Some(mv) = rx.try_changed()
            && battery_status(mv) == BatteryStatus::Critical
        {
            warn!("[POWER] Battery critical ({mv} mV)");
            deep_sleep(game, &mut status_led).await;
        }

        // Heartbeat while idle, solid while playing
        let heartbeat = game.is_active() || (now / HEARTBEAT_MS).is_multiple_of(2);
        status_led.set_level(if heartbeat { Level::High } else { Level::Low });
    }
}
