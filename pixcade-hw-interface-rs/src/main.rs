//! pixcade-hw-interface
//!
//! Audio service integration firmware for the Raspberry Pi Pico 2. Wires
//! the host-tested audio core to the real buzzer:
//!
//! 1. A PWM slice drives the passive piezo through [`PwmBuzzer`].
//! 2. The `AudioService` lives behind a mutex so game code and the tick
//!    task share it.
//! 3. A 60 Hz tick task reads the monotonic clock and calls `update()`,
//!    advancing whichever source holds the voice.
//!
//! Games and the menu UI submit through the same mutex; a boot jingle is
//! played here as a smoke test.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::pwm::{self, Pwm};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant, Ticker};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pixcade::audio_service::{AudioService, ConsoleSettings};

mod buzzer;
use buzzer::PwmBuzzer;

// ---------------------------------------------------------------------------
// Boot block
// ---------------------------------------------------------------------------

/// Tell the RP2350 Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = embassy_rp::block::ImageDef::secure_exe();

// ---------------------------------------------------------------------------
// Static storage
// ---------------------------------------------------------------------------

/// Shared audio service — submissions come from game code, advancing from
/// the tick task.
static AUDIO: StaticCell<Mutex<CriticalSectionRawMutex, SharedAudio>> = StaticCell::new();

/// Concrete service type behind the mutex.
type SharedAudio = AudioService<PwmBuzzer, ConsoleSettings>;

/// Short boot jingle, also exercising the RTTTL path on real hardware.
const BOOT_JINGLE: &str = "boot:d=16,o=6,b=140:c,e,g,8c7";

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// 60 Hz audio tick.
///
/// The mutex is held only for the in-memory `update()` — the PWM writes it
/// performs are register pokes, never bus transactions.
#[embassy_executor::task]
async fn audio_tick_task(audio: &'static Mutex<CriticalSectionRawMutex, SharedAudio>) {
    info!("Audio tick task started");

    let mut ticker = Ticker::every(Duration::from_hz(60));
    loop {
        ticker.next().await;
        let now_ms = Instant::now().as_millis() as u32;
        let mut audio = audio.lock().await;
        audio.update(now_ms);
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("pixcade-hw-interface starting");

    // —— Pin assignments ————————————————————————————————————————————————————
    // BUZZER → GP14  (p.PIN_14)  PWM slice 7, channel A
    // ———————————————————————————————————————————————————————————————————————

    let pwm = Pwm::new_output_a(p.PWM_SLICE7, p.PIN_14, pwm::Config::default());

    let mut audio_service = AudioService::new(PwmBuzzer::new(pwm), ConsoleSettings::default());
    audio_service.begin();

    // Boot jingle doubles as a hardware smoke test: if the buzzer stays
    // silent here, check the wiring before blaming game code.
    let now_ms = Instant::now().as_millis() as u32;
    audio_service.play_rtttl(now_ms, BOOT_JINGLE, false);

    let audio = AUDIO.init(Mutex::new(audio_service));

    spawner.spawn(audio_tick_task(audio)).unwrap();

    info!("All tasks spawned");
}
