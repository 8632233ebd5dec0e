//! The arbiter that owns the one voice.
//!
//! [`AudioService`] resolves preemption between the three source kinds.
//! One-shot tones and patterns replace each other at submission and always
//! win over the ringtone; the ringtone sits in a suspension slot and takes
//! the voice back whenever a completion leaves it free. Game code only ever
//! submits — resumption is automatic.
//!
//! All advancing happens in [`update()`](AudioService::update), driven by
//! the host tick loop with an injected monotonic millisecond clock. Nothing
//! here blocks, waits, or allocates.

use heapless::Vec;

use super::deadline_reached;
use super::rtttl::RtttlPlayer;
use super::settings::SoundSettings;
use super::step::Step;
use super::tone::{ToneDriver, TonePwm};
use super::volume::VolumeCurve;
use super::MAX_STEPS;

// ── UI sound table ───────────────────────────────────────────────────────
// Fixed (frequency, duration) parameters for the menu and in-game UI.

const UI_NAVIGATE_TICK: (u16, u16) = (1760, 18);
const UI_UP: (u16, u16) = (1960, 16);
const UI_DOWN: (u16, u16) = (1470, 16);
const UI_LEFT: (u16, u16) = (1040, 14);
const UI_RIGHT: (u16, u16) = (1240, 14);

const UI_CONFIRM_SHOOT: [Step; 5] = [
    Step::new(2800, 10),
    Step::rest(4),
    Step::new(2200, 10),
    Step::rest(4),
    Step::new(1700, 14),
];

const UI_START_STOP: [Step; 5] = [
    Step::new(880, 70),
    Step::rest(30),
    Step::new(660, 70),
    Step::rest(30),
    Step::new(440, 130),
];

// ── Voice state ──────────────────────────────────────────────────────────

/// Which source currently drives the PWM output.
///
/// At most one of tone/pattern exists at a time; a registered ringtone
/// lives in [`AudioService::rtttl`] whether it is sounding
/// ([`Voice::Ringtone`]) or suspended behind one of the others.
enum Voice {
    /// Nothing scheduled; the output is silent.
    Idle,
    /// A one-shot tone until `end_ms`.
    Tone { end_ms: u32 },
    /// A copied step sequence; `steps[index]` is sounding until `end_ms`.
    Pattern {
        steps: Vec<Step, MAX_STEPS>,
        index: usize,
        end_ms: u32,
    },
    /// The current ringtone note until `end_ms`.
    Ringtone { end_ms: u32 },
}

// ── Service ──────────────────────────────────────────────────────────────

/// Single-voice audio arbiter.
///
/// Owns the tone driver, reads the settings provider on demand, and holds
/// the [`Voice`] plus the ringtone suspension slot. Constructed once at
/// startup and passed by reference to game components.
///
/// # Example
///
/// ```
/// use pixcade::audio_service::{AudioService, ConsoleSettings, NullPwm, Step};
///
/// let mut audio = AudioService::new(NullPwm, ConsoleSettings::default());
/// audio.begin();
///
/// // Fire-and-forget submissions; the tick loop advances everything.
/// audio.play_rtttl(0, "boot:d=8,o=6,b=140:c,e,g", false);
/// audio.play_pattern(0, &[Step::new(2000, 50), Step::rest(20)]);
/// audio.update(16);
/// ```
pub struct AudioService<P, S> {
    driver: ToneDriver<P>,
    settings: S,
    volume: VolumeCurve,
    voice: Voice,
    /// Registered ringtone, sounding or suspended.
    rtttl: Option<RtttlPlayer>,
}

impl<P, S> AudioService<P, S>
where
    P: TonePwm,
    S: SoundSettings,
{
    /// Construct with the default [`VolumeCurve`]. No hardware traffic
    /// until [`begin()`](Self::begin).
    pub fn new(pwm: P, settings: S) -> Self {
        Self::with_volume_curve(pwm, settings, VolumeCurve::default())
    }

    /// Construct with a custom volume-to-duty mapping.
    pub fn with_volume_curve(pwm: P, settings: S, volume: VolumeCurve) -> Self {
        Self {
            driver: ToneDriver::new(pwm),
            settings,
            volume,
            voice: Voice::Idle,
            rtttl: None,
        }
    }

    /// Lazy, idempotent hardware init.
    pub fn begin(&mut self) {
        self.driver.begin();
    }

    /// Advance the arbiter. Call once per tick with the monotonic
    /// millisecond clock; safe to call many times per tick, and idempotent
    /// when no time has elapsed.
    ///
    /// All expirations that fall at or before `now_ms` are processed on
    /// this call, so short steps never stall the sequence.
    pub fn update(&mut self, now_ms: u32) {
        if !self.settings.sound_enabled() {
            // Silenced within one update of the switch going off.
            if self.is_playing() || self.rtttl.is_some() {
                self.stop_all();
            }
            return;
        }
        if self.settings.volume_level() == 0 {
            // Volume 0 stops the current step; a registered ringtone
            // stays suspended and resumes when volume returns.
            if self.is_playing() {
                self.driver.silence();
                self.voice = Voice::Idle;
            }
            return;
        }
        if !self.driver.is_ready() {
            return;
        }

        loop {
            let deadline = match &self.voice {
                Voice::Idle => None,
                Voice::Tone { end_ms }
                | Voice::Ringtone { end_ms }
                | Voice::Pattern { end_ms, .. } => Some(*end_ms),
            };
            match deadline {
                None => {
                    // A suspended ringtone takes the voice back as soon
                    // as it is free.
                    if self.rtttl.is_none() || !self.start_next_ringtone_note(now_ms) {
                        break;
                    }
                }
                Some(end_ms) => {
                    if !deadline_reached(now_ms, end_ms) {
                        break;
                    }
                    if matches!(self.voice, Voice::Pattern { .. }) {
                        self.advance_pattern(now_ms);
                    } else {
                        self.resume_or_idle(now_ms);
                    }
                }
            }
        }
    }

    /// Silence the voice and clear every source.
    pub fn stop_all(&mut self) {
        self.driver.silence();
        self.voice = Voice::Idle;
        self.rtttl = None;
    }

    /// One-shot tone. Preempts a pattern; a registered ringtone is merely
    /// suspended and resumes when the tone completes.
    pub fn play_tone(&mut self, now_ms: u32, frequency_hz: u16, duration_ms: u16) {
        if !self.can_submit() {
            return;
        }
        self.driver.play(frequency_hz, self.current_duty());
        self.voice = Voice::Tone {
            end_ms: now_ms.wrapping_add(duration_ms as u32),
        };
    }

    /// Step sequence, copied at submit time and truncated to
    /// [`MAX_STEPS`]. Preempts a one-shot tone; suspends the ringtone.
    pub fn play_pattern(&mut self, now_ms: u32, steps: &[Step]) {
        if !self.can_submit() || steps.is_empty() {
            return;
        }
        if steps.len() > MAX_STEPS {
            #[cfg(feature = "defmt")]
            defmt::warn!("pattern truncated to {} steps", MAX_STEPS);
        }
        let mut copied: Vec<Step, MAX_STEPS> = Vec::new();
        let _ = copied.extend_from_slice(&steps[..steps.len().min(MAX_STEPS)]);
        self.voice = Voice::Pattern {
            steps: copied,
            index: 0,
            end_ms: now_ms,
        };
        self.program_current_step(now_ms);
    }

    /// Register a ringtone. Starts immediately only when the voice is
    /// idle and emission is permitted; otherwise it waits its turn in the
    /// suspension slot.
    pub fn play_rtttl(&mut self, now_ms: u32, src: &'static str, looping: bool) {
        if !self.driver.is_ready() {
            return;
        }
        let Some(player) = RtttlPlayer::new(src, looping) else {
            #[cfg(feature = "defmt")]
            defmt::warn!("rtttl without header; ringtone deactivated");
            self.stop_rtttl();
            return;
        };
        self.rtttl = Some(player);
        if matches!(self.voice, Voice::Idle)
            && self.settings.sound_enabled()
            && self.settings.volume_level() > 0
        {
            self.start_next_ringtone_note(now_ms);
        }
    }

    /// Cancel the ringtone only. The voice is silenced only if the
    /// ringtone holds it; a playing tone or pattern is untouched.
    pub fn stop_rtttl(&mut self) {
        self.rtttl = None;
        if matches!(self.voice, Voice::Ringtone { .. }) {
            self.driver.silence();
            self.voice = Voice::Idle;
        }
    }

    /// `true` while a ringtone is registered (sounding or suspended).
    pub fn is_rtttl_active(&self) -> bool {
        self.rtttl.is_some()
    }

    /// `true` while the driver is emitting a scheduled step or note —
    /// including rests, which hold the voice silently.
    pub fn is_playing(&self) -> bool {
        !matches!(self.voice, Voice::Idle)
    }

    // ── UI emitters ──────────────────────────────────────────────────

    pub fn ui_navigate_tick(&mut self, now_ms: u32) {
        self.play_tone(now_ms, UI_NAVIGATE_TICK.0, UI_NAVIGATE_TICK.1);
    }

    pub fn ui_up(&mut self, now_ms: u32) {
        self.play_tone(now_ms, UI_UP.0, UI_UP.1);
    }

    pub fn ui_down(&mut self, now_ms: u32) {
        self.play_tone(now_ms, UI_DOWN.0, UI_DOWN.1);
    }

    pub fn ui_left(&mut self, now_ms: u32) {
        self.play_tone(now_ms, UI_LEFT.0, UI_LEFT.1);
    }

    pub fn ui_right(&mut self, now_ms: u32) {
        self.play_tone(now_ms, UI_RIGHT.0, UI_RIGHT.1);
    }

    pub fn ui_confirm_shoot(&mut self, now_ms: u32) {
        self.play_pattern(now_ms, &UI_CONFIRM_SHOOT);
    }

    pub fn ui_start_stop(&mut self, now_ms: u32) {
        self.play_pattern(now_ms, &UI_START_STOP);
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// Read access to the settings provider.
    pub fn settings(&self) -> &S {
        &self.settings
    }

    /// Mutable access to the settings provider, for hosts whose menu
    /// writes the settings the service reads.
    pub fn settings_mut(&mut self) -> &mut S {
        &mut self.settings
    }

    /// The underlying PWM channel, e.g. for inspection in tests.
    pub fn pwm(&self) -> &P {
        self.driver.pwm()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Tone and pattern submissions are dropped unless the hardware is up,
    /// sound is on, and the volume is audible.
    fn can_submit(&self) -> bool {
        self.driver.is_ready()
            && self.settings.sound_enabled()
            && self.settings.volume_level() > 0
    }

    fn current_duty(&self) -> u8 {
        self.volume.duty_for_level(self.settings.volume_level())
    }

    /// Program the step the pattern cursor points at and set its deadline.
    fn program_current_step(&mut self, now_ms: u32) {
        let step = match &self.voice {
            Voice::Pattern { steps, index, .. } => steps.get(*index).copied(),
            _ => None,
        };
        let Some(step) = step else { return };
        self.driver.play(step.frequency_hz, self.current_duty());
        if let Voice::Pattern { end_ms, .. } = &mut self.voice {
            *end_ms = now_ms.wrapping_add(step.duration_ms as u32);
        }
    }

    /// Move the pattern cursor forward; hand the voice over when the
    /// sequence is done.
    fn advance_pattern(&mut self, now_ms: u32) {
        let has_next = match &mut self.voice {
            Voice::Pattern { steps, index, .. } => {
                *index += 1;
                *index < steps.len()
            }
            _ => false,
        };
        if has_next {
            self.program_current_step(now_ms);
        } else {
            self.resume_or_idle(now_ms);
        }
    }

    /// Completion handler: a suspended ringtone resumes, otherwise the
    /// voice falls silent.
    fn resume_or_idle(&mut self, now_ms: u32) {
        if self.start_next_ringtone_note(now_ms) {
            return;
        }
        self.driver.silence();
        self.voice = Voice::Idle;
    }

    /// Decode and start the next ringtone note. Returns `false` (and
    /// deactivates the ringtone) when it has run out.
    fn start_next_ringtone_note(&mut self, now_ms: u32) -> bool {
        let note = match self.rtttl.as_mut() {
            Some(player) => player.next_note(),
            None => return false,
        };
        match note {
            Some(note) => {
                self.driver.play(note.frequency_hz, self.current_duty());
                self.voice = Voice::Ringtone {
                    end_ms: now_ms.wrapping_add(note.duration_ms),
                };
                true
            }
            None => {
                self.rtttl = None;
                false
            }
        }
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────
