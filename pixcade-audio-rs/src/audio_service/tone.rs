//! Tone generation hardware seam and the thin driver wrapper around it.
//!
//! [`TonePwm`] is the narrow interface the audio core needs from a PWM
//! peripheral; [`ToneDriver`] wraps an implementation with the lazy-init
//! and fail-once-then-no-op policy the rest of the service relies on.

/// The PWM channel bound to the buzzer pin, as the audio core sees it.
///
/// Implementations program a single square-wave output with 8-bit duty
/// resolution. All methods must return without blocking.
pub trait TonePwm {
    /// Hardware-level error. Reported once by [`ToneDriver`], after which
    /// the whole driver degrades to a no-op.
    type Error;

    /// One-time channel setup: clock source, 8-bit duty resolution, pin
    /// attach. Must be idempotent.
    fn configure(&mut self) -> Result<(), Self::Error>;

    /// Program the output frequency in Hz. 0 stops emission.
    fn set_frequency(&mut self, hz: u16) -> Result<(), Self::Error>;

    /// Program the duty in 8-bit space (0..=255). Callers invoke this
    /// after [`set_frequency`](TonePwm::set_frequency): reprogramming
    /// frequency resets duty on this class of peripheral.
    fn set_duty(&mut self, duty: u8) -> Result<(), Self::Error>;
}

/// A [`TonePwm`] that does nothing.
///
/// Constructing the audio service over `NullPwm` is the build-time way to
/// disable sound entirely behind the same interface.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPwm;

impl TonePwm for NullPwm {
    type Error = core::convert::Infallible;

    fn configure(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_frequency(&mut self, _hz: u16) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_duty(&mut self, _duty: u8) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Thin wrapper over a [`TonePwm`] channel.
///
/// # Lifecycle
///
/// 1. [`ToneDriver::new()`] — constructs the driver without touching the
///    hardware.
/// 2. [`ToneDriver::begin()`] — runs channel setup once; idempotent.
/// 3. [`play()`](Self::play) / [`silence()`](Self::silence) — program
///    frequency and duty.
///
/// Hardware init failures are non-recoverable: the first error is reported
/// once and every later call becomes a no-op. Callers never see an error.
pub struct ToneDriver<P> {
    pwm: P,
    /// Set after a successful `configure()`.
    initialized: bool,
    /// Set on the first hardware error; never cleared.
    failed: bool,
}

impl<P> ToneDriver<P>
where
    P: TonePwm,
{
    /// Construct an uninitialised driver. No hardware traffic.
    pub fn new(pwm: P) -> Self {
        Self {
            pwm,
            initialized: false,
            failed: false,
        }
    }

    /// Lazy one-time channel setup. Safe to call repeatedly; only the
    /// first successful call touches the hardware.
    pub fn begin(&mut self) {
        if self.initialized || self.failed {
            return;
        }
        match self.pwm.configure() {
            Ok(()) => self.initialized = true,
            Err(_) => self.fail(),
        }
    }

    /// `true` once `begin()` has succeeded and no hardware error has
    /// occurred since.
    pub fn is_ready(&self) -> bool {
        self.initialized && !self.failed
    }

    /// Program a tone. Frequency is written first, then duty, because the
    /// frequency write resets duty. A frequency of 0 forces duty 0 — a
    /// rest is silent regardless of the requested volume.
    pub fn play(&mut self, frequency_hz: u16, duty: u8) {
        if !self.is_ready() {
            return;
        }
        if self.pwm.set_frequency(frequency_hz).is_err() {
            self.fail();
            return;
        }
        let duty = if frequency_hz == 0 { 0 } else { duty };
        if self.pwm.set_duty(duty).is_err() {
            self.fail();
        }
    }

    /// Stop emission.
    pub fn silence(&mut self) {
        self.play(0, 0);
    }

    /// Access the underlying channel, e.g. for inspection in tests.
    pub fn pwm(&self) -> &P {
        &self.pwm
    }

    fn fail(&mut self) {
        if !self.failed {
            #[cfg(feature = "defmt")]
            defmt::error!("tone pwm error; audio degraded to no-op");
        }
        self.failed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts calls; every operation can be armed to fail.
    #[derive(Default)]
    struct CountingPwm {
        configure_calls: u32,
        frequency_calls: u32,
        duty_calls: u32,
        last_frequency: u16,
        last_duty: u8,
        fail_configure: bool,
        fail_frequency: bool,
    }

    impl TonePwm for CountingPwm {
        type Error = ();

        fn configure(&mut self) -> Result<(), ()> {
            self.configure_calls += 1;
            if self.fail_configure {
                return Err(());
            }
            Ok(())
        }

        fn set_frequency(&mut self, hz: u16) -> Result<(), ()> {
            self.frequency_calls += 1;
            if self.fail_frequency {
                return Err(());
            }
            self.last_frequency = hz;
            Ok(())
        }

        fn set_duty(&mut self, duty: u8) -> Result<(), ()> {
            self.duty_calls += 1;
            self.last_duty = duty;
            Ok(())
        }
    }

    #[test]
    fn begin_is_idempotent() {
        let mut driver = ToneDriver::new(CountingPwm::default());
        driver.begin();
        driver.begin();
        driver.begin();
        assert!(driver.is_ready());
        assert_eq!(driver.pwm().configure_calls, 1);
    }

    #[test]
    fn play_before_begin_is_a_no_op() {
        let mut driver = ToneDriver::new(CountingPwm::default());
        driver.play(440, 64);
        assert_eq!(driver.pwm().frequency_calls, 0);
        assert_eq!(driver.pwm().duty_calls, 0);
    }

    #[test]
    fn play_programs_frequency_then_duty() {
        let mut driver = ToneDriver::new(CountingPwm::default());
        driver.begin();
        driver.play(880, 100);
        assert_eq!(driver.pwm().last_frequency, 880);
        assert_eq!(driver.pwm().last_duty, 100);
    }

    #[test]
    fn rest_forces_duty_zero() {
        let mut driver = ToneDriver::new(CountingPwm::default());
        driver.begin();
        driver.play(0, 100);
        assert_eq!(driver.pwm().last_frequency, 0);
        assert_eq!(driver.pwm().last_duty, 0);
    }

    #[test]
    fn configure_failure_degrades_everything() {
        let mut driver = ToneDriver::new(CountingPwm {
            fail_configure: true,
            ..CountingPwm::default()
        });
        driver.begin();
        assert!(!driver.is_ready());

        // A retry does not touch the hardware again.
        driver.begin();
        assert_eq!(driver.pwm().configure_calls, 1);

        driver.play(440, 64);
        assert_eq!(driver.pwm().frequency_calls, 0);
    }

    #[test]
    fn runtime_failure_stops_further_traffic() {
        let mut driver = ToneDriver::new(CountingPwm::default());
        driver.begin();
        driver.pwm.fail_frequency = true;
        driver.play(440, 64);
        assert!(!driver.is_ready());
        // Duty was never written for the failed play, and later plays
        // generate no traffic at all.
        assert_eq!(driver.pwm().duty_calls, 0);
        driver.play(880, 64);
        assert_eq!(driver.pwm().frequency_calls, 1);
    }

    #[test]
    fn null_pwm_accepts_everything() {
        let mut driver = ToneDriver::new(NullPwm);
        driver.begin();
        assert!(driver.is_ready());
        driver.play(1760, 255);
        driver.silence();
    }
}
