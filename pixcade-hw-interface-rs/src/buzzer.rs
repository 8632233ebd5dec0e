//! RP2350 PWM slice as the buzzer's tone channel.
//!
//! [`PwmBuzzer`] implements the audio core's [`TonePwm`] seam on top of an
//! `embassy-rp` PWM slice. The slice counts at 1 MHz (clk_sys / 150), so a
//! tone frequency maps to `top = 1_000_000 / hz - 1` and the 8-bit duty
//! space scales onto the compare register.

use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use fixed::traits::ToFixed;

use pixcade::audio_service::TonePwm;

/// Counter rate after the divider: one tick per microsecond.
const COUNTER_HZ: u32 = 1_000_000;

/// RP2350 system clock feeding the PWM block.
const CLK_SYS_HZ: u32 = 150_000_000;

/// Passive piezo buzzer on a PWM channel-A output.
pub struct PwmBuzzer {
    pwm: Pwm<'static>,
    config: PwmConfig,
    /// Wrap value for the current frequency; compare scales against it.
    top: u16,
}

impl PwmBuzzer {
    /// Wrap a PWM slice created with `Pwm::new_output_a`. No hardware
    /// traffic until `configure()`.
    pub fn new(pwm: Pwm<'static>) -> Self {
        Self {
            pwm,
            config: PwmConfig::default(),
            top: u16::MAX,
        }
    }
}

impl TonePwm for PwmBuzzer {
    type Error = core::convert::Infallible;

    fn configure(&mut self) -> Result<(), Self::Error> {
        self.config = PwmConfig::default();
        self.config.divider = (CLK_SYS_HZ / COUNTER_HZ).to_fixed();
        self.config.top = self.top;
        self.config.compare_a = 0;
        self.pwm.set_config(&self.config);
        Ok(())
    }

    fn set_frequency(&mut self, hz: u16) -> Result<(), Self::Error> {
        if hz == 0 {
            self.config.compare_a = 0;
            self.pwm.set_config(&self.config);
            return Ok(());
        }
        self.top = ((COUNTER_HZ / hz as u32).saturating_sub(1)).min(u16::MAX as u32) as u16;
        self.config.top = self.top;
        // A frequency change rescales the compare register, so duty is
        // reset here and reprogrammed by the following set_duty call.
        self.config.compare_a = 0;
        self.pwm.set_config(&self.config);
        Ok(())
    }

    fn set_duty(&mut self, duty: u8) -> Result<(), Self::Error> {
        self.config.compare_a = ((self.top as u32 * duty as u32) / 255) as u16;
        self.pwm.set_config(&self.config);
        Ok(())
    }
}
