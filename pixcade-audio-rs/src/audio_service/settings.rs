//! Read-on-demand settings gate.

use super::volume::MAX_VOLUME_LEVEL;

/// The two values the audio service reads from the settings subsystem.
///
/// Reads are assumed cheap and are never cached across ticks, so a settings
/// change takes effect within one `update()`. The service clamps
/// `volume_level` readings above [`MAX_VOLUME_LEVEL`].
pub trait SoundSettings {
    /// Master sound switch. When `false` the voice is silenced within one
    /// `update()` and every submission is dropped.
    fn sound_enabled(&self) -> bool;

    /// Volume level in 0..=10. 0 blocks new sources and stops the current
    /// step.
    fn volume_level(&self) -> u8;
}

/// Plain settings record for hosts that own their settings directly — the
/// menu writes the fields, the audio service reads them through the trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConsoleSettings {
    pub sound_enabled: bool,
    pub volume_level: u8,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            volume_level: 5,
        }
    }
}

impl SoundSettings for ConsoleSettings {
    fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    fn volume_level(&self) -> u8 {
        self.volume_level.min(MAX_VOLUME_LEVEL)
    }
}
