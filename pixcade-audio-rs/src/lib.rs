//! Audio core for the pixcade console.
//!
//! The console has a single passive piezo buzzer on one PWM channel, shared
//! by every game and by the menu UI. This crate holds the entire audio
//! service: the hardware seam, the volume policy, the step scheduler, the
//! RTTTL parser, and the arbiter that multiplexes the one voice across
//! sources without ever blocking the frame loop.
//!
//! All hardware access goes through the [`TonePwm`] trait and all time comes
//! in as a millisecond parameter, so the whole crate builds and tests on the
//! host.
//!
//! [`TonePwm`]: audio_service::TonePwm

#![cfg_attr(not(test), no_std)]

pub mod audio_service;
