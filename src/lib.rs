//! # Glove Link Library
//!
//! Firmware core for a VR glove controller: per-finger flex tracking with
//! online min/max calibration, configurable multi-knuckle and splay
//! topologies, gesture derivation, and a bidirectional newline-terminated
//! ASCII protocol carrying finger data out and force-feedback/haptic
//! commands back in.
//!
//! Board access (ADC, GPIO, multiplexer select lines, serial link) sits
//! behind traits so the core runs unchanged on real hardware, on a bench
//! rig, or under test mocks.

pub mod calibration;
pub mod channel;
pub mod config;
pub mod error;
pub mod glove;
pub mod input;
pub mod journal;
pub mod output;
pub mod protocol;
pub mod transport;
