//! Core of a laptop keyboard controller: the matrix controller that turns a
//! scanned key matrix into USB HID reports, and the topology scanner that
//! discovers how an unknown matrix is wired to its FPC connector.
//!
//! This crate is `no_std` so it can be used by both the AVR firmware and the
//! native mapper tool. Hardware is reached through [`pins::PinBank`],
//! [`transport::KeyboardTransport`] and `embedded_hal`'s `DelayNs`.

#![cfg_attr(not(test), no_std)]

pub mod board;
pub mod config;
pub mod controller;
pub mod keycode;
pub mod matrix;
pub mod pins;
pub mod report;
pub mod scanner;
pub mod transport;
pub mod typist;

#[cfg(test)]
mod testing;

pub use board::Board;
pub use config::{ControllerConfig, HostOs, MediaDelivery, ScannerConfig};
pub use controller::Controller;
pub use keycode::Keycode;
pub use matrix::{Action, Coord, Edge, Keymap, Wiring};
pub use pins::{Level, PinBank, PinMode};
pub use report::{KeyboardReport, Leds, SlotSet};
pub use scanner::TopologyScanner;
pub use transport::KeyboardTransport;
