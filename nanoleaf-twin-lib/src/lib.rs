//! # Nanoleaf Twin Library
//!
//! `nanoleaf-twin-lib` is a thin Rust layer over the REST API of Nanoleaf light
//! panel controllers. Its centrepiece is the [`digital_twin::DigitalTwin`], a
//! local mirror of per-panel colors that is rendered as a static scene and
//! pushed to the device on demand, either persistently or as a temporary
//! "blink" that restores the previously selected effect afterwards.
//!
//! ## Features
//!
//! - Per-panel static scenes, with subset updates and a brightness overlay
//! - Temporary display (`displayTemp`) with best-effort effect restoration
//! - Effect listing, selection and custom effect upload
//! - Panel layout and global orientation access
//! - Rhythm module status and audio source selection
//! - Power and global brightness control
//!
//! ## Example
//!
//! ```no_run
//! use nanoleaf_twin_lib::control_interface::{ControlInterface, DEFAULT_PORT};
//! use nanoleaf_twin_lib::effects::EffectsClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let control = ControlInterface::new("192.168.0.50", DEFAULT_PORT, "my-auth-token").await?;
//!
//!     let effects = EffectsClient::new(&control);
//!     for name in effects.get_effects_list().await? {
//!         println!("Found effect: {}", name);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Pairing (obtaining an auth token) and discovery are not covered; pass an
//! existing token to [`control_interface::ControlInterface::new`].
//!
//! ## Disclaimer
//!
//! This project is not affiliated with, authorized by, endorsed by, or in any way officially connected
//! with Nanoleaf or its affiliates.
//!
//! ## License
//!
//! This project is dual-licensed under the MIT License and the Apache License, Version 2.0.
//! You may choose to use either license, depending on your project needs.

// The `control_interface` module provides the HTTP transport to a controller and
// the device information it reports.
pub mod control_interface;

// The `digital_twin` module mirrors per-panel colors and renders them to the device.
//
// Example usage:
//
// ```
// use nanoleaf_twin_lib::digital_twin::{DigitalTwin, Panel};
// use nanoleaf_twin_lib::led::color::Rgb;
//
// let mut twin = DigitalTwin::new(control, vec![Panel::new(1, 0, 0), Panel::new(2, 100, 0)]);
// twin.set_color(2, Rgb::new(255, 0, 0))?;
// ```
pub mod digital_twin;

// The `effects` module wraps the `/effects` endpoints.
pub mod effects;

// The `layout` module wraps the `/panelLayout` endpoints.
pub mod layout;

// The `led` module contains the color type and the static scene encoder.
pub mod led;

// The `rhythm` module wraps the `/rhythm` endpoint.
pub mod rhythm;

// The `state` module wraps the `/state` endpoints: power and brightness.
pub mod state;

// The `util` module holds the transport trait shared by all endpoint helpers.
pub mod util;
