//! Core library for the `weatherbot` dialogue backend.
//!
//! This crate defines:
//! - The turn envelope and session codec for the host dialogue platform
//! - The slot-filling state machine (validate, geocode, fulfill)
//! - Date/time slot resolution into a single absolute instant
//! - Clients for the geocoding, weather, timezone and webcam collaborators
//!
//! It is used by `weatherbot-cli`, but can also be wired into any host
//! that delivers one turn event per invocation.

pub mod api;
pub mod bot;
pub mod config;
pub mod context;
pub mod error;
pub mod forecast;
pub mod instant;
pub mod phrases;
pub mod response;
pub mod webcam;

pub use api::{DarkSky, GoogleGeocoder, GoogleTimezone, WebcamsTravel};
pub use bot::WeatherBot;
pub use config::{Config, ServiceConfig, ServiceId};
pub use context::{Location, TurnContext, TurnEvent};
pub use error::{ApiError, BotError, ValidationError};
pub use response::TurnResponse;
