//! Shared core for the earthquake feed viewer.
//!
//! Shells drive it with [`Event`]s and render the [`ViewModel`] it returns.
//! All I/O goes through capabilities: the feed request through `crux_http`,
//! timers and the wall clock through [`capabilities::Timer`].

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod app;
pub mod capabilities;
pub mod config;
pub mod event;
pub mod feed;
pub mod filter;
pub mod model;
pub mod schedule;
pub mod selection;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::{ConfigError, FeedConfig, FeedSettings, FeedUrl};
pub use crux_core::{render::Render, App as CruxApp};
pub use event::Event;
pub use feed::{FeedClient, FetchError};
pub use model::{LatLon, Model, QuakeId, QuakeRecord, UnixTimeMs};
pub use view::ViewModel;
