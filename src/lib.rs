//! # Moteflow
//!
//! Application-layer plumbing for simulated sensor motes: a telemetry socket
//! adapter, a synthetic data feed for the simulated temperature/humidity
//! sensor, and the gateway side that aggregates thermostat readings.
//!
//! ## Features
//!
//! - **Socket adapter**: attach/broadcast/receive/close lifecycle with a fixed
//!   4-byte wire format
//! - **Feed generator**: alternating rising/falling keyframe trajectories, or
//!   one random sample per request
//! - **Radio frames**: node-to-gateway data frames with short addressing
//! - **Gateway**: per-thermostat temperature tracking, averaging and threshold
//!   classification
//!
//! ## Quick Start
//!
//! ```rust
//! use moteflow::socket::{EndpointRef, InboundFrame, TelemetrySocket};
//! use moteflow::codec::TelemetryReading;
//!
//! let mote: EndpointRef = "02-00-00-00-00-00-00-01".parse().unwrap();
//! let mut socket = TelemetrySocket::new();
//!
//! // Ask the remote telemetry service to start streaming
//! let attach = socket.send(1, mote, &["attach"]).unwrap();
//! assert_eq!(attach, [0, 0, 0, 0]);
//!
//! // Hand an inbound frame from the transport to the socket
//! let frame = InboundFrame::new(mote, 1, TelemetryReading::new(25, 60).encode().to_vec());
//! println!("{}", socket.on_data(&frame));
//! ```
//!
//! ## Architecture
//!
//! - [`codec`] - Pack/unpack primitives and the telemetry reading wire format
//! - [`socket`] - Socket adapter lifecycle and inbound frame formatting
//! - [`feed`] - Trajectory tables and the feed generator
//! - [`frame`] - Radio frame layout used between thermostat nodes and the gateway
//! - [`gateway`] - Thermostat registry and average temperature indicator
//! - [`config`] - JSON configuration for binaries and drivers

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

pub mod codec;
pub mod config;
pub mod feed;
pub mod frame;
pub mod gateway;
pub mod socket;

// Re-export main public types for convenience
pub use codec::TelemetryReading;
pub use config::MoteflowConfig;
pub use feed::{FeedGenerator, FeedVariant, Trajectory};
pub use frame::RadioFrame;
pub use gateway::Gateway;
pub use socket::{EndpointRef, InboundFrame, SocketCommand, SocketError, TelemetrySocket};
