//! Client for the SOTA (Summits on the Air) database upload API.
//!
//! Logging in yields an authenticated [`client::Client`]; activation and
//! chase records are added to it and uploaded in one request. Contacts
//! logged with a summit-to-summit summit code automatically produce the
//! matching chase records in the upload body.
//!
//! # Examples
//!
//! ```no_run
//! use sotaup::{
//!     client::{Client, ClientConfig},
//!     record::{parse_date, Activation, Qso},
//! };
//!
//! # fn main() -> sotaup::error::Result<()> {
//! let mut client = Client::login(ClientConfig {
//!     client_id: "wavelog".to_string(),
//!     username: "w0keh".to_string(),
//!     password: "mYp@55w0rd!".to_string(),
//!     ..ClientConfig::default()
//! })?;
//!
//! let date = parse_date("2025-05-29")?;
//! let mut activation = Activation::new(date);
//! activation.summit = "W3/PW-024".to_string();
//! activation.own_callsign = "W0KEH".to_string();
//! let mut qso = Qso::new(date);
//! qso.time = "23:23".to_string();
//! qso.callsign = "W1AW".to_string();
//! qso.mode = "CW".to_string();
//! qso.band = "14.310MHz".to_string();
//! activation.qsos.push(qso);
//!
//! client.add_activation(activation);
//! client.upload()?;
//! client.logout();
//! # Ok(())
//! # }
//! ```
#![deny(missing_docs)]

/// Session state machine and upload protocol.
pub mod client;
/// Crate error taxonomy.
pub mod error;
/// Transport seam and blocking reqwest implementation.
pub mod http;
/// Activation, chase, and QSO value records.
pub mod record;
/// Record aggregation and S2S derivation.
pub mod upload;
