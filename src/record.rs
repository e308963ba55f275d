//! Activation, chase, and QSO value records plus their wire form.
//!
//! Records are plain mutable structs: construct with `new(date)`, assign the
//! fields you have, attach to an upload. The SOTA API accepts every field as
//! a string except dates, which it wants rendered `DD/MM/YYYY` regardless of
//! how they were entered.

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

/// Input date formats accepted by [`parse_date`], tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Parses a date string arriving from an untyped boundary.
///
/// Accepts ISO `YYYY-MM-DD` as well as the wire form `DD/MM/YYYY`. Fails with
/// [`Error::InvalidArgument`] so bad input is rejected at assignment time,
/// never deferred to serialization.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        .ok_or_else(|| Error::InvalidArgument(format!("unparseable date \"{input}\"")))
}

fn wire_date<S: Serializer>(date: &NaiveDate, ser: S) -> std::result::Result<S::Ok, S::Error> {
    ser.collect_str(&date.format("%d/%m/%Y"))
}

/// A single two-way contact logged during an activation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Qso {
    /// Calendar date of the contact, no time-of-day component.
    #[serde(serialize_with = "wire_date")]
    pub date: NaiveDate,
    /// Time of day, free-form (e.g. `"23:23"`).
    pub time: String,
    /// Call sign of the station contacted.
    pub callsign: String,
    /// Summit code of the station contacted. Non-empty only for
    /// summit-to-summit contacts.
    pub s2s_summit_code: String,
    /// Emission mode.
    pub mode: String,
    /// Band or frequency.
    pub band: String,
    /// Free-text comment.
    pub comments: String,
}

impl Qso {
    /// Creates a contact on `date` with every other field empty.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            time: String::new(),
            callsign: String::new(),
            s2s_summit_code: String::new(),
            mode: String::new(),
            band: String::new(),
            comments: String::new(),
        }
    }

    /// True when this contact was made with another activator on a summit.
    pub fn is_s2s(&self) -> bool {
        !self.s2s_summit_code.is_empty()
    }
}

/// A logged visit to a summit with the contacts made from it.
///
/// The contact sequence is typed, so every element is a [`Qso`] by
/// construction; its insertion order is preserved through serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activation {
    /// Date of the activation.
    #[serde(serialize_with = "wire_date")]
    pub date: NaiveDate,
    /// Summit code of the activated summit.
    pub summit: String,
    /// The activator's call sign.
    pub own_callsign: String,
    /// Contacts made during the activation, in logged order.
    pub qsos: Vec<Qso>,
}

impl Activation {
    /// Creates an activation with an empty contact sequence.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            summit: String::new(),
            own_callsign: String::new(),
            qsos: Vec::new(),
        }
    }
}

/// A contact made with an activator, from the chaser's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chase {
    /// Date of the chase contact.
    #[serde(serialize_with = "wire_date")]
    pub date: NaiveDate,
    /// Time of day, free-form.
    pub time_str: String,
    /// Call sign of the activator contacted.
    pub other_callsign: String,
    /// The chaser's call sign.
    pub own_callsign: String,
    /// For S2S contacts, the remote summit code. For ordinary chases, the
    /// activator's summit code.
    pub s2s_summit_code: String,
    /// For S2S contacts, the summit the chaser was on. Unused otherwise.
    pub summit_code: String,
    /// Emission mode.
    pub mode: String,
    /// Band or frequency.
    pub band: String,
    /// Free-text comment.
    pub comments: String,
}

impl Chase {
    /// Creates a chase on `date` with every other field empty.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            time_str: String::new(),
            other_callsign: String::new(),
            own_callsign: String::new(),
            s2s_summit_code: String::new(),
            summit_code: String::new(),
            mode: String::new(),
            band: String::new(),
            comments: String::new(),
        }
    }
}
