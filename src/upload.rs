//! Record aggregation and summit-to-summit derivation.

use serde::Serialize;

use crate::record::{Activation, Chase};

/// The three-part body posted to the uploads endpoint.
///
/// Always produced by [`UploadData::payload`], never built by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadPayload {
    /// Caller-supplied activations, insertion order.
    pub activations: Vec<Activation>,
    /// Chases derived from S2S contacts in the activations, in
    /// (activation, contact) scan order.
    pub s2s: Vec<Chase>,
    /// Caller-supplied chases, insertion order.
    pub chases: Vec<Chase>,
}

/// Collects activation and chase records for a pending upload.
///
/// Records are kept verbatim in insertion order; duplicates are allowed.
/// [`payload`](Self::payload) recomputes the wire body on every call and
/// never mutates the stored records, so repeated calls between `add_*`
/// operations yield identical payloads.
#[derive(Debug, Clone, Default)]
pub struct UploadData {
    activations: Vec<Activation>,
    chases: Vec<Chase>,
}

impl UploadData {
    /// Creates an empty aggregate.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an activation to the pending upload.
    pub fn add_activation(&mut self, activation: Activation) {
        self.activations.push(activation);
    }

    /// Appends a chase to the pending upload.
    pub fn add_chase(&mut self, chase: Chase) {
        self.chases.push(chase);
    }

    /// True when no records have been added.
    pub fn is_empty(&self) -> bool {
        self.activations.is_empty() && self.chases.is_empty()
    }

    /// Number of activations currently held.
    pub fn activation_count(&self) -> usize {
        self.activations.len()
    }

    /// Number of caller-added chases currently held.
    pub fn chase_count(&self) -> usize {
        self.chases.len()
    }

    /// Builds the upload body from the current record set.
    ///
    /// Every contact in an activation whose `s2s_summit_code` is non-empty
    /// yields one derived chase in `s2s`: contact fields are copied verbatim,
    /// the activator's call sign becomes the chaser's own call sign, and the
    /// activation's summit becomes the chaser's local summit. Two activations
    /// logging contacts against the same remote summit produce two distinct
    /// derived chases; each activator chases the other's activation.
    pub fn payload(&self) -> UploadPayload {
        let mut s2s = Vec::new();
        for activation in &self.activations {
            for qso in activation.qsos.iter().filter(|q| q.is_s2s()) {
                let mut chase = Chase::new(qso.date);
                chase.time_str = qso.time.clone();
                chase.other_callsign = qso.callsign.clone();
                chase.own_callsign = activation.own_callsign.clone();
                chase.s2s_summit_code = qso.s2s_summit_code.clone();
                chase.summit_code = activation.summit.clone();
                chase.mode = qso.mode.clone();
                chase.band = qso.band.clone();
                chase.comments = qso.comments.clone();
                s2s.push(chase);
            }
        }
        UploadPayload {
            activations: self.activations.clone(),
            s2s,
            chases: self.chases.clone(),
        }
    }
}
