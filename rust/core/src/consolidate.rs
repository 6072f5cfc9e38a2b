// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Online assembly of slice fragments into chains.
//!
//! Fragments arrive in arbitrary order, one per triangle. Each in-progress
//! chain is registered in an endpoint map under the rounded keys of its two
//! ends. A new fragment is matched at its head, then (after a reverse) at
//! its tail, so each fragment costs at most two merges and every maximal
//! chain falls out of a single pass. This is an undirected Euler-path
//! assembly whose only linking criterion is rounded endpoint identity.

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::keys::ChainKey;
use crate::point::{EndpointKey, PlanePoint};

/// A maximal run of connected boundary points.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub points: Vec<PlanePoint>,
    /// First and last points share a rounded key.
    pub closed: bool,
}

/// Merges fragments into chains for a single threshold.
#[derive(Debug)]
pub struct Consolidator {
    scale: f64,
    chains: SlotMap<ChainKey, Vec<PlanePoint>>,
    ends: FxHashMap<EndpointKey, ChainKey>,
}

impl Consolidator {
    /// Creates a consolidator matching endpoints to `precision` decimals.
    pub fn new(precision: u32) -> Self {
        Self::with_scale(10f64.powi(precision.min(15) as i32))
    }

    pub(crate) fn with_scale(scale: f64) -> Self {
        Self {
            scale,
            chains: SlotMap::with_key(),
            ends: FxHashMap::default(),
        }
    }

    #[inline]
    fn key(&self, p: PlanePoint) -> EndpointKey {
        p.endpoint_key(self.scale)
    }

    /// Adds one fragment, merging it with the chains touching its ends.
    pub fn add(&mut self, fragment: &[PlanePoint]) {
        if fragment.is_empty() {
            return;
        }

        let mut current = self.chains.insert(fragment.to_vec());

        for _ in 0..2 {
            let head = self.key(self.chains[current][0]);
            let found = self.ends.get(&head).copied();
            if found == Some(current) {
                continue;
            }

            if let Some(other) = found {
                if let Some(mut merged) = self.chains.remove(other) {
                    // unregister both ends before the chain changes shape
                    let first = self.key(merged[0]);
                    let last = self.key(merged[merged.len() - 1]);
                    self.ends.remove(&first);
                    self.ends.remove(&last);

                    // orient so that merged ends where current starts
                    if first == head {
                        merged.reverse();
                    }
                    let tail = std::mem::take(&mut self.chains[current]);
                    merged.extend(tail.into_iter().skip(1));
                    self.chains[current] = merged;
                }
            }

            // look at the other end next
            self.chains[current].reverse();
        }

        let chain = &self.chains[current];
        let first = self.key(chain[0]);
        let last = self.key(chain[chain.len() - 1]);
        self.ends.insert(first, current);
        self.ends.insert(last, current);
    }

    /// Number of chains currently held.
    pub fn chain_count(&self) -> usize {
        self.chains.len()
    }

    /// Consumes the consolidator, returning every chain once.
    ///
    /// Chains whose endpoint registration was overwritten by another chain
    /// sharing a key are still returned.
    pub fn into_chains(self) -> Vec<Chain> {
        let scale = self.scale;
        self.chains
            .into_iter()
            .map(|(_, points)| {
                let closed = points.len() > 2
                    && points[0].endpoint_key(scale) == points[points.len() - 1].endpoint_key(scale);
                Chain { points, closed }
            })
            .collect()
    }
}
