//! Coin selection
//!
//! Picks the UTXOs that fund `target = amount + fee` through an ordered
//! cascade of policies. UTXOs are first sorted by value ascending with a
//! stable sort, so the result depends only on the input set and its order.
//!
//! A candidate is accepted when it is non-empty and holds at most
//! [`MAX_SELECTED_INPUTS`] inputs. When no policy yields an acceptable set
//! the last over-cap candidate is returned; callers must check
//! [`Selection::exceeds_cap`] before building.

use crate::core::{Amount, Utxo};
use serde::Serialize;

/// Input count ceiling used as a proxy for the chain's transaction size limit
pub const MAX_SELECTED_INPUTS: usize = 670;

/// The policy that produced a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Policy {
    /// A single UTXO equal to the target
    ExactMatch,
    /// Every UTXO below the target, when together they equal it
    ExactSweep,
    /// Smallest UTXO above the target, when the smaller ones cannot cover it
    SmallestLarger,
    /// Smaller UTXOs, smallest first, until the target is exceeded
    AscendingAccumulation,
    /// Smaller UTXOs, largest first, until the target is exceeded
    DescendingAccumulation,
    /// Smallest UTXO above the target, unconditionally
    AnyLarger,
    /// Largest-first accumulation returned regardless of the input cap
    UnboundedDescending,
}

/// An ordered set of UTXOs chosen to fund a spend
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub utxos: Vec<Utxo>,
    /// `None` when nothing could be selected
    pub policy: Option<Policy>,
}

impl Selection {
    fn new(policy: Policy, utxos: Vec<&Utxo>) -> Self {
        Self {
            utxos: utxos.into_iter().cloned().collect(),
            policy: Some(policy),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    /// Sum of the selected values
    pub fn total(&self) -> u128 {
        Amount::total(self.utxos.iter().map(|u| &u.satoshis))
    }

    /// Whether the selection is above the input ceiling
    pub fn exceeds_cap(&self) -> bool {
        self.utxos.len() > MAX_SELECTED_INPUTS
    }
}

/// Remembers the most recent rejected, over-cap candidate
#[derive(Default)]
struct Cascade {
    oversized: Option<Selection>,
}

impl Cascade {
    fn offer(&mut self, policy: Policy, candidate: Option<Vec<&Utxo>>) -> Option<Selection> {
        let utxos = candidate.filter(|c| !c.is_empty())?;
        let selection = Selection::new(policy, utxos);
        if selection.exceeds_cap() {
            log::debug!(
                "{:?} needs {} inputs, above the {} cap",
                policy,
                selection.len(),
                MAX_SELECTED_INPUTS
            );
            self.oversized = Some(selection);
            None
        } else {
            Some(selection)
        }
    }
}

/// Take UTXOs in order until their running sum exceeds the target
fn accumulate<'a, I>(utxos: I, target: u128) -> Option<Vec<&'a Utxo>>
where
    I: IntoIterator<Item = &'a Utxo>,
{
    let mut total = 0u128;
    let mut picked = Vec::new();
    for utxo in utxos {
        total += utxo.satoshis.as_sat() as u128;
        picked.push(utxo);
        if total > target {
            return Some(picked);
        }
    }
    None
}

/// Select UTXOs covering `target`
pub fn select(utxos: &[Utxo], target: Amount) -> Selection {
    let target_total = target.as_sat() as u128;

    let mut sorted: Vec<&Utxo> = utxos.iter().collect();
    sorted.sort_by_key(|u| u.satoshis);

    let smaller: Vec<&Utxo> = sorted
        .iter()
        .copied()
        .filter(|u| u.satoshis < target)
        .collect();
    let smaller_total = Amount::total(smaller.iter().map(|u| &u.satoshis));
    let smallest_larger = sorted.iter().copied().find(|u| u.satoshis > target);

    let mut cascade = Cascade::default();

    // 1. a single exact UTXO (the last one in sorted order)
    let exact = sorted.iter().rev().copied().find(|u| u.satoshis == target);
    if let Some(s) = cascade.offer(Policy::ExactMatch, exact.map(|u| vec![u])) {
        return s;
    }

    // 2. sweep everything below the target when it adds up exactly
    let sweep = (smaller_total == target_total).then(|| smaller.clone());
    if let Some(s) = cascade.offer(Policy::ExactSweep, sweep) {
        return s;
    }

    // 3. smaller UTXOs cannot cover the target: smallest larger one
    let larger = (smaller_total < target_total)
        .then_some(smallest_larger)
        .flatten()
        .map(|u| vec![u]);
    if let Some(s) = cascade.offer(Policy::SmallestLarger, larger) {
        return s;
    }

    if smaller_total > target_total {
        // 4. smallest first
        let ascending = accumulate(smaller.iter().copied(), target_total);
        if let Some(s) = cascade.offer(Policy::AscendingAccumulation, ascending) {
            return s;
        }

        // 5. largest first
        let descending = accumulate(smaller.iter().rev().copied(), target_total);
        if let Some(s) = cascade.offer(Policy::DescendingAccumulation, descending) {
            return s;
        }
    }

    // 6. any larger UTXO
    if let Some(s) = cascade.offer(Policy::AnyLarger, smallest_larger.map(|u| vec![u])) {
        return s;
    }

    // 7. largest first, whatever the input count
    if smaller_total > target_total {
        if let Some(utxos) = accumulate(smaller.iter().rev().copied(), target_total) {
            return Selection::new(Policy::UnboundedDescending, utxos);
        }
    }

    cascade.oversized.unwrap_or_default()
}
