//! Tiers are searched in ascending `from_percent` order, first as half-open
//! `[from, to)` ranges and only then as closed `[from, to]` ranges. The higher
//! tier therefore wins a shared boundary, and it also wins wherever two tiers
//! overlap and the value is not below the later tier's `from`: with `0..50`
//! and `40..80`, 50 falls outside `[0, 50)` and matches the second tier. An
//! upper edge no other tier covers still matches through the closed pass.

use crate::core::score::round2;
use crate::model::ConversionTier;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// What to return when tiers exist but none covers the completion value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OverRangePolicy {
    /// Above every bounded tier: use the top tier's conversion. Gaps and
    /// values below the lowest tier still yield 0.
    #[default]
    ClampTop,
    /// Any value outside every tier yields 0.
    Zero,
}

impl fmt::Display for OverRangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClampTop => write!(f, "clamp_top"),
            Self::Zero => write!(f, "zero"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Lookup {
    PassThrough,
    Matched,
    ClampedToTop,
    OutOfRange,
}

pub fn lookup_conversion(completion_percent: f64, tiers: &[ConversionTier]) -> f64 {
    lookup_with_policy(completion_percent, tiers, OverRangePolicy::default()).0
}

pub fn lookup_with_policy(
    completion_percent: f64,
    tiers: &[ConversionTier],
    policy: OverRangePolicy,
) -> (f64, Lookup) {
    if tiers.is_empty() {
        return (round2(completion_percent), Lookup::PassThrough);
    }

    let mut sorted: Vec<&ConversionTier> = tiers.iter().collect();
    // stable sort keeps declaration order among tiers sharing a lower bound
    sorted.sort_by(|a, b| {
        a.from_percent
            .partial_cmp(&b.from_percent)
            .unwrap_or(Ordering::Equal)
    });

    let half_open = sorted.iter().find(|tier| {
        tier.from_percent <= completion_percent && completion_percent < tier.upper_bound()
    });
    if let Some(tier) = half_open {
        return (tier.conversion_percent, Lookup::Matched);
    }

    let closed = sorted.iter().find(|tier| {
        tier.from_percent <= completion_percent && completion_percent <= tier.upper_bound()
    });
    if let Some(tier) = closed {
        return (tier.conversion_percent, Lookup::Matched);
    }

    if policy == OverRangePolicy::ClampTop {
        if let Some(top) = top_tier(&sorted) {
            if completion_percent > top.upper_bound() {
                return (top.conversion_percent, Lookup::ClampedToTop);
            }
        }
    }

    (0.0, Lookup::OutOfRange)
}

fn top_tier<'a>(sorted: &[&'a ConversionTier]) -> Option<&'a ConversionTier> {
    sorted.iter().copied().fold(None, |best, tier| match best {
        Some(current) if current.upper_bound() > tier.upper_bound() => Some(current),
        _ => Some(tier),
    })
}
