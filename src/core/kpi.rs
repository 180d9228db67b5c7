use crate::core::conversion::{Lookup, OverRangePolicy, lookup_with_policy};
use crate::core::score::round2;
use crate::model::ConversionTier;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiComputation {
    pub completion_percent: f64,
    pub conversion_percent: f64,
    pub weighted_score: f64,
    #[serde(skip)]
    pub lookup: Lookup,
}

pub fn completion_percent(actual: f64, target: f64) -> f64 {
    if target == 0.0 {
        return 0.0;
    }
    round2(actual / target * 100.0)
}

pub fn compute_kpi_result(
    actual: f64,
    target: f64,
    weight_percent: f64,
    tiers: &[ConversionTier],
) -> KpiComputation {
    compute_kpi_result_with_policy(
        actual,
        target,
        weight_percent,
        tiers,
        OverRangePolicy::default(),
    )
}

pub fn compute_kpi_result_with_policy(
    actual: f64,
    target: f64,
    weight_percent: f64,
    tiers: &[ConversionTier],
    policy: OverRangePolicy,
) -> KpiComputation {
    let completion_percent = completion_percent(actual, target);
    let (conversion_percent, lookup) = lookup_with_policy(completion_percent, tiers, policy);

    KpiComputation {
        completion_percent,
        conversion_percent,
        weighted_score: conversion_percent * weight_percent / 100.0,
        lookup,
    }
}

/// Plain sum of weighted scores; weights that do not add up to 100 are not normalized.
pub fn aggregate_total_score(results: &[KpiComputation]) -> f64 {
    results.iter().map(|result| result.weighted_score).sum()
}
