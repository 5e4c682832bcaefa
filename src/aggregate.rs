use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{AggregatedRecord, GroupKey, NormalizedRecord};

/// Round half to even at two decimals, matching how the upstream data-frame
/// tooling rounds for display.
pub fn round2(val: f64) -> f64 {
    (val * 100.0).round_ties_even() / 100.0
}

/// Sum that does not depend on the order of `values`: the values are sorted
/// first, then added with Neumaier compensation. Missing (NaN) values are
/// skipped.
pub fn stable_sum(values: &mut Vec<f64>) -> f64 {
    values.retain(|v| !v.is_nan());
    values.sort_by(f64::total_cmp);
    let mut sum = 0.0f64;
    let mut compensation = 0.0f64;
    for &v in values.iter() {
        let t = sum + v;
        if sum.abs() >= v.abs() {
            compensation += (sum - t) + v;
        } else {
            compensation += (v - t) + sum;
        }
        sum = t;
    }
    sum + compensation
}

/// Group by (industry, year, metric, attribute, scenario) and sum values.
/// One output row per distinct key, in key order; rounding happens after the
/// sum.
pub fn aggregate(records: &[NormalizedRecord]) -> Vec<AggregatedRecord> {
    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for r in records {
        groups.entry(r.key()).or_default().push(r.value);
    }

    let out: Vec<AggregatedRecord> = groups
        .into_iter()
        .map(|(key, mut values)| {
            let rows = values.len();
            let total = stable_sum(&mut values);
            AggregatedRecord {
                industry: key.industry,
                year: key.year,
                metric: key.metric,
                attribute: key.attribute,
                scenario: key.scenario,
                value: round2(total),
                rows,
            }
        })
        .collect();
    debug!(input = records.len(), groups = out.len(), "aggregated records");
    out
}
