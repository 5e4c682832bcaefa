use tracing::debug;

use crate::models::RawRecord;
use crate::tables::AdjustmentRule;

/// Apply post-load adjustment rules, returning a new set of records. The last
/// matching rule wins.
pub fn apply_adjustments(records: &[RawRecord], rules: &[AdjustmentRule]) -> Vec<RawRecord> {
    if rules.is_empty() {
        return records.to_vec();
    }
    let mut adjusted = 0usize;
    let out: Vec<RawRecord> = records
        .iter()
        .map(|r| {
            let rule = rules.iter().rev().find(|rule| rule.applies(&r.scenario, r.year));
            match rule {
                Some(rule) => {
                    adjusted += 1;
                    RawRecord {
                        value: rule.set_value,
                        ..r.clone()
                    }
                }
                None => r.clone(),
            }
        })
        .collect();
    debug!(adjusted, "applied adjustment rules");
    out
}
