use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

/// One row as read from an input CSV, before any relabeling.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub industry: String,
    pub year: i64,
    pub metric: String,
    pub attribute: String,
    pub scenario: String,
    pub value: f64,
    /// Source file name and 1-based line, for error messages.
    pub source: Option<(String, u64)>,
}

/// A relabeled year: the interval label plus its position in the year table.
/// Periods order by position so animation frames follow the table, not the
/// lexical order of the labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Period {
    pub index: usize,
    pub label: String,
}

impl Ord for Period {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.label.cmp(&other.label))
    }
}

impl PartialOrd for Period {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub industry: String,
    pub year: Period,
    pub metric: String,
    pub attribute: String,
    pub scenario: String,
    pub value: f64,
}

impl NormalizedRecord {
    pub fn key(&self) -> GroupKey {
        GroupKey {
            industry: self.industry.clone(),
            year: self.year.clone(),
            metric: self.metric.clone(),
            attribute: self.attribute.clone(),
            scenario: self.scenario.clone(),
        }
    }
}

/// The five fields that identify an aggregated row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupKey {
    pub industry: String,
    pub year: Period,
    pub metric: String,
    pub attribute: String,
    pub scenario: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedRecord {
    pub industry: String,
    pub year: Period,
    pub metric: String,
    pub attribute: String,
    pub scenario: String,
    /// Sum of all contributing values, rounded to 2 decimal places.
    pub value: f64,
    /// Number of normalized rows folded into this one.
    #[serde(skip)]
    pub rows: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedRecord {
    pub industry: String,
    pub year: Period,
    pub metric: String,
    pub attribute: String,
    pub scenario: String,
    pub value: f64,
    pub description: Option<String>,
}

/// Anything the selection filter can narrow by metric and attribute.
pub trait Selectable {
    fn metric(&self) -> &str;
    fn attribute(&self) -> &str;
}

impl Selectable for NormalizedRecord {
    fn metric(&self) -> &str {
        &self.metric
    }
    fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl Selectable for AggregatedRecord {
    fn metric(&self) -> &str {
        &self.metric
    }
    fn attribute(&self) -> &str {
        &self.attribute
    }
}

impl Selectable for AnnotatedRecord {
    fn metric(&self) -> &str {
        &self.metric
    }
    fn attribute(&self) -> &str {
        &self.attribute
    }
}

/// Per-scenario access, shared by the splitter and the chart projection.
pub trait ScenarioTagged {
    fn scenario(&self) -> &str;
}

impl ScenarioTagged for AggregatedRecord {
    fn scenario(&self) -> &str {
        &self.scenario
    }
}

impl ScenarioTagged for AnnotatedRecord {
    fn scenario(&self) -> &str {
        &self.scenario
    }
}

/// One row of the tidy table handed to a chart renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRow {
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(rename = "Year")]
    pub year: String,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Description")]
    pub description: Option<String>,
    #[serde(rename = "Scenario")]
    pub scenario: String,
}

impl From<&AnnotatedRecord> for ChartRow {
    fn from(r: &AnnotatedRecord) -> Self {
        Self {
            industry: r.industry.clone(),
            year: r.year.label.clone(),
            value: r.value,
            description: r.description.clone(),
            scenario: r.scenario.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_orders_by_table_position() {
        let five = Period { index: 0, label: "5".to_string() };
        let ten = Period { index: 1, label: "10".to_string() };
        assert!(five < ten);
        assert!(five.label > ten.label);
    }

    #[test]
    fn test_period_serializes_as_label() {
        let p = Period { index: 3, label: "15-20".to_string() };
        assert_eq!(serde_json::to_string(&p).unwrap(), "\"15-20\"");
    }
}
