use serde::Serialize;

use crate::error::{ImpactError, Result};
use crate::models::Selectable;

/// The "Select an Effect" and "Select Scale of Effect" choice lists, derived
/// from the data so every choice can actually be filtered on.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Choices {
    pub metrics: Vec<String>,
    pub attributes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub metric: String,
    pub attribute: String,
}

impl Choices {
    /// Distinct metric and attribute values in first-appearance order.
    pub fn from_records<T: Selectable>(records: &[T]) -> Self {
        let mut choices = Self::default();
        for r in records {
            if !choices.metrics.iter().any(|m| m == r.metric()) {
                choices.metrics.push(r.metric().to_string());
            }
            if !choices.attributes.iter().any(|a| a == r.attribute()) {
                choices.attributes.push(r.attribute().to_string());
            }
        }
        choices
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() || self.attributes.is_empty()
    }

    pub fn select(&self, metric: &str, attribute: &str) -> Result<Selection> {
        if !self.metrics.iter().any(|m| m == metric) {
            return Err(ImpactError::InvalidSelection {
                kind: "effect",
                value: metric.to_string(),
            });
        }
        if !self.attributes.iter().any(|a| a == attribute) {
            return Err(ImpactError::InvalidSelection {
                kind: "scale",
                value: attribute.to_string(),
            });
        }
        Ok(Selection {
            metric: metric.to_string(),
            attribute: attribute.to_string(),
        })
    }

    /// Selection by position; out-of-range indices fall back to the first
    /// choice.
    pub fn select_index(&self, metric: usize, attribute: usize) -> Option<Selection> {
        let m = self.metrics.get(metric).or_else(|| self.metrics.first())?;
        let a = self
            .attributes
            .get(attribute)
            .or_else(|| self.attributes.first())?;
        Some(Selection {
            metric: m.clone(),
            attribute: a.clone(),
        })
    }
}

/// Rows matching both the chosen metric and attribute. No matches is an empty
/// result, not an error.
pub fn filter<T: Selectable + Clone>(records: &[T], selection: &Selection) -> Vec<T> {
    records
        .iter()
        .filter(|r| r.metric() == selection.metric && r.attribute() == selection.attribute)
        .cloned()
        .collect()
}
