use std::collections::BTreeMap;

use crate::models::{AggregatedRecord, AnnotatedRecord};

pub struct Annotator<'a> {
    descriptions: &'a BTreeMap<String, String>,
}

impl<'a> Annotator<'a> {
    pub fn new(descriptions: &'a BTreeMap<String, String>) -> Self {
        Self { descriptions }
    }

    /// Exact-match lookup; industries without an entry get no description.
    pub fn annotate(&self, records: &[AggregatedRecord]) -> Vec<AnnotatedRecord> {
        records
            .iter()
            .map(|r| AnnotatedRecord {
                industry: r.industry.clone(),
                year: r.year.clone(),
                metric: r.metric.clone(),
                attribute: r.attribute.clone(),
                scenario: r.scenario.clone(),
                value: r.value,
                description: self.descriptions.get(&r.industry).cloned(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Period;
    use crate::tables::Variant;

    fn agg(industry: &str) -> AggregatedRecord {
        AggregatedRecord {
            industry: industry.to_string(),
            year: Period {
                index: 0,
                label: "0-05".to_string(),
            },
            metric: "Number of Jobs".to_string(),
            attribute: "Total".to_string(),
            scenario: "Base Case".to_string(),
            value: 10.0,
            rows: 1,
        }
    }

    #[test]
    fn test_known_industries_get_descriptions() {
        let tables = Variant::Split.tables();
        let out = Annotator::new(&tables.descriptions).annotate(&[
            agg("Government"),
            agg("Construction"),
            agg("Service and Trade"),
        ]);
        assert!(out.iter().all(|r| r.description.is_some()));
        assert!(out[0]
            .description
            .as_deref()
            .unwrap()
            .starts_with("Example: Federal"));
    }

    #[test]
    fn test_unknown_industry_gets_none() {
        let tables = Variant::Split.tables();
        let out = Annotator::new(&tables.descriptions).annotate(&[agg("Fishing"), agg("government")]);
        assert_eq!(out[0].description, None);
        assert_eq!(out[1].description, None);
        assert_eq!(out[0].value, 10.0);
    }
}
