use tracing::{debug, warn};

use crate::error::Result;
use crate::models::{NormalizedRecord, RawRecord};
use crate::tables::LookupTables;

/// Relabels and filters raw rows through a set of lookup tables. Each row is
/// handled independently of every other row.
pub struct Normalizer<'a> {
    tables: &'a LookupTables,
}

impl<'a> Normalizer<'a> {
    pub fn new(tables: &'a LookupTables) -> Self {
        Self { tables }
    }

    /// Normalize a whole load. Any unmapped year fails the load, even on rows
    /// the attribute or metric filters would have dropped.
    pub fn normalize(&self, records: &[RawRecord]) -> Result<Vec<NormalizedRecord>> {
        let mut out = Vec::with_capacity(records.len());
        for record in records {
            if let Some(n) = self.normalize_record(record)? {
                out.push(n);
            }
        }
        debug!(
            kept = out.len(),
            dropped = records.len() - out.len(),
            "normalized records"
        );
        Ok(out)
    }

    /// `Ok(None)` means the row is filtered out, not that it is invalid.
    pub fn normalize_record(&self, record: &RawRecord) -> Result<Option<NormalizedRecord>> {
        let year = self.tables.period(record.year).inspect_err(|_| {
            if let Some((file, line)) = &record.source {
                warn!(file = %file, line, year = record.year, "unmapped year");
            }
        })?;

        if !self.tables.attribute_allowed(&record.attribute) {
            return Ok(None);
        }
        let stripped = self.tables.strip_metric_prefix(&record.metric);
        let Some(metric) = self.tables.metric_label(stripped) else {
            return Ok(None);
        };

        Ok(Some(NormalizedRecord {
            industry: self.tables.industry_label(&record.industry),
            year,
            metric,
            attribute: record.attribute.clone(),
            scenario: record.scenario.clone(),
            value: record.value,
        }))
    }

    /// Feed an already-normalized record back through the same tables. For
    /// tables that pass `LookupTables::validate` this returns the record
    /// unchanged.
    #[cfg(test)]
    pub fn renormalize(&self, record: &NormalizedRecord) -> Result<Option<NormalizedRecord>> {
        let year = self
            .tables
            .period_by_label(&record.year.label)
            .ok_or_else(|| {
                crate::error::ImpactError::Tables(format!("unknown period label '{}'", record.year.label))
            })?;
        if !self.tables.attribute_allowed(&record.attribute) {
            return Ok(None);
        }
        let Some(metric) = self.tables.metric_label(&record.metric) else {
            return Ok(None);
        };
        Ok(Some(NormalizedRecord {
            industry: self.tables.industry_label(&record.industry),
            year,
            metric,
            attribute: record.attribute.clone(),
            scenario: record.scenario.clone(),
            value: record.value,
        }))
    }
}
