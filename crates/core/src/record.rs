//! Input data handed over by the collection layer.

use crate::format::parse_period;
use acs_report_types::DataValidationError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Aggregated ACS figures for one reporting period.
///
/// Field aliases accept the collector's original JSON keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodRecord {
    #[serde(alias = "competencia")]
    pub period: String,
    #[serde(default, alias = "vlEsperado")]
    pub expected_amount: f64,
    #[serde(default, alias = "vlTotalAcs")]
    pub received_amount: f64,
    #[serde(default, alias = "qtTotalCredenciado")]
    pub credentialed_count: u32,
    #[serde(default, alias = "qtTotalPago")]
    pub paid_count: u32,
}

impl PeriodRecord {
    pub fn new(
        period: impl Into<String>,
        expected_amount: f64,
        received_amount: f64,
        credentialed_count: u32,
        paid_count: u32,
    ) -> Self {
        Self {
            period: period.into(),
            expected_amount,
            received_amount,
            credentialed_count,
            paid_count,
        }
    }

    pub fn period_start(&self) -> Option<NaiveDate> {
        parse_period(&self.period)
    }

    /// Nothing received and nobody paid.
    pub fn is_empty_submission(&self) -> bool {
        self.received_amount == 0.0 && self.paid_count == 0
    }

    fn validate(&self, index: usize) -> Result<(), DataValidationError> {
        if self.period.trim().is_empty() {
            return Err(DataValidationError::new(
                format!("records[{index}].period"),
                "must not be empty",
            ));
        }
        for (name, value) in [
            ("expected_amount", self.expected_amount),
            ("received_amount", self.received_amount),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DataValidationError::new(
                    format!("records[{index}].{name}"),
                    format!("must be a finite, non-negative amount, got {value}"),
                ));
            }
        }
        Ok(())
    }
}

/// Chronological order: parseable labels by date, then the rest by text.
pub fn chronological(a: &PeriodRecord, b: &PeriodRecord) -> Ordering {
    period_order(&a.period, &b.period)
}

/// [`chronological`] for bare period labels.
pub fn period_order(a: &str, b: &str) -> Ordering {
    match (parse_period(a), parse_period(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportInput {
    #[serde(alias = "municipio")]
    pub municipality: String,
    #[serde(alias = "uf")]
    pub region: String,
    /// Covered period labels, oldest first. Derived from the records when empty.
    #[serde(default, alias = "competencias")]
    pub periods: Vec<String>,
    pub records: Vec<PeriodRecord>,
    #[serde(default)]
    pub generated_at: Option<NaiveDateTime>,
}

impl ReportInput {
    pub fn new(municipality: impl Into<String>, region: impl Into<String>, records: Vec<PeriodRecord>) -> Self {
        Self {
            municipality: municipality.into(),
            region: region.into(),
            periods: Vec::new(),
            records,
            generated_at: None,
        }
    }

    pub fn with_periods(mut self, periods: Vec<String>) -> Self {
        self.periods = periods;
        self
    }

    pub fn with_generated_at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = Some(generated_at);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn validate(&self) -> Result<(), DataValidationError> {
        if self.municipality.trim().is_empty() {
            return Err(DataValidationError::new("municipality", "must not be empty"));
        }
        if self.region.trim().is_empty() {
            return Err(DataValidationError::new("region", "must not be empty"));
        }
        if self.records.is_empty() {
            return Err(DataValidationError::new("records", "at least one period record is required"));
        }
        if let Some(index) = self.periods.iter().position(|p| p.trim().is_empty()) {
            return Err(DataValidationError::new(
                format!("periods[{index}]"),
                "must not be empty",
            ));
        }
        self.records
            .iter()
            .enumerate()
            .try_for_each(|(index, record)| record.validate(index))
    }

    /// Records sorted oldest first. The input order is never trusted.
    pub fn sorted_records(&self) -> Vec<PeriodRecord> {
        let mut records = self.records.clone();
        records.sort_by(chronological);
        records
    }

    /// The explicit period list, or the record periods, in chronological order.
    pub fn covered_periods(&self) -> Vec<String> {
        if self.periods.is_empty() {
            return self.sorted_records().into_iter().map(|r| r.period).collect();
        }
        let mut periods = self.periods.clone();
        periods.sort_by(|a, b| period_order(a, b));
        periods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ReportInput {
        ReportInput::new(
            "Anadia",
            "AL",
            vec![
                PeriodRecord::new("202503", 10_000.0, 9_000.0, 10, 9),
                PeriodRecord::new("202501", 10_000.0, 10_000.0, 10, 10),
                PeriodRecord::new("2025/02", 10_000.0, 9_500.0, 10, 10),
            ],
        )
    }

    #[test]
    fn test_sorted_records_are_chronological() {
        let periods: Vec<String> = input().sorted_records().into_iter().map(|r| r.period).collect();
        assert_eq!(periods, vec!["202501", "2025/02", "202503"]);
        assert_eq!(input().covered_periods(), periods);
    }

    #[test]
    fn test_explicit_periods_win() {
        let input = input().with_periods(vec!["202501".into(), "202503".into()]);
        assert_eq!(input.covered_periods(), vec!["202501", "202503"]);
    }

    #[test]
    fn test_explicit_periods_are_sorted() {
        let input = input().with_periods(vec!["202503".into(), "2025-01".into(), "202502".into(), "n/d".into()]);
        assert_eq!(input.covered_periods(), vec!["2025-01", "202502", "202503", "n/d"]);
    }

    #[test]
    fn test_validation() {
        assert!(input().validate().is_ok());

        let mut missing = input();
        missing.municipality = "  ".into();
        assert_eq!(missing.validate().unwrap_err().field, "municipality");

        let mut empty = input();
        empty.records.clear();
        assert_eq!(empty.validate().unwrap_err().field, "records");

        let mut negative = input();
        negative.records[1].received_amount = -1.0;
        assert_eq!(negative.validate().unwrap_err().field, "records[1].received_amount");

        let mut nan = input();
        nan.records[0].expected_amount = f64::NAN;
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_paid_above_credentialed_is_accepted() {
        let input = ReportInput::new("X", "Y", vec![PeriodRecord::new("202501", 1.0, 1.0, 5, 7)]);
        assert!(input.validate().is_ok());
    }

    #[test]
    fn test_deserializes_collector_keys() {
        let json = r#"{
            "municipio": "Anadia",
            "uf": "AL",
            "records": [
                {"competencia": "202503", "vlEsperado": 100.0, "vlTotalAcs": 90.0,
                 "qtTotalCredenciado": 5, "qtTotalPago": 4}
            ]
        }"#;
        let input = ReportInput::from_json(json).unwrap();
        assert_eq!(input.municipality, "Anadia");
        assert_eq!(input.records[0].paid_count, 4);
        assert_eq!(input.generated_at, None);
    }
}
