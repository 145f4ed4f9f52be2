//! CSV record ingestion
//!
//! Turns raw delimited text into an ordered sequence of field-name →
//! value records:
//! - First line is the header row; field names follow header order
//! - Any line-ending style; lines are trimmed; blank lines skipped
//! - Fixed `,` delimiter, no quoted-field support
//! - Non-empty values that parse fully as a decimal become numbers,
//!   everything else stays a string, empty/missing becomes null
//!
//! The required-field check inspects the first record only; rows past
//! the first are not schema-checked individually.

use std::path::Path;

use thiserror::Error;

use crate::constants::csv;
use crate::model::{PlantRecord, ProductRecord};

/// Ingestion error type
#[derive(Debug, Error)]
pub enum IngestError {
    /// The CSV had a header but no data rows
    #[error("csv contains no data rows")]
    EmptyInput,

    /// Required field names are absent from the header set
    #[error("missing required fields: {}", missing.join(", "))]
    Schema {
        /// Required fields not found in the first record
        missing: Vec<String>,
    },

    /// The file does not have a `.csv` name
    #[error("expected a .csv file, got {0}")]
    NotCsv(String),

    /// The file exceeds the size limit
    #[error("file is {size} bytes, limit is {} bytes", csv::MAX_FILE_BYTES)]
    TooLarge {
        /// Actual file size in bytes
        size: u64,
    },

    /// Underlying IO failure while reading the file
    #[error("failed to read csv file: {0}")]
    Io(#[from] std::io::Error),
}

/// A single parsed field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Value parsed fully as a decimal number
    Number(f64),
    /// Non-numeric text
    Text(String),
    /// Missing or empty value
    Null,
}

impl FieldValue {
    fn classify(raw: &str) -> Self {
        if raw.is_empty() {
            FieldValue::Null
        } else if let Ok(n) = raw.parse::<f64>() {
            FieldValue::Number(n)
        } else {
            FieldValue::Text(raw.to_string())
        }
    }
}

/// One data row: field names in header order, mapped to values
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    fields: Vec<(String, FieldValue)>,
}

impl RawRecord {
    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// Whether the field name exists (regardless of value)
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// Field names in header order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(field, _)| field.as_str())
    }

    /// Numeric value of a field, if present and numeric
    pub fn number(&self, name: &str) -> Option<f64> {
        match self.get(name) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    /// String rendering of a field, used for identity columns where a
    /// purely numeric id should still behave as text
    pub fn string_value(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Number(n) => Some(format_number(*n)),
            FieldValue::Null => None,
        }
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Render a numeric field without a trailing `.0` for whole numbers
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Raw CSV text plus lazy access to its records
#[derive(Debug, Clone)]
pub struct CsvSource {
    text: String,
}

impl CsvSource {
    /// Wrap raw CSV text
    pub fn from_text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read CSV text from a file, enforcing the `.csv` extension and
    /// size limit
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(csv::FILE_EXTENSION))
            .unwrap_or(false);
        if !is_csv {
            return Err(IngestError::NotCsv(path.display().to_string()));
        }

        let size = std::fs::metadata(path)?.len();
        if size > csv::MAX_FILE_BYTES {
            return Err(IngestError::TooLarge { size });
        }

        Ok(Self::from_text(std::fs::read_to_string(path)?))
    }

    /// Field names from the header row, in order
    pub fn headers(&self) -> Vec<&str> {
        match self.text.trim().lines().next() {
            Some(header) => header.split(',').map(str::trim).collect(),
            None => Vec::new(),
        }
    }

    /// Lazy iterator over data records; restartable by calling again
    pub fn records(&self) -> Records<'_> {
        let trimmed = self.text.trim();
        let mut lines = trimmed.lines();
        let headers = match lines.next() {
            Some(header) => header.split(',').map(str::trim).collect(),
            None => Vec::new(),
        };
        Records { headers, lines }
    }

    /// Collect all records, failing when there are zero data rows
    pub fn parse(&self) -> Result<Vec<RawRecord>, IngestError> {
        let records: Vec<RawRecord> = self.records().collect();
        if records.is_empty() {
            return Err(IngestError::EmptyInput);
        }
        Ok(records)
    }
}

/// Lazy record iterator over a [`CsvSource`]
pub struct Records<'a> {
    headers: Vec<&'a str>,
    lines: std::str::Lines<'a>,
}

impl Iterator for Records<'_> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<RawRecord> {
        loop {
            let line = self.lines.next()?.trim();
            if line.is_empty() {
                continue;
            }

            let values: Vec<&str> = line.split(',').map(str::trim).collect();
            let fields = self
                .headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = values
                        .get(i)
                        .map(|raw| FieldValue::classify(raw))
                        .unwrap_or(FieldValue::Null);
                    (header.to_string(), value)
                })
                .collect();

            return Some(RawRecord { fields });
        }
    }
}

/// Check that required field names appear in the header set
///
/// Only the first record is inspected; this mirrors the upload-time
/// validation contract.
pub fn check_required(records: &[RawRecord], required: &[&str]) -> Result<(), IngestError> {
    let first = records.first().ok_or(IngestError::EmptyInput)?;
    let missing: Vec<String> = required
        .iter()
        .filter(|name| !first.contains(name))
        .map(|name| name.to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::Schema { missing })
    }
}

/// Parse and validate a production dataset
pub fn parse_products(source: &CsvSource) -> Result<Vec<ProductRecord>, IngestError> {
    let raw = source.parse()?;
    check_required(&raw, ProductRecord::REQUIRED_FIELDS)?;
    Ok(raw.iter().map(ProductRecord::from_raw).collect())
}

/// Parse and validate a facility dataset
pub fn parse_plants(source: &CsvSource) -> Result<Vec<PlantRecord>, IngestError> {
    let raw = source.parse()?;
    check_required(&raw, PlantRecord::REQUIRED_FIELDS)?;
    Ok(raw.iter().map(PlantRecord::from_raw).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTS_CSV: &str = "\
product_id,current_plant_id,monthly_demand,current_unit_cost,yield_rate
P-100,PLANT-A,1200,4.5,98.5
P-200,PLANT-B,800,2.25,
P-300,PLANT-A,500,9.0,97.0
";

    #[test]
    fn test_record_count_matches_data_rows() {
        let source = CsvSource::from_text(PRODUCTS_CSV);
        let records = source.parse().expect("parse csv");
        assert_eq!(records.len(), 3);
        for record in &records {
            let keys: Vec<&str> = record.keys().collect();
            assert_eq!(
                keys,
                vec![
                    "product_id",
                    "current_plant_id",
                    "monthly_demand",
                    "current_unit_cost",
                    "yield_rate"
                ]
            );
        }
    }

    #[test]
    fn test_value_typing() {
        let source = CsvSource::from_text(PRODUCTS_CSV);
        let records = source.parse().expect("parse csv");
        assert_eq!(
            records[0].get("product_id"),
            Some(&FieldValue::Text("P-100".to_string()))
        );
        assert_eq!(records[0].number("monthly_demand"), Some(1200.0));
        assert_eq!(records[1].get("yield_rate"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_crlf_and_blank_lines() {
        let source =
            CsvSource::from_text("plant_id,available_capacity\r\n\r\nPL-1,5000\r\n\r\nPL-2,3000\r\n");
        let records = source.parse().expect("parse csv");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].string_value("plant_id"), Some("PL-2".to_string()));
    }

    #[test]
    fn test_short_row_pads_with_null() {
        let source = CsvSource::from_text("a,b,c\n1,2\n");
        let records = source.parse().expect("parse csv");
        assert_eq!(records[0].get("c"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_iterator_is_restartable() {
        let source = CsvSource::from_text(PRODUCTS_CSV);
        assert_eq!(source.records().count(), 3);
        assert_eq!(source.records().count(), 3);
    }

    #[test]
    fn test_empty_input_error() {
        let source = CsvSource::from_text("product_id,monthly_demand\n");
        assert!(matches!(source.parse(), Err(IngestError::EmptyInput)));

        let source = CsvSource::from_text("");
        assert!(matches!(source.parse(), Err(IngestError::EmptyInput)));
    }

    #[test]
    fn test_schema_check_reports_missing_fields() {
        let source = CsvSource::from_text("product_id,monthly_demand\nP-1,100\n");
        let records = source.parse().expect("parse csv");
        let err = check_required(&records, ProductRecord::REQUIRED_FIELDS).unwrap_err();
        match err {
            IngestError::Schema { missing } => {
                assert_eq!(missing, vec!["current_plant_id", "current_unit_cost"]);
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_products_maps_fields() {
        let source = CsvSource::from_text(PRODUCTS_CSV);
        let products = parse_products(&source).expect("parse products");
        assert_eq!(products.len(), 3);
        assert_eq!(products[0].product_id, "P-100");
        assert_eq!(products[0].current_plant_id.as_deref(), Some("PLANT-A"));
        assert_eq!(products[0].monthly_demand, Some(1200.0));
        assert_eq!(products[1].yield_rate, None);
    }

    #[test]
    fn test_numeric_identity_stays_textual() {
        let source = CsvSource::from_text(
            "product_id,current_plant_id,monthly_demand,current_unit_cost\n1001,PLANT-A,10,1.5\n",
        );
        let products = parse_products(&source).expect("parse products");
        assert_eq!(products[0].product_id, "1001");
    }

    #[test]
    fn test_from_path_rejects_non_csv() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "a,b\n1,2\n").expect("write file");
        assert!(matches!(
            CsvSource::from_path(&path),
            Err(IngestError::NotCsv(_))
        ));
    }
}
