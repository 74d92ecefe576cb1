//! CSV export of selected records.

use super::AdminRecord;
use csv::Writer;

pub const CSV_MIME_TYPE: &str = "text/csv";

/// A rendered export, ready to be sent as an attachment.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: String,
    pub data: Vec<u8>,
    /// Data rows, header excluded.
    pub row_count: usize,
}

impl CsvExport {
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Writes a header of the scalar field names, then one row per record.
pub fn export_to_csv<R: AdminRecord>(records: &[R]) -> Result<CsvExport, csv::Error> {
    let meta = R::meta();
    let fields: Vec<_> = meta.scalar_fields().collect();

    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(fields.iter().map(|f| f.name))?;

    for record in records {
        let row: Vec<String> = fields
            .iter()
            .map(|f| {
                record
                    .value(f.name)
                    .map(|v| v.to_export_string())
                    .unwrap_or_default()
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    let data = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    Ok(CsvExport {
        filename: format!("{}.csv", meta.verbose_name),
        data,
        row_count: records.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orm::{choices, questions};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_question_export_matches_documented_example() {
        let question = questions::Model {
            id: 1,
            question_text: "Test?".to_string(),
            pub_date: at(2023, 1, 1, 10, 0),
            created_date: at(2022, 12, 31, 8, 5),
            updated_date: at(2023, 1, 2, 23, 59),
            ref_author_id: 3,
        };

        let export = export_to_csv(&[question]).unwrap();
        let text = String::from_utf8(export.data).unwrap();

        assert_eq!(
            text,
            "question_text,pub_date,created_date,updated_date\n\
             Test?,01/01/2023 10:00,31/12/2022 08:05,02/01/2023 23:59\n"
        );
        assert_eq!(export.filename, "question.csv");
        assert_eq!(export.row_count, 1);
    }

    #[test]
    fn test_row_count_and_header_width() {
        let rows: Vec<choices::Model> = (1..=3)
            .map(|i| choices::Model {
                id: i,
                choice_text: format!("Choice {}", i),
                votes: i * 2,
                created_date: at(2023, 2, 1, 0, 0),
                updated_date: at(2023, 2, 1, 0, 0),
                question_id: 1,
            })
            .collect();

        let export = export_to_csv(&rows).unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(export.data.as_slice());
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].len(), 4);
        assert_eq!(&records[2][1], "4");
    }

    #[test]
    fn test_values_with_delimiters_are_quoted() {
        let question = questions::Model {
            id: 1,
            question_text: "Red, green or \"blue\"?".to_string(),
            pub_date: at(2023, 1, 1, 10, 0),
            created_date: at(2023, 1, 1, 10, 0),
            updated_date: at(2023, 1, 1, 10, 0),
            ref_author_id: 1,
        };

        let export = export_to_csv(&[question]).unwrap();
        let text = String::from_utf8(export.data).unwrap();
        assert!(text.contains("\"Red, green or \"\"blue\"\"?\",01/01/2023 10:00"));
    }

    #[test]
    fn test_empty_selection_writes_header_only() {
        let export = export_to_csv::<questions::Model>(&[]).unwrap();
        assert_eq!(
            export.content_disposition(),
            "attachment; filename=\"question.csv\""
        );
        assert_eq!(
            String::from_utf8(export.data).unwrap(),
            "question_text,pub_date,created_date,updated_date\n"
        );
    }
}
