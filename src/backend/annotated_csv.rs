//! Annotated CSV parsing for Flux query responses
//!
//! The InfluxDB 2.x `/api/v2/query` endpoint answers in annotated CSV:
//! `#datatype` / `#group` / `#default` annotation rows, a header row per
//! table, data rows with leading annotation, `result`, and `table` meta
//! columns, and a blank line between tables. After the `pivot` + `keep`
//! stages of our query the remaining columns are `_time`, `device`, and the
//! pivoted field columns.
//!
//! Values are classified by content ([`FieldValue::parse`]) rather than by
//! the `#datatype` annotation; an empty cell means the field is absent for
//! that row. Rows lacking `_time` or `device` still produce a [`RawRecord`]
//! and are rejected as malformed during conversion, one record at a time.
//!
//! Query failures surface in-band as a CSV table with `error` and
//! `reference` columns; those are turned into [`FluxVisError::QueryFailure`].

use chrono::{DateTime, Utc};

use crate::error::{FluxVisError, Result};
use crate::types::{FieldValue, RawRecord};

/// Meta columns carried by every annotated CSV table
const META_COLUMNS: &[&str] = &["", "result", "table", "_start", "_stop", "_measurement"];

/// Parse an annotated CSV response body into raw records
pub fn parse_annotated_csv(body: &str) -> Result<Vec<RawRecord>> {
    let mut records = Vec::new();
    let mut header: Option<Vec<String>> = None;

    for line in body.lines() {
        let line = line.trim_end_matches('\r');

        if line.is_empty() {
            // Table boundary; the next non-annotation row is a new header
            header = None;
            continue;
        }
        if line.starts_with('#') {
            continue;
        }

        let cells = split_csv_line(line);
        match &header {
            None => {
                // Header row; an `error` header means the next data row
                // carries the failure message instead of records
                header = Some(cells);
            }
            Some(columns) => {
                if columns.iter().any(|c| c == "error") {
                    let message = error_message(columns, &cells);
                    return Err(FluxVisError::QueryFailure(message));
                }
                records.push(parse_row(columns, &cells));
            }
        }
    }

    Ok(records)
}

/// Extract the error message from an `error,reference` table row
fn error_message(columns: &[String], cells: &[String]) -> String {
    columns
        .iter()
        .position(|c| c == "error")
        .and_then(|idx| cells.get(idx))
        .filter(|msg| !msg.is_empty())
        .cloned()
        .unwrap_or_else(|| "unspecified query error".to_string())
}

/// Build a raw record from one data row
fn parse_row(columns: &[String], cells: &[String]) -> RawRecord {
    let mut record = RawRecord::default();

    for (column, cell) in columns.iter().zip(cells.iter()) {
        if cell.is_empty() || META_COLUMNS.contains(&column.as_str()) {
            continue;
        }
        match column.as_str() {
            "_time" | "time" => {
                record.time = parse_time(cell);
            }
            "device" => {
                record.device = Some(cell.clone());
            }
            _ => {
                record
                    .fields
                    .insert(column.clone(), FieldValue::parse(cell));
            }
        }
    }

    record
}

/// Parse an RFC 3339 timestamp, normalizing to UTC
fn parse_time(cell: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(cell)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Split one CSV line into cells, honoring double-quoted fields
///
/// Inside quotes a doubled quote (`""`) is a literal quote. Newlines inside
/// quoted values are not expected here; the query projects scalar columns
/// only.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                cells.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    cells.push(current);
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
#datatype,string,long,dateTime:RFC3339,string,double,double,boolean\r
#group,false,false,false,true,false,false,false\r
#default,_result,,,,,,\r
,result,table,_time,device,temperature,batteryVoltage,hall\r
,_result,0,2025-10-22T10:00:00Z,satellite-1,21.5,3.712,false\r
,_result,0,2025-10-22T10:05:00Z,satellite-1,21.7,,true\r
,_result,1,2025-10-22T10:02:00Z,satellite-2,,3.65,false\r
\r
";

    #[test]
    fn test_parse_sample_response() {
        let records = parse_annotated_csv(SAMPLE).unwrap();
        assert_eq!(records.len(), 3);

        let first = &records[0];
        assert_eq!(first.device.as_deref(), Some("satellite-1"));
        assert_eq!(
            first.time.unwrap().to_rfc3339(),
            "2025-10-22T10:00:00+00:00"
        );
        assert_eq!(
            first.fields.get("temperature"),
            Some(&FieldValue::Number(21.5))
        );
        assert_eq!(first.fields.get("hall"), Some(&FieldValue::Flag(false)));

        // Empty cells are absent fields, not zeros
        assert!(records[1].fields.get("batteryVoltage").is_none());
        assert!(records[2].fields.get("temperature").is_none());
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse_annotated_csv("").unwrap().is_empty());
        assert!(parse_annotated_csv("\r\n\r\n").unwrap().is_empty());
    }

    #[test]
    fn test_parse_multiple_tables() {
        let body = "\
,result,table,_time,device,counter\n\
,_result,0,2025-10-22T10:00:00Z,satellite-1,7\n\
\n\
,result,table,_time,device,counter\n\
,_result,1,2025-10-22T10:01:00Z,satellite-2,8\n";
        let records = parse_annotated_csv(body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].device.as_deref(), Some("satellite-2"));
    }

    #[test]
    fn test_error_table_becomes_query_failure() {
        let body = "\
#datatype,string,string\n\
#group,true,true\n\
#default,,\n\
,error,reference\n\
,\"compilation failed: error at @3:18-3:25: undefined identifier\",\n";
        let err = parse_annotated_csv(body).unwrap_err();
        match err {
            FluxVisError::QueryFailure(msg) => {
                assert!(msg.contains("compilation failed"));
            }
            other => panic!("expected QueryFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_row_without_time_kept_as_raw() {
        let body = "\
,result,table,_time,device,counter\n\
,_result,0,,satellite-1,7\n";
        let records = parse_annotated_csv(body).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].time.is_none());
        assert_eq!(records[0].device.as_deref(), Some("satellite-1"));
    }

    #[test]
    fn test_offset_timestamp_normalized_to_utc() {
        let body = "\
,result,table,_time,device,counter\n\
,_result,0,2025-10-22T12:00:00+02:00,satellite-1,7\n";
        let records = parse_annotated_csv(body).unwrap();
        assert_eq!(
            records[0].time.unwrap().to_rfc3339(),
            "2025-10-22T10:00:00+00:00"
        );
    }

    #[test]
    fn test_split_csv_line_quotes() {
        assert_eq!(
            split_csv_line(r#"a,"b,c",d"#),
            vec!["a", "b,c", "d"]
        );
        assert_eq!(
            split_csv_line(r#""say ""hi""",x"#),
            vec![r#"say "hi""#, "x"]
        );
        assert_eq!(split_csv_line(",,"), vec!["", "", ""]);
    }

    #[test]
    fn test_text_field_classification() {
        let body = "\
,result,table,_time,device,release\n\
,_result,0,2025-10-22T10:00:00Z,satellite-1,fw-2.1\n";
        let records = parse_annotated_csv(body).unwrap();
        assert_eq!(
            records[0].fields.get("release"),
            Some(&FieldValue::Text("fw-2.1".to_string()))
        );
    }
}
