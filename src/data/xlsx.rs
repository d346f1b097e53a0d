// Excel (.xlsx) data source and sink implementation
// Author: Gabriel Demetrios Lafis

use std::io::{Cursor, Write};

use calamine::{open_workbook_from_rs, Data, DataType as CellType, Reader, Xlsx, XlsxError};
use chrono::NaiveDate;
use quick_xml::escape::escape;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::schema::infer_dataset;
use super::{DataError, DataSet, DataSink, DataSource, Value};

/// MIME type of an Office Open XML workbook
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Default sheet name for exported workbooks
pub const DEFAULT_SHEET_NAME: &str = "Cleaned Data";

/// Reads the first worksheet of a workbook; the first row is the header
pub struct XlsxSource;

impl XlsxSource {
    /// Create a new xlsx source
    pub fn new() -> Self {
        XlsxSource
    }

    fn cell_to_value(cell: &Data) -> Value {
        match cell {
            Data::Empty | Data::Error(_) => Value::Null,
            Data::Bool(b) => Value::Boolean(*b),
            Data::Int(i) => Value::Integer(*i),
            // Spreadsheets store every number as a float
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Value::Integer(*f as i64),
            Data::Float(f) => Value::Float(*f),
            Data::String(s) if s.is_empty() => Value::Null,
            Data::String(s) => Value::Text(s.clone()),
            other => match other.as_date() {
                Some(date) => Value::Date(date),
                None => Value::Text(other.to_string()),
            },
        }
    }

    fn header_name(cell: &Data, index: usize) -> String {
        match cell {
            Data::Empty => format!("Unnamed: {}", index),
            Data::String(s) if s.is_empty() => format!("Unnamed: {}", index),
            Data::String(s) => s.clone(),
            other => Self::cell_to_value(other).to_string(),
        }
    }
}

impl Default for XlsxSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSource for XlsxSource {
    fn read(&self, bytes: &[u8]) -> Result<DataSet, DataError> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))
            .map_err(|e: XlsxError| DataError::Parse(format!("Failed to open workbook: {}", e)))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| DataError::Parse("Workbook has no worksheet".to_string()))?
            .map_err(|e| DataError::Parse(format!("Failed to read worksheet: {}", e)))?;

        let mut rows = range.rows();

        let headers: Vec<String> = match rows.next() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(i, cell)| Self::header_name(cell, i))
                .collect(),
            None => return Err(DataError::Parse("Worksheet is empty".to_string())),
        };

        let raw_rows = rows
            .map(|row| row.iter().map(Self::cell_to_value).collect())
            .collect();

        infer_dataset(headers, raw_rows)
    }
}

/// Writes a dataset as a single-sheet workbook, built entirely in memory
pub struct XlsxSink {
    sheet_name: String,
}

impl XlsxSink {
    /// Create a new xlsx sink writing to the named sheet
    pub fn new(sheet_name: &str) -> Self {
        XlsxSink {
            sheet_name: sheet_name.to_string(),
        }
    }

    fn sheet_xml(&self, data: &DataSet) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );

        let header = data
            .schema
            .fields
            .iter()
            .map(|f| Value::Text(f.name.clone()));
        push_row(&mut xml, 1, header);

        for (i, row) in data.data.iter().enumerate() {
            push_row(&mut xml, i + 2, row.values.iter().cloned());
        }

        xml.push_str("</sheetData></worksheet>");
        xml
    }

    fn workbook_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="{}" sheetId="1" r:id="rId1"/></sheets></workbook>"#,
            escape(self.sheet_name.as_str())
        )
    }
}

impl Default for XlsxSink {
    fn default() -> Self {
        Self::new(DEFAULT_SHEET_NAME)
    }
}

impl DataSink for XlsxSink {
    fn write(&self, data: &DataSet) -> Result<Vec<u8>, DataError> {
        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
            ("_rels/.rels", ROOT_RELS_XML.to_string()),
            ("xl/workbook.xml", self.workbook_xml()),
            ("xl/_rels/workbook.xml.rels", WORKBOOK_RELS_XML.to_string()),
            ("xl/styles.xml", STYLES_XML.to_string()),
            ("xl/worksheets/sheet1.xml", self.sheet_xml(data)),
        ];

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, content) in parts.iter() {
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            zip.start_file(*name, options)
                .map_err(|e| DataError::Write(e.to_string()))?;
            zip.write_all(content.as_bytes())?;
        }

        // The archive is only valid once the central directory is written
        let buffer = zip.finish().map_err(|e| DataError::Write(e.to_string()))?;
        Ok(buffer.into_inner())
    }

    fn name(&self) -> &str {
        "xlsx"
    }
}

/// Spreadsheet column letters for a zero-based index (0 -> A, 26 -> AA)
pub fn column_letters(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Days since the spreadsheet epoch (1899-12-30)
fn date_serial(date: &NaiveDate) -> i64 {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default();
    date.signed_duration_since(epoch).num_days()
}

fn push_row<I: Iterator<Item = Value>>(xml: &mut String, row_number: usize, values: I) {
    xml.push_str(&format!(r#"<row r="{}">"#, row_number));

    for (col, value) in values.enumerate() {
        let reference = format!("{}{}", column_letters(col), row_number);
        let cell = match value {
            Value::Null => continue,
            Value::Boolean(b) => format!(r#"<c r="{}" t="b"><v>{}</v></c>"#, reference, b as u8),
            Value::Integer(i) => format!(r#"<c r="{}"><v>{}</v></c>"#, reference, i),
            Value::Float(f) if f.is_finite() => format!(r#"<c r="{}"><v>{}</v></c>"#, reference, f),
            Value::Float(_) => continue,
            Value::Date(d) => format!(
                r#"<c r="{}" s="1"><v>{}</v></c>"#,
                reference,
                date_serial(&d)
            ),
            Value::Text(s) => format!(
                r#"<c r="{}" t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
                reference,
                escape(s.as_str())
            ),
        };
        xml.push_str(&cell);
    }

    xml.push_str("</row>");
}

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/></Types>"#;

const ROOT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#;

const WORKBOOK_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

// Style 1 applies the built-in short date format (numFmtId 14)
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/><xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#;
