//! Survey sheet loading with encoding and delimiter auto-detection.
//!
//! Sheets are read from their delimited-text export. The first line holds
//! the question headers; every following line is one respondent. Columns are
//! addressed by position because the questionnaire layout is fixed.

use serde::Serialize;
use std::ops::Range;
use std::path::Path;

use crate::error::{AnalysisError, AnalysisResult, LoadError, LoadResult};

/// One survey cell. `None` when the cell is blank.
pub type Cell = Option<String>;

/// Respondents × questions, addressed by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SurveyTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl SurveyTable {
    /// Build a table. Short rows are padded with blanks, extra cells are ignored.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, None);
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn header(&self, index: usize) -> Option<&str> {
        self.headers.get(index).map(String::as_str)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Number of respondents.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, index: usize) -> AnalysisResult<Vec<Cell>> {
        if index >= self.width() {
            return Err(AnalysisError::MissingColumn {
                index,
                width: self.width(),
            });
        }
        Ok(self.rows.iter().map(|row| row[index].clone()).collect())
    }

    /// Clamp a row range to the table height, as positional slicing does.
    pub fn clamp_rows(&self, range: Range<usize>) -> Range<usize> {
        let start = range.start.min(self.height());
        let end = range.end.min(self.height()).max(start);
        start..end
    }

    /// A new table holding only the rows in `range` (clamped).
    pub fn slice_rows(&self, range: Range<usize>) -> SurveyTable {
        let range = self.clamp_rows(range);
        SurveyTable {
            headers: self.headers.clone(),
            rows: self.rows[range].to_vec(),
        }
    }
}

/// Result of loading with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub table: SurveyTable,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

/// Detect the encoding of raw bytes. Valid UTF-8 is taken as is; anything
/// else goes through chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-15".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes with the named encoding. A byte-order mark is stripped.
///
/// Labels encoding_rs does not know fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> LoadResult<String> {
    let Some(codec) = encoding_rs::Encoding::for_label(encoding.as_bytes()) else {
        tracing::warn!(%encoding, "unknown encoding label, decoding as lossy UTF-8");
        let text = String::from_utf8_lossy(bytes);
        return Ok(text.trim_start_matches('\u{feff}').to_string());
    };
    let (text, used, had_errors) = codec.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = used.name(), "malformed bytes replaced while decoding");
    }
    Ok(text.into_owned())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [';', ',', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use survey_shift::parse_str;
///
/// let table = parse_str("id;trust\n1;Agree\n2;Neutral", ';').unwrap();
/// assert_eq!(table.height(), 2);
/// assert_eq!(table.column(1).unwrap()[0].as_deref(), Some("Agree"));
/// ```
pub fn parse_str(content: &str, delimiter: char) -> LoadResult<SurveyTable> {
    if content.trim().is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_error)?
        .iter()
        .map(String::from)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(parse_error)?;
        rows.push(
            record
                .iter()
                .map(|field| (!field.is_empty()).then(|| field.to_string()))
                .collect(),
        );
    }

    Ok(SurveyTable::from_rows(headers, rows))
}

fn parse_error(err: csv::Error) -> LoadError {
    LoadError::Parse {
        line: err.position().map(|p| p.line()).unwrap_or(0),
        message: err.to_string(),
    }
}

/// Parse bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> LoadResult<ParseResult> {
    if bytes.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    let table = parse_str(&content, delimiter)?;

    tracing::debug!(
        %encoding,
        delimiter = %delimiter.escape_default(),
        rows = table.height(),
        columns = table.width(),
        "parsed survey sheet"
    );

    Ok(ParseResult {
        table,
        encoding,
        delimiter,
    })
}

/// Load a survey sheet file with auto-detection.
///
/// # Example
/// ```ignore
/// let result = load_table("data/P1-1-30.csv")?;
/// println!("Encoding: {}, Delimiter: '{}'", result.encoding, result.delimiter);
/// println!("Respondents: {}", result.table.height());
/// ```
pub fn load_table<P: AsRef<Path>>(path: P) -> LoadResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}
