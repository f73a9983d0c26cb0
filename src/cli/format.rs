//! Output formatting utilities for CLI operations

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::batch::BatchOutcome;
use crate::client::{Hit, QueryOptions};
use crate::error::FerroError;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON (default)
    #[default]
    Json,
    /// One compact JSON record per line
    JsonLines,
    /// Tab-separated table
    Tsv,
}

impl FromStr for OutputFormat {
    type Err = FerroError;

    /// Parse an output format from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use ferro_myvariant::cli::OutputFormat;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
    /// assert_eq!(OutputFormat::from_str("JSONL").unwrap(), OutputFormat::JsonLines);
    /// assert_eq!(OutputFormat::from_str("tsv").unwrap(), OutputFormat::Tsv);
    /// assert!(OutputFormat::from_str("xml").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "jsonl" | "json-lines" | "ndjson" => Ok(OutputFormat::JsonLines),
            "tsv" | "table" => Ok(OutputFormat::Tsv),
            other => Err(FerroError::malformed(format!(
                "unknown output format '{}' (expected json, jsonl or tsv)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::JsonLines => write!(f, "jsonl"),
            OutputFormat::Tsv => write!(f, "tsv"),
        }
    }
}

/// How hits are laid out as table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableMode {
    /// Nested objects flattened into dotted columns (`cadd.phred`)
    #[default]
    Normal,
    /// One column per top-level key (usually one per data source)
    BySource,
}

impl FromStr for TableMode {
    type Err = FerroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" | "1" => Ok(TableMode::Normal),
            "by-source" | "by_source" | "2" => Ok(TableMode::BySource),
            other => Err(FerroError::malformed(format!(
                "unknown table mode '{}' (expected normal or by-source)",
                other
            ))),
        }
    }
}

impl fmt::Display for TableMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableMode::Normal => write!(f, "normal"),
            TableMode::BySource => write!(f, "by-source"),
        }
    }
}

/// Flatten one hit into column name / cell pairs
///
/// # Examples
///
/// ```
/// use ferro_myvariant::cli::{flatten_hit, TableMode};
/// use ferro_myvariant::client::Hit;
/// use serde_json::json;
///
/// let hit: Hit = serde_json::from_value(json!({"_id": "x", "cadd": {"phred": 23.5}})).unwrap();
///
/// let normal = flatten_hit(&hit, TableMode::Normal);
/// assert_eq!(normal["cadd.phred"], "23.5");
///
/// let by_source = flatten_hit(&hit, TableMode::BySource);
/// assert_eq!(by_source["cadd"], r#"{"phred":23.5}"#);
/// ```
pub fn flatten_hit(hit: &Hit, mode: TableMode) -> BTreeMap<String, String> {
    let mut row = BTreeMap::new();
    match mode {
        TableMode::Normal => flatten_into(&mut row, None, hit.as_map()),
        TableMode::BySource => {
            for (key, value) in hit.as_map() {
                row.insert(key.clone(), cell(value));
            }
        }
    }
    row
}

fn flatten_into(row: &mut BTreeMap<String, String>, prefix: Option<&str>, map: &Map<String, Value>) {
    for (key, value) in map {
        let column = match prefix {
            Some(prefix) => format!("{}.{}", prefix, key),
            None => key.clone(),
        };
        match value {
            Value::Object(inner) if !inner.is_empty() => flatten_into(row, Some(&column), inner),
            _ => {
                row.insert(column, cell(value));
            }
        }
    }
}

/// Render a JSON value as a single TSV cell
fn cell(value: &Value) -> String {
    let text = match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.replace(['\t', '\n', '\r'], " ")
}

/// Write hits as a tab-separated table with a header row
///
/// Columns are the union of all flattened keys, sorted. With
/// `index_by_query` the `query` column comes first.
pub fn write_table<W: Write>(
    writer: &mut W,
    hits: &[Hit],
    mode: TableMode,
    index_by_query: bool,
) -> io::Result<()> {
    let rows: Vec<BTreeMap<String, String>> = hits.iter().map(|h| flatten_hit(h, mode)).collect();

    let mut columns: BTreeSet<&str> = BTreeSet::new();
    for row in &rows {
        columns.extend(row.keys().map(String::as_str));
    }
    let mut header: Vec<&str> = Vec::with_capacity(columns.len());
    if index_by_query && columns.remove("query") {
        header.push("query");
    }
    header.extend(columns);

    writeln!(writer, "{}", header.join("\t"))?;
    for row in &rows {
        let cells: Vec<&str> = header
            .iter()
            .map(|column| row.get(*column).map(String::as_str).unwrap_or(""))
            .collect();
        writeln!(writer, "{}", cells.join("\t"))?;
    }
    Ok(())
}

/// Write hits in the requested format
pub fn write_hits<W: Write>(
    writer: &mut W,
    hits: &[Hit],
    format: OutputFormat,
    mode: TableMode,
    index_by_query: bool,
) -> Result<(), FerroError> {
    match format {
        OutputFormat::Json => write_json(writer, hits)?,
        OutputFormat::JsonLines => {
            for hit in hits {
                serde_json::to_writer(&mut *writer, hit)?;
                writeln!(writer)?;
            }
        }
        OutputFormat::Tsv => write_table(writer, hits, mode, index_by_query)?,
    }
    Ok(())
}

/// Write hits laid out as `opts` asks
///
/// A table mode on `opts` selects TSV output in that mode; otherwise hits
/// are written in `format`. The query column leads the table only when
/// `opts.index_by_query` is set.
pub fn write_results<W: Write>(
    writer: &mut W,
    hits: &[Hit],
    format: OutputFormat,
    opts: &QueryOptions,
) -> Result<(), FerroError> {
    match opts.table {
        Some(mode) => write_table(writer, hits, mode, opts.index_by_query)?,
        None => write_hits(writer, hits, format, TableMode::default(), opts.index_by_query)?,
    }
    Ok(())
}

/// Write the outcome of a batch run
///
/// Raw bodies are written verbatim, one per line, and reports as JSON.
pub fn write_outcome<W: Write>(
    writer: &mut W,
    format: OutputFormat,
    opts: &QueryOptions,
    outcome: &BatchOutcome,
) -> Result<(), FerroError> {
    match outcome {
        BatchOutcome::Hits(hits) => write_results(writer, hits, format, opts)?,
        BatchOutcome::Raw(body) => writeln!(writer, "{}", body)?,
        BatchOutcome::RawBatches(bodies) => {
            for body in bodies {
                writeln!(writer, "{}", body)?;
            }
        }
        BatchOutcome::Report(report) => write_json(writer, report)?,
    }
    Ok(())
}

/// Write any serializable value as pretty JSON followed by a newline
pub fn write_json<W: Write, T: Serialize + ?Sized>(writer: &mut W, value: &T) -> Result<(), FerroError> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    Ok(())
}

/// Write a VCF-to-HGVS conversion error
///
/// # Examples
///
/// ```
/// use ferro_myvariant::cli::output_error;
/// use ferro_myvariant::FerroError;
/// use std::io::Cursor;
///
/// let mut buffer = Cursor::new(Vec::new());
/// let error = FerroError::malformed("line 3: invalid position 'abc'");
/// output_error(&mut buffer, "calls.vcf", &error).unwrap();
/// let result = String::from_utf8(buffer.into_inner()).unwrap();
/// assert!(result.starts_with("ERROR: calls.vcf - [E2002]"));
/// ```
pub fn output_error<W: Write>(writer: &mut W, input: &str, error: &FerroError) -> io::Result<()> {
    writeln!(writer, "ERROR: {} - {}", input, error.detailed_message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hits(values: Vec<Value>) -> Vec<Hit> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    fn render(hits: &[Hit], mode: TableMode, index: bool) -> String {
        let mut buffer = Vec::new();
        write_table(&mut buffer, hits, mode, index).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_table_mode_from_str() {
        assert_eq!(TableMode::from_str("by_source").unwrap(), TableMode::BySource);
        assert_eq!(TableMode::from_str("1").unwrap(), TableMode::Normal);
        assert!(TableMode::from_str("wide").is_err());
    }

    #[test]
    fn test_normal_table_flattens_nested_fields() {
        let hits = hits(vec![
            json!({"query": "rs1", "_id": "a", "cadd": {"phred": 10, "gene": {"name": "X"}}}),
            json!({"query": "rs2", "notfound": true}),
        ]);
        let out = render(&hits, TableMode::Normal, true);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "query\t_id\tcadd.gene.name\tcadd.phred\tnotfound");
        assert_eq!(lines[1], "rs1\ta\tX\t10\t");
        assert_eq!(lines[2], "rs2\t\t\t\ttrue");
    }

    #[test]
    fn test_by_source_table_keeps_top_level_keys() {
        let hits = hits(vec![json!({"_id": "a", "dbsnp": {"rsid": "rs1"}})]);
        let out = render(&hits, TableMode::BySource, false);
        assert_eq!(out, "_id\tdbsnp\na\t{\"rsid\":\"rs1\"}\n");
    }

    #[test]
    fn test_cells_never_break_rows() {
        let hits = hits(vec![json!({"note": "a\tb\nc"})]);
        let out = render(&hits, TableMode::Normal, false);
        assert_eq!(out.lines().count(), 2);
        assert!(out.contains("a b c"));
    }

    #[test]
    fn test_lists_are_json_cells() {
        let hits = hits(vec![json!({"ann": [1, 2]})]);
        let row = flatten_hit(&hits[0], TableMode::Normal);
        assert_eq!(row["ann"], "[1,2]");
    }

    fn outcome_text(opts: &QueryOptions, outcome: &BatchOutcome) -> String {
        let mut buffer = Vec::new();
        write_outcome(&mut buffer, OutputFormat::Json, opts, outcome).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_outcome_table_follows_options() {
        let outcome = BatchOutcome::Hits(hits(vec![json!({"_id": "a", "query": "rs1"})]));

        let indexed = QueryOptions::new().table(TableMode::Normal);
        assert_eq!(outcome_text(&indexed, &outcome), "query\t_id\nrs1\ta\n");

        let unindexed = indexed.clone().index_by_query(false);
        assert_eq!(outcome_text(&unindexed, &outcome), "_id\tquery\na\trs1\n");

        let by_source = QueryOptions::new()
            .table(TableMode::BySource)
            .index_by_query(false);
        let nested = BatchOutcome::Hits(hits(vec![json!({"_id": "a", "cadd": {"phred": 1}})]));
        assert_eq!(
            outcome_text(&by_source, &nested),
            "_id\tcadd\na\t{\"phred\":1}\n"
        );
    }

    #[test]
    fn test_outcome_without_table_uses_format() {
        let outcome = BatchOutcome::Hits(hits(vec![json!({"_id": "a"})]));
        let text = outcome_text(&QueryOptions::new(), &outcome);
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), json!([{"_id": "a"}]));

        let raw = BatchOutcome::RawBatches(vec!["[1]".to_string(), "[2]".to_string()]);
        assert_eq!(outcome_text(&QueryOptions::new(), &raw), "[1]\n[2]\n");
    }

    #[test]
    fn test_write_hits_json_lines() {
        let hits = hits(vec![json!({"_id": "a"}), json!({"_id": "b"})]);
        let mut buffer = Vec::new();
        write_hits(&mut buffer, &hits, OutputFormat::JsonLines, TableMode::Normal, true).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "{\"_id\":\"a\"}\n{\"_id\":\"b\"}\n"
        );
    }
}
