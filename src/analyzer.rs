use crate::error::AnalyzeError;
use crate::parser::{self, LogRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, trace};

/// Running counters for one analysis pass.
///
/// Each successfully parsed line updates the tables exactly once; lines that
/// fail to parse only bump `skipped_lines`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Aggregator {
    total_lines: usize,
    skipped_lines: usize,
    ip_totals: HashMap<String, usize>,
    ip_not_found: HashMap<String, usize>,
    ip_server_errors: HashMap<String, usize>,
    path_totals: HashMap<String, usize>,
    status_totals: HashMap<u16, usize>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one parsed record into the counters
    pub fn record(&mut self, rec: &LogRecord) {
        trace!(
            ip = %rec.ip,
            time = %rec.timestamp,
            request = %rec.request_line(),
            status = rec.status_code,
            size = %rec.size,
            referrer = %rec.referrer,
            user_agent = %rec.user_agent,
            "parsed request"
        );
        self.total_lines += 1;
        *self.ip_totals.entry(rec.ip.clone()).or_insert(0) += 1;
        *self.path_totals.entry(rec.path.clone()).or_insert(0) += 1;
        *self.status_totals.entry(rec.status_code).or_insert(0) += 1;

        if rec.is_not_found() {
            *self.ip_not_found.entry(rec.ip.clone()).or_insert(0) += 1;
        }
        if rec.is_server_error() {
            *self.ip_server_errors.entry(rec.ip.clone()).or_insert(0) += 1;
        }
    }

    pub fn skip(&mut self) {
        self.skipped_lines += 1;
    }

    /// Parse a raw line and record it. Returns `false` if the line was skipped.
    pub fn ingest_line(&mut self, line: &str) -> bool {
        match parser::parse_line(line) {
            Some(rec) => {
                self.record(&rec);
                true
            }
            None => {
                self.skip();
                false
            }
        }
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn skipped_lines(&self) -> usize {
        self.skipped_lines
    }

    pub fn ip_totals(&self) -> &HashMap<String, usize> {
        &self.ip_totals
    }

    pub fn ip_not_found(&self) -> &HashMap<String, usize> {
        &self.ip_not_found
    }

    pub fn ip_server_errors(&self) -> &HashMap<String, usize> {
        &self.ip_server_errors
    }

    pub fn path_totals(&self) -> &HashMap<String, usize> {
        &self.path_totals
    }

    pub fn status_totals(&self) -> &HashMap<u16, usize> {
        &self.status_totals
    }
}

/// Stream every line of `reader` through the parser.
///
/// Bytes that are not valid UTF-8 are replaced rather than failing the run.
/// `source` only labels errors.
pub fn analyze_reader<R: BufRead>(
    mut reader: R,
    source: &Path,
) -> Result<Aggregator, AnalyzeError> {
    let mut agg = Aggregator::new();
    let mut buf = Vec::new();
    let mut line_num = 0usize;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source_err| AnalyzeError::Read {
                path: source.to_path_buf(),
                line: line_num + 1,
                source: source_err,
            })?;
        if read == 0 {
            break;
        }
        line_num += 1;

        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\n', '\r']);
        if !agg.ingest_line(line) {
            debug!(line = line_num, text = %truncate(line, 100), "skipping line");
        }
    }

    info!(
        parsed = agg.total_lines(),
        skipped = agg.skipped_lines(),
        "finished reading {}",
        source.display()
    );
    Ok(agg)
}

/// Open `path` and aggregate its contents
pub fn analyze_file(path: &Path) -> Result<Aggregator, AnalyzeError> {
    let file = File::open(path).map_err(|source| AnalyzeError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    analyze_reader(BufReader::new(file), path)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
