use regex::Regex;
use std::sync::OnceLock;

/// A single request parsed from a combined-log-format line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub ip: String,
    /// Raw text between the square brackets, not interpreted
    pub timestamp: String,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub status_code: u16,
    /// Kept as text since servers write `-` for an unknown or empty body
    pub size: String,
    pub referrer: String,
    pub user_agent: String,
}

impl LogRecord {
    /// Rebuild the quoted request line, e.g. `GET /index.html HTTP/1.1`
    pub fn request_line(&self) -> String {
        format!("{} {} {}", self.method, self.path, self.protocol)
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == 404
    }

    pub fn is_server_error(&self) -> bool {
        (500..=599).contains(&self.status_code)
    }
}

/// Combined log format:
///   IP IDENT USER [TIMESTAMP] "METHOD PATH PROTOCOL" STATUS SIZE ["REFERRER" "USER-AGENT"]
///
/// Example:
///   203.0.113.7 - - [10/Oct/2023:13:55:36 +0000] "GET /admin HTTP/1.1" 404 153 "-" "curl/8.0"
///
/// Only the start of the line is anchored; anything after the last matched
/// field is ignored.
static LOG_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_regex() -> &'static Regex {
    LOG_REGEX.get_or_init(|| {
        Regex::new(
            r#"^(?P<ip>\S+) \S+ \S+ \[(?P<time>[^\]]+)\] "(?P<method>\S+) (?P<path>\S+) (?P<proto>[^"]+)" (?P<code>[0-9]{3}) (?P<size>\S+)(?: "(?P<ref>[^"]*)" "(?P<ua>[^"]*)")?"#,
        )
        .expect("hard-coded regex should always compile")
    })
}

/// Parse one access-log line.
///
/// Returns `None` when the line does not match the combined log format;
/// callers treat that as a skip, not a failure.
pub fn parse_line(line: &str) -> Option<LogRecord> {
    let caps = get_regex().captures(line)?;

    // three ASCII digits always fit in a u16
    let status_code = caps["code"].parse::<u16>().ok()?;
    let optional = |name: &str| {
        caps.name(name)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default()
    };

    Some(LogRecord {
        ip: caps["ip"].to_string(),
        timestamp: caps["time"].to_string(),
        method: caps["method"].to_string(),
        path: caps["path"].to_string(),
        protocol: caps["proto"].to_string(),
        status_code,
        size: caps["size"].to_string(),
        referrer: optional("ref"),
        user_agent: optional("ua"),
    })
}

// ─── Unit Tests ──────────────────────────────────────────────────────────────
