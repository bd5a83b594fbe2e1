use crate::analyzer::Aggregator;
use crate::config::AnalysisConfig;
use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use std::io::{self, Write};

/// Entries shown per list in the console summary
const SUMMARY_TOP: usize = 10;

/// An IP whose 404 or 5xx count reached its threshold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuspiciousIp {
    pub ip: String,
    #[serde(rename = "404_count")]
    pub count_404: usize,
    #[serde(rename = "5xx_count")]
    pub count_5xx: usize,
    pub total_requests: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    #[serde(rename = "404")]
    pub not_found: usize,
    #[serde(rename = "5xx")]
    pub server_error: usize,
}

/// The finished result of one analysis run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub analyzed_file: String,
    pub total_lines: usize,
    pub top_ips: Vec<(String, usize)>,
    pub top_paths: Vec<(String, usize)>,
    /// Every observed code, uncapped
    pub top_status_codes: Vec<(u16, usize)>,
    pub suspicious: Vec<SuspiciousIp>,
    pub generated_at: String,
    pub thresholds: Thresholds,
}

/// Turn final counter state into a `Report`.
///
/// Rankings are by descending count; equal counts fall back to ascending key
/// order so output is reproducible.
pub fn build_report(agg: &Aggregator, analyzed_file: &str, config: &AnalysisConfig) -> Report {
    let top_ips = ranked(agg.ip_totals(), Some(config.top_n));
    let top_paths = ranked(agg.path_totals(), Some(config.top_n));
    let top_status_codes = ranked(agg.status_totals(), None);

    let candidates: BTreeSet<&str> = agg
        .ip_not_found()
        .keys()
        .chain(agg.ip_server_errors().keys())
        .map(String::as_str)
        .collect();

    // BTreeSet iteration keeps this sorted by IP
    let suspicious = candidates
        .into_iter()
        .filter_map(|ip| {
            let count_404 = agg.ip_not_found().get(ip).copied().unwrap_or(0);
            let count_5xx = agg.ip_server_errors().get(ip).copied().unwrap_or(0);
            if count_404 >= config.thresh_404 || count_5xx >= config.thresh_5xx {
                Some(SuspiciousIp {
                    ip: ip.to_string(),
                    count_404,
                    count_5xx,
                    total_requests: agg.ip_totals().get(ip).copied().unwrap_or(0),
                })
            } else {
                None
            }
        })
        .collect();

    Report {
        analyzed_file: analyzed_file.to_string(),
        total_lines: agg.total_lines(),
        top_ips,
        top_paths,
        top_status_codes,
        suspicious,
        generated_at: Utc::now().format("%Y-%m-%dT%H:%M:%S%.6fZ").to_string(),
        thresholds: Thresholds {
            not_found: config.thresh_404,
            server_error: config.thresh_5xx,
        },
    }
}

fn ranked<K>(counts: &HashMap<K, usize>, limit: Option<usize>) -> Vec<(K, usize)>
where
    K: Clone + Ord + Eq + Hash,
{
    let mut items: Vec<(&K, usize)> = counts.iter().map(|(k, &v)| (k, v)).collect();
    items.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    items
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|(k, v)| (k.clone(), v))
        .collect()
}

/// Write the fixed-format console summary
pub fn write_summary<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    writeln!(out, "Analyzed: {}", report.analyzed_file.yellow())?;
    writeln!(out, "Total lines: {}", report.total_lines.to_string().green().bold())?;

    writeln!(out, "{}", "Top IPs:".bold())?;
    for (ip, count) in report.top_ips.iter().take(SUMMARY_TOP) {
        writeln!(out, "{} {}", ip.cyan(), count)?;
    }

    writeln!(out, "{}", "Top paths:".bold())?;
    for (path, count) in report.top_paths.iter().take(SUMMARY_TOP) {
        writeln!(out, "{} {}", path.cyan(), count)?;
    }

    writeln!(
        out,
        "{} {{'404': {}, '5xx': {}}}",
        "Suspicious IPs (thresholds):".bold(),
        report.thresholds.not_found,
        report.thresholds.server_error
    )?;
    for s in &report.suspicious {
        writeln!(
            out,
            "{} 404= {} 5xx= {} total= {}",
            s.ip.red().bold(),
            s.count_404,
            s.count_5xx,
            s.total_requests
        )?;
    }
    Ok(())
}
