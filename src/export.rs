use crate::error::ExportError;
use crate::report::Report;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the full report as indented JSON
pub fn export_json(report: &Report, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(report).map_err(|source| ExportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write the top-paths list as a two-column CSV with a `path,count` header
pub fn export_top_paths_csv(report: &Report, path: &Path) -> Result<(), ExportError> {
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let csv_err = |source| ExportError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(BufWriter::new(file));
    writer.write_record(["path", "count"]).map_err(csv_err)?;
    for (p, count) in &report.top_paths {
        writer
            .write_record([p.as_str(), count.to_string().as_str()])
            .map_err(csv_err)?;
    }

    let mut inner = writer
        .into_inner()
        .map_err(|e| io_err(e.into_error()))?;
    inner.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{SuspiciousIp, Thresholds};

    fn sample_report() -> Report {
        Report {
            analyzed_file: "access.log".to_string(),
            total_lines: 4,
            top_ips: vec![("10.0.0.1".to_string(), 3), ("10.0.0.2".to_string(), 1)],
            top_paths: vec![
                ("/search?q=a,b".to_string(), 2),
                (r#"/say"hi""#.to_string(), 1),
                ("/plain".to_string(), 1),
            ],
            top_status_codes: vec![(404, 3), (200, 1)],
            suspicious: vec![SuspiciousIp {
                ip: "10.0.0.1".to_string(),
                count_404: 3,
                count_5xx: 0,
                total_requests: 3,
            }],
            generated_at: "2024-01-01T00:00:00.000000Z".to_string(),
            thresholds: Thresholds { not_found: 2, server_error: 10 },
        }
    }

    #[test]
    fn json_export_keeps_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.json");
        export_json(&sample_report(), &out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("\n  \"analyzed_file\": \"access.log\""));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["total_lines"], 4);
        assert_eq!(value["top_ips"][0][0], "10.0.0.1");
        assert_eq!(value["top_ips"][0][1], 3);
        assert_eq!(value["top_status_codes"][0][0], 404);
        assert_eq!(value["suspicious"][0]["404_count"], 3);
        assert_eq!(value["suspicious"][0]["5xx_count"], 0);
        assert_eq!(value["suspicious"][0]["total_requests"], 3);
        assert_eq!(value["thresholds"]["404"], 2);
        assert_eq!(value["thresholds"]["5xx"], 10);
        assert_eq!(value["generated_at"], "2024-01-01T00:00:00.000000Z");

        let back: Report = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sample_report());
    }

    #[test]
    fn csv_export_quotes_commas_and_quotes() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("paths.csv");
        export_top_paths_csv(&sample_report(), &out).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        let rows: Vec<&str> = text.split_terminator("\r\n").collect();
        assert_eq!(
            rows,
            vec![
                "path,count",
                "\"/search?q=a,b\",2",
                "\"/say\"\"hi\"\"\",1",
                "/plain,1",
            ]
        );
    }

    #[test]
    fn csv_export_with_no_paths_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.csv");
        let mut report = sample_report();
        report.top_paths.clear();
        export_top_paths_csv(&report, &out).unwrap();
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "path,count\r\n");
    }

    #[test]
    fn unwritable_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("no-such-dir").join("report.json");

        let err = export_json(&sample_report(), &out).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));

        let err = export_top_paths_csv(&sample_report(), &out).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert!(err.to_string().contains("report.json"));
    }
}
