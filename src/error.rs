use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures while reading the storm event table.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The input file is missing or cannot be opened.
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An I/O or decompression failure while reading rows.
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// The header row lacks one or more required columns.
    #[error("{path} is missing required columns: {}", .columns.join(", "))]
    MissingColumns { path: PathBuf, columns: Vec<String> },
}

/// Failures while writing report artifacts.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to render chart {path}: {message}")]
    Chart { path: PathBuf, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_error_names_path() {
        let err = LoadError::Open {
            path: PathBuf::from("/data/storm.csv.bz2"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("Failed to open"));
        assert!(msg.contains("/data/storm.csv.bz2"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_missing_columns_lists_every_name() {
        let err = LoadError::MissingColumns {
            path: PathBuf::from("storm.csv"),
            columns: vec!["PROPDMGEXP".to_string(), "CROPDMG".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "storm.csv is missing required columns: PROPDMGEXP, CROPDMG"
        );
    }

    #[test]
    fn test_chart_error_display() {
        let err = ReportError::Chart {
            path: PathBuf::from("reports/health_impact.svg"),
            message: "backend closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to render chart reports/health_impact.svg: backend closed"
        );
    }

    #[test]
    fn test_report_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops}").unwrap_err();
        let err: ReportError = json_err.into();
        assert!(err.to_string().contains("Failed to serialize JSON"));
    }
}
