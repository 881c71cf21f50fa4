// campaigns/src/error.rs
//
// Failures of the collaborators around the engine (input discovery, decoding,
// column resolution, report writing). The engine itself never fails.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no {extension} files found in {}; place an appliance export there or pass a path", .dir.display())]
    NoInputFiles { dir: PathBuf, extension: String },

    #[error("failed reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed record at line {line}: expected {expected} fields, found {found}")]
    BadRecord {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("malformed JSONL input at line {line}: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing required columns: {missing:?}. Available: {available:?}")]
    MissingColumns {
        missing: Vec<String>,
        available: Vec<String>,
    },

    #[error("failed encoding report row: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed building Excel report: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed writing {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Read { .. }
            | Self::Csv(_)
            | Self::BadRecord { .. }
            | Self::Json { .. }
            | Self::Encode(_)
            | Self::Xlsx(_)
            | Self::Write { .. } => 1,
            Self::MissingColumns { .. } => 2,
            Self::NoInputFiles { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        let missing = Error::MissingColumns {
            missing: vec!["Start Time".into()],
            available: vec!["Foo".into()],
        };
        assert_eq!(missing.exit_code(), 2);
        assert!(missing.to_string().contains("Start Time"));

        let none = Error::NoInputFiles { dir: PathBuf::from("input"), extension: ".csv".into() };
        assert_eq!(none.exit_code(), 4);

        let encode = Error::Encode(serde_json::from_str::<u8>("x").unwrap_err());
        assert_eq!(encode.exit_code(), 1);
    }
}
