// campaigns/src/source.rs
//
// Input side: locate the appliance export and load it into a RawTable.
//
//   csv    — the appliance's native export (header row + records)
//   jsonl  — one JSON object per line, keys are column names
//
// With no explicit path the newest matching file in the input directory is
// used. Bytes that are not valid UTF-8 are decoded as Latin-1, which is what
// older appliance firmware writes.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use clap::ValueEnum;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::normalize::RawTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Csv,
    Jsonl,
}

impl InputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Jsonl => "jsonl",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Encoding {
    Utf8,
    Latin1,
}

/// How to read one input file.
#[derive(Debug, Clone, Copy)]
pub struct ReadOptions {
    pub format:         InputFormat,
    /// `None` tries UTF-8 first and falls back to Latin-1.
    pub encoding:       Option<Encoding>,
    pub skip_bad_lines: bool,
}

// ── Discovery ─────────────────────────────────────────────────────────────────

/// Pick the file to read. An explicit relative path that does not exist as
/// given is looked up inside `input_dir`.
pub async fn resolve_input(input: Option<&Path>, input_dir: &Path, format: InputFormat) -> Result<PathBuf> {
    tokio::fs::create_dir_all(input_dir)
        .await
        .map_err(|source| Error::Read { path: input_dir.to_path_buf(), source })?;

    if let Some(p) = input {
        if p.is_absolute() || tokio::fs::try_exists(p).await.unwrap_or(false) {
            return Ok(p.to_path_buf());
        }
        return Ok(input_dir.join(p.file_name().unwrap_or(p.as_os_str())));
    }

    let latest = latest_in_dir(input_dir, format.extension()).await?;
    info!("Auto-selected latest {} file: {}", format.extension(), latest.display());
    Ok(latest)
}

async fn latest_in_dir(dir: &Path, extension: &str) -> Result<PathBuf> {
    let read_err = |source| Error::Read { path: dir.to_path_buf(), source };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(read_err)?;

    let mut best: Option<(SystemTime, PathBuf)> = None;
    while let Some(entry) = entries.next_entry().await.map_err(read_err)? {
        let path = entry.path();
        let matches = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !matches {
            continue;
        }
        let modified = entry
            .metadata()
            .await
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        if best.as_ref().map(|(t, _)| modified > *t).unwrap_or(true) {
            best = Some((modified, path));
        }
    }

    best.map(|(_, p)| p).ok_or_else(|| Error::NoInputFiles {
        dir: dir.to_path_buf(),
        extension: format!(".{}", extension),
    })
}

// ── Loading ───────────────────────────────────────────────────────────────────

pub async fn read_table(path: &Path, opts: ReadOptions) -> Result<RawTable> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| Error::Read { path: path.to_path_buf(), source })?;
    let text = decode(bytes, opts.encoding);

    let table = match opts.format {
        InputFormat::Csv => parse_csv(&text, opts.skip_bad_lines)?,
        InputFormat::Jsonl => parse_jsonl(&text, opts.skip_bad_lines)?,
    };
    info!("Read {} rows x {} columns from {}", table.rows.len(), table.headers.len(), path.display());
    Ok(table)
}

pub fn decode(bytes: Vec<u8>, encoding: Option<Encoding>) -> String {
    let text = match encoding {
        Some(Encoding::Latin1) => latin1(&bytes),
        Some(Encoding::Utf8) => String::from_utf8_lossy(&bytes).into_owned(),
        None => match String::from_utf8(bytes) {
            Ok(s) => s,
            Err(e) => {
                warn!("Input is not valid UTF-8, falling back to Latin-1");
                latin1(e.as_bytes())
            }
        },
    };
    match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    }
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

pub fn parse_csv(text: &str, skip_bad_lines: bool) -> Result<RawTable> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let width = headers.len();
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for record in rdr.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) if skip_bad_lines => {
                warn!("Skipping unreadable CSV record: {}", e);
                skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        if record.len() > width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            if skip_bad_lines {
                warn!("Skipping line {}: {} fields, header has {}", line, record.len(), width);
                skipped += 1;
                continue;
            }
            return Err(Error::BadRecord { line, expected: width, found: record.len() });
        }

        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    if skipped > 0 {
        warn!("Skipped {} malformed CSV records", skipped);
    }
    Ok(RawTable { headers, rows })
}

pub fn parse_jsonl(text: &str, skip_bad_lines: bool) -> Result<RawTable> {
    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(line) {
            Ok(obj) => {
                for k in obj.keys() {
                    if !headers.iter().any(|h| h == k.trim()) {
                        headers.push(k.trim().to_string());
                    }
                }
                objects.push(obj);
            }
            Err(e) if skip_bad_lines => warn!("Skipping JSONL line {}: {}", i + 1, e),
            Err(source) => return Err(Error::Json { line: i + 1, source }),
        }
    }

    let rows = objects
        .iter()
        .map(|obj| {
            let mut row = vec![String::new(); headers.len()];
            for (k, v) in obj {
                if let Some(pos) = headers.iter().position(|h| h == k.trim()) {
                    row[pos] = cell_text(v);
                }
            }
            row
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn cell_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_pads_short_rows_and_trims_headers() {
        let t = parse_csv(" Start Time ,End Time,Destination IP\na,b,c\nd,e\n", false).unwrap();
        assert_eq!(t.headers, vec!["Start Time", "End Time", "Destination IP"]);
        assert_eq!(t.rows[1], vec!["d", "e", ""]);
    }

    #[test]
    fn csv_long_rows_fail_unless_skipped() {
        let text = "a,b\n1,2\n1,2,3\n4,5\n";
        let err = parse_csv(text, false).unwrap_err();
        assert!(matches!(err, Error::BadRecord { expected: 2, found: 3, .. }));

        let t = parse_csv(text, true).unwrap();
        assert_eq!(t.rows.len(), 2);
    }

    #[test]
    fn jsonl_objects_become_rows() {
        let text = r#"{"Destination IP": "10.0.0.1", "Port": 443, "Risk": null}

{"Destination IP": "10.0.0.2", "Attack": "SYN Flood"}
"#;
        let t = parse_jsonl(text, false).unwrap();
        assert_eq!(t.rows.len(), 2);
        let port = t.headers.iter().position(|h| h == "Port").unwrap();
        let attack = t.headers.iter().position(|h| h == "Attack").unwrap();
        assert_eq!(t.rows[0][port], "443");
        assert_eq!(t.rows[1][port], "");
        assert_eq!(t.rows[1][attack], "SYN Flood");
    }

    #[test]
    fn jsonl_bad_line_reports_line_number() {
        let err = parse_jsonl("{\"a\": 1}\nnot json\n", false).unwrap_err();
        assert!(matches!(err, Error::Json { line: 2, .. }));
        assert_eq!(parse_jsonl("{\"a\": 1}\n[1,2]\n", true).unwrap().rows.len(), 1);
    }

    #[test]
    fn decode_falls_back_to_latin1() {
        let bytes = vec![b'c', b'a', b'f', 0xE9];
        assert_eq!(decode(bytes, None), "café");
        assert_eq!(decode("\u{feff}a,b".as_bytes().to_vec(), None), "a,b");
    }

    #[tokio::test]
    async fn picks_newest_matching_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("old.csv"), "x").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(20));
        std::fs::write(dir.path().join("new.csv"), "x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

        let picked = resolve_input(None, dir.path(), InputFormat::Csv).await.unwrap();
        assert_eq!(picked.file_name().unwrap(), "new.csv");

        let err = resolve_input(None, dir.path(), InputFormat::Jsonl).await.unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test]
    async fn relative_name_resolves_into_input_dir() {
        let dir = tempfile::tempdir().unwrap();
        let picked = resolve_input(Some(Path::new("export.csv")), dir.path(), InputFormat::Csv)
            .await
            .unwrap();
        assert_eq!(picked, dir.path().join("export.csv"));
    }
}
