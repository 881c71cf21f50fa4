// campaigns/src/report/writer.rs
//
// Writes campaign summaries to the output directory.
//   <out>/<name>.csv    — flat table, one row per campaign
//   <out>/<name>.jsonl  — same rows as JSON objects, absent values as null
//   <out>/<name>.xlsx   — same table as a workbook, absent values as blank cells
// Existing files are overwritten; each run is a complete report.

use std::path::PathBuf;

use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::events::CampaignSummary;

pub const DEFAULT_CSV_NAME: &str = "Attack_Campaigns_By_DstIP_Time.csv";

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const XLSX_SHEET: &str = "Sheet1";

/// Output column order. The port key column only exists when splitting.
pub fn csv_headers(split_by_port: bool) -> Vec<&'static str> {
    let mut h = vec!["Campaign ID", "Destination IP"];
    if split_by_port {
        h.push("Destination Port (key)");
    }
    h.extend([
        "Attack Window Start",
        "Attack Window End",
        "Duration (mins)",
        "# Events",
        "Devices Involved",
        "Protocols Seen",
        "Threat Categories",
        "Vectors (Attack Names)",
        "Dest Ports",
        "Total Packets Dropped",
        "Total Mbits Dropped",
        "Peak pps",
        "Peak bps",
        "Max Risk",
    ]);
    h
}

/// One report cell, typed so each sink can render it natively.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Empty,
}

impl Cell {
    fn csv_text(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Int(n) => n.to_string(),
            Self::Float(v) => float_text(*v),
            Self::Empty => String::new(),
        }
    }
}

/// Floats always carry a decimal point ("4.0", not "4").
fn float_text(v: f64) -> String {
    let s = v.to_string();
    if s.contains('.') || !v.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}

fn report_row(s: &CampaignSummary, split_by_port: bool) -> Vec<Cell> {
    let mut row = vec![Cell::Text(s.campaign_id.clone()), Cell::Text(s.destination.clone())];
    if split_by_port {
        row.push(s.port_key.and_then(|p| p.number()).map_or(Cell::Empty, Cell::Int));
    }
    row.extend([
        Cell::Text(s.window_start.format(TS_FORMAT).to_string()),
        Cell::Text(s.window_end.format(TS_FORMAT).to_string()),
        Cell::Float(s.duration_mins),
        Cell::Int(s.n_events as i64),
        Cell::Text(s.devices.clone()),
        Cell::Text(s.protocols.clone()),
        Cell::Text(s.threat_categories.clone()),
        Cell::Text(s.attack_names.clone()),
        Cell::Text(s.dest_ports.clone()),
        s.total_packets_dropped.map_or(Cell::Empty, |v| Cell::Int(v as i64)),
        s.total_mbits_dropped.map_or(Cell::Empty, Cell::Float),
        s.peak_pps.map_or(Cell::Empty, Cell::Float),
        s.peak_bps.map_or(Cell::Empty, Cell::Float),
        Cell::Text(s.max_risk_label()),
    ]);
    row
}

pub fn to_csv(summaries: &[CampaignSummary], split_by_port: bool) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(csv_headers(split_by_port))?;
    for s in summaries {
        wtr.write_record(report_row(s, split_by_port).iter().map(Cell::csv_text))?;
    }
    let bytes = wtr
        .into_inner()
        .map_err(|e| Error::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Single-sheet workbook with the CSV columns; numbers stay numeric.
pub fn to_xlsx(summaries: &[CampaignSummary], split_by_port: bool) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(XLSX_SHEET)?;

    let bold = Format::new().set_bold();
    for (col, name) in csv_headers(split_by_port).into_iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, name, &bold)?;
    }
    for (i, s) in summaries.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, cell) in report_row(s, split_by_port).into_iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Text(v) => { sheet.write_string(row, col, v)?; }
                Cell::Int(n) => { sheet.write_number(row, col, n as f64)?; }
                Cell::Float(v) => { sheet.write_number(row, col, v)?; }
                Cell::Empty => {}
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    campaign_id:           &'a str,
    destination:           &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    port_key:              Option<Option<i64>>,
    window_start:          String,
    window_end:            String,
    duration_mins:         f64,
    n_events:              usize,
    devices:               &'a str,
    protocols:             &'a str,
    threat_categories:     &'a str,
    attack_names:          &'a str,
    dest_ports:            &'a str,
    total_packets_dropped: Option<u64>,
    total_mbits_dropped:   Option<f64>,
    peak_pps:              Option<f64>,
    peak_bps:              Option<f64>,
    max_risk:              String,
}

impl<'a> From<&'a CampaignSummary> for JsonRecord<'a> {
    fn from(s: &'a CampaignSummary) -> Self {
        Self {
            campaign_id:           &s.campaign_id,
            destination:           &s.destination,
            port_key:              s.port_key.map(|p| p.number()),
            window_start:          s.window_start.format(TS_FORMAT).to_string(),
            window_end:            s.window_end.format(TS_FORMAT).to_string(),
            duration_mins:         s.duration_mins,
            n_events:              s.n_events,
            devices:               &s.devices,
            protocols:             &s.protocols,
            threat_categories:     &s.threat_categories,
            attack_names:          &s.attack_names,
            dest_ports:            &s.dest_ports,
            total_packets_dropped: s.total_packets_dropped,
            total_mbits_dropped:   s.total_mbits_dropped,
            peak_pps:              s.peak_pps,
            peak_bps:              s.peak_bps,
            max_risk:              s.max_risk_label(),
        }
    }
}

pub fn to_jsonl(summaries: &[CampaignSummary]) -> Result<String> {
    let mut out = String::new();
    for s in summaries {
        out.push_str(&serde_json::to_string(&JsonRecord::from(s)).map_err(Error::Encode)?);
        out.push('\n');
    }
    Ok(out)
}

pub struct ReportWriter {
    out:           PathBuf,
    split_by_port: bool,
}

impl ReportWriter {
    pub async fn new(output_dir: impl Into<PathBuf>, split_by_port: bool) -> Result<Self> {
        let out: PathBuf = output_dir.into();
        tokio::fs::create_dir_all(&out)
            .await
            .map_err(|source| Error::Write { path: out.clone(), source })?;
        Ok(Self { out, split_by_port })
    }

    pub async fn write_csv(&self, file: &str, summaries: &[CampaignSummary]) -> Result<PathBuf> {
        let path = self.write(file, to_csv(summaries, self.split_by_port)?.as_bytes()).await?;
        debug!("csv report {} rows={}", path.display(), summaries.len());
        Ok(path)
    }

    pub async fn write_jsonl(&self, file: &str, summaries: &[CampaignSummary]) -> Result<PathBuf> {
        let path = self.write(file, to_jsonl(summaries)?.as_bytes()).await?;
        debug!("jsonl report {} rows={}", path.display(), summaries.len());
        Ok(path)
    }

    pub async fn write_xlsx(&self, file: &str, summaries: &[CampaignSummary]) -> Result<PathBuf> {
        let path = self.write(file, &to_xlsx(summaries, self.split_by_port)?).await?;
        debug!("xlsx report {} rows={}", path.display(), summaries.len());
        Ok(path)
    }

    async fn write(&self, file: &str, content: &[u8]) -> Result<PathBuf> {
        let path = self.out.join(file);
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| Error::Write { path: path.clone(), source })?;
        Ok(path)
    }
}
