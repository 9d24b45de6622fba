//! Rendering of scan results for the console and the optional results file.

use std::{fmt::Write as _, fs, net::Ipv4Addr, path::Path};

use chrono::{Local, NaiveDateTime};
use pad::PadStr;

use crate::{error::ScanError, scan::OpenPortRecord};

const SEPARATOR_WIDTH: usize = 50;
const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M:%S";
const CSV_COLUMNS: &str = "Port,Status,Service";

/// Identifies a scan at the top of the console output and of the results file.
#[derive(Debug, Clone)]
pub struct ScanHeader {
    pub target: String,
    pub ip: Ipv4Addr,
    /// Local wall-clock time.
    pub started: NaiveDateTime,
}

impl ScanHeader {
    pub fn now(target: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            target: target.into(),
            ip,
            started: Local::now().naive_local(),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        let separator = "-".repeat(SEPARATOR_WIDTH);
        vec![
            separator.clone(),
            format!("Target: {} ({})", self.target, self.ip),
            format!("Started at: {}", self.started.format(TIMESTAMP_FORMAT)),
            separator,
        ]
    }
}

/// Console listing of the open ports.
pub fn render_ports(ports: &[OpenPortRecord]) -> String {
    if ports.is_empty() {
        return String::from("No open ports found.\n");
    }

    ports.iter().fold(String::new(), |mut out, r| {
        let _ = writeln!(
            out,
            "[+] Port {} : {} ({})",
            r.port.to_string().pad_to_width(5),
            r.state,
            r.service
        );
        out
    })
}

/// Results file content: header, column line, then one `port,status,service` per record.
pub fn render_csv(header: &ScanHeader, ports: &[OpenPortRecord]) -> String {
    let mut out = String::new();
    header.lines().iter().for_each(|line| {
        out.push_str(line);
        out.push('\n');
    });

    out.push_str(CSV_COLUMNS);
    out.push('\n');

    ports.iter().for_each(|r| {
        let _ = writeln!(out, "{},{},{}", r.port, r.state, r.service);
    });

    out
}

pub fn save(path: &Path, header: &ScanHeader, ports: &[OpenPortRecord]) -> Result<(), ScanError> {
    fs::write(path, render_csv(header, ports))
        .map_err(|e| ScanError::OutputWriteFailed(path.to_path_buf(), e))?;

    log::debug!("Wrote {} records to `{}`", ports.len(), path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn header() -> ScanHeader {
        ScanHeader {
            target: String::from("example.test"),
            ip: Ipv4Addr::new(192, 0, 2, 7),
            started: NaiveDate::from_ymd_opt(2024, 3, 9)
                .and_then(|d| d.and_hms_opt(14, 5, 0))
                .unwrap(),
        }
    }

    #[test]
    fn header_lines() {
        let lines = header().lines();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "-".repeat(SEPARATOR_WIDTH));
        assert_eq!(lines[1], "Target: example.test (192.0.2.7)");
        assert_eq!(lines[2], "Started at: 09-03-2024 14:05:00");
        assert_eq!(lines[3], lines[0]);
    }

    #[test]
    fn console_listing() {
        assert_eq!(render_ports(&[]), "No open ports found.\n");

        let ports = [OpenPortRecord::new(22, "ssh"), OpenPortRecord::new(8080, "Unknown")];
        assert_eq!(
            render_ports(&ports),
            "[+] Port 22    : OPEN (ssh)\n[+] Port 8080  : OPEN (Unknown)\n"
        );
    }

    #[test]
    fn csv_follows_header() {
        let ports = [OpenPortRecord::new(22, "ssh"), OpenPortRecord::new(80, "http")];
        let csv = render_csv(&header(), &ports);
        let lines = csv.lines().collect::<Vec<_>>();

        assert_eq!(&lines[..4], header().lines().as_slice());
        assert_eq!(&lines[4..], ["Port,Status,Service", "22,OPEN,ssh", "80,OPEN,http"]);
    }
}
