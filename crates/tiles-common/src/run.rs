//! Model run and source file identification.

use std::path::Path;

use chrono::NaiveDate;

/// Identity of one source file: model run plus forecast lead time.
///
/// AIGFS output is laid out as `data/<YYYYMMDD>_<HH>/aigfs.tHHz.sfc.fFFF.grib2`;
/// both the directory and the file name encode the run, and the file name
/// carries the lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub run_date: NaiveDate,
    pub run_hour: u32,
    pub lead_hours: u32,
}

impl SourceKey {
    pub fn new(run_date: NaiveDate, run_hour: u32, lead_hours: u32) -> Self {
        Self {
            run_date,
            run_hour,
            lead_hours,
        }
    }

    /// Parse a source path of the form `.../<YYYYMMDD>_<HH>/aigfs.tHHz.sfc.fFFF.grib2`.
    ///
    /// Returns `None` for anything that does not match the model's naming
    /// convention; the scanner skips such files silently.
    pub fn from_source_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        let run_dir = path.parent()?.file_name()?.to_str()?;

        // Directory: 20260103_00
        let (date_part, dir_hour) = run_dir.split_once('_')?;
        let run_date = NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()?;
        let dir_hour: u32 = dir_hour.parse().ok()?;

        // File: aigfs.t00z.sfc.f006.grib2
        let mut parts = file_name.split('.');
        if parts.next()? != "aigfs" {
            return None;
        }
        let run_token = parts.next()?; // t00z
        let _level = parts.next()?; // sfc
        let lead_token = parts.next()?; // f006
        if parts.next()? != "grib2" || parts.next().is_some() {
            return None;
        }

        let run_hour: u32 = run_token.strip_prefix('t')?.strip_suffix('z')?.parse().ok()?;
        let lead_hours: u32 = lead_token.strip_prefix('f')?.parse().ok()?;

        if run_hour != dir_hour || run_hour > 23 {
            return None;
        }

        Some(Self {
            run_date,
            run_hour,
            lead_hours,
        })
    }

    /// The run date formatted as the `YYYYMMDD` artifact token.
    pub fn date_token(&self) -> String {
        self.run_date.format("%Y%m%d").to_string()
    }

    /// The run hour formatted as the `HH` artifact token.
    pub fn run_token(&self) -> String {
        format!("{:02}", self.run_hour)
    }

    /// The lead time formatted as the `FFF` artifact token.
    pub fn lead_token(&self) -> String {
        format!("{:03}", self.lead_hours)
    }
}
