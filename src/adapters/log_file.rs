//! Daily Log File
//!
//! `tracing_subscriber` writer that appends to `<prefix>_YYYY-MM-DD.log`,
//! picking the file from the UTC date of each write so long runs roll over
//! at midnight.

use chrono::{NaiveDate, Utc};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::MakeWriter;

pub struct DailyLogFile {
    dir: PathBuf,
    prefix: String,
    current: Mutex<Option<(NaiveDate, File)>>,
}

impl DailyLogFile {
    /// Create the log directory if needed. Files are opened lazily.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            current: Mutex::new(None),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("{}_{}.log", self.prefix, date.format("%Y-%m-%d")))
    }

    fn write_on(&self, date: NaiveDate, buf: &[u8]) -> io::Result<usize> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;

        let stale = !matches!(&*current, Some((open_date, _)) if *open_date == date);
        if stale {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.path_for(date))?;
            *current = Some((date, file));
        }

        match current.as_mut() {
            Some((_, file)) => {
                file.write_all(buf)?;
                Ok(buf.len())
            }
            None => Err(io::Error::new(io::ErrorKind::Other, "log file not open")),
        }
    }

    fn flush_current(&self) -> io::Result<()> {
        let mut current = self
            .current
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        match current.as_mut() {
            Some((_, file)) => file.flush(),
            None => Ok(()),
        }
    }
}

impl Write for &DailyLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_on(Utc::now().date_naive(), buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_current()
    }
}

impl<'a> MakeWriter<'a> for DailyLogFile {
    type Writer = &'a DailyLogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self
    }
}
