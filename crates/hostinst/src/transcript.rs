use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};

const FILE_PREFIX: &str = "hostinst_";
const FILE_SUFFIX: &str = ".log";
const RULE: &str = "**********************";

/// Shared, closable handle to the run's transcript file.
///
/// The log backend writes through a clone of this handle. Until a file is
/// attached, and after it is closed, writes are accepted and discarded.
#[derive(Debug, Clone, Default)]
pub struct TranscriptSink {
    file: Arc<Mutex<Option<File>>>,
}

impl TranscriptSink {
    #[must_use]
    pub fn detached() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    fn lock(&self) -> MutexGuard<'_, Option<File>> {
        self.file.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for TranscriptSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.lock().as_mut() {
            Some(file) => file.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.lock().as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// One timestamped log file per run. Closed by [`Transcript::finish`], or on
/// drop if a run unwinds before reaching it.
#[derive(Debug)]
pub struct Transcript {
    path: PathBuf,
    sink: TranscriptSink,
}

impl Transcript {
    /// Create the log directory if needed, open a new transcript file in it
    /// and attach it to `sink`.
    ///
    /// # Errors
    /// Returns an error if the directory or the file cannot be created.
    pub fn start(log_dir: &Path, sink: TranscriptSink) -> io::Result<Self> {
        Self::start_at(log_dir, sink, Local::now())
    }

    fn start_at(log_dir: &Path, sink: TranscriptSink, now: DateTime<Local>) -> io::Result<Self> {
        std::fs::create_dir_all(log_dir)?;
        let path = log_dir.join(transcript_file_name(now));
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(
            file,
            "{RULE}\nhostinst {} transcript start\nStart time: {}\n{RULE}",
            env!("CARGO_PKG_VERSION"),
            now.format("%Y%m%d%H%M%S")
        )?;
        *sink.lock() = Some(file);

        Ok(Self { path, sink })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn sink(&self) -> TranscriptSink {
        self.sink.clone()
    }

    /// Write the closing banner, flush and close the file. Returns its path.
    pub fn finish(mut self) -> PathBuf {
        self.close();
        std::mem::take(&mut self.path)
    }

    fn close(&mut self) {
        let Some(mut file) = self.sink.lock().take() else {
            return;
        };
        let _ = writeln!(
            file,
            "{RULE}\nhostinst transcript end\nEnd time: {}\n{RULE}",
            Local::now().format("%Y%m%d%H%M%S")
        );
        let _ = file.flush();
    }
}

impl Drop for Transcript {
    fn drop(&mut self) {
        self.close();
    }
}

fn transcript_file_name(now: DateTime<Local>) -> String {
    format!("{FILE_PREFIX}{}{FILE_SUFFIX}", now.format("%Y%m%d_%H%M%S"))
}

/// Delete all but the newest `keep` transcripts in `log_dir`. Returns how
/// many were removed. `keep == 0` disables pruning.
///
/// # Errors
/// Returns an error if `log_dir` cannot be listed. Individual files that
/// cannot be removed are skipped.
pub fn prune_old_transcripts(log_dir: &Path, keep: usize) -> io::Result<usize> {
    if keep == 0 {
        return Ok(0);
    }

    let mut transcripts: Vec<PathBuf> = std::fs::read_dir(log_dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX))
        })
        .collect();

    if transcripts.len() <= keep {
        return Ok(0);
    }

    // Timestamped names sort chronologically.
    transcripts.sort();
    let excess = transcripts.len() - keep;
    let mut removed = 0;
    for path in transcripts.into_iter().take(excess) {
        if std::fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }
    Ok(removed)
}
