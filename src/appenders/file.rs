//! File appender implementation

use crate::core::{Appender, FileMode, LoggerError, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered writer for the primary log file
///
/// The handle is flushed and closed when the appender is dropped.
pub struct FileAppender {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileAppender {
    /// Open `path` in append mode, creating parent directories
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open(path, FileMode::Append)
    }

    /// Open `path` with the given mode, creating parent directories
    ///
    /// # Errors
    ///
    /// Returns error if the directory or the file cannot be created
    pub fn open(path: impl Into<PathBuf>, mode: FileMode) -> Result<Self> {
        let path = path.into();
        create_parent_dirs(&path)?;

        let mut options = OpenOptions::new();
        options.create(true);
        match mode {
            FileMode::Append => options.append(true),
            FileMode::Truncate => options.write(true).truncate(true),
        };

        let file = options.open(&path).map_err(|e| {
            LoggerError::file_appender(path.display().to_string(), format!("Failed to open: {}", e))
        })?;

        Ok(Self {
            path,
            writer: Some(BufWriter::new(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a single line to `path` through a short-lived handle
    ///
    /// With the `file` feature the write holds an exclusive advisory lock, so
    /// processes sharing the file never interleave inside one line.
    pub fn append_once(path: impl AsRef<Path>, line: &str) -> Result<()> {
        let path = path.as_ref();
        create_parent_dirs(path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::file_appender(
                    path.display().to_string(),
                    format!("Failed to open new file: {}", e),
                )
            })?;

        #[cfg(feature = "file")]
        {
            use fs2::FileExt;
            file.lock_exclusive().map_err(|e| {
                LoggerError::io_operation("locking log file", path.display().to_string(), e)
            })?;
            let written = file.write_all(line.as_bytes());
            // Closing the handle releases the lock regardless
            let _ = FileExt::unlock(&file);
            written?;
        }

        #[cfg(not(feature = "file"))]
        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

fn create_parent_dirs(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })
        }
        _ => Ok(()),
    }
}

impl Appender for FileAppender {
    fn append(&mut self, line: &str) -> Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| {
            LoggerError::file_appender(
                self.path.display().to_string(),
                "File writer not initialized",
            )
        })?;

        writer.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("[LOGGER ERROR] Failed to flush '{}' on close: {}", self.path.display(), e);
        }
    }
}
