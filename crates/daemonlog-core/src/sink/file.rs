//! Size-rotated log file sink.
//!
//! Lines are appended to `<path>`. Once the file reaches the rotation
//! threshold it is renamed to `<path><YYYYMMDD-HHMMSS>` and a fresh file is
//! opened at `<path>`, so the active file stays bounded.
//!
//! The size check runs after every write, so it has to be cheap. Writers
//! stat the file without the rotation lock; only when that check says the
//! file is due do they take the lock and check again. Whoever wins the lock
//! rotates, the rest see the fresh file and do nothing.

use std::ffi::OsString;
use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Local};
use parking_lot::{Mutex, RwLock};

use super::{Closable, Flushable, Sink};
use crate::error::{LogError, LogResult};
use crate::record::LogRecord;
use crate::severity::Severity;

/// Rotation threshold used when none is configured (20 MiB).
pub const DEFAULT_ROTATION_BYTES: u64 = 20 * 1024 * 1024;

/// Suffix appended to the active path when it is rotated away.
const ROTATION_SUFFIX_FORMAT: &str = "%Y%m%d-%H%M%S";

#[cfg(unix)]
const LOG_FILE_MODE: u32 = 0o640;
#[cfg(unix)]
const LOG_DIR_MODE: u32 = 0o755;

/// Sink appending to a single rotating file.
#[derive(Debug)]
pub struct FileSink {
    /// Path of the active log file
    path: PathBuf,

    /// Active handle. Writers share it; only rotation and close take it
    /// exclusively. `None` once closed.
    file: RwLock<Option<File>>,

    /// Size at which the active file is rotated
    rotation_threshold: u64,

    /// Serializes the confirm-and-rotate step
    rotation: Mutex<()>,

    /// Number of rotations performed by this sink
    rotations: AtomicU64,
}

impl FileSink {
    /// Open (or create) the log file at `path`, creating its directory if needed.
    ///
    /// Fails with [`LogError::NotADirectory`] when the parent exists as a
    /// non-directory, and with a resource error when the directory or file
    /// cannot be created.
    pub fn new(path: impl Into<PathBuf>, rotation_threshold: u64) -> LogResult<Self> {
        let path = path.into();
        if rotation_threshold == 0 {
            return Err(LogError::Configuration(
                "log rotation threshold must be positive".to_string(),
            ));
        }

        ensure_log_dir(&path)?;
        let file = open_log_file(&path).map_err(|source| LogError::OpenFile {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            path,
            file: RwLock::new(Some(file)),
            rotation_threshold,
            rotation: Mutex::new(()),
            rotations: AtomicU64::new(0),
        })
    }

    /// Path of the active log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size in bytes at which the file is rotated.
    pub fn rotation_threshold(&self) -> u64 {
        self.rotation_threshold
    }

    /// How many times this sink has rotated its file.
    pub fn rotations(&self) -> u64 {
        self.rotations.load(Ordering::Relaxed)
    }

    /// Append `line` to the active file.
    ///
    /// Only a closed sink is an error here; I/O failures are reported on
    /// stderr and swallowed so the next line gets its chance.
    fn append(&self, line: &[u8]) -> LogResult<()> {
        let guard = self.file.read();
        let Some(file) = guard.as_ref() else {
            return Err(LogError::Delivery(format!(
                "log file {} is closed",
                self.path.display()
            )));
        };

        let mut file: &File = file;
        if let Err(e) = file.write_all(line) {
            eprintln!(
                "Write log message {} to {} error: {}",
                String::from_utf8_lossy(line).trim_end(),
                self.path.display(),
                e
            );
        }
        Ok(())
    }

    /// Whether the active file has reached the threshold.
    ///
    /// A failed stat or a closed sink counts as "not due".
    fn needs_rotation(&self) -> bool {
        let guard = self.file.read();
        guard
            .as_ref()
            .and_then(|file| file.metadata().ok())
            .map(|meta| meta.len() >= self.rotation_threshold)
            .unwrap_or(false)
    }

    /// Rotate if due. Returns whether this call performed the rotation.
    fn maybe_rotate(&self) -> LogResult<bool> {
        if !self.needs_rotation() {
            return Ok(false);
        }

        let rotating = self.rotation.lock();
        if !self.needs_rotation() {
            // Another writer rotated while we waited for the lock.
            return Ok(false);
        }

        let outcome = self.rotate()?;
        let count = match outcome {
            Rotation::Archived(_) => self.rotations.fetch_add(1, Ordering::Relaxed) + 1,
            Rotation::Reopened => self.rotations(),
            Rotation::Closed => return Ok(false),
        };
        drop(rotating);

        match outcome {
            Rotation::Archived(rotated) => tracing::debug!(
                path = %self.path.display(),
                rotated = %rotated.display(),
                count,
                "rotated log file"
            ),
            _ => tracing::debug!(
                path = %self.path.display(),
                "reopened missing log file"
            ),
        }
        Ok(true)
    }

    /// Rename the active file away and open a fresh one in its place.
    ///
    /// When nothing is left at the active path (a previous reopen failed, or
    /// the file was moved or deleted from outside) only the reopen is done.
    /// Callers must hold the rotation lock.
    fn rotate(&self) -> LogResult<Rotation> {
        let rotation_error = |source: io::Error| LogError::Rotation {
            path: self.path.clone(),
            source,
        };

        let mut active = self.file.write();
        if active.is_none() {
            return Ok(Rotation::Closed);
        }

        let archived = match fs::symlink_metadata(&self.path) {
            Ok(_) => {
                let rotated = rotated_path(&self.path, Local::now());
                fs::rename(&self.path, &rotated).map_err(rotation_error)?;
                Some(rotated)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(rotation_error(e)),
        };

        // Until the reopen succeeds, lines keep landing in the old handle and
        // the next due write retries the reopen without renaming again.
        *active = Some(open_log_file(&self.path).map_err(rotation_error)?);
        Ok(match archived {
            Some(rotated) => Rotation::Archived(rotated),
            None => Rotation::Reopened,
        })
    }
}

/// What a rotation attempt did.
#[derive(Debug)]
enum Rotation {
    /// The active file was renamed to this path and a fresh one opened
    Archived(PathBuf),
    /// Nothing was at the active path; a fresh file was opened there
    Reopened,
    /// The sink was closed; the filesystem was left alone
    Closed,
}

impl Sink for FileSink {
    fn accepts(&self, _severity: Severity) -> bool {
        true
    }

    fn write(&self, _record: &LogRecord, line: &[u8]) -> LogResult<()> {
        self.append(line)?;
        self.maybe_rotate().map(|_| ())
    }

    fn as_flushable(&self) -> Option<&dyn Flushable> {
        Some(self)
    }

    fn as_closable(&self) -> Option<&dyn Closable> {
        Some(self)
    }
}

impl Flushable for FileSink {
    fn flush(&self) -> LogResult<()> {
        let guard = self.file.read();
        if let Some(file) = guard.as_ref() {
            file.sync_data().map_err(|e| {
                LogError::Delivery(format!("could not flush {}: {}", self.path.display(), e))
            })?;
        }
        Ok(())
    }
}

impl Closable for FileSink {
    fn close(&self) -> LogResult<()> {
        let file = self.file.write().take();
        if let Some(file) = file {
            file.sync_all().map_err(|e| {
                LogError::Delivery(format!("could not close {}: {}", self.path.display(), e))
            })?;
        }
        Ok(())
    }
}

/// Make sure the directory holding `path` exists and is a directory.
fn ensure_log_dir(path: &Path) -> LogResult<()> {
    let Some(dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };

    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(LogError::NotADirectory {
            path: dir.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let mut builder = DirBuilder::new();
            builder.recursive(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::DirBuilderExt;
                builder.mode(LOG_DIR_MODE);
            }
            builder
                .create(dir)
                .map_err(|source| LogError::CreateDirectory {
                    path: dir.to_path_buf(),
                    source,
                })
        }
        Err(source) => Err(LogError::CreateDirectory {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.create(true).append(true).read(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(LOG_FILE_MODE);
    }
    options.open(path)
}

/// `<path><YYYYMMDD-HHMMSS>`, with `.1`, `.2`, ... appended if that name is taken.
fn rotated_path(path: &Path, now: DateTime<Local>) -> PathBuf {
    let mut base = OsString::from(path.as_os_str());
    base.push(now.format(ROTATION_SUFFIX_FORMAT).to_string());

    let candidate = PathBuf::from(&base);
    if !candidate.exists() {
        return candidate;
    }

    (1u32..)
        .map(|n| {
            let mut name = base.clone();
            name.push(format!(".{}", n));
            PathBuf::from(name)
        })
        .find(|p| !p.exists())
        .unwrap_or(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use tempfile::TempDir;

    fn record() -> LogRecord {
        LogRecord::new(Severity::Info, "x")
    }

    /// Files in `dir` whose name starts with `<name>` but is not `<name>` itself.
    fn rotated_files(dir: &Path, name: &str) -> Vec<PathBuf> {
        let mut files: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| {
                let file_name = p.file_name().unwrap().to_string_lossy();
                file_name.starts_with(name) && file_name != name
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("deeper").join("csi.log");

        let sink = FileSink::new(&path, 1024).unwrap();

        assert!(path.parent().unwrap().is_dir());
        assert!(sink.path().exists());
        assert_eq!(sink.rotation_threshold(), 1024);
    }

    #[test]
    fn test_parent_that_is_a_file_is_rejected() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("logs");
        fs::write(&blocker, b"not a directory").unwrap();

        let err = FileSink::new(blocker.join("csi.log"), 1024).unwrap_err();
        assert!(matches!(err, LogError::NotADirectory { .. }));
    }

    #[test]
    fn test_zero_threshold_is_rejected() {
        let temp = TempDir::new().unwrap();
        let err = FileSink::new(temp.path().join("csi.log"), 0).unwrap_err();
        assert!(matches!(err, LogError::Configuration(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let sink = FileSink::new(temp.path().join("csi.log"), 1024).unwrap();

        let mode = fs::metadata(sink.path()).unwrap().permissions().mode() & 0o777;
        // The umask may only remove bits.
        assert_eq!(mode & !LOG_FILE_MODE, 0);
        assert_ne!(mode & 0o600, 0);
    }

    #[test]
    fn test_appends_to_existing_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("csi.log");
        fs::write(&path, b"earlier line\n").unwrap();

        let sink = FileSink::new(&path, 1024).unwrap();
        sink.write(&record(), b"later line\n").unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "earlier line\nlater line\n"
        );
    }

    #[test]
    fn test_no_rotation_below_threshold() {
        let temp = TempDir::new().unwrap();
        let sink = FileSink::new(temp.path().join("csi.log"), 1024).unwrap();

        for _ in 0..10 {
            sink.write(&record(), b"0123456789\n").unwrap();
        }

        assert_eq!(sink.rotations(), 0);
        assert!(rotated_files(temp.path(), "csi.log").is_empty());
    }

    #[test]
    fn test_rotation_reopens_active_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("csi.log");
        let sink = FileSink::new(&path, 16).unwrap();

        sink.write(&record(), b"first line that crosses\n").unwrap();
        assert_eq!(sink.rotations(), 1);

        // The crossing line went to the archive, the active file starts over.
        let rotated = rotated_files(temp.path(), "csi.log");
        assert_eq!(rotated.len(), 1);
        assert_eq!(
            fs::read_to_string(&rotated[0]).unwrap(),
            "first line that crosses\n"
        );

        sink.write(&record(), b"next\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "next\n");
    }

    #[test]
    fn test_rotated_name_has_timestamp_suffix() {
        let temp = TempDir::new().unwrap();
        let sink = FileSink::new(temp.path().join("csi.log"), 8).unwrap();
        sink.write(&record(), b"long enough\n").unwrap();

        let rotated = rotated_files(temp.path(), "csi.log");
        let name = rotated[0].file_name().unwrap().to_string_lossy().into_owned();
        let suffix = name.strip_prefix("csi.log").unwrap();

        assert_eq!(suffix.len(), "YYYYMMDD-HHMMSS".len());
        assert_eq!(&suffix[8..9], "-");
        assert!(suffix
            .chars()
            .enumerate()
            .all(|(i, c)| i == 8 || c.is_ascii_digit()));
    }

    #[test]
    fn test_rotated_name_collision_gets_counter() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("csi.log");
        let now = Local::now();

        let first = rotated_path(&path, now);
        fs::write(&first, b"").unwrap();
        let second = rotated_path(&path, now);
        fs::write(&second, b"").unwrap();
        let third = rotated_path(&path, now);

        assert_ne!(first, second);
        assert!(second.to_string_lossy().ends_with(".1"));
        assert!(third.to_string_lossy().ends_with(".2"));
    }

    #[test]
    fn test_concurrent_writers_rotate_once() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("csi.log");
        let threshold = 1024;

        // Start just below the threshold so the first write of the burst crosses it.
        fs::write(&path, vec![b'.'; threshold as usize - 10]).unwrap();
        let sink = Arc::new(FileSink::new(&path, threshold).unwrap());

        let writers = 8;
        let barrier = Arc::new(Barrier::new(writers));
        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let sink = Arc::clone(&sink);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let line = format!("writer {:02} says hello to the log file\n", i);
                    sink.write(&record(), line.as_bytes()).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(sink.rotations(), 1);
        assert_eq!(rotated_files(temp.path(), "csi.log").len(), 1);
    }

    #[test]
    fn test_close_then_write_fails() {
        let temp = TempDir::new().unwrap();
        let sink = FileSink::new(temp.path().join("csi.log"), 1024).unwrap();

        sink.write(&record(), b"before close\n").unwrap();
        sink.as_flushable().unwrap().flush().unwrap();
        sink.as_closable().unwrap().close().unwrap();

        let err = sink.write(&record(), b"after close\n").unwrap_err();
        assert!(matches!(err, LogError::Delivery(_)));

        // Closing twice is harmless.
        sink.as_closable().unwrap().close().unwrap();
        assert_eq!(
            fs::read_to_string(sink.path()).unwrap(),
            "before close\n"
        );
    }

    #[test]
    fn test_deleted_active_file_is_reopened() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("csi.log");
        let sink = FileSink::new(&path, 64).unwrap();

        sink.write(&record(), b"before removal..\n").unwrap();
        fs::remove_file(&path).unwrap();

        for _ in 0..20 {
            sink.write(&record(), b"sixteen bytes ..\n").unwrap();
        }

        assert!(path.exists());
        assert!(fs::metadata(&path).unwrap().len() < 64);
        assert!(sink.rotations() >= 1);
    }

    #[test]
    fn test_moved_active_file_is_reopened_without_second_rename() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("csi.log");
        let moved = temp.path().join("csi.log.moved");
        let sink = FileSink::new(&path, 64).unwrap();

        // Same state as a rename that went through followed by a failed reopen.
        sink.write(&record(), b"line one .......\n").unwrap();
        fs::rename(&path, &moved).unwrap();

        sink.write(&record(), b"line two .......\n").unwrap();
        sink.write(&record(), b"line three .....\n").unwrap();
        assert!(!path.exists());

        // This one crosses the threshold and brings the active path back.
        sink.write(&record(), b"line four ......\n").unwrap();
        assert!(path.exists());
        assert_eq!(fs::read_to_string(&moved).unwrap().lines().count(), 4);
        assert_eq!(rotated_files(temp.path(), "csi.log"), vec![moved.clone()]);
        assert_eq!(sink.rotations(), 0);

        sink.write(&record(), b"next\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "next\n");
    }

    #[test]
    fn test_rotate_after_close_leaves_files_alone() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("csi.log");
        let sink = FileSink::new(&path, 1024).unwrap();
        sink.write(&record(), b"kept in place\n").unwrap();
        sink.as_closable().unwrap().close().unwrap();

        let _rotating = sink.rotation.lock();
        assert!(matches!(sink.rotate().unwrap(), Rotation::Closed));

        assert!(rotated_files(temp.path(), "csi.log").is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "kept in place\n");
    }
}
