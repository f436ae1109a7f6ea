//! Archive file discovery and lazy event decoding.
//!
//! Reads GH Archive hourly dumps (one JSON event per line) and turns them into
//! [`Event`] values. Malformed lines are logged and skipped; only a missing
//! source or an unreadable file stops the scan.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use activity_core::error::{ActivityError, Result};
use activity_core::models::Event;
use activity_core::time_utils::parse_created_at;
use tracing::{debug, info, warn};

/// Extension of hourly archive files.
pub const DATA_FILE_EXTENSION: &str = ".json";

/// Nested objects an archive line must carry to describe an event.
const REQUIRED_NESTED_KEYS: [&str; 2] = ["actor", "repo"];

// ── Public API ────────────────────────────────────────────────────────────────

/// List the archive files directly inside `dir`, sorted by file name.
///
/// Only regular files whose name ends in `.json` are returned; subdirectories
/// are not descended into.
pub fn find_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(ActivityError::DataPathNotFound(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map(|name| name.ends_with(DATA_FILE_EXTENSION))
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

/// Counters describing what a reader has consumed so far.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    pub files_opened: u64,
    /// Non-blank lines read.
    pub lines_read: u64,
    pub events_decoded: u64,
    /// Lines that were not valid JSON.
    pub malformed_lines: u64,
    /// Lines that were JSON but not a usable event.
    pub schema_errors: u64,
}

impl ReaderStats {
    /// Total number of lines dropped for either reason.
    pub fn skipped(&self) -> u64 {
        self.malformed_lines + self.schema_errors
    }
}

/// Lazy, single-pass iterator over the events of one or more archive files.
///
/// Files are read in order and at most one is open at any time. The open
/// handle is owned by the reader, so dropping the reader part-way through a
/// file closes it.
///
/// Recoverable problems (bad JSON, missing `actor`/`repo`, unusable fields)
/// never surface as items: they are logged with `warn!` and counted in
/// [`ReaderStats`]. A file that cannot be opened or read yields one `Err`
/// item; iteration then moves on to the next file.
#[derive(Debug)]
pub struct EventReader {
    files: std::vec::IntoIter<PathBuf>,
    current: Option<OpenFile>,
    stats: ReaderStats,
}

impl EventReader {
    /// Read exactly the given files, in the given order.
    pub fn from_paths(files: Vec<PathBuf>) -> Self {
        Self {
            files: files.into_iter(),
            current: None,
            stats: ReaderStats::default(),
        }
    }

    /// Read a single archive file.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self::from_paths(vec![path.into()])
    }

    /// Read every `.json` file in `dir`, in file-name order.
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let files = find_json_files(dir)?;
        if files.is_empty() {
            warn!("No archive files found in {}", dir.display());
        }
        Ok(Self::from_paths(files))
    }

    /// Build a reader from the optional CLI sources.
    ///
    /// * `file` set → that single file, resolved against `directory` when
    ///   both are given.
    /// * only `directory` set → directory mode.
    /// * neither → [`ActivityError::Config`].
    pub fn from_source(directory: Option<&Path>, file: Option<&Path>) -> Result<Self> {
        match (directory, file) {
            (Some(dir), Some(file)) => Ok(Self::from_file(dir.join(file))),
            (None, Some(file)) => Ok(Self::from_file(file)),
            (Some(dir), None) => Self::from_directory(dir),
            (None, None) => Err(ActivityError::Config(
                "either a data directory or a data file must be provided".to_string(),
            )),
        }
    }

    /// Files not yet opened.
    pub fn pending_files(&self) -> &[PathBuf] {
        self.files.as_slice()
    }

    /// Whether a file handle is currently held.
    pub fn has_open_file(&self) -> bool {
        self.current.is_some()
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }
}

impl Iterator for EventReader {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current.is_none() {
                let path = self.files.next()?;
                match OpenFile::open(path) {
                    Ok(open) => {
                        info!("Opening file: {}", open.path.display());
                        self.stats.files_opened += 1;
                        self.current = Some(open);
                    }
                    Err(e) => return Some(Err(e)),
                }
            }
            let Some(open) = self.current.as_mut() else {
                continue;
            };

            match open.next_line() {
                Ok(Some(line)) => {
                    self.stats.lines_read += 1;
                    match decode_line(&line, open.line_no) {
                        Ok(event) => {
                            open.decoded += 1;
                            self.stats.events_decoded += 1;
                            return Some(Ok(event));
                        }
                        Err(err) if err.is_recoverable() => {
                            open.skipped += 1;
                            match err {
                                ActivityError::Decode { .. } => self.stats.malformed_lines += 1,
                                _ => self.stats.schema_errors += 1,
                            }
                            warn!("Skipping line in {}: {}", open.path.display(), err);
                        }
                        Err(err) => return Some(Err(err)),
                    }
                }
                Ok(None) => {
                    debug!(
                        "File {}: {} lines, {} decoded, {} skipped",
                        open.path.display(),
                        open.line_no,
                        open.decoded,
                        open.skipped,
                    );
                    self.current = None;
                }
                Err(source) => {
                    let path = open.path.clone();
                    self.current = None;
                    return Some(Err(ActivityError::FileRead { path, source }));
                }
            }
        }
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// The file currently being drained, with its per-file counters.
#[derive(Debug)]
struct OpenFile {
    path: PathBuf,
    reader: BufReader<File>,
    buf: Vec<u8>,
    line_no: usize,
    decoded: u64,
    skipped: u64,
}

impl OpenFile {
    fn open(path: PathBuf) -> Result<Self> {
        match File::open(&path) {
            Ok(file) => Ok(Self {
                path,
                reader: BufReader::new(file),
                buf: Vec::new(),
                line_no: 0,
                decoded: 0,
                skipped: 0,
            }),
            Err(source) => Err(ActivityError::FileRead { path, source }),
        }
    }

    /// Next non-blank line, decoded as UTF-8 with replacement characters.
    ///
    /// `Ok(None)` at end of file.
    fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            let text = String::from_utf8_lossy(&self.buf);
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }
}

/// Decode one archive line into an [`Event`].
///
/// Unknown fields at any level are dropped by the serde projection.
fn decode_line(line: &str, line_no: usize) -> Result<Event> {
    let value: serde_json::Value = serde_json::from_str(line)
        .map_err(|source| ActivityError::Decode {
            line: line_no,
            source,
        })?;

    let schema = |reason: String| ActivityError::Schema {
        line: line_no,
        reason,
    };

    if !value.is_object() {
        return Err(schema("not a JSON object".to_string()));
    }
    for key in REQUIRED_NESTED_KEYS {
        if value.get(key).is_none() {
            return Err(schema(format!("missing key `{key}`")));
        }
    }

    let event: Event = serde_json::from_value(value).map_err(|e| schema(e.to_string()))?;

    if event.event_type.is_empty() {
        return Err(schema("empty event type".to_string()));
    }
    if parse_created_at(&event.created_at).is_err() {
        return Err(schema(format!(
            "invalid created_at \"{}\"",
            event.created_at
        )));
    }

    Ok(event)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
