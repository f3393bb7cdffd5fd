use memchr::memchr_iter;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs;
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tokio::sync::{mpsc, watch};
use tokio::time::{Duration, sleep};

use super::line::ParsedLine;
use super::parser::LineParser;

#[derive(Debug, Error)]
pub enum TailError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("log file {} is no longer available", .0.display())]
    SourceGone(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Where reading stopped: the last line number consumed and the byte
/// offset just past it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TailPosition {
    pub line_number: u64,
    pub byte: u64,
}

/// Accepted lines of a file read in one pass.
#[derive(Debug, Clone, Default)]
pub struct LogSnapshot {
    pub lines: Vec<ParsedLine>,
    pub end: TailPosition,
}

/// Parse every complete line currently in the file.
///
/// Lines are parsed in parallel and returned in file order. A trailing line
/// without its newline is left for the tailer.
pub fn read_log_file<P: AsRef<Path>>(path: P, parser: &LineParser) -> io::Result<LogSnapshot> {
    read_mapped(path.as_ref(), parser, false)
}

/// Parse the whole file, including a final line with no newline.
///
/// For one-shot reads of a finished log; nothing will complete the last
/// line, so it is parsed as is.
pub fn read_full_log_file<P: AsRef<Path>>(
    path: P,
    parser: &LineParser,
) -> io::Result<LogSnapshot> {
    read_mapped(path.as_ref(), parser, true)
}

fn read_mapped(path: &Path, parser: &LineParser, include_partial: bool) -> io::Result<LogSnapshot> {
    let file = fs::File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let bytes = mmap.as_ref();

    // Find all line boundaries
    let mut line_ranges: Vec<(usize, usize)> = Vec::new();
    let mut start = 0;
    for end in memchr_iter(b'\n', bytes) {
        line_ranges.push((start, end));
        start = end + 1;
    }
    if include_partial && start < bytes.len() {
        line_ranges.push((start, bytes.len()));
        start = bytes.len();
    }

    let lines: Vec<ParsedLine> = line_ranges
        .par_iter()
        .enumerate()
        .filter_map(|(idx, &(start, end))| {
            let text = String::from_utf8_lossy(&bytes[start..end]);
            parser.parse(idx as u64 + 1, &text)
        })
        .collect();

    Ok(LogSnapshot {
        lines,
        end: TailPosition {
            line_number: line_ranges.len() as u64,
            byte: start as u64,
        },
    })
}

/// Position just past the last complete line, without parsing anything.
pub fn find_log_end<P: AsRef<Path>>(path: P) -> io::Result<TailPosition> {
    let file = fs::File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    let bytes = mmap.as_ref();

    let mut end = TailPosition::default();
    for newline in memchr_iter(b'\n', bytes) {
        end.line_number += 1;
        end.byte = newline as u64 + 1;
    }
    Ok(end)
}

/// Follow a growing log file, sending accepted lines in file order.
///
/// Returns the position reached when `shutdown` fires or the receiver goes
/// away. A file that disappears is a terminal [`TailError::SourceGone`]; a
/// file that shrinks below the read position is assumed rotated and is
/// re-read from the start.
pub async fn tail_log_file<P: AsRef<Path>>(
    path: P,
    parser: Arc<LineParser>,
    start: TailPosition,
    poll_interval: Duration,
    tx: mpsc::Sender<ParsedLine>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<TailPosition, TailError> {
    let path = path.as_ref();
    let mut reader = open_at(path, start.byte).await?;
    let mut pos = start;
    let mut buf: Vec<u8> = Vec::new();

    loop {
        if *shutdown.borrow() {
            break;
        }

        let read = reader.read_until(b'\n', &mut buf).await?;
        if read > 0 && buf.ends_with(b"\n") {
            pos.byte += buf.len() as u64;
            pos.line_number += 1;

            let parsed = {
                let text = String::from_utf8_lossy(&buf);
                parser.parse(pos.line_number, &text)
            };
            buf.clear();

            if let Some(line) = parsed
                && tx.send(line).await.is_err()
            {
                tracing::debug!("Line receiver dropped, stopping tail");
                break;
            }
            continue;
        }

        // End of current data; a partial line stays in `buf` until completed
        match tokio::fs::metadata(path).await {
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(TailError::SourceGone(path.to_path_buf()));
            }
            Err(e) => return Err(TailError::Io(e)),
            Ok(meta) if meta.len() < pos.byte => {
                tracing::info!(
                    path = %path.display(),
                    len = meta.len(),
                    position = pos.byte,
                    "Log file truncated, reading from start"
                );
                reader = open_at(path, 0).await?;
                pos = TailPosition::default();
                buf.clear();
                continue;
            }
            Ok(_) => {}
        }

        tokio::select! {
            _ = sleep(poll_interval) => {}
            changed = shutdown.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    Ok(pos)
}

async fn open_at(path: &Path, byte: u64) -> Result<BufReader<File>, TailError> {
    let file = File::open(path).await.map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            TailError::SourceGone(path.to_path_buf())
        } else {
            TailError::Open {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let mut reader = BufReader::new(file);
    reader.seek(SeekFrom::Start(byte)).await?;
    Ok(reader)
}
