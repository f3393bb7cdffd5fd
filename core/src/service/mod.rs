//! Catch-up read followed by live tailing of a single log file.
//!
//! One reader task produces lines; this task is the only consumer and the
//! only writer of the [`ParsingSession`].

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};

use crate::context::{AppConfig, ParsingSession};
use crate::game_log::{
    LogSnapshot, ParsedLine, RegistryError, TailError, TailPosition, find_log_end, read_log_file,
    tail_log_file,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Tail(#[from] TailError),
    #[error("reader task failed: {0}")]
    Join(#[from] JoinError),
}

/// Read everything already in the session's file, then follow it until
/// `shutdown` flips to true or the tailer fails.
///
/// With `from_start` the existing contents are applied to the session;
/// otherwise they are skipped and only new lines count. Lines already queued
/// when shutdown arrives are still applied before returning.
pub async fn run_pipeline(
    mut session: ParsingSession,
    config: &AppConfig,
    from_start: bool,
    mut shutdown: watch::Receiver<bool>,
) -> Result<ParsingSession, PipelineError> {
    let Some(path) = session.active_file.clone() else {
        return Ok(session);
    };
    let parser = session.parser();

    let catch_up = {
        let parser = Arc::clone(&parser);
        let path = path.clone();
        tokio::task::spawn_blocking(move || {
            if from_start {
                read_log_file(&path, &parser)
            } else {
                // Skipped content is never classified
                find_log_end(&path).map(|end| LogSnapshot {
                    lines: Vec::new(),
                    end,
                })
            }
        })
        .await?
    }
    .map_err(|source| PipelineError::Read {
        path: path.clone(),
        source,
    })?;

    tracing::info!(
        path = %path.display(),
        lines = catch_up.lines.len(),
        skipped = !from_start,
        "Caught up with log file"
    );
    session.process_lines(catch_up.lines);
    session.position = catch_up.end;

    let (tx, mut rx) = mpsc::channel(config.channel_capacity.max(1));
    let tail = tokio::spawn(tail_log_file(
        path.clone(),
        parser,
        catch_up.end,
        config.poll_interval(),
        tx,
        shutdown.clone(),
    ));

    loop {
        tokio::select! {
            line = rx.recv() => match line {
                Some(line) => session.process_line(line),
                // Tailer exited on its own; its result is collected below
                None => break,
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }

    // Stop producing, then apply whatever was already queued
    let end = tail_after_drain(&mut session, &mut rx, tail).await;
    match end {
        Ok(position) => {
            session.position = position;
            tracing::info!(
                path = %path.display(),
                line = position.line_number,
                "Stopped tailing log file"
            );
            Ok(session)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Log tailing failed");
            Err(e)
        }
    }
}

async fn tail_after_drain(
    session: &mut ParsingSession,
    rx: &mut mpsc::Receiver<ParsedLine>,
    tail: JoinHandle<Result<TailPosition, TailError>>,
) -> Result<TailPosition, PipelineError> {
    rx.close();
    while let Some(line) = rx.recv().await {
        session.process_line(line);
    }
    Ok(tail.await??)
}
