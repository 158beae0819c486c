//! Drop-folder watcher
//!
//! Filesystem events arrive on notify's own thread and are pushed into a
//! bounded queue; a small pool of async workers drains it through the
//! ingestion pipeline. A full queue blocks the notify thread, which is the
//! backpressure. The watcher never waits on or observes individual
//! ingestions beyond logging their outcome.

use crate::errors::IngestionError;
use crate::processor::{is_pdf, pdf_files_in, IngestOutcome, IngestionPipeline};
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use papershelf_common::config::LibraryConfig;
use papershelf_common::metrics::{record_enqueued, record_ingestion, set_queue_depth, IngestOutcomeLabel};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Running watcher. Dropping it also stops the workers, without waiting for them.
pub struct WatcherHandle {
    folder: PathBuf,
    watcher: RecommendedWatcher,
    stop: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
}

impl WatcherHandle {
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Stop receiving events and wait for workers to finish their current file.
    /// Files still queued are left for the next startup scan.
    pub async fn shutdown(self) {
        let WatcherHandle {
            folder,
            watcher,
            stop,
            workers,
        } = self;

        drop(watcher);
        let _ = stop.send(true);
        futures::future::join_all(workers).await;

        info!(folder = %folder.display(), "Folder watcher stopped");
    }
}

/// Start watching the configured library folder.
///
/// Returns `Ok(None)` when no folder is configured or it is not an existing
/// directory; the rest of the application keeps running without a watcher.
pub async fn start_watcher(
    config: &LibraryConfig,
    pipeline: Arc<IngestionPipeline>,
) -> Result<Option<WatcherHandle>, IngestionError> {
    let Some(folder) = config.watch_folder() else {
        match config.folder_path() {
            Some(path) => warn!(folder = %path.display(), "Library folder does not exist, watcher disabled"),
            None => info!("No library folder configured, watcher disabled"),
        }
        return Ok(None);
    };

    let (sender, receiver) = mpsc::channel::<PathBuf>(config.queue_capacity.max(1));
    let receiver = Arc::new(Mutex::new(receiver));
    let (stop, stop_rx) = watch::channel(false);

    let workers = (0..config.workers.max(1))
        .map(|index| {
            spawn_worker(
                index,
                Arc::clone(&receiver),
                stop_rx.clone(),
                Arc::clone(&pipeline),
                config.settle_delay(),
            )
        })
        .collect();

    let event_sender = sender.clone();
    let mut watcher = RecommendedWatcher::new(
        move |result: notify::Result<Event>| match result {
            Ok(event) => {
                for path in appeared_pdfs(event) {
                    record_enqueued("watch");
                    if event_sender.blocking_send(path).is_err() {
                        debug!("Ingestion queue closed, dropping event");
                    }
                }
            }
            Err(e) => warn!(error = %e, "Folder watch error"),
        },
        notify::Config::default(),
    )?;
    watcher.watch(&folder, RecursiveMode::NonRecursive)?;

    info!(
        folder = %folder.display(),
        workers = config.workers.max(1),
        queue_capacity = config.queue_capacity.max(1),
        "Folder watcher started"
    );

    if config.scan_on_startup {
        let existing = pdf_files_in(&folder)?;
        info!(count = existing.len(), "Queueing PDFs already in library folder");
        tokio::spawn(async move {
            for path in existing {
                record_enqueued("scan");
                if sender.send(path).await.is_err() {
                    break;
                }
            }
        });
    }

    Ok(Some(WatcherHandle {
        folder,
        watcher,
        stop,
        workers,
    }))
}

/// PDF files that came into existence with this event
fn appeared_pdfs(event: Event) -> Vec<PathBuf> {
    let appeared = matches!(
        event.kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both))
    );
    if !appeared {
        return Vec::new();
    }

    event
        .paths
        .into_iter()
        .filter(|path| is_pdf(path) && path.is_file())
        .collect()
}

fn spawn_worker(
    index: usize,
    receiver: Arc<Mutex<mpsc::Receiver<PathBuf>>>,
    mut stop: watch::Receiver<bool>,
    pipeline: Arc<IngestionPipeline>,
    settle_delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let next = {
                let mut receiver = receiver.lock().await;
                let next = tokio::select! {
                    biased;
                    _ = stop.changed() => None,
                    next = receiver.recv() => next,
                };
                set_queue_depth(receiver.len());
                next
            };
            let Some(path) = next else { break };

            // the producer may still be writing
            tokio::time::sleep(settle_delay).await;
            ingest_one(&pipeline, &path).await;
        }
        debug!(worker = index, "Ingestion worker exiting");
    })
}

async fn ingest_one(pipeline: &IngestionPipeline, path: &Path) {
    match pipeline.ingest(path).await {
        Ok(IngestOutcome::Ingested(paper)) => {
            debug!(paper_id = %paper.id, path = %path.display(), "Watched file ingested");
        }
        Ok(IngestOutcome::AlreadyPresent { .. }) => {}
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping file that could not be ingested");
            record_ingestion(IngestOutcomeLabel::Failed, 0.0);
        }
    }
}
