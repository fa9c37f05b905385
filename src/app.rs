use std::thread;
use std::time::{Duration, Instant};

use camino::Utf8Path;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::{BATCH_SIZE, CollectionId, MemberId, MemberRecord};
use crate::error::MaplistError;
use crate::manifest;
use crate::steam::WorkshopClient;

/// Pause between two consecutive details requests.
pub const DEFAULT_PACING: Duration = Duration::from_millis(800);

#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub pacing: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
        }
    }
}

pub trait Pacer {
    fn pause(&self, delay: Duration);
}

impl<P: Pacer + ?Sized> Pacer for &P {
    fn pause(&self, delay: Duration) {
        (**self).pause(delay)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn pause(&self, delay: Duration) {
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResult {
    pub collection_id: String,
    pub path: String,
    pub members: usize,
    pub records: usize,
    pub lines: usize,
    pub batches: usize,
    pub generated_at: String,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub message: String,
    pub elapsed: Option<Duration>,
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<C: WorkshopClient, P: Pacer = ThreadPacer> {
    client: C,
    pacer: P,
    options: FetchOptions,
}

impl<C: WorkshopClient> App<C> {
    pub fn new(client: C, options: FetchOptions) -> Self {
        Self::with_pacer(client, ThreadPacer, options)
    }
}

impl<C: WorkshopClient, P: Pacer> App<C, P> {
    pub fn with_pacer(client: C, pacer: P, options: FetchOptions) -> Self {
        Self {
            client,
            pacer,
            options,
        }
    }

    /// Single request; returns member ids in the order Steam lists them.
    pub fn resolve_collection(
        &self,
        id: &CollectionId,
        sink: &dyn ProgressSink,
    ) -> Result<Vec<MemberId>, MaplistError> {
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; collection {id}"),
            elapsed: None,
        });
        let started = Instant::now();
        let members = self.client.collection_children(id)?;
        info!(collection = %id, members = members.len(), "resolved collection");
        sink.event(ProgressEvent {
            message: format!("phase=Resolve; {} members", members.len()),
            elapsed: Some(started.elapsed()),
        });
        Ok(members)
    }

    /// Looks up details in chunks of [`BATCH_SIZE`], one request per chunk,
    /// strictly sequential with the configured pause between requests. The
    /// first failing chunk aborts the whole lookup.
    pub fn resolve_details(
        &self,
        ids: &[MemberId],
        sink: &dyn ProgressSink,
    ) -> Result<Vec<MemberRecord>, MaplistError> {
        let total = batch_count(ids.len());
        let mut records = Vec::with_capacity(ids.len());

        for (index, chunk) in ids.chunks(BATCH_SIZE).enumerate() {
            if index > 0 {
                self.pacer.pause(self.options.pacing);
            }
            let started = Instant::now();
            let batch = self.client.published_file_details(chunk)?;
            debug!(
                batch = index + 1,
                requested = chunk.len(),
                returned = batch.len(),
                "fetched details batch"
            );
            sink.event(ProgressEvent {
                message: format!(
                    "phase=Details; batch {}/{total} ({} items)",
                    index + 1,
                    chunk.len()
                ),
                elapsed: Some(started.elapsed()),
            });
            records.extend(batch);
        }

        Ok(records)
    }

    /// Runs the whole pipeline and writes `maplist.txt` into `output_dir`.
    /// Nothing is written unless every request succeeded.
    pub fn generate(
        &self,
        id: &CollectionId,
        output_dir: &Utf8Path,
        sink: &dyn ProgressSink,
    ) -> Result<GenerateResult, MaplistError> {
        let members = self.resolve_collection(id, sink)?;
        let records = self.resolve_details(&members, sink)?;
        let lines = manifest::build(&records);

        sink.event(ProgressEvent {
            message: format!("phase=Write; {} lines", lines.len()),
            elapsed: None,
        });
        let path = manifest::write_manifest(output_dir, &lines)?;
        info!(path = %path, lines = lines.len(), "wrote manifest");

        Ok(GenerateResult {
            collection_id: id.to_string(),
            path: path.to_string(),
            members: members.len(),
            records: records.len(),
            lines: lines.len(),
            batches: batch_count(members.len()),
            generated_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

pub fn batch_count(len: usize) -> usize {
    len.div_ceil(BATCH_SIZE)
}
