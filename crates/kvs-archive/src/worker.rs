use std::num::NonZeroU32;

use bytes::Buf;
use kvs_archive_mkv::{MkvElementVisitor, StreamingMkvReader, Visit, DEFAULT_MAX_CONTENT_SIZE};

use crate::{
    error::ArchiveResult, lister::list_all_fragments, FragmentSelector, FragmentSource,
    MediaSource,
};

pub const DEFAULT_PAGE_SIZE: NonZeroU32 = match NonZeroU32::new(100) {
    Some(size) => size,
    None => unreachable!(),
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub fragment_count: usize,
    pub payload_bytes: usize,
    /// `true` if the visitor saw the payload to its end, or asked to stop.
    /// `false` if the payload was skipped or parsing failed.
    pub visit_completed: bool,
}

/// Retrieves every fragment of a stream within a time range and feeds the
/// concatenated media to an element visitor.
pub struct ArchivedMediaWorker<S> {
    source: S,
    stream_name: String,
    selector: FragmentSelector,

    page_size: NonZeroU32,
    max_content_size: u64,
}

impl<S> ArchivedMediaWorker<S>
where
    S: FragmentSource + MediaSource,
{
    pub fn new(source: S, stream_name: impl Into<String>, selector: FragmentSelector) -> Self {
        Self {
            source,
            stream_name: stream_name.into(),
            selector,

            page_size: DEFAULT_PAGE_SIZE,
            max_content_size: DEFAULT_MAX_CONTENT_SIZE,
        }
    }

    pub fn page_size(mut self, page_size: NonZeroU32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn max_content_size(mut self, max_content_size: u64) -> Self {
        self.max_content_size = max_content_size;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn run<V>(&self, visitor: &mut V) -> ArchiveResult<WorkerReport>
    where
        V: MkvElementVisitor + ?Sized,
    {
        log::info!("Start archived media worker on stream {}", self.stream_name);

        let result = self.process(visitor).await;
        if let Err(e) = &result {
            log::error!(
                "Failure in archived media worker for stream {}: {e} with timestamp range {}",
                self.stream_name,
                self.selector.timestamp_range
            );
        }

        log::info!("Exiting archived media worker for stream {}", self.stream_name);
        result
    }

    async fn process<V>(&self, visitor: &mut V) -> ArchiveResult<WorkerReport>
    where
        V: MkvElementVisitor + ?Sized,
    {
        let fragments = list_all_fragments(
            &self.source,
            &self.stream_name,
            &self.selector,
            self.page_size,
        )
        .await?;

        let mut report = WorkerReport {
            fragment_count: fragments.len(),
            ..Default::default()
        };
        if fragments.is_empty() {
            log::info!(
                "No fragments in timestamp range {}, skipping media retrieval.",
                self.selector.timestamp_range
            );
            return Ok(report);
        }

        log::info!(
            "Retrieving media for {} fragment numbers on timestamp range {}",
            fragments.len(),
            self.selector.timestamp_range
        );
        let payload = self
            .source
            .get_media_for_fragment_list(&self.stream_name, &fragments)
            .await?;
        report.payload_bytes = payload.len();

        let mut reader =
            StreamingMkvReader::with_max_content_size(payload.reader(), self.max_content_size);
        match reader.apply(visitor) {
            Ok(visit) => {
                if visit == Visit::Stop {
                    log::debug!("Visitor stopped after {} bytes", reader.offset());
                }
                report.visit_completed = true;
            }
            Err(e) => {
                log::warn!("Exception while accepting visitor: {e}");
            }
        }

        Ok(report)
    }
}
