pub mod client;
pub mod error;
pub mod fragment;
pub mod lister;
pub mod retry;
pub mod util;
pub mod worker;

pub use bytes::Bytes;
pub use client::ArchivedMediaClient;
pub use error::*;
pub use fragment::*;
pub use lister::list_all_fragments;
pub use retry::{RetryPolicy, RetryingSource};
pub use util::http::HttpClient;
pub use worker::{ArchivedMediaWorker, WorkerReport};

pub use kvs_archive_mkv as mkv;

/// ```text
///                    ┌──────────────┐  ListFragmentsRequest   ┌───────────────┐
///                    │              ├─────────────────────────►               │
///  FragmentSelector  │              │  FragmentPage + token   │               │
/// ───────────────────►   Lister     ◄─────────────────────────┤ FragmentSource│
///                    │              │         ...             │               │
///                    │              ◄─────────────────────────┤               │
///                    └──────┬───────┘   last page, no token   └───────────────┘
///                           │ sorted fragment numbers
///                    ┌──────▼───────┐                         ┌───────────────┐
///                    │   Worker     ├────────────────────────►  MediaSource   │
///                    │              ◄────── mkv payload ──────┤               │
///                    └──────┬───────┘                         └───────────────┘
///                           │ elements
///                    ┌──────▼───────┐
///                    │   Visitor    │
///                    └──────────────┘
/// ```
pub trait FragmentSource {
    /// Request a single page of the fragment listing.
    fn list_fragments(
        &self,
        request: ListFragmentsRequest,
    ) -> impl std::future::Future<Output = ArchiveResult<FragmentPage>> + Send;
}

pub trait MediaSource {
    /// Fetch the media of the given fragments, concatenated in request order.
    fn get_media_for_fragment_list(
        &self,
        stream_name: &str,
        fragments: &[String],
    ) -> impl std::future::Future<Output = ArchiveResult<Bytes>> + Send;
}
