use std::num::NonZeroU32;

use anyhow::bail;
use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};
use kvs_archive::{
    mkv::{self, CountVisitor, FragmentMetadataVisitor, MkvElement, MkvElementVisitor, Visit},
    util::http::parse_headers,
    ArchivedMediaClient, ArchivedMediaWorker, FragmentSelector, FragmentSelectorType, HttpClient,
    RetryPolicy, RetryingSource, TimestampRange,
};

#[derive(ValueEnum, Debug, Clone, Copy)]
enum SelectorType {
    Producer,
    Server,
}

impl From<SelectorType> for FragmentSelectorType {
    fn from(value: SelectorType) -> Self {
        match value {
            SelectorType::Producer => FragmentSelectorType::ProducerTimestamp,
            SelectorType::Server => FragmentSelectorType::ServerTimestamp,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[clap(version, about)]
pub struct KvsArcArgs {
    /// Debug output
    #[clap(long, alias = "debug")]
    verbose: bool,

    /// Start of the timestamp range, inclusive. eg. 2024-01-01T00:00:00Z
    #[clap(long, env = "KVS_START")]
    start: DateTime<Utc>,

    /// End of the timestamp range, inclusive.
    #[clap(long, env = "KVS_END")]
    end: DateTime<Utc>,

    /// Which timestamp the range applies to
    #[clap(long, env = "KVS_SELECTOR_TYPE", value_enum, default_value = "producer")]
    selector_type: SelectorType,

    /// Data endpoint serving ListFragments
    #[clap(long, env = "KVS_LIST_FRAGMENTS_ENDPOINT")]
    list_endpoint: Option<String>,

    /// Data endpoint serving GetMediaForFragmentList.
    /// Defaults to the ListFragments endpoint.
    #[clap(long, env = "KVS_MEDIA_ENDPOINT")]
    media_endpoint: Option<String>,

    /// Control plane endpoint, used to discover data endpoints when none is given
    #[clap(long, env = "KVS_CONTROL_ENDPOINT")]
    control_endpoint: Option<String>,

    /// Fragments requested per ListFragments page, at most 1000
    #[clap(long, env = "KVS_PAGE_SIZE", default_value = "100")]
    page_size: NonZeroU32,

    /// Retry limit for throttled or unavailable requests
    #[clap(long, env = "KVS_RETRIES", default_value = "0")]
    retries: u32,

    /// Largest element content kept in memory. Bigger elements are skipped.
    #[clap(long, env = "KVS_MAX_CONTENT_SIZE", default_value = "32768")]
    max_content_size: u64,

    /// HTTP Header sent with every request
    ///
    /// Custom header. eg. "Authorization: xxxxx".
    #[clap(short = 'H', long)]
    headers: Vec<String>,

    /// Stream name
    #[clap(env = "KVS_STREAM_NAME")]
    stream_name: String,
}

impl KvsArcArgs {
    fn selector(&self) -> anyhow::Result<FragmentSelector> {
        let range = TimestampRange::new(self.start, self.end)?;
        Ok(FragmentSelector::new(self.selector_type.into(), range))
    }

    async fn client(&self) -> anyhow::Result<ArchivedMediaClient> {
        let http = HttpClient::with_headers(parse_headers(&self.headers)?)?;

        let client = match (&self.list_endpoint, &self.media_endpoint, &self.control_endpoint) {
            (Some(list), media, _) => {
                ArchivedMediaClient::new(http, list, media.as_deref().unwrap_or(list))?
            }
            (None, _, Some(control)) => {
                ArchivedMediaClient::discover(http, control, &self.stream_name).await?
            }
            (None, _, None) => bail!("Either --list-endpoint or --control-endpoint is required."),
        };
        Ok(client)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = KvsArcArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let selector = args.selector()?;
    let source = RetryingSource::new(args.client().await?, RetryPolicy::new(args.retries));
    let worker = ArchivedMediaWorker::new(source, args.stream_name.clone(), selector)
        .page_size(args.page_size)
        .max_content_size(args.max_content_size);

    let mut counts = CountVisitor::new();
    let mut metadata = FragmentMetadataVisitor::new();
    let report = worker
        .run(&mut |element: &MkvElement| -> mkv::Result<Visit> {
            metadata.visit(element)?;
            counts.visit(element)
        })
        .await?;

    println!(
        "{} fragments, {} bytes, visit completed: {}",
        report.fragment_count, report.payload_bytes, report.visit_completed
    );
    for (name, count) in counts.by_name() {
        println!("{name:>16} {count}");
    }
    for fragment in metadata.fragments() {
        println!(
            "fragment {} server {} producer {}",
            fragment.fragment_number().unwrap_or("-"),
            fragment.server_timestamp().unwrap_or("-"),
            fragment.producer_timestamp().unwrap_or("-"),
        );
    }

    Ok(())
}
