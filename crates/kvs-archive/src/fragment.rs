use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ArchiveError, ArchiveResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FragmentSelectorType {
    #[default]
    ProducerTimestamp,
    ServerTimestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TimestampRange {
    #[serde(with = "epoch_seconds")]
    pub start_timestamp: DateTime<Utc>,
    #[serde(with = "epoch_seconds")]
    pub end_timestamp: DateTime<Utc>,
}

impl TimestampRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> ArchiveResult<Self> {
        let range = Self {
            start_timestamp: start,
            end_timestamp: end,
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> ArchiveResult<()> {
        if self.start_timestamp > self.end_timestamp {
            return Err(ArchiveError::InvalidArgument(format!(
                "timestamp range starts after it ends: {self}"
            )));
        }
        Ok(())
    }
}

impl Display for TimestampRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}",
            self.start_timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            self.end_timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        )
    }
}

/// Which fragments of a stream a listing should return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FragmentSelector {
    pub fragment_selector_type: FragmentSelectorType,
    pub timestamp_range: TimestampRange,
}

impl FragmentSelector {
    pub fn new(selector_type: FragmentSelectorType, range: TimestampRange) -> Self {
        Self {
            fragment_selector_type: selector_type,
            timestamp_range: range,
        }
    }

    pub fn producer_timestamp(range: TimestampRange) -> Self {
        Self::new(FragmentSelectorType::ProducerTimestamp, range)
    }

    pub fn server_timestamp(range: TimestampRange) -> Self {
        Self::new(FragmentSelectorType::ServerTimestamp, range)
    }
}

/// Position of a listing request.
///
/// The service rejects a continuation token sent together with a selector, so
/// a request carries exactly one of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PageCursor {
    #[serde(rename = "FragmentSelector")]
    Selector(FragmentSelector),
    NextToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListFragmentsRequest {
    pub stream_name: String,
    pub max_results: u32,
    #[serde(flatten)]
    pub cursor: PageCursor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Fragment {
    pub fragment_number: String,
    #[serde(default)]
    pub fragment_size_in_bytes: Option<u64>,
    #[serde(default, with = "epoch_seconds::option")]
    pub producer_timestamp: Option<DateTime<Utc>>,
    #[serde(default, with = "epoch_seconds::option")]
    pub server_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub fragment_length_in_milliseconds: Option<u64>,
}

impl Fragment {
    pub fn new(fragment_number: impl Into<String>) -> Self {
        Self {
            fragment_number: fragment_number.into(),
            fragment_size_in_bytes: None,
            producer_timestamp: None,
            server_timestamp: None,
            fragment_length_in_milliseconds: None,
        }
    }
}

/// One page of a fragment listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FragmentPage {
    #[serde(default)]
    pub fragments: Vec<Fragment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

impl FragmentPage {
    /// Token for the following page. An empty token ends the listing too.
    pub fn continuation(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Timestamps travel as fractional epoch seconds.
mod epoch_seconds {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn to_seconds(timestamp: &DateTime<Utc>) -> f64 {
        timestamp.timestamp_millis() as f64 / 1000.0
    }

    pub fn from_seconds<E: Error>(seconds: f64) -> Result<DateTime<Utc>, E> {
        DateTime::from_timestamp_millis((seconds * 1000.0).round() as i64)
            .ok_or_else(|| E::custom(format!("timestamp out of range: {seconds}")))
    }

    pub fn serialize<S: Serializer>(
        timestamp: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(to_seconds(timestamp))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        from_seconds(f64::deserialize(deserializer)?)
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            timestamp: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match timestamp {
                Some(timestamp) => serializer.serialize_f64(super::to_seconds(timestamp)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            Option::<f64>::deserialize(deserializer)?
                .map(super::from_seconds)
                .transpose()
        }
    }
}
