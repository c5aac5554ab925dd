use crate::error::{MetricsError, Result};
use crate::util::parse_event_date;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

pub const SCHEMA_VERSION: u32 = 1;

/// Synthetic owner holding the merged view of a repository with two owners.
pub const TOTAL_OWNER: &str = "total";

/// Per-date event counts, in first-seen order.
pub type DateCounts = IndexMap<NaiveDate, u64>;

/// Per-quarter event counts, in the order the quarters were first accumulated.
pub type QuarterCounts = IndexMap<QuarterKey, u64>;

/// `owner -> repo -> raw bundle`, the shape of `raw_data.json`.
pub type RawData = IndexMap<String, IndexMap<String, RawBundle>>;

/// `repo -> owner -> aggregated bundle`, the shape of `metrics.json`.
pub type MetricsFile = IndexMap<String, IndexMap<String, AggregatedBundle>>;

/// `metrics.json` with owner entries left unparsed, so that one bad entry
/// does not reject the whole file.
pub type MetricsDocument = IndexMap<String, IndexMap<String, Value>>;

/// A calendar quarter. Orders chronologically: year first, then quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QuarterKey {
    pub year: i32,
    pub quarter: u8,
}

impl QuarterKey {
    pub fn new(year: i32, quarter: u8) -> Result<Self> {
        if !(1..=4).contains(&quarter) {
            return Err(MetricsError::InvalidQuarterKey(format!("Q{quarter}-{year}")));
        }
        Ok(Self { year, quarter })
    }
}

impl fmt::Display for QuarterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Q{}-{}", self.quarter, self.year)
    }
}

impl FromStr for QuarterKey {
    type Err = MetricsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || MetricsError::InvalidQuarterKey(s.to_string());
        let rest = s.strip_prefix('Q').ok_or_else(invalid)?;
        let (quarter, year) = rest.split_once('-').ok_or_else(invalid)?;
        let quarter: u8 = quarter.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        Self::new(year, quarter).map_err(|_| invalid())
    }
}

impl Serialize for QuarterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QuarterKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Metrics recorded as a list of event dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    CommentsDates,
    IssueCreationDates,
    PrMergedDates,
    ExternalCommentsDates,
    PrCreationDates,
}

impl SeriesKind {
    pub const ALL: [SeriesKind; 5] = [
        SeriesKind::CommentsDates,
        SeriesKind::IssueCreationDates,
        SeriesKind::PrMergedDates,
        SeriesKind::ExternalCommentsDates,
        SeriesKind::PrCreationDates,
    ];

    /// The series published in the quarterly report.
    pub const REPORTED: [SeriesKind; 3] = [
        SeriesKind::CommentsDates,
        SeriesKind::IssueCreationDates,
        SeriesKind::PrMergedDates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::CommentsDates => "comments_dates",
            SeriesKind::IssueCreationDates => "issue_creation_dates",
            SeriesKind::PrMergedDates => "pr_merged_dates",
            SeriesKind::ExternalCommentsDates => "external_comments_dates",
            SeriesKind::PrCreationDates => "pr_creation_dates",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time counts ("punctual indicators").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    OpenIssuesCount,
    OpenPullsCount,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 2] = [ScalarKind::OpenIssuesCount, ScalarKind::OpenPullsCount];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::OpenIssuesCount => "open_issues_count",
            ScalarKind::OpenPullsCount => "open_pulls_count",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A field name of a metrics bundle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetricName {
    Series(SeriesKind),
    Scalar(ScalarKind),
    Other(String),
}

impl MetricName {
    pub fn parse(name: &str) -> Self {
        if let Some(kind) = SeriesKind::from_name(name) {
            MetricName::Series(kind)
        } else if let Some(kind) = ScalarKind::from_name(name) {
            MetricName::Scalar(kind)
        } else {
            MetricName::Other(name.to_string())
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricName::Series(kind) => f.write_str(kind.as_str()),
            MetricName::Scalar(kind) => f.write_str(kind.as_str()),
            MetricName::Other(name) => f.write_str(name),
        }
    }
}

/// Metrics of one (repository, owner) as fetched: date lists plus open counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawBundle {
    pub series: IndexMap<SeriesKind, Vec<NaiveDate>>,
    pub open_issues_count: Option<u64>,
    pub open_pulls_count: Option<u64>,
    pub extra: IndexMap<String, Value>,
}

impl RawBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, kind: SeriesKind, dates: Vec<NaiveDate>) -> Self {
        self.series.insert(kind, dates);
        self
    }

    pub fn with_scalar(mut self, kind: ScalarKind, value: u64) -> Self {
        match kind {
            ScalarKind::OpenIssuesCount => self.open_issues_count = Some(value),
            ScalarKind::OpenPullsCount => self.open_pulls_count = Some(value),
        }
        self
    }

    pub fn scalar(&self, kind: ScalarKind) -> Option<u64> {
        match kind {
            ScalarKind::OpenIssuesCount => self.open_issues_count,
            ScalarKind::OpenPullsCount => self.open_pulls_count,
        }
    }

    /// Every field present in the bundle: series, then scalars, then extras.
    pub fn field_names(&self) -> Vec<MetricName> {
        let mut names: Vec<MetricName> = self.series.keys().copied().map(MetricName::Series).collect();
        names.extend(
            ScalarKind::ALL
                .into_iter()
                .filter(|kind| self.scalar(*kind).is_some())
                .map(MetricName::Scalar),
        );
        names.extend(self.extra.keys().cloned().map(MetricName::Other));
        names
    }

    pub fn from_fields(fields: IndexMap<String, Value>) -> Result<Self> {
        let mut bundle = Self::new();
        for (name, value) in fields {
            match MetricName::parse(&name) {
                MetricName::Series(kind) => {
                    let items = value
                        .as_array()
                        .ok_or_else(|| MetricsError::invalid_field(&name, "expected an array of dates"))?;
                    let mut dates = Vec::with_capacity(items.len());
                    for item in items {
                        let text = item
                            .as_str()
                            .ok_or_else(|| MetricsError::invalid_field(&name, format!("not a date: {item}")))?;
                        dates.push(parse_event_date(text)?);
                    }
                    bundle.series.insert(kind, dates);
                }
                MetricName::Scalar(kind) => {
                    let count = value
                        .as_u64()
                        .ok_or_else(|| MetricsError::invalid_field(&name, format!("not a count: {value}")))?;
                    bundle = bundle.with_scalar(kind, count);
                }
                MetricName::Other(name) => {
                    bundle.extra.insert(name, value);
                }
            }
        }
        Ok(bundle)
    }
}

impl Serialize for RawBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (kind, dates) in &self.series {
            let dates: Vec<String> = dates.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
            map.serialize_entry(kind.as_str(), &dates)?;
        }
        for kind in ScalarKind::ALL {
            if let Some(count) = self.scalar(kind) {
                map.serialize_entry(kind.as_str(), &count)?;
            }
        }
        for (name, value) in &self.extra {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawBundle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let fields = IndexMap::<String, Value>::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(de::Error::custom)
    }
}

/// Metrics of one (repository, owner) after quarter bucketing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedBundle {
    pub series: IndexMap<SeriesKind, QuarterCounts>,
    pub open_issues_count: u64,
    pub open_pulls_count: u64,
    pub extra: IndexMap<String, Value>,
}

impl AggregatedBundle {
    pub fn scalar(&self, kind: ScalarKind) -> u64 {
        match kind {
            ScalarKind::OpenIssuesCount => self.open_issues_count,
            ScalarKind::OpenPullsCount => self.open_pulls_count,
        }
    }

    pub fn total_events(&self, kind: SeriesKind) -> u64 {
        self.series
            .get(&kind)
            .map(|counts| counts.values().fold(0u64, |acc, n| acc.saturating_add(*n)))
            .unwrap_or(0)
    }

    /// Reads one owner entry of a metrics file.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Self::from_fields(fields.into_iter().collect()),
            other => Err(MetricsError::InvalidField {
                field: "bundle".to_string(),
                reason: format!("expected an object, found {other}"),
            }),
        }
    }

    pub fn from_fields(fields: IndexMap<String, Value>) -> Result<Self> {
        let mut series = IndexMap::new();
        let mut open_issues_count = None;
        let mut open_pulls_count = None;
        let mut extra = IndexMap::new();

        for (name, value) in fields {
            match MetricName::parse(&name) {
                MetricName::Series(kind) => {
                    let counts: QuarterCounts = serde_json::from_value(value)
                        .map_err(|e| MetricsError::invalid_field(&name, e))?;
                    series.insert(kind, counts);
                }
                MetricName::Scalar(kind) => {
                    let count = value
                        .as_u64()
                        .ok_or_else(|| MetricsError::invalid_field(&name, format!("not a count: {value}")))?;
                    match kind {
                        ScalarKind::OpenIssuesCount => open_issues_count = Some(count),
                        ScalarKind::OpenPullsCount => open_pulls_count = Some(count),
                    }
                }
                MetricName::Other(name) => {
                    extra.insert(name, value);
                }
            }
        }

        Ok(Self {
            series,
            open_issues_count: open_issues_count
                .ok_or_else(|| MetricsError::invalid_field(ScalarKind::OpenIssuesCount, "missing"))?,
            open_pulls_count: open_pulls_count
                .ok_or_else(|| MetricsError::invalid_field(ScalarKind::OpenPullsCount, "missing"))?,
            extra,
        })
    }
}

impl Serialize for AggregatedBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (kind, counts) in &self.series {
            map.serialize_entry(kind.as_str(), counts)?;
        }
        map.serialize_entry(ScalarKind::OpenIssuesCount.as_str(), &self.open_issues_count)?;
        map.serialize_entry(ScalarKind::OpenPullsCount.as_str(), &self.open_pulls_count)?;
        for (name, value) in &self.extra {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AggregatedBundle {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let fields = IndexMap::<String, Value>::deserialize(deserializer)?;
        Self::from_fields(fields).map_err(de::Error::custom)
    }
}

/// Envelope printed by `aggregate` when a machine-readable summary is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub version: u32,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub repositories: Vec<RepoSummary>,
    pub skipped: Vec<SkippedRepo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoSummary {
    pub repo: String,
    pub owners: Vec<String>,
    pub events: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRepo {
    pub repo: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellOutput {
    pub cell: String,
    pub row: usize,
    pub col: usize,
    pub value: crate::report::CellValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetOutput {
    pub title: String,
    pub repo: String,
    pub owner: String,
    pub cells: Vec<CellOutput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedSheet {
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportOutput {
    pub version: u32,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub sheets: Vec<SheetOutput>,
    pub skipped: Vec<SkippedSheet>,
}

/// One cell per line, as printed by `report --ndjson`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellLine {
    pub sheet: String,
    #[serde(flatten)]
    pub cell: CellOutput,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalCommentsOutput {
    pub version: u32,
    pub generated_at: chrono::DateTime<chrono::Utc>,
    pub comments: usize,
    pub external_comments: usize,
    pub quarters: QuarterCounts,
}
