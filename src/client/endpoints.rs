//! Paths and query encoding of the reporting endpoints.
//!
//! Dates go out as `YYYY-MM-DD`, lists are joined with `-`, unset parameters are omitted.

use chrono::NaiveDate;

use crate::schema::{CountConvention, DeviceType, StatsGroupBy, StatsMetric, SubcampaignsFilter, UserSegment};
use crate::utils::constants::MAX_CURSOR_ROWS;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Endpoint {
    pub path: String,
    pub query: Vec<(&'static str, String)>,
}

impl Endpoint {
    fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            query: Vec::new(),
        }
    }

    fn param(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn param_opt(self, key: &'static str, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    fn dates(self, day_from: NaiveDate, day_to: NaiveDate) -> Self {
        self.param("dayFrom", day_from.format("%Y-%m-%d"))
            .param("dayTo", day_to.format("%Y-%m-%d"))
    }

    /// Query of the page following `cursor`; the first page carries only the row limit.
    pub fn page(&self, cursor: Option<&str>) -> Self {
        let mut page = Self::new(self.path.clone()).param("limit", MAX_CURSOR_ROWS);
        page.query.extend(self.query.iter().cloned());
        page.param_opt("nextCursor", cursor)
    }
}

fn join<T>(items: &[T], wire: impl Fn(&T) -> &str) -> Option<String> {
    if items.is_empty() {
        return None;
    }
    Some(items.iter().map(wire).collect::<Vec<_>>().join("-"))
}

/// Subcampaign selection of the creatives endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcampaigns {
    Hashes(Vec<String>),
    Filter(SubcampaignsFilter),
}

impl Subcampaigns {
    fn encode(&self) -> Option<String> {
        match self {
            Subcampaigns::Hashes(hashes) => join(hashes, String::as_str),
            Subcampaigns::Filter(filter) => Some(filter.as_str().to_owned()),
        }
    }
}

impl From<SubcampaignsFilter> for Subcampaigns {
    fn from(filter: SubcampaignsFilter) -> Self {
        Subcampaigns::Filter(filter)
    }
}

impl From<Vec<String>> for Subcampaigns {
    fn from(hashes: Vec<String>) -> Self {
        Subcampaigns::Hashes(hashes)
    }
}

/// Parameters of the rtb-stats and summary-stats reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsQuery {
    pub day_from: NaiveDate,
    pub day_to: NaiveDate,
    pub group_by: Vec<StatsGroupBy>,
    pub metrics: Vec<StatsMetric>,
    pub count_convention: Option<CountConvention>,
    pub subcampaigns: Option<Vec<String>>,
    /// rtb-stats only
    pub user_segments: Option<Vec<UserSegment>>,
    /// rtb-stats only
    pub device_types: Option<Vec<DeviceType>>,
}

impl StatsQuery {
    pub fn new(
        day_from: NaiveDate,
        day_to: NaiveDate,
        group_by: Vec<StatsGroupBy>,
        metrics: Vec<StatsMetric>,
    ) -> Self {
        Self {
            day_from,
            day_to,
            group_by,
            metrics,
            count_convention: None,
            subcampaigns: None,
            user_segments: None,
            device_types: None,
        }
    }

    pub fn count_convention(mut self, count_convention: CountConvention) -> Self {
        self.count_convention = Some(count_convention);
        self
    }

    pub fn subcampaigns(mut self, subcampaigns: Vec<String>) -> Self {
        self.subcampaigns = Some(subcampaigns);
        self
    }

    pub fn user_segments(mut self, user_segments: Vec<UserSegment>) -> Self {
        self.user_segments = Some(user_segments);
        self
    }

    pub fn device_types(mut self, device_types: Vec<DeviceType>) -> Self {
        self.device_types = Some(device_types);
        self
    }

    fn summary_params(&self, endpoint: Endpoint) -> Endpoint {
        endpoint
            .dates(self.day_from, self.day_to)
            .param("groupBy", join(&self.group_by, |g| g.as_str()).unwrap_or_default())
            .param("metrics", join(&self.metrics, |m| m.as_str()).unwrap_or_default())
            .param_opt("countConvention", self.count_convention.map(|c| c.as_str()))
            .param_opt(
                "subcampaigns",
                self.subcampaigns.as_deref().and_then(|s| join(s, String::as_str)),
            )
    }

    fn rtb_params(&self, endpoint: Endpoint) -> Endpoint {
        self.summary_params(endpoint)
            .param_opt(
                "userSegments",
                self.user_segments.as_deref().and_then(|s| join(s, |u| u.as_str())),
            )
            .param_opt(
                "deviceTypes",
                self.device_types.as_deref().and_then(|d| join(d, |d| d.as_str())),
            )
    }
}

fn advertiser_path(adv_hash: &str, suffix: &str) -> String {
    format!("/advertisers/{}{}", adv_hash, suffix)
}

pub(crate) fn user_info() -> Endpoint {
    Endpoint::new("/user/info")
}

pub(crate) fn advertisers() -> Endpoint {
    Endpoint::new("/advertisers")
}

pub(crate) fn advertiser(adv_hash: &str) -> Endpoint {
    Endpoint::new(advertiser_path(adv_hash, ""))
}

pub(crate) fn invoicing_data(adv_hash: &str) -> Endpoint {
    Endpoint::new(advertiser_path(adv_hash, "/client"))
}

pub(crate) fn offer_categories(adv_hash: &str) -> Endpoint {
    Endpoint::new(advertiser_path(adv_hash, "/offer-categories"))
}

pub(crate) fn offers(adv_hash: &str) -> Endpoint {
    Endpoint::new(advertiser_path(adv_hash, "/offers"))
}

pub(crate) fn campaigns(adv_hash: &str) -> Endpoint {
    Endpoint::new(advertiser_path(adv_hash, "/campaigns"))
}

pub(crate) fn billing(adv_hash: &str, day_from: NaiveDate, day_to: NaiveDate) -> Endpoint {
    Endpoint::new(advertiser_path(adv_hash, "/billing")).dates(day_from, day_to)
}

pub(crate) fn rtb_creatives(
    adv_hash: &str,
    subcampaigns: Option<&Subcampaigns>,
    active_only: Option<bool>,
) -> Endpoint {
    Endpoint::new(advertiser_path(adv_hash, "/rtb-creatives"))
        .param_opt("subcampaigns", subcampaigns.and_then(Subcampaigns::encode))
        .param_opt("activeOnly", active_only)
}

pub(crate) fn rtb_conversions(
    adv_hash: &str,
    day_from: NaiveDate,
    day_to: NaiveDate,
    count_convention: CountConvention,
) -> Endpoint {
    Endpoint::new(advertiser_path(adv_hash, "/conversions"))
        .dates(day_from, day_to)
        .param("countConvention", count_convention.as_str())
}

pub(crate) fn rtb_stats(adv_hash: &str, query: &StatsQuery) -> Endpoint {
    query.rtb_params(Endpoint::new(advertiser_path(adv_hash, "/rtb-stats")))
}

pub(crate) fn summary_stats(adv_hash: &str, query: &StatsQuery) -> Endpoint {
    query.summary_params(Endpoint::new(advertiser_path(adv_hash, "/summary-stats")))
}
