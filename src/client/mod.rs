//! Reporting API clients.
//!
//! [`Client`] is built on blocking `reqwest` and must not be used from inside an
//! async runtime; [`AsyncClient`] is its async twin with identical endpoints.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::api_tokens::{AsyncTokenProvider, TokenProvider};
use crate::config::ClientConfig;
use crate::errors::ApiError;
use crate::schema::{
    Advertiser, Billing, Campaign, Category, Conversion, CountConvention, Creative, InvoiceData,
    Offer, Stats, UserInfo,
};

pub mod async_client;
pub mod auth;
pub(crate) mod endpoints;
pub mod pagination;
pub(crate) mod request;

pub use async_client::AsyncClient;
pub use auth::Auth;
pub use endpoints::{StatsQuery, Subcampaigns};
pub use pagination::CursorIter;

use endpoints::Endpoint;
use request::{default_headers, handle_response, join_url};

pub type ClientAuth = Auth<dyn TokenProvider>;
pub type AsyncClientAuth = Auth<dyn AsyncTokenProvider>;

#[derive(Debug, Deserialize)]
pub(crate) struct ClientData {
    pub invoicing: InvoiceData,
}

#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: String,
    auth: ClientAuth,
}

impl Client {
    pub fn new(auth: ClientAuth, config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::blocking::Client::builder()
            .default_headers(default_headers())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
            auth,
        })
    }

    pub(crate) fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, ApiError> {
        debug!(path = %endpoint.path, "GET");
        let request = self
            .http
            .get(join_url(&self.base_url, &endpoint.path))
            .query(&endpoint.query);
        let response = self.auth.apply(request)?.send()?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes()?;
        handle_response(status, &headers, &body)
    }

    pub fn get_user_info(&self) -> Result<UserInfo, ApiError> {
        self.fetch(&endpoints::user_info())
    }

    pub fn get_advertisers(&self) -> Result<Vec<Advertiser>, ApiError> {
        self.fetch(&endpoints::advertisers())
    }

    pub fn get_advertiser(&self, adv_hash: &str) -> Result<Advertiser, ApiError> {
        self.fetch(&endpoints::advertiser(adv_hash))
    }

    pub fn get_invoicing_data(&self, adv_hash: &str) -> Result<InvoiceData, ApiError> {
        self.fetch::<ClientData>(&endpoints::invoicing_data(adv_hash))
            .map(|data| data.invoicing)
    }

    pub fn get_offer_categories(&self, adv_hash: &str) -> Result<Vec<Category>, ApiError> {
        self.fetch(&endpoints::offer_categories(adv_hash))
    }

    pub fn get_offers(&self, adv_hash: &str) -> Result<Vec<Offer>, ApiError> {
        self.fetch(&endpoints::offers(adv_hash))
    }

    pub fn get_advertiser_campaigns(&self, adv_hash: &str) -> Result<Vec<Campaign>, ApiError> {
        self.fetch(&endpoints::campaigns(adv_hash))
    }

    pub fn get_billing(
        &self,
        adv_hash: &str,
        day_from: NaiveDate,
        day_to: NaiveDate,
    ) -> Result<Billing, ApiError> {
        self.fetch(&endpoints::billing(adv_hash, day_from, day_to))
    }

    pub fn get_rtb_creatives(
        &self,
        adv_hash: &str,
        subcampaigns: Option<&Subcampaigns>,
        active_only: Option<bool>,
    ) -> Result<Vec<Creative>, ApiError> {
        self.fetch(&endpoints::rtb_creatives(adv_hash, subcampaigns, active_only))
    }

    /// Conversions are paginated; pages are requested lazily while iterating.
    pub fn get_rtb_conversions(
        &self,
        adv_hash: &str,
        day_from: NaiveDate,
        day_to: NaiveDate,
        count_convention: CountConvention,
    ) -> CursorIter<'_, Conversion> {
        CursorIter::new(
            self,
            endpoints::rtb_conversions(adv_hash, day_from, day_to, count_convention),
        )
    }

    pub fn get_rtb_stats(&self, adv_hash: &str, query: &StatsQuery) -> Result<Vec<Stats>, ApiError> {
        self.fetch(&endpoints::rtb_stats(adv_hash, query))
    }

    /// `query.user_segments` and `query.device_types` are not sent.
    pub fn get_summary_stats(
        &self,
        adv_hash: &str,
        query: &StatsQuery,
    ) -> Result<Vec<Stats>, ApiError> {
        self.fetch(&endpoints::summary_stats(adv_hash, query))
    }
}
