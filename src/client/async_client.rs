use chrono::NaiveDate;
use futures::stream::BoxStream;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::endpoints::{self, Endpoint, StatsQuery, Subcampaigns};
use super::pagination::cursor_stream;
use super::request::{default_headers, handle_response, join_url};
use super::{AsyncClientAuth, ClientData};
use crate::config::ClientConfig;
use crate::errors::ApiError;
use crate::schema::{
    Advertiser, Billing, Campaign, Category, Conversion, CountConvention, Creative, InvoiceData,
    Offer, Stats, UserInfo,
};

#[derive(Debug, Clone)]
pub struct AsyncClient {
    http: reqwest::Client,
    base_url: String,
    auth: AsyncClientAuth,
}

impl AsyncClient {
    pub fn new(auth: AsyncClientAuth, config: &ClientConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .default_headers(default_headers())
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.normalized_base_url(),
            auth,
        })
    }

    pub(crate) async fn fetch<T: DeserializeOwned>(&self, endpoint: &Endpoint) -> Result<T, ApiError> {
        debug!(path = %endpoint.path, "GET");
        let request = self
            .http
            .get(join_url(&self.base_url, &endpoint.path))
            .query(&endpoint.query);
        let response = self.auth.apply(request).await?.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;
        handle_response(status, &headers, &body)
    }

    pub async fn get_user_info(&self) -> Result<UserInfo, ApiError> {
        self.fetch(&endpoints::user_info()).await
    }

    pub async fn get_advertisers(&self) -> Result<Vec<Advertiser>, ApiError> {
        self.fetch(&endpoints::advertisers()).await
    }

    pub async fn get_advertiser(&self, adv_hash: &str) -> Result<Advertiser, ApiError> {
        self.fetch(&endpoints::advertiser(adv_hash)).await
    }

    pub async fn get_invoicing_data(&self, adv_hash: &str) -> Result<InvoiceData, ApiError> {
        self.fetch::<ClientData>(&endpoints::invoicing_data(adv_hash))
            .await
            .map(|data| data.invoicing)
    }

    pub async fn get_offer_categories(&self, adv_hash: &str) -> Result<Vec<Category>, ApiError> {
        self.fetch(&endpoints::offer_categories(adv_hash)).await
    }

    pub async fn get_offers(&self, adv_hash: &str) -> Result<Vec<Offer>, ApiError> {
        self.fetch(&endpoints::offers(adv_hash)).await
    }

    pub async fn get_advertiser_campaigns(&self, adv_hash: &str) -> Result<Vec<Campaign>, ApiError> {
        self.fetch(&endpoints::campaigns(adv_hash)).await
    }

    pub async fn get_billing(
        &self,
        adv_hash: &str,
        day_from: NaiveDate,
        day_to: NaiveDate,
    ) -> Result<Billing, ApiError> {
        self.fetch(&endpoints::billing(adv_hash, day_from, day_to)).await
    }

    pub async fn get_rtb_creatives(
        &self,
        adv_hash: &str,
        subcampaigns: Option<&Subcampaigns>,
        active_only: Option<bool>,
    ) -> Result<Vec<Creative>, ApiError> {
        self.fetch(&endpoints::rtb_creatives(adv_hash, subcampaigns, active_only))
            .await
    }

    pub fn get_rtb_conversions(
        &self,
        adv_hash: &str,
        day_from: NaiveDate,
        day_to: NaiveDate,
        count_convention: CountConvention,
    ) -> BoxStream<'_, Result<Conversion, ApiError>> {
        cursor_stream(
            self,
            endpoints::rtb_conversions(adv_hash, day_from, day_to, count_convention),
        )
    }

    pub async fn get_rtb_stats(
        &self,
        adv_hash: &str,
        query: &StatsQuery,
    ) -> Result<Vec<Stats>, ApiError> {
        self.fetch(&endpoints::rtb_stats(adv_hash, query)).await
    }

    pub async fn get_summary_stats(
        &self,
        adv_hash: &str,
        query: &StatsQuery,
    ) -> Result<Vec<Stats>, ApiError> {
        self.fetch(&endpoints::summary_stats(adv_hash, query)).await
    }
}
