//! Report models and the enums accepted as query parameters.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum!(
    #[derive(Default)]
    CountConvention {
        #[default]
        AttributedPostClick => "ATTRIBUTED",
        AttributedPostView => "POST_VIEW",
        AllPostClick => "ALL_POST_CLICK",
        AllConversions => "ALL_CONVERSIONS",
    }
);

wire_enum!(UserSegment {
    New => "NEW",
    Visitors => "VISITORS",
    Shoppers => "SHOPPERS",
    Buyers => "BUYERS",
});

wire_enum!(DeviceType {
    Pc => "PC",
    Mobile => "MOBILE",
    Phone => "PHONE",
    Tablet => "TABLET",
    Tv => "TV",
    GameConsole => "GAME_CONSOLE",
    Other => "OTHER",
    Unknown => "UNKNOWN",
});

wire_enum!(StatsGroupBy {
    Hour => "hour",
    Day => "day",
    Week => "week",
    Month => "month",
    Year => "year",
    Advertiser => "advertiser",
    Subcampaign => "subcampaign",
    UserSegment => "userSegment",
    DeviceType => "deviceType",
    Creative => "creative",
    Category => "category",
    Country => "country",
    Placement => "placement",
});

wire_enum!(StatsMetric {
    CampaignCost => "campaignCost",
    ImpsCount => "impsCount",
    Ecpm => "ecpm",
    ClicksCount => "clicksCount",
    Ecpc => "ecpc",
    Ctr => "ctr",
    ConversionsCount => "conversionsCount",
    Ecpa => "ecpa",
    Cr => "cr",
    ConversionsValue => "conversionsValue",
    Roas => "roas",
    Ecps => "ecps",
    VideoCompleteViews => "videoCompleteViews",
    Ecpv => "ecpv",
    Vcr => "vcr",
    AudioCompleteListens => "audioCompleteListens",
    Ecpl => "ecpl",
    Acr => "acr",
    ViewabilityMeasurability => "viewabilityMeasurability",
    ViewabilityViewability => "viewabilityViewability",
    Evcpm => "evcpm",
    SspViewability => "sspViewability",
    VisitsCount => "visitsCount",
    Cpvisit => "cpvisit",
    UserFrequency => "userFrequency",
    UserReach => "userReach",
});

wire_enum!(SubcampaignsFilter {
    Any => "ANY",
    Active => "ACTIVE",
});

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub hash_id: String,
    pub login: String,
    pub email: String,
    pub is_client_user: bool,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advertiser {
    pub hash: String,
    pub status: String,
    pub name: String,
    pub currency: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub properties: HashMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub hash: String,
    pub name: String,
    pub creative_ids: Vec<i64>,
    pub status: String,
    pub updated_at: Option<DateTime<Utc>>,
    pub rate_card_id: String,
    pub is_editable: bool,
    #[serde(default)]
    pub advertiser_limits: Option<HashMap<String, Option<i64>>>,
}

/// Served with snake_case keys, unlike the other models.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct InvoiceData {
    pub vat_number: String,
    pub company_name: String,
    pub street1: String,
    #[serde(default)]
    pub street2: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: String,
    pub identifier: String,
    pub name: String,
    pub active_offers_number: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub width: String,
    pub height: String,
    pub url: String,
    pub added: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub url: String,
    pub full_name: String,
    pub identifier: String,
    pub id: String,
    pub images: Vec<Image>,
    pub name: String,
    pub price: f64,
    pub category_name: String,
    pub custom_properties: HashMap<String, String>,
    pub updated_at: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub day: NaiveDate,
    pub operation: String,
    pub position: i64,
    pub credit: f64,
    pub debit: f64,
    pub balance: f64,
    pub record_number: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    pub initial_balance: f64,
    pub bills: Vec<Bill>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreativePreview {
    pub width: i64,
    pub height: i64,
    pub offers_number: i64,
    pub preview_url: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Creative {
    pub hash: String,
    pub previews: Vec<CreativePreview>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub conversion_identifier: String,
    pub conversion_hash: String,
    pub conversion_class: Option<String>,
    pub conversion_value: f64,
    pub commission_value: f64,
    pub cookie_hash: Option<String>,
    pub conversion_time: DateTime<Utc>,
    pub last_click_time: Option<DateTime<Utc>>,
    pub last_impression_time: Option<DateTime<Utc>>,
}

/// One row of a stats report; only the requested dimensions and metrics are set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub hour: Option<i64>,
    pub day: Option<NaiveDate>,
    pub week: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub advertiser: Option<String>,
    pub subcampaign: Option<String>,
    pub subcampaign_hash: Option<String>,
    pub user_segment: Option<String>,
    pub device_type: Option<String>,
    pub creative: Option<String>,
    pub category: Option<String>,
    pub category_name: Option<String>,
    pub country: Option<String>,
    pub placement: Option<String>,

    pub campaign_cost: Option<f64>,
    pub imps_count: Option<f64>,
    pub ecpm: Option<f64>,
    pub clicks_count: Option<f64>,
    pub ecpc: Option<f64>,
    pub ctr: Option<f64>,
    pub conversions_count: Option<f64>,
    pub ecpa: Option<f64>,
    pub cr: Option<f64>,
    pub conversions_value: Option<f64>,
    pub roas: Option<f64>,
    pub ecps: Option<f64>,
    pub video_complete_views: Option<f64>,
    pub ecpv: Option<f64>,
    pub vcr: Option<f64>,
    pub audio_complete_listens: Option<f64>,
    pub ecpl: Option<f64>,
    pub acr: Option<f64>,
    pub viewability_measurability: Option<f64>,
    pub viewability_viewability: Option<f64>,
    pub evcpm: Option<f64>,
    pub ssp_viewability: Option<f64>,
    pub visits_count: Option<f64>,
    pub cpvisit: Option<f64>,
    pub user_frequency: Option<f64>,
    pub user_reach: Option<f64>,
}
