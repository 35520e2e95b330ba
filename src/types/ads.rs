//! Google Ads REST wire types and the plain records returned by tools.
//!
//! The REST API encodes int64 as JSON strings and omits zero-valued fields,
//! so every numeric field is defaulted and goes through [`int64`].

use serde::{Deserialize, Serialize};

pub mod int64 {
    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Int(i64),
        Float(f64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Str(s) => s.parse::<i64>().map_err(D::Error::custom),
            Raw::Int(i) => Ok(i),
            Raw::Float(f) => Ok(f as i64),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAccessibleCustomersResponse {
    #[serde(default)]
    pub resource_names: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchRow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRow {
    #[serde(default)]
    pub customer: Option<CustomerRow>,
    #[serde(default)]
    pub customer_client: Option<CustomerClientRow>,
    #[serde(default)]
    pub campaign: Option<CampaignRow>,
    #[serde(default)]
    pub ad_group: Option<AdGroupRow>,
    #[serde(default)]
    pub ad_group_criterion: Option<AdGroupCriterionRow>,
    #[serde(default)]
    pub metrics: MetricsRow,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRow {
    #[serde(default, with = "int64")]
    pub id: i64,
    #[serde(default)]
    pub descriptive_name: String,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub time_zone: String,
    #[serde(default)]
    pub manager: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerClientRow {
    #[serde(default, with = "int64")]
    pub id: i64,
    #[serde(default)]
    pub descriptive_name: String,
    #[serde(default)]
    pub currency_code: String,
    #[serde(default)]
    pub time_zone: String,
    #[serde(default)]
    pub manager: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignRow {
    #[serde(default, with = "int64")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupRow {
    #[serde(default, with = "int64")]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdGroupCriterionRow {
    #[serde(default)]
    pub keyword: KeywordInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordInfo {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub match_type: String,
}

#[derive(Debug, Default, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRow {
    #[serde(default, with = "int64")]
    pub impressions: i64,
    #[serde(default, with = "int64")]
    pub clicks: i64,
    #[serde(default, with = "int64")]
    pub cost_micros: i64,
    #[serde(default)]
    pub conversions: f64,
    #[serde(default)]
    pub conversions_value: f64,
}

impl MetricsRow {
    pub fn cost(&self) -> f64 {
        micros_to_units(self.cost_micros)
    }

    pub fn ctr(&self) -> f64 {
        if self.impressions == 0 {
            return 0.0;
        }
        self.clicks as f64 / self.impressions as f64 * 100.0
    }

    pub fn cpc(&self) -> f64 {
        if self.clicks == 0 {
            return 0.0;
        }
        self.cost() / self.clicks as f64
    }

    pub fn accumulate(&mut self, other: &MetricsRow) {
        self.impressions += other.impressions;
        self.clicks += other.clicks;
        self.cost_micros += other.cost_micros;
        self.conversions += other.conversions;
        self.conversions_value += other.conversions_value;
    }
}

pub fn micros_to_units(micros: i64) -> f64 {
    micros as f64 / 1_000_000.0
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub currency: String,
    pub timezone: String,
    pub is_manager: bool,
}

impl Account {
    pub fn new(id: i64, name: String, currency: String, timezone: String, is_manager: bool) -> Self {
        let id = id.to_string();
        let name = if name.trim().is_empty() {
            id.clone()
        } else {
            name
        };
        Self {
            id,
            name,
            currency,
            timezone,
            is_manager,
        }
    }
}

impl From<CustomerRow> for Account {
    fn from(c: CustomerRow) -> Self {
        Account::new(c.id, c.descriptive_name, c.currency_code, c.time_zone, c.manager)
    }
}

impl From<CustomerClientRow> for Account {
    fn from(c: CustomerClientRow) -> Self {
        Account::new(c.id, c.descriptive_name, c.currency_code, c.time_zone, c.manager)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AccountSummary {
    pub account_id: String,
    pub account_name: String,
    pub currency: String,
    pub period_days: u32,
    pub impressions: i64,
    pub clicks: i64,
    pub ctr: f64,
    pub cost: f64,
    pub cpc: f64,
    pub conversions: f64,
    pub conversion_value: f64,
}

impl AccountSummary {
    pub fn new(customer: &CustomerRow, totals: &MetricsRow, period_days: u32) -> Self {
        Self {
            account_id: customer.id.to_string(),
            account_name: customer.descriptive_name.clone(),
            currency: customer.currency_code.clone(),
            period_days,
            impressions: totals.impressions,
            clicks: totals.clicks,
            ctr: round2(totals.ctr()),
            cost: round2(totals.cost()),
            cpc: round2(totals.cpc()),
            conversions: round2(totals.conversions),
            conversion_value: round2(totals.conversions_value),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub status: String,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: f64,
    pub conversions: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub account_id: String,
}

impl Campaign {
    pub fn from_row(row: SearchRow, account_id: &str) -> Self {
        let campaign = row.campaign.unwrap_or_default();
        let m = row.metrics;
        Self {
            id: campaign.id.to_string(),
            name: campaign.name,
            status: campaign.status,
            impressions: m.impressions,
            clicks: m.clicks,
            cost: m.cost(),
            conversions: m.conversions,
            ctr: m.ctr(),
            cpc: m.cpc(),
            account_id: account_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Keyword {
    pub text: String,
    pub match_type: String,
    pub campaign_id: String,
    pub campaign_name: String,
    pub ad_group_id: String,
    pub ad_group_name: String,
    pub impressions: i64,
    pub clicks: i64,
    pub cost: f64,
    pub conversions: f64,
    pub ctr: f64,
    pub cpc: f64,
}

impl From<SearchRow> for Keyword {
    fn from(row: SearchRow) -> Self {
        let campaign = row.campaign.unwrap_or_default();
        let ad_group = row.ad_group.unwrap_or_default();
        let keyword = row.ad_group_criterion.unwrap_or_default().keyword;
        let m = row.metrics;
        Self {
            text: keyword.text,
            match_type: keyword.match_type,
            campaign_id: campaign.id.to_string(),
            campaign_name: campaign.name,
            ad_group_id: ad_group.id.to_string(),
            ad_group_name: ad_group.name,
            impressions: m.impressions,
            clicks: m.clicks,
            cost: m.cost(),
            conversions: m.conversions,
            ctr: m.ctr(),
            cpc: m.cpc(),
        }
    }
}
