//! Parameter normalisation and GAQL query construction.

use crate::error::GadsError;
use chrono::{Days, NaiveDate};
use std::fmt;

pub const DEFAULT_DAYS: u32 = 30;
pub const MAX_DAYS: u32 = 365;
pub const DEFAULT_LIMIT: u32 = 100;
pub const MAX_LIMIT: u32 = 1000;

/// Ten-digit customer id without dashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerId(String);

impl CustomerId {
    pub fn parse(raw: &str) -> Result<Self, GadsError> {
        let digits: String = raw.chars().filter(|c| *c != '-' && !c.is_whitespace()).collect();
        if digits.is_empty() || digits.len() > 10 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(GadsError::InvalidParams(format!(
                "customer_id must be up to 10 digits (dashes allowed), got {raw:?}"
            )));
        }
        Ok(Self(format!("{digits:0>10}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn parse_campaign_id(raw: &str) -> Result<String, GadsError> {
    let id = raw.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return Err(GadsError::InvalidParams(format!(
            "campaign_id must be numeric, got {raw:?}"
        )));
    }
    Ok(id.to_string())
}

pub fn check_days(days: u32) -> Result<u32, GadsError> {
    if !(1..=MAX_DAYS).contains(&days) {
        return Err(GadsError::InvalidParams(format!(
            "days must be between 1 and {MAX_DAYS}, got {days}"
        )));
    }
    Ok(days)
}

pub fn check_limit(limit: u32) -> Result<u32, GadsError> {
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(GadsError::InvalidParams(format!(
            "limit must be between 1 and {MAX_LIMIT}, got {limit}"
        )));
    }
    Ok(limit)
}

/// Lookback window rendered as a `segments.date` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateWindow {
    /// One of the predefined GAQL ranges (`LAST_7_DAYS`, ...).
    During(u32),
    /// Explicit inclusive range ending yesterday.
    Between(NaiveDate, NaiveDate),
}

impl DateWindow {
    pub fn last_days(days: u32, today: NaiveDate) -> Self {
        match days {
            7 | 14 | 30 => DateWindow::During(days),
            _ => {
                let end = today.checked_sub_days(Days::new(1)).unwrap_or(today);
                let start = today
                    .checked_sub_days(Days::new(u64::from(days)))
                    .unwrap_or(end);
                DateWindow::Between(start, end)
            }
        }
    }

    pub fn predicate(&self) -> String {
        match self {
            DateWindow::During(n) => format!("segments.date DURING LAST_{n}_DAYS"),
            DateWindow::Between(start, end) => format!(
                "segments.date BETWEEN '{}' AND '{}'",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            ),
        }
    }
}

pub fn customer_query() -> String {
    "SELECT customer.id, customer.descriptive_name, customer.currency_code, \
     customer.time_zone, customer.manager FROM customer LIMIT 1"
        .to_string()
}

pub fn customer_client_query() -> String {
    "SELECT customer_client.id, customer_client.descriptive_name, \
     customer_client.currency_code, customer_client.time_zone, customer_client.manager \
     FROM customer_client WHERE customer_client.level <= 1"
        .to_string()
}

pub fn account_summary_query(window: &DateWindow) -> String {
    format!(
        "SELECT customer.id, customer.descriptive_name, customer.currency_code, \
         metrics.impressions, metrics.clicks, metrics.cost_micros, \
         metrics.conversions, metrics.conversions_value \
         FROM customer WHERE {}",
        window.predicate()
    )
}

pub fn campaigns_query(window: &DateWindow, limit: u32) -> String {
    format!(
        "SELECT campaign.id, campaign.name, campaign.status, \
         metrics.impressions, metrics.clicks, metrics.cost_micros, metrics.conversions \
         FROM campaign WHERE {} \
         ORDER BY metrics.cost_micros DESC LIMIT {limit}",
        window.predicate()
    )
}

pub fn keywords_query(window: &DateWindow, campaign_id: Option<&str>, limit: u32) -> String {
    let campaign_filter = campaign_id
        .map(|id| format!(" AND campaign.id = {id}"))
        .unwrap_or_default();
    format!(
        "SELECT campaign.id, campaign.name, ad_group.id, ad_group.name, \
         ad_group_criterion.keyword.text, ad_group_criterion.keyword.match_type, \
         metrics.impressions, metrics.clicks, metrics.cost_micros, metrics.conversions \
         FROM keyword_view WHERE {}{campaign_filter} \
         ORDER BY metrics.cost_micros DESC LIMIT {limit}",
        window.predicate()
    )
}
