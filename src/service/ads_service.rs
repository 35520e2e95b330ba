use crate::api::google_ads::{AdsAuth, GoogleAdsApi};
use crate::config::Config;
use crate::error::GadsError;
use crate::service::gaql::{self, CustomerId, DateWindow};
use crate::types::ads::{Account, AccountSummary, Campaign, Keyword};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Reshapes Google Ads search rows into plain records.
#[derive(Clone)]
pub struct AdsService {
    http: reqwest::Client,
    cfg: Arc<Config>,
}

impl AdsService {
    pub fn new(http: reqwest::Client, cfg: Arc<Config>) -> Self {
        Self { http, cfg }
    }

    fn with_auth<'a>(
        &'a self,
        api_root: &'a str,
        access_token: &'a str,
        login: Option<&'a str>,
    ) -> AdsAuth<'a> {
        AdsAuth {
            api_root,
            access_token,
            developer_token: &self.cfg.google_ads_developer_token,
            login_customer_id: login,
        }
    }

    pub async fn list_accounts(&self, access_token: &str) -> Result<Vec<Account>, GadsError> {
        let api_root = self.cfg.ads_api_root();
        let login = self.cfg.login_customer_id();
        let auth = self.with_auth(&api_root, access_token, login.as_deref());

        // A manager account lists its linked clients in one query.
        if let Some(manager) = login.as_deref() {
            let resp =
                GoogleAdsApi::search(&self.http, auth, manager, &gaql::customer_client_query())
                    .await?;
            let accounts: Vec<Account> = resp
                .results
                .into_iter()
                .filter_map(|row| row.customer_client.map(Account::from))
                .collect();
            info!(count = accounts.len(), "listed accounts via manager");
            return Ok(accounts);
        }

        let listed = GoogleAdsApi::list_accessible_customers(&self.http, auth).await?;
        let mut accounts = Vec::with_capacity(listed.resource_names.len());
        for resource_name in &listed.resource_names {
            let Some(customer_id) = resource_name.rsplit('/').next() else {
                continue;
            };
            match GoogleAdsApi::search(&self.http, auth, customer_id, &gaql::customer_query())
                .await
            {
                Ok(resp) => accounts.extend(
                    resp.results
                        .into_iter()
                        .filter_map(|row| row.customer.map(Account::from))
                        .take(1),
                ),
                Err(e) => warn!(customer_id, error = %e, "skipping inaccessible account"),
            }
        }
        info!(count = accounts.len(), "listed accessible accounts");
        Ok(accounts)
    }

    /// `None` when the account returned no rows for the window.
    pub async fn account_summary(
        &self,
        access_token: &str,
        customer_id: &CustomerId,
        days: u32,
    ) -> Result<Option<AccountSummary>, GadsError> {
        let api_root = self.cfg.ads_api_root();
        let login = self.cfg.login_customer_id();
        let auth = self.with_auth(&api_root, access_token, login.as_deref());
        let window = DateWindow::last_days(days, Utc::now().date_naive());

        let resp = GoogleAdsApi::search(
            &self.http,
            auth,
            customer_id.as_str(),
            &gaql::account_summary_query(&window),
        )
        .await?;

        let mut rows = resp.results.into_iter();
        let Some(first) = rows.next() else {
            return Ok(None);
        };
        let customer = first.customer.unwrap_or_default();
        let mut totals = first.metrics;
        for row in rows {
            totals.accumulate(&row.metrics);
        }
        Ok(Some(AccountSummary::new(&customer, &totals, days)))
    }

    pub async fn campaigns(
        &self,
        access_token: &str,
        customer_id: &CustomerId,
        days: u32,
        limit: u32,
    ) -> Result<Vec<Campaign>, GadsError> {
        let api_root = self.cfg.ads_api_root();
        let login = self.cfg.login_customer_id();
        let auth = self.with_auth(&api_root, access_token, login.as_deref());
        let window = DateWindow::last_days(days, Utc::now().date_naive());

        let resp = GoogleAdsApi::search(
            &self.http,
            auth,
            customer_id.as_str(),
            &gaql::campaigns_query(&window, limit),
        )
        .await?;
        Ok(resp
            .results
            .into_iter()
            .take(limit as usize)
            .map(|row| Campaign::from_row(row, customer_id.as_str()))
            .collect())
    }

    pub async fn keywords(
        &self,
        access_token: &str,
        customer_id: &CustomerId,
        campaign_id: Option<&str>,
        days: u32,
        limit: u32,
    ) -> Result<Vec<Keyword>, GadsError> {
        let api_root = self.cfg.ads_api_root();
        let login = self.cfg.login_customer_id();
        let auth = self.with_auth(&api_root, access_token, login.as_deref());
        let window = DateWindow::last_days(days, Utc::now().date_naive());

        let resp = GoogleAdsApi::search(
            &self.http,
            auth,
            customer_id.as_str(),
            &gaql::keywords_query(&window, campaign_id, limit),
        )
        .await?;
        Ok(resp
            .results
            .into_iter()
            .take(limit as usize)
            .map(Keyword::from)
            .collect())
    }
}

