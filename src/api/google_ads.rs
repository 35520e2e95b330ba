use crate::error::{GadsError, GoogleApiError};
use crate::types::ads::{ListAccessibleCustomersResponse, SearchResponse};
use reqwest::{RequestBuilder, Response};
use serde_json::json;
use tracing::{debug, error};

/// Per-call credentials and routing for the Google Ads REST API.
#[derive(Debug, Clone, Copy)]
pub struct AdsAuth<'a> {
    /// `{base}/{version}`, e.g. `https://googleads.googleapis.com/v19`.
    pub api_root: &'a str,
    pub access_token: &'a str,
    pub developer_token: &'a str,
    pub login_customer_id: Option<&'a str>,
}

impl AdsAuth<'_> {
    fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        let req = req
            .bearer_auth(self.access_token)
            .header("developer-token", self.developer_token)
            .header("Accept", "application/json");
        match self.login_customer_id {
            Some(id) => req.header("login-customer-id", id),
            None => req,
        }
    }
}

/// Stateless Google Ads REST calls.
pub struct GoogleAdsApi;

impl GoogleAdsApi {
    pub async fn list_accessible_customers(
        client: &reqwest::Client,
        auth: AdsAuth<'_>,
    ) -> Result<ListAccessibleCustomersResponse, GadsError> {
        let url = format!("{}/customers:listAccessibleCustomers", auth.api_root);
        let resp = auth.apply(client.get(url)).send().await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }

    /// Run one GAQL query and return the first result page.
    pub async fn search(
        client: &reqwest::Client,
        auth: AdsAuth<'_>,
        customer_id: &str,
        query: &str,
    ) -> Result<SearchResponse, GadsError> {
        let url = format!("{}/customers/{customer_id}/googleAds:search", auth.api_root);
        debug!(customer_id, query, "googleAds:search");
        let resp = auth
            .apply(client.post(url))
            .json(&json!({ "query": query }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }
}

/// Pass upstream failures through: the Google error envelope when it parses,
/// the bare status otherwise.
async fn check_status(resp: Response) -> Result<Response, GadsError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.bytes().await.unwrap_or_default();
    match serde_json::from_slice::<GoogleApiError>(&body) {
        Ok(api_err) => {
            error!(
                status = %status,
                google_status = %api_err.error.status,
                failure = api_err.ads_failure_code().as_deref().unwrap_or("-"),
                "Google Ads API error: {}",
                api_err.error.message
            );
            Err(GadsError::GoogleAdsServerError(api_err))
        }
        Err(_) => {
            error!(status = %status, "Google Ads API returned a non-JSON error");
            Err(GadsError::UpstreamStatus(status))
        }
    }
}
