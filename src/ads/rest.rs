//! REST client for the Google Ads API

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use super::messages::{
    BudgetMutateRequest, BudgetMutateResponse, BudgetOperation, BudgetUpdate, SearchRequest,
    SearchResponse, SearchResult,
};
use crate::common::errors::{AdjusterError, Result};
use crate::config::types::AdsConfig;

/// Thin client for the Google Ads REST endpoints the adjuster uses
#[derive(Debug, Clone)]
pub struct AdsRestClient {
    /// HTTP client
    client: Client,
    /// Base URL including the API version segment
    base_url: String,
    /// Developer token sent with every request
    developer_token: String,
    /// OAuth access token
    access_token: String,
    /// Manager account id for cross-account access (optional)
    login_customer_id: Option<String>,
}

impl AdsRestClient {
    /// Create a new REST client from configuration
    pub fn new(config: &AdsConfig) -> Result<Self> {
        Self::with_timeout(config, Duration::from_secs(30))
    }

    /// Create a new REST client with a custom request timeout
    pub fn with_timeout(config: &AdsConfig, timeout: Duration) -> Result<Self> {
        Url::parse(&config.endpoint)
            .map_err(|e| AdjusterError::Configuration(format!("invalid ads endpoint: {e}")))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdjusterError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            developer_token: config.developer_token.clone(),
            access_token: config.access_token.clone(),
            login_customer_id: config.login_customer_id.clone(),
        })
    }

    /// Manager account id used for cross-account queries, if configured
    pub fn login_customer_id(&self) -> Option<&str> {
        self.login_customer_id.as_deref()
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .header("developer-token", &self.developer_token);
        if let Some(id) = &self.login_customer_id {
            request = request.header("login-customer-id", id);
        }
        request
    }

    /// Run a search query against one customer, following pagination
    #[instrument(skip(self, query))]
    pub async fn search(&self, customer_id: &str, query: &str) -> Result<Vec<SearchResult>> {
        let url = format!(
            "{}/customers/{}/googleAds:search",
            self.base_url, customer_id
        );
        let mut results = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let request_body = SearchRequest {
                query: query.to_string(),
                page_token: page_token.clone(),
            };
            debug!(customer_id, "posting search request");

            let response = self.post(&url).json(&request_body).send().await?;
            let response = Self::check_status(response).await?;
            let page: SearchResponse = response.json().await?;

            results.extend(page.results);
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(results)
    }

    /// Update the amount of one campaign budget
    #[instrument(skip(self))]
    pub async fn update_budget_amount(
        &self,
        customer_id: &str,
        budget_resource: &str,
        amount_micros: i64,
    ) -> Result<()> {
        let url = format!(
            "{}/customers/{}/campaignBudgets:mutate",
            self.base_url, customer_id
        );
        let request_body = BudgetMutateRequest {
            operations: vec![BudgetOperation {
                update_mask: "amount_micros".to_string(),
                update: BudgetUpdate {
                    resource_name: budget_resource.to_string(),
                    amount_micros: amount_micros.to_string(),
                },
            }],
        };

        let response = self.post(&url).json(&request_body).send().await?;
        let response = Self::check_status(response).await?;
        let body: BudgetMutateResponse = response.json().await?;

        if body.results.is_empty() {
            return Err(AdjusterError::InvalidResponse(
                "mutate returned no results".to_string(),
            ));
        }
        Ok(())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AdjusterError::Authentication(format!(
                "credentials rejected: {body}"
            )));
        }
        Err(AdjusterError::InvalidResponse(format!(
            "server returned status {status}: {body}"
        )))
    }
}
