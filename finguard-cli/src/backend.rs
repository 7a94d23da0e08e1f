//! Thin consumer of the FinGuard REST backend.
//!
//! JSON bodies, bearer-token auth, non-2xx statuses surface as errors.
//! Nothing is retried; callers fall back to cached data.

use anyhow::{bail, Context, Result};
use finguard_core::Transaction;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub struct BackendClient {
    base_url: String,
    client: reqwest::Client,
}

/// The backend wraps lists either bare or as `{ "transactions": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum TransactionList {
    Bare(Vec<Transaction>),
    Wrapped { transactions: Vec<Transaction> },
}

#[derive(Serialize)]
struct CategoryUpdate<'a> {
    category: &'a str,
}

impl BackendClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {token}"))?);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("build http client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET /api/transactions
    pub async fn fetch_transactions(&self) -> Result<Vec<Transaction>> {
        let url = self.url("/api/transactions");
        debug!(%url, "fetching transactions");
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .context("transactions request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("backend error: {status} {txt}");
        }

        let list: TransactionList = resp.json().await.context("parse transactions response")?;
        Ok(match list {
            TransactionList::Bare(v) => v,
            TransactionList::Wrapped { transactions } => transactions,
        })
    }

    /// PUT /api/transactions/{id} with the new category
    pub async fn update_category(&self, id: &str, category: &str) -> Result<()> {
        let url = self.url(&format!("/api/transactions/{id}"));
        let resp = self
            .client
            .put(&url)
            .json(&CategoryUpdate { category })
            .send()
            .await
            .context("category update request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("backend error updating {id}: {status} {txt}");
        }
        Ok(())
    }
}
