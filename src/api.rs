use std::error::Error as _;

use log::{debug, error};
use reqwest::{IntoUrl, StatusCode, Url};

use crate::config::FetchConfig;

pub struct ListingClient {
    client: reqwest::Client,
    base_url: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error while fetching the page")]
    Network(#[from] reqwest::Error),
    #[error("Server returned {0}")]
    Status(StatusCode),
}

impl FetchError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::Network(e) => e.status(),
            FetchError::Status(status) => Some(*status),
        }
    }

    /// One line with the status code (if any) and every underlying reason.
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut source = self.source();
        while let Some(reason) = source {
            message.push_str(": ");
            message.push_str(&reason.to_string());
            source = reason.source();
        }
        message
    }
}

impl ListingClient {
    pub fn new(config: &FetchConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// URL of the listing slice starting at `offset`.
    pub fn page_url(&self, offset: u32) -> Url {
        let mut url = self.base_url.clone();
        let retained = url
            .query_pairs()
            .filter(|(key, _)| key != "start")
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect::<Vec<_>>();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(retained)
            .append_pair("start", &offset.to_string());
        url
    }

    pub async fn try_fetch(&self, url: impl IntoUrl) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("{} returned {status}", response.url());
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        Ok(response.text().await?)
    }

    /// Fetches the page, logging and swallowing any failure.
    /// Returns an empty string if the page could not be retrieved.
    pub async fn fetch(&self, url: impl IntoUrl) -> String {
        match self.try_fetch(url).await {
            Ok(body) => body,
            Err(e) => {
                error!("{}", e.report());
                String::new()
            }
        }
    }
}
