use std::time::Duration;

use async_trait::async_trait;
use auction_common::{
    wire::{BidRequest, BidResponse, EndResponse, ResultResponse, BID_PATH, END_PATH, RESULT_PATH},
    Bid, BidOutcome, EndStatus,
};
use auction_core::{network::http::map_reqwest_error, AuctionEndpoint, TransportError};
use serde::de::DeserializeOwned;

/// A remote node reached through its HTTP API.
#[derive(Clone, Debug)]
pub struct HttpEndpoint {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpEndpoint {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Http(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(HttpEndpoint { base_url, client, timeout })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn read<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = request
            .send()
            .await
            .map_err(|e| map_reqwest_error(&self.base_url, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Rejected {
                peer: self.base_url.clone(),
                status: status.as_u16(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| TransportError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl AuctionEndpoint for HttpEndpoint {
    fn name(&self) -> String {
        self.base_url.clone()
    }

    async fn bid(&self, bid: Bid) -> Result<BidOutcome, TransportError> {
        let body = BidRequest {
            bidder: bid.bidder().to_string(),
            amount: bid.amount(),
        };
        let url = format!("{}{}", self.base_url, BID_PATH);
        let response: BidResponse = self.read(self.client.post(url).json(&body)).await?;

        response.to_outcome().ok_or_else(|| {
            TransportError::Serialization(format!(
                "unrecognised bid outcome '{}' (reason {:?})",
                response.outcome, response.reason
            ))
        })
    }

    async fn result(&self) -> Result<Option<Bid>, TransportError> {
        let url = format!("{}{}", self.base_url, RESULT_PATH);
        let response: ResultResponse = self.read(self.client.get(url)).await?;
        Ok(response.into_bid())
    }

    async fn end(&self) -> Result<EndStatus, TransportError> {
        let url = format!("{}{}", self.base_url, END_PATH);
        let response: EndResponse = self.read(self.client.post(url)).await?;
        Ok(response.status)
    }
}
