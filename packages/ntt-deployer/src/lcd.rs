//! LCD (REST) client for smart queries and block time

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use chrono::DateTime;
use eyre::{eyre, Result, WrapErr};
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::ledger::ContractQuerier;

pub struct LcdClient {
    lcd_url: String,
    client: Client,
}

impl LcdClient {
    pub fn new(lcd_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .wrap_err("Failed to create HTTP client")?;

        Ok(Self {
            lcd_url: lcd_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn smart_query_url(&self, contract: &str, msg: &Value) -> Result<String> {
        let query_b64 =
            base64::engine::general_purpose::STANDARD.encode(serde_json::to_string(msg)?);
        Ok(format!(
            "{}/cosmwasm/wasm/v1/contract/{}/smart/{}",
            self.lcd_url, contract, query_b64
        ))
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .wrap_err_with(|| format!("LCD request failed: {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(eyre!("LCD returned {}: {}", status, body));
        }

        response
            .json()
            .await
            .wrap_err("LCD returned a non-JSON body")
    }
}

#[async_trait(?Send)]
impl ContractQuerier for LcdClient {
    async fn query_smart(&self, contract: &str, msg: &Value) -> Result<Value> {
        let url = self.smart_query_url(contract, msg)?;
        debug!(contract, query = %msg, "Smart query");

        let mut response = self.get_json(&url).await?;
        match response.get_mut("data") {
            Some(data) => Ok(data.take()),
            None => Err(eyre!("Smart query response without data: {}", response)),
        }
    }

    async fn block_time(&self) -> Result<u64> {
        let url = format!("{}/cosmos/base/tendermint/v1beta1/blocks/latest", self.lcd_url);
        let response = self.get_json(&url).await?;

        let time = response["block"]["header"]["time"]
            .as_str()
            .ok_or_else(|| eyre!("Invalid latest block response"))?;
        let parsed = DateTime::parse_from_rfc3339(time)
            .wrap_err_with(|| format!("Invalid block time {}", time))?;

        u64::try_from(parsed.timestamp()).map_err(|_| eyre!("Block time before epoch: {}", time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_smart_query_url() {
        let client = LcdClient::new("https://lcd.example.com/").unwrap();
        let url = client
            .smart_query_url("terra1abc", &json!({ "message_sequence": {} }))
            .unwrap();
        assert_eq!(
            url,
            concat!(
                "https://lcd.example.com/cosmwasm/wasm/v1/contract/terra1abc/smart/",
                "eyJtZXNzYWdlX3NlcXVlbmNlIjp7fX0="
            )
        );
    }
}
