// REST backend repository implementation
use crate::application::alarm_repository::AlarmRepository;
use crate::domain::alarm::{Alarm, Reading};
use crate::infrastructure::config::{expand_template, BackendSettings, EndpointSettings};
use crate::infrastructure::wire::{
    alarm_from_record, decode_each, reading_from_record, AlarmRecord, ReadingRecord,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct HttpAlarmRepository {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
    endpoints: EndpointSettings,
}

impl HttpAlarmRepository {
    pub fn new(settings: &BackendSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
            endpoints: settings.endpoints.clone(),
        })
    }

    fn build_url(&self, template: &str, vars: &HashMap<&str, String>) -> String {
        format!("{}{}", self.base_url, expand_template(template, vars))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<reqwest::Response> {
        let response = builder
            .send()
            .await
            .context("Failed to send request to backend")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Backend request failed with status {}: {}", status, body);
        }

        Ok(response)
    }

    async fn fetch_list(&self, url: &str) -> Result<Vec<serde_json::Value>> {
        tracing::debug!(%url, "Fetching from backend");
        let response = self.execute(self.request(Method::GET, url)).await?;
        response
            .json::<Vec<serde_json::Value>>()
            .await
            .context("Failed to parse backend response")
    }
}

#[async_trait]
impl AlarmRepository for HttpAlarmRepository {
    async fn list_alarms(&self, limit: usize) -> Result<Vec<Alarm>> {
        let vars = HashMap::from([("limit", limit.to_string())]);
        let url = self.build_url(&self.endpoints.alarms, &vars);

        let records: Vec<AlarmRecord> = decode_each(self.fetch_list(&url).await?, "alarm");
        Ok(records.into_iter().map(alarm_from_record).collect())
    }

    async fn list_readings(&self, device_id: &str, limit: usize) -> Result<Vec<Reading>> {
        let vars = HashMap::from([
            ("device_id", device_id.to_string()),
            ("limit", limit.to_string()),
        ]);
        let url = self.build_url(&self.endpoints.readings, &vars);

        let records: Vec<ReadingRecord> = decode_each(self.fetch_list(&url).await?, "reading");
        Ok(records
            .into_iter()
            .map(|record| reading_from_record(device_id, record))
            .collect())
    }

    async fn acknowledge(&self, alarm_id: i64) -> Result<()> {
        let vars = HashMap::from([("alarm_id", alarm_id.to_string())]);
        let url = self.build_url(&self.endpoints.acknowledge, &vars);

        self.execute(self.request(Method::PUT, &url)).await?;
        Ok(())
    }
}
