use std::net::IpAddr;
use std::time::Duration;

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use derivative::Derivative;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::util::traits::NanoleafApi;

/// Port the Nanoleaf OpenAPI listens on.
pub const DEFAULT_PORT: u16 = 16021;

/// Per-request timeout of the HTTP client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ControlInterface {
    pub host: String,
    pub port: u16,
    pub(crate) auth_token: String,
    client: Client,
    device_info: DeviceInfo,
}

impl ControlInterface {
    /// Connects to a controller and fetches its device information.
    ///
    /// Fails early when the host is unreachable or the token is rejected.
    pub async fn new(host: &str, port: u16, auth_token: &str) -> anyhow::Result<Self> {
        Self::with_timeout(host, port, auth_token, DEFAULT_TIMEOUT).await
    }

    pub async fn with_timeout(
        host: &str,
        port: u16,
        auth_token: &str,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let base_url = ControlInterface::make_base_url(host, port, auth_token);

        let device_info = ControlInterface::fetch_device_info(&client, &base_url).await?;

        Ok(ControlInterface {
            host: host.to_string(),
            port,
            auth_token: auth_token.to_string(),
            client,
            device_info,
        })
    }

    /// `http://<host>:<port>/api/v1/<token>`, bracketing IPv6 literals.
    pub fn base_url(&self) -> String {
        ControlInterface::make_base_url(&self.host, self.port, &self.auth_token)
    }

    fn make_base_url(host: &str, port: u16, auth_token: &str) -> String {
        let host = match host.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => format!("[{}]", v6),
            _ => host.to_string(),
        };
        format!("http://{}:{}/api/v1/{}", host, port, auth_token)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    pub fn get_device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    /// Re-reads the device information, e.g. after the layout changed.
    pub async fn refresh_device_info(&mut self) -> anyhow::Result<&DeviceInfo> {
        self.device_info = ControlInterface::fetch_device_info(&self.client, &self.base_url()).await?;
        Ok(&self.device_info)
    }

    async fn fetch_device_info(client: &Client, base_url: &str) -> anyhow::Result<DeviceInfo> {
        let url = format!("{}/", base_url);
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Failed to fetch device info: {}", e))?;

        match response.status() {
            StatusCode::OK => {
                let response = response.text().await?;
                let device_info: DeviceInfo = serde_json::from_str(&response)
                    .context("Failed to deserialize device info")?;
                Ok(device_info)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(anyhow!(
                "Device rejected the auth token with status: {}",
                response.status()
            )),
            _ => Err(anyhow!(
                "Failed to fetch device info with status: {}",
                response.status()
            )),
        }
    }

    /// Decodes a response body, treating an empty body as `null`.
    async fn read_json(response: reqwest::Response) -> anyhow::Result<Value> {
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).context("Failed to deserialize response")
    }
}

#[async_trait]
impl NanoleafApi for ControlInterface {
    async fn get_json(&self, path: &str) -> anyhow::Result<Value> {
        debug!("GET {}", path);
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .with_context(|| format!("Failed to GET {}", path))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "GET {} failed with status: {}",
                path,
                response.status()
            ));
        }
        ControlInterface::read_json(response).await
    }

    async fn put_json(&self, path: &str, body: &Value) -> anyhow::Result<Value> {
        debug!("PUT {} {}", path, body);
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .with_context(|| format!("Failed to PUT {}", path))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "PUT {} failed with status: {}",
                path,
                response.status()
            ));
        }
        ControlInterface::read_json(response).await
    }
}

/// A `{"value": ..}` wrapper, as used throughout the device state.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct StateValue<T> {
    pub value: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceState {
    pub on: StateValue<bool>,
    pub brightness: StateValue<i32>,
    pub hue: StateValue<i32>,
    pub sat: StateValue<i32>,
    pub ct: StateValue<i32>,
    pub color_mode: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EffectsInfo {
    pub select: String,
    pub effects_list: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutInfo {
    pub num_panels: usize,
    pub side_length: usize,
    /// Kept raw; [`crate::layout::extract_positions`] reads it leniently.
    pub position_data: Value,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct PanelLayoutInfo {
    pub global_orientation: StateValue<i32>,
    pub layout: LayoutInfo,
}

/// The device information response of `GET /`.
///
/// Every field is optional on the wire; models differ in what they report.
#[derive(Derivative)]
#[derivative(PartialEq)]
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DeviceInfo {
    pub name: String,
    pub serial_no: String,
    pub manufacturer: String,
    pub firmware_version: String,
    pub hardware_version: String,
    pub model: String,

    // Power, brightness and the selected effect change while the device stays the same.
    #[derivative(PartialEq = "ignore")]
    pub state: DeviceState,
    #[derivative(PartialEq = "ignore")]
    pub effects: EffectsInfo,

    pub panel_layout: PanelLayoutInfo,

    /// Raw `/rhythm` object, absent on devices without a rhythm module.
    #[derivative(PartialEq = "ignore")]
    pub rhythm: Option<Value>,
}
