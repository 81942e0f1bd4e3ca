use anyhow::{anyhow, bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::util::traits::NanoleafApi;

const STATE_PATH: &str = "/state";
const ON_PATH: &str = "/state/on";
const BRIGHTNESS_PATH: &str = "/state/brightness";

/// Brightness response when getting brightness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BrightnessResponse {
    /// Range inside `min..=max`, normally 0..100.
    pub value: i32,
    #[serde(default)]
    pub min: i32,
    #[serde(default = "default_max_brightness")]
    pub max: i32,
}

fn default_max_brightness() -> i32 {
    100
}

/// Helpers for the `/state` endpoints: power and global brightness.
pub struct StateClient<'a, A: NanoleafApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: NanoleafApi + ?Sized> StateClient<'a, A> {
    pub fn new(api: &'a A) -> Self {
        StateClient { api }
    }

    pub async fn is_on(&self) -> Result<bool> {
        let data = self.api.get_json(ON_PATH).await?;
        data.get("value")
            .and_then(Value::as_bool)
            .ok_or_else(|| anyhow!("Unexpected power state response: {}", data))
    }

    pub async fn turn_on(&self) -> Result<()> {
        self.set_power(true).await
    }

    pub async fn turn_off(&self) -> Result<()> {
        self.set_power(false).await
    }

    async fn set_power(&self, on: bool) -> Result<()> {
        info!("Turning device {}", if on { "on" } else { "off" });
        self.api
            .put_json(STATE_PATH, &json!({ "on": { "value": on } }))
            .await
            .context("Failed to set power state")?;
        Ok(())
    }

    pub async fn get_brightness(&self) -> Result<BrightnessResponse> {
        let data = self.api.get_json(BRIGHTNESS_PATH).await?;
        serde_json::from_value(data).context("Failed to deserialize brightness response")
    }

    /// Sets the global brightness.
    ///
    /// # Arguments
    /// - `brightness`: Range is 0..100.
    /// - `duration_secs`: optional fade time.
    pub async fn set_brightness(&self, brightness: u8, duration_secs: Option<u32>) -> Result<()> {
        if brightness > 100 {
            bail!("brightness must be between 0 and 100, got {}", brightness);
        }
        let body = match duration_secs {
            Some(duration) => json!({ "brightness": { "value": brightness, "duration": duration } }),
            None => json!({ "brightness": { "value": brightness } }),
        };
        self.api
            .put_json(STATE_PATH, &body)
            .await
            .context("Failed to set brightness")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::mock::MockApi;

    #[tokio::test]
    async fn test_power() {
        let api = MockApi::new().with_get(ON_PATH, json!({ "value": true }));
        let state = StateClient::new(&api);
        assert!(state.is_on().await.unwrap());

        state.turn_off().await.unwrap();
        state.turn_on().await.unwrap();
        assert_eq!(
            api.puts(),
            vec![
                ("/state".to_string(), json!({ "on": { "value": false } })),
                ("/state".to_string(), json!({ "on": { "value": true } })),
            ]
        );
    }

    #[tokio::test]
    async fn test_get_brightness() {
        let api = MockApi::new().with_get(BRIGHTNESS_PATH, json!({ "value": 42, "max": 100, "min": 0 }));
        let brightness = StateClient::new(&api).get_brightness().await.unwrap();
        assert_eq!(
            brightness,
            BrightnessResponse {
                value: 42,
                min: 0,
                max: 100
            }
        );
    }

    #[tokio::test]
    async fn test_set_brightness() {
        let api = MockApi::new();
        let state = StateClient::new(&api);
        state.set_brightness(70, None).await.unwrap();
        state.set_brightness(10, Some(5)).await.unwrap();
        assert!(state.set_brightness(101, None).await.is_err());

        let bodies: Vec<Value> = api.puts().into_iter().map(|(_, body)| body).collect();
        assert_eq!(
            bodies,
            vec![
                json!({ "brightness": { "value": 70 } }),
                json!({ "brightness": { "value": 10, "duration": 5 } }),
            ]
        );
    }
}
