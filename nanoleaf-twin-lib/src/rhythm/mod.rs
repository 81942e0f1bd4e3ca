use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use log::warn;
use serde_json::{json, Map, Value};

use crate::layout::loose_i64;
use crate::util::traits::NanoleafApi;

const RHYTHM_PATH: &str = "/rhythm";

/// Audio source of the rhythm module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RhythmMode {
    Microphone,
    Aux,
}

impl RhythmMode {
    pub fn as_code(&self) -> i64 {
        match self {
            RhythmMode::Microphone => 0,
            RhythmMode::Aux => 1,
        }
    }
}

impl TryFrom<i64> for RhythmMode {
    type Error = anyhow::Error;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RhythmMode::Microphone),
            1 => Ok(RhythmMode::Aux),
            _ => Err(anyhow!("mode must be 0 or 1, got {}", code)),
        }
    }
}

impl FromStr for RhythmMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "microphone" | "mic" => Ok(RhythmMode::Microphone),
            "1" | "aux" => Ok(RhythmMode::Aux),
            _ => Err(anyhow!(
                "mode must be 0/1 or 'microphone'/'mic'/'aux', got {:?}",
                s
            )),
        }
    }
}

impl fmt::Display for RhythmMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode_str = match self {
            RhythmMode::Microphone => "microphone",
            RhythmMode::Aux => "aux",
        };
        write!(f, "{}", mode_str)
    }
}

/// Helpers for the `/rhythm` endpoint.
///
/// Devices without a rhythm module answer with an error; reads treat that as
/// an empty status rather than failing.
pub struct RhythmClient<'a, A: NanoleafApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: NanoleafApi + ?Sized> RhythmClient<'a, A> {
    pub fn new(api: &'a A) -> Self {
        RhythmClient { api }
    }

    /// Returns the raw `/rhythm` object, or an empty map on any failure.
    pub async fn get_info(&self) -> Map<String, Value> {
        match self.api.get_json(RHYTHM_PATH).await {
            Ok(Value::Object(info)) => info,
            Ok(other) => {
                warn!("Unexpected rhythm response: {}", other);
                Map::new()
            }
            Err(e) => {
                warn!("Failed to fetch rhythm info: {}", e);
                Map::new()
            }
        }
    }

    /// Whether the rhythm module is active.
    pub async fn is_active(&self) -> bool {
        match self.get_info().await.get("rhythmActive") {
            Some(Value::Bool(active)) => *active,
            Some(Value::Number(n)) => n.as_i64().is_some_and(|v| v != 0),
            Some(Value::String(s)) => {
                matches!(s.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
            }
            _ => false,
        }
    }

    /// Returns `rhythmMode` as an integer, if present.
    pub async fn get_mode(&self) -> Option<i64> {
        match self.get_info().await.get("rhythmMode")? {
            Value::Bool(b) => Some(i64::from(*b)),
            other => loose_i64(other),
        }
    }

    /// Switches the audio source.
    pub async fn set_mode(&self, mode: RhythmMode) -> Result<()> {
        self.api
            .put_json(RHYTHM_PATH, &json!({ "rhythmMode": mode.as_code() }))
            .await?;
        Ok(())
    }

    /// Switches the audio source from a raw code or name.
    pub async fn set_mode_str(&self, mode: &str) -> Result<()> {
        let parsed: RhythmMode = mode.parse().context("Invalid rhythm mode")?;
        self.set_mode(parsed).await
    }
}
