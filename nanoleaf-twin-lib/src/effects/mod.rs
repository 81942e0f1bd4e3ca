use std::fmt;

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::util::traits::NanoleafApi;

const EFFECTS_PATH: &str = "/effects";
const EFFECTS_LIST_PATH: &str = "/effects/effectsList";
const SELECTED_EFFECT_PATH: &str = "/effects/select";

/// Default color model for custom effect uploads.
pub const DEFAULT_COLOR_TYPE: &str = "HSB";

/// The `command` of an effect write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectCommand {
    /// Add (or replace) a stored effect.
    Add,
    /// Show an effect and keep it as the current effect.
    Display,
    /// Show an effect without persisting it.
    DisplayTemp,
}

/// The subset of [`EffectCommand`] a digital twin may render with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DisplayCommand {
    #[default]
    #[value(name = "display")]
    Display,
    #[value(name = "displayTemp")]
    DisplayTemp,
}

impl From<DisplayCommand> for EffectCommand {
    fn from(command: DisplayCommand) -> Self {
        match command {
            DisplayCommand::Display => EffectCommand::Display,
            DisplayCommand::DisplayTemp => EffectCommand::DisplayTemp,
        }
    }
}

impl fmt::Display for DisplayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let command_str = match self {
            DisplayCommand::Display => "display",
            DisplayCommand::DisplayTemp => "displayTemp",
        };
        write!(f, "{}", command_str)
    }
}

/// One palette entry of a custom effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub hue: u16,
    pub saturation: u8,
    pub brightness: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probability: Option<f32>,
}

/// The body of `PUT /effects {"write": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectWrite {
    pub command: EffectCommand,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anim_name: Option<String>,
    pub anim_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_type: Option<String>,
    pub anim_data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<PaletteEntry>>,
    #[serde(rename = "loop", skip_serializing_if = "Option::is_none")]
    pub looping: Option<bool>,
}

impl EffectWrite {
    /// A single-frame scene, as rendered by the digital twin.
    pub fn static_scene(command: DisplayCommand, anim_data: String) -> Self {
        EffectWrite {
            command: command.into(),
            version: Some("1.0".to_string()),
            anim_name: None,
            anim_type: "static".to_string(),
            color_type: None,
            anim_data,
            palette: Some(Vec::new()),
            looping: Some(false),
        }
    }
}

/// Helpers for the `/effects` endpoints.
pub struct EffectsClient<'a, A: NanoleafApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: NanoleafApi + ?Sized> EffectsClient<'a, A> {
    pub fn new(api: &'a A) -> Self {
        EffectsClient { api }
    }

    /// Returns the names of all stored effects.
    ///
    /// A response that is not a JSON array yields an empty list.
    pub async fn get_effects_list(&self) -> Result<Vec<String>> {
        let data = self.api.get_json(EFFECTS_LIST_PATH).await?;
        let names = match data {
            Value::Array(entries) => entries
                .into_iter()
                .filter_map(|entry| entry.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        Ok(names)
    }

    /// Returns the name of the currently selected effect.
    pub async fn get_selected_effect(&self) -> Result<String> {
        let data = self.api.get_json(SELECTED_EFFECT_PATH).await?;
        data.as_str()
            .map(str::to_string)
            .ok_or_else(|| anyhow!("Unexpected selected effect response: {}", data))
    }

    /// Selects a stored effect by name.
    pub async fn select_effect(&self, name: &str) -> Result<()> {
        info!("Selecting effect {:?}", name);
        self.api
            .put_json(EFFECTS_PATH, &json!({ "select": name }))
            .await?;
        Ok(())
    }

    /// Sends a raw effect write.
    pub async fn write_effect(&self, write: &EffectWrite) -> Result<()> {
        debug!("Writing effect: {:?}", write);
        self.api
            .put_json(EFFECTS_PATH, &json!({ "write": write }))
            .await?;
        Ok(())
    }

    /// Uploads (adds or replaces) a custom effect.
    ///
    /// # Arguments
    /// - `anim_data`: a complete Nanoleaf `animData` string.
    /// - `color_type`: defaults to [`DEFAULT_COLOR_TYPE`].
    /// - `palette`: may be empty for static scenes.
    pub async fn write_custom_effect(
        &self,
        anim_name: &str,
        anim_data: &str,
        color_type: Option<&str>,
        looping: bool,
        palette: &[PaletteEntry],
    ) -> Result<()> {
        self.write_effect(&EffectWrite {
            command: EffectCommand::Add,
            version: None,
            anim_name: Some(anim_name.to_string()),
            anim_type: "custom".to_string(),
            color_type: Some(color_type.unwrap_or(DEFAULT_COLOR_TYPE).to_string()),
            anim_data: anim_data.to_string(),
            palette: Some(palette.to_vec()),
            looping: Some(looping),
        })
        .await
    }

    /// Shows a custom effect without saving it.
    pub async fn display_temp_static(&self, anim_data: &str, color_type: Option<&str>) -> Result<()> {
        self.write_effect(&EffectWrite {
            command: EffectCommand::DisplayTemp,
            version: None,
            anim_name: None,
            anim_type: "custom".to_string(),
            color_type: Some(color_type.unwrap_or(DEFAULT_COLOR_TYPE).to_string()),
            anim_data: anim_data.to_string(),
            palette: None,
            looping: None,
        })
        .await
    }
}
