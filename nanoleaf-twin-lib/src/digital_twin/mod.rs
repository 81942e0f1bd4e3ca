//! A local mirror of per-panel colors.
//!
//! [`DigitalTwin`] keeps one [`Rgb`] per panel and renders them as a static
//! scene on demand. Panels are ordered by `x`, then `y`, then panel id, and
//! that order is fixed when the twin is built, so the same colors always
//! render to the same `animData` string.
//!
//! ```no_run
//! use nanoleaf_twin_lib::control_interface::{ControlInterface, DEFAULT_PORT};
//! use nanoleaf_twin_lib::digital_twin::{DigitalTwin, TempOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let control = ControlInterface::new("192.168.0.50", DEFAULT_PORT, "token").await?;
//!     let mut twin = DigitalTwin::create(control).await?;
//!     let first = twin.ids()[0];
//!     twin.set_hex(first, "#FF9900")?;
//!     twin.apply_temp(&TempOptions { only: Some(vec![first]), ..Default::default() }).await?;
//!     Ok(())
//! }
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

use anyhow::{bail, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::effects::{DisplayCommand, EffectWrite, EffectsClient};
use crate::layout::{LayoutClient, PanelPosition};
use crate::led::anim::build_anim;
use crate::led::color::Rgb;
use crate::util::traits::NanoleafApi;

/// A panel of the device layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Panel {
    pub panel_id: u32,
    pub x: i32,
    pub y: i32,
}

impl Panel {
    pub fn new(panel_id: u32, x: i32, y: i32) -> Self {
        Panel { panel_id, x, y }
    }
}

impl From<PanelPosition> for Panel {
    fn from(position: PanelPosition) -> Self {
        Panel::new(position.panel_id, position.x, position.y)
    }
}

/// Options for [`DigitalTwin::sync`].
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    pub transition_ms: u32,
    pub command: DisplayCommand,
    /// Restrict the scene to these panels. Order does not matter; panels are
    /// always rendered in twin order.
    pub only: Option<Vec<u32>>,
    /// Brightness overlay in percent, applied on top of the twin colors.
    pub brightness: Option<u8>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            transition_ms: 10,
            command: DisplayCommand::Display,
            only: None,
            brightness: None,
        }
    }
}

/// Options for [`DigitalTwin::apply_temp`].
#[derive(Debug, Clone, PartialEq)]
pub struct TempOptions {
    pub transition_ms: u32,
    /// How long the temporary scene stays up before the previous effect is
    /// restored.
    pub duration: Duration,
    pub only: Option<Vec<u32>>,
    pub brightness: Option<u8>,
}

impl Default for TempOptions {
    fn default() -> Self {
        TempOptions {
            transition_ms: 60,
            duration: Duration::from_millis(2000),
            only: None,
            brightness: None,
        }
    }
}

pub struct DigitalTwin<A: NanoleafApi> {
    api: A,
    panels: Vec<Panel>,
    ids: Vec<u32>,
    colors: HashMap<u32, Rgb>,
}

impl<A: NanoleafApi> DigitalTwin<A> {
    /// Builds a twin from a known panel list. Every panel starts black.
    ///
    /// A panel id listed more than once keeps only its first position in
    /// `(x, y, id)` order.
    pub fn new(api: A, panels: Vec<Panel>) -> Self {
        let mut panels = panels;
        panels.sort_by_key(|p| (p.x, p.y, p.panel_id));
        let mut seen = HashSet::new();
        panels.retain(|p| seen.insert(p.panel_id));

        let ids: Vec<u32> = panels.iter().map(|p| p.panel_id).collect();
        let colors = ids.iter().map(|&id| (id, Rgb::BLACK)).collect();
        DigitalTwin {
            api,
            panels,
            ids,
            colors,
        }
    }

    /// Fetches the panel layout from the device and builds a twin from it.
    pub async fn create(api: A) -> Result<Self> {
        let positions = LayoutClient::new(&api).get_positions().await?;
        if positions.is_empty() {
            bail!(
                "Panel layout not found; per-panel control requires a panel device. \
                 Bulbs and strips only support whole-device color."
            );
        }
        info!("Building digital twin for {} panels", positions.len());
        let panels = positions.into_iter().map(Panel::from).collect();
        Ok(DigitalTwin::new(api, panels))
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Panel ids in `(x, y, id)` order.
    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn get_color(&self, panel_id: u32) -> Option<Rgb> {
        self.colors.get(&panel_id).copied()
    }

    pub fn get_all_colors(&self) -> HashMap<u32, Rgb> {
        self.colors.clone()
    }

    pub fn set_color(&mut self, panel_id: u32, rgb: Rgb) -> Result<()> {
        match self.colors.get_mut(&panel_id) {
            Some(color) => {
                *color = rgb;
                Ok(())
            }
            None => bail!("panel id unknown: {}", panel_id),
        }
    }

    pub fn set_hex(&mut self, panel_id: u32, hex_color: &str) -> Result<()> {
        let rgb = Rgb::from_hex(hex_color)?;
        self.set_color(panel_id, rgb)
    }

    pub fn set_all_colors(&mut self, rgb: Rgb) {
        for color in self.colors.values_mut() {
            *color = rgb;
        }
    }

    /// Resolves the panels a scene covers, in twin order.
    fn select_ids(&self, only: Option<&[u32]>) -> Result<Vec<u32>> {
        let Some(only) = only else {
            return Ok(self.ids.clone());
        };
        let wanted: HashSet<u32> = only.iter().copied().collect();
        let unknown: BTreeSet<u32> = wanted
            .iter()
            .copied()
            .filter(|id| !self.colors.contains_key(id))
            .collect();
        if !unknown.is_empty() {
            bail!("unknown panel ids: {:?}", unknown);
        }
        Ok(self
            .ids
            .iter()
            .copied()
            .filter(|id| wanted.contains(id))
            .collect())
    }

    /// Pushes the current colors to the device as a static scene.
    pub async fn sync(&self, options: &SyncOptions) -> Result<()> {
        let ids = self.select_ids(options.only.as_deref())?;
        let anim_data = build_anim(&ids, &self.colors, options.transition_ms, options.brightness)?;
        debug!(
            "Syncing {} panels with {}: {}",
            ids.len(),
            options.command,
            anim_data
        );
        EffectsClient::new(&self.api)
            .write_effect(&EffectWrite::static_scene(options.command, anim_data))
            .await
    }

    /// Shows the twin colors temporarily, then restores the previous effect.
    ///
    /// The previously selected effect is read first; if that fails nothing is
    /// restored. The restore runs whether or not the temporary scene could be
    /// shown, and a failed restore is only logged. An error from showing the
    /// scene is returned after the restore attempt.
    pub async fn apply_temp(&self, options: &TempOptions) -> Result<()> {
        let effects = EffectsClient::new(&self.api);

        let previous = match effects.get_selected_effect().await {
            Ok(name) => Some(name),
            Err(e) => {
                warn!("Could not read the selected effect, it will not be restored: {}", e);
                None
            }
        };

        let sync_options = SyncOptions {
            transition_ms: options.transition_ms,
            command: DisplayCommand::DisplayTemp,
            only: options.only.clone(),
            brightness: options.brightness,
        };
        let outcome = match self.sync(&sync_options).await {
            Ok(()) => {
                sleep(options.duration).await;
                Ok(())
            }
            Err(e) => Err(e),
        };

        if let Some(previous) = previous.filter(|name| !name.is_empty()) {
            match effects.select_effect(&previous).await {
                Ok(()) => info!("Restored effect {:?}", previous),
                Err(e) => warn!("Failed to restore effect {:?}: {}", previous, e),
            }
        }

        outcome
    }
}
