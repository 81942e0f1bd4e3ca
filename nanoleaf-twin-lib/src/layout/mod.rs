use anyhow::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::util::traits::NanoleafApi;

const LAYOUT_PATH: &str = "/panelLayout/layout";
const GLOBAL_ORIENTATION_PATH: &str = "/panelLayout/globalOrientation";
const INFO_PATH: &str = "/";

/// Upper bound of the global orientation, in degrees.
pub const MAX_ORIENTATION: u16 = 360;

/// One entry of `positionData`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelPosition {
    pub panel_id: u32,
    pub x: i32,
    pub y: i32,
    /// Panel rotation in degrees.
    #[serde(default)]
    pub o: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape_type: Option<u32>,
}

impl PanelPosition {
    /// Reads a single `positionData` entry, tolerating stringified and
    /// fractional numbers. Returns `None` unless `panelId`, `x` and `y` are
    /// all present.
    fn from_value(value: &Value) -> Option<Self> {
        let entry = value.as_object()?;
        let panel_id = u32::try_from(loose_i64(entry.get("panelId")?)?).ok()?;
        let x = i32::try_from(loose_i64(entry.get("x")?)?).ok()?;
        let y = i32::try_from(loose_i64(entry.get("y")?)?).ok()?;
        let o = entry
            .get("o")
            .and_then(loose_i64)
            .and_then(|o| i32::try_from(o).ok())
            .unwrap_or(0);
        let shape_type = entry
            .get("shapeType")
            .and_then(loose_i64)
            .and_then(|s| u32::try_from(s).ok());
        Some(PanelPosition {
            panel_id,
            x,
            y,
            o,
            shape_type,
        })
    }
}

/// Reads an integer out of a JSON number (floats truncate) or numeric string.
pub(crate) fn loose_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Collects every well-formed entry of a `positionData` list.
pub fn extract_positions(position_data: &Value) -> Vec<PanelPosition> {
    position_data
        .as_array()
        .map(|entries| entries.iter().filter_map(PanelPosition::from_value).collect())
        .unwrap_or_default()
}

/// Helpers for the `/panelLayout` endpoints.
pub struct LayoutClient<'a, A: NanoleafApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: NanoleafApi + ?Sized> LayoutClient<'a, A> {
    pub fn new(api: &'a A) -> Self {
        LayoutClient { api }
    }

    /// Returns the panel positions.
    ///
    /// Prefers `/panelLayout/layout`; when that fails or carries no
    /// `positionData` list, falls back to the full device info. Returns an
    /// empty list when neither source has one.
    pub async fn get_positions(&self) -> Result<Vec<PanelPosition>> {
        match self.api.get_json(LAYOUT_PATH).await {
            Ok(layout) => {
                if let Some(position_data) = layout.get("positionData").filter(|p| p.is_array()) {
                    return Ok(extract_positions(position_data));
                }
                debug!("Layout response has no positionData, trying device info");
            }
            Err(e) => warn!("Failed to fetch panel layout, trying device info: {}", e),
        }

        let info = match self.api.get_json(INFO_PATH).await {
            Ok(info) => info,
            Err(e) => {
                warn!("Failed to fetch device info: {}", e);
                return Ok(Vec::new());
            }
        };
        Ok(info
            .pointer("/panelLayout/layout/positionData")
            .map(extract_positions)
            .unwrap_or_default())
    }

    /// Returns the global orientation in degrees, if the device reports one.
    ///
    /// Accepts a bare number or an object whose `value` is a number or a
    /// numeric string. Fractional values truncate.
    pub async fn get_global_orientation(&self) -> Result<Option<u16>> {
        let data = self.api.get_json(GLOBAL_ORIENTATION_PATH).await?;
        let angle = match &data {
            Value::Number(_) => loose_i64(&data),
            Value::Object(entry) => entry.get("value").and_then(loose_i64),
            _ => None,
        };
        Ok(angle.and_then(|a| u16::try_from(a).ok()))
    }

    /// Sets the global orientation, clamping `angle` to `0..=360`.
    pub async fn set_global_orientation(&self, angle: i64) -> Result<()> {
        let clamped = angle.clamp(0, i64::from(MAX_ORIENTATION));
        if clamped != angle {
            debug!("Clamped orientation {} to {}", angle, clamped);
        }
        self.api
            .put_json(GLOBAL_ORIENTATION_PATH, &json!({ "value": clamped }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::mock::MockApi;

    #[test]
    fn test_extract_positions_skips_malformed() {
        let data = json!([
            { "panelId": 10, "x": 0, "y": 0, "o": 60, "shapeType": 7 },
            { "panelId": "20", "x": 5.7, "y": -3 },
            { "panelId": 30, "x": 1 },
            "garbage",
            { "panelId": -1, "x": 0, "y": 0 },
        ]);
        assert_eq!(
            extract_positions(&data),
            vec![
                PanelPosition {
                    panel_id: 10,
                    x: 0,
                    y: 0,
                    o: 60,
                    shape_type: Some(7)
                },
                PanelPosition {
                    panel_id: 20,
                    x: 5,
                    y: -3,
                    o: 0,
                    shape_type: None
                },
            ]
        );
        assert!(extract_positions(&json!({ "panelId": 1 })).is_empty());
    }

    #[tokio::test]
    async fn test_positions_from_layout_endpoint() {
        let api = MockApi::new().with_get(
            LAYOUT_PATH,
            json!({ "numPanels": 1, "sideLength": 150, "positionData": [{ "panelId": 4, "x": 1, "y": 2, "o": 0 }] }),
        );
        let positions = LayoutClient::new(&api).get_positions().await.unwrap();
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].panel_id, 4);
        assert_eq!(api.gets(), vec![LAYOUT_PATH]);
    }

    #[tokio::test]
    async fn test_positions_fall_back_to_info() {
        let api = MockApi::new().with_get(
            INFO_PATH,
            json!({ "panelLayout": { "layout": { "positionData": [{ "panelId": 8, "x": 3, "y": 4 }] } } }),
        );
        let positions = LayoutClient::new(&api).get_positions().await.unwrap();
        assert_eq!(positions.iter().map(|p| p.panel_id).collect::<Vec<_>>(), vec![8]);
    }

    #[tokio::test]
    async fn test_positions_empty_when_nothing_available() {
        let api = MockApi::new().with_get(LAYOUT_PATH, json!({ "numPanels": 0 }));
        assert!(LayoutClient::new(&api).get_positions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_position_list_is_final() {
        let api = MockApi::new()
            .with_get(LAYOUT_PATH, json!({ "numPanels": 0, "positionData": [] }))
            .with_get(
                INFO_PATH,
                json!({ "panelLayout": { "layout": { "positionData": [{ "panelId": 8, "x": 3, "y": 4 }] } } }),
            );
        assert!(LayoutClient::new(&api).get_positions().await.unwrap().is_empty());
        assert_eq!(api.gets(), vec![LAYOUT_PATH]);
    }

    #[tokio::test]
    async fn test_global_orientation_shapes() {
        for (body, expected) in [
            (json!(90), Some(90)),
            (json!({ "value": 120, "min": 0, "max": 360 }), Some(120)),
            (json!({ "value": "45" }), Some(45)),
            (json!({ "value": 45.0 }), Some(45)),
            (json!(200.9), Some(200)),
            (json!({ "value": "north" }), None),
            (json!("90"), None),
        ] {
            let api = MockApi::new().with_get(GLOBAL_ORIENTATION_PATH, body);
            assert_eq!(
                LayoutClient::new(&api).get_global_orientation().await.unwrap(),
                expected
            );
        }
    }

    #[tokio::test]
    async fn test_set_global_orientation_clamps() {
        let api = MockApi::new();
        let layout = LayoutClient::new(&api);
        layout.set_global_orientation(400).await.unwrap();
        layout.set_global_orientation(-5).await.unwrap();
        layout.set_global_orientation(15).await.unwrap();

        let values: Vec<Value> = api.puts().into_iter().map(|(_, body)| body).collect();
        assert_eq!(
            values,
            vec![json!({ "value": 360 }), json!({ "value": 0 }), json!({ "value": 15 })]
        );
    }
}
