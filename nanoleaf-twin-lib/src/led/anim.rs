use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::led::color::{apply_brightness, Rgb};

/// Frames per panel in a static scene. Static scenes hold a single frame.
const FRAMES_PER_PANEL: u32 = 1;

/// Builds the `animData` string of a static scene.
///
/// The layout is `N` followed by one `id 1 R G B 0 T` record per panel, in
/// the order the ids are given. `T` is the transition time in milliseconds.
pub fn build_anim(
    ids: &[u32],
    colors: &HashMap<u32, Rgb>,
    transition_ms: u32,
    brightness: Option<u8>,
) -> Result<String> {
    let mut fields: Vec<u64> = Vec::with_capacity(1 + ids.len() * 7);
    fields.push(ids.len() as u64);
    for &panel_id in ids {
        let color = colors
            .get(&panel_id)
            .copied()
            .ok_or_else(|| anyhow!("no color for panel {}", panel_id))?;
        let Rgb { red, green, blue } = apply_brightness(color, brightness)?;
        fields.extend_from_slice(&[
            u64::from(panel_id),
            u64::from(FRAMES_PER_PANEL),
            u64::from(red),
            u64::from(green),
            u64::from(blue),
            0,
            u64::from(transition_ms),
        ]);
    }

    Ok(fields
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(anim: &str) -> Vec<u64> {
        anim.split(' ').map(|p| p.parse().unwrap()).collect()
    }

    #[test]
    fn test_build_anim_string_shape() {
        let colors = HashMap::from([(1, Rgb::new(10, 20, 30)), (5, Rgb::new(1, 2, 3))]);
        let parts = parse(&build_anim(&[1, 5], &colors, 75, None).unwrap());
        assert_eq!(parts[0], 2);
        assert_eq!(parts[1..8], [1, 1, 10, 20, 30, 0, 75]);
        assert_eq!(parts[8..15], [5, 1, 1, 2, 3, 0, 75]);
        assert_eq!(parts.len(), 15);
    }

    #[test]
    fn test_build_anim_keeps_given_order() {
        let colors = HashMap::from([(1, Rgb::BLACK), (2, Rgb::BLACK)]);
        let anim = build_anim(&[2, 1], &colors, 0, None).unwrap();
        assert_eq!(anim, "2 2 1 0 0 0 0 0 1 1 0 0 0 0 0");
    }

    #[test]
    fn test_build_anim_empty() {
        assert_eq!(build_anim(&[], &HashMap::new(), 10, None).unwrap(), "0");
    }

    #[test]
    fn test_build_anim_applies_brightness() {
        let colors = HashMap::from([(7, Rgb::new(200, 100, 50))]);
        let anim = build_anim(&[7], &colors, 10, Some(50)).unwrap();
        assert_eq!(anim, "1 7 1 100 50 25 0 10");
    }

    #[test]
    fn test_build_anim_unknown_panel() {
        let colors = HashMap::from([(1, Rgb::BLACK)]);
        assert!(build_anim(&[1, 2], &colors, 10, None).is_err());
    }

    #[test]
    fn test_build_anim_rejects_bad_brightness() {
        let colors = HashMap::from([(1, Rgb::BLACK)]);
        assert!(build_anim(&[1], &colors, 10, Some(150)).is_err());
    }
}
