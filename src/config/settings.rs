//! Crosshair settings record
//!
//! `Settings` is the full, always-valid record that is persisted to disk.
//! `SettingsPatch` is a partial update as sent by the settings UI or read from
//! a (possibly hand-edited) config file: every key is optional and values of
//! the wrong JSON type are dropped instead of failing the whole document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::common::color::{HexColor, Opacity};
use crate::common::types::{Dimensions, Line, geometry};
use crate::constants::{defaults, limits};

/// Persisted crosshair settings
///
/// Field names match the keys of `crosshair_config.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Settings {
    /// Line thickness in pixels (>= 1)
    pub thickness: u32,
    /// Inset of the vertical line from the top and bottom edges (0.0-0.5)
    pub vert_offset: f64,
    /// Inset of the horizontal line from the left and right edges (0.0-0.5)
    pub horiz_offset: f64,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: u8,
    pub show: bool,
    /// Display-only `#rrggbb`, always derived from r/g/b
    pub hex_color: String,
    /// Keys this version does not know about, written back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        let color = HexColor::from_rgb(defaults::color::R, defaults::color::G, defaults::color::B);
        Self {
            thickness: defaults::line::THICKNESS,
            vert_offset: defaults::line::VERT_OFFSET,
            horiz_offset: defaults::line::HORIZ_OFFSET,
            r: color.r,
            g: color.g,
            b: color.b,
            alpha: defaults::color::ALPHA,
            show: defaults::line::SHOW,
            hex_color: color.to_string(),
            extra: Map::new(),
        }
    }
}

impl Settings {
    /// Merge a partial update into this record, clamping every value.
    ///
    /// `alpha_percent` wins over a raw `alpha` in the same patch. `hex_color`
    /// in the patch is ignored and re-derived from the resulting r/g/b.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(thickness) = patch.thickness {
            self.thickness = clamp_thickness(thickness);
        }
        if let Some(ratio) = patch.vert_offset {
            self.vert_offset = clamp_ratio(ratio);
        }
        if let Some(ratio) = patch.horiz_offset {
            self.horiz_offset = clamp_ratio(ratio);
        }
        if let Some(r) = patch.r {
            self.r = clamp_channel(r);
        }
        if let Some(g) = patch.g {
            self.g = clamp_channel(g);
        }
        if let Some(b) = patch.b {
            self.b = clamp_channel(b);
        }
        if let Some(alpha) = patch.alpha {
            self.alpha = clamp_channel(alpha);
        }
        if let Some(percent) = patch.alpha_percent {
            self.alpha = Opacity::from_percent(percent).alpha();
        }
        if let Some(show) = patch.show {
            self.show = show;
        }
        self.extra.extend(patch.extra);
        self.hex_color = self.color().to_string();
    }

    /// Consuming variant of [`Settings::apply`]
    pub fn merged(mut self, patch: SettingsPatch) -> Self {
        self.apply(patch);
        self
    }

    pub fn color(&self) -> HexColor {
        HexColor::from_rgb(self.r, self.g, self.b)
    }

    /// Opacity as shown in the UI, round(alpha / 255 * 100)
    pub fn alpha_percent(&self) -> u8 {
        Opacity::from_alpha(self.alpha).percent()
    }

    /// Snapshot of everything the overlay needs to draw
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            thickness: self.thickness,
            vert_offset: self.vert_offset,
            horiz_offset: self.horiz_offset,
            r: self.r,
            g: self.g,
            b: self.b,
            alpha: self.alpha,
            visible: self.show,
        }
    }
}

fn clamp_thickness(value: i64) -> u32 {
    value.clamp(limits::MIN_THICKNESS as i64, u32::MAX as i64) as u32
}

fn clamp_ratio(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, limits::MAX_OFFSET_RATIO)
}

fn clamp_channel(value: i64) -> u8 {
    value.clamp(0, u8::MAX as i64) as u8
}

/// Partial settings update
///
/// Also used to read the config file, so stored keys can be merged over the
/// defaults one by one.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, deserialize_with = "lenient::int")]
    pub thickness: Option<i64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub vert_offset: Option<f64>,
    #[serde(default, deserialize_with = "lenient::float")]
    pub horiz_offset: Option<f64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub r: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub g: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub b: Option<i64>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub alpha: Option<i64>,
    /// Opacity in percent; converted to `alpha` on apply
    #[serde(default, deserialize_with = "lenient::float")]
    pub alpha_percent: Option<f64>,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub show: Option<bool>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub hex_color: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SettingsPatch {
    /// A patch that reproduces every editable value of `settings`
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            thickness: Some(settings.thickness as i64),
            vert_offset: Some(settings.vert_offset),
            horiz_offset: Some(settings.horiz_offset),
            r: Some(settings.r as i64),
            g: Some(settings.g as i64),
            b: Some(settings.b as i64),
            alpha: Some(settings.alpha as i64),
            alpha_percent: None,
            show: Some(settings.show),
            hex_color: Some(settings.hex_color.clone()),
            extra: Map::new(),
        }
    }
}

/// Render-facing projection of [`Settings`]
///
/// Sent to the overlay daemon over IPC, so it holds plain fields only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub thickness: u32,
    pub vert_offset: f64,
    pub horiz_offset: f64,
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: u8,
    pub visible: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Settings::default().overlay_style()
    }
}

impl OverlayStyle {
    /// Crosshair lines for a viewport of the given size
    pub fn lines(&self, viewport: Dimensions) -> (Line, Line) {
        geometry::compute(
            viewport.width,
            viewport.height,
            self.vert_offset,
            self.horiz_offset,
        )
    }
}

/// Deserializers that turn wrongly typed values into `None`
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use tracing::warn;

    fn ignored(value: &Value, expected: &str) {
        if !value.is_null() {
            warn!(value = %value, expected, "Ignoring config value of the wrong type");
        }
    }

    pub fn int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = match &value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
            _ => None,
        };
        if parsed.is_none() {
            ignored(&value, "integer");
        }
        Ok(parsed)
    }

    pub fn float<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = match &value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            _ => None,
        };
        if parsed.is_none() {
            ignored(&value, "number");
        }
        Ok(parsed)
    }

    pub fn boolean<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<bool>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = value.as_bool();
        if parsed.is_none() {
            ignored(&value, "boolean");
        }
        Ok(parsed)
    }

    pub fn string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = value.as_str().map(str::to_owned);
        if parsed.is_none() {
            ignored(&value, "string");
        }
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> SettingsPatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();

        assert_eq!(settings.thickness, 1);
        assert_eq!(settings.vert_offset, 0.0);
        assert_eq!(settings.horiz_offset, 0.0);
        assert_eq!((settings.r, settings.g, settings.b), (89, 247, 255));
        assert_eq!(settings.alpha, 255);
        assert!(settings.show);
        assert_eq!(settings.hex_color, "#59f7ff");
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn test_settings_serialize_uses_file_keys() {
        let value = serde_json::to_value(Settings::default()).unwrap();

        assert_eq!(
            value,
            json!({
                "thickness": 1,
                "vert_offset": 0.0,
                "horiz_offset": 0.0,
                "r": 89,
                "g": 247,
                "b": 255,
                "alpha": 255,
                "show": true,
                "hex_color": "#59f7ff"
            })
        );
    }

    #[test]
    fn test_thickness_clamps_to_one() {
        let settings = Settings::default().merged(patch(json!({ "thickness": 0 })));
        assert_eq!(settings.thickness, 1);

        let settings = Settings::default().merged(patch(json!({ "thickness": -7 })));
        assert_eq!(settings.thickness, 1);

        let settings = Settings::default().merged(patch(json!({ "thickness": 12 })));
        assert_eq!(settings.thickness, 12);
    }

    #[test]
    fn test_offsets_clamp_to_half() {
        let settings = Settings::default().merged(patch(json!({
            "vert_offset": 0.9,
            "horiz_offset": -0.2
        })));

        assert_eq!(settings.vert_offset, 0.5);
        assert_eq!(settings.horiz_offset, 0.0);
    }

    #[test]
    fn test_channels_clamp_to_byte_range() {
        let settings = Settings::default().merged(patch(json!({
            "r": 300,
            "g": -1,
            "b": 17.6,
            "alpha": 1000
        })));

        assert_eq!((settings.r, settings.g, settings.b), (255, 0, 18));
        assert_eq!(settings.alpha, 255);
    }

    #[test]
    fn test_alpha_percent_derives_alpha() {
        let settings = Settings::default().merged(patch(json!({ "alpha_percent": 50 })));

        assert_eq!(settings.alpha, 128);
        assert_eq!(settings.alpha_percent(), 50);
        assert!(!settings.extra.contains_key("alpha_percent"));
    }

    #[test]
    fn test_alpha_percent_wins_over_alpha() {
        let settings = Settings::default().merged(patch(json!({
            "alpha": 10,
            "alpha_percent": 100
        })));

        assert_eq!(settings.alpha, 255);
    }

    #[test]
    fn test_alpha_percent_out_of_range_clamps() {
        let settings = Settings::default().merged(patch(json!({ "alpha_percent": 250 })));
        assert_eq!(settings.alpha, 255);

        let settings = Settings::default().merged(patch(json!({ "alpha_percent": -5 })));
        assert_eq!(settings.alpha, 0);
    }

    #[test]
    fn test_hex_color_is_derived_from_channels() {
        let settings = Settings::default().merged(patch(json!({
            "r": 255,
            "g": 0,
            "b": 16,
            "hex_color": "#000000"
        })));

        assert_eq!(settings.hex_color, "#ff0010");
    }

    #[test]
    fn test_wrongly_typed_values_are_ignored() {
        let parsed = patch(json!({
            "thickness": "wide",
            "show": "yes",
            "r": [1, 2],
            "vert_offset": null,
            "g": 100
        }));

        assert_eq!(parsed.thickness, None);
        assert_eq!(parsed.show, None);
        assert_eq!(parsed.r, None);
        assert_eq!(parsed.vert_offset, None);
        assert_eq!(parsed.g, Some(100));

        let settings = Settings::default().merged(parsed);
        assert_eq!(settings.thickness, 1);
        assert!(settings.show);
        assert_eq!(settings.r, 89);
        assert_eq!(settings.g, 100);
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let parsed = patch(json!({ "thickness": "4", "horiz_offset": "0.25" }));

        assert_eq!(parsed.thickness, Some(4));
        assert_eq!(parsed.horiz_offset, Some(0.25));
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let settings = Settings::default().merged(patch(json!({
            "thickness": 3,
            "window_pos": [10, 20]
        })));

        assert_eq!(settings.extra.get("window_pos"), Some(&json!([10, 20])));

        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["window_pos"], json!([10, 20]));
        assert_eq!(value["thickness"], json!(3));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let update = patch(json!({ "thickness": 5, "alpha_percent": 30, "show": false }));

        let once = Settings::default().merged(update.clone());
        let twice = once.clone().merged(update);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_patch_from_settings_reproduces_record() {
        let mut settings = Settings::default();
        settings.thickness = 6;
        settings.horiz_offset = 0.3;
        settings.alpha = 77;
        settings.show = false;

        let rebuilt = Settings::default().merged(SettingsPatch::from_settings(&settings));
        assert_eq!(rebuilt, settings);
    }

    #[test]
    fn test_overlay_style_projection() {
        let settings = Settings::default().merged(patch(json!({
            "thickness": 2,
            "vert_offset": 0.1,
            "show": false
        })));
        let style = settings.overlay_style();

        assert_eq!(style.thickness, 2);
        assert_eq!(style.vert_offset, 0.1);
        assert_eq!((style.r, style.g, style.b, style.alpha), (89, 247, 255, 255));
        assert!(!style.visible);

        let (vertical, horizontal) = style.lines(Dimensions::new(800, 600));
        assert_eq!(vertical, Line::new((400, 60), (400, 540)));
        assert_eq!(horizontal, Line::new((0, 300), (800, 300)));
    }
}
