use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

pub const MAX_STYLES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleTag {
    Minimalist,
    Modern,
    Vintage,
    Playful,
    Elegant,
    Geometric,
    Abstract,
    Typographic,
    Illustrative,
    #[serde(rename = "Hand-drawn")]
    HandDrawn,
    #[serde(rename = "Flat Design")]
    FlatDesign,
    #[serde(rename = "3D")]
    ThreeD,
}

impl StyleTag {
    pub const ALL: [StyleTag; 12] = [
        StyleTag::Minimalist, StyleTag::Modern, StyleTag::Vintage,
        StyleTag::Playful, StyleTag::Elegant, StyleTag::Geometric,
        StyleTag::Abstract, StyleTag::Typographic, StyleTag::Illustrative,
        StyleTag::HandDrawn, StyleTag::FlatDesign, StyleTag::ThreeD,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            StyleTag::Minimalist => "Minimalist",
            StyleTag::Modern => "Modern",
            StyleTag::Vintage => "Vintage",
            StyleTag::Playful => "Playful",
            StyleTag::Elegant => "Elegant",
            StyleTag::Geometric => "Geometric",
            StyleTag::Abstract => "Abstract",
            StyleTag::Typographic => "Typographic",
            StyleTag::Illustrative => "Illustrative",
            StyleTag::HandDrawn => "Hand-drawn",
            StyleTag::FlatDesign => "Flat Design",
            StyleTag::ThreeD => "3D",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "3:4")]
    Portrait,
}

impl Default for AspectRatio {
    fn default() -> Self { AspectRatio::Square }
}

impl AspectRatio {
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square, AspectRatio::Wide, AspectRatio::Tall,
        AspectRatio::Landscape, AspectRatio::Portrait,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Portrait => "3:4",
        }
    }

    pub fn fraction(&self) -> f32 {
        match self {
            AspectRatio::Square => 1.0,
            AspectRatio::Wide => 16.0 / 9.0,
            AspectRatio::Tall => 9.0 / 16.0,
            AspectRatio::Landscape => 4.0 / 3.0,
            AspectRatio::Portrait => 3.0 / 4.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormData {
    pub brand_name: String,
    pub industry: String,
    pub visuals: String,
    pub colors: String,
    pub logo_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppState {
    pub form_data: FormData,
    pub selected_styles: Vec<StyleTag>,
    pub aspect_ratio: AspectRatio,
}

impl AppState {
    pub fn load() -> Self {
        let config_path: PathBuf = Self::get_config_path();
        match fs::read_to_string(&config_path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                log::warn!("discarding corrupt app state at {}: {}", config_path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    pub fn save(&self) {
        let config_path: PathBuf = Self::get_config_path();
        if let Some(parent) = config_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = fs::write(&config_path, json) {
                    log::warn!("failed to persist app state: {}", e);
                }
            }
            Err(e) => log::warn!("failed to serialize app state: {}", e),
        }
    }

    pub fn clear_saved() {
        let config_path: PathBuf = Self::get_config_path();
        if config_path.exists() {
            if let Err(e) = fs::remove_file(&config_path) {
                log::warn!("failed to remove saved app state: {}", e);
            }
        }
    }

    fn get_config_path() -> PathBuf {
        let mut path: PathBuf = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("logo_forge");
        path.push("app_state.json");
        path
    }

    // Missing fields fall back to defaults, so partial blobs from older
    // versions still load.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn toggle_style(&mut self, style: StyleTag) {
        if let Some(pos) = self.selected_styles.iter().position(|s: &StyleTag| *s == style) {
            self.selected_styles.remove(pos);
        } else if self.selected_styles.len() < MAX_STYLES {
            self.selected_styles.push(style);
        }
    }

    pub fn is_style_selected(&self, style: StyleTag) -> bool {
        self.selected_styles.contains(&style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_adds_and_removes() {
        let mut state: AppState = AppState::default();
        state.toggle_style(StyleTag::Modern);
        state.toggle_style(StyleTag::Vintage);
        assert_eq!(state.selected_styles, vec![StyleTag::Modern, StyleTag::Vintage]);

        state.toggle_style(StyleTag::Modern);
        assert_eq!(state.selected_styles, vec![StyleTag::Vintage]);
    }

    #[test]
    fn toggle_fourth_style_is_noop() {
        let mut state: AppState = AppState::default();
        state.toggle_style(StyleTag::Minimalist);
        state.toggle_style(StyleTag::Modern);
        state.toggle_style(StyleTag::Vintage);
        state.toggle_style(StyleTag::Playful);
        assert_eq!(
            state.selected_styles,
            vec![StyleTag::Minimalist, StyleTag::Modern, StyleTag::Vintage]
        );
    }

    #[test]
    fn round_trip_preserves_state() {
        let mut state: AppState = AppState::default();
        state.form_data.brand_name = "Acme".to_string();
        state.form_data.colors = "Blues and greens".to_string();
        state.selected_styles = vec![StyleTag::HandDrawn, StyleTag::ThreeD];
        state.aspect_ratio = AspectRatio::Wide;

        let json: String = serde_json::to_string(&state).unwrap();
        assert_eq!(AppState::from_json(&json).unwrap(), state);
    }

    #[test]
    fn serialized_layout_is_camel_case_with_display_strings() {
        let mut state: AppState = AppState::default();
        state.form_data.brand_name = "Acme".to_string();
        state.selected_styles = vec![StyleTag::FlatDesign];

        let value: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["formData"]["brandName"], "Acme");
        assert_eq!(value["selectedStyles"][0], "Flat Design");
        assert_eq!(value["aspectRatio"], "1:1");
    }

    #[test]
    fn partial_blob_merges_over_defaults() {
        let state: AppState = AppState::from_json(r#"{"selectedStyles":["Modern"]}"#).unwrap();
        assert_eq!(state.selected_styles, vec![StyleTag::Modern]);
        assert_eq!(state.form_data, FormData::default());
        assert_eq!(state.aspect_ratio, AspectRatio::Square);
    }

    #[test]
    fn corrupt_blob_is_rejected() {
        assert!(AppState::from_json("{not json").is_err());
    }
}
