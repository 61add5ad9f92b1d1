//! Map rendering configuration.

use serde::{Deserialize, Serialize};

/// Map document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Tile server URL template.
    #[serde(default = "default_tile_url")]
    pub tile_url: String,
    /// Attribution text shown on the map.
    #[serde(default = "default_attribution")]
    pub attribution: String,
    /// Leaflet version loaded by the document.
    #[serde(default = "default_leaflet_version")]
    pub leaflet_version: String,
    /// Zoom used when a staff member is selected.
    #[serde(default = "default_selected_zoom")]
    pub selected_zoom: u8,
    /// Zoom used when centred on the viewer.
    #[serde(default = "default_zoom")]
    pub default_zoom: u8,
    /// Where the daemon writes the rendered document.
    #[serde(default = "default_output")]
    pub output: String,
    /// Seconds between daemon re-renders.
    #[serde(default = "default_refresh")]
    pub refresh_seconds: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            tile_url: default_tile_url(),
            attribution: default_attribution(),
            leaflet_version: default_leaflet_version(),
            selected_zoom: default_selected_zoom(),
            default_zoom: default_zoom(),
            output: default_output(),
            refresh_seconds: default_refresh(),
        }
    }
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_attribution() -> String {
    "© OpenStreetMap contributors".to_string()
}

fn default_leaflet_version() -> String {
    "1.9.4".to_string()
}

fn default_selected_zoom() -> u8 {
    15
}

fn default_zoom() -> u8 {
    13
}

fn default_output() -> String {
    "data/map.html".to_string()
}

fn default_refresh() -> u64 {
    30
}
