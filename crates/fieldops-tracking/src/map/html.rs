//! Leaflet document template.

use serde::Serialize;

use fieldops_core::config::MapConfig;
use fieldops_core::result::AppResult;

use super::marker::{DEFAULT_BORDER, Marker, OWN_COLOR};
use crate::view::RenderTarget;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <link rel="stylesheet" href="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.css" />
  <script src="https://unpkg.com/leaflet@__LEAFLET__/dist/leaflet.js"></script>
  <style>
    body { margin: 0; padding: 0; }
    #map { width: 100%; height: 100vh; }
  </style>
</head>
<body>
  <div id="map"></div>
  <script>
    const data = __DATA__;
    const map = L.map('map').setView([data.center.latitude, data.center.longitude], data.zoom);
    L.tileLayer(data.tileUrl, { attribution: data.attribution }).addTo(map);

    function dot(m) {
      return L.divIcon({
        className: 'custom-div-icon',
        html: '<div style="background-color: ' + m.color + '; width: 20px; height: 20px; border-radius: 50%; border: '
          + m.borderWidth + 'px solid ' + m.borderColor + '; box-shadow: 0 2px 4px rgba(0,0,0,0.3);"></div>',
        iconSize: [20, 20],
        iconAnchor: [10, 10]
      });
    }

    for (const m of data.markers) {
      L.marker([m.latitude, m.longitude], { icon: dot(m) }).addTo(map).bindPopup(m.popup);
    }
    if (data.own) {
      L.marker([data.own.latitude, data.own.longitude], { icon: dot(data.own) }).addTo(map).bindPopup(data.own.popup);
    }
  </script>
</body>
</html>
"#;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OwnMarker {
    latitude: f64,
    longitude: f64,
    color: &'static str,
    border_color: &'static str,
    border_width: u8,
    popup: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapData<'a> {
    center: fieldops_core::types::Coordinates,
    zoom: u8,
    tile_url: &'a str,
    attribution: &'a str,
    markers: &'a [Marker],
    own: Option<OwnMarker>,
}

/// Fill the template.
pub(crate) fn document(
    target: &RenderTarget,
    markers: &[Marker],
    own: Option<(f64, f64)>,
    config: &MapConfig,
) -> AppResult<String> {
    let data = MapData {
        center: target.center,
        zoom: target.zoom,
        tile_url: &config.tile_url,
        attribution: &config.attribution,
        markers,
        own: own.map(|(latitude, longitude)| OwnMarker {
            latitude,
            longitude,
            color: OWN_COLOR,
            border_color: DEFAULT_BORDER,
            border_width: 2,
            popup: "<b>Your location</b>",
        }),
    };
    // Keep the payload from closing the script element.
    let json = serde_json::to_string(&data)?.replace("</", "<\\/");

    Ok(TEMPLATE
        .replace("__LEAFLET__", &escape_html(&config.leaflet_version))
        .replace("__DATA__", &json))
}

/// Escape text for inclusion in HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
