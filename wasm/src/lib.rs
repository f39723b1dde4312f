use imbibi::coords::format_decimal;
use imbibi::{Atlas, IndexConfig, Level, SearchEntry, SearchOutcome};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

thread_local! {
    static ATLAS: RefCell<Option<Atlas>> = const { RefCell::new(None) };
}

#[derive(Serialize)]
struct LocateHit<'a> {
    index: usize,
    attributes: BTreeMap<&'a str, &'a str>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum SearchReply<'a> {
    Results {
        matches: Vec<&'a SearchEntry>,
        parent_matches: Vec<&'a SearchEntry>,
    },
    Suggestions {
        levels: Vec<Level>,
    },
}

fn with_atlas<T>(f: impl FnOnce(&Atlas) -> T) -> Result<T, String> {
    ATLAS.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(f)
            .ok_or_else(|| "atlas not initialised; call init_atlas first".to_string())
    })
}

/// Builds the indices from a GeoJSON FeatureCollection, replacing any previous atlas.
#[wasm_bindgen]
pub fn init_atlas(geojson: &str) -> Result<usize, String> {
    let atlas =
        Atlas::from_geojson_str(geojson, &IndexConfig::default()).map_err(|e| e.to_string())?;
    let count = atlas.features().len();
    web_sys::console::log_1(&format!("imbibi: indexed {} boundaries", count).into());
    ATLAS.with(|slot| *slot.borrow_mut() = Some(atlas));
    Ok(count)
}

#[wasm_bindgen]
pub fn locate(latitude: f64, longitude: f64) -> Result<JsValue, String> {
    with_atlas(|atlas| match atlas.locate_lat_lon(latitude, longitude) {
        Some(hit) => {
            let attributes = hit
                .feature
                .attributes()
                .iter()
                .map(|(key, value)| (key.as_str(), value.as_str()))
                .collect();
            let reply = LocateHit {
                index: hit.index,
                attributes,
            };
            serde_wasm_bindgen::to_value(&reply).unwrap_or(JsValue::NULL)
        }
        None => JsValue::NULL,
    })
}

#[wasm_bindgen]
pub fn search(query: &str) -> Result<JsValue, String> {
    with_atlas(|atlas| {
        let reply = match atlas.search(query) {
            SearchOutcome::Results(results) => SearchReply::Results {
                matches: results.name_matches().collect(),
                parent_matches: results.parent_matches().collect(),
            },
            SearchOutcome::Suggestions(levels) => SearchReply::Suggestions { levels },
        };
        serde_wasm_bindgen::to_value(&reply).unwrap_or(JsValue::NULL)
    })
}

#[wasm_bindgen]
pub fn entry(key: &str) -> Result<JsValue, String> {
    with_atlas(|atlas| match atlas.entry(key) {
        Some(entry) => serde_wasm_bindgen::to_value(entry).unwrap_or(JsValue::NULL),
        None => JsValue::NULL,
    })
}

/// Parses coordinate text into `[lat, lon]`.
#[wasm_bindgen]
pub fn parse_coordinates(text: &str) -> Result<Vec<f64>, String> {
    imbibi::parse_coordinates(text)
        .map(|location| vec![location.latitude, location.longitude])
        .map_err(|e| e.to_string())
}

#[wasm_bindgen]
pub fn format_coordinates(latitude: f64, longitude: f64) -> String {
    imbibi::format_coordinates(latitude, longitude)
}

/// Text placed on the clipboard by the "copy coordinates" action.
#[wasm_bindgen]
pub fn clipboard_text(latitude: f64, longitude: f64) -> String {
    format_decimal(latitude, longitude)
}
