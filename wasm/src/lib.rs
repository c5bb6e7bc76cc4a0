//! WebAssembly module for the Seed Bank Accession Platform
//!
//! Lets the browser forms compute what the server would, before submitting:
//! - Seed count estimates from a weighed subset
//! - Viability percentages
//! - Unit conversion and labels
//! - Accession state and editable sections from a stored snapshot

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

use shared::{
    validate_collection, Accession, AccessionView, CollectionInfo, Quantity, Role, Unit,
    UNIT_TABLE,
};

fn to_decimal(value: f64) -> Option<Decimal> {
    Decimal::try_from(value).ok()
}

fn parse_unit(name: &str) -> Result<Unit, JsValue> {
    Unit::parse(name).ok_or_else(|| JsValue::from_str(&format!("Unknown unit: {}", name)))
}

fn parse_snapshot(snapshot_json: &str) -> Result<Accession, JsValue> {
    serde_json::from_str(snapshot_json).map_err(|e| {
        web_sys::console::warn_1(&JsValue::from_str("Unreadable accession snapshot"));
        JsValue::from_str(&format!("Invalid accession JSON: {}", e))
    })
}

fn parse_date(value: &str) -> Result<chrono::NaiveDate, JsValue> {
    value
        .parse()
        .map_err(|e| JsValue::from_str(&format!("Invalid date '{}': {}", value, e)))
}

/// Estimated seed count: subset_count * total_weight / subset_weight.
/// Both weights must be in the same unit. Returns nothing for a zero subset.
#[wasm_bindgen]
pub fn estimate_seed_count(subset_count: u32, total_weight: f64, subset_weight: f64) -> Option<f64> {
    let total = to_decimal(total_weight)?;
    let subset = to_decimal(subset_weight)?;
    shared::estimate_seed_count(subset_count, total, subset)?.to_f64()
}

/// Viability in percent to one decimal place
#[wasm_bindgen]
pub fn viability_percent(total_germinated: u32, seeds_sown: u32) -> Option<f64> {
    shared::viability_percent(u64::from(total_germinated), seeds_sown)?.to_f64()
}

/// Convert a weight between units; counts and weights never convert
#[wasm_bindgen]
pub fn convert_quantity(value: f64, from: &str, to: &str) -> Result<f64, JsValue> {
    let from = parse_unit(from)?;
    let to = parse_unit(to)?;
    convert_value(value, from, to).map_err(|e| JsValue::from_str(&e))
}

fn convert_value(value: f64, from: Unit, to: Unit) -> Result<f64, String> {
    let value = to_decimal(value).ok_or_else(|| "Invalid quantity".to_string())?;
    let quantity = Quantity::new(value, from).map_err(|e| e.to_string())?;
    let converted = quantity.convert(to).map_err(|e| e.to_string())?;
    converted
        .value
        .to_f64()
        .ok_or_else(|| format!("{} {} cannot be represented as a number", converted.value, to))
}

/// Display label for a unit name or symbol ("g" -> "Grams")
#[wasm_bindgen]
pub fn unit_label(unit: &str) -> Option<String> {
    Unit::parse(unit).map(|u| u.label().to_string())
}

/// All unit labels in pick-list order
#[wasm_bindgen]
pub fn unit_labels() -> js_sys::Array {
    UNIT_TABLE
        .iter()
        .map(|info| JsValue::from_str(info.label))
        .collect()
}

/// Current state of a stored accession snapshot (e.g. "in_storage")
#[wasm_bindgen]
pub fn derive_accession_state(snapshot_json: &str) -> Result<String, JsValue> {
    let accession = parse_snapshot(snapshot_json)?;
    Ok(accession.state().as_str().to_string())
}

/// Derived view (remaining quantity, editable sections, viability) as JSON
#[wasm_bindgen]
pub fn accession_view(snapshot_json: &str, role: &str, today: &str) -> Result<String, JsValue> {
    let accession = parse_snapshot(snapshot_json)?;
    let role =
        Role::parse(role).ok_or_else(|| JsValue::from_str(&format!("Unknown role: {}", role)))?;
    let today = parse_date(today)?;
    let view = AccessionView::build(&accession, role, today);
    serde_json::to_string(&view).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Field problems in a collection form; future dates are reported per field
#[wasm_bindgen]
pub fn validate_collection_form(collection_json: &str, today: &str) -> Result<String, JsValue> {
    let info: CollectionInfo = serde_json::from_str(collection_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid collection JSON: {}", e)))?;
    let today = parse_date(today)?;
    let details = validate_collection(&info, today).to_details();
    serde_json::to_string(&details).map_err(|e| JsValue::from_str(&e.to_string()))
}
