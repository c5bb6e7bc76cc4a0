//! Browser tests, run with `wasm-pack test --headless --firefox`

#![cfg(target_arch = "wasm32")]

use seedbank_wasm::{convert_quantity, derive_accession_state, unit_labels};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn cross_family_conversion_is_an_error() {
    assert!(convert_quantity(10.0, "seeds", "g").is_err());
}

#[wasm_bindgen_test]
fn oversized_conversion_is_an_error() {
    assert!(convert_quantity(1e28, "kg", "mg").is_err());
}

#[wasm_bindgen_test]
fn unknown_unit_is_an_error() {
    assert!(convert_quantity(1.0, "bushels", "g").is_err());
}

#[wasm_bindgen_test]
fn malformed_snapshot_is_an_error() {
    assert!(derive_accession_state("{").is_err());
}

#[wasm_bindgen_test]
fn unit_labels_lists_every_unit() {
    assert_eq!(unit_labels().length(), 6);
}
