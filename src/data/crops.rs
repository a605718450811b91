//! Crop definitions.

use crate::shared::{CropDef, CropRegistry};

const MINUTE_MS: f64 = 60.0 * 1000.0;

pub fn populate_crops(registry: &mut CropRegistry) {
    let defs = [
        CropDef {
            id: "carrot".to_string(),
            name: "Carrot".to_string(),
            stage_ms: vec![1.0 * MINUTE_MS, 1.5 * MINUTE_MS, 2.0 * MINUTE_MS],
            seed_price: 10,
            crop_price: 24,
        },
        CropDef {
            id: "potato".to_string(),
            name: "Potato".to_string(),
            stage_ms: vec![1.5 * MINUTE_MS, 2.0 * MINUTE_MS, 2.5 * MINUTE_MS],
            seed_price: 14,
            crop_price: 34,
        },
        CropDef {
            id: "tomato".to_string(),
            name: "Tomato".to_string(),
            stage_ms: vec![
                1.0 * MINUTE_MS,
                2.0 * MINUTE_MS,
                2.0 * MINUTE_MS,
                3.0 * MINUTE_MS,
            ],
            seed_price: 20,
            crop_price: 52,
        },
        CropDef {
            id: "strawberry".to_string(),
            name: "Strawberry".to_string(),
            stage_ms: vec![2.0 * MINUTE_MS, 3.0 * MINUTE_MS, 3.0 * MINUTE_MS],
            seed_price: 30,
            crop_price: 80,
        },
        CropDef {
            id: "pumpkin".to_string(),
            name: "Pumpkin".to_string(),
            stage_ms: vec![
                2.0 * MINUTE_MS,
                3.0 * MINUTE_MS,
                4.0 * MINUTE_MS,
                5.0 * MINUTE_MS,
            ],
            seed_price: 45,
            crop_price: 130,
        },
    ];

    for def in defs {
        registry.crops.insert(def.id.clone(), def);
    }
}
