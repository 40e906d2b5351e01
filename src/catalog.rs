//! Logical path conventions used by the farm dashboard.

pub const SENSOR_KINDS: [&str; 5] = ["temperature", "humidity", "soil-moisture", "light", "co2"];

pub const CROPS: [&str; 6] = ["lettuce", "spinach", "kale", "arugula", "basil", "mint"];

/// Used for every crop label the table does not know.
pub const DEFAULT_CROP: &str = "lettuce";

pub const FARM_STRUCTURE_PATH: &str = "farm-structure";

pub fn sensor_path(sensor_type: &str) -> String {
    format!("sensors/{sensor_type}")
}

/**
 * Maps a crop label as shown in the dashboard to its canonical identifier.
 *
 * The dashboard labels crops in Korean; canonical English names are accepted
 * as well, case-insensitively. Anything else is treated as lettuce.
 */
pub fn canonical_crop(label: &str) -> &'static str {
    match label.trim().to_lowercase().as_str() {
        "상추" | "lettuce" => "lettuce",
        "시금치" | "spinach" => "spinach",
        "케일" | "kale" => "kale",
        "루꼴라" | "아루굴라" | "arugula" => "arugula",
        "바질" | "basil" => "basil",
        "민트" | "박하" | "mint" => "mint",
        _ => DEFAULT_CROP,
    }
}

pub fn plant_path(crop_label: &str) -> String {
    format!("plants/{}", canonical_crop(crop_label))
}

/// Every path the dashboard shows at startup: all sensors, all crops and the structure.
pub fn default_preload_paths() -> Vec<String> {
    SENSOR_KINDS
        .iter()
        .map(|kind| sensor_path(kind))
        .chain(CROPS.iter().map(|crop| format!("plants/{crop}")))
        .chain(std::iter::once(FARM_STRUCTURE_PATH.to_string()))
        .collect()
}
