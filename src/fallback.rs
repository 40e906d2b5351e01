//! Procedural placeholders.
//!
//! When the real asset for a logical path cannot be obtained, a stand-in is
//! synthesized from the path alone. The mapping is pure: the same path always
//! yields the same shapes and colours, and it never fails. Paths that match no
//! category produce an empty model.

use crate::data_structures::model::{Color, Geometry, Material, Model, Node};

pub const SENSOR_SIZE: f32 = 0.1;

pub const PLANT_RADIUS_TOP: f32 = 0.05;
pub const PLANT_RADIUS_BOTTOM: f32 = 0.1;
pub const PLANT_HEIGHT: f32 = 0.2;
pub const PLANT_COLOR: u32 = 0x4caf50;

pub const LEVELS: usize = 3;
pub const LEVEL_HEIGHT: f32 = 2.5;
/// Distance of pillars and floor plate centers from the structure's center.
pub const HALF_SPAN: f32 = 2.5;
pub const PILLAR_RADIUS: f32 = 0.1;
pub const PILLAR_COLOR: u32 = 0x808080;
pub const FLOOR_SIZE: f32 = 5.0;
pub const FLOOR_THICKNESS: f32 = 0.1;
pub const FLOOR_OPACITY: f32 = 0.7;
pub const FLOOR_COLOR: u32 = 0xcccccc;

pub const NEUTRAL_GRAY: u32 = 0x808080;

/// Checked in order; the first substring found in the path wins.
pub const SENSOR_COLOR_RULES: [(&str, u32); 5] = [
    ("temperature", 0xff0000),
    ("humidity", 0x0000ff),
    ("soil-moisture", 0x00ff00),
    ("light", 0xffff00),
    ("co2", 0x800080),
];

/// Which placeholder family a path falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FallbackKind {
    Sensor,
    Plant,
    FarmStructure,
    Unrecognized,
}

impl FallbackKind {
    pub fn of(path: &str) -> Self {
        if path.contains("sensor") {
            FallbackKind::Sensor
        } else if path.contains("plant") {
            FallbackKind::Plant
        } else if path.contains("farm-structure") {
            FallbackKind::FarmStructure
        } else {
            FallbackKind::Unrecognized
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, path: &str) -> Model {
        match FallbackKind::of(path) {
            FallbackKind::Sensor => sensor(path),
            FallbackKind::Plant => plant(),
            FallbackKind::FarmStructure => farm_structure(),
            FallbackKind::Unrecognized => {
                log::debug!("no placeholder rule for {path}, using an empty model");
                Model::empty(path)
            }
        }
    }
}

pub fn sensor_color(path: &str) -> Color {
    let hex = SENSOR_COLOR_RULES
        .iter()
        .find(|(needle, _)| path.contains(needle))
        .map_or(NEUTRAL_GRAY, |(_, hex)| *hex);
    Color::from_hex(hex)
}

fn sensor(path: &str) -> Model {
    Model::new(Node::drawable(
        "sensor",
        Geometry::Cuboid {
            width: SENSOR_SIZE,
            height: SENSOR_SIZE,
            depth: SENSOR_SIZE,
        },
        Material::standard(sensor_color(path)),
    ))
}

fn plant() -> Model {
    Model::new(Node::drawable(
        "plant",
        Geometry::Cylinder {
            radius_top: PLANT_RADIUS_TOP,
            radius_bottom: PLANT_RADIUS_BOTTOM,
            height: PLANT_HEIGHT,
        },
        Material::standard(Color::from_hex(PLANT_COLOR)),
    ))
}

fn farm_structure() -> Model {
    let total_height = LEVELS as f32 * LEVEL_HEIGHT;
    let mut root = Node::group("farm-structure");

    let corners = [
        (-HALF_SPAN, -HALF_SPAN),
        (HALF_SPAN, -HALF_SPAN),
        (-HALF_SPAN, HALF_SPAN),
        (HALF_SPAN, HALF_SPAN),
    ];
    for (i, (x, z)) in corners.into_iter().enumerate() {
        let pillar = Node::drawable(
            format!("pillar-{i}"),
            Geometry::Cylinder {
                radius_top: PILLAR_RADIUS,
                radius_bottom: PILLAR_RADIUS,
                height: total_height,
            },
            Material::standard(Color::from_hex(PILLAR_COLOR)),
        );
        // Cylinders are centered, lift them so they stand on the ground plane.
        root.add_child(pillar.with_position(x, total_height / 2.0, z));
    }

    for level in 0..LEVELS {
        let y = level as f32 * LEVEL_HEIGHT;
        for (side, x) in [("left", -HALF_SPAN), ("right", HALF_SPAN)] {
            let floor = Node::drawable(
                format!("floor-{level}-{side}"),
                Geometry::Cuboid {
                    width: FLOOR_SIZE,
                    height: FLOOR_THICKNESS,
                    depth: FLOOR_SIZE,
                },
                Material::standard(Color::from_hex(FLOOR_COLOR)).with_opacity(FLOOR_OPACITY),
            );
            root.add_child(floor.with_position(x, y, 0.0));
        }
    }

    Model::new(root)
}
