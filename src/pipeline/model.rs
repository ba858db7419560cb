//! Geometric plan model exchanged between the parse and reconstruct stages.

use serde::{Deserialize, Serialize};

fn default_layer() -> String {
    "0".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Line,
    Polyline,
}

/// One drawing entity of the source plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntity {
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default = "default_layer")]
    pub layer: String,
    pub vertices: Vec<Point2>,
    /// Polylines only: also connect the last vertex back to the first
    #[serde(default)]
    pub closed: bool,
}

impl PlanEntity {
    /// Straight segments drawn by this entity, in drawing order.
    pub fn segments(&self) -> Vec<(Point2, Point2)> {
        match self.kind {
            EntityKind::Line => match self.vertices.as_slice() {
                [a, b, ..] => vec![(*a, *b)],
                _ => Vec::new(),
            },
            EntityKind::Polyline => {
                let mut segments: Vec<(Point2, Point2)> =
                    self.vertices.windows(2).map(|w| (w[0], w[1])).collect();
                if self.closed && self.vertices.len() > 1 {
                    let first = self.vertices[0];
                    let last = self.vertices[self.vertices.len() - 1];
                    segments.push((last, first));
                }
                segments
            }
        }
    }
}

/// Parsed 2D plan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanModel {
    #[serde(default)]
    pub entities: Vec<PlanEntity>,
}
