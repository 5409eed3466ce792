//! HoverTooltip: the definition bubble shown over an annotation span

use serde::{Deserialize, Serialize};

use crate::config::GeometryConfig;

/// Viewport-relative position (CSS px)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Anchor that centers the entry surface in the viewport
    pub fn entry_anchor(&self, geometry: &GeometryConfig) -> Point {
        Point::new(
            self.width / 2.0 - geometry.entry_width / 2.0,
            self.height / 2.0 - geometry.entry_height / 2.0,
        )
    }
}

/// Place the tooltip below-right of the pointer, flipping left or up when
/// it would leave the viewport
pub fn place_tooltip(pointer: Point, viewport: Viewport, geometry: &GeometryConfig) -> Point {
    let mut x = pointer.x + geometry.tooltip_offset;
    let mut y = pointer.y + geometry.tooltip_offset;

    if x + geometry.tooltip_width > viewport.width {
        x = pointer.x - geometry.tooltip_flip_x;
    }
    if y + geometry.tooltip_height > viewport.height {
        y = pointer.y - geometry.tooltip_flip_y;
    }
    Point::new(x, y)
}

/// What should currently be on screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipView {
    pub definition: String,
    pub position: Point,
}

/// Single-instance tooltip state
#[derive(Debug, Clone, Default)]
pub struct HoverTooltip {
    geometry: GeometryConfig,
    current: Option<TooltipView>,
}

impl HoverTooltip {
    pub fn new(geometry: GeometryConfig) -> Self {
        Self {
            geometry,
            current: None,
        }
    }

    /// Show `definition` near the pointer, replacing any visible tooltip
    pub fn show(&mut self, definition: &str, pointer: Point, viewport: Viewport) -> &TooltipView {
        let view = TooltipView {
            definition: definition.to_string(),
            position: place_tooltip(pointer, viewport, &self.geometry),
        };
        self.current.insert(view)
    }

    /// Returns false if nothing was showing
    pub fn hide(&mut self) -> bool {
        self.current.take().is_some()
    }

    pub fn current(&self) -> Option<&TooltipView> {
        self.current.as_ref()
    }
}
