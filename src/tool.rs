use crate::color::{DEFAULT_BRUSH_COLOR, Rgba8};

/// Active tool. Draw routes pointer input to the native stroke engine,
/// Erase routes it to the erase session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolMode {
    #[default]
    Draw,
    Erase,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Cursor {
    #[default]
    Default,
    Crosshair,
}

pub const MIN_BRUSH_WIDTH: f64 = 1.0;
pub const MAX_BRUSH_WIDTH: f64 = 20.0;
pub const DEFAULT_BRUSH_WIDTH: f64 = 3.0;

/// Brush parameters shared by both modes: stroke color/width when drawing,
/// cutout radius (2x width) when erasing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    color: Rgba8,
    width: f64,
}

impl Brush {
    pub fn new(color: Rgba8, width: f64) -> Self {
        Self {
            color,
            width: width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH),
        }
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH);
    }

    pub fn eraser_radius(&self) -> f64 {
        self.width * 2.0
    }
}

impl Default for Brush {
    fn default() -> Self {
        Self::new(DEFAULT_BRUSH_COLOR, DEFAULT_BRUSH_WIDTH)
    }
}
