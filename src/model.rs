use kurbo::Point;

use crate::{
    color::Rgba8,
    error::{InkpadError, InkpadResult},
};

/// Current canvas document schema version. Bumped on incompatible changes.
pub const DOCUMENT_VERSION: u32 = 1;

/// Serialized snapshot of a stroke surface: ordered drawable objects plus
/// surface-level properties. This is the unit of persistence and sharing.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct CanvasDocument {
    pub version: u32,
    pub width: u32,
    pub height: u32,
    pub background: Option<Rgba8>,
    pub objects: Vec<CanvasObject>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasObject {
    Path(PathObject),
    Image(ImageObject),
}

/// A committed freehand stroke: the pointer samples of one draw gesture.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct PathObject {
    pub points: Vec<Point>,
    pub color: Rgba8,
    pub width: f64,
}

/// An embedded raster image, e.g. the flattened result of an erase session.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ImageObject {
    pub left: f64,
    pub top: f64,
    pub width: u32,
    pub height: u32,
    pub png_base64: String,
    pub selectable: bool,
    pub evented: bool,
}

impl CanvasDocument {
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            version: DOCUMENT_VERSION,
            width,
            height,
            background: None,
            objects: Vec::new(),
        }
    }

    pub fn validate(&self) -> InkpadResult<()> {
        if self.version != DOCUMENT_VERSION {
            return Err(InkpadError::document(format!(
                "unsupported document version {} (expected {DOCUMENT_VERSION})",
                self.version
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(InkpadError::validation(
                "document width/height must be > 0",
            ));
        }

        for (index, object) in self.objects.iter().enumerate() {
            match object {
                CanvasObject::Path(path) => {
                    if path.points.is_empty() {
                        return Err(InkpadError::validation(format!(
                            "path object {index} has no points"
                        )));
                    }
                    if !(path.width > 0.0) {
                        return Err(InkpadError::validation(format!(
                            "path object {index} has non-positive stroke width"
                        )));
                    }
                }
                CanvasObject::Image(image) => {
                    if image.width == 0 || image.height == 0 {
                        return Err(InkpadError::validation(format!(
                            "image object {index} has zero dimensions"
                        )));
                    }
                    if image.png_base64.is_empty() {
                        return Err(InkpadError::validation(format!(
                            "image object {index} has empty pixel data"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    pub fn to_json(&self) -> InkpadResult<String> {
        serde_json::to_string(self)
            .map_err(|e| InkpadError::document(format!("serialize document: {e}")))
    }

    /// Parses and validates. Malformed or foreign-schema input is a document
    /// error; callers at the widget boundary treat it as "no prior content".
    pub fn from_json(json: &str) -> InkpadResult<Self> {
        let doc: Self = serde_json::from_str(json)
            .map_err(|e| InkpadError::document(format!("parse document: {e}")))?;
        doc.validate()?;
        Ok(doc)
    }
}
