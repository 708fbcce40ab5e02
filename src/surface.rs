use kurbo::Point;

use crate::{
    color::Rgba8,
    error::{InkpadError, InkpadResult},
    model::{CanvasDocument, CanvasObject, ImageObject, PathObject},
    tool::Cursor,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

/// A drawable object on the surface. The `visible` flag is runtime state for
/// the erase handoff and is not part of the persisted document.
#[derive(Clone, Debug)]
pub struct SurfaceObject {
    pub id: ObjectId,
    pub object: CanvasObject,
    pub visible: bool,
}

/// Retained-mode vector layer: an ordered store of addressable strokes and
/// embedded images, plus the interaction policy the mode controller drives.
#[derive(Debug)]
pub struct StrokeSurface {
    width: u32,
    height: u32,
    background: Option<Rgba8>,
    objects: Vec<SurfaceObject>,
    next_id: u64,
    drawing_enabled: bool,
    selection_enabled: bool,
    cursor: Cursor,
}

impl StrokeSurface {
    pub fn new(width: u32, height: u32) -> InkpadResult<Self> {
        if width == 0 || height == 0 {
            return Err(InkpadError::validation("surface width/height must be > 0"));
        }
        Ok(Self {
            width,
            height,
            background: None,
            objects: Vec::new(),
            next_id: 0,
            drawing_enabled: true,
            selection_enabled: true,
            cursor: Cursor::Default,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> Option<Rgba8> {
        self.background
    }

    pub fn set_background(&mut self, background: Option<Rgba8>) {
        self.background = background;
    }

    pub fn objects(&self) -> &[SurfaceObject] {
        &self.objects
    }

    pub fn drawing_enabled(&self) -> bool {
        self.drawing_enabled
    }

    pub fn selection_enabled(&self) -> bool {
        self.selection_enabled
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Mode controller hook: flips free drawing, selection and cursor in one
    /// step. Has no other side effects.
    pub fn set_interaction(&mut self, drawing: bool, selection: bool, cursor: Cursor) {
        self.drawing_enabled = drawing;
        self.selection_enabled = selection;
        self.cursor = cursor;
    }

    pub fn add_path(&mut self, points: Vec<Point>, color: Rgba8, width: f64) -> ObjectId {
        self.push(CanvasObject::Path(PathObject {
            points,
            color,
            width,
        }))
    }

    pub fn add_image(&mut self, image: ImageObject) -> ObjectId {
        self.push(CanvasObject::Image(image))
    }

    fn push(&mut self, object: CanvasObject) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.push(SurfaceObject {
            id,
            object,
            visible: true,
        });
        id
    }

    pub fn remove(&mut self, id: ObjectId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != id);
        self.objects.len() != before
    }

    /// Nudges a committed object. Requires selection to be enabled and, for
    /// images, the object to be selectable. Returns whether anything moved.
    pub fn move_object(&mut self, id: ObjectId, dx: f64, dy: f64) -> bool {
        if !self.selection_enabled {
            return false;
        }
        let Some(entry) = self.objects.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        match &mut entry.object {
            CanvasObject::Path(path) => {
                for p in &mut path.points {
                    p.x += dx;
                    p.y += dy;
                }
                true
            }
            CanvasObject::Image(image) => {
                if !image.selectable {
                    return false;
                }
                image.left += dx;
                image.top += dy;
                true
            }
        }
    }

    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        let Some(entry) = self.objects.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        entry.visible = visible;
        true
    }

    pub fn set_all_visible(&mut self, visible: bool) {
        for object in &mut self.objects {
            object.visible = visible;
        }
    }

    /// Removes every object and the background color. Object ids are not
    /// reused across a clear.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.background = None;
    }

    pub fn to_document(&self) -> CanvasDocument {
        CanvasDocument {
            version: crate::model::DOCUMENT_VERSION,
            width: self.width,
            height: self.height,
            background: self.background,
            objects: self.objects.iter().map(|o| o.object.clone()).collect(),
        }
    }

    /// Replaces surface content with a validated document. The surface keeps
    /// its own dimensions; the document's are only recorded on save.
    pub fn load_document(&mut self, doc: &CanvasDocument) -> InkpadResult<()> {
        doc.validate()?;
        self.objects.clear();
        self.background = doc.background;
        for object in &doc.objects {
            self.push(object.clone());
        }
        Ok(())
    }
}
