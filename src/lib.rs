#![forbid(unsafe_code)]

pub mod canvas;
pub mod color;
pub mod composite;
pub mod error;
pub mod model;
pub mod notes;
pub mod raster;
pub mod session;
pub mod share;
pub mod surface;
pub mod tool;

pub use canvas::{
    DEFAULT_CANVAS_HEIGHT, DocumentSink, DrawingCanvas, PendingDocument, PointerEvent,
    PointerEventKind,
};
pub use color::{DEFAULT_BRUSH_COLOR, PALETTE, Rgba8};
pub use error::{InkpadError, InkpadResult};
pub use model::{
    CanvasDocument, CanvasObject, DOCUMENT_VERSION, ImageObject, PathObject,
};
pub use notes::{Note, NoteItem, NoteItemKind, NoteStore, Notebook};
pub use raster::RasterOverlay;
pub use session::{ErasePhase, EraseSession};
pub use surface::{ObjectId, StrokeSurface, SurfaceObject};
pub use tool::{
    Brush, Cursor, DEFAULT_BRUSH_WIDTH, MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH, ToolMode,
};
