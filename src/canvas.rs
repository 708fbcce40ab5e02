use kurbo::Point;

use crate::{
    color::Rgba8,
    error::InkpadResult,
    model::CanvasDocument,
    raster::RasterOverlay,
    session::{ErasePhase, EraseSession},
    surface::{ObjectId, StrokeSurface},
    tool::{Brush, Cursor, ToolMode},
};

/// Fixed widget height; the width comes from the measured container.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 300;

/// Receives one full document snapshot per content-affecting event. The note
/// store behind it persists immediately; debouncing is the caller's problem.
pub trait DocumentSink {
    fn save(&mut self, document: &str);
}

impl<F: FnMut(&str)> DocumentSink for F {
    fn save(&mut self, document: &str) {
        self(document)
    }
}

struct PersistenceBridge {
    sink: Box<dyn DocumentSink>,
}

impl PersistenceBridge {
    fn persist(&mut self, surface: &StrokeSurface) {
        match surface.to_document().to_json() {
            Ok(json) => self.sink.save(&json),
            Err(err) => tracing::warn!(%err, "skipping persistence of unserializable document"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    /// Pointer left the widget; treated as a release when a gesture is live.
    Leave,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub kind: PointerEventKind,
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            kind: PointerEventKind::Down,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            kind: PointerEventKind::Move,
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            kind: PointerEventKind::Up,
        }
    }

    pub fn leave(x: f64, y: f64) -> Self {
        Self {
            position: Point::new(x, y),
            kind: PointerEventKind::Leave,
        }
    }
}

/// A parsed document waiting to be applied. Carries the generation it was
/// issued under; a Clear in between invalidates it.
#[derive(Clone, Debug)]
pub struct PendingDocument {
    generation: u64,
    document: CanvasDocument,
}

/// The mountable drawing widget: a vector stroke surface, its erase overlay,
/// the two-mode tool controller, and the persistence bridge to the owning
/// note.
pub struct DrawingCanvas {
    surface: StrokeSurface,
    overlay: RasterOverlay,
    session: EraseSession,
    mode: ToolMode,
    brush: Brush,
    active_stroke: Option<Vec<Point>>,
    bridge: PersistenceBridge,
    generation: u64,
}

impl DrawingCanvas {
    /// Standard constructor: container width, fixed height. A malformed
    /// initial document is logged and treated as "start blank".
    pub fn new(
        container_width: u32,
        initial_document: Option<&str>,
        sink: impl DocumentSink + 'static,
    ) -> InkpadResult<Self> {
        Self::with_size(container_width, DEFAULT_CANVAS_HEIGHT, initial_document, sink)
    }

    pub fn with_size(
        width: u32,
        height: u32,
        initial_document: Option<&str>,
        sink: impl DocumentSink + 'static,
    ) -> InkpadResult<Self> {
        let surface = StrokeSurface::new(width, height)?;
        let overlay = RasterOverlay::new(width, height)?;
        let mut canvas = Self {
            surface,
            overlay,
            session: EraseSession::new(),
            mode: ToolMode::Draw,
            brush: Brush::default(),
            active_stroke: None,
            bridge: PersistenceBridge {
                sink: Box::new(sink),
            },
            generation: 0,
        };
        canvas.apply_mode();

        if let Some(json) = initial_document {
            match canvas.begin_load(json) {
                Ok(pending) => canvas.complete_load(pending),
                Err(err) => tracing::warn!(%err, "initial document unreadable, starting blank"),
            }
        }

        Ok(canvas)
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn cursor(&self) -> Cursor {
        self.surface.cursor()
    }

    pub fn brush(&self) -> Brush {
        self.brush
    }

    pub fn set_brush_color(&mut self, color: Rgba8) {
        self.brush.set_color(color);
    }

    pub fn set_brush_width(&mut self, width: f64) {
        self.brush.set_width(width);
    }

    pub fn surface(&self) -> &StrokeSurface {
        &self.surface
    }

    pub fn overlay(&self) -> &RasterOverlay {
        &self.overlay
    }

    pub fn erase_phase(&self) -> ErasePhase {
        self.session.phase()
    }

    pub fn session(&self) -> &EraseSession {
        &self.session
    }

    pub fn document(&self) -> CanvasDocument {
        self.surface.to_document()
    }

    /// Switches tools. Entering a mode only reconfigures interaction policy;
    /// leaving Erase with a gesture in flight flattens it first, so a session
    /// never outlives Erase mode.
    pub fn set_mode(&mut self, mode: ToolMode) {
        if mode == self.mode {
            return;
        }
        if self.mode == ToolMode::Erase && self.session.is_active() {
            self.finish_erase();
        }
        self.mode = mode;
        self.apply_mode();
    }

    fn apply_mode(&mut self) {
        match self.mode {
            ToolMode::Draw => self.surface.set_interaction(true, true, Cursor::Default),
            ToolMode::Erase => self.surface.set_interaction(false, false, Cursor::Crosshair),
        }
    }

    /// The single always-attached input handler: routing is decided here,
    /// per event, by the current tool mode.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match self.mode {
            ToolMode::Draw => self.handle_draw_pointer(event),
            ToolMode::Erase => self.handle_erase_pointer(event),
        }
    }

    fn handle_draw_pointer(&mut self, event: PointerEvent) {
        if !self.surface.drawing_enabled() {
            return;
        }
        match event.kind {
            PointerEventKind::Down => {
                self.active_stroke = Some(vec![event.position]);
            }
            PointerEventKind::Move => {
                if let Some(stroke) = &mut self.active_stroke {
                    stroke.push(event.position);
                }
            }
            PointerEventKind::Up | PointerEventKind::Leave => {
                self.commit_stroke();
            }
        }
    }

    fn commit_stroke(&mut self) {
        let Some(points) = self.active_stroke.take() else {
            return;
        };
        if points.is_empty() {
            return;
        }
        // Drawing over an unflattened erase overlay would desync the two
        // layers; restore the vector layer before committing new content.
        self.session.abandon_raster(&mut self.surface, &mut self.overlay);
        self.surface
            .add_path(points, self.brush.color(), self.brush.width());
        self.bridge.persist(&self.surface);
    }

    fn handle_erase_pointer(&mut self, event: PointerEvent) {
        let radius = self.brush.eraser_radius();
        let result = match event.kind {
            PointerEventKind::Down => self.session.pointer_down(
                &mut self.surface,
                &mut self.overlay,
                event.position,
                radius,
            ),
            PointerEventKind::Move => {
                self.session
                    .pointer_move(&mut self.overlay, event.position, radius)
            }
            PointerEventKind::Up | PointerEventKind::Leave => {
                self.finish_erase();
                return;
            }
        };
        if let Err(err) = result {
            tracing::warn!(%err, "erase input dropped");
        }
    }

    fn finish_erase(&mut self) {
        match self.session.pointer_up(&mut self.surface, &mut self.overlay) {
            Ok(true) => self.bridge.persist(&self.surface),
            Ok(false) => {}
            Err(err) => {
                tracing::warn!(%err, "flatten failed, erase result left uncommitted");
            }
        }
    }

    /// Moves a committed object, persisting on success. Disabled while the
    /// mode controller has selection off (i.e. in Erase mode).
    pub fn move_object(&mut self, id: ObjectId, dx: f64, dy: f64) -> bool {
        if self.surface.move_object(id, dx, dy) {
            self.bridge.persist(&self.surface);
            true
        } else {
            false
        }
    }

    /// Full reset: objects, background, overlay, rasterized flag. Bumps the
    /// generation so a stale pending load cannot resurrect cleared content,
    /// and persists the empty document.
    pub fn clear(&mut self) {
        self.surface.clear();
        self.overlay.clear_and_hide();
        self.session.reset();
        self.active_stroke = None;
        self.generation = self.generation.wrapping_add(1);
        self.bridge.persist(&self.surface);
    }

    /// First half of the deferred document load: parse and validate now,
    /// apply later. The returned handle is tied to the current generation.
    pub fn begin_load(&self, json: &str) -> InkpadResult<PendingDocument> {
        let document = CanvasDocument::from_json(json)?;
        Ok(PendingDocument {
            generation: self.generation,
            document,
        })
    }

    /// Second half: applies the parsed document unless the canvas was
    /// cleared since `begin_load`.
    pub fn complete_load(&mut self, pending: PendingDocument) {
        if pending.generation != self.generation {
            tracing::debug!("dropping stale document load");
            return;
        }
        if let Err(err) = self.surface.load_document(&pending.document) {
            tracing::warn!(%err, "pending document failed to apply, keeping current content");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_sink() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&str)) {
        let saved = Rc::new(RefCell::new(Vec::new()));
        let handle = saved.clone();
        (saved, move |doc: &str| {
            handle.borrow_mut().push(doc.to_string())
        })
    }

    #[test]
    fn draw_gesture_commits_one_path_and_persists() {
        let (saved, sink) = recording_sink();
        let mut canvas = DrawingCanvas::new(400, None, sink).unwrap();

        canvas.handle_pointer(PointerEvent::down(10.0, 10.0));
        canvas.handle_pointer(PointerEvent::moved(20.0, 12.0));
        canvas.handle_pointer(PointerEvent::up(30.0, 14.0));

        assert_eq!(canvas.surface().objects().len(), 1);
        assert_eq!(saved.borrow().len(), 1);
    }

    #[test]
    fn move_without_down_is_ignored() {
        let (saved, sink) = recording_sink();
        let mut canvas = DrawingCanvas::new(400, None, sink).unwrap();
        canvas.handle_pointer(PointerEvent::moved(20.0, 12.0));
        canvas.handle_pointer(PointerEvent::up(30.0, 14.0));
        assert!(canvas.surface().objects().is_empty());
        assert!(saved.borrow().is_empty());
    }

    #[test]
    fn brush_controls_clamp_to_slider_range() {
        let (_, sink) = recording_sink();
        let mut canvas = DrawingCanvas::new(400, None, sink).unwrap();
        assert_eq!(canvas.mode(), ToolMode::Draw);

        canvas.set_brush_width(100.0);
        assert_eq!(canvas.brush().width(), crate::tool::MAX_BRUSH_WIDTH);
        canvas.set_brush_color(crate::color::PALETTE[4]);
        assert_eq!(canvas.brush().color(), crate::color::PALETTE[4]);
    }

    #[test]
    fn malformed_initial_document_starts_blank() {
        let (_, sink) = recording_sink();
        let canvas = DrawingCanvas::new(400, Some("{\"garbage\":true}"), sink).unwrap();
        assert!(canvas.surface().objects().is_empty());
    }

    #[test]
    fn mode_switch_reconfigures_policy_without_touching_overlay() {
        let (_, sink) = recording_sink();
        let mut canvas = DrawingCanvas::new(400, None, sink).unwrap();

        canvas.set_mode(ToolMode::Erase);
        assert_eq!(canvas.cursor(), Cursor::Crosshair);
        assert!(!canvas.surface().drawing_enabled());
        assert!(!canvas.surface().selection_enabled());
        assert!(!canvas.overlay().is_visible());
        assert!(!canvas.session().rasterized());

        canvas.set_mode(ToolMode::Draw);
        assert_eq!(canvas.cursor(), Cursor::Default);
        assert!(canvas.surface().drawing_enabled());
    }

    #[test]
    fn clear_persists_empty_document() {
        let (saved, sink) = recording_sink();
        let mut canvas = DrawingCanvas::new(400, None, sink).unwrap();
        canvas.handle_pointer(PointerEvent::down(10.0, 10.0));
        canvas.handle_pointer(PointerEvent::up(10.0, 10.0));
        canvas.clear();

        assert!(canvas.surface().objects().is_empty());
        let last = saved.borrow().last().unwrap().clone();
        let doc = CanvasDocument::from_json(&last).unwrap();
        assert!(doc.objects.is_empty());
        assert!(doc.background.is_none());
    }
}
