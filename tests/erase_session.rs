use std::cell::RefCell;
use std::rc::Rc;

use inkpad::{CanvasDocument, CanvasObject, DrawingCanvas, PointerEvent, ToolMode, raster};
use kurbo::Point;

fn recording_canvas(width: u32) -> (Rc<RefCell<Vec<String>>>, DrawingCanvas) {
    let saved = Rc::new(RefCell::new(Vec::new()));
    let handle = saved.clone();
    let canvas = DrawingCanvas::new(width, None, move |doc: &str| {
        handle.borrow_mut().push(doc.to_string());
    })
    .unwrap();
    (saved, canvas)
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    p.distance(a.lerp(b, t))
}

#[test]
fn cutout_is_local_to_its_radius() {
    let (_, mut canvas) = recording_canvas(120);
    canvas.handle_pointer(PointerEvent::down(30.0, 50.0));
    canvas.handle_pointer(PointerEvent::moved(90.0, 50.0));
    canvas.handle_pointer(PointerEvent::up(90.0, 50.0));

    let reference = raster::rasterize_document(&canvas.document()).unwrap();

    canvas.set_brush_width(5.0); // cutout radius 10
    canvas.set_mode(ToolMode::Erase);
    let center = Point::new(60.0, 50.0);
    canvas.handle_pointer(PointerEvent::down(center.x, center.y));

    // Mid-gesture the overlay holds the snapshot with exactly one hole.
    let overlay = canvas.overlay().pixmap();
    for y in 0..overlay.height() {
        for x in 0..overlay.width() {
            let idx = ((y * overlay.width() + x) * 4) as usize;
            let actual = &overlay.data()[idx..idx + 4];
            let expected = &reference.data()[idx..idx + 4];
            let d = Point::new(x as f64 + 0.5, y as f64 + 0.5).distance(center);
            if d <= 10.0 {
                assert_eq!(actual, &[0, 0, 0, 0], "pixel ({x},{y}) inside cutout");
            } else {
                assert_eq!(actual, expected, "pixel ({x},{y}) outside cutout changed");
            }
        }
    }
}

#[test]
fn fast_motion_leaves_a_continuous_trail() {
    let (_, mut canvas) = recording_canvas(256);
    canvas.set_brush_width(20.0);
    canvas.handle_pointer(PointerEvent::down(10.0, 50.0));
    canvas.handle_pointer(PointerEvent::moved(240.0, 50.0));
    canvas.handle_pointer(PointerEvent::up(240.0, 50.0));

    canvas.set_brush_width(5.0); // cutout radius 10, step 5
    canvas.set_mode(ToolMode::Erase);
    let a = Point::new(20.0, 50.0);
    let b = Point::new(220.0, 50.0);
    // One giant movement sample: interpolation has to fill the gap.
    canvas.handle_pointer(PointerEvent::down(a.x, a.y));
    canvas.handle_pointer(PointerEvent::moved(b.x, b.y));
    canvas.handle_pointer(PointerEvent::up(b.x, b.y));

    let render = raster::rasterize_document(&canvas.document()).unwrap();
    for y in 40..60u32 {
        for x in 10..230u32 {
            let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            if segment_distance(p, a, b) <= 5.0 {
                assert_eq!(
                    render.pixel(x, y).unwrap().alpha(),
                    0,
                    "gap in erase trail at ({x},{y})"
                );
            }
        }
    }
}

#[test]
fn flatten_without_content_change_is_render_neutral() {
    let (_, mut canvas) = recording_canvas(400);
    canvas.handle_pointer(PointerEvent::down(50.0, 100.0));
    canvas.handle_pointer(PointerEvent::moved(120.0, 100.0));
    canvas.handle_pointer(PointerEvent::up(120.0, 100.0));

    let before = raster::rasterize_document(&canvas.document()).unwrap();

    // Gesture entirely over empty pixels, far from the stroke.
    canvas.set_mode(ToolMode::Erase);
    canvas.handle_pointer(PointerEvent::down(390.0, 290.0));
    canvas.handle_pointer(PointerEvent::up(390.0, 290.0));

    let doc = canvas.document();
    assert_eq!(doc.objects.len(), 1);
    assert!(matches!(doc.objects[0], CanvasObject::Image(_)));

    let after = raster::rasterize_document(&doc).unwrap();
    assert_eq!(before.data().len(), after.data().len());
    for (b, a) in before.data().chunks_exact(4).zip(after.data().chunks_exact(4)) {
        assert_eq!(b[3], a[3], "alpha drifted across flatten");
        for i in 0..3 {
            // PNG roundtrip unpremultiplies, so color may shift by one step.
            assert!((b[i] as i16 - a[i] as i16).abs() <= 1, "color drifted");
        }
    }
}

#[test]
fn clear_forces_the_next_gesture_to_rerasterize() {
    let (_, mut canvas) = recording_canvas(200);
    canvas.handle_pointer(PointerEvent::down(20.0, 20.0));
    canvas.handle_pointer(PointerEvent::up(20.0, 20.0));

    canvas.set_mode(ToolMode::Erase);
    canvas.handle_pointer(PointerEvent::down(20.0, 20.0));
    assert!(canvas.session().rasterized());
    canvas.handle_pointer(PointerEvent::up(20.0, 20.0));

    canvas.clear();
    assert!(!canvas.session().rasterized());

    canvas.set_mode(ToolMode::Draw);
    canvas.handle_pointer(PointerEvent::down(30.0, 30.0));
    canvas.handle_pointer(PointerEvent::up(30.0, 30.0));

    canvas.set_mode(ToolMode::Erase);
    canvas.handle_pointer(PointerEvent::down(30.0, 30.0));
    // Rasterizing ran again: overlay live, vector objects handed off.
    assert!(canvas.session().rasterized());
    assert!(canvas.overlay().is_visible());
    assert!(canvas.surface().objects().iter().all(|o| !o.visible));
}

#[test]
fn erasing_a_stroke_leaves_no_visible_ink() {
    let (saved, mut canvas) = recording_canvas(400);

    canvas.set_brush_color(inkpad::PALETTE[1]); // red
    canvas.set_brush_width(4.0);
    canvas.handle_pointer(PointerEvent::down(10.0, 50.0));
    canvas.handle_pointer(PointerEvent::moved(200.0, 50.0));
    canvas.handle_pointer(PointerEvent::up(200.0, 50.0));

    canvas.set_brush_width(5.0); // cutout radius 10
    canvas.set_mode(ToolMode::Erase);
    canvas.handle_pointer(PointerEvent::down(10.0, 50.0));
    canvas.handle_pointer(PointerEvent::moved(200.0, 50.0));
    canvas.handle_pointer(PointerEvent::up(200.0, 50.0));

    let last = saved.borrow().last().unwrap().clone();
    let doc = CanvasDocument::from_json(&last).unwrap();
    let render = raster::rasterize_document(&doc).unwrap();

    // The stroke was the only content and the gesture traced it fully.
    assert!(
        render.data().chunks_exact(4).all(|px| px[3] == 0),
        "visible ink survived the erase"
    );
}
