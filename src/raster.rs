use std::io::Cursor as IoCursor;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tiny_skia::{
    FillRule, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use crate::{
    composite::{premultiply_rgba8_in_place, unpremultiply_rgba8_in_place},
    error::{InkpadError, InkpadResult},
    model::{CanvasDocument, CanvasObject, ImageObject, PathObject},
    surface::StrokeSurface,
};

/// Ephemeral pixel layer used only while erasing. Allocated once per widget,
/// hidden by default; shown for the duration of an erase session and cleared
/// again after its content is flattened back into the surface.
#[derive(Debug)]
pub struct RasterOverlay {
    pixmap: Pixmap,
    visible: bool,
}

impl RasterOverlay {
    pub fn new(width: u32, height: u32) -> InkpadResult<Self> {
        let pixmap = Pixmap::new(width, height)
            .ok_or_else(|| InkpadError::raster("failed to allocate overlay pixel buffer"))?;
        Ok(Self {
            pixmap,
            visible: false,
        })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_mut()
    }

    /// Installs a freshly rasterized snapshot. The snapshot must match the
    /// overlay dimensions; the overlay never resizes after creation.
    pub fn replace_with(&mut self, snapshot: Pixmap) -> InkpadResult<()> {
        if snapshot.width() != self.width() || snapshot.height() != self.height() {
            return Err(InkpadError::raster("overlay snapshot size mismatch"));
        }
        self.pixmap = snapshot;
        Ok(())
    }

    pub fn clear_and_hide(&mut self) {
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.visible = false;
    }
}

/// Draws every visible object, in insertion order, into a fresh pixmap the
/// size of the surface.
pub fn rasterize(surface: &StrokeSurface) -> InkpadResult<Pixmap> {
    let mut pixmap = Pixmap::new(surface.width(), surface.height())
        .ok_or_else(|| InkpadError::raster("failed to allocate surface pixel buffer"))?;

    if let Some(bg) = surface.background() {
        pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
    }

    for entry in surface.objects() {
        if !entry.visible {
            continue;
        }
        match &entry.object {
            CanvasObject::Path(path) => draw_path_object(&mut pixmap, path),
            CanvasObject::Image(image) => draw_image_object(&mut pixmap, image)?,
        }
    }

    Ok(pixmap)
}

/// Convenience for rendering a persisted document outside a live widget.
pub fn rasterize_document(doc: &CanvasDocument) -> InkpadResult<Pixmap> {
    let mut surface = StrokeSurface::new(doc.width, doc.height)?;
    surface.load_document(doc)?;
    rasterize(&surface)
}

fn draw_path_object(pixmap: &mut Pixmap, path: &PathObject) {
    let Some(first) = path.points.first() else {
        return;
    };

    let mut paint = Paint::default();
    paint.set_color_rgba8(path.color.r, path.color.g, path.color.b, path.color.a);
    paint.anti_alias = true;

    if path.points.len() == 1 {
        // A click without movement renders as a dot of the brush radius.
        let mut pb = PathBuilder::new();
        pb.push_circle(
            first.x as f32,
            first.y as f32,
            (path.width / 2.0).max(0.5) as f32,
        );
        if let Some(dot) = pb.finish() {
            pixmap.fill_path(&dot, &paint, FillRule::Winding, Transform::identity(), None);
        }
        return;
    }

    let mut pb = PathBuilder::new();
    pb.move_to(first.x as f32, first.y as f32);
    for p in &path.points[1..] {
        pb.line_to(p.x as f32, p.y as f32);
    }
    let Some(skia_path) = pb.finish() else {
        return;
    };

    let stroke = Stroke {
        width: path.width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };
    pixmap.stroke_path(&skia_path, &paint, &stroke, Transform::identity(), None);
}

fn draw_image_object(pixmap: &mut Pixmap, image: &ImageObject) -> InkpadResult<()> {
    let decoded = decode_png_base64(&image.png_base64)?;
    if decoded.width() != image.width || decoded.height() != image.height {
        return Err(InkpadError::raster(format!(
            "embedded image decoded to {}x{}, document says {}x{}",
            decoded.width(),
            decoded.height(),
            image.width,
            image.height
        )));
    }
    pixmap.draw_pixmap(
        image.left.round() as i32,
        image.top.round() as i32,
        decoded.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Ok(())
}

/// Encodes a premultiplied pixmap as base64 PNG, the embedded-image payload
/// of the document format.
pub fn encode_pixmap_png_base64(pixmap: &Pixmap) -> InkpadResult<String> {
    let mut rgba = pixmap.data().to_vec();
    unpremultiply_rgba8_in_place(&mut rgba);

    let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| InkpadError::encode("pixmap byte length mismatch"))?;

    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut IoCursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| InkpadError::encode(format!("encode png: {e}")))?;

    Ok(BASE64.encode(&png))
}

/// Decodes a base64 PNG payload into a premultiplied pixmap.
pub fn decode_png_base64(payload: &str) -> InkpadResult<Pixmap> {
    let png = BASE64
        .decode(payload.trim())
        .map_err(|e| InkpadError::encode(format!("decode base64: {e}")))?;
    let rgba = image::load_from_memory(&png)
        .map_err(|e| InkpadError::encode(format!("decode png: {e}")))?
        .to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut data = rgba.into_raw();
    premultiply_rgba8_in_place(&mut data);

    let size = IntSize::from_wh(width, height)
        .ok_or_else(|| InkpadError::raster("embedded image has zero dimensions"))?;
    Pixmap::from_vec(data, size)
        .ok_or_else(|| InkpadError::raster("embedded image byte length mismatch"))
}
