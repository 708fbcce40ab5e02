use kurbo::Point;

use crate::{
    composite::cut_circle_in_place,
    error::InkpadResult,
    model::ImageObject,
    raster::{self, RasterOverlay},
    surface::StrokeSurface,
};

/// Where an erase gesture currently stands. Rasterizing and Flattening are
/// passed through synchronously inside pointer handling; between events the
/// phase is either Idle or Cutting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ErasePhase {
    #[default]
    Idle,
    Rasterizing,
    Cutting,
    Flattening,
}

/// One pointer-down-to-pointer-up erase gesture over a widget's surface and
/// overlay. The pointer trail and the rasterized flag live here, per session
/// instance, so multiple widgets never share erase state.
#[derive(Debug, Default)]
pub struct EraseSession {
    phase: ErasePhase,
    last_point: Option<Point>,
    rasterized: bool,
}

impl EraseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> ErasePhase {
        self.phase
    }

    /// True between a pointer-down that started cutting and the matching
    /// release.
    pub fn is_active(&self) -> bool {
        self.phase == ErasePhase::Cutting
    }

    /// Whether the overlay currently mirrors the surface content. While true,
    /// further gestures skip re-rasterization.
    pub fn rasterized(&self) -> bool {
        self.rasterized
    }

    /// Full reset, used by Clear: the next gesture must re-rasterize.
    pub fn reset(&mut self) {
        self.phase = ErasePhase::Idle;
        self.last_point = None;
        self.rasterized = false;
    }

    /// Starts a gesture: rasterizes the surface into the overlay unless the
    /// overlay is already current, then applies the first cutout.
    pub fn pointer_down(
        &mut self,
        surface: &mut StrokeSurface,
        overlay: &mut RasterOverlay,
        at: Point,
        radius: f64,
    ) -> InkpadResult<()> {
        self.last_point = None;

        if !self.rasterized {
            self.phase = ErasePhase::Rasterizing;
            match self.rasterize(surface, overlay) {
                Ok(()) => {}
                Err(err) => {
                    self.phase = ErasePhase::Idle;
                    return Err(err);
                }
            }
        }

        self.phase = ErasePhase::Cutting;
        self.cut_towards(overlay, at, radius)
    }

    /// Extends the gesture. Movement before pointer-down, or after release,
    /// is ignored.
    pub fn pointer_move(
        &mut self,
        overlay: &mut RasterOverlay,
        to: Point,
        radius: f64,
    ) -> InkpadResult<()> {
        if self.phase != ErasePhase::Cutting {
            return Ok(());
        }
        self.cut_towards(overlay, to, radius)
    }

    /// Ends the gesture and flattens the overlay back into the surface.
    /// Returns whether a flatten was committed (callers persist on true).
    pub fn pointer_up(
        &mut self,
        surface: &mut StrokeSurface,
        overlay: &mut RasterOverlay,
    ) -> InkpadResult<bool> {
        if self.phase != ErasePhase::Cutting {
            return Ok(false);
        }

        self.phase = ErasePhase::Flattening;
        let result = self.flatten(surface, overlay);
        self.phase = ErasePhase::Idle;
        self.last_point = None;
        result.map(|()| true)
    }

    /// Discards an uncommitted rasterization, restoring the vector objects as
    /// the visible layer. Used when new vector content is about to be drawn
    /// over a surface whose erase result never managed to flatten.
    pub fn abandon_raster(&mut self, surface: &mut StrokeSurface, overlay: &mut RasterOverlay) {
        if !self.rasterized {
            return;
        }
        tracing::debug!("abandoning uncommitted erase raster");
        surface.set_all_visible(true);
        overlay.clear_and_hide();
        self.reset();
    }

    fn rasterize(
        &mut self,
        surface: &mut StrokeSurface,
        overlay: &mut RasterOverlay,
    ) -> InkpadResult<()> {
        let snapshot = raster::rasterize(surface)?;
        overlay.replace_with(snapshot)?;
        surface.set_all_visible(false);
        overlay.show();
        self.rasterized = true;
        tracing::debug!(
            width = overlay.width(),
            height = overlay.height(),
            "rasterized surface into erase overlay"
        );
        Ok(())
    }

    /// Applies cutouts from the previous trail point to `to`, subdividing the
    /// segment into steps of about half the cutout radius so fast pointer
    /// motion still leaves a continuous trail.
    fn cut_towards(
        &mut self,
        overlay: &mut RasterOverlay,
        to: Point,
        radius: f64,
    ) -> InkpadResult<()> {
        let width = overlay.width();
        let height = overlay.height();

        match self.last_point {
            Some(prev) => {
                let distance = prev.distance(to);
                let steps = ((distance / (radius / 2.0)).floor() as usize).max(1);
                for i in 0..=steps {
                    let t = i as f64 / steps as f64;
                    let p = prev.lerp(to, t);
                    cut_circle_in_place(overlay.data_mut(), width, height, p, radius)?;
                }
            }
            None => {
                cut_circle_in_place(overlay.data_mut(), width, height, to, radius)?;
            }
        }

        self.last_point = Some(to);
        Ok(())
    }

    /// Encodes the overlay first; only on success are the vector objects
    /// replaced by the flattened image. An encode failure leaves the overlay
    /// (and the rasterized flag) intact so nothing is lost.
    fn flatten(
        &mut self,
        surface: &mut StrokeSurface,
        overlay: &mut RasterOverlay,
    ) -> InkpadResult<()> {
        let png_base64 = raster::encode_pixmap_png_base64(overlay.pixmap())?;

        surface.clear();
        surface.add_image(ImageObject {
            left: 0.0,
            top: 0.0,
            width: overlay.width(),
            height: overlay.height(),
            png_base64,
            selectable: false,
            evented: false,
        });
        overlay.clear_and_hide();
        self.rasterized = false;
        tracing::debug!("flattened erase overlay into surface image");
        Ok(())
    }
}
