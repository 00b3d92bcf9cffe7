//! Frame-by-frame sketch session.
//!
//! A [`Session`] owns everything that changes between frames: the strip
//! store, the camera controller, and the capture state. The caller
//! feeds it one [`FrameInput`] per frame and asks for a [`RenderFrame`]
//! to draw.

use glam::{DMat4, DVec3};

use crate::input::{FrameInput, InputController};
use crate::pipeline::Flattened;
use crate::store::StripStore;
use crate::types::{Rgb, SketchConfig, SketchError, Vertex};

/// Where the reference box sits in the world.
pub const REFERENCE_BOX_OFFSET: DVec3 = DVec3::new(0.0, 0.4, -3.0);

/// Near plane of the live perspective view.
pub const PERSPECTIVE_NEAR: f64 = 0.1;

/// Far plane of the live perspective view.
pub const PERSPECTIVE_FAR: f64 = 100.0;

/// Color of user-drawn points.
pub const STROKE_COLOR: Rgb = Rgb::WHITE;

/// Which projection the next frame uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    /// Free-look perspective.
    Live,
    /// Orthographic view of the unrolled drawing.
    Capture,
}

/// Result of one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Quit was requested.
    pub quit: bool,
    /// This frame shows a fresh unrolled drawing and should be saved.
    pub capture: bool,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    /// Strips to draw, floor first.
    pub store: &'a StripStore,
    /// Model transform of the reference box.
    pub world: DMat4,
    /// World to eye.
    pub view: DMat4,
    /// Eye to clip.
    pub projection: DMat4,
}

/// Mutable state of a running sketch.
#[derive(Debug, Clone)]
pub struct Session {
    config: SketchConfig,
    store: StripStore,
    controller: InputController,
    capture: Option<Flattened>,
    clear_pending: bool,
}

impl Session {
    /// Start an empty session.
    ///
    /// # Errors
    ///
    /// Returns [`SketchError::InvalidConfig`] if `config` fails
    /// validation.
    pub fn new(config: SketchConfig) -> Result<Self, SketchError> {
        config.validate()?;
        Ok(Self {
            controller: InputController::new(&config),
            store: StripStore::new(),
            capture: None,
            clear_pending: false,
            config,
        })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SketchConfig {
        &self.config
    }

    /// The drawing being built.
    #[must_use]
    pub const fn store(&self) -> &StripStore {
        &self.store
    }

    /// The camera controller.
    #[must_use]
    pub const fn controller(&self) -> &InputController {
        &self.controller
    }

    /// The most recent unroll, while it is on screen.
    #[must_use]
    pub const fn capture(&self) -> Option<&Flattened> {
        self.capture.as_ref()
    }

    /// Current projection mode.
    #[must_use]
    pub const fn view_mode(&self) -> ViewMode {
        if self.capture.is_some() {
            ViewMode::Capture
        } else {
            ViewMode::Live
        }
    }

    /// The store that gets drawn: the unrolled copy while capturing,
    /// the live drawing otherwise.
    #[must_use]
    pub fn displayed_store(&self) -> &StripStore {
        self.capture.as_ref().map_or(&self.store, |c| &c.store)
    }

    /// Advance one frame.
    pub fn frame(&mut self, input: &FrameInput) -> FrameOutcome {
        if self.clear_pending {
            tracing::debug!("clearing scene after capture");
            self.clear();
        }

        let intents = self.controller.update(input);
        let mut outcome = FrameOutcome {
            quit: intents.quit,
            capture: false,
        };

        if let Some(position) = intents.draw_point {
            self.add_point(position);
        }
        if intents.end_stroke {
            self.store.start_new_strip();
        }

        if intents.clear_scene {
            self.clear();
            return outcome;
        }

        if intents.flatten_and_save {
            if self.store.has_drawing() {
                self.capture = Some(crate::flatten(&self.store, &self.config));
                self.clear_pending = true;
                outcome.capture = true;
            } else {
                tracing::info!("flatten requested with nothing drawn, ignoring");
            }
        }

        outcome
    }

    /// Wipe the drawing and return the camera home.
    pub fn clear(&mut self) {
        self.store.reset();
        self.controller.reset();
        self.capture = None;
        self.clear_pending = false;
    }

    /// Matrices and strips for the current frame.
    #[must_use]
    pub fn render_frame(&self, aspect: f64) -> RenderFrame<'_> {
        let world = DMat4::from_translation(REFERENCE_BOX_OFFSET);
        let camera = self.controller.camera();
        let (view, projection) = match self.view_mode() {
            ViewMode::Live => (
                camera.pose().view_matrix(),
                DMat4::perspective_rh_gl(
                    self.config.field_of_view.to_radians(),
                    aspect,
                    PERSPECTIVE_NEAR,
                    PERSPECTIVE_FAR,
                ),
            ),
            ViewMode::Capture => {
                let eye = camera.home();
                let s = self.config.capture_scale;
                (
                    DMat4::look_at_rh(eye, eye + DVec3::NEG_Z, DVec3::Y),
                    DMat4::orthographic_rh_gl(-aspect * s, aspect * s, -s, s, 0.0, 1.0),
                )
            }
        };
        RenderFrame {
            store: self.displayed_store(),
            world,
            view,
            projection,
        }
    }

    fn add_point(&mut self, position: DVec3) {
        let active = self.store.active_index();
        let far_enough = self
            .store
            .last_point(active)
            .is_none_or(|last| last.position.distance(position) > self.config.min_sample_spacing);
        if !far_enough {
            return;
        }
        if let Err(e) = self
            .store
            .append_point(active, Vertex::new(position, STROKE_COLOR))
        {
            tracing::error!("dropping point: {e}");
        }
    }
}
