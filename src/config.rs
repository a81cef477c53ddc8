//! Engine options.
//!
//! [`Options`] is immutable once built; a running engine never changes its
//! options. To run with different options, build a new engine.

use tracing::warn;

use crate::error::ConfigError;
use crate::hull::{self, CONCAVE};
use crate::mode::Mode;

pub const DEFAULT_SIMPLIFY_FACTOR: f64 = 1.1;
pub const DEFAULT_ELBOW_DISTANCE: f64 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Options {
    mode: Mode,
    merge_polygons: bool,
    concave_polygon: bool,
    hull_algorithm: &'static str,
    simplify_factor: f64,
    elbow_distance: f64,
    maximum_polygons: usize,
    notify_after_edit_exit: bool,
    recreate_after_edit: bool,
    leave_mode_after_create: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            mode: Mode::ALL,
            merge_polygons: true,
            concave_polygon: true,
            hull_algorithm: CONCAVE,
            simplify_factor: DEFAULT_SIMPLIFY_FACTOR,
            elbow_distance: DEFAULT_ELBOW_DISTANCE,
            maximum_polygons: usize::MAX,
            notify_after_edit_exit: false,
            recreate_after_edit: false,
            leave_mode_after_create: false,
        }
    }
}

impl Options {
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }

    /// Initial mode mask.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn merge_polygons(&self) -> bool {
        self.merge_polygons
    }

    /// Whether hull reduction runs on user-created strokes.
    pub fn concave_polygon(&self) -> bool {
        self.concave_polygon
    }

    pub fn hull_algorithm(&self) -> &'static str {
        self.hull_algorithm
    }

    /// Simplification tolerance, in plane units.
    pub fn simplify_factor(&self) -> f64 {
        self.simplify_factor
    }

    /// Plane distance under which a click in `DELETE | APPEND` inserts a
    /// vertex instead of deleting.
    pub fn elbow_distance(&self) -> f64 {
        self.elbow_distance
    }

    pub fn maximum_polygons(&self) -> usize {
        self.maximum_polygons
    }

    pub fn notify_after_edit_exit(&self) -> bool {
        self.notify_after_edit_exit
    }

    pub fn recreate_after_edit(&self) -> bool {
        self.recreate_after_edit
    }

    pub fn leave_mode_after_create(&self) -> bool {
        self.leave_mode_after_create
    }
}

#[derive(Clone, Debug, Default)]
pub struct OptionsBuilder {
    options: Options,
}

impl OptionsBuilder {
    pub fn mode(mut self, mode: Mode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn merge_polygons(mut self, on: bool) -> Self {
        self.options.merge_polygons = on;
        self
    }

    pub fn concave_polygon(mut self, on: bool) -> Self {
        self.options.concave_polygon = on;
        self
    }

    /// Selects a hull algorithm by name. An unknown name leaves the current
    /// selection in place.
    pub fn hull_algorithm(mut self, name: &str) -> Self {
        match hull::KNOWN_HULLS.get(name) {
            Some(&known) => self.options.hull_algorithm = known,
            None => warn!(
                "unknown hull algorithm `{}`, keeping `{}`",
                name, self.options.hull_algorithm
            ),
        }
        self
    }

    pub fn simplify_factor(mut self, factor: f64) -> Self {
        self.options.simplify_factor = factor;
        self
    }

    pub fn elbow_distance(mut self, distance: f64) -> Self {
        self.options.elbow_distance = distance;
        self
    }

    pub fn maximum_polygons(mut self, maximum: usize) -> Self {
        self.options.maximum_polygons = maximum;
        self
    }

    pub fn notify_after_edit_exit(mut self, on: bool) -> Self {
        self.options.notify_after_edit_exit = on;
        self
    }

    pub fn recreate_after_edit(mut self, on: bool) -> Self {
        self.options.recreate_after_edit = on;
        self
    }

    pub fn leave_mode_after_create(mut self, on: bool) -> Self {
        self.options.leave_mode_after_create = on;
        self
    }

    pub fn build(self) -> Result<Options, ConfigError> {
        let options = self.options;
        non_negative("simplify_factor", options.simplify_factor)?;
        non_negative("elbow_distance", options.elbow_distance)?;
        Ok(options)
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidOption {
            name,
            reason: format!("expected a finite, non-negative number, got {}", value),
        })
    }
}
