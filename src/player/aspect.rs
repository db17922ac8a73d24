use serde::Serialize;
use tracing::debug;

use super::types::{AspectShape, DisplayMode};

/// `|ratio - 1|` below this counts as square.
const SQUARE_TOLERANCE: f64 = 0.1;
/// Ratios below this are portrait.
const PORTRAIT_MAX_RATIO: f64 = 0.8;
/// Ratios above this are landscape.
const LANDSCAPE_MIN_RATIO: f64 = 1.5;

/// Bucket a natural size into an [`AspectShape`].
///
/// The bands are open intervals with `Auto` as the catch-all, so exact
/// boundary ratios (0.8, 0.9, 1.1, 1.5) fall through to whichever band the
/// strict comparison admits. A zero dimension means metadata is not there yet
/// and classifies as `Auto`.
pub fn classify(width: u32, height: u32) -> AspectShape {
    if width == 0 || height == 0 {
        return AspectShape::Auto;
    }

    let ratio = f64::from(width) / f64::from(height);

    if (ratio - 1.0).abs() < SQUARE_TOLERANCE {
        AspectShape::Square
    } else if ratio < PORTRAIT_MAX_RATIO {
        AspectShape::Portrait
    } else if ratio > LANDSCAPE_MIN_RATIO {
        AspectShape::Landscape
    } else {
        AspectShape::Auto
    }
}

/// Result of reconciling the user's preference with the media's own shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reconciled {
    pub effective: AspectShape,
    /// The renderer has to crop or letterbox to honour the preference.
    pub forced: bool,
}

/// Pure derivation; callers re-run it on every read instead of caching it so
/// preference changes show up without a new classification.
pub fn reconcile(shape: AspectShape, preference: DisplayMode) -> Reconciled {
    match preference.pinned_shape() {
        None => Reconciled {
            effective: shape,
            forced: false,
        },
        Some(pinned) => Reconciled {
            effective: pinned,
            forced: pinned != shape,
        },
    }
}

/// Holds the one classification made per loaded resource.
#[derive(Debug, Default)]
pub struct AspectClassifier {
    classified: Option<AspectShape>,
    natural_size: Option<(u32, u32)>,
}

impl AspectClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the natural size reported with a metadata notification.
    ///
    /// Only the first non-degenerate size is kept; later calls for the same
    /// resource leave the cached shape alone.
    pub fn observe(&mut self, width: u32, height: u32) -> AspectShape {
        if let Some(shape) = self.classified {
            return shape;
        }

        let shape = classify(width, height);
        if width > 0 && height > 0 {
            debug!("Classified {}x{} as {}", width, height, shape);
            self.classified = Some(shape);
            self.natural_size = Some((width, height));
        } else {
            debug!("Ignoring degenerate natural size {}x{}", width, height);
        }
        shape
    }

    /// Shape of the loaded resource, `Auto` until a real size was observed.
    pub fn shape(&self) -> AspectShape {
        self.classified.unwrap_or_default()
    }

    pub fn is_classified(&self) -> bool {
        self.classified.is_some()
    }

    pub fn natural_size(&self) -> Option<(u32, u32)> {
        self.natural_size
    }

    /// Forget the cached shape; called when a new resource is attached.
    pub fn reset(&mut self) {
        self.classified = None;
        self.natural_size = None;
    }
}
