//! Axis-aligned rectangles and labeled regions.

/// Axis-aligned rectangle in pixel coordinates.
///
/// `x`/`y` is the top-left corner; the far edges `x + width` and
/// `y + height` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rect {
    /// Left edge.
    pub x: usize,
    /// Top edge.
    pub y: usize,
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
}

impl Rect {
    /// Creates a rectangle.
    pub const fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        self.width * self.height
    }

    /// Returns true when the rectangle covers no pixel.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Integer center `(x + width / 2, y + height / 2)`.
    pub fn center(&self) -> (usize, usize) {
        (self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Euclidean distance between the integer centers of two rectangles.
    pub fn center_distance(&self, other: &Rect) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        let dx = ax as f64 - bx as f64;
        let dy = ay as f64 - by as f64;
        dx.hypot(dy)
    }

    /// Returns true when the interiors of both rectangles overlap.
    ///
    /// Rectangles that only share an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        let x_overlap = self.x < other.right() && self.right() > other.x;
        let y_overlap = self.y < other.bottom() && self.bottom() > other.y;
        x_overlap && y_overlap
    }

    /// Smallest rectangle enclosing both inputs.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }

    /// Returns true when `other` lies entirely inside `self`.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns true when the pixel `(px, py)` lies inside.
    pub fn contains_point(&self, px: usize, py: usize) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Clips the rectangle to a `width x height` image.
    ///
    /// Returns `None` when nothing of the rectangle remains inside.
    pub fn clamp_to(&self, width: usize, height: usize) -> Option<Rect> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let right = self.right().min(width);
        let bottom = self.bottom().min(height);
        let clipped = Rect::new(self.x, self.y, right - self.x, bottom - self.y);
        (!clipped.is_empty()).then_some(clipped)
    }
}

/// A detected rectangle with optional metadata.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    /// Bounding box in source image coordinates.
    pub rect: Rect,
    /// Label, e.g. the color name for color detections.
    pub label: Option<String>,
    /// Fraction of mask pixels set inside the box, in `[0, 1]`.
    pub coverage: Option<f32>,
    /// Best normalized correlation among merged candidates.
    pub score: Option<f32>,
}

impl Region {
    /// Creates a region without metadata.
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            label: None,
            coverage: None,
            score: None,
        }
    }

    /// Attaches a label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Attaches a coverage fraction.
    pub fn with_coverage(mut self, coverage: f32) -> Self {
        self.coverage = Some(coverage);
        self
    }

    /// Attaches a match score.
    pub fn with_score(mut self, score: f32) -> Self {
        self.score = Some(score);
        self
    }
}
