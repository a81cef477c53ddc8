use geo::Coord;

/// A geographic coordinate, as handed out by the host map.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A point in the renderer's planar (pixel-like) space. Every geometric
/// algorithm in the crate works on these.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct PlanePoint {
    pub x: f64,
    pub y: f64,
}

impl PlanePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn dist_sq(&self, other: PlanePoint) -> f64 {
        let (dx, dy) = (self.x - other.x, self.y - other.y);
        dx * dx + dy * dy
    }

    #[inline]
    pub fn dist(&self, other: PlanePoint) -> f64 {
        self.dist_sq(other).sqrt()
    }

    /// Bit-exact key, for deduplicating vertices.
    #[inline]
    pub fn key(&self) -> (u64, u64) {
        (self.x.to_bits(), self.y.to_bits())
    }
}

impl From<PlanePoint> for Coord<f64> {
    fn from(p: PlanePoint) -> Self {
        Coord { x: p.x, y: p.y }
    }
}

impl From<Coord<f64>> for PlanePoint {
    fn from(c: Coord<f64>) -> Self {
        PlanePoint::new(c.x, c.y)
    }
}

impl From<(f64, f64)> for PlanePoint {
    fn from((x, y): (f64, f64)) -> Self {
        PlanePoint::new(x, y)
    }
}
