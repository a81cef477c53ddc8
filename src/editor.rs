//! Edge dragging and polygon-click dispatch.

use crate::edge::EdgeHandle;
use crate::geometry::nearest_segment;
use crate::mode::Mode;
use crate::point::PlanePoint;
use crate::polygon::PolygonId;

/// An edge handle being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Drag {
    pub handle: EdgeHandle,
    pub vertex: usize,
    pub moved: bool,
}

/// What a click on a polygon does, given the active mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClickAction {
    Delete(PolygonId),
    /// Insert the click point after vertex `after`.
    Append { polygon: PolygonId, after: usize },
    Ignore,
}

/// Decides between deleting the polygon and inserting a vertex.
///
/// DELETE alone deletes, APPEND alone inserts, and with both on the click
/// inserts only when it lands within `elbow_distance` of the boundary.
pub fn dispatch_click(
    mode: Mode,
    polygon: PolygonId,
    ring: &[PlanePoint],
    click: PlanePoint,
    elbow_distance: f64,
) -> ClickAction {
    let delete = mode.contains(Mode::DELETE);
    let append = mode.contains(Mode::APPEND);
    let insert = |nearest: Option<(usize, f64)>| match nearest {
        Some((after, _)) => ClickAction::Append { polygon, after },
        None => ClickAction::Ignore,
    };
    match (delete, append) {
        (true, true) => match nearest_segment(ring, click) {
            Some((_, distance)) if distance > elbow_distance => ClickAction::Delete(polygon),
            nearest => insert(nearest),
        },
        (true, false) => ClickAction::Delete(polygon),
        (false, true) => insert(nearest_segment(ring, click)),
        (false, false) => ClickAction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::LineageIds;

    fn square() -> Vec<PlanePoint> {
        vec![
            PlanePoint::new(0.0, 0.0),
            PlanePoint::new(100.0, 0.0),
            PlanePoint::new(100.0, 100.0),
            PlanePoint::new(0.0, 100.0),
        ]
    }

    #[test]
    fn dispatch_by_mode() {
        let id = LineageIds::default().allocate();
        let ring = square();
        let near_top = PlanePoint::new(50.0, 95.0);
        let center = PlanePoint::new(50.0, 50.0);

        assert_eq!(
            dispatch_click(Mode::DELETE, id, &ring, near_top, 10.0),
            ClickAction::Delete(id)
        );
        assert_eq!(
            dispatch_click(Mode::APPEND, id, &ring, center, 10.0),
            ClickAction::Append { polygon: id, after: 0 }
        );
        assert_eq!(
            dispatch_click(Mode::DELETE | Mode::APPEND, id, &ring, near_top, 10.0),
            ClickAction::Append { polygon: id, after: 2 }
        );
        assert_eq!(
            dispatch_click(Mode::DELETE | Mode::APPEND, id, &ring, center, 10.0),
            ClickAction::Delete(id)
        );
        assert_eq!(
            dispatch_click(Mode::EDIT | Mode::CREATE, id, &ring, center, 10.0),
            ClickAction::Ignore
        );
    }
}
