use id_arena::Id;

use crate::polygon::PolygonId;

/// Edge ids come from a per-polygon arena that is replaced on every
/// rebuild, so an id kept across a rebuild no longer resolves.
pub type EdgeId = Id<Edge>;

/// A draggable handle on one vertex of one polygon.
///
/// The owning polygon is referenced by lineage id only; it is resolved
/// through the store whenever the handle is used.
#[derive(Clone, Copy)]
pub struct Edge {
    pub id: EdgeId,
    pub polygon: PolygonId,
    pub vertex: usize,
    active: bool,
}

impl Edge {
    pub fn new(id: EdgeId, polygon: PolygonId, vertex: usize, active: bool) -> Self {
        Self {
            id,
            polygon,
            vertex,
            active,
        }
    }

    /// Whether the handle can currently be dragged (EDIT is on).
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    #[inline]
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    #[inline]
    pub fn handle(&self) -> EdgeHandle {
        EdgeHandle {
            polygon: self.polygon,
            edge: self.id,
        }
    }
}

/// What the host holds on to for a rendered edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgeHandle {
    pub polygon: PolygonId,
    pub edge: EdgeId,
}
