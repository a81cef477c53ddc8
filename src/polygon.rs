use std::fmt;

use id_arena::Arena;

use crate::edge::{Edge, EdgeId};
use crate::geometry::close_ring;
use crate::point::GeoPoint;

/// Lineage identifier. Survives edits and undo/redo of the same shape; a
/// merge always mints a new one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PolygonId(u32);

impl PolygonId {
    #[inline]
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Hands out fresh lineage ids for one engine context.
#[derive(Debug, Default)]
pub struct LineageIds {
    next: u32,
}

impl LineageIds {
    pub fn allocate(&mut self) -> PolygonId {
        let id = PolygonId(self.next);
        self.next += 1;
        id
    }
}

/// The state a polygon can be recreated from: its ring exactly as it was
/// displayed, plus the raw points that originally produced it.
#[derive(Clone, PartialEq)]
pub struct Snapshot {
    pub lineage: PolygonId,
    pub ring: Vec<GeoPoint>,
    pub raw: Vec<GeoPoint>,
}

/// A live polygon: an open ring of at least three distinct vertices and one
/// edge handle per vertex.
pub struct Polygon {
    id: PolygonId,
    ring: Vec<GeoPoint>,
    raw: Vec<GeoPoint>,
    edges: Arena<Edge>,
    edge_ids: Vec<EdgeId>,
}

impl Polygon {
    pub fn new(id: PolygonId, ring: Vec<GeoPoint>, raw: Vec<GeoPoint>, edges_active: bool) -> Self {
        let mut polygon = Self {
            id,
            ring,
            raw,
            edges: Arena::new(),
            edge_ids: Vec::new(),
        };
        polygon.rebuild_edges(edges_active);
        polygon
    }

    pub fn from_snapshot(snapshot: &Snapshot, edges_active: bool) -> Self {
        Self::new(
            snapshot.lineage,
            snapshot.ring.clone(),
            snapshot.raw.clone(),
            edges_active,
        )
    }

    #[inline]
    pub fn id(&self) -> PolygonId {
        self.id
    }

    /// Current vertices, without the closing point.
    #[inline]
    pub fn ring(&self) -> &[GeoPoint] {
        &self.ring
    }

    /// Current vertices with the first point repeated at the end.
    pub fn closed_ring(&self) -> Vec<GeoPoint> {
        close_ring(&self.ring)
    }

    #[inline]
    pub fn raw(&self) -> &[GeoPoint] {
        &self.raw
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.ring.len()
    }

    /// Edges in vertex order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edge_ids.iter().filter_map(|&id| self.edges.get(id))
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_ids.len()
    }

    /// Resolves an edge id; ids from before the last rebuild resolve to
    /// `None`.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn edge_at(&self, vertex: usize) -> Option<&Edge> {
        self.edge_ids.get(vertex).and_then(|&id| self.edges.get(id))
    }

    /// Throws away every edge and creates one per current vertex.
    pub fn rebuild_edges(&mut self, active: bool) {
        let mut edges = Arena::with_capacity(self.ring.len());
        let polygon = self.id;
        self.edge_ids = (0..self.ring.len())
            .map(|vertex| edges.alloc_with_id(|id| Edge::new(id, polygon, vertex, active)))
            .collect();
        self.edges = edges;
    }

    pub fn set_edges_active(&mut self, active: bool) {
        for &id in &self.edge_ids {
            if let Some(edge) = self.edges.get_mut(id) {
                edge.set_active(active);
            }
        }
    }

    /// Moves one vertex in place. Edges are left alone: they still map one
    /// to one onto the vertices.
    pub fn move_vertex(&mut self, vertex: usize, point: GeoPoint) -> bool {
        match self.ring.get_mut(vertex) {
            Some(slot) => {
                *slot = point;
                true
            }
            None => false,
        }
    }

    /// Inserts `point` between vertex `after` and its successor, then
    /// rebuilds the edges.
    pub fn insert_vertex(&mut self, after: usize, point: GeoPoint, edges_active: bool) {
        let at = (after + 1).min(self.ring.len());
        self.ring.insert(at, point);
        self.rebuild_edges(edges_active);
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            lineage: self.id,
            ring: self.ring.clone(),
            raw: self.raw.clone(),
        }
    }
}
