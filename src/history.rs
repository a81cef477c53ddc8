//! Undo/redo bookkeeping.
//!
//! The history never touches the store itself. [`History::undo`] and
//! [`History::redo`] hand back a [`Replay`]: which polygons to take off the
//! map and which recorded states to put back. The engine applies it without
//! recording anything new.

use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::polygon::{PolygonId, Snapshot};

/// One entry on the undo or redo stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Operation {
    pub seq: u64,
    pub lineage: PolygonId,
}

/// What applying an undo or redo step means for the store.
#[derive(Clone, Default)]
pub struct Replay {
    pub lineage: Option<PolygonId>,
    pub remove: Vec<PolygonId>,
    pub restore: Vec<Snapshot>,
}

#[derive(Default)]
pub struct History {
    undo: Vec<Operation>,
    redo: Vec<Operation>,
    states: HashMap<PolygonId, Vec<Snapshot>>,
    redo_states: HashMap<PolygonId, Vec<Snapshot>>,
    merged: HashMap<PolygonId, Vec<Snapshot>>,
    next_seq: u64,
}

impl History {
    fn push_operation(&mut self, lineage: PolygonId) {
        let operation = Operation {
            seq: self.next_seq,
            lineage,
        };
        self.next_seq += 1;
        self.undo.push(operation);
    }

    /// A new timeline branch: nothing that was undone can be redone.
    /// Merge records only the dropped operations could reach go with them.
    pub fn invalidate_redo(&mut self) {
        if self.redo.is_empty() {
            return;
        }
        trace!("history: dropping {} redo operations", self.redo.len());
        self.redo.clear();
        self.redo_states.clear();

        let reachable: HashSet<PolygonId> = self.undo.iter().map(|op| op.lineage).collect();
        self.merged.retain(|lineage, _| reachable.contains(lineage));
        self.states
            .retain(|lineage, stack| !stack.is_empty() || reachable.contains(lineage));
    }

    /// A brand-new polygon.
    pub fn record_create(&mut self, snapshot: Snapshot) {
        debug!("history: create {}", snapshot.lineage);
        self.invalidate_redo();
        self.push_operation(snapshot.lineage);
        self.states.entry(snapshot.lineage).or_default().push(snapshot);
    }

    /// A new state of an existing lineage.
    pub fn record_edit(&mut self, snapshot: Snapshot) {
        debug!("history: edit {}", snapshot.lineage);
        self.invalidate_redo();
        self.push_operation(snapshot.lineage);
        self.states.entry(snapshot.lineage).or_default().push(snapshot);
    }

    /// A polygon produced by a merge, remembering what it replaced so an
    /// undo can bring those back.
    pub fn record_merge(&mut self, snapshot: Snapshot, replaced: Vec<Snapshot>) {
        debug!(
            "history: merge {} replacing {:?}",
            snapshot.lineage,
            replaced.iter().map(|s| s.lineage).collect::<Vec<_>>()
        );
        self.invalidate_redo();
        self.push_operation(snapshot.lineage);
        self.merged.insert(snapshot.lineage, replaced);
        self.states.insert(snapshot.lineage, vec![snapshot]);
    }

    /// Most recent recorded state of a lineage.
    pub fn last_state(&self, lineage: PolygonId) -> Option<&Snapshot> {
        self.states.get(&lineage).and_then(|stack| stack.last())
    }

    pub fn merged(&self, lineage: PolygonId) -> Option<&[Snapshot]> {
        self.merged.get(&lineage).map(Vec::as_slice)
    }

    /// Drops every trace of a lineage, for polygons the user deleted. A
    /// merge lineage takes the lineages it absorbed with it.
    pub fn forget(&mut self, lineage: PolygonId) {
        let mut pending = vec![lineage];
        let mut seen = HashSet::new();
        while let Some(lineage) = pending.pop() {
            if !seen.insert(lineage) {
                continue;
            }
            debug!("history: forget {}", lineage);
            self.undo.retain(|op| op.lineage != lineage);
            self.redo.retain(|op| op.lineage != lineage);
            self.states.remove(&lineage);
            self.redo_states.remove(&lineage);
            if let Some(replaced) = self.merged.remove(&lineage) {
                pending.extend(replaced.iter().map(|s| s.lineage));
            }
        }
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.states.clear();
        self.redo_states.clear();
        self.merged.clear();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_stack(&self) -> &[Operation] {
        &self.undo
    }

    pub fn redo_stack(&self) -> &[Operation] {
        &self.redo
    }

    pub fn undo(&mut self) -> Option<Replay> {
        let operation = self.undo.pop()?;
        self.redo.push(operation);
        let lineage = operation.lineage;

        let stack = self.states.entry(lineage).or_default();
        if let Some(undone) = stack.pop() {
            self.redo_states.entry(lineage).or_default().push(undone);
        }
        let restore = match stack.last() {
            Some(previous) => vec![previous.clone()],
            None => self.merged.get(&lineage).cloned().unwrap_or_default(),
        };
        debug!(
            "history: undo {} restores {:?}",
            lineage,
            restore.iter().map(|s| s.lineage).collect::<Vec<_>>()
        );
        Some(Replay {
            lineage: Some(lineage),
            remove: vec![lineage],
            restore,
        })
    }

    pub fn redo(&mut self) -> Option<Replay> {
        let operation = self.redo.pop()?;
        self.undo.push(operation);
        let lineage = operation.lineage;

        let displayed = self.states.get(&lineage).map_or(false, |stack| !stack.is_empty());
        let remove = if displayed {
            vec![lineage]
        } else {
            self.merged
                .get(&lineage)
                .map(|replaced| replaced.iter().map(|s| s.lineage).collect())
                .unwrap_or_default()
        };
        let restore = match self.redo_states.get_mut(&lineage).and_then(Vec::pop) {
            Some(next) => {
                self.states.entry(lineage).or_default().push(next.clone());
                vec![next]
            }
            None => vec![],
        };
        debug!("history: redo {} removes {:?}", lineage, remove);
        Some(Replay {
            lineage: Some(lineage),
            remove,
            restore,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::GeoPoint;
    use crate::polygon::LineageIds;

    fn snapshot(lineage: PolygonId, size: f64) -> Snapshot {
        let ring = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, size),
            GeoPoint::new(size, size),
        ];
        Snapshot {
            lineage,
            ring: ring.clone(),
            raw: ring,
        }
    }

    fn disjoint(history: &History) -> bool {
        history
            .undo_stack()
            .iter()
            .all(|op| !history.redo_stack().contains(op))
    }

    #[test]
    fn undo_of_a_create_restores_nothing() {
        let mut ids = LineageIds::default();
        let a = ids.allocate();
        let mut history = History::default();
        history.record_create(snapshot(a, 1.0));

        let replay = history.undo().unwrap();
        assert_eq!(replay.remove, vec![a]);
        assert!(replay.restore.is_empty());
        assert!(!history.can_undo());
        assert!(history.undo().is_none());

        let replay = history.redo().unwrap();
        assert!(replay.remove.is_empty());
        assert_eq!(replay.restore, vec![snapshot(a, 1.0)]);
        assert!(history.redo().is_none());
    }

    #[test]
    fn undo_of_an_edit_restores_the_previous_state() {
        let mut ids = LineageIds::default();
        let a = ids.allocate();
        let mut history = History::default();
        history.record_create(snapshot(a, 1.0));
        history.record_edit(snapshot(a, 2.0));

        let replay = history.undo().unwrap();
        assert_eq!(replay.remove, vec![a]);
        assert_eq!(replay.restore, vec![snapshot(a, 1.0)]);
        assert!(disjoint(&history));

        let replay = history.redo().unwrap();
        assert_eq!(replay.remove, vec![a]);
        assert_eq!(replay.restore, vec![snapshot(a, 2.0)]);
        assert_eq!(history.last_state(a), Some(&snapshot(a, 2.0)));
    }

    #[test]
    fn undo_of_a_merge_brings_back_the_originals() {
        let mut ids = LineageIds::default();
        let (a, m) = (ids.allocate(), ids.allocate());
        let mut history = History::default();
        history.record_create(snapshot(a, 1.0));
        history.record_merge(snapshot(m, 3.0), vec![snapshot(a, 1.0)]);

        let replay = history.undo().unwrap();
        assert_eq!(replay.remove, vec![m]);
        assert_eq!(replay.restore, vec![snapshot(a, 1.0)]);
        // Kept for the redo.
        assert_eq!(history.merged(m).map(<[Snapshot]>::len), Some(1));

        let replay = history.redo().unwrap();
        assert_eq!(replay.remove, vec![a]);
        assert_eq!(replay.restore, vec![snapshot(m, 3.0)]);
        assert!(disjoint(&history));
    }

    #[test]
    fn new_records_invalidate_redo() {
        let mut ids = LineageIds::default();
        let (a, b) = (ids.allocate(), ids.allocate());
        let mut history = History::default();
        history.record_create(snapshot(a, 1.0));
        history.undo();
        assert!(history.can_redo());
        history.record_create(snapshot(b, 1.0));
        assert!(!history.can_redo());
        assert!(history.redo().is_none());
    }

    #[test]
    fn forget_purges_a_lineage() {
        let mut ids = LineageIds::default();
        let (a, b) = (ids.allocate(), ids.allocate());
        let mut history = History::default();
        history.record_create(snapshot(a, 1.0));
        history.record_create(snapshot(b, 1.0));
        history.record_edit(snapshot(a, 2.0));
        history.forget(a);
        assert_eq!(history.undo_stack().len(), 1);
        assert_eq!(history.undo_stack()[0].lineage, b);
        assert!(history.last_state(a).is_none());
    }

    #[test]
    fn forgetting_a_merge_forgets_what_it_absorbed() {
        let mut ids = LineageIds::default();
        let (a, b, m, c) = (ids.allocate(), ids.allocate(), ids.allocate(), ids.allocate());
        let mut history = History::default();
        history.record_create(snapshot(a, 1.0));
        history.record_create(snapshot(c, 5.0));
        history.record_merge(snapshot(m, 3.0), vec![snapshot(a, 1.0), snapshot(b, 2.0)]);

        history.forget(m);
        assert_eq!(history.undo_stack().len(), 1);
        assert_eq!(history.undo_stack()[0].lineage, c);
        assert!(history.merged(m).is_none());
        assert!(history.last_state(a).is_none());
    }

    #[test]
    fn dropped_redo_prunes_unreachable_merges() {
        let mut ids = LineageIds::default();
        let (a, m, b) = (ids.allocate(), ids.allocate(), ids.allocate());
        let mut history = History::default();
        history.record_create(snapshot(a, 1.0));
        history.record_merge(snapshot(m, 3.0), vec![snapshot(a, 1.0)]);
        history.undo();
        assert!(history.merged(m).is_some());

        history.record_create(snapshot(b, 1.0));
        assert!(history.merged(m).is_none());
        assert!(history.last_state(m).is_none());
        assert_eq!(history.last_state(a), Some(&snapshot(a, 1.0)));
    }
}
