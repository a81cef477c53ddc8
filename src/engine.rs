//! The per-map drawing context.
//!
//! An [`EngineContext`] owns everything one map instance needs: the
//! renderer, the geometry collaborators, the polygon store, the undo
//! history and the listeners. Two contexts never share state.

use tracing::{debug, info, trace, warn};

use crate::capture::Tracer;
use crate::config::Options;
use crate::debug::{COLOR_GREEN, COLOR_ORANGE};
use crate::edge::EdgeHandle;
use crate::editor::{dispatch_click, ClickAction, Drag};
use crate::error::ConfigError;
use crate::events::{ChangeKind, Event, Observers, SubscriptionId};
use crate::factory::{Admission, Factory, Scene};
use crate::geometry::{distinct_vertices, Clipper, Projection};
use crate::history::{History, Replay};
use crate::hull::{HullAlgorithm, HullRegistry};
use crate::merge::{self, MergeOutcome};
use crate::mode::Mode;
use crate::point::{GeoPoint, PlanePoint};
use crate::polygon::{LineageIds, Polygon, PolygonId};
use crate::renderer::MapRenderer;
use crate::store::PolygonStore;
use crate::{dbg_history, dbg_store, emit_info};

/// Keys the context reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Collects the collaborators of an [`EngineContext`].
pub struct EngineBuilder<R> {
    options: Options,
    renderer: Option<R>,
    clipper: Option<Box<dyn Clipper>>,
    hulls: HullRegistry,
}

impl<R: MapRenderer> EngineBuilder<R> {
    pub fn new(options: Options) -> Self {
        Self {
            options,
            renderer: None,
            clipper: None,
            hulls: HullRegistry::builtin(),
        }
    }

    pub fn renderer(mut self, renderer: R) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn clipper(mut self, clipper: impl Clipper + 'static) -> Self {
        self.clipper = Some(Box::new(clipper));
        self
    }

    /// Replaces the hull implementations on offer. Defaults to the
    /// built-in ones.
    pub fn hulls(mut self, hulls: HullRegistry) -> Self {
        self.hulls = hulls;
        self
    }

    pub fn build(self) -> Result<EngineContext<R>, ConfigError> {
        let EngineBuilder {
            options,
            renderer,
            clipper,
            mut hulls,
        } = self;
        let renderer = renderer.ok_or(ConfigError::MissingRenderer)?;
        let clipper = clipper.ok_or(ConfigError::MissingClipper)?;
        let hull = if options.concave_polygon() {
            let name = options.hull_algorithm();
            Some(
                hulls
                    .take(name)
                    .ok_or_else(|| ConfigError::MissingHull(name.to_string()))?,
            )
        } else {
            None
        };

        let initial = options.mode();
        let mut context = EngineContext {
            renderer,
            clipper,
            hull,
            options,
            mode: Mode::NONE,
            store: PolygonStore::default(),
            ids: LineageIds::default(),
            history: History::default(),
            tracer: None,
            drag: None,
            pending: None,
            observers: Observers::default(),
        };
        context.set_mode(initial);
        info!("engine: ready in mode {:?}", initial);
        Ok(context)
    }
}

pub struct EngineContext<R: MapRenderer> {
    renderer: R,
    clipper: Box<dyn Clipper>,
    hull: Option<Box<dyn HullAlgorithm>>,
    options: Options,
    mode: Mode,
    store: PolygonStore,
    ids: LineageIds,
    history: History,
    tracer: Option<Tracer>,
    drag: Option<Drag>,
    /// Edit notification held back until EDIT is switched off.
    pending: Option<ChangeKind>,
    observers: Observers,
}

impl<R: MapRenderer> EngineContext<R> {
    pub fn builder(options: Options) -> EngineBuilder<R> {
        EngineBuilder::new(options)
    }

    fn parts(&mut self) -> (Factory<'_>, Scene<'_, R>) {
        let factory = Factory::new(self.clipper.as_ref(), self.hull.as_deref(), &self.options);
        let scene = Scene {
            renderer: &mut self.renderer,
            store: &mut self.store,
            ids: &mut self.ids,
            edges_active: self.mode.contains(Mode::EDIT),
        };
        (factory, scene)
    }

    // ---- mode ----

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Switches to `mode` and reconfigures the map to match.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.drag.is_some() && !mode.contains(Mode::EDIT) {
            self.edge_drag_end();
        }
        if self.tracer.is_some() && !mode.contains(Mode::CREATE) {
            self.cancel();
        }

        let previous = self.mode;
        self.mode = mode;
        self.renderer.set_gestures(!mode.contains(Mode::CREATE));
        let edit = mode.contains(Mode::EDIT);
        self.store.for_each_mut(|polygon| polygon.set_edges_active(edit));
        self.renderer.set_mode_classes(&mode.classes());
        debug!("engine: mode {:?} -> {:?}", previous, mode);

        if !edit && self.options.notify_after_edit_exit() {
            if let Some(kind) = self.pending.take() {
                trace!("engine: flushing deferred {:?} notification", kind);
                self.emit_markers(kind);
            }
        }
        self.emit(Event::Mode(mode));
    }

    // ---- polygons ----

    /// Runs `points` through the full pipeline and the merge engine.
    /// Returns the lineages now on the map because of it: the new polygons,
    /// or the merge results that absorbed them.
    pub fn create(&mut self, points: &[GeoPoint]) -> Vec<PolygonId> {
        let before = self.store.len();
        let created = {
            let (factory, mut scene) = self.parts();
            factory.admit(&mut scene, points, Admission::user())
        };
        if created.is_empty() {
            return created;
        }

        let outcome = self.merge_pass(&created);
        let mut visible = Vec::with_capacity(created.len());
        for &id in &created {
            if outcome.as_ref().map_or(false, |o| o.removed.contains(&id)) {
                continue;
            }
            if let Some(polygon) = self.store.get(id) {
                self.history.record_create(polygon.snapshot());
                visible.push(id);
            }
        }
        if let Some(outcome) = &outcome {
            self.record_merge(outcome, &created);
            visible.extend(outcome.merged.iter().map(|merged| merged.id));
        }

        emit_info!(sty:COLOR_GREEN.bold(), fmt:"created {:?}" | visible);
        trace!("{:#?}", dbg_store!(&self.store));
        self.notify(ChangeKind::Create, before);
        visible
    }

    /// Removes one polygon and every trace of it in the history.
    pub fn remove(&mut self, id: PolygonId) -> bool {
        let before = self.store.len();
        if self.store.remove(id, &mut self.renderer).is_none() {
            return false;
        }
        if self.drag.map_or(false, |drag| drag.handle.polygon == id) {
            self.drag = None;
        }
        self.history.forget(id);
        self.history.invalidate_redo();
        info!("engine: removed {}", id);
        self.notify(ChangeKind::Remove, before);
        true
    }

    pub fn clear(&mut self) {
        let before = self.store.len();
        self.cancel();
        self.drag = None;
        self.pending = None;
        let removed = self.store.clear(&mut self.renderer);
        self.history.clear();
        info!("engine: cleared {} polygons", removed.len());
        self.notify(ChangeKind::Clear, before);
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.store.len()
    }

    pub fn all(&self) -> Vec<&Polygon> {
        self.store.all()
    }

    pub fn polygon(&self, id: PolygonId) -> Option<&Polygon> {
        self.store.get(id)
    }

    #[inline]
    pub fn store(&self) -> &PolygonStore {
        &self.store
    }

    #[inline]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    pub fn options(&self) -> &Options {
        &self.options
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    fn merge_pass(&mut self, triggers: &[PolygonId]) -> Option<MergeOutcome> {
        if !self.options.merge_polygons() || self.store.len() < 2 {
            return None;
        }
        let (factory, mut scene) = self.parts();
        merge::merge(&factory, &mut scene, triggers)
    }

    /// Records each merge result. A trigger with recorded states comes back
    /// as its last recorded state, which for an edit is the shape before
    /// the edit.
    fn record_merge(&mut self, outcome: &MergeOutcome, triggers: &[PolygonId]) {
        for merged in &outcome.merged {
            let mut replaced = merged.replaced.clone();
            for trigger in merged.absorbed.iter().filter(|id| triggers.contains(id)) {
                if let Some(previous) = self.history.last_state(*trigger) {
                    replaced.push(previous.clone());
                }
            }
            if let Some(polygon) = self.store.get(merged.id) {
                self.history.record_merge(polygon.snapshot(), replaced);
            }
        }
    }

    // ---- freehand capture ----

    #[inline]
    pub fn is_capturing(&self) -> bool {
        self.tracer.is_some()
    }

    pub fn pointer_down(&mut self, point: PlanePoint) -> bool {
        if !self.mode.contains(Mode::CREATE) || self.tracer.is_some() || self.drag.is_some() {
            return false;
        }
        self.tracer = Some(Tracer::begin(point, &mut self.renderer));
        true
    }

    pub fn pointer_move(&mut self, point: PlanePoint) {
        if let Some(tracer) = self.tracer.as_mut() {
            tracer.feed(point, &mut self.renderer);
        }
    }

    /// Ends the stroke and creates polygons from it.
    pub fn pointer_up(&mut self) -> Vec<PolygonId> {
        let tracer = match self.tracer.take() {
            Some(tracer) => tracer,
            None => return vec![],
        };
        let points = match tracer.finish(&mut self.renderer) {
            Some(points) => points,
            None => {
                debug!("engine: stroke too short, ignored");
                return vec![];
            }
        };
        let created = self.create(&points);
        if !created.is_empty() && self.options.leave_mode_after_create() {
            self.set_mode(self.mode & !Mode::CREATE);
        }
        created
    }

    /// Abandons the stroke in progress.
    pub fn cancel(&mut self) -> bool {
        match self.tracer.take() {
            Some(tracer) => {
                trace!("engine: stroke of {} points cancelled", tracer.len());
                let _ = tracer.finish(&mut self.renderer);
                true
            }
            None => false,
        }
    }

    pub fn key_down(&mut self, key: Key) -> bool {
        match key {
            Key::Escape => self.cancel(),
            Key::Other => false,
        }
    }

    // ---- edge editing ----

    pub fn edge_drag_start(&mut self, handle: EdgeHandle) -> bool {
        if !self.mode.contains(Mode::EDIT) || self.drag.is_some() || self.tracer.is_some() {
            return false;
        }
        let vertex = match self
            .store
            .get(handle.polygon)
            .and_then(|polygon| polygon.edge(handle.edge))
        {
            Some(edge) if edge.is_active() => edge.vertex,
            _ => {
                trace!("engine: stale or inactive handle {:?}", handle);
                return false;
            }
        };
        self.drag = Some(Drag {
            handle,
            vertex,
            moved: false,
        });
        true
    }

    pub fn edge_drag_move(&mut self, point: PlanePoint) -> bool {
        let mut drag = match self.drag {
            Some(drag) => drag,
            None => return false,
        };
        let target = self.renderer.to_geo(point);
        let polygon = match self.store.get_mut(drag.handle.polygon) {
            Some(polygon) => polygon,
            None => {
                self.drag = None;
                return false;
            }
        };
        if polygon.move_vertex(drag.vertex, target) {
            self.renderer.redraw_polygon(polygon);
            drag.moved = true;
        }
        self.drag = Some(drag);
        drag.moved
    }

    /// Commits the drag: the polygon gets fresh edges (or is rebuilt from
    /// scratch with `recreate_after_edit`), overlaps are merged and the
    /// new state is recorded.
    pub fn edge_drag_end(&mut self) -> bool {
        let drag = match self.drag.take() {
            Some(drag) if drag.moved => drag,
            _ => return false,
        };
        let lineage = drag.handle.polygon;
        let before = self.store.len();
        let edges_active = self.mode.contains(Mode::EDIT);

        let rebuilt = if self.options.recreate_after_edit() {
            let points = match self.store.remove(lineage, &mut self.renderer) {
                Some(polygon) => polygon.ring().to_vec(),
                None => return false,
            };
            let (factory, mut scene) = self.parts();
            factory.admit(&mut scene, &points, Admission::rebuild(lineage))
        } else {
            let degenerate = match self.store.get(lineage) {
                Some(polygon) => {
                    distinct_vertices(&self.renderer.ring_to_plane(polygon.ring())) < 3
                }
                None => return false,
            };
            if degenerate {
                self.store.remove(lineage, &mut self.renderer);
                vec![]
            } else {
                match self.store.get_mut(lineage) {
                    Some(polygon) => {
                        polygon.rebuild_edges(edges_active);
                        self.renderer.redraw_polygon(polygon);
                        vec![lineage]
                    }
                    None => return false,
                }
            }
        };

        if rebuilt.is_empty() {
            warn!("engine: edit collapsed {}, dropping it", lineage);
            self.history.forget(lineage);
            self.history.invalidate_redo();
            self.notify(ChangeKind::Remove, before);
            return true;
        }

        let first = self.merge_pass(&rebuilt);
        let mut survivors: Vec<PolygonId> = rebuilt
            .iter()
            .copied()
            .filter(|id| !first.as_ref().map_or(false, |o| o.removed.contains(id)))
            .collect();
        for &id in &survivors {
            if let Some(polygon) = self.store.get(id) {
                if id == lineage {
                    self.history.record_edit(polygon.snapshot());
                } else {
                    self.history.record_create(polygon.snapshot());
                }
            }
        }
        if let Some(outcome) = &first {
            self.record_merge(outcome, &rebuilt);
            let produced: Vec<PolygonId> = outcome.merged.iter().map(|m| m.id).collect();
            if let Some(second) = self.merge_pass(&produced) {
                self.record_merge(&second, &produced);
            }
        }
        survivors.retain(|id| self.store.contains(*id));

        emit_info!(sty:COLOR_ORANGE.bold(), fmt:"edited {} -> {:?}" | lineage, survivors);
        trace!("{:?}", dbg_history!(&self.history));
        self.notify_edit(before);
        true
    }

    /// A click on a polygon: deletes it or inserts a vertex, depending on
    /// the mode.
    pub fn polygon_click(&mut self, id: PolygonId, point: PlanePoint) -> ClickAction {
        let ring = match self.store.get(id) {
            Some(polygon) => self.renderer.ring_to_plane(polygon.ring()),
            None => return ClickAction::Ignore,
        };
        let action = dispatch_click(self.mode, id, &ring, point, self.options.elbow_distance());
        match action {
            ClickAction::Delete(id) => {
                self.remove(id);
            }
            ClickAction::Append { polygon, after } => self.append_vertex(polygon, after, point),
            ClickAction::Ignore => {}
        }
        action
    }

    fn append_vertex(&mut self, id: PolygonId, after: usize, point: PlanePoint) {
        let before = self.store.len();
        let vertex = self.renderer.to_geo(point);
        let edges_active = self.mode.contains(Mode::EDIT);
        let snapshot = match self.store.get_mut(id) {
            Some(polygon) => {
                polygon.insert_vertex(after, vertex, edges_active);
                self.renderer.redraw_polygon(polygon);
                polygon.snapshot()
            }
            None => return,
        };
        debug!("engine: appended {:?} to {} after vertex {}", vertex, id, after);
        self.history.record_edit(snapshot);
        self.notify_edit(before);
    }

    // ---- history ----

    pub fn undo(&mut self) -> bool {
        match self.history.undo() {
            Some(replay) => {
                self.replay(replay, ChangeKind::Undo);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.history.redo() {
            Some(replay) => {
                self.replay(replay, ChangeKind::Redo);
                true
            }
            None => false,
        }
    }

    fn replay(&mut self, replay: Replay, kind: ChangeKind) {
        let before = self.store.len();
        self.drag = None;
        for &id in &replay.remove {
            self.store.remove(id, &mut self.renderer);
        }
        {
            let (factory, mut scene) = self.parts();
            for snapshot in &replay.restore {
                factory.restore(&mut scene, snapshot);
            }
        }
        debug!(
            "engine: {:?} of {:?} removed {:?}, restored {}",
            kind,
            replay.lineage,
            replay.remove,
            replay.restore.len()
        );
        self.notify(kind, before);
    }

    // ---- notifications ----

    pub fn subscribe(&mut self, listener: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    /// Every live boundary as a closed ring.
    pub fn markers(&self) -> Vec<Vec<GeoPoint>> {
        self.store.all().iter().map(|polygon| polygon.closed_ring()).collect()
    }

    fn emit(&mut self, event: Event) {
        self.observers.emit(&event);
    }

    fn emit_markers(&mut self, kind: ChangeKind) {
        let rings = self.markers();
        self.emit(Event::Markers { rings, kind });
    }

    fn notify(&mut self, kind: ChangeKind, before: usize) {
        self.emit_markers(kind);
        self.emit_count(before);
    }

    fn notify_edit(&mut self, before: usize) {
        if self.options.notify_after_edit_exit() && self.mode.contains(Mode::EDIT) {
            trace!("engine: deferring edit notification");
            self.pending = Some(ChangeKind::Edit);
        } else {
            self.emit_markers(ChangeKind::Edit);
        }
        self.emit_count(before);
    }

    fn emit_count(&mut self, before: usize) {
        let after = self.store.len();
        if after != before {
            self.emit(Event::Count(after));
        }
    }

    /// Tears the context down and hands the renderer back with every layer
    /// removed and map gestures restored.
    pub fn detach(mut self) -> R {
        self.cancel();
        self.drag = None;
        self.store.clear(&mut self.renderer);
        self.history.clear();
        self.renderer.set_gestures(true);
        self.renderer.set_mode_classes(&Mode::NONE.classes());
        info!("engine: detached");
        self.renderer
    }
}
