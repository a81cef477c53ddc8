use std::fmt;

use itertools::Itertools;
use procr_ansi_term::{Color, Style};

use crate::edge::Edge;
use crate::history::History;
use crate::point::{GeoPoint, PlanePoint};
use crate::polygon::{Polygon, PolygonId, Snapshot};
use crate::store::PolygonStore;

pub const COLOR_GREEN: Color = Color::Fixed(40);
pub const COLOR_BLUE: Color = Color::Fixed(27);
pub const COLOR_ORANGE: Color = Color::Fixed(208);

pub fn style_type_name() -> Style {
    Style::new().bold().fg(Color::Purple)
}

pub fn style_label() -> Style {
    Style::new().fg(Color::Yellow)
}

pub fn style_item() -> Style {
    Style::new().fg(Color::Cyan)
}

pub fn style_active() -> Style {
    Style::new().fg(COLOR_GREEN)
}

pub fn style_inactive() -> Style {
    Style::new().fg(COLOR_BLUE)
}

pub fn debug_with(
    f: impl Fn(&mut fmt::Formatter) -> fmt::Result,
) -> impl fmt::Debug {
    struct DebugWith<F>(F);

    impl<F> fmt::Debug for DebugWith<F>
    where
        F: Fn(&mut fmt::Formatter) -> fmt::Result,
    {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            self.0(f)
        }
    }

    DebugWith(f)
}

#[macro_export]
macro_rules! emit_info {
    (sty:$style:expr, msg:$msg:literal) => {
        tracing::info!("{}", $style.paint($msg));
    };
    (sty:$style:expr, fmt:$fmt:literal | $($rest:tt)+) => {
        tracing::info!("{}", $style.paint(format!($fmt, $($rest)*)));
    };
    (fmt:$fmt:literal | $($rest:tt)+) => {
        tracing::info!($fmt, $($rest)*);
    };
}

impl fmt::Debug for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@({}, {})", self.lat, self.lng)
    }
}

impl fmt::Debug for PlanePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#({}, {})", self.x, self.y)
    }
}

impl fmt::Debug for PolygonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Debug for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let style = if self.is_active() {
            style_active()
        } else {
            style_inactive()
        };
        write!(
            f,
            "{}",
            style.paint(format!(
                "E{}({}#{})",
                self.id.index(),
                self.polygon,
                self.vertex
            ))
        )
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Snapshot[{}]({} vertices, {} raw)",
            self.lineage,
            self.ring.len(),
            self.raw.len()
        )
    }
}

#[macro_export]
macro_rules! dbg_polygon {
    ($polygon:expr) => {
        $crate::debug::debug_with($crate::debug::debug_polygon($polygon))
    };
}

pub fn debug_polygon(
    polygon: &Polygon,
) -> impl Fn(&mut fmt::Formatter) -> fmt::Result + '_ {
    move |f| {
        write!(
            f,
            "{}{}",
            style_type_name().paint("Polygon"),
            style_label().paint(format!("[{}]", polygon.id()))
        )?;
        write!(
            f,
            " {} {}",
            style_item().paint(format!("{:?}", polygon.ring())),
            polygon.edges().map(|edge| format!("{:?}", edge)).join(" ")
        )
    }
}

impl fmt::Debug for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        debug_polygon(self)(f)
    }
}

#[macro_export]
macro_rules! dbg_store {
    ($store:expr) => {
        $crate::debug::debug_with($crate::debug::debug_store($store))
    };
}

pub fn debug_store(
    store: &PolygonStore,
) -> impl Fn(&mut fmt::Formatter) -> fmt::Result + '_ {
    move |f| {
        write!(f, "{}", style_type_name().paint("Store {"))?;
        for polygon in store.all() {
            write!(f, "\n    {:?}", dbg_polygon!(polygon))?;
        }
        if store.is_empty() {
            write!(f, "{}", style_type_name().paint("}"))
        } else {
            write!(f, "\n{}", style_type_name().paint("}"))
        }
    }
}

#[macro_export]
macro_rules! dbg_history {
    ($history:expr) => {
        $crate::debug::debug_with($crate::debug::debug_history($history))
    };
}

pub fn debug_history(
    history: &History,
) -> impl Fn(&mut fmt::Formatter) -> fmt::Result + '_ {
    move |f| {
        let stack = |ops: &[crate::history::Operation]| {
            ops.iter()
                .map(|op| format!("{}:{}", op.seq, op.lineage))
                .join(", ")
        };
        write!(
            f,
            "{} {}[{}] {}[{}]",
            style_type_name().paint("History"),
            style_label().paint("undo"),
            stack(history.undo_stack()),
            style_label().paint("redo"),
            stack(history.redo_stack())
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polygon::LineageIds;

    #[test]
    fn renders_a_store() {
        let mut store = PolygonStore::default();
        let mut renderer = crate::renderer::HeadlessRenderer::default();
        let id = LineageIds::default().allocate();
        let ring = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
        ];
        store.add(Polygon::new(id, ring.clone(), ring, true), &mut renderer);

        let rendered = format!("{:?}", dbg_store!(&store));
        assert!(rendered.contains("P0"));
        assert!(rendered.contains("@(1, 1)"));
        assert!(rendered.contains("E2(P0#2)"));
    }
}
