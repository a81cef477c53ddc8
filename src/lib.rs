pub mod capture;
pub mod config;
pub mod debug;
pub mod edge;
pub mod editor;
pub mod engine;
pub mod error;
pub mod events;
pub mod factory;
pub mod geometry;
pub mod history;
pub mod hull;
pub mod merge;
pub mod mode;
pub mod point;
pub mod polygon;
pub mod renderer;
pub mod store;

pub use config::{Options, OptionsBuilder};
pub use edge::EdgeHandle;
pub use editor::ClickAction;
pub use engine::{EngineBuilder, EngineContext, Key};
pub use error::ConfigError;
pub use events::{ChangeKind, Event, SubscriptionId};
pub use geometry::{Clipper, GeoClipper, Projection};
pub use hull::{HullAlgorithm, HullRegistry};
pub use mode::Mode;
pub use point::{GeoPoint, PlanePoint};
pub use polygon::{Polygon, PolygonId};
pub use renderer::{HeadlessRenderer, MapRenderer};
