pub mod analysis;
pub mod engine;
pub mod layout;
pub mod report;
pub mod rng;
pub mod scenario;
pub mod spatial;
pub mod systems;
pub mod world;

pub use analysis::{analyze, Area, AreaError, AreaReport, RegionTotals};
pub use engine::{Engine, EngineBuilder, EngineSettings, RunSummary, StepReport, Termination};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::{Cell, City, ZoneKind};
