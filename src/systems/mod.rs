mod disruption;
mod growth;
mod pollution;
mod resources;

pub use disruption::{strike, DisruptionEvent, DisruptionSystem, PopulationChange};
pub use growth::{grow, rule_for, visit_order, GrowthRule, GrowthSystem, GrowthTally, GROWTH_ORDER};
pub use pollution::{diffuse, PollutionSystem, POLLUTION_RADIUS};
pub use resources::{ResourceCost, ResourcePools, ResourceSystem};
