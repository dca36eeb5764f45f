//! Zone growth rules.
//!
//! Growth is sequential: cells are visited one at a time against the live grid,
//! so a cell grown earlier in the step counts toward its neighbors' adjacency checks and
//! its cost is already gone from the shared pools.

use std::cmp::Reverse;

use anyhow::Result;
use serde::Serialize;

use super::resources::{ResourceCost, ResourcePools};
use crate::{
    engine::{StepFrame, System},
    rng::SystemRng,
    spatial::Coord,
    world::{City, ZoneKind},
};

/// Categories are processed in this order within a step.
pub const GROWTH_ORDER: [ZoneKind; 3] = [
    ZoneKind::Commercial,
    ZoneKind::Industrial,
    ZoneKind::Residential,
];

const LABOR: ResourceCost = ResourceCost {
    workers: 1,
    goods: 0,
};

const LABOR_AND_GOODS: ResourceCost = ResourceCost {
    workers: 1,
    goods: 1,
};

/// Requirement for a single +1 population step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrowthRule {
    /// Neighbors at or above the cell's own population needed to grow.
    pub min_adjacent: usize,
    /// Adjacent power infrastructure satisfies the neighbor requirement instead.
    pub power_substitutes: bool,
    pub cost: ResourceCost,
}

impl GrowthRule {
    const fn new(min_adjacent: usize, power_substitutes: bool, cost: ResourceCost) -> Self {
        Self {
            min_adjacent,
            power_substitutes,
            cost,
        }
    }
}

/// Rule for growing a `zone` cell out of `population`, or `None` at the ceiling.
pub fn rule_for(zone: ZoneKind, population: u32) -> Option<GrowthRule> {
    let rule = match (zone, population) {
        (ZoneKind::Commercial, 0) => GrowthRule::new(1, true, LABOR_AND_GOODS),
        (ZoneKind::Commercial, 1) => GrowthRule::new(1, false, LABOR_AND_GOODS),
        (ZoneKind::Industrial, 0) => GrowthRule::new(1, true, LABOR),
        (ZoneKind::Industrial, 1) => GrowthRule::new(2, false, LABOR),
        (ZoneKind::Residential, 0) => GrowthRule::new(1, true, ResourceCost::FREE),
        (ZoneKind::Residential, 1) => GrowthRule::new(2, false, ResourceCost::FREE),
        (ZoneKind::Residential, 2) => GrowthRule::new(3, false, ResourceCost::FREE),
        (ZoneKind::Residential, 3) => GrowthRule::new(4, false, ResourceCost::FREE),
        _ => return None,
    };
    Some(rule)
}

/// Visit order for one category: population descending, then the number of neighbors at
/// or above the cell's population descending, then row and column ascending.
pub fn visit_order(city: &City, zone: ZoneKind) -> Vec<Coord> {
    let mut keyed: Vec<(Reverse<u32>, Reverse<usize>, usize, usize)> = city
        .coords_of(zone)
        .into_iter()
        .map(|coord| {
            let population = city.cell(coord).population;
            (
                Reverse(population),
                Reverse(city.adjacent_count(coord, population)),
                coord.y,
                coord.x,
            )
        })
        .collect();
    keyed.sort_unstable();
    keyed
        .into_iter()
        .map(|(_, _, y, x)| Coord::new(x, y))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GrowthTally {
    pub commercial: u32,
    pub industrial: u32,
    pub residential: u32,
    pub workers_available: u32,
    pub goods_available: u32,
    pub workers_spent: u32,
    pub goods_spent: u32,
}

impl GrowthTally {
    pub fn total_grown(&self) -> u32 {
        self.commercial + self.industrial + self.residential
    }

    fn record(&mut self, zone: ZoneKind) {
        match zone {
            ZoneKind::Commercial => self.commercial += 1,
            ZoneKind::Industrial => self.industrial += 1,
            ZoneKind::Residential => self.residential += 1,
            _ => {}
        }
    }
}

/// Run one growth pass over every category, spending from `pools`.
///
/// All three visit orders are fixed from the state at the start of the pass.
pub fn grow(city: &mut City, pools: &mut ResourcePools) -> GrowthTally {
    let orders: Vec<(ZoneKind, Vec<Coord>)> = GROWTH_ORDER
        .iter()
        .map(|&zone| (zone, visit_order(city, zone)))
        .collect();

    let mut tally = GrowthTally {
        workers_available: pools.workers,
        goods_available: pools.goods,
        ..GrowthTally::default()
    };
    for (zone, order) in orders {
        for coord in order {
            if try_grow(city, coord, pools) {
                tally.record(zone);
            }
        }
    }
    tally.workers_spent = tally.workers_available - pools.workers;
    tally.goods_spent = tally.goods_available - pools.goods;
    tally
}

fn try_grow(city: &mut City, coord: Coord, pools: &mut ResourcePools) -> bool {
    let cell = city.cell(coord);
    let population = cell.population;
    let Some(rule) = rule_for(cell.zone(), population) else {
        return false;
    };
    let connected = city.adjacent_count(coord, population) >= rule.min_adjacent
        || (rule.power_substitutes && city.has_power_access(coord));
    if !connected || !pools.try_spend(rule.cost) {
        return false;
    }
    city.cell_mut(coord).population = population + 1;
    true
}

pub struct GrowthSystem;

impl GrowthSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrowthSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for GrowthSystem {
    fn name(&self) -> &str {
        "growth"
    }

    fn run(
        &mut self,
        frame: &mut StepFrame,
        city: &mut City,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        frame.growth = grow(city, &mut frame.pools);
        tracing::debug!(
            step = frame.step,
            grown = frame.growth.total_grown(),
            workers_left = frame.pools.workers,
            goods_left = frame.pools.goods,
            "growth pass"
        );
        Ok(())
    }
}
