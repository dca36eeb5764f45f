use anyhow::Result;
use serde::Serialize;

use crate::{
    engine::{StepFrame, System},
    rng::SystemRng,
    world::{City, ZoneKind},
};

/// Workers and goods available to growth during one step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ResourcePools {
    pub workers: u32,
    pub goods: u32,
}

impl ResourcePools {
    /// Workers come from residential population, goods from industrial population.
    pub fn tally(city: &City) -> Self {
        Self {
            workers: saturating_u32(city.population_of(ZoneKind::Residential)),
            goods: saturating_u32(city.population_of(ZoneKind::Industrial)),
        }
    }

    pub fn can_afford(&self, cost: ResourceCost) -> bool {
        self.workers >= cost.workers && self.goods >= cost.goods
    }

    /// Spend `cost` if both pools cover it. Returns false and leaves the pools untouched otherwise.
    pub fn try_spend(&mut self, cost: ResourceCost) -> bool {
        if !self.can_afford(cost) {
            return false;
        }
        self.workers -= cost.workers;
        self.goods -= cost.goods;
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceCost {
    pub workers: u32,
    pub goods: u32,
}

impl ResourceCost {
    pub const FREE: ResourceCost = ResourceCost {
        workers: 0,
        goods: 0,
    };
}

fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

pub struct ResourceSystem;

impl ResourceSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResourceSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ResourceSystem {
    fn name(&self) -> &str {
        "resources"
    }

    fn run(
        &mut self,
        frame: &mut StepFrame,
        city: &mut City,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        frame.pools = ResourcePools::tally(city);
        Ok(())
    }
}
