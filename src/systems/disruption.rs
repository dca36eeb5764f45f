use anyhow::Result;
use serde::Serialize;

use super::{pollution::diffuse, resources::ResourcePools};
use crate::{
    engine::{StepFrame, System},
    rng::SystemRng,
    spatial::Coord,
    world::{City, ZoneKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PopulationChange {
    pub coord: Coord,
    pub from: u32,
    pub to: u32,
}

/// A strike that landed this step. Steps without one carry `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisruptionEvent {
    pub site: Coord,
    /// Cells in the 3×3 block around the site, the site included, whose population dropped.
    pub reductions: Vec<PopulationChange>,
}

/// Hit `site`: flag it and take one population from it and from each neighbor.
///
/// Already-struck cells and power plants are immune.
pub fn strike(city: &mut City, site: Coord) -> Option<DisruptionEvent> {
    let target = city.cell(site);
    if target.is_disrupted() || target.zone() == ZoneKind::PowerPlant {
        return None;
    }
    city.cell_mut(site).mark_disrupted();

    let block: Vec<Coord> = city.dims().within(site, 1).collect();
    let mut reductions = Vec::new();
    for coord in block {
        let cell = city.cell_mut(coord);
        let from = cell.population;
        let to = from.saturating_sub(1);
        if to != from {
            cell.population = to;
            reductions.push(PopulationChange { coord, from, to });
        }
    }
    Some(DisruptionEvent { site, reductions })
}

pub struct DisruptionSystem;

impl DisruptionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DisruptionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DisruptionSystem {
    fn name(&self) -> &str {
        "disruption"
    }

    fn run(
        &mut self,
        frame: &mut StepFrame,
        city: &mut City,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let site = rng.gen_cell(city.dims());
        let Some(event) = strike(city, site) else {
            return Ok(());
        };
        tracing::warn!(
            step = frame.step,
            site = %event.site,
            reduced = event.reductions.len(),
            "disruption struck"
        );
        frame.pools = ResourcePools::tally(city);
        let pollution = diffuse(city);
        city.replace_pollution(pollution);
        frame.disruption = Some(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{layout, rng::RngManager};

    #[test]
    fn strike_damages_the_site_and_its_neighbors() {
        let mut city = layout::decode("R,R,R\nR,R,R\nR,R,R").unwrap();
        let coords: Vec<Coord> = city.iter().map(|(c, _)| c).collect();
        for (i, coord) in coords.into_iter().enumerate() {
            city.cell_mut(coord).population = (i % 3) as u32;
        }
        let site = Coord::new(1, 1);
        let event = strike(&mut city, site).expect("strike lands");

        assert!(city.cell(site).is_disrupted());
        assert_eq!(city.cell(site).population, 0);
        assert_eq!(city.populations(), vec![0, 0, 1, 0, 0, 1, 0, 0, 1]);
        assert_eq!(event.reductions.len(), 6);
        assert!(event
            .reductions
            .iter()
            .any(|change| change.coord == site && change.from == 1 && change.to == 0));
        assert!(event
            .reductions
            .iter()
            .all(|change| change.to + 1 == change.from));
    }

    #[test]
    fn full_block_loses_one_everywhere() {
        let mut city = layout::decode("R,R,R\nR,R,R\nR,R,R").unwrap();
        let coords: Vec<Coord> = city.iter().map(|(c, _)| c).collect();
        for coord in coords {
            city.cell_mut(coord).population = 2;
        }

        let event = strike(&mut city, Coord::new(1, 1)).expect("strike lands");

        assert_eq!(city.cell(Coord::new(1, 1)).population, 1);
        assert_eq!(city.populations(), vec![1; 9]);
        assert_eq!(event.reductions.len(), 9);
    }

    #[test]
    fn struck_cells_are_immune_afterwards() {
        let mut city = layout::decode("R,R").unwrap();
        city.cell_mut(Coord::new(1, 0)).population = 3;

        assert!(strike(&mut city, Coord::new(0, 0)).is_some());
        assert!(strike(&mut city, Coord::new(0, 0)).is_none());
        assert_eq!(city.cell(Coord::new(1, 0)).population, 2);
        assert!(city.cell(Coord::new(0, 0)).is_disrupted());
    }

    #[test]
    fn power_plants_are_never_struck() {
        let mut city = layout::decode("P,R").unwrap();
        city.cell_mut(Coord::new(1, 0)).population = 1;
        assert!(strike(&mut city, Coord::new(0, 0)).is_none());
        assert!(!city.cell(Coord::new(0, 0)).is_disrupted());
        assert_eq!(city.cell(Coord::new(1, 0)).population, 1);
    }

    #[test]
    fn system_refreshes_pools_after_a_strike() {
        let mut city = layout::decode("R").unwrap();
        city.cell_mut(Coord::new(0, 0)).population = 2;
        let mut frame = StepFrame::new(1);
        frame.pools = ResourcePools {
            workers: 99,
            goods: 99,
        };
        let mut rng = RngManager::new(3);
        let mut system = DisruptionSystem::new();

        system
            .run(&mut frame, &mut city, &mut rng.stream("disruption"))
            .unwrap();

        let event = frame.disruption.expect("single cell is always hit");
        assert_eq!(event.site, Coord::new(0, 0));
        assert_eq!(event.reductions.len(), 1);
        assert_eq!(city.cell(Coord::new(0, 0)).population, 1);
        assert_eq!(frame.pools, ResourcePools { workers: 1, goods: 0 });

        let mut next = StepFrame::new(2);
        system
            .run(&mut next, &mut city, &mut rng.stream("disruption"))
            .unwrap();
        assert!(next.disruption.is_none());
    }
}
