use anyhow::Result;

use crate::{
    engine::{StepFrame, System},
    rng::SystemRng,
    world::{City, PollutionGrid, ZoneKind},
};

/// Industrial pollution reaches this far (Chebyshev), losing one unit per ring.
pub const POLLUTION_RADIUS: usize = 3;

/// Build a fresh pollution layer from current industrial population.
pub fn diffuse(city: &City) -> PollutionGrid {
    let dims = city.dims();
    let mut pollution = PollutionGrid::new(dims);
    for (source, cell) in city.iter() {
        if cell.zone() != ZoneKind::Industrial || cell.population == 0 {
            continue;
        }
        for target in dims.within(source, POLLUTION_RADIUS) {
            let distance = source.chebyshev(target) as u32;
            let spread = cell.population.saturating_sub(distance);
            if spread > 0 {
                pollution.add(target, spread);
            }
        }
    }
    pollution
}

pub struct PollutionSystem;

impl PollutionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PollutionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for PollutionSystem {
    fn name(&self) -> &str {
        "pollution"
    }

    fn run(
        &mut self,
        _frame: &mut StepFrame,
        city: &mut City,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let pollution = diffuse(city);
        city.replace_pollution(pollution);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{layout, spatial::Coord};

    fn with_center_factory(size: usize) -> City {
        let text: Vec<String> = (0..size)
            .map(|y| {
                (0..size)
                    .map(|x| if x == size / 2 && y == size / 2 { "I" } else { "-" })
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();
        layout::decode(&text.join("\n")).unwrap()
    }

    #[test]
    fn single_source_decays_by_ring() {
        let mut city = with_center_factory(9);
        city.cell_mut(Coord::new(4, 4)).population = 2;

        let pollution = diffuse(&city);
        assert_eq!(pollution.get(Coord::new(4, 4)), 2);
        assert_eq!(pollution.get(Coord::new(5, 5)), 1);
        assert_eq!(pollution.get(Coord::new(3, 4)), 1);
        assert_eq!(pollution.get(Coord::new(6, 4)), 0);
        assert_eq!(pollution.get(Coord::new(0, 0)), 0);
        assert_eq!(pollution.total(), 2 + 8);
    }

    #[test]
    fn reach_stops_at_radius_three() {
        let mut city = with_center_factory(9);
        city.cell_mut(Coord::new(4, 4)).population = 5;

        let pollution = diffuse(&city);
        assert_eq!(pollution.get(Coord::new(7, 4)), 2);
        assert_eq!(pollution.get(Coord::new(8, 4)), 0);
        assert_eq!(pollution.get(Coord::new(1, 1)), 2);
        assert_eq!(pollution.get(Coord::new(0, 0)), 0);
    }

    #[test]
    fn sources_accumulate() {
        let mut city = layout::decode("I,-,I").unwrap();
        city.cell_mut(Coord::new(0, 0)).population = 2;
        city.cell_mut(Coord::new(2, 0)).population = 2;

        let pollution = diffuse(&city);
        let row: Vec<u32> = pollution.rows().next().unwrap().to_vec();
        assert_eq!(row, vec![2, 2, 2]);
    }

    #[test]
    fn empty_industry_emits_nothing() {
        let city = layout::decode("I,I\nI,I").unwrap();
        assert_eq!(diffuse(&city).total(), 0);
    }

    #[test]
    fn only_current_population_matters() {
        let mut city = layout::decode("I,R,R,R\nR,R,R,I").unwrap();
        city.cell_mut(Coord::new(0, 0)).population = 2;
        city.replace_pollution(diffuse(&city));
        city.cell_mut(Coord::new(0, 0)).population = 0;
        city.cell_mut(Coord::new(3, 1)).population = 1;

        let fresh = layout::decode("I,R,R,R\nR,R,R,I")
            .map(|mut c| {
                c.cell_mut(Coord::new(3, 1)).population = 1;
                c
            })
            .unwrap();
        assert_eq!(diffuse(&city), diffuse(&fresh));
    }

    #[test]
    fn non_industrial_population_does_not_pollute() {
        let mut city = layout::decode("R,C\nR,R").unwrap();
        city.cell_mut(Coord::new(0, 0)).population = 4;
        city.cell_mut(Coord::new(1, 0)).population = 2;
        assert_eq!(diffuse(&city).total(), 0);
    }
}
