//! Read-only aggregation over the grid: rectangular area queries and whole-region totals.

use serde::Serialize;
use thiserror::Error;

use crate::{
    spatial::Coord,
    world::{City, ZoneKind},
};

/// Inclusive rectangle in signed operator coordinates, normalized on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Area {
    pub x1: i64,
    pub y1: i64,
    pub x2: i64,
    pub y2: i64,
}

impl Area {
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AreaError {
    #[error("invalid coordinates, valid range is (0,0) to ({max_x},{max_y})")]
    OutOfBounds { max_x: usize, max_y: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AreaReport {
    pub residential: u64,
    pub industrial: u64,
    pub commercial: u64,
    pub pollution: u64,
    pub disrupted_cells: usize,
}

/// Aggregate the cells inside `area`. Either corner outside the grid is an error.
pub fn analyze(city: &City, area: Area) -> Result<AreaReport, AreaError> {
    let dims = city.dims();
    let (Some(top_left), Some(bottom_right)) =
        (dims.coord(area.x1, area.y1), dims.coord(area.x2, area.y2))
    else {
        return Err(AreaError::OutOfBounds {
            max_x: city.width() - 1,
            max_y: city.height() - 1,
        });
    };

    let mut report = AreaReport::default();
    for y in top_left.y..=bottom_right.y {
        for x in top_left.x..=bottom_right.x {
            let coord = Coord::new(x, y);
            let cell = city.cell(coord);
            let population = cell.population as u64;
            match cell.zone() {
                ZoneKind::Residential => report.residential += population,
                ZoneKind::Industrial => report.industrial += population,
                ZoneKind::Commercial => report.commercial += population,
                _ => {}
            }
            report.pollution += city.pollution().get(coord) as u64;
            if cell.is_disrupted() {
                report.disrupted_cells += 1;
            }
        }
    }
    Ok(report)
}

/// End-of-run totals. Pollution counts only what sits on industrial cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegionTotals {
    pub residential: u64,
    pub industrial: u64,
    pub commercial: u64,
    pub pollution: u64,
}

impl RegionTotals {
    pub fn of(city: &City) -> Self {
        let industrial_pollution = city
            .iter()
            .filter(|(_, cell)| cell.zone() == ZoneKind::Industrial)
            .map(|(coord, _)| city.pollution().get(coord) as u64)
            .sum();
        Self {
            residential: city.population_of(ZoneKind::Residential),
            industrial: city.population_of(ZoneKind::Industrial),
            commercial: city.population_of(ZoneKind::Commercial),
            pollution: industrial_pollution,
        }
    }
}
