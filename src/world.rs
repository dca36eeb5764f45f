use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::spatial::{Coord, GridDims};

/// Fixed land-use category of a cell. Assigned at load time, never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Residential,
    Industrial,
    Commercial,
    Road,
    Powerline,
    PowerlineOverRoad,
    PowerPlant,
    Empty,
}

impl ZoneKind {
    pub fn from_glyph(glyph: char) -> Self {
        match glyph {
            'R' => ZoneKind::Residential,
            'I' => ZoneKind::Industrial,
            'C' => ZoneKind::Commercial,
            '-' => ZoneKind::Road,
            'T' => ZoneKind::Powerline,
            '#' => ZoneKind::PowerlineOverRoad,
            'P' => ZoneKind::PowerPlant,
            _ => ZoneKind::Empty,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            ZoneKind::Residential => 'R',
            ZoneKind::Industrial => 'I',
            ZoneKind::Commercial => 'C',
            ZoneKind::Road => '-',
            ZoneKind::Powerline => 'T',
            ZoneKind::PowerlineOverRoad => '#',
            ZoneKind::PowerPlant => 'P',
            ZoneKind::Empty => ' ',
        }
    }

    /// Highest population the growth rules can reach for this zone.
    pub fn population_ceiling(self) -> u32 {
        match self {
            ZoneKind::Residential => 4,
            ZoneKind::Industrial | ZoneKind::Commercial => 2,
            _ => 0,
        }
    }

    pub fn carries_power(self) -> bool {
        matches!(
            self,
            ZoneKind::Powerline | ZoneKind::PowerlineOverRoad | ZoneKind::PowerPlant
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    zone: ZoneKind,
    pub population: u32,
    /// Capability flag supplied by the loader; growth scans neighbors instead.
    pub powered: bool,
    disrupted: bool,
}

impl Cell {
    pub fn new(zone: ZoneKind) -> Self {
        Self {
            zone,
            population: 0,
            powered: false,
            disrupted: false,
        }
    }

    pub fn zone(&self) -> ZoneKind {
        self.zone
    }

    pub fn is_disrupted(&self) -> bool {
        self.disrupted
    }

    /// Flag the cell as struck. There is no way to clear it.
    pub fn mark_disrupted(&mut self) {
        self.disrupted = true;
    }

    /// Glyph when empty, population digit otherwise.
    pub fn render(&self) -> String {
        if self.population == 0 {
            self.zone.glyph().to_string()
        } else {
            self.population.to_string()
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("region layout contains no cells")]
    Empty,
    #[error("region layout row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Pollution intensity per cell, same dimensions as the city grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollutionGrid {
    dims: GridDims,
    levels: Vec<u32>,
}

impl PollutionGrid {
    pub fn new(dims: GridDims) -> Self {
        Self {
            dims,
            levels: vec![0; dims.cell_count()],
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn get(&self, coord: Coord) -> u32 {
        self.levels[self.dims.index(coord)]
    }

    pub fn add(&mut self, coord: Coord, amount: u32) {
        let idx = self.dims.index(coord);
        self.levels[idx] += amount;
    }

    pub fn total(&self) -> u64 {
        self.levels.iter().map(|&v| v as u64).sum()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[u32]> {
        self.levels.chunks(self.dims.width.max(1))
    }
}

/// The simulated region: a dense zoned grid plus its pollution layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct City {
    dims: GridDims,
    cells: Vec<Cell>,
    pollution: PollutionGrid,
}

impl City {
    /// Build from decoded rows. Rows must all have the same, non-zero length.
    pub fn from_rows(rows: Vec<Vec<ZoneKind>>) -> Result<Self, LayoutError> {
        let width = rows.first().map(|r| r.len()).unwrap_or(0);
        if width == 0 {
            return Err(LayoutError::Empty);
        }
        for (row, zones) in rows.iter().enumerate() {
            if zones.len() != width {
                return Err(LayoutError::Ragged {
                    row,
                    expected: width,
                    found: zones.len(),
                });
            }
        }
        let dims = GridDims::new(width, rows.len());
        let cells = rows.into_iter().flatten().map(Cell::new).collect();
        Ok(Self {
            dims,
            cells,
            pollution: PollutionGrid::new(dims),
        })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn width(&self) -> usize {
        self.dims.width
    }

    pub fn height(&self) -> usize {
        self.dims.height
    }

    pub fn cell(&self, coord: Coord) -> &Cell {
        &self.cells[self.dims.index(coord)]
    }

    pub fn cell_mut(&mut self, coord: Coord) -> &mut Cell {
        let idx = self.dims.index(coord);
        &mut self.cells[idx]
    }

    pub fn is_valid_coordinate(&self, x: i64, y: i64) -> bool {
        self.dims.coord(x, y).is_some()
    }

    /// Cells in row-major order with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (Coord, &Cell)> {
        let dims = self.dims;
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (dims.coord_of(idx), cell))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.cells.chunks(self.dims.width)
    }

    /// Coordinates of every cell of `zone`, row-major.
    pub fn coords_of(&self, zone: ZoneKind) -> Vec<Coord> {
        self.iter()
            .filter(|(_, cell)| cell.zone == zone)
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Number of 8-connected neighbors whose population is at least `min_population`.
    pub fn adjacent_count(&self, center: Coord, min_population: u32) -> usize {
        self.dims
            .neighbors(center)
            .filter(|&n| self.cell(n).population >= min_population)
            .count()
    }

    /// Whether any 8-connected neighbor is power infrastructure.
    pub fn has_power_access(&self, center: Coord) -> bool {
        self.dims
            .neighbors(center)
            .any(|n| self.cell(n).zone.carries_power())
    }

    pub fn population_of(&self, zone: ZoneKind) -> u64 {
        self.cells
            .iter()
            .filter(|cell| cell.zone == zone)
            .map(|cell| cell.population as u64)
            .sum()
    }

    /// Population layer only, used for fixed-point detection.
    pub fn populations(&self) -> Vec<u32> {
        self.cells.iter().map(|cell| cell.population).collect()
    }

    pub fn pollution(&self) -> &PollutionGrid {
        &self.pollution
    }

    pub fn replace_pollution(&mut self, pollution: PollutionGrid) {
        debug_assert_eq!(pollution.dims(), self.dims);
        self.pollution = pollution;
    }
}
