//! Grid geometry: coordinates, bounds and neighborhoods.

use serde::{Deserialize, Serialize};

/// Cell position. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: usize,
    pub y: usize,
}

impl Coord {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance between two positions
    pub fn chebyshev(self, other: Coord) -> usize {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Dimensions of a dense row-major grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub width: usize,
    pub height: usize,
}

impl GridDims {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width && coord.y < self.height
    }

    /// Convert signed input (e.g. typed by an operator) into a coordinate
    pub fn coord(&self, x: i64, y: i64) -> Option<Coord> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        let coord = Coord { x, y };
        self.contains(coord).then_some(coord)
    }

    pub fn index(&self, coord: Coord) -> usize {
        coord.y * self.width + coord.x
    }

    pub fn coord_of(&self, index: usize) -> Coord {
        Coord {
            x: index % self.width,
            y: index / self.width,
        }
    }

    /// Every in-bounds cell within Chebyshev `radius` of `center`, the center included.
    pub fn within(&self, center: Coord, radius: usize) -> impl Iterator<Item = Coord> {
        let x_lo = center.x.saturating_sub(radius);
        let y_lo = center.y.saturating_sub(radius);
        let x_hi = (center.x + radius).min(self.width.saturating_sub(1));
        let y_hi = (center.y + radius).min(self.height.saturating_sub(1));
        let dims = *self;
        (y_lo..=y_hi)
            .flat_map(move |y| (x_lo..=x_hi).map(move |x| Coord { x, y }))
            .filter(move |c| dims.contains(*c))
    }

    /// 8-connected neighbors clipped to the grid
    pub fn neighbors(&self, center: Coord) -> impl Iterator<Item = Coord> {
        self.within(center, 1).filter(move |c| *c != center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_clipped_at_edges() {
        let dims = GridDims::new(10, 5);

        assert_eq!(dims.neighbors(Coord::new(0, 0)).count(), 3);
        assert_eq!(dims.neighbors(Coord::new(5, 0)).count(), 5);
        assert_eq!(dims.neighbors(Coord::new(5, 2)).count(), 8);
        assert_eq!(dims.neighbors(Coord::new(9, 4)).count(), 3);
    }

    #[test]
    fn single_cell_grid_has_no_neighbors() {
        let dims = GridDims::new(1, 1);
        assert_eq!(dims.neighbors(Coord::new(0, 0)).count(), 0);
    }

    #[test]
    fn chebyshev_window_is_seven_by_seven() {
        let dims = GridDims::new(20, 20);
        assert_eq!(dims.within(Coord::new(10, 10), 3).count(), 49);
        assert_eq!(dims.within(Coord::new(0, 0), 3).count(), 16);
    }

    #[test]
    fn index_round_trips_through_coord() {
        let dims = GridDims::new(10, 5);
        let pos = Coord::new(3, 2);
        let id = dims.index(pos);
        assert_eq!(id, 23);
        assert_eq!(dims.coord_of(id), pos);
    }

    #[test]
    fn signed_input_is_bounds_checked() {
        let dims = GridDims::new(4, 3);
        assert_eq!(dims.coord(3, 2), Some(Coord::new(3, 2)));
        assert_eq!(dims.coord(-1, 0), None);
        assert_eq!(dims.coord(4, 0), None);
        assert_eq!(dims.coord(0, 3), None);
    }

    #[test]
    fn chebyshev_distance() {
        assert_eq!(Coord::new(0, 0).chebyshev(Coord::new(3, 1)), 3);
        assert_eq!(Coord::new(2, 5).chebyshev(Coord::new(2, 5)), 0);
    }
}
