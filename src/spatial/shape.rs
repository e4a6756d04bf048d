//! Grid shapes and the neighbour relation they induce
//!
//! Cartesian shapes compute neighbours from coordinates; graph shapes list
//! their edges explicitly. Either way the relation is flattened into an
//! [`Adjacency`] table and checked for symmetry before a grid is built.

use crate::io::configuration::MAX_GRID_DIMENSION;
use crate::io::error::DefinitionError;
use crate::spatial::direction::{Direction, DirectionSet};
use std::collections::HashSet;

/// Offsets of the cartesian directions, in `Direction` index order
const CARTESIAN_OFFSETS: [[i64; 3]; 6] = [
    [1, 0, 0],
    [0, 1, 0],
    [-1, 0, 0],
    [0, -1, 0],
    [0, 0, 1],
    [0, 0, -1],
];

/// Arbitrary cells connected by labelled edges
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphShape {
    directions: DirectionSet,
    node_count: usize,
    edges: Vec<(usize, Direction, usize)>,
}

impl GraphShape {
    /// A graph of `node_count` unconnected cells
    pub const fn new(directions: DirectionSet, node_count: usize) -> Self {
        Self {
            directions,
            node_count,
            edges: Vec::new(),
        }
    }

    /// Add a single edge: `to` is the neighbour of `from` in `direction`
    ///
    /// The reverse edge must be added too, otherwise grid construction fails.
    pub fn connect(&mut self, from: usize, direction: Direction, to: usize) -> &mut Self {
        self.edges.push((from, direction, to));
        self
    }

    /// Add an edge together with its reverse through the opposite direction
    pub fn connect_both(&mut self, from: usize, direction: Direction, to: usize) -> &mut Self {
        let reverse = self.directions.opposite(direction);
        self.edges.push((from, direction, to));
        self.edges.push((to, reverse, from));
        self
    }

    /// Number of cells
    pub const fn node_count(&self) -> usize {
        self.node_count
    }

    /// Direction labels used by the edges
    pub const fn directions(&self) -> &DirectionSet {
        &self.directions
    }

    /// Edges in insertion order
    pub fn edges(&self) -> &[(usize, Direction, usize)] {
        &self.edges
    }
}

/// Spatial domain of a solve
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GridShape {
    /// Rectangle of `width * height` cells, indexed `x + y * width`
    Cartesian2D {
        /// Cells along x
        width: usize,
        /// Cells along y
        height: usize,
        /// Connect opposite borders
        wrap: bool,
    },
    /// Box of cells, indexed `x + y * width + z * width * height`
    Cartesian3D {
        /// Cells along x
        width: usize,
        /// Cells along y
        height: usize,
        /// Cells along z
        depth: usize,
        /// Connect opposite borders
        wrap: bool,
    },
    /// Explicit graph of cells
    Graph(GraphShape),
}

impl GridShape {
    /// Non-wrapping rectangle
    pub const fn rect(width: usize, height: usize) -> Self {
        Self::Cartesian2D {
            width,
            height,
            wrap: false,
        }
    }

    /// Non-wrapping box
    pub const fn cuboid(width: usize, height: usize, depth: usize) -> Self {
        Self::Cartesian3D {
            width,
            height,
            depth,
            wrap: false,
        }
    }

    /// Same shape with opposite borders connected (no effect on graphs)
    #[must_use]
    pub fn wrapping(self) -> Self {
        match self {
            Self::Cartesian2D { width, height, .. } => Self::Cartesian2D {
                width,
                height,
                wrap: true,
            },
            Self::Cartesian3D {
                width,
                height,
                depth,
                ..
            } => Self::Cartesian3D {
                width,
                height,
                depth,
                wrap: true,
            },
            graph @ Self::Graph(_) => graph,
        }
    }

    /// Extents along x, y and z; graphs report `[node_count, 1, 1]`
    pub const fn dimensions(&self) -> [usize; 3] {
        match self {
            Self::Cartesian2D { width, height, .. } => [*width, *height, 1],
            Self::Cartesian3D {
                width,
                height,
                depth,
                ..
            } => [*width, *height, *depth],
            Self::Graph(graph) => [graph.node_count, 1, 1],
        }
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        let [x, y, z] = self.dimensions();
        x * y * z
    }

    /// Direction set neighbours are expressed in
    pub fn direction_set(&self) -> DirectionSet {
        match self {
            Self::Cartesian2D { .. } => DirectionSet::cartesian_2d(),
            Self::Cartesian3D { .. } => DirectionSet::cartesian_3d(),
            Self::Graph(graph) => graph.directions.clone(),
        }
    }

    const fn wraps(&self) -> bool {
        match self {
            Self::Cartesian2D { wrap, .. } | Self::Cartesian3D { wrap, .. } => *wrap,
            Self::Graph(_) => false,
        }
    }

    /// Coordinates of a cell; graphs use `[cell, 0, 0]`
    pub const fn coordinates(&self, cell: usize) -> [usize; 3] {
        let [width, height, _] = self.dimensions();
        if width == 0 || height == 0 {
            return [0, 0, 0];
        }
        let x = cell % width;
        let y = (cell / width) % height;
        let z = cell / (width * height);
        [x, y, z]
    }

    /// Cell at the given coordinates, if inside the shape
    pub const fn cell_at(&self, coordinates: [usize; 3]) -> Option<usize> {
        let [width, height, depth] = self.dimensions();
        let [x, y, z] = coordinates;
        if x >= width || y >= height || z >= depth {
            return None;
        }
        Some(x + y * width + z * width * height)
    }

    /// Neighbour of a cartesian cell in a direction
    ///
    /// Graph shapes return `None`; use [`GridShape::adjacency`] for them.
    pub fn neighbor(&self, cell: usize, direction: Direction) -> Option<usize> {
        let direction_count = match self {
            Self::Cartesian2D { .. } => 4,
            Self::Cartesian3D { .. } => 6,
            Self::Graph(_) => return None,
        };
        if cell >= self.cell_count() || direction.index() >= direction_count {
            return None;
        }
        let offset = CARTESIAN_OFFSETS.get(direction.index())?;

        let dimensions = self.dimensions();
        let coordinates = self.coordinates(cell);
        let mut moved = [0usize; 3];
        for (((slot, &extent), &coordinate), &step) in moved
            .iter_mut()
            .zip(&dimensions)
            .zip(&coordinates)
            .zip(offset)
        {
            if step == 0 {
                *slot = coordinate;
                continue;
            }
            // An axis of extent 1 has no neighbours, even when wrapping
            if extent <= 1 {
                return None;
            }
            let extent = extent as i64;
            let target = coordinate as i64 + step;
            *slot = if self.wraps() {
                target.rem_euclid(extent) as usize
            } else if (0..extent).contains(&target) {
                target as usize
            } else {
                return None;
            };
        }
        self.cell_at(moved)
    }

    /// Flatten and validate the neighbour relation
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if the shape is empty or too large, or an
    /// edge leaves the grid, loops onto its cell, repeats, uses an unknown
    /// direction, or has no reverse edge.
    pub fn adjacency(&self) -> Result<Adjacency, DefinitionError> {
        let cell_count = self.cell_count();
        if cell_count == 0 {
            return Err(DefinitionError::EmptyGrid);
        }
        if let Some(&extent) = self
            .dimensions()
            .iter()
            .find(|&&extent| extent > MAX_GRID_DIMENSION)
        {
            return Err(DefinitionError::InvalidNeighbor {
                cell: 0,
                reason: format!("extent {extent} exceeds the maximum of {MAX_GRID_DIMENSION}"),
            });
        }

        let directions = self.direction_set();
        let mut lists: Vec<Vec<(usize, Direction)>> = vec![Vec::new(); cell_count];
        match self {
            Self::Graph(graph) => {
                for &(from, direction, to) in &graph.edges {
                    if from >= cell_count || to >= cell_count {
                        return Err(DefinitionError::InvalidNeighbor {
                            cell: from,
                            reason: format!("edge {from} -> {to} leaves a graph of {cell_count} cells"),
                        });
                    }
                    if !directions.contains(direction) {
                        return Err(DefinitionError::UnknownDirection {
                            name: direction.to_string(),
                        });
                    }
                    if from == to {
                        return Err(DefinitionError::InvalidNeighbor {
                            cell: from,
                            reason: "a cell cannot neighbour itself".to_string(),
                        });
                    }
                    if let Some(list) = lists.get_mut(from) {
                        if list.contains(&(to, direction)) {
                            return Err(DefinitionError::InvalidNeighbor {
                                cell: from,
                                reason: format!("edge to {to} in direction {direction} is repeated"),
                            });
                        }
                        list.push((to, direction));
                    }
                }
            }
            Self::Cartesian2D { .. } | Self::Cartesian3D { .. } => {
                for (cell, list) in lists.iter_mut().enumerate() {
                    for direction in directions.iter() {
                        if let Some(neighbor) = self.neighbor(cell, direction) {
                            list.push((neighbor, direction));
                        }
                    }
                }
            }
        }

        let adjacency = Adjacency::from_lists(directions.len(), lists);
        adjacency.check_symmetry(&directions)?;
        Ok(adjacency)
    }
}

/// Compressed neighbour lists, one slice per cell
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Adjacency {
    direction_count: usize,
    offsets: Vec<usize>,
    entries: Vec<(usize, Direction)>,
}

impl Adjacency {
    fn from_lists(direction_count: usize, lists: Vec<Vec<(usize, Direction)>>) -> Self {
        let mut offsets = Vec::with_capacity(lists.len() + 1);
        let mut entries = Vec::with_capacity(lists.iter().map(Vec::len).sum());
        offsets.push(0);
        for list in lists {
            entries.extend(list);
            offsets.push(entries.len());
        }
        Self {
            direction_count,
            offsets,
            entries,
        }
    }

    fn check_symmetry(&self, directions: &DirectionSet) -> Result<(), DefinitionError> {
        let edges: HashSet<(usize, Direction, usize)> = (0..self.cell_count())
            .flat_map(|cell| {
                self.neighbors(cell)
                    .iter()
                    .map(move |&(neighbor, direction)| (cell, direction, neighbor))
            })
            .collect();

        for &(cell, direction, neighbor) in &edges {
            if !edges.contains(&(neighbor, directions.opposite(direction), cell)) {
                return Err(DefinitionError::AsymmetricNeighbor {
                    cell,
                    neighbor,
                    direction: direction.index(),
                });
            }
        }
        Ok(())
    }

    /// Number of cells covered
    pub fn cell_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Neighbours of a cell with the direction leading to each
    pub fn neighbors(&self, cell: usize) -> &[(usize, Direction)] {
        let start = self.offsets.get(cell).copied().unwrap_or(0);
        let end = self.offsets.get(cell + 1).copied().unwrap_or(start);
        self.entries.get(start..end).unwrap_or(&[])
    }

    /// Directions in which a cell has no neighbour
    pub fn boundary_directions(&self, cell: usize) -> Vec<Direction> {
        let neighbors = self.neighbors(cell);
        (0..self.direction_count)
            .map(|index| Direction::new(index as u8))
            .filter(|direction| !neighbors.iter().any(|(_, d)| d == direction))
            .collect()
    }
}
