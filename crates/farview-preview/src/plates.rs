//! Seeded tectonic plates over the icosphere's triangles.
//!
//! Every triangle is a region. Plates start from one random region each and
//! grow across shared edges until the whole sphere is covered; each plate is
//! then drawn in its continental or oceanic color.

use std::collections::{HashSet, VecDeque};

use farview_render::ObjectVertex;
use glam::DVec3;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::mesh::Icosphere;

/// An undirected mesh edge as an ordered vertex-index pair.
pub type EdgeKey = (u32, u32);

/// Share of plates drawn as oceanic; the rest are continental.
const OCEANIC_SHARE: f32 = 0.6;

const CONTINENTAL_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
const OCEANIC_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

fn edge_key(a: u32, b: u32) -> EdgeKey {
    (a.min(b), a.max(b))
}

/// One icosphere triangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    pub corners: [u32; 3],
    pub edges: [EdgeKey; 3],
}

impl Region {
    fn new(a: u32, b: u32, c: u32) -> Self {
        Self {
            corners: [a, b, c],
            edges: [edge_key(a, b), edge_key(b, c), edge_key(c, a)],
        }
    }

    /// Whether the two regions share an edge.
    pub fn borders(&self, other: &Region) -> bool {
        self.edges.iter().any(|e| other.edges.contains(e))
    }
}

/// One region per icosphere triangle, in index-buffer order.
pub fn create_regions(sphere: &Icosphere) -> Vec<Region> {
    sphere
        .indices
        .chunks_exact(3)
        .map(|tri| Region::new(tri[0], tri[1], tri[2]))
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlateKind {
    #[default]
    Oceanic,
    Continental,
}

impl PlateKind {
    fn random(rng: &mut impl Rng) -> Self {
        if rng.random::<f32>() > OCEANIC_SHARE {
            Self::Continental
        } else {
            Self::Oceanic
        }
    }

    pub fn color(self) -> [f32; 4] {
        match self {
            Self::Continental => CONTINENTAL_COLOR,
            Self::Oceanic => OCEANIC_COLOR,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TectonicPlate {
    pub kind: PlateKind,
    /// Indices into the region list.
    pub regions: Vec<usize>,
    /// Edges with the plate on exactly one side.
    pub border: HashSet<EdgeKey>,
}

impl TectonicPlate {
    /// Whether the two plates share a border edge.
    pub fn borders(&self, other: &TectonicPlate) -> bool {
        self.border.iter().any(|e| other.border.contains(e))
    }

    fn touches(&self, region: &Region) -> bool {
        region.edges.iter().any(|e| self.border.contains(e))
    }

    /// Add a region; edges it shares with the plate become interior.
    fn absorb(&mut self, index: usize, region: &Region) {
        self.regions.push(index);
        for edge in region.edges {
            if !self.border.remove(&edge) {
                self.border.insert(edge);
            }
        }
    }
}

/// Partition `regions` into `plate_count` connected plates.
///
/// Each plate is seeded with a random region and classified up front. The
/// remaining regions are handed out in random order to the first plate they
/// touch, starting the plate scan at a random offset; a region touching no
/// plate yet is retried later. Regions must form a connected surface. With
/// zero plates (or no regions) nothing is assigned.
pub fn cluster_regions(
    rng: &mut impl Rng,
    regions: &[Region],
    plate_count: usize,
) -> Vec<TectonicPlate> {
    let plate_count = plate_count.min(regions.len());
    if plate_count == 0 {
        return Vec::new();
    }

    let mut plates: Vec<TectonicPlate> = (0..plate_count)
        .map(|_| TectonicPlate {
            kind: PlateKind::random(rng),
            ..TectonicPlate::default()
        })
        .collect();

    let mut order: Vec<usize> = (0..regions.len()).collect();
    order.shuffle(rng);
    let mut pending = VecDeque::from(order);

    for plate in &mut plates {
        if let Some(seed) = pending.pop_back() {
            plate.absorb(seed, &regions[seed]);
        }
    }

    while let Some(index) = pending.pop_back() {
        let region = &regions[index];
        let start = rng.random_range(0..plate_count);
        let owner = (0..plate_count)
            .map(|offset| (start + offset) % plate_count)
            .find(|&p| plates[p].touches(region));
        match owner {
            Some(p) => plates[p].absorb(index, region),
            None => pending.push_front(index),
        }
    }
    plates
}

/// Unindexed triangle list: three vertices per region, scaled to `radius`
/// around `center` and colored by the owning plate.
pub fn planet_vertices(
    sphere: &Icosphere,
    regions: &[Region],
    plates: &[TectonicPlate],
    center: DVec3,
    radius: f64,
) -> Vec<ObjectVertex> {
    let mut vertices = Vec::with_capacity(regions.len() * 3);
    for plate in plates {
        let color = plate.kind.color();
        for &index in &plate.regions {
            for corner in regions[index].corners {
                let world = center + sphere.directions[corner as usize] * radius;
                vertices.push(ObjectVertex::from_world(world, color));
            }
        }
    }
    vertices
}
