//! Proximity arcs between entities.
//!
//! Each entity is linked to a random handful of its nearest neighbours.
//! Distance is plain Euclidean distance in degrees with no great-circle
//! correction, which is all the arc layer needs. Reciprocal edges are not
//! merged: A→B and B→A may both be produced.

use rand::Rng;

use crate::config::ArcConfig;
use crate::models::{ArcEdge, GeoEntity};

pub fn planar_distance(a: &GeoEntity, b: &GeoEntity) -> f64 {
    ((a.latitude - b.latitude).powi(2) + (a.longitude - b.longitude).powi(2)).sqrt()
}

/// Indices of the entities within `max_distance` of `entities[idx]`, nearest
/// first. Equal distances keep input order.
pub fn nearby(entities: &[GeoEntity], idx: usize, max_distance: f64) -> Vec<(usize, f64)> {
    let origin = &entities[idx];
    let mut candidates: Vec<(usize, f64)> = entities
        .iter()
        .enumerate()
        .filter(|(other_idx, _)| *other_idx != idx)
        .map(|(other_idx, other)| (other_idx, planar_distance(origin, other)))
        .filter(|(_, distance)| *distance < max_distance)
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    candidates
}

/// Lazily yields arcs in entity-then-candidate order.
///
/// Every run consumes randomness from `rng`, so iterating again with a fresh
/// generator gives a similar but different edge set unless it is seeded.
pub struct ProximityArcs<'a, R: Rng + ?Sized> {
    entities: &'a [GeoEntity],
    config: &'a ArcConfig,
    rng: &'a mut R,
    next_entity: usize,
    current: usize,
    pending: std::vec::IntoIter<usize>,
}

impl<'a, R: Rng + ?Sized> ProximityArcs<'a, R> {
    pub fn new(entities: &'a [GeoEntity], config: &'a ArcConfig, rng: &'a mut R) -> Self {
        // Fewer than two entities never produce an edge
        let next_entity = if entities.len() < 2 { entities.len() } else { 0 };
        Self {
            entities,
            config,
            rng,
            next_entity,
            current: 0,
            pending: Vec::new().into_iter(),
        }
    }

    fn select_neighbours(&mut self, idx: usize) -> Vec<usize> {
        let candidates = nearby(self.entities, idx, self.config.max_distance);
        let k = self
            .rng
            .gen_range(self.config.min_neighbors..=self.config.max_neighbors);
        candidates
            .into_iter()
            .take(k.min(self.config.max_neighbors))
            .map(|(other_idx, _)| other_idx)
            .collect()
    }
}

impl<R: Rng + ?Sized> Iterator for ProximityArcs<'_, R> {
    type Item = ArcEdge;

    fn next(&mut self) -> Option<ArcEdge> {
        let skip_below = 1.0 - self.config.keep_probability;
        loop {
            while let Some(target) = self.pending.next() {
                if self.rng.gen::<f64>() > skip_below {
                    return Some(ArcEdge::between(
                        &self.entities[self.current],
                        &self.entities[target],
                    ));
                }
            }

            if self.next_entity >= self.entities.len() {
                return None;
            }
            self.current = self.next_entity;
            self.next_entity += 1;
            self.pending = self.select_neighbours(self.current).into_iter();
        }
    }
}

pub fn generate<R: Rng + ?Sized>(entities: &[GeoEntity], config: &ArcConfig, rng: &mut R) -> Vec<ArcEdge> {
    ProximityArcs::new(entities, config, rng).collect()
}
