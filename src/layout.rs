//! Force-directed node placement.
//!
//! Positions are a presentation concern, but they are computed once and
//! persisted with the graph so every later render uses the same picture.
//!
//! # Governing Equations (Fruchterman-Reingold)
//!
//! ```text
//! Optimal distance:   k = √(1/N)
//! Repulsion:          f_r(d) = k² / d          between every node pair
//! Attraction:         f_a(d) = d² / k          along every connection
//! Step:               Δp = t · F / |F|         temperature-limited move
//! Cooling:            t ← t - t₀/(iters + 1)   t₀ = 0.1 · extent
//! ```
//!
//! The final layout is centred on the origin and scaled so the largest
//! coordinate magnitude is `1`.

use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Position, WeightedGraph};
use crate::rng::GraphRng;

/// Minimum separation used in force computations.
const MIN_DISTANCE: f64 = 0.01;

/// Strategy that assigns a 2D position to every node of a graph.
pub trait ForceDirectedLayout {
    /// Compute positions indexed by node id.
    ///
    /// # Errors
    ///
    /// Returns `Layout` if the simulation produces non-finite coordinates.
    fn layout(&self, graph: &WeightedGraph, rng: &mut GraphRng) -> GraphResult<Vec<Position>>;
}

/// Fruchterman-Reingold spring layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringLayout {
    /// Maximum number of cooling steps.
    pub iterations: usize,
    /// Stop once the mean displacement per node drops below this.
    pub threshold: f64,
    /// Initial temperature as a fraction of the initial layout extent.
    pub initial_temperature: f64,
}

impl Default for SpringLayout {
    fn default() -> Self {
        Self {
            iterations: 50,
            threshold: 1e-4,
            initial_temperature: 0.1,
        }
    }
}

impl SpringLayout {
    /// Undirected adjacency: `true` if an edge exists in either direction.
    fn connections(graph: &WeightedGraph) -> Vec<Vec<bool>> {
        let n = graph.node_count();
        let mut adjacency = vec![vec![false; n]; n];
        for e in graph.edges() {
            adjacency[e.from][e.to] = true;
            adjacency[e.to][e.from] = true;
        }
        adjacency
    }

    /// Net force on every node.
    fn compute_displacements(
        positions: &[Position],
        adjacency: &[Vec<bool>],
        k: f64,
    ) -> Vec<(f64, f64)> {
        let n = positions.len();
        let mut displacement = vec![(0.0, 0.0); n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);

                let attraction = if adjacency[i][j] { distance / k } else { 0.0 };
                // Factor applied to the unit-less delta (dx, dy).
                let factor = k * k / (distance * distance) - attraction;

                displacement[i].0 += dx * factor;
                displacement[i].1 += dy * factor;
            }
        }

        displacement
    }

    /// Centre on the origin and scale into `[-1, 1]`.
    fn rescale(positions: &mut [Position]) {
        let n = positions.len() as f64;
        if positions.is_empty() {
            return;
        }
        let cx = positions.iter().map(|p| p.x).sum::<f64>() / n;
        let cy = positions.iter().map(|p| p.y).sum::<f64>() / n;
        for p in positions.iter_mut() {
            p.x -= cx;
            p.y -= cy;
        }

        let extent = positions
            .iter()
            .map(|p| p.x.abs().max(p.y.abs()))
            .fold(0.0_f64, f64::max);
        if extent > 0.0 {
            for p in positions.iter_mut() {
                p.x /= extent;
                p.y /= extent;
            }
        }
    }
}

impl ForceDirectedLayout for SpringLayout {
    fn layout(&self, graph: &WeightedGraph, rng: &mut GraphRng) -> GraphResult<Vec<Position>> {
        let n = graph.node_count();
        match n {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![Position::default()]),
            _ => {}
        }

        let adjacency = Self::connections(graph);
        let mut positions: Vec<Position> = (0..n)
            .map(|_| Position::new(rng.gen_f64(), rng.gen_f64()))
            .collect();

        let k = (1.0 / n as f64).sqrt();
        let extent = {
            let (min_x, max_x, min_y, max_y) = positions.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
                |(a, b, c, d), p| (a.min(p.x), b.max(p.x), c.min(p.y), d.max(p.y)),
            );
            (max_x - min_x).max(max_y - min_y)
        };
        let mut temperature = extent * self.initial_temperature;
        let cooling = temperature / (self.iterations as f64 + 1.0);

        let mut steps = 0;
        for _ in 0..self.iterations {
            steps += 1;
            let displacement = Self::compute_displacements(&positions, &adjacency, k);

            let mut total_move = 0.0;
            for (p, (fx, fy)) in positions.iter_mut().zip(displacement) {
                let length = (fx * fx + fy * fy).sqrt().max(MIN_DISTANCE);
                let (mx, my) = (fx * temperature / length, fy * temperature / length);
                p.x += mx;
                p.y += my;
                total_move += (mx * mx + my * my).sqrt();
            }

            temperature -= cooling;
            if total_move / (n as f64) < self.threshold {
                break;
            }
        }

        Self::rescale(&mut positions);

        if let Some(id) = positions.iter().position(|p| !p.is_finite()) {
            return Err(GraphError::Layout(format!("non-finite position for node {id}")));
        }
        debug!(nodes = n, steps, "spring layout converged");
        Ok(positions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationOptions;
    use crate::graph::GraphGenerator;

    fn generated(n: usize, seed: u64) -> WeightedGraph {
        let options = GenerationOptions {
            nodes: n,
            seed: Some(seed),
            ..GenerationOptions::default()
        };
        GraphGenerator::new()
            .generate(&options, &mut GraphRng::new(seed))
            .unwrap()
    }

    #[test]
    fn test_positions_in_unit_box() {
        let g = generated(10, 4);
        let positions = SpringLayout::default().layout(&g, &mut GraphRng::new(4)).unwrap();
        assert_eq!(positions.len(), 10);
        let max = positions
            .iter()
            .map(|p| p.x.abs().max(p.y.abs()))
            .fold(0.0_f64, f64::max);
        assert!((max - 1.0).abs() < 1e-9, "extent {max}");
        for p in &positions {
            assert!(p.is_finite());
        }
    }

    #[test]
    fn test_layout_is_centred() {
        let g = generated(8, 2);
        let positions = SpringLayout::default().layout(&g, &mut GraphRng::new(2)).unwrap();
        let cx = positions.iter().map(|p| p.x).sum::<f64>() / 8.0;
        let cy = positions.iter().map(|p| p.y).sum::<f64>() / 8.0;
        assert!(cx.abs() < 1e-9 && cy.abs() < 1e-9);
    }

    #[test]
    fn test_nodes_do_not_overlap() {
        let g = generated(12, 8);
        let positions = SpringLayout::default().layout(&g, &mut GraphRng::new(8)).unwrap();
        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                assert!(
                    positions[i].distance_to(&positions[j]) > 1e-3,
                    "nodes {i} and {j} overlap"
                );
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let g = generated(6, 1);
        let a = SpringLayout::default().layout(&g, &mut GraphRng::new(3)).unwrap();
        let b = SpringLayout::default().layout(&g, &mut GraphRng::new(3)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_trivial_graphs() {
        let empty = WeightedGraph::with_nodes(0);
        assert!(SpringLayout::default()
            .layout(&empty, &mut GraphRng::new(1))
            .unwrap()
            .is_empty());
        let single = WeightedGraph::with_nodes(1);
        assert_eq!(
            SpringLayout::default()
                .layout(&single, &mut GraphRng::new(1))
                .unwrap(),
            vec![Position::default()]
        );
    }
}
