//! End-to-end run: generate, persist, render, solve, reconcile.
//!
//! Stages run strictly in order and the first failure aborts the run. The
//! route image is written only after reconciliation has fully succeeded.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Options;
use crate::error::GraphResult;
use crate::graph::{GraphGenerator, NodeId, WeightedGraph};
use crate::layout::{ForceDirectedLayout, SpringLayout};
use crate::record::{read_graph, write_graph};
use crate::reconcile::{reconcile_source, PathGraph, RouteSource};
use crate::render::{render_graph, render_path, write_png, RenderConfig};
use crate::rng::GraphRng;
use crate::solver::{SolverBridge, SolverOutput};

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Seed actually used for generation, when a graph was generated.
    pub seed: Option<u64>,
    /// Record written this run.
    pub graph_written: Option<PathBuf>,
    /// Full-graph image written this run.
    pub graph_image: Option<PathBuf>,
    /// Route image written this run.
    pub route_image: Option<PathBuf>,
    /// Where the reconciled route came from (`solver`, `supplied`, `none`).
    pub route_source: String,
    /// Reconciled route.
    pub route: Vec<NodeId>,
    /// Sum of the reconciled edge weights.
    pub total_weight: f64,
    /// Whether the route is a closed tour over every node.
    pub closed_tour: bool,
    /// Distance reported by the solver.
    pub solver_distance: Option<f64>,
    /// Wall time reported by the solver.
    pub solver_elapsed_ms: Option<u64>,
}

/// Drives every stage for one options snapshot.
#[derive(Debug, Clone)]
pub struct Pipeline<'a> {
    options: &'a Options,
    layout: SpringLayout,
    render: RenderConfig,
}

impl<'a> Pipeline<'a> {
    /// Pipeline with the default spring layout and render settings.
    #[must_use]
    pub fn new(options: &'a Options) -> Self {
        Self {
            options,
            layout: SpringLayout::default(),
            render: RenderConfig::default(),
        }
    }

    /// Generate a placed graph without touching the filesystem.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTopology` or `Layout` from the respective stage.
    pub fn build_graph(&self, rng: &mut GraphRng) -> GraphResult<WeightedGraph> {
        let mut graph = GraphGenerator::new().generate(&self.options.generation, rng)?;
        let positions = self.layout.layout(&graph, rng)?;
        graph.place_all(&positions)?;
        Ok(graph)
    }

    /// Execute all stages.
    ///
    /// # Errors
    ///
    /// Propagates the first stage failure; see [`crate::error::GraphError`].
    pub fn run(&self) -> GraphResult<PipelineReport> {
        self.options.check()?;
        let mut report = PipelineReport::default();
        let graph_path = self.options.graph_path();

        if self.options.run.generate {
            let mut rng = GraphRng::from_option(self.options.generation.seed);
            report.seed = Some(rng.master_seed());
            info!(seed = rng.master_seed(), "stage: generate");

            let graph = self.build_graph(&mut rng)?;
            write_graph(&graph, &graph_path)?;
            report.graph_written = Some(graph_path.clone());

            let image = self.options.graph_image_path();
            write_png(&render_graph(&graph, &self.render)?, &self.render, &image)?;
            report.graph_image = Some(image);
        } else {
            info!(path = %graph_path.display(), "stage: generate skipped, reusing record");
        }

        let solved = if self.options.run.run_solver {
            info!("stage: solve");
            Some(SolverBridge::new(&self.options.run.solver).run(&graph_path)?)
        } else {
            None
        };
        if let Some(SolverOutput {
            distance,
            elapsed_ms,
            ..
        }) = &solved
        {
            report.solver_distance = *distance;
            report.solver_elapsed_ms = *elapsed_ms;
        }

        let source = RouteSource::select(
            solved.map(|s| s.route),
            self.options.run.route.clone(),
        );
        report.route_source = source.label().to_string();
        if source == RouteSource::None {
            info!("no route to reconcile");
            return Ok(report);
        }

        info!(source = source.label(), "stage: reconcile");
        let graph = read_graph(&graph_path)?;
        let path = reconcile_source(&graph, &source)?;
        self.finish_route(&graph, &path, &source, &mut report)?;
        Ok(report)
    }

    fn finish_route(
        &self,
        graph: &WeightedGraph,
        path: &PathGraph,
        source: &RouteSource,
        report: &mut PipelineReport,
    ) -> GraphResult<()> {
        report.route = source.route().map(<[NodeId]>::to_vec).unwrap_or_default();
        report.total_weight = path.total_weight();
        report.closed_tour = path.is_closed_tour(graph.node_count());

        if path.is_empty() {
            warn!("route has fewer than two nodes, nothing to render");
            return Ok(());
        }
        if !report.closed_tour {
            warn!("route is not a closed tour over all nodes");
        }

        let image = self.options.route_image_path();
        write_png(&render_path(path, &self.render)?, &self.render, &image)?;
        info!(
            total_weight = report.total_weight,
            edges = path.edges.len(),
            "route rendered"
        );
        report.route_image = Some(image);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GraphError;
    use tempfile::TempDir;

    fn options_in(dir: &TempDir) -> Options {
        let mut options = Options::default();
        options.generation.nodes = 5;
        options.generation.seed = Some(11);
        options.run.output = dir.path().join("graph");
        options
    }

    #[test]
    fn test_generate_only() {
        let dir = TempDir::new().unwrap();
        let options = options_in(&dir);
        let report = Pipeline::new(&options).run().unwrap();

        assert_eq!(report.seed, Some(11));
        assert!(options.graph_path().exists());
        assert!(options.graph_image_path().exists());
        assert!(!options.route_image_path().exists());
        assert_eq!(report.route_source, "none");
        assert!(report.route_image.is_none());
    }

    #[test]
    fn test_supplied_route_renders() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        options.generation.debug = true;
        options.run.route = Some(vec![0, 1, 2, 3, 4, 0]);

        let report = Pipeline::new(&options).run().unwrap();
        assert_eq!(report.route_source, "supplied");
        assert!((report.total_weight - 5.0).abs() < f64::EPSILON);
        assert!(report.closed_tour);
        assert!(options.route_image_path().exists());
    }

    #[test]
    fn test_single_node_route_writes_no_image() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        options.run.route = Some(vec![2]);

        let report = Pipeline::new(&options).run().unwrap();
        assert!(report.route_image.is_none());
        assert!(!options.route_image_path().exists());
    }

    #[test]
    fn test_reuse_missing_record_fails() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        options.run.generate = false;
        options.run.route = Some(vec![0, 1]);

        let err = Pipeline::new(&options).run().unwrap_err();
        assert!(matches!(err, GraphError::MalformedRecord(_) | GraphError::Io(_)));
    }

    #[test]
    fn test_invalid_options_rejected_before_io() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        options.generation.max_weight = 0.0;

        assert!(Pipeline::new(&options).run().is_err());
        assert!(!options.graph_path().exists());
    }

    #[test]
    fn test_too_few_nodes_is_invalid_topology() {
        let dir = TempDir::new().unwrap();
        let mut options = options_in(&dir);
        options.generation.nodes = 2;

        let err = Pipeline::new(&options).run().unwrap_err();
        assert!(matches!(err, GraphError::InvalidTopology { nodes: 2, degree: 1, .. }));
        assert!(!options.graph_path().exists());
        assert!(!options.graph_image_path().exists());
    }

    #[test]
    fn test_build_graph_is_placed() {
        let dir = TempDir::new().unwrap();
        let options = options_in(&dir);
        let mut rng = GraphRng::new(3);
        let graph = Pipeline::new(&options).build_graph(&mut rng).unwrap();
        assert!(graph.is_placed());
        assert_eq!(graph.edge_count(), 20);
    }
}
