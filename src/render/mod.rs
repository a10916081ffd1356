//! Platform-agnostic render commands for graph and route images.
//!
//! Scenes are built as a list of [`RenderCommand`]s in layout space
//! (`[-1, 1]²`) and only then turned into SVG and PNG, so the drawing
//! logic stays testable without touching a rasterizer.

pub mod raster;

use serde::{Deserialize, Serialize};
use std::path::Path;

use tracing::info;

use crate::error::{GraphError, GraphResult};
use crate::graph::{Position, WeightedGraph};
use crate::reconcile::PathGraph;

pub use raster::{to_png, to_svg};

/// RGBA color representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Create new color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Create opaque color.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// `#rrggbb` form.
    #[must_use]
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Alpha as a fraction in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        f64::from(self.a) / 255.0
    }

    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const NODE: Self = Self::rgb(31, 120, 180);
    pub const EDGE: Self = Self::new(0, 0, 0, 200);
    pub const ROUTE: Self = Self::rgb(214, 39, 40);
}

/// Platform-agnostic render command in layout coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RenderCommand {
    /// Fill the canvas.
    Clear { color: Color },

    /// Draw a node disc.
    DrawCircle {
        x: f64,
        y: f64,
        /// Radius in pixels.
        radius: f64,
        color: Color,
        filled: bool,
    },

    /// Directed edge from `(x1, y1)` to `(x2, y2)`. `bend` is the
    /// perpendicular offset of the control point as a fraction of the
    /// edge length (`0` is a straight line).
    DrawArrow {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        bend: f64,
        color: Color,
    },

    /// Draw text centred on `(x, y)`.
    DrawText {
        x: f64,
        y: f64,
        text: String,
        /// Font size in pixels.
        size: f64,
        color: Color,
    },
}

/// Camera/view configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center_x: f64,
    pub center_y: f64,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Camera {
    /// Camera of the given canvas size fitted to the unit layout box.
    #[must_use]
    pub fn fitted(width: f64, height: f64) -> Self {
        let mut camera = Self {
            width,
            height,
            ..Self::default()
        };
        camera.fit_bounds(-1.0, 1.0, -1.0, 1.0);
        camera
    }

    /// Convert world coordinates to screen coordinates (y grows downward).
    #[must_use]
    pub fn world_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        let sx = (x - self.center_x) * self.zoom + self.width / 2.0;
        let sy = self.height / 2.0 - (y - self.center_y) * self.zoom;
        (sx, sy)
    }

    /// Adjust zoom to fit given bounds.
    pub fn fit_bounds(&mut self, min_x: f64, max_x: f64, min_y: f64, max_y: f64) {
        self.center_x = (min_x + max_x) / 2.0;
        self.center_y = (min_y + max_y) / 2.0;

        let width_span = max_x - min_x;
        let height_span = max_y - min_y;

        let zoom_x = if width_span > 0.0 { self.width / width_span * 0.9 } else { 1.0 };
        let zoom_y = if height_span > 0.0 { self.height / height_span * 0.9 } else { 1.0 };

        self.zoom = zoom_x.min(zoom_y);
    }
}

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    pub camera: Camera,
    pub node_radius: f64,
    pub node_font_size: f64,
    pub label_font_size: f64,
    /// Curvature of full-graph edges, so both directions stay visible.
    pub edge_bend: f64,
    /// Label anchor along an edge, measured from the target end.
    pub label_pos: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            camera: Camera::fitted(800.0, 600.0),
            node_radius: 12.0,
            node_font_size: 12.0,
            label_font_size: 7.0,
            edge_bend: 0.1,
            label_pos: 0.2,
        }
    }
}

/// Edge label text: weight rounded to two decimals.
#[must_use]
pub fn weight_label(weight: f64) -> String {
    format!("{:.2}", (weight * 100.0).round() / 100.0)
}

/// Point on the quadratic curve of an arrow at parameter `t` (0 = source).
#[must_use]
pub fn arrow_point(from: Position, to: Position, bend: f64, t: f64) -> Position {
    let (cx, cy) = control_point(from, to, bend);
    let u = 1.0 - t;
    Position::new(
        u * u * from.x + 2.0 * u * t * cx + t * t * to.x,
        u * u * from.y + 2.0 * u * t * cy + t * t * to.y,
    )
}

/// Control point of a bent edge: midpoint shifted perpendicular to the edge.
#[must_use]
pub fn control_point(from: Position, to: Position, bend: f64) -> (f64, f64) {
    let (mx, my) = ((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    (mx + bend * dy, my - bend * dx)
}

fn node_commands(commands: &mut Vec<RenderCommand>, id: usize, p: Position, config: &RenderConfig) {
    commands.push(RenderCommand::DrawCircle {
        x: p.x,
        y: p.y,
        radius: config.node_radius,
        color: Color::NODE,
        filled: true,
    });
    commands.push(RenderCommand::DrawText {
        x: p.x,
        y: p.y,
        text: id.to_string(),
        size: config.node_font_size,
        color: Color::WHITE,
    });
}

fn edge_commands(
    commands: &mut Vec<RenderCommand>,
    from: Position,
    to: Position,
    weight: f64,
    bend: f64,
    color: Color,
    config: &RenderConfig,
) {
    commands.push(RenderCommand::DrawArrow {
        x1: from.x,
        y1: from.y,
        x2: to.x,
        y2: to.y,
        bend,
        color,
    });
    let anchor = arrow_point(from, to, bend, 1.0 - config.label_pos);
    commands.push(RenderCommand::DrawText {
        x: anchor.x,
        y: anchor.y,
        text: weight_label(weight),
        size: config.label_font_size,
        color: Color::BLACK,
    });
}

/// Scene for the full generated graph.
///
/// # Errors
///
/// Returns `Render` if a node has no position.
pub fn render_graph(graph: &WeightedGraph, config: &RenderConfig) -> GraphResult<Vec<RenderCommand>> {
    let position = |id| {
        graph
            .position(id)
            .ok_or_else(|| GraphError::render(format!("node {id} has no position")))
    };

    let mut commands = vec![RenderCommand::Clear { color: Color::WHITE }];
    for e in graph.edges() {
        edge_commands(
            &mut commands,
            position(e.from)?,
            position(e.to)?,
            e.weight,
            config.edge_bend,
            Color::EDGE,
            config,
        );
    }
    for id in 0..graph.node_count() {
        node_commands(&mut commands, id, position(id)?, config);
    }
    Ok(commands)
}

/// Scene for a reconciled route.
///
/// # Errors
///
/// Returns `Render` if a route node has no position.
pub fn render_path(path: &PathGraph, config: &RenderConfig) -> GraphResult<Vec<RenderCommand>> {
    let position = |id| {
        path.nodes
            .iter()
            .find(|n| n.id == id)
            .and_then(|n| n.position)
            .ok_or_else(|| GraphError::render(format!("route node {id} has no position")))
    };

    let mut commands = vec![RenderCommand::Clear { color: Color::WHITE }];
    for e in &path.edges {
        edge_commands(
            &mut commands,
            position(e.from)?,
            position(e.to)?,
            e.weight,
            0.0,
            Color::ROUTE,
            config,
        );
    }
    for node in &path.nodes {
        node_commands(&mut commands, node.id, position(node.id)?, config);
    }
    Ok(commands)
}

/// Rasterize a scene and write it as PNG.
///
/// # Errors
///
/// Returns `Render` if rasterization fails or `Io` if the write fails.
pub fn write_png(commands: &[RenderCommand], config: &RenderConfig, path: &Path) -> GraphResult<()> {
    let svg = to_svg(commands, &config.camera);
    let png = to_png(&svg, 1.0)?;
    std::fs::write(path, png)
        .map_err(|e| GraphError::io(format!("Failed to write {}: {e}", path.display())))?;
    info!(path = %path.display(), "image written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::reconcile;

    fn square() -> WeightedGraph {
        let mut g = WeightedGraph::with_nodes(4);
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        for (id, (x, y)) in corners.into_iter().enumerate() {
            g.set_position(id, Position::new(x, y)).unwrap();
        }
        for i in 0..4 {
            g.set_edge(i, (i + 1) % 4, 1.0 + i as f64).unwrap();
            g.set_edge((i + 1) % 4, i, 10.0 + i as f64).unwrap();
        }
        g
    }

    fn count(commands: &[RenderCommand], pred: fn(&RenderCommand) -> bool) -> usize {
        commands.iter().filter(|c| pred(c)).count()
    }

    #[test]
    fn test_weight_label_two_decimals() {
        assert_eq!(weight_label(12.345_6), "12.35");
        assert_eq!(weight_label(1.0), "1.00");
        assert_eq!(weight_label(0.004), "0.00");
    }

    #[test]
    fn test_render_graph_commands() {
        let commands = render_graph(&square(), &RenderConfig::default()).unwrap();
        assert!(matches!(commands[0], RenderCommand::Clear { .. }));
        assert_eq!(count(&commands, |c| matches!(c, RenderCommand::DrawArrow { .. })), 8);
        assert_eq!(count(&commands, |c| matches!(c, RenderCommand::DrawCircle { .. })), 4);
        // One label per edge plus one per node.
        assert_eq!(count(&commands, |c| matches!(c, RenderCommand::DrawText { .. })), 12);
    }

    #[test]
    fn test_graph_edges_are_bent() {
        let commands = render_graph(&square(), &RenderConfig::default()).unwrap();
        for c in &commands {
            if let RenderCommand::DrawArrow { bend, .. } = c {
                assert!((bend - 0.1).abs() < f64::EPSILON);
            }
        }
    }

    #[test]
    fn test_render_graph_requires_positions() {
        let mut g = WeightedGraph::with_nodes(2);
        g.set_edge(0, 1, 1.0).unwrap();
        assert!(matches!(
            render_graph(&g, &RenderConfig::default()),
            Err(GraphError::Render(_))
        ));
    }

    #[test]
    fn test_render_path_labels() {
        let path = reconcile(&square(), &[0, 1, 2]).unwrap();
        let commands = render_path(&path, &RenderConfig::default()).unwrap();
        let labels: Vec<&str> = commands
            .iter()
            .filter_map(|c| match c {
                RenderCommand::DrawText { text, size, .. } if (*size - 7.0).abs() < 1e-9 => {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec!["1.00", "2.00"]);
    }

    #[test]
    fn test_label_near_target() {
        let from = Position::new(0.0, 0.0);
        let to = Position::new(1.0, 0.0);
        let p = arrow_point(from, to, 0.0, 0.8);
        assert!((p.x - 0.8).abs() < 1e-12 && p.y.abs() < 1e-12);
    }

    #[test]
    fn test_opposite_edges_bend_apart() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(1.0, 0.0);
        let (_, forward) = control_point(a, b, 0.1);
        let (_, backward) = control_point(b, a, 0.1);
        assert!(forward < 0.0 && backward > 0.0);
    }

    #[test]
    fn test_camera_fits_unit_box() {
        let camera = Camera::fitted(800.0, 600.0);
        let (x0, y0) = camera.world_to_screen(-1.0, 1.0);
        let (x1, y1) = camera.world_to_screen(1.0, -1.0);
        assert!(x0 >= 0.0 && y0 >= 0.0);
        assert!(x1 <= 800.0 && y1 <= 600.0);
        let (cx, cy) = camera.world_to_screen(0.0, 0.0);
        assert!((cx - 400.0).abs() < 1e-9 && (cy - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::NODE.hex(), "#1f78b4");
        assert!((Color::WHITE.opacity() - 1.0).abs() < f64::EPSILON);
    }
}
