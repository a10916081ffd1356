//! SVG serialization and PNG rasterization of render commands.

use std::fmt::Write as _;

use tiny_skia::{Pixmap, Transform};

use super::{Camera, Color, RenderCommand};
use crate::error::{GraphError, GraphResult};

const ARROW_LENGTH: f64 = 9.0;
const ARROW_WIDTH: f64 = 3.5;
/// Gap left between an arrow tip and the target node centre, in pixels.
const NODE_CLEARANCE: f64 = 13.0;

fn unit(dx: f64, dy: f64) -> (f64, f64) {
    let len = dx.hypot(dy);
    if len < 1e-9 {
        (0.0, 0.0)
    } else {
        (dx / len, dy / len)
    }
}

fn write_arrow(
    svg: &mut String,
    camera: &Camera,
    (x1, y1, x2, y2): (f64, f64, f64, f64),
    bend: f64,
    color: Color,
) {
    let (sx, sy) = camera.world_to_screen(x1, y1);
    let (ex, ey) = camera.world_to_screen(x2, y2);
    // Bend in screen space; y is flipped so the sign follows.
    let (dx, dy) = (ex - sx, ey - sy);
    let (cx, cy) = ((sx + ex) / 2.0 - bend * dy, (sy + ey) / 2.0 + bend * dx);

    let (ux, uy) = unit(cx - sx, cy - sy);
    let (sx, sy) = (sx + ux * NODE_CLEARANCE, sy + uy * NODE_CLEARANCE);
    let (vx, vy) = unit(ex - cx, ey - cy);
    let (tx, ty) = (ex - vx * NODE_CLEARANCE, ey - vy * NODE_CLEARANCE);
    let (bx, by) = (tx - vx * ARROW_LENGTH, ty - vy * ARROW_LENGTH);

    let stroke = color.hex();
    let opacity = color.opacity();
    let _ = writeln!(
        svg,
        r#"  <path d="M {sx:.2} {sy:.2} Q {cx:.2} {cy:.2} {bx:.2} {by:.2}" fill="none" stroke="{stroke}" stroke-opacity="{opacity:.3}" stroke-width="1"/>"#
    );
    let (px, py) = (-vy * ARROW_WIDTH, vx * ARROW_WIDTH);
    let _ = writeln!(
        svg,
        r#"  <polygon points="{tx:.2},{ty:.2} {:.2},{:.2} {:.2},{:.2}" fill="{stroke}" fill-opacity="{opacity:.3}"/>"#,
        bx + px,
        by + py,
        bx - px,
        by - py
    );
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Serialize commands into a standalone SVG document.
#[must_use]
pub fn to_svg(commands: &[RenderCommand], camera: &Camera) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = camera.width,
        h = camera.height
    );

    for cmd in commands {
        match cmd {
            RenderCommand::Clear { color } => {
                let _ = writeln!(
                    svg,
                    r#"  <rect x="0" y="0" width="100%" height="100%" fill="{}"/>"#,
                    color.hex()
                );
            }
            RenderCommand::DrawCircle {
                x,
                y,
                radius,
                color,
                filled,
            } => {
                let (sx, sy) = camera.world_to_screen(*x, *y);
                let paint = if *filled {
                    format!(r#"fill="{}""#, color.hex())
                } else {
                    format!(r#"fill="none" stroke="{}""#, color.hex())
                };
                let _ = writeln!(
                    svg,
                    r#"  <circle cx="{sx:.2}" cy="{sy:.2}" r="{radius:.2}" {paint}/>"#
                );
            }
            RenderCommand::DrawArrow {
                x1,
                y1,
                x2,
                y2,
                bend,
                color,
            } => write_arrow(&mut svg, camera, (*x1, *y1, *x2, *y2), *bend, *color),
            RenderCommand::DrawText {
                x,
                y,
                text,
                size,
                color,
            } => {
                let (sx, sy) = camera.world_to_screen(*x, *y);
                let _ = writeln!(
                    svg,
                    r#"  <text x="{sx:.2}" y="{sy:.2}" font-family="sans-serif" font-size="{size}" text-anchor="middle" dominant-baseline="central" fill="{}" stroke="white" stroke-width="2" paint-order="stroke">{}</text>"#,
                    color.hex(),
                    escape(text)
                );
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Rasterize an SVG document to PNG bytes at the given scale.
///
/// # Errors
///
/// Returns `Render` if the scale is unusable, the SVG does not parse, or
/// encoding fails.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn to_png(svg: &str, scale: f32) -> GraphResult<Vec<u8>> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(GraphError::render("scale must be a positive finite number"));
    }

    let mut options = resvg::usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = resvg::usvg::Tree::from_str(svg, &options)
        .map_err(|e| GraphError::render(format!("failed to parse generated SVG: {e}")))?;

    let size = tree.size().to_int_size();
    let width = (size.width() as f32 * scale).ceil();
    let height = (size.height() as f32 * scale).ceil();
    if width < 1.0 || height < 1.0 || width > u32::MAX as f32 || height > u32::MAX as f32 {
        return Err(GraphError::render(format!(
            "scaled canvas {width}x{height} is out of range"
        )));
    }

    let mut pixmap = Pixmap::new(width as u32, height as u32).ok_or_else(|| {
        GraphError::render(format!("failed to allocate {width}x{height} surface"))
    })?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| GraphError::render(format!("failed to encode PNG: {e}")))
}
