//! External solver bridge.
//!
//! The solver is a separate parallel program. It is started through a
//! launcher with the compute-node arguments produced by a discovery helper
//! and the absolute path of the graph record:
//!
//! ```text
//! <launcher> -n <processes> <node args...> <program> /abs/path/graph.g
//! ```
//!
//! Its standard output is captured in full. The first line carries the
//! route and must match:
//!
//! ```text
//! Route: 0 4 2 1 3 0          (or `ROUTE 0 4 2 1 3 0`)
//! Distance: 412.87            (optional)
//! Time elapsed: 35ms          (optional)
//! ```
//!
//! Anything else is an `ExternalProcessFailure`. Calls block with no
//! timeout and are never retried.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, info};

use crate::config::SolverConfig;
use crate::error::{GraphError, GraphResult};
use crate::graph::NodeId;

/// Accepted first tokens of the route line.
pub const ROUTE_HEADERS: [&str; 2] = ["Route:", "ROUTE"];

const DISTANCE_PREFIX: &str = "Distance:";
const ELAPSED_PREFIX: &str = "Time elapsed:";

/// Parsed solver output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOutput {
    /// Route in visiting order.
    pub route: Vec<NodeId>,
    /// Tour length reported by the solver.
    pub distance: Option<f64>,
    /// Wall time reported by the solver.
    pub elapsed_ms: Option<u64>,
    /// Full captured standard output.
    pub raw: String,
}

/// Parse captured solver output.
///
/// # Errors
///
/// Returns `ExternalProcessFailure` if the first line is missing, has an
/// unknown header, an empty route, or a non-integer token.
pub fn parse_solver_output(text: &str) -> GraphResult<SolverOutput> {
    let mut lines = text.lines();
    let first = lines
        .next()
        .ok_or_else(|| GraphError::external("solver produced no output"))?;

    let mut tokens = first.split_whitespace();
    let header = tokens
        .next()
        .ok_or_else(|| GraphError::external("route line is empty"))?;
    if !ROUTE_HEADERS.contains(&header) {
        return Err(GraphError::external(format!(
            "expected route header {ROUTE_HEADERS:?}, found {header:?}"
        )));
    }

    let route = tokens
        .map(|tok| {
            tok.parse::<NodeId>()
                .map_err(|_| GraphError::external(format!("invalid node id {tok:?} in route")))
        })
        .collect::<GraphResult<Vec<_>>>()?;
    if route.is_empty() {
        return Err(GraphError::external("route line carries no node ids"));
    }

    let mut distance = None;
    let mut elapsed_ms = None;
    for line in lines {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(DISTANCE_PREFIX) {
            distance = rest.trim().parse::<f64>().ok();
        } else if let Some(rest) = line.strip_prefix(ELAPSED_PREFIX) {
            elapsed_ms = rest.trim().trim_end_matches("ms").trim().parse::<u64>().ok();
        }
    }

    Ok(SolverOutput {
        route,
        distance,
        elapsed_ms,
        raw: text.to_string(),
    })
}

/// Launches the external solver.
#[derive(Debug, Clone)]
pub struct SolverBridge<'a> {
    config: &'a SolverConfig,
}

impl<'a> SolverBridge<'a> {
    /// Create a bridge over a solver configuration.
    #[must_use]
    pub const fn new(config: &'a SolverConfig) -> Self {
        Self { config }
    }

    /// Run a helper and return its stdout, failing on spawn error or non-zero exit.
    fn capture(program: &str, args: &[String]) -> GraphResult<String> {
        debug!(program, ?args, "spawning external process");
        let output: Output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| GraphError::external(format!("failed to start {program}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GraphError::external(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| GraphError::external(format!("{program} wrote non-UTF-8 output: {e}")))
    }

    /// Resolve launcher arguments for the compute nodes.
    ///
    /// # Errors
    ///
    /// Returns `ExternalProcessFailure` if the discovery helper fails.
    pub fn discover_nodes(&self) -> GraphResult<Vec<String>> {
        let Some(helper) = self.config.node_discovery.as_deref() else {
            return Ok(Vec::new());
        };
        let out = Self::capture(
            helper,
            &[self.config.compute_nodes.display().to_string()],
        )?;
        Ok(out.split_whitespace().map(str::to_string).collect())
    }

    /// Full command line: the launcher followed by its arguments.
    #[must_use]
    pub fn command_line(&self, node_args: &[String], graph_path: &Path) -> Vec<String> {
        let mut args = vec![
            self.config.launcher.clone(),
            "-n".to_string(),
            self.config.processes.to_string(),
        ];
        args.extend(node_args.iter().cloned());
        args.push(self.config.program.display().to_string());
        args.push(graph_path.display().to_string());
        args
    }

    /// Run the solver on the record at `graph_path`.
    ///
    /// # Errors
    ///
    /// Returns `ExternalProcessFailure` if node discovery or the solver
    /// fails, or its output breaks the route protocol.
    pub fn run(&self, graph_path: &Path) -> GraphResult<SolverOutput> {
        let absolute = absolute_path(graph_path)?;
        let node_args = self.discover_nodes()?;
        let command = self.command_line(&node_args, &absolute);

        info!("Running: {}", command.join(" "));
        let out = Self::capture(&self.config.launcher, &command[1..])?;

        info!("---------- PROGRAM OUTPUT ----------");
        for line in out.lines() {
            info!("{line}");
        }
        info!("---------- PROGRAM OUTPUT ----------");

        let parsed = parse_solver_output(&out)?;
        info!(
            route_len = parsed.route.len(),
            distance = ?parsed.distance,
            elapsed_ms = ?parsed.elapsed_ms,
            "solver route received"
        );
        Ok(parsed)
    }
}

/// Make `path` absolute against the current directory.
fn absolute_path(path: &Path) -> GraphResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_output() {
        let out = "Route: 0 3 1 2 0 \nDistance: 412.5\nTime elapsed: 35ms\n";
        let parsed = parse_solver_output(out).unwrap();
        assert_eq!(parsed.route, vec![0, 3, 1, 2, 0]);
        assert_eq!(parsed.distance, Some(412.5));
        assert_eq!(parsed.elapsed_ms, Some(35));
        assert_eq!(parsed.raw, out);
    }

    #[test]
    fn test_parse_uppercase_header() {
        let parsed = parse_solver_output("ROUTE 2 1 0").unwrap();
        assert_eq!(parsed.route, vec![2, 1, 0]);
        assert_eq!(parsed.distance, None);
        assert_eq!(parsed.elapsed_ms, None);
    }

    #[test]
    fn test_parse_wrong_header() {
        let err = parse_solver_output("Best: 0 1 2").unwrap_err();
        assert!(matches!(err, GraphError::ExternalProcessFailure(_)));
        assert!(err.to_string().contains("Best"));
    }

    #[test]
    fn test_parse_empty_output() {
        assert!(parse_solver_output("").is_err());
        assert!(parse_solver_output("\nDistance: 3").is_err());
    }

    #[test]
    fn test_parse_route_without_ids() {
        let err = parse_solver_output("Route:\nDistance: 1").unwrap_err();
        assert!(err.to_string().contains("no node ids"));
    }

    #[test]
    fn test_parse_bad_token() {
        let err = parse_solver_output("Route: 0 x 2").unwrap_err();
        assert!(err.to_string().contains("\"x\""));
        assert!(parse_solver_output("Route: 0 -1 2").is_err());
    }

    #[test]
    fn test_command_line() {
        let config = SolverConfig {
            processes: 4,
            program: PathBuf::from("./solver"),
            ..SolverConfig::default()
        };
        let bridge = SolverBridge::new(&config);
        let args = bridge.command_line(
            &["-ssh-servers".to_string(), "a,b".to_string()],
            Path::new("/data/g.g"),
        );
        assert_eq!(
            args,
            vec!["upcxx-run", "-n", "4", "-ssh-servers", "a,b", "./solver", "/data/g.g"]
        );
    }

    #[test]
    fn test_discovery_disabled() {
        let config = SolverConfig {
            node_discovery: None,
            ..SolverConfig::default()
        };
        assert!(SolverBridge::new(&config).discover_nodes().unwrap().is_empty());
    }

    #[test]
    fn test_missing_launcher() {
        let config = SolverConfig {
            launcher: "/nonexistent/launcher-binary".to_string(),
            node_discovery: None,
            ..SolverConfig::default()
        };
        let err = SolverBridge::new(&config)
            .run(Path::new("graph.g"))
            .unwrap_err();
        assert!(matches!(err, GraphError::ExternalProcessFailure(_)));
    }

    #[test]
    fn test_absolute_path() {
        let abs = absolute_path(Path::new("relative/graph.g")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("relative/graph.g"));
    }
}
