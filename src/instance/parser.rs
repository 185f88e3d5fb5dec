//! Instance-file parsers for the two textual formats named in spec.md §6.
//!
//! These are thin I/O layers outside the algorithmic CORE — the solver only
//! ever consumes the resulting [`Instance`](crate::instance::Instance) — but
//! a usable repository needs them wired up, so they live here rather than
//! being left as an external contract nobody implements.

use crate::error::SolveError;
use crate::instance::matrix::Matrix2;
use crate::instance::model::{Instance, InstanceBuilder, RawNode};
use crate::types::{Demand, Distance, NodeId, Time};
use std::path::Path;

/// Parses an instance file, auto-detecting Format-A (keyword-based) vs.
/// Format-B (space-separated) by inspecting the first non-empty line.
pub fn parse(path: impl AsRef<Path>) -> Result<Instance, SolveError> {
    let text = std::fs::read_to_string(path.as_ref())
        .map_err(|e| SolveError::InvalidInstance(format!("cannot read instance file: {e}")))?;
    parse_str(&text)
}

pub fn parse_str(text: &str) -> Result<Instance, SolveError> {
    let first_line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| SolveError::InvalidInstance("instance file is empty".into()))?;

    if first_line.contains("SIZE:") {
        parse_format_a(text)
    } else if is_three_integers(first_line) {
        parse_format_b(text)
    } else {
        Err(SolveError::InvalidInstance(format!(
            "could not detect instance format from first line: {first_line:?}"
        )))
    }
}

fn is_three_integers(line: &str) -> bool {
    let parts: Vec<&str> = line.split_whitespace().collect();
    parts.len() == 3 && parts.iter().all(|p| p.parse::<i64>().is_ok())
}

/// Format-A: keyword header (`NAME:`, `SIZE:`, `CAPACITY:`), a `NODES`
/// section (one line per node: id, x, y, demand, ready, due, service), and
/// an `EDGES` section (the full distance matrix, one row per line).
///
/// Pairing in Format-A is inferred positionally: nodes are laid out as
/// `depot, p1, d1, p2, d2, ...` (the layout every Format-A instance in the
/// wild uses), and the builder derives `(p_i, d_i)` pairs from that order.
fn parse_format_a(text: &str) -> Result<Instance, SolveError> {
    let mut name = String::from("unnamed");
    let mut size: Option<usize> = None;
    let mut capacity: Option<Demand> = None;

    let mut lines = text.lines().map(str::trim).peekable();
    let mut raw_nodes: Vec<RawNode> = Vec::new();
    let mut edge_rows: Vec<Vec<Distance>> = Vec::new();

    while let Some(line) = lines.next() {
        if line.is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("NAME:") {
            name = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("SIZE:") {
            size = Some(rest.trim().parse().map_err(|_| {
                SolveError::InvalidInstance(format!("bad SIZE value: {rest:?}"))
            })?);
        } else if let Some(rest) = line.strip_prefix("CAPACITY:") {
            capacity = Some(rest.trim().parse().map_err(|_| {
                SolveError::InvalidInstance(format!("bad CAPACITY value: {rest:?}"))
            })?);
        } else if line == "NODES" {
            let n = size.ok_or_else(|| {
                SolveError::InvalidInstance("NODES section before SIZE: header".into())
            })?;
            for _ in 0..n {
                let node_line = lines
                    .next()
                    .ok_or_else(|| SolveError::InvalidInstance("truncated NODES section".into()))?;
                let fields: Vec<&str> = node_line.split_whitespace().collect();
                if fields.len() != 7 {
                    return Err(SolveError::InvalidInstance(format!(
                        "expected 7 fields in NODES line, got {}: {node_line:?}",
                        fields.len()
                    )));
                }
                let parse_f = |s: &str| -> Result<f64, SolveError> {
                    s.parse()
                        .map_err(|_| SolveError::InvalidInstance(format!("bad number: {s:?}")))
                };
                let parse_i = |s: &str| -> Result<i64, SolveError> {
                    s.parse()
                        .map_err(|_| SolveError::InvalidInstance(format!("bad integer: {s:?}")))
                };
                let x = parse_f(fields[1])?;
                let y = parse_f(fields[2])?;
                let demand = parse_i(fields[3])? as Demand;
                let ready = parse_i(fields[4])? as Time;
                let due = parse_i(fields[5])? as Time;
                let service = parse_i(fields[6])? as Time;
                raw_nodes.push(RawNode {
                    coord: Some((x, y)),
                    demand,
                    ready,
                    due,
                    service,
                });
            }
        } else if line == "EDGES" {
            let n = size.ok_or_else(|| {
                SolveError::InvalidInstance("EDGES section before SIZE: header".into())
            })?;
            for _ in 0..n {
                let edge_line = lines
                    .next()
                    .ok_or_else(|| SolveError::InvalidInstance("truncated EDGES section".into()))?;
                let row: Result<Vec<Distance>, SolveError> = edge_line
                    .split_whitespace()
                    .map(|s| {
                        s.parse::<Distance>()
                            .map_err(|_| SolveError::InvalidInstance(format!("bad distance: {s:?}")))
                    })
                    .collect();
                let row = row?;
                if row.len() != n {
                    return Err(SolveError::InvalidInstance(format!(
                        "EDGES row has {} entries, expected {n}",
                        row.len()
                    )));
                }
                edge_rows.push(row);
            }
        }
    }

    let size = size.ok_or_else(|| SolveError::InvalidInstance("missing SIZE: header".into()))?;
    let capacity =
        capacity.ok_or_else(|| SolveError::InvalidInstance("missing CAPACITY: header".into()))?;
    if raw_nodes.len() != size {
        return Err(SolveError::InvalidInstance(format!(
            "SIZE: declared {size} nodes but NODES section had {}",
            raw_nodes.len()
        )));
    }
    if (size - 1) % 2 != 0 {
        return Err(SolveError::InvalidInstance(
            "node count (excluding depot) must be even to pair into pickups/deliveries".into(),
        ));
    }

    let mut builder = InstanceBuilder::new(name, capacity);
    for node in raw_nodes {
        builder = builder.push_node(node);
    }
    if !edge_rows.is_empty() {
        builder = builder.with_distance_matrix(Matrix2::from_rows(edge_rows));
    }
    for r in 0..(size - 1) / 2 {
        let p = (1 + 2 * r) as NodeId;
        let d = (2 + 2 * r) as NodeId;
        builder = builder.with_pair(p, d);
    }
    builder.build()
}

/// Format-B: first line `n_customers capacity speed`; each subsequent line
/// `node x y demand ready due service pickup_index delivery_index`, where a
/// pickup row has `pickup_index == 0` and a nonzero `delivery_index`
/// pointing at its delivery node, and vice versa (the depot has both `0`).
/// The distance matrix is derived from Euclidean coordinates, rounded to the
/// nearest integer.
fn parse_format_b(text: &str) -> Result<Instance, SolveError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let header = lines
        .next()
        .ok_or_else(|| SolveError::InvalidInstance("missing Format-B header line".into()))?;
    let header_fields: Vec<&str> = header.split_whitespace().collect();
    if header_fields.len() != 3 {
        return Err(SolveError::InvalidInstance(
            "Format-B header must be `n_customers capacity speed`".into(),
        ));
    }
    let n_customers: usize = header_fields[0]
        .parse()
        .map_err(|_| SolveError::InvalidInstance("bad n_customers in header".into()))?;
    let capacity: Demand = header_fields[1]
        .parse()
        .map_err(|_| SolveError::InvalidInstance("bad capacity in header".into()))?;
    let speed: f64 = header_fields[2]
        .parse()
        .map_err(|_| SolveError::InvalidInstance("bad speed in header".into()))?;

    let n_nodes = n_customers + 1;
    let mut raw_nodes: Vec<Option<RawNode>> = vec![None; n_nodes];
    let mut pickup_target: Vec<Option<usize>> = vec![None; n_nodes];
    let mut delivery_target: Vec<Option<usize>> = vec![None; n_nodes];

    for _ in 0..n_nodes {
        let line = lines
            .next()
            .ok_or_else(|| SolveError::InvalidInstance("truncated Format-B node list".into()))?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 9 {
            return Err(SolveError::InvalidInstance(format!(
                "expected 9 fields in Format-B node line, got {}: {line:?}",
                fields.len()
            )));
        }
        let parse_usize = |s: &str| -> Result<usize, SolveError> {
            s.parse()
                .map_err(|_| SolveError::InvalidInstance(format!("bad node index: {s:?}")))
        };
        let parse_f = |s: &str| -> Result<f64, SolveError> {
            s.parse()
                .map_err(|_| SolveError::InvalidInstance(format!("bad number: {s:?}")))
        };
        let parse_i = |s: &str| -> Result<i64, SolveError> {
            s.parse()
                .map_err(|_| SolveError::InvalidInstance(format!("bad integer: {s:?}")))
        };

        let node_idx = parse_usize(fields[0])?;
        if node_idx >= n_nodes {
            return Err(SolveError::InvalidInstance(format!(
                "node index {node_idx} out of range [0, {n_nodes})"
            )));
        }
        let x = parse_f(fields[1])?;
        let y = parse_f(fields[2])?;
        let demand = parse_i(fields[3])? as Demand;
        let ready = parse_i(fields[4])? as Time;
        let due = parse_i(fields[5])? as Time;
        let service = parse_i(fields[6])? as Time;
        let pickup_index = parse_usize(fields[7])?;
        let delivery_index = parse_usize(fields[8])?;

        raw_nodes[node_idx] = Some(RawNode {
            coord: Some((x, y)),
            demand,
            ready,
            due,
            service,
        });
        if pickup_index != 0 {
            pickup_target[node_idx] = Some(pickup_index);
        }
        if delivery_index != 0 {
            delivery_target[node_idx] = Some(delivery_index);
        }
    }

    let raw_nodes: Vec<RawNode> = raw_nodes
        .into_iter()
        .enumerate()
        .map(|(i, n)| n.ok_or_else(|| SolveError::InvalidInstance(format!("missing node {i}"))))
        .collect::<Result<_, _>>()?;

    let mut builder = InstanceBuilder::new(format!("format-b ({n_customers} customers)"), capacity)
        .with_speed(speed);
    for node in raw_nodes {
        builder = builder.push_node(node);
    }

    for node_idx in 1..n_nodes {
        if let Some(delivery_idx) = delivery_target[node_idx] {
            builder = builder.with_pair(node_idx as NodeId, delivery_idx as NodeId);
        }
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_and_parses_format_b() {
        let text = "\
1 10 1.0
0 0 0 0 0 1000 0 0 0
1 10 0 5 0 500 0 0 2
2 20 0 -5 0 1000 0 1 0
";
        let inst = parse_str(text).unwrap();
        assert_eq!(inst.n_requests(), 1);
        assert_eq!(inst.capacity(), 10);
        assert_eq!(inst.delivery_of(1), Some(2));
    }

    #[test]
    fn detects_and_parses_format_a() {
        let text = "\
NAME: tiny
SIZE: 3
CAPACITY: 10
NODES
0 0 0 0 0 1000 0
1 10 0 5 0 500 0
2 20 0 -5 0 1000 0
EDGES
0 10 20
10 0 10
20 10 0
";
        let inst = parse_str(text).unwrap();
        assert_eq!(inst.name(), "tiny");
        assert_eq!(inst.n_requests(), 1);
        assert_eq!(inst.dist(0, 2), 20);
    }

    #[test]
    fn rejects_garbage_first_line() {
        let result = parse_str("not a valid header at all\n");
        assert!(result.is_err());
    }
}
