//! Solution output (§6): renders the text format consumed by an external
//! validator, one route per line, 1-indexed, depot implicit at both ends.

use crate::solution::Solution;
use crate::types::DEPOT;
use std::io::{self, Write};

/// Free-text header fields that accompany a solution but carry no
/// algorithmic meaning.
#[derive(Debug, Clone)]
pub struct SolutionMeta {
    pub instance_name: String,
    pub authors: String,
    pub date: String,
    pub reference: String,
}

impl SolutionMeta {
    pub fn new(instance_name: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
            authors: String::new(),
            date: String::new(),
            reference: String::new(),
        }
    }
}

/// Writes `solution` in the exact text format of §6: a four-line header,
/// a `Solution` marker, then one `Route <i> : ...` line per non-empty
/// route, listing only non-depot nodes.
pub fn write_solution<W: Write>(mut out: W, meta: &SolutionMeta, solution: &Solution) -> io::Result<()> {
    writeln!(out, "Instance name : {}", meta.instance_name)?;
    writeln!(out, "Authors       : {}", meta.authors)?;
    writeln!(out, "Date          : {}", meta.date)?;
    writeln!(out, "Reference     : {}", meta.reference)?;
    writeln!(out, "Solution")?;

    let mut i = 1;
    for route in solution.routes() {
        if route.is_empty() {
            continue;
        }
        let stops: Vec<String> = route
            .customers()
            .iter()
            .filter(|&&n| n != DEPOT)
            .map(|n| n.to_string())
            .collect();
        writeln!(out, "Route {} : {}", i, stops.join(" "))?;
        i += 1;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RequestId;

    #[test]
    fn writes_header_and_one_route_per_nonempty_route() {
        let mut sol = Solution::new(1);
        sol.push_new_route(1, 2, 0 as RequestId);

        let meta = SolutionMeta {
            instance_name: "demo".into(),
            authors: "Team".into(),
            date: "2026-07-28".into(),
            reference: "internal".into(),
        };

        let mut buf = Vec::new();
        write_solution(&mut buf, &meta, &sol).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("Instance name : demo\n"));
        assert!(text.contains("Authors       : Team\n"));
        assert!(text.contains("Reference     : internal\n"));
        assert!(text.contains("Solution\n"));
        assert!(text.contains("Route 1 : 1 2\n"));
    }

    #[test]
    fn skips_empty_routes_and_keeps_1_indexing_contiguous() {
        let mut sol = Solution::new(2);
        sol.push_new_route(1, 2, 0 as RequestId);
        let empty_idx = sol.push_new_route(3, 4, 1 as RequestId);
        sol.remove_request(1, 3, 4);
        let _ = empty_idx;

        let meta = SolutionMeta::new("x");
        let mut buf = Vec::new();
        write_solution(&mut buf, &meta, &sol).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert_eq!(text.matches("Route").count(), 1);
        assert!(text.contains("Route 1 : 1 2\n"));
    }
}
