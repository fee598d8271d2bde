//! Constellation layout: deterministic rank/column geometry for a
//! waypoint DAG.
//!
//! Pure functions of `(waypoints, bounds)`: no entity is ever mutated
//! and nothing here is persisted. Rank is the longest-path distance from
//! any root waypoint; ranks render bottom-up, so rank 0 sits at the
//! bottom edge of the canvas. Ranks are computed iteratively with
//! explicit cycle detection: a cyclic `unblocks` relation is an error,
//! not an infinite loop.

use std::collections::{HashMap, HashSet, VecDeque};

use thiserror::Error;

use crate::models::Waypoint;

/// Visual radius of a waypoint node; edge segments are trimmed by this
/// amount at both ends.
pub const NODE_RADIUS: f64 = 20.0;

/// Minimum distance between node centers on either axis.
const MIN_SPACING: f64 = NODE_RADIUS * 3.0;

/// Default canvas margin.
pub const DEFAULT_PADDING: f64 = 50.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    /// The `unblocks` relation contains a cycle and cannot be ranked.
    #[error("waypoint dependencies contain a cycle")]
    CyclicDependency,
}

/// Canvas dimensions the layout must fit into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutBounds {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
}

impl LayoutBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding: DEFAULT_PADDING,
        }
    }

    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }
}

/// Computed position of one waypoint.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointPosition {
    pub waypoint_id: String,
    pub x: f64,
    pub y: f64,
    pub rank: usize,
    pub column: usize,
}

/// One drawable `unblocks` edge, trimmed to run edge-to-edge between the
/// two node circles rather than center-to-center.
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointLink {
    pub source_id: String,
    pub target_id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

/// Complete layout for one waypoint set. Regenerated on every request;
/// never stored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstellationLayout {
    pub positions: HashMap<String, WaypointPosition>,
    pub links: Vec<WaypointLink>,
}

/// Map from waypoint ID to the IDs of its dependencies: the waypoints
/// that list it in their `unblocks`. Edges to IDs absent from the input
/// set are dropped.
fn dependency_map(waypoints: &[Waypoint]) -> HashMap<&str, Vec<&str>> {
    let known: HashSet<&str> = waypoints.iter().map(|w| w.id.as_str()).collect();
    let mut deps: HashMap<&str, Vec<&str>> =
        waypoints.iter().map(|w| (w.id.as_str(), Vec::new())).collect();

    for waypoint in waypoints {
        for target in &waypoint.unblocks {
            if known.contains(target.as_str()) {
                if let Some(entry) = deps.get_mut(target.as_str()) {
                    entry.push(waypoint.id.as_str());
                }
            }
        }
    }
    deps
}

/// Assigns a rank to every waypoint: 0 for roots, otherwise one more
/// than the highest-ranked dependency.
///
/// Processes the graph in topological order (Kahn) so a cycle is
/// detected instead of recursed into.
pub fn waypoint_ranks(waypoints: &[Waypoint]) -> Result<HashMap<String, usize>, LayoutError> {
    let deps = dependency_map(waypoints);

    let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(waypoints.len());
    for waypoint in waypoints {
        in_degree.insert(waypoint.id.as_str(), deps[waypoint.id.as_str()].len());
    }

    let by_id: HashMap<&str, &Waypoint> =
        waypoints.iter().map(|w| (w.id.as_str(), w)).collect();

    let mut ranks: HashMap<String, usize> = HashMap::with_capacity(waypoints.len());
    let mut queue: VecDeque<&str> = waypoints
        .iter()
        .filter(|w| in_degree[w.id.as_str()] == 0)
        .map(|w| w.id.as_str())
        .collect();

    for id in &queue {
        ranks.insert((*id).to_string(), 0);
    }

    let mut processed = 0;
    while let Some(id) = queue.pop_front() {
        processed += 1;
        let rank = ranks[id];
        for target in &by_id[id].unblocks {
            let Some(degree) = in_degree.get_mut(target.as_str()) else {
                continue; // edge to a waypoint outside the input set
            };
            let entry = ranks.entry(target.clone()).or_insert(0);
            *entry = (*entry).max(rank + 1);
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(target.as_str());
            }
        }
    }

    // Nodes inside or behind a cycle never reach in-degree zero.
    if processed != waypoints.len() {
        return Err(LayoutError::CyclicDependency);
    }
    Ok(ranks)
}

/// Assigns a column index to every waypoint within its rank group.
///
/// Rank 0 takes list order. For each higher rank, waypoints with exactly
/// one dependency first try to inherit the dependency's column (claimed
/// at most once per rank), and everything still unassigned takes the
/// lowest unclaimed column scanning up from 0. Chains stay vertically
/// aligned; branches and merges pack without gaps.
pub fn waypoint_columns(
    waypoints: &[Waypoint],
    ranks: &HashMap<String, usize>,
) -> HashMap<String, usize> {
    let deps = dependency_map(waypoints);

    // Group by rank, preserving input order within each group.
    let mut rank_groups: HashMap<usize, Vec<&str>> = HashMap::new();
    for waypoint in waypoints {
        if let Some(rank) = ranks.get(&waypoint.id) {
            rank_groups.entry(*rank).or_default().push(waypoint.id.as_str());
        }
    }

    let mut sorted_ranks: Vec<usize> = rank_groups.keys().copied().collect();
    sorted_ranks.sort_unstable();

    let mut columns: HashMap<String, usize> = HashMap::with_capacity(waypoints.len());

    let Some((&first_rank, higher_ranks)) = sorted_ranks.split_first() else {
        return columns;
    };
    for (index, id) in rank_groups[&first_rank].iter().enumerate() {
        columns.insert((*id).to_string(), index);
    }

    for rank in higher_ranks {
        let group = &rank_groups[rank];
        let mut used: HashSet<usize> = HashSet::new();

        // First pass: single-dependency waypoints inherit their
        // dependency's column when it's still free in this rank.
        for id in group {
            let dependencies = &deps[*id];
            if let [single] = dependencies.as_slice() {
                if let Some(&dep_column) = columns.get(*single) {
                    if used.insert(dep_column) {
                        columns.insert((*id).to_string(), dep_column);
                    }
                }
            }
        }

        // Second pass: everything else takes the lowest unclaimed column.
        let mut next_available = 0;
        for id in group {
            if columns.contains_key(*id) {
                continue;
            }
            while used.contains(&next_available) {
                next_available += 1;
            }
            columns.insert((*id).to_string(), next_available);
            used.insert(next_available);
            next_available += 1;
        }
    }

    columns
}

struct Spacing {
    horizontal: f64,
    vertical: f64,
    offset_x: f64,
    offset_y: f64,
}

/// Spacing that fits the grid to the canvas: available span divided by
/// the gap count, floored at [`MIN_SPACING`] so nodes never overlap.
/// Horizontally centered; vertically anchored so rank 0 sits at the
/// bottom edge.
fn optimal_spacing(bounds: &LayoutBounds, num_columns: usize, num_ranks: usize) -> Spacing {
    let available_width = bounds.width - bounds.padding * 2.0;
    let available_height = bounds.height - bounds.padding * 2.0;

    let ideal_horizontal = if num_columns > 1 {
        available_width / (num_columns - 1) as f64
    } else {
        available_width / 2.0
    };
    let ideal_vertical = if num_ranks > 1 {
        available_height / (num_ranks - 1) as f64
    } else {
        available_height / 2.0
    };

    let horizontal = ideal_horizontal.max(MIN_SPACING);
    let vertical = ideal_vertical.max(MIN_SPACING);

    let total_width = (num_columns - 1) as f64 * horizontal;
    let total_height = (num_ranks - 1) as f64 * vertical;

    let offset_x = bounds.padding + (available_width - total_width) / 2.0;
    let offset_y = available_height - total_height - bounds.padding;

    Spacing {
        horizontal,
        vertical,
        offset_x: offset_x.max(bounds.padding),
        offset_y: offset_y.max(bounds.padding),
    }
}

/// Computes the full constellation layout for a waypoint set.
///
/// An empty input yields an empty layout. Edges referencing waypoints
/// outside the input set are ignored.
pub fn compute_layout(
    waypoints: &[Waypoint],
    bounds: &LayoutBounds,
) -> Result<ConstellationLayout, LayoutError> {
    if waypoints.is_empty() {
        return Ok(ConstellationLayout::default());
    }

    let ranks = waypoint_ranks(waypoints)?;
    let columns = waypoint_columns(waypoints, &ranks);

    let max_rank = ranks.values().copied().max().unwrap_or(0);
    let max_column = columns.values().copied().max().unwrap_or(0);
    let spacing = optimal_spacing(bounds, max_column + 1, max_rank + 1);

    let mut positions: HashMap<String, WaypointPosition> =
        HashMap::with_capacity(waypoints.len());

    for waypoint in waypoints {
        let rank = ranks.get(&waypoint.id).copied().unwrap_or(0);
        let column = columns.get(&waypoint.id).copied().unwrap_or(0);

        let x = column as f64 * spacing.horizontal + spacing.offset_x;
        // Flip the Y axis: higher ranks render upward, rank 0 at the bottom.
        let y = (max_rank - rank) as f64 * spacing.vertical + spacing.offset_y;

        positions.insert(
            waypoint.id.clone(),
            WaypointPosition {
                waypoint_id: waypoint.id.clone(),
                x,
                y,
                rank,
                column,
            },
        );
    }

    let mut links = Vec::new();
    for waypoint in waypoints {
        for target in &waypoint.unblocks {
            let (Some(source_pos), Some(target_pos)) =
                (positions.get(&waypoint.id), positions.get(target))
            else {
                continue;
            };

            let dx = target_pos.x - source_pos.x;
            let dy = target_pos.y - source_pos.y;
            let distance = (dx * dx + dy * dy).sqrt();
            if distance <= 0.0 {
                continue; // degenerate edge between identical positions
            }

            let unit_x = dx / distance;
            let unit_y = dy / distance;

            links.push(WaypointLink {
                source_id: waypoint.id.clone(),
                target_id: target.clone(),
                x1: source_pos.x + unit_x * NODE_RADIUS,
                y1: source_pos.y + unit_y * NODE_RADIUS,
                x2: target_pos.x - unit_x * NODE_RADIUS,
                y2: target_pos.y - unit_y * NODE_RADIUS,
            });
        }
    }

    Ok(ConstellationLayout { positions, links })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(id: &str, unblocks: &[&str]) -> Waypoint {
        let mut waypoint = Waypoint::new(id);
        waypoint.id = id.to_string();
        waypoint.unblocks = unblocks.iter().map(|s| s.to_string()).collect();
        waypoint
    }

    fn bounds() -> LayoutBounds {
        LayoutBounds::new(390.0, 700.0)
    }

    #[test]
    fn test_empty_input_empty_layout() {
        let layout = compute_layout(&[], &bounds()).unwrap();
        assert!(layout.positions.is_empty());
        assert!(layout.links.is_empty());
    }

    #[test]
    fn test_roots_are_rank_zero() {
        let waypoints = vec![wp("a", &[]), wp("b", &[]), wp("c", &[])];
        let ranks = waypoint_ranks(&waypoints).unwrap();
        assert!(ranks.values().all(|&r| r == 0));
    }

    #[test]
    fn test_fanout_scenario() {
        // A unblocks B and C: rank(A)=0, rank(B)=rank(C)=1, B and C in
        // distinct columns.
        let waypoints = vec![wp("a", &["b", "c"]), wp("b", &[]), wp("c", &[])];
        let ranks = waypoint_ranks(&waypoints).unwrap();
        assert_eq!(ranks["a"], 0);
        assert_eq!(ranks["b"], 1);
        assert_eq!(ranks["c"], 1);

        let columns = waypoint_columns(&waypoints, &ranks);
        assert_ne!(columns["b"], columns["c"]);
    }

    #[test]
    fn test_rank_is_longest_path() {
        // a -> b -> d and a -> d directly: d ranks below the longer path.
        let waypoints = vec![wp("a", &["b", "d"]), wp("b", &["d"]), wp("d", &[])];
        let ranks = waypoint_ranks(&waypoints).unwrap();
        assert_eq!(ranks["a"], 0);
        assert_eq!(ranks["b"], 1);
        assert_eq!(ranks["d"], 2);
    }

    #[test]
    fn test_chain_stays_in_one_column() {
        let waypoints = vec![wp("a", &["b"]), wp("b", &["c"]), wp("c", &[])];
        let ranks = waypoint_ranks(&waypoints).unwrap();
        let columns = waypoint_columns(&waypoints, &ranks);
        assert_eq!(columns["a"], columns["b"]);
        assert_eq!(columns["b"], columns["c"]);
    }

    #[test]
    fn test_diamond_merge_packs_columns() {
        let waypoints = vec![
            wp("a", &["b", "c"]),
            wp("b", &["d"]),
            wp("c", &["d"]),
            wp("d", &[]),
        ];
        let ranks = waypoint_ranks(&waypoints).unwrap();
        assert_eq!(ranks["d"], 2);

        let columns = waypoint_columns(&waypoints, &ranks);
        assert_ne!(columns["b"], columns["c"]);
        // d has two dependencies, so it takes the lowest free column.
        assert_eq!(columns["d"], 0);
    }

    #[test]
    fn test_no_duplicate_columns_within_rank() {
        let waypoints = vec![
            wp("r1", &["m1", "m2", "m3"]),
            wp("r2", &["m1", "m2"]),
            wp("m1", &[]),
            wp("m2", &[]),
            wp("m3", &[]),
        ];
        let ranks = waypoint_ranks(&waypoints).unwrap();
        let columns = waypoint_columns(&waypoints, &ranks);

        let mut by_rank: HashMap<usize, Vec<usize>> = HashMap::new();
        for waypoint in &waypoints {
            by_rank
                .entry(ranks[&waypoint.id])
                .or_default()
                .push(columns[&waypoint.id]);
        }
        for (_, mut cols) in by_rank {
            let total = cols.len();
            cols.sort_unstable();
            cols.dedup();
            assert_eq!(cols.len(), total);
        }
    }

    #[test]
    fn test_cycle_is_an_error() {
        let waypoints = vec![wp("a", &["b"]), wp("b", &["c"]), wp("c", &["a"])];
        assert_eq!(
            waypoint_ranks(&waypoints),
            Err(LayoutError::CyclicDependency)
        );
        assert_eq!(
            compute_layout(&waypoints, &bounds()),
            Err(LayoutError::CyclicDependency)
        );
    }

    #[test]
    fn test_cycle_reachable_from_root_is_an_error() {
        // The root ranks fine, the cycle behind it must still be caught.
        let waypoints = vec![
            wp("root", &["c1", "c2"]),
            wp("c1", &["c2"]),
            wp("c2", &["c1"]),
        ];
        assert_eq!(
            waypoint_ranks(&waypoints),
            Err(LayoutError::CyclicDependency)
        );
    }

    #[test]
    fn test_unknown_unblocks_target_ignored() {
        let waypoints = vec![wp("a", &["missing", "b"]), wp("b", &[])];
        let layout = compute_layout(&waypoints, &bounds()).unwrap();

        assert_eq!(layout.positions.len(), 2);
        assert_eq!(layout.links.len(), 1);
        assert_eq!(layout.links[0].target_id, "b");
    }

    #[test]
    fn test_rank_zero_anchored_at_bottom() {
        let waypoints = vec![wp("a", &["b"]), wp("b", &[])];
        let layout = compute_layout(&waypoints, &bounds()).unwrap();

        let root = &layout.positions["a"];
        let above = &layout.positions["b"];
        assert_eq!(root.rank, 0);
        assert!(root.y > above.y, "rank 0 must render below rank 1");
    }

    #[test]
    fn test_minimum_spacing_enforced() {
        // Tiny canvas: spacing must floor at three node radii.
        let tight = LayoutBounds::new(100.0, 100.0).with_padding(10.0);
        let waypoints = vec![
            wp("a", &[]),
            wp("b", &[]),
            wp("c", &[]),
            wp("d", &[]),
        ];
        let layout = compute_layout(&waypoints, &tight).unwrap();

        let mut xs: Vec<f64> = layout.positions.values().map(|p| p.x).collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in xs.windows(2) {
            assert!(pair[1] - pair[0] >= MIN_SPACING - f64::EPSILON);
        }
    }

    #[test]
    fn test_links_trimmed_by_node_radius() {
        let waypoints = vec![wp("a", &["b"]), wp("b", &[])];
        let layout = compute_layout(&waypoints, &bounds()).unwrap();

        let source = &layout.positions["a"];
        let target = &layout.positions["b"];
        let center_len =
            ((target.x - source.x).powi(2) + (target.y - source.y).powi(2)).sqrt();

        let link = &layout.links[0];
        let link_len = ((link.x2 - link.x1).powi(2) + (link.y2 - link.y1).powi(2)).sqrt();

        assert!((center_len - link_len - 2.0 * NODE_RADIUS).abs() < 1e-9);
    }

    #[test]
    fn test_single_node_centered_layout() {
        let waypoints = vec![wp("only", &[])];
        let layout = compute_layout(&waypoints, &bounds()).unwrap();

        let pos = &layout.positions["only"];
        assert_eq!(pos.rank, 0);
        assert_eq!(pos.column, 0);
        assert!(pos.x >= DEFAULT_PADDING);
        assert!(pos.y >= DEFAULT_PADDING);
        assert!(layout.links.is_empty());
    }
}
