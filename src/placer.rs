//! The flat placer: topological leveling (Kahn's algorithm) with parent-center
//! cross-axis alignment and overlap prevention.
//!
//! Grounded directly on
//! `original_source/src/canvas_mcp/organize.py::compute_organized_layout`, which this
//! module follows step for step (including its vertical-orientation asymmetry — see
//! the `NOTE` at the vertical branch below). The queue-driven worklist over an
//! `IndexMap` follows the teacher's `regviz_core/src/core/dfa.rs::Determinizer`
//! subset-construction idiom.

use std::collections::VecDeque;

use indexmap::IndexMap;

use crate::geom::Point;

/// Which axis levels advance along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An item to be placed — a node or, when the hierarchy driver calls this at a
/// higher level, a padded container fragment.
#[derive(Debug, Clone)]
pub struct PlacerItem {
    pub id: String,
    pub width: f64,
    pub height: f64,
    /// Pre-layout position; used only as a last-resort fallback and as a
    /// deterministic tie-breaker for ordering.
    pub x: f64,
    pub y: f64,
}

/// A directed edge between two [`PlacerItem`] ids.
#[derive(Debug, Clone)]
pub struct PlacerEdge {
    pub from_id: String,
    pub to_id: String,
}

/// Tunables for [`compute_layout`]. Defaults match the node-level spacing from
/// the original system; the hierarchy driver supplies its own per-level values.
#[derive(Debug, Clone)]
pub struct PlacerOptions {
    pub orientation: Orientation,
    pub horizontal_spacing: f64,
    pub vertical_spacing: f64,
    pub start_x: f64,
    pub start_y: f64,
    pub reference_center_x: f64,
    pub reference_center_y: f64,
    pub grid_columns: usize,
}

impl Default for PlacerOptions {
    fn default() -> Self {
        Self {
            orientation: Orientation::Horizontal,
            horizontal_spacing: 90.0,
            vertical_spacing: 140.0,
            start_x: 0.0,
            start_y: 0.0,
            reference_center_x: 0.0,
            reference_center_y: 0.0,
            grid_columns: 4,
        }
    }
}

/// Computes a position for every item. Items with no incoming/outgoing edges at
/// all (a fully disconnected set) fall back to a grid. Never fails: a cycle is
/// broken by assigning the cyclic item the level just past its resolved
/// predecessors (or level 0 if it has none).
#[must_use]
pub fn compute_layout(
    items: &[PlacerItem],
    edges: &[PlacerEdge],
    options: &PlacerOptions,
) -> IndexMap<String, Point> {
    if items.is_empty() {
        return IndexMap::new();
    }

    let item_map: IndexMap<&str, &PlacerItem> =
        items.iter().map(|item| (item.id.as_str(), item)).collect();

    // --- Step 1: adjacency + indegree ---
    let mut adjacency: IndexMap<&str, Vec<&str>> =
        items.iter().map(|item| (item.id.as_str(), Vec::new())).collect();
    let mut indegree: IndexMap<&str, i64> =
        items.iter().map(|item| (item.id.as_str(), 0_i64)).collect();

    for edge in edges {
        if adjacency.contains_key(edge.from_id.as_str()) && indegree.contains_key(edge.to_id.as_str()) {
            adjacency
                .get_mut(edge.from_id.as_str())
                .unwrap()
                .push(edge.to_id.as_str());
            *indegree.get_mut(edge.to_id.as_str()).unwrap() += 1;
        }
    }

    // --- Step 2: Kahn's topological sort ---
    let mut levels: IndexMap<&str, i64> = IndexMap::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    let mut sorted_items: Vec<&PlacerItem> = items.iter().collect();
    sorted_items.sort_by(|a, b| {
        a.x.partial_cmp(&b.x)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.y.partial_cmp(&b.y).unwrap_or(std::cmp::Ordering::Equal))
    });
    for item in &sorted_items {
        if *indegree.get(item.id.as_str()).unwrap_or(&0) == 0 {
            levels.insert(item.id.as_str(), 0);
            queue.push_back(item.id.as_str());
        }
    }

    while let Some(current) = queue.pop_front() {
        let current_level = *levels.get(current).unwrap_or(&0);
        let targets = adjacency.get(current).cloned().unwrap_or_default();
        for target in targets {
            let candidate = current_level + 1;
            let existing = levels.get(target).copied();
            if existing.is_none() || candidate > existing.unwrap() {
                levels.insert(target, candidate);
            }
            let new_degree = indegree.get(target).copied().unwrap_or(0) - 1;
            indegree.insert(target, new_degree);
            if new_degree == 0 {
                queue.push_back(target);
            }
        }
    }

    // --- Step 3: unresolved (cyclic) items ---
    let mut unresolved: Vec<&PlacerItem> = items
        .iter()
        .filter(|item| !levels.contains_key(item.id.as_str()))
        .collect();
    unresolved.sort_by(|a, b| {
        a.y.partial_cmp(&b.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });
    for item in &unresolved {
        let incoming_levels: Vec<i64> = edges
            .iter()
            .filter(|edge| edge.to_id == item.id)
            .filter_map(|edge| levels.get(edge.from_id.as_str()).copied())
            .collect();
        let level = incoming_levels.into_iter().max().map_or(0, |lvl| lvl + 1);
        levels.insert(item.id.as_str(), level);
        tracing::debug!(item_id = %item.id, "cycle broken by assigning fallback level");
    }

    // --- Step 4: normalize (compress gaps) ---
    let mut unique_levels: Vec<i64> = levels.values().copied().collect();
    unique_levels.sort_unstable();
    unique_levels.dedup();
    let level_remap: IndexMap<i64, i64> = unique_levels
        .iter()
        .enumerate()
        .map(|(idx, &lvl)| (lvl, idx as i64))
        .collect();
    let mut effective_levels: IndexMap<&str, i64> = levels
        .iter()
        .map(|(&id, &lvl)| (id, *level_remap.get(&lvl).unwrap_or(&lvl)))
        .collect();

    // --- Step 5: grid fallback for disconnected graphs ---
    if edges.is_empty() && items.len() > 1 {
        let grid_columns = options.grid_columns.max(1);
        let mut ordered: Vec<&PlacerItem> = items.iter().collect();
        ordered.sort_by(|a, b| {
            a.y.partial_cmp(&b.y)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        });
        for (idx, item) in ordered.iter().enumerate() {
            let bucket = (idx / grid_columns) as i64;
            effective_levels.insert(item.id.as_str(), bucket);
        }
    }

    // --- Step 6: group by level ---
    let mut grouped: IndexMap<i64, Vec<&PlacerItem>> = IndexMap::new();
    for (&id, &lvl) in &effective_levels {
        if let Some(&item) = item_map.get(id) {
            grouped.entry(lvl).or_default().push(item);
        }
    }
    let mut ordered_levels: Vec<i64> = grouped.keys().copied().collect();
    ordered_levels.sort_unstable();

    let h_spacing = options.horizontal_spacing;
    let v_spacing = options.vertical_spacing;

    let min_x = items.iter().map(|it| it.x).fold(f64::INFINITY, f64::min);
    let max_x = items
        .iter()
        .map(|it| it.x + it.width)
        .fold(f64::NEG_INFINITY, f64::max);
    let min_y = items.iter().map(|it| it.y).fold(f64::INFINITY, f64::min);
    let max_y = items
        .iter()
        .map(|it| it.y + it.height)
        .fold(f64::NEG_INFINITY, f64::max);

    let default_start_x = if options.start_x != 0.0 { options.start_x } else { min_x };
    let default_start_y = if options.start_y != 0.0 { options.start_y } else { min_y };
    let default_center_x = (min_x + max_x) / 2.0;
    let default_center_y = (min_y + max_y) / 2.0;

    let mut layout: IndexMap<String, Point> = IndexMap::new();

    match options.orientation {
        Orientation::Horizontal => {
            let reference_center_y = if options.reference_center_y != 0.0 {
                options.reference_center_y
            } else {
                default_center_y
            };
            let mut current_x = default_start_x;

            for level in &ordered_levels {
                let column_items = match grouped.get(level) {
                    Some(v) if !v.is_empty() => v.clone(),
                    _ => continue,
                };
                let column_width = column_items
                    .iter()
                    .map(|it| it.width)
                    .fold(f64::NEG_INFINITY, f64::max);

                struct Entry<'a> {
                    item: &'a PlacerItem,
                    target_center: f64,
                    fallback_center: f64,
                }

                let mut entries: Vec<Entry> = column_items
                    .iter()
                    .map(|&item| {
                        let parent_centers: Vec<f64> = edges
                            .iter()
                            .filter(|edge| edge.to_id == item.id)
                            .filter_map(|edge| {
                                let parent_item = item_map.get(edge.from_id.as_str())?;
                                let parent_pos = layout.get(edge.from_id.as_str())?;
                                Some(parent_pos.y + parent_item.height / 2.0)
                            })
                            .collect();
                        let fallback_center = item.y + item.height / 2.0;
                        let target_center = if !parent_centers.is_empty() {
                            let avg = parent_centers.iter().sum::<f64>() / parent_centers.len() as f64;
                            if avg.is_finite() { avg } else { fallback_center }
                        } else {
                            fallback_center
                        };
                        Entry {
                            item,
                            target_center,
                            fallback_center,
                        }
                    })
                    .collect();

                entries.sort_by(|a, b| {
                    a.target_center
                        .partial_cmp(&b.target_center)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(
                            a.fallback_center
                                .partial_cmp(&b.fallback_center)
                                .unwrap_or(std::cmp::Ordering::Equal),
                        )
                        .then(a.item.id.cmp(&b.item.id))
                });

                let mut previous_bottom = f64::NEG_INFINITY;

                for entry in &entries {
                    let item = entry.item;
                    let mut desired_top = entry.target_center - item.height / 2.0;
                    if !desired_top.is_finite() {
                        desired_top = entry.fallback_center - item.height / 2.0;
                    }
                    if !desired_top.is_finite() {
                        desired_top = reference_center_y - item.height / 2.0;
                    }

                    if previous_bottom != f64::NEG_INFINITY {
                        let min_top = previous_bottom + v_spacing;
                        if desired_top < min_top {
                            desired_top = min_top;
                        }
                    }

                    let final_y = desired_top.round();
                    layout.insert(item.id.clone(), Point::new(current_x.round(), final_y));
                    previous_bottom = final_y + item.height;
                }

                current_x += column_width + h_spacing;
            }
        }
        Orientation::Vertical => {
            // NOTE: the vertical branch intentionally does not apply the horizontal
            // branch's parent-center alignment or previous-bottom overlap rule — it
            // centers each row on `reference_center_x` and stacks rows by max row
            // height instead. Preserved verbatim from the original algorithm; this
            // asymmetry is a carried design decision, not an oversight.
            let reference_center_x = if options.reference_center_x != 0.0 {
                options.reference_center_x
            } else {
                default_center_x
            };
            let mut current_y = default_start_y;

            for level in &ordered_levels {
                let mut row_items = match grouped.get(level) {
                    Some(v) if !v.is_empty() => v.clone(),
                    _ => continue,
                };
                row_items.sort_by(|a, b| {
                    a.x.partial_cmp(&b.x)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then(a.id.cmp(&b.id))
                });

                let total_width: f64 = row_items.iter().map(|it| it.width).sum::<f64>()
                    + (row_items.len() as f64 - 1.0) * h_spacing;
                let mut cursor_x = reference_center_x - total_width / 2.0;
                let mut row_height = 0.0_f64;

                for item in &row_items {
                    layout.insert(item.id.clone(), Point::new(cursor_x.round(), current_y.round()));
                    cursor_x += item.width + h_spacing;
                    row_height = row_height.max(item.height);
                }

                current_y += row_height + v_spacing;
            }
        }
    }

    for item in items {
        layout
            .entry(item.id.clone())
            .or_insert_with(|| Point::new(item.x.round(), item.y.round()));
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, w: f64, h: f64) -> PlacerItem {
        PlacerItem {
            id: id.to_string(),
            width: w,
            height: h,
            x: 0.0,
            y: 0.0,
        }
    }

    fn edge(from: &str, to: &str) -> PlacerEdge {
        PlacerEdge {
            from_id: from.to_string(),
            to_id: to.to_string(),
        }
    }

    #[test]
    fn linear_chain_advances_one_level_per_node() {
        let items = vec![item("a", 100.0, 50.0), item("b", 100.0, 50.0), item("c", 100.0, 50.0)];
        let edges = vec![edge("a", "b"), edge("b", "c")];
        let layout = compute_layout(&items, &edges, &PlacerOptions::default());

        assert!(layout["a"].x < layout["b"].x);
        assert!(layout["b"].x < layout["c"].x);
    }

    #[test]
    fn diamond_converges_child_between_parents() {
        let items = vec![
            item("a", 100.0, 50.0),
            item("b", 100.0, 50.0),
            item("c", 100.0, 50.0),
            item("d", 100.0, 50.0),
        ];
        let edges = vec![edge("a", "b"), edge("a", "c"), edge("b", "d"), edge("c", "d")];
        let layout = compute_layout(&items, &edges, &PlacerOptions::default());

        assert!(layout["b"].y < layout["d"].y || layout["c"].y < layout["d"].y || layout["b"].y == layout["d"].y);
        assert!(layout["d"].x > layout["b"].x);
        assert!(layout["d"].x > layout["c"].x);
    }

    #[test]
    fn disconnected_items_grid_fallback() {
        let items = vec![item("a", 50.0, 50.0), item("b", 50.0, 50.0), item("c", 50.0, 50.0)];
        let layout = compute_layout(&items, &[], &PlacerOptions::default());
        assert_eq!(layout.len(), 3);
    }

    #[test]
    fn cycle_does_not_panic_and_places_every_item() {
        let items = vec![item("a", 50.0, 50.0), item("b", 50.0, 50.0)];
        let edges = vec![edge("a", "b"), edge("b", "a")];
        let layout = compute_layout(&items, &edges, &PlacerOptions::default());
        assert_eq!(layout.len(), 2);
    }
}
