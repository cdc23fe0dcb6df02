//! Node auto-sizing: measuring label and body text against font metrics to compute
//! a node's minimum bounding box.
//!
//! The algorithm (word wrap, two-pass width measurement, the constant layout
//! breakdown) follows `original_source/src/canvas_mcp/renderer.py::_wrap_text` and
//! `CanvasRenderer.compute_node_size` line for line. The `FontMetrics` trait seam
//! mirrors the teacher's `Graph` trait (`regviz_app/src/graph/mod.rs`): a small
//! interface the core depends on without depending on a concrete backend.

use crate::geom::Size;
use crate::model::Node;

/// The three font roles the sizer measures against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontKind {
    /// Bold, used for the node's label line.
    Label,
    /// Regular weight, used for wrapped body text.
    Body,
    /// Small regular weight, used for the type badge.
    Small,
}

/// A pluggable text-measurement oracle. A host embedding real font shaping
/// provides an accurate implementation; [`ApproxFontMetrics`] is a deterministic
/// built-in suitable for tests and headless use.
pub trait FontMetrics {
    /// Returns `(width, height)` of `text` rendered in `font`, in unscaled canvas units.
    fn measure(&self, font: FontKind, text: &str) -> (f64, f64);
}

/// An average-advance-width approximation requiring no system fonts.
///
/// Widths are estimated as `char_count * advance_width`; heights are the font's
/// fixed line height. The ratios below approximate a typical sans-serif face.
#[derive(Debug, Clone, Copy)]
pub struct ApproxFontMetrics;

impl ApproxFontMetrics {
    fn size_for(font: FontKind) -> f64 {
        match font {
            FontKind::Label => 20.0,
            FontKind::Body => 18.0,
            FontKind::Small => 14.0,
        }
    }

    fn advance_ratio(font: FontKind) -> f64 {
        match font {
            FontKind::Label => 0.62,
            FontKind::Body => 0.56,
            FontKind::Small => 0.56,
        }
    }
}

impl FontMetrics for ApproxFontMetrics {
    fn measure(&self, font: FontKind, text: &str) -> (f64, f64) {
        let size = Self::size_for(font);
        let width = text.chars().count() as f64 * size * Self::advance_ratio(font);
        (width, size)
    }
}

const NODE_PADDING: f64 = 24.0;
const MIN_NODE_WIDTH: f64 = 180.0;
const MAX_NODE_WIDTH: f64 = 600.0;
const MIN_NODE_HEIGHT: f64 = 80.0;
const NODE_TOP_BAR: f64 = 6.0;
const NODE_LABEL_GAP: f64 = 12.0;
const NODE_CONTENT_GAP: f64 = 10.0;
const NODE_BOTTOM_PAD: f64 = 36.0;
const NODE_LINE_HEIGHT: f64 = 24.0;
const TYPE_BADGE_MARGIN: f64 = 22.0;

/// Greedy word-wrap with a character-chunk fallback for single words wider than
/// `max_width`. Always returns at least one (possibly empty) line.
#[must_use]
pub fn wrap_text(text: &str, metrics: &dyn FontMetrics, font: FontKind, max_width: f64) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        let (candidate_width, _) = metrics.measure(font, &candidate);
        if candidate_width <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        let (word_width, _) = metrics.measure(font, word);
        if word_width > max_width {
            let chunk_size = ((max_width / 8.0).floor() as usize).max(1);
            for chunk in chunk_chars(word, chunk_size) {
                lines.push(chunk);
            }
        } else {
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

fn chunk_chars(word: &str, chunk_size: usize) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Computes `(width, height)` for `node` given a font-metrics oracle. Does not
/// mutate `node`; callers apply the result to `node.size`.
#[must_use]
pub fn compute_node_size(node: &Node, metrics: &dyn FontMetrics) -> Size {
    let padding = NODE_PADDING;

    let label = node.label();
    let (label_width, label_height) = metrics.measure(FontKind::Label, label);

    let type_text = node.kind.as_str();
    let (type_text_width, _) = metrics.measure(FontKind::Small, type_text);

    let mut content_width = 0.0_f64;
    if !node.content.is_empty() {
        let max_wrap = MAX_NODE_WIDTH - 2.0 * padding;
        let first_pass = wrap_text(&node.content, metrics, FontKind::Body, max_wrap);
        for line in &first_pass {
            let (line_width, _) = metrics.measure(FontKind::Body, line);
            content_width = content_width.max(line_width);
        }
    }

    let type_badge = type_text_width + TYPE_BADGE_MARGIN;
    let inner_width = label_width.max(content_width).max(type_badge);
    let width = (inner_width + 2.0 * padding).clamp(MIN_NODE_WIDTH, MAX_NODE_WIDTH);

    let mut height = NODE_TOP_BAR + NODE_LABEL_GAP + label_height + NODE_CONTENT_GAP;

    if !node.content.is_empty() {
        let actual_text_width = width - 2.0 * padding;
        let content_lines = wrap_text(&node.content, metrics, FontKind::Body, actual_text_width);
        height += content_lines.len() as f64 * NODE_LINE_HEIGHT;
    }

    height += NODE_BOTTOM_PAD;
    height = height.max(MIN_NODE_HEIGHT);

    Size::new(width.round(), height.round())
}

/// Runs [`compute_node_size`] over every node in the canvas and writes the result
/// into `node.size`. Idempotent: running it twice yields the same sizes.
pub fn auto_size_nodes(canvas: &mut crate::model::Canvas, metrics: &dyn FontMetrics) {
    for node in canvas.all_nodes_mut() {
        node.size = compute_node_size(node, metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NodeType;

    #[test]
    fn empty_body_wraps_to_one_empty_line() {
        let lines = wrap_text("", &ApproxFontMetrics, FontKind::Body, 100.0);
        assert_eq!(lines, vec![String::new()]);
    }

    #[test]
    fn long_word_force_wraps_into_chunks() {
        let metrics = ApproxFontMetrics;
        let long_word = "a".repeat(80);
        let lines = wrap_text(&long_word, &metrics, FontKind::Body, 40.0);
        assert!(lines.len() > 1);
        for line in &lines {
            let (w, _) = metrics.measure(FontKind::Body, line);
            assert!(w <= 40.0 || line.chars().count() <= 1);
        }
    }

    #[test]
    fn size_respects_min_and_max_bounds() {
        let metrics = ApproxFontMetrics;
        let tiny = Node::new("n1", NodeType::Process).unwrap().with_label("x");
        let size = compute_node_size(&tiny, &metrics);
        assert!(size.width >= MIN_NODE_WIDTH);
        assert!(size.height >= MIN_NODE_HEIGHT);

        let huge = Node::new("n2", NodeType::Process)
            .unwrap()
            .with_label("a very long label that should clamp to the maximum width")
            .with_content("word ".repeat(200));
        let size2 = compute_node_size(&huge, &metrics);
        assert!(size2.width <= MAX_NODE_WIDTH);
    }

    #[test]
    fn sizing_is_idempotent() {
        let metrics = ApproxFontMetrics;
        let node = Node::new("n1", NodeType::Process)
            .unwrap()
            .with_label("Repeatable")
            .with_content("Some body text that wraps across a couple of lines maybe.");
        assert_eq!(
            compute_node_size(&node, &metrics),
            compute_node_size(&node, &metrics)
        );
    }
}
