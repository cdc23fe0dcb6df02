//! Default style records and resolution functions for the renderer collaborator.
//!
//! The layout engine never reads these values when computing geometry — style is
//! a draw-time concern carried here purely as data, mirroring
//! `original_source/src/canvas_mcp/models.py::NODE_STYLES` / `NodeStyle.get_style()`
//! and the teacher's `regviz_app::graph::style::color_for_box` (a small pure function
//! mapping an id/kind to a visual record, called only by rendering-adjacent code).
//! Theme palettes themselves are an external collaborator (SPEC_FULL.md §1) — this
//! module resolves per-type/per-level defaults, not theme-tinted colors.

use crate::model::{ContainerStyle, NodeStyle, NodeType};

/// A node style with every field present, ready for a renderer to consume.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedNodeStyle {
    pub border_color: String,
    pub fill_color: String,
    pub text_color: String,
    pub label_color: String,
    pub corner_radius: u32,
    pub border_width: u32,
}

/// Which container level a [`ContainerStyle`] is being resolved for — machines and
/// factories differ only in their level-appropriate defaults (fill alpha, corner
/// radius), per `original_source/models.py` module docstring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerLevel {
    Machine,
    Factory,
}

/// A container style with every field present, ready for a renderer to consume.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedContainerStyle {
    pub border_color: String,
    pub fill_color: Option<String>,
    pub label_color: String,
    pub alpha: u8,
    pub corner_radius: u32,
    pub border_width: u32,
}

fn default_node_style(border_color: &str) -> ResolvedNodeStyle {
    ResolvedNodeStyle {
        border_color: border_color.to_string(),
        fill_color: "#1e1e2e".to_string(),
        text_color: "#cdd6f4".to_string(),
        label_color: "#cdd6f4".to_string(),
        corner_radius: 12,
        border_width: 3,
    }
}

/// The eight per-type default accent colors (Catppuccin Mocha palette), mirroring
/// `original_source/models.py::NODE_STYLES` one for one.
#[must_use]
pub fn default_style_for_type(kind: NodeType) -> ResolvedNodeStyle {
    match kind {
        NodeType::Input => default_node_style("#2196F3"),
        NodeType::Output => default_node_style("#FFC107"),
        NodeType::Process => default_node_style("#00BCD4"),
        NodeType::Decision => default_node_style("#F44336"),
        NodeType::Ai => default_node_style("#9C27B0"),
        NodeType::Source => default_node_style("#FF9800"),
        NodeType::Static => default_node_style("#4CAF50"),
        NodeType::Default => default_node_style("#999999"),
    }
}

/// Resolves a node's effective style: any field set on `override_style` wins, the
/// rest fall back to the type default. `None` yields the type default verbatim.
#[must_use]
pub fn resolve_node_style(override_style: Option<&NodeStyle>, kind: NodeType) -> ResolvedNodeStyle {
    let default = default_style_for_type(kind);
    let Some(style) = override_style else { return default };

    ResolvedNodeStyle {
        border_color: style.border_color.clone().unwrap_or(default.border_color),
        fill_color: style.fill_color.clone().unwrap_or(default.fill_color),
        text_color: style.text_color.clone().unwrap_or(default.text_color),
        label_color: style
            .label_color
            .clone()
            .or_else(|| style.text_color.clone())
            .unwrap_or(default.label_color),
        corner_radius: style.corner_radius.unwrap_or(default.corner_radius),
        border_width: style.border_width.unwrap_or(default.border_width),
    }
}

fn default_container_style(level: ContainerLevel) -> ResolvedContainerStyle {
    match level {
        ContainerLevel::Machine => ResolvedContainerStyle {
            border_color: "#313244".to_string(),
            fill_color: Some("#181825".to_string()),
            label_color: "#6c7086".to_string(),
            alpha: 120,
            corner_radius: 8,
            border_width: 1,
        },
        ContainerLevel::Factory => ResolvedContainerStyle {
            border_color: "#45475a".to_string(),
            fill_color: None,
            label_color: "#a6adc8".to_string(),
            alpha: 0,
            corner_radius: 12,
            border_width: 1,
        },
    }
}

/// Resolves a machine/factory's effective container style: any field set on
/// `override_style` wins, the rest fall back to the level-appropriate default.
#[must_use]
pub fn resolve_container_style(
    override_style: Option<&ContainerStyle>,
    level: ContainerLevel,
) -> ResolvedContainerStyle {
    let default = default_container_style(level);
    let Some(style) = override_style else { return default };

    ResolvedContainerStyle {
        border_color: style.border_color.clone().unwrap_or(default.border_color),
        fill_color: style.fill_color.clone().or(default.fill_color),
        label_color: style.label_color.clone().unwrap_or(default.label_color),
        alpha: style.alpha.unwrap_or(default.alpha),
        corner_radius: style.corner_radius.unwrap_or(default.corner_radius),
        border_width: style.border_width.unwrap_or(default.border_width),
    }
}
