//! The four-level canvas ontology: Network > Factory > Machine > Node.
//!
//! Field names and the `label()` fallback follow `original_source/src/canvas_mcp/models.py`
//! directly. A container owns an ordered `Vec` of its children; children never
//! back-reference their parent, following the teacher's own
//! `GraphBox { parent: Option<BoxId>, .. }` pattern (a child carries its parent's id,
//! never a pointer).

use indexmap::{IndexMap, IndexSet};

use crate::errors::ModelError;
use crate::geom::{Point, Size};

/// The fixed enumeration of semantic node types (`original_source/models.py::NODE_STYLES`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeType {
    Input,
    Output,
    Process,
    Decision,
    Ai,
    Source,
    Static,
    Default,
}

impl NodeType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Input => "input",
            NodeType::Output => "output",
            NodeType::Process => "process",
            NodeType::Decision => "decision",
            NodeType::Ai => "ai",
            NodeType::Source => "source",
            NodeType::Static => "static",
            NodeType::Default => "default",
        }
    }
}

impl Default for NodeType {
    fn default() -> Self {
        NodeType::Default
    }
}

/// Visual styling overrides for a node. Any field left `None` inherits from the
/// node's [`NodeType`] default (resolved by [`crate::style`]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeStyle {
    pub border_color: Option<String>,
    pub fill_color: Option<String>,
    pub text_color: Option<String>,
    pub label_color: Option<String>,
    pub corner_radius: Option<u32>,
    pub border_width: Option<u32>,
}

/// Visual styling overrides for a machine or factory container. Any field left
/// `None` inherits from the level-appropriate default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerStyle {
    pub border_color: Option<String>,
    pub fill_color: Option<String>,
    pub label_color: Option<String>,
    pub alpha: Option<u8>,
    pub corner_radius: Option<u32>,
    pub border_width: Option<u32>,
}

/// A single operation — the atomic leaf of the canvas ontology.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeType,
    pub label: Option<String>,
    pub content: String,
    pub position: Point,
    pub size: Size,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub style: Option<NodeStyle>,
}

impl Node {
    /// Creates a node of the given type. `width`/`height` default to zero — callers
    /// run the [`crate::sizer`] before layout, which writes real dimensions in place.
    pub fn new(id: impl Into<String>, kind: NodeType) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::EmptyId { kind: "node" });
        }
        Ok(Self {
            id,
            kind,
            label: None,
            content: String::new(),
            position: Point::default(),
            size: Size::default(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            style: None,
        })
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    #[must_use]
    pub fn with_inputs(mut self, inputs: impl IntoIterator<Item = String>) -> Self {
        self.inputs = inputs.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_outputs(mut self, outputs: impl IntoIterator<Item = String>) -> Self {
        self.outputs = outputs.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Returns `label` if set, otherwise falls back to `id`.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A pipeline — a connected chain of [`Node`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Machine {
    pub id: String,
    pub label: Option<String>,
    pub nodes: Vec<Node>,
    pub style: Option<ContainerStyle>,
}

impl Machine {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::EmptyId { kind: "machine" });
        }
        Ok(Self {
            id,
            label: None,
            nodes: Vec::new(),
            style: None,
        })
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.nodes = nodes.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: ContainerStyle) -> Self {
        self.style = Some(style);
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A functional domain grouping related [`Machine`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Factory {
    pub id: String,
    pub label: Option<String>,
    pub machines: Vec<Machine>,
    pub style: Option<ContainerStyle>,
}

impl Factory {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::EmptyId { kind: "factory" });
        }
        Ok(Self {
            id,
            label: None,
            machines: Vec::new(),
            style: None,
        })
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_machines(mut self, machines: impl IntoIterator<Item = Machine>) -> Self {
        self.machines = machines.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: ContainerStyle) -> Self {
        self.style = Some(style);
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// A system boundary grouping related [`Factory`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub id: String,
    pub label: Option<String>,
    pub factories: Vec<Factory>,
}

impl Network {
    pub fn new(id: impl Into<String>) -> Result<Self, ModelError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ModelError::EmptyId { kind: "network" });
        }
        Ok(Self {
            id,
            label: None,
            factories: Vec::new(),
        })
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub fn with_factories(mut self, factories: impl IntoIterator<Item = Factory>) -> Self {
        self.factories = factories.into_iter().collect();
        self
    }

    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }
}

/// Theme tag carried by the canvas for the renderer collaborator's benefit; never
/// read by the layout engine itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Dark
    }
}

/// The root document — a complete diagram.
#[derive(Debug, Clone, Default)]
pub struct Canvas {
    pub title: String,
    pub theme: Theme,
    pub networks: Vec<Network>,
    /// Vertical space reserved above the layout for the title, in canvas units.
    pub title_margin: f64,
}

impl Canvas {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            theme: Theme::default(),
            networks: Vec::new(),
            title_margin: 20.0,
        }
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_networks(mut self, networks: impl IntoIterator<Item = Network>) -> Self {
        self.networks = networks.into_iter().collect();
        self
    }

    /// A flat, read-only view of every node in the canvas, in declaration order.
    #[must_use]
    pub fn all_nodes(&self) -> Vec<&Node> {
        self.networks
            .iter()
            .flat_map(|network| network.factories.iter())
            .flat_map(|factory| factory.machines.iter())
            .flat_map(|machine| machine.nodes.iter())
            .collect()
    }

    /// A flat, mutable view of every node in the canvas, in declaration order.
    #[must_use]
    pub fn all_nodes_mut(&mut self) -> Vec<&mut Node> {
        self.networks
            .iter_mut()
            .flat_map(|network| network.factories.iter_mut())
            .flat_map(|factory| factory.machines.iter_mut())
            .flat_map(|machine| machine.nodes.iter_mut())
            .collect()
    }

    /// Derived id -> node index. This is a cache, not stored state: rebuild it
    /// whenever the data model is mutated between layout passes.
    #[must_use]
    pub fn node_map(&self) -> IndexMap<&str, &Node> {
        self.all_nodes()
            .into_iter()
            .map(|node| (node.id.as_str(), node))
            .collect()
    }

    /// Derived id -> owning-machine-id index, rebuilt on demand.
    #[must_use]
    pub fn node_to_machine(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        for network in &self.networks {
            for factory in &network.factories {
                for machine in &factory.machines {
                    for node in &machine.nodes {
                        map.insert(node.id.clone(), machine.id.clone());
                    }
                }
            }
        }
        map
    }

    /// All `(source_id, target_id)` connections declared via `inputs`/`outputs`,
    /// deduplicated by ordered pair. Declaration order of the first occurrence is
    /// preserved for determinism.
    #[must_use]
    pub fn all_connections(&self) -> Vec<(String, String)> {
        let mut seen: IndexSet<(String, String)> = IndexSet::new();
        for node in self.all_nodes() {
            for input_id in &node.inputs {
                seen.insert((input_id.clone(), node.id.clone()));
            }
            for output_id in &node.outputs {
                seen.insert((node.id.clone(), output_id.clone()));
            }
        }
        seen.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_falls_back_to_id() {
        let node = Node::new("n1", NodeType::Process).unwrap();
        assert_eq!(node.label(), "n1");
        let labeled = node.with_label("Step One");
        assert_eq!(labeled.label(), "Step One");
    }

    #[test]
    fn empty_id_is_rejected() {
        assert_eq!(
            Node::new("", NodeType::Process).unwrap_err(),
            ModelError::EmptyId { kind: "node" }
        );
    }

    #[test]
    fn connections_are_deduplicated_both_directions() {
        let a = Node::new("a", NodeType::Input)
            .unwrap()
            .with_outputs(["b".to_string()]);
        let b = Node::new("b", NodeType::Output)
            .unwrap()
            .with_inputs(["a".to_string()]);
        let machine = Machine::new("m1").unwrap().with_nodes([a, b]);
        let factory = Factory::new("f1").unwrap().with_machines([machine]);
        let network = Network::new("net1").unwrap().with_factories([factory]);
        let canvas = Canvas::new("t").with_networks([network]);

        let connections = canvas.all_connections();
        assert_eq!(connections, vec![("a".to_string(), "b".to_string())]);
    }
}
