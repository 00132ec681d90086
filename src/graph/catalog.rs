// SPDX-License-Identifier: MIT

//! Node catalog: display metadata and defaults for each step type

use once_cell::sync::Lazy;

use super::types::{NodeKind, NodeType};

/// Display metadata for one node type
#[derive(Debug, Clone)]
pub struct NodeDescriptor {
    pub node_type: NodeType,
    pub label: &'static str,
    pub description: &'static str,
    /// Required config fields, by name
    pub required: &'static [&'static str],
}

impl NodeDescriptor {
    pub fn default_kind(&self) -> NodeKind {
        NodeKind::default_for(self.node_type)
    }
}

static CATALOG: Lazy<Vec<NodeDescriptor>> = Lazy::new(|| {
    vec![
        NodeDescriptor {
            node_type: NodeType::Upload,
            label: "Upload Dataset",
            description: "Upload CSV/XLSX dataset for ML pipeline",
            required: &["file"],
        },
        NodeDescriptor {
            node_type: NodeType::Clean,
            label: "Clean Data",
            description: "Handle missing values in dataset",
            required: &["strategy"],
        },
        NodeDescriptor {
            node_type: NodeType::Preprocess,
            label: "Preprocess Data",
            description: "Standardize or normalize numeric columns",
            required: &["scaler", "columns"],
        },
        NodeDescriptor {
            node_type: NodeType::Split,
            label: "Train-Test Split",
            description: "Split dataset into training and testing sets",
            required: &["ratio", "target_column"],
        },
        NodeDescriptor {
            node_type: NodeType::Train,
            label: "Train Model",
            description: "Train a machine learning model",
            required: &["task", "model"],
        },
        NodeDescriptor {
            node_type: NodeType::Results,
            label: "View Results",
            description: "Display model performance metrics",
            required: &[],
        },
    ]
});

/// All node types, in palette order
pub fn catalog() -> &'static [NodeDescriptor] {
    &CATALOG
}

pub fn describe(node_type: NodeType) -> &'static NodeDescriptor {
    // CATALOG holds one entry per NodeType, in declaration order
    &CATALOG[node_type as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_covers_every_type() {
        for node_type in NodeType::ALL {
            assert_eq!(describe(node_type).node_type, node_type);
        }
        assert_eq!(catalog().len(), NodeType::ALL.len());
    }

    #[test]
    fn test_default_kind_matches_type() {
        let descriptor = describe(NodeType::Preprocess);
        assert_eq!(descriptor.label, "Preprocess Data");
        assert_eq!(descriptor.default_kind().node_type(), NodeType::Preprocess);
    }
}
