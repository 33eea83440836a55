use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of the producer's syntax tree. Read-only to the engine; the
/// graph model builder assigns its own ids during flattening, so the
/// producer-side `id` is carried only for export fidelity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SyntaxNode {
    #[serde(default)]
    pub id: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(SyntaxNode::node_count)
            .sum::<usize>()
    }

    pub fn max_depth(&self) -> u32 {
        1 + self
            .children
            .iter()
            .map(SyntaxNode::max_depth)
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str) -> SyntaxNode {
        SyntaxNode {
            id: 0,
            name: name.to_owned(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    #[test]
    fn counts_cover_the_whole_tree() {
        let mut root = leaf("Module");
        let mut body = leaf("FunctionDef");
        body.children.push(leaf("Return"));
        root.children.push(body);
        root.children.push(leaf("Assign"));

        assert_eq!(root.node_count(), 4);
        assert_eq!(root.max_depth(), 3);
    }
}
