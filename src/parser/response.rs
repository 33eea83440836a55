use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::syntax::SyntaxNode;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The producer rejected the source; its message is shown verbatim and
    /// never reworded by the engine.
    #[error("{0}")]
    Syntax(String),
    #[error("parser reported success but returned no tree")]
    MissingTree,
}

/// Wire form of the producer reply: { success, tree, error, lines }.
#[derive(Debug, Deserialize)]
pub(super) struct RawParseReply {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    tree: Option<RawTreeNode>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    lines: usize,
}

/// Tree nodes as the producer emits them. Children arrive either as bare
/// nodes or wrapped as { field, node }, where `field` names the syntactic
/// slot connecting the child to its parent.
#[derive(Debug, Deserialize)]
pub(super) struct RawTreeNode {
    #[serde(default)]
    id: u32,
    name: String,
    #[serde(default)]
    attributes: BTreeMap<String, Value>,
    #[serde(default)]
    children: Vec<RawChild>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawChild {
    Wrapped {
        #[serde(default)]
        field: Option<String>,
        node: RawTreeNode,
    },
    Plain(RawTreeNode),
}

impl RawTreeNode {
    fn into_syntax_node(self) -> SyntaxNode {
        let mut node = SyntaxNode {
            id: self.id,
            name: self.name,
            attributes: self.attributes,
            children: Vec::with_capacity(self.children.len()),
        };

        for child in self.children {
            let (field, raw) = match child {
                RawChild::Wrapped { field, node } => (field, node),
                RawChild::Plain(raw) => (None, raw),
            };

            let mut converted = raw.into_syntax_node();
            if let Some(field) = field
                && !field.is_empty()
            {
                converted
                    .attributes
                    .entry("field".to_owned())
                    .or_insert_with(|| Value::String(field));
            }
            node.children.push(converted);
        }

        node
    }
}

pub(super) fn decode_parse_reply(raw: &str) -> Result<(SyntaxNode, usize)> {
    let reply: RawParseReply =
        serde_json::from_str(raw).context("invalid JSON from parser command")?;

    if !reply.success {
        let message = reply
            .error
            .unwrap_or_else(|| "parser reported failure without a message".to_owned());
        return Err(ParseError::Syntax(message).into());
    }

    let tree = reply.tree.ok_or(ParseError::MissingTree)?;
    Ok((tree.into_syntax_node(), reply.lines))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_successful_reply_with_plain_children() {
        let raw = r#"{
            "success": true,
            "tree": {
                "id": 0,
                "name": "Module",
                "children": [{"id": 1, "name": "Expr"}]
            },
            "error": null,
            "lines": 1
        }"#;

        let (tree, lines) = decode_parse_reply(raw).expect("reply decodes");
        assert_eq!(tree.name, "Module");
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "Expr");
        assert_eq!(lines, 1);
    }

    #[test]
    fn unwraps_field_wrapped_children() {
        let raw = r#"{
            "success": true,
            "tree": {
                "name": "Module",
                "children": [
                    {"field": "body", "node": {"name": "FunctionDef"}}
                ]
            },
            "lines": 3
        }"#;

        let (tree, _) = decode_parse_reply(raw).expect("reply decodes");
        assert_eq!(tree.children[0].name, "FunctionDef");
        assert_eq!(
            tree.children[0].attributes.get("field"),
            Some(&Value::String("body".to_owned()))
        );
    }

    #[test]
    fn syntax_failure_message_survives_verbatim() {
        let raw = r#"{
            "success": false,
            "tree": null,
            "error": "Syntax Error at line 2: invalid syntax",
            "lines": 2
        }"#;

        let error = decode_parse_reply(raw).expect_err("failure propagates");
        assert_eq!(
            error.to_string(),
            "Syntax Error at line 2: invalid syntax"
        );
    }

    #[test]
    fn success_without_tree_is_rejected() {
        let raw = r#"{"success": true, "tree": null, "lines": 0}"#;
        let error = decode_parse_reply(raw).expect_err("missing tree is an error");
        assert!(error.to_string().contains("no tree"));
    }
}
