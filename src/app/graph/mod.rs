mod build;
mod interaction;
mod view;

pub use build::{EmptyTree, GraphLink, GraphModel, GraphNode, HierarchyNode, build_graph_model};
pub(in crate::app) use interaction::PointerState;
