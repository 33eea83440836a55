mod collect;
mod command;
mod response;
mod syntax;

pub use collect::{ParsedSource, collect_parsed_source};
pub use response::ParseError;
pub use syntax::SyntaxNode;
