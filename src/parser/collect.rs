use anyhow::Result;

use super::command::run_parser_command;
use super::response::decode_parse_reply;
use super::syntax::SyntaxNode;

/// A successfully parsed source buffer, ready for the graph model builder.
#[derive(Clone, Debug)]
pub struct ParsedSource {
    pub tree: SyntaxNode,
    pub source_lines: usize,
}

/// Runs the producer command over the given source and decodes its reply.
/// Syntax failures come back as `ParseError::Syntax` with the producer's
/// message untouched; transport and JSON problems carry anyhow context.
pub fn collect_parsed_source(parser_cmd: &str, source: &str) -> Result<ParsedSource> {
    let raw = run_parser_command(parser_cmd, source)?;
    let (tree, source_lines) = decode_parse_reply(&raw)?;

    Ok(ParsedSource { tree, source_lines })
}
