mod ast;
mod parser;

pub use ast::*;
pub use parser::{parse_expr_source, parse_program_source, Parser, Terminator, TerminatorKind};
