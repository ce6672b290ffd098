// This file is part of Nitrogen.
//
// Nitrogen is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// Nitrogen is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with Nitrogen.  If not, see <http://www.gnu.org/licenses/>.

use lalrpop_util::lalrpop_mod;
lalrpop_mod!(#[allow(clippy::all)] pub(crate) grammar);

use crate::error::DslError;
use crate::ir::Stmt;

pub struct Script {
    pub statements: Vec<Stmt>,
}

impl Script {
    /// Parse one or more statements. A lexer/parser error on end-of-input
    /// is reported distinctly from other parse errors so the REPL driver
    /// can tell "possibly incomplete" from "definitely wrong".
    pub fn compile(raw: &str) -> Result<Self, DslError> {
        match grammar::ProgramParser::new().parse(raw) {
            Ok(statements) => Ok(Self { statements }),
            Err(e) => Err(DslError::Parse(describe_parse_error(&e))),
        }
    }

    /// True when the error looks like the parser ran out of tokens mid
    /// construct rather than rejecting a malformed one — the REPL's signal
    /// to keep buffering instead of resetting.
    pub fn looks_incomplete(raw: &str) -> bool {
        matches!(
            grammar::ProgramParser::new().parse(raw),
            Err(lalrpop_util::ParseError::UnrecognizedEof { .. })
        )
    }
}

fn describe_parse_error<T: std::fmt::Debug, E: std::fmt::Debug>(
    e: &lalrpop_util::ParseError<usize, T, E>,
) -> String {
    format!("{:?}", e)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::ir::{BinOp, Expr, Name};

    #[test]
    fn parses_arithmetic_precedence() {
        let script = Script::compile("2 + 3 * 4").unwrap();
        assert_eq!(script.statements.len(), 1);
        match &script.statements[0] {
            Stmt::Expr(e) => assert!(matches!(**e, Expr::BinOp(_, BinOp::Add, _))),
            _ => panic!("expected an expression statement"),
        }
    }

    #[test]
    fn parses_assignment_to_variable() {
        let script = Script::compile("tz = 9").unwrap();
        match &script.statements[0] {
            Stmt::Assign(Name::Var(n), _) => assert_eq!(n, "tz"),
            _ => panic!("expected a variable assignment"),
        }
    }

    #[test]
    fn parses_assignment_to_body() {
        let script = Script::compile("Here = Observer(35, 139, 0)").unwrap();
        match &script.statements[0] {
            Stmt::Assign(Name::Body(n), _) => assert_eq!(n, "Here"),
            _ => panic!("expected a body assignment"),
        }
    }

    #[test]
    fn arrow_chain_is_left_associative() {
        // `Sun -> Observer -> Moon` must parse as `(Sun -> Observer) -> Moon`.
        let script = Script::compile("Sun -> Here -> Moon").unwrap();
        match &script.statements[0] {
            Stmt::Expr(e) => match &**e {
                Expr::Arrow(l, r) => {
                    assert!(matches!(**l, Expr::Arrow(_, _)));
                    assert!(matches!(**r, Expr::BodyRef(_)));
                }
                _ => panic!("expected an arrow expression"),
            },
            _ => panic!("expected an expression statement"),
        }
    }

    #[test]
    fn arrow_binds_looser_than_arithmetic() {
        // Constructor numeric arguments must nest correctly rather than
        // being captured by a surrounding arrow.
        let script = Script::compile("Observer(35, 139, 0) -> Observer(34 + 1, 135, 0)").unwrap();
        assert_eq!(script.statements.len(), 1);
    }

    #[test]
    fn if_then_else_endif() {
        let script = Script::compile("IF 1 > 0 THEN x = 1 ELSE x = 2 ENDIF").unwrap();
        assert!(matches!(script.statements[0], Stmt::If { .. }));
    }

    #[test]
    fn mismatched_parens_is_a_parse_error() {
        assert!(Script::compile("((22)").is_err());
    }

    #[test]
    fn dot_access_chains() {
        let script = Script::compile("Here.lat").unwrap();
        match &script.statements[0] {
            Stmt::Expr(e) => assert!(matches!(**e, Expr::Attr(_, _))),
            _ => panic!("expected a dot-access expression"),
        }
    }
}
