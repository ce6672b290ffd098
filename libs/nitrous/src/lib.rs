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

//! The DSL front end: lexer/parser, value model, environment and
//! reserved-name policy, arrow dispatcher, tree-walking evaluator, and
//! output formatter. `main.rs` drives this crate from either a script
//! file or the interactive REPL.

mod dispatcher;
mod environment;
mod error;
mod evaluator;
mod formatter;
mod ir;
mod script;
mod value;

pub use environment::Environment;
pub use error::DslError;
pub use evaluator::Evaluator;
pub use ir::{BinOp, CompareOp, Expr, LogicalOp, Name, Stmt, UnaryOp};
pub use script::Script;
pub use value::{BodyValue, EarthContextValue, ObserverValue, Value};
