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

//! The tree-walking evaluator. Visits `ir::Stmt`/`ir::Expr` nodes,
//! consulting `Environment` for names and dispatching arrows to the
//! arrow dispatcher.

use crate::dispatcher;
use crate::environment::Environment;
use crate::error::DslError;
use crate::ir::{BinOp, Expr, LogicalOp, Name, Stmt, UnaryOp};
use crate::script::Script;
use crate::value::{ObserverValue, Value};
use chrono::{DateTime, NaiveDateTime, Utc};

pub struct Evaluator {
    pub env: Environment,
}

impl Evaluator {
    pub fn new(env: Environment) -> Self {
        Self { env }
    }

    /// Parse and run every statement in `source`, in order. The evaluator
    /// clears `observer_hints` before each top-level statement, not once
    /// for the whole script.
    pub fn run(&mut self, source: &str) -> Result<Vec<Value>, DslError> {
        let script = Script::compile(source)?;
        script.statements.iter().map(|s| self.run_statement(s)).collect()
    }

    pub fn run_statement(&mut self, stmt: &Stmt) -> Result<Value, DslError> {
        self.env.reset_hints();
        log::info!("evaluating statement: {:?}", stmt);
        let result = self.exec(stmt);
        if let Err(ref e) = result {
            log::warn!("statement failed: {}", e);
        }
        result
    }

    fn exec(&mut self, stmt: &Stmt) -> Result<Value, DslError> {
        match stmt {
            Stmt::Expr(e) => self.eval(e),
            Stmt::Assign(name, e) => {
                let v = self.eval(e)?;
                match name {
                    Name::Var(n) => {
                        self.env.set_variable(n, v.clone());
                        Ok(v)
                    }
                    Name::Body(n) => {
                        self.env.set_body(n, v.clone())?;
                        Ok(v)
                    }
                }
            }
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                let taken = as_bool(&self.eval(cond)?)?;
                let block = if taken { Some(then_block) } else { else_block.as_ref() };
                let mut result = Value::number(0.0);
                if let Some(stmts) = block {
                    for s in stmts {
                        result = self.exec(s)?;
                    }
                }
                Ok(result)
            }
        }
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, DslError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::String(s.clone())),
            Expr::Var(name) => Ok(self.env.get_variable(name)),
            Expr::BodyRef(name) => self.env.get_body(name),
            Expr::Unary(UnaryOp::Neg, e) => self.eval(e)?.negate(),
            Expr::BinOp(l, op, r) => {
                let lv = self.eval(l)?;
                let rv = self.eval(r)?;
                match op {
                    BinOp::Add => lv.impl_add(rv),
                    BinOp::Subtract => lv.impl_subtract(rv),
                    BinOp::Multiply => lv.impl_multiply(rv),
                    BinOp::Divide => lv.impl_divide(rv),
                    BinOp::Power => lv.impl_pow(rv),
                }
            }
            Expr::Compare(l, op, r) => {
                let lv = self.eval(l)?;
                let rv = self.eval(r)?;
                lv.compare(op, &rv)
            }
            Expr::Logical(l, LogicalOp::And, r) => {
                if !as_bool(&self.eval(l)?)? {
                    return Ok(Value::bool(false));
                }
                Ok(Value::bool(as_bool(&self.eval(r)?)?))
            }
            Expr::Logical(l, LogicalOp::Or, r) => {
                if as_bool(&self.eval(l)?)? {
                    return Ok(Value::bool(true));
                }
                Ok(Value::bool(as_bool(&self.eval(r)?)?))
            }
            Expr::Not(e) => Ok(Value::bool(!as_bool(&self.eval(e)?)?)),
            Expr::Arrow(l, r) => {
                let lv = self.eval(l)?;
                let rv = self.eval(r)?;
                dispatcher::dispatch(&mut self.env, lv, rv)
            }
            Expr::Attr(base, attr) => Ok(self.eval(base)?.attr(attr)),
            Expr::Call(name, args) => self.call(name, args),
        }
    }

    fn call(&mut self, name: &str, args: &[Expr]) -> Result<Value, DslError> {
        match name {
            "Date" => {
                let arg = args
                    .first()
                    .ok_or_else(|| DslError::DateParse("Date() needs an argument in a non-interactive session".into()))?;
                let s = self.eval_str(arg)?;
                Ok(Value::Date(parse_local_date(&s, self.env.tz_hours)?))
            }
            "UTC" => {
                let arg = args.first().ok_or_else(|| DslError::DateParse("UTC() requires an argument".into()))?;
                let s = self.eval_str(arg)?;
                Ok(Value::Date(parse_utc_date(&s)?))
            }
            "Now" => Ok(Value::Date(Utc::now())),
            "Observer" => self.construct_observer(args, false),
            "Mountain" => self.construct_observer(args, true),
            "Direction" => {
                let n = self.eval_number(args.first().ok_or_else(|| {
                    DslError::TypeMismatch("Direction(n) requires one argument".into())
                })?)?;
                self.env.set_body("Direction", Value::number(n))?;
                Ok(Value::number(n))
            }
            "Home" => {
                self.env.here = self.env.home_default().clone();
                Ok(Value::Observer(self.env.here.clone()))
            }
            "Phase" => {
                log::info!("Phase(): visualisation is an external collaborator; nothing to render here");
                Ok(Value::number(0.0))
            }
            "Print" => {
                let mut parts = Vec::with_capacity(args.len());
                for a in args {
                    parts.push(self.eval(a)?.to_string());
                }
                let line = parts.join(" ");
                println!("{}", line);
                Ok(Value::String(line))
            }
            _ => {
                // Auxiliary call: `BodyName(arg)` stores `arg` into
                // `observer_hints` and returns the body, routing search
                // start dates / periods / places to the dispatcher.
                let body = self.env.get_body(name)?;
                if let Some(first) = args.first() {
                    let v = self.eval(first)?;
                    self.env.observer_hints.insert(name.to_owned(), v);
                }
                Ok(body)
            }
        }
    }

    fn eval_str(&mut self, e: &Expr) -> Result<String, DslError> {
        match self.eval(e)? {
            Value::String(s) => Ok(s),
            other => Err(DslError::TypeMismatch(format!("expected a string, got {}", other))),
        }
    }

    fn eval_number(&mut self, e: &Expr) -> Result<f64, DslError> {
        match self.eval(e)? {
            Value::Number(n) => Ok(n.0),
            other => Err(DslError::TypeMismatch(format!("expected a number, got {}", other))),
        }
    }

    fn construct_observer(&mut self, args: &[Expr], is_mountain: bool) -> Result<Value, DslError> {
        if args.len() != 3 {
            return Err(DslError::TypeMismatch(format!(
                "{}(lat, lon, elev) requires exactly 3 arguments",
                if is_mountain { "Mountain" } else { "Observer" }
            )));
        }
        let lat = self.eval_number(&args[0])?;
        let lon = self.eval_number(&args[1])?;
        let elev = self.eval_number(&args[2])?;
        let date = self.env.time;
        let observer = if is_mountain {
            ObserverValue::mountain(lat, lon, elev, date)
        } else {
            ObserverValue::new(lat, lon, elev, date)
        };
        Ok(Value::Observer(observer))
    }
}

fn as_bool(v: &Value) -> Result<bool, DslError> {
    match v {
        Value::Number(n) => Ok(n.0 != 0.0),
        other => Err(DslError::TypeMismatch(format!(
            "expected a number for a logical/conditional expression, got {}",
            other
        ))),
    }
}

const DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

fn parse_local_date(s: &str, tz_hours: f64) -> Result<DateTime<Utc>, DslError> {
    let naive = NaiveDateTime::parse_from_str(s, DATE_FORMAT).map_err(|_| DslError::DateParse(s.to_owned()))?;
    let offset = chrono::Duration::seconds((tz_hours * 3600.0) as i64);
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc) - offset)
}

fn parse_utc_date(s: &str) -> Result<DateTime<Utc>, DslError> {
    let naive = NaiveDateTime::parse_from_str(s, DATE_FORMAT).map_err(|_| DslError::DateParse(s.to_owned()))?;
    Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn evaluator() -> Evaluator {
        Evaluator::new(Environment::new(Utc.with_ymd_and_hms(2026, 1, 21, 20, 0, 0).unwrap()))
    }

    #[test]
    fn arithmetic_and_assignment() {
        let mut e = evaluator();
        let results = e.run("x = 2 + 3 * 4\nx").unwrap();
        assert_eq!(results[1], Value::number(14.0));
    }

    #[test]
    fn observer_hints_empty_at_start_of_each_statement() {
        let mut e = evaluator();
        e.run("Moon(3)").unwrap();
        // A fresh top-level statement must not see the previous hint.
        e.env.reset_hints();
        assert!(e.env.observer_hints.is_empty());
    }

    #[test]
    fn assigning_reserved_name_fails() {
        let mut e = evaluator();
        assert!(e.run("Moon = 1").is_err());
    }

    #[test]
    fn direction_out_of_range_reports_error_and_leaves_env_unchanged() {
        let mut e = evaluator();
        let before = e.env.direction_bins;
        assert!(e.run("Direction(5)").is_err());
        assert_eq!(e.env.direction_bins, before);
    }

    #[test]
    fn if_then_else_picks_the_right_branch() {
        let mut e = evaluator();
        let results = e.run("IF 1 > 0 THEN x = 10 ELSE x = 20 ENDIF\nx").unwrap();
        assert_eq!(results[1], Value::number(10.0));
    }

    #[test]
    fn dot_access_on_observer() {
        let mut e = evaluator();
        let results = e.run("Here = Observer(35, 139, 0)\nHere.lat").unwrap();
        assert_eq!(results[1], Value::number(35.0));
    }
}
