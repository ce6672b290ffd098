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

//! The interactive prompt. Line editing, history, and syntax highlighting
//! are left to the terminal/shell the user is running in; this only owns
//! the REPL *logic*: line-continuation buffering, the built-in shell
//! commands, and handing complete statements to `nitrous::Evaluator`.

use anyhow::Result;
use nitrous::{Evaluator, Script};
use std::io::{BufRead, Write};

const HELP_TEXT: &str = r#"
Statement forms:
  name = expr                observer/variable assignment
  expr                        evaluate (and, if Echo=Yes, print) a value
  IF expr THEN ... ENDIF      conditional
  Observer -> Body             position / rise / transit / set
  Observer -> Observer         inter-location distance and bearing
  Body -> Body                 angular separation
  Body -> Mountain              mountain-occlusion plausibility check
  Sun -> Observer -> Moon       lunar eclipse search

Built-ins: exit, quit, help [topic], ! <os-command>
A line ending in '\' continues the statement on the next line.
Type 'help <topic>' for one of: Date, Observer, Mountain, Direction, arrow, eclipse.
"#;

/// Per-topic help paragraphs. Unrecognised topics report "no help
/// available" rather than erroring the session.
const HELP_TOPICS: &[(&str, &str)] = &[
    (
        "Date",
        "Date(\"YYYY/M/D H:M:S\") parses a local time using env.Tz and converts it to UTC. \
         UTC(\"YYYY/M/D H:M:S\") parses the same format directly as UTC. Now() returns the \
         current instant.",
    ),
    (
        "Observer",
        "Observer(lat, lon, elev) constructs a geodetic station (degrees, degrees, metres) \
         at env.Time. Assign it to Here (or any variable) before arrowing it at a body.",
    ),
    (
        "Mountain",
        "Mountain(lat, lon, elev) constructs a station shaped like Observer but flagged as a \
         mountain and carrying no atmosphere. Body -> Mountain reports the bearing from Here to \
         the mountain and whether the body's last-observed position plausibly sits behind its \
         silhouette.",
    ),
    (
        "Direction",
        "Direction(n) sets the compass-label resolution used when rendering azimuths; n must be \
         4, 8, or 16.",
    ),
    (
        "arrow",
        "The -> operator is polymorphic: Observer -> Body prints a position/event table; \
         Observer -> Observer prints inter-location distance and bearing; Body -> Body prints \
         angular separation; Sun -> Observer -> Moon searches for lunar eclipses.",
    ),
    (
        "eclipse",
        "Sun -> Observer -> Moon searches a window of Moon(period_years) (default 5) full moons \
         for lunar eclipses, printing one line per event with begin/max/end times, magnitude, and \
         classification (total/partial/penumbral).",
    ),
];

pub struct Repl<R: BufRead, W: Write> {
    input: R,
    output: W,
    evaluator: Evaluator,
    buffer: String,
}

/// Outcome of feeding one line to the REPL: keep reading, or stop.
enum Step {
    Continue,
    Stop,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(input: R, output: W, evaluator: Evaluator) -> Self {
        Self {
            input,
            output,
            evaluator,
            buffer: String::new(),
        }
    }

    /// Runs until EOF or an `exit`/`quit` built-in: print a prompt
    /// (continuation prompt while a statement is buffered), read a line,
    /// accumulate it, and try to parse+evaluate once the accumulated
    /// buffer no longer looks like a trailing-`\` continuation.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "Solar System Observer DSL")?;
        writeln!(self.output, "(Type 'exit' to quit, 'help' for commands)")?;
        loop {
            let prompt = if self.buffer.is_empty() { "sso> " } else { "...  " };
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let mut line = String::new();
            let bytes_read = self.input.read_line(&mut line)?;
            if bytes_read == 0 {
                // EOF (Ctrl+D): finish evaluating whatever is buffered, then stop.
                if !self.buffer.trim().is_empty() {
                    self.evaluate_buffer();
                }
                writeln!(self.output)?;
                break;
            }

            let line = line.trim_end_matches(['\n', '\r']);
            if self.buffer.is_empty() {
                if let Step::Stop = self.handle_builtin(line)? {
                    break;
                }
                if line.trim().is_empty() {
                    continue;
                }
            }

            if let Some(continued) = line.strip_suffix('\\') {
                self.buffer.push_str(continued);
                self.buffer.push('\n');
                continue;
            }
            self.buffer.push_str(line);
            self.buffer.push('\n');

            if Script::looks_incomplete(&self.buffer) {
                continue;
            }
            self.evaluate_buffer();
        }
        Ok(())
    }

    /// Built-in shell commands recognised outside the DSL grammar: `exit`,
    /// `quit`, `help [topic]`, `! <os-command>`. Only consulted at the
    /// start of a fresh (non-continued) statement.
    fn handle_builtin(&mut self, line: &str) -> Result<Step> {
        let trimmed = line.trim();
        match trimmed {
            "exit" | "quit" => return Ok(Step::Stop),
            "help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
                return Ok(Step::Continue);
            }
            _ => {}
        }
        if let Some(rest) = trimmed.strip_prefix("help ") {
            let topic = rest.trim();
            match HELP_TOPICS.iter().find(|(name, _)| name.eq_ignore_ascii_case(topic)) {
                Some((_, text)) => writeln!(self.output, "{}", text)?,
                None => writeln!(self.output, "no help available for '{}'", topic)?,
            }
            return Ok(Step::Continue);
        }
        if let Some(cmd) = trimmed.strip_prefix('!') {
            if cmd.trim().is_empty() {
                writeln!(self.output, "enter a command to run")?;
            } else {
                run_shell_command(cmd.trim());
            }
            return Ok(Step::Continue);
        }
        Ok(Step::Continue)
    }

    /// Parses and evaluates the accumulated buffer: a genuine parse error
    /// resets the buffer and reports the error; an end-of-input parse
    /// error is handled upstream by `Script::looks_incomplete` and never
    /// reaches here. Runtime errors abort only the failing statement —
    /// prior statements in the same buffer have already run and their
    /// side effects stand.
    fn evaluate_buffer(&mut self) {
        let source = std::mem::take(&mut self.buffer);
        match Script::compile(&source) {
            Ok(script) => {
                for stmt in &script.statements {
                    match self.evaluator.run_statement(stmt) {
                        Ok(value) => {
                            if self.evaluator.env.echo {
                                if let nitrous::Value::String(_) = value {
                                    // Print(...) already wrote its own line.
                                } else {
                                    println!("{}", value);
                                }
                            }
                        }
                        Err(e) => eprintln!("Error: {}", e),
                    }
                }
            }
            Err(e) => eprintln!("Syntax Error: {}", e),
        }
    }
}

#[cfg(unix)]
fn run_shell_command(cmd: &str) {
    use std::process::Command;
    match Command::new("/bin/sh").arg("-c").arg(cmd).status() {
        Ok(_) => {}
        Err(e) => eprintln!("could not run command: {}", e),
    }
}

#[cfg(not(unix))]
fn run_shell_command(cmd: &str) {
    use std::process::Command;
    match Command::new("cmd").arg("/C").arg(cmd).status() {
        Ok(_) => {}
        Err(e) => eprintln!("could not run command: {}", e),
    }
}

/// Non-interactive entry point: run every statement in a script file in
/// order, stopping at the first error.
pub fn run_script(evaluator: &mut Evaluator, source: &str) -> Result<()> {
    let script = Script::compile(source)?;
    for stmt in &script.statements {
        let value = evaluator.run_statement(stmt)?;
        if evaluator.env.echo {
            println!("{}", value);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use nitrous::Environment;
    use std::io::Cursor;

    fn env() -> Environment {
        Environment::new(Utc.with_ymd_and_hms(2026, 1, 21, 20, 0, 0).unwrap())
    }

    #[test]
    fn exit_stops_the_loop_without_evaluating_anything() {
        let input = Cursor::new(b"exit\n".to_vec());
        let mut output = Vec::new();
        let mut repl = Repl::new(input, &mut output, Evaluator::new(env()));
        repl.run().unwrap();
    }

    #[test]
    fn continuation_backslash_buffers_across_lines() {
        let input = Cursor::new(b"x = 1 + \\\n2\nquit\n".to_vec());
        let mut output = Vec::new();
        let mut repl = Repl::new(input, &mut output, Evaluator::new(env()));
        repl.run().unwrap();
        assert_eq!(repl.evaluator.env.get_variable("x"), nitrous::Value::number(3.0));
    }

    #[test]
    fn eof_with_empty_buffer_stops_cleanly() {
        let input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let mut repl = Repl::new(input, &mut output, Evaluator::new(env()));
        repl.run().unwrap();
    }

    #[test]
    fn run_script_executes_statements_in_order() {
        let mut evaluator = Evaluator::new(env());
        run_script(&mut evaluator, "Tz = 5\nx = 2 + 2").unwrap();
        assert_eq!(evaluator.env.tz_hours, 5.0);
        assert_eq!(evaluator.env.get_variable("x"), nitrous::Value::number(4.0));
    }

    #[test]
    fn help_topic_lookup_is_case_insensitive_and_falls_back_gracefully() {
        let input = Cursor::new(b"help mountain\nhelp bogus\nquit\n".to_vec());
        let mut output = Vec::new();
        let mut repl = Repl::new(input, &mut output, Evaluator::new(env()));
        repl.run().unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("silhouette"));
        assert!(text.contains("no help available for 'bogus'"));
    }
}
