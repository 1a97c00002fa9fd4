/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * Interpreter Runtime
 * -------------------
 * This module owns the execution state for one script run or interactive
 * session. Evaluation logic is delegated to the submodules:
 *
 *  - environment.rs → the variable workspace
 *  - expressions.rs → fragment dispatch (call / literal / variable / number)
 *  - arith.rs       → operator-precedence evaluation
 *  - builtins.rs    → the fixed built-in function table
 *  - display.rs     → value and workspace formatting
 *  - statements.rs  → block matching and control-flow execution
 *
 * License:
 * This file is part of the MLAB project.
 *
 * MLAB is dual-licensed under the terms of:
 *   - The MIT License
 *   - The Apache License, Version 2.0
 *
 * You may choose either license to govern your use of this software.
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under these licenses is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *
 * ==========================================================================
 */

pub mod arith;
pub mod builtins;
pub mod display;
pub mod environment;
pub mod expressions;
pub mod statements;

use crate::error::MlabError;
use environment::{is_valid_name, Workspace};
use statements::Signal;

/// One interpreter session: the variable workspace plus the append-only
/// output sink that display renderings and `disp` calls write into.
///
/// A session is exclusively owned by one script runner or REPL for its
/// lifetime. Sharing state across successive script runs means passing the
/// session explicitly, there is no ambient global workspace.
#[derive(Debug, Default)]
pub struct Session {
    workspace: Workspace,
    output: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn workspace_mut(&mut self) -> &mut Workspace {
        &mut self.workspace
    }

    /// Appends text to the captured output stream.
    pub fn out(&mut self, text: &str) {
        self.output.push_str(text);
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    /// Drains the captured output (the REPL prints after each command; the
    /// runner drains once at the end of a run).
    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Executes one non-control statement: a special command, an
    /// assignment, or a bare expression. The line must already be stripped
    /// of inline comments and joined across continuations.
    pub fn process_command(&mut self, line: &str) -> Result<Signal, MlabError> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(Signal::Normal);
        }

        // A trailing semicolon suppresses display; strip it before matching
        // special commands so `clear;` and `clc;` work.
        let suppress = trimmed.ends_with(';');
        let cmd = trimmed.trim_end_matches(';').trim_end();
        if cmd.is_empty() {
            return Ok(Signal::Normal);
        }

        match cmd {
            "quit" | "exit" => return Ok(Signal::Quit),
            "clear" | "clear all" => {
                self.workspace.clear_all();
                return Ok(Signal::Normal);
            }
            "clc" => {
                // ANSI clear-screen, exactly what the terminal sink expects.
                self.out("\x1b[2J\x1b[H");
                return Ok(Signal::Normal);
            }
            // Figure windows are an out-of-scope output sink; scripts that
            // close them should not error.
            "close" | "close all" => return Ok(Signal::Normal),
            "who" => {
                let listing = display::format_who(&self.workspace);
                self.out(&listing);
                return Ok(Signal::Normal);
            }
            "whos" => {
                let listing = display::format_whos(&self.workspace);
                self.out(&listing);
                return Ok(Signal::Normal);
            }
            "help" => {
                self.out(display::help_text());
                return Ok(Signal::Normal);
            }
            _ => {}
        }

        if let Some(name) = cmd.strip_prefix("clear ") {
            let name = name.trim();
            if !is_valid_name(name) {
                return Err(MlabError::InvalidIdentifier(name.to_string()));
            }
            self.workspace.clear_one(name);
            return Ok(Signal::Normal);
        }

        if let Some((lhs, rhs)) = split_assignment(cmd) {
            return self.execute_assignment(lhs.trim(), rhs.trim(), suppress);
        }

        self.execute_expression(cmd, suppress)
    }

    fn execute_assignment(
        &mut self,
        name: &str,
        expr: &str,
        suppress: bool,
    ) -> Result<Signal, MlabError> {
        if !is_valid_name(name) {
            return Err(MlabError::InvalidIdentifier(name.to_string()));
        }

        let value = expressions::evaluate(expr, &self.workspace, &mut self.output)?;
        self.workspace.set(name, value.clone());

        if !suppress {
            let block = display::format_binding(name, &value);
            self.out(&block);
        }
        Ok(Signal::Normal)
    }

    fn execute_expression(&mut self, expr: &str, suppress: bool) -> Result<Signal, MlabError> {
        let value = expressions::evaluate(expr, &self.workspace, &mut self.output)?;

        // `disp(...)` is statement-shaped: it already wrote its output and
        // its placeholder result is neither bound to `ans` nor displayed.
        if expressions::is_display_statement(expr) {
            return Ok(Signal::Normal);
        }

        // `ans` is bound on every expression statement, suppressed or not;
        // suppression only hides the display.
        self.workspace.set("ans", value.clone());
        if !suppress {
            let block = display::format_binding("ans", &value);
            self.out(&block);
        }
        Ok(Signal::Normal)
    }

    /// Evaluates a loop/branch condition: truthy means a nonzero scalar.
    /// A condition that fails to evaluate counts as false.
    pub fn condition_truthy(&mut self, cond: &str) -> bool {
        expressions::evaluate(cond, &self.workspace, &mut self.output)
            .map(|v| v.is_truthy())
            .unwrap_or(false)
    }
}

/// Finds the top-level assignment `=`, skipping the two-character operators
/// (`==`, `~=`, `<=`, `>=`) and quoted spans. Returns the text on each side.
fn split_assignment(cmd: &str) -> Option<(&str, &str)> {
    let chars: Vec<char> = cmd.chars().collect();
    let mut in_string = false;

    let mut byte = 0usize;
    for (i, &c) in chars.iter().enumerate() {
        if in_string {
            if c == '\'' {
                in_string = false;
            }
            byte += c.len_utf8();
            continue;
        }
        match c {
            '\'' => in_string = true,
            '=' => {
                let prev = if i > 0 { chars[i - 1] } else { '\0' };
                let next = chars.get(i + 1).copied().unwrap_or('\0');
                if prev != '=' && prev != '~' && prev != '<' && prev != '>' && next != '=' {
                    return Some((&cmd[..byte], &cmd[byte + 1..]));
                }
            }
            _ => {}
        }
        byte += c.len_utf8();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use pretty_assertions::assert_eq;

    fn run(session: &mut Session, line: &str) -> Result<Signal, MlabError> {
        session.process_command(line)
    }

    #[test]
    fn assignment_binds_and_displays() {
        let mut s = Session::new();
        run(&mut s, "x = 5").unwrap();
        assert_eq!(s.workspace().get("x").unwrap(), Value::Scalar(5.0));
        assert_eq!(s.take_output(), "\nx =\n\n    5\n\n");
    }

    #[test]
    fn semicolon_suppresses_display_but_still_binds() {
        let mut s = Session::new();
        run(&mut s, "x = 5;").unwrap();
        assert_eq!(s.workspace().get("x").unwrap(), Value::Scalar(5.0));
        assert_eq!(s.take_output(), "");
    }

    #[test]
    fn equality_is_not_an_assignment() {
        let mut s = Session::new();
        run(&mut s, "x = 2;").unwrap();
        run(&mut s, "x == 2").unwrap();
        assert_eq!(s.workspace().get("ans").unwrap(), Value::Scalar(1.0));
        assert_eq!(s.workspace().get("x").unwrap(), Value::Scalar(2.0));
    }

    #[test]
    fn bare_expressions_bind_ans_even_when_suppressed() {
        let mut s = Session::new();
        run(&mut s, "1 + 2;").unwrap();
        assert_eq!(s.workspace().get("ans").unwrap(), Value::Scalar(3.0));
        assert_eq!(s.take_output(), "");

        run(&mut s, "2 + 2").unwrap();
        assert_eq!(s.workspace().get("ans").unwrap(), Value::Scalar(4.0));
        assert!(s.take_output().contains("ans ="));
    }

    #[test]
    fn disp_writes_output_without_touching_ans() {
        let mut s = Session::new();
        run(&mut s, "disp(42)").unwrap();
        assert_eq!(s.take_output(), "    42\n");
        assert!(!s.workspace().exists("ans"));
    }

    #[test]
    fn invalid_assignment_target() {
        let mut s = Session::new();
        assert!(matches!(
            run(&mut s, "2x = 5"),
            Err(MlabError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn special_commands() {
        let mut s = Session::new();
        run(&mut s, "a = 1;").unwrap();
        run(&mut s, "b = 2;").unwrap();

        run(&mut s, "clear a").unwrap();
        assert!(!s.workspace().exists("a"));
        assert!(s.workspace().exists("b"));

        run(&mut s, "who").unwrap();
        assert!(s.take_output().contains("b"));

        run(&mut s, "clear;").unwrap();
        assert!(s.workspace().is_empty());

        assert_eq!(run(&mut s, "quit").unwrap(), Signal::Quit);
        assert_eq!(run(&mut s, "exit").unwrap(), Signal::Quit);
    }

    #[test]
    fn whos_reports_shapes() {
        let mut s = Session::new();
        run(&mut s, "M = [1 2 3; 4 5 6];").unwrap();
        run(&mut s, "whos").unwrap();
        let listing = s.take_output();
        assert!(listing.contains("2x3"));
        assert!(listing.contains("48"));
    }

    #[test]
    fn assignment_splitter_skips_comparisons() {
        assert_eq!(split_assignment("x = 5"), Some(("x ", " 5")));
        assert_eq!(split_assignment("x == 5"), None);
        assert_eq!(split_assignment("a ~= b"), None);
        assert_eq!(split_assignment("a <= b"), None);
        assert_eq!(split_assignment("y = x == 5"), Some(("y ", " x == 5")));
    }
}
