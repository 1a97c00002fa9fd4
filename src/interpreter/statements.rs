/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      statements.rs
 * Purpose:   Line classification, block matching, and the control-flow
 *            executor for for/while/if constructs.
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

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{MlabError, ScriptError};
use crate::interpreter::Session;
use crate::lexer::{tokenize, TokenKind};
use crate::value::Value;

/// Safety fuse against non-terminating `while` loops. Reaching it records a
/// `LoopLimitExceeded` diagnostic and continues after the block.
pub const WHILE_ITERATION_CEILING: usize = 100_000;

/// Control signal returned by statement execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// Normal fall-through execution.
    Normal,
    /// `break` out of the innermost loop.
    Break,
    /// `continue` with the next loop iteration.
    Continue,
    /// `quit`/`exit`: stop the run entirely.
    Quit,
}

/// What one source line *is*, before any evaluation happens.
///
/// Header kinds carry the text after their keyword (the loop range or the
/// branch condition).
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Empty,
    Comment,
    /// `%%` line; carries the section title.
    Section(String),
    For(String),
    While(String),
    If(String),
    Elseif(String),
    Else,
    End,
    Break,
    Continue,
    Statement,
}

/// Classifies one line by its leading token.
///
/// Keyword headers are recognized via the lexer, so `while(1)`, `end;` and
/// `end % note` classify correctly while `end_time = 5` stays a statement.
pub fn classify(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Empty;
    }
    if let Some(title) = trimmed.strip_prefix("%%") {
        return LineKind::Section(title.trim().to_string());
    }
    if trimmed.starts_with('%') {
        return LineKind::Comment;
    }

    let stripped = strip_inline_comment(trimmed).trim_end();
    if stripped.is_empty() {
        return LineKind::Empty;
    }

    let tokens = tokenize(stripped);
    let rest_of = |keyword: &str| stripped[keyword.len()..].trim().to_string();
    // True when nothing but a `;` or a comment follows the keyword.
    let bare = tokens[1..].iter().all(|t| {
        matches!(
            t.kind,
            TokenKind::Semicolon | TokenKind::Comment | TokenKind::Newline | TokenKind::Eof
        )
    });

    match tokens[0].kind {
        TokenKind::For => LineKind::For(rest_of("for")),
        TokenKind::While => LineKind::While(rest_of("while")),
        TokenKind::If => LineKind::If(rest_of("if")),
        TokenKind::Elseif => LineKind::Elseif(rest_of("elseif")),
        TokenKind::Else if bare => LineKind::Else,
        TokenKind::End if bare => LineKind::End,
        TokenKind::Break if bare => LineKind::Break,
        TokenKind::Continue if bare => LineKind::Continue,
        _ => LineKind::Statement,
    }
}

/// Cuts an inline `%` comment off a line, unless the `%` sits inside a
/// single-quoted string.
pub fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '\'' => in_string = !in_string,
            '%' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Finds the line index of the `end` matching a block header.
///
/// `start` is the first line after the header; `limit` bounds the scan to
/// the enclosing block. Depth starts at 1 for the already-consumed header,
/// increments on nested headers, and decrements on `end` lines; depth is a
/// signed counter and returns the moment it reaches zero, so it can never
/// go negative.
pub fn find_matching_end(
    lines: &[String],
    start: usize,
    limit: usize,
    header_line: usize,
) -> Result<usize, MlabError> {
    let mut depth: i32 = 1;
    for (i, line) in lines.iter().enumerate().take(limit).skip(start) {
        match classify(line) {
            LineKind::For(_) | LineKind::While(_) | LineKind::If(_) => depth += 1,
            LineKind::End => {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            _ => {}
        }
    }
    Err(MlabError::UnmatchedBlock(header_line))
}

/// One `if`/`elseif`/`else` arm: an optional condition (absent for `else`)
/// and a half-open body range of physical lines.
struct Branch {
    condition: Option<String>,
    lo: usize,
    hi: usize,
}

/// Collects the branches of an `if` construct. Branch markers are only
/// recognized at the same nesting depth as the enclosing `if`, an `elseif`
/// belonging to a nested `if` stays inside that branch's body.
fn collect_branches(lines: &[String], body_lo: usize, end_idx: usize, first_cond: String) -> Vec<Branch> {
    let mut branches = vec![Branch {
        condition: Some(first_cond),
        lo: body_lo,
        hi: end_idx,
    }];

    let mut depth: i32 = 0;
    for i in body_lo..end_idx {
        match classify(&lines[i]) {
            LineKind::For(_) | LineKind::While(_) | LineKind::If(_) => depth += 1,
            LineKind::End => depth -= 1,
            LineKind::Elseif(cond) if depth == 0 => {
                if let Some(last) = branches.last_mut() {
                    last.hi = i;
                }
                branches.push(Branch {
                    condition: Some(cond),
                    lo: i + 1,
                    hi: end_idx,
                });
            }
            LineKind::Else if depth == 0 => {
                if let Some(last) = branches.last_mut() {
                    last.hi = i;
                }
                branches.push(Branch {
                    condition: None,
                    lo: i + 1,
                    hi: end_idx,
                });
            }
            _ => {}
        }
    }

    branches
}

/// Parses `name = start:end` / `name = start:step:end` from the text after
/// `for`. Bounds are numeric literals; a zero step is a hard error.
fn parse_for_header(rest: &str) -> Result<(String, f64, f64, f64), MlabError> {
    static HEADER_RE: OnceLock<Regex> = OnceLock::new();
    let re = HEADER_RE
        .get_or_init(|| Regex::new(r"^\(?\s*([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+?)\)?$").unwrap());

    let caps = re
        .captures(rest)
        .ok_or_else(|| MlabError::InvalidLoopHeader(rest.to_string()))?;
    let var = caps[1].to_string();
    let range = &caps[2];

    let parts: Vec<f64> = range
        .split(':')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| MlabError::InvalidLoopHeader(rest.to_string()))?;

    let (start, step, stop) = match parts.as_slice() {
        [start, stop] => (*start, 1.0, *stop),
        [start, step, stop] => (*start, *step, *stop),
        _ => return Err(MlabError::InvalidLoopHeader(rest.to_string())),
    };

    if step == 0.0 {
        return Err(MlabError::InvalidStep);
    }
    Ok((var, start, step, stop))
}

/// Executes a range of script lines against a session.
///
/// Each construct is parsed and fully executed before control returns to
/// the caller; there is no persistent state machine. Failures are recorded
/// per line (at most once per line/message pair) and execution continues,
/// except for fatal errors, a block with no `end` aborts everything after
/// it.
pub struct Executor<'a> {
    lines: &'a [String],
    session: &'a mut Session,
    errors: &'a mut Vec<ScriptError>,
    sections: &'a mut Vec<String>,
    loop_depth: usize,
}

impl<'a> Executor<'a> {
    pub fn new(
        lines: &'a [String],
        session: &'a mut Session,
        errors: &'a mut Vec<ScriptError>,
        sections: &'a mut Vec<String>,
    ) -> Self {
        Self {
            lines,
            session,
            errors,
            sections,
            loop_depth: 0,
        }
    }

    /// Runs lines `lo..hi` with per-line isolation. Returns the first
    /// signal that must propagate (break/continue/quit), or a fatal error.
    pub fn run_range(&mut self, lo: usize, hi: usize) -> Result<Signal, MlabError> {
        let mut idx = lo;
        while idx < hi {
            let (next, result) = self.step(idx, hi);
            match result {
                Ok(Signal::Normal) => idx = next,
                Ok(signal) => return Ok(signal),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    self.record(idx + 1, &e);
                    idx = next;
                }
            }
        }
        Ok(Signal::Normal)
    }

    /// Executes the construct or statement starting at `idx`, returning the
    /// next line index alongside the outcome.
    fn step(&mut self, idx: usize, hi: usize) -> (usize, Result<Signal, MlabError>) {
        match classify(&self.lines[idx]) {
            LineKind::Empty | LineKind::Comment => return (idx + 1, Ok(Signal::Normal)),
            LineKind::Section(title) => {
                if !title.is_empty() {
                    self.session.out(&format!("\n── {} ──\n", title));
                }
                self.sections.push(title);
                return (idx + 1, Ok(Signal::Normal));
            }
            _ => {}
        }

        // Join continuation lines before deciding what the statement is, so
        // a header split across physical lines still works.
        let (stmt, next) = assemble_logical(self.lines, idx, hi);

        match classify(&stmt) {
            LineKind::For(rest) => self.execute_for(idx, next, rest, hi),
            LineKind::While(cond) => self.execute_while(idx, next, cond, hi),
            LineKind::If(cond) => self.execute_if(idx, next, cond, hi),
            LineKind::Elseif(_) => (next, Err(MlabError::UnexpectedKeyword("elseif"))),
            LineKind::Else => (next, Err(MlabError::UnexpectedKeyword("else"))),
            LineKind::End => (next, Err(MlabError::UnexpectedKeyword("end"))),
            LineKind::Break => {
                if self.loop_depth > 0 {
                    (next, Ok(Signal::Break))
                } else {
                    (next, Err(MlabError::ControlOutsideLoop("break")))
                }
            }
            LineKind::Continue => {
                if self.loop_depth > 0 {
                    (next, Ok(Signal::Continue))
                } else {
                    (next, Err(MlabError::ControlOutsideLoop("continue")))
                }
            }
            LineKind::Empty | LineKind::Comment | LineKind::Section(_) => {
                (next, Ok(Signal::Normal))
            }
            LineKind::Statement => (next, self.session.process_command(&stmt)),
        }
    }

    fn execute_for(
        &mut self,
        header_idx: usize,
        body_lo: usize,
        rest: String,
        hi: usize,
    ) -> (usize, Result<Signal, MlabError>) {
        let header_line = header_idx + 1;
        let end_idx = match find_matching_end(self.lines, body_lo, hi, header_line) {
            Ok(i) => i,
            Err(e) => return (hi, Err(e)),
        };

        let (var, start, step, stop) = match parse_for_header(&rest) {
            Ok(parsed) => parsed,
            Err(e) => {
                // A malformed header aborts only this construct.
                self.record(header_line, &e);
                return (end_idx + 1, Ok(Signal::Normal));
            }
        };

        // Iteration values are computed, not accumulated, so long ranges do
        // not drift; the tolerance keeps fractional steps from dropping the
        // final value.
        let tol = step.abs() * 1e-10;
        self.loop_depth += 1;
        let mut k: u64 = 0;
        let outcome = loop {
            let val = start + (k as f64) * step;
            let in_range = if step > 0.0 {
                val <= stop + tol
            } else {
                val >= stop - tol
            };
            if !in_range {
                break Ok(Signal::Normal);
            }

            self.session.workspace_mut().set(&var, Value::Scalar(val));
            match self.run_range(body_lo, end_idx) {
                Ok(Signal::Normal) | Ok(Signal::Continue) => {}
                Ok(Signal::Break) => break Ok(Signal::Normal),
                Ok(Signal::Quit) => break Ok(Signal::Quit),
                Err(e) => break Err(e),
            }
            k += 1;
        };
        self.loop_depth -= 1;

        (end_idx + 1, outcome)
    }

    fn execute_while(
        &mut self,
        header_idx: usize,
        body_lo: usize,
        cond: String,
        hi: usize,
    ) -> (usize, Result<Signal, MlabError>) {
        let header_line = header_idx + 1;
        let end_idx = match find_matching_end(self.lines, body_lo, hi, header_line) {
            Ok(i) => i,
            Err(e) => return (hi, Err(e)),
        };

        if cond.is_empty() {
            self.record(header_line, &MlabError::InvalidLoopHeader("while".to_string()));
            return (end_idx + 1, Ok(Signal::Normal));
        }

        self.loop_depth += 1;
        let mut iterations = 0usize;
        let outcome = loop {
            if iterations >= WHILE_ITERATION_CEILING {
                self.record(
                    header_line,
                    &MlabError::LoopLimitExceeded(WHILE_ITERATION_CEILING),
                );
                break Ok(Signal::Normal);
            }
            iterations += 1;

            // The loop exits when the condition is zero/false or fails to
            // evaluate at all.
            if !self.session.condition_truthy(&cond) {
                break Ok(Signal::Normal);
            }

            match self.run_range(body_lo, end_idx) {
                Ok(Signal::Normal) | Ok(Signal::Continue) => {}
                Ok(Signal::Break) => break Ok(Signal::Normal),
                Ok(Signal::Quit) => break Ok(Signal::Quit),
                Err(e) => break Err(e),
            }
        };
        self.loop_depth -= 1;

        (end_idx + 1, outcome)
    }

    fn execute_if(
        &mut self,
        header_idx: usize,
        body_lo: usize,
        cond: String,
        hi: usize,
    ) -> (usize, Result<Signal, MlabError>) {
        let header_line = header_idx + 1;
        let end_idx = match find_matching_end(self.lines, body_lo, hi, header_line) {
            Ok(i) => i,
            Err(e) => return (hi, Err(e)),
        };

        let branches = collect_branches(self.lines, body_lo, end_idx, cond);
        for branch in branches {
            let should_run = match &branch.condition {
                None => true,
                Some(c) => self.session.condition_truthy(c),
            };
            if should_run {
                let result = self.run_range(branch.lo, branch.hi);
                return (end_idx + 1, result);
            }
        }

        (end_idx + 1, Ok(Signal::Normal))
    }

    /// Records a diagnostic once: a line failing identically on every loop
    /// iteration yields a single entry.
    fn record(&mut self, line: usize, error: &MlabError) {
        let entry = ScriptError::new(line, error);
        if !self.errors.contains(&entry) {
            self.errors.push(entry);
        }
    }
}

/// Builds one logical statement starting at `idx`: strips the inline
/// comment, then joins continuation lines while the text ends in `...`.
/// Returns the statement and the index of the first unconsumed line.
fn assemble_logical(lines: &[String], idx: usize, hi: usize) -> (String, usize) {
    let mut stmt = strip_inline_comment(&lines[idx]).trim().to_string();
    let mut next = idx + 1;

    while stmt.ends_with("...") {
        stmt.truncate(stmt.len() - 3);
        if next >= hi {
            break;
        }
        stmt.push(' ');
        stmt.push_str(strip_inline_comment(&lines[next]).trim());
        next += 1;
    }

    (stmt.trim().to_string(), next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(src: &[&str]) -> Vec<String> {
        src.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn classification_by_leading_token() {
        assert_eq!(classify(""), LineKind::Empty);
        assert_eq!(classify("  % note"), LineKind::Comment);
        assert_eq!(classify("%% Setup"), LineKind::Section("Setup".to_string()));
        assert_eq!(classify("for i = 1:3"), LineKind::For("i = 1:3".to_string()));
        assert_eq!(classify("while(1)"), LineKind::While("(1)".to_string()));
        assert_eq!(classify("if x < 5"), LineKind::If("x < 5".to_string()));
        assert_eq!(classify("elseif x > 9"), LineKind::Elseif("x > 9".to_string()));
        assert_eq!(classify("else"), LineKind::Else);
        assert_eq!(classify("end"), LineKind::End);
        assert_eq!(classify("end;  % done"), LineKind::End);
        assert_eq!(classify("end_time = 5"), LineKind::Statement);
        assert_eq!(classify("forecast = 2"), LineKind::Statement);
        assert_eq!(classify("break"), LineKind::Break);
    }

    #[test]
    fn inline_comments_respect_strings() {
        assert_eq!(strip_inline_comment("x = 5 % five"), "x = 5 ");
        assert_eq!(strip_inline_comment("s = '100% sure'"), "s = '100% sure'");
    }

    #[test]
    fn matcher_tracks_nesting() {
        let src = lines(&[
            "for i = 1:3",    // 0
            "  if i > 1",     // 1
            "    x = i;",     // 2
            "  end",          // 3
            "end",            // 4
        ]);
        assert_eq!(find_matching_end(&src, 1, src.len(), 1).unwrap(), 4);
        assert_eq!(find_matching_end(&src, 2, src.len(), 2).unwrap(), 3);
    }

    #[test]
    fn matcher_reports_the_header_line_when_unmatched() {
        let src = lines(&["for i = 1:3", "x = i;"]);
        let err = find_matching_end(&src, 1, src.len(), 1);
        assert!(matches!(err, Err(MlabError::UnmatchedBlock(1))));
    }

    #[test]
    fn branch_markers_of_nested_ifs_are_not_collected() {
        let src = lines(&[
            "if a",           // 0 (header, not scanned here)
            "  if b",         // 1
            "    y = 1;",     // 2
            "  else",         // 3, belongs to the nested if
            "    y = 2;",     // 4
            "  end",          // 5
            "else",           // 6, belongs to the outer if
            "  y = 3;",       // 7
            "end",            // 8
        ]);
        let branches = collect_branches(&src, 1, 8, "a".to_string());
        assert_eq!(branches.len(), 2);
        assert_eq!(branches[0].lo, 1);
        assert_eq!(branches[0].hi, 6);
        assert_eq!(branches[1].condition, None);
        assert_eq!(branches[1].lo, 7);
    }

    #[test]
    fn for_header_parsing() {
        assert_eq!(
            parse_for_header("i = 1:5").unwrap(),
            ("i".to_string(), 1.0, 1.0, 5.0)
        );
        assert_eq!(
            parse_for_header("k = 10:-2:0").unwrap(),
            ("k".to_string(), 10.0, -2.0, 0.0)
        );
        assert!(matches!(
            parse_for_header("i 1:5"),
            Err(MlabError::InvalidLoopHeader(_))
        ));
        assert!(matches!(
            parse_for_header("i = 1:q"),
            Err(MlabError::InvalidLoopHeader(_))
        ));
        assert!(matches!(
            parse_for_header("i = 1:0:5"),
            Err(MlabError::InvalidStep)
        ));
    }

    #[test]
    fn continuation_lines_join_into_one_statement() {
        let src = lines(&["x = ...", "  5"]);
        let (stmt, next) = assemble_logical(&src, 0, 2);
        assert_eq!(stmt, "x = 5");
        assert_eq!(next, 2);
    }
}
