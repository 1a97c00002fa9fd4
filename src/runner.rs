/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      runner.rs
 * Purpose:   Drives whole-script execution: loads a .m file into lines,
 *            executes them with per-line failure isolation, and aggregates
 *            output, diagnostics, and timing into a ScriptResult.
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

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::Local;
use serde::Serialize;

use crate::error::{MlabError, ScriptError};
use crate::interpreter::statements::{Executor, Signal};
use crate::interpreter::Session;

/// The aggregate record of one script run. Produced once per run and never
/// mutated afterwards; serializable for the `--json` report.
#[derive(Debug, Serialize)]
pub struct ScriptResult {
    /// True iff the run recorded zero errors.
    pub success: bool,
    /// Everything the script displayed, in order.
    pub captured_output: String,
    /// Per-line diagnostics with 1-based line numbers.
    pub errors: Vec<ScriptError>,
    /// `%%` section titles, in encounter order.
    pub sections: Vec<String>,
    /// Wall-clock execution time.
    pub elapsed_seconds: f64,
    /// RFC 3339 completion timestamp.
    pub finished_at: String,
}

/// Executes `.m` script files against a fresh or caller-supplied session.
pub struct ScriptRunner {
    path: PathBuf,
}

impl ScriptRunner {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Runs the script in a fresh session.
    pub fn run(&self) -> ScriptResult {
        let mut session = Session::new();
        self.run_with_session(&mut session)
    }

    /// Runs the script against an existing session, so successive scripts
    /// (or a REPL invoking script files) can share one workspace.
    pub fn run_with_session(&self, session: &mut Session) -> ScriptResult {
        let started = Instant::now();
        let mut errors = Vec::new();
        let mut sections = Vec::new();

        match fs::read_to_string(&self.path) {
            Ok(content) => {
                let lines: Vec<String> = content.lines().map(String::from).collect();
                let (mut errs, mut secs, _signal) = execute_lines(&lines, session);
                errors.append(&mut errs);
                sections.append(&mut secs);
            }
            Err(source) => {
                let error = MlabError::ScriptLoad {
                    path: self.path.display().to_string(),
                    source,
                };
                errors.push(ScriptError::new(0, &error));
            }
        }

        ScriptResult {
            success: errors.is_empty(),
            captured_output: session.take_output(),
            errors,
            sections,
            elapsed_seconds: started.elapsed().as_secs_f64(),
            finished_at: Local::now().to_rfc3339(),
        }
    }
}

/// Executes a slice of script lines against a session.
///
/// Per-line failures are recorded and execution continues with the next
/// line; a fatal failure (a block with no matching `end`) is recorded
/// against the header line and nothing after it runs. The returned signal
/// reports whether the lines asked to quit.
pub fn execute_lines(
    lines: &[String],
    session: &mut Session,
) -> (Vec<ScriptError>, Vec<String>, Signal) {
    let mut errors = Vec::new();
    let mut sections = Vec::new();

    let signal = {
        let mut executor = Executor::new(lines, session, &mut errors, &mut sections);
        match executor.run_range(0, lines.len()) {
            Ok(signal) => signal,
            Err(fatal) => {
                let line = match &fatal {
                    MlabError::UnmatchedBlock(header) => *header,
                    _ => 0,
                };
                errors.push(ScriptError::new(line, &fatal));
                Signal::Normal
            }
        }
    };

    (errors, sections, signal)
}
