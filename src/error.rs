/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      error.rs
 * Purpose:   The typed error surface of the interpreter.
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

use serde::Serialize;
use thiserror::Error;

/// Every way a statement, expression, or script can fail.
///
/// Most variants are *recoverable*: the script runner records them against
/// the offending line and keeps going. The exceptions are listed in
/// [`MlabError::is_fatal`], a block with no matching `end` cannot be safely
/// skipped, and a script that cannot be loaded cannot be run at all.
#[derive(Debug, Error)]
pub enum MlabError {
    #[error("Undefined variable: {0}")]
    UndefinedVariable(String),

    #[error("Invalid variable name: {0}")]
    InvalidIdentifier(String),

    #[error("Unknown function: {0}()")]
    UnknownFunction(String),

    #[error("{func}() only supports scalar arguments")]
    UnsupportedArgumentKind { func: &'static str },

    #[error("{func}() expects {expected} argument(s), got {got}")]
    WrongArity {
        func: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Inconsistent row lengths in matrix literal")]
    RaggedMatrix,

    #[error("Matrix dimensions must agree")]
    DimensionMismatch,

    #[error("Cannot evaluate expression: {0}")]
    CannotEvaluate(String),

    #[error("Missing 'end' for control block starting at line {0}")]
    UnmatchedBlock(usize),

    #[error("Invalid loop header: {0}")]
    InvalidLoopHeader(String),

    #[error("for loop step must be nonzero")]
    InvalidStep,

    #[error("while loop stopped after {0} iterations")]
    LoopLimitExceeded(usize),

    #[error("'{0}' is only valid inside a loop")]
    ControlOutsideLoop(&'static str),

    #[error("Unexpected '{0}' with no open block")]
    UnexpectedKeyword(&'static str),

    #[error("Failed to open script {path}: {source}")]
    ScriptLoad {
        path: String,
        source: std::io::Error,
    },
}

impl MlabError {
    /// Fatal errors abort the remainder of a batch run; everything else is
    /// recorded per line and execution continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MlabError::UnmatchedBlock(_) | MlabError::ScriptLoad { .. }
        )
    }
}

/// One recorded per-line failure, as it appears in a
/// [`ScriptResult`](crate::runner::ScriptResult).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptError {
    /// 1-based source line the failure is tied to.
    pub line: usize,
    pub message: String,
}

impl ScriptError {
    pub fn new(line: usize, error: &MlabError) -> Self {
        Self {
            line,
            message: error.to_string(),
        }
    }
}
