/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      repl.rs
 * Purpose:   The interactive window: a prompt driving one Session, with
 *            multi-line entry for control-flow blocks.
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

use std::io::{self, BufRead, Write};

use crate::interpreter::statements::{classify, strip_inline_comment, LineKind, Signal};
use crate::interpreter::Session;
use crate::runner::execute_lines;

/// Starts the interactive window on stdin/stdout. Returns when the user
/// quits or stdin reaches end of file.
pub fn start() {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut session = Session::new();

    // Lines buffered while a control-flow block is being entered, plus the
    // current nesting depth; the block runs once its final `end` arrives.
    let mut block: Vec<String> = Vec::new();
    let mut depth: usize = 0;

    print_banner();

    loop {
        print_prompt(depth);

        let mut line = String::new();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => break, // EOF
            Ok(_) => {}
        }
        let line = line.trim_end_matches(['\n', '\r']).to_string();

        if depth > 0 {
            match classify(&line) {
                LineKind::For(_) | LineKind::While(_) | LineKind::If(_) => depth += 1,
                LineKind::End => depth -= 1,
                _ => {}
            }
            block.push(line);

            if depth == 0 {
                let lines = std::mem::take(&mut block);
                let (errors, _sections, signal) = execute_lines(&lines, &mut session);
                print!("{}", session.take_output());
                for e in &errors {
                    println!("\nError (line {}): {}\n", e.line, e.message);
                }
                if signal == Signal::Quit {
                    break;
                }
            }
            continue;
        }

        match classify(&line) {
            LineKind::Empty | LineKind::Comment | LineKind::Section(_) => continue,

            LineKind::For(_) | LineKind::While(_) | LineKind::If(_) => {
                block.push(line);
                depth = 1;
            }

            LineKind::Elseif(_) | LineKind::Else | LineKind::End => {
                println!("\nError: no control block is open here\n");
            }

            LineKind::Break | LineKind::Continue => {
                println!("\nError: only valid inside a loop\n");
            }

            LineKind::Statement => {
                let stmt = strip_inline_comment(&line);
                match session.process_command(stmt) {
                    Ok(Signal::Quit) => break,
                    Ok(_) => print!("{}", session.take_output()),
                    Err(e) => {
                        print!("{}", session.take_output());
                        println!("\nError: {}\n", e);
                    }
                }
            }
        }
    }

    println!("\nGoodbye!\n");
}

fn print_banner() {
    println!();
    println!("  MLAB {} - MATLAB-Compatible Scripting Environment", env!("CARGO_PKG_VERSION"));
    println!("  Type 'help' for commands, 'quit' to exit");
    println!();
}

fn print_prompt(depth: usize) {
    // Continuation prompt while a block is open.
    if depth > 0 {
        print!(".. ");
    } else {
        print!(">> ");
    }
    io::stdout().flush().ok();
}
