/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      main.rs
 * Purpose:   CLI entry point: interactive window, script execution, and
 *            the JSON run report.
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

use std::env;
use std::process;

use mlab::repl;
use mlab::runner::ScriptRunner;

fn print_usage() {
    println!("MLAB v{} - MATLAB-Compatible Scripting Environment", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage:");
    println!("  mlab                  Run the interactive window");
    println!("  mlab script.m         Execute a script");
    println!("  mlab --json script.m  Execute a script and print a JSON report");
    println!("  mlab --version        Show version information");
    println!("  mlab --help           Show this help");
    println!();
}

fn main() {
    let mut json = false;
    let mut path: Option<String> = None;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "--version" | "-v" => {
                println!("MLAB version {}", env!("CARGO_PKG_VERSION"));
                return;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            _ => path = Some(arg),
        }
    }

    let Some(path) = path else {
        repl::start();
        return;
    };

    let result = ScriptRunner::new(&path).run();

    if json {
        match serde_json::to_string_pretty(&result) {
            Ok(report) => println!("{}", report),
            Err(e) => eprintln!("Failed to serialize run report: {}", e),
        }
    } else {
        print!("{}", result.captured_output);
        for error in &result.errors {
            eprintln!("Line {}: {}", error.line, error.message);
        }
        eprintln!(
            "Script completed in {:.3} s{}",
            result.elapsed_seconds,
            if result.errors.is_empty() {
                String::new()
            } else {
                format!(" with {} error(s)", result.errors.len())
            }
        );
    }

    process::exit(if result.success { 0 } else { 1 });
}
