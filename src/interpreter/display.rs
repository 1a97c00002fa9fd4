/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      display.rs
 * Purpose:   Human-readable rendering of values and workspace listings.
 *            Owns the number formatting policy (four significant digits,
 *            integers bare) and the `who`/`whos`/`help` text.
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

use crate::interpreter::environment::Workspace;
use crate::value::Value;

/// Formats one number for display: integers bare, everything else with
/// four significant digits, very large/small magnitudes in scientific
/// notation.
pub fn format_number(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    if x.fract() == 0.0 && x.abs() < 1e10 {
        return format!("{}", x as i64);
    }

    let exp = x.abs().log10().floor() as i32;
    if !(-5..10).contains(&exp) {
        return format!("{:.4e}", x);
    }

    let decimals = (3 - exp).max(0) as usize;
    let s = format!("{:.*}", decimals, x);
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}

/// Renders a value as its indented display block, one line per row,
/// elements right-aligned in 10-character columns.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Scalar(n) => format!("    {}\n", format_number(*n)),
        Value::Sequence(v) => format_row(v),
        Value::Grid(rows) => rows.iter().map(|r| format_row(r)).collect(),
    }
}

fn format_row(row: &[f64]) -> String {
    if row.is_empty() {
        return "    []\n".to_string();
    }
    let cells: Vec<String> = row
        .iter()
        .map(|x| format!("{:>10}", format_number(*x)))
        .collect();
    format!("    {}\n", cells.join("  "))
}

/// The `name =` block shown for unsuppressed assignments and `ans`.
pub fn format_binding(name: &str, value: &Value) -> String {
    format!("\n{} =\n\n{}\n", name, format_value(value))
}

/// The `who` listing: bound names only.
pub fn format_who(ws: &Workspace) -> String {
    let names = ws.list_names();
    if names.is_empty() {
        return "\n  (no variables in workspace)\n\n".to_string();
    }
    format!("\n  Your variables are:\n\n  {}\n\n", names.join("  "))
}

/// The `whos` listing: name, size, bytes, class per binding.
pub fn format_whos(ws: &Workspace) -> String {
    let names = ws.list_names();
    if names.is_empty() {
        return "\n  (no variables in workspace)\n\n".to_string();
    }

    let mut out = String::new();
    out.push_str("\n  Name          Size              Bytes  Class\n");
    out.push_str("  ────────────  ────────────────  ──────  ──────\n");
    for name in names {
        if let Ok(value) = ws.get(&name) {
            out.push_str(&format!(
                "  {:<12}  {:<16}  {:>6}  {}\n",
                name,
                value.size_string(),
                value.memory_size(),
                value.type_string(),
            ));
        }
    }
    out.push('\n');
    out
}

/// The `help` text for the interactive window and scripts alike.
pub fn help_text() -> &'static str {
    "\n  MLAB Commands\n\
     \x20 ══════════════════════════════════════════════\n\n\
     \x20 Variables:\n\
     \x20   x = 5                 Assign scalar\n\
     \x20   v = [1 2 3 4]         Create vector\n\
     \x20   M = [1 2; 3 4]        Create matrix\n\
     \x20   x = 5;                Suppress output (semicolon)\n\n\
     \x20 Functions:\n\
     \x20   disp(x)               Display variable\n\
     \x20   size(x)               Get dimensions\n\
     \x20   length(x)             Get length\n\
     \x20   sum(x), mean(x)       Sum, average\n\
     \x20   min(x), max(x)        Minimum, maximum\n\
     \x20   sqrt(x), abs(x)       Square root, absolute value\n\
     \x20   sin(x), cos(x), tan(x)  Trigonometric\n\
     \x20   exp(x), log(x), log10(x)  Exponential, logarithms\n\n\
     \x20 Control flow:\n\
     \x20   for i = 1:10 ... end  Range loop\n\
     \x20   while cond ... end    Conditional loop\n\
     \x20   if / elseif / else    Branching\n\n\
     \x20 Workspace:\n\
     \x20   who                   List variables\n\
     \x20   whos                  Detailed variable info\n\
     \x20   clear                 Clear all variables\n\
     \x20   clear x               Clear variable x\n\n\
     \x20 Display:\n\
     \x20   clc                   Clear screen\n\
     \x20   help                  Show this help\n\n\
     \x20 Control:\n\
     \x20   quit, exit            Exit\n\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numbers_use_four_significant_digits() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(3.14159), "3.142");
        assert_eq!(format_number(12.5), "12.5");
        assert_eq!(format_number(0.001234), "0.001234");
        assert_eq!(format_number(1234.567), "1235");
        assert_eq!(format_number(1230.4), "1230");
        assert_eq!(format_number(-2.71828), "-2.718");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Inf");
    }

    #[test]
    fn sequences_align_in_ten_char_columns() {
        let v = Value::Sequence(vec![1.0, 22.0, 333.0]);
        assert_eq!(
            format_value(&v),
            "             1          22         333\n"
        );
    }

    #[test]
    fn grids_render_one_line_per_row() {
        let m = Value::Grid(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let block = format_value(&m);
        assert_eq!(block.lines().count(), 2);
    }

    #[test]
    fn binding_block_names_the_variable() {
        let block = format_binding("x", &Value::Scalar(5.0));
        assert_eq!(block, "\nx =\n\n    5\n\n");
    }

    #[test]
    fn whos_lists_size_and_bytes() {
        let mut ws = Workspace::new();
        ws.set("M", Value::Grid(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]));
        let listing = format_whos(&ws);
        assert!(listing.contains("M"));
        assert!(listing.contains("2x3"));
        assert!(listing.contains("48"));
        assert!(listing.contains("double"));
    }
}
