/*
 * ==========================================================================
 * MLAB - A MATLAB-Compatible Scripting Environment
 * ==========================================================================
 *
 * File:      value.rs
 * Purpose:   The runtime value representation: every expression in an MLAB
 *            script evaluates to a scalar, a vector, or a matrix of doubles.
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

use crate::error::MlabError;

/// MLAB runtime value.
///
/// This is the core type that flows through the interpreter. Values have
/// value semantics: reading a variable clones its binding, and assignment
/// replaces the binding rather than mutating it in place.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A single double.
    Scalar(f64),
    /// A 1-D row vector.
    Sequence(Vec<f64>),
    /// A 2-D matrix, row-major. Invariant: rectangular (all rows equal
    /// length) or empty, enforced by [`Value::grid_from_rows`].
    Grid(Vec<Vec<f64>>),
}

impl Value {
    /// Builds a `Grid` from parsed rows, collapsing a 1×1 result to a
    /// `Scalar`. Fails with `RaggedMatrix` when row lengths differ.
    pub fn grid_from_rows(rows: Vec<Vec<f64>>) -> Result<Value, MlabError> {
        if let Some(first) = rows.first() {
            let cols = first.len();
            if rows.iter().any(|r| r.len() != cols) {
                return Err(MlabError::RaggedMatrix);
            }
            if rows.len() == 1 && cols == 1 {
                return Ok(Value::Scalar(rows[0][0]));
            }
        }
        Ok(Value::Grid(rows))
    }

    /// Builds a `Sequence`, collapsing a single element to a `Scalar`.
    pub fn sequence_from(elements: Vec<f64>) -> Value {
        if elements.len() == 1 {
            Value::Scalar(elements[0])
        } else {
            Value::Sequence(elements)
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Value::Scalar(_))
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Value::Scalar(n) => Some(*n),
            _ => None,
        }
    }

    /// Row count of the value's MATLAB shape (a scalar is 1×1, a vector 1×n).
    pub fn rows(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Sequence(_) => 1,
            Value::Grid(rows) => rows.len(),
        }
    }

    /// Column count of the value's MATLAB shape.
    pub fn cols(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Sequence(v) => v.len(),
            Value::Grid(rows) => rows.first().map_or(0, Vec::len),
        }
    }

    /// Total element count.
    pub fn numel(&self) -> usize {
        match self {
            Value::Scalar(_) => 1,
            Value::Sequence(v) => v.len(),
            Value::Grid(rows) => rows.iter().map(Vec::len).sum(),
        }
    }

    /// All elements in row-major order. Used by the reducing builtins,
    /// which operate over every element regardless of shape.
    pub fn elements(&self) -> Vec<f64> {
        match self {
            Value::Scalar(n) => vec![*n],
            Value::Sequence(v) => v.clone(),
            Value::Grid(rows) => rows.iter().flatten().copied().collect(),
        }
    }

    /// `"1x1"`, `"1x8"`, `"3x3"`, the `whos` size column.
    pub fn size_string(&self) -> String {
        format!("{}x{}", self.rows(), self.cols())
    }

    /// Everything in MLAB is a double.
    pub fn type_string(&self) -> &'static str {
        "double"
    }

    /// Estimated storage in bytes: element count × 8. Diagnostic only.
    pub fn memory_size(&self) -> usize {
        self.numel() * std::mem::size_of::<f64>()
    }

    /// Condition truthiness: a nonzero scalar. Sequences and grids are
    /// never truthy as conditions.
    pub fn is_truthy(&self) -> bool {
        matches!(self, Value::Scalar(n) if *n != 0.0)
    }

    /// Applies `f` to every element, preserving shape.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Value {
        match self {
            Value::Scalar(n) => Value::Scalar(f(*n)),
            Value::Sequence(v) => Value::Sequence(v.iter().map(|x| f(*x)).collect()),
            Value::Grid(rows) => Value::Grid(
                rows.iter()
                    .map(|r| r.iter().map(|x| f(*x)).collect())
                    .collect(),
            ),
        }
    }

    /// Element-wise combination of two values with scalar broadcast.
    ///
    /// Scalars combine with anything; two sequences or two grids must have
    /// the same shape. Mixing a sequence with a grid fails.
    pub fn zip_map(
        &self,
        other: &Value,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, MlabError> {
        match (self, other) {
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(f(*a, *b))),
            (Value::Scalar(a), rhs) => Ok(rhs.map(|x| f(*a, x))),
            (lhs, Value::Scalar(b)) => Ok(lhs.map(|x| f(x, *b))),
            (Value::Sequence(a), Value::Sequence(b)) => {
                if a.len() != b.len() {
                    return Err(MlabError::DimensionMismatch);
                }
                Ok(Value::Sequence(
                    a.iter().zip(b.iter()).map(|(x, y)| f(*x, *y)).collect(),
                ))
            }
            (Value::Grid(a), Value::Grid(b)) => {
                if a.len() != b.len()
                    || a.iter().zip(b.iter()).any(|(ra, rb)| ra.len() != rb.len())
                {
                    return Err(MlabError::DimensionMismatch);
                }
                Ok(Value::Grid(
                    a.iter()
                        .zip(b.iter())
                        .map(|(ra, rb)| {
                            ra.iter().zip(rb.iter()).map(|(x, y)| f(*x, *y)).collect()
                        })
                        .collect(),
                ))
            }
            _ => Err(MlabError::DimensionMismatch),
        }
    }

    /// Serializes back to literal syntax: `5`, `[1 2 3]`, `[1 2; 3 4]`.
    ///
    /// Numbers use the shortest round-trip form, so parsing the result
    /// reproduces the value exactly.
    pub fn to_literal(&self) -> String {
        match self {
            Value::Scalar(n) => format!("{}", n),
            Value::Sequence(v) => {
                let parts: Vec<String> = v.iter().map(|x| format!("{}", x)).collect();
                format!("[{}]", parts.join(" "))
            }
            Value::Grid(rows) => {
                let row_strs: Vec<String> = rows
                    .iter()
                    .map(|r| {
                        r.iter()
                            .map(|x| format!("{}", x))
                            .collect::<Vec<_>>()
                            .join(" ")
                    })
                    .collect();
                format!("[{}]", row_strs.join("; "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn shapes_and_sizes() {
        let s = Value::Scalar(5.0);
        assert_eq!(s.size_string(), "1x1");
        assert_eq!(s.memory_size(), 8);

        let v = Value::Sequence(vec![0.0, 0.0, 1.0, 1.0, 2.0, 3.0, 5.0, 8.0]);
        assert_eq!(v.size_string(), "1x8");
        assert_eq!(v.memory_size(), 64);

        let m = Value::Grid(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        assert_eq!(m.size_string(), "2x3");
        assert_eq!(m.numel(), 6);
        assert_eq!(m.type_string(), "double");
    }

    #[test]
    fn grid_construction_checks_rectangularity() {
        let err = Value::grid_from_rows(vec![vec![1.0, 2.0], vec![3.0]]);
        assert!(matches!(err, Err(MlabError::RaggedMatrix)));

        let one = Value::grid_from_rows(vec![vec![7.0]]).unwrap();
        assert_eq!(one, Value::Scalar(7.0));
    }

    #[test]
    fn truthiness_is_nonzero_scalar_only() {
        assert!(Value::Scalar(1.0).is_truthy());
        assert!(Value::Scalar(-0.5).is_truthy());
        assert!(!Value::Scalar(0.0).is_truthy());
        assert!(!Value::Sequence(vec![1.0]).is_truthy());
        assert!(!Value::Grid(vec![vec![1.0]]).is_truthy());
    }

    #[test]
    fn zip_map_broadcasts_scalars() {
        let v = Value::Sequence(vec![1.0, 2.0, 3.0]);
        let doubled = Value::Scalar(2.0).zip_map(&v, |a, b| a * b).unwrap();
        assert_eq!(doubled, Value::Sequence(vec![2.0, 4.0, 6.0]));

        let mismatch = v.zip_map(&Value::Sequence(vec![1.0]), |a, b| a + b);
        assert!(matches!(mismatch, Err(MlabError::DimensionMismatch)));
    }

    #[test]
    fn literal_serialization() {
        let m = Value::Grid(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        assert_eq!(m.to_literal(), "[1 2; 3 4]");
        assert_eq!(Value::Sequence(vec![1.5, -2.0]).to_literal(), "[1.5 -2]");
        assert_eq!(Value::Scalar(3.0).to_literal(), "3");
    }
}
