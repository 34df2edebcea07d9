//! SMT-LIB 2 query rendering
//!
//! Query layout:
//! ```text
//! (set-option :produce-models true)
//! (declare-fun <name> () Int|Real|String)   ; one per variable, sorted by name
//! (assert <constraint>)                      ; one per constraint
//! (check-sat)
//! (get-model)
//! (exit)
//! ```
//!
//! Sub-terms the string theory cannot express (case conversion, trim,
//! case-insensitive equality, regex matching) and variable-free sub-trees
//! are replaced by their recorded concrete value.

use crate::features::symbolic::domain::{
    BinaryOp, Comparator, Constraint, Expression, Sort, StringPredicate, UnaryOp, Value, Variable,
};
use std::collections::BTreeSet;
use std::fmt::Write;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PrintError {
    #[error("{what} cannot be represented in SMT-LIB")]
    Unrepresentable { what: String },
}

type PrintResult<T> = Result<T, PrintError>;

/// Render a complete query; `bounds` adds domain assertions for narrow integer variables
pub fn render_query(constraints: &[Constraint], bounds: bool) -> PrintResult<String> {
    let mut variables = BTreeSet::new();
    for c in constraints {
        c.left.collect_variables(&mut variables);
        c.right.collect_variables(&mut variables);
    }

    let mut out = String::from("(set-option :produce-models true)\n");
    for v in &variables {
        let _ = writeln!(out, "(declare-fun {} () {})", symbol(&v.name)?, v.sort().smt_name());
    }
    if bounds {
        for v in &variables {
            if let Some(assertion) = bound_assertion(v)? {
                out.push_str(&assertion);
                out.push('\n');
            }
        }
    }
    for c in constraints {
        let _ = writeln!(out, "(assert {})", render_constraint(c)?);
    }
    out.push_str("(check-sat)\n(get-model)\n(exit)\n");
    Ok(out)
}

/// Domain assertion for a variable narrower than 64 bits
pub fn bound_assertion(v: &Variable) -> PrintResult<Option<String>> {
    let Some((min, max)) = v.narrow_int_bounds() else {
        return Ok(None);
    };
    let name = symbol(&v.name)?;
    Ok(Some(format!(
        "(assert (and (<= {} {}) (<= {} {})))",
        int_lit(min),
        name,
        name,
        int_lit(max)
    )))
}

/// Render one constraint as a boolean term
pub fn render_constraint(c: &Constraint) -> PrintResult<String> {
    let sort = c.sort();
    let (l, r) = if sort == Sort::String {
        (string_term(&c.left)?, string_term(&c.right)?)
    } else {
        (numeric_term(&c.left, sort)?, numeric_term(&c.right, sort)?)
    };

    Ok(match (sort, c.comparator) {
        (_, Comparator::Eq) => format!("(= {} {})", l, r),
        (_, Comparator::Ne) => format!("(not (= {} {}))", l, r),
        (Sort::String, Comparator::Lt) => format!("(str.< {} {})", l, r),
        (Sort::String, Comparator::Le) => format!("(str.<= {} {})", l, r),
        (Sort::String, Comparator::Gt) => format!("(str.< {} {})", r, l),
        (Sort::String, Comparator::Ge) => format!("(str.<= {} {})", r, l),
        (_, Comparator::Lt) => format!("(< {} {})", l, r),
        (_, Comparator::Le) => format!("(<= {} {})", l, r),
        (_, Comparator::Gt) => format!("(> {} {})", l, r),
        (_, Comparator::Ge) => format!("(>= {} {})", l, r),
    })
}

// ═══════════════════════════════════════════════════════════════════════════
// Terms
// ═══════════════════════════════════════════════════════════════════════════

fn term(e: &Expression) -> PrintResult<String> {
    if !e.has_variables() {
        return literal(&e.concrete());
    }

    match e {
        Expression::Variable(v) => symbol(&v.name),
        Expression::Unary { op, operand, .. } => match op {
            UnaryOp::Neg => Ok(format!("(- {})", numeric_term(operand, e.sort())?)),
            UnaryOp::Abs => {
                let t = numeric_term(operand, e.sort())?;
                let zero = if e.sort() == Sort::Real { "0.0" } else { "0" };
                Ok(format!("(ite (>= {t} {zero}) {t} (- {t}))"))
            }
            UnaryOp::Length => Ok(format!("(str.len {})", string_term(operand)?)),
            UnaryOp::ToLowerCase | UnaryOp::ToUpperCase | UnaryOp::Trim => {
                literal(&e.concrete())
            }
        },
        Expression::Binary {
            op, left, right, ..
        } => binary_term(*op, e.sort(), left, right, e),
        Expression::Comparison {
            predicate,
            left,
            right,
            ..
        } => {
            let (l, r) = (string_term(left)?, string_term(right)?);
            let p = match predicate {
                StringPredicate::Equals => format!("(= {} {})", l, r),
                StringPredicate::StartsWith => format!("(str.prefixof {} {})", r, l),
                StringPredicate::EndsWith => format!("(str.suffixof {} {})", r, l),
                StringPredicate::Contains => format!("(str.contains {} {})", l, r),
                StringPredicate::EqualsIgnoreCase | StringPredicate::Matches => {
                    return literal(&e.concrete())
                }
            };
            Ok(format!("(ite {} 1 0)", p))
        }
        Expression::Cast {
            target, operand, ..
        } => match target {
            Sort::String => string_term(operand),
            numeric => numeric_term(operand, *numeric),
        },
        constant => literal(&constant.concrete()),
    }
}

fn binary_term(
    op: BinaryOp,
    sort: Sort,
    left: &Expression,
    right: &Expression,
    node: &Expression,
) -> PrintResult<String> {
    if op == BinaryOp::Concat {
        return Ok(format!(
            "(str.++ {} {})",
            string_term(left)?,
            string_term(right)?
        ));
    }

    let (a, b) = (numeric_term(left, sort)?, numeric_term(right, sort)?);
    Ok(match (op, sort) {
        (BinaryOp::Add, _) => format!("(+ {} {})", a, b),
        (BinaryOp::Sub, _) => format!("(- {} {})", a, b),
        (BinaryOp::Mul, _) => format!("(* {} {})", a, b),
        (BinaryOp::Div, Sort::Real) => format!("(/ {} {})", a, b),
        (BinaryOp::Div, _) => truncating_div(&a, &b),
        (BinaryOp::Rem, Sort::Real) => return literal(&node.concrete()),
        (BinaryOp::Rem, _) => format!("(- {} (* {} {}))", a, b, truncating_div(&a, &b)),
        (BinaryOp::Min, _) => format!("(ite (<= {a} {b}) {a} {b})"),
        (BinaryOp::Max, _) => format!("(ite (>= {a} {b}) {a} {b})"),
        (BinaryOp::Concat, _) => unreachable!("handled above"),
    })
}

/// Division rounding toward zero (SMT-LIB `div` is Euclidean)
fn truncating_div(a: &str, b: &str) -> String {
    format!("(ite (>= {a} 0) (div {a} {b}) (- (div (- {a}) {b})))")
}

/// Term of numeric sort `sort`, lifting or converting the operand as needed
fn numeric_term(e: &Expression, sort: Sort) -> PrintResult<String> {
    let t = term(e)?;
    Ok(match (e.sort(), sort) {
        (Sort::Int, Sort::Real) => format!("(to_real {})", t),
        (Sort::Real, Sort::Int) => {
            format!("(ite (>= {t} 0.0) (to_int {t}) (- (to_int (- {t}))))")
        }
        (Sort::String, Sort::Int) => format!("(str.to_int {})", t),
        (Sort::String, Sort::Real) => format!("(to_real (str.to_int {}))", t),
        _ => t,
    })
}

fn string_term(e: &Expression) -> PrintResult<String> {
    match e.sort() {
        Sort::String => term(e),
        Sort::Int => Ok(format!("(str.from_int {})", term(e)?)),
        Sort::Real => literal(&Value::Str(e.concrete().to_text())),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Literals & symbols
// ═══════════════════════════════════════════════════════════════════════════

fn literal(v: &Value) -> PrintResult<String> {
    match v {
        Value::Int(i) => Ok(int_lit(*i)),
        Value::Real(r) => real_lit(*r),
        Value::Str(s) => Ok(string_lit(s)),
    }
}

pub fn int_lit(v: i64) -> String {
    if v < 0 {
        format!("(- {})", v.unsigned_abs())
    } else {
        v.to_string()
    }
}

pub fn real_lit(v: f64) -> PrintResult<String> {
    if !v.is_finite() {
        return Err(PrintError::Unrepresentable {
            what: format!("real value {}", v),
        });
    }
    let mut digits = v.abs().to_string();
    if !digits.contains('.') {
        digits.push_str(".0");
    }
    Ok(if v.is_sign_negative() {
        format!("(- {})", digits)
    } else {
        digits
    })
}

/// SMT-LIB 2.6 string literal
pub fn string_lit(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\"\""),
            '\\' => out.push_str("\\u{5c}"),
            ' '..='~' => out.push(c),
            other => {
                let _ = write!(out, "\\u{{{:x}}}", other as u32);
            }
        }
    }
    out.push('"');
    out
}

const RESERVED: &[&str] = &[
    "_", "!", "as", "let", "exists", "forall", "match", "par", "assert", "check-sat",
    "declare-fun", "define-fun", "exit", "get-model", "set-option", "set-logic", "true", "false",
    "ite", "not", "and", "or", "div", "mod", "abs",
];

/// Simple symbol when possible, `|quoted|` otherwise
pub fn symbol(name: &str) -> PrintResult<String> {
    const EXTRA: &str = "~!@$%^&*_-+=<>.?/";
    let simple = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || EXTRA.contains(c))
        && !RESERVED.contains(&name);

    if simple {
        Ok(name.to_string())
    } else if name.contains(['|', '\\']) {
        Err(PrintError::Unrepresentable {
            what: format!("symbol {:?}", name),
        })
    } else {
        Ok(format!("|{}|", name))
    }
}
