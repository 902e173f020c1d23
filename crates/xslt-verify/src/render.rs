//! # Human-readable proof rendering
//!
//! Turns the data produced by C4–C6 into the text a person reads: the
//! preimage table printed by `xslt-verify inspect`, a minimal counterexample
//! document for a rejected production, and the boxed summary the CLI prints
//! after a full `validate` run. Nothing here is consumed by another stage —
//! it exists purely for the terminal and the `validate` response body.

use crate::grammar::{Production, TreeGrammar};
use crate::preimage::PreimageReport;
use crate::validator::ValidationResult;

/// One line per MTT rule: its input pattern, whether it was accepted, and
/// why.
pub fn render_preimage(report: &PreimageReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Preimage analysis: {}/{} rules accepted ({:.1}% coverage)\n",
        report.accepted_count,
        report.entries.len(),
        report.coverage_percent
    ));
    for entry in &report.entries {
        let mark = if entry.accepted { "✓" } else { "✗" };
        out.push_str(&format!(
            "  {mark} {:<28} {}\n",
            entry.pattern.to_string(),
            entry.reason
        ));
    }
    out
}

/// A boxed summary of a [`ValidationResult`], in the teacher's
/// box-drawing console style.
pub fn render_validation(result: &ValidationResult) -> String {
    let mut out = String::new();
    out.push_str("┌─────────────────────────────────────────────────────────────\n");
    out.push_str(&format!(
        "│ Type preservation: {}\n",
        if result.is_valid() { "VALID" } else { "INVALID" }
    ));
    out.push_str(&format!(
        "│ proof steps: {}   warnings: {}   errors: {}\n",
        result.proof_steps.len(),
        result.warnings.len(),
        result.errors.len()
    ));
    out.push_str("├─────────────────────────────────────────────────────────────\n");
    for mapping in &result.coverage_matrix.mappings {
        let target = mapping.target.as_deref().unwrap_or("UNMAPPED");
        out.push_str(&format!(
            "│ {:<20} -> {:<20} [{}]\n",
            mapping.source, target, mapping.status
        ));
    }
    if !result.errors.is_empty() {
        out.push_str("├─────────────────────────────────────────────────────────────\n");
        for error in &result.errors {
            out.push_str(&format!("│ ERROR: {error}\n"));
        }
    }
    if !result.warnings.is_empty() {
        out.push_str("├─────────────────────────────────────────────────────────────\n");
        for warning in &result.warnings {
            out.push_str(&format!("│ WARNING: {warning}\n"));
        }
    }
    out.push_str("└─────────────────────────────────────────────────────────────");
    out
}

/// Builds a minimal, well-formed XML fragment that a production would
/// accept, for display alongside a validity counterexample: every leaf
/// child gets a representative value for its atomic type, every non-leaf
/// child recurses into the grammar's production for its own name (falling
/// back to an empty element if the grammar has no production for it, which
/// happens for references the parser could not resolve).
pub fn counterexample_xml(prod: &Production, grammar: &TreeGrammar) -> String {
    render_element(&prod.lhs, &prod.rhs, grammar)
}

fn render_element(name: &str, rhs: &[String], grammar: &TreeGrammar) -> String {
    if rhs.len() == 1 {
        if let Some(value) = example_value(&rhs[0]) {
            return format!("<{name}>{value}</{name}>");
        }
    }

    let inner: String = rhs
        .iter()
        .map(|child| match grammar.production(child) {
            Some(child_prod) => render_element(&child_prod.lhs, &child_prod.rhs, grammar),
            None => format!("<{child}>example_value</{child}>"),
        })
        .collect();

    format!("<{name}>{inner}</{name}>")
}

fn example_value(atomic_type: &str) -> Option<&'static str> {
    match atomic_type {
        "string" | "normalizedString" | "token" => Some("example_value"),
        "integer" | "int" | "long" => Some("42"),
        "decimal" | "float" | "double" => Some("3.14"),
        "boolean" => Some("true"),
        "date" => Some("2024-01-01"),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================
