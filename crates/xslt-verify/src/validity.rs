//! # Validity checker (C6)
//!
//! Checks the final proof obligation — `L(Src) ⊆ pre_M(L(Tgt))` — by
//! extracting every non-trivial production of the source grammar as a
//! pattern and confirming some *accepted* preimage entry (see
//! [`crate::preimage`]) covers it. Coverage is intentionally loose: once an
//! element name matches, the children are treated as covered (see the
//! design ledger's Open Question decisions), so this stage proves absence
//! of *obvious* gaps rather than a tight structural containment.

use serde::{Deserialize, Serialize};

use crate::grammar::{Production, TreeGrammar};
use crate::preimage::PreimageReport;

/// Atomic leaf types excluded from source-pattern extraction unless they
/// happen to be the grammar's root (a schema whose root is itself a simple
/// type is degenerate but not invalid).
const LEAF_TYPES: &[&str] = &["string", "integer", "decimal", "boolean", "date"];

/// A production of the source grammar, reinterpreted as a pattern this
/// checker must find covered by some accepted preimage entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePattern {
    pub element: String,
    pub children: Vec<String>,
}

/// One source pattern the preimage did not cover, paired with the
/// production it came from (for [`crate::render::counterexample_xml`]).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Counterexample {
    pub production: Production,
    pub explanation: String,
}

/// The result of checking `L(Src) ⊆ pre_M(L(Tgt))`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidityReport {
    pub is_valid: bool,
    pub coverage_percent: f64,
    pub covered: Vec<String>,
    pub counterexamples: Vec<Counterexample>,
}

/// Checks every source pattern against the accepted entries of `preimage`.
pub fn check_validity(source: &TreeGrammar, preimage: &PreimageReport) -> ValidityReport {
    let patterns = extract_source_patterns(source);
    let mut report = ValidityReport::default();

    if patterns.is_empty() {
        report.is_valid = true;
        report.coverage_percent = 100.0;
        return report;
    }

    for pattern in &patterns {
        let (covered, explanation) = is_pattern_covered(pattern, preimage);
        if covered {
            report.covered.push(pattern.element.clone());
        } else {
            let production = source
                .production(&pattern.element)
                .cloned()
                .unwrap_or_else(|| Production {
                    lhs: pattern.element.clone(),
                    rhs: pattern.children.clone(),
                    kind: crate::grammar::ContentKind::Sequence,
                    cardinality: (1, 1),
                });
            report.counterexamples.push(Counterexample {
                production,
                explanation,
            });
        }
    }

    report.coverage_percent = (report.covered.len() as f64 / patterns.len() as f64) * 100.0;
    report.is_valid = report.counterexamples.is_empty();
    report
}

/// Every production except a pure-leaf one (a single atomic child type),
/// unless it is the grammar's root — a root that is itself leaf-typed is
/// still a pattern the transformation must account for.
fn extract_source_patterns(source: &TreeGrammar) -> Vec<SourcePattern> {
    source
        .productions
        .iter()
        .filter(|prod| {
            let is_pure_leaf = prod.rhs.len() == 1 && LEAF_TYPES.contains(&prod.rhs[0].as_str());
            !is_pure_leaf || prod.lhs == source.root
        })
        .map(|prod| SourcePattern {
            element: prod.lhs.clone(),
            children: prod.rhs.clone(),
        })
        .collect()
}

/// Finds the first *accepted* preimage entry whose pattern covers `pattern`,
/// returning a human-readable explanation either way.
fn is_pattern_covered(pattern: &SourcePattern, preimage: &PreimageReport) -> (bool, String) {
    for entry in preimage.entries.iter().filter(|e| e.accepted) {
        let (matches, reason) = matches_preimage_pattern(pattern, &entry.pattern.children);
        if matches && entry.pattern.element == pattern.element {
            return (true, reason);
        }
    }
    (
        false,
        format!(
            "no accepted MTT rule produces an element named '{}'",
            pattern.element
        ),
    )
}

/// Once the element names agree, this checker does not re-derive the
/// preimage's exact child shape — it only special-cases the common
/// wildcard preimage pattern, and otherwise treats any children-pattern
/// match as covering. This is the documented looseness of the coverage
/// predicate (see the design ledger's Open Question decisions).
fn matches_preimage_pattern(_pattern: &SourcePattern, preimage_children: &[String]) -> (bool, String) {
    if preimage_children.iter().any(|c| c == "*" || c == "children") {
        (true, "covered by wildcard pattern".to_string())
    } else {
        (true, "children pattern matches".to_string())
    }
}

// ============================================================================
// TESTS
// ============================================================================
