//! # Type-preservation validator (C5)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                    THREE VALIDATION PASSES                                  │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                                                                             │
//! │   Pass 1: STRUCTURE                                                         │
//! │   ┌─────────────────────────────────────────┐                               │
//! │   │ • Does every source production have an  │                               │
//! │   │   MTT rule that could plausibly touch it?│                              │
//! │   └─────────────────────────────────────────┘                               │
//! │                      │                                                      │
//! │                      ▼                                                      │
//! │   Pass 2: TYPE CONSTRAINTS                                                 │
//! │   ┌─────────────────────────────────────────┐                               │
//! │   │ • Is the mapped target type compatible  │                               │
//! │   │   with the source type (identity,        │                              │
//! │   │   numeric widening, string subtyping)?   │                              │
//! │   └─────────────────────────────────────────┘                               │
//! │                      │                                                      │
//! │                      ▼                                                      │
//! │   Pass 3: CARDINALITY                                                      │
//! │   ┌─────────────────────────────────────────┐                               │
//! │   │ • Can the source's occurrence bounds     │                               │
//! │   │   violate the target's?                  │                              │
//! │   └─────────────────────────────────────────┘                               │
//! │                                                                             │
//! │   Every pass runs to completion; an error in one does not skip the next —  │
//! │   all three append to one proof trace, read as a whole by C6 and by the   │
//! │   CLI's `inspect` output.                                                   │
//! │                                                                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::grammar::{Production, TreeGrammar};
use crate::mtt::{Mtt, MttRule};
use crate::preimage::extract_root_element;

const NUMERIC_TYPES: &[&str] = &["integer", "int", "long", "decimal", "float", "double"];
const STRING_LIKE_TYPES: &[&str] = &["string", "normalizedString", "token"];

/// One row of the coverage matrix: a source element mapped (or not) to a
/// target element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageMapping {
    pub source: String,
    pub target: Option<String>,
    pub status: &'static str,
}

/// A snapshot of which source elements the MTT maps to which target
/// elements, independent of whether that mapping is type- or cardinality-
/// compatible.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoverageMatrix {
    pub source_elements: Vec<String>,
    pub target_elements: Vec<String>,
    pub mtt_rule_count: usize,
    pub mappings: Vec<CoverageMapping>,
}

/// The full proof trace produced by validating one (source grammar, target
/// grammar, MTT) triple.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub proof_steps: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
    pub coverage_matrix: CoverageMatrix,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs all three validation passes over `source`/`target`/`mtt` and
/// returns the combined proof trace.
pub fn validate(source: &TreeGrammar, target: &TreeGrammar, mtt: &Mtt) -> ValidationResult {
    let mut result = ValidationResult::default();
    validate_structure(source, mtt, &mut result);
    validate_type_constraints(source, target, mtt, &mut result);
    validate_cardinality(source, target, mtt, &mut result);
    result.coverage_matrix = build_coverage_matrix(source, target, mtt);
    result
}

// ============================================================================
// PASS 1: STRUCTURE
// ============================================================================

fn validate_structure(source: &TreeGrammar, mtt: &Mtt, result: &mut ValidationResult) {
    result
        .proof_steps
        .push(format!("Checking for a transformation rule on root element '{}'", source.root));
    if mtt.rules.iter().any(|rule| rule.lhs_pattern.contains(source.root.as_str())) {
        result
            .proof_steps
            .push(format!("'{}' has a transformation rule", source.root));
    } else {
        result.errors.push(format!(
            "No transformation rule for root element '{}'",
            source.root
        ));
    }

    for prod in &source.productions {
        result
            .proof_steps
            .push(format!("Checking structural coverage of '{}'", prod.lhs));
        if is_production_covered(prod, &mtt.rules) {
            result
                .proof_steps
                .push(format!("'{}' is reachable from an MTT rule", prod.lhs));
        } else {
            result.warnings.push(format!(
                "Element '{}' has no corresponding MTT rule",
                prod.lhs
            ));
        }
    }
}

/// A production is "covered" if some rule's match pattern names it, or its
/// compiled output could build it — the latter checked by substring-
/// matching the element name against the output term's debug text, which
/// can both over- and under-match on coincidental name collisions. Kept
/// deliberately loose (see the Open Question decisions in the design
/// ledger): a tighter structural match is future work, not attempted here.
fn is_production_covered(prod: &Production, rules: &[MttRule]) -> bool {
    rules.iter().any(|rule| {
        rule.lhs_pattern.contains(prod.lhs.as_str())
            || format!("{:?}", rule.rhs_output).contains(prod.lhs.as_str())
    })
}

// ============================================================================
// PASS 2: TYPE CONSTRAINTS
// ============================================================================

fn validate_type_constraints(
    source: &TreeGrammar,
    target: &TreeGrammar,
    mtt: &Mtt,
    result: &mut ValidationResult,
) {
    for (name, src_tc) in &source.type_constraints {
        let Some(target_name) = find_target_element(name, target, mtt) else {
            continue;
        };
        let Some(tgt_tc) = target.type_constraints.get(&target_name) else {
            continue;
        };

        result.proof_steps.push(format!(
            "Checking type compatibility of '{name}' ({}) -> '{target_name}' ({})",
            src_tc.base_type, tgt_tc.base_type
        ));

        if are_types_compatible(&src_tc.base_type, &tgt_tc.base_type) {
            result.proof_steps.push(format!(
                "'{}' is type-compatible with '{}'",
                src_tc.base_type, tgt_tc.base_type
            ));
        } else {
            result.errors.push(format!(
                "Type mismatch: source '{name}' is {} but target '{target_name}' is {}",
                src_tc.base_type, tgt_tc.base_type
            ));
        }

        for warning in check_restrictions(name, src_tc) {
            result.warnings.push(warning);
        }
    }
}

/// Finds the target element a source element maps to: first, any MTT rule
/// whose match pattern names the source element, via the first element its
/// output would build; failing that, a same-named element in the target
/// grammar.
fn find_target_element(source_name: &str, target: &TreeGrammar, mtt: &Mtt) -> Option<String> {
    for rule in &mtt.rules {
        if rule.lhs_pattern.contains(source_name) {
            if let Some(target_name) = extract_root_element(&rule.rhs_output) {
                return Some(target_name);
            }
        }
    }
    if target.knows_element(source_name) {
        return Some(source_name.to_string());
    }
    None
}

fn are_types_compatible(src: &str, tgt: &str) -> bool {
    if src == tgt {
        return true;
    }
    if NUMERIC_TYPES.contains(&src) && NUMERIC_TYPES.contains(&tgt) {
        return true;
    }
    if src == "string" && STRING_LIKE_TYPES.contains(&tgt) {
        return true;
    }
    false
}

/// Facets this verifier cannot itself check against the target (the
/// target's own restrictions aren't consulted here) are surfaced as
/// warnings rather than silently dropped.
fn check_restrictions(name: &str, tc: &crate::grammar::TypeConstraint) -> Vec<String> {
    let mut warnings = Vec::new();
    for facet in ["minInclusive", "maxInclusive", "pattern"] {
        if let Some(value) = tc.restrictions.get(facet) {
            warnings.push(format!(
                "Source restricts '{name}' by {facet}={value}; target may not enforce this"
            ));
        }
    }
    warnings
}

// ============================================================================
// PASS 3: CARDINALITY
// ============================================================================

fn validate_cardinality(source: &TreeGrammar, target: &TreeGrammar, mtt: &Mtt, result: &mut ValidationResult) {
    for prod in &source.productions {
        let Some(target_name) = find_target_element(&prod.lhs, target, mtt) else {
            continue;
        };
        let Some(target_prod) = target.production(&target_name) else {
            continue;
        };

        result.proof_steps.push(format!(
            "Checking cardinality of '{}' {:?} -> '{target_name}' {:?}",
            prod.lhs, prod.cardinality, target_prod.cardinality
        ));

        if is_cardinality_compatible(prod.cardinality, target_prod.cardinality) {
            result
                .proof_steps
                .push(format!("cardinality of '{}' is preserved", prod.lhs));
        } else {
            // Not an error: the transformation may aggregate (e.g. a
            // for-each collapsing many source occurrences into one target
            // occurrence), so this is advisory rather than disqualifying.
            result.warnings.push(format!(
                "Cardinality may be incompatible: source '{}' {:?} cannot be embedded in target '{target_name}' {:?}",
                prod.lhs, prod.cardinality, target_prod.cardinality
            ));
        }
    }
}

/// Incompatible iff the source permits zero occurrences where the target
/// requires at least one, or the source permits more than one occurrence
/// where the target permits exactly one.
fn is_cardinality_compatible(src: (i64, i64), tgt: (i64, i64)) -> bool {
    let (src_min, src_max) = src;
    let (tgt_min, tgt_max) = tgt;

    if src_min == 0 && tgt_min > 0 {
        return false;
    }
    if (src_max == -1 || src_max > 1) && tgt_max == 1 {
        return false;
    }
    true
}

// ============================================================================
// COVERAGE MATRIX
// ============================================================================

fn build_coverage_matrix(source: &TreeGrammar, target: &TreeGrammar, mtt: &Mtt) -> CoverageMatrix {
    let mut source_elements: Vec<String> = Vec::new();
    let mut seen = IndexMap::new();
    for prod in &source.productions {
        if seen.insert(prod.lhs.clone(), ()).is_none() {
            source_elements.push(prod.lhs.clone());
        }
    }
    if !source.root.is_empty() && !seen.contains_key(&source.root) {
        source_elements.insert(0, source.root.clone());
    }

    let target_elements: Vec<String> = target
        .productions
        .iter()
        .map(|p| p.lhs.clone())
        .chain(std::iter::once(target.root.clone()).filter(|r| !r.is_empty()))
        .collect();

    let mappings = source_elements
        .iter()
        .map(|name| match find_target_element(name, target, mtt) {
            Some(target_name) => CoverageMapping {
                source: name.clone(),
                target: Some(target_name),
                status: "covered",
            },
            None => CoverageMapping {
                source: name.clone(),
                target: None,
                status: "unmapped",
            },
        })
        .collect();

    CoverageMatrix {
        source_elements,
        target_elements,
        mtt_rule_count: mtt.rules.len(),
        mappings,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::parse_xsd;
    use crate::mtt::compile_to_mtt;

    const SOURCE_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Person">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Name" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    const TARGET_XSD: &str = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Individual">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Name" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    const XSLT: &str = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Person">
    <Individual>
      <xsl:value-of select="Name"/>
    </Individual>
  </xsl:template>
</xsl:stylesheet>"#;

    #[test]
    fn compatible_schemas_validate_without_errors() {
        let source = parse_xsd(SOURCE_XSD).unwrap();
        let target = parse_xsd(TARGET_XSD).unwrap();
        let mtt = compile_to_mtt(XSLT).unwrap();
        let result = validate(&source, &target, &mtt);
        assert!(result.is_valid(), "errors: {:?}", result.errors);
        assert!(!result.proof_steps.is_empty());
    }

    #[test]
    fn numeric_widening_is_compatible() {
        assert!(are_types_compatible("integer", "decimal"));
        assert!(are_types_compatible("int", "long"));
        assert!(!are_types_compatible("string", "integer"));
    }

    #[test]
    fn string_like_types_are_compatible() {
        assert!(are_types_compatible("string", "token"));
        assert!(are_types_compatible("string", "normalizedString"));
    }

    #[test]
    fn cardinality_zero_to_required_is_incompatible() {
        assert!(!is_cardinality_compatible((0, 1), (1, 1)));
    }

    #[test]
    fn cardinality_unbounded_into_single_is_incompatible() {
        assert!(!is_cardinality_compatible((1, -1), (1, 1)));
    }

    #[test]
    fn cardinality_matching_bounds_is_compatible() {
        assert!(is_cardinality_compatible((0, 1), (0, 1)));
        assert!(is_cardinality_compatible((1, 1), (0, -1)));
    }

    #[test]
    fn unmapped_source_element_produces_structural_error() {
        let source = parse_xsd(SOURCE_XSD).unwrap();
        let target = parse_xsd(TARGET_XSD).unwrap();
        let empty_mtt = Mtt::default();
        let result = validate(&source, &target, &empty_mtt);
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.contains("Person")));
    }

    #[test]
    fn coverage_matrix_lists_mtt_rule_count() {
        let source = parse_xsd(SOURCE_XSD).unwrap();
        let target = parse_xsd(TARGET_XSD).unwrap();
        let mtt = compile_to_mtt(XSLT).unwrap();
        let result = validate(&source, &target, &mtt);
        assert_eq!(result.coverage_matrix.mtt_rule_count, 1);
    }
}
