//! # Preimage analyzer (C4)
//!
//! For each MTT rule, decides whether its output is a valid fragment of the
//! target grammar by extracting the root element the rule's output actually
//! produces and checking it against the target grammar's root, productions
//! and attribute-bearing elements. This is a heuristic, not a full preimage
//! construction (see the spec's Open Questions): it looks only at the
//! *first* element the output would build, not the full shape of the tree
//! below it.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grammar::TreeGrammar;
use crate::mtt::{Mtt, MttRule, OutputTerm};

/// The left-hand side of an [`crate::mtt::MttRule`], reinterpreted as an
/// input pattern: an element name, a (currently always wildcard) children
/// pattern, and any guards carried by the rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPattern {
    pub element: String,
    pub children: Vec<String>,
    pub guards: Vec<String>,
}

impl fmt::Display for InputPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.element, self.children.join(","))?;
        if !self.guards.is_empty() {
            write!(f, " where {}", self.guards.join(" and "))?;
        }
        Ok(())
    }
}

/// The result of analyzing a single MTT rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreimageEntry {
    pub state: String,
    pub pattern: InputPattern,
    pub root_element: Option<String>,
    pub accepted: bool,
    pub reason: String,
}

/// The aggregate result of analyzing every rule in an MTT.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreimageReport {
    pub entries: Vec<PreimageEntry>,
    pub accepted_count: usize,
    pub rejected_count: usize,
    pub coverage_percent: f64,
}

/// Analyzes every rule in `mtt` against `target`, the tree grammar the
/// transformation is expected to produce output conforming to.
pub fn compute_preimage(mtt: &Mtt, target: &TreeGrammar) -> PreimageReport {
    let mut report = PreimageReport::default();

    for rule in &mtt.rules {
        let mut pattern = parse_input_pattern(rule);
        let root_element = extract_root_element(&rule.rhs_output);

        let (accepted, reason) = match &root_element {
            Some(elem) if target.knows_element(elem) => {
                (true, format!("root element '{elem}' recognized by target grammar"))
            }
            Some(elem) => (
                false,
                format!("Element '{elem}' not found in target grammar"),
            ),
            None => (false, "No root element found in output".to_string()),
        };

        if accepted {
            report.accepted_count += 1;
            pattern.guards.extend(collect_output_constraints(&rule.rhs_output));
        } else {
            report.rejected_count += 1;
        }

        report.entries.push(PreimageEntry {
            state: rule.state.clone(),
            pattern,
            root_element,
            accepted,
            reason,
        });
    }

    let total = report.entries.len();
    report.coverage_percent = if total == 0 {
        100.0
    } else {
        (report.accepted_count as f64 / total as f64) * 100.0
    };

    report
}

fn parse_input_pattern(rule: &MttRule) -> InputPattern {
    let element = rule
        .lhs_pattern
        .split('(')
        .next()
        .unwrap_or(&rule.lhs_pattern)
        .to_string();
    InputPattern {
        element,
        children: vec!["*".to_string()],
        guards: rule.guard.clone().into_iter().collect(),
    }
}

/// Extracts the first element the output term would build: for a sequence,
/// the first child that yields one; for `if`, whatever its `then` branch
/// yields; everything else (text, value-of, attribute, apply-templates,
/// for-each, choose) has no element identity of its own.
pub(crate) fn extract_root_element(term: &OutputTerm) -> Option<String> {
    match term {
        OutputTerm::Element { name, .. } => Some(name.clone()),
        OutputTerm::Sequence { children } => children.iter().find_map(extract_root_element),
        OutputTerm::If { then, .. } => extract_root_element(then),
        _ => None,
    }
}

/// Recursively collects every `xsl:if`/`xsl:when` guard expression reachable
/// from `term`, used to surface the conditions under which a rule's output
/// varies (informational only — guards are never evaluated).
pub fn collect_output_constraints(term: &OutputTerm) -> Vec<String> {
    let mut out = Vec::new();
    collect_output_constraints_into(term, &mut out);
    out
}

fn collect_output_constraints_into(term: &OutputTerm, out: &mut Vec<String>) {
    match term {
        OutputTerm::If { test, then } => {
            out.push(test.clone());
            collect_output_constraints_into(then, out);
        }
        OutputTerm::Choose { branches } => {
            for (test, body) in branches {
                if let Some(test) = test {
                    out.push(test.clone());
                }
                collect_output_constraints_into(body, out);
            }
        }
        OutputTerm::Sequence { children } => {
            for child in children {
                collect_output_constraints_into(child, out);
            }
        }
        OutputTerm::Element { children, .. } => {
            for child in children {
                collect_output_constraints_into(child, out);
            }
        }
        _ => {}
    }
}

/// Restricts `source` to only the productions, type constraints and
/// attribute declarations of elements the preimage analysis accepted,
/// yielding the largest input grammar this transformation is known (by this
/// heuristic) to preserve validity for.
pub fn generate_input_grammar(source: &TreeGrammar, report: &PreimageReport) -> TreeGrammar {
    let accepted: BTreeSet<&str> = report
        .entries
        .iter()
        .filter(|e| e.accepted)
        .filter_map(|e| e.root_element.as_deref())
        .collect();

    let mut restricted = TreeGrammar {
        root: source.root.clone(),
        ..Default::default()
    };

    for prod in &source.productions {
        if accepted.contains(prod.lhs.as_str()) || prod.lhs == source.root {
            restricted.productions.push(prod.clone());
        }
    }
    for (name, tc) in &source.type_constraints {
        if accepted.contains(name.as_str()) || *name == source.root {
            restricted.type_constraints.insert(name.clone(), tc.clone());
        }
    }
    for (name, attrs) in &source.attributes {
        if accepted.contains(name.as_str()) || *name == source.root {
            restricted.attributes.insert(name.clone(), attrs.clone());
        }
    }

    restricted
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
        <xs:element name="FullName" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    const MATCHING_XSLT: &str = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Person">
    <Individual>
      <xsl:value-of select="Name"/>
    </Individual>
  </xsl:template>
</xsl:stylesheet>"#;

    #[test]
    fn accepts_rule_whose_output_root_is_in_target_grammar() {
        let target = parse_xsd(TARGET_XSD).unwrap();
        let mtt = compile_to_mtt(MATCHING_XSLT).unwrap();
        let report = compute_preimage(&mtt, &target);
        assert_eq!(report.accepted_count, 1);
        assert_eq!(report.rejected_count, 0);
        assert_eq!(report.coverage_percent, 100.0);
    }

    #[test]
    fn rejects_rule_whose_output_root_is_unknown_to_target() {
        let target = parse_xsd(TARGET_XSD).unwrap();
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Person">
    <NotInTarget/>
  </xsl:template>
</xsl:stylesheet>"#;
        let mtt = compile_to_mtt(xslt).unwrap();
        let report = compute_preimage(&mtt, &target);
        assert_eq!(report.accepted_count, 0);
        assert_eq!(report.rejected_count, 1);
        assert!(report.entries[0].reason.contains("not found in target grammar"));
    }

    #[test]
    fn input_pattern_display_includes_guard() {
        let pattern = InputPattern {
            element: "Person".to_string(),
            children: vec!["*".to_string()],
            guards: vec!["@active='true'".to_string()],
        };
        assert_eq!(pattern.to_string(), "Person(*) where @active='true'");
    }

    #[test]
    fn generate_input_grammar_restricts_to_accepted_elements() {
        let source = parse_xsd(SOURCE_XSD).unwrap();
        let target = parse_xsd(TARGET_XSD).unwrap();
        let mtt = compile_to_mtt(MATCHING_XSLT).unwrap();
        let report = compute_preimage(&mtt, &target);
        let restricted = generate_input_grammar(&source, &report);
        assert_eq!(restricted.root, "Person");
    }
}
