//! # Transformation subset checker (C2)
//!
//! Confirms a stylesheet stays within the restricted XSLT subset this
//! verifier's later stages (C3–C6) know how to reason about, before any
//! attempt is made to compile it to an MTT. Only elements in the
//! transformation's own namespace are checked against [`ALLOWED_ELEMENTS`]/
//! [`DISALLOWED_FEATURES`]; literal result elements are left alone. A
//! disallowed feature (`xsl:call-template`, `xsl:variable`, XPath functions
//! like `contains(`, ...) ends the check with an error; an instruction this
//! checker doesn't recognize, or looser but still-risky constructs (`//`,
//! `ancestor::`), are recorded as warnings and do not fail the check on
//! their own.

use serde::{Deserialize, Serialize};
use xmlparser::{ElementEnd, Token};

use crate::error::SubsetError;
use crate::xml::{self, Iter};

/// Elements from the `xsl` namespace this verifier understands.
const ALLOWED_ELEMENTS: &[&str] = &[
    "stylesheet",
    "transform",
    "template",
    "apply-templates",
    "for-each",
    "value-of",
    "if",
    "choose",
    "when",
    "otherwise",
    "with-param",
    "param",
    "text",
    "element",
    "attribute",
];

/// Instructions that are always rejected, regardless of context.
const DISALLOWED_FEATURES: &[&str] = &[
    "document",
    "key",
    "import",
    "include",
    "call-template",
    "variable",
    "sort",
    "number",
    "copy",
    "copy-of",
];

/// One issue found while walking the stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetIssue {
    pub path: String,
    pub message: String,
}

/// Result of checking a stylesheet against the supported subset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetReport {
    pub is_valid: bool,
    pub errors: Vec<SubsetIssue>,
    pub warnings: Vec<SubsetIssue>,
}

impl SubsetReport {
    fn error(&mut self, path: &str, message: impl Into<String>) {
        self.errors.push(SubsetIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: &str, message: impl Into<String>) {
        self.warnings.push(SubsetIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }
}

/// Walks `xslt`, checking every element in the transformation's own
/// namespace against the supported subset; literal result elements (anything
/// with a different prefix, e.g. the `Individual` in `<xsl:template
/// match="Person"><Individual .../></xsl:template>`) are recursed into but
/// never checked against [`ALLOWED_ELEMENTS`]/[`DISALLOWED_FEATURES`]
/// themselves, since those lists name XSLT instructions, not output vocabulary.
/// Well-formedness failures are a hard [`SubsetError`]; everything else is
/// collected into the returned [`SubsetReport`] (`is_valid` is false if any
/// error was recorded).
pub fn check_subset(xslt: &str) -> Result<SubsetReport, SubsetError> {
    let mut report = SubsetReport::default();

    let mut it = Iter::new(xslt);
    loop {
        match it.next() {
            Some(Ok(Token::ElementStart { prefix, local, .. })) => {
                let name = local.as_str();
                if name == "stylesheet" || name == "transform" {
                    check_element(&mut it, prefix.as_str(), prefix.as_str(), name, name, &mut report)
                        .map_err(SubsetError::Malformed)?;
                    break;
                }
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(SubsetError::Malformed(e.to_string())),
            None => break,
        }
    }

    report.is_valid = report.errors.is_empty();
    Ok(report)
}

/// Recursively checks one element (start tag's attributes not yet consumed)
/// and its children, threading a slash-joined path for diagnostics.
///
/// `xslt_prefix` is the namespace prefix the root `xsl:stylesheet`/`transform`
/// element itself was declared under (commonly `"xsl"`); only elements
/// sharing that prefix are instructions subject to the allow/deny lists.
fn check_element(
    it: &mut Iter<'_>,
    xslt_prefix: &str,
    prefix: &str,
    name: &str,
    path: &str,
    report: &mut SubsetReport,
) -> Result<(), String> {
    let (attrs, end) = xml::collect_attrs(it)?;
    let is_xslt = prefix == xslt_prefix;

    if is_xslt {
        if DISALLOWED_FEATURES.contains(&name) {
            report.error(path, format!("Disallowed XSLT element '{name}'"));
        } else if !ALLOWED_ELEMENTS.contains(&name) {
            report.warn(path, format!("Unknown XSLT element '{name}'"));
        }

        match name {
            "template" => check_template(&attrs, path, report),
            "if" => check_if(&attrs, path, report),
            "choose" => {}
            "apply-templates" => check_apply_templates(&attrs, path, report),
            "for-each" => check_for_each(&attrs, path, report),
            "value-of" => check_value_of(&attrs, path, report),
            _ => {}
        }
    }

    if matches!(end, ElementEnd::Empty) {
        if is_xslt && name == "choose" {
            report.error(path, "xsl:choose has no xsl:when child");
        }
        return Ok(());
    }

    let mut saw_when = false;
    xml::walk_children(
        it,
        name,
        |child_prefix, child_local, sub| {
            let child_path = format!("{path}/{child_local}");
            if child_prefix == xslt_prefix && child_local == "when" {
                saw_when = true;
            }
            check_element(sub, xslt_prefix, child_prefix, child_local, &child_path, report)
        },
        |_| {},
    )?;

    if is_xslt && name == "choose" && !saw_when {
        report.error(path, "xsl:choose has no xsl:when child");
    }

    Ok(())
}

fn check_template(attrs: &[(&str, &str)], path: &str, report: &mut SubsetReport) {
    match attrs.iter().find(|(k, _)| *k == "match") {
        None => report.error(path, "xsl:template has no match attribute"),
        Some((_, expr)) => warn_on_risky_path(expr, path, report),
    }
}

fn check_if(attrs: &[(&str, &str)], path: &str, report: &mut SubsetReport) {
    match attrs.iter().find(|(k, _)| *k == "test") {
        None => report.error(path, "xsl:if has no test attribute"),
        Some((_, expr)) => warn_on_risky_function(expr, path, report),
    }
}

fn check_apply_templates(attrs: &[(&str, &str)], path: &str, report: &mut SubsetReport) {
    if let Some((_, expr)) = attrs.iter().find(|(k, _)| *k == "select") {
        if expr.contains("preceding::") || expr.contains("following::") {
            report.warn(
                path,
                format!("xsl:apply-templates select uses an axis with uncertain preimage: {expr}"),
            );
        }
    }
}

fn check_for_each(attrs: &[(&str, &str)], path: &str, report: &mut SubsetReport) {
    if attrs.iter().find(|(k, _)| *k == "select").is_none() {
        report.error(path, "xsl:for-each has no select attribute");
    }
}

fn check_value_of(attrs: &[(&str, &str)], path: &str, report: &mut SubsetReport) {
    if attrs.iter().find(|(k, _)| *k == "select").is_none() {
        report.error(path, "xsl:value-of has no select attribute");
    }
}

fn warn_on_risky_path(expr: &str, path: &str, report: &mut SubsetReport) {
    if expr.contains("//") || expr.contains("ancestor::") || expr.contains("following::") {
        report.warn(
            path,
            format!("xsl:template match uses an axis with uncertain preimage: {expr}"),
        );
    }
}

fn warn_on_risky_function(expr: &str, path: &str, report: &mut SubsetReport) {
    if expr.contains("contains(") || expr.contains("substring(") || expr.contains("concat(") {
        report.warn(
            path,
            format!("xsl:if test uses a string function this checker cannot reason about: {expr}"),
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_STYLESHEET: &str = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/">
    <xsl:apply-templates/>
  </xsl:template>
  <xsl:template match="Person">
    <Individual>
      <xsl:value-of select="Name"/>
    </Individual>
  </xsl:template>
</xsl:stylesheet>"#;

    #[test]
    fn valid_subset_stylesheet_has_no_errors() {
        let report = check_subset(VALID_STYLESHEET).unwrap();
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn call_template_is_rejected() {
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/">
    <xsl:call-template name="helper"/>
  </xsl:template>
</xsl:stylesheet>"#;
        let report = check_subset(xslt).unwrap();
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.message.contains("call-template")));
    }

    #[test]
    fn template_without_match_is_an_error() {
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template>
    <xsl:text>hi</xsl:text>
  </xsl:template>
</xsl:stylesheet>"#;
        let report = check_subset(xslt).unwrap();
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.message.contains("no match attribute")));
    }

    #[test]
    fn choose_without_when_is_an_error() {
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/">
    <xsl:choose>
      <xsl:otherwise><xsl:text>x</xsl:text></xsl:otherwise>
    </xsl:choose>
  </xsl:template>
</xsl:stylesheet>"#;
        let report = check_subset(xslt).unwrap();
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.message.contains("no xsl:when child")));
    }

    #[test]
    fn descendant_axis_in_match_is_a_warning_not_an_error() {
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="//Person">
    <xsl:text>x</xsl:text>
  </xsl:template>
</xsl:stylesheet>"#;
        let report = check_subset(xslt).unwrap();
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn for_each_without_select_is_an_error() {
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/">
    <xsl:for-each>
      <xsl:text>x</xsl:text>
    </xsl:for-each>
  </xsl:template>
</xsl:stylesheet>"#;
        let report = check_subset(xslt).unwrap();
        assert!(!report.is_valid);
        assert!(report.errors.iter().any(|e| e.message.contains("xsl:for-each")));
    }

    #[test]
    fn literal_result_elements_are_not_checked_against_the_allow_list() {
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Items">
    <Items>
      <Item><xsl:value-of select="Item"/></Item>
    </Items>
  </xsl:template>
  <xsl:template match="Person">
    <Alien/>
  </xsl:template>
</xsl:stylesheet>"#;
        let report = check_subset(xslt).unwrap();
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn unknown_xslt_element_is_a_warning_not_an_error() {
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/">
    <xsl:message>hi</xsl:message>
  </xsl:template>
</xsl:stylesheet>"#;
        let report = check_subset(xslt).unwrap();
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.message.contains("Unknown XSLT element 'message'")));
    }
}
