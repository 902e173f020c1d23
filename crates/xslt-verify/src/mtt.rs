//! # MTT data model + transformation → MTT compiler (C3)
//!
//! Lowers a subset-checked stylesheet into a macro tree transducer: one
//! [`MttRule`] per `xsl:template` (plus one synthesized per `xsl:for-each`,
//! since a for-each body is itself a tree transformation applied at a
//! different state), each carrying a match pattern on the left and an
//! [`OutputTerm`] tree on the right.
//!
//! The state space is intentionally small: states are named from their
//! template's `match` pattern (and `mode`, if present) rather than allocated
//! fresh, so the rule set stays human-readable in the `convert-to-mtt`
//! response and in [`crate::render`].

use serde::{Deserialize, Serialize};
use xmlparser::{ElementEnd, Token};

use crate::error::MttError;
use crate::xml::{self, Iter};

// ============================================================================
// DATA MODEL
// ============================================================================

/// The right-hand side of an [`MttRule`]: a term tree built from literal
/// output structure plus the instructions that pull content from the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum OutputTerm {
    Text { content: String },
    ValueOf { select: String },
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<OutputTerm>,
    },
    Attribute { name: String, value: String },
    ApplyTemplates { select: Option<String>, mode: Option<String> },
    ForEach { select: String, state: String },
    If { test: String, then: Box<OutputTerm> },
    Choose { branches: Vec<(Option<String>, OutputTerm)> },
    Sequence { children: Vec<OutputTerm> },
}

/// One rule: in state `state`, matching input pattern `lhs_pattern`, produce
/// `rhs_output`. `guard` is carried opaquely (never evaluated — see the
/// spec's non-goal on constraint solving).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MttRule {
    pub state: String,
    pub lhs_pattern: String,
    pub rhs_output: OutputTerm,
    pub guard: Option<String>,
}

/// A macro tree transducer compiled from a subset-checked stylesheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Mtt {
    pub root_state: String,
    pub states: Vec<String>,
    pub rules: Vec<MttRule>,
}

impl Mtt {
    fn register_state(&mut self, state: &str) {
        if !self.states.iter().any(|s| s == state) {
            self.states.push(state.to_string());
        }
    }
}

// ============================================================================
// COMPILER
// ============================================================================

/// Compiles a stylesheet's `xsl:template` rules into an [`Mtt`].
///
/// Assumes (but does not re-check) that the stylesheet has already passed
/// [`crate::subset::check_subset`]; constructs outside the supported subset
/// are simply ignored rather than re-diagnosed here.
pub fn compile_to_mtt(xslt: &str) -> Result<Mtt, MttError> {
    let mut mtt = Mtt::default();

    let mut it = Iter::new(xslt);
    loop {
        match it.next() {
            Some(Ok(Token::ElementStart { local, .. })) => {
                let name = local.as_str();
                if name == "stylesheet" || name == "transform" {
                    xml::skip_attrs(&mut it).map_err(MttError::Malformed)?;
                    walk_stylesheet_body(&mut it, &mut mtt)?;
                    break;
                }
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(MttError::Malformed(e.to_string())),
            None => break,
        }
    }

    if mtt.root_state.is_empty() {
        if let Some(first) = mtt.states.first() {
            mtt.root_state = first.clone();
        }
    }

    Ok(mtt)
}

fn walk_stylesheet_body(it: &mut Iter<'_>, mtt: &mut Mtt) -> Result<(), MttError> {
    xml::walk_children(
        it,
        "stylesheet",
        |_prefix, local, sub| {
            if local == "template" {
                process_template(sub, mtt).map_err(|e| e.to_string())
            } else {
                skip_unknown(sub)
            }
        },
        |_| {},
    )
    .map_err(MttError::Malformed)
}

fn skip_unknown(it: &mut Iter<'_>) -> Result<(), String> {
    let end = xml::skip_attrs(it)?;
    if matches!(end, ElementEnd::Empty) {
        return Ok(());
    }
    let mut depth = 0usize;
    loop {
        match it.next() {
            Some(Ok(Token::ElementStart { .. })) => depth += 1,
            Some(Ok(Token::ElementEnd {
                end: ElementEnd::Close(..),
                ..
            })) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Some(Err(e)) => return Err(e.to_string()),
            Some(Ok(_)) => continue,
            None => return Err("unexpected end of document".into()),
        }
    }
}

fn process_template(it: &mut Iter<'_>, mtt: &mut Mtt) -> Result<(), String> {
    let (attrs, end) = xml::collect_attrs(it)?;
    let match_expr = attrs
        .iter()
        .find(|(k, _)| *k == "match")
        .map(|(_, v)| *v)
        .unwrap_or("/");
    let mode = attrs
        .iter()
        .find(|(k, _)| *k == "mode")
        .map(|(_, v)| v.to_string());

    let state = create_state_name(match_expr, mode.as_deref());
    let lhs_pattern = parse_match_pattern(match_expr);

    if match_expr == "/" && mode.is_none() {
        mtt.root_state = state.clone();
    }
    mtt.register_state(&state);

    let body = if matches!(end, ElementEnd::Empty) {
        OutputTerm::Sequence { children: vec![] }
    } else {
        process_template_body(it, "template", mtt)?
    };

    mtt.rules.push(MttRule {
        state,
        lhs_pattern,
        rhs_output: body,
        guard: None,
    });

    Ok(())
}

/// Sanitizes a match pattern (plus optional mode) into a state name:
/// `/` → `_`, `@` → `attr_`, `*` → `any`.
fn create_state_name(match_expr: &str, mode: Option<&str>) -> String {
    let mut name: String = match_expr
        .chars()
        .map(|c| match c {
            '/' => '_',
            '@' => '_',
            '*' => 'X',
            c => c,
        })
        .collect();
    name = name.replace("__", "_");
    let name = name.trim_matches('_');
    let base = if name.is_empty() { "root" } else { name };
    match mode {
        Some(m) => format!("{base}_mode_{m}"),
        None => base.to_string(),
    }
}

/// `/` → `root(children)`; a root-relative path takes its last step;
/// anything else is treated as a bare element-name match.
fn parse_match_pattern(match_expr: &str) -> String {
    if match_expr == "/" {
        return "root(children)".to_string();
    }
    let last = match_expr.rsplit('/').next().unwrap_or(match_expr);
    let last = last.trim_start_matches('@');
    format!("{last}(children)")
}

/// Processes the already-opened body of a `template`/`for-each`/`if`/`when`
/// /`otherwise` element into a `Sequence` output term, dispatching each
/// child instruction or literal result element in document order.
fn process_template_body(
    it: &mut Iter<'_>,
    end_tag: &str,
    mtt: &mut Mtt,
) -> Result<OutputTerm, String> {
    let mut children = Vec::new();

    xml::walk_children(
        it,
        end_tag,
        |_prefix, local, sub| {
            let term = process_instruction(sub, local, mtt)?;
            if let Some(term) = term {
                children.push(term);
            }
            Ok(())
        },
        |text| {
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                children.push(OutputTerm::Text {
                    content: trimmed.to_string(),
                });
            }
        },
    )?;

    Ok(OutputTerm::Sequence { children })
}

const XSL_INSTRUCTIONS: &[&str] = &[
    "apply-templates",
    "for-each",
    "value-of",
    "if",
    "choose",
    "when",
    "otherwise",
    "text",
    "element",
    "attribute",
];

/// Processes one child of a template body. `local` is the child's local
/// name (stripped of any `xsl:` prefix by [`xml::local_name`] upstream —
/// here it arrives pre-stripped from [`xml::walk_children`]'s tokenizer,
/// which already reports local names).
fn process_instruction(
    it: &mut Iter<'_>,
    local: &str,
    mtt: &mut Mtt,
) -> Result<Option<OutputTerm>, String> {
    if !XSL_INSTRUCTIONS.contains(&local) {
        return process_literal_element(it, local, mtt).map(Some);
    }

    match local {
        "apply-templates" => {
            let (attrs, end) = xml::collect_attrs(it)?;
            let select = attrs.iter().find(|(k, _)| *k == "select").map(|(_, v)| v.to_string());
            let mode = attrs.iter().find(|(k, _)| *k == "mode").map(|(_, v)| v.to_string());
            if !matches!(end, ElementEnd::Empty) {
                skip_body(it)?;
            }
            Ok(Some(OutputTerm::ApplyTemplates { select, mode }))
        }
        "value-of" => {
            let (attrs, end) = xml::collect_attrs(it)?;
            let select = attrs
                .iter()
                .find(|(k, _)| *k == "select")
                .map(|(_, v)| v.to_string())
                .unwrap_or_default();
            if !matches!(end, ElementEnd::Empty) {
                skip_body(it)?;
            }
            Ok(Some(OutputTerm::ValueOf { select }))
        }
        "text" => {
            let end = xml::skip_attrs(it)?;
            let content = if matches!(end, ElementEnd::Empty) {
                String::new()
            } else {
                read_text_body(it, "text")?
            };
            Ok(Some(OutputTerm::Text { content }))
        }
        "if" => {
            let (attrs, end) = xml::collect_attrs(it)?;
            let test = attrs
                .iter()
                .find(|(k, _)| *k == "test")
                .map(|(_, v)| v.to_string())
                .unwrap_or_default();
            let then = if matches!(end, ElementEnd::Empty) {
                OutputTerm::Sequence { children: vec![] }
            } else {
                process_template_body(it, "if", mtt)?
            };
            Ok(Some(OutputTerm::If {
                test,
                then: Box::new(then),
            }))
        }
        "choose" => {
            let end = xml::skip_attrs(it)?;
            let mut branches = Vec::new();
            if !matches!(end, ElementEnd::Empty) {
                xml::walk_children(
                    it,
                    "choose",
                    |_branch_prefix, branch_local, sub| {
                        if branch_local == "when" {
                            let (attrs, bend) = xml::collect_attrs(sub)?;
                            let test = attrs
                                .iter()
                                .find(|(k, _)| *k == "test")
                                .map(|(_, v)| v.to_string())
                                .unwrap_or_default();
                            let body = if matches!(bend, ElementEnd::Empty) {
                                OutputTerm::Sequence { children: vec![] }
                            } else {
                                process_template_body(sub, "when", mtt)?
                            };
                            branches.push((Some(test), body));
                        } else if branch_local == "otherwise" {
                            let bend = xml::skip_attrs(sub)?;
                            let body = if matches!(bend, ElementEnd::Empty) {
                                OutputTerm::Sequence { children: vec![] }
                            } else {
                                process_template_body(sub, "otherwise", mtt)?
                            };
                            branches.push((None, body));
                        } else {
                            skip_unknown(sub)?;
                        }
                        Ok(())
                    },
                    |_| {},
                )?;
            }
            Ok(Some(OutputTerm::Choose { branches }))
        }
        "for-each" => {
            let (attrs, end) = xml::collect_attrs(it)?;
            let select = attrs
                .iter()
                .find(|(k, _)| *k == "select")
                .map(|(_, v)| v.to_string())
                .unwrap_or_default();

            let state = format!("foreach_{}", mtt.states.len() + mtt.rules.len());
            mtt.register_state(&state);
            let lhs_pattern = parse_match_pattern(&select);

            let body = if matches!(end, ElementEnd::Empty) {
                OutputTerm::Sequence { children: vec![] }
            } else {
                process_template_body(it, "for-each", mtt)?
            };

            mtt.rules.push(MttRule {
                state: state.clone(),
                lhs_pattern,
                rhs_output: body,
                guard: None,
            });

            Ok(Some(OutputTerm::ForEach { select, state }))
        }
        "element" => {
            let (attrs, end) = xml::collect_attrs(it)?;
            let name = attrs
                .iter()
                .find(|(k, _)| *k == "name")
                .map(|(_, v)| v.to_string())
                .unwrap_or_default();
            let children = if matches!(end, ElementEnd::Empty) {
                vec![]
            } else {
                match process_template_body(it, "element", mtt)? {
                    OutputTerm::Sequence { children } => children,
                    other => vec![other],
                }
            };
            Ok(Some(OutputTerm::Element {
                name,
                attributes: vec![],
                children,
            }))
        }
        "attribute" => {
            let (attrs, end) = xml::collect_attrs(it)?;
            let name = attrs
                .iter()
                .find(|(k, _)| *k == "name")
                .map(|(_, v)| v.to_string())
                .unwrap_or_default();
            let value = if matches!(end, ElementEnd::Empty) {
                String::new()
            } else {
                flatten_text(&process_template_body(it, "attribute", mtt)?)
            };
            Ok(Some(OutputTerm::Attribute { name, value }))
        }
        _ => unreachable!("instruction filtered by XSL_INSTRUCTIONS"),
    }
}

/// A literal result element in the output (e.g. `<Individual>`): its
/// attributes may carry attribute value templates (`name="{xpath}"`), and
/// its children recurse through [`process_instruction`] again.
fn process_literal_element(
    it: &mut Iter<'_>,
    name: &str,
    mtt: &mut Mtt,
) -> Result<OutputTerm, String> {
    let mut attributes = Vec::new();
    let mut end = None;
    loop {
        match it.next() {
            Some(Ok(Token::Attribute { local, value, .. })) => {
                attributes.push((local.as_str().to_string(), resolve_avt(value.as_str())));
            }
            Some(Ok(Token::ElementEnd { end: e, .. })) => {
                end = Some(e);
                break;
            }
            Some(Err(e)) => return Err(e.to_string()),
            Some(Ok(_)) => continue,
            None => return Err("unexpected end of document while reading attributes".into()),
        }
    }

    let children = if matches!(end, Some(ElementEnd::Empty)) {
        vec![]
    } else {
        match process_template_body(it, name, mtt)? {
            OutputTerm::Sequence { children } => children,
            other => vec![other],
        }
    };

    Ok(OutputTerm::Element {
        name: name.to_string(),
        attributes,
        children,
    })
}

/// Extracts the XPath expression from a `{expr}` attribute value template;
/// only the first `{`...`}` pair is honoured, matching the reference
/// compiler. A value with no braces is returned unchanged (a literal).
fn resolve_avt(value: &str) -> String {
    match (value.find('{'), value.find('}')) {
        (Some(start), Some(end)) if start < end => value[start + 1..end].to_string(),
        _ => value.to_string(),
    }
}

fn skip_body(it: &mut Iter<'_>) -> Result<(), String> {
    let mut depth = 0usize;
    loop {
        match it.next() {
            Some(Ok(Token::ElementStart { .. })) => depth += 1,
            Some(Ok(Token::ElementEnd {
                end: ElementEnd::Close(..),
                ..
            })) => {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            }
            Some(Err(e)) => return Err(e.to_string()),
            Some(Ok(_)) => continue,
            None => return Err("unexpected end of document".into()),
        }
    }
}

/// Collapses an output term built from text and `value-of` instructions
/// into a single string, representing a `value-of` as an attribute-value-
/// template-style `{select}` placeholder. Used where the data model wants
/// one string (an `xsl:attribute`'s value) but the body was parsed through
/// the general instruction dispatcher.
fn flatten_text(term: &OutputTerm) -> String {
    match term {
        OutputTerm::Text { content } => content.clone(),
        OutputTerm::ValueOf { select } => format!("{{{select}}}"),
        OutputTerm::Sequence { children } => children.iter().map(flatten_text).collect(),
        _ => String::new(),
    }
}

fn read_text_body(it: &mut Iter<'_>, end_tag: &str) -> Result<String, String> {
    let mut out = String::new();
    xml::walk_children(it, end_tag, |_, _, sub| skip_unknown(sub), |text| out.push_str(text))?;
    Ok(out)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const STYLESHEET: &str = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/">
    <xsl:apply-templates select="Person"/>
  </xsl:template>
  <xsl:template match="Person">
    <Individual>
      <xsl:attribute name="years">
        <xsl:value-of select="Age"/>
      </xsl:attribute>
      <xsl:value-of select="Name"/>
    </Individual>
  </xsl:template>
</xsl:stylesheet>"#;

    #[test]
    fn compiles_one_rule_per_template() {
        let mtt = compile_to_mtt(STYLESHEET).unwrap();
        assert_eq!(mtt.rules.len(), 2);
        assert_eq!(mtt.root_state, "root");
    }

    #[test]
    fn root_template_rule_has_root_pattern() {
        let mtt = compile_to_mtt(STYLESHEET).unwrap();
        let root_rule = mtt.rules.iter().find(|r| r.state == "root").unwrap();
        assert_eq!(root_rule.lhs_pattern, "root(children)");
    }

    #[test]
    fn element_template_produces_literal_output_element() {
        let mtt = compile_to_mtt(STYLESHEET).unwrap();
        let person_rule = mtt.rules.iter().find(|r| r.state == "Person").unwrap();
        match &person_rule.rhs_output {
            OutputTerm::Sequence { children } => {
                assert_eq!(children.len(), 1);
                match &children[0] {
                    OutputTerm::Element { name, children, .. } => {
                        assert_eq!(name, "Individual");
                        assert!(children
                            .iter()
                            .any(|c| matches!(c, OutputTerm::Attribute { name, .. } if name == "years")));
                        assert!(children
                            .iter()
                            .any(|c| matches!(c, OutputTerm::ValueOf { select } if select == "Name")));
                    }
                    other => panic!("expected Element, got {other:?}"),
                }
            }
            other => panic!("expected Sequence, got {other:?}"),
        }
    }

    #[test]
    fn for_each_synthesizes_a_fresh_state() {
        let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="/">
    <xsl:for-each select="Item">
      <xsl:value-of select="."/>
    </xsl:for-each>
  </xsl:template>
</xsl:stylesheet>"#;
        let mtt = compile_to_mtt(xslt).unwrap();
        assert_eq!(mtt.rules.len(), 2);
        assert!(mtt.rules.iter().any(|r| r.state.starts_with("foreach_")));
    }

    #[test]
    fn attribute_value_template_is_resolved() {
        assert_eq!(resolve_avt("{Name}"), "Name");
        assert_eq!(resolve_avt("literal"), "literal");
    }
}
