//! # Tree grammar data model + XSD → tree grammar compiler (C1)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          XSD → TREE GRAMMAR                                 │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                                                                             │
//! │    schema.xsd          First pass              Second pass                 │
//! │   ┌──────────┐     ┌──────────────────┐    ┌────────────────────┐          │
//! │   │<xs:schema│ ──► │ index complexType│ ──►│ for each top-level  │          │
//! │   │ ...      │     │ and simpleType   │    │ element: emit       │          │
//! │   │</xs:sche.│     │ declarations by  │    │ productions, type   │          │
//! │   └──────────┘     │ name (raw text)  │    │ constraints, attrs  │          │
//! │                     └──────────────────┘    │ (recursing into    │          │
//! │                                              │ inline children)   │          │
//! │                                              └────────────────────┘          │
//! │                                                      │                      │
//! │                                                      ▼                      │
//! │                                              GrammarBuilder (mutable)        │
//! │                                                      │                      │
//! │                                                      ▼                      │
//! │                                              TreeGrammar (immutable)         │
//! │                                                                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The parser walks a flat token stream ([`crate::xml`]) rather than building
//! a DOM; it is intentionally partial (§9 of the design notes) — anything
//! outside {builtin simple types, flat sequence/choice/all, attribute
//! restrictions, simpleContent extensions} is silently skipped.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use xmlparser::{ElementEnd, Token};

use crate::error::SchemaError;
use crate::xml::{self, Iter};

// ============================================================================
// DATA MODEL
// ============================================================================

/// A symbolic type restriction: a base atomic type plus facet values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeConstraint {
    pub base_type: String,
    pub restrictions: IndexMap<String, String>,
}

impl TypeConstraint {
    pub fn new(base_type: impl Into<String>) -> Self {
        TypeConstraint {
            base_type: base_type.into(),
            restrictions: IndexMap::new(),
        }
    }
}

/// Content-model kind of a [`Production`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Sequence,
    Choice,
    All,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Sequence => "sequence",
            ContentKind::Choice => "choice",
            ContentKind::All => "all",
        }
    }
}

/// `(min, max)` occurrence bounds. `max == -1` means unbounded.
pub type Cardinality = (i64, i64);

/// A single production `lhs → rhs` in a [`TreeGrammar`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: String,
    pub rhs: Vec<String>,
    pub kind: ContentKind,
    pub cardinality: Cardinality,
}

/// One declared attribute: `(name, atomic_type, required)`.
pub type AttributeDecl = (String, String, bool);

/// A regular tree grammar derived from an XSD schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeGrammar {
    pub root: String,
    pub productions: Vec<Production>,
    pub type_constraints: IndexMap<String, TypeConstraint>,
    pub attributes: IndexMap<String, Vec<AttributeDecl>>,
}

impl TreeGrammar {
    /// Returns the production whose `lhs` is `element`, if any.
    pub fn production(&self, element: &str) -> Option<&Production> {
        self.productions.iter().find(|p| p.lhs == element)
    }

    /// True if `element` names the root, some production's `lhs`, or a
    /// purely-attributed element — i.e. the set of names this grammar
    /// recognises as elements.
    pub fn knows_element(&self, element: &str) -> bool {
        element == self.root
            || self.productions.iter().any(|p| p.lhs == element)
            || self.attributes.contains_key(element)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Accumulates productions, type constraints and attributes while
/// descending the schema token stream; yields an immutable [`TreeGrammar`]
/// on completion.
#[derive(Debug, Default)]
struct GrammarBuilder {
    root: String,
    productions: Vec<Production>,
    type_constraints: IndexMap<String, TypeConstraint>,
    attributes: IndexMap<String, Vec<AttributeDecl>>,
}

impl GrammarBuilder {
    fn finish(self) -> TreeGrammar {
        TreeGrammar {
            root: self.root,
            productions: self.productions,
            type_constraints: self.type_constraints,
            attributes: self.attributes,
        }
    }
}

/// A `complexType` or `simpleType` captured verbatim during the first pass
/// (its inner token span, re-tokenized whenever a `type=` reference resolves
/// to it) so the same named type can be expanded under multiple element
/// names.
#[derive(Debug, Clone)]
struct NamedType {
    body: String,
}

struct Types<'a> {
    complex: &'a IndexMap<String, NamedType>,
    simple: &'a IndexMap<String, NamedType>,
}

fn strip_xs_prefix(t: &str) -> &str {
    t.strip_prefix("xs:").unwrap_or(t)
}

// ============================================================================
// PARSER
// ============================================================================

/// Parses an XSD document into a [`TreeGrammar`].
pub fn parse_xsd(xsd: &str) -> Result<TreeGrammar, SchemaError> {
    let (complex, simple) = collect_named_types(xsd)?;
    let types = Types {
        complex: &complex,
        simple: &simple,
    };
    let mut builder = GrammarBuilder::default();

    let mut it = Iter::new(xsd);
    loop {
        match it.next() {
            Some(Ok(Token::ElementStart { local, .. })) => {
                if local.as_str() == "schema" {
                    xml::skip_attrs(&mut it).map_err(SchemaError::Malformed)?;
                    walk_schema_body(&mut it, &types, &mut builder)?;
                    break;
                }
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(SchemaError::Malformed(e.to_string())),
            None => return Err(SchemaError::Malformed("no xs:schema element found".into())),
        }
    }

    if builder.root.is_empty() {
        return Err(SchemaError::NoRootElement);
    }

    Ok(builder.finish())
}

/// First pass: index `complexType`/`simpleType` declarations by name,
/// capturing each one's inner XML so the second pass can re-tokenize it.
fn collect_named_types(
    xsd: &str,
) -> Result<(IndexMap<String, NamedType>, IndexMap<String, NamedType>), SchemaError> {
    let mut complex_types = IndexMap::new();
    let mut simple_types = IndexMap::new();

    let mut it = Iter::new(xsd);
    loop {
        match it.next() {
            Some(Ok(Token::ElementStart { local, .. })) => {
                let name = local.as_str();
                if name == "complexType" || name == "simpleType" {
                    let (attrs, end) =
                        xml::collect_attrs(&mut it).map_err(SchemaError::Malformed)?;
                    let type_name = attrs.iter().find(|(k, _)| *k == "name").map(|(_, v)| *v);
                    if let Some(type_name) = type_name {
                        let body = if matches!(end, ElementEnd::Empty) {
                            String::new()
                        } else {
                            capture_body(&mut it, name)?
                        };
                        let entry = NamedType { body };
                        if name == "complexType" {
                            complex_types.insert(type_name.to_string(), entry);
                        } else {
                            simple_types.insert(type_name.to_string(), entry);
                        }
                    } else if !matches!(end, ElementEnd::Empty) {
                        skip_element_body(&mut it).map_err(SchemaError::Malformed)?;
                    }
                }
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(SchemaError::Malformed(e.to_string())),
            None => break,
        }
    }

    Ok((complex_types, simple_types))
}

/// Captures the raw source text of the children of the element whose start
/// tag was just consumed, up to (and including) its matching close tag.
/// Depth-tracks on local name so a nested element of the same name (e.g. a
/// `complexType` containing another named `complexType`, which XSD does not
/// actually allow, but defensively) doesn't terminate the capture early.
fn capture_body(it: &mut Iter<'_>, end_tag: &str) -> Result<String, SchemaError> {
    let mut depth = 0usize;
    let mut out = String::new();
    loop {
        match it.next() {
            Some(Ok(Token::ElementStart { local, span, .. })) => {
                if local.as_str() == end_tag {
                    depth += 1;
                }
                out.push_str(span.as_str());
            }
            Some(Ok(Token::Attribute { span, .. })) => {
                out.push(' ');
                out.push_str(span.as_str());
            }
            Some(Ok(Token::ElementEnd { end, span })) => {
                if matches!(end, ElementEnd::Close(_, local) if local.as_str() == end_tag) {
                    if depth == 0 {
                        out.push_str(span.as_str());
                        return Ok(out);
                    }
                    depth -= 1;
                }
                out.push_str(span.as_str());
            }
            Some(Ok(Token::Text { text })) => out.push_str(text.as_str()),
            Some(Err(e)) => return Err(SchemaError::Malformed(e.to_string())),
            Some(Ok(_)) => continue,
            None => {
                return Err(SchemaError::UnexpectedEof {
                    context: end_tag.to_string(),
                })
            }
        }
    }
}

/// Skips the body of an element whose start tag was just consumed (not
/// self-closing), up to and including its matching close tag.
fn skip_element_body(it: &mut Iter<'_>) -> Result<(), String> {
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

/// Skips a full element (start tag's attributes not yet consumed, through
/// its matching close tag or self-close).
fn skip_element(it: &mut Iter<'_>) -> Result<(), String> {
    let end = xml::skip_attrs(it)?;
    if matches!(end, ElementEnd::Empty) {
        return Ok(());
    }
    skip_element_body(it)
}

/// Second pass: walk the direct children of `xs:schema`, emitting
/// productions for every top-level `xs:element`.
fn walk_schema_body(
    it: &mut Iter<'_>,
    types: &Types<'_>,
    builder: &mut GrammarBuilder,
) -> Result<(), SchemaError> {
    xml::walk_children(
        it,
        "schema",
        |_prefix, local, sub| {
            if local == "element" {
                process_element(sub, true, types, builder).map_err(|e| e.to_string())?;
            } else {
                skip_element(sub)?;
            }
            Ok(())
        },
        |_| {},
    )
    .map_err(SchemaError::Malformed)
}

fn parse_cardinality(attrs: &[(&str, &str)]) -> Cardinality {
    let min_occurs = attrs
        .iter()
        .find(|(k, _)| *k == "minOccurs")
        .and_then(|(_, v)| v.parse::<i64>().ok())
        .unwrap_or(1);
    let max_occurs = attrs
        .iter()
        .find(|(k, _)| *k == "maxOccurs")
        .map(|(_, v)| {
            if *v == "unbounded" {
                -1
            } else {
                v.parse::<i64>().unwrap_or(1)
            }
        })
        .unwrap_or(1);
    (min_occurs, max_occurs)
}

/// Processes a single `xs:element` declaration: start tag's attributes not
/// yet consumed. Handles both top-level declarations (`is_root`) and
/// inline child declarations found inside a `sequence`/`choice`/`all`
/// (recursion happens here, matching the source compiler's
/// `_process_element` being called again for each inline child).
fn process_element(
    it: &mut Iter<'_>,
    is_root: bool,
    types: &Types<'_>,
    builder: &mut GrammarBuilder,
) -> Result<(), SchemaError> {
    let (attrs, end) = xml::collect_attrs(it).map_err(SchemaError::Malformed)?;
    let name = attrs
        .iter()
        .find(|(k, _)| *k == "name")
        .map(|(_, v)| v.to_string())
        .unwrap_or_default();
    if name.is_empty() {
        if !matches!(end, ElementEnd::Empty) {
            skip_element_body(it).map_err(SchemaError::Malformed)?;
        }
        return Ok(());
    }
    if is_root && builder.root.is_empty() {
        builder.root = name.clone();
    }

    let cardinality = parse_cardinality(&attrs);
    let type_ref = attrs.iter().find(|(k, _)| *k == "type").map(|(_, v)| *v);

    if matches!(end, ElementEnd::Empty) {
        if let Some(type_ref) = type_ref {
            emit_type_reference(type_ref, &name, cardinality, types, builder)?;
        }
        return Ok(());
    }

    if let Some(type_ref) = type_ref {
        emit_type_reference(type_ref, &name, cardinality, types, builder)?;
        skip_element_body(it).map_err(SchemaError::Malformed)?;
        return Ok(());
    }

    // Inline type definition: the next relevant child is complexType or
    // simpleType.
    let mut handled = false;
    xml::walk_children(
        it,
        "element",
        |_prefix, local, sub| {
            if !handled && local == "complexType" {
                handled = true;
                process_complex_type_tag(sub, &name, cardinality, types, builder)
                    .map_err(|e| e.to_string())?;
            } else if !handled && local == "simpleType" {
                handled = true;
                process_simple_type_tag(sub, &name, cardinality, builder).map_err(|e| e.to_string())?;
            } else {
                skip_element(sub)?;
            }
            Ok(())
        },
        |_| {},
    )
    .map_err(SchemaError::Malformed)?;

    Ok(())
}

fn emit_type_reference(
    type_ref: &str,
    element_name: &str,
    cardinality: Cardinality,
    types: &Types<'_>,
    builder: &mut GrammarBuilder,
) -> Result<(), SchemaError> {
    if let Some(builtin) = type_ref.strip_prefix("xs:") {
        builder
            .type_constraints
            .insert(element_name.to_string(), TypeConstraint::new(builtin));
        builder.productions.push(Production {
            lhs: element_name.to_string(),
            rhs: vec![builtin.to_string()],
            kind: ContentKind::Sequence,
            cardinality,
        });
        return Ok(());
    }

    if let Some(ct) = types.complex.get(type_ref).cloned() {
        let mut it = Iter::new(&ct.body);
        process_complex_type_tokens(&mut it, element_name, cardinality, types, builder)?;
    } else if let Some(st) = types.simple.get(type_ref).cloned() {
        let mut it = Iter::new(&st.body);
        process_simple_type_tokens(&mut it, element_name, cardinality, builder)?;
    }
    Ok(())
}

/// `complexType`'s start tag not yet consumed.
fn process_complex_type_tag(
    it: &mut Iter<'_>,
    element_name: &str,
    cardinality: Cardinality,
    types: &Types<'_>,
    builder: &mut GrammarBuilder,
) -> Result<(), SchemaError> {
    let end = xml::skip_attrs(it).map_err(SchemaError::Malformed)?;
    if matches!(end, ElementEnd::Empty) {
        return Ok(());
    }
    process_complex_type_tokens(it, element_name, cardinality, types, builder)
}

/// Walks the children of an already-opened `complexType`, handling
/// attributes, `sequence`/`choice`/`all`, and `simpleContent` extension.
fn process_complex_type_tokens(
    it: &mut Iter<'_>,
    element_name: &str,
    cardinality: Cardinality,
    types: &Types<'_>,
    builder: &mut GrammarBuilder,
) -> Result<(), SchemaError> {
    let mut attrs: Vec<AttributeDecl> = Vec::new();

    xml::walk_children(
        it,
        "complexType",
        |_prefix, local, sub| {
            match local {
                "attribute" => {
                    let decl = process_attribute(sub, builder).map_err(|e| e.to_string())?;
                    attrs.push(decl);
                }
                "sequence" => {
                    process_content_model(sub, "sequence", element_name, cardinality, ContentKind::Sequence, types, builder)
                        .map_err(|e| e.to_string())?;
                }
                "choice" => {
                    process_content_model(sub, "choice", element_name, cardinality, ContentKind::Choice, types, builder)
                        .map_err(|e| e.to_string())?;
                }
                "all" => {
                    process_content_model(sub, "all", element_name, cardinality, ContentKind::All, types, builder)
                        .map_err(|e| e.to_string())?;
                }
                "simpleContent" => {
                    process_simple_content(sub, element_name, builder).map_err(|e| e.to_string())?;
                }
                _ => skip_element(sub)?,
            }
            Ok(())
        },
        |_| {},
    )
    .map_err(SchemaError::Malformed)?;

    if !attrs.is_empty() {
        builder.attributes.insert(element_name.to_string(), attrs);
    }

    Ok(())
}

/// Walks a `sequence`/`choice`/`all`'s already-opened body, collecting child
/// element names and recursing into each inline declaration, then emits the
/// production for `element_name` if any children were found.
fn process_content_model(
    it: &mut Iter<'_>,
    end_tag: &str,
    element_name: &str,
    cardinality: Cardinality,
    kind: ContentKind,
    types: &Types<'_>,
    builder: &mut GrammarBuilder,
) -> Result<(), SchemaError> {
    let mut children = Vec::new();

    xml::walk_children(
        it,
        end_tag,
        |_prefix, local, sub| {
            if local != "element" {
                return skip_element(sub);
            }
            let (attrs, end) = xml::collect_attrs(sub)?;
            let is_inline = attrs.iter().any(|(k, _)| *k == "name");
            let child_name = attrs
                .iter()
                .find(|(k, _)| *k == "name")
                .or_else(|| attrs.iter().find(|(k, _)| *k == "ref"))
                .map(|(_, v)| v.to_string());

            let Some(child_name) = child_name else {
                if !matches!(end, ElementEnd::Empty) {
                    skip_element_body(sub)?;
                }
                return Ok(());
            };
            children.push(child_name.clone());

            if is_inline {
                let child_cardinality = parse_cardinality(&attrs);
                let child_type_ref = attrs.iter().find(|(k, _)| *k == "type").map(|(_, v)| *v);

                if matches!(end, ElementEnd::Empty) {
                    if let Some(type_ref) = child_type_ref {
                        emit_type_reference(type_ref, &child_name, child_cardinality, types, builder)
                            .map_err(|e| e.to_string())?;
                    }
                    return Ok(());
                }

                if let Some(type_ref) = child_type_ref {
                    emit_type_reference(type_ref, &child_name, child_cardinality, types, builder)
                        .map_err(|e| e.to_string())?;
                    skip_element_body(sub)?;
                    return Ok(());
                }

                let mut handled = false;
                xml::walk_children(
                    sub,
                    "element",
                    |_inner_prefix, inner_local, inner_it| {
                        if !handled && inner_local == "complexType" {
                            handled = true;
                            process_complex_type_tag(inner_it, &child_name, child_cardinality, types, builder)
                                .map_err(|e| e.to_string())?;
                        } else if !handled && inner_local == "simpleType" {
                            handled = true;
                            process_simple_type_tag(inner_it, &child_name, child_cardinality, builder)
                                .map_err(|e| e.to_string())?;
                        } else {
                            skip_element(inner_it)?;
                        }
                        Ok(())
                    },
                    |_| {},
                )?;
            } else if !matches!(end, ElementEnd::Empty) {
                skip_element_body(sub)?;
            }
            Ok(())
        },
        |_| {},
    )
    .map_err(SchemaError::Malformed)?;

    if !children.is_empty() {
        builder.productions.push(Production {
            lhs: element_name.to_string(),
            rhs: children,
            kind,
            cardinality,
        });
    }

    Ok(())
}

fn process_attribute(
    it: &mut Iter<'_>,
    builder: &mut GrammarBuilder,
) -> Result<AttributeDecl, String> {
    let (attrs, end) = xml::collect_attrs(it)?;
    let attr_name = attrs
        .iter()
        .find(|(k, _)| *k == "name")
        .map(|(_, v)| v.to_string())
        .unwrap_or_default();
    let type_ref = attrs.iter().find(|(k, _)| *k == "type").map(|(_, v)| v.to_string());
    let required = attrs.iter().any(|(k, v)| *k == "use" && *v == "required");

    if matches!(end, ElementEnd::Empty) {
        let base = type_ref
            .as_deref()
            .map(strip_xs_prefix)
            .unwrap_or("string")
            .to_string();
        builder
            .type_constraints
            .insert(attr_name.clone(), TypeConstraint::new(base.clone()));
        return Ok((attr_name, base, required));
    }

    let mut base = "string".to_string();
    let mut restrictions = IndexMap::new();
    let mut saw_restriction = false;

    xml::walk_children(
        it,
        "attribute",
        |_prefix, local, sub| {
            if local == "simpleType" {
                let (inner_base, inner_restrictions, found) = read_simple_type_restriction(sub)?;
                if found {
                    base = inner_base;
                    restrictions = inner_restrictions;
                    saw_restriction = true;
                }
            } else {
                skip_element(sub)?;
            }
            Ok(())
        },
        |_| {},
    )?;

    if saw_restriction {
        let mut tc = TypeConstraint::new(base.clone());
        tc.restrictions = restrictions;
        builder.type_constraints.insert(attr_name.clone(), tc);
    } else if let Some(type_ref) = &type_ref {
        base = strip_xs_prefix(type_ref).to_string();
        builder
            .type_constraints
            .insert(attr_name.clone(), TypeConstraint::new(base.clone()));
    } else {
        builder
            .type_constraints
            .insert(attr_name.clone(), TypeConstraint::new("string"));
    }

    Ok((attr_name, base, required))
}

/// Reads an already-opened `simpleType`'s `xs:restriction`, returning
/// `(base_type, facets, found_restriction)`.
fn read_simple_type_restriction(
    it: &mut Iter<'_>,
) -> Result<(String, IndexMap<String, String>, bool), String> {
    let end = xml::skip_attrs(it)?;
    if matches!(end, ElementEnd::Empty) {
        return Ok((String::new(), IndexMap::new(), false));
    }

    let mut base = String::new();
    let mut restrictions = IndexMap::new();
    let mut found = false;

    xml::walk_children(
        it,
        "simpleType",
        |_prefix, local, sub| {
            if local == "restriction" {
                found = true;
                let (attrs, end) = xml::collect_attrs(sub)?;
                base = attrs
                    .iter()
                    .find(|(k, _)| *k == "base")
                    .map(|(_, v)| strip_xs_prefix(v).to_string())
                    .unwrap_or_else(|| "string".to_string());
                if !matches!(end, ElementEnd::Empty) {
                    xml::walk_children(
                        sub,
                        "restriction",
                        |_facet_prefix, facet, facet_it| {
                            let (fattrs, fend) = xml::collect_attrs(facet_it)?;
                            if let Some((_, v)) = fattrs.iter().find(|(k, _)| *k == "value") {
                                restrictions.insert(facet.to_string(), v.to_string());
                            }
                            if !matches!(fend, ElementEnd::Empty) {
                                skip_element_body(facet_it)?;
                            }
                            Ok(())
                        },
                        |_| {},
                    )?;
                }
            } else {
                skip_element(sub)?;
            }
            Ok(())
        },
        |_| {},
    )?;

    Ok((base, restrictions, found))
}

fn process_simple_content(
    it: &mut Iter<'_>,
    element_name: &str,
    builder: &mut GrammarBuilder,
) -> Result<(), String> {
    let end = xml::skip_attrs(it)?;
    if matches!(end, ElementEnd::Empty) {
        return Ok(());
    }
    xml::walk_children(
        it,
        "simpleContent",
        |_prefix, local, sub| {
            if local == "extension" {
                let (attrs, eend) = xml::collect_attrs(sub)?;
                let base = attrs
                    .iter()
                    .find(|(k, _)| *k == "base")
                    .map(|(_, v)| strip_xs_prefix(v).to_string())
                    .unwrap_or_else(|| "string".to_string());
                builder
                    .type_constraints
                    .insert(element_name.to_string(), TypeConstraint::new(base));
                if !matches!(eend, ElementEnd::Empty) {
                    skip_element_body(sub)?;
                }
            } else {
                skip_element(sub)?;
            }
            Ok(())
        },
        |_| {},
    )
}

/// `simpleType`'s start tag not yet consumed.
fn process_simple_type_tag(
    it: &mut Iter<'_>,
    element_name: &str,
    cardinality: Cardinality,
    builder: &mut GrammarBuilder,
) -> Result<(), SchemaError> {
    let end = xml::skip_attrs(it).map_err(SchemaError::Malformed)?;
    if matches!(end, ElementEnd::Empty) {
        return Ok(());
    }
    process_simple_type_tokens(it, element_name, cardinality, builder)
}

fn process_simple_type_tokens(
    it: &mut Iter<'_>,
    element_name: &str,
    cardinality: Cardinality,
    builder: &mut GrammarBuilder,
) -> Result<(), SchemaError> {
    let (base, restrictions, found) =
        read_simple_type_restriction(it).map_err(SchemaError::Malformed)?;
    if !found {
        return Ok(());
    }

    let mut tc = TypeConstraint::new(base.clone());
    tc.restrictions = restrictions;
    builder.type_constraints.insert(element_name.to_string(), tc);

    builder.productions.push(Production {
        lhs: element_name.to_string(),
        rhs: vec![base],
        kind: ContentKind::Sequence,
        cardinality,
    });

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
