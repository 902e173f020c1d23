//! Shared XML tokenizing helpers.
//!
//! Both the XSD schema parser and the XSLT subset checker/compiler walk a
//! document as a flat token stream rather than building a DOM tree. This
//! module wraps [`xmlparser::Tokenizer`] in an iterator that skips the token
//! kinds neither parser cares about (declarations, processing instructions,
//! comments, DTD fragments), and provides a couple of small recursive-descent
//! primitives used by both callers.

use xmlparser::{ElementEnd, Token, Tokenizer};

/// Iterates only the tokens relevant to element/attribute/text structure.
pub struct Iter<'a>(Tokenizer<'a>);

impl<'a> Iter<'a> {
    pub fn new(src: &'a str) -> Self {
        Iter(Tokenizer::from(src))
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = <Tokenizer<'a> as Iterator>::Item;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.find(|token| match token {
            Err(_) => true,
            Ok(Token::ElementStart { .. }) => true,
            Ok(Token::Attribute { .. }) => true,
            Ok(Token::ElementEnd { .. }) => true,
            Ok(Token::Text { .. }) => true,
            Ok(Token::Cdata { .. }) => true,
            Ok(Token::Declaration { .. }) => false,
            Ok(Token::ProcessingInstruction { .. }) => false,
            Ok(Token::Comment { .. }) => false,
            Ok(Token::DtdStart { .. }) => false,
            Ok(Token::DtdEnd { .. }) => false,
            Ok(Token::EmptyDtd { .. }) => false,
            Ok(Token::EntityDeclaration { .. }) => false,
        })
    }
}

/// Splits a (possibly namespace-prefixed) tag or attribute name into its
/// local name, discarding the prefix. `xs:element` → `element`.
pub fn local_name(name: &str) -> &str {
    match name.rsplit_once(':') {
        Some((_, local)) => local,
        None => name,
    }
}

/// Consumes attribute tokens until the element's start tag closes, returning
/// the collected `(name, value)` pairs and the [`ElementEnd`] that closed it.
pub fn collect_attrs<'a>(
    it: &mut Iter<'a>,
) -> Result<(Vec<(&'a str, &'a str)>, ElementEnd<'a>), String> {
    let mut attrs = Vec::new();
    loop {
        match it.next() {
            Some(Ok(Token::Attribute { local, value, .. })) => {
                attrs.push((local.as_str(), value.as_str()));
            }
            Some(Ok(Token::ElementEnd { end, .. })) => return Ok((attrs, end)),
            Some(Err(e)) => return Err(e.to_string()),
            Some(Ok(_)) => continue,
            None => return Err("unexpected end of document while reading attributes".into()),
        }
    }
}

/// Drains attribute tokens for the current start tag without collecting
/// them, returning only the [`ElementEnd`].
pub fn skip_attrs<'a>(it: &mut Iter<'a>) -> Result<ElementEnd<'a>, String> {
    collect_attrs(it).map(|(_, end)| end)
}

/// Walks the children of an already-opened element until its matching close
/// tag, invoking `on_child(prefix, local_name, attrs, iter)` for each child
/// element start and `on_text(text)` for each non-blank text run. `prefix` is
/// the empty string for an unprefixed element.
///
/// `end_tag` is the local name of the element whose close tag terminates the
/// walk (used only for error messages).
pub fn walk_children<'a>(
    it: &mut Iter<'a>,
    end_tag: &str,
    mut on_start: impl FnMut(&'a str, &'a str, &mut Iter<'a>) -> Result<(), String>,
    mut on_text: impl FnMut(&'a str),
) -> Result<(), String> {
    loop {
        match it.next() {
            Some(Ok(Token::ElementStart { prefix, local, .. })) => {
                on_start(prefix.as_str(), local.as_str(), it)?;
            }
            Some(Ok(Token::Text { text })) => {
                let t = text.as_str();
                if !t.trim().is_empty() {
                    on_text(t);
                }
            }
            Some(Ok(Token::ElementEnd {
                end: ElementEnd::Close(_, _),
                ..
            })) => return Ok(()),
            Some(Ok(Token::ElementEnd {
                end: ElementEnd::Empty,
                ..
            })) => continue,
            Some(Err(e)) => return Err(e.to_string()),
            Some(Ok(_)) => continue,
            None => {
                return Err(format!(
                    "unexpected end of document while reading children of '{end_tag}'"
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_namespace_prefix() {
        assert_eq!(local_name("xs:element"), "element");
        assert_eq!(local_name("xsl:value-of"), "value-of");
        assert_eq!(local_name("Person"), "Person");
    }

    #[test]
    fn iter_skips_comments_and_declarations() {
        let src = "<?xml version=\"1.0\"?><!-- hi --><a>text</a>";
        let mut it = Iter::new(src);
        match it.next() {
            Some(Ok(Token::ElementStart { local, .. })) => assert_eq!(local.as_str(), "a"),
            other => panic!("expected ElementStart, got {other:?}"),
        }
    }
}
