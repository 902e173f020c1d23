//! # Error Types
//!
//! Defines all errors that can occur across the verification pipeline.
//!
//! ## Architecture: Errors as Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                    ERROR HIERARCHY                                          │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                                                                             │
//! │                      VerifyError                                            │
//! │                           │                                                 │
//! │       ┌───────────────────┼───────────────────┬───────────────┐             │
//! │       │                   │                   │               │             │
//! │       ▼                   ▼                   ▼               ▼             │
//! │  SourceSchema        MttCompile          MissingField     Internal           │
//! │  TargetSchema        TypeValidation                                         │
//! │                                                                             │
//! │  PRINCIPLE: each pipeline stage owns a narrow error type; VerifyError       │
//! │             only unifies them at the boundary callers see.                 │
//! │                                                                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Why `thiserror`?
//!
//! `thiserror` automatically generates:
//! - `std::error::Error` implementation
//! - `Display` implementation (for error messages)
//! - `From` implementations (for `?` operator)

use thiserror::Error;

// ============================================================================
// MAIN ERROR TYPE
// ============================================================================

/// Top-level error for any stage of the pipeline.
///
/// ## Usage
///
/// ```rust,ignore
/// use xslt_verify::error::VerifyError;
///
/// fn run(source_xsd: &str) -> Result<(), VerifyError> {
///     let grammar = xslt_verify::grammar::parse_xsd(source_xsd)
///         .map_err(VerifyError::SourceSchema)?;
///     // ...
///     Ok(())
/// }
/// ```
#[derive(Error, Debug)]
pub enum VerifyError {
    /// The source XSD failed to parse.
    #[error("Error parsing source XSD: {0}")]
    SourceSchema(#[source] SchemaError),

    /// The target XSD failed to parse.
    #[error("Error parsing target XSD: {0}")]
    TargetSchema(#[source] SchemaError),

    /// The XSLT could not be checked against the supported subset.
    #[error("Error checking XSLT subset: {0}")]
    Subset(#[from] SubsetError),

    /// The XSLT failed to compile to an MTT.
    #[error("Error converting XSLT to MTT: {0}")]
    MttCompile(#[from] MttError),

    /// Type-preservation validation could not run to completion.
    #[error("Error validating type preservation: {0}")]
    TypeValidation(String),

    /// A required request field was absent or empty.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Anything that does not fit the other variants.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// ============================================================================
// STAGE-LOCAL ERRORS
// ============================================================================

/// Error raised while parsing an XSD document into a [`crate::grammar::TreeGrammar`].
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    /// The document is not well-formed XML, or not an `xs:schema` at all.
    #[error("Invalid XSD: {0}")]
    Malformed(String),

    /// The tokenizer ran out of input before a construct was closed.
    #[error("Unexpected end of document while parsing '{context}'")]
    UnexpectedEof { context: String },

    /// No top-level element declaration was found.
    #[error("Schema has no top-level element declarations")]
    NoRootElement,
}

/// Error raised while checking or compiling an XSLT-subset document.
#[derive(Error, Debug, Clone)]
pub enum MttError {
    /// The document is not well-formed XML.
    #[error("Invalid XSLT: {0}")]
    Malformed(String),

    /// The tokenizer ran out of input before a construct was closed.
    #[error("Unexpected end of document while parsing '{context}'")]
    UnexpectedEof { context: String },
}

/// Error raised by the subset checker itself (as distinct from the warnings
/// and errors it *collects*, which never halt the checker).
#[derive(Error, Debug, Clone)]
pub enum SubsetError {
    #[error("XML Parse Error: {0}")]
    Malformed(String),
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Convenient alias for pipeline operations.
///
/// ```rust,ignore
/// fn my_function() -> VerifyResult<()> {
///     // ...
/// }
/// ```
pub type VerifyResult<T> = Result<T, VerifyError>;

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_schema_error_wraps_message() {
        let e = VerifyError::SourceSchema(SchemaError::Malformed("unexpected token".into()));
        assert_eq!(
            e.to_string(),
            "Error parsing source XSD: Invalid XSD: unexpected token"
        );
    }

    #[test]
    fn missing_field_message() {
        let e = VerifyError::MissingField("xslt");
        assert_eq!(e.to_string(), "Missing required field: xslt");
    }

    #[test]
    fn mtt_error_converts_via_from() {
        let mtt_err = MttError::Malformed("bad template".into());
        let e: VerifyError = mtt_err.into();
        assert!(e.to_string().contains("Error converting XSLT to MTT"));
    }

    #[test]
    fn no_root_element_message() {
        let e = SchemaError::NoRootElement;
        assert_eq!(e.to_string(), "Schema has no top-level element declarations");
    }
}
