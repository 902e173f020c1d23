//! # xslt-verify
//!
//! Static verification that a restricted XSLT-subset transformation
//! preserves XSD schema validity: for every document accepted by a source
//! schema, is the transformed output guaranteed to be accepted by a target
//! schema? Answers `L(S) ⊆ pre_M(L(T))` where `M` is the transformation
//! compiled to a macro tree transducer (MTT).
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                          XSLT-VERIFY PIPELINE                               │
//! ├─────────────────────────────────────────────────────────────────────────────┤
//! │                                                                             │
//! │   source.xsd ──► grammar::parse_xsd ──► TreeGrammar (G_S)                  │
//! │   target.xsd ──► grammar::parse_xsd ──► TreeGrammar (G_T)                  │
//! │   stylesheet ──► subset::check_subset ──► SubsetReport (gate)              │
//! │                        │ ok                                                │
//! │                        ▼                                                   │
//! │              mtt::compile_to_mtt ──► Mtt (M)                               │
//! │                        │                                                   │
//! │           ┌────────────┼─────────────────┐                                 │
//! │           ▼            ▼                 ▼                                 │
//! │   preimage::compute_preimage   validator::validate                         │
//! │   (G_T, M) -> PreimageReport   (G_S, G_T, M) -> ValidationResult           │
//! │           │                                                                │
//! │           ▼                                                                │
//! │   validity::check_validity (G_S, preimage) -> ValidityReport               │
//! │                                                                             │
//! │   pipeline::validate aggregates all of the above into one PipelineReport   │
//! │                                                                             │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use xslt_verify::prelude::*;
//!
//! let source_xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
//!   <xs:element name="Person">
//!     <xs:complexType>
//!       <xs:sequence>
//!         <xs:element name="Name" type="xs:string"/>
//!       </xs:sequence>
//!     </xs:complexType>
//!   </xs:element>
//! </xs:schema>"#;
//!
//! let target_xsd = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
//!   <xs:element name="Individual">
//!     <xs:complexType>
//!       <xs:sequence>
//!         <xs:element name="FullName" type="xs:string"/>
//!       </xs:sequence>
//!     </xs:complexType>
//!   </xs:element>
//! </xs:schema>"#;
//!
//! let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
//!   <xsl:template match="Person">
//!     <Individual>
//!       <xsl:value-of select="Name"/>
//!     </Individual>
//!   </xsl:template>
//! </xsl:stylesheet>"#;
//!
//! let report = pipeline::validate(&pipeline::ValidateRequest {
//!     source_xsd: source_xsd.to_string(),
//!     target_xsd: target_xsd.to_string(),
//!     xslt: xslt.to_string(),
//! }).expect("pipeline stages should not fail on well-formed input");
//!
//! assert!(report.subset.is_valid);
//! ```

// ============================================================================
// MODULES
// ============================================================================

/// Shared XML tokenizing helpers used by the schema and transformation
/// parsers alike.
pub mod xml;

/// Tree grammar data model + XSD → tree grammar compiler (C1).
pub mod grammar;

/// Transformation subset checker (C2).
pub mod subset;

/// MTT data model + transformation → MTT compiler (C3).
pub mod mtt;

/// Preimage analyzer (C4).
pub mod preimage;

/// Type-preservation validator (C5).
pub mod validator;

/// Validity checker (C6).
pub mod validity;

/// Orchestrator, request/response types (C7).
pub mod pipeline;

/// Human-readable proof rendering for the CLI.
pub mod render;

/// Unified error types shared by every stage.
pub mod error;

// ============================================================================
// PRELUDE
// ============================================================================

/// Commonly used items for a single import.
///
/// ```rust
/// use xslt_verify::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{SchemaError, SubsetError, MttError, VerifyError, VerifyResult};
    pub use crate::grammar::{self, TreeGrammar};
    pub use crate::mtt::{self, Mtt};
    pub use crate::pipeline::{self, PipelineReport, ValidateRequest};
    pub use crate::preimage::{self, PreimageReport};
    pub use crate::subset::{self, SubsetReport};
    pub use crate::validator::{self, ValidationResult};
    pub use crate::validity::{self, ValidityReport};
}
