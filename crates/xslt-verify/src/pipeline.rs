//! # Orchestrator + request/response types (C7)
//!
//! Wires C1–C6 into the five operations this crate exposes: `validate`
//! (the full pipeline), `check-subset`, `parse-xsd`, `convert-to-mtt`, and
//! `health`. These are plain typed functions — see the design notes on why
//! this crate stops at that boundary rather than growing its own HTTP
//! listener.
//!
//! `validate` mirrors the reference implementation's stage order exactly:
//! parse both schemas, check the subset and short-circuit on failure
//! without attempting C3–C6 at all, then compile to an MTT and run the
//! preimage/type/validity passes in sequence. Each stage gets its own
//! `tracing` span so a `RUST_LOG=xslt_verify=debug` run shows where time
//! (or a rejection) came from.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{VerifyError, VerifyResult};
use crate::grammar::{self, TreeGrammar};
use crate::mtt::{self, Mtt};
use crate::preimage::{self, PreimageReport};
use crate::subset::{self, SubsetReport};
use crate::validator::{self, ValidationResult};
use crate::validity::{self, ValidityReport};

/// Input to [`validate`]: raw document text for every stage.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateRequest {
    pub source_xsd: String,
    pub target_xsd: String,
    pub xslt: String,
}

/// The full proof produced by [`validate`]. `mtt`/`preimage`/`validation`/
/// `validity` are `None` exactly when the subset check failed and the
/// later stages were never run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub is_valid: bool,
    pub subset: SubsetReport,
    pub source_grammar: Option<TreeGrammar>,
    pub target_grammar: Option<TreeGrammar>,
    pub mtt: Option<Mtt>,
    pub preimage: Option<PreimageReport>,
    pub validation: Option<ValidationResult>,
    pub validity: Option<ValidityReport>,
}

/// Runs the full verification pipeline: C1 (twice) → C2 → (short-circuit)
/// → C3 → C4 → C5 → C6.
#[instrument(skip_all)]
pub fn validate(req: &ValidateRequest) -> VerifyResult<PipelineReport> {
    let source_grammar = {
        let _span = tracing::debug_span!("parse_source_schema").entered();
        grammar::parse_xsd(&req.source_xsd).map_err(VerifyError::SourceSchema)?
    };
    let target_grammar = {
        let _span = tracing::debug_span!("parse_target_schema").entered();
        grammar::parse_xsd(&req.target_xsd).map_err(VerifyError::TargetSchema)?
    };

    let subset = {
        let _span = tracing::debug_span!("check_subset").entered();
        subset::check_subset(&req.xslt)?
    };

    if !subset.is_valid {
        tracing::info!(errors = subset.errors.len(), "subset check failed; stopping pipeline");
        return Ok(PipelineReport {
            is_valid: false,
            subset,
            source_grammar: Some(source_grammar),
            target_grammar: Some(target_grammar),
            mtt: None,
            preimage: None,
            validation: None,
            validity: None,
        });
    }

    let mtt = {
        let _span = tracing::debug_span!("compile_to_mtt").entered();
        mtt::compile_to_mtt(&req.xslt)?
    };

    let preimage = {
        let _span = tracing::debug_span!("compute_preimage").entered();
        preimage::compute_preimage(&mtt, &target_grammar)
    };

    let validation = {
        let _span = tracing::debug_span!("validate_type_preservation").entered();
        validator::validate(&source_grammar, &target_grammar, &mtt)
    };

    let validity = {
        let _span = tracing::debug_span!("check_validity").entered();
        validity::check_validity(&source_grammar, &preimage)
    };

    let is_valid = subset.is_valid && validation.is_valid() && validity.is_valid;
    tracing::info!(is_valid, "pipeline complete");

    Ok(PipelineReport {
        is_valid,
        subset,
        source_grammar: Some(source_grammar),
        target_grammar: Some(target_grammar),
        mtt: Some(mtt),
        preimage: Some(preimage),
        validation: Some(validation),
        validity: Some(validity),
    })
}

/// Runs only C2 over `xslt`.
pub fn check_subset(xslt: &str) -> VerifyResult<SubsetReport> {
    Ok(subset::check_subset(xslt)?)
}

/// Runs only C1 over `xsd`.
pub fn parse_xsd(xsd: &str) -> VerifyResult<TreeGrammar> {
    grammar::parse_xsd(xsd).map_err(VerifyError::SourceSchema)
}

/// Runs only C3 over `xslt`.
pub fn convert_to_mtt(xslt: &str) -> VerifyResult<Mtt> {
    Ok(mtt::compile_to_mtt(xslt)?)
}

/// Liveness/version probe.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub fn health() -> HealthStatus {
    HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    }
}

// ============================================================================
// TESTS
// ============================================================================
