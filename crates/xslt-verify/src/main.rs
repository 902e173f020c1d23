//! # xslt-verify CLI
//!
//! Command-line front end for the verification pipeline.
//!
//! ## Main workflow
//!
//! ```bash
//! # Full pipeline: subset check, MTT compilation, type + validity proof
//! xslt-verify validate --source-xsd src.xsd --target-xsd tgt.xsd --xslt t.xsl
//!
//! # Individual stages
//! xslt-verify check-subset --xslt t.xsl
//! xslt-verify parse-xsd --xsd src.xsd
//! xslt-verify convert-to-mtt --xslt t.xsl
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use xslt_verify::pipeline::{self, ValidateRequest};
use xslt_verify::render;
use xslt_verify::{grammar, mtt, subset};

/// xslt-verify - static schema-validity verification for a restricted XSLT subset
#[derive(Parser)]
#[command(name = "xslt-verify")]
#[command(author = "XSLT-VERIFY Project")]
#[command(version)]
#[command(about = "Verifies that an XSLT transformation preserves XSD schema validity")]
#[command(long_about = r#"
xslt-verify decides, for a restricted fragment of XSLT, whether every
document accepted by a source schema is transformed into a document
accepted by a target schema: L(Source) ⊆ pre_M(L(Target)).

Pipeline:
  1. Subset check        → reject transformations outside the decidable fragment
  2. Schema compilation   → XSD becomes a tree grammar
  3. MTT compilation      → XSLT becomes a macro tree transducer
  4. Preimage analysis    → which input patterns the MTT's rules accept
  5. Type preservation    → structural, type and cardinality proof trace
  6. Validity check       → is every source production covered?

Example:
  xslt-verify validate --source-xsd person.xsd --target-xsd individual.xsd --xslt person-to-individual.xsl
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the full pipeline (C1-C6) and prints a proof summary
    Validate {
        /// Path to the source XSD
        #[arg(long)]
        source_xsd: PathBuf,

        /// Path to the target XSD
        #[arg(long)]
        target_xsd: PathBuf,

        /// Path to the XSLT stylesheet
        #[arg(long)]
        xslt: PathBuf,
    },

    /// Checks a stylesheet against the supported XSLT subset (C2 only)
    CheckSubset {
        /// Path to the XSLT stylesheet
        #[arg(long)]
        xslt: PathBuf,
    },

    /// Parses an XSD into a tree grammar and prints its productions (C1 only)
    ParseXsd {
        /// Path to the XSD
        #[arg(long)]
        xsd: PathBuf,
    },

    /// Compiles a stylesheet to a macro tree transducer (C3 only)
    ConvertToMtt {
        /// Path to the XSLT stylesheet
        #[arg(long)]
        xslt: PathBuf,
    },

    /// Reports liveness and version
    Health,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            source_xsd,
            target_xsd,
            xslt,
        } => cmd_validate(&source_xsd, &target_xsd, &xslt),

        Commands::CheckSubset { xslt } => cmd_check_subset(&xslt),

        Commands::ParseXsd { xsd } => cmd_parse_xsd(&xsd),

        Commands::ConvertToMtt { xslt } => cmd_convert_to_mtt(&xslt),

        Commands::Health => cmd_health(),
    }
}

/// Runs the full pipeline and prints the subset, preimage and validation
/// reports, then the final verdict.
fn cmd_validate(source_xsd: &PathBuf, target_xsd: &PathBuf, xslt: &PathBuf) -> Result<()> {
    println!("┌─────────────────────────────────────────");
    println!("│ xslt-verify validate");
    println!("├─────────────────────────────────────────");
    println!("│ Source XSD: {}", source_xsd.display());
    println!("│ Target XSD: {}", target_xsd.display());
    println!("│ XSLT:       {}", xslt.display());
    println!("└─────────────────────────────────────────");

    let req = ValidateRequest {
        source_xsd: std::fs::read_to_string(source_xsd).context("Could not read source XSD")?,
        target_xsd: std::fs::read_to_string(target_xsd).context("Could not read target XSD")?,
        xslt: std::fs::read_to_string(xslt).context("Could not read XSLT stylesheet")?,
    };

    let report = pipeline::validate(&req).context("Pipeline failed")?;

    if !report.subset.is_valid {
        println!("✗ Subset check failed:");
        for issue in &report.subset.errors {
            println!("  ERROR [{}]: {}", issue.path, issue.message);
        }
        anyhow::bail!("stylesheet uses constructs outside the decidable fragment");
    }

    if let Some(preimage) = &report.preimage {
        println!("{}", render::render_preimage(preimage));
    }
    if let Some(validation) = &report.validation {
        println!("{}", render::render_validation(validation));
    }
    if let Some(validity) = &report.validity {
        println!(
            "Validity: {} ({}/{} patterns covered, {:.1}%)",
            if validity.is_valid { "VALID" } else { "INVALID" },
            validity.covered.len(),
            validity.covered.len() + validity.counterexamples.len(),
            validity.coverage_percent
        );
        for ce in &validity.counterexamples {
            println!("  ✗ {}: {}", ce.production.lhs, ce.explanation);
        }
    }

    println!(
        "\n{}",
        if report.is_valid {
            "✓ L(Source) ⊆ pre_M(L(Target)) holds"
        } else {
            "✗ L(Source) ⊆ pre_M(L(Target)) does not hold"
        }
    );

    if !report.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

/// Checks a stylesheet against the supported XSLT subset.
fn cmd_check_subset(xslt: &PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(xslt).context("Could not read XSLT stylesheet")?;
    let report = subset::check_subset(&text).context("Subset check failed")?;

    println!(
        "Subset check: {}",
        if report.is_valid { "VALID" } else { "INVALID" }
    );
    for issue in &report.errors {
        println!("  ERROR [{}]: {}", issue.path, issue.message);
    }
    for issue in &report.warnings {
        println!("  WARNING [{}]: {}", issue.path, issue.message);
    }

    if !report.is_valid {
        std::process::exit(1);
    }
    Ok(())
}

/// Parses an XSD into a tree grammar and prints its productions.
fn cmd_parse_xsd(xsd: &PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(xsd).context("Could not read XSD")?;
    let grammar = grammar::parse_xsd(&text).context("Error parsing XSD")?;

    println!("Root: {}", grammar.root);
    println!("Productions:");
    for prod in &grammar.productions {
        println!(
            "  {} -> {} [{:?}, {}..{}]",
            prod.lhs,
            prod.rhs.join(" "),
            prod.kind,
            prod.cardinality.0,
            if prod.cardinality.1 < 0 {
                "unbounded".to_string()
            } else {
                prod.cardinality.1.to_string()
            }
        );
    }
    if !grammar.type_constraints.is_empty() {
        println!("Type constraints:");
        for (name, tc) in &grammar.type_constraints {
            println!("  {name}: {} {:?}", tc.base_type, tc.restrictions);
        }
    }
    Ok(())
}

/// Compiles a stylesheet to an MTT and prints its states and rules.
fn cmd_convert_to_mtt(xslt: &PathBuf) -> Result<()> {
    let text = std::fs::read_to_string(xslt).context("Could not read XSLT stylesheet")?;
    let mtt = mtt::compile_to_mtt(&text).context("Error converting XSLT to MTT")?;

    println!("Initial state: {}", mtt.root_state);
    println!("States: {}", mtt.states.join(", "));
    println!("Rules:");
    for rule in &mtt.rules {
        println!(
            "  state={} lhs={} guard={}",
            rule.state,
            rule.lhs_pattern,
            rule.guard.as_deref().unwrap_or("(none)")
        );
    }
    Ok(())
}

/// Reports liveness and version.
fn cmd_health() -> Result<()> {
    let status = pipeline::health();
    println!("status: {}", status.status);
    println!("version: {}", status.version);
    Ok(())
}
