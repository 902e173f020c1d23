//! # End-to-end pipeline scenarios — regression guards
//!
//! Each test below is one of the scenarios named in the specification's
//! testable-properties section: a fixed (source schema, target schema,
//! stylesheet) triple with an expected verdict. If a future change to any
//! stage silently alters the verdict for one of these fixtures, these tests
//! fail immediately.
//!
//! ```text
//! GROUP 1: library-level scenarios (pipeline::validate)
//! GROUP 2: CLI exit codes (xslt-verify validate / check-subset)
//! ```

use xslt_verify::pipeline::{self, ValidateRequest};

fn req(source_xsd: &str, target_xsd: &str, xslt: &str) -> ValidateRequest {
    ValidateRequest {
        source_xsd: source_xsd.to_string(),
        target_xsd: target_xsd.to_string(),
        xslt: xslt.to_string(),
    }
}

// ============================================================================
// GROUP 1: library-level scenarios
// ============================================================================

/// S1 — Person -> Individual, accepted.
#[test]
fn s1_accepted_person_to_individual() {
    let source = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Person">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Name" type="xs:string"/>
        <xs:element name="Age" type="xs:integer"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    let target = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Individual">
    <xs:complexType>
      <xs:attribute name="fullname" type="xs:string" use="required"/>
      <xs:attribute name="years" type="xs:integer" use="required"/>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Person">
    <xsl:if test="Age &gt;= 0">
      <Individual fullname="{Name}" years="{Age}"/>
    </xsl:if>
  </xsl:template>
</xsl:stylesheet>"#;

    let report = pipeline::validate(&req(source, target, xslt)).unwrap();

    assert!(report.subset.is_valid);
    let mtt = report.mtt.as_ref().unwrap();
    assert!(mtt.states.len() >= 1);
    assert_eq!(mtt.rules.len(), 1);

    let preimage = report.preimage.as_ref().unwrap();
    let person_entry = preimage
        .entries
        .iter()
        .find(|e| e.pattern.element == "Person")
        .expect("rule should match Person");
    assert!(person_entry.accepted);
    assert_eq!(person_entry.root_element.as_deref(), Some("Individual"));
    assert!(person_entry.pattern.guards.iter().any(|g| g.contains("Age")));

    let validity = report.validity.as_ref().unwrap();
    assert!(validity.is_valid);
    assert_eq!(validity.covered.len(), 1);
}

/// S2 — subset violation (`xsl:copy-of`) halts the pipeline before C3.
#[test]
fn s2_subset_violation_halts_pipeline() {
    let source = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Person" type="xs:string"/>
</xs:schema>"#;
    let target = source;
    let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Person">
    <xsl:copy-of select="."/>
  </xsl:template>
</xsl:stylesheet>"#;

    let report = pipeline::validate(&req(source, target, xslt)).unwrap();

    assert!(!report.subset.is_valid);
    assert!(report
        .subset
        .errors
        .iter()
        .any(|e| e.message.contains("copy-of")));
    assert!(report.mtt.is_none());
    assert!(report.preimage.is_none());
    assert!(report.validation.is_none());
    assert!(report.validity.is_none());
}

/// S3 — missing root rule is a structural error.
#[test]
fn s3_missing_root_rule_is_an_error() {
    let source = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Root">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Leaf" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;
    let target = source;
    let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Leaf">
    <Leaf/>
  </xsl:template>
</xsl:stylesheet>"#;

    let report = pipeline::validate(&req(source, target, xslt)).unwrap();
    let validation = report.validation.as_ref().unwrap();
    assert!(!validation.is_valid());
    assert!(validation
        .errors
        .iter()
        .any(|e| e.contains("No transformation rule for root element 'Root'")));
}

/// S4 — cardinality collapse (many -> one) is a warning, not an error.
#[test]
fn s4_cardinality_collapse_is_a_warning_not_an_error() {
    let source = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Items">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Item" type="xs:string" minOccurs="0" maxOccurs="unbounded"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    let target = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Items">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Item" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Items">
    <Items>
      <Item><xsl:value-of select="Item"/></Item>
    </Items>
  </xsl:template>
</xsl:stylesheet>"#;

    let report = pipeline::validate(&req(source, target, xslt)).unwrap();
    let validation = report.validation.as_ref().unwrap();
    assert!(validation.is_valid());
    assert!(validation
        .warnings
        .iter()
        .any(|w| w.to_lowercase().contains("cardinality")));
}

/// S5 — a literal output element absent from the target grammar is an
/// uncovered preimage rule and a validity-checker counterexample.
#[test]
fn s5_unknown_target_element_is_uncovered() {
    let source = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Person">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Name" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    let target = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Individual">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="FullName" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#;

    let xslt = r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Person">
    <Alien/>
  </xsl:template>
</xsl:stylesheet>"#;

    let report = pipeline::validate(&req(source, target, xslt)).unwrap();

    let preimage = report.preimage.as_ref().unwrap();
    let entry = &preimage.entries[0];
    assert!(!entry.accepted);
    assert!(entry.reason.contains("not found in target grammar"));

    let validity = report.validity.as_ref().unwrap();
    assert!(!validity.is_valid);
    assert_eq!(validity.counterexamples.len(), 1);
    assert_eq!(validity.counterexamples[0].production.lhs, "Person");
}

/// S6 — a malformed source schema is a parse error, surfaced distinctly
/// from a malformed target schema.
#[test]
fn s6_malformed_source_schema_is_a_parse_error() {
    use xslt_verify::error::VerifyError;

    let report = pipeline::validate(&req(
        "<not xml",
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema"/>"#,
        r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform"/>"#,
    ));

    assert!(matches!(report, Err(VerifyError::SourceSchema(_))));
}

// ============================================================================
// GROUP 2: CLI exit codes
// ============================================================================

fn cli() -> std::process::Command {
    std::process::Command::new(env!("CARGO_BIN_EXE_xslt-verify"))
}

fn write_fixture(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// `validate` exits 0 and prints the affirming verdict for a valid
/// transformation.
#[test]
fn cli_validate_exits_zero_for_a_valid_transformation() {
    let dir = tempfile::tempdir().unwrap();
    let source = write_fixture(
        &dir,
        "source.xsd",
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Person">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="Name" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#,
    );
    let target = write_fixture(
        &dir,
        "target.xsd",
        r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
  <xs:element name="Individual">
    <xs:complexType>
      <xs:sequence>
        <xs:element name="FullName" type="xs:string"/>
      </xs:sequence>
    </xs:complexType>
  </xs:element>
</xs:schema>"#,
    );
    let xslt = write_fixture(
        &dir,
        "transform.xsl",
        r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Person">
    <Individual>
      <xsl:value-of select="Name"/>
    </Individual>
  </xsl:template>
</xsl:stylesheet>"#,
    );

    let output = cli()
        .arg("validate")
        .arg("--source-xsd")
        .arg(&source)
        .arg("--target-xsd")
        .arg(&target)
        .arg("--xslt")
        .arg(&xslt)
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(String::from_utf8_lossy(&output.stdout).contains("holds"));
}

/// `check-subset` exits non-zero and reports the disallowed instruction
/// when the stylesheet uses a denied construct.
#[test]
fn cli_check_subset_exits_nonzero_for_a_denied_instruction() {
    let dir = tempfile::tempdir().unwrap();
    let xslt = write_fixture(
        &dir,
        "transform.xsl",
        r#"<xsl:stylesheet xmlns:xsl="http://www.w3.org/1999/XSL/Transform">
  <xsl:template match="Person">
    <xsl:call-template name="nope"/>
  </xsl:template>
</xsl:stylesheet>"#,
    );

    let output = cli().arg("check-subset").arg("--xslt").arg(&xslt).output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("call-template"));
}

/// `parse-xsd` exits non-zero with a descriptive error on malformed XML.
#[test]
fn cli_parse_xsd_reports_malformed_schema() {
    let dir = tempfile::tempdir().unwrap();
    let xsd = write_fixture(&dir, "broken.xsd", "<not xml");

    let output = cli().arg("parse-xsd").arg("--xsd").arg(&xsd).output().unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error parsing XSD"));
}

/// `health` always exits 0 and reports the crate version.
#[test]
fn cli_health_reports_ok() {
    let output = cli().arg("health").output().unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("status: ok"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}
