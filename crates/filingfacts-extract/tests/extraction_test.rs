//! Integration tests for document extraction

use filingfacts_extract::{
    ExtractError, ExtractionConfig, Extractor, FilingCategory, PeriodKey, RawDocument,
    ReportingUnit, ScalingPolicy, TargetConcept,
};
use rstest::{fixture, rstest};

#[fixture]
fn extractor() -> Extractor {
    Extractor::with_default_config().unwrap()
}

/// A cut-down 10-Q inside its EDGAR submission envelope.
const QUARTERLY_SUBMISSION: &str = r#"<SEC-DOCUMENT>0000950170-23-014423.txt : 20230425
<SEC-HEADER>0000950170-23-014423.hdr.sgml : 20230425
ACCESSION NUMBER:		0000950170-23-014423
CONFORMED SUBMISSION TYPE:	10-Q
CONFORMED PERIOD OF REPORT:	20230331
</SEC-HEADER>
<DOCUMENT>
<TYPE>10-Q
<SEQUENCE>1
<TEXT>
<html><body>
<p style="text-align:center">UNITED STATES SECURITIES AND EXCHANGE COMMISSION</p>
<p style="text-align:center"><b>FORM 10-Q</b></p>
<p>For the Quarter Ended <span>March&#160;31, 2023</span></p>
<p>(In millions, except per share amounts)</p>
<table>
  <tr><td></td><td colspan="2">Three Months Ended March 31,</td></tr>
  <tr><td>Product</td><td>$</td><td>12,000</td></tr>
  <tr><td>Service and other</td><td></td><td>8,000</td></tr>
  <tr><td><b>Total revenue</b></td><td>$</td><td>20,000</td></tr>
  <tr><td>Cost of revenue</td><td></td><td>6,000</td></tr>
  <tr><td>Net income</td><td>$</td><td>(1,500</td><td>)</td></tr>
  <tr><td>Net income per share</td><td>$</td><td>(0.20</td><td>)</td></tr>
</table>
<table>
  <tr><td>Total current assets</td><td>40,000</td></tr>
  <tr><td>Total assets</td><td>$</td><td>90,000</td></tr>
  <tr><td>Total current liabilities</td><td>10,000</td></tr>
  <tr><td>Total liabilities</td><td>35,000</td></tr>
  <tr><td>Total stockholders&#8217; equity</td><td>55,000</td></tr>
  <tr><td>Total liabilities and stockholders&#8217; equity</td><td>$</td><td>90,000</td></tr>
</table>
</body></html>
</TEXT>
</DOCUMENT>
</SEC-DOCUMENT>
"#;

#[rstest]
fn test_full_submission(extractor: Extractor) {
    let doc = RawDocument::new(
        "ACME",
        FilingCategory::Quarterly,
        "0000950170-23-014423",
        QUARTERLY_SUBMISSION,
    );
    let fact = extractor.extract(&doc).unwrap();

    assert_eq!(fact.company_id(), "ACME");
    assert_eq!(fact.category(), FilingCategory::Quarterly);
    assert_eq!(fact.document_id(), "0000950170-23-014423");
    assert_eq!(fact.period_key().to_string(), "1Q2023");

    assert_eq!(fact.value(TargetConcept::TotalRevenue), Some(20_000_000_000));
    assert_eq!(fact.value(TargetConcept::NetIncome), Some(-1_500_000_000));
    assert_eq!(fact.value(TargetConcept::TotalAssets), Some(90_000_000_000));
    assert_eq!(fact.value(TargetConcept::TotalLiabilities), Some(35_000_000_000));
    assert_eq!(
        fact.value(TargetConcept::TotalStockholdersEquity),
        Some(55_000_000_000)
    );
    assert_eq!(fact.found_count(), 5);
}

#[rstest]
fn test_quarterly_revenue_in_millions(extractor: Extractor) {
    let doc = RawDocument::new(
        "MSFT",
        FilingCategory::Quarterly,
        "0000950170-23-014423",
        "<html><body><p>For the Quarter Ended March 31, 2023</p>
         <table><tr><td>Total Revenues</td><td>$1,234</td></tr></table></body></html>",
    );
    let fact = extractor.extract(&doc).unwrap();

    assert_eq!(
        fact.period_key(),
        PeriodKey::Quarterly {
            quarter: 1,
            year: 2023
        }
    );
    assert_eq!(fact.value(TargetConcept::TotalRevenue), Some(1_234_000_000));
    assert_eq!(fact.value(TargetConcept::NetIncome), None);
    assert_eq!(fact.value(TargetConcept::TotalAssets), None);
}

#[rstest]
fn test_first_match_wins_across_tables(extractor: Extractor) {
    let doc = RawDocument::new(
        "ACME",
        FilingCategory::Annual,
        "doc-1",
        "<p>For the Fiscal Year Ended December 31, 2022</p>
         <table><tr><td>Total assets</td><td>100</td></tr></table>
         <table><tr><td>Total assets</td><td>999</td></tr></table>",
    );
    let fact = extractor.extract(&doc).unwrap();

    assert_eq!(fact.period_key(), PeriodKey::Annual { year: 2022 });
    assert_eq!(fact.value(TargetConcept::TotalAssets), Some(100_000_000));
}

#[rstest]
fn test_missing_concepts_are_absent_not_errors(extractor: Extractor) {
    let doc = RawDocument::new(
        "ACME",
        FilingCategory::Annual,
        "doc-2",
        "<p>For the Fiscal Year Ended December 31, 2022</p>
         <table><tr><td>Total revenue</td><td>500</td></tr></table>",
    );
    let fact = extractor.extract(&doc).unwrap();

    assert_eq!(fact.value(TargetConcept::TotalRevenue), Some(500_000_000));
    assert_eq!(fact.value(TargetConcept::NetIncome), None);
    assert_eq!(fact.found_count(), 1);
    assert_eq!(fact.values().count(), TargetConcept::ALL.len());
}

#[rstest]
fn test_document_without_tables(extractor: Extractor) {
    let doc = RawDocument::new(
        "ACME",
        FilingCategory::Annual,
        "doc-3",
        "<html><body><p>For the Fiscal Year Ended December 31, 2022</p></body></html>",
    );
    let fact = extractor.extract(&doc).unwrap();

    assert_eq!(fact.found_count(), 0);
    assert_eq!(fact.period_key(), PeriodKey::Annual { year: 2022 });
}

#[rstest]
fn test_missing_anchor_falls_back_to_conformed_period(extractor: Extractor) {
    let submission = QUARTERLY_SUBMISSION.replace("For the Quarter Ended", "Quarter summary");
    let doc = RawDocument::new("ACME", FilingCategory::Quarterly, "doc-4", submission);
    let fact = extractor.extract(&doc).unwrap();

    assert_eq!(fact.period_key().to_string(), "1Q2023");
}

#[rstest]
fn test_unresolvable_period_is_unknown(extractor: Extractor) {
    let doc = RawDocument::new(
        "ACME",
        FilingCategory::Quarterly,
        "doc-5",
        "<html><body><table><tr><td>Total assets</td><td>1</td></tr></table></body></html>",
    );
    let fact = extractor.extract(&doc).unwrap();

    assert_eq!(fact.period_key(), PeriodKey::Unknown);
    assert!(!fact.period_key().is_resolved());
    assert_eq!(fact.value(TargetConcept::TotalAssets), Some(1_000_000));
}

#[rstest]
#[case::empty("")]
#[case::plain_text("This is not a filing at all")]
#[case::truncated("<SEC-DOCUMENT><DOCUMENT><TYPE>10-K<TEXT><html><body><table><tr><td>Total ass")]
fn test_unparseable_documents(extractor: Extractor, #[case] content: &str) {
    let doc = RawDocument::new("ACME", FilingCategory::Annual, "broken", content);
    let err = extractor.extract(&doc).unwrap_err();

    assert!(matches!(err, ExtractError::Parse { ref document_id, .. } if document_id == "broken"));
}

#[rstest]
fn test_binary_content_is_parse_error(extractor: Extractor) {
    let bytes: Vec<u8> = (0..8192u32).map(|i| (i.wrapping_mul(2_654_435_761) >> 24) as u8).collect();
    let doc = RawDocument::new("ACME", FilingCategory::Annual, "binary", bytes);

    assert!(extractor.extract(&doc).unwrap_err().is_parse());
}

#[test]
fn test_stated_scaling_reads_document_unit() {
    let config = ExtractionConfig {
        scaling: ScalingPolicy::Stated {
            fallback: ReportingUnit::Millions,
        },
        ..ExtractionConfig::default()
    };
    let extractor = Extractor::new(&config).unwrap();

    let thousands = RawDocument::new(
        "ACME",
        FilingCategory::Annual,
        "doc-6",
        "<p>(Dollars in thousands)</p><table><tr><td>Total assets</td><td>2,500</td></tr></table>",
    );
    let fact = extractor.extract(&thousands).unwrap();
    assert_eq!(fact.value(TargetConcept::TotalAssets), Some(2_500_000));

    let unstated = RawDocument::new(
        "ACME",
        FilingCategory::Annual,
        "doc-7",
        "<table><tr><td>Total assets</td><td>2,500</td></tr></table>",
    );
    let fact = extractor.extract(&unstated).unwrap();
    assert_eq!(fact.value(TargetConcept::TotalAssets), Some(2_500_000_000));
}

#[rstest]
fn test_extraction_is_deterministic(extractor: Extractor) {
    let doc = RawDocument::new(
        "ACME",
        FilingCategory::Quarterly,
        "0000950170-23-014423",
        QUARTERLY_SUBMISSION,
    );

    assert_eq!(extractor.extract(&doc).unwrap(), extractor.extract(&doc).unwrap());
}
