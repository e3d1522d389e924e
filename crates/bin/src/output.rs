//! Rendering of reports, stored facts and store statistics.

use clap::ValueEnum;
use filingfacts::CompanyReport;
use filingfacts::data::StoreStats;
use filingfacts::extract::{NormalizedFact, TargetConcept};
use std::error::Error;
use std::io::Write;

/// Output format for stored facts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Print the per-document outcome of a processing run.
pub(crate) fn write_report<W: Write>(out: &mut W, report: &CompanyReport) -> std::io::Result<()> {
    for category in &report.categories {
        writeln!(out, "\n{} ({})", report.company_id, category.category)?;
        if let Some(error) = &category.fetch_error {
            writeln!(out, "  fetch failed: {}", error)?;
            continue;
        }
        if category.ingestion.documents.is_empty() {
            writeln!(out, "  no documents")?;
        }
        for line in &category.ingestion.documents {
            let period = line
                .period_key
                .map_or_else(|| "-".to_string(), |p| p.to_string());
            writeln!(out, "  {:24} {:>8}  {}", line.document_id, period, line.outcome)?;
        }
    }

    writeln!(
        out,
        "\n{} inserted, {} skipped, {} failed",
        report.inserted(),
        report.skipped(),
        report.failed()
    )
}

/// Print stored facts in the requested format.
pub(crate) fn write_facts<W: Write>(
    out: &mut W,
    facts: &[NormalizedFact],
    format: OutputFormat,
) -> Result<(), Box<dyn Error>> {
    match format {
        OutputFormat::Text => write_facts_text(out, facts)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, facts)?;
            writeln!(out)?;
        }
        OutputFormat::Csv => write_facts_csv(out, facts)?,
    }
    Ok(())
}

fn write_facts_text<W: Write>(out: &mut W, facts: &[NormalizedFact]) -> std::io::Result<()> {
    if facts.is_empty() {
        return writeln!(out, "No facts stored");
    }

    for fact in facts {
        writeln!(
            out,
            "{} {} {} ({})",
            fact.company_id(),
            fact.category(),
            fact.period_key(),
            fact.document_id()
        )?;
        for (concept, value) in fact.values() {
            let value = value.map_or_else(|| "n/a".to_string(), |v| v.to_string());
            writeln!(out, "  {:28} {:>20}", concept.display_name(), value)?;
        }
    }
    Ok(())
}

fn write_facts_csv<W: Write>(out: &mut W, facts: &[NormalizedFact]) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = vec!["company_id", "category", "period_key", "document_id"];
    header.extend(TargetConcept::ALL.iter().map(TargetConcept::as_str));
    writer.write_record(&header)?;

    for fact in facts {
        let mut record = vec![
            fact.company_id().to_string(),
            fact.category().to_string(),
            fact.period_key().to_string(),
            fact.document_id().to_string(),
        ];
        // Absent concepts are empty cells, distinct from a reported zero.
        record.extend(
            fact.values()
                .map(|(_, value)| value.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }

    writer.flush()?;
    Ok(())
}

/// Print fact store statistics.
pub(crate) fn write_stats<W: Write>(out: &mut W, stats: &StoreStats) -> std::io::Result<()> {
    writeln!(out, "Fact Store Statistics")?;
    writeln!(out, "=====================")?;
    writeln!(out, "  Facts:            {}", stats.total_facts)?;
    writeln!(out, "  Companies:        {}", stats.companies)?;
    writeln!(out, "  Annual facts:     {}", stats.annual_facts)?;
    writeln!(out, "  Quarterly facts:  {}", stats.quarterly_facts)?;
    writeln!(out, "  Unknown periods:  {}", stats.unknown_periods)
}
