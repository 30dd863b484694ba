use crate::domain::model::{CopyReport, VerificationOutcome};
use crate::utils::error::{Result, VerifyError};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub const CSV_HEADERS: [&str; 3] = ["claim", "status", "source_url"];

/// Human-readable report: ad copy first, then one block per claim.
pub fn render_text(report: &CopyReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Generated Ad Copy (Tone: {})", report.tone);
    match &report.ad_copy {
        Some(copy) => {
            for line in copy.lines() {
                let _ = writeln!(out, "> {}", line);
            }
        }
        None => {
            let _ = writeln!(out, "(no ad copy: no claim could be verified)");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Verification Report for {}", report.product_url);
    for outcome in &report.outcomes {
        match &outcome.outcome {
            VerificationOutcome::Verified { source_url } => {
                let _ = writeln!(out, "✅ Claim: {}", outcome.claim);
                let _ = writeln!(out, "   Source: {}", source_url);
            }
            VerificationOutcome::Unverified => {
                let _ = writeln!(out, "❌ Claim: {}", outcome.claim);
                let _ = writeln!(out, "   Not verified");
            }
        }
    }

    let _ = writeln!(
        out,
        "\n{} of {} claims verified",
        report.verified_claims().len(),
        report.outcomes.len()
    );
    out
}

pub fn to_json(report: &CopyReport) -> Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// CSV with one row per claim; `source_url` is empty for unverified claims.
pub fn to_csv(report: &CopyReport) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADERS)?;

    for outcome in &report.outcomes {
        let (status, source_url) = match &outcome.outcome {
            VerificationOutcome::Verified { source_url } => ("verified", source_url.as_str()),
            VerificationOutcome::Unverified => ("unverified", ""),
        };
        writer.write_record([outcome.claim.as_str(), status, source_url])?;
    }

    writer.into_inner().map_err(|e| VerifyError::ProcessingError {
        message: format!("Failed to flush CSV report: {}", e),
    })
}

/// 寫入 CSV 報告，必要時建立上層目錄
pub fn save_csv<P: AsRef<Path>>(report: &CopyReport, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let data = to_csv(report)?;
    tracing::debug!("Writing CSV report ({} bytes) to {}", data.len(), path.display());
    fs::write(path, data)?;
    Ok(())
}
