use std::fmt::Write as _;

use courtroom_core::{DocumentSummary, Phase, SessionSnapshot};
use shared::domain::{Side, Verdict};

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Human-readable byte count, matching how the bench lists staged files:
/// powers of 1024, at most two decimals, trailing zeros dropped.
pub fn format_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{rounded} {}", SIZE_UNITS[unit])
}

pub fn format_staged(documents: &[DocumentSummary]) -> String {
    if documents.is_empty() {
        return "(none)".to_string();
    }
    documents
        .iter()
        .map(|document| format!("{} ({})", document.name, format_size(document.size_bytes)))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::CaseFiling => "case filing",
        Phase::Judgment => "judgment",
        Phase::Arguments => "arguments",
    }
}

pub fn render_verdict(verdict: &Verdict) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Verdict ({}) ===", verdict.confidence.label());
    let _ = writeln!(out, "{}", verdict.verdict);
    let _ = writeln!(out, "Reasoning: {}", verdict.reasoning);
    for side in [Side::Plaintiff, Side::Defendant] {
        let evidence = verdict.key_evidence.side(side);
        if !evidence.is_empty() {
            let _ = writeln!(out, "Key evidence ({side}): {}", evidence.join(", "));
        }
    }
    if !verdict.precedents.is_empty() {
        let _ = writeln!(out, "Precedents:");
        for precedent in &verdict.precedents {
            let _ = writeln!(out, "  - {precedent}");
        }
    }
    if !verdict.counterarguments.is_empty() {
        let _ = writeln!(out, "Counterarguments:");
        for counterargument in &verdict.counterarguments {
            let _ = writeln!(out, "  - {counterargument}");
        }
    }
    for side in [Side::Plaintiff, Side::Defendant] {
        let suggestion = verdict.suggested_next_arguments.side(side);
        if !suggestion.is_empty() {
            let _ = writeln!(out, "Suggested next argument ({side}): {suggestion}");
        }
    }
    out
}

pub fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Phase: {}", phase_label(snapshot.phase));
    match &snapshot.case {
        Some(case) => {
            let _ = writeln!(
                out,
                "Case: {} ({}, {})",
                case.case_id, case.jurisdiction, case.category
            );
        }
        None => {
            let _ = writeln!(out, "Case: none (file one first)");
        }
    }
    for side in [Side::Plaintiff, Side::Defendant] {
        let _ = writeln!(
            out,
            "Staged ({side}): {}",
            format_staged(snapshot.staged.side(side))
        );
    }
    let _ = writeln!(
        out,
        "Rounds used: {}/{} ({} remaining)",
        snapshot.rounds_used, snapshot.max_rounds, snapshot.rounds_remaining
    );
    match &snapshot.verdict {
        Some(verdict) => out.push_str(&render_verdict(verdict)),
        None => {
            let _ = writeln!(out, "No verdict yet.");
        }
    }
    out
}
