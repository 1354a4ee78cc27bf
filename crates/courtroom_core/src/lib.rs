use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use shared::{
    domain::{Argument, Case, CaseId, PerSide, Side, Verdict, MAX_ARGUMENT_ROUNDS},
    protocol::{ArgumentPayload, FilingReceipt},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod error;
mod gateway;

pub use error::SessionError;
pub use gateway::HttpCourtGateway;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A document staged for one party ahead of filing. Two staged documents
/// are considered the same when their (name, size) pairs match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDocument {
    pub name: String,
    pub size_bytes: u64,
    pub payload: Vec<u8>,
}

impl StagedDocument {
    pub fn new(name: impl Into<String>, payload: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size_bytes: payload.len() as u64,
            payload,
        }
    }

    fn summary(&self) -> DocumentSummary {
        DocumentSummary {
            name: self.name.clone(),
            size_bytes: self.size_bytes,
        }
    }
}

/// Payload-free projection of a staged document for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentSummary {
    pub name: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    CaseFiling,
    Judgment,
    Arguments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    StagingUpdated {
        side: Side,
        documents: Vec<DocumentSummary>,
        submit_eligible: bool,
    },
    PhaseChanged(Phase),
    CaseFiled {
        case: Case,
        receipt: FilingReceipt,
    },
    VerdictUpdated(Verdict),
    VerdictUnavailable {
        reason: String,
    },
    ArgumentRecorded {
        argument: Argument,
        rounds_used: u32,
        rounds_remaining: u32,
    },
    CaseReset,
    Notice(Notice),
}

/// Pull-model view of the session for renderers; the broadcast stream is
/// the push-model counterpart.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub case: Option<Case>,
    pub staged: PerSide<Vec<DocumentSummary>>,
    pub arguments: Vec<Argument>,
    pub rounds_used: u32,
    pub rounds_remaining: u32,
    pub max_rounds: u32,
    pub verdict: Option<Verdict>,
    pub submit_eligible: bool,
    pub proceedings_unlocked: bool,
}

#[async_trait]
pub trait CaseFilingService: Send + Sync {
    /// Uploads every staged document together with the case metadata in one
    /// filing request and returns the backend's receipt.
    async fn file_case(
        &self,
        documents: &PerSide<Vec<StagedDocument>>,
        jurisdiction: &str,
        category: &str,
    ) -> Result<FilingReceipt>;
}

#[async_trait]
pub trait VerdictService: Send + Sync {
    /// Requests a fresh verdict over the case dossier and the full argument
    /// history. The backend re-judges from scratch on every call.
    async fn verdict_for_case(&self, case: &Case, prior_arguments: &[Argument])
        -> Result<Verdict>;

    /// Submits one rebuttal argument and returns the re-judged verdict.
    async fn submit_argument(&self, case_id: &CaseId, argument: &ArgumentPayload)
        -> Result<Verdict>;

    /// Number of argument rounds the backend has recorded for the case.
    async fn case_status(&self, case_id: &CaseId) -> Result<u32>;
}

struct SessionState {
    phase: Phase,
    current_case: Option<Case>,
    staged: PerSide<Vec<StagedDocument>>,
    arguments: Vec<Argument>,
    rounds_used: u32,
    verdict: Option<Verdict>,
    filing_in_flight: bool,
    argument_in_flight: bool,
    // Bumped on reset and on each newly filed case; a response issued under
    // an older epoch is discarded when it resolves.
    epoch: u64,
}

impl SessionState {
    fn submit_eligible(&self) -> bool {
        let has_documents =
            !self.staged.plaintiff.is_empty() || !self.staged.defendant.is_empty();
        has_documents && !self.filing_in_flight
    }

    fn staged_summaries(&self, side: Side) -> Vec<DocumentSummary> {
        self.staged
            .side(side)
            .iter()
            .map(StagedDocument::summary)
            .collect()
    }
}

/// Controller for one courtroom session: owns the case lifecycle, per-party
/// document staging, the bounded argument exchange and the choreography
/// with the filing and verdict services. State mutations never overlap a
/// backend call; the session mutex is released while a request is in
/// flight and re-acquired to apply the outcome. A filing and an argument
/// submission never overlap each other: each latches itself and rejects
/// the other while in flight.
pub struct CourtSession {
    filing: Arc<dyn CaseFilingService>,
    verdicts: Arc<dyn VerdictService>,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl CourtSession {
    pub fn new(
        filing: Arc<dyn CaseFilingService>,
        verdicts: Arc<dyn VerdictService>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            filing,
            verdicts,
            inner: Mutex::new(SessionState {
                phase: Phase::CaseFiling,
                current_case: None,
                staged: PerSide::default(),
                arguments: Vec::new(),
                rounds_used: 0,
                verdict: None,
                filing_in_flight: false,
                argument_in_flight: false,
                epoch: 0,
            }),
            events,
        })
    }

    /// Wires both collaborator seams to a single HTTP gateway.
    pub fn with_gateway(gateway: Arc<HttpCourtGateway>) -> Arc<Self> {
        Self::new(Arc::clone(&gateway) as Arc<dyn CaseFilingService>, gateway)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    fn notify(&self, kind: NoticeKind, text: impl Into<String>) {
        self.emit(SessionEvent::Notice(Notice {
            kind,
            text: text.into(),
        }));
    }

    /// Stages documents for one party. Documents whose (name, size) pair is
    /// already staged on that side are skipped; an empty input changes
    /// nothing. Returns the number of documents actually added.
    pub async fn stage_documents(&self, side: Side, documents: Vec<StagedDocument>) -> usize {
        let (added, summaries, submit_eligible) = {
            let mut guard = self.inner.lock().await;
            let staged = guard.staged.side_mut(side);
            let mut added = 0usize;
            for document in documents {
                let duplicate = staged.iter().any(|existing| {
                    existing.name == document.name && existing.size_bytes == document.size_bytes
                });
                if duplicate {
                    continue;
                }
                staged.push(document);
                added += 1;
            }
            (added, guard.staged_summaries(side), guard.submit_eligible())
        };

        if added > 0 {
            info!(
                side = side.as_str(),
                added,
                staged = summaries.len(),
                "staging: documents added"
            );
        }
        self.emit(SessionEvent::StagingUpdated {
            side,
            documents: summaries,
            submit_eligible,
        });
        added
    }

    /// Removes the staged document at `index` on one side. Out-of-range
    /// indices are ignored.
    pub async fn remove_document(&self, side: Side, index: usize) -> bool {
        let (removed, summaries, submit_eligible) = {
            let mut guard = self.inner.lock().await;
            let staged = guard.staged.side_mut(side);
            let removed = if index < staged.len() {
                let document = staged.remove(index);
                info!(
                    side = side.as_str(),
                    name = %document.name,
                    "staging: document removed"
                );
                true
            } else {
                false
            };
            (removed, guard.staged_summaries(side), guard.submit_eligible())
        };

        if removed {
            self.emit(SessionEvent::StagingUpdated {
                side,
                documents: summaries,
                submit_eligible,
            });
        }
        removed
    }

    /// True when at least one document is staged on either side and no
    /// filing is in flight.
    pub async fn submit_eligible(&self) -> bool {
        self.inner.lock().await.submit_eligible()
    }

    pub async fn has_active_case(&self) -> bool {
        self.inner.lock().await.current_case.is_some()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let guard = self.inner.lock().await;
        SessionSnapshot {
            phase: guard.phase,
            case: guard.current_case.clone(),
            staged: PerSide {
                plaintiff: guard.staged_summaries(Side::Plaintiff),
                defendant: guard.staged_summaries(Side::Defendant),
            },
            arguments: guard.arguments.clone(),
            rounds_used: guard.rounds_used,
            rounds_remaining: MAX_ARGUMENT_ROUNDS.saturating_sub(guard.rounds_used),
            max_rounds: MAX_ARGUMENT_ROUNDS,
            verdict: guard.verdict.clone(),
            submit_eligible: guard.submit_eligible(),
            proceedings_unlocked: guard.current_case.is_some(),
        }
    }

    /// Moves the session to `phase`. Judgment and arguments are gated on an
    /// active case; returning to case filing is always allowed.
    pub async fn select_phase(&self, phase: Phase) -> Result<Phase, SessionError> {
        {
            let mut guard = self.inner.lock().await;
            if matches!(phase, Phase::Judgment | Phase::Arguments)
                && guard.current_case.is_none()
            {
                self.notify(NoticeKind::Warning, "No active case. File a case first.");
                return Err(SessionError::NoActiveCase);
            }
            guard.phase = phase;
        }
        self.emit(SessionEvent::PhaseChanged(phase));
        Ok(phase)
    }

    /// Files the staged documents as a new case. Rejected without
    /// contacting the backend while another filing or an argument
    /// submission is in flight, and when nothing is staged. On success the
    /// staged names move onto the case, an initial verdict is requested,
    /// and the session enters the judgment phase; a previously active case
    /// is replaced and responses still in flight for it are discarded. On
    /// failure everything staged stays put and the operation may simply be
    /// retried.
    pub async fn file_case(
        &self,
        jurisdiction: &str,
        category: &str,
    ) -> Result<CaseId, SessionError> {
        let (documents, epoch) = {
            let mut guard = self.inner.lock().await;
            if guard.filing_in_flight {
                self.notify(
                    NoticeKind::Warning,
                    "A case filing is already in progress.",
                );
                return Err(SessionError::FilingInFlight);
            }
            if guard.argument_in_flight {
                self.notify(
                    NoticeKind::Warning,
                    "An argument submission is already in progress.",
                );
                return Err(SessionError::ArgumentInFlight);
            }
            if guard.staged.plaintiff.is_empty() && guard.staged.defendant.is_empty() {
                self.notify(
                    NoticeKind::Error,
                    "Upload at least one document before filing.",
                );
                return Err(SessionError::NothingStaged);
            }
            guard.filing_in_flight = true;
            (guard.staged.clone(), guard.epoch)
        };

        info!(
            plaintiff_files = documents.plaintiff.len(),
            defendant_files = documents.defendant.len(),
            jurisdiction,
            category,
            "case: filing"
        );

        let receipt = match self
            .filing
            .file_case(&documents, jurisdiction, category)
            .await
        {
            Ok(receipt) => receipt,
            Err(err) => {
                let stale = {
                    let mut guard = self.inner.lock().await;
                    if guard.epoch == epoch {
                        guard.filing_in_flight = false;
                        false
                    } else {
                        true
                    }
                };
                if stale {
                    info!("case: filing failure resolved after reset; discarded");
                    return Err(SessionError::SessionReset);
                }
                warn!(error = %err, "case: filing failed");
                self.notify(NoticeKind::Error, format!("Case filing failed: {err}"));
                return Err(SessionError::FilingFailed(err.to_string()));
            }
        };

        let case = Case {
            case_id: receipt.case_id.clone(),
            jurisdiction: jurisdiction.to_string(),
            category: category.to_string(),
            documents: PerSide {
                plaintiff: documents.plaintiff.iter().map(|d| d.name.clone()).collect(),
                defendant: documents.defendant.iter().map(|d| d.name.clone()).collect(),
            },
            filed_at: Utc::now(),
        };

        let epoch = {
            let mut guard = self.inner.lock().await;
            if guard.epoch != epoch {
                info!(case_id = %receipt.case_id, "case: filing resolved after reset; discarded");
                return Err(SessionError::SessionReset);
            }
            guard.filing_in_flight = false;
            // The new case opens a new epoch; a verdict still in flight for
            // the old case resolves stale and is discarded.
            guard.epoch += 1;
            guard.current_case = Some(case.clone());
            guard.staged = PerSide::default();
            guard.arguments.clear();
            guard.rounds_used = 0;
            guard.verdict = None;
            guard.epoch
        };

        info!(
            case_id = %case.case_id,
            plaintiff_files = receipt.plaintiff_file_count,
            defendant_files = receipt.defendant_file_count,
            "case: filed"
        );
        self.emit(SessionEvent::CaseFiled {
            case,
            receipt: receipt.clone(),
        });
        for side in [Side::Plaintiff, Side::Defendant] {
            self.emit(SessionEvent::StagingUpdated {
                side,
                documents: Vec::new(),
                submit_eligible: false,
            });
        }
        self.notify(
            NoticeKind::Success,
            format!(
                "Case filed: {} plaintiff and {} defendant document(s) ingested.",
                receipt.plaintiff_file_count, receipt.defendant_file_count
            ),
        );

        // The initial verdict is fetched before the judgment phase opens.
        // A failure here leaves the case standing; arguments may proceed.
        if let Err(err) = self.refresh_verdict(epoch).await {
            if matches!(err, SessionError::SessionReset) {
                return Err(err);
            }
            warn!(case_id = %receipt.case_id, error = %err, "verdict: unavailable after filing");
        }

        {
            let mut guard = self.inner.lock().await;
            if guard.epoch != epoch {
                return Err(SessionError::SessionReset);
            }
            guard.phase = Phase::Judgment;
        }
        self.emit(SessionEvent::PhaseChanged(Phase::Judgment));
        Ok(receipt.case_id)
    }

    /// Requests a fresh verdict for the active case. On success the stored
    /// verdict is replaced wholesale; on failure the previous verdict, if
    /// any, stays in place and a degraded indicator is surfaced.
    pub async fn request_verdict(&self) -> Result<Verdict, SessionError> {
        let epoch = {
            let guard = self.inner.lock().await;
            if guard.current_case.is_none() {
                self.notify(NoticeKind::Warning, "No active case. File a case first.");
                return Err(SessionError::NoActiveCase);
            }
            guard.epoch
        };
        self.refresh_verdict(epoch).await
    }

    async fn refresh_verdict(&self, epoch: u64) -> Result<Verdict, SessionError> {
        let (case, history) = {
            let guard = self.inner.lock().await;
            if guard.epoch != epoch {
                return Err(SessionError::SessionReset);
            }
            let Some(case) = guard.current_case.clone() else {
                return Err(SessionError::NoActiveCase);
            };
            (case, guard.arguments.clone())
        };

        match self.verdicts.verdict_for_case(&case, &history).await {
            Ok(verdict) => {
                {
                    let mut guard = self.inner.lock().await;
                    if guard.epoch != epoch {
                        info!(case_id = %case.case_id, "verdict: resolved after the case changed; discarded");
                        return Err(SessionError::SessionReset);
                    }
                    guard.verdict = Some(verdict.clone());
                }
                info!(
                    case_id = %case.case_id,
                    confidence = verdict.confidence.label(),
                    "verdict: updated"
                );
                self.emit(SessionEvent::VerdictUpdated(verdict.clone()));
                Ok(verdict)
            }
            Err(err) => {
                {
                    let guard = self.inner.lock().await;
                    if guard.epoch != epoch {
                        return Err(SessionError::SessionReset);
                    }
                }
                warn!(case_id = %case.case_id, error = %err, "verdict: request failed");
                self.emit(SessionEvent::VerdictUnavailable {
                    reason: err.to_string(),
                });
                self.notify(NoticeKind::Error, "Could not fetch the AI verdict.");
                Err(SessionError::VerdictFailed(err.to_string()))
            }
        }
    }

    /// Submits one rebuttal argument for `side`. Preconditions, checked in
    /// order before any backend call: no argument already in flight, no
    /// filing in flight, an active case, rounds remaining, non-empty
    /// trimmed text. The round is only consumed once the backend confirms:
    /// the argument is appended to the history, the round counter advances,
    /// and the returned verdict replaces the stored one.
    pub async fn submit_argument(
        &self,
        side: Side,
        text: &str,
    ) -> Result<Verdict, SessionError> {
        let trimmed = text.trim();
        let (case_id, round, epoch) = {
            let mut guard = self.inner.lock().await;
            if guard.argument_in_flight {
                self.notify(
                    NoticeKind::Warning,
                    "An argument submission is already in progress.",
                );
                return Err(SessionError::ArgumentInFlight);
            }
            if guard.filing_in_flight {
                self.notify(
                    NoticeKind::Warning,
                    "A case filing is already in progress.",
                );
                return Err(SessionError::FilingInFlight);
            }
            let Some(case) = guard.current_case.as_ref() else {
                self.notify(NoticeKind::Warning, "No active case. File a case first.");
                return Err(SessionError::NoActiveCase);
            };
            if guard.rounds_used >= MAX_ARGUMENT_ROUNDS {
                self.notify(
                    NoticeKind::Warning,
                    format!("All {MAX_ARGUMENT_ROUNDS} argument rounds have been used."),
                );
                return Err(SessionError::round_limit());
            }
            if trimmed.is_empty() {
                self.notify(NoticeKind::Warning, "Enter an argument before submitting.");
                return Err(SessionError::EmptyArgument);
            }
            let case_id = case.case_id.clone();
            guard.argument_in_flight = true;
            (case_id, guard.rounds_used + 1, guard.epoch)
        };

        let payload = ArgumentPayload {
            side,
            argument_text: trimmed.to_string(),
            documents: Vec::new(),
        };

        info!(
            case_id = %case_id,
            side = side.as_str(),
            round,
            "argument: submitting"
        );

        let outcome = self.verdicts.submit_argument(&case_id, &payload).await;

        let mut guard = self.inner.lock().await;
        if guard.epoch != epoch {
            info!(case_id = %case_id, "argument: resolved after reset; discarded");
            return Err(SessionError::SessionReset);
        }
        guard.argument_in_flight = false;

        let verdict = match outcome {
            Ok(verdict) => verdict,
            Err(err) => {
                drop(guard);
                warn!(
                    case_id = %case_id,
                    side = side.as_str(),
                    error = %err,
                    "argument: submission failed"
                );
                self.notify(
                    NoticeKind::Error,
                    format!("Argument submission failed: {err}"),
                );
                return Err(SessionError::ArgumentFailed(err.to_string()));
            }
        };

        let argument = Argument {
            side,
            text: trimmed.to_string(),
            documents: payload.documents,
            submitted_at: Utc::now(),
        };
        guard.arguments.push(argument.clone());
        guard.rounds_used += 1;
        guard.verdict = Some(verdict.clone());
        let rounds_used = guard.rounds_used;
        drop(guard);

        let rounds_remaining = MAX_ARGUMENT_ROUNDS.saturating_sub(rounds_used);
        info!(
            case_id = %case_id,
            side = side.as_str(),
            rounds_used,
            rounds_remaining,
            "argument: recorded"
        );
        self.emit(SessionEvent::ArgumentRecorded {
            argument,
            rounds_used,
            rounds_remaining,
        });
        self.emit(SessionEvent::VerdictUpdated(verdict.clone()));
        self.notify(NoticeKind::Success, "Argument submitted.");
        Ok(verdict)
    }

    /// Round count the backend has recorded for the active case. Read-only;
    /// the local history stays authoritative for session behavior.
    pub async fn case_status(&self) -> Result<u32, SessionError> {
        let case_id = {
            let guard = self.inner.lock().await;
            match guard.current_case.as_ref() {
                Some(case) => case.case_id.clone(),
                None => {
                    self.notify(NoticeKind::Warning, "No active case. File a case first.");
                    return Err(SessionError::NoActiveCase);
                }
            }
        };

        match self.verdicts.case_status(&case_id).await {
            Ok(rounds) => {
                info!(case_id = %case_id, recorded_rounds = rounds, "case: status fetched");
                Ok(rounds)
            }
            Err(err) => {
                warn!(case_id = %case_id, error = %err, "case: status request failed");
                self.notify(
                    NoticeKind::Error,
                    format!("Could not fetch case status: {err}"),
                );
                Err(SessionError::StatusFailed(err.to_string()))
            }
        }
    }

    /// Clears the whole session and returns to case filing. There are no
    /// preconditions; a response still in flight resolves against the old
    /// epoch and is discarded instead of mutating the fresh session.
    pub async fn reset_case(&self) {
        {
            let mut guard = self.inner.lock().await;
            guard.epoch += 1;
            guard.phase = Phase::CaseFiling;
            guard.current_case = None;
            guard.staged = PerSide::default();
            guard.arguments.clear();
            guard.rounds_used = 0;
            guard.verdict = None;
            guard.filing_in_flight = false;
            guard.argument_in_flight = false;
        }
        info!("case: session reset");
        self.emit(SessionEvent::CaseReset);
        self.emit(SessionEvent::PhaseChanged(Phase::CaseFiling));
        self.notify(NoticeKind::Success, "New case started.");
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
