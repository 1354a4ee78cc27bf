//! HTTP implementation of the filing and verdict service seams.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client,
};
use shared::{
    domain::{Argument, Case, CaseId, PerSide, Verdict},
    protocol::{
        ArgumentPayload, CaseDataPayload, CaseStatusResponse, FilingReceipt, FilingResponse,
        SubmitArgumentRequest, VerdictRequest, VerdictResponse,
    },
};
use tracing::debug;

use crate::{CaseFilingService, StagedDocument, VerdictService};

/// Talks to the courtroom backend over HTTP. The filing endpoint takes a
/// multipart upload of the staged payloads; the verdict endpoints exchange
/// JSON envelopes with a `success` flag and an optional `error` message.
pub struct HttpCourtGateway {
    http: Client,
    base_url: String,
}

impl HttpCourtGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            base_url,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn unwrap_verdict(response: VerdictResponse) -> Result<Verdict> {
    if !response.success {
        let message = response
            .error
            .unwrap_or_else(|| "verdict rejected by backend".to_string());
        return Err(anyhow!(message));
    }
    Ok(response.into_verdict())
}

#[async_trait]
impl CaseFilingService for HttpCourtGateway {
    async fn file_case(
        &self,
        documents: &PerSide<Vec<StagedDocument>>,
        jurisdiction: &str,
        category: &str,
    ) -> Result<FilingReceipt> {
        let mut form = Form::new();
        for document in &documents.plaintiff {
            form = form.part(
                "plaintiff_files",
                Part::bytes(document.payload.clone()).file_name(document.name.clone()),
            );
        }
        for document in &documents.defendant {
            form = form.part(
                "defendant_files",
                Part::bytes(document.payload.clone()).file_name(document.name.clone()),
            );
        }
        form = form
            .text("jurisdiction", jurisdiction.to_string())
            .text("case_category", category.to_string());

        debug!(
            plaintiff_files = documents.plaintiff.len(),
            defendant_files = documents.defendant.len(),
            "gateway: uploading case documents"
        );

        let response: FilingResponse = self
            .http
            .post(self.endpoint("/api/upload-documents"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("invalid filing response")?;

        if !response.success {
            let message = response
                .error
                .unwrap_or_else(|| "filing rejected by backend".to_string());
            return Err(anyhow!(message));
        }

        let case_id = response
            .case_id
            .context("filing response is missing the case id")?;
        Ok(FilingReceipt {
            case_id,
            plaintiff_file_count: response
                .plaintiff_file_count
                .unwrap_or(documents.plaintiff.len() as u32),
            defendant_file_count: response
                .defendant_file_count
                .unwrap_or(documents.defendant.len() as u32),
        })
    }
}

#[async_trait]
impl VerdictService for HttpCourtGateway {
    async fn verdict_for_case(
        &self,
        case: &Case,
        prior_arguments: &[Argument],
    ) -> Result<Verdict> {
        let request = VerdictRequest {
            case_data: CaseDataPayload::from(case),
            previous_arguments: prior_arguments.iter().map(ArgumentPayload::from).collect(),
        };

        let response: VerdictResponse = self
            .http
            .post(self.endpoint("/api/get-verdict"))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("invalid verdict response")?;

        unwrap_verdict(response)
    }

    async fn submit_argument(
        &self,
        case_id: &CaseId,
        argument: &ArgumentPayload,
    ) -> Result<Verdict> {
        let request = SubmitArgumentRequest {
            argument: argument.clone(),
            case_id: case_id.clone(),
        };

        let response: VerdictResponse = self
            .http
            .post(self.endpoint("/api/submit-argument"))
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("invalid argument response")?;

        unwrap_verdict(response)
    }

    async fn case_status(&self, case_id: &CaseId) -> Result<u32> {
        let response: CaseStatusResponse = self
            .http
            .get(self.endpoint(&format!("/api/case-status/{case_id}")))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("invalid case status response")?;

        if !response.success {
            let message = response
                .error
                .unwrap_or_else(|| "case status rejected by backend".to_string());
            return Err(anyhow!(message));
        }
        response
            .arguments
            .context("case status response is missing the round count")
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
