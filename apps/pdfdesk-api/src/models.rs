//! Response models for the pdfdesk API

use pdfdesk_core::PipelineOutcome;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    pub success: bool,
    pub message: String,
    pub file_name: String,
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub converted_size: Option<usize>,
}

impl OperationResponse {
    pub fn from_outcome(outcome: &PipelineOutcome) -> Self {
        let message = match outcome.label {
            "merge" => "PDFs merged successfully",
            "split" => "PDF split successfully",
            "rotate" => "PDF rotated successfully",
            "compress" => "PDF compressed successfully",
            "stamp-signature" => "Signature stamped successfully",
            _ => "Operation completed successfully",
        };

        Self {
            success: true,
            message: message.to_string(),
            file_name: outcome.artifact.file_name.clone(),
            // Path-relative so it stays correct behind any proxy.
            download_url: format!(
                "/uploads/{}/{}",
                outcome.artifact.owner_id, outcome.artifact.file_name
            ),
            original_size: Some(outcome.original_size),
            converted_size: Some(outcome.result_size),
        }
    }
}
