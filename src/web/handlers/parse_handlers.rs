// src/web/handlers/parse_handlers.rs

use crate::parser::{AiParser, DocumentParser};
use crate::validation::InputSanitizer;
use crate::web::types::*;

use rocket::form::Form;
use rocket::serde::json::Json;
use rocket::State;
use tracing::{error, info, warn};

const MAX_UPLOAD_SIZE: u64 = 10 * 1024 * 1024;
const MAX_TEXT_LENGTH: usize = 100_000;

pub async fn parse_document_handler(
    mut upload: Form<DocumentUploadForm<'_>>,
) -> Result<Json<DataResponse<ParsedDocumentData>>, Json<StandardErrorResponse>> {
    let content_type = upload.file.content_type().cloned();
    let file_size = upload.file.len();

    // Extract the name before persist_to() takes the file over.
    let original_filename = upload
        .file
        .raw_name()
        .and_then(|n| n.as_str())
        .unwrap_or("uploaded_resume")
        .to_string();

    let is_pdf = content_type.as_ref().map_or(false, |ct| ct.is_pdf())
        || original_filename.to_lowercase().ends_with(".pdf");
    let is_docx = content_type.as_ref().map_or(false, |ct| {
        ct.to_string()
            .contains("vnd.openxmlformats-officedocument.wordprocessingml.document")
    }) || original_filename.to_lowercase().ends_with(".docx")
        || original_filename.to_lowercase().ends_with(".doc");

    if !is_pdf && !is_docx {
        let received_type = content_type
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        warn!(
            "Rejected upload '{}' with content type {}",
            original_filename, received_type
        );
        return Err(Json(StandardErrorResponse::new(
            format!(
                "Only PDF and Word documents are supported. Received content type: {}",
                received_type
            ),
            "INVALID_FORMAT".to_string(),
            vec![
                "Upload a PDF file (.pdf)".to_string(),
                "Upload a Word document (.docx)".to_string(),
            ],
        )));
    }

    if file_size > MAX_UPLOAD_SIZE {
        return Err(Json(StandardErrorResponse::new(
            "File size exceeds 10MB limit".to_string(),
            "FILE_TOO_LARGE".to_string(),
            vec![
                "Compress your resume file".to_string(),
                "Use a smaller file size (max 10MB)".to_string(),
            ],
        )));
    }

    let extension = if is_pdf { "pdf" } else { "docx" };
    let temp_path = std::env::temp_dir().join(format!(
        "cvforge_upload_{}_{}.{}",
        std::process::id(),
        chrono::Utc::now().timestamp_micros(),
        extension
    ));

    if let Err(e) = upload.file.persist_to(&temp_path).await {
        error!("Failed to save uploaded file: {}", e);
        return Err(Json(StandardErrorResponse::new(
            "Failed to process uploaded file".to_string(),
            "FILE_SAVE_ERROR".to_string(),
            vec!["Try uploading the file again".to_string()],
        )));
    }

    // Text extraction is CPU bound, keep it off the async workers.
    let parse_path = temp_path.clone();
    let parsed =
        tokio::task::spawn_blocking(move || DocumentParser::parse_document(&parse_path)).await;

    let _ = tokio::fs::remove_file(&temp_path).await;

    let text = match parsed {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            error!("Document parsing failed for '{}': {}", original_filename, e);
            return Err(Json(StandardErrorResponse::new(
                format!("Could not read the document: {}", e),
                "PARSE_ERROR".to_string(),
                vec![
                    "Ensure the file contains readable text".to_string(),
                    "Scanned image PDFs cannot be parsed".to_string(),
                    "Check the file is not corrupted".to_string(),
                ],
            )));
        }
        Err(e) => {
            error!("Parser task panicked: {}", e);
            return Err(Json(StandardErrorResponse::new(
                "Document parsing failed unexpectedly".to_string(),
                "PARSE_ERROR".to_string(),
                vec!["Try uploading the file again".to_string()],
            )));
        }
    };

    let text = InputSanitizer::sanitize_text(&text, MAX_TEXT_LENGTH);
    if text.trim().is_empty() {
        return Err(Json(StandardErrorResponse::new(
            "No text could be extracted from the document".to_string(),
            "EMPTY_DOCUMENT".to_string(),
            vec![
                "Ensure the file contains selectable text".to_string(),
                "Export the resume again from its source document".to_string(),
            ],
        )));
    }

    let mut fields = DocumentParser::extract_sections(&text);
    if fields.name.is_empty() {
        fields.name = DocumentParser::extract_name(&text);
    }
    fields.name = InputSanitizer::sanitize_name(&fields.name);
    let analysis = DocumentParser::detect_format(&text);

    info!(
        "Parsed '{}': {} sections detected, {} words",
        original_filename, analysis.section_count, analysis.word_count
    );

    Ok(Json(DataResponse::success(
        format!("Parsed {}", original_filename),
        ParsedDocumentData { fields, analysis },
    )))
}

pub async fn parse_ai_handler(
    request: Json<AiParseRequest>,
    parser: &State<AiParser>,
) -> Result<Json<DataResponse<ParsedDocumentData>>, Json<StandardErrorResponse>> {
    let text = InputSanitizer::sanitize_text(&request.text, MAX_TEXT_LENGTH);
    if text.trim().is_empty() {
        return Err(Json(StandardErrorResponse::new(
            "No resume text provided".to_string(),
            "EMPTY_TEXT".to_string(),
            vec!["Include the resume text in the request body".to_string()],
        )));
    }

    if !parser.is_available().await {
        return Err(Json(StandardErrorResponse::new(
            format!(
                "AI provider '{}' is not available",
                parser.settings().provider
            ),
            "AI_UNAVAILABLE".to_string(),
            vec![
                "Set an API key for cloud providers".to_string(),
                "Start the local server for Ollama or LM Studio".to_string(),
            ],
        )));
    }

    match parser.parse_resume(&text).await {
        Ok(fields) => {
            let analysis = DocumentParser::detect_format(&text);
            info!("AI parsing completed via {}", parser.settings().provider);
            Ok(Json(DataResponse::success(
                format!("Parsed with {}", parser.settings().provider),
                ParsedDocumentData { fields, analysis },
            )))
        }
        Err(e) => {
            error!("AI parsing failed: {}", e);
            Err(Json(StandardErrorResponse::new(
                format!("AI parsing failed: {}", e),
                "AI_PARSE_ERROR".to_string(),
                vec![
                    "Check the AI provider configuration and API key".to_string(),
                    "Use the standard document parser instead".to_string(),
                ],
            )))
        }
    }
}
