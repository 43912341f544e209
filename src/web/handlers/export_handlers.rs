// src/web/handlers/export_handlers.rs

use crate::generator::{ExportFormat, ResumeGenerator};
use crate::types::ResumeFields;
use crate::validation::{ResumeValidator, ValidationReport};
use crate::web::types::*;

use rocket::serde::json::Json;
use tracing::{error, info, warn};

pub async fn validate_handler(request: Json<ResumeFields>) -> Json<DataResponse<ValidationReport>> {
    let report = ResumeValidator::report(&request.into_inner());
    let message = if report.is_valid {
        "Resume passes validation".to_string()
    } else {
        format!(
            "{} error(s), {} warning(s)",
            report.error_count, report.warning_count
        )
    };

    Json(DataResponse::success(message, report))
}

pub async fn export_handler(
    request: Json<ExportRequest>,
) -> Result<FileResponse, Json<StandardErrorResponse>> {
    let request = request.into_inner();

    if let Err(reason) = ResumeValidator::can_export(&request.resume) {
        warn!("Export blocked: {}", reason);
        return Err(Json(StandardErrorResponse::new(
            reason,
            "EXPORT_BLOCKED".to_string(),
            vec![
                "Fill in the name field".to_string(),
                "Add contact information (email or phone)".to_string(),
            ],
        )));
    }

    let format = match request.format.as_deref().unwrap_or("pdf") {
        "pdf" => ExportFormat::Pdf,
        "docx" => ExportFormat::Docx,
        other => {
            return Err(Json(StandardErrorResponse::new(
                format!("Unsupported export format: {}", other),
                "INVALID_FORMAT".to_string(),
                vec!["Use format \"pdf\" or \"docx\"".to_string()],
            )));
        }
    };

    let template = request.template.as_deref().unwrap_or("classic").to_string();
    let fields = request.resume;

    // Document rendering is CPU bound.
    let render_template = template.clone();
    let rendered = tokio::task::spawn_blocking(move || {
        ResumeGenerator::render_bytes(&fields, format, &render_template)
    })
    .await;

    let data = match rendered {
        Ok(Ok(data)) => data,
        Ok(Err(e)) => {
            error!("Resume rendering failed: {}", e);
            return Err(Json(StandardErrorResponse::new(
                format!("Document generation failed: {}", e),
                "GENERATION_ERROR".to_string(),
                vec!["Check the resume content for unusual characters".to_string()],
            )));
        }
        Err(e) => {
            error!("Render task panicked: {}", e);
            return Err(Json(StandardErrorResponse::new(
                "Document generation failed unexpectedly".to_string(),
                "GENERATION_ERROR".to_string(),
                vec!["Try the export again".to_string()],
            )));
        }
    };

    let filename = match request.filename {
        Some(name) if !name.trim().is_empty() => {
            let suffix = format!(".{}", format.extension());
            if name.to_lowercase().ends_with(&suffix) {
                name
            } else {
                format!("{}{}", name, suffix)
            }
        }
        _ => format!(
            "resume_{}.{}",
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
            format.extension()
        ),
    };

    info!(
        "Exported {} bytes as {} ({} template)",
        data.len(),
        filename,
        template
    );

    Ok(FileResponse::new(data, filename, format))
}
