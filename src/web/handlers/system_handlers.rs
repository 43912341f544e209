// src/web/handlers/system_handlers.rs

use crate::generator::TEMPLATES;
use crate::parser::{available_providers, ProviderInfo};
use crate::web::types::*;

use rocket::serde::json::Json;

pub async fn health_handler() -> Json<TextResponse> {
    Json(TextResponse::success(
        "Resume builder API is running".to_string(),
    ))
}

pub async fn get_templates_handler() -> Json<DataResponse<Vec<TemplateInfo>>> {
    let templates: Vec<TemplateInfo> = TEMPLATES
        .iter()
        .map(|t| TemplateInfo {
            name: t.id.to_string(),
            description: t.name.to_string(),
        })
        .collect();

    Json(DataResponse::success(
        format!("{} template(s) available", templates.len()),
        templates,
    ))
}

pub async fn get_providers_handler() -> Json<DataResponse<Vec<ProviderInfo>>> {
    let providers = available_providers();
    Json(DataResponse::success(
        format!("{} provider(s) supported", providers.len()),
        providers,
    ))
}
