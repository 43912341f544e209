// src/web/mod.rs

pub mod handlers;
pub mod types;

pub use handlers::*;
pub use types::*;

use crate::config::AppConfig;
use crate::parser::{AiParser, AiSettings};
use crate::profile::{spawn_autosave, Draft, DraftStore, ProfileStore};
use crate::types::{Resume, ResumeFields};
use crate::validation::ValidationReport;

use anyhow::Result;
use rocket::data::{Limits, ToByteUnit};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::form::Form;
use rocket::http::{Header, Status};
use rocket::serde::json::Json;
use rocket::{catchers, get, options, post, routes, Request, Response, State};
use std::sync::Arc;
use tracing::{error, info};

// CORS Fairing
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "Add CORS headers to responses",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "POST, GET, OPTIONS",
        ));
        response.set_header(Header::new("Access-Control-Allow-Headers", "*"));
        response.set_header(Header::new("Access-Control-Allow-Credentials", "true"));
    }
}

#[get("/health")]
pub async fn health() -> Json<TextResponse> {
    handlers::health_handler().await
}

#[get("/templates")]
pub async fn get_templates() -> Json<DataResponse<Vec<TemplateInfo>>> {
    handlers::get_templates_handler().await
}

#[get("/ai/providers")]
pub async fn get_ai_providers() -> Json<DataResponse<Vec<crate::parser::ProviderInfo>>> {
    handlers::get_providers_handler().await
}

#[post("/parse", data = "<upload>")]
pub async fn parse_document(
    upload: Form<DocumentUploadForm<'_>>,
) -> Result<Json<DataResponse<ParsedDocumentData>>, Json<StandardErrorResponse>> {
    handlers::parse_document_handler(upload).await
}

#[post("/parse/ai", data = "<request>")]
pub async fn parse_with_ai(
    request: Json<AiParseRequest>,
    parser: &State<AiParser>,
) -> Result<Json<DataResponse<ParsedDocumentData>>, Json<StandardErrorResponse>> {
    handlers::parse_ai_handler(request, parser).await
}

#[post("/validate", data = "<request>")]
pub async fn validate_resume(request: Json<ResumeFields>) -> Json<DataResponse<ValidationReport>> {
    handlers::validate_handler(request).await
}

#[post("/export", data = "<request>")]
pub async fn export_resume(
    request: Json<ExportRequest>,
) -> Result<FileResponse, Json<StandardErrorResponse>> {
    handlers::export_handler(request).await
}

#[get("/profiles")]
pub async fn list_profiles(
    store: &State<ProfileStore>,
) -> Result<Json<DataResponse<Vec<String>>>, Json<StandardErrorResponse>> {
    handlers::list_profiles_handler(store).await
}

#[post("/profiles", data = "<request>")]
pub async fn save_profile(
    request: Json<SaveProfileRequest>,
    store: &State<ProfileStore>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::save_profile_handler(request, store).await
}

#[get("/profiles/<name>")]
pub async fn get_profile(
    name: String,
    store: &State<ProfileStore>,
) -> Result<Json<DataResponse<Resume>>, Json<StandardErrorResponse>> {
    handlers::get_profile_handler(name, store).await
}

#[post("/profiles/delete", data = "<request>")]
pub async fn delete_profile(
    request: Json<DeleteProfileRequest>,
    store: &State<ProfileStore>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    handlers::delete_profile_handler(request, store).await
}

#[get("/draft")]
pub async fn get_draft(store: &State<Arc<DraftStore>>) -> Json<DataResponse<Draft>> {
    handlers::get_draft_handler(store).await
}

#[post("/draft", data = "<request>")]
pub async fn save_draft(
    request: Json<Draft>,
    store: &State<Arc<DraftStore>>,
) -> Json<ActionResponse> {
    handlers::save_draft_handler(request, store).await
}

#[options("/<_..>")]
pub async fn options() -> Status {
    Status::Ok
}

// Error catchers
#[rocket::catch(400)]
pub fn bad_request() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Invalid request format".to_string(),
        "BAD_REQUEST".to_string(),
        vec![
            "Check your request JSON format".to_string(),
            "Verify all required fields are present".to_string(),
        ],
    ))
}

#[rocket::catch(500)]
pub fn internal_error() -> Json<StandardErrorResponse> {
    Json(StandardErrorResponse::new(
        "Internal server error".to_string(),
        "INTERNAL_ERROR".to_string(),
        vec![
            "Try again in a few moments".to_string(),
            "Contact support if the problem persists".to_string(),
        ],
    ))
}

// Main server start function
pub async fn start_web_server(config: AppConfig) -> Result<()> {
    config.ensure_directories().await?;

    let profile_store = ProfileStore::new(config.profiles_path());

    let draft_store = Arc::new(DraftStore::new(config.draft_path()));
    draft_store.restore().await?;
    let autosave = spawn_autosave(draft_store.clone());

    let ai_settings = AiSettings::load();
    let ai_parser = match AiParser::new(ai_settings) {
        Ok(parser) => parser,
        Err(e) => {
            error!("Failed to initialize AI parser: {}", e);
            return Err(e);
        }
    };

    info!("Starting resume builder API server");
    info!("Environment: {}", config.environment);
    info!("Data directory: {}", config.data_path.display());
    info!("Server: http://0.0.0.0:{}", config.port);

    let figment = rocket::Config::figment()
        .merge(("address", "0.0.0.0"))
        .merge(("port", config.port))
        .merge((
            "limits",
            Limits::default()
                .limit("file", 10.mebibytes())
                .limit("data-form", 12.mebibytes()),
        ));

    let _rocket = rocket::custom(figment)
        .attach(Cors)
        .manage(config)
        .manage(profile_store)
        .manage(draft_store.clone())
        .manage(ai_parser)
        .register("/api", catchers![bad_request, internal_error])
        .mount(
            "/api",
            routes![
                health,
                get_templates,
                get_ai_providers,
                parse_document,
                parse_with_ai,
                validate_resume,
                export_resume,
                list_profiles,
                save_profile,
                get_profile,
                delete_profile,
                get_draft,
                save_draft,
                options,
            ],
        )
        .launch()
        .await;

    autosave.abort();
    draft_store.flush().await?;

    Ok(())
}
