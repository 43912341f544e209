// src/web/handlers/profile_handlers.rs

use crate::profile::{Draft, DraftStore, ProfileStore};
use crate::types::Resume;
use crate::validation::{InputSanitizer, ResumeValidator};
use crate::web::types::*;

use rocket::serde::json::Json;
use rocket::State;
use std::sync::Arc;
use tracing::error;

pub async fn list_profiles_handler(
    store: &State<ProfileStore>,
) -> Result<Json<DataResponse<Vec<String>>>, Json<StandardErrorResponse>> {
    match store.list().await {
        Ok(names) => Ok(Json(DataResponse::success(
            format!("{} profile(s)", names.len()),
            names,
        ))),
        Err(e) => {
            error!("Failed to list profiles: {}", e);
            Err(Json(StandardErrorResponse::new(
                "Failed to list profiles".to_string(),
                "PROFILE_LIST_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
            )))
        }
    }
}

pub async fn save_profile_handler(
    request: Json<SaveProfileRequest>,
    store: &State<ProfileStore>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    let request = request.into_inner();

    if request.name.trim().is_empty() {
        return Err(Json(StandardErrorResponse::new(
            "Profile name cannot be empty".to_string(),
            "INVALID_PROFILE_NAME".to_string(),
            vec!["Provide a non-empty profile name".to_string()],
        )));
    }

    let mut resume = request.resume;
    resume.email = InputSanitizer::sanitize_email(&resume.email);
    resume.phone = InputSanitizer::sanitize_phone(&resume.phone);

    if !resume.email.is_empty() {
        if let Err(reason) = ResumeValidator::validate_email(&resume.email) {
            return Err(Json(StandardErrorResponse::new(
                reason,
                "INVALID_EMAIL".to_string(),
                vec!["Use the format name@example.com".to_string()],
            )));
        }
    }
    if let Err(reason) = ResumeValidator::validate_phone(&resume.phone) {
        return Err(Json(StandardErrorResponse::new(
            reason,
            "INVALID_PHONE".to_string(),
            vec!["Use digits with an optional leading +".to_string()],
        )));
    }

    match store.save(&request.name, &resume).await {
        Ok(()) => Ok(Json(ActionResponse::success(
            format!("Profile '{}' saved", request.name),
            "saved".to_string(),
        ))),
        Err(e) => {
            error!("Failed to save profile '{}': {}", request.name, e);
            Err(Json(StandardErrorResponse::new(
                format!("Failed to save profile: {}", e),
                "PROFILE_SAVE_ERROR".to_string(),
                vec!["Try again in a few moments".to_string()],
            )))
        }
    }
}

pub async fn get_profile_handler(
    name: String,
    store: &State<ProfileStore>,
) -> Result<Json<DataResponse<Resume>>, Json<StandardErrorResponse>> {
    match store.load(&name).await {
        Ok(resume) => Ok(Json(DataResponse::success(
            format!("Loaded profile '{}'", name),
            resume,
        ))),
        Err(e) => Err(Json(StandardErrorResponse::new(
            format!("Profile '{}' not found: {}", name, e),
            "PROFILE_NOT_FOUND".to_string(),
            vec![
                "Check the profile name spelling".to_string(),
                "List existing profiles first".to_string(),
            ],
        ))),
    }
}

pub async fn delete_profile_handler(
    request: Json<DeleteProfileRequest>,
    store: &State<ProfileStore>,
) -> Result<Json<ActionResponse>, Json<StandardErrorResponse>> {
    let request = request.into_inner();

    match store.delete(&request.name).await {
        Ok(()) => Ok(Json(ActionResponse::success(
            format!("Profile '{}' deleted", request.name),
            "deleted".to_string(),
        ))),
        Err(e) => Err(Json(StandardErrorResponse::new(
            format!("Failed to delete profile: {}", e),
            "PROFILE_DELETE_ERROR".to_string(),
            vec!["Check the profile name spelling".to_string()],
        ))),
    }
}

pub async fn get_draft_handler(store: &State<Arc<DraftStore>>) -> Json<DataResponse<Draft>> {
    let draft = store.get().await;
    Json(DataResponse::success("Current draft".to_string(), draft))
}

pub async fn save_draft_handler(
    request: Json<Draft>,
    store: &State<Arc<DraftStore>>,
) -> Json<ActionResponse> {
    store.set(request.into_inner()).await;
    Json(ActionResponse::success(
        "Draft updated".to_string(),
        "updated".to_string(),
    ))
}
