//! Career API endpoints and job applications.

use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    Json,
};

use super::{
    admin_recipient, created, message, ApiJson, ApiResult, CategoryQuery, Created,
    MessageResponse,
};
use crate::errors::AppError;
use crate::mail::{Attachment, OutboundMail};
use crate::models::{
    CareerItem, CreateCareerRequest, JobApplication, JobApplicationFields, UpdateCareerRequest,
};
use crate::uploads::{StoredFile, MAX_RESUME_BYTES, RESUME_CONTENT_TYPE};
use crate::AppState;

/// Multipart field carrying the resume file.
const RESUME_FIELD: &str = "resume";

/// GET /api/career - List openings, newest first.
pub async fn list_careers(
    State(state): State<AppState>,
    Query(query): Query<CategoryQuery>,
) -> ApiResult<Vec<CareerItem>> {
    Ok(Json(state.store.list(query.filter().as_ref()).await?))
}

/// GET /api/career/category/:category
pub async fn list_careers_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> ApiResult<Vec<CareerItem>> {
    let filter = CategoryQuery::from_path(category);
    Ok(Json(state.store.list(filter.as_ref()).await?))
}

/// GET /api/career/:id
pub async fn get_career(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<CareerItem> {
    Ok(Json(state.store.get(&id).await?))
}

/// POST /api/career
pub async fn create_career(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCareerRequest>,
) -> Created<CareerItem> {
    let career = request.into_career()?;
    state.store.insert(&career).await?;
    tracing::info!(id = %career.id, "Career item created");
    Ok(created(career))
}

/// PUT /api/career/:id
pub async fn update_career(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(request): ApiJson<UpdateCareerRequest>,
) -> ApiResult<CareerItem> {
    let mut career: CareerItem = state.store.get(&id).await?;
    request.apply(&mut career);
    state.store.replace(&career).await?;
    Ok(Json(career))
}

/// DELETE /api/career/:id
pub async fn delete_career(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MessageResponse> {
    state.store.delete::<CareerItem>(&id, None).await?;
    tracing::info!(%id, "Career item deleted");
    Ok(message("Career item deleted successfully"))
}

/// Compare the media type essence, ignoring parameters and case.
fn is_pdf(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case(RESUME_CONTENT_TYPE))
}

struct ResumeUpload {
    filename: String,
    content_type: String,
    bytes: Bytes,
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::Validation(format!("Invalid form data: {}", err.body_text()))
}

async fn send_application(
    state: &AppState,
    application: &JobApplication,
    recipient: String,
    stored: &StoredFile,
) -> Result<(), AppError> {
    let bytes = state.uploads.read(stored).await?;
    let mail = OutboundMail::new(
        recipient,
        application.mail_subject(),
        application.mail_body(),
    )
    .with_attachment(Attachment {
        filename: stored.original_name.clone(),
        content_type: RESUME_CONTENT_TYPE.to_string(),
        bytes,
    });
    state.mailer.send(mail).await?;
    Ok(())
}

/// POST /api/career/apply - Mail a job application with its PDF resume.
pub async fn apply_for_career(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<MessageResponse> {
    let mut fields = JobApplicationFields::default();
    let mut resume = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == RESUME_FIELD {
            let filename = field.file_name().unwrap_or("resume.pdf").to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(multipart_error)?;
            resume = Some(ResumeUpload {
                filename,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.set(&name, value);
        }
    }

    let application = fields.validate()?;
    let resume = resume.ok_or_else(|| AppError::Validation("Resume is required".to_string()))?;
    if !is_pdf(&resume.content_type) {
        return Err(AppError::Validation(
            "Invalid file type. Only PDF files are allowed for resumes.".to_string(),
        ));
    }
    if resume.bytes.len() > MAX_RESUME_BYTES {
        return Err(AppError::Validation(
            "Resume exceeds the 2MB size limit".to_string(),
        ));
    }
    let recipient = admin_recipient(&state)?;

    let stored = state.uploads.save(&resume.filename, &resume.bytes).await?;
    let outcome = send_application(&state, &application, recipient, &stored).await;

    // The upload is transient whether or not delivery succeeds
    if let Err(e) = state.uploads.remove(&stored).await {
        tracing::warn!("Failed to remove uploaded resume: {}", e);
    }
    outcome?;

    tracing::info!(position = %application.position, "Job application forwarded");
    Ok(message("Application submitted successfully."))
}
