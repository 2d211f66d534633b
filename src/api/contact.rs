//! Contact form endpoint.

use axum::extract::State;

use super::{admin_recipient, message, ApiJson, ApiResult, MessageResponse};
use crate::mail::OutboundMail;
use crate::models::ContactRequest;
use crate::AppState;

/// POST /api/contact - Forward a contact form to the site owner.
pub async fn submit_contact(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ContactRequest>,
) -> ApiResult<MessageResponse> {
    let contact = request.validate()?;
    let recipient = admin_recipient(&state)?;

    let mail = OutboundMail::new(recipient, contact.mail_subject(), contact.mail_body());
    state.mailer.send(mail).await?;

    tracing::info!(provider = state.mailer.provider(), "Contact message forwarded");
    Ok(message("Message sent successfully."))
}
