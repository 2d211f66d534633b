//! Contact and job application submissions.
//!
//! These are never persisted; they are validated and turned into a
//! notification mail for the site owner.

use serde::Deserialize;

use super::{optional, required};
use crate::errors::AppError;

/// Validated contact form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn mail_subject(&self) -> String {
        format!("Contact Form: {}", self.subject)
    }

    pub fn mail_body(&self) -> String {
        format!(
            "A new contact form submission:\n\nFirst Name: {}\nLast Name: {}\nEmail: {}\nPhone: {}\nSubject: {}\nMessage: {}",
            self.first_name, self.last_name, self.email, self.phone, self.subject, self.message
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ContactRequest {
    pub fn validate(self) -> Result<ContactMessage, AppError> {
        let all_required = || AppError::Validation("All fields are required.".to_string());
        Ok(ContactMessage {
            first_name: required(self.first_name, "First name").map_err(|_| all_required())?,
            last_name: required(self.last_name, "Last name").map_err(|_| all_required())?,
            email: required(self.email, "Email").map_err(|_| all_required())?,
            phone: required(self.phone, "Phone").map_err(|_| all_required())?,
            subject: required(self.subject, "Subject").map_err(|_| all_required())?,
            message: required(self.message, "Message").map_err(|_| all_required())?,
        })
    }
}

/// Validated job application, minus the attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobApplication {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub position: String,
    pub cover_letter: Option<String>,
}

impl JobApplication {
    pub fn mail_subject(&self) -> String {
        format!("Job Application: {}", self.position)
    }

    pub fn mail_body(&self) -> String {
        let mut body = format!(
            "A new job application:\n\nName: {}\nEmail: {}\nPhone: {}\nPosition: {}",
            self.name, self.email, self.phone, self.position
        );
        if let Some(cover_letter) = &self.cover_letter {
            body.push_str("\n\nCover Letter:\n");
            body.push_str(cover_letter);
        }
        body
    }
}

/// Text fields collected from the multipart application form.
#[derive(Debug, Clone, Default)]
pub struct JobApplicationFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub cover_letter: Option<String>,
}

impl JobApplicationFields {
    /// Record a named text field; unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        match name {
            "name" => self.name = Some(value),
            "email" => self.email = Some(value),
            "phone" => self.phone = Some(value),
            "position" => self.position = Some(value),
            "coverLetter" => self.cover_letter = Some(value),
            _ => {}
        }
    }

    pub fn validate(self) -> Result<JobApplication, AppError> {
        Ok(JobApplication {
            name: required(self.name, "Name")?,
            email: required(self.email, "Email")?,
            phone: required(self.phone, "Phone")?,
            position: required(self.position, "Position")?,
            cover_letter: optional(self.cover_letter),
        })
    }
}
