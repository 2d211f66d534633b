//! Blog post model.

use serde::{Deserialize, Serialize};

use super::{optional, required};
use crate::db::{new_id, now_timestamp, Document};
use crate::errors::AppError;

/// Publication state of a post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlogStatus {
    Draft,
    Published,
}

impl BlogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlogStatus::Draft => "Draft",
            BlogStatus::Published => "Published",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.trim() {
            "Draft" => Ok(BlogStatus::Draft),
            "Published" => Ok(BlogStatus::Published),
            other => Err(AppError::Validation(format!(
                "Invalid blog status '{}', expected Draft or Published",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub status: BlogStatus,
    pub created_at: String,
    pub updated_at: String,
}

impl Document for BlogPost {
    const COLLECTION: &'static str = "blog";
    const LABEL: &'static str = "Blog post";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// Request body for creating a post. New posts always start as drafts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBlogPostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl CreateBlogPostRequest {
    pub fn into_post(self) -> Result<BlogPost, AppError> {
        let now = now_timestamp();
        Ok(BlogPost {
            id: new_id(),
            title: required(self.title, "Title")?,
            excerpt: required(self.excerpt, "Excerpt")?,
            content: required(self.content, "Content")?,
            image: optional(self.image),
            status: BlogStatus::Draft,
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBlogPostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl UpdateBlogPostRequest {
    pub fn apply(self, post: &mut BlogPost) -> Result<(), AppError> {
        if let Some(raw) = optional(self.status) {
            post.status = BlogStatus::parse(&raw)?;
        }
        if let Some(title) = optional(self.title) {
            post.title = title;
        }
        if let Some(excerpt) = optional(self.excerpt) {
            post.excerpt = excerpt;
        }
        if let Some(content) = optional(self.content) {
            post.content = content;
        }
        if let Some(image) = optional(self.image) {
            post.image = Some(image);
        }
        post.updated_at = now_timestamp();
        Ok(())
    }
}
