//! Career opening model.

use serde::{Deserialize, Serialize};

use super::{optional, required};
use crate::db::{new_id, now_timestamp, Document};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareerItem {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Document for CareerItem {
    const COLLECTION: &'static str = "careers";
    const LABEL: &'static str = "Career item";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCareerRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CreateCareerRequest {
    pub fn into_career(self) -> Result<CareerItem, AppError> {
        let now = now_timestamp();
        Ok(CareerItem {
            id: new_id(),
            title: required(self.title, "Title")?,
            description: required(self.description, "Description")?,
            requirements: clean_requirements(self.requirements.unwrap_or_default()),
            category: optional(self.category),
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCareerRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub requirements: Option<Vec<String>>,
    #[serde(default)]
    pub category: Option<String>,
}

impl UpdateCareerRequest {
    pub fn apply(self, career: &mut CareerItem) {
        if let Some(title) = optional(self.title) {
            career.title = title;
        }
        if let Some(description) = optional(self.description) {
            career.description = description;
        }
        if let Some(requirements) = self.requirements {
            career.requirements = clean_requirements(requirements);
        }
        if let Some(category) = optional(self.category) {
            career.category = Some(category);
        }
        career.updated_at = now_timestamp();
    }
}

fn clean_requirements(requirements: Vec<String>) -> Vec<String> {
    requirements
        .into_iter()
        .filter_map(|r| optional(Some(r)))
        .collect()
}
