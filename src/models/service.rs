//! Service offering model.

use serde::{Deserialize, Serialize};

use super::{optional, required};
use crate::db::{new_id, now_timestamp, Document};
use crate::errors::AppError;

/// A single selling point listed under a service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceFeature {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceItem {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub features: Vec<ServiceFeature>,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Document for ServiceItem {
    const COLLECTION: &'static str = "services";
    const LABEL: &'static str = "Service";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<ServiceFeature>>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl CreateServiceRequest {
    pub fn into_service(self) -> Result<ServiceItem, AppError> {
        let now = now_timestamp();
        Ok(ServiceItem {
            id: new_id(),
            title: required(self.title, "Title")?,
            description: required(self.description, "Description")?,
            features: self.features.unwrap_or_default(),
            image: required(self.image, "Image")?,
            category: optional(self.category),
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

/// Absent fields are left unchanged; a present `features` list replaces the old one.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateServiceRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub features: Option<Vec<ServiceFeature>>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl UpdateServiceRequest {
    pub fn apply(self, service: &mut ServiceItem) {
        if let Some(title) = optional(self.title) {
            service.title = title;
        }
        if let Some(description) = optional(self.description) {
            service.description = description;
        }
        if let Some(features) = self.features {
            service.features = features;
        }
        if let Some(image) = optional(self.image) {
            service.image = image;
        }
        if let Some(category) = optional(self.category) {
            service.category = Some(category);
        }
        service.updated_at = now_timestamp();
    }
}
