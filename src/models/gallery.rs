//! Gallery item model.
//!
//! The media reference depends on the item type: images and events carry an
//! `imageUrl`, videos carry a `videoUrl`. The variant is the type tag, so an
//! item without the matching URL cannot be represented.

use serde::{Deserialize, Serialize};

use super::{optional, required};
use crate::db::{new_id, now_timestamp, Document};
use crate::errors::AppError;

/// Gallery item type, as used in routes and filters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GalleryKind {
    Image,
    Video,
    Event,
}

impl GalleryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GalleryKind::Image => "image",
            GalleryKind::Video => "video",
            GalleryKind::Event => "event",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.trim() {
            "image" => Ok(GalleryKind::Image),
            "video" => Ok(GalleryKind::Video),
            "event" => Ok(GalleryKind::Event),
            other => Err(AppError::Validation(format!(
                "Invalid gallery type '{}', expected image, video or event",
                other
            ))),
        }
    }

    /// Label used in type-scoped not-found and delete messages.
    pub fn label(&self) -> &'static str {
        match self {
            GalleryKind::Image => "Image",
            GalleryKind::Video => "Video",
            GalleryKind::Event => "Event",
        }
    }
}

/// Media reference, tagged by item type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum GalleryMedia {
    #[serde(rename_all = "camelCase")]
    Image { image_url: String },
    #[serde(rename_all = "camelCase")]
    Video { video_url: String },
    #[serde(rename_all = "camelCase")]
    Event { image_url: String },
}

impl GalleryMedia {
    /// Build the variant for `kind`, requiring the URL that kind needs.
    pub fn from_parts(
        kind: GalleryKind,
        image_url: Option<String>,
        video_url: Option<String>,
    ) -> Result<Self, AppError> {
        match kind {
            GalleryKind::Image => Ok(GalleryMedia::Image {
                image_url: required(image_url, "imageUrl")?,
            }),
            GalleryKind::Video => Ok(GalleryMedia::Video {
                video_url: required(video_url, "videoUrl")?,
            }),
            GalleryKind::Event => Ok(GalleryMedia::Event {
                image_url: required(image_url, "imageUrl")?,
            }),
        }
    }

    pub fn kind(&self) -> GalleryKind {
        match self {
            GalleryMedia::Image { .. } => GalleryKind::Image,
            GalleryMedia::Video { .. } => GalleryKind::Video,
            GalleryMedia::Event { .. } => GalleryKind::Event,
        }
    }

    fn image_url(&self) -> Option<&str> {
        match self {
            GalleryMedia::Image { image_url } | GalleryMedia::Event { image_url } => {
                Some(image_url.as_str())
            }
            GalleryMedia::Video { .. } => None,
        }
    }

    fn video_url(&self) -> Option<&str> {
        match self {
            GalleryMedia::Video { video_url } => Some(video_url.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(flatten)]
    pub media: GalleryMedia,
    pub created_at: String,
    pub updated_at: String,
}

impl Document for GalleryItem {
    const COLLECTION: &'static str = "gallery";
    const LABEL: &'static str = "Gallery item";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// Request body for creating a gallery item.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGalleryItemRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl CreateGalleryItemRequest {
    /// Validate into a new item. `kind` overrides any type in the body.
    pub fn into_item(self, kind: Option<GalleryKind>) -> Result<GalleryItem, AppError> {
        let kind = match kind {
            Some(kind) => kind,
            None => GalleryKind::parse(&required(self.kind, "Type")?)?,
        };
        let title = required(self.title, "Title")?;
        let description = required(self.description, "Description")?;
        let media = GalleryMedia::from_parts(kind, self.image_url, self.video_url)?;
        let now = now_timestamp();

        Ok(GalleryItem {
            id: new_id(),
            title,
            description,
            media,
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

/// Request body for updating a gallery item. Absent fields are left unchanged;
/// the merged item must still carry the URL its type requires.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGalleryItemRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

impl UpdateGalleryItemRequest {
    pub fn apply(self, item: &mut GalleryItem) -> Result<(), AppError> {
        let kind = match optional(self.kind) {
            Some(raw) => GalleryKind::parse(&raw)?,
            None => item.media.kind(),
        };
        let image_url = optional(self.image_url);
        let video_url = optional(self.video_url);
        match kind {
            GalleryKind::Video if image_url.is_some() => {
                return Err(AppError::Validation(
                    "imageUrl does not apply to video items".to_string(),
                ));
            }
            GalleryKind::Image | GalleryKind::Event if video_url.is_some() => {
                return Err(AppError::Validation(format!(
                    "videoUrl does not apply to {} items",
                    kind.as_str()
                )));
            }
            _ => {}
        }
        let image_url = image_url.or_else(|| item.media.image_url().map(String::from));
        let video_url = video_url.or_else(|| item.media.video_url().map(String::from));
        item.media = GalleryMedia::from_parts(kind, image_url, video_url)?;

        if let Some(title) = optional(self.title) {
            item.title = title;
        }
        if let Some(description) = optional(self.description) {
            item.description = description;
        }
        item.updated_at = now_timestamp();
        Ok(())
    }
}
