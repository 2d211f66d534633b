//! Team member model.

use serde::{Deserialize, Serialize};

use super::{optional, required};
use crate::db::{new_id, now_timestamp, Document};
use crate::errors::AppError;

/// Seniority bucket a team member is listed under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    #[default]
    Expert,
    Intern,
}

impl MemberType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberType::Expert => "expert",
            MemberType::Intern => "intern",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s.trim() {
            "expert" => Ok(MemberType::Expert),
            "intern" => Ok(MemberType::Intern),
            other => Err(AppError::Validation(format!(
                "Invalid team member type '{}', expected expert or intern",
                other
            ))),
        }
    }
}

/// Optional social profile links.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

impl SocialLinks {
    fn merge(&mut self, patch: SocialLinks) {
        if let Some(linkedin) = optional(patch.linkedin) {
            self.linkedin = Some(linkedin);
        }
        if let Some(twitter) = optional(patch.twitter) {
            self.twitter = Some(twitter);
        }
        if let Some(github) = optional(patch.github) {
            self.github = Some(github);
        }
    }
}

/// A person shown on the team page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
    pub image: String,
    #[serde(rename = "type")]
    pub member_type: MemberType,
    #[serde(default)]
    pub social_links: SocialLinks,
    pub created_at: String,
    pub updated_at: String,
}

impl Document for TeamMember {
    const COLLECTION: &'static str = "team";
    const LABEL: &'static str = "Team member";

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> &str {
        &self.created_at
    }
}

/// Request body for creating a team member.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "type")]
    pub member_type: Option<String>,
    #[serde(default)]
    pub social_links: Option<SocialLinks>,
}

impl CreateTeamMemberRequest {
    pub fn into_member(self) -> Result<TeamMember, AppError> {
        let member_type = match optional(self.member_type) {
            Some(raw) => MemberType::parse(&raw)?,
            None => MemberType::default(),
        };
        let mut social_links = SocialLinks::default();
        if let Some(links) = self.social_links {
            social_links.merge(links);
        }
        let now = now_timestamp();

        Ok(TeamMember {
            id: new_id(),
            name: required(self.name, "Name")?,
            role: required(self.role, "Role")?,
            image: required(self.image, "Image")?,
            member_type,
            social_links,
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

/// Request body for updating a team member. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeamMemberRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default, rename = "type")]
    pub member_type: Option<String>,
    #[serde(default)]
    pub social_links: Option<SocialLinks>,
}

impl UpdateTeamMemberRequest {
    pub fn apply(self, member: &mut TeamMember) -> Result<(), AppError> {
        if let Some(raw) = optional(self.member_type) {
            member.member_type = MemberType::parse(&raw)?;
        }
        if let Some(name) = optional(self.name) {
            member.name = name;
        }
        if let Some(role) = optional(self.role) {
            member.role = role;
        }
        if let Some(image) = optional(self.image) {
            member.image = image;
        }
        if let Some(links) = self.social_links {
            member.social_links.merge(links);
        }
        member.updated_at = now_timestamp();
        Ok(())
    }
}
