//! Raw submissions and validated drafts
//!
//! A [`PostSubmission`] is what a client sent. A [`PostDraft`] is the part of
//! it that passed validation, bound to its owner; images are validated and
//! processed separately by the ingestion service.

use bytes::Bytes;

use super::entity::Owner;
use super::pricing::Pricing;
use super::{PostError, Result};
use crate::identity::Identity;

/// Maximum title length in characters
pub const MAX_TITLE_CHARS: usize = 120;

/// Maximum description length in characters
pub const MAX_DESCRIPTION_CHARS: usize = 2000;

/// One submitted photo, before transcoding
#[derive(Debug, Clone)]
pub struct RawImage {
    pub data: Bytes,
    /// Original file name, used only to make storage keys readable
    pub file_name: Option<String>,
}

impl RawImage {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            file_name: None,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// A create-post request as received from a client
#[derive(Debug, Clone, Default)]
pub struct PostSubmission {
    pub title: String,
    pub description: String,
    pub price: Option<String>,
    pub allow_comments: Option<bool>,
    pub allow_likes: Option<bool>,
    pub images: Vec<RawImage>,
}

impl PostSubmission {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        images: Vec<RawImage>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            images,
            ..Default::default()
        }
    }

    pub fn with_price(mut self, price: impl Into<String>) -> Self {
        self.price = Some(price.into());
        self
    }

    pub fn with_allow_comments(mut self, allow: bool) -> Self {
        self.allow_comments = Some(allow);
        self
    }

    pub fn with_allow_likes(mut self, allow: bool) -> Self {
        self.allow_likes = Some(allow);
        self
    }
}

/// Validated post fields, bound to the owner
#[derive(Debug, Clone)]
pub struct PostDraft {
    owner: Owner,
    title: String,
    description: String,
    pricing: Pricing,
    allow_comments: bool,
    allow_likes: bool,
}

impl PostDraft {
    pub fn builder(identity: &Identity) -> PostDraftBuilder<'_> {
        PostDraftBuilder {
            identity,
            title: String::new(),
            description: String::new(),
            price: None,
            allow_comments: true,
            allow_likes: true,
        }
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn pricing(&self) -> &Pricing {
        &self.pricing
    }

    pub fn allow_comments(&self) -> bool {
        self.allow_comments
    }

    pub fn allow_likes(&self) -> bool {
        self.allow_likes
    }

    pub(crate) fn into_parts(self) -> (Owner, String, String, Pricing, bool, bool) {
        (
            self.owner,
            self.title,
            self.description,
            self.pricing,
            self.allow_comments,
            self.allow_likes,
        )
    }
}

/// Builder that validates text fields and resolves pricing from the owner's role
pub struct PostDraftBuilder<'a> {
    identity: &'a Identity,
    title: String,
    description: String,
    price: Option<String>,
    allow_comments: bool,
    allow_likes: bool,
}

impl<'a> PostDraftBuilder<'a> {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn price(mut self, price: Option<impl Into<String>>) -> Self {
        self.price = price.map(Into::into);
        self
    }

    pub fn allow_comments(mut self, allow: bool) -> Self {
        self.allow_comments = allow;
        self
    }

    pub fn allow_likes(mut self, allow: bool) -> Self {
        self.allow_likes = allow;
        self
    }

    pub fn build(self) -> Result<PostDraft> {
        let title = required_text("Title", &self.title, MAX_TITLE_CHARS)?;
        let description = required_text("Description", &self.description, MAX_DESCRIPTION_CHARS)?;
        let pricing = Pricing::resolve(self.identity.role, self.price.as_deref())?;

        Ok(PostDraft {
            owner: Owner::from(self.identity),
            title,
            description,
            pricing,
            allow_comments: self.allow_comments,
            allow_likes: self.allow_likes,
        })
    }
}

fn required_text(field: &str, value: &str, max_chars: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(PostError::validation(format!("{field} is required")));
    }
    let chars = trimmed.chars().count();
    if chars > max_chars {
        return Err(PostError::validation(format!(
            "{field} is too long ({chars} characters, maximum {max_chars})"
        )));
    }
    Ok(trimmed.to_string())
}
