use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::validator::Validator;

pub const MAX_TAGS: usize = 5;
pub const MAX_TITLE_BYTES: usize = 500;

/// Code attached to a card. Both fields are required when a snippet is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub code: String,
    pub language: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub title: String,
    pub tags: Vec<String>,
    pub content: String,
    pub next_review_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_snippet: Option<CodeSnippet>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of a create request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewCard {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub code_snippet: Option<CodeSnippet>,
    pub description: Option<String>,
}

/// Partial update. Omitted fields are left as they are.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CardPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub code_snippet: Option<CodeSnippet>,
    pub description: Option<String>,
    pub update_review_date: Option<bool>,
}

impl CardPatch {
    pub fn reschedule_requested(&self) -> bool {
        self.update_review_date.unwrap_or(false)
    }

    /// Copy every provided field onto `card`.
    pub fn apply_to(self, card: &mut Card) {
        if let Some(title) = self.title {
            card.title = title;
        }
        if let Some(content) = self.content {
            card.content = content;
        }
        if let Some(tags) = self.tags {
            card.tags = tidy_tags(tags);
        }
        if let Some(snippet) = self.code_snippet {
            card.code_snippet = Some(snippet);
        }
        if let Some(description) = self.description {
            card.description = Some(description);
        }
    }
}

/// Trim surrounding whitespace from each tag, keeping order.
pub fn tidy_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter().map(|t| t.trim().to_string()).collect()
}

pub fn validate_card_fields(
    v: &mut Validator,
    title: &str,
    content: &str,
    tags: &[String],
    code_snippet: Option<&CodeSnippet>,
) {
    v.check(!title.trim().is_empty(), "title", "must be provided");
    v.check(
        title.len() <= MAX_TITLE_BYTES,
        "title",
        "must not be more than 500 bytes long",
    );
    v.check(!content.trim().is_empty(), "content", "must be provided");
    v.check(!tags.is_empty(), "tags", "must contain at least 1 tag");
    v.check(tags.len() <= MAX_TAGS, "tags", "must not contain more than 5 tags");
    v.check(
        tags.iter().all(|t| !t.trim().is_empty()),
        "tags",
        "must not contain blank tags",
    );

    if let Some(snippet) = code_snippet {
        v.check(!snippet.code.trim().is_empty(), "code_snippet", "code must be provided");
        v.check(
            !snippet.language.trim().is_empty(),
            "code_snippet",
            "language must be provided",
        );
    }
}

impl NewCard {
    pub fn validate(&self, v: &mut Validator) {
        validate_card_fields(
            v,
            &self.title,
            &self.content,
            &self.tags,
            self.code_snippet.as_ref(),
        );
    }
}

impl Card {
    pub fn validate(&self, v: &mut Validator) {
        validate_card_fields(
            v,
            &self.title,
            &self.content,
            &self.tags,
            self.code_snippet.as_ref(),
        );
    }
}
