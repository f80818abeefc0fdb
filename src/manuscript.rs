//! Manuscript structuring output.
//!
//! The structuring service turns raw manuscript text into a title, blurb,
//! cover-art prompt and an ordered list of chapters. This module only models
//! that response and maps it onto a [`Book`]; it never calls the service.

use serde::{Deserialize, Serialize};

use crate::book::{Book, Chapter};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredManuscript {
    pub title: String,
    pub description: String,
    pub cover_prompt: String,
    pub chapters: Vec<StructuredChapter>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StructuredChapter {
    pub title: String,
    pub content: String,
    pub summary: String,
    pub image_prompt: String,
}

impl StructuredManuscript {
    /// Build a book without artwork; prompts are dropped, chapter ids are
    /// `chapter-1`, `chapter-2`, ...
    pub fn into_book(self, author: &str) -> Book {
        let chapters = self
            .chapters
            .into_iter()
            .enumerate()
            .map(|(i, ch)| Chapter {
                id: format!("chapter-{}", i + 1),
                title: ch.title,
                content: ch.content,
                image_url: None,
            })
            .collect();
        Book {
            title: self.title,
            author: author.to_string(),
            description: self.description,
            chapters,
            ..Book::default()
        }
    }
}

/// Parse either an editor book or a structuring-service response.
///
/// A top-level `coverPrompt` key selects the structuring shape; `author`
/// fills in the author field in that case.
pub fn parse_book_json(json: &str, author: &str) -> Result<Book, String> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| format!("Invalid JSON: {e}"))?;
    if !value.is_object() {
        return Err("Expected a JSON object at the top level".to_string());
    }
    if value.get("coverPrompt").is_some() {
        let manuscript: StructuredManuscript = serde_json::from_value(value)
            .map_err(|e| format!("Invalid manuscript JSON: {e}"))?;
        Ok(manuscript.into_book(author))
    } else {
        let mut book: Book =
            serde_json::from_value(value).map_err(|e| format!("Invalid book JSON: {e}"))?;
        if book.author.trim().is_empty() {
            book.author = author.to_string();
        }
        Ok(book)
    }
}
