//! Structural validation of page drafts.
//!
//! Collects every problem in a draft instead of stopping at the first one, so
//! a client can highlight all offending fields at once. Checks that need
//! storage (owner existence, image names) live in the page service.

use chrono::NaiveDate;

use crate::error::FieldError;
use crate::models::{BlockType, NewBlock, NewPage, PageDraft};

/// Minimum number of blocks on a page.
pub const MIN_BLOCKS: usize = 2;

/// A draft that passed structural validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft {
    pub owner_user_id: Option<i64>,
    pub title: String,
    pub creation_date: NaiveDate,
    pub publication_date: Option<NaiveDate>,
    pub blocks: Vec<NewBlock>,
}

impl ValidDraft {
    pub fn into_new_page(self, owner_user_id: i64) -> NewPage {
        NewPage {
            owner_user_id,
            title: self.title,
            creation_date: self.creation_date,
            publication_date: self.publication_date,
            blocks: self.blocks,
        }
    }

    /// Contents of every Image block.
    pub fn image_names(&self) -> impl Iterator<Item = (usize, &str)> {
        self.blocks
            .iter()
            .enumerate()
            .filter(|(_, b)| b.block_type == BlockType::Image)
            .map(|(i, b)| (i, b.content.as_str()))
    }
}

/// Parse a strict `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

/// Validate the shape of a draft.
pub fn validate_draft(draft: &PageDraft) -> Result<ValidDraft, Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = draft.title.trim();
    if title.is_empty() {
        errors.push(FieldError::new("title", "must not be empty"));
    }

    let creation_date = parse_date(&draft.creation_date);
    if creation_date.is_none() {
        errors.push(FieldError::new(
            "creationDate",
            "must be a valid date in YYYY-MM-DD format",
        ));
    }

    let publication_date = match draft.publication_date.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let parsed = parse_date(raw);
            if parsed.is_none() {
                errors.push(FieldError::new(
                    "publicationDate",
                    "must be a valid date in YYYY-MM-DD format",
                ));
            }
            parsed
        }
    };

    if let (Some(created), Some(published)) = (creation_date, publication_date) {
        if published < created {
            errors.push(FieldError::new(
                "publicationDate",
                "must not be before the creation date",
            ));
        }
    }

    let blocks = validate_blocks(draft, &mut errors);

    match (creation_date, errors.is_empty()) {
        (Some(creation_date), true) => Ok(ValidDraft {
            owner_user_id: draft.owner_user_id,
            title: title.to_string(),
            creation_date,
            publication_date,
            blocks,
        }),
        _ => Err(errors),
    }
}

fn validate_blocks(draft: &PageDraft, errors: &mut Vec<FieldError>) -> Vec<NewBlock> {
    if draft.blocks.len() < MIN_BLOCKS {
        errors.push(FieldError::new(
            "blocks",
            format!("a page needs at least {MIN_BLOCKS} blocks"),
        ));
    }

    let mut blocks = Vec::with_capacity(draft.blocks.len());
    for (index, block) in draft.blocks.iter().enumerate() {
        let position = index + 1;

        let block_type = block.block_type.parse::<BlockType>().ok();
        if block_type.is_none() {
            errors.push(FieldError::new(
                format!("blocks[{index}].type"),
                "must be one of Header, Paragraph, Image",
            ));
        }

        if block.content.trim().is_empty() {
            errors.push(FieldError::new(
                format!("blocks[{index}].content"),
                "must not be empty",
            ));
        }

        // An explicit order must agree with the list position.
        let order = match block.order {
            None => i32::try_from(position).ok(),
            Some(order) if usize::try_from(order).ok() == Some(position) => {
                i32::try_from(order).ok()
            }
            Some(order) => {
                errors.push(FieldError::new(
                    format!("blocks[{index}].order"),
                    format!("expected {position}, got {order}; orders must run 1..N in list order"),
                ));
                None
            }
        };

        if let (Some(block_type), Some(order)) = (block_type, order) {
            blocks.push(NewBlock {
                block_type,
                content: block.content.clone(),
                order,
            });
        }
    }

    let has_header = draft
        .blocks
        .iter()
        .any(|b| b.block_type == BlockType::Header.as_str());
    if !draft.blocks.is_empty() && !has_header {
        errors.push(FieldError::new(
            "blocks",
            "a page needs at least one Header block",
        ));
    }

    blocks
}
