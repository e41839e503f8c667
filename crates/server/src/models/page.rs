//! Page and block models.
//!
//! A page owns an ordered list of blocks. Blocks never exist without their
//! page: they are written together and deleted together.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of content a block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockType {
    Header,
    Paragraph,
    /// `content` names a file in the image library.
    Image,
}

impl BlockType {
    /// Stored and serialized name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Header => "Header",
            Self::Paragraph => "Paragraph",
            Self::Image => "Image",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlockType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Header" => Ok(Self::Header),
            "Paragraph" => Ok(Self::Paragraph),
            "Image" => Ok(Self::Image),
            other => anyhow::bail!("unknown block type '{other}'"),
        }
    }
}

/// Persisted block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: i64,
    pub page_id: i64,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: String,
    /// 1-based position within the page.
    pub order: i32,
}

/// Publication state derived from the publication date and today's date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    /// No publication date.
    Draft,
    /// Publication date in the future.
    Scheduled,
    Published,
}

impl PageStatus {
    pub fn from_dates(publication_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match publication_date {
            None => Self::Draft,
            Some(date) if date > today => Self::Scheduled,
            Some(_) => Self::Published,
        }
    }
}

/// Persisted page with its blocks in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: i64,
    pub owner_user_id: i64,
    /// Owner's username.
    pub author: String,
    pub title: String,
    pub creation_date: NaiveDate,
    pub publication_date: Option<NaiveDate>,
    pub blocks: Vec<Block>,
}

impl Page {
    /// Published iff a publication date is set and is not after `today`.
    pub fn is_published(&self, today: NaiveDate) -> bool {
        self.status(today) == PageStatus::Published
    }

    pub fn status(&self, today: NaiveDate) -> PageStatus {
        PageStatus::from_dates(self.publication_date, today)
    }
}

/// Page listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub id: i64,
    pub owner_user_id: i64,
    pub author: String,
    pub title: String,
    pub creation_date: NaiveDate,
    pub publication_date: Option<NaiveDate>,
}

impl PageSummary {
    pub fn is_published(&self, today: NaiveDate) -> bool {
        self.status(today) == PageStatus::Published
    }

    pub fn status(&self, today: NaiveDate) -> PageStatus {
        PageStatus::from_dates(self.publication_date, today)
    }
}

/// Listing order: by publication date ascending, undated pages last, then id.
pub fn listing_order(a: &PageSummary, b: &PageSummary) -> std::cmp::Ordering {
    let key = |p: &PageSummary| (p.publication_date.is_none(), p.publication_date, p.id);
    key(a).cmp(&key(b))
}

/// Page draft as submitted by a client, before validation.
///
/// Missing fields default to empty so that they surface as field-level
/// validation errors. A value of the wrong JSON type still rejects the whole
/// body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageDraft {
    /// Must match the path id on update when present.
    pub id: Option<i64>,
    pub owner_user_id: Option<i64>,
    pub title: String,
    pub creation_date: String,
    pub publication_date: Option<String>,
    pub blocks: Vec<BlockDraft>,
}

/// Block as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BlockDraft {
    #[serde(rename = "type")]
    pub block_type: String,
    pub content: String,
    #[serde(alias = "blockOrder")]
    pub order: Option<i64>,
}

/// Validated page contents ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPage {
    pub owner_user_id: i64,
    pub title: String,
    pub creation_date: NaiveDate,
    pub publication_date: Option<NaiveDate>,
    pub blocks: Vec<NewBlock>,
}

/// Validated block ready for storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBlock {
    pub block_type: BlockType,
    pub content: String,
    pub order: i32,
}
