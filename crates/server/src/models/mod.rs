//! Domain models.

pub mod page;
pub mod user;
pub mod website;

pub use page::{
    Block, BlockDraft, BlockType, NewBlock, NewPage, Page, PageDraft, PageStatus, PageSummary,
};
pub use user::{CreateUser, NewUser, User, UserSummary};
pub use website::Website;
