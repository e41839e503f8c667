//! Content management: pages, blocks, images, and who may touch them.

pub mod credentials;
pub mod images;
pub mod page_service;
pub mod policy;
pub mod query_service;
pub mod validate;
pub mod website;

use chrono::NaiveDate;

pub use images::ImageLibrary;
pub use page_service::PageService;
pub use policy::Actor;
pub use query_service::{QueryService, View, ViewQuery};
pub use website::WebsiteService;

/// Today's date in server-local time, used to decide what is published.
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
