//! Authorization policy for pages.
//!
//! Pure predicates over an [`Actor`] and a page. No I/O, no side effects.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{Page, User};

/// The authenticated caller of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: i64,
    pub is_admin: bool,
}

impl Actor {
    pub fn new(id: i64, is_admin: bool) -> Self {
        Self { id, is_admin }
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.is_admin)
    }
}

/// Owner or admin may modify the page.
pub fn can_edit(actor: &Actor, owner_user_id: i64) -> bool {
    actor.is_admin || actor.id == owner_user_id
}

/// Anyone may view a published page; owners and admins may view any of theirs.
pub fn can_view(actor: Option<&Actor>, page: &Page, today: NaiveDate) -> bool {
    page.is_published(today) || actor.is_some_and(|a| can_edit(a, page.owner_user_id))
}

/// Only admins may author pages on behalf of someone else.
pub fn can_assign_owner(actor: &Actor, owner_user_id: i64) -> bool {
    actor.is_admin || actor.id == owner_user_id
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn page(owner: i64, publication_date: Option<&str>) -> Page {
        Page {
            id: 1,
            owner_user_id: owner,
            author: "owner".to_string(),
            title: "T".to_string(),
            creation_date: date("2024-01-01"),
            publication_date: publication_date.map(date),
            blocks: Vec::new(),
        }
    }

    #[test]
    fn owner_and_admin_can_edit() {
        assert!(can_edit(&Actor::new(5, false), 5));
        assert!(can_edit(&Actor::new(1, true), 5));
        assert!(!can_edit(&Actor::new(2, false), 5));
    }

    #[test]
    fn published_pages_are_public() {
        let today = date("2024-06-01");
        let published = page(5, Some("2024-05-01"));
        assert!(can_view(None, &published, today));
        assert!(can_view(Some(&Actor::new(2, false)), &published, today));
    }

    #[test]
    fn unpublished_pages_need_owner_or_admin() {
        let today = date("2024-06-01");
        for unpublished in [page(5, None), page(5, Some("2024-07-01"))] {
            assert!(!can_view(None, &unpublished, today));
            assert!(!can_view(Some(&Actor::new(2, false)), &unpublished, today));
            assert!(can_view(Some(&Actor::new(5, false)), &unpublished, today));
            assert!(can_view(Some(&Actor::new(9, true)), &unpublished, today));
        }
    }

    #[test]
    fn page_goes_public_on_its_publication_day() {
        let scheduled = page(5, Some("2024-06-02"));
        assert!(!can_view(None, &scheduled, date("2024-06-01")));
        assert!(can_view(None, &scheduled, date("2024-06-02")));
    }

    #[test]
    fn only_admin_assigns_other_owners() {
        assert!(can_assign_owner(&Actor::new(5, false), 5));
        assert!(!can_assign_owner(&Actor::new(5, false), 6));
        assert!(can_assign_owner(&Actor::new(1, true), 6));
    }
}
