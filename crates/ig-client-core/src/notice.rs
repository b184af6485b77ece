use serde::Serialize;
use std::cell::{Cell, RefCell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub message: String,
}

/// User-visible, dismissible messages.
#[derive(Default)]
pub struct NoticeBoard {
    next_id: Cell<u64>,
    notices: RefCell<Vec<Notice>>,
}

impl NoticeBoard {
    pub fn push(&self, level: NoticeLevel, message: impl Into<String>) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.notices.borrow_mut().push(Notice {
            id,
            level,
            message: message.into(),
        });
        id
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Error, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(NoticeLevel::Info, message)
    }

    /// Returns false if no notice has that id.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut notices = self.notices.borrow_mut();
        let before = notices.len();
        notices.retain(|notice| notice.id != id);
        notices.len() != before
    }

    pub fn clear_errors(&self) {
        self.notices
            .borrow_mut()
            .retain(|notice| notice.level != NoticeLevel::Error);
    }

    pub fn list(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    pub fn latest(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_removes_only_the_given_notice() {
        let board = NoticeBoard::default();
        let first = board.error("Search failed");
        let second = board.info("Wallet connected");

        assert!(board.dismiss(first));
        assert!(!board.dismiss(first));

        let remaining = board.list();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, second);
    }

    #[test]
    fn clear_errors_keeps_info() {
        let board = NoticeBoard::default();
        board.error("Failed to load images");
        board.info("Wallet connected");

        board.clear_errors();

        assert_eq!(board.list().len(), 1);
        assert_eq!(board.latest().map(|n| n.level), Some(NoticeLevel::Info));
    }
}
