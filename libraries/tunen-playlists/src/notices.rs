//! Dismissible notices shown to the viewer.

use std::fmt;
use tunen_core::TuneError;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Error,
}

/// One message on the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub title: String,
    pub detail: Option<String>,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.detail {
            Some(detail) => write!(f, "{} {}", self.title, detail),
            None => f.write_str(&self.title),
        }
    }
}

/// Ordered list of notices, oldest first
#[derive(Debug, Default)]
pub struct NoticeBoard {
    notices: Vec<Notice>,
    next_id: u64,
}

impl NoticeBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a notice and return a copy of it
    pub fn push(&mut self, level: NoticeLevel, title: impl Into<String>, detail: Option<String>) -> Notice {
        self.next_id += 1;
        let notice = Notice {
            id: self.next_id,
            level,
            title: title.into(),
            detail,
        };
        self.notices.push(notice.clone());
        notice
    }

    pub fn success(&mut self, title: impl Into<String>) -> Notice {
        self.push(NoticeLevel::Success, title, None)
    }

    /// Post a failure under a short headline
    pub fn error(&mut self, title: impl Into<String>, err: &TuneError) -> Notice {
        self.push(NoticeLevel::Error, title, Some(err.to_string()))
    }

    /// Remove a notice; false if it was already gone
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
