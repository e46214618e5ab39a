// src/data/comment.rs

//! A [`Comment`] is one decoded (datetime, text) pair from one line of a
//! comment log file.

use crate::data::datetime::DateTimeL;

use std::fmt;

/// comment text taken verbatim from the captured group
pub type CommentText = String;

/// One decoded comment.
///
/// `dt` and `text` are immutable after creation; only the record's position
/// within a [`Comments`] sequence changes during reordering.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Comment {
    pub(crate) dt: DateTimeL,
    pub(crate) text: CommentText,
}

impl Comment {
    pub fn new(
        dt: DateTimeL,
        text: CommentText,
    ) -> Comment {
        Comment { dt, text }
    }

    /// the decoded instant
    pub fn dt(&self) -> &DateTimeL {
        &self.dt
    }

    /// the comment text
    pub fn text(&self) -> &str {
        self.text.as_str()
    }
}

impl fmt::Display for Comment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {:?}", self.dt, self.text)
    }
}

/// sequence of [`Comment`]s from one file
pub type Comments = Vec<Comment>;

/// Stable-sort `comments` by ascending datetime.
///
/// `Vec::sort_by` is a stable sort so comments with equal datetimes keep
/// their original appearance order.
pub fn sort_comments(comments: &mut Comments) {
    comments.sort_by(|a, b| a.dt.cmp(&b.dt));
}
