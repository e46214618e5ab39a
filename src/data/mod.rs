// src/data/mod.rs

//! The `data` module is specialized data containers and derived artifacts:
//! compiled [`Template`s], decoded datetimes, and [`Comment`]s.
//!
//! ## Definitions of data
//!
//! ### Template
//!
//! A "template" is a user-authored line-matching specification: literal line
//! text with one time placeholder `__TIME[<format-spec>]__` and one comment
//! placeholder `__COMMENT__`. A compiled template is represented by a
//! [`CompiledTemplate`] and created by [`compile`].
//!
//! ### Comment
//!
//! A "comment" is one decoded (datetime, text) pair extracted from a single
//! line of a comment log file:
//!
//! * the datetime is the line's timestamp substring decoded per the
//!   template's format-spec.
//! * the text is the line's comment substring, taken verbatim.
//!
//! A comment is represented by a [`Comment`] and found by a
//! [`CommentReader`].
//!
//! [`Template`s]: crate::data::template::CompiledTemplate
//! [`CompiledTemplate`]: crate::data::template::CompiledTemplate
//! [`compile`]: crate::data::template::compile
//! [`Comment`]: crate::data::comment::Comment
//! [`CommentReader`]: crate::readers::commentreader::CommentReader

pub mod comment;
pub mod datetime;
pub mod template;
