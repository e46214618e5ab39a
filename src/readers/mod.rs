// src/readers/mod.rs

//! "Readers" for _ncclib_.
//!
//! * A [`CommentReader`] applies a [`CompiledTemplate`] to every line of one
//!   comment log file and derives [`Comment`s].
//!
//! The _ncc_ binary program uses one `CommentReader` instance per file to
//! drive processing for that file.
//!
//! _This is not a rust "Reader"; the struct does not implement the trait
//! [`Read`]. It is a "reader" in an informal sense._
//!
//! [`CommentReader`]: crate::readers::commentreader::CommentReader
//! [`CompiledTemplate`]: crate::data::template::CompiledTemplate
//! [`Comment`s]: crate::data::comment::Comment
//! [`Read`]: std::io::Read

pub mod commentreader;
