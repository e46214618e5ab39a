// src/readers/commentreader.rs

//! Implements a [`CommentReader`], the line parser of one comment log file.

use crate::common::{
    Count,
    FPath,
    LineNumber,
};
use crate::data::comment::{
    Comment,
    Comments,
};
use crate::data::datetime::{
    decode_timestamp,
    DateTimeL,
    FixedOffset,
    TimeError,
};
use crate::data::template::CompiledTemplate;

use std::fmt;
use std::fs;
use std::io;

use ::rand::Rng;
use ::si_trace_print::{
    defn,
    defo,
    defx,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ParseError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// An error that aborts one file's pipeline. Other concurrently processing
/// files are unaffected.
#[derive(Debug)]
pub enum ParseError {
    /// a non-empty line did not match the compiled pattern
    /// (suppressible with `ignore_unparseable`)
    LineMismatch {
        path: FPath,
        lineno: LineNumber,
    },
    /// a matched line carried a timestamp substring that failed to decode
    /// (never suppressed)
    TimeDecodeFailed {
        path: FPath,
        lineno: LineNumber,
        err: TimeError,
    },
    /// the file could not be opened or read
    Io {
        path: FPath,
        err: io::Error,
    },
}

impl ParseError {
    /// The historical error class number printed in status messages,
    /// `Error[3]` or `Error[4]` (`Io` has no number).
    pub const fn error_code(&self) -> Option<u8> {
        match self {
            ParseError::LineMismatch { .. } => Some(3),
            ParseError::TimeDecodeFailed { .. } => Some(4),
            ParseError::Io { .. } => None,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::LineMismatch { path, lineno } => {
                write!(f, "Error[3]: unable to parse file: {} line {}", path, lineno)
            }
            ParseError::TimeDecodeFailed { path, lineno, err } => {
                write!(f, "Error[4]: unable to parse file: {} line {}: {}", path, lineno, err)
            }
            ParseError::Io { path, err } => {
                write!(f, "File {} could not be read: {}", path, err)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::LineMismatch { .. } => None,
            ParseError::TimeDecodeFailed { err, .. } => Some(err),
            ParseError::Io { err, .. } => Some(err),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CommentReader
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Parses all lines of one comment log file into [`Comment`s].
///
/// One `CommentReader` per input file. It owns its raw line buffer and the
/// produced records exclusively; the file is read fully into memory
/// (comment exports are small, tens of thousands of lines at most).
///
/// [`Comment`s]: crate::data::comment::Comment
pub struct CommentReader {
    path: FPath,
    template: CompiledTemplate,
    /// fallback timezone offset for decoded datetimes without a timezone
    tz_offset: FixedOffset,
    /// skip lines that do not match the pattern instead of aborting the file
    ignore_unparseable: bool,
    /// count of lines skipped due to `ignore_unparseable`
    count_lines_skipped: Count,
}

impl fmt::Debug for CommentReader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("CommentReader")
            .field("path", &self.path)
            .field("time_first", &self.template.time_first)
            .field("ignore_unparseable", &self.ignore_unparseable)
            .finish()
    }
}

impl CommentReader {
    pub fn new(
        path: FPath,
        template: CompiledTemplate,
        tz_offset: FixedOffset,
        ignore_unparseable: bool,
    ) -> CommentReader {
        CommentReader {
            path,
            template,
            tz_offset,
            ignore_unparseable,
            count_lines_skipped: 0,
        }
    }

    pub fn path(&self) -> &FPath {
        &self.path
    }

    /// count of structurally unmatched lines skipped during `read_all`
    pub fn count_lines_skipped(&self) -> Count {
        self.count_lines_skipped
    }

    /// Read the entire file and parse every non-empty line into a
    /// [`Comment`].
    ///
    /// Empty lines are skipped unconditionally. A structural mismatch is
    /// skipped when `ignore_unparseable` is set, else it aborts the file.
    /// A timestamp that matches structurally but fails to decode always
    /// aborts the file.
    ///
    /// Records are returned in file appearance order; callers sort with
    /// [`sort_comments`].
    ///
    /// [`sort_comments`]: crate::data::comment::sort_comments
    pub fn read_all<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<Comments, ParseError> {
        defn!("({:?})", self.path);

        let text: String = match fs::read_to_string(&self.path) {
            Ok(val) => val,
            Err(err) => {
                defx!("read_to_string({:?}) failed {}", self.path, err);

                return Err(ParseError::Io {
                    path: self.path.clone(),
                    err,
                });
            }
        };

        let mut comments = Comments::new();
        // `str::lines` strips both `\n` and `\r\n` endings
        for (lineno, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let captures = match self.template.regex.captures(line) {
                Some(val) => val,
                None => {
                    if self.ignore_unparseable {
                        defo!("skip unmatched line {}", lineno);
                        self.count_lines_skipped += 1;
                        continue;
                    }
                    defx!("line {} did not match the pattern", lineno);

                    return Err(ParseError::LineMismatch {
                        path: self.path.clone(),
                        lineno,
                    });
                }
            };
            // the compiled pattern always has exactly two capture groups and
            // an anchored match engages both; treat anything else as a
            // structural mismatch
            let (timestr, comstr): (&str, &str) = match (captures.get(1), captures.get(2)) {
                (Some(a), Some(b)) if self.template.time_first => (a.as_str(), b.as_str()),
                (Some(a), Some(b)) => (b.as_str(), a.as_str()),
                _ => {
                    if self.ignore_unparseable {
                        self.count_lines_skipped += 1;
                        continue;
                    }

                    return Err(ParseError::LineMismatch {
                        path: self.path.clone(),
                        lineno,
                    });
                }
            };
            let dt: DateTimeL =
                match decode_timestamp(&self.template.time_format, timestr, &self.tz_offset, rng) {
                    Ok(val) => val,
                    Err(err) => {
                        defx!("decode_timestamp({:?}) failed at line {}: {}", timestr, lineno, err);

                        return Err(ParseError::TimeDecodeFailed {
                            path: self.path.clone(),
                            lineno,
                            err,
                        });
                    }
                };
            comments.push(Comment::new(dt, String::from(comstr)));
        }
        defx!("return {} comments ({} lines skipped)", comments.len(), self.count_lines_skipped);

        Ok(comments)
    }
}
