// src/data/template.rs

//! The template compiler: turns a user line-template into a
//! [`CompiledTemplate`].
//!
//! A template is literal line text containing one time placeholder
//! `__TIME[<format-spec>]__` and one comment placeholder `__COMMENT__`, in
//! either order. Inside the brackets a backslash quotes the next character
//! so `\]` does not terminate the placeholder; all backslashes are stripped
//! from the extracted format-spec.
//!
//! Template examples:
//!
//! ```text
//! __TIME[UNIXTIME]__	__COMMENT__
//! __TIME[%H:%M:%S]__ (x) __COMMENT__
//! [__TIME[%Y/%m/%d %H:%M:%S]__] __COMMENT__
//! ```
//!
//! Compilation replaces each placeholder with the non-greedy wildcard
//! capture group `(.+?)`, passes every literal segment through
//! [`regex::escape`], and anchors the pattern over the entire line. Literal
//! template text always matches itself; a user-typed `(` or `.` is not
//! pattern syntax.
//!
//! [`regex::escape`]: https://docs.rs/regex/latest/regex/fn.escape.html

use crate::data::datetime::TimeFormat;

use ::regex::Regex;
use ::si_trace_print::{
    defn,
    defo,
    defx,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// placeholder tokens
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// begin marker of the time placeholder
pub const TIME_BEGIN: &str = "__TIME[";
/// end marker of the time placeholder
pub const TIME_END: &str = "]__";
/// the comment placeholder token
pub const COMMENT_TOKEN: &str = "__COMMENT__";
/// non-greedy wildcard capture group substituted for each placeholder
pub const CAPTURE_GROUP: &str = "(.+?)";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TemplateError
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Failure to compile one user template.
#[derive(Debug)]
pub enum TemplateError {
    /// no `__TIME[` marker, or the `]__` terminator is missing
    MissingTimePlaceholder,
    /// no `__COMMENT__` token
    MissingCommentPlaceholder,
    /// a placeholder token occurs more than once
    DuplicatePlaceholder,
    /// the assembled pattern was rejected by the regex compiler
    PatternCompileFailed(::regex::Error),
}

impl TemplateError {
    /// The historical error class number printed in status messages,
    /// `Error[1]` or `Error[2]`.
    pub const fn error_code(&self) -> u8 {
        match self {
            TemplateError::MissingTimePlaceholder => 1,
            TemplateError::MissingCommentPlaceholder => 1,
            TemplateError::DuplicatePlaceholder => 1,
            TemplateError::PatternCompileFailed(_) => 2,
        }
    }
}

impl std::fmt::Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateError::MissingTimePlaceholder => {
                write!(f, "Error[1]: template has no __TIME[...]__ placeholder")
            }
            TemplateError::MissingCommentPlaceholder => {
                write!(f, "Error[1]: template has no __COMMENT__ placeholder")
            }
            TemplateError::DuplicatePlaceholder => {
                write!(f, "Error[1]: a placeholder occurs more than once in the template")
            }
            TemplateError::PatternCompileFailed(err) => {
                write!(f, "Error[2]: template did not compile to a pattern: {}", err)
            }
        }
    }
}

impl std::error::Error for TemplateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TemplateError::PatternCompileFailed(err) => Some(err),
            _ => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CompiledTemplate
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A compiled template: the derived matching artifact of one pipeline run.
///
/// Immutable once compiled; recompiled whenever the user edits the template.
#[derive(Clone, Debug)]
pub struct CompiledTemplate {
    /// anchored line-matching pattern with exactly two capture groups
    pub regex: Regex,
    /// `true` iff the time placeholder precedes the comment placeholder;
    /// decides which capture group is the timestamp
    pub time_first: bool,
    /// declared time format from the placeholder format-spec
    pub time_format: TimeFormat,
}

/// Locate the `__TIME[…]__` placeholder in `template`.
///
/// Returns `(begin offset, offset one past "]__", format-spec)`.
/// The format-spec has backslash escapes stripped.
fn scan_time_placeholder(template: &str) -> Result<(usize, usize, String), TemplateError> {
    let begin: usize = match template.find(TIME_BEGIN) {
        Some(at) => at,
        None => return Err(TemplateError::MissingTimePlaceholder),
    };
    let inner: &str = &template[begin + TIME_BEGIN.len()..];
    let mut spec = String::with_capacity(inner.len());
    let mut escaped: bool = false;
    for (at, c) in inner.char_indices() {
        if escaped {
            spec.push(c);
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ']' if inner[at + 1..].starts_with("__") => {
                let end: usize = begin + TIME_BEGIN.len() + at + TIME_END.len();

                return Ok((begin, end, spec));
            }
            _ => spec.push(c),
        }
    }

    // no unescaped `]__` terminator
    Err(TemplateError::MissingTimePlaceholder)
}

/// Append `segment` to `pattern`: literal text regex-escaped, an embedded
/// `__COMMENT__` token replaced with [`CAPTURE_GROUP`].
fn push_segment(
    pattern: &mut String,
    segment: &str,
) {
    match segment.split_once(COMMENT_TOKEN) {
        Some((a, b)) => {
            pattern.push_str(&::regex::escape(a));
            pattern.push_str(CAPTURE_GROUP);
            pattern.push_str(&::regex::escape(b));
        }
        None => pattern.push_str(&::regex::escape(segment)),
    }
}

/// Compile a user `template` into a [`CompiledTemplate`].
///
/// Both placeholders must be present exactly once; their left-to-right
/// order in `template` sets [`CompiledTemplate::time_first`].
pub fn compile(template: &str) -> Result<CompiledTemplate, TemplateError> {
    defn!("({:?})", template);

    let (t_begin, t_end, spec) = scan_time_placeholder(template)?;
    let prefix: &str = &template[..t_begin];
    let suffix: &str = &template[t_end..];
    if suffix.contains(TIME_BEGIN) {
        defx!("second time placeholder at suffix");

        return Err(TemplateError::DuplicatePlaceholder);
    }
    let comments_prefix: usize = prefix.matches(COMMENT_TOKEN).count();
    let comments_suffix: usize = suffix.matches(COMMENT_TOKEN).count();
    match comments_prefix + comments_suffix {
        0 => {
            defx!("no comment placeholder");

            return Err(TemplateError::MissingCommentPlaceholder);
        }
        1 => {}
        _ => {
            defx!("comment placeholder occurs {} times", comments_prefix + comments_suffix);

            return Err(TemplateError::DuplicatePlaceholder);
        }
    }
    // the comment placeholder occurs strictly after the time placeholder?
    let time_first: bool = comments_suffix == 1;

    let mut pattern = String::with_capacity(template.len() + 16);
    pattern.push('^');
    push_segment(&mut pattern, prefix);
    pattern.push_str(CAPTURE_GROUP);
    push_segment(&mut pattern, suffix);
    pattern.push('$');
    defo!("pattern {:?}", pattern);

    let regex: Regex = match Regex::new(pattern.as_str()) {
        Ok(val) => val,
        Err(err) => {
            defx!("Regex::new({:?}) failed {}", pattern, err);

            return Err(TemplateError::PatternCompileFailed(err));
        }
    };
    let time_format: TimeFormat = TimeFormat::from_spec(spec.as_str());
    defx!("time_first {:?}, time_format {:?}", time_first, time_format);

    Ok(CompiledTemplate {
        regex,
        time_first,
        time_format,
    })
}
