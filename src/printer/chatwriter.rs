// src/printer/chatwriter.rs

//! Encode sorted [`Comment`s] as relative playback offsets and serialize
//! them as NicoNico-style `<chat>` records.
//!
//! One record per input comment:
//!
//! ```text
//! <chat user_id="a" date="1" no="1" vpos="0">mikan</chat>
//! <chat user_id="a" date="1" no="2" vpos="563">orange</chat>
//! ```
//!
//! Each record line ends with CRLF. Every byte outside the `no`, `vpos`,
//! and content fields is an external compatibility contract with the
//! downstream comment-overlay players; do not change the element tag, the
//! attribute names, the constant `user_id` and `date` values, or the line
//! terminator. Comment text is inserted verbatim, no escaping.
//!
//! [`Comment`s]: crate::data::comment::Comment

use crate::common::{
    Count,
    FPath,
    FileOpenOptions,
};
use crate::data::comment::Comments;
use crate::data::datetime::DateTimeL;

use std::io::{
    BufWriter,
    Write,
};

use ::rand::Rng;
use ::si_trace_print::{
    defn,
    defo,
    defx,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// encoding constants
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// suffix appended to the input path to form the output path
pub const OUTPUT_SUFFIX: &str = ".txt";

/// digits drawn for anti-collision padding
pub const PAD_DIGITS: &[u8; 10] = b"0123456789";

/// count of random digits appended to a non-zero vpos
pub const PAD_COUNT: usize = 2;

/// constant `user_id` attribute value of every emitted record
pub const CHAT_USER_ID: &str = "a";

/// constant `date` attribute value of every emitted record
pub const CHAT_DATE: &str = "1";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// offset encoding
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Relative playback offset of `dt` from the stream `origin` instant, in
/// whole seconds, as a base-10 string.
///
/// Offsets are always measured from the first sorted record, not the
/// previous record; the first record encodes `"0"`.
pub fn encode_vpos(
    origin: &DateTimeL,
    dt: &DateTimeL,
) -> String {
    (dt.timestamp() - origin.timestamp()).to_string()
}

/// Append [`PAD_COUNT`] random decimal digits to a non-`"0"` vpos.
///
/// Comments sharing a non-zero relative second become distinguishable to
/// the overlay player, at the cost of padded offsets no longer being exact
/// seconds.
pub fn pad_vpos<R: Rng>(
    vpos: String,
    rng: &mut R,
) -> String {
    if vpos == "0" {
        return vpos;
    }
    let mut vpos = vpos;
    for _ in 0..PAD_COUNT {
        vpos.push(PAD_DIGITS[rng.random_range(0..PAD_DIGITS.len())] as char);
    }

    vpos
}

/// The output path for input `path`; `"FILE"` becomes `"FILE.txt"`.
pub fn fpath_to_output_fpath(path: &FPath) -> FPath {
    let mut path_out: FPath = path.clone();
    path_out.push_str(OUTPUT_SUFFIX);

    path_out
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// serialization
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Serialize sorted `comments` to `<input-path>.txt`, truncating any prior
/// content. Sequence numbers (`no`) start at 1.
///
/// The writer flushes after every record; on a write error the records
/// already flushed remain on disk (no rollback) and the error is returned.
///
/// Returns the count of records written.
pub fn write_chat<R: Rng>(
    path: &FPath,
    comments: &Comments,
    rng: &mut R,
) -> Result<Count, std::io::Error> {
    defn!("({:?}, {} comments)", path, comments.len());

    let path_out: FPath = fpath_to_output_fpath(path);
    let file = FileOpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path_out)?;
    let mut writer = BufWriter::new(file);

    let origin: DateTimeL = match comments.first() {
        Some(comment) => *comment.dt(),
        None => {
            defx!("no comments; wrote empty file {:?}", path_out);

            return Ok(0);
        }
    };
    defo!("origin {:?}", origin);

    let mut count: Count = 0;
    for (index, comment) in comments.iter().enumerate() {
        let no: usize = index + 1;
        let vpos: String = pad_vpos(encode_vpos(&origin, comment.dt()), rng);
        write!(
            writer,
            "<chat user_id=\"{}\" date=\"{}\" no=\"{}\" vpos=\"{}\">{}</chat>\r\n",
            CHAT_USER_ID,
            CHAT_DATE,
            no,
            vpos,
            comment.text(),
        )?;
        writer.flush()?;
        count += 1;
    }
    defx!("return {}", count);

    Ok(count)
}
