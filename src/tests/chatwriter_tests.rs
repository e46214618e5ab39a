// src/tests/chatwriter_tests.rs

//! tests for `chatwriter.rs`

use crate::common::FPath;
use crate::data::comment::{
    Comment,
    Comments,
};
use crate::data::datetime::ymdhms;
use crate::printer::chatwriter::{
    encode_vpos,
    fpath_to_output_fpath,
    pad_vpos,
    write_chat,
    PAD_COUNT,
};
use crate::tests::common::{
    create_temp_file,
    fo_0,
    ntf_fpath,
    rng_seeded,
};

use std::fs;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Comments at whole-second offsets from one origin instant.
fn comments_at_offsets(offsets_texts: &[(u32, &str)]) -> Comments {
    let fo = fo_0();
    offsets_texts
        .iter()
        .map(|(sec, text)| Comment::new(ymdhms(&fo, 2021, 1, 1, 0, 0, *sec), String::from(*text)))
        .collect()
}

/// Run `write_chat` against a scratch input path; return the output bytes.
/// The output file is removed before returning.
fn write_chat_to_string(comments: &Comments) -> (u64, String) {
    let ntf = create_temp_file("");
    let path: FPath = ntf_fpath(&ntf);
    let mut rng = rng_seeded();
    let count = write_chat(&path, comments, &mut rng).unwrap();
    let path_out: FPath = fpath_to_output_fpath(&path);
    let output: String = fs::read_to_string(&path_out).unwrap();
    fs::remove_file(&path_out).unwrap();

    (count, output)
}

#[test]
fn test_encode_vpos_origin_is_zero() {
    let dt = ymdhms(&fo_0(), 2021, 1, 1, 0, 0, 0);
    assert_eq!(encode_vpos(&dt, &dt), "0");
}

#[test]
fn test_encode_vpos_measured_from_origin_not_previous() {
    let fo = fo_0();
    let origin = ymdhms(&fo, 2021, 1, 1, 0, 0, 0);
    let dt_a = ymdhms(&fo, 2021, 1, 1, 0, 0, 5);
    let dt_b = ymdhms(&fo, 2021, 1, 1, 0, 0, 7);
    assert_eq!(encode_vpos(&origin, &dt_a), "5");
    // 7, not 2: always the delta from the first record
    assert_eq!(encode_vpos(&origin, &dt_b), "7");
}

#[test]
fn test_encode_vpos_ignores_subseconds() {
    let fo = fo_0();
    let origin = ymdhms(&fo, 2021, 1, 1, 0, 0, 0);
    let dt = crate::data::datetime::ymdhmsn(&fo, 2021, 1, 1, 0, 1, 0, 59);
    assert_eq!(encode_vpos(&origin, &dt), "60");
}

#[test]
fn test_pad_vpos_zero_unpadded() {
    let mut rng = rng_seeded();
    assert_eq!(pad_vpos(String::from("0"), &mut rng), "0");
}

#[test]
fn test_pad_vpos_appends_digits() {
    let mut rng = rng_seeded();
    for base in ["5", "60", "12345"] {
        let padded = pad_vpos(String::from(base), &mut rng);
        assert_eq!(padded.len(), base.len() + PAD_COUNT);
        assert!(padded.starts_with(base), "padded {:?}", padded);
        assert!(padded.chars().all(|c| c.is_ascii_digit()), "padded {:?}", padded);
    }
}

#[test]
fn test_pad_vpos_seeded_deterministic() {
    let mut rng1 = rng_seeded();
    let mut rng2 = rng_seeded();
    assert_eq!(
        pad_vpos(String::from("5"), &mut rng1),
        pad_vpos(String::from("5"), &mut rng2)
    );
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// write_chat

#[test]
fn test_write_chat_record_format() {
    let comments = comments_at_offsets(&[(0, "Hello"), (5, "World")]);
    let (count, output) = write_chat_to_string(&comments);
    assert_eq!(count, 2);

    let lines: Vec<&str> = output.split("\r\n").collect();
    // two records and the trailing empty split
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2], "");
    // the first record's vpos is exactly "0", never padded
    assert_eq!(lines[0], "<chat user_id=\"a\" date=\"1\" no=\"1\" vpos=\"0\">Hello</chat>");
    // the second record's vpos is "5" plus two random digits
    assert!(
        lines[1].starts_with("<chat user_id=\"a\" date=\"1\" no=\"2\" vpos=\"5"),
        "line {:?}",
        lines[1]
    );
    assert!(lines[1].ends_with(">World</chat>"), "line {:?}", lines[1]);
    let vpos: &str = lines[1]
        .split("vpos=\"")
        .nth(1)
        .unwrap()
        .split('"')
        .next()
        .unwrap();
    assert_eq!(vpos.len(), 1 + PAD_COUNT);
    assert!(vpos.chars().all(|c| c.is_ascii_digit()), "vpos {:?}", vpos);
}

#[test]
fn test_write_chat_sequence_numbers_from_one() {
    let comments = comments_at_offsets(&[(0, "a"), (0, "b"), (1, "c"), (2, "d")]);
    let (count, output) = write_chat_to_string(&comments);
    assert_eq!(count, 4);
    for (index, line) in output
        .split("\r\n")
        .filter(|line| !line.is_empty())
        .enumerate()
    {
        let expect = format!("no=\"{}\"", index + 1);
        assert!(line.contains(expect.as_str()), "line {:?}", line);
    }
}

#[test]
fn test_write_chat_same_second_as_origin_unpadded() {
    // a second comment in the origin second also encodes literal "0"
    let comments = comments_at_offsets(&[(0, "a"), (0, "b")]);
    let (_count, output) = write_chat_to_string(&comments);
    let lines: Vec<&str> = output.split("\r\n").collect();
    assert!(lines[1].contains("vpos=\"0\""), "line {:?}", lines[1]);
}

#[test]
fn test_write_chat_unpadded_offsets_idempotent() {
    // two runs produce identical sequence numbers and identical offsets
    // once the random padding digits are stripped
    let comments = comments_at_offsets(&[(0, "a"), (3, "b"), (10, "c")]);
    let (_count_a, output_a) = write_chat_to_string(&comments);
    let (_count_b, output_b) = write_chat_to_string(&comments);

    fn unpadded(output: &str) -> Vec<String> {
        output
            .split("\r\n")
            .filter(|line| !line.is_empty())
            .map(|line| {
                let vpos: &str = line
                    .split("vpos=\"")
                    .nth(1)
                    .unwrap()
                    .split('"')
                    .next()
                    .unwrap();
                match vpos {
                    "0" => String::from(vpos),
                    _ => String::from(&vpos[..vpos.len() - PAD_COUNT]),
                }
            })
            .collect()
    }
    assert_eq!(unpadded(output_a.as_str()), unpadded(output_b.as_str()));
    assert_eq!(unpadded(output_a.as_str()), vec!["0", "3", "10"]);
}

#[test]
fn test_write_chat_empty_comments() {
    let comments = Comments::new();
    let (count, output) = write_chat_to_string(&comments);
    assert_eq!(count, 0);
    assert_eq!(output, "");
}

#[test]
fn test_write_chat_truncates_prior_output() {
    let ntf = create_temp_file("");
    let path: FPath = ntf_fpath(&ntf);
    let path_out: FPath = fpath_to_output_fpath(&path);
    // leave a long stale output file from a "previous run"
    fs::write(&path_out, "x".repeat(4096)).unwrap();

    let comments = comments_at_offsets(&[(0, "short")]);
    let mut rng = rng_seeded();
    write_chat(&path, &comments, &mut rng).unwrap();
    let output: String = fs::read_to_string(&path_out).unwrap();
    fs::remove_file(&path_out).unwrap();
    assert_eq!(output, "<chat user_id=\"a\" date=\"1\" no=\"1\" vpos=\"0\">short</chat>\r\n");
}
