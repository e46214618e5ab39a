// src/tests/comment_tests.rs

//! tests for `comment.rs`

use crate::data::comment::{
    sort_comments,
    Comment,
    Comments,
};
use crate::data::datetime::{
    decode_timestamp,
    ymdhms,
    ymdhmsn,
    TimeFormat,
};
use crate::tests::common::{
    fo_0,
    rng_seeded,
};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[test]
fn test_sort_comments_ascending() {
    let fo = fo_0();
    let mut comments: Comments = vec![
        Comment::new(ymdhms(&fo, 2021, 1, 1, 0, 0, 9), String::from("C")),
        Comment::new(ymdhms(&fo, 2021, 1, 1, 0, 0, 1), String::from("A")),
        Comment::new(ymdhms(&fo, 2021, 1, 1, 0, 0, 5), String::from("B")),
    ];
    sort_comments(&mut comments);
    let texts: Vec<&str> = comments.iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["A", "B", "C"]);
}

#[test]
fn test_sort_comments_stable_for_equal_instants() {
    let fo = fo_0();
    let dt = ymdhms(&fo, 2021, 1, 1, 0, 0, 0);
    let mut comments: Comments = vec![
        Comment::new(dt, String::from("first")),
        Comment::new(dt, String::from("second")),
        Comment::new(dt, String::from("third")),
    ];
    sort_comments(&mut comments);
    // equal instants keep original appearance order
    let texts: Vec<&str> = comments.iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["first", "second", "third"]);
}

#[test]
fn test_sort_comments_subsecond_orders_within_second() {
    let fo = fo_0();
    let mut comments: Comments = vec![
        Comment::new(ymdhmsn(&fo, 2021, 1, 1, 0, 0, 0, 59), String::from("late jitter")),
        Comment::new(ymdhmsn(&fo, 2021, 1, 1, 0, 0, 0, 3), String::from("early jitter")),
    ];
    sort_comments(&mut comments);
    let texts: Vec<&str> = comments.iter().map(|c| c.text()).collect();
    assert_eq!(texts, vec!["early jitter", "late jitter"]);
}

#[test]
fn test_sort_comments_jitter_never_crosses_whole_seconds() {
    // epoch-decoded instants differing in whole seconds must order by the
    // whole second no matter the jitter drawn
    let fo = fo_0();
    let mut rng = rng_seeded();
    for _ in 0..50 {
        let mut comments = Comments::new();
        for (raw, text) in [
            ("1609459205", "later"),
            ("1609459200", "early one"),
            ("1609459200", "early two"),
        ] {
            let dt = decode_timestamp(&TimeFormat::Epoch, raw, &fo, &mut rng).unwrap();
            comments.push(Comment::new(dt, String::from(text)));
        }
        sort_comments(&mut comments);
        assert_eq!(comments[2].text(), "later");
        assert_eq!(comments[2].dt().timestamp(), 1609459205);
        assert_eq!(comments[0].dt().timestamp(), 1609459200);
        assert_eq!(comments[1].dt().timestamp(), 1609459200);
    }
}
