use crate::parsers::text::{collapse_whitespace, contains_any, truncate_chars, word_count};

#[test]
fn test_collapse_whitespace() {
    assert_eq!(collapse_whitespace("  Line 1  \n\n  Line 2  \t\r\n  Line 3  "), "Line 1 Line 2 Line 3");
    assert_eq!(collapse_whitespace("   \n   \t   "), "");
}

#[test]
fn test_truncate_chars_counts_characters() {
    assert_eq!(truncate_chars("hello", 10), "hello");
    assert_eq!(truncate_chars("hello", 3), "hel");
    assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
    assert_eq!(truncate_chars("日本語テキスト", 3), "日本語");
    assert_eq!(truncate_chars("", 3), "");
}

#[test]
fn test_truncate_chars_is_idempotent() {
    let input = "ü".repeat(500);
    let once = truncate_chars(&input, 100);
    assert_eq!(once.chars().count(), 100);
    assert_eq!(truncate_chars(&once, 100), once);
}

#[test]
fn test_word_count() {
    assert_eq!(word_count("one two\nthree\t four "), 4);
    assert_eq!(word_count(""), 0);
}

#[test]
fn test_contains_any() {
    assert!(contains_any("start your free trial", &["free"]));
    assert!(!contains_any("nothing here", &["free", "try"]));
}
