//! Hunk parser behaviour on well-formed and broken diffs.

use glreview_core::error::DiffError;
use glreview_core::hunk::parse_hunks;
use glreview_core::types::HunkLine;

#[test]
fn counters_advance_per_line_kind() {
    let hunks = parse_hunks("@@ -10,3 +12,4 @@\n a\n-b\n+c\n+d\n e\n").unwrap();
    assert_eq!(hunks.len(), 1);
    assert_eq!(hunks[0].old_start, 10);
    assert_eq!(hunks[0].new_start, 12);
    assert_eq!(
        hunks[0].lines,
        vec![
            HunkLine::Unchanged { old_line: 10, new_line: 12 },
            HunkLine::Removed { old_line: 11 },
            HunkLine::Added { new_line: 13 },
            HunkLine::Added { new_line: 14 },
            HunkLine::Unchanged { old_line: 12, new_line: 15 },
        ]
    );

    let old: Vec<u32> = hunks[0].lines.iter().filter_map(HunkLine::old_line).collect();
    let new: Vec<u32> = hunks[0].lines.iter().filter_map(HunkLine::new_line).collect();
    assert_eq!(old, vec![10, 11, 12]);
    assert_eq!(new, vec![12, 13, 14, 15]);
}

#[test]
fn multiple_hunks_and_section_headings() {
    let raw = "@@ -1,2 +1,2 @@ fn first() {\n a\n-b\n+B\n@@ -20 +20,2 @@ fn second() {\n t\n+u\n";
    let hunks = parse_hunks(raw).unwrap();
    assert_eq!(hunks.len(), 2);
    assert_eq!(hunks[1].old_start, 20);
    assert_eq!(
        hunks[1].lines,
        vec![
            HunkLine::Unchanged { old_line: 20, new_line: 20 },
            HunkLine::Added { new_line: 21 },
        ]
    );
}

#[test]
fn no_newline_markers_and_empty_lines_are_skipped() {
    let raw = "@@ -1 +1 @@\n-old\n\\ No newline at end of file\n+new\n\n\\ No newline at end of file\n";
    let hunks = parse_hunks(raw).unwrap();
    assert_eq!(
        hunks[0].lines,
        vec![HunkLine::Removed { old_line: 1 }, HunkLine::Added { new_line: 1 }]
    );
}

#[test]
fn empty_diff_has_no_hunks() {
    assert!(parse_hunks("").unwrap().is_empty());
    assert!(parse_hunks("\n").unwrap().is_empty());
}

#[test]
fn new_file_diff() {
    let hunks = parse_hunks("@@ -0,0 +1,3 @@\n+one\n+two\n+three\n").unwrap();
    let added: Vec<u32> = hunks[0].lines.iter().filter_map(HunkLine::new_line).collect();
    assert_eq!(added, vec![1, 2, 3]);
    assert!(hunks[0].lines.iter().all(|l| l.old_line().is_none()));
}

#[test]
fn malformed_header_is_fatal() {
    let err = parse_hunks("@@ -a,1 +1 @@\n x\n").unwrap_err();
    assert_eq!(err, DiffError::MalformedHunkHeader { header: "@@ -a,1 +1 @@".into() });

    let err = parse_hunks("--- a/file\n+++ b/file\n@@ -1 +1 @@\n x\n").unwrap_err();
    assert!(matches!(err, DiffError::MalformedHunkHeader { .. }));
}

#[test]
fn unknown_prefix_names_the_hunk() {
    let err = parse_hunks("@@ -1,2 +1,2 @@\n a\n?b\n").unwrap_err();
    match err {
        DiffError::UnexpectedDiffLinePrefix { line, hunk } => {
            assert_eq!(line, "?b");
            assert!(hunk.starts_with("@@ -1,2 +1,2 @@"));
            assert!(hunk.contains("?b"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
