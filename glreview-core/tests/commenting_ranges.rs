//! Which document lines accept new comments.

mod common;

use common::{file_diff, version, BASE, HEAD, TWO_HUNK_DIFF};
use glreview_core::identity::{encode, ChangeType, ResourceId, ReviewContext, ReviewIdentity};
use glreview_core::ranges::{ranges_for, LineRange, ReviewDocument};

fn ctx() -> ReviewContext {
    ReviewContext {
        repository_root: "/repo".into(),
        project_id: 42,
        mr_id: 7,
        version: version(vec![
            file_diff("src/lib.rs", TWO_HUNK_DIFF),
            file_diff("new.txt", "@@ -0,0 +1,3 @@\n+a\n+b\n+c\n"),
        ]),
    }
}

fn id(path: &str, commit: &str) -> ResourceId {
    encode(&ReviewIdentity {
        path: path.to_owned(),
        exists: true,
        commit: Some(commit.to_owned()),
        repository_root: "/repo".into(),
        project_id: 42,
        mr_id: 7,
        change_type: ChangeType::Modified,
    })
}

#[test]
fn old_side_is_fully_commentable() {
    let doc = ReviewDocument::new(id("src/lib.rs", BASE), "a\nb\nc\nd\ne\nf\ng\nh");
    assert_eq!(ranges_for(&doc, &ctx()).unwrap(), vec![LineRange { start: 1, end: 8 }]);
}

#[test]
fn old_side_skips_blank_last_line() {
    let doc = ReviewDocument::new(id("src/lib.rs", BASE), "a\nb\nc\n");
    assert_eq!(ranges_for(&doc, &ctx()).unwrap(), vec![LineRange { start: 1, end: 3 }]);

    let doc = ReviewDocument::new(id("src/lib.rs", BASE), "a\nb\n  \t");
    assert_eq!(ranges_for(&doc, &ctx()).unwrap(), vec![LineRange { start: 1, end: 2 }]);

    let doc = ReviewDocument::new(id("src/lib.rs", BASE), "");
    assert!(ranges_for(&doc, &ctx()).unwrap().is_empty());
}

#[test]
fn new_side_only_offers_added_lines() {
    let doc = ReviewDocument::new(id("src/lib.rs", HEAD), "a\nd\ne\nf\nX\ng\nh\n");
    let ranges = ranges_for(&doc, &ctx()).unwrap();
    assert_eq!(ranges, vec![LineRange::single(5)]);
    assert!(!ranges.iter().any(|r| r.contains(2)));

    let doc = ReviewDocument::new(id("new.txt", HEAD), "a\nb\nc\n");
    assert_eq!(
        ranges_for(&doc, &ctx()).unwrap(),
        vec![LineRange::single(1), LineRange::single(2), LineRange::single(3)]
    );
}

#[test]
fn other_documents_get_nothing() {
    let plain = ReviewDocument::new(ResourceId::new("file:///repo/src/lib.rs"), "a\n");
    assert!(ranges_for(&plain, &ctx()).unwrap().is_empty());

    let other_mr = ReviewDocument::new(
        encode(&ReviewIdentity {
            path: "src/lib.rs".into(),
            exists: true,
            commit: Some(BASE.into()),
            repository_root: "/repo".into(),
            project_id: 42,
            mr_id: 8,
            change_type: ChangeType::Modified,
        }),
        "a\n",
    );
    assert!(ranges_for(&other_mr, &ctx()).unwrap().is_empty());

    let broken = ReviewDocument::new(ResourceId::new("gl-review:src/lib.rs?not-json"), "a\n");
    assert!(ranges_for(&broken, &ctx()).unwrap().is_empty());

    let no_path = ReviewDocument::new(id("", HEAD), "a\n");
    assert!(ranges_for(&no_path, &ctx()).unwrap().is_empty());
}
