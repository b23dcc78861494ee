//! Review resource ids: round trips, canonical form, empty-file identities.

mod common;

use common::{file_diff, version};
use glreview_core::error::IdentityError;
use glreview_core::identity::{
    decode, encode, is_empty_file_identity, review_identities, ChangeType, ResourceId, ReviewContext,
    ReviewIdentity,
};
use glreview_core::types::FileDiff;

fn identity(path: &str, commit: Option<&str>, exists: bool, change_type: ChangeType) -> ReviewIdentity {
    ReviewIdentity {
        path: path.to_owned(),
        exists,
        commit: commit.map(str::to_owned),
        repository_root: "/home/dev/project".into(),
        project_id: 278964,
        mr_id: 33824,
        change_type,
    }
}

#[test]
fn decode_inverts_encode() {
    let samples = [
        identity("src/main.rs", Some("a1b2c3"), true, ChangeType::Modified),
        identity("docs/new file.md", Some("ffff"), false, ChangeType::Added),
        identity("gone.txt", None, true, ChangeType::Deleted),
        identity("weird?name%20.rs", Some("abc"), true, ChangeType::Renamed),
        identity("ünïcödé/{braces}.json", Some("abc"), true, ChangeType::Modified),
    ];
    for sample in samples {
        assert_eq!(decode(&encode(&sample)).unwrap(), sample);
    }
}

#[test]
fn equal_identities_encode_identically() {
    let a = identity("src/main.rs", Some("abc"), true, ChangeType::Modified);
    let b = a.clone();
    assert_eq!(encode(&a).as_str(), encode(&b).as_str());
    assert_ne!(
        encode(&a),
        encode(&identity("src/main.rs", Some("abd"), true, ChangeType::Modified))
    );
}

#[test]
fn missing_side_is_an_empty_file() {
    let added_old = identity("x.rs", Some("abc"), false, ChangeType::Added);
    let no_commit = identity("x.rs", None, true, ChangeType::Modified);
    let normal = identity("x.rs", Some("abc"), true, ChangeType::Modified);
    assert!(is_empty_file_identity(&encode(&added_old)).unwrap());
    assert!(is_empty_file_identity(&encode(&no_commit)).unwrap());
    assert!(!is_empty_file_identity(&encode(&normal)).unwrap());

    // Distinct encodings even though both count as empty.
    assert_ne!(encode(&added_old), encode(&no_commit));
}

#[test]
fn foreign_ids_are_rejected() {
    assert!(matches!(
        decode(&ResourceId::new("file:///home/dev/project/x.rs")),
        Err(IdentityError::WrongScheme(_))
    ));
    assert!(matches!(
        decode(&ResourceId::new("gl-review:x.rs")),
        Err(IdentityError::MissingQuery(_))
    ));
    assert!(matches!(
        decode(&ResourceId::new("gl-review:x.rs?{\"commit\":null}")),
        Err(IdentityError::Query(_))
    ));
    assert!(!ResourceId::new("gl-reviewer:x").is_review());
}

#[test]
fn diff_sides_of_an_added_file() {
    let ctx = ReviewContext {
        repository_root: "/repo".into(),
        project_id: 1,
        mr_id: 2,
        version: version(vec![]),
    };
    let added = FileDiff { new_file: true, ..file_diff("new.rs", "@@ -0,0 +1 @@\n+x\n") };
    let (old, new) = review_identities(&added, &ctx);
    assert_eq!(old.change_type, ChangeType::Added);
    assert!(old.is_empty_file());
    assert_eq!(old.commit.as_deref(), Some(common::BASE));
    assert!(!new.is_empty_file());
    assert_eq!(new.commit.as_deref(), Some(common::HEAD));

    let deleted = FileDiff { deleted_file: true, ..file_diff("old.rs", "@@ -1 +0,0 @@\n-x\n") };
    let (old, new) = review_identities(&deleted, &ctx);
    assert!(!old.is_empty_file());
    assert!(new.is_empty_file());
    assert_eq!(new.change_type, ChangeType::Deleted);
}
