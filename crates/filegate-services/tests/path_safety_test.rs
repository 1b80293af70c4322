mod helpers;

use filegate_core::AccessError;
use helpers::setup_gate;

#[tokio::test]
async fn test_traversal_is_rejected() {
    let t = setup_gate().await;

    for path in ["../../etc/passwd", "/etc/passwd", "a/../../b", "..\\secret"] {
        let result = t.gate.resolve_safe_path(t.base_dir(), path);
        assert!(
            matches!(
                result,
                Err(AccessError::PathTraversal(_)) | Err(AccessError::PathOutsideBase(_))
            ),
            "{:?} should be rejected, got {:?}",
            path,
            result
        );
    }
}

#[tokio::test]
async fn test_nested_paths_resolve_inside_base() {
    let t = setup_gate().await;
    t.create_file("docs/2024/report.pdf", "data");

    let resolved = t
        .gate
        .resolve_safe_path(t.base_dir(), "docs/2024/report.pdf")
        .unwrap();
    assert_eq!(
        resolved.as_path(),
        t.base_dir().join("docs/2024/report.pdf")
    );

    // Not there yet: allowed, for creation.
    let new_file = t
        .gate
        .resolve_safe_path(t.base_dir(), "docs/new.txt")
        .unwrap();
    assert_eq!(new_file.as_path(), t.base_dir().join("docs/new.txt"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_escape_is_rejected() {
    let t = setup_gate().await;
    let outside = tempfile::tempdir().unwrap();
    let secret = outside.path().join("secret.txt");
    std::fs::write(&secret, "top secret").unwrap();

    std::os::unix::fs::symlink(&secret, t.base_dir().join("innocent.txt")).unwrap();

    assert!(matches!(
        t.gate.resolve_safe_path(t.base_dir(), "innocent.txt"),
        Err(AccessError::SymlinkEscape(_))
    ));

    // The delete flow refuses it before any token is issued.
    assert!(matches!(
        t.gate.request_delete(t.base_dir(), "innocent.txt").await,
        Err(AccessError::SymlinkEscape(_))
    ));
    assert!(t.store.is_empty().await);
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlinked_directory_escape_is_rejected() {
    let t = setup_gate().await;
    let outside = tempfile::tempdir().unwrap();
    std::fs::write(outside.path().join("victim.txt"), "data").unwrap();

    std::os::unix::fs::symlink(outside.path(), t.base_dir().join("linked")).unwrap();

    assert!(matches!(
        t.gate.resolve_safe_path(t.base_dir(), "linked/victim.txt"),
        Err(AccessError::SymlinkEscape(_))
    ));
    assert!(matches!(
        t.gate.resolve_safe_path(t.base_dir(), "linked/new.txt"),
        Err(AccessError::SymlinkEscape(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_to_base_cannot_be_deleted() {
    let t = setup_gate().await;
    std::os::unix::fs::symlink(t.base_dir(), t.base_dir().join("root")).unwrap();

    assert!(matches!(
        t.gate.request_delete(t.base_dir(), "root").await,
        Err(AccessError::PathOutsideBase(_))
    ));
    assert!(t.store.is_empty().await);

    // A token issued for the name still cannot turn into the base directory.
    let issued = t.store.issue("root").await;
    assert!(matches!(
        t.gate
            .confirm_delete(t.base_dir(), "root", &issued.token)
            .await,
        Err(AccessError::PathOutsideBase(_))
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_symlink_inside_base_resolves_to_target() {
    let t = setup_gate().await;
    t.create_file("real/data.txt", "data");

    std::os::unix::fs::symlink(
        t.base_dir().join("real/data.txt"),
        t.base_dir().join("alias.txt"),
    )
    .unwrap();

    let resolved = t
        .gate
        .resolve_safe_path(t.base_dir(), "alias.txt")
        .unwrap();
    let expected = std::fs::canonicalize(t.base_dir().join("real/data.txt")).unwrap();
    assert_eq!(resolved.as_path(), expected);
}

#[tokio::test]
async fn test_upload_target_validation() {
    let t = setup_gate().await;

    assert!(t
        .gate
        .resolve_upload_target(t.base_dir(), "photo.jpg")
        .is_ok());

    for name in [".env", "../photo.jpg", "nested/photo.jpg", ""] {
        assert!(
            t.gate.resolve_upload_target(t.base_dir(), name).is_err(),
            "{:?} should be rejected",
            name
        );
    }
}
