use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use vaultsort::observer::TracingObserver;
use vaultsort::storage::{DiskVault, VaultStorage};
use vaultsort::{FileOrganizer, PlacementConfig, PruneScope};

const ABC_CHECKSUM_DIR: &str = "Attachments/ba/78";
const HELLO_CHECKSUM_DIR: &str = "Attachments/2c/f2";

fn write(root: &Path, path: &str, contents: &[u8]) {
    let full = root.join(path);
    std::fs::create_dir_all(full.parent().unwrap()).unwrap();
    std::fs::write(full, contents).unwrap();
}

fn organizer(temp: &TempDir) -> FileOrganizer {
    let vault: Arc<dyn VaultStorage> = Arc::new(DiskVault::open(temp.path()).unwrap());
    FileOrganizer::new(vault, Arc::new(TracingObserver))
}

#[tokio::test]
async fn organize_real_vault_end_to_end() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "Attachments/abc.txt", b"abc");
    write(root, "Attachments/inbox/2024/hello.md", b"hello");
    write(root, "Attachments/.DS_Store", b"finder");
    write(root, ".obsidian/app.json", b"{}");
    write(root, "Notes/daily.md", b"abc");
    std::fs::create_dir_all(root.join("Attachments/empty/nested")).unwrap();

    let organizer = organizer(&temp);
    let config =
        PlacementConfig::new("Attachments", 2).with_pruning(true, PruneScope::Descendants);
    let report = organizer.organize_attachments(&config).await;

    assert!(report.root_found);
    assert_eq!(report.moved.len(), 2);
    assert!(report.failures.is_empty());
    assert!(root.join(ABC_CHECKSUM_DIR).join("abc.txt").is_file());
    assert_eq!(
        std::fs::read(root.join(HELLO_CHECKSUM_DIR).join("hello.md")).unwrap(),
        b"hello"
    );

    // Hidden entries and files outside the root are never touched.
    assert!(root.join("Attachments/.DS_Store").is_file());
    assert!(root.join(".obsidian/app.json").is_file());
    assert!(root.join("Notes/daily.md").is_file());

    // Emptied and already-empty folders are pruned; the root stays.
    let prune = report.prune.unwrap();
    assert!(prune.failures.is_empty());
    assert!(!root.join("Attachments/inbox").exists());
    assert!(!root.join("Attachments/empty").exists());
    assert!(root.join("Attachments").is_dir());
}

#[tokio::test]
async fn second_run_changes_nothing() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "Attachments/a/abc.txt", b"abc");
    write(temp.path(), "Attachments/b/hello.md", b"hello");

    let organizer = organizer(&temp);
    let config =
        PlacementConfig::new("Attachments", 2).with_pruning(true, PruneScope::Descendants);
    let first = organizer.organize_attachments(&config).await;
    assert_eq!(first.moved.len(), 2);

    let second = organizer.organize_attachments(&config).await;
    assert!(second.moved.is_empty());
    assert_eq!(second.unchanged, 2);
    assert_eq!(second.prune.map(|p| p.removed_count()), Some(0));
}

#[tokio::test]
async fn folder_with_only_hidden_files_is_kept_quietly() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "Attachments/keep/.gitkeep", b"");
    write(temp.path(), "Attachments/keep/abc.txt", b"abc");

    let organizer = organizer(&temp);
    let config =
        PlacementConfig::new("Attachments", 2).with_pruning(true, PruneScope::Descendants);
    let report = organizer.organize_attachments(&config).await;

    assert_eq!(report.moved.len(), 1);
    let prune = report.prune.unwrap();
    assert!(prune.failures.is_empty());
    assert_eq!(prune.kept, vec!["Attachments/keep"]);
    assert!(temp.path().join("Attachments/keep/.gitkeep").is_file());
}

#[tokio::test]
async fn prune_root_scope_removes_empty_attachment_folder() {
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("Attachments/x/y")).unwrap();

    let organizer = organizer(&temp);
    let report = organizer
        .directories()
        .clean_empty_directories("Attachments", PruneScope::IncludeRoot)
        .await;

    assert_eq!(
        report.removed,
        vec!["Attachments/x/y", "Attachments/x", "Attachments"]
    );
    assert!(!temp.path().join("Attachments").exists());
}

#[tokio::test]
async fn missing_root_is_reported_without_changes() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "Notes/a.md", b"a");

    let organizer = organizer(&temp);
    let report = organizer
        .organize_attachments(&PlacementConfig::new("Attachments", 2))
        .await;

    assert!(!report.root_found);
    assert_eq!(report.total(), 0);
    assert!(report.prune.is_none());
    assert!(!temp.path().join("Attachments").exists());
}

#[tokio::test]
async fn decomposed_file_name_is_moved_under_its_own_name() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    let name = "cafe\u{0301}.png";
    write(root, &format!("Attachments/{}", name), b"abc");

    let organizer = organizer(&temp);
    let report = organizer
        .organize_attachments(&PlacementConfig::new("Attachments", 2))
        .await;

    assert!(report.failures.is_empty());
    assert_eq!(report.moved.len(), 1);
    assert_eq!(report.moved[0].from, format!("Attachments/{}", name));
    assert!(root.join(ABC_CHECKSUM_DIR).join(name).is_file());
    assert!(!root.join("Attachments").join(name).exists());

    let again = organizer
        .organize_attachments(&PlacementConfig::new("Attachments", 2))
        .await;
    assert!(again.moved.is_empty());
    assert!(again.failures.is_empty());
    assert_eq!(again.unchanged, 1);
}

#[cfg(unix)]
#[tokio::test]
async fn symlink_to_outside_folder_is_not_followed() {
    let temp = TempDir::new().unwrap();
    let outside = TempDir::new().unwrap();
    let root = temp.path();
    write(outside.path(), "secret.txt", b"abc");
    write(root, "Attachments/hello.md", b"hello");
    std::fs::create_dir_all(root.join("Attachments/links")).unwrap();
    std::os::unix::fs::symlink(outside.path(), root.join("Attachments/links/ext")).unwrap();

    let organizer = organizer(&temp);
    let config =
        PlacementConfig::new("Attachments", 2).with_pruning(true, PruneScope::Descendants);
    let report = organizer.organize_attachments(&config).await;

    assert!(report.failures.is_empty());
    assert_eq!(report.moved.len(), 1);
    assert!(outside.path().join("secret.txt").is_file());
    assert!(!root.join(ABC_CHECKSUM_DIR).exists());
    assert!(root.join(HELLO_CHECKSUM_DIR).join("hello.md").is_file());

    let prune = report.prune.unwrap();
    assert!(prune.failures.is_empty());
    assert_eq!(prune.kept, vec!["Attachments/links".to_string()]);
    assert!(root
        .join("Attachments/links/ext")
        .symlink_metadata()
        .unwrap()
        .file_type()
        .is_symlink());
}

#[cfg(unix)]
#[tokio::test]
async fn symlink_loop_moves_each_file_once() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "Attachments/a.txt", b"abc");
    std::os::unix::fs::symlink(".", root.join("Attachments/loop")).unwrap();

    let organizer = organizer(&temp);
    let report = organizer
        .organize_attachments(&PlacementConfig::new("Attachments", 2))
        .await;

    assert!(report.failures.is_empty());
    assert_eq!(report.moved.len(), 1);
    assert_eq!(report.moved[0].from, "Attachments/a.txt");
    assert!(root.join(ABC_CHECKSUM_DIR).join("a.txt").is_file());
}
