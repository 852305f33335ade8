use proptest::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use vaultsort::checksum::{checksum_bytes, derive_path};
use vaultsort::observer::TracingObserver;
use vaultsort::storage::{MemoryVault, VaultStorage};
use vaultsort::{FileOrganizer, PlacementConfig, PruneScope};

const ROOT: &str = "Attachments";

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn organizer(vault: &Arc<MemoryVault>) -> FileOrganizer {
    let storage: Arc<dyn VaultStorage> = vault.clone();
    FileOrganizer::new(storage, Arc::new(TracingObserver))
}

/// Directories under the root with nothing below them.
fn empty_directories(vault: &MemoryVault) -> Vec<String> {
    let files = vault.files();
    let dirs = vault.directories();
    dirs.iter()
        .filter(|d| d.starts_with(&format!("{}/", ROOT)))
        .filter(|d| {
            let prefix = format!("{}/", d);
            !files.iter().any(|f| f.starts_with(&prefix))
                && !dirs.iter().any(|other| other.starts_with(&prefix))
        })
        .cloned()
        .collect()
}

fn subfolder() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("inbox".to_string()),
        Just("inbox/2024".to_string()),
        Just("misc/old/deep".to_string()),
    ]
}

/// Files with unique names under assorted subfolders of the root.
fn attachment_set() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
    prop::collection::vec(
        (subfolder(), prop::collection::vec(any::<u8>(), 0..64)),
        0..12,
    )
    .prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (sub, bytes))| {
                let dir = if sub.is_empty() {
                    ROOT.to_string()
                } else {
                    format!("{}/{}", ROOT, sub)
                };
                (format!("{}/file{}.bin", dir, i), bytes)
            })
            .collect()
    })
}

fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_derived_path_shape(
        content in prop::collection::vec(any::<u8>(), 0..256),
        depth in 1usize..=8,
    ) {
        let checksum = checksum_bytes(&content, 7);
        prop_assert_eq!(checksum, checksum_bytes(&content, 0));

        let path = derive_path(&checksum, ROOT, depth);
        let segments: Vec<&str> = path.split('/').collect();
        prop_assert_eq!(segments[0], ROOT);
        prop_assert_eq!(segments.len(), depth + 1);

        let hex = hex::encode(checksum);
        for (i, segment) in segments[1..].iter().enumerate() {
            prop_assert_eq!(*segment, &hex[i * 2..i * 2 + 2]);
        }
    }

    #[test]
    fn prop_organize_places_every_file_and_prunes(files in attachment_set(), depth in 1usize..=3) {
        let vault = Arc::new(MemoryVault::new());
        vault.add_directory(ROOT);
        vault.add_directory(&format!("{}/scratch/empty", ROOT));
        for (path, bytes) in &files {
            vault.add_file(path, bytes.clone());
        }
        let organizer = organizer(&vault);
        let config =
            PlacementConfig::new(ROOT, depth).with_pruning(true, PruneScope::Descendants);

        let report = block_on(organizer.organize_attachments(&config));
        prop_assert!(report.failures.is_empty());
        prop_assert_eq!(report.processed(), files.len());

        let mut expected = BTreeSet::new();
        for (path, bytes) in &files {
            let dir = derive_path(&checksum_bytes(bytes, 0), ROOT, depth);
            let target = format!("{}/{}", dir, file_name(path));
            prop_assert_eq!(vault.file_contents(&target), Some(bytes.clone()));
            expected.insert(target);
        }
        let actual: BTreeSet<String> = vault.files().into_iter().collect();
        prop_assert_eq!(actual, expected);
        prop_assert!(empty_directories(&vault).is_empty());
        prop_assert!(vault.is_directory(ROOT));

        vault.clear_mutations();
        let rerun = block_on(organizer.organize_attachments(&config));
        prop_assert!(rerun.moved.is_empty());
        prop_assert_eq!(rerun.unchanged, files.len());
        prop_assert!(vault.mutations().is_empty());
    }

    #[test]
    fn prop_pruning_never_removes_files(
        files in attachment_set(),
        empty in prop::collection::vec(subfolder(), 0..4),
    ) {
        let vault = Arc::new(MemoryVault::new());
        vault.add_directory(ROOT);
        for sub in &empty {
            vault.add_directory(&format!("{}/{}/spare", ROOT, sub));
        }
        for (path, bytes) in &files {
            vault.add_file(path, bytes.clone());
        }
        let before = vault.files();
        let organizer = organizer(&vault);

        let report = block_on(
            organizer
                .directories()
                .clean_empty_directories(ROOT, PruneScope::Descendants),
        );
        prop_assert!(report.failures.is_empty());
        prop_assert_eq!(vault.files(), before);
        prop_assert!(empty_directories(&vault).is_empty());
        prop_assert!(vault.is_directory(ROOT));
    }

    #[test]
    fn prop_failures_are_isolated(
        files in attachment_set(),
        denied in prop::collection::vec(any::<bool>(), 12),
    ) {
        let vault = Arc::new(MemoryVault::new());
        vault.add_directory(ROOT);
        for ((path, bytes), deny) in files.iter().zip(&denied) {
            vault.add_file(path, bytes.clone());
            if *deny {
                vault.deny_read(path);
            }
        }
        let organizer = organizer(&vault);
        let config = PlacementConfig::new(ROOT, 2);

        let report = block_on(organizer.organize_attachments(&config));
        let denied_count = denied.iter().take(files.len()).filter(|d| **d).count();
        prop_assert_eq!(report.failures.len(), denied_count);
        prop_assert_eq!(report.processed(), files.len() - denied_count);

        for ((path, bytes), deny) in files.iter().zip(&denied) {
            if *deny {
                prop_assert!(vault.is_file(path));
            } else {
                let dir = derive_path(&checksum_bytes(bytes, 0), ROOT, 2);
                let expected = format!("{}/{}", dir, file_name(path));
                prop_assert!(vault.is_file(&expected));
            }
        }
    }
}
