//! Directory-backed entry source
//!
//! Datasets live under `base_path` in one of two shapes:
//!
//! ```text
//! <base_path>/<type>/<category>.txt          single-file category
//! <base_path>/<type>/<category>/<name>.txt   multi-file category
//! ```
//!
//! Type, category and file names are matched case-insensitively after
//! trimming. A multi-file category resolves to all of its `.txt` files in
//! file-name order unless a filename selects one of them.
//!
//! When caching is enabled, resolved datasets are kept in a map guarded by an
//! `RwLock`. Lookups take the read lock; a dataset is only inserted under the
//! write lock after it has been fully loaded. Cached entries remember the
//! modification stamps of their files and are reloaded when any changes.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::SystemTime;

use log::debug;

use scheckbl_core::types::{normalize_identifier, DatasetKey, LookupKind};
use scheckbl_core::{BlocklistError, Dataset, EntrySource, Result};

use crate::config::SourceConfig;
use crate::parser::parse_dataset;

const DATASET_EXTENSION: &str = "txt";

/// Modification stamp of one watched path.
///
/// Directories also record their sorted listing, so added or removed files
/// are noticed even when the clock is too coarse to move the mtime.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: Option<u64>,
    listing: Option<Vec<OsString>>,
}

impl FileStamp {
    fn capture(path: &Path) -> Self {
        let metadata = fs::metadata(path).ok();
        let listing = match &metadata {
            Some(m) if m.is_dir() => fs::read_dir(path).ok().map(|read_dir| {
                let mut names: Vec<OsString> = read_dir
                    .filter_map(|entry| entry.ok().map(|entry| entry.file_name()))
                    .collect();
                names.sort();
                names
            }),
            _ => None,
        };
        Self {
            path: path.to_path_buf(),
            modified: metadata.as_ref().and_then(|m| m.modified().ok()),
            len: metadata.as_ref().map(|m| m.len()),
            listing,
        }
    }

    fn is_current(&self) -> bool {
        *self == Self::capture(&self.path)
    }
}

struct CachedDataset {
    dataset: Arc<Dataset>,
    stamps: Vec<FileStamp>,
}

impl CachedDataset {
    fn is_fresh(&self) -> bool {
        self.stamps.iter().all(FileStamp::is_current)
    }
}

/// Where a category lives on disk.
enum CategoryLocation {
    File(PathBuf),
    Directory(PathBuf),
}

/// The files that make up one dataset, plus the directories whose listing
/// determines that set.
struct DatasetFiles {
    files: Vec<PathBuf>,
    watched_dirs: Vec<PathBuf>,
}

/// Entry source reading datasets from a directory tree.
pub struct DirectorySource {
    config: SourceConfig,
    cache: RwLock<HashMap<DatasetKey, CachedDataset>>,
}

impl DirectorySource {
    pub fn new(config: SourceConfig) -> Self {
        Self {
            config,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Names of all blocklist types, sorted.
    pub fn types(&self) -> Result<Vec<String>> {
        Ok(sorted_dir_entries(&self.config.base_path)?
            .into_iter()
            .filter(|path| path.is_dir())
            .filter_map(|path| file_name(&path))
            .collect())
    }

    /// Names of all categories within a type, sorted.
    ///
    /// A directory and a same-named `.txt` file are one category; the
    /// directory's spelling is listed since it is the one that resolves.
    pub fn categories(&self, type_name: &str) -> Result<Vec<String>> {
        let type_dir = self.locate_type(&normalize_identifier(type_name))?;
        let entries = sorted_dir_entries(&type_dir)?;

        let dirs = entries.iter().filter(|path| path.is_dir()).filter_map(|path| file_name(path));
        let files = entries
            .iter()
            .filter(|path| is_dataset_file(path))
            .filter_map(|path| file_stem(path));

        let mut seen = HashSet::new();
        let mut names: Vec<String> = dirs
            .chain(files)
            .filter(|name| seen.insert(normalize_identifier(name)))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Dataset files of a category, in resolution order.
    pub fn files(&self, type_name: &str, category: &str) -> Result<Vec<String>> {
        let key = DatasetKey::new(type_name, category, None)?;
        let located = self.locate(&key)?;
        Ok(located.files.iter().filter_map(|path| file_name(path)).collect())
    }

    /// Drop cached datasets of one category, including per-file entries.
    pub fn invalidate(&self, type_name: &str, category: &str) {
        let type_name = normalize_identifier(type_name);
        let category = normalize_identifier(category);
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        cache.retain(|key, _| !(key.type_name == type_name && key.category == category));
    }

    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Number of cached datasets.
    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn locate_type(&self, type_name: &str) -> Result<PathBuf> {
        sorted_dir_entries(&self.config.base_path)?
            .into_iter()
            .find(|path| path.is_dir() && name_matches(file_name(path), type_name))
            .ok_or_else(|| BlocklistError::not_found(LookupKind::Type, type_name))
    }

    fn locate_category(&self, type_dir: &Path, category: &str) -> Result<CategoryLocation> {
        let entries = sorted_dir_entries(type_dir)?;

        if let Some(dir) = entries
            .iter()
            .find(|path| path.is_dir() && name_matches(file_name(path), category))
        {
            return Ok(CategoryLocation::Directory(dir.clone()));
        }

        entries
            .into_iter()
            .find(|path| is_dataset_file(path) && name_matches(file_stem(path), category))
            .map(CategoryLocation::File)
            .ok_or_else(|| BlocklistError::not_found(LookupKind::Category, category))
    }

    fn locate(&self, key: &DatasetKey) -> Result<DatasetFiles> {
        let type_dir = self.locate_type(&key.type_name)?;

        match (self.locate_category(&type_dir, &key.category)?, &key.filename) {
            // A same-named directory created later takes precedence
            (CategoryLocation::File(path), None) => Ok(DatasetFiles {
                files: vec![path],
                watched_dirs: vec![type_dir],
            }),
            (CategoryLocation::File(_), Some(filename)) => {
                Err(BlocklistError::not_found(LookupKind::File, filename))
            }
            (CategoryLocation::Directory(dir), filename) => {
                let candidates: Vec<PathBuf> = sorted_dir_entries(&dir)?
                    .into_iter()
                    .filter(|path| is_dataset_file(path))
                    .collect();

                let files = match filename {
                    None => candidates,
                    Some(filename) => {
                        let selected = candidates
                            .into_iter()
                            .find(|path| {
                                name_matches(file_name(path), filename)
                                    || name_matches(file_stem(path), filename)
                            })
                            .ok_or_else(|| BlocklistError::not_found(LookupKind::File, filename))?;
                        vec![selected]
                    }
                };

                Ok(DatasetFiles {
                    files,
                    watched_dirs: vec![dir],
                })
            }
        }
    }

    fn load(&self, key: &DatasetKey) -> Result<CachedDataset> {
        let located = self.locate(key)?;

        // Stamps are taken before reading so a concurrent edit forces a reload
        let stamps: Vec<FileStamp> = located
            .watched_dirs
            .iter()
            .chain(located.files.iter())
            .map(|path| FileStamp::capture(path))
            .collect();

        let mut entries = Vec::new();
        for path in &located.files {
            let content = fs::read_to_string(path).map_err(|e| BlocklistError::io(path, e))?;
            let parsed = parse_dataset(&content);
            debug!("  {} - {} entries", path.display(), parsed.len());
            entries.extend(parsed);
        }

        let dataset = Dataset::new(key.clone(), entries, self.config.case_policy(key));
        debug!(
            "Loaded {} from {} file(s): {} entries, {:?}",
            key,
            located.files.len(),
            dataset.len(),
            dataset.case_policy()
        );

        Ok(CachedDataset {
            dataset: Arc::new(dataset),
            stamps,
        })
    }
}

impl EntrySource for DirectorySource {
    fn resolve(&self, key: &DatasetKey) -> Result<Arc<Dataset>> {
        if !self.config.cache_enabled {
            return Ok(self.load(key)?.dataset);
        }

        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(cached) = cache.get(key) {
                if cached.is_fresh() {
                    debug!("Cache hit for {}", key);
                    return Ok(Arc::clone(&cached.dataset));
                }
                debug!("Cached {} is stale, reloading", key);
            }
        }

        let loaded = self.load(key)?;
        let dataset = Arc::clone(&loaded.dataset);
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), loaded);
        Ok(dataset)
    }
}

// =============================================================================
// Path helpers
// =============================================================================

fn sorted_dir_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = fs::read_dir(dir).map_err(|e| BlocklistError::io(dir, e))?;
    let mut paths = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|e| BlocklistError::io(dir, e))?;
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|stem| stem.to_string_lossy().into_owned())
}

fn is_dataset_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(DATASET_EXTENSION))
}

fn name_matches(name: Option<String>, wanted: &str) -> bool {
    name.is_some_and(|name| normalize_identifier(&name) == wanted)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use scheckbl_core::{Blocklist, CasePolicy};
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "Phrases/vulgarisms.txt", "# comment\ndarn\nheck\ndarn\n");
        write(root, "Phrases/Empty.txt", "\n# nothing here\n");
        write(root, "Phrases/spam/a_promo.txt", "free money\nclick here\n");
        write(root, "Phrases/spam/b_scam.txt", "wire transfer\nfree money\n");
        write(root, "Phrases/spam/notes.md", "not a dataset\n");
        write(root, "urls/nsfw.txt", "Bad.Example\n");
        dir
    }

    fn source(dir: &TempDir) -> DirectorySource {
        DirectorySource::new(SourceConfig::new(dir.path()))
    }

    fn key(type_name: &str, category: &str, filename: Option<&str>) -> DatasetKey {
        DatasetKey::new(type_name, category, filename).unwrap()
    }

    #[test]
    fn resolves_single_file_category() {
        let dir = fixture();
        let ds = source(&dir).resolve(&key("phrases", "VULGARISMS", None)).unwrap();
        assert_eq!(ds.entries(), ["darn", "heck"]);
        assert_eq!(ds.case_policy(), CasePolicy::Sensitive);
    }

    #[test]
    fn empty_category_is_empty_dataset() {
        let dir = fixture();
        let ds = source(&dir).resolve(&key("phrases", "empty", None)).unwrap();
        assert!(ds.is_empty());
    }

    #[test]
    fn directory_category_concatenates_in_name_order() {
        let dir = fixture();
        let ds = source(&dir).resolve(&key("phrases", "spam", None)).unwrap();
        assert_eq!(ds.entries(), ["free money", "click here", "wire transfer"]);
    }

    #[test]
    fn filename_selects_by_name_or_stem() {
        let dir = fixture();
        let src = source(&dir);
        let by_stem = src.resolve(&key("phrases", "spam", Some("B_SCAM"))).unwrap();
        assert_eq!(by_stem.entries(), ["wire transfer", "free money"]);

        let by_name = src.resolve(&key("phrases", "spam", Some("a_promo.txt"))).unwrap();
        assert_eq!(by_name.entries(), ["free money", "click here"]);
    }

    #[test]
    fn unknown_parts_are_not_found() {
        let dir = fixture();
        let src = source(&dir);

        assert!(matches!(
            src.resolve(&key("emails", "spam", None)),
            Err(BlocklistError::NotFound { what: LookupKind::Type, .. })
        ));
        assert!(matches!(
            src.resolve(&key("phrases", "nsfw", None)),
            Err(BlocklistError::NotFound { what: LookupKind::Category, .. })
        ));
        assert!(matches!(
            src.resolve(&key("phrases", "spam", Some("notes"))),
            Err(BlocklistError::NotFound { what: LookupKind::File, .. })
        ));
        assert!(matches!(
            src.resolve(&key("phrases", "vulgarisms", Some("vulgarisms"))),
            Err(BlocklistError::NotFound { what: LookupKind::File, .. })
        ));
    }

    #[test]
    fn missing_base_path_is_io_error() {
        let dir = fixture();
        let src = DirectorySource::new(SourceConfig::new(dir.path().join("absent")));
        assert!(matches!(
            src.resolve(&key("phrases", "vulgarisms", None)),
            Err(BlocklistError::Io { .. })
        ));
    }

    #[test]
    fn invalid_utf8_is_io_error() {
        let dir = fixture();
        fs::write(dir.path().join("Phrases/broken.txt"), [0x66, 0x6f, 0xff, 0xfe]).unwrap();
        assert!(matches!(
            source(&dir).resolve(&key("phrases", "broken", None)),
            Err(BlocklistError::Io { .. })
        ));
    }

    #[test]
    fn case_override_applies_to_category() {
        let dir = fixture();
        let mut config = SourceConfig::new(dir.path());
        config.case_overrides.insert("urls/nsfw".to_string(), false);
        let blocklist = Blocklist::new(DirectorySource::new(config));

        assert!(blocklist.check("urls", "nsfw", "bad.example").unwrap());
        assert!(blocklist.find("urls", "nsfw", "visit BAD.EXAMPLE now").unwrap());
        assert!(!blocklist.check("phrases", "vulgarisms", "DARN").unwrap());
    }

    #[test]
    fn listing_helpers() {
        let dir = fixture();
        let src = source(&dir);
        assert_eq!(src.types().unwrap(), ["Phrases", "urls"]);
        assert_eq!(src.categories("urls").unwrap(), ["nsfw"]);
        assert_eq!(src.categories("PHRASES").unwrap(), ["Empty", "spam", "vulgarisms"]);
        assert_eq!(src.files("phrases", "spam").unwrap(), ["a_promo.txt", "b_scam.txt"]);
    }

    #[test]
    fn cache_reuses_snapshot_until_files_change() {
        let dir = fixture();
        let mut config = SourceConfig::new(dir.path());
        config.cache_enabled = true;
        let src = DirectorySource::new(config);

        let first = src.resolve(&key("urls", "nsfw", None)).unwrap();
        let second = src.resolve(&key("urls", "nsfw", None)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(src.cached_len(), 1);

        // Different length guarantees a different stamp even on coarse clocks
        fs::write(dir.path().join("urls/nsfw.txt"), "Bad.Example\nworse.example\n").unwrap();
        let third = src.resolve(&key("urls", "nsfw", None)).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(third.entries(), ["Bad.Example", "worse.example"]);

        // The snapshot handed out earlier is unchanged
        assert_eq!(first.entries(), ["Bad.Example"]);
    }

    #[test]
    fn invalidate_drops_category_entries() {
        let dir = fixture();
        let mut config = SourceConfig::new(dir.path());
        config.cache_enabled = true;
        let src = DirectorySource::new(config);

        let before = src.resolve(&key("phrases", "spam", None)).unwrap();
        assert_eq!(before.len(), 3);

        write(dir.path(), "Phrases/spam/c_more.txt", "act now\n");
        src.invalidate("Phrases", "SPAM");
        assert_eq!(src.cached_len(), 0);

        let after = src.resolve(&key("phrases", "spam", None)).unwrap();
        assert_eq!(after.len(), 4);
    }

    #[test]
    fn directory_beats_same_named_file() {
        let dir = fixture();
        write(dir.path(), "Phrases/SPAM.txt", "from-file\n");
        let src = source(&dir);

        let ds = src.resolve(&key("phrases", "spam", None)).unwrap();
        assert_eq!(ds.entries(), ["free money", "click here", "wire transfer"]);
        assert_eq!(src.files("phrases", "spam").unwrap(), ["a_promo.txt", "b_scam.txt"]);
    }

    #[test]
    fn categories_merge_file_and_directory_spellings() {
        let dir = fixture();
        write(dir.path(), "Phrases/SPAM.txt", "from-file\n");
        assert_eq!(
            source(&dir).categories("phrases").unwrap(),
            ["Empty", "spam", "vulgarisms"]
        );
    }

    #[test]
    fn cache_matches_uncached_after_directory_shadows_file() {
        let dir = fixture();
        write(dir.path(), "urls/ads.txt", "from-file\n");
        let mut config = SourceConfig::new(dir.path());
        config.cache_enabled = true;
        let cached = DirectorySource::new(config);
        let uncached = source(&dir);

        let before = cached.resolve(&key("urls", "ads", None)).unwrap();
        assert_eq!(before.entries(), ["from-file"]);

        write(dir.path(), "urls/ads/hosts.txt", "from-dir\n");
        let cached_after = cached.resolve(&key("urls", "ads", None)).unwrap();
        let uncached_after = uncached.resolve(&key("urls", "ads", None)).unwrap();
        assert_eq!(cached_after.entries(), uncached_after.entries());
        assert_eq!(cached_after.entries(), ["from-dir"]);
    }

    #[test]
    fn cache_reloads_when_file_added_to_directory_category() {
        let dir = fixture();
        let mut config = SourceConfig::new(dir.path());
        config.cache_enabled = true;
        let src = DirectorySource::new(config);

        let before = src.resolve(&key("phrases", "spam", None)).unwrap();
        assert_eq!(before.len(), 3);

        write(dir.path(), "Phrases/spam/c_more.txt", "act now\n");
        let after = src.resolve(&key("phrases", "spam", None)).unwrap();
        assert_eq!(after.len(), 4);
        assert_eq!(after.entries()[3], "act now");
        assert_eq!(before.len(), 3);
    }

    #[test]
    fn cache_disabled_loads_fresh_snapshots() {
        let dir = fixture();
        let src = source(&dir);
        let first = src.resolve(&key("urls", "nsfw", None)).unwrap();
        let second = src.resolve(&key("urls", "nsfw", None)).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(src.cached_len(), 0);
    }

    #[test]
    fn concurrent_resolutions_see_complete_datasets() {
        let dir = fixture();
        let mut config = SourceConfig::new(dir.path());
        config.cache_enabled = true;
        let src = Arc::new(DirectorySource::new(config));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let src = Arc::clone(&src);
                std::thread::spawn(move || {
                    src.resolve(&DatasetKey::new("phrases", "spam", None).unwrap())
                        .unwrap()
                        .len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 3);
        }
    }
}
