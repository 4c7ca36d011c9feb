//! Stable persistence keys for objectives
//!
//! Objectives carry no identifier, so completion and item progress are
//! stored against a key derived from what the objective says:
//!
//! ```text
//! {task-id}::objective::{escaped-signature}::{occurrence}
//! {objective-key}::item::{escaped-item-id}
//! ```
//!
//! The signature is built from normalized content with map and item lists
//! sorted, so a catalog refresh that reorders those lists keeps the key.
//! Objectives with identical content on the same task are told apart by a
//! 1-based occurrence counter.
//!
//! Older progress was stored under positional keys (`{task-id}-{index}`);
//! [`legacy_key`] and [`legacy_item_key`] build those so lookups can fall
//! back to them.

use dashmap::DashMap;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use super::id::TaskId;
use super::task::{Objective, Task};

/// Separates signature fields. Removed from field values by [`normalize`].
const FIELD_SEPARATOR: &str = "\u{1e}";

/// Separates list entries inside a field. Removed by [`normalize`] as well.
const LIST_SEPARATOR: &str = "\u{1f}";

const KEY_DELIMITER: &str = "::";
const OBJECTIVE_SEGMENT: &str = "objective";
const ITEM_SEGMENT: &str = "item";

#[derive(Debug, Error, PartialEq)]
pub enum KeyError {
    #[error("Invalid percent escape in '{0}'")]
    InvalidEscape(String),

    #[error("Invalid objective key: '{0}'")]
    InvalidObjectiveKey(String),
}

/// Trims, lowercases and collapses whitespace; drops control characters
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(strip_controls)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn strip_controls(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// Percent-encodes everything outside the URI-component unreserved set
///
/// The result never contains `:`, so escaped values cannot break the `::`
/// key structure.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        if is_unreserved(byte) {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push_str(&format!("{:02X}", byte));
        }
    }
    out
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(byte, b'-' | b'_' | b'.' | b'!' | b'~' | b'*' | b'\'' | b'(' | b')')
}

/// Reverses [`escape`]
pub fn unescape(text: &str) -> Result<String, KeyError> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = text
                .get(i + 1..i + 3)
                .ok_or_else(|| KeyError::InvalidEscape(text.to_string()))?;
            let byte = u8::from_str_radix(hex, 16)
                .map_err(|_| KeyError::InvalidEscape(text.to_string()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).map_err(|_| KeyError::InvalidEscape(text.to_string()))
}

/// Builds the content signature of an objective
///
/// Fields, in order: description, player level, count, found-in-raid,
/// sorted maps, sorted `id|name` item pairs. Absent numbers are empty
/// fields; an absent found-in-raid flag is `false`.
pub fn objective_signature(objective: &Objective) -> String {
    let mut maps: Vec<String> = objective.maps.iter().map(|m| normalize(m)).collect();
    maps.sort();

    let mut items: Vec<String> = objective
        .items
        .iter()
        .map(|item| format!("{}|{}", strip_controls(item.id.trim()), normalize(&item.name)))
        .collect();
    items.sort();

    let fields = [
        normalize(&objective.description),
        objective.player_level.map(|l| l.to_string()).unwrap_or_default(),
        objective.count.map(|c| c.to_string()).unwrap_or_default(),
        objective.found_in_raid.unwrap_or(false).to_string(),
        maps.join(LIST_SEPARATOR),
        items.join(LIST_SEPARATOR),
    ];

    fields.join(FIELD_SEPARATOR)
}

/// A parsed stable objective key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectiveKey {
    pub task_id: TaskId,
    /// Unescaped content signature
    pub signature: String,
    /// 1-based occurrence of the signature within the task
    pub occurrence: u32,
}

impl fmt::Display for ObjectiveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{task}{d}{seg}{d}{sig}{d}{n}",
            task = self.task_id,
            d = KEY_DELIMITER,
            seg = OBJECTIVE_SEGMENT,
            sig = escape(&self.signature),
            n = self.occurrence
        )
    }
}

impl FromStr for ObjectiveKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || KeyError::InvalidObjectiveKey(s.to_string());

        // Task IDs are not escaped, so split from the right
        let mut parts = s.rsplitn(4, KEY_DELIMITER);
        let occurrence = parts.next().ok_or_else(invalid)?;
        let signature = parts.next().ok_or_else(invalid)?;
        let segment = parts.next().ok_or_else(invalid)?;
        let task = parts.next().ok_or_else(invalid)?;

        if segment != OBJECTIVE_SEGMENT {
            return Err(invalid());
        }

        Ok(Self {
            task_id: task.parse().map_err(|_| invalid())?,
            signature: unescape(signature)?,
            occurrence: occurrence
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(invalid)?,
        })
    }
}

/// Derives one stable key per objective, aligned with `task.objectives`
pub fn derive_objective_keys(task: &Task) -> Vec<String> {
    let mut occurrences: HashMap<String, u32> = HashMap::new();

    task.objectives
        .iter()
        .map(|objective| {
            let signature = objective_signature(objective);
            let occurrence = occurrences.entry(signature.clone()).or_insert(0);
            *occurrence += 1;

            ObjectiveKey {
                task_id: task.id.clone(),
                signature,
                occurrence: *occurrence,
            }
            .to_string()
        })
        .collect()
}

/// Key for progress on one item of an objective
pub fn derive_item_progress_key(objective_key: &str, item_id: &str) -> String {
    format!(
        "{}{d}{}{d}{}",
        objective_key,
        ITEM_SEGMENT,
        escape(&normalize(item_id)),
        d = KEY_DELIMITER
    )
}

/// Positional objective key used before stable keys existed
pub fn legacy_key(task_id: &str, objective_index: usize) -> String {
    format!("{}-{}", task_id, objective_index)
}

/// Positional item-progress key used before stable keys existed
pub fn legacy_item_key(task_id: &str, objective_index: usize, item_id: &str) -> String {
    format!("{}::{}::{}", task_id, objective_index, item_id)
}

#[derive(Debug)]
struct CachedKeys {
    fingerprint: blake3::Hash,
    keys: Arc<[String]>,
}

/// Memoizes [`derive_objective_keys`] per task
///
/// Entries are keyed by task ID and checked against a fingerprint of the
/// task's objective content, so an edited task is always re-derived. Safe
/// to share between threads.
///
/// Meant for long-lived callers that resolve the same catalog repeatedly,
/// such as a tracker redrawing its task list. Every lookup still hashes the
/// task's objectives; a hit saves the key strings and hands out a shared
/// slice. One-shot callers should call [`derive_objective_keys`] directly.
#[derive(Debug, Default)]
pub struct ObjectiveKeyCache {
    entries: DashMap<TaskId, CachedKeys>,
}

impl ObjectiveKeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the objective keys for a task, deriving them if needed
    pub fn keys_for(&self, task: &Task) -> Arc<[String]> {
        let fingerprint = content_fingerprint(task);

        if let Some(entry) = self.entries.get(&task.id) {
            if entry.fingerprint == fingerprint {
                debug!(task = %task.id, "objective keys served from cache");
                return Arc::clone(&entry.keys);
            }
        }

        let keys: Arc<[String]> = derive_objective_keys(task).into();
        self.entries.insert(
            task.id.clone(),
            CachedKeys {
                fingerprint,
                keys: Arc::clone(&keys),
            },
        );
        keys
    }

    /// Drops the cached keys of a task
    pub fn invalidate(&self, task_id: &TaskId) -> bool {
        self.entries.remove(task_id).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Hashes every field that feeds an objective key, length-prefixed
fn content_fingerprint(task: &Task) -> blake3::Hash {
    fn put_str(hasher: &mut blake3::Hasher, s: &str) {
        hasher.update(&(s.len() as u64).to_le_bytes());
        hasher.update(s.as_bytes());
    }

    fn put_opt(hasher: &mut blake3::Hasher, value: Option<u32>) {
        match value {
            Some(v) => {
                hasher.update(&[1]);
                hasher.update(&v.to_le_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
    }

    let mut hasher = blake3::Hasher::new();
    put_str(&mut hasher, task.id.as_str());
    hasher.update(&(task.objectives.len() as u64).to_le_bytes());

    for objective in &task.objectives {
        put_str(&mut hasher, &objective.description);
        put_opt(&mut hasher, objective.count);
        put_opt(&mut hasher, objective.player_level);
        put_opt(&mut hasher, objective.found_in_raid.map(u32::from));

        hasher.update(&(objective.maps.len() as u64).to_le_bytes());
        for map in &objective.maps {
            put_str(&mut hasher, map);
        }

        hasher.update(&(objective.items.len() as u64).to_le_bytes());
        for item in &objective.items {
            put_str(&mut hasher, &item.id);
            put_str(&mut hasher, &item.name);
        }
    }

    hasher.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::ItemRef;

    fn task_with(objectives: Vec<Objective>) -> Task {
        let mut task = Task::new(TaskId::new("t-1"));
        task.objectives = objectives;
        task
    }

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize("  Find   the\tFlash\nDrive "), "find the flash drive");
        assert_eq!(normalize("a\u{1e}b \u{1f}"), "ab");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn escape_leaves_unreserved_alone() {
        assert_eq!(escape("abc-XYZ_0.9!~*'()"), "abc-XYZ_0.9!~*'()");
        assert_eq!(escape("a b:c|d"), "a%20b%3Ac%7Cd");
        assert_eq!(escape("é"), "%C3%A9");
    }

    #[test]
    fn unescape_reverses_escape() {
        let original = "kill 5 scavs\u{1e}\u{1e}5\u{1e}false\u{1e}customs\u{1f}woods\u{1e}";
        assert_eq!(unescape(&escape(original)).unwrap(), original);
    }

    #[test]
    fn unescape_rejects_truncated_escape() {
        assert!(unescape("abc%2").is_err());
        assert!(unescape("abc%zz").is_err());
    }

    #[test]
    fn signature_ignores_list_order() {
        let a = Objective::new("Hand over items")
            .with_maps(["Customs", "Woods"])
            .with_items([ItemRef::new("i-2", "Bolts"), ItemRef::new("i-1", "Screws")]);
        let b = Objective::new("  hand over   ITEMS ")
            .with_maps(["woods", "customs"])
            .with_items([ItemRef::new("i-1", "screws"), ItemRef::new("i-2", "BOLTS")]);

        assert_eq!(objective_signature(&a), objective_signature(&b));
    }

    #[test]
    fn signature_distinguishes_content() {
        let base = Objective::new("Eliminate Scavs").with_count(5);

        assert_ne!(
            objective_signature(&base),
            objective_signature(&base.clone().with_count(6))
        );
        assert_ne!(
            objective_signature(&base),
            objective_signature(&base.clone().with_found_in_raid(true))
        );
        assert_ne!(
            objective_signature(&base),
            objective_signature(&base.clone().with_player_level(10))
        );
    }

    #[test]
    fn level_and_count_do_not_alias() {
        let level_only = Objective::new("x").with_player_level(5);
        let count_only = Objective::new("x").with_count(5);
        assert_ne!(objective_signature(&level_only), objective_signature(&count_only));
    }

    #[test]
    fn missing_found_in_raid_is_false() {
        let unset = Objective::new("x");
        let explicit = Objective::new("x").with_found_in_raid(false);
        assert_eq!(objective_signature(&unset), objective_signature(&explicit));
    }

    #[test]
    fn duplicate_objectives_get_distinct_keys() {
        let objective = Objective::new("Survive the raid").with_maps(["Factory"]);
        let task = task_with(vec![objective.clone(), objective]);

        let keys = derive_objective_keys(&task);

        assert_eq!(keys.len(), 2);
        assert_ne!(keys[0], keys[1]);
        assert!(keys[0].ends_with("::1"));
        assert!(keys[1].ends_with("::2"));
    }

    #[test]
    fn keys_follow_objective_order() {
        let task = task_with(vec![
            Objective::new("First"),
            Objective::new("Second"),
            Objective::new("First"),
        ]);

        let keys = derive_objective_keys(&task);
        let parsed: Vec<ObjectiveKey> = keys.iter().map(|k| k.parse().unwrap()).collect();

        assert_eq!(parsed[0].signature, objective_signature(&Objective::new("First")));
        assert_eq!(parsed[0].occurrence, 1);
        assert_eq!(parsed[1].occurrence, 1);
        assert_eq!(parsed[2].occurrence, 2);
    }

    #[test]
    fn key_layout() {
        let task = task_with(vec![Objective::new("Find: the key")]);
        let key = &derive_objective_keys(&task)[0];

        assert!(key.starts_with("t-1::objective::find%3A%20the%20key%1E"));
        assert_eq!(key.matches("::").count(), 3);
    }

    #[test]
    fn key_survives_list_reshuffle() {
        let before = task_with(vec![Objective::new("Plant")
            .with_maps(["Shoreline", "Interchange"])
            .with_items([ItemRef::new("a", "A"), ItemRef::new("b", "B")])]);
        let after = task_with(vec![Objective::new("Plant")
            .with_maps(["Interchange", "Shoreline"])
            .with_items([ItemRef::new("b", "B"), ItemRef::new("a", "A")])]);

        assert_eq!(derive_objective_keys(&before), derive_objective_keys(&after));
    }

    #[test]
    fn parse_key_with_colons_in_task_id() {
        let key = ObjectiveKey {
            task_id: TaskId::new("ns::t-1"),
            signature: "a:b".to_string(),
            occurrence: 3,
        };
        let parsed: ObjectiveKey = key.to_string().parse().unwrap();
        assert_eq!(parsed, key);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("t-1-0".parse::<ObjectiveKey>().is_err());
        assert!("t-1::item::abc::1".parse::<ObjectiveKey>().is_err());
        assert!("t-1::objective::abc::0".parse::<ObjectiveKey>().is_err());
    }

    #[test]
    fn item_progress_key() {
        let key = derive_item_progress_key("t-1::objective::sig::1", "  5C0E531D86F7747FA23F4D42 ");
        assert_eq!(key, "t-1::objective::sig::1::item::5c0e531d86f7747fa23f4d42");
    }

    #[test]
    fn legacy_keys() {
        assert_eq!(legacy_key("t-1", 0), "t-1-0");
        assert_eq!(legacy_item_key("t-1", 2, "i-9"), "t-1::2::i-9");
    }

    #[test]
    fn cache_returns_same_keys() {
        let cache = ObjectiveKeyCache::new();
        let task = task_with(vec![Objective::new("A"), Objective::new("B")]);

        let first = cache.keys_for(&task);
        let second = cache.keys_for(&task);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(&*first, derive_objective_keys(&task).as_slice());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn cache_rederives_after_edit() {
        let cache = ObjectiveKeyCache::new();
        let mut task = task_with(vec![Objective::new("A")]);
        let before = cache.keys_for(&task);

        task.objectives[0].description = "B".to_string();
        let after = cache.keys_for(&task);

        assert_ne!(before, after);
        assert_eq!(&*after, derive_objective_keys(&task).as_slice());
    }

    #[test]
    fn cache_invalidate_and_clear() {
        let cache = ObjectiveKeyCache::new();
        let task = task_with(vec![Objective::new("A")]);
        cache.keys_for(&task);

        assert!(cache.invalidate(&task.id));
        assert!(!cache.invalidate(&task.id));

        cache.keys_for(&task);
        cache.clear();
        assert!(cache.is_empty());
    }
}
