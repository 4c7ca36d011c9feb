//! Task domain model
//!
//! Tasks are the tracked units of progression. Each task names the tasks
//! that must be completed before it unlocks and carries zero or more
//! objectives, which have no identifier of their own (see [`super::keys`]).

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::id::TaskId;

/// An item an objective asks for (hand-in, craft, find)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Catalog item identifier
    pub id: String,
    /// Display name of the item
    #[serde(default)]
    pub name: String,
}

impl ItemRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A sub-requirement of a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Free-text description shown to the player
    #[serde(default)]
    pub description: String,

    /// How many times / how many items
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    /// Maps this objective can be completed on
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub maps: Vec<String>,

    /// Items the objective requires
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<ItemRef>,

    /// Minimum player level
    #[serde(default, alias = "playerLevel", skip_serializing_if = "Option::is_none")]
    pub player_level: Option<u32>,

    /// Whether items must be found in raid
    #[serde(default, alias = "foundInRaid", skip_serializing_if = "Option::is_none")]
    pub found_in_raid: Option<bool>,
}

impl Objective {
    /// Creates an objective with only a description
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_maps<I, S>(mut self, maps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.maps = maps.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_items(mut self, items: impl IntoIterator<Item = ItemRef>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    pub fn with_player_level(mut self, level: u32) -> Self {
        self.player_level = Some(level);
        self
    }

    pub fn with_found_in_raid(mut self, found_in_raid: bool) -> Self {
        self.found_in_raid = Some(found_in_raid);
        self
    }
}

/// Ordered prerequisite references with lenient deserialization
///
/// Catalogs disagree on the shape of a prerequisite reference. All of these
/// are accepted and reduced to the referenced task ID:
///
/// - `"t-1"`
/// - `{"id": "t-1"}`
/// - `{"task": {"id": "t-1"}, "status": ["complete"]}`
///
/// Order and duplicates are preserved as given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Prerequisites(Vec<TaskId>);

impl Prerequisites {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a prerequisite reference
    pub fn push(&mut self, task: TaskId) {
        self.0.push(task);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskId> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[TaskId] {
        &self.0
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.0.contains(task_id)
    }
}

impl From<Vec<TaskId>> for Prerequisites {
    fn from(ids: Vec<TaskId>) -> Self {
        Self(ids)
    }
}

impl<'a> IntoIterator for &'a Prerequisites {
    type Item = &'a TaskId;
    type IntoIter = std::slice::Iter<'a, TaskId>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Prerequisites {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Always written back as plain IDs
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Prerequisites {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{SeqAccess, Visitor};

        struct PrerequisitesVisitor;

        impl<'de> Visitor<'de> for PrerequisitesVisitor {
            type Value = Prerequisites;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a sequence of prerequisite references (strings or objects)")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut ids = Vec::new();

                while let Some(value) = seq.next_element::<serde_json::Value>()? {
                    let raw = match &value {
                        serde_json::Value::String(s) => Some(s.as_str()),
                        serde_json::Value::Object(obj) => obj
                            .get("id")
                            .and_then(|v| v.as_str())
                            .or_else(|| {
                                obj.get("task")
                                    .and_then(|t| t.get("id"))
                                    .and_then(|v| v.as_str())
                            }),
                        _ => None,
                    };

                    let raw = raw.ok_or_else(|| {
                        serde::de::Error::custom(format!(
                            "expected string or object with an id for prerequisite, got {}",
                            value
                        ))
                    })?;

                    let id: TaskId = raw.parse().map_err(serde::de::Error::custom)?;
                    ids.push(id);
                }

                Ok(Prerequisites(ids))
            }
        }

        deserializer.deserialize_seq(PrerequisitesVisitor)
    }
}

/// A unit of progression with prerequisites and objectives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Who hands out the task (display only)
    #[serde(default, alias = "trader", skip_serializing_if = "Option::is_none")]
    pub giver: Option<String>,

    /// Tasks that must be completed first
    #[serde(default, alias = "taskRequirements")]
    pub prerequisites: Prerequisites,

    /// Sub-requirements, in catalog order
    #[serde(default)]
    pub objectives: Vec<Objective>,
}

impl Task {
    /// Creates a task with no prerequisites and no objectives
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            name: None,
            giver: None,
            prerequisites: Prerequisites::new(),
            objectives: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_prerequisite(mut self, task: TaskId) -> Self {
        self.prerequisites.push(task);
        self
    }

    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objectives.push(objective);
        self
    }

    /// Name for display, falling back to the ID
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }
}
