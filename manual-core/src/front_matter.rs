//! Front matter: the YAML block fenced by `---` lines at the top of a file.
//!
//! [`split`] separates the block from the body without copying, and
//! [`FrontMatter::parse`] validates the block against the keys a collection
//! recognizes.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::collection::CollectionKind;
use crate::error::LoadError;

const BOM: char = '\u{feff}';
const FENCE: &str = "---";
const CLOSING_FENCES: [&str; 2] = ["---", "..."];

/// A file split into its front matter block and body.
///
/// `block` is the exact text of the block including both fences, so
/// `block + body` is always the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub block: &'a str,
    pub yaml: &'a str,
    pub body: &'a str,
}

/// Separate front matter from body.
///
/// Input that does not open with a `---` line has no front matter. An
/// opening fence without a closing one is an error. A leading byte order
/// mark is skipped when looking for the opening fence and stays in `block`.
pub fn split(input: &str) -> Result<Split<'_>, LoadError> {
    let no_front_matter = Split {
        block: "",
        yaml: "",
        body: input,
    };

    let start = if input.starts_with(BOM) { BOM.len_utf8() } else { 0 };
    let Some((first, mut pos)) = next_line(input, start) else {
        return Ok(no_front_matter);
    };
    if first.trim_end() != FENCE {
        return Ok(no_front_matter);
    }
    let yaml_start = pos;

    while let Some((line, next)) = next_line(input, pos) {
        if CLOSING_FENCES.contains(&line.trim_end()) {
            return Ok(Split {
                block: &input[..next],
                yaml: &input[yaml_start..pos],
                body: &input[next..],
            });
        }
        pos = next;
    }

    Err(LoadError::FrontMatter(
        "front matter block is never closed".to_string(),
    ))
}

/// The line starting at `start` (without its newline) and the offset just
/// past it.
fn next_line(input: &str, start: usize) -> Option<(&str, usize)> {
    if start >= input.len() {
        return None;
    }
    let rest = &input[start..];
    match rest.find('\n') {
        Some(i) => Some((&rest[..i], start + i + 1)),
        None => Some((rest, input.len())),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Difficulty::Beginner),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!(
                "expected beginner, intermediate or advanced, got '{other}'"
            )),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Basic,
    Advanced,
    Integration,
    Tutorial,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Basic => "basic",
            Category::Advanced => "advanced",
            Category::Integration => "integration",
            Category::Tutorial => "tutorial",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Category::Basic),
            "advanced" => Ok(Category::Advanced),
            "integration" => Ok(Category::Integration),
            "tutorial" => Ok(Category::Tutorial),
            other => Err(format!(
                "expected basic, advanced, integration or tutorial, got '{other}'"
            )),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated front matter.
///
/// Every optional key has a deterministic default: `None` for scalars and an
/// empty list for `tags`. Collection-specific keys are only read for the
/// collection that owns them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontMatter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    /// Guides only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    /// Examples only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Examples only: live demo URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo: Option<String>,
    /// Examples only: source repository URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
}

impl FrontMatter {
    /// Parse and validate the YAML between the fences.
    pub fn parse(yaml: &str, kind: CollectionKind) -> Result<Self, LoadError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let map = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(map) => map,
            Value::Null => Mapping::new(),
            _ => {
                return Err(LoadError::FrontMatter(
                    "front matter must be a mapping".to_string(),
                ));
            }
        };

        let mut front_matter = Self {
            title: string_field(&map, "title")?,
            description: string_field(&map, "description")?,
            tags: list_field(&map, "tags")?,
            created_at: string_field(&map, "createdAt")?,
            updated_at: string_field(&map, "updatedAt")?,
            ..Self::default()
        };

        match kind {
            CollectionKind::Docs => {}
            CollectionKind::Guides => {
                front_matter.difficulty = enum_field(&map, "difficulty")?;
            }
            CollectionKind::Examples => {
                front_matter.category = enum_field(&map, "category")?;
                front_matter.demo = string_field(&map, "demo")?;
                front_matter.repository = string_field(&map, "repository")?;
            }
        }

        Ok(front_matter)
    }

    /// Title, unless missing or blank.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// Description, unless missing or blank.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn string_field(map: &Mapping, field: &'static str) -> Result<Option<String>, LoadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => scalar_to_string(value)
            .map(Some)
            .ok_or_else(|| LoadError::Schema {
                field,
                message: "expected a string".to_string(),
            }),
    }
}

fn list_field(map: &Mapping, field: &'static str) -> Result<Vec<String>, LoadError> {
    match map.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .map(|item| {
                scalar_to_string(item).ok_or_else(|| LoadError::Schema {
                    field,
                    message: "expected a list of strings".to_string(),
                })
            })
            .collect(),
        Some(value) => scalar_to_string(value)
            .map(|s| vec![s])
            .ok_or_else(|| LoadError::Schema {
                field,
                message: "expected a list of strings".to_string(),
            }),
    }
}

fn enum_field<T>(map: &Mapping, field: &'static str) -> Result<Option<T>, LoadError>
where
    T: FromStr<Err = String>,
{
    match string_field(map, field)? {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|message| LoadError::Schema { field, message }),
    }
}
