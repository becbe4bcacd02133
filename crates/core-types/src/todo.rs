use crate::error::CoreError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const TITLE_REQUIRED: &str = "Title is required";
pub const TITLE_EMPTY: &str = "Title cannot be empty";

/// A single todo item as it is handed to callers and serialized over the API.
///
/// All six fields are always populated. Rows that carry no description or
/// completion flag are normalized through [`Todo::from_parts`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Builds a `Todo` from raw storage values, filling in the defaults for
    /// an absent description (`""`) and an absent completion flag (`false`).
    pub fn from_parts(
        id: i64,
        title: String,
        description: Option<String>,
        completed: Option<bool>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description: description.unwrap_or_default(),
            completed: completed.unwrap_or(false),
            created_at,
            updated_at,
        }
    }
}

/// The input for creating a todo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
}

impl NewTodo {
    pub fn new(title: impl Into<String>, description: Option<String>) -> Self {
        Self {
            title: title.into(),
            description,
        }
    }

    /// Builds a validated `NewTodo` from request fields, where the title may be absent.
    pub fn from_input(title: Option<String>, description: Option<String>) -> Result<Self, CoreError> {
        let new_todo = Self::new(title.unwrap_or_default(), description);
        new_todo.validate()?;
        Ok(new_todo)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        validate_title(&self.title, TITLE_REQUIRED).map(|_| ())
    }
}

/// A partial update. `None` leaves the column unchanged; it never clears it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct TodoUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

impl TodoUpdate {
    /// True when no field was supplied, i.e. applying it would not write anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }

    /// A supplied title must still be non-blank, so a persisted title never becomes empty.
    pub fn validate(&self) -> Result<(), CoreError> {
        match &self.title {
            Some(title) => validate_title(title, TITLE_EMPTY).map(|_| ()),
            None => Ok(()),
        }
    }

    /// Applies the supplied fields to `todo`. Returns whether anything was supplied.
    pub fn apply_to(&self, todo: &mut Todo) -> bool {
        if let Some(title) = &self.title {
            todo.title = title.clone();
        }
        if let Some(description) = &self.description {
            todo.description = description.clone();
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        !self.is_empty()
    }
}

/// Checks that `title` has content once surrounding whitespace is trimmed.
///
/// The title itself is returned untrimmed; only the emptiness check uses the trimmed form.
pub fn validate_title<'a>(title: &'a str, message: &str) -> Result<&'a str, CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(message.to_string()));
    }
    Ok(title)
}
