//! To-do list: plain create/edit/toggle/delete over an ordered list.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single to-do item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

/// To-do items in creation order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoList {
    todos: Vec<Todo>,
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(Error::InvalidArgument("todo title must not be empty".into()));
    }
    Ok(())
}

impl TodoList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a new, not-done item and return its id
    pub fn add(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Uuid> {
        let title = title.into();
        require_title(&title)?;

        let todo = Todo {
            id: Uuid::new_v4(),
            title,
            description: description.into(),
            done: false,
            created_at: now,
        };
        let id = todo.id;
        tracing::debug!("Adding todo {} ({})", id, todo.title);
        self.todos.push(todo);
        Ok(id)
    }

    /// Replace title and description; `None` leaves a field unchanged
    pub fn edit(
        &mut self,
        id: Uuid,
        title: Option<String>,
        description: Option<String>,
    ) -> Result<&Todo> {
        if let Some(ref title) = title {
            require_title(title)?;
        }

        let todo = self.get_mut(id)?;
        if let Some(title) = title {
            todo.title = title;
        }
        if let Some(description) = description {
            todo.description = description;
        }
        Ok(todo)
    }

    /// Flip the done flag and return its new value
    pub fn toggle(&mut self, id: Uuid) -> Result<bool> {
        let todo = self.get_mut(id)?;
        todo.done = !todo.done;
        tracing::debug!("Todo {} done={}", id, todo.done);
        Ok(todo.done)
    }

    pub fn delete(&mut self, id: Uuid) -> Result<Todo> {
        let idx = self
            .todos
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        Ok(self.todos.remove(idx))
    }

    pub fn get(&self, id: Uuid) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id == id)
    }

    /// Resolve a full id or a unique id prefix
    pub fn resolve(&self, id_or_prefix: &str) -> Result<Uuid> {
        if let Ok(id) = Uuid::parse_str(id_or_prefix) {
            return Ok(id);
        }

        let prefix = id_or_prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Err(Error::InvalidArgument("todo id must not be empty".into()));
        }

        let mut matches = self
            .todos
            .iter()
            .filter(|t| t.id.to_string().starts_with(&prefix));
        match (matches.next(), matches.next()) {
            (Some(todo), None) => Ok(todo.id),
            (None, _) => Err(Error::NotFound(id_or_prefix.to_string())),
            (Some(_), Some(_)) => Err(Error::InvalidArgument(format!(
                "todo id prefix {} is ambiguous",
                id_or_prefix
            ))),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Todo> {
        self.todos.iter()
    }

    pub fn len(&self) -> usize {
        self.todos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.todos.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.done).count()
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Todo> {
        self.todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_toggle_delete() {
        let mut list = TodoList::new();
        let id = list.add("Buy milk", "", Utc::now()).unwrap();

        assert_eq!(list.pending_count(), 1);
        assert!(list.toggle(id).unwrap());
        assert_eq!(list.pending_count(), 0);
        assert!(!list.toggle(id).unwrap());

        let removed = list.delete(id).unwrap();
        assert_eq!(removed.title, "Buy milk");
        assert!(list.is_empty());
    }

    #[test]
    fn test_empty_title_rejected() {
        let mut list = TodoList::new();
        assert!(matches!(
            list.add("  ", "desc", Utc::now()),
            Err(Error::InvalidArgument(_))
        ));

        let id = list.add("Call mom", "", Utc::now()).unwrap();
        assert!(matches!(
            list.edit(id, Some(String::new()), None),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(list.get(id).unwrap().title, "Call mom");
    }

    #[test]
    fn test_edit_keeps_unspecified_fields() {
        let mut list = TodoList::new();
        let id = list.add("Draft", "first pass", Utc::now()).unwrap();

        let todo = list.edit(id, Some("Final".into()), None).unwrap();
        assert_eq!(todo.title, "Final");
        assert_eq!(todo.description, "first pass");
    }

    #[test]
    fn test_unknown_id_not_found() {
        let mut list = TodoList::new();
        let ghost = Uuid::new_v4();
        assert!(matches!(list.toggle(ghost), Err(Error::NotFound(_))));
        assert!(matches!(list.delete(ghost), Err(Error::NotFound(_))));
        assert!(matches!(list.edit(ghost, None, None), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_resolve_prefix() {
        let mut list = TodoList::new();
        let id = list.add("One", "", Utc::now()).unwrap();
        let full = id.to_string();

        assert_eq!(list.resolve(&full).unwrap(), id);
        assert_eq!(list.resolve(&full[..8]).unwrap(), id);
        assert!(matches!(list.resolve("zzzz"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_insertion_order_survives_json() {
        let mut list = TodoList::new();
        for title in ["first", "second", "third"] {
            list.add(title, "", Utc::now()).unwrap();
        }

        let json = serde_json::to_string(&list).unwrap();
        let parsed: TodoList = serde_json::from_str(&json).unwrap();
        let titles: Vec<_> = parsed.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }
}
