//! Workspace picker rules: which workspace the current path points at, and
//! local filtering of the user's workspaces.

use serde::Serialize;

use crate::database::models::{Membership, Workspace, WorkspaceRole};

/// Segments under `/w/` that are pages, not workspace slugs
const RESERVED_SEGMENTS: [&str; 2] = ["profile", "settings"];

pub const DEFAULT_TRIGGER_LABEL: &str = "Select workspace";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerEntry {
    pub id: uuid::Uuid,
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    pub initials: String,
    pub role: WorkspaceRole,
    pub current: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PickerView {
    pub label: String,
    pub current: Option<String>,
    pub entries: Vec<PickerEntry>,
}

/// Slug addressed by a `/w/{slug}...` path
pub fn current_slug(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/w/")?;
    let slug = rest.split('/').next().filter(|s| !s.is_empty())?;
    if RESERVED_SEGMENTS.contains(&slug) {
        return None;
    }
    Some(slug)
}

/// Case-insensitive substring match on name or slug; an empty query keeps everything.
pub fn filter<'a>(memberships: &'a [Membership], query: &str) -> Vec<&'a Membership> {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return memberships.iter().collect();
    }
    memberships
        .iter()
        .filter(|m| {
            m.workspace.name.to_lowercase().contains(&needle) || m.workspace.slug.to_lowercase().contains(&needle)
        })
        .collect()
}

pub fn trigger_label(current: Option<&Workspace>) -> String {
    current
        .map(|w| w.name.clone())
        .unwrap_or_else(|| DEFAULT_TRIGGER_LABEL.to_string())
}

/// Avatar fallback: first two characters, upper-cased
pub fn initials(name: &str) -> String {
    name.chars().take(2).collect::<String>().to_uppercase()
}

/// Assemble the picker for `path`, filtered by `query`. The current workspace
/// is resolved against the full list, not the filtered one.
pub fn build(memberships: &[Membership], path: Option<&str>, query: &str) -> PickerView {
    let current = path
        .and_then(current_slug)
        .and_then(|slug| memberships.iter().find(|m| m.workspace.slug == slug))
        .map(|m| &m.workspace);

    let entries = filter(memberships, query)
        .into_iter()
        .map(|m| PickerEntry {
            id: m.workspace.id,
            slug: m.workspace.slug.clone(),
            name: m.workspace.name.clone(),
            image: m.workspace.image.clone(),
            initials: initials(&m.workspace.name),
            role: m.role,
            current: current.map(|c| c.id) == Some(m.workspace.id),
        })
        .collect();

    PickerView {
        label: trigger_label(current),
        current: current.map(|w| w.slug.clone()),
        entries,
    }
}
