use crate::avatar::Color;
use crate::error::WorkspaceError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3Data {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3Data {
    pub const ZERO: Vec3Data = Vec3Data { x: 0.0, y: 0.0, z: 0.0 };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<glam::Vec3> for Vec3Data {
    fn from(value: glam::Vec3) -> Self {
        Self { x: value.x, y: value.y, z: value.z }
    }
}

impl From<Vec3Data> for glam::Vec3 {
    fn from(value: Vec3Data) -> Self {
        glam::Vec3::new(value.x, value.y, value.z)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

const fn default_chairs_per_side() -> u32 {
    4
}

pub const MAX_CHAIRS_PER_SIDE: u32 = 32;

fn default_room_label() -> String {
    "Meeting Room".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityKind {
    Workstation,
    MeetingRoom {
        #[serde(default = "default_room_label")]
        label: String,
        #[serde(default = "default_chairs_per_side")]
        chairs_per_side: u32,
    },
    Avatar {
        display_name: String,
        color_tag: Color,
    },
}

impl EntityKind {
    pub fn meeting_room() -> Self {
        EntityKind::MeetingRoom { label: default_room_label(), chairs_per_side: default_chairs_per_side() }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Workstation => "workstation",
            EntityKind::MeetingRoom { .. } => "meeting_room",
            EntityKind::Avatar { .. } => "avatar",
        }
    }
}

/// Placement template for one world entity. Immutable once it is in a catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTemplate {
    pub id: EntityId,
    #[serde(flatten)]
    pub kind: EntityKind,
    pub position: Vec3Data,
    #[serde(default)]
    pub rotation: Vec3Data,
}

impl EntityTemplate {
    pub fn new(id: impl Into<String>, kind: EntityKind, position: glam::Vec3) -> Self {
        Self { id: EntityId::new(id), kind, position: position.into(), rotation: Vec3Data::ZERO }
    }

    pub fn with_yaw(mut self, yaw_radians: f32) -> Self {
        self.rotation = Vec3Data::new(0.0, yaw_radians, 0.0);
        self
    }

    fn validate(&self) -> Result<(), WorkspaceError> {
        if !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(WorkspaceError::invalid_layout(format!("entity '{}' has a non-finite transform", self.id)));
        }
        if let EntityKind::MeetingRoom { chairs_per_side, .. } = &self.kind {
            if *chairs_per_side == 0 {
                return Err(WorkspaceError::invalid_layout(format!(
                    "meeting room '{}' needs at least one chair per side",
                    self.id
                )));
            }
            if *chairs_per_side > MAX_CHAIRS_PER_SIDE {
                return Err(WorkspaceError::invalid_layout(format!(
                    "meeting room '{}' has {chairs_per_side} chairs per side, at most {MAX_CHAIRS_PER_SIDE} fit",
                    self.id
                )));
            }
        }
        Ok(())
    }
}

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Revisions are drawn from one process-wide counter, so two catalogs only share a
/// revision when one is an unmodified clone of the other.
fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Ordered list of entity placements. Enumeration order is composition order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "CatalogFile")]
pub struct EntityCatalog {
    entities: Vec<EntityTemplate>,
    #[serde(skip)]
    revision: u64,
}

/// On-disk shape; entities are validated as they are appended.
#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    entities: Vec<EntityTemplate>,
}

impl TryFrom<CatalogFile> for EntityCatalog {
    type Error = WorkspaceError;

    fn try_from(file: CatalogFile) -> Result<Self, WorkspaceError> {
        let mut catalog = EntityCatalog::new();
        catalog.extend(file.entities)?;
        Ok(catalog)
    }
}

impl Default for EntityCatalog {
    fn default() -> Self {
        Self { entities: Vec::new(), revision: next_revision() }
    }
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Layout of the stock workspace: a four-desk hub around the origin, four individual
    /// desks and one meeting room north of the hub.
    pub fn default_workspace() -> Self {
        let mut catalog = Self::new();
        let hub = [
            (glam::Vec3::ZERO, 0.0),
            (glam::Vec3::new(3.0, 0.0, 0.0), FRAC_PI_2),
            (glam::Vec3::new(0.0, 0.0, 3.0), PI),
            (glam::Vec3::new(-3.0, 0.0, 0.0), -FRAC_PI_2),
        ]
        .into_iter()
        .enumerate()
        .map(|(i, (pos, yaw))| EntityTemplate::new(format!("hub-{i}"), EntityKind::Workstation, pos).with_yaw(yaw));
        let individual = [
            ("desk-east-south", glam::Vec3::new(8.0, 0.0, 2.0)),
            ("desk-east-north", glam::Vec3::new(8.0, 0.0, -2.0)),
            ("desk-west-south", glam::Vec3::new(-8.0, 0.0, 2.0)),
            ("desk-west-north", glam::Vec3::new(-8.0, 0.0, -2.0)),
        ];
        let room = EntityTemplate::new("meeting-room-1", EntityKind::meeting_room(), glam::Vec3::new(0.0, 0.0, -10.0));
        let templates = hub
            .chain(individual.into_iter().map(|(id, pos)| EntityTemplate::new(id, EntityKind::Workstation, pos)))
            .chain(std::iter::once(room));
        for template in templates {
            catalog.push(template).expect("stock workspace ids are unique");
        }
        catalog
    }

    pub fn entities(&self) -> &[EntityTemplate] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityTemplate> {
        self.entities.iter()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&EntityTemplate> {
        self.entities.iter().find(|entity| entity.id.as_str() == id)
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn push(&mut self, template: EntityTemplate) -> Result<(), WorkspaceError> {
        template.validate()?;
        if self.get(template.id.as_str()).is_some() {
            return Err(WorkspaceError::DuplicateEntityId(template.id.to_string()));
        }
        self.entities.push(template);
        self.revision = next_revision();
        Ok(())
    }

    /// Appends all templates or none of them.
    pub fn extend(&mut self, templates: Vec<EntityTemplate>) -> Result<(), WorkspaceError> {
        let mut seen: HashSet<&str> = self.entities.iter().map(|entity| entity.id.as_str()).collect();
        for template in &templates {
            template.validate()?;
            if !seen.insert(template.id.as_str()) {
                return Err(WorkspaceError::DuplicateEntityId(template.id.to_string()));
            }
        }
        if !templates.is_empty() {
            self.entities.extend(templates);
            self.revision = next_revision();
        }
        Ok(())
    }

    /// Adds a ring of `count` workstations around `center`, each facing inward.
    pub fn add_ring(&mut self, prefix: &str, center: glam::Vec3, count: u32, radius: f32) -> Result<(), WorkspaceError> {
        self.extend(ring_layout(prefix, center, count, radius)?)
    }

    pub fn add_row(
        &mut self,
        prefix: &str,
        start: glam::Vec3,
        count: u32,
        spacing: f32,
        yaw_radians: f32,
    ) -> Result<(), WorkspaceError> {
        self.extend(row_layout(prefix, start, count, spacing, yaw_radians)?)
    }

    pub fn remove(&mut self, id: &str) -> Option<EntityTemplate> {
        let idx = self.entities.iter().position(|entity| entity.id.as_str() == id)?;
        self.revision = next_revision();
        Some(self.entities.remove(idx))
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("Reading catalog file {}", path.display()))?;
        let catalog = serde_json::from_slice::<EntityCatalog>(&bytes)
            .with_context(|| format!("Parsing catalog file {}", path.display()))?;
        log::info!("[catalog] loaded {} entities from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn save_to_path(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Creating catalog directory {}", parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json.as_bytes()).with_context(|| format!("Writing catalog file {}", path.display()))?;
        Ok(())
    }
}

/// Generates `count` workstations at `radius` from `center`. Workstation `i` sits at angle
/// `i * TAU / count` and is yawed by the same angle so its monitor faces the center.
pub fn ring_layout(prefix: &str, center: glam::Vec3, count: u32, radius: f32) -> Result<Vec<EntityTemplate>, WorkspaceError> {
    if count == 0 {
        return Err(WorkspaceError::invalid_layout("ring needs at least one workstation"));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(WorkspaceError::invalid_layout(format!("ring radius must be positive, got {radius}")));
    }
    if !center.is_finite() {
        return Err(WorkspaceError::invalid_layout("ring center must be finite"));
    }
    let step = TAU / count as f32;
    let templates = (0..count)
        .map(|i| {
            let angle = i as f32 * step;
            let offset = glam::Vec3::new(angle.sin(), 0.0, angle.cos()) * radius;
            EntityTemplate::new(format!("{prefix}-{i}"), EntityKind::Workstation, center + offset).with_yaw(angle)
        })
        .collect();
    Ok(templates)
}

/// Generates `count` workstations along +X starting at `start`.
pub fn row_layout(
    prefix: &str,
    start: glam::Vec3,
    count: u32,
    spacing: f32,
    yaw_radians: f32,
) -> Result<Vec<EntityTemplate>, WorkspaceError> {
    if count == 0 {
        return Err(WorkspaceError::invalid_layout("row needs at least one workstation"));
    }
    if !(spacing.is_finite() && spacing > 0.0) {
        return Err(WorkspaceError::invalid_layout(format!("row spacing must be positive, got {spacing}")));
    }
    let templates = (0..count)
        .map(|i| {
            let position = start + glam::Vec3::X * (i as f32 * spacing);
            EntityTemplate::new(format!("{prefix}-{i}"), EntityKind::Workstation, position).with_yaw(yaw_radians)
        })
        .collect();
    Ok(templates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_workspace_matches_stock_layout() {
        let catalog = EntityCatalog::default_workspace();
        assert_eq!(catalog.len(), 9);
        let workstations = catalog.iter().filter(|e| e.kind == EntityKind::Workstation).count();
        assert_eq!(workstations, 8);
        let room = catalog.get("meeting-room-1").expect("meeting room present");
        assert_eq!(room.position, Vec3Data::new(0.0, 0.0, -10.0));
        assert_eq!(catalog.get("hub-0").expect("hub desk").position, Vec3Data::ZERO);
        let east = catalog.get("hub-1").expect("hub desk");
        assert_eq!(east.position, Vec3Data::new(3.0, 0.0, 0.0));
        assert_eq!(east.rotation.y, FRAC_PI_2);
        assert_eq!(catalog.get("hub-2").expect("hub desk").position, Vec3Data::new(0.0, 0.0, 3.0));
    }

    #[test]
    fn separately_built_catalogs_never_share_a_revision() {
        let a = EntityCatalog::default_workspace();
        let b = EntityCatalog::default_workspace();
        assert_eq!(a.len(), b.len());
        assert_ne!(a.revision(), b.revision());
        assert_eq!(a.clone().revision(), a.revision());

        let parsed: EntityCatalog = serde_json::from_str(r#"{"entities":[]}"#).expect("parse catalog");
        assert_ne!(parsed.revision(), EntityCatalog::new().revision());
    }

    #[test]
    fn oversized_meeting_rooms_are_invalid() {
        let room = |chairs| {
            EntityTemplate::new(
                "room",
                EntityKind::MeetingRoom { label: "Hall".to_string(), chairs_per_side: chairs },
                glam::Vec3::ZERO,
            )
        };
        assert!(EntityCatalog::new().push(room(MAX_CHAIRS_PER_SIDE)).is_ok());
        assert!(matches!(EntityCatalog::new().push(room(u32::MAX)), Err(WorkspaceError::InvalidLayout(_))));

        let json = r#"{"entities":[{"id":"hall","kind":"meeting_room","chairs_per_side":4294967295,"position":{"x":0,"y":0,"z":0}}]}"#;
        let err = serde_json::from_str::<EntityCatalog>(json).unwrap_err();
        assert!(err.to_string().contains("chairs per side"), "{err}");
    }

    #[test]
    fn push_rejects_duplicates_without_bumping_revision() {
        let mut catalog = EntityCatalog::new();
        catalog.push(EntityTemplate::new("a", EntityKind::Workstation, glam::Vec3::ZERO)).expect("first push");
        let revision = catalog.revision();
        let err = catalog.push(EntityTemplate::new("a", EntityKind::Workstation, glam::Vec3::X)).unwrap_err();
        assert_eq!(err, WorkspaceError::DuplicateEntityId("a".to_string()));
        assert_eq!(catalog.revision(), revision);
    }

    #[test]
    fn extend_is_all_or_nothing() {
        let mut catalog = EntityCatalog::new();
        let batch = vec![
            EntityTemplate::new("x", EntityKind::Workstation, glam::Vec3::ZERO),
            EntityTemplate::new("x", EntityKind::Workstation, glam::Vec3::X),
        ];
        assert!(catalog.extend(batch).is_err());
        assert!(catalog.is_empty());
    }

    #[test]
    fn row_rejects_non_positive_spacing() {
        assert!(matches!(
            row_layout("row", glam::Vec3::ZERO, 3, 0.0, 0.0),
            Err(WorkspaceError::InvalidLayout(_))
        ));
        let row = row_layout("row", glam::Vec3::ZERO, 3, 2.5, 0.0).expect("valid row");
        assert_eq!(row[2].position, Vec3Data::new(5.0, 0.0, 0.0));
    }

    #[test]
    fn meeting_room_defaults_fill_in_from_json() {
        let json = r#"{"entities":[{"id":"room","kind":"meeting_room","position":{"x":0,"y":0,"z":-10}}]}"#;
        let catalog: EntityCatalog = serde_json::from_str(json).expect("parse catalog");
        assert_eq!(catalog.entities()[0].kind, EntityKind::meeting_room());
        assert_eq!(catalog.entities()[0].rotation, Vec3Data::ZERO);
    }
}
