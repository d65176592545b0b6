//! Pure scene composition: catalog + roster + committed local avatar in, ordered frame of
//! placed primitives out.
//!
//! Every entity becomes one [`PrimitiveGroup`] carrying the entity's world transform and a
//! contiguous run of [`Primitive`]s whose transforms are local to the group. Group ids are
//! hashed from the entity identity, so they stay stable across recompositions and the
//! renderer can diff frames instead of rebuilding them.

use crate::avatar::{Accessory, AvatarConfig, Color, HairStyle};
use crate::catalog::{EntityCatalog, EntityKind, EntityTemplate, Vec3Data};
use crate::roster::{AvatarRoster, UserId};
use bincode::Options;
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt;

const AVATAR_DEFAULT_COLOR: Color = Color::rgb(0x4F, 0x46, 0xE5);
const HAIR_COLOR: Color = Color::rgb(0x3B, 0x2A, 0x20);
const LABEL_COLOR: Color = Color::WHITE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupId(u64);

impl GroupId {
    fn from_key(namespace: &str, key: &str) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(namespace.as_bytes());
        hasher.update(&[0]);
        hasher.update(key.as_bytes());
        let digest = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest.as_bytes()[..8]);
        GroupId(u64::from_le_bytes(bytes))
    }

    pub fn for_entity(entity: &EntityTemplate) -> Self {
        Self::from_key(entity.kind.label(), entity.id.as_str())
    }

    /// Users keep the same group whether they are rendered as the local or a remote avatar.
    pub fn for_user(user: &UserId) -> Self {
        Self::from_key("user", user.as_str())
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Shape {
    Sphere { radius: f32 },
    Box { size: Vec3Data },
    Label { text: String, font_size: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    pub color: Color,
    pub emissive: f32,
    pub opacity: f32,
}

impl Material {
    pub const fn solid(color: Color) -> Self {
        Self { color, emissive: 0.0, opacity: 1.0 }
    }

    pub const fn glowing(color: Color, emissive: f32) -> Self {
        Self { color, emissive, opacity: 1.0 }
    }

    pub const fn translucent(color: Color, opacity: f32) -> Self {
        Self { color, emissive: 0.0, opacity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Transform {
    pub translation: Vec3Data,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3Data,
}

impl Transform {
    pub fn at(translation: Vec3) -> Self {
        Self { translation: translation.into(), rotation: Vec3Data::ZERO }
    }

    pub fn matrix(&self) -> Mat4 {
        let r = self.rotation;
        let rotation = Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z);
        Mat4::from_rotation_translation(rotation, self.translation.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GroupKind {
    Workstation,
    MeetingRoom,
    Avatar,
    LocalAvatar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Primitive {
    pub group: GroupId,
    pub part: &'static str,
    pub shape: Shape,
    pub local: Transform,
    pub material: Material,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveGroup {
    pub id: GroupId,
    pub kind: GroupKind,
    /// Entity id for catalog entities, user id for avatars from the roster.
    pub source: String,
    pub world: Transform,
    first: u32,
    count: u32,
}

impl PrimitiveGroup {
    pub fn len(&self) -> usize {
        self.count as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Hash of the canonical frame encoding. Equal digests mean byte-identical frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameDigest([u8; 32]);

impl fmt::Display for FrameDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Immutable output of one composition pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScenePrimitives {
    groups: Vec<PrimitiveGroup>,
    primitives: Vec<Primitive>,
}

impl ScenePrimitives {
    pub fn groups(&self) -> &[PrimitiveGroup] {
        &self.groups
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn group(&self, id: GroupId) -> Option<&PrimitiveGroup> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn group_primitives(&self, group: &PrimitiveGroup) -> &[Primitive] {
        let start = group.first as usize;
        &self.primitives[start..start + group.count as usize]
    }

    /// World matrix for a primitive: group transform followed by the primitive's local one.
    pub fn world_matrix(&self, group: &PrimitiveGroup, primitive: &Primitive) -> Mat4 {
        group.world.matrix() * primitive.local.matrix()
    }

    pub fn encode(&self) -> Vec<u8> {
        frame_options().serialize(self).expect("frame types always serialize")
    }

    pub fn digest(&self) -> FrameDigest {
        FrameDigest(*blake3::hash(&self.encode()).as_bytes())
    }

    fn push_group(&mut self, id: GroupId, kind: GroupKind, source: String, world: Transform, parts: PartList) {
        let first = self.primitives.len() as u32;
        let count = parts.len() as u32;
        self.primitives.extend(parts.into_iter().map(|part| Primitive {
            group: id,
            part: part.name,
            shape: part.shape,
            local: Transform::at(part.offset),
            material: part.material,
        }));
        self.groups.push(PrimitiveGroup { id, kind, source, world, first, count });
    }
}

fn frame_options() -> impl bincode::Options {
    bincode::DefaultOptions::new().with_fixint_encoding()
}

/// The local user's avatar, rendered from the committed configuration only.
#[derive(Debug, Clone, Copy)]
pub struct LocalAvatar<'a> {
    pub user: &'a UserId,
    pub display_name: &'a str,
    pub position: Vec3,
    pub config: &'a AvatarConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct SceneInputs<'a> {
    pub catalog: &'a EntityCatalog,
    pub roster: &'a AvatarRoster,
    pub local: Option<LocalAvatar<'a>>,
}

/// Order: catalog entities, then the local avatar, then remote avatars by user id. A roster
/// entry echoing the local user is skipped so the user is never drawn twice.
pub fn compose(inputs: &SceneInputs<'_>) -> ScenePrimitives {
    let mut frame = ScenePrimitives::default();
    for entity in inputs.catalog.iter() {
        let (kind, parts) = match &entity.kind {
            EntityKind::Workstation => (GroupKind::Workstation, workstation_parts()),
            EntityKind::MeetingRoom { label, chairs_per_side } => {
                (GroupKind::MeetingRoom, meeting_room_parts(label, *chairs_per_side))
            }
            EntityKind::Avatar { display_name, color_tag } => (GroupKind::Avatar, avatar_parts(display_name, *color_tag)),
        };
        let world = Transform { translation: entity.position, rotation: entity.rotation };
        frame.push_group(GroupId::for_entity(entity), kind, entity.id.to_string(), world, parts);
    }
    if let Some(local) = &inputs.local {
        frame.push_group(
            GroupId::for_user(local.user),
            GroupKind::LocalAvatar,
            local.user.to_string(),
            Transform::at(local.position),
            local_avatar_parts(local.display_name, local.config),
        );
    }
    let local_user = inputs.local.as_ref().map(|local| local.user);
    for (user, presence) in inputs.roster.iter() {
        if Some(user) == local_user {
            continue;
        }
        frame.push_group(
            GroupId::for_user(user),
            GroupKind::Avatar,
            user.to_string(),
            Transform::at(presence.position),
            avatar_parts(&presence.display_name, presence.color),
        );
    }
    frame
}

struct PartTemplate {
    name: &'static str,
    shape: Shape,
    offset: Vec3,
    material: Material,
}

type PartList = SmallVec<[PartTemplate; 16]>;

fn part(name: &'static str, shape: Shape, offset: Vec3, material: Material) -> PartTemplate {
    PartTemplate { name, shape, offset, material }
}

fn cuboid(x: f32, y: f32, z: f32) -> Shape {
    Shape::Box { size: Vec3Data::new(x, y, z) }
}

fn label(text: &str, font_size: f32) -> Shape {
    Shape::Label { text: text.to_string(), font_size }
}

fn workstation_parts() -> PartList {
    let mut parts = PartList::new();
    parts.push(part("desk", cuboid(2.0, 0.1, 1.0), Vec3::new(0.0, 0.75, 0.0), Material::solid(Color::rgb(0x8B, 0x5C, 0xF6))));
    parts.push(part(
        "monitor",
        cuboid(1.5, 0.8, 0.1),
        Vec3::new(0.0, 1.4, -0.4),
        Material::solid(Color::rgb(0x1F, 0x29, 0x37)),
    ));
    parts.push(part(
        "screen",
        cuboid(1.4, 0.7, 0.05),
        Vec3::new(0.0, 1.4, -0.35),
        Material::glowing(Color::rgb(0x05, 0x96, 0x69), 0.2),
    ));
    parts
}

fn meeting_room_parts(room_label: &str, chairs_per_side: u32) -> PartList {
    let wall = Material::translucent(Color::rgb(0x37, 0x41, 0x51), 0.3);
    let chair = Material::solid(Color::rgb(0x4B, 0x55, 0x63));
    let mut parts = PartList::new();
    parts.push(part("wall_back", cuboid(6.0, 3.0, 0.1), Vec3::new(0.0, 1.5, -3.0), wall));
    parts.push(part("wall_left", cuboid(0.1, 3.0, 6.0), Vec3::new(-3.0, 1.5, 0.0), wall));
    parts.push(part("wall_right", cuboid(0.1, 3.0, 6.0), Vec3::new(3.0, 1.5, 0.0), wall));
    parts.push(part("table", cuboid(4.0, 0.1, 2.0), Vec3::new(0.0, 0.8, 0.0), Material::solid(Color::rgb(0x6B, 0x72, 0x80))));
    let center = (chairs_per_side as f32 - 1.0) * 0.5;
    for z in [1.2, -1.2] {
        for i in 0..chairs_per_side {
            let x = i as f32 - center;
            parts.push(part("chair", cuboid(0.4, 0.8, 0.4), Vec3::new(x, 0.4, z), chair));
        }
    }
    parts.push(part("label", label(room_label, 0.3), Vec3::new(0.0, 2.5, 0.0), Material::solid(Color::rgb(0x60, 0xA5, 0xFA))));
    parts
}

fn avatar_body(name: &str, head: Color, torso: Color) -> PartList {
    let mut parts = PartList::new();
    parts.push(part("head", Shape::Sphere { radius: 0.3 }, Vec3::new(0.0, 1.7, 0.0), Material::solid(head)));
    parts.push(part("torso", cuboid(0.4, 1.2, 0.2), Vec3::new(0.0, 0.6, 0.0), Material::solid(torso)));
    parts.push(part("name", label(name, 0.2), Vec3::new(0.0, 2.2, 0.0), Material::solid(LABEL_COLOR)));
    parts
}

fn avatar_parts(name: &str, color: Color) -> PartList {
    avatar_body(name, color, color)
}

fn local_avatar_parts(name: &str, config: &AvatarConfig) -> PartList {
    let mut parts = avatar_body(name, config.skin_tone, config.clothing.color());
    let hair = Material::solid(HAIR_COLOR);
    match config.hair_style {
        HairStyle::Short => parts.push(part("hair", Shape::Sphere { radius: 0.31 }, Vec3::new(0.0, 1.78, -0.02), hair)),
        HairStyle::Medium => parts.push(part("hair", cuboid(0.64, 0.32, 0.64), Vec3::new(0.0, 1.8, -0.02), hair)),
        HairStyle::Long => {
            parts.push(part("hair", Shape::Sphere { radius: 0.32 }, Vec3::new(0.0, 1.78, -0.02), hair));
            parts.push(part("hair_back", cuboid(0.6, 0.7, 0.12), Vec3::new(0.0, 1.5, -0.22), hair));
        }
        HairStyle::Curly => parts.push(part("hair", Shape::Sphere { radius: 0.35 }, Vec3::new(0.0, 1.82, -0.03), hair)),
        HairStyle::Bald => {}
    }
    for accessory in &config.accessories {
        parts.push(accessory_part(*accessory));
    }
    parts
}

fn accessory_part(accessory: Accessory) -> PartTemplate {
    match accessory {
        Accessory::Glasses => {
            part("glasses", cuboid(0.36, 0.06, 0.04), Vec3::new(0.0, 1.75, 0.29), Material::solid(Color::rgb(0x11, 0x18, 0x27)))
        }
        Accessory::Tie => {
            part("tie", cuboid(0.08, 0.5, 0.02), Vec3::new(0.0, 0.95, 0.11), Material::solid(Color::rgb(0xB9, 0x1C, 0x1C)))
        }
        Accessory::Watch => {
            part("watch", cuboid(0.06, 0.04, 0.06), Vec3::new(0.24, 0.55, 0.0), Material::solid(Color::rgb(0x9C, 0xA3, 0xAF)))
        }
        Accessory::Badge => {
            part("badge", cuboid(0.1, 0.06, 0.02), Vec3::new(-0.12, 1.0, 0.11), Material::solid(Color::rgb(0xFB, 0xBF, 0x24)))
        }
    }
}

/// Fallback colour for roster entries whose colour tag fails to parse.
pub fn default_avatar_color() -> Color {
    AVATAR_DEFAULT_COLOR
}
