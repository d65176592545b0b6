use crate::avatar::Color;
use glam::Vec3;
use std::collections::BTreeMap;
use std::fmt;

pub const MAIN_ROOM: &str = "main";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PresenceStatus {
    #[default]
    Available,
    Coding,
    Meeting,
    Away,
}

impl PresenceStatus {
    pub fn label(self) -> &'static str {
        match self {
            PresenceStatus::Available => "available",
            PresenceStatus::Coding => "coding",
            PresenceStatus::Meeting => "meeting",
            PresenceStatus::Away => "away",
        }
    }

    /// Unknown labels fall back to `Available`, matching the presence service default.
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "coding" => PresenceStatus::Coding,
            "meeting" => PresenceStatus::Meeting,
            "away" => PresenceStatus::Away,
            _ => PresenceStatus::Available,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Presence {
    pub display_name: String,
    pub color: Color,
    pub position: Vec3,
    pub status: PresenceStatus,
    pub room: String,
}

impl Presence {
    pub fn new(display_name: impl Into<String>, color: Color, position: Vec3) -> Self {
        Self {
            display_name: display_name.into(),
            color,
            position,
            status: PresenceStatus::Available,
            room: MAIN_ROOM.to_string(),
        }
    }

    /// Builds a presence from a transport colour tag, falling back to the default avatar
    /// colour when the tag does not parse.
    pub fn from_tag(display_name: impl Into<String>, color_tag: &str, position: Vec3) -> Self {
        let display_name = display_name.into();
        let color = Color::from_hex(color_tag).unwrap_or_else(|err| {
            log::warn!("[roster] {display_name}: {err}; using default avatar colour");
            crate::compose::default_avatar_color()
        });
        Self::new(display_name, color, position)
    }
}

/// Presence updates delivered by the transport collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterEvent {
    Joined { user: UserId, presence: Presence },
    Left { user: UserId },
    PositionUpdated { user: UserId, position: Vec3 },
    StatusUpdated { user: UserId, status: PresenceStatus },
    RoomChanged { user: UserId, room: String },
}

impl fmt::Display for RosterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RosterEvent::Joined { user, presence } => {
                write!(f, "Joined user={user} name={}", presence.display_name)
            }
            RosterEvent::Left { user } => write!(f, "Left user={user}"),
            RosterEvent::PositionUpdated { user, position } => {
                write!(f, "PositionUpdated user={user} pos=({:.2}, {:.2}, {:.2})", position.x, position.y, position.z)
            }
            RosterEvent::StatusUpdated { user, status } => {
                write!(f, "StatusUpdated user={user} status={}", status.label())
            }
            RosterEvent::RoomChanged { user, room } => write!(f, "RoomChanged user={user} room={room}"),
        }
    }
}

/// Live avatar roster keyed by user id. Iteration is ordered by id so composition stays
/// deterministic regardless of arrival order.
#[derive(Debug, Clone, Default)]
pub struct AvatarRoster {
    entries: BTreeMap<UserId, Presence>,
    revision: u64,
}

impl AvatarRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, user: &UserId) -> Option<&Presence> {
        self.entries.get(user)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UserId, &Presence)> {
        self.entries.iter()
    }

    pub fn connection_count(&self) -> usize {
        self.entries.len()
    }

    /// Count shown in the "N online" badge; the local user is not part of the roster.
    pub fn online_count(&self, include_local: bool) -> usize {
        self.entries.len() + usize::from(include_local)
    }

    pub fn in_room<'a>(&'a self, room: &'a str) -> impl Iterator<Item = (&'a UserId, &'a Presence)> + 'a {
        self.entries.iter().filter(move |(_, presence)| presence.room == room)
    }

    pub fn insert(&mut self, user: UserId, presence: Presence) {
        self.entries.insert(user, presence);
        self.bump();
    }

    /// Applies a transport event. Returns whether the roster changed; updates for users that
    /// never joined are ignored.
    pub fn apply(&mut self, event: RosterEvent) -> bool {
        let position = match &event {
            RosterEvent::Joined { presence, .. } => Some(presence.position),
            RosterEvent::PositionUpdated { position, .. } => Some(*position),
            _ => None,
        };
        if position.is_some_and(|position| !position.is_finite()) {
            log::warn!("[roster] dropping {event}: non-finite position");
            return false;
        }
        let changed = match event {
            RosterEvent::Joined { user, presence } => {
                let previous = self.entries.insert(user, presence.clone());
                previous.as_ref() != Some(&presence)
            }
            RosterEvent::Left { user } => self.entries.remove(&user).is_some(),
            RosterEvent::PositionUpdated { user, position } => {
                self.update(&user, |presence| std::mem::replace(&mut presence.position, position) != position)
            }
            RosterEvent::StatusUpdated { user, status } => {
                self.update(&user, |presence| std::mem::replace(&mut presence.status, status) != status)
            }
            RosterEvent::RoomChanged { user, room } => self.update(&user, |presence| {
                if presence.room == room {
                    false
                } else {
                    presence.room = room;
                    true
                }
            }),
        };
        if changed {
            self.bump();
        }
        changed
    }

    fn update(&mut self, user: &UserId, f: impl FnOnce(&mut Presence) -> bool) -> bool {
        match self.entries.get_mut(user) {
            Some(presence) => f(presence),
            None => {
                log::debug!("[roster] ignoring update for unknown user {user}");
                false
            }
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> (UserId, Presence) {
        (UserId::new("alice"), Presence::from_tag("Alice", "#EF4444", Vec3::new(2.0, 0.0, 2.0)))
    }

    #[test]
    fn join_move_leave_bumps_revision() {
        let mut roster = AvatarRoster::new();
        let (user, presence) = alice();
        assert!(roster.apply(RosterEvent::Joined { user: user.clone(), presence }));
        assert_eq!(roster.revision(), 1);
        assert!(roster.apply(RosterEvent::PositionUpdated { user: user.clone(), position: Vec3::ONE }));
        assert_eq!(roster.get(&user).map(|p| p.position), Some(Vec3::ONE));
        assert!(!roster.apply(RosterEvent::PositionUpdated { user: user.clone(), position: Vec3::ONE }));
        assert_eq!(roster.revision(), 2);
        assert!(roster.apply(RosterEvent::Left { user }));
        assert_eq!(roster.connection_count(), 0);
        assert_eq!(roster.online_count(true), 1);
    }

    #[test]
    fn updates_for_unknown_users_are_ignored() {
        let mut roster = AvatarRoster::new();
        let ghost = UserId::new("ghost");
        assert!(!roster.apply(RosterEvent::StatusUpdated { user: ghost.clone(), status: PresenceStatus::Away }));
        assert!(!roster.apply(RosterEvent::Left { user: ghost }));
        assert_eq!(roster.revision(), 0);
    }

    #[test]
    fn non_finite_positions_are_rejected() {
        let mut roster = AvatarRoster::new();
        let (user, mut presence) = alice();
        presence.position = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(!roster.apply(RosterEvent::Joined { user: user.clone(), presence }));
        assert!(roster.get(&user).is_none());

        let (user, presence) = alice();
        roster.apply(RosterEvent::Joined { user: user.clone(), presence });
        let revision = roster.revision();
        for _ in 0..2 {
            assert!(!roster.apply(RosterEvent::PositionUpdated { user: user.clone(), position: Vec3::NAN }));
            assert!(!roster.apply(RosterEvent::PositionUpdated { user: user.clone(), position: Vec3::INFINITY }));
        }
        assert_eq!(roster.revision(), revision);
        assert_eq!(roster.get(&user).map(|p| p.position), Some(Vec3::new(2.0, 0.0, 2.0)));
    }

    #[test]
    fn room_changes_filter_room_members() {
        let mut roster = AvatarRoster::new();
        let (user, presence) = alice();
        roster.insert(user.clone(), presence);
        roster.apply(RosterEvent::RoomChanged { user: user.clone(), room: "meeting_room_1".to_string() });
        assert_eq!(roster.in_room(MAIN_ROOM).count(), 0);
        assert_eq!(roster.in_room("meeting_room_1").count(), 1);
    }

    #[test]
    fn malformed_colour_tag_falls_back() {
        let presence = Presence::from_tag("Bob", "green", Vec3::ZERO);
        assert_eq!(presence.color, crate::compose::default_avatar_color());
        assert_eq!(PresenceStatus::from_label("CODING"), PresenceStatus::Coding);
        assert_eq!(PresenceStatus::from_label("busy"), PresenceStatus::Available);
    }
}
