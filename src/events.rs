use crate::avatar::{Accessory, DraftEdit};
use crate::input::InputEvent;
use crate::meeting::MeetingControl;
use crate::panels::Panel;
use crate::roster::RosterEvent;
use glam::Vec3;
use std::collections::VecDeque;
use std::fmt;

/// Everything that can mutate a [`crate::session::WorkspaceSession`].
#[derive(Debug, Clone, PartialEq)]
pub enum WorkspaceEvent {
    Input(InputEvent),
    OpenPanel(Panel),
    ClosePanel(Panel),
    TogglePanel(Panel),
    EditDraft(DraftEdit),
    ToggleAccessory(Accessory),
    SaveDraft,
    ToggleFolder(String),
    ResetTreeExpansion,
    Meeting(MeetingControl),
    MoveLocalAvatar(Vec3),
    Roster(RosterEvent),
}

impl fmt::Display for WorkspaceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkspaceEvent::Input(event) => write!(f, "Input {event}"),
            WorkspaceEvent::OpenPanel(panel) => write!(f, "OpenPanel {panel}"),
            WorkspaceEvent::ClosePanel(panel) => write!(f, "ClosePanel {panel}"),
            WorkspaceEvent::TogglePanel(panel) => write!(f, "TogglePanel {panel}"),
            WorkspaceEvent::EditDraft(edit) => write!(f, "EditDraft {edit}"),
            WorkspaceEvent::ToggleAccessory(accessory) => write!(f, "ToggleAccessory {}", accessory.label()),
            WorkspaceEvent::SaveDraft => f.write_str("SaveDraft"),
            WorkspaceEvent::ToggleFolder(folder) => write!(f, "ToggleFolder {folder}"),
            WorkspaceEvent::ResetTreeExpansion => f.write_str("ResetTreeExpansion"),
            WorkspaceEvent::Meeting(control) => write!(f, "Meeting toggle={control}"),
            WorkspaceEvent::MoveLocalAvatar(position) => {
                write!(f, "MoveLocalAvatar pos=({:.2}, {:.2}, {:.2})", position.x, position.y, position.z)
            }
            WorkspaceEvent::Roster(event) => write!(f, "Roster {event}"),
        }
    }
}

/// FIFO queue consumed by the session's event loop one event at a time, so anything not
/// yet handled stays queued if handling stops early.
#[derive(Debug, Default)]
pub struct EventBus {
    events: VecDeque<WorkspaceEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: WorkspaceEvent) {
        self.events.push_back(event);
    }

    pub fn pop(&mut self) -> Option<WorkspaceEvent> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<WorkspaceEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_arrival_order() {
        let mut bus = EventBus::default();
        bus.push(WorkspaceEvent::OpenPanel(Panel::AvatarCustomizer));
        bus.push(WorkspaceEvent::SaveDraft);
        assert_eq!(bus.len(), 2);
        let drained = bus.drain();
        assert_eq!(drained, vec![WorkspaceEvent::OpenPanel(Panel::AvatarCustomizer), WorkspaceEvent::SaveDraft]);
        assert!(bus.is_empty());
    }

    #[test]
    fn pop_takes_the_oldest_event_and_leaves_the_rest() {
        let mut bus = EventBus::default();
        bus.push(WorkspaceEvent::SaveDraft);
        bus.push(WorkspaceEvent::ResetTreeExpansion);
        assert_eq!(bus.pop(), Some(WorkspaceEvent::SaveDraft));
        assert_eq!(bus.len(), 1);
        assert_eq!(bus.pop(), Some(WorkspaceEvent::ResetTreeExpansion));
        assert_eq!(bus.pop(), None);
    }

    #[test]
    fn display_names_the_panel() {
        assert_eq!(WorkspaceEvent::TogglePanel(Panel::CodePanel).to_string(), "TogglePanel code_panel");
    }
}
