//! Overlay visibility and the avatar draft/committed state machine.
//!
//! The two full-screen overlays share one tagged slot so they can never both be open;
//! the code panel is an independent flag. Avatar configuration lives in two slots: the
//! committed value the scene renders and an optional draft owned by the customizer.

use crate::avatar::{Accessory, AvatarConfig, DraftEdit};
use crate::error::WorkspaceError;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    AvatarCustomizer,
    CodePanel,
    MeetingRoom,
}

impl Panel {
    pub const ALL: [Panel; 3] = [Panel::AvatarCustomizer, Panel::CodePanel, Panel::MeetingRoom];

    pub fn label(self) -> &'static str {
        match self {
            Panel::AvatarCustomizer => "avatar_customizer",
            Panel::CodePanel => "code_panel",
            Panel::MeetingRoom => "meeting_room",
        }
    }

    pub fn is_exclusive(self) -> bool {
        !matches!(self, Panel::CodePanel)
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExclusiveOverlay {
    #[default]
    None,
    AvatarCustomizer,
    MeetingRoom,
}

/// Flat view of which panels are showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelVisibility {
    pub avatar_customizer: bool,
    pub code_panel: bool,
    pub meeting_room: bool,
}

impl PanelVisibility {
    pub fn is_open(&self, panel: Panel) -> bool {
        match panel {
            Panel::AvatarCustomizer => self.avatar_customizer,
            Panel::CodePanel => self.code_panel,
            Panel::MeetingRoom => self.meeting_room,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct AvatarSlots {
    committed: AvatarConfig,
    draft: Option<AvatarConfig>,
    committed_revision: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PanelCoordinator {
    overlay: ExclusiveOverlay,
    code_panel_open: bool,
    avatar: AvatarSlots,
}

impl PanelCoordinator {
    pub fn new(committed: AvatarConfig) -> Self {
        Self { avatar: AvatarSlots { committed, draft: None, committed_revision: 0 }, ..Self::default() }
    }

    pub fn overlay(&self) -> ExclusiveOverlay {
        self.overlay
    }

    pub fn visibility(&self) -> PanelVisibility {
        PanelVisibility {
            avatar_customizer: self.overlay == ExclusiveOverlay::AvatarCustomizer,
            code_panel: self.code_panel_open,
            meeting_room: self.overlay == ExclusiveOverlay::MeetingRoom,
        }
    }

    pub fn is_open(&self, panel: Panel) -> bool {
        self.visibility().is_open(panel)
    }

    pub fn open(&mut self, panel: Panel) {
        match panel {
            Panel::CodePanel => self.code_panel_open = true,
            Panel::AvatarCustomizer => {
                self.overlay = ExclusiveOverlay::AvatarCustomizer;
                if self.avatar.draft.is_none() {
                    self.avatar.draft = Some(self.avatar.committed.clone());
                }
            }
            Panel::MeetingRoom => {
                if self.overlay == ExclusiveOverlay::AvatarCustomizer {
                    self.discard_draft();
                }
                self.overlay = ExclusiveOverlay::MeetingRoom;
            }
        }
    }

    /// Safe to call at any time; closing a closed panel does nothing.
    pub fn close(&mut self, panel: Panel) {
        match panel {
            Panel::CodePanel => self.code_panel_open = false,
            Panel::AvatarCustomizer => {
                if self.overlay == ExclusiveOverlay::AvatarCustomizer {
                    self.overlay = ExclusiveOverlay::None;
                }
                self.discard_draft();
            }
            Panel::MeetingRoom => {
                if self.overlay == ExclusiveOverlay::MeetingRoom {
                    self.overlay = ExclusiveOverlay::None;
                }
            }
        }
    }

    pub fn toggle(&mut self, panel: Panel) {
        if self.is_open(panel) {
            self.close(panel);
        } else {
            self.open(panel);
        }
    }

    pub fn close_all(&mut self) {
        for panel in Panel::ALL {
            self.close(panel);
        }
    }

    pub fn committed(&self) -> &AvatarConfig {
        &self.avatar.committed
    }

    /// Incremented by every successful save.
    pub fn committed_revision(&self) -> u64 {
        self.avatar.committed_revision
    }

    pub fn draft(&self) -> Option<&AvatarConfig> {
        self.avatar.draft.as_ref()
    }

    pub fn update_draft(&mut self, edit: DraftEdit) -> Result<(), WorkspaceError> {
        let draft = self.avatar.draft.as_mut().ok_or(WorkspaceError::NoActiveDraft)?;
        draft.apply(edit);
        Ok(())
    }

    /// Returns whether the accessory is worn after the toggle.
    pub fn toggle_accessory(&mut self, accessory: Accessory) -> Result<bool, WorkspaceError> {
        let draft = self.avatar.draft.as_mut().ok_or(WorkspaceError::NoActiveDraft)?;
        Ok(draft.toggle_accessory(accessory))
    }

    /// Swaps the draft in as the committed value and closes the customizer. The returned
    /// value is what the persistence collaborator should store.
    pub fn save_draft(&mut self) -> Result<&AvatarConfig, WorkspaceError> {
        let draft = self.avatar.draft.take().ok_or(WorkspaceError::NoActiveDraft)?;
        self.avatar.committed = draft;
        self.avatar.committed_revision = self.avatar.committed_revision.wrapping_add(1);
        if self.overlay == ExclusiveOverlay::AvatarCustomizer {
            self.overlay = ExclusiveOverlay::None;
        }
        Ok(&self.avatar.committed)
    }

    fn discard_draft(&mut self) {
        if self.avatar.draft.take().is_some() {
            log::debug!("[panels] avatar draft discarded");
        }
    }
}
