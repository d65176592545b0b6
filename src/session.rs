//! Single-threaded composition root. The session owns every piece of mutable state and
//! applies [`WorkspaceEvent`]s in arrival order; the rendering backend reads the cached
//! frame and the camera snapshot after each pump.

use crate::camera3d::{Camera3D, CameraController, CameraState};
use crate::catalog::EntityCatalog;
use crate::compose::{compose, LocalAvatar, SceneInputs, ScenePrimitives};
use crate::config::AppConfig;
use crate::events::{EventBus, WorkspaceEvent};
use crate::input::Input;
use crate::meeting::MeetingControls;
use crate::panels::{Panel, PanelCoordinator, PanelVisibility};
use crate::roster::{AvatarRoster, UserId};
use crate::store::AvatarStore;
use crate::tree::TreeModel;
use crate::vcs::SourceSnapshot;
use anyhow::{Context, Result};
use glam::Vec3;
use std::sync::Arc;

/// Identity of the user running this session.
#[derive(Debug, Clone)]
pub struct LocalUser {
    pub id: UserId,
    pub display_name: String,
    pub position: Vec3,
}

impl LocalUser {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self { id: UserId::new(id), display_name: display_name.into(), position: Vec3::ZERO }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameKey {
    catalog: u64,
    roster: u64,
    committed: u64,
    local: u64,
}

pub struct WorkspaceSession<S: AvatarStore> {
    local: LocalUser,
    local_revision: u64,
    catalog: EntityCatalog,
    roster: AvatarRoster,
    panels: PanelCoordinator,
    tree: TreeModel,
    snapshot: SourceSnapshot,
    camera: CameraController,
    fov_y_radians: f32,
    input: Input,
    meeting: MeetingControls,
    store: S,
    bus: EventBus,
    frame: Option<(FrameKey, Arc<ScenePrimitives>)>,
    compositions: u64,
}

impl<S: AvatarStore> WorkspaceSession<S> {
    /// Loads the committed avatar from `store`. A first-time user gets the default avatar
    /// with the customizer already open.
    pub fn start(
        config: &AppConfig,
        catalog: EntityCatalog,
        snapshot: SourceSnapshot,
        mut store: S,
        local: LocalUser,
    ) -> Result<Self> {
        let stored = store.load().context("Loading committed avatar")?;
        let onboarding = stored.is_none();
        let mut panels = PanelCoordinator::new(stored.unwrap_or_default());
        if onboarding {
            log::info!("[session] no stored avatar for {}; opening customizer", local.id);
            panels.open(Panel::AvatarCustomizer);
        }
        let tree = TreeModel::from_config(snapshot.tree().context("Validating source snapshot tree")?, &config.tree);
        log::info!(
            "[session] started for {} with {} catalog entities",
            local.id,
            catalog.len()
        );
        Ok(Self {
            local,
            local_revision: 0,
            catalog,
            roster: AvatarRoster::new(),
            panels,
            tree,
            snapshot,
            camera: CameraController::from_config(&config.camera),
            fov_y_radians: config.camera.fov_degrees.to_radians(),
            input: Input::new(),
            meeting: MeetingControls::default(),
            store,
            bus: EventBus::default(),
            frame: None,
            compositions: 0,
        })
    }

    pub fn push(&mut self, event: WorkspaceEvent) {
        self.bus.push(event);
    }

    /// Applies queued events until the queue is empty and returns how many were handled.
    /// Only persistence failures abort the pump; rejected domain requests are logged.
    /// Events queued behind a failed save stay on the bus for the next pump.
    pub fn pump(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Some(event) = self.bus.pop() {
            log::debug!("[session] {event}");
            if let Err(err) = self.handle(event) {
                log::warn!("[session] pump stopped with {} events still queued", self.bus.len());
                return Err(err);
            }
            handled += 1;
        }
        Ok(handled)
    }

    /// Events waiting for the next [`Self::pump`].
    pub fn pending(&self) -> usize {
        self.bus.len()
    }

    fn handle(&mut self, event: WorkspaceEvent) -> Result<()> {
        match event {
            WorkspaceEvent::Input(input) => {
                if let Some(gesture) = self.input.push(input) {
                    self.camera.apply(gesture);
                }
            }
            WorkspaceEvent::OpenPanel(panel) => self.panels.open(panel),
            WorkspaceEvent::ClosePanel(panel) => self.panels.close(panel),
            WorkspaceEvent::TogglePanel(panel) => self.panels.toggle(panel),
            WorkspaceEvent::EditDraft(edit) => {
                if let Err(err) = self.panels.update_draft(edit) {
                    log::warn!("[session] ignoring draft edit {edit}: {err}");
                }
            }
            WorkspaceEvent::ToggleAccessory(accessory) => {
                if let Err(err) = self.panels.toggle_accessory(accessory) {
                    log::warn!("[session] ignoring accessory toggle {}: {err}", accessory.label());
                }
            }
            WorkspaceEvent::SaveDraft => match self.panels.save_draft() {
                Ok(committed) => {
                    self.store.save(committed).context("Persisting committed avatar")?;
                }
                Err(err) => log::warn!("[session] save ignored: {err}"),
            },
            WorkspaceEvent::ToggleFolder(folder) => {
                self.tree.toggle(&folder);
            }
            WorkspaceEvent::ResetTreeExpansion => self.tree.reset_expansion(),
            WorkspaceEvent::Meeting(control) => {
                self.meeting.toggle(control);
            }
            WorkspaceEvent::MoveLocalAvatar(position) => {
                if position.is_finite() && position != self.local.position {
                    self.local.position = position;
                    self.local_revision = self.local_revision.wrapping_add(1);
                }
            }
            WorkspaceEvent::Roster(event) => {
                self.roster.apply(event);
            }
        }
        Ok(())
    }

    /// Current frame. Recomposed only when the catalog, the roster, the committed avatar or
    /// the local position changed since the last call.
    pub fn frame(&mut self) -> Arc<ScenePrimitives> {
        let key = FrameKey {
            catalog: self.catalog.revision(),
            roster: self.roster.revision(),
            committed: self.panels.committed_revision(),
            local: self.local_revision,
        };
        if let Some((cached_key, frame)) = &self.frame {
            if *cached_key == key {
                return Arc::clone(frame);
            }
        }
        let frame = Arc::new(compose(&SceneInputs {
            catalog: &self.catalog,
            roster: &self.roster,
            local: Some(LocalAvatar {
                user: &self.local.id,
                display_name: &self.local.display_name,
                position: self.local.position,
                config: self.panels.committed(),
            }),
        }));
        self.compositions += 1;
        self.frame = Some((key, Arc::clone(&frame)));
        frame
    }

    /// Number of times [`Self::frame`] had to recompose.
    pub fn compositions(&self) -> u64 {
        self.compositions
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn camera_state(&self) -> CameraState {
        self.camera.state()
    }

    pub fn render_camera(&self) -> Camera3D {
        self.camera.to_camera(self.fov_y_radians, 0.1, 1000.0)
    }

    pub fn visibility(&self) -> PanelVisibility {
        self.panels.visibility()
    }

    pub fn panels(&self) -> &PanelCoordinator {
        &self.panels
    }

    pub fn tree(&self) -> &TreeModel {
        &self.tree
    }

    pub fn snapshot(&self) -> &SourceSnapshot {
        &self.snapshot
    }

    pub fn roster(&self) -> &AvatarRoster {
        &self.roster
    }

    pub fn meeting(&self) -> &MeetingControls {
        &self.meeting
    }

    pub fn catalog(&self) -> &EntityCatalog {
        &self.catalog
    }

    /// Catalog edits and wholesale replacement both change the catalog revision, which
    /// invalidates the cached frame.
    pub fn catalog_mut(&mut self) -> &mut EntityCatalog {
        &mut self.catalog
    }

    pub fn local_user(&self) -> &LocalUser {
        &self.local
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
