use anyhow::Result;
use glam::Vec3;
use metaworkspace::catalog::EntityCatalog;
use metaworkspace::cli::CliOverrides;
use metaworkspace::config::AppConfig;
use metaworkspace::events::WorkspaceEvent;
use metaworkspace::roster::{Presence, RosterEvent, UserId};
use metaworkspace::store::{AvatarStore, JsonAvatarStore, MemoryAvatarStore};
use metaworkspace::vcs::SourceSnapshot;
use metaworkspace::{LocalUser, WorkspaceSession};

const SAMPLE_PEERS: [(&str, &str, &str, [f32; 3]); 4] = [
    ("alice", "Alice", "#EF4444", [2.0, 0.0, 2.0]),
    ("bob", "Bob", "#10B981", [-2.0, 0.0, 1.0]),
    ("charlie", "Charlie", "#F59E0B", [1.0, 0.0, -2.0]),
    ("diana", "Diana", "#8B5CF6", [-1.0, 0.0, -1.0]),
];

fn main() {
    env_logger::init();
    let cli = match CliOverrides::parse_from_env() {
        Ok(parsed) => parsed,
        Err(err) => {
            eprintln!("[cli] {err}");
            std::process::exit(2);
        }
    };
    if let Err(err) = run(cli) {
        eprintln!("Application error: {err:?}");
        std::process::exit(1);
    }
}

fn run(cli: CliOverrides) -> Result<()> {
    let mut config = AppConfig::load_or_default(cli.config_path());
    let user = cli.user().unwrap_or("you").to_string();
    let overrides = cli.into_config_overrides();
    if !overrides.is_empty() {
        log::info!("[cli] overriding {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }

    let catalog = match config.catalog_path.as_deref() {
        Some(path) => EntityCatalog::load_from_path(path)?,
        None => EntityCatalog::default_workspace(),
    };
    let snapshot = match config.snapshot_path.as_deref() {
        Some(path) => SourceSnapshot::load_from_path(path)?,
        None => SourceSnapshot::sample(),
    };
    let store: Box<dyn AvatarStore> = match config.avatar_store_path.as_deref() {
        Some(path) => Box::new(JsonAvatarStore::new(path)),
        None => Box::new(MemoryAvatarStore::new()),
    };

    let mut session = WorkspaceSession::start(&config, catalog, snapshot, store, LocalUser::new(user.clone(), user))?;
    for (id, name, color, position) in SAMPLE_PEERS {
        session.push(WorkspaceEvent::Roster(RosterEvent::Joined {
            user: UserId::new(id),
            presence: Presence::from_tag(name, color, Vec3::from_array(position)),
        }));
    }
    if session.visibility().avatar_customizer {
        // Headless run: accept the onboarding draft as-is.
        session.push(WorkspaceEvent::SaveDraft);
    }
    session.pump()?;

    let frame = session.frame();
    let camera = session.camera();
    println!(
        "Workspace: {} groups, {} primitives, digest {}",
        frame.groups().len(),
        frame.primitives().len(),
        frame.digest()
    );
    println!(
        "Camera: position {:.2?} distance {:.2} ({} online)",
        camera.position().to_array(),
        camera.distance(),
        session.roster().online_count(true)
    );
    let dirty = session.tree().dirty_files();
    println!("Code panel: {} visible rows, {} modified files", session.tree().visible_nodes().count(), dirty.len());
    Ok(())
}
