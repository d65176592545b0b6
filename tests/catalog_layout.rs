use glam::Vec3;
use metaworkspace::catalog::{ring_layout, EntityCatalog, EntityKind, EntityTemplate};
use metaworkspace::WorkspaceError;
use proptest::prelude::*;
use std::f32::consts::TAU;

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

#[test]
fn ring_of_four_faces_the_center() {
    let ring = ring_layout("hub", Vec3::ZERO, 4, 3.0).expect("valid ring");
    let expected = [Vec3::new(0.0, 0.0, 3.0), Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -3.0), Vec3::new(-3.0, 0.0, 0.0)];
    for (template, want) in ring.iter().zip(expected) {
        let pos: Vec3 = template.position.into();
        assert!((pos - want).length() < 1e-5, "{} at {pos:?}, expected {want:?}", template.id);
        // Monitor sits at local -Z; after the yaw it must point back at the hub.
        let facing = glam::Quat::from_rotation_y(template.rotation.y) * Vec3::NEG_Z;
        assert!(facing.dot(-pos.normalize()) > 0.999);
    }
}

#[test]
fn invalid_rings_are_rejected() {
    assert!(matches!(ring_layout("r", Vec3::ZERO, 0, 3.0), Err(WorkspaceError::InvalidLayout(_))));
    assert!(matches!(ring_layout("r", Vec3::ZERO, 4, 0.0), Err(WorkspaceError::InvalidLayout(_))));
    assert!(matches!(ring_layout("r", Vec3::ZERO, 4, f32::NAN), Err(WorkspaceError::InvalidLayout(_))));
}

#[test]
fn duplicate_ids_leave_catalog_untouched() {
    let mut catalog = EntityCatalog::default_workspace();
    let revision = catalog.revision();
    let len = catalog.len();
    let err = catalog.add_ring("hub", Vec3::new(20.0, 0.0, 0.0), 2, 1.0).unwrap_err();
    assert_eq!(err, WorkspaceError::DuplicateEntityId("hub-0".to_string()));
    assert_eq!(catalog.len(), len);
    assert_eq!(catalog.revision(), revision);

    catalog.add_row("bench", Vec3::new(-4.0, 0.0, 6.0), 3, 2.0, 0.0).expect("row");
    assert_eq!(catalog.len(), len + 3);
    assert!(catalog.revision() > revision);
}

#[test]
fn catalog_round_trips_through_json() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("layouts").join("office.json");
    let catalog = EntityCatalog::default_workspace();
    catalog.save_to_path(&path).expect("save catalog");

    let loaded = EntityCatalog::load_from_path(&path).expect("load catalog");
    assert_eq!(loaded.entities(), catalog.entities());
    let room = loaded.get("meeting-room-1").expect("room");
    assert!(matches!(room.kind, EntityKind::MeetingRoom { chairs_per_side: 4, .. }));
}

#[test]
fn loading_rejects_duplicate_ids() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("dupes.json");
    let json = r#"{ "entities": [
        { "id": "a", "kind": "workstation", "position": { "x": 0.0, "y": 0.0, "z": 0.0 } },
        { "id": "a", "kind": "workstation", "position": { "x": 1.0, "y": 0.0, "z": 0.0 } }
    ] }"#;
    std::fs::write(&path, json).expect("write");
    let err = EntityCatalog::load_from_path(&path).unwrap_err();
    assert!(format!("{err:#}").contains("already placed"), "{err:#}");
}

#[test]
fn zero_chair_rooms_are_invalid() {
    let mut catalog = EntityCatalog::new();
    let room = EntityTemplate::new(
        "room",
        EntityKind::MeetingRoom { label: "Huddle".to_string(), chairs_per_side: 0 },
        Vec3::ZERO,
    );
    assert!(matches!(catalog.push(room), Err(WorkspaceError::InvalidLayout(_))));
}

proptest! {
    #[test]
    fn ring_places_k_desks_at_radius(count in 1u32..64, radius in 0.1f32..500.0, cx in -100.0f32..100.0, cz in -100.0f32..100.0) {
        let center = Vec3::new(cx, 0.0, cz);
        let ring = ring_layout("p", center, count, radius).expect("valid ring");
        prop_assert_eq!(ring.len(), count as usize);
        let step = TAU / count as f32;
        for (i, template) in ring.iter().enumerate() {
            let pos: Vec3 = template.position.into();
            let eps = 1e-3 * radius.max(1.0);
            prop_assert!(approx((pos - center).length(), radius, eps));
            prop_assert!(approx(template.rotation.y, i as f32 * step, 1e-4));
            prop_assert_eq!(template.id.as_str(), format!("p-{i}"));
        }
    }
}
