//! Integration tests for livecad-viewer
//!
//! These tests drive the viewer through complete snapshot sequences and
//! check the properties that must hold across repeated updates.

use approx::assert_relative_eq;
use livecad_core::{
    Error, Part, PartMesh, PartTransform, PartsChanged, ViewerConfig, ViewerEvent,
    VisibilityState,
};
use livecad_scene::AllocationId;
use livecad_viewer::*;

/// Parametric bookshelf: two sides, a back and `shelves` evenly spaced boards
fn bookshelf(shelves: usize, height: f32) -> Vec<Part> {
    let mut parts = vec![
        Part::new("side-l", "Left Side", PartMesh::cuboid([-0.5, height / 2.0, 0.0], [0.02, height, 0.3]))
            .with_color("orange"),
        Part::new("side-r", "Right Side", PartMesh::cuboid([0.5, height / 2.0, 0.0], [0.02, height, 0.3]))
            .with_color("orange"),
        Part::new("back", "Back", PartMesh::cuboid([0.0, height / 2.0, -0.15], [1.0, height, 0.01]))
            .with_color("gray")
            .with_opacity(0.5),
    ];
    for i in 1..=shelves {
        let y = height * i as f32 / (shelves + 1) as f32;
        let mesh = PartMesh::cuboid([0.0, 0.0, 0.0], [0.98, 0.02, 0.28]);
        let edges = mesh.vertices.clone().unwrap_or_default()[..6].to_vec();
        parts.push(
            Part::new(format!("shelf-{i}"), format!("Shelf {i}"), mesh.with_edges(edges))
                .with_transform(PartTransform::at([0.0, y, 0.0])),
        );
    }
    parts
}

fn box_part(name: &str, size: f32) -> Part {
    Part::named(name, PartMesh::cuboid([0.0; 3], [size; 3]))
}

fn ready_viewer(parts: &[Part]) -> LiveViewer {
    let mut viewer = LiveViewer::new(ViewerConfig::default()).unwrap();
    viewer.render(parts).unwrap();
    viewer
}

fn position_allocation(viewer: &LiveViewer, id: &str) -> AllocationId {
    let handle = viewer.registry().get(id).unwrap();
    viewer
        .scene()
        .node(handle.node())
        .unwrap()
        .mesh
        .as_ref()
        .unwrap()
        .positions()
        .allocation()
}

#[test]
fn test_identity_stability_across_syncs() {
    let mut viewer = ready_viewer(&bookshelf(4, 1.8));
    let before: Vec<_> = viewer.registry().handles().map(|h| h.node()).collect();

    for height in [1.9, 2.0, 2.1] {
        let report = viewer.sync(&bookshelf(4, height)).unwrap();
        assert_eq!(report.added, 0);
        assert_eq!(report.removed, 0);
    }

    let after: Vec<_> = viewer.registry().handles().map(|h| h.node()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_diff_correctness() {
    let mut viewer = ready_viewer(&bookshelf(3, 1.8));
    let report = viewer.sync(&bookshelf(5, 1.8)).unwrap();
    assert_eq!(report, SyncReport { added: 2, updated: 6, removed: 0, relabeled: 0 });

    let report = viewer.sync(&bookshelf(2, 1.8)).unwrap();
    assert_eq!(report, SyncReport { added: 0, updated: 5, removed: 3, relabeled: 0 });

    let keys: Vec<_> = viewer.registry().keys().collect();
    assert_eq!(keys, vec!["side-l", "side-r", "back", "shelf-1", "shelf-2"]);
    assert_eq!(viewer.scene().part_keys(viewer.scene().root()).len(), 5);
}

#[test]
fn test_buffer_reuse_law() {
    let mut viewer = ready_viewer(&[box_part("A", 1.0)]);
    let original = position_allocation(&viewer, "A");

    viewer.sync(&[box_part("A", 2.0)]).unwrap();
    assert_eq!(position_allocation(&viewer, "A"), original);

    let triangle = Part::named(
        "A",
        PartMesh::new(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0], vec![], vec![0, 1, 2]),
    );
    viewer.sync(&[triangle]).unwrap();
    assert_ne!(position_allocation(&viewer, "A"), original);

    let handle = viewer.registry().get("A").unwrap();
    let mesh = viewer.scene().node(handle.node()).unwrap().mesh.as_ref().unwrap();
    assert_relative_eq!(mesh.bounding_box().unwrap().max.y, 1.0);
}

#[test]
fn test_visibility_persists_shelf_6() {
    let mut viewer = ready_viewer(&bookshelf(6, 1.8));
    viewer.set_shape_visible("shelf-6", false).unwrap();
    viewer.set_edges_visible("back", false).unwrap();

    // Shelf 6 disappears, then comes back with a new height.
    viewer.sync(&bookshelf(5, 1.8)).unwrap();
    assert!(!viewer.registry().contains("shelf-6"));
    let report = viewer.sync(&bookshelf(6, 2.0)).unwrap();
    assert_eq!(report.added, 1);

    let handle = viewer.registry().get("shelf-6").unwrap();
    let node = viewer.scene().node(handle.node()).unwrap();
    assert!(!node.visible);
    assert!(node.edges_visible);

    let map = viewer.tree().unwrap().state_map();
    assert_eq!(map["Shelf 6"], VisibilityState::new(false, true));
    assert_eq!(map["Back"], VisibilityState::new(true, false));
    assert_eq!(map["Shelf 1"], VisibilityState::VISIBLE);
}

#[test]
fn test_camera_non_interference() {
    let mut viewer = ready_viewer(&bookshelf(3, 1.8));
    viewer.camera_mut().position.x += 3.0;
    let camera = viewer.camera().clone();

    viewer.sync(&bookshelf(8, 3.0)).unwrap();
    viewer.sync(&[box_part("Other", 10.0)]).unwrap();
    viewer.render(&bookshelf(1, 1.0)).unwrap();

    assert_eq!(viewer.camera(), &camera);
}

#[test]
fn test_first_render_frames_assembly() {
    let viewer = ready_viewer(&[Part::named("Far", PartMesh::cuboid([100.0, 0.0, 0.0], [2.0; 3]))]);
    assert_relative_eq!(viewer.camera().target.x, 100.0, epsilon = 1e-3);
}

#[test]
fn test_zero_part_rejection() {
    let mut viewer = LiveViewer::new(ViewerConfig::default()).unwrap();
    let err = viewer.render(&[]).unwrap_err();
    assert!(matches!(err, Error::EmptyAssembly));
    assert!(err.is_fatal_precondition());
    assert_eq!(viewer.state(), ViewerState::Uninitialized);

    // The viewer is still usable afterwards.
    viewer.render(&[box_part("A", 1.0)]).unwrap();
    assert!(viewer.is_ready());
}

#[test]
fn test_end_to_end_ab_to_ac() {
    let mut viewer = ready_viewer(&[box_part("A", 1.0), box_part("B", 1.0)]);
    let a_node = viewer.registry().get("A").unwrap().node();
    let b_node = viewer.registry().get("B").unwrap().node();
    let builds = viewer.tree_builds();

    let report = viewer.sync(&[box_part("A", 1.5), box_part("C", 1.0)]).unwrap();

    assert_eq!(report, SyncReport { added: 1, updated: 1, removed: 1, relabeled: 0 });
    assert_eq!(viewer.registry().get("A").unwrap().node(), a_node);
    assert!(viewer.registry().get("B").is_none());
    assert!(!viewer.scene().contains(b_node));
    let a_mesh = viewer.scene().node(a_node).unwrap().mesh.as_ref().unwrap();
    assert_relative_eq!(a_mesh.bounding_box().unwrap().max.x, 0.75);
    assert_eq!(viewer.tree_builds(), builds + 1);
    assert_eq!(viewer.to_string(), "Viewer(2 parts)");
    assert_eq!(viewer.scene().materials().len(), 1);
}

#[test]
fn test_drift_recovery() {
    let mut viewer = ready_viewer(&[box_part("A", 1.0)]);

    // A node attached behind the registry's back.
    PartHandle::create(viewer.scene_mut(), &box_part("Ghost", 1.0), "#888888").unwrap();
    let report = viewer.sync(&[box_part("A", 1.0)]).unwrap();
    assert_eq!(report.removed, 1);
    assert_eq!(viewer.scene().part_keys(viewer.scene().root()), vec!["A"]);

    // An untracked node that is still wanted gets adopted, not duplicated.
    PartHandle::create(viewer.scene_mut(), &box_part("B", 1.0), "#888888").unwrap();
    let report = viewer.sync(&[box_part("A", 1.0), box_part("B", 2.0)]).unwrap();
    assert_eq!(report, SyncReport { added: 0, updated: 2, removed: 0, relabeled: 0 });
    assert_eq!(viewer.scene().part_keys(viewer.scene().root()).len(), 2);
}

#[test]
fn test_skipped_part_does_not_abort_sync() {
    let mut viewer = ready_viewer(&[box_part("A", 1.0)]);
    let report = viewer
        .sync(&[box_part("A", 1.0), Part::named("No Mesh", PartMesh::default())])
        .unwrap();
    assert_eq!(report.added, 0);
    assert_eq!(viewer.part_count(), 1);
}

#[test]
fn test_widget_handshake_end_to_end() {
    let mut host = HostChannel::new();
    let mut session = ViewerSession::new(ViewerConfig::default()).unwrap();

    // The host publishes before the viewer has been laid out.
    assert!(host.set_parts(PartsChanged::new("shelf", bookshelf(2, 1.0))).is_none());
    assert!(host.set_parts(PartsChanged::new("shelf", bookshelf(3, 1.0))).is_none());

    assert_eq!(session.on_layout(0).unwrap(), None);
    let ready = session.on_layout(900).unwrap().unwrap();
    let delivered = host.on_message(&ready.to_json().unwrap()).unwrap().unwrap();
    assert_eq!(delivered.parts.len(), 6);

    session.on_parts_changed(delivered).unwrap();
    assert_eq!(session.viewer().part_count(), 6);

    // A second ready is ignored by the host.
    assert!(host.on_event(ViewerEvent::Ready).is_none());

    let event = session.viewer_mut().select("shelf-2").unwrap();
    host.on_event(event);
    assert_eq!(host.selected(), Some("/Assembly/Shelf 2"));
}

#[test]
fn test_snapshot_json_round_trip_through_viewer() {
    let json = r##"{
        "assemblyId": "demo",
        "parts": [
            {
                "id": "p1",
                "name": "Plate",
                "mesh": {
                    "vertices": [0,0,0, 1,0,0, 0,1,0],
                    "normals": [0,0,1, 0,0,1, 0,0,1],
                    "triangleIndices": [0,1,2]
                },
                "appearance": { "color": "blue", "alpha": 0.25 },
                "visibilityState": [1, 0]
            }
        ]
    }"##;
    let snapshot = PartsChanged::from_json(json).unwrap();
    let mut viewer = LiveViewer::new(ViewerConfig::default()).unwrap();
    viewer.load(&snapshot).unwrap();

    let handle = viewer.registry().get("p1").unwrap();
    let node = viewer.scene().node(handle.node()).unwrap();
    assert!(node.visible);
    assert!(!node.edges_visible);
    let material = viewer.scene().materials().get(&node.material.unwrap()).unwrap();
    assert!(material.transparent);
}
