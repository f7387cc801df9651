//! Parametric bookshelf demo
//!
//! This demo plays the part of a notebook cell that re-runs whenever its
//! sliders move:
//! - The host publishes a snapshot before the viewer is laid out
//! - The viewer signals ready and receives the deferred snapshot
//! - The shelf count and height change, and each change is synced in place
//! - A shelf hidden by the user stays hidden when it comes back

use anyhow::Context;
use livecad_core::{Part, PartMesh, PartTransform, PartsChanged, ViewerConfig, WidthSpec};
use livecad_viewer::{HostChannel, ViewerSession};

fn bookshelf(shelves: usize, height: f32, width: f32) -> PartsChanged {
    let depth = 0.3;
    let board = 0.02;
    let mut parts = vec![
        Part::new(
            "side-l",
            "Left Side",
            PartMesh::cuboid([-width / 2.0, height / 2.0, 0.0], [board, height, depth]),
        )
        .with_color("orange"),
        Part::new(
            "side-r",
            "Right Side",
            PartMesh::cuboid([width / 2.0, height / 2.0, 0.0], [board, height, depth]),
        )
        .with_color("orange"),
        Part::new(
            "back",
            "Back",
            PartMesh::cuboid([0.0, height / 2.0, -depth / 2.0], [width, height, 0.01]),
        )
        .with_color("gray")
        .with_opacity(0.6),
    ];

    for i in 1..=shelves {
        let y = height * i as f32 / (shelves + 1) as f32;
        parts.push(
            Part::new(
                format!("shelf-{i}"),
                format!("Shelf {i}"),
                PartMesh::cuboid([0.0; 3], [width - board, board, depth - 0.02]),
            )
            .with_color("#b07040")
            .with_transform(PartTransform::at([0.0, y, 0.0])),
        );
    }

    PartsChanged::new("bookshelf", parts)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("livecad bookshelf demo");
    println!("======================");

    let config = ViewerConfig::with_size(WidthSpec::css("100%"), 500);
    let mut host = HostChannel::new();
    let mut session = ViewerSession::new(config).context("creating viewer session")?;

    host.set_parts(bookshelf(6, 1.8, 0.8));
    let ready = session
        .on_layout(960)?
        .context("viewer did not signal ready")?;
    let snapshot = host
        .on_message(&ready.to_json()?)?
        .context("host had no deferred snapshot")?;
    session.on_parts_changed(snapshot)?;
    println!("First render: {}", session.viewer());

    session.viewer_mut().set_shape_visible("shelf-6", false)?;
    println!("Hid Shelf 6");

    for (shelves, height) in [(6, 2.0), (5, 2.0), (4, 1.6), (6, 1.6)] {
        let Some(snapshot) = host.set_parts(bookshelf(shelves, height, 0.8)) else {
            continue;
        };
        if let Some(report) = session.on_parts_changed(snapshot)? {
            println!(
                "{} shelves at {:.1} m: +{} ~{} -{} -> {}",
                shelves,
                height,
                report.added,
                report.updated,
                report.removed,
                session.viewer()
            );
        }
    }

    let viewer = session.viewer();
    if let Some(tree) = viewer.tree() {
        for (name, state) in tree.state_map() {
            println!("  {:<12} shape={} edges={}", name, state.shape, state.edges);
        }
    }
    println!(
        "Camera target stayed at ({:.2}, {:.2}, {:.2})",
        viewer.camera().target.x,
        viewer.camera().target.y,
        viewer.camera().target.z
    );

    Ok(())
}
