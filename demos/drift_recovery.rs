//! Drift recovery demo
//!
//! Attaches part nodes to the scene without going through the registry and
//! shows the next sync disposing the unwanted ones and adopting the rest.

use livecad_core::{Part, PartMesh, ViewerConfig};
use livecad_viewer::{LiveViewer, PartHandle};

fn block(name: &str, size: f32) -> Part {
    Part::named(name, PartMesh::cuboid([0.0; 3], [size; 3]))
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut viewer = LiveViewer::new(ViewerConfig::default())?;
    viewer.render(&[block("A", 1.0), block("B", 1.0)])?;
    println!("Rendered: {}", viewer);

    PartHandle::create(viewer.scene_mut(), &block("Stray", 1.0), "#888888")?;
    PartHandle::create(viewer.scene_mut(), &block("C", 1.0), "#888888")?;
    let root = viewer.scene().root();
    println!("Scene drifted: {:?}", viewer.scene().part_keys(root));

    let report = viewer.sync(&[block("A", 1.2), block("B", 1.2), block("C", 1.2)])?;
    println!(
        "Sync: added {}, updated {}, removed {}",
        report.added, report.updated, report.removed
    );
    println!("Scene healed: {:?}", viewer.scene().part_keys(root));
    println!("Now: {}", viewer);

    Ok(())
}
