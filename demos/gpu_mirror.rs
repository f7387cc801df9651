//! GPU mirror demo
//!
//! Syncs a few snapshots and mirrors the scene buffers into wgpu buffers,
//! printing how many were created, overwritten in place, and dropped.

use anyhow::Context;
use livecad_core::{Part, PartMesh, ViewerConfig};
use livecad_scene::{GpuContext, GpuMirror};
use livecad_viewer::LiveViewer;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let ctx = pollster::block_on(GpuContext::new()).context("no GPU adapter available")?;
    println!("Adapter: {}", ctx.adapter.get_info().name);

    let mut viewer = LiveViewer::new(ViewerConfig::default())?;
    let mut mirror = GpuMirror::new();

    let snapshots = [
        vec![cube("A", 1.0), cube("B", 1.0)],
        vec![cube("A", 2.0), cube("B", 2.0)],
        vec![cube("A", 2.0), cube("C", 1.0)],
    ];
    for (i, parts) in snapshots.iter().enumerate() {
        if i == 0 {
            viewer.render(parts)?;
        } else {
            viewer.sync(parts)?;
        }
        let stats = mirror.sync(&ctx, viewer.scene());
        println!(
            "Snapshot {}: created {}, written {}, pruned {} ({} live buffers)",
            i + 1,
            stats.created,
            stats.written,
            stats.pruned,
            mirror.len()
        );
    }

    Ok(())
}

fn cube(name: &str, size: f32) -> Part {
    Part::named(name, PartMesh::cuboid([0.0; 3], [size; 3]))
}
