//! Live part synchronization for a notebook-embedded CAD viewer
//!
//! Given a fresh snapshot of named parts, [`LiveViewer`] reconciles the
//! existing scene with it: new parts are added, stale ones disposed and
//! changed geometry is written into the existing buffers. The camera, the
//! viewer and the user's visibility choices survive every update.
//!
//! ```
//! use livecad_viewer::LiveViewer;
//! use livecad_core::{Part, PartMesh, ViewerConfig};
//!
//! let mut viewer = LiveViewer::new(ViewerConfig::default())?;
//! viewer.render(&[Part::named("Base", PartMesh::cuboid([0.0; 3], [4.0, 0.2, 2.0]))])?;
//! let report = viewer.sync(&[Part::named("Lid", PartMesh::cuboid([0.0; 3], [4.0, 0.2, 2.0]))])?;
//! assert_eq!((report.added, report.removed), (1, 1));
//! # Ok::<(), livecad_core::Error>(())
//! ```

pub mod camera;
pub mod handle;
pub mod registry;
pub mod session;
pub mod state;
pub mod tree;
pub mod viewer;

pub use camera::Camera;
pub use handle::{PartHandle, ReleasedResources};
pub use registry::{PartRegistry, SyncReport};
pub use session::{Debouncer, HostChannel, SurfaceRequest, Ticket, ViewerSession};
pub use state::{PartRecord, StateManager};
pub use tree::{TreeEntry, TreeView};
pub use viewer::{LiveViewer, ViewerState};
