//! Live viewer: the single entry point for rendering and syncing part lists

use crate::camera::Camera;
use crate::registry::{PartRegistry, SyncReport};
use crate::state::StateManager;
use crate::tree::TreeView;
use livecad_core::{
    BoundingSphere, Error, Part, PartsChanged, Result, Rgb, ViewerConfig, ViewerEvent,
};
use livecad_scene::SceneGraph;
use std::fmt;

/// Lifecycle of a viewer; it never returns to `Uninitialized`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerState {
    Uninitialized,
    Ready,
}

/// Orchestrates the scene, part registry, state manager and tree view.
///
/// The camera and the viewer itself are created once. A sync only touches
/// part nodes, the records of the state manager and, when membership or a
/// display name changed, the tree view.
#[derive(Debug)]
pub struct LiveViewer {
    config: ViewerConfig,
    state: ViewerState,
    scene: SceneGraph,
    registry: PartRegistry,
    states: StateManager,
    tree: Option<TreeView>,
    camera: Camera,
    assembly_id: Option<String>,
    render_requests: u64,
    tree_builds: u64,
    events: Vec<ViewerEvent>,
}

impl LiveViewer {
    /// Create an uninitialized viewer
    pub fn new(config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        let mut scene = SceneGraph::new(&config.assembly_label);
        if let Some(edge_color) = Rgb::parse(&config.edge_color) {
            scene.set_edge_color(edge_color);
        }
        Ok(Self {
            scene,
            registry: PartRegistry::new(config.default_color.clone()),
            states: StateManager::new(config.tree_expansion_level),
            config,
            state: ViewerState::Uninitialized,
            tree: None,
            camera: Camera::default(),
            assembly_id: None,
            render_requests: 0,
            tree_builds: 0,
            events: Vec::new(),
        })
    }

    /// First paint.
    ///
    /// Fails with `EmptyAssembly` when no part can be displayed, leaving the
    /// viewer untouched. On an already ready viewer this behaves like [`sync`].
    ///
    /// [`sync`]: LiveViewer::sync
    pub fn render(&mut self, parts: &[Part]) -> Result<SyncReport> {
        if parts.is_empty() {
            return Err(Error::EmptyAssembly);
        }
        if self.state == ViewerState::Ready {
            log::debug!("viewer.render: already ready, syncing instead");
            return self.sync(parts);
        }

        let report = self.registry.sync(&mut self.scene, parts);
        if self.registry.is_empty() {
            self.registry.clear(&mut self.scene);
            log::error!(
                "viewer.render: none of {} parts could be displayed",
                parts.len()
            );
            return Err(Error::EmptyAssembly);
        }
        self.apply_visibility(parts);
        self.rebuild_tree();
        if let Some(bounds) = self.scene.assembly_bounds() {
            self.camera.fit_sphere(&BoundingSphere::enclosing(&bounds));
        }
        self.state = ViewerState::Ready;
        self.render_requests += 1;
        log::info!("viewer.render: ready with {} parts", self.registry.len());
        Ok(report)
    }

    /// Reconcile with a new snapshot.
    ///
    /// Fails with `NotReady` before the first render, without side effects.
    pub fn sync(&mut self, parts: &[Part]) -> Result<SyncReport> {
        if self.state != ViewerState::Ready {
            return Err(Error::NotReady("sync"));
        }
        let report = self.registry.sync(&mut self.scene, parts);
        self.apply_visibility(parts);
        if report.tree_changed() {
            self.rebuild_tree();
        }
        self.render_requests += 1;
        Ok(report)
    }

    /// Render or sync a snapshot depending on the lifecycle state
    pub fn load(&mut self, snapshot: &PartsChanged) -> Result<SyncReport> {
        let report = match self.state {
            ViewerState::Uninitialized => self.render(&snapshot.parts)?,
            ViewerState::Ready => self.sync(&snapshot.parts)?,
        };
        self.assembly_id = Some(snapshot.assembly_id.clone());
        Ok(report)
    }

    fn apply_visibility(&mut self, parts: &[Part]) {
        for part in parts {
            let key = part.key();
            let Some(handle) = self.registry.get(key) else {
                continue;
            };
            let visibility = self.states.resolve(key, part.visibility_state);
            handle.set_visibility(&mut self.scene, visibility.shape, visibility.edges);
            if let Some(tree) = self.tree.as_mut() {
                tree.set_state(key, visibility);
            }
        }
    }

    fn rebuild_tree(&mut self) {
        let scene = &self.scene;
        let entries: Vec<(&str, &str)> = self
            .registry
            .handles()
            .filter_map(|h| Some((h.key(), scene.node(h.node())?.label.as_str())))
            .collect();

        match TreeView::build(&self.config.assembly_label, entries, &self.states) {
            Ok(tree) => {
                self.tree = Some(tree);
                self.tree_builds += 1;
            }
            Err(e) => {
                log::error!("viewer.rebuild_tree: assembly '{}': {}", self.config.assembly_label, e);
                self.tree = None;
            }
        }
    }

    /// Show or hide a part's shape
    pub fn set_shape_visible(&mut self, id: &str, visible: bool) -> Result<()> {
        self.ensure_ready("set_shape_visible")?;
        let handle = self
            .registry
            .get(id)
            .ok_or_else(|| Error::UnknownPart(id.to_string()))?;
        let state = self.states.set_shape_visible(id, visible);
        handle.set_visibility(&mut self.scene, state.shape, state.edges);
        if let Some(tree) = self.tree.as_mut() {
            tree.set_state(id, state);
        }
        self.render_requests += 1;
        Ok(())
    }

    /// Show or hide a part's edge overlay
    pub fn set_edges_visible(&mut self, id: &str, visible: bool) -> Result<()> {
        self.ensure_ready("set_edges_visible")?;
        let handle = self
            .registry
            .get(id)
            .ok_or_else(|| Error::UnknownPart(id.to_string()))?;
        let state = self.states.set_edges_visible(id, visible);
        handle.set_visibility(&mut self.scene, state.shape, state.edges);
        if let Some(tree) = self.tree.as_mut() {
            tree.set_state(id, state);
        }
        self.render_requests += 1;
        Ok(())
    }

    /// Select a part and queue a `select` event carrying its tree path
    pub fn select(&mut self, id: &str) -> Result<ViewerEvent> {
        self.ensure_ready("select")?;
        if !self.registry.contains(id) {
            return Err(Error::UnknownPart(id.to_string()));
        }
        self.states.select(id);
        let data = self
            .tree
            .as_ref()
            .and_then(|t| t.path_of(id))
            .unwrap_or(id)
            .to_string();
        let event = ViewerEvent::Select { data };
        self.events.push(event.clone());
        Ok(event)
    }

    /// Update the drawing surface size
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport(width, height);
        self.render_requests += 1;
    }

    /// Dispose every part; the camera and the state records are kept
    pub fn dispose(&mut self) -> usize {
        let disposed = self.registry.clear(&mut self.scene);
        self.tree = None;
        log::info!("viewer.dispose: released {} parts", disposed);
        disposed
    }

    fn ensure_ready(&self, operation: &'static str) -> Result<()> {
        match self.state {
            ViewerState::Ready => Ok(()),
            ViewerState::Uninitialized => Err(Error::NotReady(operation)),
        }
    }

    /// Drain queued outbound events
    pub fn take_events(&mut self) -> Vec<ViewerEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> ViewerState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == ViewerState::Ready
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// User camera interaction goes through here
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Direct scene access, for embedders that attach their own nodes
    pub fn scene_mut(&mut self) -> &mut SceneGraph {
        &mut self.scene
    }

    pub fn registry(&self) -> &PartRegistry {
        &self.registry
    }

    pub fn state_manager(&self) -> &StateManager {
        &self.states
    }

    pub fn state_manager_mut(&mut self) -> &mut StateManager {
        &mut self.states
    }

    pub fn tree(&self) -> Option<&TreeView> {
        self.tree.as_ref()
    }

    pub fn assembly_id(&self) -> Option<&str> {
        self.assembly_id.as_deref()
    }

    /// Number of frames requested so far
    pub fn render_requests(&self) -> u64 {
        self.render_requests
    }

    /// Number of successful tree builds
    pub fn tree_builds(&self) -> u64 {
        self.tree_builds
    }

    pub fn part_count(&self) -> usize {
        self.registry.len()
    }
}

impl fmt::Display for LiveViewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Viewer({} parts)", self.part_count())
    }
}
