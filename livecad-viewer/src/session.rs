//! Widget session: the handshake between the modeling host and the viewer
//!
//! Both ends are single-threaded state machines driven by the embedder's
//! event loop. The host keeps the latest snapshot until the viewer says it
//! is ready; the viewer waits for a positive measured width before it
//! initializes, then signals ready exactly once.

use crate::registry::SyncReport;
use crate::viewer::LiveViewer;
use livecad_core::{PartsChanged, Result, ViewerConfig, ViewerEvent};

/// Host side of the widget: defers snapshots until the viewer is ready
#[derive(Debug, Default)]
pub struct HostChannel {
    ready: bool,
    pending: Option<PartsChanged>,
    selected: Option<String>,
}

impl HostChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a snapshot.
    ///
    /// Returns it for immediate delivery once the viewer is ready. Before
    /// that it is held back, replacing any snapshot held earlier.
    pub fn set_parts(&mut self, snapshot: PartsChanged) -> Option<PartsChanged> {
        if self.ready {
            Some(snapshot)
        } else {
            log::debug!("host.set_parts: viewer not ready, deferring '{}'", snapshot.assembly_id);
            self.pending = Some(snapshot);
            None
        }
    }

    /// Handle the viewer's ready signal; returns the deferred snapshot, if any.
    ///
    /// Repeated ready signals are ignored.
    pub fn on_ready(&mut self) -> Option<PartsChanged> {
        if self.ready {
            log::debug!("host.on_ready: duplicate ready signal ignored");
            return None;
        }
        self.ready = true;
        self.pending.take()
    }

    /// Handle a decoded event from the viewer
    pub fn on_event(&mut self, event: ViewerEvent) -> Option<PartsChanged> {
        match event {
            ViewerEvent::Ready => self.on_ready(),
            ViewerEvent::Select { data } => {
                self.selected = Some(data);
                None
            }
        }
    }

    /// Handle a raw JSON event from the viewer
    pub fn on_message(&mut self, json: &str) -> Result<Option<PartsChanged>> {
        let event: ViewerEvent = serde_json::from_str(json)?;
        Ok(self.on_event(event))
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Last selection reported by the viewer
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }
}

/// Token identifying one debounced request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

/// Last-request-wins debouncer.
///
/// Each request supersedes the previous one. When the embedder's timer for
/// a ticket fires, only the most recent ticket yields its request.
#[derive(Debug)]
pub struct Debouncer<T> {
    generation: u64,
    pending: Option<T>,
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            pending: None,
        }
    }
}

impl<T> Debouncer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a request, superseding any earlier one
    pub fn request(&mut self, value: T) -> Ticket {
        self.generation += 1;
        self.pending = Some(value);
        Ticket(self.generation)
    }

    /// Take the request if `ticket` is still the latest
    pub fn fire(&mut self, ticket: Ticket) -> Option<T> {
        if ticket.0 == self.generation {
            self.pending.take()
        } else {
            None
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Surface changes that are debounced together
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceRequest {
    /// The container was resized to this many pixels
    Resize { container_width: u32 },
    /// The widget was detached from the page
    Dispose,
}

/// Viewer side of the widget
#[derive(Debug)]
pub struct ViewerSession {
    viewer: LiveViewer,
    width: Option<u32>,
    ready_sent: bool,
    early: Option<PartsChanged>,
    surface: Debouncer<SurfaceRequest>,
}

impl ViewerSession {
    /// Create a session around a fresh viewer
    pub fn new(config: ViewerConfig) -> Result<Self> {
        Ok(Self {
            viewer: LiveViewer::new(config)?,
            width: None,
            ready_sent: false,
            early: None,
            surface: Debouncer::new(),
        })
    }

    /// Report the measured container width.
    ///
    /// Zero widths keep the session waiting. The first positive width sizes
    /// the viewer and returns the `ready` event; a snapshot that arrived
    /// earlier is applied right after.
    pub fn on_layout(&mut self, container_width: u32) -> Result<Option<ViewerEvent>> {
        if container_width == 0 || self.ready_sent {
            return Ok(None);
        }
        self.apply_width(container_width)?;
        self.ready_sent = true;
        log::info!("session.on_layout: measured {}px, signalling ready", container_width);

        if let Some(snapshot) = self.early.take() {
            if let Err(e) = self.apply(&snapshot) {
                log::error!(
                    "session.on_layout: held snapshot '{}' rejected: {}",
                    snapshot.assembly_id,
                    e
                );
            }
        }
        Ok(Some(ViewerEvent::Ready))
    }

    /// Receive a snapshot from the host.
    ///
    /// Before layout the snapshot is held (latest wins) and `None` is
    /// returned.
    pub fn on_parts_changed(&mut self, snapshot: PartsChanged) -> Result<Option<SyncReport>> {
        if !self.ready_sent {
            log::debug!("session.on_parts_changed: layout pending, holding '{}'", snapshot.assembly_id);
            self.early = Some(snapshot);
            return Ok(None);
        }
        self.apply(&snapshot).map(Some)
    }

    fn apply(&mut self, snapshot: &PartsChanged) -> Result<SyncReport> {
        self.viewer.load(snapshot)
    }

    fn apply_width(&mut self, container_width: u32) -> Result<()> {
        let config = self.viewer.config();
        let width = config.width.resolve(container_width)?;
        let height = config.height;
        self.viewer.resize(width, height);
        self.width = Some(width);
        Ok(())
    }

    /// Debounced resize; apply with [`ViewerSession::fire`]
    pub fn request_resize(&mut self, container_width: u32) -> Ticket {
        self.surface.request(SurfaceRequest::Resize { container_width })
    }

    /// Debounced dispose; a later resize cancels it
    pub fn request_dispose(&mut self) -> Ticket {
        self.surface.request(SurfaceRequest::Dispose)
    }

    /// Timer callback for a debounced request. Returns the request applied.
    pub fn fire(&mut self, ticket: Ticket) -> Result<Option<SurfaceRequest>> {
        let Some(request) = self.surface.fire(ticket) else {
            return Ok(None);
        };
        match request {
            SurfaceRequest::Resize { container_width } if container_width > 0 => {
                self.apply_width(container_width)?;
            }
            SurfaceRequest::Resize { .. } => {}
            SurfaceRequest::Dispose => {
                self.viewer.dispose();
            }
        }
        Ok(Some(request))
    }

    /// Resolved drawing width in pixels, once measured
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    pub fn ready_sent(&self) -> bool {
        self.ready_sent
    }

    pub fn viewer(&self) -> &LiveViewer {
        &self.viewer
    }

    pub fn viewer_mut(&mut self) -> &mut LiveViewer {
        &mut self.viewer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livecad_core::{Part, PartMesh, WidthSpec};

    fn snapshot(names: &[&str]) -> PartsChanged {
        PartsChanged::new(
            "asm",
            names
                .iter()
                .map(|n| Part::named(*n, PartMesh::cuboid([0.0; 3], [1.0; 3])))
                .collect(),
        )
    }

    #[test]
    fn test_host_defers_until_ready() {
        let mut host = HostChannel::new();
        assert!(host.set_parts(snapshot(&["A"])).is_none());
        assert!(host.set_parts(snapshot(&["A", "B"])).is_none());

        let delivered = host.on_ready().unwrap();
        assert_eq!(delivered.parts.len(), 2);
        assert!(host.on_ready().is_none());
        assert!(host.set_parts(snapshot(&["C"])).is_some());
    }

    #[test]
    fn test_host_parses_messages() {
        let mut host = HostChannel::new();
        host.set_parts(snapshot(&["A"]));
        assert!(host.on_message(r#"{"type":"ready"}"#).unwrap().is_some());
        host.on_message(r#"{"type":"select","data":"/asm/A"}"#).unwrap();
        assert_eq!(host.selected(), Some("/asm/A"));
        assert!(host.on_message("not json").is_err());
    }

    #[test]
    fn test_debouncer_last_request_wins() {
        let mut debouncer = Debouncer::new();
        let first = debouncer.request(1);
        let second = debouncer.request(2);
        assert_eq!(debouncer.fire(first), None);
        assert_eq!(debouncer.fire(second), Some(2));
        assert_eq!(debouncer.fire(second), None);
    }

    #[test]
    fn test_ready_waits_for_positive_width() {
        let mut session = ViewerSession::new(ViewerConfig::default()).unwrap();
        assert_eq!(session.on_layout(0).unwrap(), None);
        assert_eq!(session.on_layout(640).unwrap(), Some(ViewerEvent::Ready));
        assert_eq!(session.on_layout(800).unwrap(), None);
        assert_eq!(session.width(), Some(640));
    }

    #[test]
    fn test_early_snapshot_applied_after_layout() {
        let mut session = ViewerSession::new(ViewerConfig::default()).unwrap();
        assert!(session.on_parts_changed(snapshot(&["A"])).unwrap().is_none());
        assert!(session.on_parts_changed(snapshot(&["A", "B"])).unwrap().is_none());
        session.on_layout(500).unwrap();
        assert_eq!(session.viewer().part_count(), 2);
    }

    #[test]
    fn test_width_resolves_against_container() {
        let config = ViewerConfig::with_size(WidthSpec::css("50%"), 400);
        let mut session = ViewerSession::new(config).unwrap();
        session.on_layout(1000).unwrap();
        assert_eq!(session.width(), Some(500));
    }

    #[test]
    fn test_resize_cancels_pending_dispose() {
        let mut session = ViewerSession::new(ViewerConfig::default()).unwrap();
        session.on_layout(800).unwrap();
        session.on_parts_changed(snapshot(&["A"])).unwrap();

        let dispose = session.request_dispose();
        let resize = session.request_resize(600);
        assert_eq!(session.fire(dispose).unwrap(), None);
        assert_eq!(
            session.fire(resize).unwrap(),
            Some(SurfaceRequest::Resize { container_width: 600 })
        );
        assert_eq!(session.viewer().part_count(), 1);
        assert_eq!(session.width(), Some(600));
    }
}
