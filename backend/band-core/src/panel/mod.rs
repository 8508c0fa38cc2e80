//! Panel facade: the lifecycle surface the host adapter drives.

use crate::CHANNEL_NAME_PREFIX;
use crate::cache::SharedRenderState;
use crate::config::PanelConfig;
use crate::dispatch::EventForwarder;
use crate::error::CoreError;
use crate::host::HostHooks;
use crate::listener::{ListenerHandle, ListenerState};
use crate::painter::{DrawSurface, paint_all};

use std::sync::Arc;

use log::{info, warn};
use uuid::Uuid;

/// One embedded panel instance.
///
/// Owns the render cache and at most one listener worker. All methods are
/// called from the host's UI-bound context; none of them blocks except
/// `stop()` (which joins the worker) and `on_host_event()` (bounded by the
/// configured forward timeout).
pub struct Panel {
    config: PanelConfig,
    hooks: Arc<dyn HostHooks>,
    cache: SharedRenderState,
    listener: Option<ListenerHandle>,
    forwarder: Option<EventForwarder>,
}

impl Panel {
    pub fn new(config: PanelConfig, hooks: Arc<dyn HostHooks>) -> Self {
        Self {
            config,
            hooks,
            cache: SharedRenderState::new(),
            listener: None,
            forwarder: None,
        }
    }

    /// Fresh channel name for a new panel instance. A controller derives
    /// the endpoint from this name, so the host must hand it over (window
    /// property, command line, whatever the integration uses).
    pub fn generate_channel_name() -> String {
        format!("{CHANNEL_NAME_PREFIX}{}", Uuid::new_v4())
    }

    /// Bind the channel and start the listener worker.
    ///
    /// An invalid configuration (empty or overflowing port window) is
    /// rejected before anything binds. A `Connection` error (endpoint
    /// taken, permission denied) leaves the
    /// panel inert but intact; the host may call `start` again later. A
    /// controller that is merely not present yet is not an error - the
    /// worker waits for it.
    pub fn start(&mut self, channel_name: &str) -> Result<(), CoreError> {
        if self.is_running() {
            warn!("panel already started; ignoring start({channel_name:?})");
            return Ok(());
        }

        // Endpoint derivation folds the channel hash into the configured
        // port window; an empty or overflowing window must be rejected
        // here, not discovered as arithmetic inside the fold.
        self.config.validate()?;

        let (listener, forwarder) = ListenerHandle::start(
            channel_name,
            &self.config,
            self.cache.clone(),
            Arc::clone(&self.hooks),
        )?;

        self.listener = Some(listener);
        self.forwarder = Some(forwarder);
        info!("panel started on channel {channel_name:?}");
        Ok(())
    }

    /// Tear the panel down. Blocks until the listener worker has fully
    /// terminated; after return, nothing mutates the cache or calls back
    /// into the host. Safe to call repeatedly or without a prior start.
    pub fn stop(&mut self) {
        self.forwarder = None;
        if let Some(listener) = self.listener.as_mut() {
            listener.stop();
        }
    }

    /// Host paint event: draw the current snapshot onto the given surface.
    pub fn on_paint(&self, surface: &mut dyn DrawSurface) {
        let snapshot = self.cache.snapshot();
        paint_all(surface, &snapshot);
    }

    /// Host window event: offer it to the controller if the configured
    /// forward policy includes this message id.
    ///
    /// Returns whether the controller handled it; `false` lets the host
    /// fall back to its default handling. Bounded by the forward timeout,
    /// so the host's message pump can never hang here.
    pub fn on_host_event(&self, message_id: u32) -> bool {
        if !self.config.forward.message_ids.contains(&message_id) {
            return false;
        }

        match &self.forwarder {
            Some(forwarder) => {
                forwarder.forward_event(message_id, &[], self.config.forward_timeout())
            }
            None => false,
        }
    }

    pub fn listener_state(&self) -> ListenerState {
        match &self.listener {
            Some(listener) => listener.state(),
            None => ListenerState::NotStarted,
        }
    }

    pub fn is_running(&self) -> bool {
        self.listener_state() == ListenerState::Running
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }
}

impl Drop for Panel {
    fn drop(&mut self) {
        // Join-before-destruction is mandatory; a worker callback into a
        // dead panel would be undefined behavior in a native host.
        self.stop();
    }
}
