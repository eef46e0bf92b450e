use std::collections::HashMap;
use std::sync::Arc;

use codepal_config::ConfigSource;
use codepal_core::{PanelId, UiBus};
use codepal_provider::ProviderFactory;
use tokio::sync::RwLock;

use crate::{HostServices, Panel};

/// Owns every open panel, keyed by id. Each panel has its own session.
pub struct Controller {
    host: HostServices,
    config: Arc<dyn ConfigSource>,
    providers: Arc<dyn ProviderFactory>,
    bus: Arc<UiBus>,
    panels: RwLock<HashMap<PanelId, Arc<Panel>>>,
}

impl Controller {
    pub fn new(
        host: HostServices,
        config: Arc<dyn ConfigSource>,
        providers: Arc<dyn ProviderFactory>,
        bus: Arc<UiBus>,
    ) -> Self {
        Self {
            host,
            config,
            providers,
            bus,
            panels: RwLock::new(HashMap::new()),
        }
    }

    pub fn bus(&self) -> &Arc<UiBus> {
        &self.bus
    }

    /// The panel registered under `id`, created on first use.
    pub async fn create_or_show(&self, id: &PanelId) -> Arc<Panel> {
        if let Some(panel) = self.panels.read().await.get(id) {
            tracing::debug!(panel = %id, "showing existing panel");
            return panel.clone();
        }

        let mut panels = self.panels.write().await;
        panels
            .entry(id.clone())
            .or_insert_with(|| {
                tracing::info!(panel = %id, "creating panel");
                Arc::new(Panel::new(
                    id.clone(),
                    self.host.clone(),
                    self.config.clone(),
                    self.providers.clone(),
                    Arc::new(self.bus.sink_for(id.clone())),
                ))
            })
            .clone()
    }

    /// Opens a panel under a fresh id.
    pub async fn open_panel(&self) -> Arc<Panel> {
        self.create_or_show(&PanelId::new()).await
    }

    pub async fn get(&self, id: &PanelId) -> Option<Arc<Panel>> {
        self.panels.read().await.get(id).cloned()
    }

    /// Disposes of a panel and its conversation.
    pub async fn close(&self, id: &PanelId) -> bool {
        let removed = self.panels.write().await.remove(id).is_some();
        if removed {
            tracing::info!(panel = %id, "closed panel");
        }
        removed
    }

    pub async fn panel_ids(&self) -> Vec<PanelId> {
        let mut ids: Vec<PanelId> = self.panels.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }
}
