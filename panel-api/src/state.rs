use panel_orchestrator::{PanelStore, ServerDeletionService};

#[derive(Clone)]
pub struct AppState {
    pub store: PanelStore,
    pub deletion: ServerDeletionService,
}

impl AppState {
    pub fn new(store: PanelStore, deletion: ServerDeletionService) -> Self {
        Self { store, deletion }
    }
}
