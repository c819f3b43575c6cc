use el_feeds::AnalysisManager;

pub struct AppState {
    pub manager: AnalysisManager,
}

impl AppState {
    pub fn new(manager: AnalysisManager) -> Self {
        Self { manager }
    }
}
