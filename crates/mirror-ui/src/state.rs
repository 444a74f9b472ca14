use mirror_types::{Route, TransitionState, WorkflowSnapshot};

/// UI-side view state (separate from the workflow's own state)
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub route: Route,
    /// State handed over by the previous view, shown by the results view
    pub transition: Option<TransitionState>,
    /// Last snapshot rendered for the detection view
    pub snapshot: WorkflowSnapshot,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, route: Route, transition: Option<TransitionState>) {
        self.route = route;
        self.transition = transition;
        self.snapshot = WorkflowSnapshot::default();
    }
}
