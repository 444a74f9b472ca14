use mirror_config::routes::RoutesConfig;
use mirror_types::{AppEvent, DetectionResult, Mood, Route, TransitionState};

/// Manual pick, bypassing camera and detection service entirely
pub fn manual_selection(mood: Mood) -> (DetectionResult, AppEvent) {
    let result = DetectionResult::manual(mood);
    let event = AppEvent::Navigate {
        route: Route::GeneratedPlaylist,
        state: Some(TransitionState::from(result.clone())),
    };
    (result, event)
}

/// "Skip & choose manually" from the detection view
pub fn manual_skip(routes: &RoutesConfig) -> AppEvent {
    AppEvent::Navigate {
        route: routes.manual_skip_route(),
        state: None,
    }
}
