use std::io::{self, Write};
use std::ops::ControlFlow;

use mirror_config::Config;
use mirror_types::{AppEvent, Route};

use crate::render;
use crate::state::UiState;

/// Apply one app-to-UI event and draw whatever changed
pub fn handle_events(
    event: AppEvent,
    state: &mut UiState,
    config: &Config,
    out: &mut impl Write,
) -> io::Result<ControlFlow<()>> {
    match event {
        AppEvent::ShowView { route, state: transition } => {
            tracing::debug!("[UI] Showing {}", route);
            state.enter(route, transition);
            let view = match route {
                Route::MoodSelection => render::mood_selection(&config.ui),
                Route::FaceDetection => {
                    render::face_detection(&state.snapshot, config.service.base())
                }
                Route::GeneratedPlaylist => render::generated_playlist(state.transition.as_ref()),
            };
            write!(out, "{view}")?;
        }
        AppEvent::StatusUpdate(snapshot) => {
            if state.route != Route::FaceDetection {
                tracing::debug!("[UI] Status update outside detection view ignored");
            } else if snapshot != state.snapshot {
                // Status line, loading flag and error panel change independently
                let redraw_panel = snapshot.loading != state.snapshot.loading
                    || snapshot.error != state.snapshot.error;
                if redraw_panel {
                    write!(out, "{}", render::status_panel(&snapshot, config.service.base()))?;
                } else {
                    writeln!(out, "{}", render::status_line(&snapshot, config.service.base()))?;
                }
                state.snapshot = snapshot;
            }
        }
        AppEvent::BackendReady => {
            tracing::debug!("[UI] Backend ready");
            writeln!(out, "Ready. Type 'help' for commands.")?;
        }
        AppEvent::Quit => {
            writeln!(out, "Bye.")?;
            out.flush()?;
            return Ok(ControlFlow::Break(()));
        }
        _ => {}
    }

    out.flush()?;
    Ok(ControlFlow::Continue(()))
}
