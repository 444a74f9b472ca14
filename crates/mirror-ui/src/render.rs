use std::fmt::Write;

use mirror_config::ui::UiConfig;
use mirror_types::{Mood, Route, TransitionState, WorkflowSnapshot};

const RULE: &str = "----------------------------------------";

pub fn mood_selection(ui: &UiConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "MoodMirror          Welcome, {}! [{}]", ui.display_name, ui.initial());
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Manual Selection");
    for mood in Mood::ALL {
        let _ = writeln!(out, "  {:<10} type '{}'", mood.label(), mood.as_str());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Facial Recognition");
    let _ = writeln!(out, "  Use webcam to detect mood -> type 'face'");
    out
}

pub fn face_detection(snapshot: &WorkflowSnapshot, base_url: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Face Detection");
    let _ = writeln!(out, "{RULE}");
    out.push_str(&status_panel(snapshot, base_url));
    out
}

/// Action buttons, status line and error panel of the detection view
pub fn status_panel(snapshot: &WorkflowSnapshot, base_url: &str) -> String {
    let action = if snapshot.loading {
        "Detecting..."
    } else {
        "Detect Mood"
    };

    let mut out = String::new();
    let _ = writeln!(
        out,
        "[ {action} ] 'detect'    [ Skip & Choose Mood Manually ] 'skip'"
    );
    let _ = writeln!(out, "{}", status_line(snapshot, base_url));
    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "! {error}");
    }
    out
}

pub fn status_line(snapshot: &WorkflowSnapshot, base_url: &str) -> String {
    format!(
        "{} • {}",
        snapshot.status.message(),
        snapshot.health.message(base_url)
    )
}

pub fn generated_playlist(state: Option<&TransitionState>) -> String {
    let fallback = TransitionState::default();
    let state = state.unwrap_or(&fallback);

    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Generated Playlist");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Mood detected: {}", state.mood_or_default());
    let _ = writeln!(out, "Source: {}", state.source_or_default());
    if let Some(percent) = state.confidence_percent() {
        let _ = writeln!(out, "Confidence: {percent}%");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[ Back to Mood Selection ] 'back'    [ Try Face Detection Again ] 'retry'");
    let _ = writeln!(
        out,
        "Spotify playlist generation will be connected once login scopes are fixed."
    );
    out
}

pub fn help(route: Route) -> String {
    let commands = match route {
        Route::MoodSelection => "happy, sad, angry, surprised, fearful, disgusted, face",
        Route::FaceDetection => "detect, skip, dismiss, retry",
        Route::GeneratedPlaylist => "back, retry",
    };
    format!("Commands: {commands}, help, quit\n")
}
