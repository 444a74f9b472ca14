use mirror_types::{AppEvent, Mood, Route};

/// One line of user input, interpreted against the current view
#[derive(Debug, Clone)]
pub enum Command {
    Send(AppEvent),
    Help,
    /// Known command that does nothing on the current view
    Unavailable(String),
    Unknown(String),
    Empty,
}

pub fn parse_command(line: &str, route: Route) -> Command {
    let word = line.trim();
    if word.is_empty() {
        return Command::Empty;
    }
    let lower = word.to_lowercase();

    match lower.as_str() {
        "help" | "?" => return Command::Help,
        "quit" | "exit" | "q" => return Command::Send(AppEvent::Quit),
        _ => {}
    }

    match route {
        Route::MoodSelection => {
            if let Ok(mood) = lower.parse::<Mood>() {
                return Command::Send(AppEvent::SelectMood(mood));
            }
            match lower.as_str() {
                "face" | "webcam" => navigate(Route::FaceDetection),
                _ => unknown_or_unavailable(word, &lower),
            }
        }
        Route::FaceDetection => match lower.as_str() {
            "detect" => Command::Send(AppEvent::DetectMood),
            "skip" | "back" => Command::Send(AppEvent::SkipDetection),
            "dismiss" => Command::Send(AppEvent::DismissError),
            // Reload the view, the only way out of a camera error
            "retry" | "reload" => navigate(Route::FaceDetection),
            _ => unknown_or_unavailable(word, &lower),
        },
        Route::GeneratedPlaylist => match lower.as_str() {
            "back" => navigate(Route::resolve("/mood-detection")),
            "retry" | "face" => navigate(Route::FaceDetection),
            _ => unknown_or_unavailable(word, &lower),
        },
    }
}

fn navigate(route: Route) -> Command {
    Command::Send(AppEvent::Navigate { route, state: None })
}

fn unknown_or_unavailable(word: &str, lower: &str) -> Command {
    const KNOWN: &[&str] = &[
        "face", "webcam", "detect", "skip", "back", "retry", "reload", "dismiss",
    ];

    if KNOWN.contains(&lower) || lower.parse::<Mood>().is_ok() {
        Command::Unavailable(word.to_string())
    } else {
        Command::Unknown(word.to_string())
    }
}
