use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Source tag used when the user picks a mood by hand
pub const MANUAL_SOURCE: &str = "manual";

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Request a view change, optionally carrying the result of the previous view
    Navigate {
        route: Route,
        state: Option<TransitionState>,
    },
    SelectMood(Mood),
    DetectMood,
    SkipDetection,
    DismissError,
    StatusUpdate(WorkflowSnapshot),
    ShowView {
        route: Route,
        state: Option<TransitionState>,
    },
    BackendReady,
    Quit,
}

/// Manually selectable moods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Angry,
    Surprised,
    Fearful,
    Disgusted,
}

impl Mood {
    pub const ALL: [Mood; 6] = [
        Mood::Happy,
        Mood::Fearful,
        Mood::Sad,
        Mood::Surprised,
        Mood::Angry,
        Mood::Disgusted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Surprised => "surprised",
            Mood::Fearful => "fearful",
            Mood::Disgusted => "disgusted",
        }
    }

    /// Capitalized label for buttons
    pub fn label(&self) -> &'static str {
        match self {
            Mood::Happy => "Happy",
            Mood::Sad => "Sad",
            Mood::Angry => "Angry",
            Mood::Surprised => "Surprised",
            Mood::Fearful => "Fearful",
            Mood::Disgusted => "Disgusted",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown mood: {0}")]
pub struct ParseMoodError(pub String);

impl FromStr for Mood {
    type Err = ParseMoodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| ParseMoodError(needle.to_string()))
    }
}

/// Outcome of a detection attempt or a manual selection.
///
/// Immutable once built. `mood` is free-form because the detection service
/// may return labels outside of [`Mood`] (e.g. `neutral`).
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    mood: String,
    confidence: Option<f64>,
    source: String,
}

impl DetectionResult {
    /// Returns `None` when `mood` is blank.
    pub fn new(
        mood: impl Into<String>,
        confidence: Option<f64>,
        source: impl Into<String>,
    ) -> Option<Self> {
        let mood = mood.into();
        if mood.trim().is_empty() {
            return None;
        }

        Some(Self {
            mood,
            confidence: confidence.filter(|c| c.is_finite() && (0.0..=1.0).contains(c)),
            source: source.into(),
        })
    }

    pub fn manual(mood: Mood) -> Self {
        Self {
            mood: mood.as_str().to_string(),
            confidence: None,
            source: MANUAL_SOURCE.to_string(),
        }
    }

    pub fn mood(&self) -> &str {
        &self.mood
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// State handed to the results view.
///
/// Every field is optional since the receiving view cannot know which producer ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionState {
    pub mood: Option<String>,
    pub confidence: Option<f64>,
    pub source: Option<String>,
}

impl TransitionState {
    pub fn mood_or_default(&self) -> &str {
        self.mood
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or("Unknown")
    }

    pub fn source_or_default(&self) -> &str {
        self.source
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
    }

    /// Confidence as a whole percentage, omitted when absent
    pub fn confidence_percent(&self) -> Option<u32> {
        self.confidence
            .filter(|c| c.is_finite())
            .map(|c| (c * 100.0).round().clamp(0.0, 100.0) as u32)
    }
}

impl From<DetectionResult> for TransitionState {
    fn from(result: DetectionResult) -> Self {
        Self {
            mood: Some(result.mood),
            confidence: result.confidence,
            source: Some(result.source),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Route {
    #[default]
    MoodSelection,
    FaceDetection,
    GeneratedPlaylist,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::MoodSelection => "/",
            Route::FaceDetection => "/face-detection",
            Route::GeneratedPlaylist => "/generated-playlist",
        }
    }

    /// Unknown paths fall back to the mood selection view
    pub fn resolve(path: &str) -> Self {
        match path.trim().trim_end_matches('/') {
            "/face-detection" | "face-detection" => Route::FaceDetection,
            "/generated-playlist" | "generated-playlist" => Route::GeneratedPlaylist,
            _ => Route::MoodSelection,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Phase of the detection view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WorkflowStatus {
    #[default]
    Idle,
    Starting,
    CameraOn,
    Detecting,
    Error,
    Detected(String),
}

impl WorkflowStatus {
    pub fn label(&self) -> String {
        match self {
            WorkflowStatus::Idle => "idle".to_string(),
            WorkflowStatus::Starting => "starting".to_string(),
            WorkflowStatus::CameraOn => "camera-on".to_string(),
            WorkflowStatus::Detecting => "detecting".to_string(),
            WorkflowStatus::Error => "error".to_string(),
            WorkflowStatus::Detected(mood) => format!("detected:{mood}"),
        }
    }

    pub fn message(&self) -> String {
        match self {
            WorkflowStatus::Idle => "Camera off".to_string(),
            WorkflowStatus::Starting => "Starting camera...".to_string(),
            WorkflowStatus::CameraOn => "Camera on".to_string(),
            WorkflowStatus::Detecting => "Detecting mood...".to_string(),
            WorkflowStatus::Error => "Error".to_string(),
            WorkflowStatus::Detected(mood) => format!("Detected: {mood}"),
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Reachability of the detection service, independent of [`WorkflowStatus`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ServiceHealth {
    #[default]
    Checking,
    Ok,
    Unreachable,
}

impl ServiceHealth {
    pub fn label(&self) -> &'static str {
        match self {
            ServiceHealth::Checking => "checking",
            ServiceHealth::Ok => "ok",
            ServiceHealth::Unreachable => "unreachable",
        }
    }

    pub fn message(&self, base_url: &str) -> String {
        match self {
            ServiceHealth::Checking => "Checking AI service...".to_string(),
            ServiceHealth::Ok => "AI service: OK".to_string(),
            ServiceHealth::Unreachable => {
                format!("AI service: NOT REACHABLE (start the detection service on {base_url})")
            }
        }
    }
}

impl fmt::Display for ServiceHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything the detection view shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkflowSnapshot {
    pub status: WorkflowStatus,
    pub health: ServiceHealth,
    pub error: Option<String>,
    /// A detection request is in flight
    pub loading: bool,
}
