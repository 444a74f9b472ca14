use mirror_core::DetectOutcome;

use super::ViewHost;

/// Runs the attempt on its own task so the loop keeps serving navigation
/// (and unmount) while the request is in flight.
pub fn handle_detect_mood(host: &ViewHost) {
    let Some(detection) = &host.detection else {
        tracing::debug!("DetectMood outside the detection view, ignoring");
        return;
    };

    let workflow = detection.workflow.clone();
    tokio::spawn(async move {
        match workflow.detect_mood().await {
            DetectOutcome::Rejected => tracing::debug!("Duplicate detect request dropped"),
            DetectOutcome::Detected(result) => {
                tracing::debug!("Detect task finished with '{}'", result.mood())
            }
            DetectOutcome::Failed(e) => tracing::debug!("Detect task finished with error: {}", e),
        }
    });
}
