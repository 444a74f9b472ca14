use std::sync::Arc;

use kanal::AsyncReceiver;
use mirror_core::DetectionWorkflow;
use mirror_types::AppEvent;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::EventSinks;
use crate::state::AppState;

/// A mounted face detection view and the tasks that live exactly as long as it
pub struct MountedDetection {
    pub workflow: Arc<DetectionWorkflow>,
    health_check: JoinHandle<()>,
    forwarder: JoinHandle<()>,
    cancel: CancellationToken,
}

impl MountedDetection {
    /// Stops the camera right away, even with a detection in flight
    pub async fn unmount(self) {
        self.workflow.unmount().await;
        self.cancel.cancel();
        self.health_check.abort();
        if let Err(e) = self.forwarder.await {
            tracing::warn!("Workflow event forwarder ended abnormally: {}", e);
        }
    }
}

pub async fn mount_face_detection(
    state: &Arc<AppState>,
    sinks: &EventSinks,
) -> anyhow::Result<MountedDetection> {
    let config = state.config.read().await.clone();

    let (workflow_tx, workflow_rx) = kanal::bounded_async(config.app_channel_capacity);
    let workflow = Arc::new(DetectionWorkflow::from_config(
        &config,
        state.camera.clone(),
        workflow_tx,
    ));

    let cancel = CancellationToken::new();
    let forwarder = tokio::spawn(forward_workflow_events(
        workflow_rx,
        sinks.clone(),
        cancel.child_token(),
    ));

    tracing::info!("Mounting face detection view ({})", state.camera.name());
    let health_check = workflow.mount().await;

    Ok(MountedDetection {
        workflow,
        health_check,
        forwarder,
        cancel,
    })
}

/// Status goes to the UI, navigation requests back into the event loop.
/// Stops with the view, so late events from a finished attempt go nowhere.
async fn forward_workflow_events(
    workflow_rx: AsyncReceiver<AppEvent>,
    sinks: EventSinks,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = workflow_rx.recv() => match event {
                Ok(event) => event,
                Err(_) => break,
            },
        };

        let sent = tokio::select! {
            _ = cancel.cancelled() => break,
            sent = forward(&sinks, event) => sent,
        };

        if let Err(e) = sent {
            tracing::debug!("Workflow event forwarder stopping: {}", e);
            break;
        }
    }
}

async fn forward(sinks: &EventSinks, event: AppEvent) -> Result<(), kanal::SendError> {
    match event {
        AppEvent::StatusUpdate(snapshot) => {
            sinks.app_to_ui.send(AppEvent::StatusUpdate(snapshot)).await
        }
        navigate @ AppEvent::Navigate { .. } => sinks.app_inbox.send(navigate).await,
        other => {
            tracing::debug!("Unexpected workflow event {:?}", other);
            Ok(())
        }
    }
}
