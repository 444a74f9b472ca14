pub mod commands;
pub mod events;
pub mod render;
pub mod state;

use std::io::Write;
use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use mirror_config::Config;
use mirror_types::AppEvent;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::commands::{Command, parse_command};
use crate::events::handle_events;
use crate::state::UiState;

/// Terminal front end on stdin/stdout
pub async fn ui_loop(
    config: Arc<Config>,
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    let input = BufReader::new(tokio::io::stdin());
    run(config, input, std::io::stdout(), app_to_ui_rx, ui_to_app_tx).await
}

/// Draw app events to `output` and turn `input` lines into app events.
///
/// Ends on [`AppEvent::Quit`] from the app or when the app side closes.
/// End of input sends a quit request.
pub async fn run<R, W>(
    config: Arc<Config>,
    input: R,
    mut output: W,
    app_to_ui_rx: AsyncReceiver<AppEvent>,
    ui_to_app_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut state = UiState::new();
    let mut lines = input.lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            event = app_to_ui_rx.recv() => {
                let Ok(event) = event else {
                    tracing::debug!("[UI] App channel closed");
                    break;
                };
                if handle_events(event, &mut state, &config, &mut output)?.is_break() {
                    break;
                }
            }
            line = lines.next_line(), if input_open => {
                let Some(line) = line? else {
                    input_open = false;
                    tracing::debug!("[UI] Input closed, requesting quit");
                    ui_to_app_tx.send(AppEvent::Quit).await?;
                    continue;
                };

                match parse_command(&line, state.route) {
                    Command::Send(event) => {
                        tracing::debug!("[UI] Sending {:?}", event);
                        ui_to_app_tx.send(event).await?;
                    }
                    Command::Help => write!(output, "{}", render::help(state.route))?,
                    Command::Unavailable(word) => {
                        writeln!(output, "'{word}' is not available here. Type 'help'.")?
                    }
                    Command::Unknown(word) => {
                        writeln!(output, "Unknown command '{word}'. Type 'help'.")?
                    }
                    Command::Empty => {}
                }
                output.flush()?;
            }
        }
    }

    Ok(())
}
