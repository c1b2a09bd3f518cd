//! Action handlers: UpdateAction dispatch and background task spawning

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use beectl_device::{ChannelHandle, MediaStore};

use crate::message::Message;
use crate::UpdateAction;

/// Everything a spawned action needs to talk to the outside world.
#[derive(Clone)]
pub struct ActionContext<S> {
    pub msg_tx: mpsc::Sender<Message>,
    pub channel: ChannelHandle,
    pub media: S,
}

/// Execute an action, spawning a background task where I/O is involved
pub fn handle_action<S>(action: UpdateAction, ctx: &ActionContext<S>)
where
    S: MediaStore + Clone + Send + Sync + 'static,
{
    match action {
        UpdateAction::SendCommand(command) => {
            // Fire-and-forget; dropped inside the handle when not open.
            ctx.channel.send(command);
        }

        UpdateAction::ListMedia { delay } => {
            spawn_media_list(ctx.media.clone(), ctx.msg_tx.clone(), delay);
        }

        UpdateAction::UploadAsset { path } => {
            spawn_media_upload(ctx.media.clone(), ctx.msg_tx.clone(), path);
        }
    }
}

fn spawn_media_list<S>(store: S, msg_tx: mpsc::Sender<Message>, delay: Duration)
where
    S: MediaStore + Send + Sync + 'static,
{
    tokio::spawn(async move {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let msg = match store.list().await {
            Ok(assets) => Message::MediaListed { assets },
            Err(e) => Message::MediaListFailed {
                error: e.to_string(),
            },
        };
        if msg_tx.send(msg).await.is_err() {
            debug!("Engine gone before media list completed");
        }
    });
}

fn spawn_media_upload<S>(store: S, msg_tx: mpsc::Sender<Message>, path: PathBuf)
where
    S: MediaStore + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let file_name = upload_file_name(&path);

        let result = match tokio::fs::read(&path).await {
            Ok(contents) => store.upload(&file_name, contents).await.map_err(|e| e.to_string()),
            Err(e) => {
                warn!("Cannot read {:?} for upload: {}", path, e);
                Err(format!("cannot read {}: {e}", path.display()))
            }
        };

        let msg = match result {
            Ok(()) => Message::UploadCompleted { file_name },
            Err(error) => Message::UploadFailed { file_name, error },
        };
        if msg_tx.send(msg).await.is_err() {
            debug!("Engine gone before upload completed");
        }
    });
}

/// Name the device stores an upload under: the final path component.
pub fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
