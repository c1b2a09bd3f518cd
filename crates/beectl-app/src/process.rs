//! Message processing: run the update function and dispatch its actions

use beectl_device::MediaStore;

use crate::actions::{handle_action, ActionContext};
use crate::handler;
use crate::message::Message;
use crate::state::AppState;

/// Process a message through the TEA update function, following any
/// chained messages until none remain.
pub fn process_message<S>(state: &mut AppState, message: Message, ctx: &ActionContext<S>)
where
    S: MediaStore + Clone + Send + Sync + 'static,
{
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m);

        if let Some(action) = result.action {
            handle_action(action, ctx);
        }

        msg = result.message;
    }
}
