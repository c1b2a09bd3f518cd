//! Line commands read from stdin

use std::path::PathBuf;

use beectl_app::{DraftEdit, Message};

/// What a single stdin line asks for.
#[derive(Debug, Clone)]
pub enum ConsoleCommand {
    /// Forward to the engine
    Message(Message),

    /// Print a status summary
    Status,

    /// Print the current config
    Apps,

    /// Print the cached asset list
    Media,

    /// Print the URL of one asset
    Url(String),
}

pub const HELP: &str = "commands: status | apps | activate <id> | add | remove <id> | \
edit <id> | set <field> <value> | save | discard | media [refresh] | upload <path> | \
url <file> | ack | quit";

/// Parse one line of input. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "status" => ConsoleCommand::Status,
        "apps" | "config" => ConsoleCommand::Apps,
        "activate" => ConsoleCommand::Message(Message::SetActiveApp {
            app_id: required(verb, rest, "<id>")?,
        }),
        "add" => ConsoleCommand::Message(Message::AddApp),
        "remove" | "rm" => ConsoleCommand::Message(Message::RemoveApp {
            id: required(verb, rest, "<id>")?,
        }),
        "edit" => ConsoleCommand::Message(Message::OpenEditor {
            app_id: required(verb, rest, "<id>")?,
        }),
        "set" => {
            let (field, value) = match rest.split_once(char::is_whitespace) {
                Some((field, value)) => (field, value),
                None if !rest.is_empty() => (rest, ""),
                None => return Err("usage: set <field> <value>".to_string()),
            };
            let edit = DraftEdit::from_field(field, value).map_err(|e| e.to_string())?;
            ConsoleCommand::Message(Message::EditDraft(edit))
        }
        "save" => ConsoleCommand::Message(Message::SaveDraft),
        "discard" | "cancel" => ConsoleCommand::Message(Message::DiscardDraft),
        "media" => match rest {
            "" => ConsoleCommand::Media,
            "refresh" => ConsoleCommand::Message(Message::RefreshMedia),
            other => return Err(format!("unknown media option '{other}'")),
        },
        "upload" => ConsoleCommand::Message(Message::UploadAsset {
            path: PathBuf::from(required(verb, rest, "<path>")?),
        }),
        "url" => ConsoleCommand::Url(required(verb, rest, "<file>")?),
        "ack" => ConsoleCommand::Message(Message::AcknowledgeNotice),
        "quit" | "q" | "exit" => ConsoleCommand::Message(Message::Quit),
        "help" | "?" => return Err(HELP.to_string()),
        other => return Err(format!("unknown command '{other}'; {HELP}")),
    };

    Ok(Some(command))
}

fn required(verb: &str, rest: &str, what: &str) -> Result<String, String> {
    if rest.is_empty() {
        Err(format!("usage: {verb} {what}"))
    } else {
        Ok(rest.to_string())
    }
}
