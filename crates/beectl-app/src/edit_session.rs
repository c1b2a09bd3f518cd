//! Edit session: at most one detached draft of an app entry.
//!
//! The draft is a by-value copy. Edits touch only the draft; nothing reaches
//! the device until [`EditSession::commit`] hands back an `updateApp` command.
//! While a draft is open, every device snapshot replaces it wholesale (see
//! [`crate::reconciler`]), so uncommitted edits can be lost.

use beectl_core::prelude::*;
use beectl_core::{
    epoch_to_local_display, local_display_to_epoch, AppEntry, AppType, DeviceConfig, HexColor,
    Watchface,
};
use beectl_device::DeviceCommand;

/// A single-field change to the open draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftEdit {
    Name(String),
    Type(AppType),
    Watchface(Watchface),
    /// Local wall-clock `YYYY-MM-DDTHH:MM[:SS]`. Empty clears the timestamp.
    TargetTime(String),
    /// Asset filename. `None` or an empty name means no background.
    Background(Option<String>),
    /// `#rrggbb`
    BaseColor(String),
    /// `#rrggbb`
    AccentColor(String),
    Enabled(bool),
}

impl DraftEdit {
    /// Build an edit from a field name and a raw value, as typed by a user.
    ///
    /// Field names: `name`, `type`, `watchface`, `time`, `background`,
    /// `base-color`, `accent-color`, `enabled`.
    pub fn from_field(field: &str, value: &str) -> Result<Self> {
        let value = value.trim();
        let edit = match field.trim().to_ascii_lowercase().as_str() {
            "name" => DraftEdit::Name(value.to_string()),
            "type" => DraftEdit::Type(value.parse()?),
            "watchface" | "face" => DraftEdit::Watchface(value.parse()?),
            "time" | "target" | "timestamp" => DraftEdit::TargetTime(value.to_string()),
            "background" | "bg" => {
                let name = match value {
                    "" | "none" | "-" => None,
                    name => Some(name.to_string()),
                };
                DraftEdit::Background(name)
            }
            "base-color" | "base" => DraftEdit::BaseColor(value.to_string()),
            "accent-color" | "accent" => DraftEdit::AccentColor(value.to_string()),
            "enabled" => DraftEdit::Enabled(parse_flag(value)?),
            other => return Err(Error::invalid_edit(format!("unknown field '{other}'"))),
        };
        Ok(edit)
    }

    pub fn field(&self) -> &'static str {
        match self {
            DraftEdit::Name(_) => "name",
            DraftEdit::Type(_) => "type",
            DraftEdit::Watchface(_) => "watchface",
            DraftEdit::TargetTime(_) => "time",
            DraftEdit::Background(_) => "background",
            DraftEdit::BaseColor(_) => "base-color",
            DraftEdit::AccentColor(_) => "accent-color",
            DraftEdit::Enabled(_) => "enabled",
        }
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(Error::invalid_edit(format!(
            "'{other}' is not a boolean (use on/off)"
        ))),
    }
}

/// What a snapshot did to the open draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutcome {
    /// No draft was open.
    None,
    /// The draft was replaced by the device's copy of the same entry.
    Refreshed,
    /// The entry disappeared from the device; the draft is gone.
    Closed,
}

/// Holder for the single optional draft.
#[derive(Debug, Clone, Default)]
pub struct EditSession {
    draft: Option<AppEntry>,
}

impl EditSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `app_id`, replacing any open draft.
    ///
    /// Returns `false` and leaves the session untouched if there is no config
    /// yet or the id is unknown.
    pub fn open(&mut self, config: Option<&DeviceConfig>, app_id: &str) -> bool {
        match config.and_then(|c| c.find_app(app_id)) {
            Some(entry) => {
                debug!("Editing app '{}'", app_id);
                self.draft = Some(entry.clone());
                true
            }
            None => false,
        }
    }

    pub fn draft(&self) -> Option<&AppEntry> {
        self.draft.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.draft.is_some()
    }

    pub fn draft_id(&self) -> Option<&str> {
        self.draft.as_ref().map(|d| d.id.as_str())
    }

    /// Apply one field change to the draft.
    pub fn apply(&mut self, edit: DraftEdit) -> Result<()> {
        let draft = self.draft.as_mut().ok_or(Error::NoDraft)?;

        match edit {
            DraftEdit::Name(name) => draft.name = name,
            DraftEdit::Type(app_type) => draft.app_type = app_type,
            DraftEdit::Watchface(watchface) => draft.watchface = watchface,
            DraftEdit::TargetTime(input) => {
                draft.timestamp = if input.trim().is_empty() {
                    None
                } else {
                    Some(local_display_to_epoch(&input)?)
                };
            }
            DraftEdit::Background(name) => {
                draft.background = name.filter(|n| !n.trim().is_empty());
            }
            DraftEdit::BaseColor(input) => draft.base_color = Some(HexColor::parse(&input)?),
            DraftEdit::AccentColor(input) => draft.accent_color = Some(HexColor::parse(&input)?),
            DraftEdit::Enabled(enabled) => draft.enabled = enabled,
        }
        Ok(())
    }

    /// Close the draft and turn it into an `updateApp` command.
    ///
    /// The draft is gone as soon as this returns; the device's next push is
    /// the only confirmation that the update landed.
    pub fn commit(&mut self) -> Option<DeviceCommand> {
        self.draft.take().map(DeviceCommand::UpdateApp)
    }

    /// Close the draft without sending anything. Returns whether one was open.
    pub fn discard(&mut self) -> bool {
        self.draft.take().is_some()
    }

    /// The draft timestamp as a local display string, `""` when unset.
    pub fn target_time_display(&self) -> String {
        self.draft
            .as_ref()
            .map(|d| epoch_to_local_display(d.timestamp))
            .unwrap_or_default()
    }

    /// Device-wins merge against a fresh config.
    pub(crate) fn rebase(&mut self, config: &DeviceConfig) -> DraftOutcome {
        let Some(draft) = self.draft.as_mut() else {
            return DraftOutcome::None;
        };

        match config.find_app(&draft.id) {
            Some(entry) => {
                if *draft != *entry {
                    debug!("Draft '{}' replaced by device copy", draft.id);
                }
                *draft = entry.clone();
                DraftOutcome::Refreshed
            }
            None => {
                info!("App '{}' was removed on the device; closing editor", draft.id);
                self.draft = None;
                DraftOutcome::Closed
            }
        }
    }
}
