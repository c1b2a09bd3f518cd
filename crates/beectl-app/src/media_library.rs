//! Last-known asset list and upload bookkeeping.

use std::time::Duration;

use beectl_core::prelude::*;

/// Default pause between a finished upload and the follow-up re-list.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct MediaLibrary {
    assets: Vec<String>,
    uploading: bool,
    refresh_delay: Duration,
}

impl Default for MediaLibrary {
    fn default() -> Self {
        Self::new(DEFAULT_REFRESH_DELAY)
    }
}

impl MediaLibrary {
    pub fn new(refresh_delay: Duration) -> Self {
        Self {
            assets: Vec::new(),
            uploading: false,
            refresh_delay,
        }
    }

    /// Asset filenames in device order.
    pub fn assets(&self) -> &[String] {
        &self.assets
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.assets.iter().any(|a| a == file_name)
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn refresh_delay(&self) -> Duration {
        self.refresh_delay
    }

    /// A successful listing replaces the whole list.
    pub fn replace(&mut self, assets: Vec<String>) {
        debug!("Media library: {} asset(s)", assets.len());
        self.assets = assets;
    }

    /// A failed listing keeps whatever we had.
    pub fn list_failed(&mut self, error: &str) {
        warn!(
            "Media library: listing failed, keeping {} known asset(s): {}",
            self.assets.len(),
            error
        );
    }

    pub fn begin_upload(&mut self) {
        self.uploading = true;
    }

    /// Returns how long to wait before re-listing.
    pub fn upload_succeeded(&mut self) -> Duration {
        self.uploading = false;
        self.refresh_delay
    }

    pub fn upload_failed(&mut self) {
        self.uploading = false;
    }
}
