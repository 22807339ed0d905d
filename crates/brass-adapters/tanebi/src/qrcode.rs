//! Login QR code published to the console.
//!
//! While a first-time login waits for the phone to scan, the latest code image
//! sits in a [`QrCodeCell`]. The console reads it through [`QrCodeService`]
//! (`"tanebi.qrcode"`) as a `data:` URI, and is told to re-read on every
//! change.
//!
//! ```text
//! unset ──set(png)──▶ set ──clear()──▶ unset
//!          refresh           refresh
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use brass_core::{Console, DataService};
use parking_lot::RwLock;
use serde_json::Value;

/// Console service name of the QR code.
pub const QR_CODE_SERVICE: &str = "tanebi.qrcode";

/// Shared slot holding the current login QR code.
#[derive(Clone)]
pub struct QrCodeCell {
    png: Arc<RwLock<Option<Vec<u8>>>>,
    console: Arc<Console>,
}

impl QrCodeCell {
    /// Creates an empty cell that notifies `console`.
    pub fn new(console: Arc<Console>) -> Self {
        Self {
            png: Arc::new(RwLock::new(None)),
            console,
        }
    }

    /// Publishes a new code image.
    pub fn set(&self, png: &[u8]) {
        *self.png.write() = Some(png.to_vec());
        self.console.refresh(QR_CODE_SERVICE);
    }

    /// Withdraws the code image.
    pub fn clear(&self) {
        *self.png.write() = None;
        self.console.refresh(QR_CODE_SERVICE);
    }

    /// Returns whether a code is currently shown.
    pub fn is_set(&self) -> bool {
        self.png.read().is_some()
    }

    /// Returns a copy of the current code image.
    pub fn png(&self) -> Option<Vec<u8>> {
        self.png.read().clone()
    }

    /// Returns the current code as `data:image/png;base64,...`.
    pub fn data_uri(&self) -> Option<String> {
        self.png
            .read()
            .as_deref()
            .map(|png| format!("data:image/png;base64,{}", STANDARD.encode(png)))
    }

    /// Returns a guard that clears the cell when dropped.
    ///
    /// Held across a login attempt so the code disappears however it ends,
    /// including when the attempt is cancelled.
    pub fn guard(&self) -> QrCodeGuard {
        QrCodeGuard { cell: self.clone() }
    }
}

/// Clears its [`QrCodeCell`] on drop.
pub struct QrCodeGuard {
    cell: QrCodeCell,
}

impl Drop for QrCodeGuard {
    fn drop(&mut self) {
        self.cell.clear();
    }
}

/// Console view of a [`QrCodeCell`].
pub struct QrCodeService {
    cell: QrCodeCell,
}

impl QrCodeService {
    pub fn new(cell: QrCodeCell) -> Self {
        Self { cell }
    }

    /// Returns the current code as a data URI, or `None` if no login is pending.
    pub fn current(&self) -> Option<String> {
        self.cell.data_uri()
    }
}

#[async_trait]
impl DataService for QrCodeService {
    async fn get(&self) -> Value {
        self.current().map(Value::String).unwrap_or(Value::Null)
    }
}
