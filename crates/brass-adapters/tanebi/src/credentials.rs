//! Persisted login credentials.
//!
//! Each account keeps two rows, keyed by its QQ number:
//!
//! | Table | Payload |
//! |-------|---------|
//! | `tanebi.deviceInfo` | JSON of the client's device identity |
//! | `tanebi.keystore`   | JSON of the client's session secrets |
//!
//! Rows are written once, after the first successful QR login, and only read
//! afterwards. If only one row survives, it is reused and the other is
//! written after the next QR login.

use std::sync::Arc;

use brass_core::{AdapterError, AdapterResult, Database, Record};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::ProtocolClient;

/// Table holding device identities.
pub const DEVICE_INFO_TABLE: &str = "tanebi.deviceInfo";

/// Table holding keystores.
pub const KEYSTORE_TABLE: &str = "tanebi.keystore";

/// Credentials ready to hand to [`ProtocolClient::create`].
pub struct Credentials<C: ProtocolClient> {
    pub device_info: C::DeviceInfo,
    pub keystore: C::Keystore,
    /// No complete pair was stored; the account has to log in by QR code.
    pub first_use: bool,
}

/// Reads and writes the credential rows of one account.
pub struct CredentialStore {
    database: Arc<dyn Database>,
    uin: i64,
}

impl CredentialStore {
    pub fn new(database: Arc<dyn Database>, uin: i64) -> Self {
        Self { database, uin }
    }

    pub fn uin(&self) -> i64 {
        self.uin
    }

    /// Declares both tables.
    pub async fn prepare(&self) -> AdapterResult<()> {
        self.database.extend(DEVICE_INFO_TABLE).await?;
        self.database.extend(KEYSTORE_TABLE).await?;
        Ok(())
    }

    /// Loads stored credentials, filling a missing row with a fresh value.
    ///
    /// A row that exists but does not decode is an error; it is never
    /// silently replaced.
    pub async fn load<C: ProtocolClient>(&self) -> AdapterResult<Credentials<C>> {
        let device_row = self.database.get(DEVICE_INFO_TABLE, self.uin).await?;
        let keystore_row = self.database.get(KEYSTORE_TABLE, self.uin).await?;
        let first_use = device_row.is_none() || keystore_row.is_none();

        let device_info = match device_row {
            Some(row) => self.decode(DEVICE_INFO_TABLE, &row)?,
            None => C::new_device_info(),
        };
        let keystore = match keystore_row {
            Some(row) => self.decode(KEYSTORE_TABLE, &row)?,
            None => C::new_keystore(),
        };

        if first_use {
            debug!(uin = self.uin, "Stored credentials incomplete, QR login required");
        } else {
            debug!(uin = self.uin, "Loaded stored credentials");
        }
        Ok(Credentials {
            device_info,
            keystore,
            first_use,
        })
    }

    /// Stores the client's current device identity and keystore.
    ///
    /// Rows already present are kept; only missing ones are written.
    pub async fn save<C: ProtocolClient>(&self, client: &C) -> AdapterResult<()> {
        let device = self.encode(DEVICE_INFO_TABLE, &client.device_info())?;
        let keystore = self.encode(KEYSTORE_TABLE, &client.keystore())?;

        for (table, payload) in [(DEVICE_INFO_TABLE, device), (KEYSTORE_TABLE, keystore)] {
            if self.database.get(table, self.uin).await?.is_some() {
                debug!(uin = self.uin, table, "Credential row already stored");
                continue;
            }
            self.database
                .create(table, Record::new(self.uin, payload))
                .await?;
        }

        debug!(uin = self.uin, "Credentials saved");
        Ok(())
    }

    fn decode<T: DeserializeOwned>(&self, table: &str, record: &Record) -> AdapterResult<T> {
        serde_json::from_str(&record.payload).map_err(|e| AdapterError::Credential {
            table: table.to_string(),
            uin: self.uin,
            reason: e.to_string(),
        })
    }

    fn encode<T: Serialize>(&self, table: &str, value: &T) -> AdapterResult<String> {
        serde_json::to_string(value).map_err(|e| AdapterError::Credential {
            table: table.to_string(),
            uin: self.uin,
            reason: e.to_string(),
        })
    }
}
