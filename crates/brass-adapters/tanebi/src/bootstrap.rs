//! Client bootstrap: from configuration to a logged-in protocol client.
//!
//! ```text
//! sign.app_info() ──▶ credentials.load() ──▶ C::create(..) ──▶ slot.put(..)
//!                                                                  │
//!                                             add_listener(logger) ◀┘
//!                                                    │
//!                         first use ┌────────────────┴──────────────┐ stored
//!                                   ▼                               ▼
//!                     qr_code_login (QR → console)             fast_login
//!                                   │
//!                         credentials.save(client)
//! ```
//!
//! The logger learns the account number before login starts and again once
//! the login resolves, so messages arriving meanwhile get the right direction.
//!
//! The client is published to the [`ClientSlot`] as soon as it exists, so a
//! shutdown during a long QR wait (or after a failed login) still finds it and
//! disposes it.

use std::sync::Arc;

use brass_core::{AdapterError, AdapterResult};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::client::{ClientListener, ProtocolClient};
use crate::credentials::CredentialStore;
use crate::logger::EventLogger;
use crate::qrcode::QrCodeCell;
use crate::sign::SignService;

/// Holds the live client, if any.
pub struct ClientSlot<C> {
    client: Mutex<Option<Arc<C>>>,
}

impl<C> ClientSlot<C> {
    pub fn new() -> Self {
        Self {
            client: Mutex::new(None),
        }
    }

    pub fn put(&self, client: Arc<C>) {
        *self.client.lock() = Some(client);
    }

    pub fn get(&self) -> Option<Arc<C>> {
        self.client.lock().clone()
    }

    /// Removes the client; later calls return `None`.
    pub fn take(&self) -> Option<Arc<C>> {
        self.client.lock().take()
    }
}

impl<C> Default for ClientSlot<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// One login attempt for one account.
pub struct Bootstrap<'a, C> {
    pub sign: &'a dyn SignService,
    pub credentials: &'a CredentialStore,
    pub qr_code: &'a QrCodeCell,
    pub logger: Arc<EventLogger>,
    pub slot: &'a ClientSlot<C>,
}

impl<C: ProtocolClient> Bootstrap<'_, C> {
    /// Creates the client and logs it in.
    pub async fn run(self) -> AdapterResult<Arc<C>> {
        let app_info = self
            .sign
            .app_info()
            .await
            .map_err(|e| AdapterError::sign(e.to_string()))?;

        let creds = self.credentials.load::<C>().await?;

        let client = C::create(
            app_info,
            creds.device_info,
            creds.keystore,
            self.sign.provider(),
        )
        .await
        .map_err(|e| AdapterError::login(format!("failed to create client: {e}")))?;
        let client = Arc::new(client);
        self.slot.put(Arc::clone(&client));

        self.logger.set_self_uin(self.credentials.uin());
        client.add_listener(Arc::clone(&self.logger) as Arc<dyn ClientListener>);

        if creds.first_use {
            self.qr_login(&client).await?;
            self.logger.set_self_uin(client.uin());
            self.credentials.save(client.as_ref()).await?;
        } else {
            client.fast_login().await.map_err(|e| {
                warn!(uin = self.credentials.uin(), "Fast login failed: {e}");
                AdapterError::login(e.to_string())
            })?;
            self.logger.set_self_uin(client.uin());
        }

        info!(uin = client.uin(), "Logged in");
        Ok(client)
    }

    async fn qr_login(&self, client: &C) -> AdapterResult<()> {
        let _guard = self.qr_code.guard();
        let cell = self.qr_code.clone();

        client
            .qr_code_login(Box::new(move |url, png| {
                info!("Scan the QR code with the QQ mobile app to log in");
                info!("If the console is unavailable, open this URL and scan it instead: {url}");
                cell.set(png);
            }))
            .await
            .map_err(|e| AdapterError::login(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientEvent, GroupMember};
    use crate::config::LoggingToggles;
    use crate::credentials::{DEVICE_INFO_TABLE, KEYSTORE_TABLE};
    use crate::testing::{
        LogCapture, MockCalls, MockClient, MockScript, MockSign, install, test_group,
    };
    use brass_core::{Console, Database, MemoryDatabase, Record};

    struct Harness {
        database: Arc<MemoryDatabase>,
        credentials: CredentialStore,
        console: Arc<Console>,
        qr_code: QrCodeCell,
        slot: ClientSlot<MockClient>,
        logger: Arc<EventLogger>,
    }

    impl Harness {
        async fn new() -> Self {
            let database = Arc::new(MemoryDatabase::new());
            let credentials =
                CredentialStore::new(Arc::clone(&database) as Arc<dyn Database>, 10001);
            credentials.prepare().await.unwrap();
            let console = Arc::new(Console::new());
            Self {
                database,
                credentials,
                qr_code: QrCodeCell::new(Arc::clone(&console)),
                console,
                slot: ClientSlot::new(),
                logger: Arc::new(EventLogger::new(LoggingToggles::default())),
            }
        }

        async fn run(&self, sign: &MockSign) -> AdapterResult<Arc<MockClient>> {
            Bootstrap {
                sign,
                credentials: &self.credentials,
                qr_code: &self.qr_code,
                logger: Arc::clone(&self.logger),
                slot: &self.slot,
            }
            .run()
            .await
        }

        async fn store_credentials(&self) {
            self.database
                .create(DEVICE_INFO_TABLE, Record::new(10001, r#"{"guid":"stored"}"#))
                .await
                .unwrap();
            self.database
                .create(KEYSTORE_TABLE, Record::new(10001, r#"{"session":"abc"}"#))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_first_use_logs_in_by_qr_and_saves() {
        let harness = Harness::new().await;
        let calls = install(MockScript::default());
        let mut updates = harness.console.subscribe();

        let client = harness
            .run(&MockSign::default())
            .await
            .unwrap();

        assert_eq!(MockCalls::count(&calls.qr_logins), 1);
        assert_eq!(MockCalls::count(&calls.fast_logins), 0);
        assert_eq!(client.uin(), 10001);

        let devices = harness.database.records(DEVICE_INFO_TABLE);
        let keystores = harness.database.records(KEYSTORE_TABLE);
        assert_eq!(devices, vec![Record::new(10001, r#"{"guid":"fresh"}"#)]);
        assert_eq!(keystores, vec![Record::new(10001, r#"{"session":"qr-session"}"#)]);

        // Shown, then withdrawn.
        assert!(!harness.qr_code.is_set());
        assert!(updates.try_recv().is_ok());
        assert!(updates.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_stored_credentials_use_fast_login() {
        let harness = Harness::new().await;
        harness.store_credentials().await;
        let calls = install(MockScript::default());
        let mut updates = harness.console.subscribe();

        harness
            .run(&MockSign::default())
            .await
            .unwrap();

        assert_eq!(MockCalls::count(&calls.fast_logins), 1);
        assert_eq!(MockCalls::count(&calls.qr_logins), 0);
        assert_eq!(
            calls.device_seen.lock().as_ref().map(|d| d.guid.as_str()),
            Some("stored")
        );
        assert_eq!(harness.database.records(DEVICE_INFO_TABLE).len(), 1);
        assert!(updates.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_qr_login_clears_code_and_keeps_client() {
        let harness = Harness::new().await;
        let calls = install(MockScript {
            fail_login: true,
            ..Default::default()
        });

        let err = harness
            .run(&MockSign::default())
            .await
            .err()
            .unwrap();

        assert!(matches!(err, AdapterError::Login(_)));
        assert!(!harness.qr_code.is_set());
        assert!(harness.database.records(KEYSTORE_TABLE).is_empty());
        assert!(harness.slot.get().is_some());
        assert_eq!(MockCalls::count(&calls.created), 1);
    }

    #[tokio::test]
    async fn test_unreachable_sign_service_creates_nothing() {
        let harness = Harness::new().await;
        let calls = install(MockScript::default());

        let err = harness
            .run(&MockSign { unreachable: true })
            .await
            .err()
            .unwrap();

        assert!(matches!(err, AdapterError::Sign(_)));
        assert_eq!(MockCalls::count(&calls.created), 0);
        assert!(harness.slot.get().is_none());
    }

    #[tokio::test]
    async fn test_malformed_credentials_create_nothing() {
        let harness = Harness::new().await;
        harness
            .database
            .create(DEVICE_INFO_TABLE, Record::new(10001, "{"))
            .await
            .unwrap();
        harness
            .database
            .create(KEYSTORE_TABLE, Record::new(10001, r#"{"session":"abc"}"#))
            .await
            .unwrap();
        let calls = install(MockScript::default());

        let err = harness
            .run(&MockSign::default())
            .await
            .err()
            .unwrap();

        assert!(matches!(err, AdapterError::Credential { .. }));
        assert_eq!(MockCalls::count(&calls.created), 0);
    }

    fn own_message() -> ClientEvent {
        ClientEvent::GroupMessage {
            group: test_group(),
            sender: GroupMember {
                uin: 10001,
                nickname: "Me".into(),
                ..Default::default()
            },
            preview: "ping".into(),
        }
    }

    #[tokio::test]
    async fn test_logger_receives_events() {
        let harness = Harness::new().await;
        harness.store_credentials().await;
        install(MockScript::default());
        let capture = LogCapture::default();
        let _default = tracing::subscriber::set_default(capture.subscriber());

        let client = harness.run(&MockSign::default()).await.unwrap();
        client.emit(&own_message());

        assert!(capture.contents().contains("-> [Test (123)] [Me (10001)] ping"));
        assert_eq!(harness.logger.self_uin(), 10001);
    }

    #[tokio::test]
    async fn test_messages_during_login_know_the_account() {
        let harness = Harness::new().await;
        harness.store_credentials().await;
        install(MockScript {
            login_events: vec![own_message()],
            ..Default::default()
        });
        let capture = LogCapture::default();
        let _default = tracing::subscriber::set_default(capture.subscriber());

        harness.run(&MockSign::default()).await.unwrap();

        let logs = capture.contents();
        assert!(logs.contains("-> [Test (123)] [Me (10001)] ping"), "{logs}");
        assert!(!logs.contains("<- [Test (123)]"));
    }

    #[test]
    fn test_slot_take_is_once() {
        let slot = ClientSlot::new();
        slot.put(Arc::new(5));
        assert_eq!(slot.get().as_deref(), Some(&5));
        assert_eq!(slot.take().as_deref(), Some(&5));
        assert!(slot.take().is_none());
    }
}
