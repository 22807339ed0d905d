//! Tanebi adapter for the Brass host.
//!
//! # Configuration-Based Usage (Recommended)
//!
//! ```toml
//! [adapters.tanebi]
//! uin = 10001
//! ```
//!
//! ```rust,ignore
//! use brass_runtime::BrassRuntime;
//! use brass_adapter_tanebi::TanebiAdapter;
//!
//! let runtime = BrassRuntime::new();
//! runtime.register_adapter::<TanebiAdapter<MyClient>>().await?;
//! runtime.run().await?;
//! ```
//!
//! # Programmatic Usage
//!
//! ```rust,ignore
//! let adapter = TanebiAdapter::<MyClient>::with_sign_service(config, Arc::new(my_signer));
//! runtime.add_adapter("tanebi", adapter).await?;
//! ```
//!
//! The adapter is generic over the [`ProtocolClient`] that actually speaks
//! the QQ protocol.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use brass_core::{Adapter, AdapterContext, AdapterError, AdapterResult, ConfigurableAdapter};
use tracing::{debug, info, warn};

use crate::bootstrap::{Bootstrap, ClientSlot};
use crate::bot::TanebiBot;
use crate::client::ProtocolClient;
use crate::config::TanebiConfig;
use crate::credentials::CredentialStore;
use crate::logger::EventLogger;
use crate::qrcode::{QR_CODE_SERVICE, QrCodeCell, QrCodeService};
use crate::sign::{SignService, UrlSignService};

/// The tanebi adapter.
///
/// Brings one QQ account online per instance.
pub struct TanebiAdapter<C> {
    config: TanebiConfig,
    sign: Arc<dyn SignService>,
    client: ClientSlot<C>,
    logger: Arc<EventLogger>,
    qr_code: OnceLock<QrCodeCell>,
}

impl<C: ProtocolClient> TanebiAdapter<C> {
    /// Creates an adapter that signs through `config.sign_api_url`.
    pub fn new(config: TanebiConfig) -> AdapterResult<Arc<Self>> {
        let sign = UrlSignService::new(config.sign_api_url.clone())
            .map_err(|e| AdapterError::sign(e.to_string()))?;
        Ok(Self::with_sign_service(config, Arc::new(sign)))
    }

    /// Creates an adapter with a custom signing service.
    pub fn with_sign_service(config: TanebiConfig, sign: Arc<dyn SignService>) -> Arc<Self> {
        Arc::new(Self {
            logger: Arc::new(EventLogger::new(config.logging)),
            config,
            sign,
            client: ClientSlot::new(),
            qr_code: OnceLock::new(),
        })
    }

    /// Returns the adapter configuration.
    pub fn config(&self) -> &TanebiConfig {
        &self.config
    }

    /// Returns the live client, if one has been created.
    pub fn client(&self) -> Option<Arc<C>> {
        self.client.get()
    }

    /// Returns the login QR code cell once the adapter has started.
    pub fn qr_code(&self) -> Option<&QrCodeCell> {
        self.qr_code.get()
    }
}

#[async_trait]
impl<C: ProtocolClient> Adapter for TanebiAdapter<C> {
    fn name() -> &'static str {
        "tanebi"
    }

    async fn on_start(&self, ctx: &mut AdapterContext) -> AdapterResult<()> {
        let qr_code = self
            .qr_code
            .get_or_init(|| QrCodeCell::new(Arc::clone(ctx.console())));
        ctx.console().add_service(
            QR_CODE_SERVICE,
            Arc::new(QrCodeService::new(qr_code.clone())),
        );

        if self.config.uin == 0 {
            warn!("No uin configured for tanebi; credentials will be stored under 0");
        }

        let credentials = CredentialStore::new(Arc::clone(ctx.database()), self.config.uin);
        credentials.prepare().await?;

        info!(uin = self.config.uin, sign = %self.config.sign_api_url, "Starting tanebi client");

        let client = Bootstrap {
            sign: self.sign.as_ref(),
            credentials: &credentials,
            qr_code,
            logger: Arc::clone(&self.logger),
            slot: &self.client,
        }
        .run()
        .await?;

        let bot = Arc::new(TanebiBot::new(client));
        ctx.bot_manager().register(Self::name(), bot).await?;
        Ok(())
    }

    async fn on_shutdown(&self, ctx: &mut AdapterContext) -> AdapterResult<()> {
        let Some(client) = self.client.take() else {
            debug!("No tanebi client to dispose");
            return Ok(());
        };

        let bot_id = client.uin().to_string();
        ctx.bot_manager().unregister(&bot_id).await;
        ctx.console().remove_service(QR_CODE_SERVICE);

        client
            .dispose()
            .await
            .map_err(|e| AdapterError::internal(format!("failed to dispose client: {e}")))?;
        info!(uin = client.uin(), "Tanebi client disposed");
        Ok(())
    }
}

impl<C: ProtocolClient> ConfigurableAdapter for TanebiAdapter<C> {
    type Config = TanebiConfig;

    fn from_config(config: Self::Config) -> AdapterResult<Arc<Self>> {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{DEVICE_INFO_TABLE, KEYSTORE_TABLE};
    use crate::testing::{MockCalls, MockClient, MockScript, MockSign, install};
    use brass_core::{BotManager, Console, Database, MemoryDatabase, Record};
    use serde_json::Value;

    struct Host {
        database: Arc<MemoryDatabase>,
        console: Arc<Console>,
        bots: Arc<BotManager>,
        ctx: AdapterContext,
    }

    impl Host {
        fn new() -> Self {
            let database = Arc::new(MemoryDatabase::new());
            let console = Arc::new(Console::new());
            let bots = Arc::new(BotManager::new());
            let ctx = AdapterContext::new(
                Arc::clone(&database) as Arc<dyn Database>,
                Arc::clone(&console),
                Arc::clone(&bots),
            );
            Self {
                database,
                console,
                bots,
                ctx,
            }
        }
    }

    fn adapter(sign: MockSign) -> Arc<TanebiAdapter<MockClient>> {
        let config = TanebiConfig {
            uin: 10001,
            ..Default::default()
        };
        TanebiAdapter::with_sign_service(config, Arc::new(sign))
    }

    #[tokio::test]
    async fn test_start_registers_bot_and_saves_credentials() {
        let mut host = Host::new();
        let calls = install(MockScript::default());
        let adapter = adapter(MockSign::default());

        adapter.on_start(&mut host.ctx).await.unwrap();

        assert_eq!(MockCalls::count(&calls.qr_logins), 1);
        assert!(host.bots.get_bot("10001").await.is_some());
        assert_eq!(host.bots.bots_of("tanebi").await, vec!["10001"]);
        assert_eq!(host.database.records(DEVICE_INFO_TABLE).len(), 1);
        assert_eq!(host.database.records(KEYSTORE_TABLE).len(), 1);
        assert_eq!(host.console.get(QR_CODE_SERVICE).await, Some(Value::Null));
    }

    #[tokio::test]
    async fn test_restart_with_stored_credentials_uses_fast_login() {
        let mut host = Host::new();
        host.database.extend(DEVICE_INFO_TABLE).await.unwrap();
        host.database.extend(KEYSTORE_TABLE).await.unwrap();
        host.database
            .create(DEVICE_INFO_TABLE, Record::new(10001, r#"{"guid":"stored"}"#))
            .await
            .unwrap();
        host.database
            .create(KEYSTORE_TABLE, Record::new(10001, r#"{"session":"abc"}"#))
            .await
            .unwrap();
        let calls = install(MockScript::default());

        adapter(MockSign::default())
            .on_start(&mut host.ctx)
            .await
            .unwrap();

        assert_eq!(MockCalls::count(&calls.fast_logins), 1);
        assert_eq!(MockCalls::count(&calls.qr_logins), 0);
        assert_eq!(host.database.records(KEYSTORE_TABLE).len(), 1);
    }

    #[tokio::test]
    async fn test_lone_device_row_is_completed_by_qr_login() {
        let mut host = Host::new();
        host.database.extend(DEVICE_INFO_TABLE).await.unwrap();
        host.database
            .create(DEVICE_INFO_TABLE, Record::new(10001, r#"{"guid":"stored"}"#))
            .await
            .unwrap();
        let calls = install(MockScript::default());

        adapter(MockSign::default())
            .on_start(&mut host.ctx)
            .await
            .unwrap();

        assert_eq!(MockCalls::count(&calls.qr_logins), 1);
        assert_eq!(
            calls.device_seen.lock().as_ref().map(|d| d.guid.as_str()),
            Some("stored")
        );
        assert_eq!(
            host.database.records(DEVICE_INFO_TABLE),
            vec![Record::new(10001, r#"{"guid":"stored"}"#)]
        );
        assert_eq!(
            host.database.records(KEYSTORE_TABLE),
            vec![Record::new(10001, r#"{"session":"qr-session"}"#)]
        );

        // The next start resumes without scanning again.
        let mut restarted = Host::new();
        for table in [DEVICE_INFO_TABLE, KEYSTORE_TABLE] {
            restarted.database.extend(table).await.unwrap();
            for record in host.database.records(table) {
                restarted.database.create(table, record).await.unwrap();
            }
        }
        let calls = install(MockScript::default());
        adapter(MockSign::default())
            .on_start(&mut restarted.ctx)
            .await
            .unwrap();
        assert_eq!(MockCalls::count(&calls.qr_logins), 0);
        assert_eq!(MockCalls::count(&calls.fast_logins), 1);
    }

    #[tokio::test]
    async fn test_shutdown_after_failed_login_disposes_once() {
        let mut host = Host::new();
        let calls = install(MockScript {
            fail_login: true,
            ..Default::default()
        });
        let adapter = adapter(MockSign::default());

        let err = adapter.on_start(&mut host.ctx).await.unwrap_err();
        assert!(matches!(err, AdapterError::Login(_)));
        assert!(host.bots.is_empty().await);
        assert!(adapter.client().is_some());
        assert!(!adapter.qr_code().unwrap().is_set());

        adapter.on_shutdown(&mut host.ctx).await.unwrap();
        adapter.on_shutdown(&mut host.ctx).await.unwrap();
        assert_eq!(MockCalls::count(&calls.disposes), 1);
        assert!(adapter.client().is_none());
    }

    #[tokio::test]
    async fn test_shutdown_unregisters_bot() {
        let mut host = Host::new();
        let calls = install(MockScript::default());
        let adapter = adapter(MockSign::default());

        adapter.on_start(&mut host.ctx).await.unwrap();
        adapter.on_shutdown(&mut host.ctx).await.unwrap();

        assert!(host.bots.is_empty().await);
        assert!(!host.console.has_service(QR_CODE_SERVICE));
        assert_eq!(MockCalls::count(&calls.disposes), 1);
    }

    #[tokio::test]
    async fn test_sign_failure_leaves_nothing_to_dispose() {
        let mut host = Host::new();
        let calls = install(MockScript::default());
        let adapter = adapter(MockSign { unreachable: true });

        let err = adapter.on_start(&mut host.ctx).await.unwrap_err();
        assert!(matches!(err, AdapterError::Sign(_)));

        adapter.on_shutdown(&mut host.ctx).await.unwrap();
        assert_eq!(MockCalls::count(&calls.created), 0);
        assert_eq!(MockCalls::count(&calls.disposes), 0);
    }

    #[test]
    fn test_from_config() {
        let adapter = TanebiAdapter::<MockClient>::from_config(TanebiConfig::default()).unwrap();
        assert_eq!(adapter.config().uin, 0);
        assert_eq!(<TanebiAdapter<MockClient> as Adapter>::name(), "tanebi");
    }
}
