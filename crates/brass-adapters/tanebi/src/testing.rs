//! In-memory protocol client and signing service for tests.
//!
//! [`ProtocolClient::create`] is an associated function, so a test scripts
//! the next client through [`install`] before starting the adapter. Scripts
//! are thread-local; `#[tokio::test]` runs each test on its own thread.

use std::cell::RefCell;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::MakeWriter;

use crate::client::{
    AppInfo, ClientError, ClientEvent, ClientListener, ClientResult, Friend, Group, GroupMember,
    GroupMemberPermission, ProtocolClient, QrCodeCallback, SignProvider, SignResult,
};
use crate::sign::SignService;

pub const MOCK_UIN: i64 = 10001;
pub const MOCK_QR_URL: &str = "https://txz.qq.com/p?k=mock";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockDevice {
    pub guid: String,
}

impl MockDevice {
    pub fn fresh() -> Self {
        Self {
            guid: "fresh".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockKeystore {
    pub session: String,
}

/// How the next created client behaves.
#[derive(Clone)]
pub struct MockScript {
    pub uin: i64,
    pub fail_create: bool,
    pub fail_login: bool,
    /// Delivered to listeners while a login is in progress.
    pub login_events: Vec<ClientEvent>,
}

impl Default for MockScript {
    fn default() -> Self {
        Self {
            uin: MOCK_UIN,
            fail_create: false,
            fail_login: false,
            login_events: Vec::new(),
        }
    }
}

/// What the scripted client was asked to do.
#[derive(Default)]
pub struct MockCalls {
    pub created: AtomicUsize,
    pub qr_logins: AtomicUsize,
    pub fast_logins: AtomicUsize,
    pub disposes: AtomicUsize,
    pub device_seen: Mutex<Option<MockDevice>>,
    pub kicks: Mutex<Vec<(i64, i64, bool)>>,
    pub mutes: Mutex<Vec<(i64, i64, u32)>>,
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl MockCalls {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

thread_local! {
    static SCRIPT: RefCell<Option<(MockScript, Arc<MockCalls>)>> = const { RefCell::new(None) };
}

/// Scripts the next [`MockClient::create`] on this thread.
pub fn install(script: MockScript) -> Arc<MockCalls> {
    let calls = Arc::new(MockCalls::default());
    SCRIPT.with(|s| *s.borrow_mut() = Some((script, Arc::clone(&calls))));
    calls
}

fn scripted() -> (MockScript, Arc<MockCalls>) {
    SCRIPT.with(|s| s.borrow().clone())
        .unwrap_or_else(|| (MockScript::default(), Arc::new(MockCalls::default())))
}

pub fn test_group() -> Group {
    Group {
        uin: 123,
        name: "Test".into(),
    }
}

pub fn test_member() -> GroupMember {
    GroupMember {
        uin: 42,
        nickname: "Bob".into(),
        card: "Bobby".into(),
        special_title: String::new(),
        permission: GroupMemberPermission::Owner,
    }
}

pub fn test_friend() -> Friend {
    Friend {
        uin: 20002,
        nickname: "Alice".into(),
        remark: String::new(),
    }
}

pub struct MockClient {
    script: MockScript,
    calls: Arc<MockCalls>,
    device: MockDevice,
    keystore: Mutex<MockKeystore>,
    listeners: Mutex<Vec<Arc<dyn ClientListener>>>,
}

impl MockClient {
    pub fn calls(&self) -> &Arc<MockCalls> {
        &self.calls
    }

    /// Delivers an event to every listener.
    pub fn emit(&self, event: &ClientEvent) {
        for listener in self.listeners.lock().iter() {
            listener.on_event(event);
        }
    }

    fn login_result(&self) -> ClientResult<()> {
        for event in &self.script.login_events {
            self.emit(event);
        }
        if self.script.fail_login {
            Err(ClientError::Login("scan timed out".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ProtocolClient for MockClient {
    type DeviceInfo = MockDevice;
    type Keystore = MockKeystore;

    fn new_device_info() -> MockDevice {
        MockDevice::fresh()
    }

    fn new_keystore() -> MockKeystore {
        MockKeystore {
            session: String::new(),
        }
    }

    async fn create(
        _app_info: AppInfo,
        device_info: MockDevice,
        keystore: MockKeystore,
        _signer: Arc<dyn SignProvider>,
    ) -> ClientResult<Self> {
        let (script, calls) = scripted();
        if script.fail_create {
            return Err(ClientError::Operation("bad app info".into()));
        }
        calls.created.fetch_add(1, Ordering::SeqCst);
        *calls.device_seen.lock() = Some(device_info.clone());
        Ok(Self {
            script,
            calls,
            device: device_info,
            keystore: Mutex::new(keystore),
            listeners: Mutex::new(Vec::new()),
        })
    }

    fn uin(&self) -> i64 {
        self.script.uin
    }

    fn device_info(&self) -> MockDevice {
        self.device.clone()
    }

    fn keystore(&self) -> MockKeystore {
        self.keystore.lock().clone()
    }

    fn add_listener(&self, listener: Arc<dyn ClientListener>) {
        self.listeners.lock().push(listener);
    }

    async fn qr_code_login(&self, on_qr_code: QrCodeCallback) -> ClientResult<()> {
        self.calls.qr_logins.fetch_add(1, Ordering::SeqCst);
        on_qr_code(MOCK_QR_URL, b"png");
        self.login_result()?;
        self.keystore.lock().session = "qr-session".into();
        Ok(())
    }

    async fn fast_login(&self) -> ClientResult<()> {
        self.calls.fast_logins.fetch_add(1, Ordering::SeqCst);
        self.login_result()
    }

    async fn get_groups(&self) -> ClientResult<Vec<Group>> {
        Ok(vec![test_group()])
    }

    async fn get_group(&self, group_uin: i64) -> ClientResult<Group> {
        if group_uin == test_group().uin {
            Ok(test_group())
        } else {
            Err(ClientError::GroupNotFound(group_uin))
        }
    }

    async fn get_friends(&self) -> ClientResult<Vec<Friend>> {
        Ok(vec![test_friend()])
    }

    async fn get_group_members(&self, group_uin: i64) -> ClientResult<Vec<GroupMember>> {
        self.get_group(group_uin).await?;
        Ok(vec![test_member()])
    }

    async fn get_group_member(&self, group_uin: i64, member_uin: i64) -> ClientResult<GroupMember> {
        self.get_group(group_uin).await?;
        if member_uin == test_member().uin {
            Ok(test_member())
        } else {
            Err(ClientError::MemberNotFound {
                group: group_uin,
                member: member_uin,
            })
        }
    }

    async fn kick_member(&self, group_uin: i64, member_uin: i64, allow_rejoin: bool) -> ClientResult<()> {
        self.calls.kicks.lock().push((group_uin, member_uin, allow_rejoin));
        Ok(())
    }

    async fn mute_member(&self, group_uin: i64, member_uin: i64, duration: u32) -> ClientResult<()> {
        self.calls.mutes.lock().push((group_uin, member_uin, duration));
        Ok(())
    }

    async fn send_group_message(&self, group_uin: i64, text: &str) -> ClientResult<u32> {
        let mut sent = self.calls.sent.lock();
        sent.push((group_uin, text.to_string()));
        Ok(sent.len() as u32)
    }

    async fn send_private_message(&self, friend_uin: i64, text: &str) -> ClientResult<u32> {
        if friend_uin != test_friend().uin {
            return Err(ClientError::FriendNotFound(friend_uin));
        }
        let mut sent = self.calls.sent.lock();
        sent.push((friend_uin, text.to_string()));
        Ok(sent.len() as u32)
    }

    async fn dispose(&self) -> ClientResult<()> {
        self.calls.disposes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct MockSigner;

#[async_trait]
impl SignProvider for MockSigner {
    async fn sign(&self, _cmd: &str, _seq: u32, _src: &[u8]) -> ClientResult<SignResult> {
        Ok(SignResult::default())
    }
}

/// Signing service that answers locally.
#[derive(Default)]
pub struct MockSign {
    pub unreachable: bool,
}

#[async_trait]
impl SignService for MockSign {
    async fn app_info(&self) -> ClientResult<AppInfo> {
        if self.unreachable {
            return Err(ClientError::Sign("connection refused".into()));
        }
        Ok(AppInfo {
            os: "Linux".into(),
            current_version: "3.2.10-25765".into(),
            sub_app_id: 537234773,
            ..Default::default()
        })
    }

    fn provider(&self) -> Arc<dyn SignProvider> {
        Arc::new(MockSigner)
    }
}

/// Collects formatted log output in memory.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// A subscriber writing every record down to `DEBUG` into this capture.
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + 'static {
        tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    /// The captured line containing `needle`, if any.
    pub fn line_with(&self, needle: &str) -> Option<String> {
        self.contents()
            .lines()
            .find(|line| line.contains(needle))
            .map(str::to_string)
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
