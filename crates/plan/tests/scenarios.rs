//! End-to-end planning scenarios against real (in-memory and tempdir)
//! collaborators.

use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempDir;

use otad_config::Config;
use otad_errors::{Error, PrefsError};
use otad_events::{AppEvent, EventReceiver, GeneralEvent, UpdateEvent};
use otad_plan::{completion_code, PlanOutcome, RequestParams, ResponseHandler};
use otad_platform::StaticHardware;
use otad_prefs::{keys, MemoryPrefs, Prefs, PrefsPayloadState};
use otad_types::{CompletionCode, UpdateResponse};

struct Fixture {
    prefs: Arc<MemoryPrefs>,
    handler: ResponseHandler,
    events: EventReceiver,
    tempdir: TempDir,
}

impl Fixture {
    fn new(official_build: bool) -> Self {
        let tempdir = TempDir::new().expect("tempdir");
        let prefs = Arc::new(MemoryPrefs::new());
        let prefs_dyn: Arc<dyn Prefs> = prefs.clone();
        let payload_state = Arc::new(PrefsPayloadState::new(prefs_dyn.clone()));
        let hardware = Arc::new(StaticHardware::new(official_build, "/dev/sda3"));

        let mut config = Config::default();
        config.paths.deadline_file = tempdir.path().join("deadline");

        let (tx, events) = otad_events::channel();
        let handler = ResponseHandler::new(prefs_dyn, payload_state, hardware, &config)
            .with_event_sender(tx);

        Self {
            prefs,
            handler,
            events,
            tempdir,
        }
    }

    fn deadline_path(&self) -> std::path::PathBuf {
        self.tempdir.path().join("deadline")
    }

    fn drain_events(&mut self) -> Vec<AppEvent> {
        let mut collected = Vec::new();
        while let Ok(message) = self.events.try_recv() {
            collected.push(message.event);
        }
        collected
    }

    fn completed_codes(events: &[AppEvent]) -> Vec<CompletionCode> {
        events
            .iter()
            .filter_map(|event| match event {
                AppEvent::Update(UpdateEvent::Completed { code }) => Some(*code),
                _ => None,
            })
            .collect()
    }
}

/// Preference store whose reads succeed and whose writes always fail, as
/// on a read-only or full filesystem.
#[derive(Default)]
struct UnwritablePrefs {
    inner: MemoryPrefs,
}

impl UnwritablePrefs {
    fn write_failed(key: &str) -> Error {
        PrefsError::WriteFailed {
            key: key.to_string(),
            message: "read-only filesystem".to_string(),
        }
        .into()
    }
}

#[async_trait]
impl Prefs for UnwritablePrefs {
    async fn get_string(&self, key: &str) -> Result<Option<String>, Error> {
        self.inner.get_string(key).await
    }

    async fn set_string(&self, key: &str, _value: &str) -> Result<(), Error> {
        Err(Self::write_failed(key))
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>, Error> {
        self.inner.get_i64(key).await
    }

    async fn set_i64(&self, key: &str, _value: i64) -> Result<(), Error> {
        Err(Self::write_failed(key))
    }

    async fn exists(&self, key: &str) -> Result<bool, Error> {
        self.inner.exists(key).await
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        Err(Self::write_failed(key))
    }
}

fn offered_update(urls: &[&str]) -> UpdateResponse {
    UpdateResponse {
        update_exists: true,
        version: "15.2.0".to_string(),
        payload_size: 1024,
        payload_hash: vec![0xde, 0xad, 0xbe, 0xef],
        metadata_size: 128,
        metadata_signature: b"sig".to_vec(),
        public_key_rsa: Vec::new(),
        is_delta_payload: false,
        payload_urls: urls.iter().map(ToString::to_string).collect(),
        deadline: b"20:00:00".to_vec(),
    }
}

#[tokio::test]
async fn no_update_response_completes_benignly_without_writes() {
    let mut fx = Fixture::new(true);
    let response = UpdateResponse::default();

    let result = fx
        .handler
        .handle(&response, RequestParams::default())
        .await;
    let outcome = result.expect("no-update is not an error");
    assert!(matches!(outcome, PlanOutcome::NoUpdate));

    // No persisted writes, no deadline file, one benign completion.
    assert!(fx.prefs.keys().is_empty());
    assert!(!fx.deadline_path().exists());
    let events = fx.drain_events();
    assert_eq!(
        Fixture::completed_codes(&events),
        vec![CompletionCode::NoUpdate]
    );
}

#[tokio::test]
async fn official_build_with_http_url_mandates_hash_checks() {
    let mut fx = Fixture::new(true);
    let response = offered_update(&["http://example/x"]);

    let result = fx
        .handler
        .handle(&response, RequestParams::default())
        .await;
    let plan = result
        .expect("plan built")
        .into_plan()
        .expect("built outcome");

    assert_eq!(plan.download_url, "http://example/x");
    assert!(plan.hash_checks_mandatory);
    assert!(plan.is_full_update);
    assert!(!plan.is_resume);
    assert_eq!(plan.install_path, "/dev/sda5");
    assert_eq!(plan.kernel_install_path, "/dev/sda4");
    assert!(!plan.powerwash_required);

    let events = fx.drain_events();
    assert_eq!(
        Fixture::completed_codes(&events),
        vec![CompletionCode::Success]
    );
}

#[tokio::test]
async fn p2p_source_downgrades_transport_and_flips_the_mandate() {
    let mut fx = Fixture::new(true);
    let response = offered_update(&["https://example/x"]);
    let params = RequestParams {
        use_p2p_for_downloading: true,
        p2p_url: "http://peer/x".to_string(),
        ..RequestParams::default()
    };

    let plan = fx
        .handler
        .handle(&response, params)
        .await
        .expect("plan built")
        .into_plan()
        .expect("built outcome");

    // The peer URL is in effect, and even though every server URL was
    // https the mandate follows the effective (insecure) transport.
    assert_eq!(plan.download_url, "http://peer/x");
    assert!(plan.hash_checks_mandatory);
    assert_eq!(
        fx.prefs
            .get_string(keys::P2P_USED)
            .await
            .expect("p2p flag"),
        Some("1".to_string())
    );

    let events = fx.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        AppEvent::Update(UpdateEvent::SourceSelected { url, used_p2p: true })
            if url == "http://peer/x"
    )));
}

#[tokio::test]
async fn rolled_back_version_is_treated_as_no_update() {
    let mut fx = Fixture::new(true);
    fx.prefs
        .set_string(keys::ROLLBACK_VERSION, "9.0")
        .await
        .expect("seed rollback");

    let mut response = offered_update(&["https://example/x"]);
    response.version = "9.0".to_string();

    let outcome = fx
        .handler
        .handle(&response, RequestParams::default())
        .await
        .expect("rejection is benign");
    assert!(matches!(outcome, PlanOutcome::NoUpdate));

    // Nothing beyond the seeded rollback history was written.
    assert_eq!(fx.prefs.keys(), vec![keys::ROLLBACK_VERSION.to_string()]);
    assert!(!fx.deadline_path().exists());

    let events = fx.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        AppEvent::Update(UpdateEvent::RollbackVersionRejected { version }) if version == "9.0"
    )));
    assert_eq!(
        Fixture::completed_codes(&events),
        vec![CompletionCode::NoUpdate]
    );
}

#[tokio::test]
async fn response_without_urls_is_invalid() {
    let mut fx = Fixture::new(true);
    let response = offered_update(&[]);

    let result = fx
        .handler
        .handle(&response, RequestParams::default())
        .await;
    assert!(result.is_err());
    assert_eq!(
        completion_code(&result),
        CompletionCode::InvalidResponse
    );
    let events = fx.drain_events();
    assert_eq!(
        Fixture::completed_codes(&events),
        vec![CompletionCode::InvalidResponse]
    );
}

#[tokio::test]
async fn unresolvable_boot_device_fails_the_invocation() {
    let tempdir = TempDir::new().expect("tempdir");
    let prefs: Arc<dyn Prefs> = Arc::new(MemoryPrefs::new());
    let payload_state = Arc::new(PrefsPayloadState::new(prefs.clone()));
    // Partition 1 is not a root slot, so slot arithmetic must fail.
    let hardware = Arc::new(StaticHardware::new(true, "/dev/sda1"));
    let mut config = Config::default();
    config.paths.deadline_file = tempdir.path().join("deadline");
    let handler = ResponseHandler::new(prefs, payload_state, hardware, &config);

    let result = handler
        .handle(&offered_update(&["https://example/x"]), RequestParams::default())
        .await;
    assert!(result.is_err());
    assert_eq!(
        completion_code(&result),
        CompletionCode::DeviceLookupFailed
    );
}

#[tokio::test]
async fn second_offer_of_the_same_payload_resumes() {
    let mut fx = Fixture::new(true);
    let response = offered_update(&["https://example/x"]);

    let first = fx
        .handler
        .handle(&response, RequestParams::default())
        .await
        .expect("first plan")
        .into_plan()
        .expect("built");
    assert!(!first.is_resume);
    assert_eq!(
        fx.prefs
            .get_string(keys::UPDATE_CHECK_RESPONSE_HASH)
            .await
            .expect("hash"),
        Some("deadbeef".to_string())
    );

    // Simulate partial download progress between the two checks.
    fx.prefs
        .set_i64(keys::UPDATE_STATE_PROGRESS, 512)
        .await
        .expect("progress");

    let second = fx
        .handler
        .handle(&response, RequestParams::default())
        .await
        .expect("second plan")
        .into_plan()
        .expect("built");
    assert!(second.is_resume);
    // Resume left the progress counter alone.
    assert_eq!(
        fx.prefs
            .get_i64(keys::UPDATE_STATE_PROGRESS)
            .await
            .expect("progress"),
        Some(512)
    );

    // A different payload restarts and resets.
    let mut changed = response.clone();
    changed.payload_hash = vec![0xca, 0xfe, 0xf0, 0x0d];
    let third = fx
        .handler
        .handle(&changed, RequestParams::default())
        .await
        .expect("third plan")
        .into_plan()
        .expect("built");
    assert!(!third.is_resume);
    assert_eq!(
        fx.prefs
            .get_i64(keys::UPDATE_STATE_PROGRESS)
            .await
            .expect("progress"),
        Some(0)
    );
    assert_eq!(
        fx.prefs
            .get_string(keys::UPDATE_CHECK_RESPONSE_HASH)
            .await
            .expect("hash"),
        Some("cafef00d".to_string())
    );
    let _ = fx.drain_events();
}

#[tokio::test]
async fn deadline_side_channel_is_written_and_cleared() {
    let mut fx = Fixture::new(true);
    let response = offered_update(&["https://example/x"]);

    fx.handler
        .handle(&response, RequestParams::default())
        .await
        .expect("plan");
    assert_eq!(
        tokio::fs::read(fx.deadline_path()).await.expect("deadline"),
        b"20:00:00"
    );

    // A later response without a deadline clears the stale one.
    let mut no_deadline = response.clone();
    no_deadline.deadline = Vec::new();
    fx.handler
        .handle(&no_deadline, RequestParams::default())
        .await
        .expect("plan");
    assert!(tokio::fs::read(fx.deadline_path())
        .await
        .expect("deadline")
        .is_empty());

    let events = fx.drain_events();
    assert!(events.iter().any(|event| matches!(
        event,
        AppEvent::Update(UpdateEvent::DeadlineWritten { bytes: 8, .. })
    )));
}

#[tokio::test]
async fn unofficial_build_waives_checks_for_unsigned_payloads() {
    let mut fx = Fixture::new(false);
    let response = offered_update(&["http://example/x"]);

    let plan = fx
        .handler
        .handle(&response, RequestParams::default())
        .await
        .expect("plan")
        .into_plan()
        .expect("built");
    assert!(!plan.hash_checks_mandatory);

    // The same response carrying a signing key must be verified.
    let mut signed = offered_update(&["http://example/x"]);
    signed.public_key_rsa = b"key".to_vec();
    let plan = fx
        .handler
        .handle(&signed, RequestParams::default())
        .await
        .expect("plan")
        .into_plan()
        .expect("built");
    assert!(plan.hash_checks_mandatory);
    let _ = fx.drain_events();
}

#[tokio::test]
async fn channel_downgrade_requires_powerwash_only_when_allowed() {
    let mut fx = Fixture::new(true);
    let response = offered_update(&["https://example/x"]);

    let params = RequestParams {
        channel_downgrade: true,
        powerwash_allowed: true,
        ..RequestParams::default()
    };
    let plan = fx
        .handler
        .handle(&response, params)
        .await
        .expect("plan")
        .into_plan()
        .expect("built");
    assert!(plan.powerwash_required);

    let params = RequestParams {
        channel_downgrade: true,
        powerwash_allowed: false,
        ..RequestParams::default()
    };
    let plan = fx
        .handler
        .handle(&response, params)
        .await
        .expect("plan")
        .into_plan()
        .expect("built");
    assert!(!plan.powerwash_required);
    let _ = fx.drain_events();
}

#[tokio::test]
async fn boot_device_override_bypasses_hardware_lookup() {
    let tempdir = TempDir::new().expect("tempdir");
    let prefs: Arc<dyn Prefs> = Arc::new(MemoryPrefs::new());
    let payload_state = Arc::new(PrefsPayloadState::new(prefs.clone()));
    // Hardware would fail; the override must win before it is consulted.
    let hardware = Arc::new(StaticHardware::without_boot_device(true));
    let mut config = Config::default();
    config.paths.deadline_file = tempdir.path().join("deadline");
    config.update.boot_device_override = Some("/dev/vda5".to_string());
    let handler = ResponseHandler::new(prefs, payload_state, hardware, &config);

    let plan = handler
        .handle(&offered_update(&["https://example/x"]), RequestParams::default())
        .await
        .expect("plan")
        .into_plan()
        .expect("built");
    assert_eq!(plan.install_path, "/dev/vda3");
    assert_eq!(plan.kernel_install_path, "/dev/vda2");
}

#[tokio::test]
async fn prefs_write_failures_warn_but_do_not_change_the_outcome() {
    let tempdir = TempDir::new().expect("tempdir");
    let prefs: Arc<dyn Prefs> = Arc::new(UnwritablePrefs::default());
    let payload_state = Arc::new(PrefsPayloadState::new(prefs.clone()));
    let hardware = Arc::new(StaticHardware::new(true, "/dev/sda3"));
    let mut config = Config::default();
    config.paths.deadline_file = tempdir.path().join("deadline");
    let (tx, mut events) = otad_events::channel();
    let handler =
        ResponseHandler::new(prefs, payload_state, hardware, &config).with_event_sender(tx);

    let result = handler
        .handle(&offered_update(&["https://example/x"]), RequestParams::default())
        .await;

    // Every persistent write failed (p2p flag, attempt counter, progress
    // reset, response hash), yet the plan is built and the invocation
    // completes successfully.
    assert_eq!(completion_code(&result), CompletionCode::Success);
    let plan = result.expect("plan").into_plan().expect("built");
    assert!(!plan.is_resume);
    assert_eq!(plan.install_path, "/dev/sda5");

    let mut warnings = Vec::new();
    let mut codes = Vec::new();
    while let Ok(message) = events.try_recv() {
        match message.event {
            AppEvent::General(GeneralEvent::Warning { message, .. }) => warnings.push(message),
            AppEvent::Update(UpdateEvent::Completed { code }) => codes.push(code),
            _ => {}
        }
    }
    assert_eq!(codes, vec![CompletionCode::Success]);
    assert!(warnings.iter().any(|w| w.contains("p2p")));
    assert!(warnings.iter().any(|w| w.contains("update progress")));
    assert!(warnings.iter().any(|w| w.contains("response hash")));
    assert!(warnings.iter().any(|w| w.contains("restarted download")));
}
