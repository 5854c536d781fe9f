//! End-to-end tests of the service façade over desktop bridges and a mocked transport

use async_trait::async_trait;
use bridge_desktop::{InMemorySessionContext, SqlitePersistentStore};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, HttpClient, HttpRequest, HttpResponse, UserNotifier};
use bytes::Bytes;
use core_data::DataError;
use core_service::{
    names, CoreConfig, CoreError, DataService, DeviceIdentity, HttpMethod, ModelRegistry,
    Replication, UpdateStatus,
};
use mockall::mock;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

mock! {
    pub Http {}

    #[async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

#[derive(Default)]
struct RecordingNotifier {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl UserNotifier for RecordingNotifier {
    async fn alert(&self, _title: &str, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    }
}

fn unreachable_http() -> MockHttp {
    let mut http = MockHttp::new();
    http.expect_execute()
        .returning(|_| Err(BridgeError::NotAvailable("offline".to_string())));
    http
}

struct Fixture {
    config: CoreConfig,
    session: Arc<InMemorySessionContext>,
    notifier: Arc<RecordingNotifier>,
}

async fn fixture(http: MockHttp, snapshot_dir: Option<PathBuf>) -> Fixture {
    let session = Arc::new(InMemorySessionContext::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let store = Arc::new(SqlitePersistentStore::in_memory().await.unwrap());

    let mut builder = CoreConfig::builder()
        .device_identity(DeviceIdentity::new("device-1", "1.4.2.0"))
        .http_client(Arc::new(http))
        .persistent_store(store)
        .session_context(session.clone())
        .notifier(notifier.clone());
    if let Some(dir) = snapshot_dir {
        builder = builder.snapshot_dir(dir);
    }

    Fixture {
        config: builder.build().unwrap(),
        session,
        notifier,
    }
}

#[tokio::test]
async fn test_save_then_load_by_name() {
    let fixture = fixture(unreachable_http(), None).await;
    let service = DataService::bootstrap(fixture.config, ModelRegistry::standard(), Replication::Disabled)
        .await
        .unwrap();

    service
        .save(names::ANSWER, Some("2018-1"), json!({"q1": "faith"}))
        .await
        .unwrap();
    service
        .save(names::LESSON, Some("2018-1"), json!({"title": "Genesis"}))
        .await
        .unwrap();

    assert_eq!(
        service.load(names::ANSWER, Some("2018-1")).await.unwrap(),
        Some(json!({"q1": "faith"}))
    );
    assert_eq!(
        service.load(names::LESSON, Some("2018-1")).await.unwrap(),
        Some(json!({"title": "Genesis"}))
    );

    service.clear(names::ANSWER).await.unwrap();
    assert_eq!(service.load(names::ANSWER, Some("2018-1")).await.unwrap(), None);

    service.shutdown().await;
}

#[tokio::test]
async fn test_unknown_model_name_is_validation_error() {
    let fixture = fixture(unreachable_http(), None).await;
    let service = DataService::new(
        &fixture.config,
        ModelRegistry::standard(),
        core_service::OfflineSnapshot::empty(),
        Replication::Disabled,
    );

    let err = service.load("Sermon", None).await.unwrap_err();
    assert!(matches!(err, CoreError::Data(DataError::Validation(_))));
}

#[derive(Debug, Deserialize, PartialEq)]
struct Lesson {
    title: String,
}

#[tokio::test]
async fn test_bootstrap_reads_snapshot_dir_for_offline_mode() {
    let dir = std::env::temp_dir().join(format!("service-snapshot-{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await.unwrap();
    tokio::fs::write(
        dir.join("eng_cache.json"),
        r#"{"LESSON/2018-1": {"title": "Genesis"}}"#,
    )
    .await
    .unwrap();

    let mut http = MockHttp::new();
    http.expect_execute().never();

    let fixture = fixture(http, Some(dir.clone())).await;
    fixture.session.log_on("eng");
    fixture.session.set_offline_mode(true);

    let service = DataService::bootstrap(fixture.config, ModelRegistry::standard(), Replication::Disabled)
        .await
        .unwrap();

    let lesson: Option<Lesson> = service.load_as(names::LESSON, Some("2018-1")).await.unwrap();
    assert_eq!(
        lesson,
        Some(Lesson {
            title: "Genesis".to_string()
        })
    );

    let _ = tokio::fs::remove_dir_all(dir).await;
}

#[tokio::test]
async fn test_http_replication_is_flushed_on_shutdown() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .withf(|request| {
            request.method == HttpMethod::Put && request.url == "http://cbsf.azurewebsites.net/9"
        })
        .times(1)
        .returning(|_| Ok(response(200, "{}")));

    let fixture = fixture(http, None).await;
    let service = DataService::bootstrap(fixture.config, ModelRegistry::standard(), Replication::Http)
        .await
        .unwrap();

    service
        .save(names::LESSON, Some("9"), json!({"read": true}))
        .await
        .unwrap();
    service.shutdown().await;
}

#[tokio::test]
async fn test_check_for_update() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .withf(|request| request.url == "https://example.com/manifest")
        .times(1)
        .returning(|_| Ok(response(200, r#"{"version": "1.10.0.0"}"#)));

    let fixture = fixture(http, None).await;
    let notifier = fixture.notifier.clone();
    let service = DataService::bootstrap(fixture.config, ModelRegistry::standard(), Replication::Disabled)
        .await
        .unwrap();

    let status = service
        .check_for_update("https://example.com/manifest", "1.4.2.0")
        .await
        .unwrap();

    assert_eq!(
        status,
        Some(UpdateStatus::Available {
            current: "1.4.2.0".to_string(),
            latest: "1.10.0.0".to_string(),
        })
    );
    assert!(notifier.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_check_for_update_reports_failed_call() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(response(500, r#"{"Message": "maintenance"}"#)));

    let fixture = fixture(http, None).await;
    let notifier = fixture.notifier.clone();
    let service = DataService::bootstrap(fixture.config, ModelRegistry::standard(), Replication::Disabled)
        .await
        .unwrap();

    let status = service
        .check_for_update("https://example.com/manifest", "1.4.2.0")
        .await
        .unwrap();

    assert_eq!(status, None);
    assert_eq!(
        *notifier.messages.lock().unwrap(),
        vec!["HTTP status 500\n\nmaintenance".to_string()]
    );
}
