//! Flow behavior against an in-memory fake server.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use bh_api::{ApiError, ApiResult, FederationApi, ReportBlob};
use bh_app::{
    AppError, Completion, DownloadSink, ReportFlow, RunFlow, SelectedFile, UploadFlow,
};
use bh_core::ModelId;
use bh_results::{EvaluatedMetrics, FederationResult, MissingMetricPolicy, NodeResult};
use bh_session::Session;
use proptest::prelude::*;

#[derive(Default)]
struct FakeApi {
    calls: AtomicUsize,
    upload: Mutex<Option<ApiResult<ModelId>>>,
    run: Mutex<Option<ApiResult<FederationResult>>>,
    report: Mutex<Option<ApiResult<ReportBlob>>>,
}

impl FakeApi {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn respond_upload(&self, outcome: ApiResult<ModelId>) {
        *self.upload.lock().unwrap() = Some(outcome);
    }

    fn respond_run(&self, outcome: ApiResult<FederationResult>) {
        *self.run.lock().unwrap() = Some(outcome);
    }

    fn respond_report(&self, outcome: ApiResult<ReportBlob>) {
        *self.report.lock().unwrap() = Some(outcome);
    }
}

fn take<T>(slot: &Mutex<Option<ApiResult<T>>>) -> ApiResult<T> {
    slot.lock()
        .unwrap()
        .take()
        .unwrap_or(Err(ApiError::Transport("no canned response".to_string())))
}

impl FederationApi for FakeApi {
    fn upload_model(&self, _file_bytes: Vec<u8>, _file_name: &str) -> ApiResult<ModelId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        take(&self.upload)
    }

    fn run_federation(&self, _id: &ModelId) -> ApiResult<FederationResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        take(&self.run)
    }

    fn fetch_report(&self, _id: &ModelId) -> ApiResult<ReportBlob> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        take(&self.report)
    }
}

#[derive(Default)]
struct MemorySink {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl DownloadSink for MemorySink {
    fn save(&self, bytes: &[u8], file_name: &str) -> std::io::Result<std::path::PathBuf> {
        self.files
            .lock()
            .unwrap()
            .push((file_name.to_string(), bytes.to_vec()));
        Ok(std::path::PathBuf::from(file_name))
    }
}

fn id(raw: &str) -> ModelId {
    ModelId::parse(raw).unwrap()
}

fn two_node_run() -> FederationResult {
    FederationResult::new(vec![
        NodeResult::evaluated("Hospital A", EvaluatedMetrics::uniform(0.9)),
        NodeResult::skipped("Hospital B", "no label column"),
    ])
}

#[test]
fn upload_without_file_sends_nothing_and_keeps_stored_id() {
    let api = FakeApi::default();
    let session = Session::in_memory();
    session.set_model_id(&id("previous"));

    let mut flow = UploadFlow::mount(&session);
    let notice = flow.submit(&api, &session);

    assert!(notice.is_error());
    assert_eq!(notice.message, "Please select a model file first");
    assert_eq!(api.calls(), 0);
    assert_eq!(session.model_id(), Some(id("previous")));
}

#[test]
fn successful_upload_is_visible_to_next_run_mount() {
    let api = FakeApi::default();
    let session = Session::in_memory();
    session.set_model_id(&id("old"));

    let mut upload = UploadFlow::mount(&session);
    upload.select_file(SelectedFile::new("model.pkl", b"weights".to_vec()));
    api.respond_upload(Ok(id("new-model")));

    let notice = upload.submit(&api, &session);
    assert!(!notice.is_error());
    assert_eq!(notice.message, "Model uploaded successfully! Model ID: new-model");
    assert_eq!(upload.model_id(), Some(&id("new-model")));
    assert!(upload.selected_file().is_none());

    let run = RunFlow::mount(&session, MissingMetricPolicy::default());
    assert_eq!(run.model_id_input, "new-model");
}

#[test]
fn failed_upload_leaves_selection_and_id_untouched() {
    let api = FakeApi::default();
    let session = Session::in_memory();
    session.set_model_id(&id("keep-me"));

    let mut flow = UploadFlow::mount(&session);
    flow.select_file(SelectedFile::new("model.pkl", b"weights".to_vec()));
    api.respond_upload(Err(ApiError::Status {
        status: 400,
        detail: Some("Unsupported model format".to_string()),
    }));

    let notice = flow.submit(&api, &session);
    assert!(notice.is_error());
    assert_eq!(notice.message, "Unsupported model format");
    assert_eq!(flow.selected_file().unwrap().file_name, "model.pkl");
    assert_eq!(flow.model_id(), Some(&id("keep-me")));
    assert_eq!(session.model_id(), Some(id("keep-me")));
}

#[test]
fn failed_run_clears_previous_result() {
    let api = FakeApi::default();
    let mut flow = RunFlow::new(MissingMetricPolicy::TreatAsZero);
    flow.model_id_input = "m1".to_string();

    api.respond_run(Ok(two_node_run()));
    assert!(!flow.submit(&api).is_error());
    assert_eq!(flow.stats().unwrap().total_nodes, 2);

    api.respond_run(Err(ApiError::Status {
        status: 500,
        detail: None,
    }));
    let notice = flow.submit(&api);
    assert!(notice.is_error());
    assert_eq!(notice.message, "Federation failed.");
    assert!(flow.outcome().is_none());
    assert_eq!(flow.last_error(), Some("Server returned 500"));
}

#[test]
fn run_clears_result_before_request_completes() {
    let mut flow = RunFlow::new(MissingMetricPolicy::TreatAsZero);
    flow.model_id_input = "m1".to_string();

    let first = flow.begin().unwrap();
    flow.complete(Completion {
        ticket: first.ticket,
        outcome: Ok(two_node_run()),
    });
    assert!(flow.outcome().is_some());

    let _second = flow.begin().unwrap();
    assert!(flow.is_loading());
    assert!(flow.outcome().is_none());
}

#[test]
fn double_submit_is_rejected_while_loading() {
    let mut flow = RunFlow::new(MissingMetricPolicy::TreatAsZero);
    flow.model_id_input = "m1".to_string();
    let _job = flow.begin().unwrap();
    assert!(matches!(flow.begin(), Err(AppError::Busy)));
}

#[test]
fn stale_run_response_is_dropped_after_cancel() {
    let mut flow = RunFlow::new(MissingMetricPolicy::TreatAsZero);
    flow.model_id_input = "m1".to_string();
    let stale = flow.begin().unwrap();

    flow.cancel();
    flow.model_id_input = "m2".to_string();
    let fresh = flow.begin().unwrap();
    assert_eq!(fresh.model_id, id("m2"));

    let applied = flow.complete(Completion {
        ticket: fresh.ticket,
        outcome: Ok(two_node_run()),
    });
    assert!(applied.is_some());
    assert!(
        flow.complete(Completion {
            ticket: stale.ticket,
            outcome: Ok(FederationResult::default()),
        })
        .is_none()
    );
    assert_eq!(flow.outcome().unwrap().model_id, id("m2"));
    assert_eq!(flow.stats().unwrap().total_nodes, 2);
}

#[test]
fn late_response_after_cancel_is_ignored() {
    let mut flow = RunFlow::new(MissingMetricPolicy::TreatAsZero);
    flow.model_id_input = "m1".to_string();
    let job = flow.begin().unwrap();
    flow.cancel();

    assert!(
        flow.complete(Completion {
            ticket: job.ticket,
            outcome: Ok(two_node_run()),
        })
        .is_none()
    );
    assert!(!flow.is_loading());
    assert!(flow.outcome().is_none());
}

#[test]
fn report_uses_header_name_then_default() {
    let api = FakeApi::default();
    let sink = MemorySink::default();
    let mut flow = ReportFlow::new();
    flow.model_id_input = "abc".to_string();

    api.respond_report(Ok(ReportBlob {
        bytes: b"%PDF-1.4".to_vec(),
        suggested_filename: Some("foo.pdf".to_string()),
        content_type: Some("application/pdf".to_string()),
    }));
    let notice = flow.submit(&api, &sink);
    assert_eq!(notice.message, "Report downloaded: foo.pdf (8 bytes)");

    api.respond_report(Ok(ReportBlob {
        bytes: b"%PDF".to_vec(),
        suggested_filename: None,
        content_type: None,
    }));
    flow.submit(&api, &sink);

    let names: Vec<String> = sink
        .files
        .lock()
        .unwrap()
        .iter()
        .map(|(name, _)| name.clone())
        .collect();
    assert_eq!(names, ["foo.pdf", "federation_report_abc.pdf"]);
}

#[test]
fn report_transport_failure_is_generic() {
    let api = FakeApi::default();
    let sink = MemorySink::default();
    let mut flow = ReportFlow::new();
    flow.model_id_input = "abc".to_string();

    api.respond_report(Err(ApiError::Transport("connection refused".to_string())));
    let notice = flow.submit(&api, &sink);
    assert!(notice.is_error());
    assert_eq!(notice.message, "Download failed.");
    assert!(sink.files.lock().unwrap().is_empty());
}

#[test]
fn report_without_id_sends_nothing() {
    let api = FakeApi::default();
    let session = Session::in_memory();
    let mut flow = ReportFlow::mount(&session);
    let notice = flow.submit(&api, &MemorySink::default());
    assert_eq!(notice.message, "No Model ID found");
    assert_eq!(api.calls(), 0);
}

#[test]
fn flows_do_not_share_failure_state() {
    let api = FakeApi::default();
    let mut run = RunFlow::new(MissingMetricPolicy::TreatAsZero);
    let mut report = ReportFlow::new();
    run.model_id_input = "m1".to_string();
    report.model_id_input = "m1".to_string();

    api.respond_run(Ok(two_node_run()));
    run.submit(&api);
    api.respond_report(Err(ApiError::Transport("down".to_string())));
    report.submit(&api, &MemorySink::default());

    assert!(run.outcome().is_some());
    assert!(report.last_error().is_some());
}

proptest! {
    #[test]
    fn only_the_latest_run_is_applied(order in Just((0..5usize).collect::<Vec<_>>()).prop_shuffle()) {
        let mut flow = RunFlow::new(MissingMetricPolicy::TreatAsZero);
        flow.model_id_input = "m1".to_string();

        // Five requests, each cancelling the previous; answer in random order.
        let mut tickets = Vec::new();
        for _ in 0..5 {
            flow.cancel();
            tickets.push(flow.begin().unwrap().ticket);
        }
        for i in order {
            let nodes = vec![NodeResult::skipped("n", "r"); i + 1];
            let applied = flow.complete(Completion {
                ticket: tickets[i],
                outcome: Ok(FederationResult::new(nodes)),
            });
            prop_assert_eq!(applied.is_some(), i == 4);
        }
        prop_assert_eq!(flow.stats().unwrap().total_nodes, 5);
    }
}
