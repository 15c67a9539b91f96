use geo_cluster::geolocation::{GeoProvider, GeoRecord, check_status, parse_ip_list};
use geo_cluster::lookup_worker::LookupWorker;
use geo_cluster::{
    LookupError, MapSession, MarkerId, Payload, RecordingSurface, SessionConfig, SessionUpdate,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Serves canned JSON answers keyed by address, like the real provider would.
struct CannedProvider {
    answers: HashMap<&'static str, &'static str>,
}

impl GeoProvider for CannedProvider {
    fn locate(&self, ip: &str) -> Result<GeoRecord, LookupError> {
        let body = self.answers.get(ip).ok_or(LookupError::Timeout)?;
        let record: GeoRecord =
            serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;
        check_status(record)
    }
}

fn provider() -> CannedProvider {
    CannedProvider {
        answers: HashMap::from([
            (
                "81.2.69.142",
                r#"{"status":"success","country":"United Kingdom","city":"London","lat":51.5142,"lon":-0.0931,"query":"81.2.69.142"}"#,
            ),
            (
                "81.2.69.160",
                r#"{"status":"success","country":"United Kingdom","city":"London","lat":51.5,"lon":-0.1,"query":"81.2.69.160"}"#,
            ),
            (
                "203.0.113.7",
                r#"{"status":"success","country":"Australia","city":"Sydney","lat":-33.86,"lon":151.2,"query":"203.0.113.7"}"#,
            ),
            (
                "198.51.100.4",
                r#"{"status":"success","country":"United States","city":"Honolulu","lat":21.3,"lon":-157.85,"query":"198.51.100.4"}"#,
            ),
            (
                "10.0.0.1",
                r#"{"status":"fail","message":"private range","query":"10.0.0.1"}"#,
            ),
            ("garbled", r#"{"status": 17}"#),
        ]),
    }
}

async fn run_search(
    session: &mut MapSession<RecordingSurface>,
    worker: &LookupWorker<CannedProvider>,
    input: &str,
) -> Vec<SessionUpdate> {
    let ips = parse_ip_list(input).unwrap();
    session.begin_search();
    let mut batch = worker.spawn_batch(ips);
    let mut updates = Vec::new();
    while let Some(event) = batch.recv().await {
        updates.push(session.apply(event));
    }
    batch.join().await.unwrap();
    updates
}

#[tokio::test]
async fn a_mixed_batch_plots_what_it_can_and_reports_the_rest() {
    let worker = LookupWorker::new(provider());
    let mut session = MapSession::new(RecordingSurface::new(), SessionConfig::default());

    let updates = run_search(
        &mut session,
        &worker,
        "81.2.69.142\n10.0.0.1\n\n81.2.69.160\ngarbled\nunknown-host\n203.0.113.7\n198.51.100.4\n",
    )
    .await;

    assert_eq!(updates.len(), 8);
    assert_eq!(updates[0], SessionUpdate::MarkerAdded(MarkerId(0)));
    assert!(matches!(
        &updates[1],
        SessionUpdate::LookupFailed { error: LookupError::Rejected { message }, .. }
            if message == "private range"
    ));
    assert_eq!(updates[2], SessionUpdate::MarkerAdded(MarkerId(1)));
    assert!(matches!(
        &updates[3],
        SessionUpdate::LookupFailed { error: LookupError::Malformed(_), .. }
    ));
    assert!(matches!(
        &updates[4],
        SessionUpdate::LookupFailed { error: LookupError::Timeout, .. }
    ));
    assert_eq!(updates[5], SessionUpdate::MarkerAdded(MarkerId(2)));
    assert_eq!(updates[6], SessionUpdate::MarkerAdded(MarkerId(3)));

    // Sydney to Honolulu spans over 300 degrees of longitude, so the fitted
    // zoom is the minimum, where the two London addresses merge.
    let viewport = match &updates[7] {
        SessionUpdate::BatchComplete(Some(v)) => *v,
        other => panic!("unexpected final update: {other:?}"),
    };
    assert_eq!(viewport.zoom, 2);

    let engine = session.engine();
    assert_eq!(engine.zoom(), 2);
    assert_eq!(engine.active_clusters().len(), 1);
    assert_eq!(engine.active_clusters()[0].members, vec![MarkerId(0), MarkerId(1)]);
    assert_eq!(engine.visible_marker_ids(), vec![MarkerId(2), MarkerId(3)]);
    assert_eq!(engine.surface().pin_count(), 3);
    assert_eq!(engine.surface().view(), Some((viewport.center, 2)));

    assert_eq!(session.failures().len(), 3);
    assert_eq!(session.results().len(), 4);
    let details = session.location_details();
    assert!(details.contains("City: Sydney"));
    assert!(details.contains("Region: Unknown"));
}

#[tokio::test]
async fn a_second_search_replaces_the_first() {
    let worker = LookupWorker::new(provider());
    let mut session = MapSession::new(RecordingSurface::new(), SessionConfig::default());

    run_search(&mut session, &worker, "81.2.69.142\n203.0.113.7").await;
    assert_eq!(session.engine().len(), 2);

    run_search(&mut session, &worker, "81.2.69.160").await;
    let engine = session.engine();
    assert_eq!(engine.len(), 1);
    assert_eq!(engine.markers()[0].id, MarkerId(2));
    assert_eq!(engine.surface().pin_count(), 1);
    assert_eq!(engine.zoom(), 19);
    assert_eq!(session.results().len(), 1);
}

#[tokio::test]
async fn activating_a_pin_hands_back_the_lookup_payload() {
    let opened: Arc<Mutex<Vec<Payload>>> = Arc::default();
    let sink = Arc::clone(&opened);

    let worker = LookupWorker::new(provider());
    let mut session = MapSession::new(RecordingSurface::new(), SessionConfig::default())
        .with_activation(Arc::new(move |_id: MarkerId, payload: &Payload| {
            sink.lock().unwrap().push(payload.clone());
        }));

    run_search(&mut session, &worker, "203.0.113.7").await;

    let engine = session.engine();
    let (handle, pin) = engine.surface().pins().next().unwrap();
    assert_eq!(pin.label, "Sydney, Australia");
    assert!(engine.surface().activate(handle));

    let opened = opened.lock().unwrap();
    assert_eq!(opened.len(), 1);
    assert_eq!(opened[0]["ip"], "203.0.113.7");
    assert_eq!(opened[0]["city"], "Sydney");
}
