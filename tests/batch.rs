//! End-to-end batch tests: CSV on disk, bounded fan-out, aggregated report.

use std::future::Future;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use drive_time::{
    fetch_all, run_batch, Config, Coordinate, FetchReport, IsochroneLookup, IsochronePolygon,
    LookupError,
};
use geojson::{GeoJson, Geometry, Value};
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_csv(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn feature_collection() -> serde_json::Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"value": 1800.0},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[-75.4, 40.0], [-75.0, 40.3], [-74.6, 40.0], [-75.4, 40.0]]]
            }
        }]
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn failed_lookups_are_reported_not_dropped() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/isochrones/driving-car"))
        .and(body_partial_json(json!({"locations": [[-76.0, 41.0]]})))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream error"))
        .with_priority(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v2/isochrones/driving-car"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feature_collection()))
        .mount(&server)
        .await;

    let csv = write_csv(
        "Name,Latitude,Longitude\n\
         Alpha College,40.0,-75.0\n\
         Beta University,41.0,-76.0\n\
         Gamma Institute,not-a-number,-77.0\n\
         Delta College,42.0,-77.0\n",
    );

    let mut config = Config::new("test-key");
    config.base_url = server.uri();
    config.addresses_path = csv.path().to_path_buf();
    config.max_workers = 2;

    let batch = run_batch(&config).await.unwrap();

    assert_eq!(batch.outcomes.len(), 3);
    assert_eq!(batch.report.successes, 2);
    assert_eq!(batch.report.failures.len(), 1);
    assert_eq!(batch.report.failures[0].index, 1);
    assert_eq!(batch.report.failures[0].coordinate, Coordinate::new(41.0, -76.0));
    assert!(batch.report.failures[0].error.contains("500"));
    assert_eq!(batch.report.rejected.len(), 1);
    assert_eq!(batch.report.rejected[0].line, 4);
    assert_eq!(
        batch.report.to_string(),
        "2 of 3 isochrones fetched, 1 failed, 1 rows rejected"
    );
}

#[tokio::test]
async fn empty_file_issues_no_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(feature_collection()))
        .expect(0)
        .mount(&server)
        .await;

    let csv = write_csv("Latitude,Longitude\n");

    let mut config = Config::new("test-key");
    config.base_url = server.uri();
    config.addresses_path = csv.path().to_path_buf();

    let batch = run_batch(&config).await.unwrap();
    assert!(batch.outcomes.is_empty());
    assert_eq!(batch.report, FetchReport::default());
}

#[tokio::test]
async fn missing_file_aborts_before_any_request() {
    let mut config = Config::new("test-key");
    config.base_url = "http://127.0.0.1:9".to_string();
    config.addresses_path = "no/such/addresses.csv".into();

    let err = run_batch(&config).await.unwrap_err();
    assert!(err.to_string().contains("no/such/addresses.csv"));
}

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Start(f64),
    Finish(f64),
}

struct RecordingLookup {
    events: Mutex<Vec<Event>>,
}

impl IsochroneLookup for RecordingLookup {
    fn lookup(
        &self,
        coordinate: Coordinate,
    ) -> impl Future<Output = Result<IsochronePolygon, LookupError>> + Send {
        async move {
            self.events.lock().unwrap().push(Event::Start(coordinate.latitude));
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.events.lock().unwrap().push(Event::Finish(coordinate.latitude));

            if coordinate.latitude > 40.5 {
                return Err(LookupError::Decode("mock failure".to_string()));
            }
            let point = Geometry::new(Value::Point(vec![coordinate.longitude, coordinate.latitude]));
            Ok(IsochronePolygon::from(GeoJson::Geometry(point)))
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn single_worker_runs_lookups_one_after_another() {
    let lookup = Arc::new(RecordingLookup {
        events: Mutex::new(Vec::new()),
    });
    let coordinates = [Coordinate::new(40.0, -75.0), Coordinate::new(41.0, -76.0)];

    let outcomes = fetch_all(Arc::clone(&lookup), &coordinates, 1).await;

    let events = lookup.events.lock().unwrap().clone();
    assert_eq!(events.len(), 4);
    // Whichever task goes first must finish before the other starts
    assert!(matches!(
        (&events[0], &events[1]),
        (Event::Start(a), Event::Finish(b)) if a == b
    ));
    assert!(matches!(
        (&events[2], &events[3]),
        (Event::Start(a), Event::Finish(b)) if a == b
    ));

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_success());
    assert!(matches!(outcomes[1].result, Err(LookupError::Decode(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reruns_give_the_same_outcomes() {
    let coordinates: Vec<Coordinate> = (0..12)
        .map(|i| Coordinate::new(40.0 + i as f64 * 0.1, -75.0))
        .collect();

    let mut previous: Option<Vec<bool>> = None;
    for _ in 0..3 {
        let lookup = Arc::new(RecordingLookup {
            events: Mutex::new(Vec::new()),
        });
        let outcomes = fetch_all(lookup, &coordinates, 5).await;
        let pattern: Vec<bool> = outcomes.iter().map(|o| o.is_success()).collect();
        assert_eq!(pattern.len(), coordinates.len());
        if let Some(previous) = &previous {
            assert_eq!(previous, &pattern);
        }
        previous = Some(pattern);
    }
}
