//! Transport behaviour against a scripted sender.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use common::{ScriptedSender, fast_settings, json, nodes_document, refused};
use eskit_client::{HealthState, Kind, Request, StatusCode, Transport, TransportSettings};

fn transport(hosts: &[&str], settings: TransportSettings, sender: &ScriptedSender) -> Transport {
    Transport::builder()
        .hosts(hosts.iter().copied())
        .settings(settings)
        .sender(sender.clone())
        .build()
        .expect("valid transport")
}

#[test]
fn network_errors_are_retried_until_exhausted() {
    let sender = ScriptedSender::new(|_| refused());
    let transport = transport(&["localhost:9200"], fast_settings().with_max_retries(3), &sender);

    let err = transport.request(Request::get("_search")).expect_err("always refused");

    assert!(err.is_request());
    assert_eq!(sender.sent_count(), 4);
    assert_eq!(transport.stats().snapshot().retries, 3);
}

#[test]
fn forced_resurrections_are_counted() {
    let sender = ScriptedSender::new(|_| refused());
    let transport = transport(&["localhost:9200"], fast_settings().with_max_retries(2), &sender);

    transport.request(Request::get("")).expect_err("always refused");

    let stats = transport.stats().snapshot();
    assert_eq!(sender.sent_count(), 3);
    assert_eq!(stats.connections_marked_dead, 3);
    assert_eq!(stats.connections_resurrected, 2);
}

#[test]
fn api_errors_are_not_retried_and_keep_the_connection_alive() {
    let sender = ScriptedSender::new(|_| json(404, r#"{"error":"index_not_found"}"#));
    let transport = transport(&["localhost:9200"], fast_settings(), &sender);

    let err = transport.request(Request::get("missing/_doc/1")).expect_err("404");

    assert!(err.is_api());
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(err.json().unwrap()["error"], "index_not_found");
    assert_eq!(sender.sent_count(), 1);
    assert_eq!(transport.dead_count(), 0);
    assert_eq!(transport.alive_count(), 1);
}

#[test]
fn non_json_error_bodies_are_retried_without_killing_the_node() {
    let sender = ScriptedSender::new(|_| json(502, "<html>Bad Gateway</html>"));
    let transport = transport(&["localhost:9200"], fast_settings().with_max_retries(2), &sender);

    let err = transport.request(Request::get("")).expect_err("502");

    assert!(err.is_invalid_json());
    assert_eq!(sender.sent_count(), 3);
    assert_eq!(transport.dead_count(), 0);
}

#[test]
fn get_with_body_goes_out_as_post() {
    let sender = ScriptedSender::new(|_| json(200, r#"{"hits":{"total":0}}"#));
    let transport = transport(&["localhost:9200"], fast_settings(), &sender);

    let response = transport
        .request(Request::get("books/_search").with_body(r#"{"query":{"match_all":{}}}"#))
        .expect("200");

    assert!(response.is_success());
    let sent = sender.sent();
    assert_eq!(sent[0].method, http::Method::POST);
    assert_eq!(sent[0].content_type(), Some("application/json"));
    assert_eq!(sent[0].url.path(), "/books/_search");
}

#[test]
fn query_parameters_are_encoded_in_key_order() {
    let sender = ScriptedSender::new(|_| json(200, "{}"));
    let transport = transport(&["localhost:9200"], fast_settings(), &sender);

    transport
        .request(Request::get("books/_search").param("size", "5").param("q", "title:rust"))
        .expect("200");

    assert_eq!(sender.sent()[0].url.query(), Some("q=title%3Arust&size=5"));
}

#[test]
fn failed_node_is_marked_dead_and_the_retry_moves_on() {
    let sender = ScriptedSender::new(|request| match request.url.port() {
        Some(9200) => refused(),
        _ => json(200, "{}"),
    });
    let transport = transport(&["localhost:9200", "localhost:9201"], fast_settings(), &sender);

    transport.request(Request::get("")).expect("second node answers");
    transport.request(Request::get("")).expect("second node answers");

    assert_eq!(
        sender.authorities(),
        ["localhost:9200", "localhost:9201", "localhost:9201"]
    );
    assert_eq!(transport.dead_count(), 1);

    let dead = transport
        .connections()
        .into_iter()
        .find(|c| c.state == HealthState::Dead)
        .expect("one dead connection");
    assert_eq!(dead.host.port(), Some(9200));
    assert_eq!(dead.failures, 1);
}

#[test]
fn healthy_requests_rotate_through_every_node() {
    let sender = ScriptedSender::new(|_| json(200, "{}"));
    let transport = transport(
        &["localhost:9200", "localhost:9201", "localhost:9202"],
        fast_settings(),
        &sender,
    );

    for _ in 0..4 {
        transport.request(Request::head("")).expect("200");
    }

    assert_eq!(
        sender.authorities(),
        [
            "localhost:9200",
            "localhost:9201",
            "localhost:9202",
            "localhost:9200"
        ]
    );
}

#[test]
fn retries_can_be_disabled() {
    let sender = ScriptedSender::new(|_| refused());
    let transport = transport(
        &["localhost:9200"],
        fast_settings().with_retry_on_failure(false),
        &sender,
    );

    let err = transport.request(Request::get("")).expect_err("refused");

    assert!(err.is_request());
    assert_eq!(sender.sent_count(), 1);
}

#[test]
fn pinned_requests_stay_on_their_connection() {
    let sender = ScriptedSender::new(|_| json(200, "{}"));
    let transport = transport(&["localhost:9200", "localhost:9201"], fast_settings(), &sender);

    let connection = transport.get_connection().expect("pool has hosts");
    for _ in 0..3 {
        transport
            .request(Request::get("").on_connection(connection.clone()))
            .expect("200");
    }

    let first = format!("localhost:{}", connection.host().port().unwrap());
    assert!(sender.authorities().iter().all(|a| *a == first));
}

#[test]
fn no_hosts_means_no_connections() {
    let sender = ScriptedSender::new(|_| json(200, "{}"));
    let transport = transport(&[], fast_settings(), &sender);

    let err = transport.request(Request::get("")).expect_err("empty pool");

    assert!(err.is_no_connections());
    assert_eq!(sender.sent_count(), 0);
}

#[test]
fn hosts_added_later_are_used() {
    let sender = ScriptedSender::new(|_| json(200, "{}"));
    let transport = transport(&[], fast_settings(), &sender);

    transport.add_host("localhost:9205").expect("valid host");
    transport.add_host("localhost:9205").expect("duplicate is ignored");
    transport.request(Request::get("")).expect("200");

    assert_eq!(transport.hosts().len(), 1);
    assert_eq!(sender.authorities(), ["localhost:9205"]);
}

#[test]
fn sniffing_replaces_the_host_list() {
    let document = nodes_document(&["127.0.0.1:9301", "127.0.0.1:9302"]);
    let sender = ScriptedSender::new(move |request| {
        if request.url.path() == "/_nodes/http" {
            json(200, &document)
        } else {
            json(200, "{}")
        }
    });
    let transport = transport(&["localhost:9200"], fast_settings(), &sender);

    let hosts = transport.sniff_connections_blocking().expect("may block");

    assert_eq!(hosts.len(), 2);
    let mut ports: Vec<u16> = transport.hosts().iter().filter_map(|h| h.port()).collect();
    ports.sort_unstable();
    assert_eq!(ports, [9301, 9302]);
    assert_eq!(sender.sent_count(), 1);
    assert_eq!(transport.stats().snapshot().sniffs, 1);
}

#[test]
fn failed_sniff_keeps_the_current_hosts() {
    let sender = ScriptedSender::new(|_| json(500, "oops"));
    let transport = transport(&["localhost:9200"], fast_settings(), &sender);

    let hosts = transport.sniff_connections_blocking().expect("may block");

    assert!(hosts.is_empty());
    assert_eq!(transport.hosts()[0].port(), Some(9200));
    assert_eq!(sender.sent_count(), 1);
}

#[test]
fn reload_threshold_triggers_a_sniff() {
    let document = nodes_document(&["127.0.0.1:9200"]);
    let sender = ScriptedSender::new(move |request| {
        if request.url.path() == "/_nodes/http" {
            json(200, &document)
        } else {
            json(200, "{}")
        }
    });
    let transport = transport(&["localhost:9200"], fast_settings().with_reload_after(3), &sender);

    for _ in 0..4 {
        transport.request(Request::get("_cat/health")).expect("200");
    }

    assert_eq!(sender.sent_count(), 5);
    assert_eq!(sender.paths()[3], "/_nodes/http");
    assert_eq!(transport.stats().snapshot().sniffs, 1);
    assert_eq!(transport.hosts()[0].host(), Some("127.0.0.1"));
}

#[test]
fn sniff_on_start_runs_during_build() {
    let document = nodes_document(&["127.0.0.1:9400"]);
    let sender = ScriptedSender::new(move |_| json(200, &document));
    let transport = transport(&["localhost:9200"], fast_settings().with_sniff_on_start(true), &sender);

    assert_eq!(sender.paths(), ["/_nodes/http"]);
    assert_eq!(transport.hosts()[0].port(), Some(9400));
}

#[test]
fn async_requests_resolve_to_any_status() {
    let sender = ScriptedSender::new(|_| json(500, r#"{"error":"boom"}"#));
    let transport = transport(&["localhost:9200"], fast_settings(), &sender);

    let result = futures::executor::block_on(transport.request_async(Request::get("")))
        .expect("a well formed response");

    assert_eq!(result.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!result.is_success());
    assert!(result.into_response().expect_err("500").is_api());
    assert_eq!(sender.sent_count(), 1);
}

#[test]
fn aborted_requests_resolve_to_cancellation() {
    let sender =
        ScriptedSender::new(|_| json(200, "{}")).delayed(Duration::from_secs(5));
    let transport = transport(&["localhost:9200"], fast_settings(), &sender);

    let handle = transport.request_async(Request::get(""));
    handle.abort();
    let err = futures::executor::block_on(handle).expect_err("aborted");

    assert_eq!(*err.kind(), Kind::Unknown);
    assert_eq!(transport.dead_count(), 0);
}

#[test]
fn callbacks_receive_the_outcome() {
    let sender = ScriptedSender::new(|_| json(201, r#"{"result":"created"}"#));
    let transport = transport(&["localhost:9200"], fast_settings(), &sender);

    let (tx, rx) = std::sync::mpsc::channel();
    let handle = transport.request_with_callback(
        Request::put("books/_doc/1").with_body(r#"{"title":"Rust"}"#),
        move |outcome| {
            let _ = tx.send(outcome.map(|r| r.status()));
        },
    );

    let status = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("callback ran")
        .expect("201");
    assert_eq!(status, StatusCode::CREATED);
    futures::executor::block_on(handle).expect("callback task completes");
}

#[test]
fn slow_replies_time_out_and_kill_the_node() {
    let sender =
        ScriptedSender::new(|_| json(200, "{}")).delayed(Duration::from_millis(500));
    let settings = fast_settings()
        .with_request_timeout(Duration::from_millis(50))
        .with_retry_on_failure(false);
    let transport = transport(&["localhost:9200"], settings, &sender);

    let err = transport.request(Request::get("")).expect_err("too slow");

    assert!(err.is_timeout());
    assert_eq!(err.host().and_then(|h| h.port()), Some(9200));
    assert_eq!(transport.dead_count(), 1);
}

#[test]
fn concurrent_callers_share_one_pool() {
    let served = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&served);
    let sender = ScriptedSender::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        json(200, "{}")
    });
    let transport = transport(&["localhost:9200", "localhost:9201"], fast_settings(), &sender);
    let failures = Arc::new(Mutex::new(Vec::new()));

    let workers: Vec<_> = (0..8)
        .map(|_| {
            let transport = transport.clone();
            let failures = Arc::clone(&failures);
            thread::spawn(move || {
                for _ in 0..10 {
                    if let Err(e) = transport.request(Request::get("")) {
                        failures.lock().unwrap().push(e.to_string());
                    }
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker finished");
    }

    assert!(failures.lock().unwrap().is_empty());
    assert_eq!(served.load(Ordering::SeqCst), 80);
    assert_eq!(transport.stats().snapshot().requests_successful, 80);
}

#[test]
fn blocking_calls_are_refused_on_a_current_thread_runtime() {
    let sender = ScriptedSender::new(|_| json(200, "{}"));
    let transport = transport(&["localhost:9200"], fast_settings(), &sender);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime");

    let err = runtime.block_on(async { transport.request(Request::get("")) });

    assert!(err.expect_err("would deadlock").is_builder());
    assert_eq!(sender.sent_count(), 0);
}

#[test]
fn blocking_calls_complete_on_a_multi_thread_worker() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("runtime");
    let sender = ScriptedSender::new(|_| json(200, "{}"));
    let transport = Transport::builder()
        .host("localhost:9200")
        .settings(fast_settings())
        .sender(sender.clone())
        .runtime(runtime.handle().clone())
        .build()
        .expect("valid transport");

    let (tx, rx) = std::sync::mpsc::channel();
    runtime.spawn(async move {
        let connection = transport.get_connection().map(|c| c.host().clone());
        let outcome = transport.request(Request::get("")).map(|r| r.status());
        let _ = tx.send((connection, outcome));
    });

    let (connection, outcome) = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("blocking calls on a worker return");
    assert_eq!(connection.expect("pool has hosts").port(), Some(9200));
    assert_eq!(outcome.expect("200"), StatusCode::OK);
    assert_eq!(sender.sent_count(), 1);
    runtime.shutdown_timeout(Duration::from_secs(1));
}

#[test]
fn detached_targets_skip_health_bookkeeping() {
    let sender = ScriptedSender::new(|_| refused());
    let transport = transport(&["localhost:9200"], fast_settings().with_max_retries(1), &sender);
    let target = eskit_client::HostAddress::parse("localhost:9999", eskit_client::Scheme::Http)
        .expect("valid host");

    let err = transport
        .request(Request::get("").on_connection(eskit_client::ConnectionRef::detached(target)))
        .expect_err("refused");

    assert!(err.is_request());
    assert_eq!(sender.authorities(), ["localhost:9999", "localhost:9999"]);
    assert_eq!(transport.dead_count(), 0);
    assert_eq!(transport.stats().snapshot().connections_marked_dead, 0);
}
