// ConsoleWatch - tests/e2e_poller.rs
//
// End-to-end tests for the poll loop.
//
// Two kinds of test live here:
//   - Cadence tests drive `ConsolePoller` with a scripted transport on a
//     paused tokio clock, so the exact delay between requests is observable.
//   - HTTP tests run the real `HttpTransport` against a minimal HTTP responder
//     on a loopback socket, exercising the wire contract (query parameter,
//     JSON body, empty body, error status) with no mocks in the client path.

use async_trait::async_trait;
use consolewatch::app::poller::{lock_view, ConsolePoller, SharedView};
use consolewatch::app::transport::{ConsoleTransport, HttpTransport};
use consolewatch::core::model::{FetchResponse, PollProgress, PollTimings};
use consolewatch::util::error::TransportError;
use std::collections::VecDeque;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

// =============================================================================
// Helpers
// =============================================================================

type Answer = Result<Option<FetchResponse>, TransportError>;

/// Transport answering from a script and recording when and where it was
/// asked. Cancels `done` once the script runs out.
struct ScriptedTransport {
    answers: Mutex<VecDeque<Answer>>,
    calls: Arc<Mutex<Vec<(Instant, u64)>>>,
    done: CancellationToken,
}

#[async_trait]
impl ConsoleTransport for ScriptedTransport {
    async fn fetch(&self, start: u64) -> Answer {
        self.calls.lock().unwrap().push((Instant::now(), start));
        match self.answers.lock().unwrap().pop_front() {
            Some(answer) => answer,
            None => {
                self.done.cancel();
                Ok(None)
            }
        }
    }

    fn endpoint(&self) -> &str {
        "scripted://console"
    }
}

fn scripted(
    answers: Vec<Answer>,
    done: &CancellationToken,
) -> (ScriptedTransport, Arc<Mutex<Vec<(Instant, u64)>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let transport = ScriptedTransport {
        answers: Mutex::new(answers.into()),
        calls: Arc::clone(&calls),
        done: done.clone(),
    };
    (transport, calls)
}

fn refused() -> Answer {
    Err(TransportError::Status {
        url: "scripted://console".to_string(),
        status: 502,
    })
}

/// Minimal HTTP/1.1 responder. `respond` maps the `start` query value to a
/// status code and body. Returns the base URL and the list of starts seen.
async fn serve(
    respond: impl Fn(u64) -> (u16, String) + Send + Sync + 'static,
) -> (String, Arc<Mutex<Vec<u64>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_task = Arc::clone(&seen);
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            let Ok((mut sock, _)) = listener.accept().await else {
                return;
            };
            let respond = Arc::clone(&respond);
            let seen = Arc::clone(&seen_task);
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match sock.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let request = String::from_utf8_lossy(&buf);
                let start = request
                    .split_whitespace()
                    .nth(1)
                    .and_then(|target| target.split("start=").nth(1))
                    .and_then(|v| v.split('&').next())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(u64::MAX);
                seen.lock().unwrap().push(start);

                let (status, body) = respond(start);
                let reply = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = sock.write_all(reply.as_bytes()).await;
                let _ = sock.shutdown().await;
            });
        }
    });

    (format!("http://{addr}/console/text"), seen)
}

// =============================================================================
// Cadence (paused clock)
// =============================================================================

/// New data -> 500 ms, no data -> 3000 ms, failure -> 1000 ms.
#[tokio::test(start_paused = true)]
async fn e2e_delay_follows_answer_kind() {
    let done = CancellationToken::new();
    let (transport, calls) = scripted(
        vec![
            Ok(Some(FetchResponse::new(0, 5, "hello"))),
            Ok(None),
            refused(),
            Ok(Some(FetchResponse::new(5, 3, "abc"))),
        ],
        &done,
    );
    let (tx, rx) = mpsc::channel();
    let view = SharedView::default();

    ConsolePoller::new(transport, Arc::clone(&view), PollTimings::default(), tx)
        .schedule_fetch(Duration::ZERO, true, done.clone())
        .await;

    let calls = calls.lock().unwrap().clone();
    let gaps: Vec<u128> = calls
        .windows(2)
        .map(|w| (w[1].0 - w[0].0).as_millis())
        .collect();
    assert_eq!(gaps, vec![500, 3000, 1000, 500]);

    let starts: Vec<u64> = calls.iter().map(|c| c.1).collect();
    assert_eq!(starts, vec![0, 5, 5, 5, 8]);

    assert_eq!(lock_view(&view).state.rendered(), "helloabc");
    assert_eq!(rx.try_iter().last(), Some(PollProgress::Stopped));
}

/// Failures never end the loop and never lose the repeat flag.
#[tokio::test(start_paused = true)]
async fn e2e_unlimited_retries_then_continues_polling() {
    let done = CancellationToken::new();
    let mut answers: Vec<Answer> = (0..25).map(|_| refused()).collect();
    answers.push(Ok(Some(FetchResponse::new(0, 2, "ok"))));
    answers.push(Ok(None));
    let (transport, calls) = scripted(answers, &done);
    let (tx, rx) = mpsc::channel();

    ConsolePoller::new(transport, SharedView::default(), PollTimings::default(), tx)
        .schedule_fetch(Duration::ZERO, true, done.clone())
        .await;

    // 25 failures + success + empty + the call that exhausted the script.
    assert_eq!(calls.lock().unwrap().len(), 28);
    let messages: Vec<_> = rx.try_iter().collect();
    let failures = messages
        .iter()
        .filter(|m| matches!(m, PollProgress::TransportFailed { .. }))
        .count();
    assert_eq!(failures, 25);
    assert!(messages.contains(&PollProgress::Applied {
        text: "ok".to_string(),
        gap: false,
        cursor: 2
    }));
}

/// The first request waits for the initial delay.
#[tokio::test(start_paused = true)]
async fn e2e_initial_delay_is_honoured() {
    let done = CancellationToken::new();
    let (transport, calls) = scripted(vec![Ok(None)], &done);
    let (tx, _rx) = mpsc::channel();
    let began = Instant::now();

    ConsolePoller::new(transport, SharedView::default(), PollTimings::default(), tx)
        .schedule_fetch(Duration::from_millis(750), false, done.clone())
        .await;

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!((calls[0].0 - began).as_millis(), 750);
}

/// Cancelling while a request waits for its delay stops without fetching.
#[tokio::test(start_paused = true)]
async fn e2e_cancel_during_wait_stops_loop() {
    let done = CancellationToken::new();
    let (transport, calls) = scripted(vec![Ok(Some(FetchResponse::new(0, 1, "x")))], &done);
    let (tx, rx) = mpsc::channel();
    let cancel = CancellationToken::new();

    let poller = ConsolePoller::new(transport, SharedView::default(), PollTimings::default(), tx);
    let handle = tokio::spawn(poller.schedule_fetch(Duration::from_secs(60), true, cancel.clone()));

    tokio::time::sleep(Duration::from_secs(1)).await;
    cancel.cancel();
    handle.await.unwrap();

    assert!(calls.lock().unwrap().is_empty());
    let messages: Vec<_> = rx.try_iter().collect();
    assert_eq!(messages.last(), Some(&PollProgress::Stopped));
}

/// A dropped progress receiver ends the loop instead of polling forever.
#[tokio::test(start_paused = true)]
async fn e2e_dropped_receiver_ends_loop() {
    let done = CancellationToken::new();
    let (transport, calls) = scripted(Vec::new(), &done);
    let (tx, rx) = mpsc::channel();
    drop(rx);

    ConsolePoller::new(transport, SharedView::default(), PollTimings::default(), tx)
        .schedule_fetch(Duration::ZERO, true, CancellationToken::new())
        .await;

    assert!(calls.lock().unwrap().is_empty());
}

// =============================================================================
// HTTP transport
// =============================================================================

#[tokio::test]
async fn e2e_http_fetch_sends_start_and_decodes_chunk() {
    let (url, seen) = serve(|start| {
        (
            200,
            format!(r#"{{"len":5, "start":{start}, "text": "hello"}}"#),
        )
    })
    .await;
    let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();

    let chunk = transport.fetch(42).await.unwrap().unwrap();

    assert_eq!(chunk, FetchResponse::new(42, 5, "hello"));
    assert_eq!(*seen.lock().unwrap(), vec![42]);
}

#[tokio::test]
async fn e2e_http_empty_body_is_no_data() {
    let (url, _) = serve(|_| (200, String::new())).await;
    let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();

    assert_eq!(transport.fetch(0).await.unwrap(), None);
}

#[tokio::test]
async fn e2e_http_error_status_is_transport_failure() {
    let (url, _) = serve(|_| (503, "busy".to_string())).await;
    let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();

    let err = transport.fetch(0).await.unwrap_err();
    assert!(
        matches!(err, TransportError::Status { status: 503, .. }),
        "unexpected error: {err}"
    );
}

#[tokio::test]
async fn e2e_http_garbage_body_is_decode_failure() {
    let (url, _) = serve(|_| (200, "<html>".to_string())).await;
    let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();

    let err = transport.fetch(0).await.unwrap_err();
    assert!(matches!(err, TransportError::Decode { .. }), "unexpected error: {err}");
}

#[tokio::test]
async fn e2e_http_unreachable_endpoint_is_request_failure() {
    // Bind then drop to obtain a port with nothing listening.
    let port = {
        let l = TcpListener::bind("127.0.0.1:0").await.unwrap();
        l.local_addr().unwrap().port()
    };
    let transport =
        HttpTransport::new(format!("http://127.0.0.1:{port}/console/text"), Duration::from_secs(5))
            .unwrap();

    let err = transport.fetch(0).await.unwrap_err();
    assert!(matches!(err, TransportError::Request { .. }), "unexpected error: {err}");
}

/// Full loop over HTTP: normal chunk, then a chunk after lost output, then
/// nothing new. The rendered output carries exactly one gap marker.
#[tokio::test]
async fn e2e_poller_over_http_renders_gap_once() {
    let (url, seen) = serve(|start| match start {
        0 => (200, r#"{"len":6, "start":0, "text": "boot\r\n"}"#.to_string()),
        6 => (
            200,
            r#"{"len":11, "start":20, "text": "<wifi> up\r\n"}"#.to_string(),
        ),
        _ => (200, String::new()),
    })
    .await;

    let timings = PollTimings {
        fast: Duration::from_millis(50),
        slow: Duration::from_millis(50),
        retry: Duration::from_millis(50),
    };
    let transport = HttpTransport::new(url, Duration::from_secs(5)).unwrap();
    let view = SharedView::default();
    let (tx, rx) = mpsc::channel();
    let cancel = CancellationToken::new();

    let handle = tokio::spawn(
        ConsolePoller::new(transport, Arc::clone(&view), timings, tx).schedule_fetch(
            Duration::ZERO,
            true,
            cancel.clone(),
        ),
    );

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut messages = Vec::new();
    while Instant::now() < deadline {
        messages.extend(rx.try_iter());
        if messages.contains(&PollProgress::NoData) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    cancel.cancel();
    handle.await.unwrap();

    let guard = lock_view(&view);
    assert_eq!(guard.state.cursor(), 31);
    assert_eq!(
        guard.state.rendered(),
        "boot\r\n\r\n&lt;missing lines\r\n&lt;wifi&gt; up\r\n"
    );
    assert_eq!(guard.state.rendered().matches("missing lines").count(), 1);
    drop(guard);

    let starts = seen.lock().unwrap().clone();
    assert_eq!(&starts[..3], &[0, 6, 31]);
    assert!(messages.contains(&PollProgress::Applied {
        text: "<wifi> up\r\n".to_string(),
        gap: true,
        cursor: 31
    }));
}
