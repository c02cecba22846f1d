use super::*;
use crate::args::PositiveU64;
use crate::shutdown::shutdown_channel;
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

fn limit(value: u64) -> Result<PositiveU64, String> {
    Ok(PositiveU64::try_from(value)?)
}

fn run_async_test<F>(future: F) -> Result<(), String>
where
    F: Future<Output = Result<(), String>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| format!("Failed to build runtime: {}", err))?;
    runtime.block_on(future)
}

/// Serves `status` to every request; returns the base URL.
async fn spawn_status_server(status: u16) -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {}", err))?;
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buffer = [0u8; 2048];
                if stream.read(&mut buffer).await.is_err() {
                    return;
                }
                let body = r#"{"items":[],"page":1,"size":20,"hasNext":false}"#;
                let response = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                drop(stream.write_all(response.as_bytes()).await);
                drop(stream.shutdown().await);
            });
        }
    });
    Ok(format!("http://{}", addr))
}

/// Accepts connections and never answers them; returns the base URL.
async fn spawn_silent_server() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .map_err(|err| format!("bind failed: {}", err))?;
    let addr = listener
        .local_addr()
        .map_err(|err| format!("local_addr failed: {}", err))?;
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    Ok(format!("http://{}", addr))
}

fn settings(target: Target, vus: usize) -> RunSettings {
    RunSettings {
        target,
        vus,
        duration: Duration::from_millis(400),
        sleep: Duration::from_millis(20),
        graceful_stop: Duration::from_secs(5),
        expected_status: 200,
    }
}

#[test]
fn page_for_offset_zero_is_first_page() -> Result<(), String> {
    if page_for_offset(0, limit(20)?) != 1 {
        return Err("OFFSET=0, LIMIT=20 should map to page 1".to_owned());
    }
    Ok(())
}

#[test]
fn page_for_offset_forty_is_third_page() -> Result<(), String> {
    if page_for_offset(40, limit(20)?) != 3 {
        return Err("OFFSET=40, LIMIT=20 should map to page 3".to_owned());
    }
    Ok(())
}

#[test]
fn page_for_offset_rounds_down() -> Result<(), String> {
    let cases = [(39, 20, 2), (19, 20, 1), (20, 20, 2), (5, 1, 6), (999_999, 1000, 1000)];
    for (offset, size, expected) in cases {
        let page = page_for_offset(offset, limit(size)?);
        if page != expected {
            return Err(format!(
                "offset {} limit {}: expected page {}, got {}",
                offset, size, expected, page
            ));
        }
    }
    Ok(())
}

#[test]
fn target_url_has_single_page_and_size() -> Result<(), String> {
    let target = build_target("http://localhost:8080", 40, limit(20)?)?;
    if target.url.as_str() != "http://localhost:8080/api/v1/posts?page=3&size=20" {
        return Err(format!("Unexpected url: {}", target.url));
    }
    let pairs: Vec<(String, String)> = target
        .url
        .query_pairs()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let pages: Vec<&(String, String)> = pairs.iter().filter(|(key, _)| key == "page").collect();
    let sizes: Vec<&(String, String)> = pairs.iter().filter(|(key, _)| key == "size").collect();
    if pages.len() != 1 || sizes.len() != 1 || pairs.len() != 2 {
        return Err(format!("Unexpected query pairs: {:?}", pairs));
    }
    if target.tag() != "page_3" || target.query != (PageQuery { page: 3, size: 20 }) {
        return Err("Unexpected tag or query".to_owned());
    }
    Ok(())
}

#[test]
fn target_keeps_prefix_and_trims_slash() -> Result<(), String> {
    let trimmed = build_target("http://localhost:8080/", 0, limit(20)?)?;
    if trimmed.url.as_str() != "http://localhost:8080/api/v1/posts?page=1&size=20" {
        return Err(format!("Unexpected url: {}", trimmed.url));
    }
    let prefixed = build_target("https://example.com/board/", 100, limit(50)?)?;
    if prefixed.url.as_str() != "https://example.com/board/api/v1/posts?page=3&size=50" {
        return Err(format!("Unexpected url: {}", prefixed.url));
    }
    Ok(())
}

#[test]
fn target_rejects_bad_base_urls() -> Result<(), String> {
    for base in [
        "localhost:8080/x",
        "not a url",
        "ftp://example.com",
        "http://example.com/?page=2",
        "http://example.com/#top",
    ] {
        if build_target(base, 0, limit(20)?).is_ok() {
            return Err(format!("Expected '{}' to be rejected", base));
        }
    }
    Ok(())
}

#[test]
fn status_check_only_passes_on_expected() -> Result<(), String> {
    if !check_status(200, 200) {
        return Err("200 should pass".to_owned());
    }
    for status in [0, 201, 204, 302, 404, 500] {
        if check_status(status, 200) {
            return Err(format!("{} should fail the check", status));
        }
    }
    if check_name(200) != "status is 200" {
        return Err("Unexpected check name".to_owned());
    }
    Ok(())
}

#[test]
fn failed_request_classification() -> Result<(), String> {
    let cases = [
        (200, false, false),
        (302, false, false),
        (399, false, false),
        (404, false, true),
        (503, false, true),
        (0, true, true),
        (200, true, true),
    ];
    for (status, transport_error, expected) in cases {
        if is_failed_request(status, transport_error) != expected {
            return Err(format!(
                "status {} transport_error {}: expected failed={}",
                status, transport_error, expected
            ));
        }
    }
    Ok(())
}

#[test]
fn client_rejects_invalid_header() -> Result<(), String> {
    let headers = vec![("Bad Header".to_owned(), "x".to_owned())];
    if build_client(Duration::from_secs(1), &headers).is_ok() {
        return Err("Expected invalid header name to fail".to_owned());
    }
    Ok(())
}

#[test]
fn execute_get_reports_transport_error() -> Result<(), String> {
    run_async_test(async {
        let listener = std::net::TcpListener::bind("127.0.0.1:0")
            .map_err(|err| format!("bind failed: {}", err))?;
        let addr = listener
            .local_addr()
            .map_err(|err| format!("local_addr failed: {}", err))?;
        drop(listener);

        let client = build_client(Duration::from_secs(2), &[])?;
        let url = reqwest::Url::parse(&format!("http://{}/api/v1/posts", addr))
            .map_err(|err| format!("url parse failed: {}", err))?;
        let outcome = execute_get(&client, &url).await;
        if outcome.status != 0 || !outcome.transport_error {
            return Err(format!("Unexpected outcome: {:?}", outcome));
        }
        Ok(())
    })
}

#[test]
fn run_test_records_passing_requests() -> Result<(), String> {
    run_async_test(async {
        let base = spawn_status_server(200).await?;
        let target = build_target(&base, 40, limit(20)?)?;
        let client = build_client(Duration::from_secs(5), &[])?;
        let (interrupt_tx, _) = shutdown_channel();

        let outcome = run_test(client, &settings(target, 2), &interrupt_tx).await?;
        let totals = &outcome.report.totals;
        if outcome.interrupted {
            return Err("Run should not be interrupted".to_owned());
        }
        if totals.http_reqs == 0 {
            return Err("Expected requests to be recorded".to_owned());
        }
        if totals.http_req_failed != 0 || totals.checks_passed != totals.http_reqs {
            return Err(format!(
                "Expected all requests to pass: reqs {} failed {} checks {}",
                totals.http_reqs, totals.http_req_failed, totals.checks_passed
            ));
        }
        if !totals.by_tag.contains_key("page_3") {
            return Err("Expected metrics tagged page_3".to_owned());
        }
        if totals.data_received == 0 {
            return Err("Expected data_received to count body bytes".to_owned());
        }
        if outcome.report.vus != 2 {
            return Err("Unexpected vus".to_owned());
        }
        Ok(())
    })
}

#[test]
fn run_test_records_failing_status() -> Result<(), String> {
    run_async_test(async {
        let base = spawn_status_server(500).await?;
        let target = build_target(&base, 0, limit(20)?)?;
        let client = build_client(Duration::from_secs(5), &[])?;
        let (interrupt_tx, _) = shutdown_channel();

        let outcome = run_test(client, &settings(target, 1), &interrupt_tx).await?;
        let report = &outcome.report;
        if report.totals.http_reqs == 0 {
            return Err("Expected requests to be recorded".to_owned());
        }
        if report.http_req_failed_rate() < 1.0 || report.totals.checks_passed != 0 {
            return Err("Expected every request to fail".to_owned());
        }
        Ok(())
    })
}

#[test]
fn run_test_stops_on_interrupt() -> Result<(), String> {
    run_async_test(async {
        let base = spawn_status_server(200).await?;
        let target = build_target(&base, 0, limit(20)?)?;
        let client = build_client(Duration::from_secs(5), &[])?;
        let (interrupt_tx, _) = shutdown_channel();

        let mut run_settings = settings(target, 1);
        run_settings.duration = Duration::from_secs(60);
        let sender = interrupt_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(150)).await;
            drop(sender.send(()));
        });

        let outcome = run_test(client, &run_settings, &interrupt_tx).await?;
        if !outcome.interrupted {
            return Err("Expected the run to be interrupted".to_owned());
        }
        if outcome.report.duration >= Duration::from_secs(10) {
            return Err("Interrupted run took too long".to_owned());
        }
        Ok(())
    })
}

#[test]
fn run_test_aborts_iterations_after_graceful_stop() -> Result<(), String> {
    run_async_test(async {
        let base = spawn_silent_server().await?;
        let target = build_target(&base, 0, limit(20)?)?;
        let client = build_client(Duration::from_secs(5), &[])?;
        let (interrupt_tx, _) = shutdown_channel();
        let run_settings = RunSettings {
            duration: Duration::from_millis(200),
            graceful_stop: Duration::from_millis(200),
            ..settings(target, 2)
        };

        let started = std::time::Instant::now();
        let outcome = run_test(client, &run_settings, &interrupt_tx).await?;
        let elapsed = started.elapsed();
        if elapsed >= Duration::from_secs(2) {
            return Err(format!(
                "Run should end once graceful stop elapses, took {:?}",
                elapsed
            ));
        }
        let totals = &outcome.report.totals;
        if totals.http_reqs != 0 || totals.iterations != 0 {
            return Err(format!(
                "Aborted iterations should not be recorded: reqs {} iterations {}",
                totals.http_reqs, totals.iterations
            ));
        }
        if outcome.interrupted {
            return Err("Run should not be marked interrupted".to_owned());
        }
        Ok(())
    })
}
