// Integration tests for deadline-enforced calls

use callwrap::config::{ConfigBuilder, WrapConfig};
use callwrap::{with_deadline, Deadline, DeadlineError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn print_hello(_: ()) -> &'static str {
    thread::sleep(Duration::from_secs(1));
    "Hello"
}

#[test]
fn test_one_second_call_within_two_second_deadline() {
    let wrapped = with_deadline(Duration::from_secs(2))
        .named("print_hello")
        .wrap(print_hello);

    assert_eq!(wrapped.call(()).unwrap(), "Hello");
    assert_eq!(wrapped.deadline().armed(), 0);
}

#[test]
fn test_one_second_call_with_zero_deadline() {
    let wrapped = Deadline::from_secs(0).named("print_hello").wrap(print_hello);

    let start = Instant::now();
    let err = wrapped.call(()).unwrap_err();

    assert!(err.is_timeout());
    assert!(start.elapsed() < Duration::from_millis(500));
}

#[test]
fn test_one_second_call_with_sub_second_deadline() {
    let wrapped = with_deadline(Duration::from_millis(300))
        .named("print_hello")
        .wrap(print_hello);

    let start = Instant::now();
    match wrapped.call(()) {
        Err(DeadlineError::Timeout { name, after }) => {
            assert_eq!(name, "print_hello");
            assert_eq!(after, Duration::from_millis(300));
        }
        other => panic!("Expected timeout, got {:?}", other),
    }
    // The caller is released at the deadline, not when the worker finishes
    assert!(start.elapsed() < Duration::from_millis(900));
    assert_eq!(wrapped.deadline().armed(), 0);
}

#[test]
fn test_callable_error_propagates_unchanged() {
    let read = with_deadline(Duration::from_secs(1)).wrap(|path: &'static str| {
        std::fs::read_to_string(path)
    });

    let err = read
        .try_call("/nonexistent/callwrap/input.txt")
        .unwrap_err()
        .into_failed()
        .unwrap();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    assert_eq!(read.deadline().armed(), 0);
}

#[test]
fn test_concurrent_callers_each_get_their_own_deadline() {
    let deadline = with_deadline(Duration::from_millis(200)).named("mixed");
    let completed = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..6u64)
        .map(|i| {
            let deadline = deadline.clone();
            let completed = Arc::clone(&completed);
            thread::spawn(move || {
                // Even workers are fast, odd workers overrun
                let sleep = if i % 2 == 0 { 10 } else { 600 };
                deadline.call(move || {
                    thread::sleep(Duration::from_millis(sleep));
                    completed.fetch_add(1, Ordering::SeqCst);
                    i
                })
            })
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    for (i, result) in results.iter().enumerate() {
        if i % 2 == 0 {
            assert_eq!(*result.as_ref().unwrap(), i as u64);
        } else {
            assert!(result.as_ref().unwrap_err().is_timeout());
        }
    }
    assert_eq!(deadline.armed(), 0);
}

#[test]
fn test_deadline_from_env_config() {
    std::env::set_var("CALLWRAP_ITEST_DEADLINE_SECS", "1");
    std::env::set_var("CALLWRAP_ITEST_WORKER_NAME", "itest-worker");

    let config = WrapConfig::from_env_with_defaults("CALLWRAP_ITEST_").unwrap();
    let deadline = Deadline::from_config(&config);

    assert_eq!(deadline.duration(), Duration::from_secs(1));
    let worker = deadline
        .call(|| thread::current().name().map(str::to_string))
        .unwrap();
    assert_eq!(worker.as_deref(), Some("itest-worker"));

    std::env::remove_var("CALLWRAP_ITEST_DEADLINE_SECS");
    std::env::remove_var("CALLWRAP_ITEST_WORKER_NAME");
}

#[test]
fn test_largest_configured_deadline_runs_call() {
    std::env::set_var("CALLWRAP_MAXTEST_DEADLINE_SECS", u64::MAX.to_string());

    let config = WrapConfig::from_env_with_defaults("CALLWRAP_MAXTEST_").unwrap();
    let deadline = Deadline::from_config(&config);
    assert_eq!(deadline.call(|| 7).unwrap(), 7);
    assert_eq!(deadline.armed(), 0);

    std::env::remove_var("CALLWRAP_MAXTEST_DEADLINE_SECS");
}

#[test]
fn test_duration_max_deadline_runs_call() {
    let wrapped = with_deadline(Duration::MAX).wrap(|n: u32| n + 1);
    assert_eq!(wrapped.call(6).unwrap(), 7);
}

#[tokio::test]
async fn test_async_scenarios() {
    let hello = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        "Hello"
    };
    let within = with_deadline(Duration::from_secs(2)).run(hello).await;
    assert_eq!(within.unwrap(), "Hello");

    let late = with_deadline(Duration::from_millis(20))
        .run(tokio::time::sleep(Duration::from_secs(1)))
        .await;
    assert!(late.unwrap_err().is_timeout());
}
