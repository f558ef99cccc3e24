//! Behavioral tests for the ordered parallel runner.

use ampora::batch::{BatchError, BatchRunner, FailurePolicy, pair_surviving};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[tokio::test]
async fn output_length_matches_input_length() {
    for n in [0usize, 1, 2, 7, 20] {
        for workers in [1usize, 3, 8] {
            let jobs: Vec<_> = (0..n)
                .map(|i| move || async move { Ok::<_, std::io::Error>(i) })
                .collect();
            let output = BatchRunner::new(workers).run(jobs).await.unwrap();
            assert_eq!(output.len(), n, "n={n} workers={workers}");
        }
    }
}

#[tokio::test]
async fn results_stay_index_aligned_when_completion_order_is_reversed() {
    let n = 6usize;
    // Earlier jobs sleep longer, so completion order is roughly reversed.
    let jobs: Vec<_> = (0..n)
        .map(|i| {
            move || async move {
                tokio::time::sleep(Duration::from_millis(((n - i) * 20) as u64)).await;
                Ok::<_, std::io::Error>(i * 100)
            }
        })
        .collect();

    let output = BatchRunner::new(n).run(jobs).await.unwrap();
    for (i, slot) in output.slots().iter().enumerate() {
        assert_eq!(*slot, Some(i * 100));
    }
}

#[tokio::test]
async fn mixed_batch_keeps_successes_and_drops_failures() {
    let jobs: Vec<_> = (0..3)
        .map(|i| {
            move || async move {
                match i {
                    1 => Err(std::io::Error::other("slide 1 failed")),
                    _ => Ok(i),
                }
            }
        })
        .collect();

    let output = BatchRunner::new(2).run(jobs).await.unwrap();
    assert_eq!(output.slots(), &[Some(0), None, Some(2)]);
    assert_eq!(output.failed(), 1);
    assert_eq!(output.failures()[0].index, 1);
    assert!(output.failures()[0].message.contains("slide 1 failed"));
}

#[tokio::test]
async fn serial_execution_is_still_index_aligned() {
    let jobs: Vec<_> = (0..5)
        .map(|i| move || async move { Ok::<_, std::io::Error>(i + 1) })
        .collect();

    let output = BatchRunner::new(1).run(jobs).await.unwrap();
    let values: Vec<Option<usize>> = output.into_slots();
    assert_eq!(values, vec![Some(1), Some(2), Some(3), Some(4), Some(5)]);
}

#[tokio::test]
async fn total_failure_errors_under_default_policy() {
    let jobs: Vec<_> = (0..4)
        .map(|_| move || async move { Err::<usize, _>(std::io::Error::other("down")) })
        .collect();

    let result = BatchRunner::new(2).run(jobs).await;
    match result {
        Err(BatchError::TotalFailure { attempted }) => assert_eq!(attempted, 4),
        other => panic!("expected TotalFailure, got {other:?}"),
    }
}

#[tokio::test]
async fn total_failure_is_all_absent_under_lenient_policy() {
    let jobs: Vec<_> = (0..4)
        .map(|_| move || async move { Err::<usize, _>(std::io::Error::other("down")) })
        .collect();

    let output = BatchRunner::new(2)
        .with_policy(FailurePolicy::Lenient)
        .run(jobs)
        .await
        .unwrap();
    assert_eq!(output.len(), 4);
    assert_eq!(output.succeeded(), 0);
    assert!(output.slots().iter().all(|s| s.is_none()));
}

#[tokio::test]
async fn any_failure_policy_reports_the_lowest_failing_index() {
    let jobs: Vec<_> = (0..5)
        .map(|i| {
            move || async move {
                if i == 1 || i == 3 {
                    Err(std::io::Error::other(format!("job {i} broke")))
                } else {
                    Ok(i)
                }
            }
        })
        .collect();

    let result = BatchRunner::new(5)
        .with_policy(FailurePolicy::ErrorOnAnyFailure)
        .run(jobs)
        .await;
    match result {
        Err(BatchError::JobFailed { index, message }) => {
            assert_eq!(index, 1);
            assert!(message.contains("job 1 broke"));
        }
        other => panic!("expected JobFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn every_job_runs_exactly_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let jobs: Vec<_> = (0..10)
        .map(|i| {
            let calls = Arc::clone(&calls);
            move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, std::io::Error>(i)
            }
        })
        .collect();

    let output = BatchRunner::new(3).run(jobs).await.unwrap();
    assert_eq!(output.succeeded(), 10);
    assert_eq!(calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn concurrency_never_exceeds_the_worker_bound() {
    let workers = 2usize;
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let jobs: Vec<_> = (0..8)
        .map(|i| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            move || async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(25)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, std::io::Error>(i)
            }
        })
        .collect();

    BatchRunner::new(workers).run(jobs).await.unwrap();
    assert!(peak.load(Ordering::SeqCst) <= workers);
}

#[tokio::test]
async fn rerunning_file_writing_jobs_overwrites_instead_of_appending() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slide_01.txt");

    let make_jobs = |content: &'static str| {
        let path = path.clone();
        vec![move || async move {
            tokio::fs::write(&path, content).await?;
            Ok::<_, std::io::Error>(())
        }]
    };

    BatchRunner::new(1).run(make_jobs("first run")).await.unwrap();
    BatchRunner::new(1).run(make_jobs("second run")).await.unwrap();

    let contents = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(contents, "second run");
}

#[test]
fn pairing_intersection_matches_the_documented_example() {
    // images: [Some(a), None, Some(c)]; audio: [Some(x), Some(y), None]
    let images = vec![Some('a'), None, Some('c')];
    let audio = vec![Some('x'), Some('y'), None];
    let pairs = pair_surviving(images, audio);
    assert_eq!(pairs, vec![(0, 'a', 'x')]);
}
