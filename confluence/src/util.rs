use std::future::Future;
use std::time::Duration;

use confluence_core::ConfluenceError;

/// Bound a task future by `timeout`, mapping expiry to `TaskTimeout(task)`.
///
/// `None` runs the future unbounded.
pub async fn with_task_timeout<T, Fut>(
    task: &str,
    timeout: Option<Duration>,
    fut: Fut,
) -> Result<T, ConfluenceError>
where
    Fut: Future<Output = Result<T, ConfluenceError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or_else(|_| Err(ConfluenceError::task_timeout(task))),
        None => fut.await,
    }
}

/// Await every labelled task concurrently and return their outputs in submission order.
///
/// A task that fails contributes an empty list; its error is logged with the label.
pub async fn join_or_empty<I, F, T>(tasks: I) -> Vec<Vec<T>>
where
    I: IntoIterator<Item = (String, F)>,
    F: Future<Output = Result<Vec<T>, ConfluenceError>>,
{
    let (labels, futs): (Vec<String>, Vec<F>) = tasks.into_iter().unzip();
    futures::future::join_all(futs)
        .await
        .into_iter()
        .zip(labels)
        .map(|(outcome, label)| match outcome {
            Ok(items) => items,
            Err(e) => {
                tracing::error!(task = %label, error = %e, "task failed; using empty result");
                Vec::new()
            }
        })
        .collect()
}
