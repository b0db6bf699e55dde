// src/engine/batch.rs
//
// Several independent resizes of one shared, read-only source.
//
// Each request is a separate orchestrator call with its own destination and
// scratch buffers, so they run in parallel on rayon without coordination.
// A shared MemoryBudget provides backpressure across all of them.

use crate::engine::memory::MemoryBudget;
use crate::engine::pixel::PixelBuffer;
use crate::engine::resize::{resize_with_budget, ResizeOptions};
use crate::error::ScaleError;
use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::debug;

type BatchResult<T> = std::result::Result<T, ScaleError>;

/// Upper bound for an explicit `concurrency`.
pub const MAX_CONCURRENCY: usize = 1024;

/// Resize `source` once per entry of `requests`, in parallel.
///
/// Results come back in request order. One failing request does not affect
/// the others.
pub fn resize_batch(
    source: &PixelBuffer,
    requests: &[ResizeOptions],
) -> Vec<BatchResult<PixelBuffer>> {
    resize_batch_with_budget(source, requests, &MemoryBudget::unlimited())
}

/// Like [`resize_batch`], charging every request to one shared `budget`.
///
/// Requests that do not fit while others hold memory fail with
/// `MemoryLimitExceeded`; the caller may retry them.
pub fn resize_batch_with_budget(
    source: &PixelBuffer,
    requests: &[ResizeOptions],
    budget: &MemoryBudget,
) -> Vec<BatchResult<PixelBuffer>> {
    debug!(requests = requests.len(), "resize batch");
    requests
        .par_iter()
        .map(|opts| resize_with_budget(source, opts, budget))
        .collect()
}

/// Run the batch on a dedicated pool of `concurrency` threads.
///
/// `concurrency == 0` uses the global rayon pool.
pub fn resize_batch_with_concurrency(
    source: &PixelBuffer,
    requests: &[ResizeOptions],
    concurrency: usize,
) -> BatchResult<Vec<BatchResult<PixelBuffer>>> {
    if concurrency == 0 {
        return Ok(resize_batch(source, requests));
    }
    let pool = build_pool(concurrency)?;
    Ok(pool.install(|| resize_batch(source, requests)))
}

fn build_pool(concurrency: usize) -> BatchResult<ThreadPool> {
    if concurrency > MAX_CONCURRENCY {
        return Err(ScaleError::invalid_argument(
            "concurrency",
            concurrency.to_string(),
            format!("must be 0 or 1-{MAX_CONCURRENCY}"),
        ));
    }
    rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .build()
        .map_err(|e| ScaleError::internal_panic(format!("failed to build thread pool: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::pixel::rgba;
    use crate::engine::resize::resize;
    use crate::ops::ResizeAlgorithm;

    fn source() -> PixelBuffer {
        PixelBuffer::from_fn(32, 24, false, |x, y| rgba((x * 8) as u8, (y * 10) as u8, 77, 255))
    }

    fn requests() -> Vec<ResizeOptions> {
        vec![
            ResizeOptions::new(16, 12).algorithm(ResizeAlgorithm::Gd),
            ResizeOptions::new(10, 10)
                .algorithm(ResizeAlgorithm::GdFixed)
                .keep_aspect(true),
            ResizeOptions::new(0, 5),
            ResizeOptions::new(48, 36).algorithm(ResizeAlgorithm::Gm),
            ResizeOptions::new(8, 6).algorithm(ResizeAlgorithm::GmFixed),
        ]
    }

    #[test]
    fn results_match_sequential_resizes_in_order() {
        let src = source();
        let requests = requests();
        let results = resize_batch(&src, &requests);
        assert_eq!(results.len(), requests.len());
        for (opts, result) in requests.iter().zip(&results) {
            match (resize(&src, opts), result) {
                (Ok(expected), Ok(actual)) => assert_eq!(&expected, actual),
                (Err(_), Err(ScaleError::InvalidResizeDimensions { .. })) => {}
                (expected, actual) => panic!("mismatch: {expected:?} vs {actual:?}"),
            }
        }
    }

    #[test]
    fn shared_budget_is_released_after_batch() {
        let src = source();
        let budget = MemoryBudget::with_limit(1 << 20);
        let results = resize_batch_with_budget(&src, &requests(), &budget);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 4);
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn explicit_concurrency() {
        let src = source();
        let requests = requests();
        let pooled = resize_batch_with_concurrency(&src, &requests, 2).unwrap();
        let default = resize_batch_with_concurrency(&src, &requests, 0).unwrap();
        assert_eq!(pooled.len(), default.len());
        assert_eq!(pooled[0].as_ref().unwrap(), default[0].as_ref().unwrap());

        let err = resize_batch_with_concurrency(&src, &requests, MAX_CONCURRENCY + 1).unwrap_err();
        assert!(matches!(err, ScaleError::InvalidArgument { .. }));
    }
}
