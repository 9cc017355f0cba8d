//! Test-traffic generator: timing data for ping and raw byte streams for
//! download measurement.
//!
//! None of these operations have domain failure modes. The server never
//! computes bandwidth itself; it only serves bytes and timestamps for the
//! client to measure against. Payload content is random but not validated
//! by anyone -- only length and timing matter.

use std::convert::Infallible;
use std::time::Duration;

use bytes::Bytes;
use futures::Stream;
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use tokio::time::Instant;

/// Measure elapsed server time for a ping: sleep the configured simulated
/// processing delay and report the observed wall time in milliseconds.
///
/// Always non-negative; has no failure mode.
pub async fn ping_elapsed_ms(delay: Duration) -> f64 {
    let start = Instant::now();
    tokio::time::sleep(delay).await;
    start.elapsed().as_secs_f64() * 1000.0
}

/// Clamp a requested download size to the configured ceiling.
pub fn clamp_size_mb(requested_mb: u64, max_mb: u64) -> u64 {
    requested_mb.min(max_mb)
}

/// Produce a lazy stream of random byte chunks totalling exactly
/// `total_bytes`, with no chunk larger than `chunk_size`.
///
/// The stream is single-pass and pull-based: each chunk is generated when
/// polled, so a client can measure elapsed time against bytes received
/// instead of waiting for a fully buffered body. A disconnecting client
/// simply drops the stream; no state is left behind.
pub fn payload_stream(
    total_bytes: u64,
    chunk_size: usize,
) -> impl Stream<Item = Result<Bytes, Infallible>> + Send {
    let rng = SmallRng::from_entropy();
    futures::stream::unfold((total_bytes, rng), move |(remaining, mut rng)| async move {
        if remaining == 0 {
            return None;
        }
        let len = remaining.min(chunk_size as u64) as usize;
        let mut chunk = vec![0u8; len];
        rng.fill_bytes(&mut chunk);
        Some((Ok(Bytes::from(chunk)), (remaining - len as u64, rng)))
    })
}
