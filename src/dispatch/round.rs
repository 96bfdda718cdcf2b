use std::time::Duration;

use futures_util::StreamExt;
use futures_util::stream::FuturesUnordered;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, warn};

use super::{DispatchClient, DispatchError, MinerEndpoint};
use crate::protocol::{MinerResponse, ProtocolMode, QueryRequest};

/// Time budgets for one round's fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTimeouts {
    /// Bound on each miner's request.
    pub per_miner: Duration,
    /// Bound on the whole fan-out.
    pub round: Duration,
}

impl DispatchTimeouts {
    /// Same budget for each miner and the round.
    pub fn uniform(timeout: Duration) -> Self {
        Self {
            per_miner: timeout,
            round: timeout,
        }
    }
}

/// Queries every miner concurrently and returns one response per miner, in `miners` order.
///
/// Miners that fail, time out or are still outstanding at the round deadline get a failed
/// response. Outstanding requests are dropped at the deadline.
pub async fn dispatch_round(
    client: &dyn DispatchClient,
    miners: &[MinerEndpoint],
    request: &QueryRequest,
    mode: ProtocolMode,
    timeouts: DispatchTimeouts,
) -> Vec<MinerResponse> {
    let mut responses: Vec<MinerResponse> = miners
        .iter()
        .map(|miner| MinerResponse::failed(miner.uid))
        .collect();

    if miners.is_empty() {
        return responses;
    }

    let deadline = Instant::now() + timeouts.round;

    let mut pending: FuturesUnordered<_> = miners
        .iter()
        .enumerate()
        .map(|(index, miner)| async move {
            let result = match timeout(timeouts.per_miner, client.query(miner, request, mode)).await
            {
                Ok(result) => result,
                Err(_) => Err(DispatchError::Timeout {
                    uid: miner.uid,
                    after: timeouts.per_miner,
                }),
            };
            (index, result)
        })
        .collect();

    let mut answered = 0usize;
    loop {
        let next = timeout_at(deadline, pending.next()).await;
        match next {
            Ok(Some((index, Ok(response)))) if response.uid == miners[index].uid => {
                responses[index] = response;
                answered += 1;
            }
            Ok(Some((index, Ok(response)))) => {
                warn!(
                    expected = %miners[index].uid,
                    got = %response.uid,
                    "Reply attributed to the wrong miner, discarding"
                );
            }
            Ok(Some((index, Err(e)))) => {
                debug!(uid = %miners[index].uid, error = %e, "Miner query failed");
            }
            Ok(None) => break,
            Err(_) => {
                warn!(
                    outstanding = pending.len(),
                    round_timeout = ?timeouts.round,
                    "Round deadline reached, dropping outstanding requests"
                );
                break;
            }
        }
    }

    debug!(dispatched = miners.len(), answered, "Dispatch complete");

    responses
}
