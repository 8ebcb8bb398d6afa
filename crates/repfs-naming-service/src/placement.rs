//! Replica placement for new files.

use rand::seq::SliceRandom;

use repfs_types::{make_error_msg, Result, StatusCode};

use crate::registry::ReplicaInfo;

/// Pick two distinct replicas uniformly at random from a registry snapshot.
///
/// A pool of fewer than two replicas is an error; the caller surfaces it as
/// the create's status instead of spinning on an unsatisfiable draw.
pub fn pick_two(pool: &[ReplicaInfo]) -> Result<(ReplicaInfo, ReplicaInfo)> {
    if pool.len() < 2 {
        return make_error_msg(
            StatusCode::INSUFFICIENT_REPLICAS,
            format!("need 2 replicas for placement, have {}", pool.len()),
        );
    }

    let mut rng = rand::thread_rng();
    let picked: Vec<&ReplicaInfo> = pool.choose_multiple(&mut rng, 2).collect();
    Ok((picked[0].clone(), picked[1].clone()))
}
