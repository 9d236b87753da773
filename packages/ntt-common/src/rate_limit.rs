//! Rate-limit buckets
//!
//! Buckets are keyed by `keccak256("OUTBOUND")` (one global bucket) or
//! `keccak256("INBOUND_" ∥ u16be(chain))` (one per remote chain).
//!
//! A bucket with `duration == 0` is unlimited. Otherwise capacity refills
//! linearly, reaching `limit` after `duration` seconds:
//!
//! ```text
//! capacity(now) = min(limit, capacity + limit * (now - last_updated) / duration)
//! ```

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Event, StdResult, Storage, Uint128, Uint256};
use cw_storage_plus::Map;

use crate::error::ContractError;
use crate::events::{LogBuilder, RATE_DURATION_UPDATED, RATE_LIMIT_UPDATED};
use crate::hash::{keccak256, keccak256_concat};

pub type BucketId = [u8; 32];

pub fn bucket_id_outbound() -> BucketId {
    keccak256(b"OUTBOUND")
}

pub fn bucket_id_inbound(chain_id: u16) -> BucketId {
    keccak256_concat(&[b"INBOUND_", &chain_id.to_be_bytes()])
}

#[cw_serde]
pub struct RateLimitBucket {
    /// Maximum volume per window
    pub limit: Uint128,
    /// Seconds for an empty bucket to refill, zero for unlimited
    pub duration: u64,
    /// Capacity as of `last_updated`
    pub capacity: Uint128,
    pub last_updated: u64,
}

impl RateLimitBucket {
    pub fn new(limit: Uint128, duration: u64, now: u64) -> Self {
        Self {
            limit,
            duration,
            capacity: limit,
            last_updated: now,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.duration == 0
    }

    pub fn current_capacity(&self, now: u64) -> Uint128 {
        if self.is_unlimited() {
            return Uint128::MAX;
        }
        let elapsed = now.saturating_sub(self.last_updated);
        let refill = self.limit.full_mul(elapsed) / Uint256::from(self.duration);
        let refilled = Uint256::from(self.capacity) + refill;
        if refilled >= Uint256::from(self.limit) {
            self.limit
        } else {
            // bounded by limit above
            Uint128::try_from(refilled).unwrap_or(self.limit)
        }
    }

    fn sync(&mut self, now: u64) {
        if !self.is_unlimited() {
            self.capacity = self.current_capacity(now);
        }
        self.last_updated = now;
    }
}

const BUCKETS: Map<&[u8], RateLimitBucket> = Map::new("rl_buckets");

fn unknown(bucket_id: &BucketId) -> ContractError {
    ContractError::UnknownBucket {
        bucket_id: hex::encode(bucket_id),
    }
}

pub fn add_bucket(
    storage: &mut dyn Storage,
    bucket_id: &BucketId,
    limit: Uint128,
    duration: u64,
    now: u64,
) -> Result<(), ContractError> {
    if BUCKETS.has(storage, bucket_id) {
        return Err(ContractError::BucketAlreadyExists {
            bucket_id: hex::encode(bucket_id),
        });
    }
    BUCKETS.save(storage, bucket_id, &RateLimitBucket::new(limit, duration, now))?;
    Ok(())
}

pub fn has_bucket(storage: &dyn Storage, bucket_id: &BucketId) -> bool {
    BUCKETS.has(storage, bucket_id)
}

pub fn load_bucket(
    storage: &dyn Storage,
    bucket_id: &BucketId,
) -> Result<RateLimitBucket, ContractError> {
    BUCKETS
        .may_load(storage, bucket_id)?
        .ok_or_else(|| unknown(bucket_id))
}

pub fn may_load_bucket(
    storage: &dyn Storage,
    bucket_id: &BucketId,
) -> StdResult<Option<RateLimitBucket>> {
    BUCKETS.may_load(storage, bucket_id)
}

pub fn current_capacity(
    storage: &dyn Storage,
    bucket_id: &BucketId,
    now: u64,
) -> Result<Uint128, ContractError> {
    Ok(load_bucket(storage, bucket_id)?.current_capacity(now))
}

pub fn has_capacity(
    storage: &dyn Storage,
    bucket_id: &BucketId,
    amount: Uint128,
    now: u64,
) -> Result<bool, ContractError> {
    Ok(current_capacity(storage, bucket_id, now)? >= amount)
}

/// Update the limit. Capacity moves by the difference between the new and
/// old limit, clamped to `[0, new_limit]`.
pub fn set_limit(
    storage: &mut dyn Storage,
    bucket_id: &BucketId,
    new_limit: Uint128,
    now: u64,
) -> Result<Event, ContractError> {
    let mut bucket = load_bucket(storage, bucket_id)?;
    bucket.sync(now);
    bucket.capacity = if new_limit >= bucket.limit {
        bucket.capacity.saturating_add(new_limit - bucket.limit).min(new_limit)
    } else {
        bucket.capacity.saturating_sub(bucket.limit - new_limit)
    };
    bucket.limit = new_limit;
    BUCKETS.save(storage, bucket_id, &bucket)?;

    LogBuilder::new(&RATE_LIMIT_UPDATED)
        .byte32(bucket_id)
        .uint128(new_limit.u128())
        .build()
}

/// Update the refill duration. Capacity accrued under the old duration is kept.
pub fn set_duration(
    storage: &mut dyn Storage,
    bucket_id: &BucketId,
    new_duration: u64,
    now: u64,
) -> Result<Event, ContractError> {
    let mut bucket = load_bucket(storage, bucket_id)?;
    let was_unlimited = bucket.is_unlimited();
    bucket.sync(now);
    if was_unlimited {
        bucket.capacity = bucket.limit;
    }
    bucket.duration = new_duration;
    BUCKETS.save(storage, bucket_id, &bucket)?;

    LogBuilder::new(&RATE_DURATION_UPDATED)
        .byte32(bucket_id)
        .uint64(new_duration)
        .build()
}

pub fn consume(
    storage: &mut dyn Storage,
    bucket_id: &BucketId,
    amount: Uint128,
    now: u64,
) -> Result<(), ContractError> {
    let mut bucket = load_bucket(storage, bucket_id)?;
    if bucket.is_unlimited() {
        return Ok(());
    }
    bucket.sync(now);
    if bucket.capacity < amount {
        return Err(ContractError::InsufficientCapacity {
            capacity: bucket.capacity,
            requested: amount,
        });
    }
    bucket.capacity -= amount;
    BUCKETS.save(storage, bucket_id, &bucket)?;
    Ok(())
}

/// Return capacity to a bucket, never beyond its limit
pub fn backfill(
    storage: &mut dyn Storage,
    bucket_id: &BucketId,
    amount: Uint128,
    now: u64,
) -> Result<(), ContractError> {
    let mut bucket = load_bucket(storage, bucket_id)?;
    if bucket.is_unlimited() {
        return Ok(());
    }
    bucket.sync(now);
    bucket.capacity = bucket.capacity.saturating_add(amount).min(bucket.limit);
    BUCKETS.save(storage, bucket_id, &bucket)?;
    Ok(())
}
