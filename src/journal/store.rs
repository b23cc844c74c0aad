//! Ranked Set Backends
//!
//! The journal only needs three sorted-set operations: add a scored member,
//! read the top of the set by descending score, and trim old members.

use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

#[async_trait]
pub trait RankedStore: Send + Sync {
    /// Adds `member` with `score`. Re-adding an existing member updates its score.
    async fn add(&self, key: &str, member: &str, score: u64) -> Result<()>;

    /// Up to `limit` members, highest score first.
    async fn top(&self, key: &str, limit: usize) -> Result<Vec<String>>;

    /// Drops everything except the `keep` highest-scored members.
    async fn trim(&self, key: &str, keep: usize) -> Result<()>;
}

/// Redis sorted sets over one shared, auto-reconnecting connection.
#[derive(Clone)]
pub struct RedisRankedStore {
    connection: ConnectionManager,
}

impl RedisRankedStore {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;
        tracing::info!("Connected to journal store at {}", url);
        Ok(Self { connection })
    }
}

#[async_trait]
impl RankedStore for RedisRankedStore {
    async fn add(&self, key: &str, member: &str, score: u64) -> Result<()> {
        let mut conn = self.connection.clone();
        let _: i64 = conn.zadd(key, member, score as f64).await?;
        Ok(())
    }

    async fn top(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        let Some(stop) = top_stop_index(limit) else {
            return Ok(Vec::new());
        };
        let mut conn = self.connection.clone();
        let members: Vec<String> = conn.zrevrange(key, 0, stop).await?;
        Ok(members)
    }

    async fn trim(&self, key: &str, keep: usize) -> Result<()> {
        let Some(stop) = trim_stop_index(keep) else {
            return Ok(());
        };
        let mut conn = self.connection.clone();
        let _: i64 = conn.zremrangebyrank(key, 0, stop).await?;
        Ok(())
    }
}

/// Inclusive `ZREVRANGE` stop rank for the first `limit` members.
///
/// `None` for a zero limit; `-1` (whole set) when `limit` exceeds `isize`.
pub(crate) fn top_stop_index(limit: usize) -> Option<isize> {
    if limit == 0 {
        return None;
    }
    Some(isize::try_from(limit - 1).unwrap_or(-1))
}

/// Inclusive `ZREMRANGEBYRANK` stop rank that spares the `keep` highest members.
///
/// Ranks ascend by score, so the range is `[0, -(keep + 1)]`. `None` when
/// `keep` is too large to ever trim anything.
pub(crate) fn trim_stop_index(keep: usize) -> Option<isize> {
    let keep = isize::try_from(keep).ok()?;
    keep.checked_add(1).map(|k| -k)
}

#[derive(Debug, Clone)]
struct RankedMember {
    member: String,
    score: u64,
    seq: u64,
}

/// In-process sorted sets with the same semantics; equal scores rank by insertion.
#[derive(Default)]
pub struct MemoryRankedStore {
    sets: DashMap<String, Vec<RankedMember>>,
    next_seq: std::sync::atomic::AtomicU64,
}

impl MemoryRankedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self, key: &str) -> usize {
        self.sets.get(key).map(|set| set.len()).unwrap_or(0)
    }

    fn sorted_desc(set: &[RankedMember]) -> Vec<RankedMember> {
        let mut members = set.to_vec();
        members.sort_by(|a, b| b.score.cmp(&a.score).then(b.seq.cmp(&a.seq)));
        members
    }
}

#[async_trait]
impl RankedStore for MemoryRankedStore {
    async fn add(&self, key: &str, member: &str, score: u64) -> Result<()> {
        let seq = self
            .next_seq
            .fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let mut set = self.sets.entry(key.to_string()).or_default();
        match set.iter_mut().find(|m| m.member == member) {
            Some(existing) => {
                existing.score = score;
                existing.seq = seq;
            }
            None => set.push(RankedMember {
                member: member.to_string(),
                score,
                seq,
            }),
        }
        Ok(())
    }

    async fn top(&self, key: &str, limit: usize) -> Result<Vec<String>> {
        let Some(set) = self.sets.get(key) else {
            return Ok(Vec::new());
        };
        Ok(Self::sorted_desc(&set)
            .into_iter()
            .take(limit)
            .map(|m| m.member)
            .collect())
    }

    async fn trim(&self, key: &str, keep: usize) -> Result<()> {
        if let Some(mut set) = self.sets.get_mut(key)
            && set.len() > keep
        {
            let mut members = Self::sorted_desc(&set);
            members.truncate(keep);
            *set = members;
        }
        Ok(())
    }
}
