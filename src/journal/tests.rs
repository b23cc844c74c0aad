//! Activity Journal Tests
//!
//! ## Test Scopes
//! - **Clock**: strictly increasing timestamps.
//! - **Record / Recent**: validation, ordering, limits, retention.
//! - **Rank arithmetic**: sorted-set stop ranks for huge limits and retention.
//! - **Failure handling**: an unreachable store never fails a write.
//! - **Writer**: queued entries are written in submission order.

#[cfg(test)]
mod tests {
    use crate::error::GatewayError;
    use crate::journal::store::{MemoryRankedStore, RankedStore, top_stop_index, trim_stop_index};
    use crate::journal::types::JournalClock;
    use crate::journal::writer::JournalWriter;
    use crate::journal::ActivityJournal;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct UnreachableStore;

    #[async_trait]
    impl RankedStore for UnreachableStore {
        async fn add(&self, _key: &str, _member: &str, _score: u64) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }
        async fn top(&self, _key: &str, _limit: usize) -> anyhow::Result<Vec<String>> {
            Err(anyhow::anyhow!("connection refused"))
        }
        async fn trim(&self, _key: &str, _keep: usize) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("connection refused"))
        }
    }

    fn memory_journal() -> (Arc<MemoryRankedStore>, ActivityJournal) {
        let store = Arc::new(MemoryRankedStore::new());
        let journal = ActivityJournal::new(store.clone());
        (store, journal)
    }

    // ============================================================
    // CLOCK
    // ============================================================

    #[test]
    fn test_clock_is_strictly_increasing() {
        let clock = JournalClock::new();
        let mut previous = clock.next();
        for _ in 0..1000 {
            let current = clock.next();
            assert!(current > previous);
            previous = current;
        }
    }

    // ============================================================
    // RECORD / RECENT
    // ============================================================

    #[tokio::test]
    async fn test_recent_entries_newest_first() {
        let (_, journal) = memory_journal();

        assert!(journal.record("alice", "first").await);
        assert!(journal.record("alice", "second").await);
        assert!(journal.record("alice", "third").await);

        let recent = journal.recent_entries("alice", 3).await.unwrap();
        assert_eq!(recent, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_recent_entries_caps_at_limit() {
        let (_, journal) = memory_journal();
        for i in 0..10 {
            journal.record("alice", &format!("op {}", i)).await;
        }

        let recent = journal.recent_entries("alice", 3).await.unwrap();
        assert_eq!(recent, vec!["op 9", "op 8", "op 7"]);
    }

    #[tokio::test]
    async fn test_recent_entries_fewer_than_limit() {
        let (_, journal) = memory_journal();
        journal.record("alice", "only").await;

        assert_eq!(journal.recent_entries("alice", 3).await.unwrap(), vec!["only"]);
        assert!(journal.recent_entries("bob", 3).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entries_are_per_user() {
        let (_, journal) = memory_journal();
        journal.record("alice", "alice op").await;
        journal.record("bob", "bob op").await;

        assert_eq!(journal.recent_entries("alice", 3).await.unwrap(), vec!["alice op"]);
        assert_eq!(journal.recent_entries("bob", 3).await.unwrap(), vec!["bob op"]);
    }

    #[tokio::test]
    async fn test_record_rejects_empty_inputs_without_writing() {
        let (store, journal) = memory_journal();

        assert!(!journal.record("", "something").await);
        assert!(!journal.record("alice", "").await);

        assert_eq!(store.len(""), 0);
        assert_eq!(store.len("alice"), 0);
    }

    #[tokio::test]
    async fn test_recent_entries_empty_user_is_journal_unavailable() {
        let (_, journal) = memory_journal();
        let err = journal.recent_entries("", 3).await.unwrap_err();

        assert!(matches!(err, GatewayError::JournalUnavailable(_)));
    }

    #[tokio::test]
    async fn test_repeated_description_moves_to_front() {
        // Sorted-set semantics: members are unique, re-adding bumps the score.
        let (store, journal) = memory_journal();
        journal.record("alice", "a").await;
        journal.record("alice", "b").await;
        journal.record("alice", "a").await;

        assert_eq!(store.len("alice"), 2);
        assert_eq!(journal.recent_entries("alice", 3).await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_retention_keeps_newest() {
        let store = Arc::new(MemoryRankedStore::new());
        let journal = ActivityJournal::new(store.clone()).with_retention(Some(2));

        for i in 0..5 {
            journal.record("alice", &format!("op {}", i)).await;
        }

        assert_eq!(store.len("alice"), 2);
        assert_eq!(journal.recent_entries("alice", 10).await.unwrap(), vec!["op 4", "op 3"]);
    }

    #[tokio::test]
    async fn test_zero_retention_means_unbounded() {
        let store = Arc::new(MemoryRankedStore::new());
        let journal = ActivityJournal::new(store.clone()).with_retention(Some(0));
        for i in 0..5 {
            journal.record("alice", &format!("op {}", i)).await;
        }

        assert_eq!(store.len("alice"), 5);
    }

    // ============================================================
    // RANK ARITHMETIC
    // ============================================================

    #[test]
    fn test_top_stop_index() {
        assert_eq!(top_stop_index(0), None);
        assert_eq!(top_stop_index(1), Some(0));
        assert_eq!(top_stop_index(3), Some(2));
        assert_eq!(top_stop_index(isize::MAX as usize + 1), Some(isize::MAX));
    }

    #[test]
    fn test_top_stop_index_never_wraps_negative_below_whole_set() {
        let limit: usize = "18446744073709551615".parse().unwrap();
        assert_eq!(top_stop_index(limit), Some(-1));
        assert_eq!(top_stop_index(usize::MAX - 1), Some(-1));
    }

    #[test]
    fn test_trim_stop_index() {
        assert_eq!(trim_stop_index(0), Some(-1));
        assert_eq!(trim_stop_index(2), Some(-3));
        assert_eq!(trim_stop_index(isize::MAX as usize), None);
        assert_eq!(trim_stop_index(usize::MAX), None);
    }

    #[tokio::test]
    async fn test_huge_limit_returns_every_entry() {
        let (_, journal) = memory_journal();
        for action in ["first", "second", "third"] {
            assert!(journal.record("alice", action).await);
        }

        let recent = journal.recent_entries("alice", usize::MAX).await.unwrap();

        assert_eq!(recent, vec!["third", "second", "first"]);
    }

    // ============================================================
    // FAILURE HANDLING
    // ============================================================

    #[tokio::test]
    async fn test_record_swallows_store_failure() {
        let journal = ActivityJournal::new(Arc::new(UnreachableStore));

        assert!(!journal.record("alice", "Index book to \"42\"").await);
    }

    #[tokio::test]
    async fn test_recent_entries_surfaces_store_failure() {
        let journal = ActivityJournal::new(Arc::new(UnreachableStore));
        let err = journal.recent_entries("alice", 3).await.unwrap_err();

        assert!(matches!(err, GatewayError::JournalUnavailable(_)));
    }

    // ============================================================
    // WRITER
    // ============================================================

    #[tokio::test]
    async fn test_writer_preserves_submission_order() {
        let (_, journal) = memory_journal();
        let writer = JournalWriter::spawn(Arc::new(journal), 16);
        let handle = writer.handle();

        handle.submit("alice", "one".to_string());
        handle.submit("alice", "two".to_string());
        handle.submit("alice", "three".to_string());
        handle.flush().await;

        let recent = handle.journal().recent_entries("alice", 3).await.unwrap();
        assert_eq!(recent, vec!["three", "two", "one"]);

        writer.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_dropped_quietly() {
        let (_, journal) = memory_journal();
        let writer = JournalWriter::spawn(Arc::new(journal), 4);
        let handle = writer.handle();

        handle.submit("alice", "before".to_string());
        writer.shutdown().await;
        handle.submit("alice", "after".to_string());
        handle.flush().await;

        let recent = handle.journal().recent_entries("alice", 3).await.unwrap();
        assert_eq!(recent, vec!["before"]);
    }
}
