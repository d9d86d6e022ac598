//! End-to-end registry scenarios, run against every store backend.

use std::sync::Arc;

use proptest::prelude::*;
use verity::core::{fingerprint, sign_fingerprint};
use verity::store::{MemoryStore, SqliteStore, Store};
use verity::{ManualClock, PostEvent, PostId, Registry, RegistryConfig, RegistryError};
use verity_testkit::generators::{locator, timestamp};
use verity_testkit::{multi_author_fixtures, EditScript, TestAuthor};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn registry_over<S: Store>(store: S) -> Registry<S> {
    init_tracing();
    Registry::with_clock(
        store,
        RegistryConfig::default(),
        Arc::new(ManualClock::new(1_700_000_000_000)),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Scenarios A-D
// ─────────────────────────────────────────────────────────────────────────────

async fn hello_world_scenarios<S: Store>(registry: Registry<S>) -> anyhow::Result<()> {
    let authors = multi_author_fixtures(2);
    let (i, j) = (&authors[0], &authors[1]);

    // A: create by I.
    let hello = i.sign(b"hello");
    let id = registry
        .create(&hello.locator, hello.fingerprint, &hello.signature, &i.identity())
        .await?;
    assert_eq!(id, PostId::new(1));

    let post = registry.get(id).await?;
    assert_eq!(post.owner, i.identity());
    assert!(post.history.is_empty());
    assert_eq!(post.current_fingerprint, fingerprint(b"hello"));

    // B: owner edits to "world".
    let world = i.sign(b"world");
    registry
        .edit(id, &world.locator, world.fingerprint, &world.signature, &i.identity())
        .await?;

    let post = registry.get(id).await?;
    assert_eq!(post.history.len(), 1);
    assert_eq!(post.history[0].prior_fingerprint, fingerprint(b"hello"));
    assert_eq!(post.current_fingerprint, fingerprint(b"world"));
    assert_eq!(post.current_locator.as_str(), world.locator);

    // C: J cannot edit I's post, with or without a valid signature of their own.
    let evil = j.sign(b"evil");
    let err = registry
        .edit(id, &evil.locator, evil.fingerprint, &evil.signature, &j.identity())
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Authorization { id: rejected, caller } if rejected == id && caller == j.identity()));
    assert_eq!(registry.get(id).await?, post);

    // D: verification against current content only.
    assert!(registry.verify_content(id, b"world").await?);
    assert!(!registry.verify_content(id, b"hello").await?);
    assert_eq!(registry.verify_historical(id, b"hello").await?, Some(0));
    assert_eq!(registry.verify_historical(id, b"world").await?, Some(1));
    assert!(registry.verify_signature(id).await?);

    let events = registry.events_since(0).await?;
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].event,
        PostEvent::PostCreated {
            id,
            owner: i.identity(),
            locator: post_locator(&hello.locator),
        }
    );
    assert!(matches!(
        events[1].event,
        PostEvent::PostEdited { id: edited, new_fingerprint, .. }
            if edited == id && new_fingerprint == fingerprint(b"world")
    ));
    Ok(())
}

fn post_locator(s: &str) -> verity::core::StorageLocator {
    verity::core::StorageLocator::new(s).unwrap()
}

#[tokio::test]
async fn test_scenarios_memory() -> anyhow::Result<()> {
    hello_world_scenarios(registry_over(MemoryStore::new())).await
}

#[tokio::test]
async fn test_scenarios_sqlite() -> anyhow::Result<()> {
    hello_world_scenarios(registry_over(SqliteStore::open_memory()?)).await
}

// ─────────────────────────────────────────────────────────────────────────────
// Queries on unknown posts
// ─────────────────────────────────────────────────────────────────────────────

async fn unknown_post_queries<S: Store>(registry: Registry<S>) {
    let missing = PostId::new(42);
    assert!(matches!(registry.get(missing).await, Err(RegistryError::NotFound(_))));
    assert!(matches!(registry.history(missing).await, Err(RegistryError::NotFound(_))));
    assert!(matches!(
        registry.verify_content(missing, b"x").await,
        Err(RegistryError::NotFound(_))
    ));
    assert!(matches!(
        registry.verify_signature(missing).await,
        Err(RegistryError::NotFound(_))
    ));
    assert_eq!(registry.post_count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_post_memory() {
    unknown_post_queries(registry_over(MemoryStore::new())).await;
}

#[tokio::test]
async fn test_unknown_post_sqlite() {
    unknown_post_queries(registry_over(SqliteStore::open_memory().unwrap())).await;
}

// ─────────────────────────────────────────────────────────────────────────────
// Concurrency
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_ids() {
    let registry = Arc::new(registry_over(MemoryStore::new()));
    let authors: Vec<_> = multi_author_fixtures(16).into_iter().map(Arc::new).collect();

    let handles: Vec<_> = authors
        .iter()
        .map(|author| {
            let registry = Arc::clone(&registry);
            let author = Arc::clone(author);
            tokio::spawn(async move {
                let signed = author.sign(b"same content");
                registry
                    .create(&signed.locator, signed.fingerprint, &signed.signature, &author.identity())
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().get());
    }
    ids.sort_unstable();
    assert_eq!(ids, (1..=16).collect::<Vec<_>>());

    let seqs: Vec<_> = registry.events_since(0).await.unwrap().iter().map(|r| r.seq).collect();
    assert_eq!(seqs, (1..=16).collect::<Vec<_>>());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_edits_keep_ledger_consistent() {
    let registry = Arc::new(registry_over(SqliteStore::open_memory().unwrap()));
    let owner = Arc::new(TestAuthor::with_seed([7; 32]));

    let first = owner.sign(b"v0");
    let id = registry
        .create(&first.locator, first.fingerprint, &first.signature, &owner.identity())
        .await
        .unwrap();

    let handles: Vec<_> = (1..=12u32)
        .map(|n| {
            let registry = Arc::clone(&registry);
            let owner = Arc::clone(&owner);
            tokio::spawn(async move {
                let signed = owner.sign(format!("v{}", n).as_bytes());
                registry
                    .edit(id, &signed.locator, signed.fingerprint, &signed.signature, &owner.identity())
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    // Whatever order the edits landed in, each entry holds the fingerprint
    // that was current right before it.
    let post = registry.get(id).await.unwrap();
    assert_eq!(post.history.len(), 12);
    assert_eq!(post.history[0].prior_fingerprint, fingerprint(b"v0"));

    let events = registry.events_since(1).await.unwrap();
    let mut current = fingerprint(b"v0");
    for (entry, record) in post.history.iter().zip(events.iter()) {
        assert_eq!(entry.prior_fingerprint, current);
        match &record.event {
            PostEvent::PostEdited { new_fingerprint, recorded_at, .. } => {
                assert_eq!(*recorded_at, entry.recorded_at);
                current = *new_fingerprint;
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
    assert_eq!(current, post.current_fingerprint);

    let stamps: Vec<_> = post.history.iter().map(|e| e.recorded_at).collect();
    assert!(stamps.windows(2).all(|w| w[0] < w[1]));
}

// ─────────────────────────────────────────────────────────────────────────────
// Persistence
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_sqlite_registry_survives_reopen() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.db");
    let owner = TestAuthor::with_seed([3; 32]);
    let heir = TestAuthor::with_seed([4; 32]);

    let clock = Arc::new(ManualClock::new(50_000));
    {
        let registry = Registry::with_clock(SqliteStore::open(&path).unwrap(), RegistryConfig::default(), clock.clone());
        let a = owner.sign(b"first");
        let id = registry
            .create(&a.locator, a.fingerprint, &a.signature, &owner.identity())
            .await
            .unwrap();
        let b = owner.sign(b"second");
        registry
            .edit(id, &b.locator, b.fingerprint, &b.signature, &owner.identity())
            .await
            .unwrap();
        registry.transfer(id, &heir.identity(), &owner.identity()).await.unwrap();
    }

    // A fresh registry with a clock behind the stored ledger.
    clock.set(10);
    let registry = Registry::with_clock(SqliteStore::open(&path).unwrap(), RegistryConfig::default(), clock);
    let id = PostId::FIRST;

    let post = registry.get(id).await.unwrap();
    assert_eq!(post.owner, heir.identity());
    assert_eq!(post.provenance_chain(), vec![fingerprint(b"first"), fingerprint(b"second")]);
    assert!(registry.verify_content(id, b"second").await.unwrap());
    assert!(registry.verify_signature(id).await.unwrap());

    let c = heir.sign(b"third");
    registry
        .edit(id, &c.locator, c.fingerprint, &c.signature, &heir.identity())
        .await
        .unwrap();

    // Stamps resume after the newest stored event (transfer at 50_002).
    let history = registry.history(id).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].recorded_at, 50_001);
    assert_eq!(history[1].recorded_at, 50_003);
    assert_eq!(registry.events_since(0).await.unwrap().len(), 4);
    assert_eq!(registry.post_count().await.unwrap(), 1);
}

// ─────────────────────────────────────────────────────────────────────────────
// Properties
// ─────────────────────────────────────────────────────────────────────────────

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_history_records_each_prior_fingerprint(
        script in any::<EditScript>(),
        loc in locator(),
    ) {
        let registry = registry_over(MemoryStore::new());
        let owner = script.author.identity();

        let post = runtime().block_on(async {
            let fp = fingerprint(&script.original);
            let id = registry
                .create(&loc, fp, &sign_fingerprint(&script.author, &fp), &owner)
                .await
                .unwrap();
            for content in &script.edits {
                let fp = fingerprint(content);
                registry
                    .edit(id, &loc, fp, &sign_fingerprint(&script.author, &fp), &owner)
                    .await
                    .unwrap();
            }
            registry.get(id).await.unwrap()
        });

        let chain = script.expected_chain();
        prop_assert_eq!(post.history.len(), script.edits.len());
        for (i, entry) in post.history.iter().enumerate() {
            prop_assert_eq!(entry.prior_fingerprint, chain[i]);
        }
        prop_assert_eq!(post.provenance_chain(), chain);
        prop_assert_eq!(post.owner, owner);
        prop_assert_eq!(post.current_locator.as_str(), loc.as_str());
    }

    #[test]
    fn prop_non_owner_never_edits(script in any::<EditScript>(), seed in any::<[u8; 32]>()) {
        let intruder = TestAuthor::with_seed(seed);
        prop_assume!(intruder.identity() != script.author.identity());

        let registry = registry_over(MemoryStore::new());
        let (err, post) = runtime().block_on(async {
            let fp = fingerprint(&script.original);
            let id = registry
                .create("loc", fp, &sign_fingerprint(&script.author, &fp), &script.author.identity())
                .await
                .unwrap();
            let signed = intruder.sign(b"takeover");
            let err = registry
                .edit(id, &signed.locator, signed.fingerprint, &signed.signature, &intruder.identity())
                .await
                .unwrap_err();
            (err, registry.get(id).await.unwrap())
        });

        let is_authorization = matches!(err, RegistryError::Authorization { .. });
        prop_assert!(is_authorization);
        prop_assert!(post.history.is_empty());
        prop_assert_eq!(post.current_fingerprint, fingerprint(&script.original));
    }

    #[test]
    fn prop_stamps_start_at_clock_and_strictly_increase(
        start in timestamp(),
        script in any::<EditScript>(),
    ) {
        init_tracing();
        let registry = Registry::with_clock(
            MemoryStore::new(),
            RegistryConfig::default(),
            Arc::new(ManualClock::new(start)),
        );
        let owner = script.author.identity();

        let post = runtime().block_on(async {
            let fp = fingerprint(&script.original);
            let id = registry
                .create("loc", fp, &sign_fingerprint(&script.author, &fp), &owner)
                .await
                .unwrap();
            for content in &script.edits {
                let fp = fingerprint(content);
                registry
                    .edit(id, "loc", fp, &sign_fingerprint(&script.author, &fp), &owner)
                    .await
                    .unwrap();
            }
            registry.get(id).await.unwrap()
        });

        prop_assert_eq!(post.created_at, start);
        let mut last = post.created_at;
        for entry in &post.history {
            prop_assert!(entry.recorded_at > last);
            last = entry.recorded_at;
        }
    }

    #[test]
    fn prop_verification_is_idempotent(content in proptest::collection::vec(any::<u8>(), 0..512)) {
        let registry = registry_over(MemoryStore::new());
        let author = TestAuthor::with_seed([9; 32]);

        let results = runtime().block_on(async {
            let signed = author.sign(&content);
            let id = registry
                .create(&signed.locator, signed.fingerprint, &signed.signature, &author.identity())
                .await
                .unwrap();
            let mut altered = content.clone();
            altered.push(0);

            let mut results = Vec::new();
            for _ in 0..3 {
                results.push(registry.verify_content(id, &content).await.unwrap());
            }
            results.push(!registry.verify_content(id, &altered).await.unwrap());
            results
        });

        prop_assert_eq!(results, vec![true, true, true, true]);
    }
}
