use cart_finder::clients::{cart_partition_name, CloneMatch, JoinError, PartitionJoiner};
use cart_finder::model::{AgentPubKey, ClonedCell, PartitionHandle, Seed, SpaceHash};
use cart_finder::registry_actor;
use cart_finder::runtime::memory::{InMemoryRuntime, MemoryNetwork};
use cart_finder::runtime::{zome, RuntimeClient, RuntimeError};
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (Arc<InMemoryRuntime>, PartitionJoiner) {
    let runtime = Arc::new(MemoryNetwork::new().connect(AgentPubKey(vec![7; 32])));
    let (actor, registry) = registry_actor::new(32);
    tokio::spawn(actor.run());
    let joiner = PartitionJoiner::new(runtime.clone(), registry, zome::CART_ROLE);
    (runtime, joiner)
}

/// A clone left behind by an earlier session.
fn foreign_clone(byte: u8, name: &str, network_seed: Option<&str>) -> ClonedCell {
    ClonedCell {
        cell_id: PartitionHandle::new(SpaceHash(vec![byte; 32]), AgentPubKey(vec![7; 32])),
        clone_id: format!("cart.old{}", byte),
        name: name.to_string(),
        network_seed: network_seed.map(str::to_string),
        enabled: true,
    }
}

fn duplicate() -> RuntimeError {
    RuntimeError::DuplicateConflict("already exists".into())
}

#[tokio::test]
async fn repeated_join_is_served_from_registry() {
    let (runtime, joiner) = setup();
    let seed = Seed::from("alice-seed-123");

    let first = joiner.join(&seed).await.unwrap();
    let second = joiner.join(&seed).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(runtime.create_calls(), 1);
    // Cached handles are trusted unless validation is on.
    assert_eq!(runtime.app_info_calls(), 0);
    assert!(joiner.is_joined(&seed).await.unwrap());
}

#[tokio::test]
async fn duplicate_conflict_adopts_the_existing_clone() {
    let (runtime, joiner) = setup();
    let existing = foreign_clone(1, "cart from last week", None);
    runtime.insert_clone(zome::CART_ROLE, existing.clone());
    runtime.fail_creates_with(duplicate());

    let handle = joiner.join(&Seed::from("alice-seed-123")).await.unwrap();

    assert_eq!(handle, existing.cell_id);
}

#[tokio::test]
async fn registry_entries_are_per_seed_and_clear_forces_a_new_attempt() {
    let (runtime, joiner) = setup();
    let a = Seed::from("seed-a");
    let b = Seed::from("seed-b");

    let handle_a = joiner.join(&a).await.unwrap();
    let handle_b = joiner.join(&b).await.unwrap();
    assert_ne!(handle_a, handle_b);
    assert_eq!(joiner.registry().snapshot().await.unwrap().len(), 2);

    assert_eq!(joiner.registry().clear().await.unwrap(), 2);
    let again = joiner.join(&a).await.unwrap();

    // The runtime reports a conflict for the installed clone, which is then adopted by seed.
    assert_eq!(runtime.create_calls(), 3);
    assert_eq!(again, handle_a);
}

#[tokio::test]
async fn concurrent_joins_issue_one_create() {
    let (runtime, joiner) = setup();
    runtime.set_latency(Duration::from_millis(20));
    let joiner = Arc::new(joiner);
    let seed = Seed::from("busy-seed");

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let joiner = joiner.clone();
            let seed = seed.clone();
            tokio::spawn(async move { joiner.join(&seed).await })
        })
        .collect();

    let mut handles = Vec::new();
    for task in tasks {
        handles.push(task.await.unwrap().unwrap());
    }

    assert!(handles.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(runtime.create_calls(), 1);
}

#[tokio::test]
async fn fallback_prefers_the_clone_reporting_the_seed() {
    let (runtime, joiner) = setup();
    let unrelated = foreign_clone(1, "bob's cart", Some("bob-seed"));
    let matching = foreign_clone(2, "alice's cart", Some("alice-seed-123"));
    runtime.insert_clone(zome::CART_ROLE, unrelated);
    runtime.insert_clone(zome::CART_ROLE, matching.clone());
    runtime.fail_creates_with(duplicate());

    let handle = joiner.join(&Seed::from("alice-seed-123")).await.unwrap();

    assert_eq!(handle, matching.cell_id);
}

#[tokio::test]
async fn fallback_matches_name_tag_when_seeds_are_hidden() {
    let (runtime, joiner) = setup();
    let seed = Seed::from("alice-seed-123");
    runtime.hide_network_seeds();
    runtime.insert_clone(zome::CART_ROLE, foreign_clone(1, "customer-cart-bob", None));
    let tagged = foreign_clone(2, &cart_partition_name(&seed), None);
    runtime.insert_clone(zome::CART_ROLE, tagged.clone());
    runtime.fail_creates_with(duplicate());

    assert_eq!(joiner.join(&seed).await.unwrap(), tagged.cell_id);
}

#[tokio::test]
async fn strict_policy_refuses_unverified_clones() {
    let (runtime, joiner) = setup();
    let joiner = joiner.with_policy(CloneMatch::Strict);
    runtime.insert_clone(zome::CART_ROLE, foreign_clone(1, "mystery", None));
    runtime.fail_creates_with(duplicate());

    let err = joiner.join(&Seed::from("alice-seed-123")).await.unwrap_err();

    assert_eq!(err, JoinError::UnverifiedClone("alice-seed-123".into()));
    assert!(!joiner.is_joined(&Seed::from("alice-seed-123")).await.unwrap());
}

#[tokio::test]
async fn conflict_without_any_clone_is_reported() {
    let (runtime, joiner) = setup();
    runtime.fail_creates_with(duplicate());

    let err = joiner.join(&Seed::from("ghost")).await.unwrap_err();

    assert_eq!(err, JoinError::CloneNotFound("ghost".into()));
}

#[tokio::test]
async fn other_failures_propagate_and_release_the_seed() {
    let (runtime, joiner) = setup();
    let seed = Seed::from("flaky");
    runtime.fail_creates_with(RuntimeError::Transport("connection reset".into()));

    let err = joiner.join(&seed).await.unwrap_err();
    assert_eq!(
        err,
        JoinError::Runtime(RuntimeError::Transport("connection reset".into()))
    );

    runtime.clear_faults();
    assert!(joiner.join(&seed).await.is_ok());
    assert_eq!(runtime.create_calls(), 2);
}

#[tokio::test]
async fn join_own_is_idempotent() {
    let (runtime, joiner) = setup();

    let first = joiner.join_own().await.unwrap();
    let second = joiner.join_own().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(runtime.create_calls(), 1);
    assert_eq!(joiner.own_partition(), Some(&first));
    assert!(joiner.is_joined(&joiner.own_seed()).await.unwrap());
}

#[tokio::test]
async fn join_own_reuses_an_installed_clone() {
    let (runtime, joiner) = setup();
    let own_seed = runtime.my_pub_key().to_b64();
    let existing = foreign_clone(3, "shopper-cart-old", Some(own_seed.as_str()));
    runtime.insert_clone(zome::CART_ROLE, existing.clone());

    assert_eq!(joiner.join_own().await.unwrap(), existing.cell_id);
    assert_eq!(runtime.create_calls(), 0);
}

#[tokio::test]
async fn own_partition_is_never_adopted_for_a_customer() {
    let (runtime, joiner) = setup();
    joiner.join_own().await.unwrap();
    runtime.fail_creates_with(duplicate());

    let err = joiner.join(&Seed::from("carol")).await.unwrap_err();

    assert_eq!(err, JoinError::CloneNotFound("carol".into()));
}

#[tokio::test]
async fn own_partition_is_not_adopted_after_registry_clear() {
    let (runtime, joiner) = setup();
    let own = joiner.join_own().await.unwrap();
    joiner.registry().clear().await.unwrap();
    runtime.fail_creates_with(duplicate());

    let err = joiner.join(&Seed::from("carol")).await.unwrap_err();

    assert_eq!(err, JoinError::CloneNotFound("carol".into()));
    assert_eq!(joiner.own_partition(), Some(&own));
}

#[tokio::test]
async fn stale_cached_handle_is_rejoined_when_validation_is_on() {
    let (runtime, joiner) = setup();
    let joiner = joiner.validate_cached_handles(true);
    let seed = Seed::from("alice-seed-123");

    let handle = joiner.join(&seed).await.unwrap();
    assert!(runtime.remove_partition(&handle));

    let rejoined = joiner.join(&seed).await.unwrap();

    assert_eq!(runtime.create_calls(), 2);
    assert_eq!(runtime.app_info_calls(), 1);
    assert!(runtime.app_info().await.unwrap().contains(&rejoined));
}
