#![allow(missing_docs)]

use followgraph::{
    fingerprint, keys, BoundMode, Direction, KvStore, MemStore, Relation, RelationOptions,
    RelationStore, Result,
};

fn collect(iter: followgraph::NeighborIter<'_>) -> Result<Vec<Relation>> {
    iter.collect()
}

#[test]
fn alice_follows_bob_and_carol() -> Result<()> {
    let kv = MemStore::new();
    let rel = RelationStore::default();

    rel.add_edge(&kv, Direction::Forward, "alice", "carol")?;
    rel.add_edge(&kv, Direction::Forward, "alice", "bob")?;

    let listed = collect(rel.list_neighbors(&kv, Direction::Forward, "alice")?)?;
    assert_eq!(
        listed,
        vec![
            Relation::new(Direction::Forward, "alice", "bob"),
            Relation::new(Direction::Forward, "alice", "carol"),
        ],
        "ascending target fingerprint order, not insertion order"
    );
    assert!(fingerprint("bob") < fingerprint("carol"));
    assert!(listed.iter().all(|r| r.symbol() == "->"));

    assert!(collect(rel.list_neighbors(&kv, Direction::Forward, "bob")?)?.is_empty());
    Ok(())
}

#[test]
fn order_is_not_lexical() -> Result<()> {
    let kv = MemStore::new();
    let rel = RelationStore::default();
    rel.add_follows(&kv, "zed", "alice")?;
    rel.add_follows(&kv, "zed", "frank")?;

    let targets: Vec<String> = collect(rel.list_follows(&kv, "zed")?)?
        .into_iter()
        .map(|r| r.target)
        .collect();
    // md5("frank") = 2625..., md5("alice") = 6384...
    assert_eq!(targets, ["frank", "alice"]);
    Ok(())
}

#[test]
fn duplicate_add_is_idempotent() -> Result<()> {
    let kv = MemStore::new();
    let rel = RelationStore::default();
    rel.add_edge(&kv, Direction::Forward, "alice", "bob")?;
    rel.add_edge(&kv, Direction::Forward, "alice", "bob")?;

    let listed = collect(rel.list_neighbors(&kv, Direction::Forward, "alice")?)?;
    assert_eq!(listed, vec![Relation::new(Direction::Forward, "alice", "bob")]);
    assert_eq!(rel.count_neighbors(&kv, Direction::Forward, "alice")?, 1);
    assert_eq!(kv.len("forward"), 1);
    Ok(())
}

#[test]
fn self_loop_is_representable() -> Result<()> {
    let kv = MemStore::new();
    let rel = RelationStore::default();
    rel.add_edge(&kv, Direction::Forward, "narcissus", "narcissus")?;
    rel.add_edge(&kv, Direction::Reverse, "narcissus", "narcissus")?;

    for direction in Direction::ALL {
        let listed = collect(rel.list_neighbors(&kv, direction, "narcissus")?)?;
        assert_eq!(
            listed,
            vec![Relation::new(direction, "narcissus", "narcissus")]
        );
    }
    Ok(())
}

#[test]
fn empty_identifier_is_a_valid_node() -> Result<()> {
    let kv = MemStore::new();
    let rel = RelationStore::default();
    rel.add_follows(&kv, "", "bob")?;
    rel.add_follows(&kv, "bob", "")?;
    assert_eq!(rel.count_follows(&kv, "")?, 1);
    let listed = collect(rel.list_follows(&kv, "bob")?)?;
    assert_eq!(listed, vec![Relation::new(Direction::Forward, "bob", "")]);
    Ok(())
}

#[test]
fn indexes_are_maintained_independently() -> Result<()> {
    let kv = MemStore::new();
    let rel = RelationStore::default();
    rel.add_follows(&kv, "alice", "bob")?;

    assert_eq!(rel.count_follows(&kv, "alice")?, 1);
    assert_eq!(rel.count_followed_by(&kv, "bob")?, 0, "no implicit reverse write");

    rel.add_followed_by(&kv, "bob", "alice")?;
    let followers = collect(rel.list_followed_by(&kv, "bob")?)?;
    assert_eq!(followers, vec![Relation::new(Direction::Reverse, "bob", "alice")]);
    assert_eq!(followers[0].to_string(), "bob <- alice");
    Ok(())
}

#[test]
fn follow_writes_both_views() -> Result<()> {
    let kv = MemStore::new();
    let rel = RelationStore::default();
    rel.follow(&kv, "alice", "bob")?;
    rel.follow(&kv, "carol", "bob")?;

    assert_eq!(rel.count_follows(&kv, "alice")?, 1);
    assert_eq!(rel.count_followed_by(&kv, "bob")?, 2);
    assert_eq!(
        rel.get_edge(&kv, Direction::Reverse, "bob", "carol")?,
        Some(Relation::new(Direction::Reverse, "bob", "carol"))
    );
    Ok(())
}

#[test]
fn count_matches_listing_length_for_many_origins() -> Result<()> {
    let kv = MemStore::new();
    let rel = RelationStore::new(RelationOptions::default().scan_batch_size(4))?;
    for origin in 0..12 {
        for target in 0..(origin * 3) {
            rel.add_follows(&kv, &format!("u{origin}"), &format!("u{target}"))?;
        }
    }
    for origin in 0..12 {
        let user = format!("u{origin}");
        let listed = collect(rel.list_follows(&kv, &user)?)?;
        assert_eq!(rel.count_follows(&kv, &user)?, listed.len() as u64);
        assert_eq!(listed.len(), origin * 3);
        assert!(listed.iter().all(|r| r.origin == user));
    }
    Ok(())
}

#[test]
fn custom_index_and_attribute_names() -> Result<()> {
    let kv = MemStore::new();
    let options = RelationOptions::default()
        .forward_index("follows")
        .reverse_index("followedBy")
        .attributes("from", "to");
    let rel = RelationStore::new(options)?;
    rel.follow(&kv, "alice", "bob")?;

    assert_eq!(kv.index_names(), vec!["followedBy".to_string(), "follows".to_string()]);
    let row = kv
        .get("follows", keys::encode_key("alice", "bob").as_ref())?
        .expect("row present");
    assert_eq!(row.get("to").map(Vec::as_slice), Some(&b"bob"[..]));
    assert_eq!(collect(rel.list_followed_by(&kv, "bob")?)?.len(), 1);
    Ok(())
}

#[test]
fn last_byte_mode_reproduces_wraparound() -> Result<()> {
    // md5("user22") ends in 0xff, so the legacy upper bound wraps below the lower one.
    let kv = MemStore::new();
    let legacy = RelationStore::new(RelationOptions::default().bound_mode(BoundMode::LastByte))?;
    let prefix = RelationStore::default();

    legacy.add_follows(&kv, "user22", "bob")?;
    legacy.add_follows(&kv, "alice", "bob")?;

    assert!(collect(legacy.list_follows(&kv, "user22")?)?.is_empty());
    assert_eq!(legacy.count_follows(&kv, "user22")?, 0);
    assert_eq!(legacy.count_follows(&kv, "alice")?, 1);

    assert_eq!(
        collect(prefix.list_follows(&kv, "user22")?)?,
        vec![Relation::new(Direction::Forward, "user22", "bob")]
    );
    assert_eq!(prefix.count_follows(&kv, "user22")?, 1);
    Ok(())
}

#[test]
fn early_stop_has_no_side_effects() -> Result<()> {
    let kv = MemStore::new();
    let rel = RelationStore::new(RelationOptions::default().scan_batch_size(2))?;
    for i in 0..10 {
        rel.add_follows(&kv, "hub", &format!("spoke{i}"))?;
    }
    let first_three: Vec<Relation> = rel.list_follows(&kv, "hub")?.take(3).collect::<Result<_>>()?;
    assert_eq!(first_three.len(), 3);
    assert_eq!(kv.len("forward"), 10);
    assert_eq!(rel.count_follows(&kv, "hub")?, 10);
    Ok(())
}
