use chainkv::{
    ClientState, Command, Database, DefaultExecutor, ExecOutcome, RecordingSink, Sds, Value,
};

fn key(s: &str) -> Sds {
    Sds::from_str(s)
}

// §8 scenario 1/2 at the keyspace level: growth, shrink and rehash
// don't disturb what's already stored.
#[test]
fn keyspace_survives_growth_and_rehash() {
    let mut db = Database::new(0);
    for i in 0..200 {
        db.set(key(&format!("k{i}")), Value::Int(i));
    }
    assert_eq!(db.len(), 200);
    for i in 0..200 {
        assert_eq!(db.get(&key(&format!("k{i}"))).unwrap().as_int(), Some(i));
    }
    for i in 0..100 {
        assert!(db.del(&key(&format!("k{i}"))));
    }
    assert_eq!(db.len(), 100);
}

// §8 scenarios 4-6, driven through the full client/executor/sink path
// instead of `transaction.rs`'s unit tests talking to `Database` directly.
#[test]
fn two_clients_multi_exec_with_watch_conflict() {
    let mut db = Database::new(0);
    db.set(key("balance"), Value::Int(100));

    let executor = DefaultExecutor;
    let mut alice = ClientState::new(1);
    let mut bob = ClientState::new(2);

    alice.watch(&mut db, &[key("balance")]).unwrap();
    alice.multi().unwrap();
    alice.queue(Command::Incr(key("balance")));

    // Bob writes the watched key behind Alice's back.
    let mut bob_sink = RecordingSink::default();
    bob.multi().unwrap();
    bob.queue(Command::Set(key("balance"), 500));
    let bob_outcome = bob.exec(&mut db, &executor, &mut bob_sink).unwrap();
    assert!(matches!(bob_outcome, ExecOutcome::Executed(_)));

    // Alice's transaction must now abort: her watched key moved.
    let mut alice_sink = RecordingSink::default();
    let alice_outcome = alice.exec(&mut db, &executor, &mut alice_sink).unwrap();
    assert_eq!(alice_outcome, ExecOutcome::Aborted);
    assert!(alice_sink.records.is_empty());
    assert_eq!(db.get(&key("balance")).unwrap().as_int(), Some(500));
}

#[test]
fn discard_leaves_keyspace_untouched() {
    let mut db = Database::new(0);
    db.set(key("a"), Value::Int(1));

    let mut client = ClientState::new(1);
    client.watch(&mut db, &[key("a")]).unwrap();
    client.multi().unwrap();
    client.queue(Command::Set(key("a"), 999));
    client.discard(&mut db).unwrap();

    assert!(!client.in_multi());
    assert_eq!(db.get(&key("a")).unwrap().as_int(), Some(1));
}
