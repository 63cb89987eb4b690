use finance_tracker::{
    core::{LedgerStore, TransactionUpdate},
    init,
    storage::MemoryStorage,
    view::{self, Snapshot, SortMode},
};

#[test]
fn ledger_round_trip_smoke() {
    init();

    let storage = MemoryStorage::new();
    let mut store = LedgerStore::open(Box::new(storage.clone()));
    let first = store.add("Food", 12.5, "lunch", "2024-01-05").unwrap();
    assert_eq!(first.id, 1);
    store.add("Travel", 80.0, "", "2024-01-03").unwrap();
    store
        .update(
            1,
            TransactionUpdate {
                description: Some("team lunch".into()),
                ..Default::default()
            },
        )
        .unwrap();

    let summary = store.aggregate().expect("store has data");
    assert_eq!(summary.grand_total, 92.5);

    let snapshot = Snapshot::from_ledger(store.ledger());
    let rows = view::sort(&snapshot, SortMode::Date);
    assert_eq!(rows[0].category, "Travel");
    assert_eq!(view::filter(&snapshot, "team").rows().len(), 1);

    store.close().unwrap();
    assert_eq!(storage.save_count(), 4);
}
