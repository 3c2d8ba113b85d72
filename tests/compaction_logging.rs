//! Exercises the compaction paths with a tracing subscriber installed, so the
//! `debug!` / `trace!` events are formatted at least once.

use ordered_collections::{CompactionPolicy, OrderedMap, OrderedSet};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("ordered_collections=trace"))
        .with_test_writer()
        .try_init();
}

#[test]
fn test_auto_compaction_under_subscriber() {
    init_tracing();

    let mut map: OrderedMap<u32, String> = (0..64).map(|i| (i, i.to_string())).collect();
    for i in 0..40 {
        map.remove(&i);
    }
    assert!(map.tombstones() <= map.len());
    assert_eq!(map.first().map(|(k, _)| *k), Some(40));

    map.shrink_to_fit();
    assert_eq!(map.tombstones(), 0);
    assert_eq!(map.len(), 24);
}

#[test]
fn test_manual_compaction_under_subscriber() {
    init_tracing();

    let mut set = OrderedSet::builder()
        .policy(CompactionPolicy::Manual)
        .seed(0..32u16)
        .build();
    set.retain(|v| v % 4 == 0);
    assert_eq!(set.tombstones(), 24);

    set.compact();
    assert_eq!(set.tombstones(), 0);
    assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![0, 4, 8, 12, 16, 20, 24, 28]);
}
