use super::*;

#[test]
fn factory_runs_at_most_once_per_key() {
    let mut made = 0;
    let mut map = DefaultMap::new(|key: &&str| {
        made += 1;
        format!("default for {key}")
    });
    assert_eq!("default for a", map.get("a").as_str());
    // The second access returns the stored value, not a fresh default.
    map.get("a").push('!');
    assert_eq!("default for a!", map.get("a").as_str());
    assert_eq!("default for b", map.get("b").as_str());
    drop(map);
    assert_eq!(2, made);
}

#[test]
fn insert_overwrites_and_remove_deletes() {
    let mut map = DefaultMap::new(|_: &u32| 0);
    map.insert(5, 42);
    assert_eq!(42, *map.get(5));
    assert!(map.remove(&5));
    assert!(!map.remove(&5));
    assert!(map.is_empty());
    // A removed key is materialized from scratch again.
    assert_eq!(0, *map.get(5));
    assert_eq!(1, map.len());
}
