//! Property tests: random allocate/free sequences keep the arena well formed.

use proptest::prelude::*;
use rbuddy::{ArenaConfig, ArenaError, BuddyArena, Offset};

const POWER: u8 = 6;

#[derive(Debug, Clone)]
enum Op {
  Allocate(u8),
  Free(usize),
}

fn arb_op() -> impl Strategy<Value = Op> {
  prop_oneof![
    3 => (0..=POWER).prop_map(Op::Allocate),
    2 => any::<usize>().prop_map(Op::Free),
  ]
}

fn arena() -> BuddyArena {
  BuddyArena::with_config(ArenaConfig::new(POWER).with_invariant_checks(true)).unwrap()
}

/// Applies `ops`, returning the offsets and sizes still live.
fn run(
  arena: &mut BuddyArena,
  ops: &[Op],
) -> Vec<(Offset, usize)> {
  let mut live: Vec<(Offset, usize)> = Vec::new();

  for op in ops {
    match *op {
      Op::Allocate(order) => {
        let size = 1usize << order;

        match arena.allocate(size) {
          Ok(offset) => live.push((offset, size)),
          Err(ArenaError::OutOfMemory { .. }) => {
            assert!(arena.blocks().all(|block| !block.is_free() || block.size() < size));
          }
          Err(err) => panic!("unexpected error: {err}"),
        }
      }
      Op::Free(index) if !live.is_empty() => {
        let (offset, _) = live.swap_remove(index % live.len());
        arena.free(offset).unwrap();
      }
      Op::Free(_) => {}
    }
  }

  live
}

fn assert_tiles(arena: &BuddyArena) {
  let mut expected = 0;

  for block in arena.blocks() {
    assert_eq!(block.offset.get(), expected);
    assert_eq!(block.offset.get() % block.size(), 0);
    expected += block.size();
  }

  assert_eq!(expected, arena.len());
}

fn layout(arena: &BuddyArena) -> Vec<String> {
  arena.blocks().map(|block| block.header.to_string()).collect()
}

proptest! {
  #![proptest_config(ProptestConfig::with_cases(256))]

  #[test]
  fn test_operations_preserve_invariants(ops in prop::collection::vec(arb_op(), 0..64)) {
    let mut arena = arena();
    let live = run(&mut arena, &ops);

    assert_tiles(&arena);
    prop_assert_eq!(arena.validate(), Ok(()));

    let used: usize = live.iter().map(|(_, size)| size).sum();
    prop_assert_eq!(arena.spare_capacity(), arena.len() - used);

    for (offset, size) in &live {
      prop_assert_eq!(arena.block_size(*offset), *size);
      prop_assert!(!arena.is_free(*offset));
    }
  }

  #[test]
  fn test_buddy_relations(ops in prop::collection::vec(arb_op(), 0..64)) {
    let mut arena = arena();
    run(&mut arena, &ops);

    for offset in arena.traverse() {
      let buddy = arena.buddy_of(offset);
      prop_assert_ne!(buddy, offset);

      if arena.block_size(buddy) == arena.block_size(offset) {
        prop_assert_eq!(arena.buddy_of(buddy), offset);
        prop_assert_eq!(arena.parent_of(buddy), arena.parent_of(offset));
        prop_assert!(!(arena.is_free(offset) && arena.is_free(buddy)));
      }
    }
  }

  #[test]
  fn test_allocate_then_free_restores_layout(
    ops in prop::collection::vec(arb_op(), 0..48),
    order in 0..=POWER,
  ) {
    let mut arena = arena();
    run(&mut arena, &ops);
    let before = layout(&arena);

    if let Ok(offset) = arena.allocate(1 << order) {
      arena.free(offset).unwrap();
      prop_assert_eq!(layout(&arena), before);

      prop_assert_eq!(arena.allocate(1 << order).unwrap(), offset);
    }
  }

  #[test]
  fn test_compaction_preserves_capacity(ops in prop::collection::vec(arb_op(), 0..64)) {
    let mut arena = arena();
    run(&mut arena, &ops);

    let compacted = arena.compact().unwrap();

    prop_assert_eq!(compacted.len(), arena.len());
    prop_assert_eq!(compacted.spare_capacity(), arena.spare_capacity());
    prop_assert_eq!(compacted.validate(), Ok(()));

    let mut live_before: Vec<usize> = arena.blocks().filter(|b| !b.is_free()).map(|b| b.size()).collect();
    let mut live_after: Vec<usize> = compacted.blocks().filter(|b| !b.is_free()).map(|b| b.size()).collect();
    live_before.sort_unstable();
    live_after.sort_unstable();
    prop_assert_eq!(live_before, live_after);
  }
}
