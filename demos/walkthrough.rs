use rbuddy::{ArenaError, BuddyArena};
use tracing::Level;

/// Prints the arena layout: `spare/len` and one cell per block.
fn show(
  label: &str,
  arena: &BuddyArena,
) {
  println!("\n[{label}]\n{arena}");
}

fn main() -> Result<(), ArenaError> {
  tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();

  // The arena from the crate docs: 2^5 = 32 bytes, one free block.
  let mut arena = BuddyArena::create(5)?;
  show("start", &arena);

  // --------------------------------------------------------------------
  // 1) Allocate 8 bytes. The 32-byte block is halved twice.
  // --------------------------------------------------------------------
  let first = arena.allocate(8)?;
  println!("\n[1] allocate(8) -> {first}");
  show("1", &arena);

  // --------------------------------------------------------------------
  // 2) A second 8-byte block lands in the free half left by the split.
  // --------------------------------------------------------------------
  let second = arena.allocate(8)?;
  println!("\n[2] allocate(8) -> {second}");
  show("2", &arena);

  // --------------------------------------------------------------------
  // 3) Rejected requests leave the arena untouched.
  // --------------------------------------------------------------------
  for size in [0, 7, 64] {
    if let Err(err) = arena.allocate(size) {
      println!("[3] allocate({size}) failed: {err} ({})", err.code());
    }
  }

  // --------------------------------------------------------------------
  // 4) Free the first block: its buddy is still allocated, so no merge.
  // --------------------------------------------------------------------
  arena.free(first)?;
  show("4", &arena);

  // --------------------------------------------------------------------
  // 5) Fill the tail, then fragment: 12 spare bytes, no 16-byte block.
  // --------------------------------------------------------------------
  let tail = arena.allocate(16)?;
  let small = arena.allocate(4)?;
  arena.free(second)?;
  show("5", &arena);

  if let Err(err) = arena.allocate(16) {
    println!("[5] allocate(16) failed: {err}");
  }

  // --------------------------------------------------------------------
  // 6) Compact. Old offsets (`tail`, `small`) do not carry over.
  // --------------------------------------------------------------------
  let mut arena = arena.compact()?;
  show("6 compacted", &arena);
  println!("[6] offsets {tail} and {small} referred to the old arena");

  let big = arena.allocate(8)?;
  println!("[6] allocate(8) -> {big}");
  show("6", &arena);

  arena.validate()?;
  println!("\nEnd of walkthrough.");

  Ok(())
}
