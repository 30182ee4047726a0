//! # rbuddy - A Binary Buddy Allocator over a Byte Arena
//!
//! This crate manages a fixed `2^power` byte arena by carving it into
//! power-of-two **blocks**, handing them out first-fit and merging freed
//! neighbours back together.
//!
//! ## Overview
//!
//! ```text
//!   Buddy Arena Concept (32 bytes after allocate(8), allocate(4)):
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                              ARENA                                   │
//!   │                                                                      │
//!   │   ┌────────────────┬────────┬────────┬────────────────────────────┐  │
//!   │   │       8!       │   4!   │   4?   │            16?             │  │
//!   │   └────────────────┴────────┴────────┴────────────────────────────┘  │
//!   │   0                8        12       16                          32  │
//!   │                                                                      │
//!   │   Every block is 2^k bytes and starts at a multiple of 2^k.          │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Blocks are not separate objects. Each one is a single header byte at its
//! own start offset; walking the arena means reading a header, skipping the
//! block's size, and reading the next header.
//!
//! ## Crate Structure
//!
//! ```text
//!   rbuddy
//!   ├── order       - pow2! macro and power-of-two helpers
//!   ├── header      - one-byte block header codec
//!   ├── offset      - Offset handle with buddy/parent arithmetic
//!   ├── config      - ArenaConfig
//!   ├── error       - ArenaError, ErrorKind
//!   ├── arena       - BuddyArena storage, queries and traversal
//!   ├── buddy       - allocate / free / spare_capacity (internal)
//!   ├── compact     - copying compaction (internal)
//!   └── invariants  - structural checks and Violation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rbuddy::BuddyArena;
//!
//! let mut arena = BuddyArena::create(5)?; // 32 bytes
//!
//! let a = arena.allocate(8)?;
//! let b = arena.allocate(8)?;
//! assert_eq!((a.get(), b.get()), (0, 8));
//! assert_eq!(arena.spare_capacity(), 16);
//!
//! arena.free(a)?;
//! arena.free(b)?;
//! assert_eq!(arena.spare_capacity(), 32);
//! # Ok::<(), rbuddy::ArenaError>(())
//! ```
//!
//! ## How It Works
//!
//! Each header packs a flag and the block order into one byte:
//!
//! ```text
//!   ┌───┬───────────────┐
//!   │ A │  order (7b)   │     A = 1 allocated, 0 free
//!   └───┴───────────────┘     size = 2^order
//! ```
//!
//! Because blocks are self-aligned, a block's **buddy** and **parent** fall
//! out of bit tricks on its offset:
//!
//! ```text
//!   buddy(p)  = p XOR size(p)
//!   parent(p) = p AND NOT size(p)
//!
//!   p = 0b01000 (8), size 8  ->  buddy 0b00000 (0), parent 0
//! ```
//!
//! Allocation splits the first large-enough free block in half until it
//! matches the request. Freeing flips the flag and merges with the buddy for
//! as long as the buddy is free and the same size.
//!
//! ## Limitations
//!
//! - **Single-threaded only**: operations take `&mut self`; no internal locking
//! - **Power-of-two requests only**: other sizes are rejected, not rounded
//! - **O(blocks) per call**: first-fit walks the arena from the start
//! - **Compaction invalidates offsets**: [`BuddyArena::compact`] returns a new
//!   arena and provides no forwarding table

pub mod arena;
mod buddy;
mod compact;
pub mod config;
pub mod error;
pub mod header;
pub mod invariants;
pub mod offset;
pub mod order;

pub use arena::{Block, BuddyArena, Traverse};
pub use config::ArenaConfig;
pub use error::{ArenaError, ErrorKind, Result};
pub use header::Header;
pub use invariants::Violation;
pub use offset::Offset;
