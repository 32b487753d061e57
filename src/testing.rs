//! Testing utilities for code built on `ironbind`.
//!
//! - **Fixtures**: bound record types and deterministic sample data
//! - **Assertions**: compare row groups and schemas with readable failures
//! - **Mock I/O**: an in-memory column store with failure injection, and
//!   self-deleting temporary paths for file-backed tests
//!
//! # Quick Start
//!
//! ```
//! use ironbind::{Mapper, MapperConfig};
//! use ironbind::testing::*;
//! # fn main() -> anyhow::Result<()> {
//!
//! let mapper = Mapper::new(MapperConfig::new().with_batch_size(4));
//! let mut store = MemoryStore::for_record::<SampleTrade>()?;
//! mapper.write_rows(sample_trades(10), &mut store, &Default::default())?;
//!
//! assert_row_group_sizes(store.row_group_rows(), &[4, 4, 2]);
//! # Ok(())
//! # }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod mock_io;

pub use assertions::*;
pub use fixtures::*;
pub use mock_io::*;
