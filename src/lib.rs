/*!
Duka is a minimal persistent key value store built on an append-only
record log.

Every write is encoded as a self-delimited record and appended to a
single log file; an in-memory index maps each key to the byte offset of
its most recent record so point lookups can seek straight to the data.
The log is the source of truth and the index is only a cache: it can be
rebuilt at any time with [`LogStore::reindex`], and superseded records
can be dropped by rewriting the log with [`LogStore::compact`].

```rust
use duka::{DukaResult, LogStore};

fn main() -> DukaResult<()> {
    let dir = tempfile::tempdir().unwrap();
    let mut store = LogStore::from_path(dir.path().join("duka.log"), None)?;
    store.append(b"king", b"queen")?;
    assert_eq!(store.get_latest(b"king")?.unwrap(), b"queen".to_vec());
    Ok(())
}
```
*/
#![deny(missing_docs)]
#[macro_use]
extern crate log;
mod codec;
mod config;
mod core;
mod error;
mod index;
mod mem;
mod store;
mod utils;
pub use crate::config::StoreOptions;
pub use crate::core::{Bytes, KeyRef, Offset};
pub use crate::error::{DukaError, DukaResult};
pub use crate::mem::MemStore;
pub use crate::store::LogStore;
