#[cfg(test)]
use rand::{distributions::Standard, thread_rng, Rng};

/// Owned byte sequence used for keys and values.
pub type Bytes = Vec<u8>;
/// Borrowed key bytes.
pub type KeyRef<'a> = &'a [u8];
/// Byte position of a record's start in the log.
pub type Offset = u64;

#[cfg(test)]
pub trait FixtureGen<T> {
    fn gen() -> T;
}

#[cfg(test)]
impl FixtureGen<Bytes> for Bytes {
    fn gen() -> Bytes {
        let mut rng = thread_rng();
        let len = rng.gen_range(32..4097);
        rng.sample_iter(Standard).take(len).collect()
    }
}
