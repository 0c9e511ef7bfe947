// traits.rs - the key/value contract both cache backends satisfy

/// Minimal content-addressable key/value store. `get`/`mget` return `None`
/// for "not present"; any other I/O failure propagates as `Err`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, String>;

    /// Batched lookup, preserving input order in the output list.
    fn mget(&self, keys: &[Vec<u8>]) -> Result<Vec<Option<Vec<u8>>>, String> {
        keys.iter().map(|k| self.get(k)).collect()
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), String>;

    fn delete(&self, key: &[u8]) -> Result<(), String>;

    fn close(&self) -> Result<(), String> {
        Ok(())
    }

    /// Remove every entry this store owns. Implementations only ever
    /// delete paths/trees that look like their own cache, never an
    /// arbitrary caller-supplied directory.
    fn drop_all(&self) -> Result<(), String>;
}
