use typed_builder::TypedBuilder;

/// Log store configuration.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct StoreOptions {
    /// Compress record bodies with snappy before writing.
    ///
    /// The flag is recorded per record, so a store opened without
    /// compression still reads logs written with it.
    #[builder(default = false)]
    pub compress: bool,
    /// Synchronous write IO flag. If enabled every append is fsynced to disk.
    #[builder(default = false)]
    pub sync: bool,
}
