macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

handle!(
    /// A program linked into a [`GraphicsContext`](super::GraphicsContext).
    ProgramHandle
);
handle!(
    /// A device buffer.
    BufferHandle
);
handle!(
    /// A 2D texture with its sampler.
    TextureHandle
);

/// Next handle for a table of `len` entries.
pub(crate) fn next_index(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
