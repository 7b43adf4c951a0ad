//! Per-node write tracking.

bitflags::bitflags! {
    /// Kinds of platform writes a node has received since its flags were last taken.
    ///
    /// Combine with bitwise OR: `Mutations::ATTRIBUTES | Mutations::STYLE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mutations: u8 {
        const NONE = 0;
        const CREATED = 1 << 0;
        const TEXT = 1 << 1;
        const ATTRIBUTES = 1 << 2;
        const PROPERTIES = 1 << 3;
        const STYLE = 1 << 4;
        const LISTENERS = 1 << 5;
        const CHILDREN = 1 << 6;
        const KEY = 1 << 7;
    }
}

impl Mutations {
    /// Every write the attribute synchronizer can produce.
    pub const SYNC: Self = Self::ATTRIBUTES
        .union(Self::PROPERTIES)
        .union(Self::STYLE)
        .union(Self::LISTENERS);

    /// Whether any attribute-synchronizer write happened.
    pub fn has_sync_writes(&self) -> bool {
        self.intersects(Self::SYNC)
    }
}
