use serde::Serialize;

/// Index of a wellbore in the store's arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WellboreId(pub usize);

/// Index of a root in the store's arena.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RootId(pub usize);

/// Registration index of a group.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct GroupId(pub usize);
