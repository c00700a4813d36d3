/// Per-vertex traversal progress marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphColor {
    /// Not discovered yet.
    White,
    /// Discovered, not all out-edges examined yet.
    Gray,
    /// Fully examined.
    Black,
}
