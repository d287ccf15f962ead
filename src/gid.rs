//! Packed global tile identifiers.
//!
//! Tiled stores orientation in the top four bits of every cell value. This
//! module is the only place those bits are interpreted; both loaders feed
//! every raw cell through [`decode`].

/// Bit 31: flipped horizontally.
pub const FLIP_H: u32 = 0x8000_0000;
/// Bit 30: flipped vertically.
pub const FLIP_V: u32 = 0x4000_0000;
/// Bit 29: flipped diagonally.
pub const FLIP_D: u32 = 0x2000_0000;
/// Bit 28: rotated 120 degrees (hexagonal maps only).
pub const ROTATE_120: u32 = 0x1000_0000;
/// All four orientation bits.
pub const FLAG_MASK: u32 = FLIP_H | FLIP_V | FLIP_D | ROTATE_120;
/// Keeps the lower 28 bits.
pub const GID_MASK: u32 = !FLAG_MASK;

/// A raw cell value as stored in the source document, flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId(pub u32);

#[allow(missing_docs)]
impl TileId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
    #[inline]
    pub fn clean(self) -> u32 {
        self.0 & GID_MASK
    }
    #[inline]
    pub fn flags(self) -> GidFlags {
        GidFlags(self.0 & FLAG_MASK)
    }
}

/// Orientation bits split off a [`TileId`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct GidFlags(u32);

impl GidFlags {
    /// No flags set.
    pub const NONE: GidFlags = GidFlags(0);

    /// The flag bits in their original positions.
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }
    /// Mirrored along the vertical axis.
    #[inline]
    pub fn flip_h(self) -> bool {
        self.0 & FLIP_H != 0
    }
    /// Mirrored along the horizontal axis.
    #[inline]
    pub fn flip_v(self) -> bool {
        self.0 & FLIP_V != 0
    }
    /// Mirrored along the top-left to bottom-right diagonal.
    #[inline]
    pub fn flip_d(self) -> bool {
        self.0 & FLIP_D != 0
    }
    /// Rotated by 120 degrees.
    #[inline]
    pub fn rotate_120(self) -> bool {
        self.0 & ROTATE_120 != 0
    }
}

/// Splits a raw identifier into its real id and orientation flags.
///
/// A returned id of `0` is an empty cell; callers drop it.
#[inline]
pub fn decode(raw: u32) -> (u32, GidFlags) {
    let id = TileId(raw);
    (id.clean(), id.flags())
}

/// Parses one textual cell (`"42"`, `" 2147483653 "`, `"-2147483647"`).
///
/// Signed values are reinterpreted bit-for-bit, since some exporters write
/// flagged ids as negative 32-bit integers.
pub fn parse_token(token: &str) -> Option<u32> {
    let token = token.trim();
    token
        .parse::<u32>()
        .ok()
        .or_else(|| token.parse::<i32>().ok().map(|v| v as u32))
}

/// Normalizes a 64-bit integer cell to `u32`.
///
/// Values outside both the `u32` and `i32` ranges are rejected.
pub fn from_i64(value: i64) -> Option<u32> {
    if let Ok(v) = u32::try_from(value) {
        return Some(v);
    }
    i32::try_from(value).ok().map(|v| v as u32)
}
