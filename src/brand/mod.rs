/// Style palettes, extraction boundary and fallback resolution.
pub mod palette;
