pub mod decoder;
pub mod palette;

pub use decoder::{decode_bitmap, rle_expand, BitmapImage};
pub use palette::{resolve_palette, PaletteRef};
