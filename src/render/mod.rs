//! Terminal rendering of roast cards and purified code

pub mod card;
pub mod color;
pub mod image;
pub mod markdown;
pub mod reveal;

pub use card::{portrait_status, render_card, render_purified, render_purified_header, stat_bar};
pub use color::{CardColor, ColorParseError};
pub use image::{
    HttpImageProbe, ImageLoadError, ImageProbe, ImageRequest, ImageSlot, ImageSource,
    random_seed, resolve_image,
};
pub use markdown::format_markdown;
pub use reveal::{Reveal, RevealFrame};
