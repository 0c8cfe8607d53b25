mod color;
mod material;
mod uniform;

pub use color::*;
pub use material::*;
pub use uniform::*;
