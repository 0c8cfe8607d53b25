mod controller;
mod idle_reset;
mod idle_timer;
mod limits;
mod state;

pub use controller::*;
pub use idle_reset::*;
pub use limits::*;
pub use state::*;
