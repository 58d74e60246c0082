mod brand;
mod branch;
mod ids;
mod lot;
mod lot_branch;
mod movement;
mod product;
mod stock;

pub use brand::*;
pub use branch::*;
pub use ids::*;
pub use lot::*;
pub use lot_branch::*;
pub use movement::*;
pub use product::*;
pub use stock::*;
