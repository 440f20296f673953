mod ballot;
pub mod board;
pub mod catalog;
mod effect;
pub mod movement;
mod rng;
pub mod robots;
mod session;
pub mod tile;
pub mod verify;

pub use crate::ballot::Ballot;
pub use crate::board::{generate_board, Board};
pub use crate::catalog::{load_catalog, CatalogError, CatalogSource, TileCatalog};
pub use crate::effect::{Effect, IntentError};
pub use crate::movement::{apply_move, resolve_move};
pub use crate::rng::GameRng;
pub use crate::robots::Robots;
pub use crate::session::{Session, SessionSettings};
pub use crate::tile::{Cell, Tile};
pub use crate::verify::verify_solution;
