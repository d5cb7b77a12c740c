pub mod director;
pub mod io;
pub mod player;

pub use director::file::{read_movie_file_bytes, MovieFile};
pub use director::lingo::datum::Datum;
pub use player::{Player, PlayerState};
