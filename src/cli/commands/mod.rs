mod check;
mod search;
mod trending;

pub use check::cmd_check;
pub use search::cmd_search_movies;
pub use trending::cmd_trending;
