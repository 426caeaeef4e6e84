pub const USER_AGENT: &str = "Cinetrend/0.1";

pub mod trending {

    /// Most recent events considered per aggregation.
    pub const WINDOW: usize = 200;

    pub const DEFAULT_LIMIT: i64 = 10;

    pub const ORDER_FIELD: &str = "createdAt";
}

pub mod limits {

    pub const MAX_SEARCH_RESULTS: usize = 10;
}
