pub mod espn;
pub mod trade_feed;
