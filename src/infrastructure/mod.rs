pub mod clients;
pub mod scrapers;
pub mod storage;

pub use clients::espn::{EspnClient, RosterPlayer, TeamRoster};
pub use clients::trade_feed::TradeFeedClient;
pub use scrapers::{candidate_tables, GamelogPage, PageSource, SplitsPage, TeamStatsPage, TrendsPage};
pub use storage::fs_store::FileSystemStore;
