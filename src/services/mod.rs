pub mod extraction;
pub mod joining;
pub mod normalize;
pub mod prediction;
pub mod scraping;
