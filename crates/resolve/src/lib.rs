//! `desalink-resolve`: village name resolution against an administrative gazetteer.
//!
//! Pure engine crate: receives pre-loaded gazetteer records and query names,
//! returns one tiered match result per query plus the review report.
//! No CLI or file output dependencies.

pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod load;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod report;
pub mod sample;
pub mod similarity;

pub use config::ResolveConfig;
pub use engine::run;
pub use error::ResolveError;
pub use index::{CandidateIndex, ProvinceAliases};
pub use matcher::Matcher;
pub use model::{
    GazetteerRecord, MatchReport, MatchResult, MatchTier, NoMatchReason, QueryName, ResolveInput,
};
pub use normalize::normalize;
pub use similarity::similarity;
