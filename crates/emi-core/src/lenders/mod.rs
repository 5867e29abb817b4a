pub mod catalogue;
pub mod matching;

pub use catalogue::{default_catalogue, Lender, LenderCriteria, LenderKind};
pub use matching::{match_lenders, LenderMatch, LenderMatchInput};
