//! Parsing proper: the Earley recognizer ([driver]), its supporting tables
//! ([core], [situation], [parse_set], [leo]), bounded error [recovery], and
//! the translation/SPPF builder ([translate]) that turns an accepted
//! [ParseList] into caller-visible output.

pub mod core;
pub mod driver;
pub mod leo;
pub mod parse_set;
pub mod recovery;
pub mod situation;
pub mod translate;

pub use core::{Core, CoreTable};
pub use driver::{drive, DriveOutcome, ParseList, PositionOrigin, Token, TokenReader};
pub use leo::{LeoItem, LeoTable};
pub use parse_set::{ParseSetKey, ParseSetTable};
pub use recovery::{parse, SyntaxErrorInfo};
pub use situation::{Situation, SituationTable};
pub use translate::{build as build_translation, TranslationNode, Translator};
