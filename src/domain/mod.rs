pub mod card;
pub mod filter;
pub mod id;
pub mod lifecycle;
pub mod object;
pub mod rarity;
pub mod set;
pub mod timestamp;

pub use card::{Card, CardInput, Embedded, UpsertResult};
pub use filter::{any_pattern, CardFilter, RefFilter, SetFilter};
pub use lifecycle::Lifecycle;
pub use object::Object;
pub use rarity::{Rarity, RarityKind, RARITIES};
pub use set::{Set, SetInput};
pub use timestamp::Timestamp;
