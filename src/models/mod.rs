pub mod card;
pub mod filters;

pub use card::{Card, CardPatch, CodeSnippet, NewCard};
pub use filters::{CardSearch, Filters, ListCardsQuery, Metadata, Sort, SortColumn, SortDirection};
