pub mod areas;
pub mod cards;
pub mod client;
pub mod config;
pub mod markup;
pub mod mods;
pub mod output;
pub mod pipeline;
pub mod ranges;
pub mod style_variants;
pub mod uniques;
