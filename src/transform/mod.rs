//! Record cleaning stages applied after schema mapping
//!
//! - [`normalize`] strips `label:` prefixes, trims whitespace, drops rows
//!   with no content and fills absent values with empty strings.
//! - [`enrich`] derives `Date` and attaches provenance metadata.
//! - [`constraints`] truncates values to the destination column widths.

pub mod constraints;
pub mod enrich;
pub mod normalize;

pub use constraints::SizeConstraintEnforcer;
pub use enrich::{Enricher, processing_timestamp};
pub use normalize::{Normalizer, strip_label};
