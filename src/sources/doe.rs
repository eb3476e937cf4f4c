//! Diário Oficial do Estado do Ceará.
//!
//! The gazette is listed on the CGE portal. Current editions are links whose
//! text starts with the date (`07/10/2025 - Edição ...`); older snapshots of
//! the page used a table with a date column and a download column, which is
//! kept as the second strategy.
//!
//! The portal's certificate chain is incomplete, so verification is off.

use super::dates::DateStyle;
use super::html::{AnchorField, AnchorStrategy, TableRowStrategy};
use super::{PublicationSource, parse_url};
use crate::errors::ConfigError;
use url::Url;

pub const NAME: &str = "DOE";
pub const LISTING_URL: &str = "https://www.cge.ce.gov.br/diario-oficial-do-estado/";

pub fn source() -> Result<PublicationSource, ConfigError> {
    Ok(source_at(parse_url(LISTING_URL)?))
}

/// DOE source reading its listing from `listing`.
pub fn source_at(listing: Url) -> PublicationSource {
    PublicationSource::new(NAME, false)
        .with_strategy(AnchorStrategy::new(
            "doe-anchor-text",
            listing.clone(),
            AnchorField::Text,
            DateStyle::Numeric,
        ))
        .with_strategy(
            TableRowStrategy::new("doe-table-row", listing, DateStyle::Numeric).scoped("table tr"),
        )
}
