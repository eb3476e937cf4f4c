//! Diário da Assembleia Legislativa do Ceará.
//!
//! The assembly portal is a single-page app backed by a JSON endpoint listing
//! the latest editions (`dataPublicacao`, `linkDownload`). The server-rendered
//! "últimas edições" page is kept as a fallback: there each edition is a PDF
//! link whose `title` spells the date out, e.g. `7 de outubro de 2025`.

use super::dates::DateStyle;
use super::html::{AnchorField, AnchorStrategy};
use super::json::JsonRecordsStrategy;
use super::{PublicationSource, parse_url};
use crate::errors::ConfigError;
use url::Url;

pub const NAME: &str = "ALCE";
pub const SITE_ROOT: &str = "https://doalece.al.ce.gov.br/";
pub const API_URL: &str = "https://doalece.al.ce.gov.br/api/publico/ultimas-edicoes";
pub const LISTING_URL: &str = "https://doalece.al.ce.gov.br/publico/ultimas-edicoes";

pub fn source() -> Result<PublicationSource, ConfigError> {
    Ok(source_at(
        parse_url(API_URL)?,
        parse_url(LISTING_URL)?,
        parse_url(SITE_ROOT)?,
    ))
}

pub fn source_at(api: Url, listing: Url, root: Url) -> PublicationSource {
    PublicationSource::new(NAME, true)
        .with_strategy(JsonRecordsStrategy::new(
            "alce-json",
            api,
            root,
            "dataPublicacao",
            "linkDownload",
        ))
        .with_strategy(
            AnchorStrategy::new(
                "alce-anchor-title",
                listing,
                AnchorField::Title,
                DateStyle::LongPortuguese,
            )
            .scoped("a[href][title]"),
        )
}
