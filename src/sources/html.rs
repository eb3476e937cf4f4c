//! Extraction strategies over HTML listing pages.
//!
//! Two families are provided:
//!
//! | Strategy | Anchor | Used by |
//! |----------|--------|---------|
//! | [`AnchorStrategy`] with [`AnchorField::Text`] | link text contains the date | DOE |
//! | [`AnchorStrategy`] with [`AnchorField::Title`] | link `title` contains the date | ALCE (HTML layout) |
//! | [`TableRowStrategy`] | a table cell contains the date, first link of the row wins | DOE (tabular layout) |
//!
//! Matching is case-insensitive and whitespace-insensitive, since the portals
//! hand-edit their markup. Relative links are joined to the listing URL.

use super::ExtractionStrategy;
use super::dates::DateStyle;
use crate::errors::ParseError;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};
use url::Url;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static CELL: Lazy<Selector> = Lazy::new(|| Selector::parse("td, th").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Which part of an `<a>` element carries the date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorField {
    Text,
    Title,
}

/// Finds the first link whose text or title mentions the target date and
/// points at a PDF.
#[derive(Debug, Clone)]
pub struct AnchorStrategy {
    label: String,
    endpoint: Url,
    links: String,
    field: AnchorField,
    style: DateStyle,
}

impl AnchorStrategy {
    pub fn new(label: &str, endpoint: Url, field: AnchorField, style: DateStyle) -> Self {
        Self {
            label: label.to_string(),
            endpoint,
            links: "a[href]".to_string(),
            field,
            style,
        }
    }

    /// Restrict the candidate links to those matched by `selector`.
    pub fn scoped(mut self, selector: &str) -> Self {
        self.links = selector.to_string();
        self
    }

    fn anchor_value(&self, element: &ElementRef<'_>) -> Option<String> {
        match self.field {
            AnchorField::Text => Some(normalize(element.text())),
            AnchorField::Title => element.value().attr("title").map(|t| normalize([t])),
        }
    }
}

impl ExtractionStrategy for AnchorStrategy {
    fn label(&self) -> &str {
        &self.label
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[instrument(level = "debug", skip_all, fields(strategy = %self.label, %date))]
    fn extract(&self, body: &str, date: NaiveDate) -> Result<Option<Url>, ParseError> {
        let selector = parse_selector(&self.links)?;
        let document = Html::parse_document(body);
        let needle = self.style.render(date).to_lowercase();

        let mut candidates = 0usize;
        for element in document.select(&selector) {
            let Some(value) = self.anchor_value(&element) else {
                continue;
            };
            if !mentions(&value, &needle) {
                continue;
            }
            candidates += 1;
            let resolved = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(&self.endpoint, href))
                .filter(is_pdf);
            if let Some(url) = resolved {
                return Ok(Some(url));
            }
        }

        debug!(%needle, candidates, "No PDF link matched");
        Ok(None)
    }
}

/// Finds the first table row with a cell mentioning the target date and
/// returns the first usable link in that row.
#[derive(Debug, Clone)]
pub struct TableRowStrategy {
    label: String,
    endpoint: Url,
    rows: String,
    style: DateStyle,
}

impl TableRowStrategy {
    pub fn new(label: &str, endpoint: Url, style: DateStyle) -> Self {
        Self {
            label: label.to_string(),
            endpoint,
            rows: "tr".to_string(),
            style,
        }
    }

    pub fn scoped(mut self, selector: &str) -> Self {
        self.rows = selector.to_string();
        self
    }
}

impl ExtractionStrategy for TableRowStrategy {
    fn label(&self) -> &str {
        &self.label
    }

    fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[instrument(level = "debug", skip_all, fields(strategy = %self.label, %date))]
    fn extract(&self, body: &str, date: NaiveDate) -> Result<Option<Url>, ParseError> {
        let selector = parse_selector(&self.rows)?;
        let document = Html::parse_document(body);
        let needle = self.style.render(date).to_lowercase();

        for row in document.select(&selector) {
            let dated = row
                .select(&CELL)
                .any(|cell| mentions(&normalize(cell.text()), &needle));
            if !dated {
                continue;
            }
            let link = row.select(&LINK).find_map(|a| {
                a.value()
                    .attr("href")
                    .and_then(|href| resolve_link(&self.endpoint, href))
            });
            if link.is_some() {
                return Ok(link);
            }
        }

        debug!(%needle, "No dated row with a link");
        Ok(None)
    }
}

fn parse_selector(raw: &str) -> Result<Selector, ParseError> {
    Selector::parse(raw).map_err(|e| ParseError::Selector(format!("{raw}: {e}")))
}

/// Collapse whitespace runs and lowercase, so `07/10/2025\n - Edição`
/// and `07/10/2025 - EDIÇÃO` compare equal.
fn normalize<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    let joined = parts.into_iter().collect::<Vec<_>>().join(" ");
    WHITESPACE
        .replace_all(joined.trim(), " ")
        .to_lowercase()
}

/// Whether `haystack` contains `date` as a whole token, so that
/// `7 de outubro` is not found inside `17 de outubro`.
fn mentions(haystack: &str, date: &str) -> bool {
    haystack.match_indices(date).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + date.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_digit()) && !after.is_some_and(|c| c.is_ascii_digit())
    })
}

/// Join `href` to `base`, keeping only `http`/`https` results.
///
/// Fragments, `javascript:` and `mailto:` links resolve to `None`.
pub(crate) fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    base.join(href)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

fn is_pdf(url: &Url) -> bool {
    url.path().to_ascii_lowercase().ends_with(".pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base() -> Url {
        Url::parse("https://doe.example/list").unwrap()
    }

    fn anchor_text() -> AnchorStrategy {
        AnchorStrategy::new("anchor-text", base(), AnchorField::Text, DateStyle::Numeric)
    }

    #[test]
    fn test_anchor_text_resolves_relative_pdf() {
        let html = r#"<html><body>
            <a href="/docs/122.pdf">06/10/2025 - Edição</a>
            <a href="/docs/123.pdf">07/10/2025 - Edição</a>
        </body></html>"#;
        let url = anchor_text()
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url.unwrap().as_str(), "https://doe.example/docs/123.pdf");
    }

    #[test]
    fn test_anchor_text_takes_first_in_document_order() {
        let html = r#"
            <a href="first.pdf">07/10/2025 - Caderno 1</a>
            <a href="second.pdf">07/10/2025 - Caderno 2</a>
        "#;
        let url = anchor_text()
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url.unwrap().as_str(), "https://doe.example/first.pdf");
    }

    #[test]
    fn test_anchor_text_skips_non_pdf_matches() {
        let html = r#"
            <a href="/noticias/edicao">07/10/2025 - Notícia</a>
            <a href="/docs/123.PDF">07/10/2025 - Edição</a>
        "#;
        let url = anchor_text()
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url.unwrap().as_str(), "https://doe.example/docs/123.PDF");
    }

    #[test]
    fn test_anchor_text_tolerates_nested_markup_and_whitespace() {
        let html = r#"<a href="/docs/9.pdf"><span>07/10/2025</span>
               - <strong>Edição</strong></a>"#;
        let url = anchor_text()
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url.unwrap().as_str(), "https://doe.example/docs/9.pdf");
    }

    #[test]
    fn test_anchor_text_zero_matches() {
        let html = r#"<a href="/docs/122.pdf">06/10/2025 - Edição</a>"#;
        let url = anchor_text()
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url, None);
    }

    #[test]
    fn test_anchor_text_rejects_script_links() {
        let html = r#"<a href="javascript:open('x.pdf')">07/10/2025</a>"#;
        let url = anchor_text()
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url, None);
    }

    #[test]
    fn test_anchor_title_long_date_case_insensitive() {
        let strategy = AnchorStrategy::new(
            "anchor-title",
            Url::parse("https://doalece.example/publico/ultimas-edicoes").unwrap(),
            AnchorField::Title,
            DateStyle::LongPortuguese,
        );
        let html = r#"
            <a href="/arquivos/sem-titulo.pdf">Baixar</a>
            <a title="Diário de 7 de Outubro de 2025" href="../arquivos/do-2025-10-07.pdf">Baixar</a>
        "#;
        let url = strategy
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(
            url.unwrap().as_str(),
            "https://doalece.example/arquivos/do-2025-10-07.pdf"
        );
    }

    #[test]
    fn test_anchor_title_matches_month_with_cedilla() {
        let strategy = AnchorStrategy::new(
            "anchor-title",
            Url::parse("https://doalece.example/publico/ultimas-edicoes").unwrap(),
            AnchorField::Title,
            DateStyle::LongPortuguese,
        );
        let html = r#"<a title="7 de março de 2025" href="/arquivos/do-2025-03-07.pdf">Baixar</a>"#;
        let url = strategy.extract(html, date(2025, 3, 7)).unwrap();
        assert_eq!(
            url.unwrap().as_str(),
            "https://doalece.example/arquivos/do-2025-03-07.pdf"
        );
    }

    #[test]
    fn test_scoped_anchor_ignores_links_outside_scope() {
        let strategy = anchor_text().scoped("#edicoes a[href]");
        let html = r#"
            <nav><a href="/menu.pdf">07/10/2025</a></nav>
            <div id="edicoes"><a href="/docs/123.pdf">07/10/2025 - Edição</a></div>
        "#;
        let url = strategy
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url.unwrap().as_str(), "https://doe.example/docs/123.pdf");
    }

    #[test]
    fn test_invalid_selector_is_a_parse_error() {
        let strategy = anchor_text().scoped("a[[");
        let err = strategy.extract("<a></a>", date(2025, 10, 7)).unwrap_err();
        assert!(matches!(err, ParseError::Selector(_)));
    }

    #[test]
    fn test_table_row_takes_first_link_of_dated_row() {
        let strategy = TableRowStrategy::new("table-row", base(), DateStyle::Numeric);
        let html = r#"<table>
            <tr><th>Data</th><th>Arquivo</th></tr>
            <tr><td>06/10/2025</td><td><a href="/dl?id=41">Baixar</a></td></tr>
            <tr><td> 07/10/2025 </td><td><a href="/dl?id=42">Baixar</a> <a href="/dl?id=43">Suplemento</a></td></tr>
        </table>"#;
        let url = strategy
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url.unwrap().as_str(), "https://doe.example/dl?id=42");
    }

    #[test]
    fn test_table_row_without_link_is_skipped() {
        let strategy = TableRowStrategy::new("table-row", base(), DateStyle::Numeric);
        let html = r#"<table>
            <tr><td>07/10/2025</td><td>Em breve</td></tr>
        </table>"#;
        let url = strategy
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url, None);
    }

    #[test]
    fn test_day_is_not_matched_inside_longer_number() {
        assert!(mentions("diário de 7 de outubro de 2025", "7 de outubro de 2025"));
        assert!(!mentions("diário de 17 de outubro de 2025", "7 de outubro de 2025"));
        assert!(mentions("17 de outubro de 2025 e 7 de outubro de 2025", "7 de outubro de 2025"));
        assert!(!mentions("07/10/20251", "07/10/2025"));
    }

    #[test]
    fn test_anchor_title_skips_later_day_with_same_suffix() {
        let strategy = AnchorStrategy::new(
            "anchor-title",
            base(),
            AnchorField::Title,
            DateStyle::LongPortuguese,
        );
        let html = r#"
            <a title="17 de outubro de 2025" href="/d/17.pdf">DO</a>
            <a title="7 de outubro de 2025" href="/d/7.pdf">DO</a>
        "#;
        let url = strategy
            .extract(html, date(2025, 10, 7))
            .unwrap();
        assert_eq!(url.unwrap().as_str(), "https://doe.example/d/7.pdf");
    }

    #[test]
    fn test_resolve_link() {
        let base = base();
        assert_eq!(
            resolve_link(&base, "docs/1.pdf").unwrap().as_str(),
            "https://doe.example/docs/1.pdf"
        );
        assert_eq!(
            resolve_link(&base, "http://other.example/a.pdf").unwrap().as_str(),
            "http://other.example/a.pdf"
        );
        assert_eq!(resolve_link(&base, "#top"), None);
        assert_eq!(resolve_link(&base, "   "), None);
        assert_eq!(resolve_link(&base, "mailto:diario@ce.gov.br"), None);
    }
}
