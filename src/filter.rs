//! Optional keyword screening of downloaded gazettes.
//!
//! With no keywords configured every artifact passes untouched. Otherwise the
//! text of each PDF is extracted and searched case-insensitively; only
//! gazettes mentioning at least one keyword are kept, and the message body
//! gets one line per kept gazette listing the keywords it contains.

use crate::errors::ParseError;
use crate::models::Artifact;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{info, instrument, warn};

/// Artifacts that passed the screen, plus the updated message body.
#[derive(Debug)]
pub struct Screened {
    pub artifacts: Vec<Artifact>,
    pub body: String,
}

/// Screen `artifacts` against `keywords` using PDF text extraction.
pub fn screen(artifacts: Vec<Artifact>, keywords: &[String], body: String) -> Screened {
    screen_with(artifacts, keywords, body, pdf_text)
}

/// Same as [`screen`] with a custom text extractor.
#[instrument(level = "info", skip_all, fields(artifacts = artifacts.len(), keywords = keywords.len()))]
pub fn screen_with(
    artifacts: Vec<Artifact>,
    keywords: &[String],
    mut body: String,
    extract: impl Fn(&[u8]) -> Result<String, ParseError>,
) -> Screened {
    if keywords.is_empty() {
        return Screened { artifacts, body };
    }

    let mut kept = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let text = match extract(&artifact.content) {
            Ok(text) => text,
            Err(e) => {
                warn!(source = %artifact.source, error = %e, "Could not read gazette text; not sending it");
                continue;
            }
        };

        let hits = matching_keywords(&text, keywords);
        if hits.is_empty() {
            info!(source = %artifact.source, "No keyword found; not sending it");
            continue;
        }

        info!(source = %artifact.source, hits = ?hits, "Keywords found");
        body.push_str(&format!(
            "- O diário '{}' contém as palavras: {}.\n",
            artifact.source,
            hits.join(", ")
        ));
        kept.push(artifact);
    }

    Screened {
        artifacts: kept,
        body,
    }
}

/// Keywords that occur in `text`, ignoring case, in configuration order.
pub fn matching_keywords<'k>(text: &str, keywords: &'k [String]) -> Vec<&'k str> {
    let haystack = text.to_lowercase();
    keywords
        .iter()
        .filter(|k| haystack.contains(&k.to_lowercase()))
        .map(String::as_str)
        .collect()
}

/// Extract the text layer of a PDF.
///
/// `pdf-extract` panics on some malformed documents; those are reported as
/// parse errors.
pub fn pdf_text(bytes: &[u8]) -> Result<String, ParseError> {
    match catch_unwind(AssertUnwindSafe(|| pdf_extract::extract_text_from_mem(bytes))) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ParseError::Pdf(e.to_string())),
        Err(_) => Err(ParseError::Pdf("extractor panicked".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn artifact(source: &str, text: &str) -> Artifact {
        Artifact::new(
            source,
            NaiveDate::from_ymd_opt(2025, 10, 7).unwrap(),
            text.as_bytes().to_vec(),
        )
    }

    fn as_text(bytes: &[u8]) -> Result<String, ParseError> {
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn keywords(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_no_keywords_passes_everything() {
        let screened = screen_with(
            vec![artifact("DOE", "qualquer"), artifact("ALCE", "coisa")],
            &[],
            "Olá\n".to_string(),
            |_| panic!("extractor must not run without keywords"),
        );
        assert_eq!(screened.artifacts.len(), 2);
        assert_eq!(screened.body, "Olá\n");
    }

    #[test]
    fn test_keeps_only_matching_gazettes() {
        let screened = screen_with(
            vec![
                artifact("DOE", "Portaria de NOMEAÇÃO do servidor; aviso de Licitação"),
                artifact("ALCE", "Sessão ordinária"),
            ],
            &keywords(&["nomeação", "licitação", "edital"]),
            "Olá\n\n".to_string(),
            as_text,
        );

        assert_eq!(screened.artifacts.len(), 1);
        assert_eq!(screened.artifacts[0].source, "DOE");
        assert_eq!(
            screened.body,
            "Olá\n\n- O diário 'DOE' contém as palavras: nomeação, licitação.\n"
        );
    }

    #[test]
    fn test_unreadable_pdf_is_dropped() {
        let screened = screen_with(
            vec![artifact("DOE", "edital")],
            &keywords(&["edital"]),
            String::new(),
            |_| Err(ParseError::Pdf("broken xref".to_string())),
        );
        assert!(screened.artifacts.is_empty());
        assert!(screened.body.is_empty());
    }

    #[test]
    fn test_matching_keywords_ignores_case() {
        let kw = keywords(&["Edital", "concurso"]);
        assert_eq!(matching_keywords("EDITAL nº 12", &kw), vec!["Edital"]);
        assert!(matching_keywords("nada", &kw).is_empty());
    }

    #[test]
    fn test_pdf_text_rejects_garbage() {
        assert!(matches!(pdf_text(b"not a pdf"), Err(ParseError::Pdf(_))));
    }
}
