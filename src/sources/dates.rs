//! Date renderings used by the portals.
//!
//! Each portal prints dates its own way, and matching is done on the rendered
//! string, so the rendering has to follow the portal exactly.

use chrono::{Datelike, NaiveDate};

const MESES: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// How a portal writes a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    /// `07/10/2025`
    Numeric,
    /// `7 de outubro de 2025` (no zero padding on the day)
    LongPortuguese,
    /// `2025-10-07`, matched as a prefix of ISO 8601 timestamps
    Iso,
}

impl DateStyle {
    pub fn render(self, date: NaiveDate) -> String {
        match self {
            DateStyle::Numeric => date.format("%d/%m/%Y").to_string(),
            DateStyle::LongPortuguese => format!(
                "{} de {} de {}",
                date.day(),
                MESES[date.month0() as usize],
                date.year()
            ),
            DateStyle::Iso => date.format("%Y-%m-%d").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_numeric_is_zero_padded() {
        assert_eq!(DateStyle::Numeric.render(date(2025, 10, 7)), "07/10/2025");
        assert_eq!(DateStyle::Numeric.render(date(2025, 1, 31)), "31/01/2025");
    }

    #[test]
    fn test_long_portuguese() {
        assert_eq!(
            DateStyle::LongPortuguese.render(date(2025, 10, 7)),
            "7 de outubro de 2025"
        );
        assert_eq!(
            DateStyle::LongPortuguese.render(date(2024, 3, 15)),
            "15 de março de 2024"
        );
        assert_eq!(
            DateStyle::LongPortuguese.render(date(2023, 12, 1)),
            "1 de dezembro de 2023"
        );
    }

    #[test]
    fn test_iso() {
        assert_eq!(DateStyle::Iso.render(date(2025, 10, 7)), "2025-10-07");
    }
}
