//! Discovery across all configured sources.
//!
//! Each source is asked for today's publication first. Gazettes are often
//! uploaded late, so on a miss the same source is asked for yesterday's.
//! Sources are queried one after the other and never affect each other.

use crate::fetch::Fetcher;
use crate::models::{Discoveries, Resolution};
use crate::sources::PublicationSource;
use chrono::{Days, NaiveDate};
use tracing::{info, instrument, warn};

/// The date tried when `today` has nothing.
pub fn fallback_date(today: NaiveDate) -> Option<NaiveDate> {
    today.checked_sub_days(Days::new(1))
}

/// Resolve every source for `today`, falling back to the previous day.
///
/// Sources without a match are left out of the result. An empty result is a
/// normal outcome.
#[instrument(level = "info", skip_all, fields(%today, sources = sources.len()))]
pub async fn discover_all<F: Fetcher>(
    fetcher: &F,
    sources: &[PublicationSource],
    today: NaiveDate,
) -> Discoveries {
    let mut found = Discoveries::new();

    for source in sources {
        let mut resolution = source.resolve(fetcher, today).await;
        if let Resolution::NotFound(miss) = resolution {
            match fallback_date(today) {
                Some(yesterday) => {
                    info!(source = %source.name, reason = %miss, %yesterday, "Nothing for today; trying previous day");
                    resolution = source.resolve(fetcher, yesterday).await;
                }
                None => warn!(source = %source.name, "No previous day to fall back to"),
            }
        }

        match resolution {
            Resolution::Found(url) => {
                info!(source = %source.name, %url, "Source resolved");
                found.insert(source.name.clone(), url);
            }
            Resolution::NotFound(miss) => {
                info!(source = %source.name, reason = %miss, "Source has no recent publication");
            }
        }
    }

    info!(resolved = found.len(), "Discovery finished");
    found
}
