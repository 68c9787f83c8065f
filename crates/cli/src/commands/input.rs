//! Parser for interactive `watch` commands.
//!
//! One command per line:
//!
//! | Input | Action |
//! |-------|--------|
//! | `n`, `next` | next page |
//! | `p`, `prev` | previous page |
//! | `g N`, `goto N` | jump to page `N` |
//! | `s FIELD`, `sort FIELD` | sort by `price`, `rating`, `reviews_count` or `created_at` |
//! | `f key=value ...`, `filter ...` | replace filters; bare `f` clears them |
//! | `r`, `refresh` | reload the current page |
//! | `h`, `help`, `?` | show help |
//! | `q`, `quit`, `exit` | stop watching |

use thiserror::Error;
use wb_dashboard_core::{FilterCriteria, SortField, SortFieldError};

/// Help text listing every command.
pub const HELP: &str = "\
Commands:
  n, next              next page
  p, prev              previous page
  g N                  go to page N
  s FIELD              sort by price | rating | reviews_count | created_at
  f key=value ...      filter by min_price, max_price, min_rating, min_reviews
  f                    clear filters
  r                    refresh
  h                    help
  q                    quit";

/// One parsed user command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Next,
    Prev,
    GoTo(u32),
    Sort(SortField),
    Filter(FilterCriteria),
    Refresh,
    Help,
    Quit,
}

/// Errors for lines that are not valid commands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseActionError {
    #[error("Unknown command: {0} (type 'h' for help)")]
    UnknownCommand(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid page number: {0}")]
    InvalidPage(String),

    #[error(transparent)]
    InvalidSortField(#[from] SortFieldError),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),
}

/// Parse one input line; `Ok(None)` for a blank line.
///
/// # Errors
///
/// Returns `ParseActionError` if the line is not a valid command.
pub fn parse_action(line: &str) -> Result<Option<Action>, ParseActionError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(None);
    };

    let action = match command.to_ascii_lowercase().as_str() {
        "n" | "next" => Action::Next,
        "p" | "prev" => Action::Prev,
        "g" | "goto" => {
            let raw = words.next().ok_or(ParseActionError::MissingArgument("page"))?;
            let page = raw
                .parse::<u32>()
                .map_err(|_| ParseActionError::InvalidPage(raw.to_string()))?;
            Action::GoTo(page)
        }
        "s" | "sort" => {
            let raw = words.next().ok_or(ParseActionError::MissingArgument("field"))?;
            Action::Sort(raw.parse()?)
        }
        "f" | "filter" => Action::Filter(parse_filters(words)?),
        "r" | "refresh" => Action::Refresh,
        "h" | "help" | "?" => Action::Help,
        "q" | "quit" | "exit" => Action::Quit,
        other => return Err(ParseActionError::UnknownCommand(other.to_string())),
    };
    Ok(Some(action))
}

fn parse_filters<'a>(pairs: impl Iterator<Item = &'a str>) -> Result<FilterCriteria, ParseActionError> {
    let mut criteria = FilterCriteria::default();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| ParseActionError::InvalidFilter(pair.to_string()))?;
        match key {
            "min_price" => criteria.min_price = Some(parse_bound(pair, value)?),
            "max_price" => criteria.max_price = Some(parse_bound(pair, value)?),
            "min_rating" => criteria.min_rating = Some(parse_bound(pair, value)?),
            "min_reviews" => {
                criteria.min_reviews = Some(
                    value
                        .parse()
                        .map_err(|_| ParseActionError::InvalidFilter(pair.to_string()))?,
                );
            }
            _ => return Err(ParseActionError::InvalidFilter(pair.to_string())),
        }
    }
    Ok(criteria)
}

/// A finite, non-negative bound.
fn parse_bound(pair: &str, value: &str) -> Result<f64, ParseActionError> {
    value
        .parse::<f64>()
        .ok()
        .filter(|bound| bound.is_finite() && *bound >= 0.0)
        .ok_or_else(|| ParseActionError::InvalidFilter(pair.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_action("").unwrap(), None);
        assert_eq!(parse_action("   \t").unwrap(), None);
    }

    #[test]
    fn test_navigation_commands() {
        assert_eq!(parse_action("n").unwrap(), Some(Action::Next));
        assert_eq!(parse_action("NEXT").unwrap(), Some(Action::Next));
        assert_eq!(parse_action("p").unwrap(), Some(Action::Prev));
        assert_eq!(parse_action("g 4").unwrap(), Some(Action::GoTo(4)));
        assert_eq!(parse_action(" r ").unwrap(), Some(Action::Refresh));
        assert_eq!(parse_action("q").unwrap(), Some(Action::Quit));
    }

    #[test]
    fn test_goto_errors() {
        assert_eq!(
            parse_action("g").unwrap_err(),
            ParseActionError::MissingArgument("page")
        );
        assert_eq!(
            parse_action("g two").unwrap_err(),
            ParseActionError::InvalidPage("two".to_string())
        );
    }

    #[test]
    fn test_sort_command() {
        assert_eq!(
            parse_action("s reviews_count").unwrap(),
            Some(Action::Sort(SortField::ReviewsCount))
        );
        assert!(matches!(
            parse_action("s name").unwrap_err(),
            ParseActionError::InvalidSortField(_)
        ));
    }

    #[test]
    fn test_filter_command() {
        let action = parse_action("f min_price=100 max_price=2500.5 min_rating=4 min_reviews=10")
            .unwrap()
            .unwrap();
        assert_eq!(
            action,
            Action::Filter(FilterCriteria {
                min_price: Some(100.0),
                max_price: Some(2500.5),
                min_rating: Some(4.0),
                min_reviews: Some(10),
            })
        );
    }

    #[test]
    fn test_bare_filter_clears() {
        assert_eq!(
            parse_action("f").unwrap(),
            Some(Action::Filter(FilterCriteria::default()))
        );
    }

    #[test]
    fn test_filter_errors() {
        for bad in [
            "f min_price",
            "f color=red",
            "f min_price=-5",
            "f max_price=NaN",
            "f min_reviews=1.5",
        ] {
            assert!(
                matches!(parse_action(bad), Err(ParseActionError::InvalidFilter(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_action("dance").unwrap_err();
        assert!(err.to_string().contains("Unknown command: dance"));
    }
}
