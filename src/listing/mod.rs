use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::gateway::Book;

/// Sold-state filter over the record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SoldFilter {
    #[default]
    Any,
    Sold,
    Available,
}

/// Paid-state filter; only meaningful against sold records but applied as-is,
/// so `unpaid` also matches unsold records (whose paid flag is always false).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaidFilter {
    #[default]
    Any,
    Paid,
    Unpaid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Case-insensitive title collation, matching the text filter.
    #[default]
    Title,
    /// Records without a parseable sale date sort as the lowest value.
    SaleDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// View state of the listing: one text filter, two categorical filters and a
/// sort order. Ephemeral; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub sold: SoldFilter,
    pub paid: PaidFilter,
    pub sort_by: SortKey,
    pub direction: SortDirection,
}

impl ListQuery {
    fn matches(&self, book: &Book, needle: &str) -> bool {
        let haystack = format!("{} {}", book.titolo, book.autore).to_lowercase();
        let match_text = haystack.contains(needle);

        let match_sold = match self.sold {
            SoldFilter::Any => true,
            SoldFilter::Sold => book.venduto,
            SoldFilter::Available => !book.venduto,
        };

        let match_paid = match self.paid {
            PaidFilter::Any => true,
            PaidFilter::Paid => book.pagato,
            PaidFilter::Unpaid => !book.pagato,
        };

        match_text && match_sold && match_paid
    }

    /// AND-compose the three filters, then stable-sort by the chosen key.
    /// The filtered subset preserves the input order before sorting.
    pub fn apply(&self, books: &[Book]) -> Vec<Book> {
        let needle = self.search.to_lowercase();
        let mut view: Vec<Book> = books
            .iter()
            .filter(|b| self.matches(b, &needle))
            .cloned()
            .collect();

        view.sort_by(|a, b| {
            let ord = match self.sort_by {
                SortKey::Title => a.titolo.to_lowercase().cmp(&b.titolo.to_lowercase()),
                SortKey::SaleDate => a.sale_date().cmp(&b.sale_date()),
            };
            match self.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });

        view
    }

    /// Selecting the active key flips the direction; selecting a new key
    /// resets it to ascending.
    pub fn toggle_sort(&mut self, key: SortKey) {
        if self.sort_by == key {
            self.direction = match self.direction {
                SortDirection::Ascending => SortDirection::Descending,
                SortDirection::Descending => SortDirection::Ascending,
            };
        } else {
            self.sort_by = key;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// Drop exactly the record with the given id from an already-fetched set.
/// Lets a delete update the displayed set without a refetch; structural
/// consistency still comes from the next full fetch.
pub fn remove_record(books: &mut Vec<Book>, id: i64) {
    books.retain(|b| b.id != id);
}

/// Sales aggregates over the *unfiltered* record set. Pure function of the
/// set; recomputed wholesale, never maintained incrementally.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub total: usize,
    pub sold: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub paid_total: f64,
    pub outstanding_total: f64,
}

impl Summary {
    pub fn compute(books: &[Book]) -> Self {
        let mut summary = Self {
            total: books.len(),
            ..Self::default()
        };

        for book in books.iter().filter(|b| b.venduto) {
            summary.sold += 1;
            let price = book.prezzo_v.unwrap_or(0.0);
            if book.pagato {
                summary.paid += 1;
                summary.paid_total += price;
            } else {
                summary.unpaid += 1;
                summary.outstanding_total += price;
            }
        }

        summary
    }
}
