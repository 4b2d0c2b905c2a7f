mod common;

use biblioteca_cli::gateway::Book;
use biblioteca_cli::listing::{
    ListQuery, PaidFilter, SoldFilter, SortDirection, SortKey, Summary,
};
use common::{book, sold_book};

fn ids(view: &[Book]) -> Vec<i64> {
    view.iter().map(|b| b.id).collect()
}

fn sample_set() -> Vec<Book> {
    vec![
        sold_book(1, "Il deserto dei Tartari", "Dino Buzzati", true, Some(12.0), Some("2024-02-10")),
        book(2, "Il barone rampante", "Italo Calvino"),
        sold_book(3, "La luna e i falò", "Cesare Pavese", false, Some(7.5), Some("2023-11-03")),
        book(4, "Se questo è un uomo", "Primo Levi"),
        sold_book(5, "Il nome della rosa", "Umberto Eco", true, Some(15.0), None),
    ]
}

#[test]
fn filtered_subset_preserves_relative_order() {
    // Identical titles make the sort a no-op, exposing the pre-sort order.
    let books = vec![
        sold_book(1, "Same", "a", false, None, None),
        book(2, "Same", "b"),
        sold_book(3, "Same", "c", false, None, None),
        book(4, "Same", "d"),
    ];

    let query = ListQuery {
        sold: SoldFilter::Sold,
        ..Default::default()
    };
    assert_eq!(ids(&query.apply(&books)), vec![1, 3]);
}

#[test]
fn independent_predicates_commute() {
    let books = sample_set();

    let text_only = ListQuery {
        search: "il".to_string(),
        ..Default::default()
    };
    let sold_only = ListQuery {
        sold: SoldFilter::Sold,
        ..Default::default()
    };
    let paid_only = ListQuery {
        paid: PaidFilter::Paid,
        ..Default::default()
    };
    let combined = ListQuery {
        search: "il".to_string(),
        sold: SoldFilter::Sold,
        paid: PaidFilter::Paid,
        ..Default::default()
    };

    let a = paid_only.apply(&sold_only.apply(&text_only.apply(&books)));
    let b = text_only.apply(&paid_only.apply(&sold_only.apply(&books)));
    let c = combined.apply(&books);

    assert_eq!(ids(&a), ids(&b));
    assert_eq!(ids(&a), ids(&c));
}

#[test]
fn sort_is_stable_for_equal_keys() {
    let books = vec![
        book(10, "Titolo", "x"),
        book(20, "Titolo", "y"),
        book(30, "Titolo", "z"),
    ];

    let mut query = ListQuery::default();
    assert_eq!(ids(&query.apply(&books)), vec![10, 20, 30]);

    query.direction = SortDirection::Descending;
    assert_eq!(ids(&query.apply(&books)), vec![10, 20, 30]);
}

#[test]
fn toggling_direction_twice_restores_the_order() {
    let books = sample_set();
    let mut query = ListQuery {
        sort_by: SortKey::SaleDate,
        ..Default::default()
    };

    let original = ids(&query.apply(&books));
    query.toggle_sort(SortKey::SaleDate);
    let flipped = ids(&query.apply(&books));
    query.toggle_sort(SortKey::SaleDate);
    let restored = ids(&query.apply(&books));

    assert_ne!(original, flipped);
    assert_eq!(original, restored);
}

#[test]
fn sale_date_sort_places_missing_dates_first() {
    let books = sample_set();
    let query = ListQuery {
        sort_by: SortKey::SaleDate,
        sold: SoldFilter::Sold,
        ..Default::default()
    };

    // Record 5 has no sale date and sorts lowest.
    assert_eq!(ids(&query.apply(&books)), vec![5, 3, 1]);
}

#[test]
fn aggregates_satisfy_count_identities() {
    let books = sample_set();
    let summary = Summary::compute(&books);

    assert_eq!(summary.paid + summary.unpaid, summary.sold);
    assert!(summary.sold <= summary.total);
    assert!(summary.paid_total >= 0.0);
    assert!(summary.outstanding_total >= 0.0);

    assert_eq!(summary.total, 5);
    assert_eq!(summary.sold, 3);
    assert_eq!(summary.paid_total, 27.0);
    assert_eq!(summary.outstanding_total, 7.5);
}

#[test]
fn sold_filter_scenario() {
    // Record set: an unsold "Beta" and a sold, paid "Alpha" at 10.
    let books = vec![
        book(1, "Beta", ""),
        sold_book(2, "Alpha", "", true, Some(10.0), None),
    ];

    let query = ListQuery {
        sold: SoldFilter::Sold,
        ..Default::default()
    };
    let view = query.apply(&books);
    assert_eq!(view.len(), 1);
    assert_eq!(view[0].titolo, "Alpha");

    let summary = Summary::compute(&books);
    assert_eq!(summary.paid_total, 10.0);
    assert_eq!(summary.outstanding_total, 0.0);
}
