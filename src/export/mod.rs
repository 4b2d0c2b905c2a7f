use std::path::Path;

use rust_xlsxwriter::{Workbook, XlsxError};

use crate::gateway::Book;

/// Name of the single sheet in the exported workbook.
pub const SHEET_NAME: &str = "Libri";

/// Default export file name.
pub const DEFAULT_FILE: &str = "libri.xlsx";

const HEADERS: [&str; 7] = [
    "Titolo",
    "Autore",
    "Casa Editrice",
    "Stato",
    "Pagato",
    "Prezzo",
    "Data Vendita",
];

/// Sum of sale prices over the sold records of a view.
pub fn sold_total(view: &[Book]) -> f64 {
    // Fold from +0.0 explicitly: `Iterator::sum` for floats uses -0.0 as its
    // identity, which would render an empty view's total as "-0.00".
    view.iter()
        .filter(|b| b.venduto)
        .map(|b| b.prezzo_v.unwrap_or(0.0))
        .fold(0.0, |acc, p| acc + p)
}

/// Human-readable sold state, as rendered in the table.
pub fn format_state(book: &Book) -> &'static str {
    if book.venduto {
        "Venduto"
    } else {
        "Disponibile"
    }
}

/// Human-readable paid state; `-` for records that were never sold.
pub fn format_paid(book: &Book) -> &'static str {
    if !book.venduto {
        "-"
    } else if book.pagato {
        "Pagato"
    } else {
        "In attesa"
    }
}

/// Two-decimal price for sold records, empty otherwise.
pub fn format_price(book: &Book) -> String {
    match book.prezzo_v {
        Some(price) if book.venduto => format!("{:.2}", price),
        _ => String::new(),
    }
}

/// `dd/mm/yyyy` sale date for sold records, empty when absent or unparseable.
pub fn format_sale_date(book: &Book) -> String {
    if !book.venduto {
        return String::new();
    }
    book.sale_date()
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_default()
}

/// Render the current view into spreadsheet rows: header, one row per visible
/// record with the table's formatting rules, a blank row, then a totals row
/// summing sale prices over the sold records *of the view*.
///
/// Consumes the listing pipeline's output, never the raw record set.
pub fn sheet_rows(view: &[Book]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(view.len() + 3);
    rows.push(HEADERS.iter().map(|h| h.to_string()).collect());

    for book in view {
        rows.push(vec![
            book.titolo.clone(),
            book.autore.clone(),
            book.casa_editrice.clone().unwrap_or_default(),
            format_state(book).to_string(),
            format_paid(book).to_string(),
            format_price(book),
            format_sale_date(book),
        ]);
    }

    rows.push(Vec::new());
    rows.push(vec![
        String::new(),
        String::new(),
        String::new(),
        String::new(),
        "Totale Venduto".to_string(),
        format!("{:.2}", sold_total(view)),
        String::new(),
    ]);

    rows
}

/// Write the rows to a single-sheet workbook at the given path.
pub fn write_xlsx(rows: &[Vec<String>], path: &Path) -> Result<(), XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            worksheet.write_string(r as u32, c as u16, cell.as_str())?;
        }
    }

    workbook.save(path)?;
    Ok(())
}
