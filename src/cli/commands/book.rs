use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::utils::{confirm, output_success};
use crate::cli::{require_session, OutputFormat};
use crate::export;
use crate::gateway::{Book, BookDraft, RecordGateway};
use crate::listing::{self, ListQuery, PaidFilter, SoldFilter, SortDirection, SortKey, Summary};
use crate::session::SessionStore;

/// Filter and sort flags shared by `list` and `export`.
#[derive(Args)]
pub struct ListArgs {
    #[arg(long, default_value = "", help = "Case-insensitive search over title and author")]
    pub search: String,

    #[arg(long, value_enum, default_value_t, help = "Sold-state filter")]
    pub stato: SoldFilter,

    #[arg(long, value_enum, default_value_t, help = "Paid-state filter")]
    pub pagamento: PaidFilter,

    #[arg(long, value_enum, default_value_t, help = "Sort key")]
    pub sort: SortKey,

    #[arg(long, help = "Sort descending")]
    pub desc: bool,
}

impl ListArgs {
    fn query(&self) -> ListQuery {
        ListQuery {
            search: self.search.clone(),
            sold: self.stato,
            paid: self.pagamento,
            sort_by: self.sort,
            direction: if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }
    }
}

#[derive(Subcommand)]
pub enum BookCommands {
    #[command(about = "List records with filters, sorting and a sales summary")]
    List {
        #[command(flatten)]
        args: ListArgs,
    },

    #[command(about = "Show one record by id")]
    Show {
        #[arg(help = "Record id")]
        id: i64,
    },

    #[command(about = "Add a new record")]
    Add {
        #[arg(long)]
        titolo: String,
        #[arg(long)]
        autore: String,
        #[arg(long)]
        casa_editrice: Option<String>,
        #[arg(long, help = "Mark the record as sold")]
        venduto: bool,
        #[arg(long, help = "Mark the record as paid (sold records only)")]
        pagato: bool,
        #[arg(long, help = "Sale price")]
        prezzo: Option<f64>,
        #[arg(long, help = "Sale date (YYYY-MM-DD)")]
        data_vendita: Option<String>,
    },

    #[command(about = "Edit a record; omitted fields keep their current value")]
    Edit {
        #[arg(help = "Record id")]
        id: i64,
        #[arg(long)]
        titolo: Option<String>,
        #[arg(long)]
        autore: Option<String>,
        #[arg(long)]
        casa_editrice: Option<String>,
        #[arg(long, help = "Sold flag (true/false)")]
        venduto: Option<bool>,
        #[arg(long, help = "Paid flag (true/false, sold records only)")]
        pagato: Option<bool>,
        #[arg(long, help = "Sale price")]
        prezzo: Option<f64>,
        #[arg(long, help = "Sale date (YYYY-MM-DD)")]
        data_vendita: Option<String>,
    },

    #[command(about = "Delete a record")]
    Delete {
        #[arg(help = "Record id")]
        id: i64,
        #[arg(long, help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Flip the paid flag of a sold record")]
    TogglePaid {
        #[arg(help = "Record id")]
        id: i64,
    },

    #[command(about = "Export the filtered view to a spreadsheet")]
    Export {
        #[command(flatten)]
        args: ListArgs,
        #[arg(long, default_value = export::DEFAULT_FILE, help = "Output file path")]
        output: PathBuf,
    },
}

fn render_summary(summary: &Summary) {
    println!(
        "Totale: {}  Venduti: {}  Pagati: {}  Da incassare: {:.2} €  Incassato: {:.2} €",
        summary.total, summary.sold, summary.paid, summary.outstanding_total, summary.paid_total
    );
}

fn render_table(view: &[Book]) {
    println!(
        "{:<5} {:<28} {:<22} {:<18} {:<12} {:<10} {:>8} {:>12}",
        "ID", "Titolo", "Autore", "Casa Editrice", "Stato", "Pagato", "Prezzo", "Data Vendita"
    );
    for book in view {
        let price = export::format_price(book);
        let date = export::format_sale_date(book);
        println!(
            "{:<5} {:<28} {:<22} {:<18} {:<12} {:<10} {:>8} {:>12}",
            book.id,
            book.titolo,
            book.autore,
            book.casa_editrice.as_deref().unwrap_or("-"),
            export::format_state(book),
            export::format_paid(book),
            if price.is_empty() { "-" } else { price.as_str() },
            if date.is_empty() { "-" } else { date.as_str() },
        );
    }
}

fn render_book(book: &Book) {
    println!("ID:            {}", book.id);
    println!("Titolo:        {}", book.titolo);
    println!("Autore:        {}", book.autore);
    println!(
        "Casa Editrice: {}",
        book.casa_editrice.as_deref().unwrap_or("-")
    );
    println!("Stato:         {}", export::format_state(book));
    if book.venduto {
        println!("Pagato:        {}", export::format_paid(book));
        let price = export::format_price(book);
        println!("Prezzo:        {}", if price.is_empty() { "-" } else { price.as_str() });
        let date = export::format_sale_date(book);
        println!("Data Vendita:  {}", if date.is_empty() { "-" } else { date.as_str() });
    }
}

pub async fn handle(cmd: BookCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut store = SessionStore::open()?;
    let session = require_session(&mut store)?;
    let gateway = RecordGateway::for_session(&session);

    match cmd {
        BookCommands::List { args } => {
            let books = gateway.list().await?;
            let summary = Summary::compute(&books);
            let view = args.query().apply(&books);

            match output_format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "summary": summary,
                            "books": view,
                        }))?
                    );
                }
                OutputFormat::Text => {
                    render_summary(&summary);
                    println!();
                    render_table(&view);
                }
            }
            Ok(())
        }
        BookCommands::Show { id } => {
            let book = gateway.get(id).await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&book)?),
                OutputFormat::Text => render_book(&book),
            }
            Ok(())
        }
        BookCommands::Add {
            titolo,
            autore,
            casa_editrice,
            venduto,
            pagato,
            prezzo,
            data_vendita,
        } => {
            let draft = BookDraft {
                titolo,
                autore,
                casa_editrice,
                venduto,
                pagato,
                prezzo_v: prezzo,
                data_vendita,
            }
            .normalized();

            let book = gateway.create(&draft).await?;
            output_success(
                &output_format,
                &format!("Book '{}' added with id {}", book.titolo, book.id),
                Some(json!({ "book": book })),
            )
        }
        BookCommands::Edit {
            id,
            titolo,
            autore,
            casa_editrice,
            venduto,
            pagato,
            prezzo,
            data_vendita,
        } => {
            // Pre-populate from the current record, as the edit form does.
            let current = gateway.get(id).await?;
            let mut draft = BookDraft::from(&current);

            if let Some(v) = titolo {
                draft.titolo = v;
            }
            if let Some(v) = autore {
                draft.autore = v;
            }
            if let Some(v) = casa_editrice {
                draft.casa_editrice = Some(v);
            }
            if let Some(v) = venduto {
                draft.venduto = v;
            }
            if let Some(v) = pagato {
                draft.pagato = v;
            }
            if let Some(v) = prezzo {
                draft.prezzo_v = Some(v);
            }
            if let Some(v) = data_vendita {
                draft.data_vendita = Some(v);
            }

            let book = gateway.update(id, &draft.normalized()).await?;
            output_success(
                &output_format,
                &format!("Book {} updated", book.id),
                Some(json!({ "book": book })),
            )
        }
        BookCommands::Delete { id, yes } => {
            // Fetch the view first: after the delete the displayed set is
            // this set minus the deleted id, with no refetch.
            let mut books = gateway.list().await?;

            if !yes && !confirm(&format!("Delete record {}?", id))? {
                println!("Aborted");
                return Ok(());
            }

            gateway.delete(id).await?;
            listing::remove_record(&mut books, id);

            output_success(
                &output_format,
                &format!("Book {} deleted", id),
                Some(json!({ "books": books })),
            )?;
            if matches!(output_format, OutputFormat::Text) {
                render_table(&books);
            }
            Ok(())
        }
        BookCommands::TogglePaid { id } => {
            gateway.toggle_paid(id).await?;

            // The toggled state lives server-side; always refetch.
            let books = gateway.list().await?;
            output_success(
                &output_format,
                &format!("Toggled paid flag for record {}", id),
                Some(json!({ "books": books })),
            )?;
            if matches!(output_format, OutputFormat::Text) {
                render_table(&books);
            }
            Ok(())
        }
        BookCommands::Export { args, output } => {
            let books = gateway.list().await?;
            let view = args.query().apply(&books);

            let rows = export::sheet_rows(&view);
            export::write_xlsx(&rows, &output)?;

            output_success(
                &output_format,
                &format!("Exported {} record(s) to {}", view.len(), output.display()),
                Some(json!({
                    "records": view.len(),
                    "file": output.display().to_string(),
                })),
            )
        }
    }
}
