use biblioteca_cli::gateway::Book;

pub fn book(id: i64, titolo: &str, autore: &str) -> Book {
    Book {
        id,
        titolo: titolo.to_string(),
        autore: autore.to_string(),
        casa_editrice: None,
        venduto: false,
        pagato: false,
        prezzo_v: None,
        data_vendita: None,
    }
}

pub fn sold_book(
    id: i64,
    titolo: &str,
    autore: &str,
    pagato: bool,
    prezzo: Option<f64>,
    data: Option<&str>,
) -> Book {
    let mut b = book(id, titolo, autore);
    b.venduto = true;
    b.pagato = pagato;
    b.prezzo_v = prezzo;
    b.data_vendita = data.map(String::from);
    b
}
