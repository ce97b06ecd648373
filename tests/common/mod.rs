//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::sync::Arc;

use contact_miner::domain::{Lexicon, parse_abbreviation_list, parse_word_list};

pub const FIRST_NAMES: &str = "\
# given names
Ana
Luis
Eva
Pilar
Concepción
María
Carlos
Laura
Jorge
Marta
Pablo
Sara
";

pub const LAST_NAMES: &str = "\
Ruiz
Gómez
Sanz
Vinardell
Martínez
Pasamar
López
Díaz
Moreno
Torres
Romero
Navarro
";

pub const GENERAL_WORDS: &str = "profesora\nprofesor\nsecretaría\ndepartamento\nde\nla\nfísica\ndespacho\n";

pub const ABBREVIATIONS: &str = "Ma.=María\n";

/// (first, last) pairs that are all known to the lexicon
pub const PEOPLE: [(&str, &str); 10] = [
    ("Ana", "Ruiz"),
    ("Luis", "Gómez"),
    ("Eva", "Sanz"),
    ("Pilar", "Vinardell"),
    ("Carlos", "Martínez"),
    ("Laura", "López"),
    ("Jorge", "Díaz"),
    ("Marta", "Moreno"),
    ("Pablo", "Torres"),
    ("Sara", "Romero"),
];

pub fn lexicon() -> Arc<Lexicon> {
    let lexicon = Lexicon::builder()
        .first_names(parse_word_list(FIRST_NAMES))
        .last_names(parse_word_list(LAST_NAMES))
        .general_words(parse_word_list(GENERAL_WORDS))
        .particles(["de", "del", "la"])
        .titles(["Dra.", "Dr.", "Prof."])
        .suffixes(["Jr."])
        .abbreviations(parse_abbreviation_list(ABBREVIATIONS))
        .build()
        .expect("fixture lexicon");
    Arc::new(lexicon)
}

/// A staff table with one person, one mailto link per row
pub fn staff_table(rows: usize) -> String {
    let body: String = PEOPLE
        .iter()
        .cycle()
        .take(rows)
        .enumerate()
        .map(|(i, (first, last))| {
            format!(
                r#"<tr><td>{first} {last}</td><td>Profesora</td><td><a href="mailto:staff{i}@uni.es">staff{i}@uni.es</a></td></tr>"#
            )
        })
        .collect();
    format!("<html><body><h1>Personal</h1><table>{body}</table></body></html>")
}
