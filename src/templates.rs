//! Sample books for testing and demonstration.
//!
//! Each sample exercises a different part of the painter: numbering with
//! front matter, a Spanish manuscript, and a book with no optional data.

use crate::book::Book;

/// English novella with a prologue, an already-numbered chapter title, an
/// author bio and a blurb.
pub fn novella_json() -> &'static str {
    r##"{
    "title": "The Lighthouse Keeper",
    "author": "Marguerite Hale",
    "description": "On a storm-battered island, a keeper discovers that the light she tends has been signalling to someone who should not exist.\nA quiet, eerie tale about isolation and the stories we tell to stay afloat.",
    "authorBio": "Marguerite Hale grew up on the Cornish coast and has written about the sea for twenty years.\nShe lives with two cats and an unreliable boat.",
    "chapters": [
        {
            "id": "p",
            "title": "Prologue",
            "content": "The light had burned for ninety years before anyone thought to ask who it was for."
        },
        {
            "id": "c1",
            "title": "The Arrival",
            "content": "Eliza came to the island on the last ferry of October, with one suitcase and a letter of appointment folded so many times it had gone soft as cloth.\n\nThe keeper's cottage smelled of paraffin and salt. Someone had left a loaf of bread on the table, still warm."
        },
        {
            "id": "c2",
            "title": "Chapter 2: The Logbook",
            "content": "Every keeper before her had kept a log. Most entries were weather and wicks.\nSome were not."
        },
        {
            "id": "c3",
            "title": "The Answering Light",
            "content": "On the ninth night she saw it: a second light, far out past the reef, blinking back in the same slow rhythm as her own."
        }
    ],
    "theme": {
        "headingFont": "Cinzel",
        "bodyFont": "Lora",
        "primaryColor": "#0f172a",
        "backgroundColor": "#f8fafc",
        "textColor": "#0f172a"
    }
}"##
}

/// Spanish manuscript; one English chapter title does not change the
/// header word.
pub fn spanish_json() -> &'static str {
    r##"{
    "title": "La Casa del Mar",
    "author": "Lucía Ferrer",
    "description": "Un verano, una casa y un secreto que el mar devuelve.",
    "chapters": [
        { "id": "i", "title": "Introducción", "content": "Todo empezó con una carta." },
        { "id": "1", "title": "La llegada", "content": "Llegamos a la casa al atardecer." },
        { "id": "2", "title": "Capítulo 2: El faro", "content": "El faro llevaba años apagado." },
        { "id": "3", "title": "Epilogue", "content": "Nunca volvimos." }
    ]
}"##
}

/// Nothing optional at all.
pub fn bare_json() -> &'static str {
    r##"{ "title": "", "author": "", "chapters": [ { "title": "Only", "content": "One line." } ] }"##
}

/// Parsed [`novella_json`].
pub fn novella() -> Result<Book, String> {
    Book::from_json(novella_json())
}
