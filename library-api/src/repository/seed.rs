//! Demo data loaded at startup when `storage.seed` is enabled

use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::{Author, Book};

struct SeedBook {
    id: &'static str,
    title: &'static str,
    description: &'static str,
}

struct SeedAuthor {
    id: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    born: (i32, u32, u32),
    genre: &'static str,
    books: &'static [SeedBook],
}

const SEED: &[SeedAuthor] = &[
    SeedAuthor {
        id: "25320c5e-f58a-4b1f-b63a-8ee07a840bdf",
        first_name: "Stephen",
        last_name: "King",
        born: (1947, 9, 21),
        genre: "Horror",
        books: &[
            SeedBook {
                id: "c7ba6add-09c4-45f8-8dd0-eaca221e5d93",
                title: "The Shining",
                description: "A winter caretaker and his family are alone in a haunted hotel.",
            },
            SeedBook {
                id: "a3749477-f823-4124-aa4a-fc9ad5e79cd6",
                title: "Misery",
                description: "A novelist is held captive by the fan who rescued him.",
            },
            SeedBook {
                id: "70a1f9b9-0a37-4c1a-99b1-c7709fc64167",
                title: "It",
                description: "Seven friends return to Derry to face what hunted them as children.",
            },
            SeedBook {
                id: "60188a2b-2784-4fc4-8df8-8919ff838b0b",
                title: "The Stand",
                description: "Survivors of a pandemic drift toward two opposing camps.",
            },
        ],
    },
    SeedAuthor {
        id: "76053df4-6687-4353-8937-b45556748abe",
        first_name: "George",
        last_name: "RR Martin",
        born: (1948, 9, 20),
        genre: "Fantasy",
        books: &[
            SeedBook {
                id: "447eb762-95e9-4c31-95e1-b20053fbe215",
                title: "A Game of Thrones",
                description: "Noble houses of Westeros scheme for the Iron Throne.",
            },
            SeedBook {
                id: "bc4c35c3-3857-4250-9449-155fcf5109ec",
                title: "The Winds of Winter",
                description: "The long-awaited sixth volume of the saga.",
            },
            SeedBook {
                id: "09af5a52-9421-44e8-a2bb-a6b9ccbc8239",
                title: "A Dance with Dragons",
                description: "Daenerys rules in Meereen while the Wall braces for winter.",
            },
        ],
    },
    SeedAuthor {
        id: "412c3012-d891-4f5e-9613-ff7aa63e6bb3",
        first_name: "Neil",
        last_name: "Gaiman",
        born: (1960, 11, 10),
        genre: "Fantasy",
        books: &[SeedBook {
            id: "9edf91ee-ab77-4521-a402-5f188bc0c577",
            title: "American Gods",
            description: "Old gods and new ones go to war across America.",
        }],
    },
    SeedAuthor {
        id: "578359b7-1967-41d6-8b87-64ab7605587e",
        first_name: "Tom",
        last_name: "Lanoye",
        born: (1958, 8, 27),
        genre: "Various",
        books: &[SeedBook {
            id: "01457142-358f-495f-aafa-fb23de3d67e9",
            title: "Speechless",
            description: "A son writes about his mother losing her power of speech.",
        }],
    },
    SeedAuthor {
        id: "f74d6899-9ed2-4137-9876-66b070553f8f",
        first_name: "Douglas",
        last_name: "Adams",
        born: (1952, 3, 11),
        genre: "Science fiction",
        books: &[SeedBook {
            id: "e57b605f-8b3c-4089-b672-6ce9e6d6c23f",
            title: "The Hitchhiker's Guide to the Galaxy",
            description: "Arthur Dent escapes the demolition of Earth with a towel.",
        }],
    },
    SeedAuthor {
        id: "a1da1d8e-1988-4634-b538-a01709477b77",
        first_name: "Jens",
        last_name: "Lapidus",
        born: (1974, 5, 24),
        genre: "Thriller",
        books: &[SeedBook {
            id: "1325360c-8253-473a-a20f-55c269c20407",
            title: "Easy Money",
            description: "A student is drawn into the Stockholm cocaine trade.",
        }],
    },
];

/// The demo authors with their books
///
/// Ids are fixed so links in documentation stay valid between restarts.
pub fn seed_authors() -> Vec<Author> {
    SEED.iter()
        .filter_map(|seed| {
            let id = Uuid::parse_str(seed.id).ok()?;
            let (year, month, day) = seed.born;
            let date_of_birth = NaiveDate::from_ymd_opt(year, month, day)?;
            let books = seed
                .books
                .iter()
                .filter_map(|book| {
                    Some(Book {
                        id: Uuid::parse_str(book.id).ok()?,
                        author_id: id,
                        title: book.title.to_string(),
                        description: Some(book.description.to_string()),
                    })
                })
                .collect();

            Some(Author {
                id,
                first_name: seed.first_name.to_string(),
                last_name: seed.last_name.to_string(),
                date_of_birth,
                date_of_death: None,
                genre: seed.genre.to_string(),
                books,
            })
        })
        .collect()
}
