//! End-to-end checks of what survives when catalog rows are deleted

use chrono::NaiveDate;
use core_catalog::db::create_test_pool;
use core_catalog::models::{Author, Book, BookInstance, Genre, Language, LoanStatus, User};
use core_catalog::repositories::{
    AuthorRepository, BookInstanceRepository, BookRepository, GenreRepository,
    LanguageRepository, PageRequest, SqliteAuthorRepository, SqliteBookInstanceRepository,
    SqliteBookRepository, SqliteGenreRepository, SqliteLanguageRepository,
    SqliteUserRepository, UserRepository,
};
use core_catalog::schema::{dependents_of, DeletePolicy};

struct Catalog {
    genres: SqliteGenreRepository,
    languages: SqliteLanguageRepository,
    authors: SqliteAuthorRepository,
    books: SqliteBookRepository,
    copies: SqliteBookInstanceRepository,
    users: SqliteUserRepository,
}

async fn catalog() -> Catalog {
    let pool = create_test_pool().await.unwrap();
    Catalog {
        genres: SqliteGenreRepository::new(pool.clone()),
        languages: SqliteLanguageRepository::new(pool.clone()),
        authors: SqliteAuthorRepository::new(pool.clone()),
        books: SqliteBookRepository::new(pool.clone()),
        copies: SqliteBookInstanceRepository::new(pool.clone()),
        users: SqliteUserRepository::new(pool),
    }
}

#[tokio::test]
async fn deleting_an_author_removes_books_but_keeps_copies() {
    let c = catalog().await;

    let author = Author::new("Iain", "Banks");
    c.authors.insert(&author).await.unwrap();

    let player = Book::new("The Player of Games", &author.id, "9780316005401");
    let excession = Book::new("Excession", &author.id, "9780553575378");
    c.books.insert(&player).await.unwrap();
    c.books.insert(&excession).await.unwrap();

    let sf = Genre::new("Science Fiction");
    c.genres.insert(&sf).await.unwrap();
    c.books
        .set_genres(&player.id, &[sf.id.clone()])
        .await
        .unwrap();

    let mut copy = BookInstance::new(Some(player.id.clone()), "Orbit, 1988");
    copy.status = LoanStatus::Available;
    c.copies.insert(&copy).await.unwrap();

    assert_eq!(c.authors.find_books(&author.id).await.unwrap().len(), 2);
    assert!(c.authors.delete(&author.id).await.unwrap());

    assert_eq!(c.books.count().await.unwrap(), 0);
    // The genre itself is untouched; only its link went with the book
    assert!(c.genres.find_by_id(&sf.id).await.unwrap().is_some());

    let orphan = c.copies.find_detail(copy.id()).await.unwrap().unwrap();
    assert_eq!(orphan.instance.book_id, None);
    assert_eq!(orphan.instance.status, LoanStatus::Available);
    assert_eq!(orphan.to_string(), format!("{} (no book)", copy.id()));
}

#[tokio::test]
async fn deleting_a_language_clears_books_and_copies() {
    let c = catalog().await;

    let author = Author::new("Stanislaw", "Lem");
    c.authors.insert(&author).await.unwrap();

    let polish = Language::new("Polish");
    c.languages.insert(&polish).await.unwrap();

    let mut book = Book::new("Solaris", &author.id, "9780156027601");
    book.language_id = Some(polish.id.clone());
    c.books.insert(&book).await.unwrap();

    let mut copy = BookInstance::new(Some(book.id.clone()), "MON, 1961");
    copy.language_id = Some(polish.id.clone());
    c.copies.insert(&copy).await.unwrap();

    assert!(c.languages.delete(&polish.id).await.unwrap());

    let book = c.books.find_by_id(&book.id).await.unwrap().unwrap();
    assert_eq!(book.language_id, None);

    let copy = c.copies.find_by_id(copy.id()).await.unwrap().unwrap();
    assert_eq!(copy.language_id, None);
    assert_eq!(copy.book_id, Some(book.id));
}

#[tokio::test]
async fn deleting_a_borrower_keeps_the_loan_record() {
    let c = catalog().await;

    let author = Author::new("Ted", "Chiang");
    c.authors.insert(&author).await.unwrap();
    let book = Book::new("Exhalation", &author.id, "9781101947883");
    c.books.insert(&book).await.unwrap();

    let member = User::new("member@library.example");
    c.users.insert(&member).await.unwrap();

    let due = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
    let mut copy = BookInstance::new(Some(book.id.clone()), "Knopf, 2019");
    copy.status = LoanStatus::OnLoan;
    copy.due_back = Some(due);
    copy.borrower_id = Some(member.id.clone());
    c.copies.insert(&copy).await.unwrap();

    assert!(c.users.delete(&member.id).await.unwrap());

    let on_loan = c.copies.list_on_loan(PageRequest::default()).await.unwrap();
    assert_eq!(on_loan.total, 1);
    let kept = &on_loan.items[0].instance;
    assert_eq!(kept.borrower_id, None);
    assert_eq!(kept.due_back, Some(due));

    let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
    assert!(kept.is_overdue(today));
    assert_eq!(c.copies.find_overdue(today).await.unwrap().len(), 1);
}

#[test]
fn declared_policies_match_the_catalog_rules() {
    let book_dependents: Vec<_> = dependents_of("books")
        .map(|r| (r.table, r.column, r.on_delete))
        .collect();
    assert!(book_dependents.contains(&("book_instances", "book_id", DeletePolicy::SetNull)));

    let author_dependents: Vec<_> = dependents_of("authors")
        .map(|r| (r.table, r.on_delete))
        .collect();
    assert_eq!(author_dependents, vec![("books", DeletePolicy::Cascade)]);

    assert!(dependents_of("languages").all(|r| r.on_delete == DeletePolicy::SetNull));
}
