//! Deletes of unrelated rows issued at the same time must all succeed

use core_catalog::db::{create_pool, create_test_pool, DatabaseConfig};
use core_catalog::models::{Author, Book, BookInstance, Genre};
use core_catalog::repositories::{
    AuthorRepository, BookInstanceRepository, BookRepository, GenreRepository,
    SqliteAuthorRepository, SqliteBookInstanceRepository, SqliteBookRepository,
    SqliteGenreRepository,
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

const WRITERS: usize = 20;

struct TempDatabase {
    dir: PathBuf,
}

impl TempDatabase {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("catalog-concurrency-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.join("library.db")
    }
}

impl Drop for TempDatabase {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

async fn file_pool(db: &TempDatabase) -> SqlitePool {
    create_pool(DatabaseConfig::new(db.path()).max_connections(8))
        .await
        .unwrap()
}

/// One author per writer, each with a book and a copy of it
async fn seed_authors(pool: &SqlitePool) -> Vec<(String, String, String)> {
    let authors = SqliteAuthorRepository::new(pool.clone());
    let books = SqliteBookRepository::new(pool.clone());
    let copies = SqliteBookInstanceRepository::new(pool.clone());

    let mut seeded = Vec::with_capacity(WRITERS);
    for n in 0..WRITERS {
        let author = Author::new(format!("First{n}"), format!("Last{n}"));
        authors.insert(&author).await.unwrap();

        let book = Book::new(format!("Title {n}"), &author.id, format!("{n:013}"));
        books.insert(&book).await.unwrap();

        let copy = BookInstance::new(Some(book.id.clone()), "First edition");
        copies.insert(&copy).await.unwrap();

        seeded.push((author.id, book.id, copy.id().to_string()));
    }
    seeded
}

async fn delete_authors_concurrently(pool: &SqlitePool) {
    let seeded = seed_authors(pool).await;
    let authors = Arc::new(SqliteAuthorRepository::new(pool.clone()));

    let handles: Vec<_> = seeded
        .iter()
        .map(|(author_id, _, _)| {
            let authors = Arc::clone(&authors);
            let author_id = author_id.clone();
            tokio::spawn(async move { authors.delete(&author_id).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().unwrap(), "every author is deleted");
    }

    assert_eq!(authors.count().await.unwrap(), 0);
    let books = SqliteBookRepository::new(pool.clone());
    assert_eq!(books.count().await.unwrap(), 0);

    // Copies survive with their book cleared
    let copies = SqliteBookInstanceRepository::new(pool.clone());
    assert_eq!(copies.count().await.unwrap(), WRITERS as i64);
    for (_, _, copy_id) in &seeded {
        let copy = copies.find_by_id(copy_id).await.unwrap().unwrap();
        assert_eq!(copy.book_id, None);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_author_deletes_on_file_database() {
    let db = TempDatabase::new();
    let pool = file_pool(&db).await;

    delete_authors_concurrently(&pool).await;
    pool.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_author_deletes_on_in_memory_database() {
    let pool = create_test_pool().await.unwrap();
    delete_authors_concurrently(&pool).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_book_deletes_and_genre_updates() {
    let db = TempDatabase::new();
    let pool = file_pool(&db).await;
    let seeded = seed_authors(&pool).await;

    let genre = Genre::new("Essay");
    SqliteGenreRepository::new(pool.clone())
        .insert(&genre)
        .await
        .unwrap();

    let books = Arc::new(SqliteBookRepository::new(pool.clone()));
    let (to_delete, to_tag) = seeded.split_at(WRITERS / 2);

    let mut handles = Vec::new();
    for (_, book_id, _) in to_delete {
        let books = Arc::clone(&books);
        let book_id = book_id.clone();
        handles.push(tokio::spawn(async move {
            books.delete(&book_id).await.map(|deleted| assert!(deleted))
        }));
    }
    for (_, book_id, _) in to_tag {
        let books = Arc::clone(&books);
        let book_id = book_id.clone();
        let genre_ids = vec![genre.id.clone()];
        handles.push(tokio::spawn(async move {
            books.set_genres(&book_id, &genre_ids).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(books.count().await.unwrap(), (WRITERS - WRITERS / 2) as i64);
    for (_, book_id, _) in to_tag {
        assert_eq!(books.genre_names(book_id).await.unwrap(), vec!["Essay"]);
    }

    let copies = SqliteBookInstanceRepository::new(pool.clone());
    for (_, _, copy_id) in to_delete {
        let copy = copies.find_by_id(copy_id).await.unwrap().unwrap();
        assert_eq!(copy.book_id, None);
    }

    pool.close().await;
}
