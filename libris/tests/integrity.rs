mod common;

use common::{catalog, create_author, create_book, create_genre, create_instance};
use libris::{
    model::{Author, AuthorFields},
    prelude::*,
    resolver::Dependents,
};

#[tokio::test]
async fn delete_author_without_books_removes_it() {
    let catalog = catalog();
    let id = create_author(&catalog, "Jim", "Jones").await;

    let outcome = catalog.delete_author(&id).await.unwrap();

    assert_eq!(outcome, DeleteOutcome::Deleted { path: "/authors".to_string() });
    let found = catalog
        .store()
        .typed_collection::<Author>()
        .find_by_id(AuthorId::parse(&id).unwrap())
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn delete_author_with_books_is_blocked_and_untouched() {
    let catalog = catalog();
    let author = create_author(&catalog, "Ben", "Bova").await;
    create_book(&catalog, "Apes and Angels", &author, &[]).await;
    create_book(&catalog, "Mars", &author, &[]).await;

    let outcome = catalog.delete_author(&author).await.unwrap();

    match outcome {
        DeleteOutcome::Blocked { dependents } => {
            let mut titles = dependents.iter().map(|b| b.title.as_str()).collect::<Vec<_>>();
            titles.sort();
            assert_eq!(titles, ["Apes and Angels", "Mars"]);
        }
        other => panic!("expected Blocked, got {other:?}"),
    }

    let Dependents { owner, dependents } = catalog
        .resolver()
        .author_dependents(AuthorId::parse(&author).unwrap())
        .await
        .unwrap();
    assert!(owner.is_some());
    assert_eq!(dependents.len(), 2);
}

#[tokio::test]
async fn delete_unknown_author_is_a_no_op_success() {
    let catalog = catalog();
    create_author(&catalog, "Bob", "Billings").await;

    let deletion = catalog.mutator().delete_author(AuthorId::generate()).await.unwrap();

    assert_eq!(deletion, Deletion::Deleted);
    assert_eq!(catalog.list_authors().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_unknown_author_is_not_found() {
    let catalog = catalog();
    let fields = AuthorFields {
        first_name: "Ann".to_string(),
        family_name: "Leckie".to_string(),
        date_of_birth: None,
        date_of_death: None,
    };

    let err = catalog
        .mutator()
        .update_author(AuthorId::generate(), fields)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn update_author_replaces_dates_and_recomputes_lifespan() {
    let catalog = catalog();
    let id = create_author(&catalog, "Isaac", "Asimov").await;

    let form = FormData::new()
        .with("first_name", "Isaac")
        .with("family_name", "Asimov")
        .with("date_of_birth", "1920-01-02")
        .with("date_of_death", "1992-04-06");
    catalog.update_author(&id, &form).await.unwrap();

    let view = catalog.author_form(&id).await.unwrap();
    assert_eq!(view.id, id);
    assert_eq!(view.name, "Asimov, Isaac");
    assert_eq!(view.date_of_birth, "1920-01-02");
    assert_eq!(view.date_of_death, "1992-04-06");
    assert_eq!(view.lifespan, "72");
}

#[tokio::test]
async fn book_with_unknown_author_is_invalid_on_author() {
    let catalog = catalog();
    let form = FormData::new()
        .with("title", "Orphan")
        .with("summary", "Nobody wrote this.")
        .with("author", AuthorId::generate().to_string());

    let outcome = catalog.create_book(&form).await.unwrap();

    match outcome {
        SaveOutcome::Invalid { errors, form } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "author");
            assert_eq!(form.text("title"), Some("Orphan"));
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
    assert!(catalog.list_books().await.unwrap().is_empty());
}

#[tokio::test]
async fn book_with_unknown_genre_is_invalid_on_genre() {
    let catalog = catalog();
    let author = create_author(&catalog, "Ann", "Leckie").await;
    let known = create_genre(&catalog, "Space Opera").await;
    let form = FormData::new()
        .with("title", "Ancillary Justice")
        .with("summary", "Breq.")
        .with("author", author.as_str())
        .with("genre", known.as_str())
        .with("genre", GenreId::generate().to_string());

    let outcome = catalog.create_book(&form).await.unwrap();

    match outcome {
        SaveOutcome::Invalid { errors, .. } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "genre");
        }
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[tokio::test]
async fn genre_with_books_cannot_be_deleted() {
    let catalog = catalog();
    let author = create_author(&catalog, "Patrick", "Rothfuss").await;
    let fantasy = create_genre(&catalog, "Fantasy").await;
    create_book(&catalog, "The Name of the Wind", &author, &[&fantasy]).await;

    match catalog.delete_genre(&fantasy).await.unwrap() {
        DeleteOutcome::Blocked { dependents } => assert_eq!(dependents[0].title, "The Name of the Wind"),
        other => panic!("expected Blocked, got {other:?}"),
    }
    assert!(catalog.genre_detail(&fantasy).await.is_ok());

    let unused = create_genre(&catalog, "Poetry").await;
    assert_eq!(
        catalog.delete_genre(&unused).await.unwrap(),
        DeleteOutcome::Deleted { path: "/genres".to_string() }
    );
}

#[tokio::test]
async fn book_with_copies_cannot_be_deleted_until_copies_are_gone() {
    let catalog = catalog();
    let author = create_author(&catalog, "Patrick", "Rothfuss").await;
    let book = create_book(&catalog, "The Wise Man's Fear", &author, &[]).await;
    let copy = create_instance(&catalog, &book, "Gollancz, 2011.").await;

    assert!(matches!(
        catalog.delete_book(&book).await.unwrap(),
        DeleteOutcome::Blocked { .. }
    ));

    catalog.delete_instance(&copy).await.unwrap();
    // Deleting a copy twice is fine.
    catalog.delete_instance(&copy).await.unwrap();

    assert_eq!(
        catalog.delete_book(&book).await.unwrap(),
        DeleteOutcome::Deleted { path: "/books".to_string() }
    );
}

#[tokio::test]
async fn instance_for_unknown_book_is_invalid_on_book() {
    let catalog = catalog();
    let form = FormData::new()
        .with("book", BookId::generate().to_string())
        .with("imprint", "Nowhere Press");

    match catalog.create_instance(&form).await.unwrap() {
        SaveOutcome::Invalid { errors, .. } => assert_eq!(errors[0].field, "book"),
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_genre_name_points_at_existing_genre() {
    let catalog = catalog();
    let first = create_genre(&catalog, "Sci-Fi").await;
    let second = create_genre(&catalog, "Sci-Fi").await;

    assert_eq!(first, second);
    assert_eq!(catalog.list_genres().await.unwrap().len(), 1);
}

#[tokio::test]
async fn update_unknown_book_is_not_found_before_reference_checks() {
    let catalog = catalog();
    let form = FormData::new()
        .with("title", "Nowhere")
        .with("summary", "Never written.")
        .with("author", AuthorId::generate().to_string());

    let err = catalog
        .update_book(&BookId::generate().to_string(), &form)
        .await
        .unwrap_err();

    assert!(matches!(&err, CatalogError::NotFound { entity, .. } if entity == "books"));
}

#[tokio::test]
async fn update_unknown_copy_is_not_found_before_reference_checks() {
    let catalog = catalog();
    let form = FormData::new()
        .with("book", BookId::generate().to_string())
        .with("imprint", "Nowhere Press");

    let err = catalog
        .update_instance(&BookInstanceId::generate().to_string(), &form)
        .await
        .unwrap_err();

    assert!(matches!(&err, CatalogError::NotFound { entity, .. } if entity == "bookinstances"));
}

#[tokio::test]
async fn update_existing_book_still_checks_references() {
    let catalog = catalog();
    let author = create_author(&catalog, "Ben", "Bova").await;
    let book = create_book(&catalog, "Mars", &author, &[]).await;
    let form = FormData::new()
        .with("title", "Mars")
        .with("summary", "Red planet.")
        .with("author", AuthorId::generate().to_string());

    match catalog.update_book(&book, &form).await.unwrap() {
        SaveOutcome::Invalid { errors, .. } => assert_eq!(errors[0].field, "author"),
        other => panic!("expected Invalid, got {other:?}"),
    }
}

#[tokio::test]
async fn repeated_genre_is_stored_once() {
    let catalog = catalog();
    let author = create_author(&catalog, "Patrick", "Rothfuss").await;
    let fantasy = create_genre(&catalog, "Fantasy").await;
    let book = create_book(&catalog, "The Name of the Wind", &author, &[&fantasy, &fantasy]).await;

    let stored = catalog
        .store()
        .typed_collection::<Book>()
        .find_by_id(BookId::parse(&book).unwrap())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.genre.len(), 1);

    let detail = catalog.book_detail(&book).await.unwrap();
    assert_eq!(detail.genres.len(), 1);
    assert_eq!(detail.genres[0].id, fantasy);
}
