mod common;

use common::{catalog, create_author, create_book, create_genre, id_of};
use libris::{prelude::*, seed};

#[tokio::test]
async fn created_genre_redirects_to_its_detail_page() {
    let catalog = catalog();

    let outcome = catalog
        .create_genre(&FormData::new().with("name", "Sci-Fi"))
        .await
        .unwrap();

    let id = id_of(&outcome);
    assert_eq!(outcome.path(), Some(format!("/genre/{id}").as_str()));

    let detail = catalog.genre_detail(&id).await.unwrap();
    assert_eq!(detail.genre.name, "Sci-Fi");
    assert!(detail.books.is_empty());
}

#[tokio::test]
async fn markup_is_stored_escaped() {
    let catalog = catalog();
    let author = create_author(&catalog, "Jim", "Jones").await;
    let book = create_book(&catalog, "<b>Bold</b> & Brave", &author, &[]).await;

    let detail = catalog.book_detail(&book).await.unwrap();

    assert_eq!(detail.book.title, "&lt;b&gt;Bold&lt;&#x2F;b&gt; &amp; Brave");
}

#[tokio::test]
async fn invalid_author_keeps_what_was_entered() {
    let catalog = catalog();
    let form = FormData::new()
        .with("first_name", "   ")
        .with("family_name", "Jo-nes")
        .with("date_of_birth", "not-a-date");

    let outcome = catalog.create_author(&form).await.unwrap();

    let SaveOutcome::Invalid { errors, form } = outcome else {
        panic!("expected Invalid");
    };
    let mut fields = errors.iter().map(|e| (e.field.as_str(), e.code.as_str())).collect::<Vec<_>>();
    fields.sort();
    assert_eq!(
        fields,
        [("date_of_birth", "date"), ("family_name", "alphanumeric"), ("first_name", "required")]
    );
    assert_eq!(form.text("family_name"), Some("Jo-nes"));
    assert_eq!(form.text("date_of_birth"), Some("not-a-date"));
    assert!(catalog.list_authors().await.unwrap().is_empty());
}

#[tokio::test]
async fn author_form_round_trips_dates() {
    let catalog = catalog();
    let form = FormData::new()
        .with("first_name", "Ursula")
        .with("family_name", "LeGuin")
        .with("date_of_birth", "1929-10-21");

    let id = id_of(&catalog.create_author(&form).await.unwrap());
    let view = catalog.author_form(&id).await.unwrap();

    assert_eq!(view.date_of_birth, "1929-10-21");
    assert_eq!(view.date_of_death, "");
    assert_eq!(view.lifespan, "");
    assert_eq!(view.path, format!("/author/{id}"));
}

#[tokio::test]
async fn copies_default_to_maintenance() {
    let catalog = catalog();
    let author = create_author(&catalog, "Ben", "Bova").await;
    let book = create_book(&catalog, "Mars", &author, &[]).await;
    let form = FormData::new()
        .with("book", book.as_str())
        .with("imprint", "Bantam, 1992")
        .with("due_back", "2024-03-07");

    let copy = id_of(&catalog.create_instance(&form).await.unwrap());
    let detail = catalog.instance_detail(&copy).await.unwrap();

    assert_eq!(detail.instance.status, "Maintenance");
    assert_eq!(detail.instance.due_back_formatted, "March 07, 2024");
    assert_eq!(detail.book.map(|b| b.title), Some("Mars".to_string()));
}

#[tokio::test]
async fn delete_preview_shows_blockers_or_nothing() {
    let catalog = catalog();
    let author = create_author(&catalog, "Ben", "Bova").await;
    create_book(&catalog, "Mars", &author, &[]).await;

    let preview = catalog.author_delete_preview(&author).await.unwrap().unwrap();
    assert_eq!(preview.owner.id, author);
    assert_eq!(preview.dependents[0].title, "Mars");

    let gone = catalog
        .author_delete_preview(&AuthorId::generate().to_string())
        .await
        .unwrap();
    assert_eq!(gone, None);
}

#[tokio::test]
async fn book_form_offers_every_author_and_genre() {
    let catalog = catalog();
    let author = create_author(&catalog, "Ben", "Bova").await;
    create_author(&catalog, "Isaac", "Asimov").await;
    let genre = create_genre(&catalog, "Science Fiction").await;
    let book = create_book(&catalog, "Mars", &author, &[&genre]).await;

    let form = catalog.book_form(&book).await.unwrap();

    assert_eq!(form.book.genre, vec![genre]);
    let authors = form.choices.authors.iter().map(|a| a.family_name.as_str()).collect::<Vec<_>>();
    assert_eq!(authors, ["Asimov", "Bova"]);
    assert_eq!(form.choices.genres.len(), 1);
}

#[tokio::test]
async fn seed_file_populates_sorted_lists() {
    let catalog = catalog();

    let report = seed::load_seed_file(&catalog, concat!(env!("CARGO_MANIFEST_DIR"), "/seed/catalog.json"))
        .await
        .unwrap();

    assert_eq!(
        report,
        seed::SeedReport { genres: 3, authors: 5, books: 4, instances: 4 }
    );

    let authors = catalog.list_authors().await.unwrap();
    let names = authors.iter().map(|a| a.family_name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["Asimov", "Billings", "Bova", "Jones", "Rothfuss"]);

    let genres = catalog.list_genres().await.unwrap();
    let names = genres.iter().map(|g| g.name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, ["Fantasy", "French Poetry", "Science Fiction"]);

    assert_eq!(catalog.list_instances().await.unwrap().len(), 4);

    let rothfuss = authors.iter().find(|a| a.family_name == "Rothfuss").unwrap();
    assert_eq!(catalog.author_detail(&rothfuss.id).await.unwrap().books.len(), 2);
}

#[tokio::test]
async fn seed_with_unknown_genre_fails() {
    let catalog = catalog();
    let data = serde_json::from_str(
        r#"{ "authors": [{ "first_name": "Ann", "family_name": "Leckie",
             "books": [{ "title": "Ancillary Justice", "summary": "Breq.", "genres": ["Space Opera"] }] }] }"#,
    )
    .unwrap();

    let err = seed::apply_seed(&catalog, data).await.unwrap_err();

    assert!(matches!(err, seed::SeedError::UnknownGenre { .. }));
}
