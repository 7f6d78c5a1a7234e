use serde_json::json;

use super::*;
use crate::test_support::{Harness, article_json, paginated};

fn store(h: &Harness) -> ArticlesStore {
    ArticlesStore::new(ArticlesApi::new(h.http.clone()))
}

async fn seeded(h: &Harness, ids: &[i64]) -> ArticlesStore {
    let items: Vec<_> = ids.iter().map(|id| article_json(*id, &format!("A{id}"))).collect();
    h.transport.respond(200, paginated(json!(items), ids.len() as u64));
    let mut store = store(h);
    store.fetch_articles(&ArticleListParams::default()).await.unwrap();
    store
}

#[tokio::test]
async fn fetch_replaces_list_and_pagination() {
    let h = Harness::new();
    let mut store = seeded(&h, &[1, 2]).await;
    assert_eq!(store.articles.len(), 2);
    assert_eq!(store.pagination.total, 2);

    h.transport.respond(200, paginated(json!([article_json(9, "Nine")]), 1));
    store.fetch_articles(&ArticleListParams::default()).await.unwrap();

    assert_eq!(store.articles.iter().map(|a| a.id).collect::<Vec<_>>(), vec![9]);
    assert!(!store.loading);
}

#[tokio::test]
async fn failed_fetch_keeps_cache_and_clears_loading() {
    let h = Harness::new();
    let mut store = seeded(&h, &[1]).await;
    h.transport.fail_network();

    assert!(store.fetch_articles(&ArticleListParams::default()).await.is_err());

    assert_eq!(store.articles.len(), 1);
    assert!(!store.loading);
}

#[tokio::test]
async fn create_prepends() {
    let h = Harness::logged_in();
    let mut store = seeded(&h, &[1, 2]).await;
    h.transport.ok(json!({ "article": article_json(7, "Seven") }));

    let data = CreateArticleRequest { title: "Seven".into(), content: "Body text long enough.".into(), ..CreateArticleRequest::default() };
    store.create_article(&data).await.unwrap();

    assert_eq!(store.articles[0].id, 7);
    assert_eq!(store.articles.len(), 3);
}

#[tokio::test]
async fn like_changes_only_likes() {
    let h = Harness::logged_in();
    let mut store = seeded(&h, &[7, 8]).await;
    h.transport.ok(json!({ "article": article_json(7, "A7") }));
    store.fetch_article(7).await.unwrap();
    let before = store.articles[0].clone();
    let other = store.articles[1].clone();
    h.transport.ok(json!({ "liked": true, "likes_count": 42 }));

    store.like_article(7).await.unwrap();

    let after = &store.articles[0];
    assert_eq!(after.likes, 42);
    assert_eq!(Article { likes: before.likes, ..after.clone() }, before);
    assert_eq!(store.articles[1], other);
    assert_eq!(store.current.as_ref().unwrap().likes, 42);
}

#[tokio::test]
async fn like_accepts_count_only_payload() {
    let h = Harness::logged_in();
    let mut store = seeded(&h, &[7]).await;
    h.transport.ok(json!({ "likes_count": 42 }));

    let result = store.like_article(7).await.unwrap();

    assert_eq!(result.likes_count, 42);
    assert!(!result.liked);
    assert_eq!(store.articles[0].likes, 42);
}

#[tokio::test]
async fn like_accepts_legacy_likes_field() {
    let h = Harness::logged_in();
    let mut store = seeded(&h, &[7]).await;
    h.transport.ok(json!({ "likes": 3 }));

    store.like_article(7).await.unwrap();

    assert_eq!(store.articles[0].likes, 3);
}

#[tokio::test]
async fn update_replaces_in_place_and_current() {
    let h = Harness::logged_in();
    let mut store = seeded(&h, &[1, 2, 3]).await;
    h.transport.ok(json!({ "article": article_json(2, "A2") }));
    store.fetch_article(2).await.unwrap();
    h.transport.ok(json!({ "article": article_json(2, "Renamed") }));

    let patch = ArticlePatch { title: Some("Renamed".into()), ..ArticlePatch::default() };
    store.update_article(2, &patch).await.unwrap();

    assert_eq!(store.articles[1].title, "Renamed");
    assert_eq!(store.current.as_ref().unwrap().title, "Renamed");
}

#[tokio::test]
async fn update_of_uncached_article_leaves_list_alone() {
    let h = Harness::logged_in();
    let mut store = seeded(&h, &[1]).await;
    h.transport.ok(json!({ "article": article_json(5, "Five") }));

    store.update_article(5, &ArticlePatch::default()).await.unwrap();

    assert_eq!(store.articles.len(), 1);
    assert_eq!(store.articles[0].id, 1);
}

#[tokio::test]
async fn delete_splices_and_clears_current() {
    let h = Harness::logged_in();
    let mut store = seeded(&h, &[1, 2]).await;
    h.transport.ok(json!({ "article": article_json(2, "A2") }));
    store.fetch_article(2).await.unwrap();
    h.transport.ok(json!(null));

    store.delete_article(2).await.unwrap();

    assert_eq!(store.articles.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1]);
    assert!(store.current.is_none());
}

#[tokio::test]
async fn published_and_draft_filters() {
    let h = Harness::new();
    let mut draft = article_json(2, "Draft");
    draft["is_published"] = json!(false);
    h.transport.respond(200, paginated(json!([article_json(1, "Live"), draft]), 2));
    let mut store = store(&h);
    store.fetch_articles(&ArticleListParams::default()).await.unwrap();

    assert_eq!(store.published_articles().map(|a| a.id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(store.draft_articles().map(|a| a.id).collect::<Vec<_>>(), vec![2]);

    store.clear_current_article();
    assert!(store.current.is_none());
}

#[tokio::test]
async fn search_replaces_list() {
    let h = Harness::new();
    let mut store = seeded(&h, &[1, 2]).await;
    h.transport.respond(200, paginated(json!([article_json(3, "Match")]), 1));

    store.search_articles("match", PageParams::default()).await.unwrap();

    assert_eq!(store.articles.len(), 1);
    assert_eq!(h.transport.last_request().query[0], ("q".to_owned(), "match".to_owned()));
}
