//! Command execution tests against in-memory and JSON stores

use clap::Parser;
use kakeibo_cli::{execute, Cli};
use kakeibo_common::store::{JsonFileStore, MemoryStore};
use kakeibo_common::Store;
use tempfile::TempDir;

/// Test helper: parse and run one command line
async fn run(store: &dyn Store, args: &[&str]) -> anyhow::Result<String> {
    let argv = std::iter::once("kakeibo-cli").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv).expect("arguments should parse");
    execute(cli.command, store, "memo text").await
}

async fn seed(store: &dyn Store) {
    run(store, &["ingredient", "add", "キャベツ", "--price", "200", "--quantity", "1", "--unit", "個"])
        .await
        .unwrap();
    run(store, &["ingredient", "add", "たまねぎ", "--price", "100", "--quantity", "1", "--unit", "個"])
        .await
        .unwrap();
    run(store, &["ingredient", "add", "醤油", "--price", "300", "--quantity", "500", "--unit", "ml"])
        .await
        .unwrap();
    run(
        store,
        &[
            "recipe", "add", "野菜炒め", "--servings", "2",
            "--item", "キャベツ=1", "--item", "たまねぎ=2", "--item", "醤油=15",
        ],
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn test_cost_report() {
    let store = MemoryStore::new();
    seed(&store).await;

    let report = run(&store, &["cost", "野菜炒め"]).await.unwrap();
    assert!(report.contains("醤油: 15ml × 0.60 = 9.00"), "{report}");
    assert!(report.contains("Total: 409 (409.00)"), "{report}");
    assert!(report.contains("Per serving: 205 (204.50)"), "{report}");
    assert!(!report.contains("Warning"));
}

#[tokio::test]
async fn test_add_and_update_messages() {
    let store = MemoryStore::new();
    let out = run(&store, &["ingredient", "add", "Egg", "--price", "250", "--quantity", "10", "--unit", "piece"])
        .await
        .unwrap();
    assert_eq!(out, "Registered ingredient 'Egg'");

    let out = run(&store, &["ingredient", "add", "Egg", "--price", "260", "--quantity", "10", "--unit", "piece"])
        .await
        .unwrap();
    assert_eq!(out, "Updated ingredient 'Egg'");
}

#[tokio::test]
async fn test_remove_ingredient_in_use_fails() {
    let store = MemoryStore::new();
    seed(&store).await;

    let err = run(&store, &["ingredient", "remove", "たまねぎ"]).await.unwrap_err();
    assert!(err.to_string().contains("野菜炒め"), "{err}");
    assert!(store.get_ingredient("たまねぎ").await.unwrap().is_some());
}

#[tokio::test]
async fn test_recipe_with_unknown_ingredient_rejected() {
    let store = MemoryStore::new();
    let err = run(&store, &["recipe", "add", "Toast", "--servings", "1", "--item", "Bread=1"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("Bread"));
    assert!(store.list_recipes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_lists_in_reading_order() {
    let store = MemoryStore::new();
    seed(&store).await;

    let out = run(&store, &["ingredient", "list"]).await.unwrap();
    let names: Vec<&str> = out.lines().map(|l| l.split(':').next().unwrap()).collect();
    // きゃべつ < しょうゆ < たまねぎ
    assert_eq!(names, vec!["キャベツ", "醤油", "たまねぎ"]);

    let out = run(&store, &["recipe", "list"]).await.unwrap();
    assert_eq!(out, "野菜炒め (total 409 / 2 serving(s))");
}

#[tokio::test]
async fn test_memo_command() {
    let store = MemoryStore::new();
    assert_eq!(run(&store, &["memo"]).await.unwrap(), "memo text");
}

#[tokio::test]
async fn test_json_backend_persists_between_runs() {
    let temp_dir = TempDir::new().unwrap();
    {
        let store = JsonFileStore::open(temp_dir.path()).await.unwrap();
        seed(&store).await;
    }

    let store = JsonFileStore::open(temp_dir.path()).await.unwrap();
    let out = run(&store, &["recipe", "show", "野菜炒め"]).await.unwrap();
    assert!(out.starts_with("野菜炒め (2 serving(s))"));
    assert!(out.contains("  - 醤油: 15ml"));
}
