use axum::{
    routing::{get, post},
    Router,
};
use lambda_http::{run, Error};
use lms::catalog::controller::{add_item, find_item_by_id, item_stats, query_items, remove_item, restore_item, update_item};
use lms::core::controller::AppState;
use lms::core::repository::RepositoryStore;
use lms::utils::logs::setup_tracing;

// See https://docs.aws.amazon.com/lambda/latest/dg/lambda-rust.html
// https://docs.aws.amazon.com/lambda/latest/dg/images-test.html
// https://docs.aws.amazon.com/lambda/latest/dg/rust-http-events.html

const DEV_MODE: bool = true;

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();

    let state = if DEV_MODE {
        std::env::set_var("AWS_LAMBDA_FUNCTION_NAME", "_");
        std::env::set_var("AWS_LAMBDA_FUNCTION_MEMORY_SIZE", "4096");
        std::env::set_var("AWS_LAMBDA_FUNCTION_VERSION", "1");
        std::env::set_var("AWS_LAMBDA_RUNTIME_API", "http://[::]:9000/.rt");
        AppState::new("dev", RepositoryStore::LocalDynamoDB).await
    } else {
        AppState::new("prod", RepositoryStore::DynamoDB).await
    };

    let app = Router::new()
        .route("/catalog", post(add_item).get(query_items))
        .route("/catalog/:id",
               get(find_item_by_id).put(update_item).delete(remove_item))
        .route("/catalog/:id/restore", post(restore_item))
        .route("/catalog-stats", get(item_stats))
        .with_state(state);

    run(app).await
}
