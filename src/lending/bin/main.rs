use axum::{
    routing::{get, post, put},
    Router,
};
use lambda_http::{run, Error};
use lms::core::controller::AppState;
use lms::core::repository::RepositoryStore;
use lms::lending::controller::{borrow, borrowed_stats, delete_borrow, delete_return, extend, find_ticket_by_id, query_tickets,
                               return_items, update_borrow, update_return};
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
        .route("/tickets", post(borrow).get(query_tickets))
        .route("/tickets/:id",
               get(find_ticket_by_id).put(update_borrow).delete(delete_borrow))
        .route("/tickets/:id/extend", post(extend))
        .route("/tickets/:id/returns", post(return_items))
        .route("/returns/:id", put(update_return).delete(delete_return))
        .route("/lending-stats/borrowed-items", get(borrowed_stats))
        .with_state(state);

    run(app).await
}
