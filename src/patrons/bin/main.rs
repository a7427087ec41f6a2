use axum::{
    routing::{get, post},
    Router,
};
use lambda_http::{run, Error};
use lms::core::controller::AppState;
use lms::core::repository::RepositoryStore;
use lms::patrons::controller::{add_patron, change_membership, find_patron_by_id, patron_report, patron_stats, remove_patron,
                               update_patron};
use lms::utils::logs::setup_tracing;

// See https://docs.aws.amazon.com/lambda/latest/dg/lambda-rust.html
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
        .route("/patrons", post(add_patron))
        .route("/patrons/:id",
               get(find_patron_by_id).put(update_patron).delete(remove_patron))
        .route("/patrons/:id/membership", post(change_membership))
        .route("/patron-reports/:report", get(patron_report))
        .route("/patron-stats/:stats", get(patron_stats))
        .with_state(state);

    run(app).await
}
