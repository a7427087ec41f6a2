use axum::{
    routing::{get, post},
    Router,
};
use lambda_http::{run, Error};
use lms::core::controller::AppState;
use lms::core::repository::RepositoryStore;
use lms::reservations::controller::{cancel_reservation, complete_reservation, expire_lapsed, find_reservation_by_id,
                                    list_reservations, notify_ready, reserve};
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
        .route("/reservations", post(reserve).get(list_reservations))
        .route("/reservations/:id",
               get(find_reservation_by_id).delete(cancel_reservation))
        .route("/reservations/:id/complete", post(complete_reservation))
        .route("/reservation-tasks/notify", post(notify_ready))
        .route("/reservation-tasks/expire", post(expire_lapsed))
        .with_state(state);

    run(app).await
}
