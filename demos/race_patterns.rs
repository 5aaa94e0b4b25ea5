//! Race Patterns Example
//!
//! Demonstrates how a status lookup plays out against two redundant backends:
//! - One path answers while the other is rate limited
//! - An explicit backend failure ends the race
//! - Both paths keep asking for more time until the deadline
//! - Several handlers sharing one worker pool
//! - The blocking front end

use std::time::Duration;

use status_race::testing::{Script, ScriptedClient};
use status_race::{
    ApplicationStatus, BackendPath, BackendResponse, BlockingHandler, Handler, HandlerConfig,
    PoolExhaustion, WorkerPool,
};

fn describe(outcome: &ApplicationStatus) {
    match outcome {
        ApplicationStatus::Success {
            application_id,
            application_status,
        } => println!("  -> {} is {}", application_id, application_status),
        ApplicationStatus::Failure {
            message,
            retry_count,
        } => println!(
            "  -> failed after {} retries ({})",
            retry_count,
            message.as_deref().unwrap_or("no message")
        ),
    }
}

// ==================== Rate Limited Path ====================

/// Example 1: the primary path keeps saying "retry later", the secondary
/// answers after a short while.
async fn example_rate_limited_path() {
    println!("\n=== Example 1: Rate Limited Path ===");

    let client = ScriptedClient::new(
        Script::new().respond(BackendResponse::retry_after(Duration::from_millis(200))),
        Script::new().respond_after(
            Duration::from_millis(50),
            BackendResponse::success("app-1", "APPROVED"),
        ),
    );
    let handler = Handler::new(client, HandlerConfig::new(4, Duration::from_secs(1)))
        .expect("valid config");

    describe(&handler.perform_operation("app-1").await);
    println!(
        "  primary calls: {}, secondary calls: {}",
        handler.client().calls(BackendPath::Primary),
        handler.client().calls(BackendPath::Secondary)
    );
}

// ==================== Unrecoverable Failure ====================

/// Example 2: the secondary path reports a hard failure after two retries.
/// The primary would have answered later, but the failure wins.
async fn example_unrecoverable_failure() {
    println!("\n=== Example 2: Unrecoverable Failure ===");

    let client = ScriptedClient::new(
        Script::new().respond_after(
            Duration::from_millis(500),
            BackendResponse::success("app-2", "APPROVED"),
        ),
        Script::new()
            .retry_times(2, Duration::from_millis(20))
            .respond(BackendResponse::Failure),
    );
    let handler = Handler::new(client, HandlerConfig::new(4, Duration::from_secs(1)))
        .expect("valid config");

    describe(&handler.perform_operation("app-2").await);
}

// ==================== Deadline ====================

/// Example 3: both paths keep asking for more time than the deadline allows.
async fn example_deadline() {
    println!("\n=== Example 3: Deadline ===");

    let client = ScriptedClient::new(
        Script::new().respond(BackendResponse::retry_after(Duration::from_secs(5))),
        Script::new().respond(BackendResponse::retry_after(Duration::from_secs(5))),
    );
    let handler = Handler::new(client, HandlerConfig::new(4, Duration::from_millis(300)))
        .expect("valid config");

    let start = std::time::Instant::now();
    let outcome = handler.perform_operation("app-3").await;
    describe(&outcome);
    println!("  returned after {:?}", start.elapsed());
}

// ==================== Shared Pool ====================

/// Example 4: two handlers share a two-slot pool. While the first operation's
/// slow loser still holds the slots, a rejecting handler fails fast.
async fn example_shared_pool() {
    println!("\n=== Example 4: Shared Pool ===");

    let pool = WorkerPool::new(2);
    let busy = Handler::with_pool(
        ScriptedClient::new(
            Script::new().respond_after(
                Duration::from_millis(10),
                BackendResponse::success("app-4", "APPROVED"),
            ),
            Script::new().respond_after(Duration::from_millis(400), BackendResponse::Failure),
        ),
        pool.clone(),
        Duration::from_secs(1),
    )
    .expect("valid pool");
    let strict = Handler::with_pool(
        ScriptedClient::new(Script::new(), Script::new()),
        pool.clone(),
        Duration::from_secs(1),
    )
    .expect("valid pool")
    .with_exhaustion(PoolExhaustion::Reject);

    describe(&busy.perform_operation("app-4").await);
    println!("  free slots: {}/{}", pool.available(), pool.size());
    describe(&strict.perform_operation("app-5").await);
}

// ==================== Blocking Front End ====================

/// Example 5: the same race from synchronous code.
fn example_blocking() {
    println!("\n=== Example 5: Blocking Front End ===");

    let client = ScriptedClient::new(
        Script::new()
            .retry_times(3, Duration::from_millis(10))
            .respond(BackendResponse::success("app-6", "IN_REVIEW")),
        Script::new().respond(BackendResponse::retry_after(Duration::from_millis(100))),
    );
    let handler = BlockingHandler::new(client, HandlerConfig::new(2, Duration::from_secs(1)))
        .expect("valid config");

    describe(&handler.perform_operation("app-6"));
    handler.shutdown(Duration::from_millis(200));
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("======================================");
    println!("        Race Patterns Example         ");
    println!("======================================");

    example_rate_limited_path().await;
    example_unrecoverable_failure().await;
    example_deadline().await;
    example_shared_pool().await;

    // BlockingHandler owns its own runtime and must not run inside this one.
    std::thread::spawn(example_blocking)
        .join()
        .expect("blocking example panicked");

    println!("\n======================================");
    println!("           Examples Complete           ");
    println!("======================================");
}
