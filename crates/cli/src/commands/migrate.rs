use crate::commands::{open_database, run_async, CommandFailure, CommandResult};

pub fn run() -> CommandResult {
    run_async("migrate", |config| async move {
        let pool = open_database(&config).await?;
        pool.close().await;
        Ok::<_, CommandFailure>(CommandResult::success("migrate", "applied pending migrations"))
    })
}
