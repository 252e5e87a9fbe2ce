use crate::models::JobRun;
use sqlx::PgPool;

pub async fn start_run(pool: &PgPool, job_name: &str) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO job_runs (job_name, started_at, status)
        VALUES ($1, NOW(), 'running')
        RETURNING id
        "#,
    )
    .bind(job_name)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

pub async fn complete_run(
    pool: &PgPool,
    run_id: i64,
    items_processed: i32,
    items_failed: i32,
    duration_ms: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE job_runs
        SET completed_at = NOW(),
            status = 'success',
            items_processed = $2,
            items_failed = $3,
            duration_ms = $4
        WHERE id = $1
        "#,
    )
    .bind(run_id)
    .bind(items_processed)
    .bind(items_failed)
    .bind(duration_ms)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn fail_run(
    pool: &PgPool,
    run_id: i64,
    error_message: &str,
    duration_ms: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE job_runs
        SET completed_at = NOW(),
            status = 'failed',
            error_message = $2,
            duration_ms = $3
        WHERE id = $1
        "#,
    )
    .bind(run_id)
    .bind(error_message)
    .bind(duration_ms)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn fetch_recent(pool: &PgPool, limit: i64) -> Result<Vec<JobRun>, sqlx::Error> {
    sqlx::query_as::<_, JobRun>(
        r#"
        SELECT id, job_name, status, started_at, completed_at,
               items_processed, items_failed, duration_ms, error_message
        FROM job_runs
        ORDER BY started_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}
