//! Evaluation subsystem queries.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::error::DbResult;
use crate::models::{EvalCriteriaRecord, EvalRunRecord, EvalRunStatus, EvalTaskRecord};

// ============================================================================
// Task definitions
// ============================================================================

/// Create a new evaluation task definition, returning the assigned id.
pub async fn create_eval_task(pool: &SqlitePool, task: &EvalTaskRecord) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO eval_tasks (created_at, updated_at, user_id, version, name, description, config)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(task.created_at)
    .bind(task.updated_at)
    .bind(&task.user_id)
    .bind(&task.version)
    .bind(&task.name)
    .bind(&task.description)
    .bind(&task.config)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get a task definition by id.
pub async fn get_eval_task(pool: &SqlitePool, id: i64) -> DbResult<Option<EvalTaskRecord>> {
    let task = sqlx::query_as::<_, EvalTaskRecord>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, name, description, config
        FROM eval_tasks WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(task)
}

/// List all task definitions.
pub async fn list_eval_tasks(pool: &SqlitePool) -> DbResult<Vec<EvalTaskRecord>> {
    let tasks = sqlx::query_as::<_, EvalTaskRecord>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, name, description, config
        FROM eval_tasks ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(tasks)
}

/// Delete a task definition. Runs that reference it are detached
/// (`task_id` set to NULL), not deleted.
pub async fn delete_eval_task(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM eval_tasks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Criteria definitions
// ============================================================================

/// Create a new scoring criterion definition, returning the assigned id.
pub async fn create_eval_criteria(
    pool: &SqlitePool,
    criteria: &EvalCriteriaRecord,
) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO eval_criteria (created_at, updated_at, user_id, version, name, description, config)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(criteria.created_at)
    .bind(criteria.updated_at)
    .bind(&criteria.user_id)
    .bind(&criteria.version)
    .bind(&criteria.name)
    .bind(&criteria.description)
    .bind(&criteria.config)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get a criterion definition by id.
pub async fn get_eval_criteria(
    pool: &SqlitePool,
    id: i64,
) -> DbResult<Option<EvalCriteriaRecord>> {
    let criteria = sqlx::query_as::<_, EvalCriteriaRecord>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, name, description, config
        FROM eval_criteria WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(criteria)
}

/// List all criterion definitions.
pub async fn list_eval_criteria(pool: &SqlitePool) -> DbResult<Vec<EvalCriteriaRecord>> {
    let criteria = sqlx::query_as::<_, EvalCriteriaRecord>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, name, description, config
        FROM eval_criteria ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(criteria)
}

/// Delete a criterion definition.
pub async fn delete_eval_criteria(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM eval_criteria WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Evaluation runs
// ============================================================================

/// Create a new evaluation run, returning the assigned id.
pub async fn create_eval_run(pool: &SqlitePool, run: &EvalRunRecord) -> DbResult<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO eval_runs (created_at, updated_at, user_id, version, name, description,
                               task_id, runner_config, judge_config, criteria_configs,
                               status, start_time, end_time, run_result, score_result,
                               error_message)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(run.created_at)
    .bind(run.updated_at)
    .bind(&run.user_id)
    .bind(&run.version)
    .bind(&run.name)
    .bind(&run.description)
    .bind(run.task_id)
    .bind(&run.runner_config)
    .bind(&run.judge_config)
    .bind(&run.criteria_configs)
    .bind(run.status)
    .bind(run.start_time)
    .bind(run.end_time)
    .bind(&run.run_result)
    .bind(&run.score_result)
    .bind(&run.error_message)
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Get an evaluation run by id.
pub async fn get_eval_run(pool: &SqlitePool, id: i64) -> DbResult<Option<EvalRunRecord>> {
    let run = sqlx::query_as::<_, EvalRunRecord>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, name, description,
               task_id, runner_config, judge_config, criteria_configs,
               status, start_time, end_time, run_result, score_result, error_message
        FROM eval_runs WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(run)
}

/// List evaluation runs, newest first.
pub async fn list_eval_runs(pool: &SqlitePool) -> DbResult<Vec<EvalRunRecord>> {
    let runs = sqlx::query_as::<_, EvalRunRecord>(
        r#"
        SELECT id, created_at, updated_at, user_id, version, name, description,
               task_id, runner_config, judge_config, criteria_configs,
               status, start_time, end_time, run_result, score_result, error_message
        FROM eval_runs ORDER BY created_at DESC, id DESC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(runs)
}

/// Write a new status without touching the timing columns. Transition
/// legality is the evaluation engine's responsibility.
pub async fn update_eval_run_status(
    pool: &SqlitePool,
    id: i64,
    status: EvalRunStatus,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query("UPDATE eval_runs SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Mark a run as running and stamp its start time.
pub async fn start_eval_run(pool: &SqlitePool, id: i64, now: DateTime<Utc>) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE eval_runs SET status = ?, start_time = ?, updated_at = ? WHERE id = ?",
    )
    .bind(EvalRunStatus::Running)
    .bind(now)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Move a run to a terminal state, stamping its end time. `error_message`
/// is stored as-is (pass `None` on success).
pub async fn finish_eval_run(
    pool: &SqlitePool,
    id: i64,
    status: EvalRunStatus,
    error_message: Option<&str>,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE eval_runs SET status = ?, end_time = ?, error_message = ?, updated_at = ? WHERE id = ?",
    )
    .bind(status)
    .bind(now)
    .bind(error_message)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Store the runner's output as it becomes available.
pub async fn set_eval_run_result(
    pool: &SqlitePool,
    id: i64,
    run_result: impl Serialize,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let run_result = Json(serde_json::to_value(run_result)?);
    let result = sqlx::query("UPDATE eval_runs SET run_result = ?, updated_at = ? WHERE id = ?")
        .bind(run_result)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Store the judge's scores as they become available.
pub async fn set_eval_run_score(
    pool: &SqlitePool,
    id: i64,
    score_result: impl Serialize,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let score_result = Json(serde_json::to_value(score_result)?);
    let result = sqlx::query("UPDATE eval_runs SET score_result = ?, updated_at = ? WHERE id = ?")
        .bind(score_result)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete an evaluation run.
pub async fn delete_eval_run(pool: &SqlitePool, id: i64) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM eval_runs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::StudioDb;
    use crate::error::DbError;
    use chrono::Duration;
    use troupe_core::{
        Clock, ComponentModel, EvalJudgeCriteria, EvalScore, EvalTask, ManualClock,
    };

    fn test_clock() -> ManualClock {
        ManualClock::new("2024-01-01T00:00:00Z".parse().unwrap())
    }

    fn runner() -> ComponentModel {
        ComponentModel::new("troupe.eval.TeamRunner")
    }

    fn judge() -> ComponentModel {
        ComponentModel::new("troupe.eval.ModelJudge")
    }

    async fn run_fixture(db: &StudioDb, clock: &ManualClock, task_id: Option<i64>) -> i64 {
        let run = EvalRunRecord::new("nightly", task_id, runner(), judge(), clock.now()).unwrap();
        create_eval_run(db.pool(), &run).await.unwrap()
    }

    #[tokio::test]
    async fn deleting_task_detaches_runs() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();

        let task = EvalTaskRecord::new(
            "arithmetic",
            "basic sums",
            EvalTask {
                name: "arithmetic".into(),
                input: vec!["What is 2+2?".into()],
                ..EvalTask::default()
            },
            clock.now(),
        )
        .unwrap();
        let task_id = create_eval_task(db.pool(), &task).await.unwrap();
        let run_id = run_fixture(&db, &clock, Some(task_id)).await;

        assert!(delete_eval_task(db.pool(), task_id).await.unwrap());

        let run = get_eval_run(db.pool(), run_id).await.unwrap().unwrap();
        assert_eq!(run.task_id, None);
    }

    #[tokio::test]
    async fn lifecycle_stamps_start_and_end_times() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let run_id = run_fixture(&db, &clock, None).await;

        let pending = get_eval_run(db.pool(), run_id).await.unwrap().unwrap();
        assert_eq!(pending.status, EvalRunStatus::Pending);
        assert!(pending.start_time.is_none());

        clock.advance(Duration::seconds(2));
        start_eval_run(db.pool(), run_id, clock.now()).await.unwrap();
        let started = get_eval_run(db.pool(), run_id).await.unwrap().unwrap();
        assert_eq!(started.status, EvalRunStatus::Running);
        assert_eq!(started.start_time, Some(clock.now()));
        assert!(started.end_time.is_none());

        clock.advance(Duration::minutes(3));
        finish_eval_run(
            db.pool(),
            run_id,
            EvalRunStatus::Completed,
            None,
            clock.now(),
        )
        .await
        .unwrap();
        let finished = get_eval_run(db.pool(), run_id).await.unwrap().unwrap();
        assert_eq!(finished.status, EvalRunStatus::Completed);
        assert_eq!(finished.end_time, Some(clock.now()));
        assert!(finished.end_time > finished.start_time);
        assert!(finished.updated_at > started.updated_at);
    }

    #[tokio::test]
    async fn results_accumulate_as_they_arrive() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let run_id = run_fixture(&db, &clock, None).await;

        clock.advance(Duration::seconds(1));
        let score = EvalScore {
            overall_score: Some(8.0),
            ..EvalScore::default()
        };
        set_eval_run_score(db.pool(), run_id, &score, clock.now())
            .await
            .unwrap();

        let run = get_eval_run(db.pool(), run_id).await.unwrap().unwrap();
        assert!(run.run_result.is_none());
        let stored: EvalScore = serde_json::from_value(run.score_result.unwrap().0).unwrap();
        assert_eq!(stored, score);
    }

    #[tokio::test]
    async fn embedded_criteria_round_trip() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();

        let criteria = vec![EvalJudgeCriteria {
            dimension: "correctness".into(),
            prompt: "Is the answer right?".into(),
            min_value: 0.0,
            max_value: 10.0,
        }];
        let run = EvalRunRecord::new("scored", None, runner(), judge(), clock.now())
            .unwrap()
            .with_criteria(&criteria)
            .unwrap();
        let run_id = create_eval_run(db.pool(), &run).await.unwrap();

        let loaded = get_eval_run(db.pool(), run_id).await.unwrap().unwrap();
        let stored: Vec<EvalJudgeCriteria> = loaded
            .criteria_configs
            .0
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect();
        assert_eq!(stored, criteria);
    }

    #[tokio::test]
    async fn out_of_enum_status_is_rejected_by_storage() {
        let db = StudioDb::open_in_memory().await.unwrap();
        let clock = test_clock();
        let run_id = run_fixture(&db, &clock, None).await;

        let err: DbError = sqlx::query("UPDATE eval_runs SET status = 'archived' WHERE id = ?")
            .bind(run_id)
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(err.is_check_violation());
    }
}
