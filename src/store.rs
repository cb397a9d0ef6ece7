//! All database access: random sampling for question building, batched and
//! point lookups for scoring, and the append-only result/feedback writes.

use crate::error::{Error, Result};
use crate::model::{Image, UNCLASSIFIED};
use crate::schema::{images, labeling_results, results, unclassified_feedback};
use crate::scoring::RoundOutcome;
use diesel::prelude::*;
use diesel_async::{scoped_futures::ScopedFutureExt, AsyncConnection, AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

diesel::define_sql_function! {
    /// Postgres `random()`, for uniform `ORDER BY` sampling.
    fn random() -> Double;
}

pub async fn distinct_labels(conn: &mut AsyncPgConnection) -> QueryResult<Vec<String>> {
    images::dsl::images
        .select(images::label)
        .filter(images::label.ne(UNCLASSIFIED))
        .distinct()
        .load(conn)
        .await
}

pub async fn sample_unclassified(conn: &mut AsyncPgConnection, num: i64) -> QueryResult<Vec<Image>> {
    images::dsl::images
        .filter(images::label.eq(UNCLASSIFIED))
        .order(random())
        .limit(num)
        .load(conn)
        .await
}

pub async fn sample_classified(conn: &mut AsyncPgConnection, num: i64) -> QueryResult<Vec<Image>> {
    images::dsl::images
        .filter(images::label.ne(UNCLASSIFIED))
        .order(random())
        .limit(num)
        .load(conn)
        .await
}

/// Batched lookup; callers join the result back by uuid, order is not
/// guaranteed.
pub async fn fetch_by_uuids(conn: &mut AsyncPgConnection, uuids: &[Uuid]) -> QueryResult<Vec<Image>> {
    images::dsl::images
        .filter(images::uuid.eq_any(uuids))
        .load(conn)
        .await
}

pub async fn fetch_by_uuid(conn: &mut AsyncPgConnection, id: Uuid) -> Result<Image> {
    images::dsl::images
        .filter(images::uuid.eq(id))
        .first(conn)
        .await
        .optional()?
        .ok_or(Error::NotFound(id))
}

pub async fn insert_image(
    conn: &mut AsyncPgConnection,
    id: Uuid,
    path: &str,
    label: &str,
    source: Option<&str>,
) -> QueryResult<()> {
    diesel::insert_into(images::table)
        .values((
            images::uuid.eq(id),
            images::path.eq(path),
            images::label.eq(label),
            images::source.eq(source),
        ))
        .execute(conn)
        .await?;
    Ok(())
}

/// A correct selection round: the result row and the gated feedback rows
/// commit together or not at all.
pub async fn record_selection_outcome(
    conn: &mut AsyncPgConnection,
    outcome: &RoundOutcome,
    category_asked: &str,
) -> QueryResult<()> {
    let image_ids = join_ids(&outcome.image_ids);
    let category = category_asked.to_string();
    let feedback = outcome.feedback.clone();
    conn.transaction(|conn| {
        (async move {
            diesel::insert_into(results::table)
                .values((
                    results::is_correct.eq(true),
                    results::image_ids.eq(image_ids),
                    results::category_asked.eq(category),
                ))
                .execute(conn)
                .await?;
            insert_feedback(conn, &feedback).await
        })
        .scope_boxed()
    })
    .await
}

/// A correct labeling round: the result row (with the full answer list) and
/// the single feedback row are one commit unit.
pub async fn record_labeling_outcome(
    conn: &mut AsyncPgConnection,
    outcome: &RoundOutcome,
    answers: &[String],
) -> QueryResult<()> {
    let image_ids = join_ids(&outcome.image_ids);
    let submitted = answers.join(",");
    let feedback = outcome.feedback.clone();
    conn.transaction(|conn| {
        (async move {
            diesel::insert_into(labeling_results::table)
                .values((
                    labeling_results::is_correct.eq(true),
                    labeling_results::image_ids.eq(image_ids),
                    labeling_results::submitted_answers.eq(submitted),
                ))
                .execute(conn)
                .await?;
            insert_feedback(conn, &feedback).await
        })
        .scope_boxed()
    })
    .await
}

/// A correct counting round persists only the inferred probe label.
pub async fn record_counting_outcome(
    conn: &mut AsyncPgConnection,
    outcome: &RoundOutcome,
) -> QueryResult<()> {
    insert_feedback(conn, &outcome.feedback).await
}

async fn insert_feedback(
    conn: &mut AsyncPgConnection,
    pairs: &[(Uuid, String)],
) -> QueryResult<()> {
    if pairs.is_empty() {
        return Ok(());
    }
    let rows: Vec<_> = pairs
        .iter()
        .map(|(id, label)| {
            (
                unclassified_feedback::image_uuid.eq(*id),
                unclassified_feedback::user_assigned_label.eq(label.as_str()),
                unclassified_feedback::confirmed_by_correct_round.eq(true),
            )
        })
        .collect();
    diesel::insert_into(unclassified_feedback::table)
        .values(&rows)
        .execute(conn)
        .await?;
    Ok(())
}

fn join_ids(ids: &[i32]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
