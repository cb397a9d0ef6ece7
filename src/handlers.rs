use crate::app_state::AppState;
use crate::error::{Error, Result};
use crate::model::Image;
use crate::question::{self, compose_grid, to_wire};
use crate::scoring;
use crate::store;
use crate::types::*;
use rand::thread_rng;
use rocket::serde::json::Json;
use rocket::{get, http::Status, post, State};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};
use uuid::Uuid;

#[get("/healthz")]
pub fn healthz() -> (Status, ()) {
    (Status::Ok, ())
}

#[get("/status")]
pub fn status() -> (Status, String) {
    (Status::Ok, String::new())
}

/// Selection round: nine images, three of them probes when available, and a
/// category picked from whatever the store actually holds.
#[get("/question")]
pub async fn selection_question(state: &State<AppState>) -> Result<Json<SelectionQuestion>> {
    let mut conn = state.pg_pool.get().await?;
    let categories = store::distinct_labels(&mut conn).await?;
    let category = question::pick_category(&categories, &mut thread_rng())?;

    let probes = store::sample_unclassified(&mut conn, question::SELECTION_PROBES).await?;
    if (probes.len() as i64) < question::SELECTION_PROBES {
        warn!(
            available = probes.len(),
            "not enough unclassified images, continuing with a reduced probe rate"
        );
    }
    let fillers =
        store::sample_classified(&mut conn, question::SELECTION_GRID - probes.len() as i64).await?;

    let grid = compose_grid(probes, fillers, &mut thread_rng());
    Ok(Json(SelectionQuestion {
        category,
        images: to_wire(&grid),
    }))
}

#[post("/submit", data = "<payload>")]
pub async fn selection_submit(
    state: &State<AppState>,
    payload: Json<SelectionSubmission>,
) -> Result<Json<Verdict>> {
    let payload = payload.into_inner();
    let mut conn = state.pg_pool.get().await?;

    let echoed: Vec<Uuid> = payload.images.iter().map(|info| info.uuid).collect();
    let records = store::fetch_by_uuids(&mut conn, &echoed).await?;
    let by_uuid: HashMap<Uuid, Image> = records.into_iter().map(|r| (r.uuid, r)).collect();
    let selected: HashSet<usize> = payload.selected.iter().copied().collect();

    let outcome = scoring::score_selection(&echoed, &selected, &payload.category_asked, &by_uuid)?;
    if outcome.is_correct {
        store::record_selection_outcome(&mut conn, &outcome, &payload.category_asked).await?;
    }
    info!(
        correct = outcome.is_correct,
        category = %payload.category_asked,
        feedback = outcome.feedback.len(),
        "selection round scored"
    );
    Ok(Json(Verdict {
        is_correct: outcome.is_correct,
    }))
}

/// Labeling round: five images, one probe, the client labels each one.
#[get("/question")]
pub async fn labeling_question(state: &State<AppState>) -> Result<Json<LabelingQuestion>> {
    let mut conn = state.pg_pool.get().await?;
    let probes = store::sample_unclassified(&mut conn, 1).await?;
    let fillers =
        store::sample_classified(&mut conn, question::LABELING_GRID - probes.len() as i64).await?;
    let grid = compose_grid(probes, fillers, &mut thread_rng());
    Ok(Json(LabelingQuestion {
        images: to_wire(&grid),
    }))
}

#[post("/submit", data = "<payload>")]
pub async fn labeling_submit(
    state: &State<AppState>,
    payload: Json<LabelingSubmission>,
) -> Result<Json<Verdict>> {
    let payload = payload.into_inner();
    let mut conn = state.pg_pool.get().await?;

    let mut records = Vec::with_capacity(payload.images.len());
    for info in &payload.images {
        records.push(store::fetch_by_uuid(&mut conn, info.uuid).await?);
    }

    let outcome = scoring::score_labeling(&records, &payload.answers)?;
    if outcome.is_correct {
        store::record_labeling_outcome(&mut conn, &outcome, &payload.answers).await?;
    }
    info!(correct = outcome.is_correct, "labeling round scored");
    Ok(Json(Verdict {
        is_correct: outcome.is_correct,
    }))
}

/// Counting round: sixteen images, one probe, the client reports how many
/// images it saw per category.
#[get("/question")]
pub async fn counting_question(state: &State<AppState>) -> Result<Json<CountingQuestion>> {
    let mut conn = state.pg_pool.get().await?;
    let probes = store::sample_unclassified(&mut conn, 1).await?;
    let fillers =
        store::sample_classified(&mut conn, question::COUNTING_GRID - probes.len() as i64).await?;
    let grid = compose_grid(probes, fillers, &mut thread_rng());
    Ok(Json(CountingQuestion {
        images: to_wire(&grid),
    }))
}

#[post("/submit", data = "<payload>")]
pub async fn counting_submit(
    state: &State<AppState>,
    payload: Json<CountingSubmission>,
) -> Result<Json<Verdict>> {
    let payload = payload.into_inner();
    let mut conn = state.pg_pool.get().await?;

    let echoed: Vec<Uuid> = payload.images.iter().map(|info| info.uuid).collect();
    let fetched = store::fetch_by_uuids(&mut conn, &echoed).await?;
    let by_uuid: HashMap<Uuid, Image> = fetched.into_iter().map(|r| (r.uuid, r)).collect();
    let mut records = Vec::with_capacity(echoed.len());
    for id in &echoed {
        records.push(by_uuid.get(id).cloned().ok_or(Error::NotFound(*id))?);
    }
    let known_categories = store::distinct_labels(&mut conn).await?;

    let outcome = scoring::score_counting(&records, &known_categories, &payload.answers)?;
    if outcome.is_correct {
        store::record_counting_outcome(&mut conn, &outcome).await?;
    }
    info!(
        correct = outcome.is_correct,
        feedback = outcome.feedback.len(),
        "counting round scored"
    );
    Ok(Json(Verdict {
        is_correct: outcome.is_correct,
    }))
}
