use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use bytes::Bytes;
use uuid::Uuid;

use crate::cv::aggregator::DataAggregator;
use crate::errors::AppError;
use crate::session::handlers::lookup_session;
use crate::state::AppState;

/// POST /api/v1/sessions/:id/cv
///
/// Builds the CV of the logged-in user, tailored to the posting on display when
/// there is one, overwrites `CV_OUTPUT_PATH` and returns the PDF.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let session = lookup_session(&state, id)?;
    // Held for the whole build so the session's actions stay serialized.
    let session = session.lock().await;
    let user_id = session.require_login()?;
    let target_job = session.jobs.current().map(|job| job.job_description.as_str());

    let aggregator = DataAggregator::new(
        state.profiles.as_ref(),
        state.summarizer.as_ref(),
        state.config.max_skills,
    );
    let model = aggregator.build(user_id, target_job).await?;
    let pdf = state
        .layout
        .render_to_file(&model, &state.config.cv_output_path)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"cv.pdf\""),
        ],
        Bytes::from(pdf),
    ))
}
