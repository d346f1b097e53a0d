// API request handlers
// Author: Gabriel Demetrios Lafis

use std::borrow::Cow;

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, info};

use crate::chart::{BarChart, ChartOptions, ChartSource};
use crate::data::{DataSet, ExportFormat};
use crate::processing::{describe, CleaningOptions};
use crate::storage::{Session, Upload};
use super::{models::*, ApiError, AppState};

fn content_type(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn upload<'a>(file_name: &'a str, mime_type: Option<&'a str>, body: &'a [u8]) -> Upload<'a> {
    let upload = Upload::new(file_name, body);
    match mime_type {
        Some(mime_type) => upload.with_mime_type(mime_type),
        None => upload,
    }
}

/// Dataset a chart reads: the upload itself, or the upload after cleaning
fn chart_dataset<'a>(
    session: &'a Session,
    source: ChartSource,
    options: &CleaningOptions,
) -> Result<Cow<'a, DataSet>, ApiError> {
    match source {
        ChartSource::Original => Ok(Cow::Borrowed(session.original.as_ref())),
        ChartSource::Cleaned => Ok(Cow::Owned(options.apply(&session.original)?)),
    }
}

/// Build the chart for a request, or the warning shown in its place
fn chart_response(session: &Session, request: &ChartRequest) -> Result<ChartResponse, ApiError> {
    let dataset = chart_dataset(session, request.source, &request.options)?;
    let options = ChartOptions::for_dataset(&dataset);

    if !options.available {
        return Ok(ChartResponse {
            source: request.source,
            chart: None,
            warning: options.warning,
        });
    }

    Ok(ChartResponse {
        source: request.source,
        chart: Some(BarChart::build(&dataset, &request.x, &request.y)?),
        warning: None,
    })
}

/// Upload a file and start a session
pub async fn create_session(
    state: web::Data<AppState>,
    query: web::Query<UploadQuery>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let sessions = state.sessions.clone();
    let file_name = query.into_inner().filename;
    let mime_type = content_type(&req);

    let session = web::block(move || {
        sessions.open(&upload(&file_name, mime_type.as_deref(), &body))
    })
    .await??;

    Ok(HttpResponse::Created().json(SessionResponse::new(&session, state.preview_rows)))
}

/// Get file details and the preview of a session
pub async fn get_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let session = state.sessions.get(&path)?;

    Ok(HttpResponse::Ok().json(SessionResponse::new(&session, state.preview_rows)))
}

/// Replace the file of a session
pub async fn replace_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<UploadQuery>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let sessions = state.sessions.clone();
    let id = path.into_inner();
    let file_name = query.into_inner().filename;
    let mime_type = content_type(&req);

    let session = web::block(move || {
        sessions.replace(&id, &upload(&file_name, mime_type.as_deref(), &body))
    })
    .await??;

    Ok(HttpResponse::Ok().json(SessionResponse::new(&session, state.preview_rows)))
}

/// End a session
pub async fn delete_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    state.sessions.remove(&path)?;

    Ok(HttpResponse::NoContent().finish())
}

/// Apply the cleaning options and summarize the result
pub async fn clean_session(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<CleaningOptions>,
) -> Result<HttpResponse, ApiError> {
    let session = state.sessions.get(&path)?;
    let options = payload.into_inner();

    let response = web::block(move || -> Result<CleanResponse, ApiError> {
        let cleaned = options.apply(&session.original)?;
        debug!(
            "session {}: {} rows cleaned down to {}",
            session.id,
            session.original.len(),
            cleaned.len()
        );

        Ok(CleanResponse {
            id: session.id,
            text_columns: cleaned.text_columns(),
            statistics: describe(&cleaned),
            cleaned: TableView::from_dataset(&cleaned),
            options,
        })
    })
    .await??;

    Ok(HttpResponse::Ok().json(response))
}

/// List the columns that can go on each chart axis
pub async fn chart_options(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ChartOptionsRequest>,
) -> Result<HttpResponse, ApiError> {
    let session = state.sessions.get(&path)?;
    let request = payload.into_inner();

    let options = web::block(move || -> Result<ChartOptions, ApiError> {
        let dataset = chart_dataset(&session, request.source, &request.options)?;
        Ok(ChartOptions::for_dataset(&dataset))
    })
    .await??;

    Ok(HttpResponse::Ok().json(options))
}

/// Build a bar chart, or explain why none can be drawn
pub async fn build_chart(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ChartRequest>,
) -> Result<HttpResponse, ApiError> {
    let session = state.sessions.get(&path)?;
    let request = payload.into_inner();

    let response = web::block(move || chart_response(&session, &request)).await??;

    Ok(HttpResponse::Ok().json(response))
}

/// Render a bar chart as an SVG image
pub async fn render_chart(
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<ChartRequest>,
) -> Result<HttpResponse, ApiError> {
    let session = state.sessions.get(&path)?;
    let request = payload.into_inner();

    let svg = web::block(move || -> Result<String, ApiError> {
        let response = chart_response(&session, &request)?;
        match response.chart {
            Some(chart) => Ok(chart.render_svg()?),
            None => Err(ApiError::InvalidArgument(response.warning.unwrap_or_default())),
        }
    })
    .await??;

    Ok(HttpResponse::Ok().content_type("image/svg+xml").body(svg))
}

/// Download the cleaned dataset as CSV or Excel
pub async fn export_session(
    state: web::Data<AppState>,
    path: web::Path<(String, String)>,
    payload: web::Json<CleaningOptions>,
) -> Result<HttpResponse, ApiError> {
    let (id, format) = path.into_inner();
    let format = ExportFormat::from_extension(&format).ok_or_else(|| {
        ApiError::InvalidArgument(format!("Unknown export format '{}'", format))
    })?;

    let session = state.sessions.get(&id)?;
    let options = payload.into_inner();

    let artifact = web::block(move || -> Result<_, ApiError> {
        let cleaned = options.apply(&session.original)?;
        let artifact = format.render(&cleaned)?;

        info!(
            "session {}: exported {} rows as {}",
            session.id,
            cleaned.len(),
            artifact.file_name
        );
        Ok(artifact)
    })
    .await??;

    Ok(HttpResponse::Ok()
        .content_type(artifact.mime_type)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.file_name),
        ))
        .body(artifact.bytes))
}
