// ABOUTME: Planning event route handlers: list, add, update, and remove named occasions
// ABOUTME: Accepts both the single-day shape (date) and the multi-day shape (startDate, duration)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Async-IO.org

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use super::{day_param, rejected};
use crate::context::ServerContext;
use crate::errors::{AppError, ErrorCode};
use crate::models::{EventUpdate, PlannedEvent};

/// Body of an event creation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventBody {
    /// Event name
    pub name: String,
    /// Day of a single-day event
    #[serde(default)]
    pub date: Option<String>,
    /// First day of a multi-day event
    #[serde(default)]
    pub start_date: Option<String>,
    /// Length in days of a multi-day event
    #[serde(default)]
    pub duration: Option<u32>,
}

/// Body of an event update; absent fields are kept
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventBody {
    /// New name
    #[serde(default)]
    pub name: Option<String>,
    /// New first day
    #[serde(default)]
    pub start_date: Option<String>,
    /// New length in days
    #[serde(default)]
    pub duration: Option<u32>,
}

/// Optional day filter of the event list
#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    /// Only events covering this day
    #[serde(default)]
    pub date: Option<String>,
}

/// Event list response
#[derive(Debug, Serialize, Deserialize)]
pub struct EventListResponse {
    /// Events in creation order
    pub events: Vec<PlannedEvent>,
}

/// Event routes handler
pub struct EventRoutes;

impl EventRoutes {
    /// Create all event routes
    pub fn routes(context: ServerContext) -> Router {
        Router::new()
            .route(
                "/api/events",
                get(Self::handle_list).post(Self::handle_create),
            )
            .route(
                "/api/events/:id",
                put(Self::handle_update).delete(Self::handle_delete),
            )
            .with_state(context)
    }

    /// Handle GET /api/events - Every event, or those covering `?date=`
    async fn handle_list(
        State(context): State<ServerContext>,
        Query(query): Query<EventListQuery>,
    ) -> Result<Response, AppError> {
        let planning = context.data().planning();
        let events = match query.date.as_deref() {
            Some(date) => planning.get_events_for_date(day_param("GET /api/events", date)?)?,
            None => planning.planned_events()?,
        };

        Ok((StatusCode::OK, Json(EventListResponse { events })).into_response())
    }

    /// Handle POST /api/events - Add a single-day or multi-day event
    async fn handle_create(
        State(context): State<ServerContext>,
        Json(body): Json<CreateEventBody>,
    ) -> Result<Response, AppError> {
        const ROUTE: &str = "POST /api/events";
        let planning = context.data().planning();

        let event = match (body.start_date.as_deref(), body.date.as_deref()) {
            (Some(start), _) => {
                let start = day_param(ROUTE, start)?;
                planning
                    .add_event(&body.name, start, body.duration.unwrap_or(1))
                    .await
            }
            (None, Some(date)) => {
                let date = day_param(ROUTE, date)?;
                match body.duration {
                    Some(duration) => planning.add_event(&body.name, date, duration).await,
                    None => planning.add_event_to_plan(date, &body.name).await,
                }
            }
            (None, None) => Err(AppError::new(
                ErrorCode::MissingRequiredField,
                "Either date or startDate is required",
            )),
        }
        .map_err(|error| rejected(ROUTE, error))?;

        Ok((StatusCode::CREATED, Json(event)).into_response())
    }

    /// Handle PUT /api/events/:id - Replace the provided fields of an event
    async fn handle_update(
        State(context): State<ServerContext>,
        Path(id): Path<String>,
        Json(body): Json<UpdateEventBody>,
    ) -> Result<Response, AppError> {
        const ROUTE: &str = "PUT /api/events/:id";
        let start_date = body
            .start_date
            .as_deref()
            .map(|date| day_param(ROUTE, date))
            .transpose()?;
        let update = EventUpdate {
            id: id.clone(),
            name: body.name,
            start_date,
            duration: body.duration,
        };

        let event = context
            .data()
            .planning()
            .update_event(update)
            .await
            .map_err(|error| rejected(ROUTE, error))?
            .ok_or_else(|| AppError::not_found(format!("Event {id}")).with_resource_id(&id))?;

        Ok((StatusCode::OK, Json(event)).into_response())
    }

    /// Handle DELETE /api/events/:id - Remove an event; unknown ids are a no-op
    async fn handle_delete(
        State(context): State<ServerContext>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        context.data().planning().remove_event(&id).await?;
        Ok((StatusCode::NO_CONTENT, ()).into_response())
    }
}
