//! Contact submission and sync API endpoints.

use api_protocol::{
    Contact, SubmitContactsRequest, SubmitContactsResponse, SyncResponse, SyncedContact,
};
use axum::{extract::State, Extension, Json};
use contact_store::ContactStore;
use entities::ContactBookEntry;
use sync_engine::{fetch_updates, RawContact};

use crate::error::ServerResult;
use crate::middleware::CurrentUser;
use crate::state::SharedState;

fn entry_to_contact(entry: &ContactBookEntry) -> Contact {
    Contact {
        name: entry.name.clone(),
        country_code: entry.country_code.clone(),
        mobile_number: entry.mobile_number.clone(),
        username: entry.username.clone(),
    }
}

fn entry_to_synced(entry: &ContactBookEntry) -> SyncedContact {
    SyncedContact {
        name: entry.name.clone(),
        country_code: entry.country_code.clone(),
        mobile_number: entry.mobile_number.clone(),
        username: entry.username.clone().unwrap_or_default(),
        updated_at: entry.updated_at,
    }
}

/// Submits a raw contact batch for reconciliation.
///
/// Responds with the newly stored contacts that belong to registered
/// users; dormant rows are persisted silently.
pub async fn submit_contacts<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Extension(current): Extension<CurrentUser>,
    Json(request): Json<SubmitContactsRequest>,
) -> ServerResult<Json<SubmitContactsResponse>> {
    let batch: Vec<RawContact> = request
        .contacts
        .into_iter()
        .map(|c| RawContact {
            name: c.name,
            country_code: c.country_code,
            mobile_number: c.mobile_number,
        })
        .collect();

    let active = state
        .reconciler
        .submit(&state.store, &current.user, batch)
        .await?;

    Ok(Json(SubmitContactsResponse {
        contacts: active.iter().map(entry_to_contact).collect(),
    }))
}

/// Returns the caller's contact entries changed since their last sync and
/// advances their watermark.
pub async fn fetch_sync<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Extension(current): Extension<CurrentUser>,
) -> ServerResult<Json<SyncResponse>> {
    let delta = fetch_updates(&state.store, &current.user).await?;

    Ok(Json(SyncResponse {
        contacts: delta.entries.iter().map(entry_to_synced).collect(),
        synced_at: delta.watermark,
    }))
}
