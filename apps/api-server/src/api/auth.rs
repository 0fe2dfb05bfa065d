//! Authentication API endpoints.

use api_protocol::{RequestOtpRequest, VerifyOtpRequest, VerifyOtpResponse};
use axum::{extract::State, http::StatusCode, Json};
use contact_store::ContactStore;
use entities::NewUser;
use sync_engine::{propagate_activation, valid_country_code, valid_mobile_number};

use crate::error::{ServerError, ServerResult};
use crate::state::SharedState;

fn validate_login_shape(country_code: &str, mobile_number: &str) -> ServerResult<()> {
    if !valid_mobile_number(mobile_number) {
        return Err(ServerError::InvalidRequest(
            "mobile number must be exactly 10 digits".to_string(),
        ));
    }
    if !valid_country_code(country_code) {
        return Err(ServerError::InvalidRequest(
            "country code is malformed".to_string(),
        ));
    }
    Ok(())
}

/// Requests an OTP challenge, creating the user record if absent.
///
/// The code is stored before delivery is attempted: a failed send is logged
/// and the request still succeeds, so login is never blocked on the SMS
/// channel.
pub async fn request_otp<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Json(request): Json<RequestOtpRequest>,
) -> ServerResult<StatusCode> {
    validate_login_shape(&request.country_code, &request.mobile_number)?;

    let lookup = state
        .store
        .create_or_fetch_user(
            NewUser::new(
                auth::generate_username(),
                &request.country_code,
                &request.mobile_number,
            )
            .with_name(request.name.unwrap_or_default()),
        )
        .await?;

    let mut user = lookup.user;
    let code = auth::generate_otp();
    user.begin_challenge(&code);
    let user = state.store.update_user(user).await?;

    tracing::info!(user_id = user.id, outcome = ?lookup.outcome, "OTP challenge stored");

    let destination = format!("{}{}", request.country_code, request.mobile_number);
    let body = format!("Hi, your Parley verification code is {code}");
    if let Err(e) = state.sms.send(&destination, &body).await {
        tracing::warn!(user_id = user.id, error = %e, "OTP delivery failed, code kept");
    }

    Ok(StatusCode::OK)
}

/// Verifies an OTP challenge and issues the caller's bearer credential.
///
/// Activation propagation is committed before the response is built, so a
/// sync call made by any affected owner after this returns will observe
/// the activation.
pub async fn verify_otp<S: ContactStore>(
    State(state): State<SharedState<S>>,
    Json(request): Json<VerifyOtpRequest>,
) -> ServerResult<Json<VerifyOtpResponse>> {
    validate_login_shape(&request.country_code, &request.mobile_number)?;

    let mut user = state
        .store
        .get_user_by_mobile(&request.mobile_number)
        .await?
        .ok_or_else(|| {
            ServerError::AuthenticationFailed("Mobile number is not registered".to_string())
        })?;

    if !user.verify_challenge(&request.otp) {
        return Err(ServerError::AuthenticationFailed("Invalid OTP".to_string()));
    }
    let user = state.store.update_user(user).await?;

    propagate_activation(&state.store, &user).await?;

    let token = state
        .store
        .get_or_create_token(user.id, &auth::generate_token())
        .await?;

    tracing::info!(user_id = user.id, "OTP verified");

    Ok(Json(VerifyOtpResponse {
        token: token.token,
        id: user.id,
        name: user.name,
        username: user.username,
    }))
}
