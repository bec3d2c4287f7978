//! Request extractors that report failures as [`GatewayError`]

use axum::{extract::FromRequest, Json};

use crate::error::GatewayError;

/// JSON request body whose rejections render as the gateway error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(GatewayError))]
pub struct JsonBody<T>(pub T);
