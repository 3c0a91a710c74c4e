use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::supply::CryptoOverride;
use super::{Keymaster, KeymasterContext, Operation, WriteOp};
use crate::error::KeymasterResult;
use crate::path::StoragePath;

/// Axum middleware that supplies path-derived keys to the wrapped service.
///
/// Requests outside `/<version>/<account>[/<container>[/<object>]]`, or with
/// a method other than PUT/POST/GET/HEAD, pass through untouched.
pub async fn keymaster_middleware(
    State(keymaster): State<Keymaster>,
    req: Request,
    next: Next,
) -> Response {
    let op = Operation::from_method(req.method());
    let target = match op {
        Operation::PassThrough => None,
        _ => StoragePath::from_request_path(req.uri().path()),
    };
    let Some(target) = target else {
        return next.run(req).await;
    };

    let ctx = keymaster.context_for(target);
    let result = match op {
        Operation::Write(write) => handle_write(ctx, write, req, next).await,
        Operation::Read(_) => handle_read(ctx, req, next).await,
        Operation::PassThrough => Ok(next.run(req).await),
    };

    result.unwrap_or_else(|err| {
        log::debug!("keymaster rejected request: {}", err);
        err.into_response()
    })
}

async fn handle_write(
    ctx: KeymasterContext,
    op: WriteOp,
    mut req: Request,
    next: Next,
) -> KeymasterResult<Response> {
    ctx.prepare_write(op, &mut req)?;
    Ok(next.run(req).await)
}

async fn handle_read(
    mut ctx: KeymasterContext,
    req: Request,
    next: Next,
) -> KeymasterResult<Response> {
    let path = req.uri().path().to_string();
    let overridden = req.extensions().get::<CryptoOverride>().is_some();

    let mut resp = next.run(req).await;
    ctx.provide_keys_get_or_head(&path, overridden, &mut resp)?;
    Ok(resp)
}
