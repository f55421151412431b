// アクセス制御ミドルウェア
//
// 認証（Bearer JWT → ユーザー解決）と認可（許可テーブル）を1か所で行う。

use crate::api::error::AppError;
use crate::auth::{jwt::verify_jwt, permissions::authorize};
use crate::common::auth::AuthUser;
use crate::common::error::InventoryError;
use crate::db;
use crate::AppState;
use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::net::SocketAddr;

/// Authorizationヘッダーから "Bearer {token}" を取り出す
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, InventoryError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| InventoryError::Authentication("Missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| InventoryError::Authentication("Invalid Authorization header".to_string()))?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            InventoryError::Authentication("Invalid Authorization header format".to_string())
        })
}

/// クライアントIPを取得（プロキシ対応）
///
/// `X-Forwarded-For`の先頭、`X-Real-IP`、ソケットの接続元の順に採用する。
pub(crate) fn client_ip(request: &Request) -> Option<String> {
    let forwarded = request
        .headers()
        .get("x-forwarded-for")
        .or_else(|| request.headers().get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
        .filter(|s| !s.is_empty());

    forwarded.or_else(|| {
        request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip().to_string())
    })
}

/// 保護されたルートのアクセス制御
///
/// 1. Bearerトークンを検証（失敗は401）
/// 2. `sub`からユーザーを毎回ストレージで解決（不在は401、無効化済みは403）
/// 3. 保存されているロールで許可テーブルを参照（拒否は403）
///
/// 成功時は`AuthUser`をリクエスト拡張に格納してハンドラーへ渡す。
pub async fn access_control_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())?;
    let claims = verify_jwt(token, &state.jwt_secret).inspect_err(|e| {
        tracing::warn!("JWT verification failed: {}", e);
    })?;

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| InventoryError::Authentication("Invalid token subject".to_string()))?;
    let user = db::users::find_by_id(&state.db_pool, user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id, "Token subject no longer exists");
            InventoryError::Authentication("User no longer exists".to_string())
        })?;

    if !user.is_active {
        tracing::warn!(user_id, "Request from inactive account rejected");
        return Err(InventoryError::AccountInactive.into());
    }

    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    authorize(request.method().as_str(), &route, user.role).inspect_err(|e| {
        tracing::warn!(user_id, role = %user.raw_role, route = %route, "Access denied: {}", e);
    })?;

    let Some(role) = user.role else {
        return Err(InventoryError::Authorization("Your role is not recognized".to_string()).into());
    };
    let auth_user = AuthUser {
        id: user.id,
        name: user.name,
        email: user.email,
        role,
        ip_address: client_ip(&request),
    };
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}
