//! Program detail, schedule unlocking with points, and the signed-in user.

use serde::Serialize;
use serde_json::{json, Value};

use crate::api::envelope::{STATUS_CONTINUE, STATUS_OK};
use crate::api::{ensure_status, unwrap_detail, ApiClient, Auth, QueryParams};
use crate::error::{Error, Result};
use crate::models::{CurrentUser, ProgramDetail};
use crate::session::{CachedIdentity, CredentialStore, Session};
use crate::sync::Confirm;

const DETAIL_STATUSES: &[&str] = &[STATUS_OK, STATUS_CONTINUE];
const OK_STATUSES: &[&str] = &[STATUS_OK];

/// A program together with whether its full itinerary may be shown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramView {
    pub detail: ProgramDetail,
    pub schedule_unlocked: bool,
}

impl ProgramView {
    pub const fn schedule_masked(&self) -> bool {
        !self.schedule_unlocked
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockOutcome {
    Unlocked { balance_before: i64 },
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct ProgramService<S: CredentialStore> {
    client: ApiClient<S>,
}

impl<S: CredentialStore> ProgramService<S> {
    pub const fn new(client: ApiClient<S>) -> Self {
        Self { client }
    }

    fn session(&self) -> &Session<S> {
        self.client.session()
    }

    /// Program detail and unlock status, fetched side by side.
    pub async fn detail(&self, program_id: i64) -> Result<ProgramView> {
        if !self.session().is_signed_in()? {
            return Err(Error::AuthRequired);
        }
        let path = format!("/api/tour-program/{program_id}");
        let params = QueryParams::new();
        let (body, unlocked) = tokio::join!(
            self.client.get(&path, &params, Auth::Required),
            self.unlock_status(program_id),
        );
        let detail = parse_detail(&body?)?;
        let schedule_unlocked = detail.point_paid || unlocked?;

        Ok(ProgramView {
            detail,
            schedule_unlocked,
        })
    }

    /// Title, region and counts of a program, readable without signing in.
    pub async fn summary(&self, program_id: i64) -> Result<ProgramDetail> {
        let body = self
            .client
            .get_detail("tour-program", program_id, Auth::Optional)
            .await?;
        parse_detail(&body)
    }

    /// Server unlock flag, written through to the local cache. Falls back to
    /// the cached flag when the server cannot be reached.
    pub async fn unlock_status(&self, program_id: i64) -> Result<bool> {
        let path = format!("/api/tour-program/{program_id}/unlock-status");
        let response = self
            .client
            .get(&path, &QueryParams::new(), Auth::Required)
            .await;
        resolve_unlock_status(self.session(), program_id, response)
    }

    pub async fn points_balance(&self) -> Result<i64> {
        let body = self
            .client
            .get("/api/points/balance", &QueryParams::new(), Auth::Required)
            .await?;
        Ok(body
            .get("data")
            .and_then(|data| data.get("balance"))
            .and_then(Value::as_i64)
            .unwrap_or(0))
    }

    /// Spends `cost` points to reveal the program's itinerary.
    pub async fn unlock_with_points(
        &self,
        program_id: i64,
        cost: i64,
        confirm: &impl Confirm,
    ) -> Result<UnlockOutcome> {
        let balance = self.points_balance().await?;
        check_balance(balance, cost)?;

        let prompt = format!("사용 포인트: {cost}\n현재 잔액: {balance}");
        if !confirm.confirm(&prompt) {
            return Ok(UnlockOutcome::Cancelled);
        }

        let spend = json!({
            "amount": cost,
            "actionType": "USE",
            "actionSubject": "CONTENT",
            "targetId": program_id,
        });
        let spent = self
            .client
            .post("/api/points/use", &spend, Auth::Required)
            .await?;
        ensure_status(&spent, OK_STATUSES)?;
        let unlocked = self
            .client
            .post(
                &format!("/api/tour-program/{program_id}/unlock"),
                &json!({ "unlocked": true }),
                Auth::Required,
            )
            .await?;
        ensure_status(&unlocked, OK_STATUSES)?;
        self.session().store_schedule_unlocked(program_id, true)?;
        tracing::info!(program_id, cost, "schedule unlocked with points");

        Ok(UnlockOutcome::Unlocked {
            balance_before: balance,
        })
    }

    /// Cached identity, or the profile from the server cached for next time.
    pub async fn current_user(&self) -> Result<CachedIdentity> {
        if let Some(identity) = self.session().cached_identity()? {
            return Ok(identity);
        }
        let user = self.fetch_profile().await?;
        let identity = user.identity();
        self.session().store_identity(&identity)?;
        Ok(identity)
    }

    pub async fn fetch_profile(&self) -> Result<CurrentUser> {
        let body = self
            .client
            .get("/api/user", &QueryParams::new(), Auth::Required)
            .await?;
        ensure_status(&body, OK_STATUSES)?;
        let data = unwrap_detail(&body).cloned().unwrap_or(Value::Null);
        Ok(CurrentUser::from_value(data)?)
    }
}

fn parse_detail(body: &Value) -> Result<ProgramDetail> {
    ensure_status(body, DETAIL_STATUSES)?;
    let data = unwrap_detail(body).cloned().ok_or(Error::ServerRejected {
        status: None,
        message: "program detail response had no data".to_string(),
    })?;
    Ok(ProgramDetail::from_value(data)?)
}

fn check_balance(balance: i64, cost: i64) -> Result<()> {
    if balance < cost {
        return Err(Error::InsufficientPoints { balance, cost });
    }
    Ok(())
}

fn resolve_unlock_status<S: CredentialStore>(
    session: &Session<S>,
    program_id: i64,
    response: Result<Value>,
) -> Result<bool> {
    match response {
        Ok(body) if body.get("status").and_then(Value::as_str) == Some(STATUS_OK) => {
            let unlocked = body
                .get("data")
                .and_then(|data| data.get("unlocked"))
                .and_then(Value::as_bool)
                .unwrap_or(false);
            session.store_schedule_unlocked(program_id, unlocked)?;
            Ok(unlocked)
        }
        Ok(_) => Ok(false),
        Err(error) if error.is_auth_required() => Ok(false),
        Err(error) => {
            tracing::debug!(program_id, %error, "unlock status unavailable, using cached flag");
            session.schedule_unlocked(program_id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::loopback::{Loopback, Reply};
    use crate::config::ClientConfig;
    use crate::session::MemoryCredentialStore;

    fn service(store: MemoryCredentialStore) -> ProgramService<MemoryCredentialStore> {
        ProgramService::new(
            ApiClient::new(
                ClientConfig::with_base_url("http://127.0.0.1:9").unwrap(),
                Session::new(store),
            )
            .unwrap(),
        )
    }

    #[test]
    fn unlock_status_is_written_through() {
        let session = Session::new(MemoryCredentialStore::default());
        let body = json!({"status": "OK", "data": {"unlocked": true}});
        assert!(resolve_unlock_status(&session, 8, Ok(body)).unwrap());
        assert!(session.schedule_unlocked(8).unwrap());

        let body = json!({"status": "OK", "data": {}});
        assert!(!resolve_unlock_status(&session, 8, Ok(body)).unwrap());
        assert!(!session.schedule_unlocked(8).unwrap());
    }

    #[test]
    fn unlock_status_falls_back_to_cache_on_failure() {
        let session = Session::new(MemoryCredentialStore::default());
        session.store_schedule_unlocked(8, true).unwrap();
        let failure = Err(Error::Api {
            status: 502,
            message: "HTTP 502".to_string(),
        });
        assert!(resolve_unlock_status(&session, 8, failure).unwrap());
    }

    #[test]
    fn rejected_unlock_status_is_locked() {
        let session = Session::new(MemoryCredentialStore::default());
        session.store_schedule_unlocked(8, true).unwrap();
        let body = json!({"status": "FORBIDDEN"});
        assert!(!resolve_unlock_status(&session, 8, Ok(body)).unwrap());
        assert!(session.schedule_unlocked(8).unwrap());
    }

    #[test]
    fn insufficient_balance_is_reported() {
        assert!(check_balance(100, 100).is_ok());
        let error = check_balance(40, 100).unwrap_err();
        assert!(matches!(
            error,
            Error::InsufficientPoints {
                balance: 40,
                cost: 100
            }
        ));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn detail_requires_login() {
        let error = service(MemoryCredentialStore::default())
            .detail(1)
            .await
            .unwrap_err();
        assert!(error.is_auth_required());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn unlock_requires_login_before_confirming() {
        let error = service(MemoryCredentialStore::default())
            .unlock_with_points(1, 100, &|_: &str| -> bool { panic!("should not ask") })
            .await
            .unwrap_err();
        assert!(error.is_auth_required());
    }

    #[tokio::test(flavor = "current_thread")]
    async fn rejected_point_spend_leaves_schedule_locked() {
        let server = Loopback::serve(vec![
            Reply::json(200, &json!({"status": "OK", "data": {"balance": 500}})),
            Reply::json(200, &json!({"status": "BAD_REQUEST", "message": "포인트 사용 실패"})),
        ])
        .await;
        let client = server.client(Some("tok"));
        let service = ProgramService::new(client.clone());

        let error = service
            .unlock_with_points(9, 100, &|_: &str| true)
            .await
            .unwrap_err();

        assert_eq!(error.user_message("fallback"), "포인트 사용 실패");
        assert!(!client.session().schedule_unlocked(9).unwrap());
        let requests = server.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[1].starts_with("post /api/points/use "));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn points_unlock_caches_flag_after_both_calls_succeed() {
        let server = Loopback::serve(vec![
            Reply::json(200, &json!({"status": "OK", "data": {"balance": 500}})),
            Reply::json(200, &json!({"status": "OK"})),
            Reply::json(200, &json!({"status": "OK"})),
        ])
        .await;
        let client = server.client(Some("tok"));

        let outcome = ProgramService::new(client.clone())
            .unlock_with_points(9, 100, &|_: &str| true)
            .await
            .unwrap();

        assert_eq!(outcome, UnlockOutcome::Unlocked { balance_before: 500 });
        assert!(client.session().schedule_unlocked(9).unwrap());
        assert!(server.requests()[2].starts_with("post /api/tour-program/9/unlock "));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn summary_reads_program_without_login() {
        let server = Loopback::serve(vec![Reply::json(
            200,
            &json!({"status": "OK", "data": {"id": 4, "title": "공주 역사 투어", "region": "공주시"}}),
        )])
        .await;

        let detail = ProgramService::new(server.client(None))
            .summary(4)
            .await
            .unwrap();

        assert_eq!(detail.title, "공주 역사 투어");
        assert_eq!(detail.region, "공주시");
        let request = &server.requests()[0];
        assert!(request.starts_with("get /api/tour-program/4 "));
        assert!(!request.contains("authorization:"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn expired_token_reads_as_locked() {
        let server = Loopback::serve(vec![Reply::text(401, "")]).await;
        let client = server.client(Some("expired"));
        client.session().store_schedule_unlocked(3, true).unwrap();

        let unlocked = ProgramService::new(client).unlock_status(3).await.unwrap();

        assert!(!unlocked);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn current_user_uses_cached_identity() {
        let store = MemoryCredentialStore::default();
        let identity = CachedIdentity {
            user_id: "5".to_string(),
            user_name: "여행자".to_string(),
        };
        Session::new(store.clone()).store_identity(&identity).unwrap();

        assert_eq!(service(store).current_user().await.unwrap(), identity);
    }
}
