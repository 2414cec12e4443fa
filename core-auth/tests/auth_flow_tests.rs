//! End-to-end navigation flows through the router, guards, callback handler
//! and manager, driven against in-memory bridges.

mod common;

use bridge_traits::{HttpResponse, NavigateOptions};
use common::{
    context, me_response, session_response, timeout_error, GatedHttp, MemorySettings, MockHttp,
    RecordingNavigator,
};
use core_auth::{
    AppRouter, AuthError, AuthManager, CallbackOutcome, DispatchOutcome, GuardState,
    MountOutcome, RenderDecision, RouteTable,
};
use std::sync::Arc;

fn router(context: core_auth::AuthContext) -> AppRouter {
    AppRouter::new(context, RouteTable::default())
}

#[tokio::test]
async fn protected_route_without_token_redirects_with_zero_calls() {
    let mut http = MockHttp::new();
    http.expect_execute().times(0);
    let navigator = RecordingNavigator::at("/assistant");
    let ctx = context(Arc::new(http), MemorySettings::default(), navigator.clone(), None).await;

    let outcome = router(ctx).dispatch().await;

    assert_eq!(
        outcome,
        DispatchOutcome::Guard {
            path: "/assistant".to_string(),
            outcome: MountOutcome::Applied(GuardState::RedirectLogin),
        }
    );
    assert_eq!(
        navigator.history(),
        vec![("/login".to_string(), NavigateOptions::replace())]
    );
}

#[tokio::test]
async fn profile_route_sends_incomplete_profile_to_onboarding() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|request| {
            assert!(request.url.ends_with("/api/auth/me"));
            assert_eq!(
                request.headers.get("Authorization").map(String::as_str),
                Some("Bearer session_student")
            );
            Ok(me_response(false))
        });
    let navigator = RecordingNavigator::at("/assistant");
    let ctx = context(
        Arc::new(http),
        MemorySettings::default(),
        navigator.clone(),
        Some(("session_student", true)),
    )
    .await;

    let outcome = router(ctx).dispatch().await;

    assert_eq!(
        outcome,
        DispatchOutcome::Guard {
            path: "/assistant".to_string(),
            outcome: MountOutcome::Applied(GuardState::RedirectOnboarding),
        }
    );
    assert_eq!(navigator.count_to("/onboarding"), 1);
}

#[tokio::test]
async fn profile_route_renders_for_complete_profile() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(me_response(true)));
    let navigator = RecordingNavigator::at("/assistant");
    let ctx = context(
        Arc::new(http),
        MemorySettings::default(),
        navigator.clone(),
        Some(("session_student", true)),
    )
    .await;
    let router = router(ctx);

    router.dispatch().await;

    let guard = router.current_guard().expect("mounted guard");
    assert_eq!(guard.state(), GuardState::Authorized);
    assert!(guard.state().renders_children());
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn public_route_redirects_signed_in_user_to_main() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(me_response(true)));
    let navigator = RecordingNavigator::at("/login");
    let ctx = context(
        Arc::new(http),
        MemorySettings::default(),
        navigator.clone(),
        Some(("session_student", true)),
    )
    .await;

    router(ctx).dispatch().await;

    assert_eq!(
        navigator.history(),
        vec![("/assistant".to_string(), NavigateOptions::replace())]
    );
}

#[tokio::test]
async fn public_route_without_token_is_checked_with_zero_calls() {
    let mut http = MockHttp::new();
    http.expect_execute().times(0);
    let navigator = RecordingNavigator::at("/login");
    let ctx = context(Arc::new(http), MemorySettings::default(), navigator.clone(), None).await;

    let outcome = router(ctx).dispatch().await;

    assert_eq!(
        outcome,
        DispatchOutcome::Guard {
            path: "/login".to_string(),
            outcome: MountOutcome::Applied(GuardState::Checked),
        }
    );
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn callback_exchanges_once_across_double_render() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|request| {
            assert!(request.url.ends_with("/api/auth/session"));
            assert!(!request.has_authorization());
            Ok(session_response("session_oauth", true))
        });
    let settings = MemorySettings::default();
    let navigator = RecordingNavigator::at("/#session_id=abc123");
    let ctx = context(Arc::new(http), settings.clone(), navigator.clone(), None).await;
    let router = router(ctx);

    let first = router.dispatch().await;
    // The identifier comes back after its exchange finished
    navigator.go("/#session_id=abc123");
    let second = router.dispatch().await;

    assert_eq!(
        first,
        DispatchOutcome::Callback(CallbackOutcome::Completed {
            destination: "/assistant".to_string()
        })
    );
    assert_eq!(
        second,
        DispatchOutcome::Callback(CallbackOutcome::Reused {
            destination: "/login".to_string()
        })
    );
    assert_eq!(
        settings.get("ace_session_token").as_deref(),
        Some("session_oauth")
    );
}

#[tokio::test]
async fn reused_identifier_after_failure_leaves_callback_view() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(HttpResponse::new(401, r#"{"detail":"Invalid session"}"#)));
    let navigator = RecordingNavigator::at("/#session_id=expired");
    let ctx = context(Arc::new(http), MemorySettings::default(), navigator.clone(), None).await;
    let router = router(ctx);
    let nav: &dyn bridge_traits::Navigator = navigator.as_ref();

    assert_eq!(
        router.dispatch().await,
        DispatchOutcome::Callback(CallbackOutcome::Failed {
            destination: "/login".to_string()
        })
    );

    navigator.go("/#session_id=expired");
    assert_eq!(
        router.dispatch().await,
        DispatchOutcome::Callback(CallbackOutcome::Reused {
            destination: "/login".to_string()
        })
    );

    let location = nav.location();
    assert_eq!(location.path, "/login");
    assert!(location.fragment.is_none());
    assert_ne!(router.render(&location), RenderDecision::OAuthCallback);
    assert_eq!(navigator.count_to("/login"), 2);
}

#[tokio::test]
async fn stale_token_on_landing_renders_without_redirect() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(HttpResponse::new(401, r#"{"detail":"Session expired"}"#)));
    let settings = MemorySettings::default();
    let navigator = RecordingNavigator::at("/");
    let ctx = context(
        Arc::new(http),
        settings.clone(),
        navigator.clone(),
        Some(("session_student", true)),
    )
    .await;

    assert_eq!(
        router(ctx).dispatch().await,
        DispatchOutcome::Guard {
            path: "/".to_string(),
            outcome: MountOutcome::Applied(GuardState::Checked),
        }
    );
    assert!(navigator.history().is_empty());
    assert!(settings.get("ace_session_token").is_none());
}

#[tokio::test]
async fn callback_fragment_is_removed_after_success() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(session_response("session_oauth", false)));
    let navigator = RecordingNavigator::at("/assistant#session_id=abc123");
    let ctx = context(Arc::new(http), MemorySettings::default(), navigator.clone(), None).await;
    let nav: &dyn bridge_traits::Navigator = navigator.as_ref();

    router(ctx).dispatch().await;

    assert!(nav.location().fragment.is_none());
    assert_eq!(nav.location().path, "/onboarding");
}

#[tokio::test]
async fn callback_without_identifier_goes_to_login_with_zero_calls() {
    let mut http = MockHttp::new();
    http.expect_execute().times(0);
    let navigator = RecordingNavigator::at("/#session_id=");
    let ctx = context(Arc::new(http), MemorySettings::default(), navigator.clone(), None).await;

    let outcome = router(ctx).dispatch().await;

    assert_eq!(
        outcome,
        DispatchOutcome::Callback(CallbackOutcome::MissingIdentifier)
    );
    assert_eq!(
        navigator.history(),
        vec![("/login".to_string(), NavigateOptions::replace())]
    );
}

#[tokio::test]
async fn concurrent_unauthorized_calls_redirect_once() {
    let http = GatedHttp::new(|_| Ok(HttpResponse::new(401, r#"{"detail":"Session expired"}"#)));
    let settings = MemorySettings::default();
    let navigator = RecordingNavigator::at("/assistant");
    let ctx = context(
        http.clone(),
        settings.clone(),
        navigator.clone(),
        Some(("session_student", true)),
    )
    .await;

    let calls: Vec<_> = ["/api/chats", "/api/profile", "/api/student/intelligence"]
        .into_iter()
        .map(|path| {
            let gateway = Arc::clone(&ctx.gateway);
            tokio::spawn(async move { gateway.get_json::<serde_json::Value>(path).await })
        })
        .collect();
    http.wait_for_calls(3).await;
    http.release();

    for call in calls {
        assert!(matches!(
            call.await.expect("join"),
            Err(AuthError::Unauthenticated)
        ));
    }
    assert_eq!(navigator.count_to("/login"), 1);
    assert!(!ctx.store.has_token());
    assert!(settings.get("ace_session_token").is_none());
    assert!(settings.get("ace_user").is_none());
}

#[tokio::test]
async fn logout_survives_server_timeout() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|request| {
            assert!(request.url.ends_with("/api/auth/logout"));
            assert!(request.timeout.is_some());
            Err(timeout_error())
        });
    let settings = MemorySettings::default();
    let navigator = RecordingNavigator::at("/assistant");
    let ctx = context(
        Arc::new(http),
        settings.clone(),
        navigator.clone(),
        Some(("session_student", true)),
    )
    .await;
    let manager = AuthManager::new(ctx);

    manager.logout().await;

    assert!(!manager.is_authenticated());
    assert!(settings.get("ace_session_token").is_none());
    assert_eq!(
        navigator.history(),
        vec![("/login".to_string(), NavigateOptions::replace())]
    );
}

#[tokio::test]
async fn unmounted_guard_ignores_late_verification() {
    let http = GatedHttp::new(|_| Ok(me_response(false)));
    let navigator = RecordingNavigator::at("/assistant");
    let ctx = context(
        http.clone(),
        MemorySettings::default(),
        navigator.clone(),
        Some(("session_student", true)),
    )
    .await;
    let router = Arc::new(router(ctx.clone()));

    let pending = tokio::spawn({
        let router = Arc::clone(&router);
        async move { router.dispatch().await }
    });
    http.wait_for_calls(1).await;
    let guard = router.current_guard().expect("mounted guard");
    router.unmount_current();
    http.release();

    assert_eq!(
        pending.await.expect("join"),
        DispatchOutcome::Guard {
            path: "/assistant".to_string(),
            outcome: MountOutcome::Superseded,
        }
    );
    assert_eq!(guard.state(), GuardState::Loading);
    assert!(navigator.history().is_empty());
    assert!(ctx.store.has_token());
}

#[tokio::test]
async fn bad_credentials_do_not_disturb_existing_session() {
    let mut http = MockHttp::new();
    http.expect_execute()
        .times(1)
        .returning(|_| Ok(HttpResponse::new(401, r#"{"detail":"Invalid email or password"}"#)));
    let navigator = RecordingNavigator::at("/login");
    let ctx = context(
        Arc::new(http),
        MemorySettings::default(),
        navigator.clone(),
        Some(("session_student", true)),
    )
    .await;
    let manager = AuthManager::new(ctx);

    let err = manager
        .login("sam@university.edu", "nope")
        .await
        .expect_err("rejected");

    assert!(matches!(err, AuthError::Validation { status: 401, .. }));
    assert!(manager.is_authenticated());
    assert!(navigator.history().is_empty());
}
