//! WebAssembly implementation of the `HttpClient` bridge trait.
//!
//! Requests go through the browser's `fetch` API. Per-request timeouts are
//! enforced with an `AbortController`, falling back to the client default
//! when the request sets none. No retries: a browser tab that lost its
//! network is better served by a prompt error.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    http::{HttpClient, HttpRequest, HttpResponse},
};
use bytes::Bytes;
use futures::{
    future::{select, Either},
    pin_mut, FutureExt,
};
use gloo_timers::future::TimeoutFuture;
use js_sys::{try_iter, Array, Uint8Array};
use std::{collections::HashMap, time::Duration};
use tracing::{debug, warn};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestCredentials, RequestInit, RequestMode, Response, Window};

use crate::error::{js_message, window};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// WebAssembly HTTP client backed by the browser's `fetch` API.
pub struct WasmHttpClient {
    window: Window,
    default_timeout: Duration,
}

impl WasmHttpClient {
    /// Create a new client bound to the current browser window.
    pub fn new() -> BridgeResult<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests abort after `timeout` unless they
    /// carry their own.
    pub fn with_timeout(timeout: Duration) -> BridgeResult<Self> {
        Ok(Self {
            window: window()?,
            default_timeout: timeout,
        })
    }

    fn build_request(
        &self,
        request: &HttpRequest,
        signal: &web_sys::AbortSignal,
    ) -> BridgeResult<Request> {
        let init = RequestInit::new();
        init.set_method(request.method.as_str());
        init.set_mode(RequestMode::Cors);
        // The bearer header is the credential; cookies are never sent.
        init.set_credentials(RequestCredentials::Omit);
        init.set_signal(Some(signal));

        if let Some(body) = &request.body {
            let body_array = Uint8Array::from(body.as_ref());
            init.set_body(&JsValue::from(body_array));
        }

        let headers = web_sys::Headers::new().map_err(|err| js_error("create headers", err))?;
        for (key, value) in &request.headers {
            headers
                .set(key, value)
                .map_err(|err| js_error("set header", err))?;
        }
        init.set_headers(&headers);

        Request::new_with_str_and_init(&request.url, &init)
            .map_err(|err| js_error("build request", err))
    }

    async fn fetch_with_timeout(
        &self,
        req: &Request,
        controller: &AbortController,
        timeout: Duration,
    ) -> BridgeResult<Response> {
        let fetch = JsFuture::from(self.window.fetch_with_request(req));
        let timeout_ms = timeout.as_millis().min(u32::MAX as u128) as u32;
        let timeout_fut = TimeoutFuture::new(timeout_ms).map(|_| ());
        pin_mut!(timeout_fut);
        pin_mut!(fetch);

        let result = match select(fetch, timeout_fut).await {
            Either::Left((response, _)) => response,
            Either::Right((_, pending_fetch)) => {
                controller.abort();
                // Poll once more so the abort rejection is observed.
                let _ = pending_fetch.await;
                warn!(timeout_ms, "HTTP request timed out");
                return Err(BridgeError::Timeout(u64::from(timeout_ms)));
            }
        };

        let js_value = result.map_err(|err| js_error("fetch", err))?;
        js_value
            .dyn_into::<Response>()
            .map_err(|_| BridgeError::OperationFailed("fetch returned non-Response".into()))
    }

    async fn read_body(response: &Response) -> BridgeResult<Bytes> {
        let promise = response
            .array_buffer()
            .map_err(|err| js_error("response.array_buffer", err))?;
        let buffer = JsFuture::from(promise)
            .await
            .map_err(|err| js_error("response buffer", err))?;
        let array = Uint8Array::new(&buffer);
        let mut bytes = vec![0u8; array.length() as usize];
        array.copy_to(&mut bytes);
        Ok(Bytes::from(bytes))
    }

    fn collect_headers(response: &Response) -> BridgeResult<HashMap<String, String>> {
        let headers = response.headers();
        let iterator = try_iter(&JsValue::from(headers))
            .map_err(|err| js_error("iterate headers", err))?
            .ok_or_else(|| BridgeError::OperationFailed("Headers iterator unavailable".into()))?;

        let mut map = HashMap::new();
        for entry in iterator {
            let entry = entry.map_err(|err| js_error("header iteration", err))?;
            let pair = Array::from(&entry);
            if pair.length() >= 2 {
                if let (Some(key), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string())
                {
                    map.insert(key, value);
                }
            }
        }

        Ok(map)
    }
}

#[async_trait(?Send)]
impl HttpClient for WasmHttpClient {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let controller =
            AbortController::new().map_err(|err| js_error("create abort controller", err))?;
        let req = self.build_request(&request, &controller.signal())?;
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        debug!(method = request.method.as_str(), url = %request.url, "fetch");
        let response = self.fetch_with_timeout(&req, &controller, timeout).await?;
        let body = Self::read_body(&response).await?;
        let headers = Self::collect_headers(&response)?;

        Ok(HttpResponse {
            status: response.status(),
            headers,
            body,
        })
    }

    async fn is_connected(&self) -> bool {
        self.window.navigator().on_line()
    }
}

fn js_error(context: &str, err: JsValue) -> BridgeError {
    BridgeError::OperationFailed(format!("WasmHttpClient {context}: {}", js_message(&err)))
}
