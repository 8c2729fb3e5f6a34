//! Request methods
//!
//! Every blocking call returns a 2xx [`Response`] or the final error after
//! the transport's retries. Non-2xx replies surface as `api-error`.

use serde::Serialize;
use serde_json::Value;

use eskit_client::http::{Request, RequestMethod, Response};
use eskit_client::params::Params;
use eskit_client::{RequestHandle, Result};

use crate::builder::core::Client;

impl Client {
    /// Send a prepared request.
    ///
    /// # Errors
    ///
    /// The transport's final error.
    pub fn send(&self, request: Request) -> Result<Response> {
        self.transport.request(request)
    }

    /// Single attempt, no retries. Resolves to a response of any status.
    pub fn request_async(&self, request: Request) -> RequestHandle {
        self.transport.request_async(request)
    }

    /// Issue `method` on `path` with query `params` and an optional raw body.
    ///
    /// # Errors
    ///
    /// The transport's final error.
    pub fn request(
        &self,
        method: RequestMethod,
        path: &str,
        params: Params,
        body: Option<&str>,
    ) -> Result<Response> {
        let mut request = Request::new(method, path).with_params(params);
        if let Some(body) = body {
            request = request.with_body(body);
        }
        self.send(request)
    }

    /// # Errors
    ///
    /// The transport's final error.
    pub fn head(&self, path: &str) -> Result<Response> {
        self.send(Request::head(path))
    }

    /// # Errors
    ///
    /// The transport's final error.
    pub fn get(&self, path: &str, params: Params) -> Result<Response> {
        self.send(Request::get(path).with_params(params))
    }

    /// `POST` with `body` serialized as JSON.
    ///
    /// # Errors
    ///
    /// `builder` if `body` cannot be serialized, otherwise the transport's
    /// final error.
    pub fn post<B>(&self, path: &str, params: Params, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.send(Request::post(path).with_params(params).with_json(body)?)
    }

    /// `PUT` with `body` serialized as JSON.
    ///
    /// # Errors
    ///
    /// `builder` if `body` cannot be serialized, otherwise the transport's
    /// final error.
    pub fn put<B>(&self, path: &str, params: Params, body: &B) -> Result<Response>
    where
        B: Serialize + ?Sized,
    {
        self.send(Request::put(path).with_params(params).with_json(body)?)
    }

    /// # Errors
    ///
    /// The transport's final error.
    pub fn delete(&self, path: &str, params: Params) -> Result<Response> {
        self.send(Request::delete(path).with_params(params))
    }

    /// Whether the cluster answers `HEAD /` with a 2xx.
    ///
    /// # Errors
    ///
    /// Transport failures. A non-2xx answer is `Ok(false)`.
    pub fn ping(&self) -> Result<bool> {
        match self.head("") {
            Ok(_) => Ok(true),
            Err(e) if e.is_api() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Cluster information document from `GET /`.
    ///
    /// # Errors
    ///
    /// The transport's final error, or `invalid-json-response`.
    pub fn info(&self) -> Result<Value> {
        self.get("", Params::new())?.json()
    }
}
