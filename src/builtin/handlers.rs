//! Stock handlers.

use std::sync::OnceLock;

use axum::http::StatusCode;

use crate::dispatch::{ComponentConfig, DispatchInfo, DispatcherType, Handler};
use crate::error::Result;
use crate::http::{ServletRequest, ServletResponse, ServletResponseExt};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Writes back the method, path and body of the request.
///
/// The first line is `<METHOD> <path>`; when the request went through a
/// forward or include the dispatch mode and handler name follow.
#[derive(Debug, Default)]
pub struct EchoHandler;

impl Handler for EchoHandler {
    fn service(&self, req: &mut ServletRequest, res: &mut ServletResponse) -> Result<()> {
        res.set_content_type(TEXT_PLAIN);
        res.write_str(&format!("{} {}\n", req.method(), req.uri().path()));
        let info = req.extensions().get::<DispatchInfo>();
        if let Some(info) = info.filter(|i| i.dispatcher_type != DispatcherType::Request) {
            res.write_str(&format!("{} {}\n", info.dispatcher_type.as_str(), info.handler));
        }
        res.body_mut().extend_from_slice(req.body());
        Ok(())
    }
}

#[derive(Debug)]
struct StaticText {
    body: String,
    content_type: String,
}

/// Serves a fixed body taken from init parameters.
#[derive(Debug, Default)]
pub struct StaticTextHandler {
    text: OnceLock<StaticText>,
}

impl Handler for StaticTextHandler {
    fn init(&self, config: &ComponentConfig<'_>) -> Result<()> {
        let text = StaticText {
            body: config.init_parameter("body").unwrap_or_default().to_string(),
            content_type: config
                .init_parameter("content_type")
                .unwrap_or(TEXT_PLAIN)
                .to_string(),
        };
        // Registry::initialize runs once, so a second set cannot happen.
        let _ = self.text.set(text);
        Ok(())
    }

    fn service(&self, _req: &mut ServletRequest, res: &mut ServletResponse) -> Result<()> {
        match self.text.get() {
            Some(text) => {
                res.set_content_type(&text.content_type);
                res.write_str(&text.body);
            }
            None => res.set_content_type(TEXT_PLAIN),
        }
        Ok(())
    }
}

/// Answers 404 for whatever it is mapped to.
#[derive(Debug, Default)]
pub struct NotFoundHandler;

impl Handler for NotFoundHandler {
    fn service(&self, req: &mut ServletRequest, res: &mut ServletResponse) -> Result<()> {
        *res.status_mut() = StatusCode::NOT_FOUND;
        res.set_content_type(TEXT_PLAIN);
        res.write_str(&format!("Not Found: {}", req.uri().path()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{build_request, new_response};
    use crate::registry::Registry;
    use axum::http::{header, Method};
    use std::collections::HashMap;

    #[test]
    fn test_echo() {
        let mut req = build_request(Method::POST, "/echo?x=1").unwrap();
        *req.body_mut() = "payload".into();
        let mut res = new_response();
        EchoHandler.service(&mut req, &mut res).unwrap();
        assert_eq!(res.body(), b"POST /echo\npayload");
    }

    #[test]
    fn test_static_text_uses_init_parameters() {
        let registry = Registry::new();
        let params = HashMap::from([
            ("body".to_string(), "<h1>hi</h1>".to_string()),
            ("content_type".to_string(), "text/html".to_string()),
        ]);
        let handler = StaticTextHandler::default();
        handler
            .init(&ComponentConfig {
                name: "page",
                init_parameters: &params,
                registry: &registry,
            })
            .unwrap();

        let mut req = build_request(Method::GET, "/").unwrap();
        let mut res = new_response();
        handler.service(&mut req, &mut res).unwrap();
        assert_eq!(res.body(), b"<h1>hi</h1>");
        assert_eq!(res.headers()[header::CONTENT_TYPE], "text/html");
    }

    #[test]
    fn test_not_found() {
        let mut req = build_request(Method::GET, "/gone").unwrap();
        let mut res = new_response();
        NotFoundHandler.service(&mut req, &mut res).unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
